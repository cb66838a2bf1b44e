//! # Field scaling
//!
//! Conversion between canvas pixels (origin top left, Y down) and field meters (origin bottom
//! left, Y up).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use util::maths::lin_map;

use crate::{geom::Point, params::RobotParams};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Size of the field in meters and of its image on the canvas in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FieldDims {
    pub x_m: f64,
    pub y_m: f64,
    pub x_px: f64,
    pub y_px: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl FieldDims {
    /// Convert a canvas distance to meters using the X scale.
    pub fn px_to_m(&self, px: f64) -> f64 {
        px * self.x_m / self.x_px
    }

    pub fn canvas_to_meters(&self, point: &Point) -> Point {
        Point::new(
            lin_map((0.0, self.x_px), (0.0, self.x_m), point.x),
            lin_map((0.0, self.y_px), (self.y_m, 0.0), point.y),
        )
    }

    pub fn meters_to_canvas(&self, point: &Point) -> Point {
        Point::new(
            lin_map((0.0, self.x_m), (0.0, self.x_px), point.x),
            lin_map((self.y_m, 0.0), (0.0, self.y_px), point.y),
        )
    }

    /// Radius in pixels of the circle around a pose which counts as hitting it, half the larger
    /// side of the robot.
    pub fn robot_hit_radius_px(&self, robot: &RobotParams) -> f64 {
        let w = robot.size_x_m * self.x_px / self.x_m;
        let h = robot.size_y_m * self.y_px / self.y_m;

        w.max(h) / 2.0
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// 16.5 x 8.0 m field drawn at 100 px/m
    pub(crate) fn field() -> FieldDims {
        FieldDims {
            x_m: 16.5,
            y_m: 8.0,
            x_px: 1650.0,
            y_px: 800.0,
        }
    }

    #[test]
    fn test_canvas_to_meters() {
        let f = field();

        let top_left = f.canvas_to_meters(&Point::new(0.0, 0.0));
        assert_abs_diff_eq!(top_left.x, 0.0);
        assert_abs_diff_eq!(top_left.y, 8.0);

        let p = f.canvas_to_meters(&Point::new(330.0, 600.0));
        assert_abs_diff_eq!(p.x, 3.3, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-12);

        let back = f.meters_to_canvas(&p);
        assert_abs_diff_eq!(back.x, 330.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, 600.0, epsilon = 1e-9);

        assert_abs_diff_eq!(f.px_to_m(250.0), 2.5);
    }

    #[test]
    fn test_robot_hit_radius() {
        let robot = RobotParams {
            max_velocity_ms: 2.0,
            max_acceleration_mss: 1.0,
            size_x_m: 0.8,
            size_y_m: 0.6,
        };

        assert_abs_diff_eq!(field().robot_hit_radius_px(&robot), 40.0, epsilon = 1e-9);
    }
}
