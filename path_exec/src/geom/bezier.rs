//! # Cubic Bezier segment

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::Point;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default number of samples used by the nearest point search.
pub const DEFAULT_NUM_SAMPLES: usize = 128;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A cubic Bezier defined by its four control points.
///
/// The curve starts at `a` heading towards `b` and ends at `d` arriving from the direction of `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub d: Point,
}

/// Result of a nearest point search.
///
/// For a single segment `t` is local (`[0, 1]`), for a path it is the global path parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    pub t: f64,
    pub point: Point,
    pub dist_sq: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl CubicBezier {
    pub fn new(a: Point, b: Point, c: Point, d: Point) -> Self {
        Self { a, b, c, d }
    }

    /// Evaluate the curve at `t`.
    ///
    /// Returns `None` if `t` is outside of `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Option<Point> {
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        // Polynomial form: A t^3 + B t^2 + C t + D
        let d = self.a.coords;
        let c = (self.b - self.a) * 3.0;
        let b = (self.c - self.b) * 3.0 - c;
        let a = (self.d - self.a) - c - b;

        let t2 = t * t;
        let t3 = t2 * t;

        Some(Point::from(a * t3 + b * t2 + c * t + d))
    }

    /// Brute force search for the point on the curve nearest to `target`.
    ///
    /// `num_samples` values of `t` are sampled uniformly over `[0, 1]`, both ends included. The
    /// first sample with the smallest distance wins. If that distance is more than `max_dist`
    /// from `target` `None` is returned.
    pub fn find_t_near_point(
        &self,
        target: &Point,
        max_dist: f64,
        num_samples: usize,
    ) -> Option<NearestMatch> {
        let num_samples = num_samples.max(2);
        let step = 1.0 / (num_samples - 1) as f64;

        let mut best: Option<NearestMatch> = None;

        for i in 0..num_samples {
            let t = (i as f64 * step).min(1.0);

            let point = match self.point_at(t) {
                Some(p) => p,
                None => continue,
            };

            let dist_sq = (target - point).norm_squared();

            if best.map_or(true, |b| dist_sq < b.dist_sq) {
                best = Some(NearestMatch { t, point, dist_sq });
            }
        }

        best.filter(|b| b.dist_sq <= max_dist * max_dist)
    }

    /// Approximate arc length of the curve using `num_steps` chords.
    pub fn approx_length(&self, num_steps: usize) -> f64 {
        let num_steps = num_steps.max(1);
        let mut length = 0.0;
        let mut prev = self.a;

        for i in 1..=num_steps {
            if let Some(p) = self.point_at(i as f64 / num_steps as f64) {
                length += (p - prev).norm();
                prev = p;
            }
        }

        length
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn curve() -> CubicBezier {
        CubicBezier::new(
            Point::new(10.0, 20.0),
            Point::new(80.0, -40.0),
            Point::new(150.0, 90.0),
            Point::new(200.0, 30.0),
        )
    }

    #[test]
    fn test_endpoints() {
        let bez = curve();

        assert_eq!(bez.point_at(0.0), Some(bez.a));
        assert_eq!(bez.point_at(1.0), Some(bez.d));
    }

    #[test]
    fn test_out_of_range() {
        let bez = curve();

        assert!(bez.point_at(-0.01).is_none());
        assert!(bez.point_at(1.01).is_none());
    }

    #[test]
    fn test_straight_midpoint() {
        let bez = CubicBezier::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(300.0, 0.0),
        );

        let mid = bez.point_at(0.5).unwrap();
        assert_abs_diff_eq!(mid.x, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mid.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bez.approx_length(64), 300.0, epsilon = 1e-6);
    }

    #[test]
    fn test_find_t_near_point() {
        let bez = curve();

        // A point exactly on the curve at one of the sample positions
        let t0 = 40.0 / 127.0;
        let on_curve = bez.point_at(t0).unwrap();

        let found = bez.find_t_near_point(&on_curve, 1.0, DEFAULT_NUM_SAMPLES).unwrap();
        assert_abs_diff_eq!(found.t, t0, epsilon = 1.0 / 127.0);
        assert_abs_diff_eq!(found.dist_sq, 0.0, epsilon = 1e-9);

        // A point between samples is still within the sampling resolution
        let between = bez.point_at(0.503).unwrap();
        let found = bez.find_t_near_point(&between, 5.0, DEFAULT_NUM_SAMPLES).unwrap();
        assert!((found.t - 0.503).abs() <= 1.0 / 127.0);
    }

    #[test]
    fn test_find_t_near_point_rejects_far() {
        let bez = curve();

        // Far away from the curve
        assert!(bez
            .find_t_near_point(&Point::new(1000.0, 1000.0), 10.0, DEFAULT_NUM_SAMPLES)
            .is_none());

        // Just past the end point, closer than the true distance
        let beyond = Point::new(210.0, 30.0);
        assert!(bez.find_t_near_point(&beyond, 9.0, DEFAULT_NUM_SAMPLES).is_none());
        assert!(bez.find_t_near_point(&beyond, 11.0, DEFAULT_NUM_SAMPLES).is_some());
    }
}
