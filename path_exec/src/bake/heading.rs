//! # Heading assignment
//!
//! Headings are held constant between rotation attachments: each chunk takes the heading of the
//! latest rotation at or before its path parameter.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, warn};

use super::resample::Sample;
use crate::{
    params::BakeParams,
    path::Path,
    rotation::{Rotation, RotationList},
};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Heading of the latest rotation with `rotation.t <= t`.
///
/// `sorted` must be in ascending `t` order. Returns `None` if every rotation is after `t`.
pub fn heading_at(sorted: &[Rotation], t: f64) -> Option<f64> {
    let idx = sorted.partition_point(|r| r.t <= t);

    idx.checked_sub(1).map(|i| sorted[i].rot)
}

/// Compute the heading of every sample.
///
/// Each sample's position is matched back onto the path to find its parameter. If that fails the
/// previous heading is kept. Rotations attached beyond the end of the path are ignored.
pub fn assign_headings(
    path: &Path,
    samples: &[Sample],
    rotations: &RotationList,
    params: &BakeParams,
) -> Vec<f64> {
    let end_t = path.end_t().unwrap_or(0.0);

    let sorted: Vec<Rotation> = rotations
        .sorted()
        .into_iter()
        .filter(|r| {
            if r.t > end_t {
                error!(
                    "Rotation at t = {} is beyond the last path segment, ignoring it",
                    r.t
                );
                false
            } else {
                true
            }
        })
        .collect();

    let mut heading = sorted.first().map_or(0.0, |r| r.rot);

    samples
        .iter()
        .map(|s| {
            match path.find_next_t_near_point(
                &s.point,
                s.t,
                params.heading_search_radius_px,
                params.num_samples,
            ) {
                Some(m) => {
                    if let Some(h) = heading_at(&sorted, m.t) {
                        heading = h;
                    }
                }
                None => warn!(
                    "Cannot find the path near chunk at ({:.1}, {:.1}), keeping heading {:.3}",
                    s.point.x, s.point.y, heading
                ),
            }

            heading
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{geom::Point, path::test::straight};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_heading_at_step_hold() {
        let sorted = vec![Rotation { t: 0.0, rot: 0.0 }, Rotation { t: 1.0, rot: FRAC_PI_2 }];

        assert_eq!(heading_at(&sorted, 0.5), Some(0.0));
        assert_eq!(heading_at(&sorted, 1.0), Some(FRAC_PI_2));
        assert_eq!(heading_at(&sorted, 3.0), Some(FRAC_PI_2));
        assert_eq!(heading_at(&sorted, -0.5), None);
        assert_eq!(heading_at(&[], 0.5), None);
    }

    #[test]
    fn test_assign_headings() {
        let path = straight();

        let mut rotations = RotationList::new();
        rotations.set_initial_heading_deg(0.0);
        let i = rotations.insert_rotation(0.6);
        rotations.get_mut(i).unwrap().set_rot_val(1.0);
        // Out of range, ignored
        let i = rotations.insert_rotation(4.0);
        rotations.get_mut(i).unwrap().set_rot_val(2.0);

        let samples: Vec<Sample> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|&t| Sample {
                t,
                point: path.point_at(t).unwrap(),
            })
            .collect();

        let headings = assign_headings(&path, &samples, &rotations, &BakeParams::default());
        assert_eq!(headings, vec![0.0, 0.0, 0.0, 1.0, 1.0]);

        // A sample off the path keeps the previous heading
        let mut off = samples.clone();
        off[4].point = Point::new(2000.0, 2000.0);
        let headings = assign_headings(&path, &off, &rotations, &BakeParams::default());
        assert_eq!(headings[4], 1.0);
    }
}
