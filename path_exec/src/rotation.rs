//! # Rotation attachments
//!
//! Heading targets bound to path parameter values. The list is a sibling of the [`Path`] rather
//! than part of it, so after any edit to the path each rotation must be re-resolved against the
//! new geometry (see [`RotationList::positions`] and [`RotationList::reattach`]).
//!
//! The rotation at index 0 is the robot's initial heading and always sits at `t = 0`.
//!
//! Angles are radians. Conversion to degrees only happens when exporting.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, error};
use ordered_float::OrderedFloat;

use crate::{geom::Point, path::Path};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Global path parameter
    pub t: f64,

    /// Heading in radians
    pub rot: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationList {
    rotations: Vec<Rotation>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Rotation {
    pub fn new(t: f64) -> Self {
        Self { t, rot: 0.0 }
    }

    pub fn set_rot_val(&mut self, angle_rad: f64) {
        self.rot = angle_rad;
    }
}

impl RotationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rotations(rotations: Vec<Rotation>) -> Self {
        Self { rotations }
    }

    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    /// Rotations in insertion order.
    pub fn rotations(&self) -> &[Rotation] {
        &self.rotations
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Rotation> {
        self.rotations.get_mut(index)
    }

    /// Append a new zero heading at `t`, returning its index.
    ///
    /// The list isn't kept sorted, use [`RotationList::sorted`] when order matters.
    pub fn insert_rotation(&mut self, t: f64) -> usize {
        self.rotations.push(Rotation::new(t));
        self.rotations.len() - 1
    }

    /// Remove a rotation. The initial heading can't be removed.
    pub fn delete_rotation(&mut self, index: usize) -> Option<Rotation> {
        if index == 0 || index >= self.rotations.len() {
            return None;
        }

        Some(self.rotations.remove(index))
    }

    /// Heading of the initial rotation in radians, zero if there isn't one.
    pub fn initial_heading(&self) -> f64 {
        self.rotations.first().map_or(0.0, |r| r.rot)
    }

    /// Set the initial heading, creating the `t = 0` rotation if needed.
    pub fn set_initial_heading_deg(&mut self, heading_deg: f64) {
        if self.rotations.is_empty() {
            self.insert_rotation(0.0);
        }

        self.rotations[0].set_rot_val(heading_deg.to_radians());
    }

    /// Copy of the rotations sorted by ascending `t`. Equal `t`s keep insertion order.
    pub fn sorted(&self) -> Vec<Rotation> {
        let mut sorted = self.rotations.clone();
        sorted.sort_by_key(|r| OrderedFloat(r.t));
        sorted
    }

    /// Drop every rotation except the first whose `t` no longer lies on `path`, and move the
    /// first back to `t = 0`.
    pub fn prune_invalid(&mut self, path: &Path) {
        let mut index = 0;

        self.rotations.retain(|r| {
            let keep = index == 0 || path.point_at(r.t).is_some();

            if !keep {
                debug!("Pruning rotation {} at t = {}", index, r.t);
            }

            index += 1;
            keep
        });

        if let Some(first) = self.rotations.first_mut() {
            first.t = 0.0;
        }
    }

    /// Positions of each rotation on `path`, for re-attaching after an edit.
    pub fn positions(&self, path: &Path) -> Vec<Option<Point>> {
        self.rotations.iter().map(|r| path.point_at(r.t)).collect()
    }

    /// Resolve each rotation's `t` from its position captured before an edit.
    ///
    /// Rotations whose old position is no longer within `max_dist` of the path are removed. The
    /// initial heading is always kept at `t = 0`.
    pub fn reattach(
        &mut self,
        path: &Path,
        positions: &[Option<Point>],
        max_dist: f64,
        num_samples: usize,
    ) {
        let old = std::mem::take(&mut self.rotations);

        for (i, (mut rotation, pos)) in old.into_iter().zip(positions.iter()).enumerate() {
            if i == 0 {
                rotation.t = 0.0;
                self.rotations.push(rotation);
                continue;
            }

            let resolved = pos.and_then(|p| {
                path.find_t_near_point(&p, max_dist, num_samples)
                    .map(|m| m.t)
            });

            match resolved {
                Some(t) => {
                    rotation.t = t;
                    self.rotations.push(rotation);
                }
                None => debug!("Rotation {} lost its attachment point and was removed", i),
            }
        }
    }

    /// The latest rotation (by `t`) at or before the path point nearest to `point`.
    pub fn find_rotation_before(
        &self,
        path: &Path,
        point: &Point,
        max_dist: f64,
        num_samples: usize,
    ) -> Option<usize> {
        let nearest = path.find_t_near_point(point, max_dist, num_samples)?;

        let found = self
            .rotations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.t <= nearest.t)
            .max_by_key(|(_, r)| OrderedFloat(r.t))
            .map(|(i, _)| i);

        if found.is_none() {
            debug!("No rotation before t = {}", nearest.t);
        }

        found
    }

    /// The first rotation whose position on `path` lies within `radius` of `point`.
    pub fn find_rotation_near(
        &self,
        path: &Path,
        point: &Point,
        radius: f64,
    ) -> Option<(usize, Point)> {
        for (i, r) in self.rotations.iter().enumerate() {
            let pos = match path.point_at(r.t) {
                Some(p) => p,
                None => {
                    error!(
                        "Rotation {} has t = {} beyond the last path segment, skipping",
                        i, r.t
                    );
                    continue;
                }
            };

            if (pos - point).norm_squared() < radius * radius {
                return Some((i, pos));
            }
        }

        None
    }
}

/// Angle from `origin` to `cursor`, measured from the +X axis.
pub fn angle_to_cursor(origin: &Point, cursor: &Point) -> f64 {
    (cursor.y - origin.y).atan2(cursor.x - origin.x)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        geom::bezier::DEFAULT_NUM_SAMPLES,
        path::test::{path_from, straight},
    };
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_to_cursor() {
        let o = Point::new(10.0, 10.0);

        assert_abs_diff_eq!(angle_to_cursor(&o, &Point::new(20.0, 10.0)), 0.0);
        assert_abs_diff_eq!(angle_to_cursor(&o, &Point::new(10.0, 20.0)), FRAC_PI_2);
        assert_abs_diff_eq!(angle_to_cursor(&o, &Point::new(0.0, 10.0)), PI);
        assert_abs_diff_eq!(angle_to_cursor(&o, &o), 0.0);
    }

    #[test]
    fn test_insert_delete() {
        let mut list = RotationList::new();
        list.set_initial_heading_deg(90.0);
        assert_abs_diff_eq!(list.initial_heading(), FRAC_PI_2);

        let i = list.insert_rotation(0.7);
        list.get_mut(i).unwrap().set_rot_val(1.0);
        list.insert_rotation(0.3);

        assert_eq!(list.len(), 3);
        let ts: Vec<f64> = list.sorted().iter().map(|r| r.t).collect();
        assert_eq!(ts, vec![0.0, 0.3, 0.7]);

        assert!(list.delete_rotation(0).is_none());
        assert_eq!(list.delete_rotation(1).map(|r| r.t), Some(0.7));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_prune_invalid() {
        let path = straight();
        let mut list = RotationList::from_rotations(vec![
            Rotation { t: 0.4, rot: 0.5 },
            Rotation { t: 1.5, rot: 1.0 },
            Rotation { t: 0.5, rot: 2.0 },
            Rotation { t: -1.0, rot: 3.0 },
        ]);

        list.prune_invalid(&path);

        assert_eq!(
            list.rotations(),
            &[Rotation { t: 0.0, rot: 0.5 }, Rotation { t: 0.5, rot: 2.0 }]
        );
    }

    #[test]
    fn test_reattach_after_delete() {
        let mut path = path_from(&[
            ((0.0, 0.0), (-100.0, 0.0), (100.0, 0.0)),
            ((300.0, 0.0), (-100.0, 0.0), (100.0, 0.0)),
            ((300.0, 300.0), (0.0, -100.0), (0.0, 100.0)),
        ]);

        let mut list = RotationList::new();
        list.insert_rotation(0.0);
        list.insert_rotation(0.5);
        list.insert_rotation(1.5);

        let positions = list.positions(&path);
        path.delete_pose_at(2);
        list.reattach(&path, &positions, 70.0, DEFAULT_NUM_SAMPLES);

        // The rotation on the deleted segment is gone, the other one is still near t = 0.5
        assert_eq!(list.len(), 2);
        assert_abs_diff_eq!(list.rotations()[1].t, 0.5, epsilon = 1.0 / 127.0);
    }

    #[test]
    fn test_find_rotation() {
        let path = straight();
        let mut list = RotationList::new();
        list.insert_rotation(0.0);
        list.insert_rotation(0.5);
        list.insert_rotation(5.0);

        assert_eq!(
            list.find_rotation_before(&path, &Point::new(250.0, 0.0), 70.0, DEFAULT_NUM_SAMPLES),
            Some(1)
        );
        assert_eq!(
            list.find_rotation_before(&path, &Point::new(50.0, 0.0), 70.0, DEFAULT_NUM_SAMPLES),
            Some(0)
        );
        assert!(list
            .find_rotation_before(&path, &Point::new(50.0, 500.0), 70.0, DEFAULT_NUM_SAMPLES)
            .is_none());

        let (i, pos) = list
            .find_rotation_near(&path, &Point::new(150.0, 5.0), 10.0)
            .unwrap();
        assert_eq!(i, 1);
        assert_abs_diff_eq!(pos.x, 150.0, epsilon = 1e-9);

        // The rotation beyond the path is skipped
        assert!(list
            .find_rotation_near(&path, &Point::new(1500.0, 0.0), 10.0)
            .is_none());
    }
}
