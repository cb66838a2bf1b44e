//! # Path
//!
//! The composite path: an ordered list of poses, each adjacent pair joined by a cubic Bezier.
//!
//! The path parameter `t` runs over `[0, N-1]` for `N` poses. The integer part selects the
//! segment and the fractional part is the local Bezier parameter, so pose `i` sits at `t = i`.
//! Paths with fewer than two poses have no curve and every query on them returns `None`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod pose;

pub use pose::{MoveCondition, Pose, PoseCommandGroup};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::{
    command::IdGen,
    geom::{
        bezier::{CubicBezier, NearestMatch},
        Point, Vector, VectorExt,
    },
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    poses: Vec<Pose>,
}

/// A handle found by [`Path::find_handle_near`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleHit {
    pub pose_index: usize,
    pub handle: HandleKind,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Enter,
    Exit,
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Cannot insert a pose at index {0}, the path only has {1} poses")]
    IndexOutOfRange(usize, usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_poses(poses: Vec<Pose>) -> Self {
        let mut path = Self { poses };
        path.update_move_switch_perms();
        path
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// True if the path has at least one segment.
    pub fn has_bezier(&self) -> bool {
        self.poses.len() >= 2
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn pose(&self, index: usize) -> Option<&Pose> {
        self.poses.get(index)
    }

    pub fn pose_mut(&mut self, index: usize) -> Option<&mut Pose> {
        self.poses.get_mut(index)
    }

    pub fn num_segments(&self) -> usize {
        self.poses.len().saturating_sub(1)
    }

    /// Parameter value at the last pose, `N-1`.
    pub fn end_t(&self) -> Option<f64> {
        if self.has_bezier() {
            Some(self.num_segments() as f64)
        } else {
            None
        }
    }

    /// The Bezier joining pose `index` to pose `index + 1`.
    pub fn bezier(&self, index: usize) -> Option<CubicBezier> {
        let p1 = self.poses.get(index)?;
        let p2 = self.poses.get(index + 1)?;

        Some(CubicBezier::new(
            p1.point,
            p1.exit_point(),
            p2.enter_point(),
            p2.point,
        ))
    }

    /// Iterate over all segments in order.
    pub fn beziers(&self) -> impl Iterator<Item = CubicBezier> + '_ {
        self.poses.windows(2).map(|w| {
            CubicBezier::new(w[0].point, w[0].exit_point(), w[1].enter_point(), w[1].point)
        })
    }

    /// Evaluate the path at the global parameter `t`.
    pub fn point_at(&self, t: f64) -> Option<Point> {
        let end_t = self.end_t()?;

        if !(0.0..=end_t).contains(&t) {
            return None;
        }

        // The last pose belongs to the final segment at local t = 1
        let index = (t.trunc() as usize).min(self.num_segments() - 1);

        self.bezier(index)?.point_at(t - index as f64)
    }

    /// Search every segment for the point nearest to `target`, returning the global parameter.
    ///
    /// Strictly smaller distances win, so on a tie the earlier segment is kept.
    pub fn find_t_near_point(
        &self,
        target: &Point,
        max_dist: f64,
        num_samples: usize,
    ) -> Option<NearestMatch> {
        self.segment_matches(target, max_dist, num_samples)
            .fold(None, |best: Option<NearestMatch>, m| match best {
                Some(b) if b.dist_sq <= m.dist_sq => Some(b),
                _ => Some(m),
            })
    }

    /// Continuity aware nearest point search, for tracking a cursor dragged along the path.
    ///
    /// Of the per-segment matches within `max_dist`, those whose global `t` lies within one
    /// parameter unit of `prev_t` are preferred, picking the one closest to `prev_t`. If no match
    /// is that close this falls back to [`Path::find_t_near_point`].
    pub fn find_next_t_near_point(
        &self,
        target: &Point,
        prev_t: f64,
        max_dist: f64,
        num_samples: usize,
    ) -> Option<NearestMatch> {
        let continuous = self
            .segment_matches(target, max_dist, num_samples)
            .filter(|m| (m.t - prev_t).abs() <= 1.0)
            .fold(None, |best: Option<NearestMatch>, m| match best {
                Some(b) if (b.t - prev_t).abs() <= (m.t - prev_t).abs() => Some(b),
                _ => Some(m),
            });

        continuous.or_else(|| self.find_t_near_point(target, max_dist, num_samples))
    }

    /// Best match on each segment, with `t` converted to the global parameter.
    fn segment_matches<'a>(
        &'a self,
        target: &'a Point,
        max_dist: f64,
        num_samples: usize,
    ) -> impl Iterator<Item = NearestMatch> + 'a {
        self.beziers().enumerate().filter_map(move |(i, bez)| {
            bez.find_t_near_point(target, max_dist, num_samples)
                .map(|m| NearestMatch {
                    t: m.t + i as f64,
                    ..m
                })
        })
    }

    /// Approximate length of the whole path, in the path's units.
    pub fn approx_length(&self, steps_per_segment: usize) -> f64 {
        self.beziers()
            .map(|b| b.approx_length(steps_per_segment))
            .sum()
    }

    // ---- MUTATION ----

    pub fn insert_pose(&mut self, index: usize, pose: Pose) -> Result<(), PathError> {
        if index > self.poses.len() {
            return Err(PathError::IndexOutOfRange(index, self.poses.len()));
        }

        self.poses.insert(index, pose);
        self.update_move_switch_perms();

        Ok(())
    }

    pub fn append_pose(&mut self, pose: Pose) {
        self.poses.push(pose);
        self.update_move_switch_perms();
    }

    /// Remove the first pose equal to `pose`. Does nothing if there is no such pose.
    pub fn delete_pose(&mut self, pose: &Pose) -> Option<Pose> {
        let index = self.poses.iter().position(|p| p == pose)?;
        self.delete_pose_at(index)
    }

    pub fn delete_pose_at(&mut self, index: usize) -> Option<Pose> {
        if index >= self.poses.len() {
            return None;
        }

        let pose = self.poses.remove(index);
        self.update_move_switch_perms();

        Some(pose)
    }

    /// Append a pose at `point`, returning its index.
    ///
    /// The first pose gets horizontal handles. Later poses point their enter handle back towards
    /// the previous pose.
    pub fn place_pose(&mut self, point: Point, handle_len: f64, ids: &mut IdGen) -> usize {
        let enter = match self.poses.last() {
            Some(last) => (last.point - point).unit() * handle_len,
            None => Vector::new(-handle_len, 0.0),
        };

        self.append_pose(Pose::new(point, enter, -enter, ids));

        self.poses.len() - 1
    }

    /// Split the segment containing `t` by inserting a new pose at the point on the path at `t`.
    ///
    /// Returns the new pose's index, or `None` if `t` isn't on the path or the new point would be
    /// closer than `min_clearance` to either end of its segment.
    pub fn insert_pose_at(
        &mut self,
        t: f64,
        handle_len: f64,
        min_clearance: f64,
        ids: &mut IdGen,
    ) -> Option<usize> {
        let point = self.point_at(t)?;

        let prev = (t.trunc() as usize).min(self.num_segments() - 1);
        let next = prev + 1;

        let p1 = self.poses[prev].point;
        let p2 = self.poses[next].point;

        if (p1 - point).norm() < min_clearance || (p2 - point).norm() < min_clearance {
            return None;
        }

        let enter = (p1 - p2).unit() * handle_len;

        self.poses.insert(next, Pose::new(point, enter, -enter, ids));
        self.update_move_switch_perms();

        Some(next)
    }

    /// Index of the first pose closer than `radius` to `point`.
    pub fn find_pose_near(&self, point: &Point, radius: f64) -> Option<usize> {
        self.poses
            .iter()
            .position(|p| (p.point - point).norm_squared() < radius * radius)
    }

    /// The first handle whose control point is within `radius_sq` (squared) of `point`. Enter
    /// handles are checked before exit handles of the same pose.
    pub fn find_handle_near(&self, point: &Point, radius_sq: f64) -> Option<HandleHit> {
        self.poses.iter().enumerate().find_map(|(i, p)| {
            if (p.enter_point() - point).norm_squared() < radius_sq {
                Some(HandleHit {
                    pose_index: i,
                    handle: HandleKind::Enter,
                })
            } else if (p.exit_point() - point).norm_squared() < radius_sq {
                Some(HandleHit {
                    pose_index: i,
                    handle: HandleKind::Exit,
                })
            } else {
                None
            }
        })
    }

    /// The last pose always halts, every other pose may switch between halting and driving
    /// through.
    pub fn update_move_switch_perms(&mut self) {
        let num_poses = self.poses.len();

        for (i, pose) in self.poses.iter_mut().enumerate() {
            pose.commands.move_condition_can_switch = i + 1 < num_poses;
        }

        if let Some(last) = self.poses.last_mut() {
            last.commands.move_condition = MoveCondition::Halt;
        }
    }
}
