//! # Command points
//!
//! Command trees attached to arbitrary places on the path rather than to poses, together with
//! the id generator shared by every command tree in a routine.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::cmd::{ActionNode, SEQUENCE};
use log::debug;

use crate::{
    geom::Point,
    path::Path,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Command points this close (in path parameter) to a pose snap onto it.
pub const POSE_SNAP_TOLERANCE: f64 = 0.05;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Generates node ids, unique for the lifetime of the generator.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    next: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandPoint {
    /// Global path parameter
    pub t: f64,

    /// Root of the command tree, always a `sequence` group
    pub commands: ActionNode,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandPointList {
    points: Vec<CommandPoint>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure future ids don't collide with any in `node`, used after importing trees.
    pub fn observe(&mut self, node: &ActionNode) {
        self.next = self.next.max(node.node_id + 1);

        for child in &node.children {
            self.observe(child);
        }
    }
}

impl CommandPointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CommandPoint] {
        &self.points
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CommandPoint> {
        self.points.get_mut(index)
    }

    /// Add a command point at `t`, wrapping `commands` in a new `sequence` group. Returns the
    /// index of the new point.
    pub fn new_command_point(
        &mut self,
        t: f64,
        commands: Vec<ActionNode>,
        ids: &mut IdGen,
    ) -> usize {
        self.points.push(CommandPoint {
            t,
            commands: ActionNode::group(SEQUENCE, commands, ids.next_id()),
        });

        self.points.len() - 1
    }

    /// Add an already built command point, used when importing.
    pub fn push(&mut self, point: CommandPoint) {
        self.points.push(point);
    }

    pub fn delete_command_point(&mut self, index: usize) -> Option<CommandPoint> {
        if index < self.points.len() {
            Some(self.points.remove(index))
        } else {
            None
        }
    }

    /// Move a point to a new parameter value. Moves to `t <= 0` are ignored.
    pub fn move_command_point(&mut self, index: usize, t: f64) {
        if t <= 0.0 {
            return;
        }

        if let Some(p) = self.points.get_mut(index) {
            p.t = t;
        }
    }

    /// Remove points whose `t` no longer lies on `path`.
    pub fn prune_stray(&mut self, path: &Path) {
        let before = self.points.len();

        self.points.retain(|p| path.point_at(p.t).is_some());

        if self.points.len() != before {
            debug!("Pruned {} stray command points", before - self.points.len());
        }
    }

    /// The first point whose position on `path` is within `radius` of `point`.
    pub fn find_near(&self, path: &Path, point: &Point, radius: f64) -> Option<usize> {
        self.points.iter().position(|p| {
            path.point_at(p.t)
                .map_or(false, |pos| (pos - point).norm() <= radius)
        })
    }

    pub fn positions(&self, path: &Path) -> Vec<Option<Point>> {
        self.points.iter().map(|p| path.point_at(p.t)).collect()
    }

    /// Resolve each point's `t` from its position captured before an edit, dropping points that
    /// can't be found within `max_dist` of the new path.
    pub fn reattach(
        &mut self,
        path: &Path,
        positions: &[Option<Point>],
        max_dist: f64,
        num_samples: usize,
    ) {
        let old = std::mem::take(&mut self.points);

        self.points = old
            .into_iter()
            .zip(positions.iter())
            .filter_map(|(mut cmd_pt, pos)| {
                let m = path.find_t_near_point(pos.as_ref()?, max_dist, num_samples)?;
                cmd_pt.t = m.t;
                Some(cmd_pt)
            })
            .collect();
    }
}

/// Snap `t` onto the nearest pose if it is within [`POSE_SNAP_TOLERANCE`] of it.
pub fn snap_to_poses(path: &Path, t: f64) -> f64 {
    let nearest = t.round();

    match path.end_t() {
        Some(end_t) if nearest <= end_t && (t - nearest).abs() < POSE_SNAP_TOLERANCE => nearest,
        _ => t,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::straight;

    #[test]
    fn test_id_gen() {
        let mut ids = IdGen::new();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);

        ids.observe(&ActionNode::group(
            SEQUENCE,
            vec![ActionNode::command("intake", 41)],
            7,
        ));
        assert_eq!(ids.next_id(), 42);
    }

    #[test]
    fn test_command_points() {
        let path = straight();
        let mut ids = IdGen::new();
        let mut list = CommandPointList::new();

        let i = list.new_command_point(0.5, vec![ActionNode::command("shoot", 100)], &mut ids);
        assert_eq!(list.points()[i].commands.name, SEQUENCE);
        assert!(list.points()[i].commands.find_node(100).is_some());

        list.new_command_point(3.0, vec![], &mut ids);

        // Moves to the start are ignored
        list.move_command_point(0, 0.0);
        assert_eq!(list.points()[0].t, 0.5);
        list.move_command_point(0, 0.25);
        assert_eq!(list.points()[0].t, 0.25);

        assert_eq!(list.find_near(&path, &Point::new(1000.0, 0.0), 10.0), None);

        list.prune_stray(&path);
        assert_eq!(list.len(), 1);

        assert!(list.delete_command_point(3).is_none());
        assert!(list.delete_command_point(0).is_some());
        assert!(list.is_empty());
    }

    #[test]
    fn test_find_near() {
        let path = straight();
        let mut ids = IdGen::new();
        let mut list = CommandPointList::new();
        list.new_command_point(0.5, vec![], &mut ids);

        assert_eq!(list.find_near(&path, &Point::new(150.0, 8.0), 10.0), Some(0));
        assert_eq!(list.find_near(&path, &Point::new(150.0, 12.0), 10.0), None);
    }

    #[test]
    fn test_reattach_sample_count() {
        let path = straight();
        let mut ids = IdGen::new();
        let mut list = CommandPointList::new();
        list.new_command_point(0.4, vec![], &mut ids);

        let positions = vec![Some(Point::new(150.0, 0.0))];

        // Three samples land exactly on the midpoint
        list.reattach(&path, &positions, 200.0, 3);
        assert_eq!(list.points()[0].t, 0.5);

        // Two samples only see the ends, the first one wins the tie
        list.reattach(&path, &positions, 200.0, 2);
        assert_eq!(list.points()[0].t, 0.0);

        // Out of reach points are dropped
        list.reattach(&path, &[Some(Point::new(150.0, 500.0))], 200.0, 3);
        assert!(list.is_empty());
    }

    #[test]
    fn test_snap_to_poses() {
        let path = straight();

        assert_eq!(snap_to_poses(&path, 0.96), 1.0);
        assert_eq!(snap_to_poses(&path, 0.03), 0.0);
        assert_eq!(snap_to_poses(&path, 0.5), 0.5);
        assert_eq!(snap_to_poses(&path, 1.98), 1.98);
    }
}
