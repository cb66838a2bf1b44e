//! # Pose
//!
//! A waypoint on the path, its two Bezier handles, and the commands the robot runs there.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::cmd::{ActionNode, SEQUENCE};

use crate::{
    command::IdGen,
    geom::{Point, Vector, VectorExt},
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A waypoint.
///
/// The handles are offsets from `point`, so `point + exit_handle` is the second control point of
/// the segment leaving this pose and `point + enter_handle` the third control point of the
/// segment arriving at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub point: Point,
    pub enter_handle: Vector,
    pub exit_handle: Vector,
    pub commands: PoseCommandGroup,
}

/// Commands attached to a pose, and whether the robot stops there.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseCommandGroup {
    /// Only the last pose is forbidden from switching, the robot always halts at the end
    pub move_condition_can_switch: bool,

    pub move_condition: MoveCondition,

    pub root_node: ActionNode,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveCondition {
    /// Stop at the pose while its commands run
    Halt,

    /// Drive through the pose, starting its commands on the way
    Go,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(point: Point, enter_handle: Vector, exit_handle: Vector, ids: &mut IdGen) -> Self {
        Self {
            point,
            enter_handle,
            exit_handle,
            commands: PoseCommandGroup::new(ids.next_id()),
        }
    }

    /// Absolute position of the enter control point.
    pub fn enter_point(&self) -> Point {
        self.point + self.enter_handle
    }

    /// Absolute position of the exit control point.
    pub fn exit_point(&self) -> Point {
        self.point + self.exit_handle
    }

    pub fn can_switch(&self) -> bool {
        self.commands.move_condition_can_switch
    }

    pub fn shall_halt(&self) -> bool {
        self.commands.move_condition == MoveCondition::Halt
    }

    /// Swap between halting and driving through, if this pose is allowed to switch.
    pub fn toggle_move_condition(&mut self) {
        if !self.commands.move_condition_can_switch {
            return;
        }

        self.commands.move_condition = match self.commands.move_condition {
            MoveCondition::Halt => MoveCondition::Go,
            MoveCondition::Go => MoveCondition::Halt,
        };
    }

    /// Set the enter handle, turning the exit handle to stay opposite while keeping its length.
    pub fn set_enter_handle(&mut self, enter: Vector) {
        self.exit_handle = -enter.unit() * self.exit_handle.norm();
        self.enter_handle = enter;
    }

    /// Set the exit handle, turning the enter handle to stay opposite while keeping its length.
    pub fn set_exit_handle(&mut self, exit: Vector) {
        self.enter_handle = -exit.unit() * self.enter_handle.norm();
        self.exit_handle = exit;
    }
}

impl PoseCommandGroup {
    /// An empty group that halts, with a `sequence` root node.
    pub fn new(root_id: u64) -> Self {
        Self {
            move_condition_can_switch: false,
            move_condition: MoveCondition::Halt,
            root_node: ActionNode::group(SEQUENCE, Vec::new(), root_id),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_toggle_move_condition() {
        let mut ids = IdGen::new();
        let mut pose = Pose::new(
            Point::new(0.0, 0.0),
            Vector::new(-100.0, 0.0),
            Vector::new(100.0, 0.0),
            &mut ids,
        );

        // New poses can't switch until the path grants permission
        assert!(pose.shall_halt());
        pose.toggle_move_condition();
        assert!(pose.shall_halt());

        pose.commands.move_condition_can_switch = true;
        pose.toggle_move_condition();
        assert_eq!(pose.commands.move_condition, MoveCondition::Go);
        pose.toggle_move_condition();
        assert_eq!(pose.commands.move_condition, MoveCondition::Halt);
    }

    #[test]
    fn test_set_handles() {
        let mut ids = IdGen::new();
        let mut pose = Pose::new(
            Point::new(10.0, 10.0),
            Vector::new(-100.0, 0.0),
            Vector::new(50.0, 0.0),
            &mut ids,
        );

        pose.set_enter_handle(Vector::new(0.0, 30.0));
        assert_eq!(pose.enter_point(), Point::new(10.0, 40.0));
        assert_abs_diff_eq!(pose.exit_handle.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.exit_handle.y, -50.0, epsilon = 1e-12);

        pose.set_exit_handle(Vector::new(20.0, 0.0));
        assert_abs_diff_eq!(pose.enter_handle.x, -30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.exit_point().x, 30.0, epsilon = 1e-12);
    }
}
