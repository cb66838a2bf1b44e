//! # Routine
//!
//! A complete autonomous routine: the path, its rotation attachments and its command points.
//!
//! Rotations and command points are keyed by path parameter, which shifts whenever poses are
//! inserted or deleted. Structural edits therefore go through [`Routine`], which records where
//! every attachment sits before the edit and re-resolves them against the new path afterwards.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::cmd::ActionNode;
use log::debug;

use crate::{
    command::{snap_to_poses, CommandPointList, IdGen},
    geom::Point,
    params::ExecParams,
    path::{HandleHit, HandleKind, Path, Pose},
    rotation::RotationList,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Routine {
    path: Path,
    rotations: RotationList,
    command_points: CommandPointList,
    ids: IdGen,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Routine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        path: Path,
        rotations: RotationList,
        command_points: CommandPointList,
        ids: IdGen,
    ) -> Self {
        Self {
            path,
            rotations,
            command_points,
            ids,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rotations(&self) -> &RotationList {
        &self.rotations
    }

    pub fn command_points(&self) -> &CommandPointList {
        &self.command_points
    }

    pub fn ids(&self) -> &IdGen {
        &self.ids
    }

    pub fn ids_mut(&mut self) -> &mut IdGen {
        &mut self.ids
    }

    /// Append a pose at `point`. The first pose also creates the initial heading.
    pub fn place_pose(&mut self, point: Point, params: &ExecParams) -> usize {
        let index = self
            .path
            .place_pose(point, params.editor.handle_length_px, &mut self.ids);

        if self.rotations.is_empty() {
            self.rotations.insert_rotation(0.0);
        }
        self.rotations.prune_invalid(&self.path);

        index
    }

    /// Split the path at `t`, see [`Path::insert_pose_at`].
    pub fn insert_pose_at(&mut self, t: f64, params: &ExecParams) -> Option<usize> {
        let editor = &params.editor;

        self.edit_structure(params, |path, ids| {
            path.insert_pose_at(
                t,
                editor.handle_length_px,
                editor.min_insert_clearance_px,
                ids,
            )
        })
    }

    /// Delete the first pose whose robot footprint covers `point`.
    pub fn delete_pose_near(&mut self, point: &Point, params: &ExecParams) -> Option<Pose> {
        let radius = params.field.robot_hit_radius_px(&params.robot);
        let index = self.path.find_pose_near(point, radius)?;

        self.edit_structure(params, |path, _| path.delete_pose_at(index))
    }

    /// The handle under `point`, for dragging with [`Routine::move_handle`].
    pub fn find_handle_near(&self, point: &Point, params: &ExecParams) -> Option<HandleHit> {
        self.path
            .find_handle_near(point, params.editor.handle_hit_radius_sq_px)
    }

    /// Move a pose. Attachments keep their parameter and so move with the path.
    pub fn move_pose(&mut self, index: usize, point: Point) {
        if let Some(pose) = self.path.pose_mut(index) {
            pose.point = point;
        }
    }

    /// Drag a handle's control point to `control_point`, keeping the opposite handle aligned.
    pub fn move_handle(&mut self, hit: HandleHit, control_point: Point) {
        if let Some(pose) = self.path.pose_mut(hit.pose_index) {
            let handle = control_point - pose.point;

            match hit.handle {
                HandleKind::Enter => pose.set_enter_handle(handle),
                HandleKind::Exit => pose.set_exit_handle(handle),
            }
        }
    }

    pub fn toggle_move_condition(&mut self, index: usize) {
        if let Some(pose) = self.path.pose_mut(index) {
            pose.toggle_move_condition();
        }
    }

    /// Attach a new zero heading rotation at the path point nearest to `point`.
    pub fn add_rotation(&mut self, point: &Point, params: &ExecParams) -> Option<usize> {
        let m = self.path.find_t_near_point(
            point,
            params.bake.rotation_reattach_radius_px,
            params.bake.num_samples,
        )?;

        let index = self.rotations.insert_rotation(m.t);
        self.rotations.prune_invalid(&self.path);

        Some(index)
    }

    /// Set the heading of a rotation in radians.
    pub fn set_rotation(&mut self, index: usize, rot_rad: f64) {
        if let Some(r) = self.rotations.get_mut(index) {
            r.set_rot_val(rot_rad);
        }
    }

    pub fn delete_rotation(&mut self, index: usize) {
        if self.rotations.delete_rotation(index).is_some() {
            self.rotations.prune_invalid(&self.path);
        }
    }

    /// Add a command point at the path point nearest to `point`, optionally snapped onto a pose.
    pub fn add_command_point(
        &mut self,
        point: &Point,
        commands: Vec<ActionNode>,
        snap: bool,
        params: &ExecParams,
    ) -> Option<usize> {
        let m = self.path.find_t_near_point(
            point,
            params.bake.command_snap_radius_px,
            params.bake.num_samples,
        )?;

        let t = if snap {
            snap_to_poses(&self.path, m.t)
        } else {
            m.t
        };

        Some(
            self.command_points
                .new_command_point(t, commands, &mut self.ids),
        )
    }

    pub fn delete_command_point(&mut self, index: usize) {
        self.command_points.delete_command_point(index);
    }

    /// Apply a structural edit to the path and re-resolve every attachment afterwards.
    fn edit_structure<T, F>(&mut self, params: &ExecParams, edit: F) -> T
    where
        F: FnOnce(&mut Path, &mut IdGen) -> T,
    {
        let rot_positions = self.rotations.positions(&self.path);
        let cmd_positions = self.command_points.positions(&self.path);

        let result = edit(&mut self.path, &mut self.ids);

        self.rotations.reattach(
            &self.path,
            &rot_positions,
            params.bake.rotation_reattach_radius_px,
            params.bake.num_samples,
        );
        self.rotations.prune_invalid(&self.path);

        self.command_points.reattach(
            &self.path,
            &cmd_positions,
            params.bake.command_snap_radius_px,
            params.bake.num_samples,
        );
        self.command_points.prune_stray(&self.path);

        debug!(
            "Path edited: {} poses, {} rotations, {} command points",
            self.path.len(),
            self.rotations.len(),
            self.command_points.len()
        );

        result
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::{
        field::test::field,
        params::{BakeParams, EditorParams, RobotParams},
    };
    use approx::assert_abs_diff_eq;

    pub(crate) fn params() -> ExecParams {
        ExecParams {
            robot: RobotParams {
                max_velocity_ms: 2.0,
                max_acceleration_mss: 1.0,
                size_x_m: 0.8,
                size_y_m: 0.8,
            },
            field: field(),
            bake: BakeParams::default(),
            editor: EditorParams::default(),
        }
    }

    #[test]
    fn test_first_pose_creates_heading() {
        let mut r = Routine::new();
        let p = params();

        r.place_pose(Point::new(100.0, 100.0), &p);
        assert_eq!(r.rotations().len(), 1);
        assert_eq!(r.rotations().rotations()[0].t, 0.0);

        r.place_pose(Point::new(700.0, 100.0), &p);
        assert_eq!(r.rotations().len(), 1);
        assert_eq!(r.path().len(), 2);
    }

    #[test]
    fn test_insert_keeps_attachments() {
        let mut r = Routine::new();
        let p = params();

        r.place_pose(Point::new(100.0, 100.0), &p);
        r.place_pose(Point::new(700.0, 100.0), &p);

        let rot = r.add_rotation(&Point::new(550.0, 100.0), &p).unwrap();
        r.set_rotation(rot, 1.0);
        r.add_command_point(&Point::new(250.0, 100.0), vec![], false, &p)
            .unwrap();

        assert_eq!(r.insert_pose_at(0.5, &p), Some(1));
        assert_eq!(r.path().len(), 3);

        // Both attachments now sit on different segments but at the same place
        let rot = r.rotations().rotations()[1];
        assert!(rot.t > 1.0);
        assert_eq!(rot.rot, 1.0);
        let pos = r.path().point_at(rot.t).unwrap();
        assert_abs_diff_eq!(pos.x, 550.0, epsilon = 5.0);

        let cmd_t = r.command_points().points()[0].t;
        assert!(cmd_t < 1.0);
        let pos = r.path().point_at(cmd_t).unwrap();
        assert_abs_diff_eq!(pos.x, 250.0, epsilon = 5.0);
    }

    #[test]
    fn test_delete_pose_prunes() {
        let mut r = Routine::new();
        let p = params();

        r.place_pose(Point::new(100.0, 100.0), &p);
        r.place_pose(Point::new(700.0, 100.0), &p);
        r.place_pose(Point::new(700.0, 700.0), &p);

        let on_last_segment = r.path().point_at(1.5).unwrap();
        r.add_rotation(&on_last_segment, &p).unwrap();
        r.add_command_point(&on_last_segment, vec![], false, &p)
            .unwrap();
        assert_eq!(r.rotations().len(), 2);

        // 0.8 m robot at 100 px/m covers 40 px around the pose
        assert!(r.delete_pose_near(&Point::new(745.0, 700.0), &p).is_none());
        let deleted = r.delete_pose_near(&Point::new(730.0, 700.0), &p);
        assert!(deleted.is_some());

        assert_eq!(r.path().len(), 2);
        assert_eq!(r.rotations().len(), 1);
        assert!(r.command_points().is_empty());

        // The new last pose must halt
        assert!(!r.path().poses()[1].can_switch());
    }

    #[test]
    fn test_move_handle() {
        let mut r = Routine::new();
        let p = params();

        r.place_pose(Point::new(100.0, 100.0), &p);

        // Exit control point sits at (200, 100), hit within sqrt(300) px
        assert!(r.find_handle_near(&Point::new(220.0, 100.0), &p).is_none());
        let hit = r.find_handle_near(&Point::new(210.0, 105.0), &p).unwrap();
        assert_eq!(
            hit,
            HandleHit {
                pose_index: 0,
                handle: HandleKind::Exit,
            }
        );

        r.move_handle(hit, Point::new(100.0, 150.0));

        let pose = &r.path().poses()[0];
        assert_abs_diff_eq!(pose.exit_handle.y, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.enter_handle.y, -100.0, epsilon = 1e-12);
    }
}
