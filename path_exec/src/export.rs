//! # Export and import
//!
//! Conversion between a [`Routine`] (canvas pixels, radians) and the [`ExportPayload`] file
//! format (field meters, degrees relative to the initial heading), and output of baked
//! trajectories.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs::File,
    io::Write,
    path::{Path as FsPath, PathBuf},
};

use comms_if::{
    export::{CommandPointData, ExportPayload, PayloadError, RotationData, WaypointData},
    traj::{ChunkType, TrajChunk},
};
use log::{info, warn};
use serde::Serialize;

use crate::{
    command::{CommandPoint, CommandPointList, IdGen},
    field::FieldDims,
    geom::Point,
    path::{MoveCondition, Path, Pose},
    rotation::{Rotation, RotationList},
    routine::Routine,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest gap in meters allowed between the end of one segment and the start of the next.
const SEGMENT_JOIN_TOLERANCE_M: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Flat row of the CSV trajectory format.
#[derive(Serialize)]
struct CsvChunk {
    #[serde(rename = "type")]
    chunk_type: ChunkType,
    x: f64,
    y: f64,
    rot: f64,
    vel: f64,
    t: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Segment {0} doesn't start where segment {1} ends")]
    SegmentsNotJoined(usize, usize),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Cannot write trajectory to {0:?}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Cannot serialise trajectory: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot write trajectory CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the export payload of a routine.
///
/// Paths with fewer than two poses have no segments, so nothing but the rotation offset is
/// exported for them.
pub fn export_routine(routine: &Routine, field: &FieldDims) -> ExportPayload {
    let path = routine.path();
    let offset_deg = routine.rotations().initial_heading().to_degrees();

    let mut payload = ExportPayload {
        segments: Vec::new(),
        waypoints: Vec::new(),
        rotations: Vec::new(),
        rotation_offset: offset_deg,
        commands: Vec::new(),
    };

    if !path.has_bezier() {
        return payload;
    }

    let to_array = |p: Point| {
        let m = field.canvas_to_meters(&p);
        [m.x, m.y]
    };

    payload.segments = path
        .beziers()
        .map(|b| [to_array(b.a), to_array(b.b), to_array(b.c), to_array(b.d)])
        .collect();

    payload.waypoints = path
        .poses()
        .iter()
        .map(|p| WaypointData {
            commands: p.commands.root_node.clone(),
            shall_halt: p.shall_halt(),
        })
        .collect();

    payload.rotations = routine
        .rotations()
        .sorted()
        .iter()
        .map(|r| RotationData {
            t: r.t,
            rot: r.rot.to_degrees() - offset_deg,
        })
        .collect();

    payload.commands = routine
        .command_points()
        .points()
        .iter()
        .map(|c| CommandPointData {
            t: c.t,
            commands: c.commands.clone(),
        })
        .collect();

    payload
}

/// Rebuild a routine from an export payload.
///
/// Handles are recovered from the control points of the segments either side of each pose. The
/// first pose's enter handle and the last pose's exit handle mirror their other handle.
pub fn import_routine(payload: &ExportPayload, field: &FieldDims) -> Result<Routine, ExportError> {
    let mut ids = IdGen::new();

    let to_canvas = |p: &[f64; 2]| field.meters_to_canvas(&Point::new(p[0], p[1]));

    // Segments must join end to start
    for (i, w) in payload.segments.windows(2).enumerate() {
        let end = w[0][3];
        let start = w[1][0];

        if (end[0] - start[0]).hypot(end[1] - start[1]) > SEGMENT_JOIN_TOLERANCE_M {
            return Err(ExportError::SegmentsNotJoined(i + 1, i));
        }
    }

    let segments: Vec<[Point; 4]> = payload
        .segments
        .iter()
        .map(|s| {
            [
                to_canvas(&s[0]),
                to_canvas(&s[1]),
                to_canvas(&s[2]),
                to_canvas(&s[3]),
            ]
        })
        .collect();

    let mut poses = Vec::with_capacity(segments.len() + 1);

    if let Some(first) = segments.first() {
        let exit = first[1] - first[0];
        poses.push(Pose::new(first[0], -exit, exit, &mut ids));
    }

    for (i, seg) in segments.iter().enumerate() {
        let point = seg[3];
        let enter = seg[2] - point;
        let exit = match segments.get(i + 1) {
            Some(next) => next[1] - point,
            None => -enter,
        };

        poses.push(Pose::new(point, enter, exit, &mut ids));
    }

    // Per pose commands
    if !payload.waypoints.is_empty() && payload.waypoints.len() != poses.len() {
        warn!(
            "Payload has {} waypoints for {} poses, applying them in order",
            payload.waypoints.len(),
            poses.len()
        );
    }

    for (pose, wp) in poses.iter_mut().zip(payload.waypoints.iter()) {
        ids.observe(&wp.commands);
        pose.commands.root_node = wp.commands.clone();
        pose.commands.move_condition = if wp.shall_halt {
            MoveCondition::Halt
        } else {
            MoveCondition::Go
        };
    }

    let path = Path::from_poses(poses);

    // Rotations, back to absolute radians
    let mut rotations = RotationList::from_rotations(
        payload
            .rotations
            .iter()
            .map(|r| Rotation {
                t: r.t,
                rot: (r.rot + payload.rotation_offset).to_radians(),
            })
            .collect(),
    );

    if rotations.is_empty() {
        rotations.set_initial_heading_deg(payload.rotation_offset);
    }
    rotations.prune_invalid(&path);

    // Command points
    let mut command_points = CommandPointList::new();
    for c in &payload.commands {
        ids.observe(&c.commands);
        command_points.push(CommandPoint {
            t: c.t,
            commands: c.commands.clone(),
        });
    }
    command_points.prune_stray(&path);

    info!(
        "Imported routine with {} poses, {} rotations and {} command points",
        path.len(),
        rotations.len(),
        command_points.len()
    );

    Ok(Routine::from_parts(path, rotations, command_points, ids))
}

/// Write trajectory chunks as CSV with a `type,x,y,rot,vel,t` header. Commands are not included.
pub fn write_chunks_csv<W: Write>(chunks: &[TrajChunk], writer: W) -> Result<(), ExportError> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for c in chunks {
        w.serialize(CsvChunk {
            chunk_type: c.chunk_type,
            x: c.x,
            y: c.y,
            rot: c.rot,
            vel: c.vel,
            t: c.t,
        })?;
    }

    w.flush()
        .map_err(|e| ExportError::Io(PathBuf::from("<csv>"), e))
}

/// Save trajectory chunks, as CSV if `path` ends in `.csv` and as pretty JSON otherwise.
pub fn save_chunks<P: AsRef<FsPath>>(chunks: &[TrajChunk], path: P) -> Result<(), ExportError> {
    let path = path.as_ref();

    let file = File::create(path).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;

    let is_csv = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_chunks_csv(chunks, file)
    } else {
        serde_json::to_writer_pretty(file, chunks).map_err(ExportError::from)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{field::test::field, routine::test::params};
    use approx::assert_abs_diff_eq;
    use comms_if::cmd::ActionNode;

    fn routine() -> Routine {
        let p = params();
        let mut r = Routine::new();

        r.place_pose(Point::new(100.0, 100.0), &p);
        r.place_pose(Point::new(600.0, 200.0), &p);
        r.place_pose(Point::new(300.0, 600.0), &p);
        r.toggle_move_condition(1);

        r.set_rotation(0, 30f64.to_radians());
        let rot_at = r.path().point_at(1.5).unwrap();
        let i = r.add_rotation(&rot_at, &p).unwrap();
        r.set_rotation(i, -45f64.to_radians());

        let cmd_at = r.path().point_at(0.5).unwrap();
        r.add_command_point(&cmd_at, vec![ActionNode::command("intake", 500)], false, &p)
            .unwrap();

        r
    }

    #[test]
    fn test_export_format() {
        let r = routine();
        let payload = export_routine(&r, &field());

        assert_eq!(payload.segments.len(), 2);
        assert_eq!(payload.waypoints.len(), 3);
        assert_eq!(payload.commands.len(), 1);

        // First control point in meters with Y flipped
        assert_abs_diff_eq!(payload.segments[0][0][0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(payload.segments[0][0][1], 7.0, epsilon = 1e-12);

        // Rotations relative to the initial heading
        assert_abs_diff_eq!(payload.rotation_offset, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(payload.rotations[0].rot, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(payload.rotations[1].rot, -75.0, epsilon = 1e-9);

        assert!(payload.waypoints[0].shall_halt);
        assert!(!payload.waypoints[1].shall_halt);
        assert!(payload.waypoints[2].shall_halt);
    }

    #[test]
    fn test_round_trip() {
        let r = routine();
        let payload = export_routine(&r, &field());
        let back = import_routine(&payload, &field()).unwrap();

        assert_eq!(back.path().len(), r.path().len());
        for (a, b) in r.path().poses().iter().zip(back.path().poses()) {
            assert_abs_diff_eq!(a.point.x, b.point.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.point.y, b.point.y, epsilon = 1e-9);
            assert_abs_diff_eq!(a.enter_handle.x, b.enter_handle.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.enter_handle.y, b.enter_handle.y, epsilon = 1e-9);
            assert_abs_diff_eq!(a.exit_handle.x, b.exit_handle.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.exit_handle.y, b.exit_handle.y, epsilon = 1e-9);
            assert_eq!(a.commands.move_condition, b.commands.move_condition);
        }

        let orig = r.rotations().sorted();
        let got = back.rotations().sorted();
        assert_eq!(orig.len(), got.len());
        for (a, b) in orig.iter().zip(got.iter()) {
            assert_abs_diff_eq!(a.t, b.t, epsilon = 1e-12);
            assert_abs_diff_eq!(a.rot, b.rot, epsilon = 1e-9);
        }

        assert_eq!(back.command_points().len(), 1);
        assert!(back.command_points().points()[0]
            .commands
            .find_node(500)
            .is_some());
    }

    #[test]
    fn test_import_ids_dont_collide() {
        let payload = export_routine(&routine(), &field());
        let mut back = import_routine(&payload, &field()).unwrap();

        assert!(back.ids_mut().next_id() > 500);
    }

    #[test]
    fn test_import_rejects_gaps() {
        let mut payload = export_routine(&routine(), &field());
        payload.segments[1][0][0] += 0.5;

        assert!(matches!(
            import_routine(&payload, &field()),
            Err(ExportError::SegmentsNotJoined(1, 0))
        ));
    }

    #[test]
    fn test_export_empty() {
        let payload = export_routine(&Routine::new(), &field());
        assert!(payload.segments.is_empty());

        let back = import_routine(&payload, &field()).unwrap();
        assert!(back.path().is_empty());
        assert_eq!(back.rotations().len(), 1);
    }

    #[test]
    fn test_csv_output() {
        let chunks = vec![
            TrajChunk {
                chunk_type: ChunkType::Stop,
                x: 1.0,
                y: 2.0,
                rot: 0.0,
                vel: 0.0,
                t: 0.0,
                commands: Some(ActionNode::command("intake", 1)),
            },
            TrajChunk {
                chunk_type: ChunkType::Cruise,
                x: 1.1,
                y: 2.0,
                rot: 0.5,
                vel: 0.4,
                t: 0.05,
                commands: None,
            },
        ];

        let mut buf = Vec::new();
        write_chunks_csv(&chunks, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "type,x,y,rot,vel,t");
        assert_eq!(lines[1], "stop,1.0,2.0,0.0,0.0,0.0");
        assert_eq!(lines.len(), 3);
    }
}
