//! # Trajectory baking
//!
//! Converts a routine into the evenly spaced, velocity profiled chunks played back by the robot:
//!
//! 1. Resample the path at roughly uniform arc length ([`resample`]).
//! 2. Give each sample the heading of the latest rotation before it ([`heading`]).
//! 3. Mark stops and attach commands.
//! 4. Convert positions to field meters, Y up.
//! 5. Compute the velocity profile ([`velocity`]).
//!
//! Baking never fails on numerical trouble. Searches that don't converge or can't find the path
//! are logged and the best available value is used.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod heading;
pub mod resample;
pub mod velocity;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    cmd::{ActionNode, SEQUENCE},
    traj::{ChunkType, TrajChunk},
};
use log::info;

use crate::{
    command::{CommandPointList, IdGen},
    geom::Point,
    params::ExecParams,
    path::Path,
    routine::Routine,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    #[error("A path needs at least 2 poses to be baked, found {0}")]
    NotEnoughPoses(usize),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Bake a routine into trajectory chunks.
///
/// `params` must have been validated.
pub fn bake(routine: &Routine, params: &ExecParams) -> Result<Vec<TrajChunk>, BakeError> {
    let path = routine.path();

    if !path.has_bezier() {
        return Err(BakeError::NotEnoughPoses(path.len()));
    }

    let samples = resample::resample(path, &params.field, &params.bake);
    let headings = heading::assign_headings(path, &samples, routine.rotations(), &params.bake);

    let mut chunks: Vec<TrajChunk> = samples
        .iter()
        .zip(headings)
        .map(|(s, rot)| TrajChunk {
            chunk_type: ChunkType::Cruise,
            x: s.point.x,
            y: s.point.y,
            rot,
            vel: 0.0,
            t: s.t,
            commands: None,
        })
        .collect();

    // Wrapper groups created while merging must not collide with the routine's own ids
    let mut ids = routine.ids().clone();

    mark_stops(path, &mut chunks);
    attach_commands(path, routine.command_points(), &mut chunks, &mut ids);

    for chunk in chunks.iter_mut() {
        let m = params
            .field
            .canvas_to_meters(&Point::new(chunk.x, chunk.y));
        chunk.x = m.x;
        chunk.y = m.y;
    }

    velocity::apply_velocity_profile(&mut chunks, &params.robot);

    info!(
        "Baked {} poses into {} chunks ({} stops, {} with commands), peak velocity {:.2} m/s",
        path.len(),
        chunks.len(),
        chunks.iter().filter(|c| c.is_stop()).count(),
        chunks.iter().filter(|c| c.commands.is_some()).count(),
        chunks.iter().map(|c| c.vel).fold(0.0, f64::max)
    );

    Ok(chunks)
}

/// Index of the chunk whose `t` is nearest to `t`, earlier chunks winning ties.
///
/// Chunks must be in ascending `t` order.
pub fn nearest_chunk(chunks: &[TrajChunk], t: f64) -> Option<usize> {
    if chunks.is_empty() {
        return None;
    }

    let idx = chunks.partition_point(|c| c.t < t);

    Some(match idx {
        0 => 0,
        i if i >= chunks.len() => chunks.len() - 1,
        i => {
            if (chunks[i].t - t).abs() < (t - chunks[i - 1].t).abs() {
                i
            } else {
                i - 1
            }
        }
    })
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Stop at every pose that halts, the ends of the path included.
fn mark_stops(path: &Path, chunks: &mut [TrajChunk]) {
    for (i, pose) in path.poses().iter().enumerate() {
        if !pose.shall_halt() {
            continue;
        }

        if let Some(idx) = nearest_chunk(chunks, i as f64) {
            chunks[idx].chunk_type = ChunkType::Stop;
        }
    }
}

/// Attach non-empty pose command trees and command points to their nearest chunks.
fn attach_commands(
    path: &Path,
    command_points: &CommandPointList,
    chunks: &mut [TrajChunk],
    ids: &mut IdGen,
) {
    let pose_cmds = path
        .poses()
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, &p.commands.root_node));
    let point_cmds = command_points.points().iter().map(|c| (c.t, &c.commands));

    for (t, node) in pose_cmds.chain(point_cmds) {
        if node.is_empty() {
            continue;
        }

        if let Some(idx) = nearest_chunk(chunks, t) {
            merge_commands(&mut chunks[idx].commands, node, ids);
        }
    }
}

/// Add `node` to a chunk's commands so that it runs after the ones already there.
///
/// A second tree becomes a child of the first tree's root group. A bare command is wrapped
/// together with `node` in a new `sequence` group.
fn merge_commands(commands: &mut Option<ActionNode>, node: &ActionNode, ids: &mut IdGen) {
    match commands.take() {
        Some(mut existing) if existing.is_group() => {
            existing.children.push(node.clone());
            *commands = Some(existing);
        }
        Some(existing) => {
            *commands = Some(ActionNode::group(
                SEQUENCE,
                vec![existing, node.clone()],
                ids.next_id(),
            ));
        }
        None => *commands = Some(node.clone()),
    }
}
