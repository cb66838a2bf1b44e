//! # Communications interface crate.
//!
//! Provides the file formats exchanged between the path editor, its headless tools, and the
//! robot: the editor export payload, the baked trajectory consumed by the robot, and the command
//! trees attached to both.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command tree definitions shared by waypoints, command points and trajectory chunks
pub mod cmd;

/// Editor export payload (segments, waypoints, rotations, commands)
pub mod export;

/// Baked trajectory chunks for robot playback
pub mod traj;

/// Commands accepted by the headless executables
pub mod tc;
