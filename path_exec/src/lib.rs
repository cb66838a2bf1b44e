//! # Path library.
//!
//! Geometry, editing model and trajectory baking for autonomous routines. Used by the headless
//! `path_exec` executable and available to any other crate in the workspace.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory baking - converts a routine into velocity profiled chunks
pub mod bake;

/// Command points and node id generation
pub mod command;

/// Export payload conversion and trajectory output
pub mod export;

/// Field dimensions and canvas/meter conversion
pub mod field;

/// Points, vectors and cubic Beziers
pub mod geom;

/// Executable parameters
pub mod params;

/// The composite Bezier path and its poses
pub mod path;

/// Heading targets attached to the path
pub mod rotation;

/// A full routine, keeping path, rotations and command points consistent through edits
pub mod routine;
