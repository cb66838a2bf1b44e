//! # Path executable parameters
//!
//! Loaded from `params/path_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::field::FieldDims;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    pub robot: RobotParams,
    pub field: FieldDims,
    pub bake: BakeParams,
    pub editor: EditorParams,
}

/// Kinematic limits and footprint of the robot.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotParams {
    pub max_velocity_ms: f64,
    pub max_acceleration_mss: f64,
    pub size_x_m: f64,
    pub size_y_m: f64,
}

/// Parameters for trajectory baking.
#[derive(Debug, Clone, Deserialize)]
pub struct BakeParams {
    /// Target distance between chunks
    pub chunk_spacing_m: f64,

    /// Accepted relative error on the chunk spacing, 0.1 accepts +/- 10%
    pub spacing_tolerance: f64,

    /// Maximum refinement iterations per chunk for whole-segment steps
    pub max_iters_main: usize,

    /// Maximum refinement iterations per chunk in the final partial segment
    pub max_iters_tail: usize,

    /// The tail sweep stops this far (in path parameter) from the end, the final chunk is then
    /// placed exactly at the end
    pub tail_cutoff_t: f64,

    /// Search radius used to find the path parameter of each chunk
    pub heading_search_radius_px: f64,

    /// Search radius used to re-attach rotations after an edit
    pub rotation_reattach_radius_px: f64,

    /// Search radius used to re-attach command points after an edit
    pub command_snap_radius_px: f64,

    /// Number of samples per segment in nearest point searches
    pub num_samples: usize,

    /// Abort sampling after this many chunks
    pub max_chunks: usize,
}

/// Editing behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct EditorParams {
    pub handle_length_px: f64,
    pub min_insert_clearance_px: f64,
    pub handle_hit_radius_sq_px: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Parameter {0} must be positive, found {1}")]
    NotPositive(&'static str, f64),

    #[error("Parameter {0} must be at least {1}, found {2}")]
    TooSmall(&'static str, usize, usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ExecParams {
    /// Check every value that the baking engine divides by or iterates on.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let positive = [
            ("robot.max_velocity_ms", self.robot.max_velocity_ms),
            ("robot.max_acceleration_mss", self.robot.max_acceleration_mss),
            ("field.x_m", self.field.x_m),
            ("field.y_m", self.field.y_m),
            ("field.x_px", self.field.x_px),
            ("field.y_px", self.field.y_px),
            ("bake.chunk_spacing_m", self.bake.chunk_spacing_m),
            ("bake.spacing_tolerance", self.bake.spacing_tolerance),
            ("bake.tail_cutoff_t", self.bake.tail_cutoff_t),
            ("bake.heading_search_radius_px", self.bake.heading_search_radius_px),
        ];

        for (name, value) in positive.iter() {
            if !(*value > 0.0) {
                return Err(ParamsError::NotPositive(*name, *value));
            }
        }

        if self.bake.num_samples < 2 {
            return Err(ParamsError::TooSmall("bake.num_samples", 2, self.bake.num_samples));
        }
        if self.bake.max_iters_main < 1 {
            return Err(ParamsError::TooSmall(
                "bake.max_iters_main",
                1,
                self.bake.max_iters_main,
            ));
        }
        if self.bake.max_iters_tail < 1 {
            return Err(ParamsError::TooSmall(
                "bake.max_iters_tail",
                1,
                self.bake.max_iters_tail,
            ));
        }

        Ok(())
    }
}

impl Default for BakeParams {
    fn default() -> Self {
        Self {
            chunk_spacing_m: 0.1,
            spacing_tolerance: 0.1,
            max_iters_main: 20,
            max_iters_tail: 15,
            tail_cutoff_t: 0.05,
            heading_search_radius_px: 50.0,
            rotation_reattach_radius_px: 70.0,
            command_snap_radius_px: 30.0,
            num_samples: 128,
            max_chunks: 100_000,
        }
    }
}

impl Default for EditorParams {
    fn default() -> Self {
        Self {
            handle_length_px: 100.0,
            min_insert_clearance_px: 100.0,
            handle_hit_radius_sq_px: 300.0,
        }
    }
}
