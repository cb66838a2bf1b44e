//! # Editor export payload
//!
//! The payload written by the editor's export action and read back by import. Segment control
//! points and rotation angles are stored in field units (meters, degrees), never in canvas
//! pixels, so a saved routine is independent of the canvas it was drawn on.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cmd::ActionNode;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Full editor payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    /// One entry per segment, each holding the four control points `[x, y]` in meters
    pub segments: Vec<[[f64; 2]; 4]>,

    /// One entry per pose
    #[serde(default)]
    pub waypoints: Vec<WaypointData>,

    /// Rotation targets, angles relative to `rotation_offset`
    pub rotations: Vec<RotationData>,

    /// Initial heading of the robot in degrees
    #[serde(default)]
    pub rotation_offset: f64,

    /// Command points placed along the path
    #[serde(default)]
    pub commands: Vec<CommandPointData>,
}

/// Per-pose command data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointData {
    pub commands: ActionNode,
    pub shall_halt: bool,
}

/// A rotation target as stored in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationData {
    /// Global path parameter
    pub t: f64,

    /// Angle in degrees, relative to the payload's rotation offset
    pub rot: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPointData {
    pub t: f64,
    pub commands: ActionNode,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Cannot read payload from {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("Cannot write payload to {0:?}: {1}")]
    WriteError(PathBuf, std::io::Error),

    #[error("Payload {0:?} is malformed: {1}")]
    ParseError(PathBuf, serde_json::Error),

    #[error("Cannot serialise payload: {0}")]
    SerialiseError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ExportPayload {
    /// Load a payload from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PayloadError> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path)
            .map_err(|e| PayloadError::ReadError(path.to_path_buf(), e))?;

        serde_json::from_str(&text).map_err(|e| PayloadError::ParseError(path.to_path_buf(), e))
    }

    /// Write the payload to a JSON file, pretty printed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PayloadError> {
        let path = path.as_ref();

        let text = serde_json::to_string_pretty(self).map_err(PayloadError::SerialiseError)?;

        std::fs::write(path, text).map_err(|e| PayloadError::WriteError(path.to_path_buf(), e))
    }
}
