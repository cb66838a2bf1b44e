//! # Baked trajectory
//!
//! The output of baking: a list of evenly spaced chunks, each with a position in meters, a
//! heading, a target velocity and the path parameter it was sampled at.

use serde::{Deserialize, Serialize};

use crate::cmd::ActionNode;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// One sample of a baked trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajChunk {
    /// Whether the robot must be stationary at this chunk
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,

    /// Position in meters, Y up
    pub x: f64,
    pub y: f64,

    /// Heading in radians
    pub rot: f64,

    /// Target velocity in meters per second
    pub vel: f64,

    /// Global path parameter the chunk was sampled at
    pub t: f64,

    /// Commands to start when the robot reaches this chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<ActionNode>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Stop,
    Cruise,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TrajChunk {
    pub fn is_stop(&self) -> bool {
        self.chunk_type == ChunkType::Stop
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_chunk_json() {
        let chunk = TrajChunk {
            chunk_type: ChunkType::Stop,
            x: 1.0,
            y: 2.0,
            rot: 0.5,
            vel: 0.0,
            t: 0.0,
            commands: None,
        };

        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["type"], "stop");
        assert!(json.get("commands").is_none());

        let back: TrajChunk = serde_json::from_value(json).unwrap();
        assert!(back.is_stop());
    }
}
