//! # Velocity profile
//!
//! Chunks start at the robot's maximum velocity (zero for stops), are then limited by how fast
//! the robot can accelerate from the previous chunk, and finally by how fast it can decelerate
//! into the next one. The backward pass is the forward pass run over the reversed chunks.
//!
//! Distances are the per-step Euclidean distances between chunk positions in meters.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::traj::TrajChunk;
use util::maths::clamp;

use crate::params::RobotParams;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Velocity reachable after accelerating at the robot's limit over `distance_m`, starting at
/// `current_vel_ms`, capped at the maximum velocity.
pub fn distance_to_velocity(robot: &RobotParams, distance_m: f64, current_vel_ms: f64) -> f64 {
    robot.max_velocity_ms.min(
        (current_vel_ms.powi(2) + 2.0 * robot.max_acceleration_mss * distance_m).sqrt(),
    )
}

/// Run all three passes over `chunks`, whose positions must already be in meters.
pub fn apply_velocity_profile(chunks: &mut [TrajChunk], robot: &RobotParams) {
    init_velocities(chunks, robot);
    limit_acceleration(chunks.iter_mut(), robot);
    limit_acceleration(chunks.iter_mut().rev(), robot);
}

/// Set every chunk to the maximum velocity, or zero for stops.
pub fn init_velocities(chunks: &mut [TrajChunk], robot: &RobotParams) {
    for chunk in chunks {
        chunk.vel = if chunk.is_stop() {
            0.0
        } else {
            robot.max_velocity_ms
        };
    }
}

/// Limit each chunk's velocity to what is reachable from the one before it in iteration order.
///
/// Stops hold the robot at rest. A first chunk that isn't a stop keeps its velocity, the robot
/// enters the trajectory already moving.
pub fn limit_acceleration<'a, I>(chunks: I, robot: &RobotParams)
where
    I: Iterator<Item = &'a mut TrajChunk>,
{
    let mut prev: Option<(f64, f64, f64)> = None;

    for chunk in chunks {
        if chunk.is_stop() {
            chunk.vel = 0.0;
        } else if let Some((x, y, prev_vel)) = prev {
            let distance_m = (chunk.x - x).hypot(chunk.y - y);

            chunk.vel = clamp(
                &chunk.vel,
                &0.0,
                &distance_to_velocity(robot, distance_m, prev_vel),
            );
        }

        prev = Some((chunk.x, chunk.y, chunk.vel));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use comms_if::traj::ChunkType;

    fn robot() -> RobotParams {
        RobotParams {
            max_velocity_ms: 2.0,
            max_acceleration_mss: 1.0,
            size_x_m: 0.8,
            size_y_m: 0.8,
        }
    }

    /// Chunks along the X axis at the given positions
    fn chunks(xs: &[f64], stops: &[usize]) -> Vec<TrajChunk> {
        xs.iter()
            .enumerate()
            .map(|(i, &x)| TrajChunk {
                chunk_type: if stops.contains(&i) {
                    ChunkType::Stop
                } else {
                    ChunkType::Cruise
                },
                x,
                y: 0.0,
                rot: 0.0,
                vel: 0.0,
                t: i as f64,
                commands: None,
            })
            .collect()
    }

    #[test]
    fn test_distance_to_velocity() {
        assert_abs_diff_eq!(distance_to_velocity(&robot(), 0.5, 0.0), 1.0);
        assert_abs_diff_eq!(distance_to_velocity(&robot(), 10.0, 0.0), 2.0);
        assert_abs_diff_eq!(distance_to_velocity(&robot(), 0.0, 1.5), 1.5);
    }

    #[test]
    fn test_profile_between_stops() {
        let xs: Vec<f64> = (0..=40).map(|i| i as f64 * 0.1).collect();
        let mut c = chunks(&xs, &[0, 20, 40]);

        apply_velocity_profile(&mut c, &robot());

        for (i, chunk) in c.iter().enumerate() {
            assert!(chunk.vel >= 0.0 && chunk.vel <= 2.0);

            // Reachable from the nearest stop
            let d = (chunk.x - 0.0)
                .abs()
                .min((chunk.x - 2.0).abs())
                .min((chunk.x - 4.0).abs());
            assert!(chunk.vel <= (2.0 * d).sqrt() + 1e-9, "chunk {}", i);
        }

        assert_eq!(c[0].vel, 0.0);
        assert_eq!(c[20].vel, 0.0);
        assert_eq!(c[40].vel, 0.0);
        assert_abs_diff_eq!(c[10].vel, 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_acceleration_feasible() {
        // Uneven spacing
        let xs = [0.0, 0.05, 0.3, 0.35, 1.2, 1.25, 1.3, 2.9, 3.0];
        let mut c = chunks(&xs, &[8]);

        apply_velocity_profile(&mut c, &robot());

        for w in c.windows(2) {
            let d = (w[1].x - w[0].x).abs();
            let dv2 = (w[1].vel.powi(2) - w[0].vel.powi(2)).abs();
            assert!(dv2 <= 2.0 * 1.0 * d + 1e-9);
        }

        // Without a stop at the start the robot enters at full speed
        assert!(!c[0].is_stop());
        assert_eq!(c[0].vel, 2.0);
    }
}
