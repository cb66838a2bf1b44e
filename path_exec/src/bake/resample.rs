//! # Arc length resampling
//!
//! Walks the path producing samples spaced at roughly `chunk_spacing_m`, however unevenly the
//! Bezier parameterisation distributes distance.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};

use crate::{field::FieldDims, geom::Point, params::BakeParams, path::Path};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// When a step falls short the bracket is widened to `mid + (mid - low) / WIDEN_DIVISOR`.
const WIDEN_DIVISOR: f64 = 0.8;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A point sampled from the path, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t: f64,
    pub point: Point,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find a parameter step from `low_t` covering the target chunk spacing, searching the bracket
/// `[low_t, hi_t]`.
///
/// The midpoint of the bracket is tested each iteration. Short steps widen the bracket, long
/// steps (or ones landing beyond the end of the path) narrow it. After `max_iters` the current
/// midpoint is accepted with a warning.
pub fn find_ideal_t_step(
    path: &Path,
    field: &FieldDims,
    params: &BakeParams,
    low_t: f64,
    hi_t: f64,
    max_iters: usize,
) -> f64 {
    let min_m = params.chunk_spacing_m * (1.0 - params.spacing_tolerance);
    let max_m = params.chunk_spacing_m * (1.0 + params.spacing_tolerance);

    let mut hi_t = hi_t;
    let mut mid_t = (low_t + hi_t) / 2.0;

    let low_pt = match path.point_at(low_t) {
        Some(p) => p,
        None => return mid_t - low_t,
    };

    for i in 1..=max_iters {
        mid_t = (low_t + hi_t) / 2.0;

        if i >= max_iters {
            warn!(
                "Ideal step from t = {:.4} not found in {} iterations, using step {:.6}",
                low_t,
                max_iters,
                mid_t - low_t
            );
            break;
        }

        let dist_m = match path.point_at(mid_t) {
            Some(p) => field.px_to_m((p - low_pt).norm()),
            None => f64::INFINITY,
        };

        if dist_m < min_m {
            hi_t = mid_t + (mid_t - low_t) / WIDEN_DIVISOR;
        } else if dist_m > max_m {
            hi_t = mid_t;
        } else {
            break;
        }
    }

    mid_t - low_t
}

/// Sample the whole path.
///
/// Whole-segment brackets (`[t, t + 1]`) are used while a full parameter unit remains, then the
/// remaining tail is searched against the path end. A final sample is always placed exactly at
/// the end. Sample `t`s are strictly increasing.
pub fn resample(path: &Path, field: &FieldDims, params: &BakeParams) -> Vec<Sample> {
    let end_t = match path.end_t() {
        Some(t) => t,
        None => return Vec::new(),
    };

    let mut samples = Vec::new();
    let mut low_t = 0.0;

    while low_t + 1.0 <= end_t && samples.len() < params.max_chunks {
        let step = find_ideal_t_step(
            path,
            field,
            params,
            low_t,
            low_t + 1.0,
            params.max_iters_main,
        );
        push_sample(path, &mut samples, low_t);
        low_t += step;
    }

    while low_t <= end_t - params.tail_cutoff_t && samples.len() < params.max_chunks {
        let step = find_ideal_t_step(path, field, params, low_t, end_t, params.max_iters_tail);
        push_sample(path, &mut samples, low_t);
        low_t += step;
    }

    if samples.len() >= params.max_chunks {
        warn!(
            "Resampling stopped at {} chunks before reaching the end of the path",
            samples.len()
        );
    }

    push_sample(path, &mut samples, end_t);

    trace!("Resampled path into {} samples", samples.len());

    samples
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn push_sample(path: &Path, samples: &mut Vec<Sample>, t: f64) {
    if let Some(last) = samples.last() {
        if t <= last.t {
            return;
        }
    }

    if let Some(point) = path.point_at(t) {
        samples.push(Sample { t, point });
    }
}
