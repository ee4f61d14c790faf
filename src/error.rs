/*
 * Error Module
 *
 * Construction-time configuration errors and the single per-step failure.
 * Degenerate geometry (coincident boids, zero-length directions) is not an
 * error and never reaches this type.
 */

use thiserror::Error;

use crate::boid::BoidId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error("domain must have positive finite dimensions, got {width} x {height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("parameter `{name}` is invalid: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("boid id {0} appears more than once")]
    DuplicateId(BoidId),
    #[error("no boid ids left to assign")]
    IdsExhausted,
    #[error("boid {id} has non-finite state; step aborted")]
    NonFinite { id: BoidId },
}
