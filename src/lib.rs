/*
 * Boid School - Module Definitions
 *
 * A two-phase boid flocking core for schooling fish. The host creates a
 * Flock, calls `step` once per tick and reads back boid states to draw.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidId, BoidIdGenerator};
pub use bounds::Bounds;
pub use error::FlockError;
pub use flock::{BoidState, Flock};
pub use params::{BoidConfig, FlockParams};

pub use glam::Vec2;

// Define modules
pub mod boid;
pub mod bounds;
pub mod error;
pub mod flock;
pub mod math;
pub mod params;
