/*
 * Simulation Parameters Module
 *
 * This module defines the per-boid configuration (speeds, radii, rule
 * weights) and the flock-level construction parameters. Distances, speeds
 * and the seeding spread must be non-negative; weights may be any finite
 * value, with recommended ranges exposed for hosts that build sliders.
 */

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bounds::Bounds;
use crate::error::FlockError;

/// Immutable per-boid parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidConfig {
    pub max_speed: f32,
    pub max_steer: f32,
    pub perception_radius: f32,
    pub avoidance_radius: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub separation_weight: f32,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            max_steer: 1.0,
            perception_radius: 50.0,
            avoidance_radius: 10.0,
            alignment_weight: 0.5,
            cohesion_weight: 0.5,
            separation_weight: 20.0,
        }
    }
}

impl BoidConfig {
    // Reject negative or non-finite limits; weights only need to be finite
    pub fn validate(&self) -> Result<(), FlockError> {
        non_negative("max_speed", self.max_speed)?;
        non_negative("max_steer", self.max_steer)?;
        non_negative("perception_radius", self.perception_radius)?;
        non_negative("avoidance_radius", self.avoidance_radius)?;
        finite("alignment_weight", self.alignment_weight)?;
        finite("cohesion_weight", self.cohesion_weight)?;
        finite("separation_weight", self.separation_weight)?;

        self.warn_out_of_range();
        Ok(())
    }

    // Alignment already returns the full corrective delta, so it wants a fraction
    pub fn alignment_weight_range() -> RangeInclusive<f32> {
        0.0..=1.0
    }

    // Cohesion is a unit direction and should be scaled into the steering range
    pub fn cohesion_weight_range(&self) -> RangeInclusive<f32> {
        0.0..=self.max_steer.max(1.0)
    }

    // Separation falls off as 1/d, so it tolerates much larger weights
    pub fn separation_weight_range(&self) -> RangeInclusive<f32> {
        0.0..=self.max_steer.max(1.0) * self.avoidance_radius.max(1.0) * 2.0
    }

    fn warn_out_of_range(&self) {
        if !Self::alignment_weight_range().contains(&self.alignment_weight) {
            warn!(weight = self.alignment_weight, "alignment weight outside recommended range, motion may diverge");
        }
        if !self.cohesion_weight_range().contains(&self.cohesion_weight) {
            warn!(weight = self.cohesion_weight, "cohesion weight outside recommended range");
        }
        if !self.separation_weight_range().contains(&self.separation_weight) {
            warn!(weight = self.separation_weight, "separation weight outside recommended range");
        }
    }
}

/// Parameters for building a flock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    pub width: f32,
    pub height: f32,
    pub count: usize,
    // Initial velocity and steering are drawn per axis from [-spread, spread)
    pub spread: f32,
    pub parallel: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            count: 100,
            spread: 5.0,
            parallel: true,
        }
    }
}

impl FlockParams {
    pub fn bounds(&self) -> Result<Bounds, FlockError> {
        Bounds::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        self.bounds()?;
        non_negative("spread", self.spread)?;
        // Sampling [-spread, spread) needs the width of the range to be finite
        if !(2.0 * self.spread).is_finite() {
            return Err(FlockError::InvalidParameter {
                name: "spread",
                value: self.spread,
            });
        }
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), FlockError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FlockError::InvalidParameter { name, value })
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), FlockError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FlockError::InvalidParameter { name, value })
    }
}
