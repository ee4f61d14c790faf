/*
 * Flock Module
 *
 * This module owns the boid collection and the study area and advances the
 * simulation one tick at a time. Every tick runs in two passes:
 * 1. Compute: each boid's steering is calculated against the state all
 *    boids had at the start of the tick
 * 2. Apply: each boid takes its steering, integrates and wraps at the edges
 *
 * Both passes can run on the rayon thread pool. Phase 1 only holds a shared
 * borrow of the collection, so no boid can move until every steering vector
 * has been computed. Phase 2 works on a copy that replaces the flock only
 * if every boid came out finite, so a failed step leaves no trace.
 */

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::boid::{Boid, BoidId, BoidIdGenerator};
use crate::bounds::Bounds;
use crate::error::FlockError;
use crate::params::{BoidConfig, FlockParams};

/// One boid's state as handed to the host after a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidState {
    pub id: BoidId,
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug)]
pub struct Flock {
    boids: Vec<Boid>,
    bounds: Bounds,
    parallel: bool,
    tick: u64,
}

impl Flock {
    // Build a flock of `params.count` boids scattered uniformly over the domain
    pub fn new<R: Rng>(params: &FlockParams, config: BoidConfig, rng: &mut R) -> Result<Self, FlockError> {
        params.validate()?;
        config.validate()?;
        let bounds = params.bounds()?;

        let mut ids = BoidIdGenerator::default();
        let mut boids = Vec::with_capacity(params.count);
        for _ in 0..params.count {
            let x = rng.gen_range(0.0..=bounds.width);
            let y = rng.gen_range(0.0..=bounds.height);
            let id = ids.next_id().ok_or(FlockError::IdsExhausted)?;
            boids.push(Boid::new(id, Vec2::new(x, y), config, params.spread, &mut *rng));
        }

        debug!(
            count = params.count,
            width = bounds.width,
            height = bounds.height,
            parallel = params.parallel,
            "flock created"
        );

        Ok(Self {
            boids,
            bounds,
            parallel: params.parallel,
            tick: 0,
        })
    }

    // Build a flock from boids the host has already placed. Runs sequentially
    // unless `with_parallel` is used.
    pub fn from_boids(bounds: Bounds, boids: Vec<Boid>) -> Result<Self, FlockError> {
        bounds.validate()?;

        for config in distinct_configs(&boids) {
            config.validate()?;
        }

        let mut seen = HashSet::with_capacity(boids.len());
        for boid in &boids {
            if !seen.insert(boid.id()) {
                return Err(FlockError::DuplicateId(boid.id()));
            }
            if !boid.is_finite() {
                return Err(FlockError::NonFinite { id: boid.id() });
            }
        }

        debug!(count = boids.len(), width = bounds.width, height = bounds.height, "flock assembled");

        Ok(Self {
            boids,
            bounds,
            parallel: false,
            tick: 0,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    // Advance the simulation by one tick. On error no boid has been touched.
    pub fn step(&mut self) -> Result<(), FlockError> {
        if let Some(boid) = self.boids.iter().find(|boid| !boid.is_finite()) {
            warn!(id = %boid.id(), tick = self.tick, "non-finite boid state, step aborted");
            return Err(FlockError::NonFinite { id: boid.id() });
        }

        // Phase 1: compute against the frozen pre-tick state
        let forces = self.compute_steering();

        if let Some(i) = forces.iter().position(|force| !force.is_finite()) {
            let id = self.boids[i].id();
            warn!(id = %id, tick = self.tick, "non-finite steering, step aborted");
            return Err(FlockError::NonFinite { id });
        }

        // Phase 2: apply
        let next = self.apply_steering(forces);

        if let Some(boid) = next.iter().find(|boid| !boid.is_finite()) {
            warn!(id = %boid.id(), tick = self.tick, "integration overflowed, step aborted");
            return Err(FlockError::NonFinite { id: boid.id() });
        }
        self.boids = next;

        self.tick += 1;
        trace!(tick = self.tick, "step complete");
        Ok(())
    }

    // Run `ticks` steps, stopping at the first failure
    pub fn advance(&mut self, ticks: u64) -> Result<(), FlockError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    fn compute_steering(&self) -> Vec<Vec2> {
        let boids = &self.boids;
        let steer = |(i, boid): (usize, &Boid)| {
            let others = boids
                .iter()
                .enumerate()
                .filter(move |&(j, _)| j != i)
                .map(|(_, other)| other);
            boid.steering_force(others)
        };

        if self.parallel {
            boids.par_iter().enumerate().map(steer).collect()
        } else {
            boids.iter().enumerate().map(steer).collect()
        }
    }

    fn apply_steering(&self, forces: Vec<Vec2>) -> Vec<Boid> {
        let mut next = self.boids.clone();
        let bounds = self.bounds;
        let apply = |(boid, force): (&mut Boid, Vec2)| {
            boid.apply_force(force);
            boid.update();
            boid.resolve_boundary(&bounds);
        };

        if self.parallel {
            next.par_iter_mut().zip(forces).for_each(apply);
        } else {
            next.iter_mut().zip(forces).for_each(apply);
        }
        next
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.boids.iter().map(|boid| boid.position).collect()
    }

    pub fn states(&self) -> Vec<BoidState> {
        self.boids
            .iter()
            .map(|boid| BoidState {
                id: boid.id(),
                position: boid.position,
                velocity: boid.velocity,
            })
            .collect()
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

// Configs shared by several boids, each listed once
fn distinct_configs(boids: &[Boid]) -> Vec<&BoidConfig> {
    let mut configs: Vec<&BoidConfig> = Vec::new();
    for boid in boids {
        if !configs.contains(&boid.config()) {
            configs.push(boid.config());
        }
    }
    configs
}
