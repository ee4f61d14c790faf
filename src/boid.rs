/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * Each boid follows three main rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Match the average velocity of neighbors
 * 3. Cohesion: Head towards the average position of neighbors
 *
 * Every tick a boid moves with its previous velocity, then its velocity
 * takes the steering accumulated during the tick:
 *   P(n+1) = P(n) + V(n)
 *   V(n+1) = V(n) + dV(n)
 * with V limited to max_speed and dV limited to max_steer.
 */

use std::fmt;

use glam::Vec2;
use rand::Rng;

use crate::bounds::Bounds;
use crate::math::{limit_magnitude, normalize_or_zero};
use crate::params::BoidConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoidId(pub u64);

impl fmt::Display for BoidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing ids, so two boids from one generator never collide.
/// Once `u64::MAX` has been issued the generator is exhausted and returns `None`.
#[derive(Clone, Debug)]
pub struct BoidIdGenerator {
    next: Option<u64>,
}

impl Default for BoidIdGenerator {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl BoidIdGenerator {
    pub fn starting_at(next: u64) -> Self {
        Self { next: Some(next) }
    }

    pub fn next_id(&mut self) -> Option<BoidId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(BoidId(id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boid {
    id: BoidId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub steering: Vec2,
    config: BoidConfig,
}

impl Boid {
    // Create a boid with velocity and steering drawn from [-spread, spread)
    pub fn new<R: Rng>(
        id: BoidId,
        position: Vec2,
        config: BoidConfig,
        spread: f32,
        rng: &mut R,
    ) -> Self {
        let mut draw = || {
            if spread > 0.0 {
                Vec2::new(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread))
            } else {
                Vec2::ZERO
            }
        };
        let velocity = draw();
        let steering = draw();

        Self {
            id,
            position,
            velocity,
            steering,
            config,
        }
    }

    // Create a boid with a known velocity and an empty accumulator
    pub fn with_state(id: BoidId, position: Vec2, velocity: Vec2, config: BoidConfig) -> Self {
        Self {
            id,
            position,
            velocity,
            steering: Vec2::ZERO,
            config,
        }
    }

    pub fn id(&self) -> BoidId {
        self.id
    }

    pub fn config(&self) -> &BoidConfig {
        &self.config
    }

    // Add a force to the pending steering
    pub fn apply_force(&mut self, force: Vec2) {
        self.steering += force;
    }

    // Rescale velocity down to max_speed
    pub fn limit_speed(&mut self) {
        self.velocity = limit_magnitude(self.velocity, self.config.max_speed);
    }

    // Rescale the accumulated steering down to max_steer
    pub fn limit_steering(&mut self) {
        self.steering = limit_magnitude(self.steering, self.config.max_steer);
    }

    // Conclude the tick. Position moves with the previous velocity before the
    // velocity takes this tick's steering.
    pub fn update(&mut self) {
        self.limit_speed();
        self.position += self.velocity;

        self.limit_steering();
        self.velocity += self.steering;

        self.steering = Vec2::ZERO;
    }

    pub fn resolve_boundary(&mut self, bounds: &Bounds) {
        self.position = bounds.wrap(self.position);
    }

    // Distance to `other` if it lies strictly inside `radius`. Zero distance is
    // self or a coincident boid and never counts.
    fn distance_within(&self, other: &Boid, radius: f32) -> Option<f32> {
        let d = self.position.distance(other.position);
        (d > 0.0 && d < radius).then_some(d)
    }

    // Velocity change needed to match the mean velocity of visible neighbors
    pub fn align<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            if self.distance_within(other, self.config.perception_radius).is_none() {
                continue;
            }
            sum += other.velocity;
            count += 1;
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        sum / count as f32 - self.velocity
    }

    // Unit direction towards the centroid of visible neighbors
    pub fn cohere<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            if self.distance_within(other, self.config.perception_radius).is_none() {
                continue;
            }
            sum += other.position;
            count += 1;
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        let centroid = sum / count as f32;
        normalize_or_zero(centroid - self.position)
    }

    // Mean of the away-directions from crowding neighbors, each weighted by 1/d
    pub fn separate<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            let Some(d) = self.distance_within(other, self.config.avoidance_radius) else {
                continue;
            };
            let away = (self.position - other.position) / d;
            sum += away / d;
            count += 1;
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        sum / count as f32
    }

    // Weighted sum of the three rules. May exceed max_steer; update() clamps.
    pub fn steering_force<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid> + Clone,
    {
        let alignment = self.align(neighbors.clone()) * self.config.alignment_weight;
        let cohesion = self.cohere(neighbors.clone()) * self.config.cohesion_weight;
        let separation = self.separate(neighbors) * self.config.separation_weight;

        alignment + cohesion + separation
    }

    // Add this tick's flocking steering without moving the boid. Calling it
    // again before update() accumulates.
    pub fn behave<'a, I>(&mut self, neighbors: I)
    where
        I: IntoIterator<Item = &'a Boid> + Clone,
    {
        let force = self.steering_force(neighbors);
        self.apply_force(force);
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.steering.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boid(id: u64, x: f32, y: f32, vx: f32, vy: f32) -> Boid {
        Boid::with_state(BoidId(id), Vec2::new(x, y), Vec2::new(vx, vy), BoidConfig::default())
    }

    #[test]
    fn ids_increase() {
        let mut ids = BoidIdGenerator::starting_at(7);
        assert_eq!(ids.next_id(), Some(BoidId(7)));
        assert_eq!(ids.next_id(), Some(BoidId(8)));
        assert_eq!(BoidIdGenerator::default().next_id(), Some(BoidId(0)));
        assert_eq!(BoidId(3).to_string(), "#3");
    }

    #[test]
    fn id_generator_stops_after_the_last_id() {
        let mut ids = BoidIdGenerator::starting_at(u64::MAX - 1);
        assert_eq!(ids.next_id(), Some(BoidId(u64::MAX - 1)));
        assert_eq!(ids.next_id(), Some(BoidId(u64::MAX)));
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.next_id(), None);
    }

    #[test]
    fn random_state_stays_inside_spread() {
        let mut rng = StdRng::seed_from_u64(11);
        for i in 0..50 {
            let b = Boid::new(BoidId(i), Vec2::ZERO, BoidConfig::default(), 5.0, &mut rng);
            for v in [b.velocity, b.steering] {
                assert!((-5.0..5.0).contains(&v.x));
                assert!((-5.0..5.0).contains(&v.y));
            }
        }
    }

    #[test]
    fn zero_spread_starts_at_rest() {
        let mut rng = StdRng::seed_from_u64(1);
        let b = Boid::new(BoidId(0), Vec2::ONE, BoidConfig::default(), 0.0, &mut rng);
        assert_eq!(b.velocity, Vec2::ZERO);
        assert_eq!(b.steering, Vec2::ZERO);
    }

    #[test]
    fn align_matches_mean_neighbor_velocity() {
        let a = boid(1, 0.0, 0.0, 1.0, 0.0);
        let others = [boid(2, 10.0, 0.0, 1.0, 0.0), boid(3, 0.0, 10.0, 0.0, 1.0)];
        assert_eq!(a.align(&others), Vec2::new(-0.5, 0.5));
    }

    #[test]
    fn rules_ignore_boids_outside_perception() {
        let a = boid(1, 0.0, 0.0, 1.0, 0.0);
        let far = [boid(2, 50.0, 0.0, -3.0, 0.0), boid(3, 200.0, 200.0, 0.0, 1.0)];
        assert_eq!(a.align(&far), Vec2::ZERO);
        assert_eq!(a.cohere(&far), Vec2::ZERO);
        assert_eq!(a.separate(&far), Vec2::ZERO);
    }

    #[test]
    fn coincident_boids_are_skipped() {
        let a = boid(1, 5.0, 5.0, 0.0, 0.0);
        let same_spot = [boid(2, 5.0, 5.0, 4.0, 4.0)];
        assert_eq!(a.align(&same_spot), Vec2::ZERO);
        assert_eq!(a.cohere(&same_spot), Vec2::ZERO);
        assert_eq!(a.separate(&same_spot), Vec2::ZERO);
    }

    #[test]
    fn cohere_is_a_unit_direction() {
        let a = boid(1, 0.0, 0.0, 0.0, 0.0);
        let others = [boid(2, 30.0, 0.0, 0.0, 0.0), boid(3, 30.0, 40.0, 0.0, 0.0)];
        let c = a.cohere(&others);
        assert!((c.length() - 1.0).abs() < 1e-6);
        assert!((c - Vec2::new(30.0, 20.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn cohere_is_zero_when_centroid_is_self() {
        let a = boid(1, 10.0, 10.0, 0.0, 0.0);
        let others = [boid(2, 5.0, 10.0, 0.0, 0.0), boid(3, 15.0, 10.0, 0.0, 0.0)];
        assert_eq!(a.cohere(&others), Vec2::ZERO);
    }

    #[test]
    fn separation_falls_off_with_distance() {
        let a = boid(1, 0.0, 0.0, 0.0, 0.0);
        let near = a.separate(&[boid(2, 2.0, 0.0, 0.0, 0.0)]);
        let farther = a.separate(&[boid(2, 8.0, 0.0, 0.0, 0.0)]);
        assert!((near - Vec2::new(-0.5, 0.0)).length() < 1e-6);
        assert!((farther - Vec2::new(-0.125, 0.0)).length() < 1e-6);
    }

    #[test]
    fn separation_averages_over_crowding_neighbors() {
        let a = boid(1, 0.0, 0.0, 0.0, 0.0);
        let others = [boid(2, 2.0, 0.0, 0.0, 0.0), boid(3, 0.0, 4.0, 0.0, 0.0)];
        let s = a.separate(&others);
        assert!((s - Vec2::new(-0.25, -0.125)).length() < 1e-6);
    }

    #[test]
    fn behave_accumulates_without_moving() {
        let mut a = boid(1, 0.0, 0.0, 1.0, 0.0);
        let others = [boid(2, 10.0, 0.0, 1.0, 0.0), boid(3, 0.0, 10.0, 0.0, 1.0)];
        let expected = a.steering_force(&others);

        a.behave(&others);
        assert_eq!(a.steering, expected);
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(a.velocity, Vec2::new(1.0, 0.0));

        a.behave(&others);
        assert_eq!(a.steering, expected * 2.0);
    }

    #[test]
    fn update_moves_with_previous_velocity() {
        let mut a = boid(1, 0.0, 0.0, 2.0, 0.0);
        a.apply_force(Vec2::new(0.0, 0.5));
        a.update();
        assert_eq!(a.position, Vec2::new(2.0, 0.0));
        assert_eq!(a.velocity, Vec2::new(2.0, 0.5));
        assert_eq!(a.steering, Vec2::ZERO);
    }

    #[test]
    fn update_clamps_speed_then_steering() {
        let mut a = boid(1, 0.0, 0.0, 30.0, 40.0);
        a.apply_force(Vec2::new(0.0, 3.0));
        a.update();
        // Speed 50 rescales to 10 before moving; steering 3 rescales to 1
        assert!((a.position - Vec2::new(6.0, 8.0)).length() < 1e-5);
        assert!((a.velocity - Vec2::new(6.0, 9.0)).length() < 1e-5);
    }

    #[test]
    fn resolve_boundary_wraps() {
        let bounds = Bounds { width: 100.0, height: 100.0 };
        let mut a = boid(1, 105.0, -2.0, 0.0, 0.0);
        a.resolve_boundary(&bounds);
        assert_eq!(a.position, Vec2::new(0.0, 100.0));
    }
}
