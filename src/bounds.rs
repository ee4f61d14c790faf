/*
 * Bounds Module
 *
 * The rectangular study area [0, width] x [0, height]. Boids leaving one
 * edge reappear on the opposite edge, giving a toroidal world.
 */

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::FlockError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Result<Self, FlockError> {
        let bounds = Self { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(FlockError::InvalidBounds {
                width: self.width,
                height: self.height,
            })
        }
    }

    // Closed rectangle test
    pub fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    // Wrap a position across the edges, each axis independently
    pub fn wrap(&self, mut p: Vec2) -> Vec2 {
        p.x = wrap_axis(p.x, self.width);
        p.y = wrap_axis(p.y, self.height);
        p
    }
}

#[inline]
fn wrap_axis(value: f32, upper: f32) -> f32 {
    if value > upper {
        0.0
    } else if value < 0.0 {
        upper
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(Bounds::new(0.0, 10.0).is_err());
        assert!(Bounds::new(10.0, -1.0).is_err());
        assert!(Bounds::new(f32::NAN, 10.0).is_err());
        assert!(Bounds::new(10.0, 10.0).is_ok());
    }

    #[test]
    fn wraps_each_axis_to_the_opposite_edge() {
        let bounds = Bounds { width: 100.0, height: 50.0 };
        assert_eq!(bounds.wrap(Vec2::new(101.0, 25.0)), Vec2::new(0.0, 25.0));
        assert_eq!(bounds.wrap(Vec2::new(-3.0, 25.0)), Vec2::new(100.0, 25.0));
        assert_eq!(bounds.wrap(Vec2::new(10.0, 60.0)), Vec2::new(10.0, 0.0));
        assert_eq!(bounds.wrap(Vec2::new(-1.0, -1.0)), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn edges_are_inside() {
        let bounds = Bounds { width: 100.0, height: 50.0 };
        let edge = Vec2::new(100.0, 0.0);
        assert!(bounds.contains(edge));
        assert_eq!(bounds.wrap(edge), edge);
    }
}
