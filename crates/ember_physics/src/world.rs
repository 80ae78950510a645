//! Physics world interface
//!
//! The engine never integrates motion itself. It talks to a world through
//! [`PhysicsWorld`]: add bodies, seed velocities, step, read positions back.
//! `RapierWorld` implements it over `rapier2d`; tests can substitute their
//! own world.

use ember_core::{Point, Size, Vec2};
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a body inside a physics world
    pub struct BodyHandle;
}

/// Surface response of a dynamic body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Fraction of normal velocity kept after a contact (0.0 to 1.0)
    pub restitution: f32,
    /// Fraction of tangential velocity lost on contact (0.0 to 1.0)
    pub friction: f32,
    /// Fraction of velocity lost per second to drag
    pub air_friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.1,
            air_friction: 0.06,
        }
    }
}

/// A rigid-body simulation the driver can step
pub trait PhysicsWorld {
    /// Add an immovable axis-aligned box
    fn add_static_rect(&mut self, center: Point, size: Size) -> BodyHandle;

    /// Add a dynamic circle
    fn add_circle(&mut self, center: Point, radius: f32, material: Material) -> BodyHandle;

    /// Set a body's velocity in units per second
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    fn position(&self, body: BodyHandle) -> Option<Point>;

    fn body_count(&self) -> usize;

    /// Remove every body
    fn clear(&mut self);
}
