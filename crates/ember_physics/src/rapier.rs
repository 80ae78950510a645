//! Rapier physics world
//!
//! [`RapierWorld`] runs the simulation on `rapier2d`. Particles are dynamic
//! balls that collide with each other and pile up on fixed cuboid floors.
//! Coordinates are stage units with y pointing down, so gravity is positive.

use ember_core::{Point, Size, Vec2};
use rapier2d::prelude::*;
use slotmap::SlotMap;

use crate::world::{BodyHandle, Material, PhysicsWorld};

/// Stage units per simulation length unit
const LENGTH_UNIT: f32 = 100.0;

/// A `rapier2d` pipeline plus the body and collider sets it steps
pub struct RapierWorld {
    gravity: Vec2,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    handles: SlotMap<BodyHandle, RigidBodyHandle>,
}

impl RapierWorld {
    /// Create a world with gravity in units per second squared
    pub fn new(gravity: Vec2) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.length_unit = LENGTH_UNIT;
        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: SlotMap::with_key(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|b| {
            let v = b.linvel();
            Vec2::new(v.x, v.y)
        })
    }

    fn body(&self, body: BodyHandle) -> Option<&RigidBody> {
        self.handles
            .get(body)
            .and_then(|h| self.rigid_body_set.get(*h))
    }

    fn insert(&mut self, body: RigidBody, collider: Collider) -> BodyHandle {
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.handles.insert(handle)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_static_rect(&mut self, center: Point, size: Size) -> BodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y])
            .build();
        let collider = ColliderBuilder::cuboid(size.width / 2.0, size.height / 2.0).build();
        self.insert(body, collider)
    }

    fn add_circle(&mut self, center: Point, radius: f32, material: Material) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![center.x, center.y])
            .linear_damping(material.air_friction)
            .build();
        let collider = ColliderBuilder::ball(radius)
            .restitution(material.restitution.clamp(0.0, 1.0))
            .friction(material.friction.max(0.0))
            .build();
        self.insert(body, collider)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        let Some(handle) = self.handles.get(body) else {
            return;
        };
        if let Some(b) = self.rigid_body_set.get_mut(*handle) {
            if b.is_dynamic() {
                b.set_linvel(vector![velocity.x, velocity.y], true);
            }
        }
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        let gravity = vector![self.gravity.x, self.gravity.y];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn position(&self, body: BodyHandle) -> Option<Point> {
        self.body(body).map(|b| {
            let t = b.translation();
            Point::new(t.x, t.y)
        })
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn clear(&mut self) {
        *self = Self::new(self.gravity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f32 = 1.0 / 60.0;

    fn world_with_floor() -> RapierWorld {
        let mut world = RapierWorld::new(Vec2::new(0.0, 500.0));
        // Floor top at y = 100
        world.add_static_rect(Point::new(0.0, 110.0), Size::new(400.0, 20.0));
        world
    }

    #[test]
    fn test_gravity_accelerates_circles() {
        let mut world = RapierWorld::new(Vec2::new(0.0, 500.0));
        let ball = world.add_circle(Point::ZERO, 2.0, Material::default());
        for _ in 0..10 {
            world.step(STEP);
        }
        assert!(world.position(ball).unwrap().y > 0.0);
        assert!(world.velocity(ball).unwrap().y > 0.0);
    }

    #[test]
    fn test_floor_stops_fall() {
        let mut world = world_with_floor();
        let ball = world.add_circle(Point::ZERO, 2.0, Material::default());
        for _ in 0..600 {
            world.step(STEP);
        }
        let p = world.position(ball).unwrap();
        assert!(p.y <= 98.5, "ball sank to {}", p.y);
        assert!(p.y > 90.0, "ball never landed: {}", p.y);
    }

    #[test]
    fn test_circles_pile_instead_of_overlapping() {
        let mut world = world_with_floor();
        let lower = world.add_circle(Point::new(0.0, 60.0), 2.0, Material::default());
        let upper = world.add_circle(Point::new(0.0, 40.0), 2.0, Material::default());
        for _ in 0..600 {
            world.step(STEP);
        }

        let a = world.position(lower).unwrap();
        let b = world.position(upper).unwrap();
        let distance = Vec2::new(a.x - b.x, a.y - b.y).length();
        assert!(distance >= 3.6, "circles overlap: {:?} {:?}", a, b);
        assert!(a.y <= 98.5 && b.y <= 98.5, "a circle sank: {:?} {:?}", a, b);
    }

    #[test]
    fn test_static_bodies_ignore_velocity() {
        let mut world = RapierWorld::new(Vec2::new(0.0, 500.0));
        let floor = world.add_static_rect(Point::ZERO, Size::new(10.0, 10.0));
        world.set_velocity(floor, Vec2::new(5.0, 5.0));
        world.step(STEP);
        assert_eq!(world.position(floor), Some(Point::ZERO));
    }

    #[test]
    fn test_clear_keeps_gravity() {
        let mut world = world_with_floor();
        world.add_circle(Point::ZERO, 1.0, Material::default());
        assert_eq!(world.body_count(), 2);
        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.gravity(), Vec2::new(0.0, 500.0));
    }
}
