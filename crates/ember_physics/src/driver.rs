//! Simulation driver
//!
//! A [`SimulationDriver`] owns one physics world and steps it at a fixed rate
//! from the host frame loop, copying every simulated body's position onto the
//! stage node bound to it.
//!
//! Timelines never touch the driver directly. They hold a [`DriverHandle`]
//! and send [`DriverCommand`]s over a channel; the driver applies them at the
//! start of its next frame. Once released, the world is gone and any later
//! command is dropped.

use std::sync::mpsc::{self, Receiver, Sender};

use ember_core::{NodeId, Point, Rect, Size, Stage, Vec2};
use tracing::{debug, trace};

use crate::world::{BodyHandle, Material, PhysicsWorld};

/// Fixed simulation step (60 steps per second)
pub const FIXED_STEP: f32 = 1.0 / 60.0;

/// Backlog beyond which pending steps are dropped instead of simulated
const MAX_BACKLOG: f32 = 0.25;

/// A dynamic body to create when a simulation starts
#[derive(Clone, Debug, PartialEq)]
pub struct BodySpec {
    /// Stage node that mirrors this body
    pub node: NodeId,
    /// Starting position in stage coordinates
    pub position: Point,
    pub radius: f32,
    pub velocity: Vec2,
    pub material: Material,
}

/// Commands accepted by the driver
#[derive(Clone, Debug, PartialEq)]
pub enum DriverCommand {
    /// Populate the world and begin stepping
    Start {
        bodies: Vec<BodySpec>,
        /// Static floor, as a rect in stage coordinates
        floor: Option<Rect>,
    },
    /// Stop stepping and drop every body
    Stop,
}

/// Lifecycle of a driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
    Released,
}

/// Sending half of the driver's command channel
#[derive(Clone, Debug)]
pub struct DriverHandle {
    tx: Sender<DriverCommand>,
}

impl DriverHandle {
    /// Queue a command; returns false when the driver no longer exists
    pub fn send(&self, command: DriverCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn start(&self, bodies: Vec<BodySpec>, floor: Option<Rect>) -> bool {
        self.send(DriverCommand::Start { bodies, floor })
    }

    pub fn stop(&self) -> bool {
        self.send(DriverCommand::Stop)
    }
}

/// Fixed-step physics loop bound to stage nodes
pub struct SimulationDriver<W: PhysicsWorld> {
    world: Option<W>,
    rx: Receiver<DriverCommand>,
    tx: Sender<DriverCommand>,
    bindings: Vec<(BodyHandle, NodeId)>,
    state: DriverState,
    accumulator: f32,
    steps: u64,
    position_writes: u64,
}

impl<W: PhysicsWorld> SimulationDriver<W> {
    pub fn new(world: W) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            world: Some(world),
            rx,
            tx,
            bindings: Vec::new(),
            state: DriverState::Idle,
            accumulator: 0.0,
            steps: 0,
            position_writes: 0,
        }
    }

    /// A new sender for this driver's command channel
    pub fn handle(&self) -> DriverHandle {
        DriverHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn is_released(&self) -> bool {
        self.state == DriverState::Released
    }

    /// Fixed steps simulated so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total body positions copied onto the stage so far
    pub fn position_writes(&self) -> u64 {
        self.position_writes
    }

    pub fn body_count(&self) -> usize {
        self.world.as_ref().map_or(0, |w| w.body_count())
    }

    /// Apply queued commands without stepping
    pub fn drain_commands(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: DriverCommand) {
        if self.state == DriverState::Released {
            trace!("driver released, dropping {:?}", command_name(&command));
            return;
        }
        match command {
            DriverCommand::Start { bodies, floor } => self.start(bodies, floor),
            DriverCommand::Stop => self.stop(),
        }
    }

    fn start(&mut self, bodies: Vec<BodySpec>, floor: Option<Rect>) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.clear();
        self.bindings.clear();

        if let Some(floor) = floor {
            let center = Point::new(
                floor.x() + floor.width() / 2.0,
                floor.y() + floor.height() / 2.0,
            );
            world.add_static_rect(center, Size::new(floor.width(), floor.height()));
        }
        for body in bodies {
            let handle = world.add_circle(body.position, body.radius, body.material);
            world.set_velocity(handle, body.velocity);
            self.bindings.push((handle, body.node));
        }

        debug!(bodies = self.bindings.len(), "simulation started");
        self.accumulator = 0.0;
        self.state = DriverState::Running;
    }

    fn stop(&mut self) {
        if let Some(world) = self.world.as_mut() {
            world.clear();
        }
        if self.state == DriverState::Running {
            debug!(steps = self.steps, "simulation stopped");
        }
        self.bindings.clear();
        self.accumulator = 0.0;
        self.state = DriverState::Stopped;
    }

    /// Run one host frame: apply commands, then step as many fixed steps as
    /// `dt` covers, writing positions back after each step.
    pub fn on_frame(&mut self, dt: f32, stage: &mut Stage) {
        self.drain_commands();
        if self.state != DriverState::Running {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };

        self.accumulator += dt.max(0.0);
        if self.accumulator > MAX_BACKLOG {
            debug!(
                dropped = self.accumulator - MAX_BACKLOG,
                "dropping fixed-step backlog"
            );
            self.accumulator = MAX_BACKLOG;
        }

        while self.accumulator >= FIXED_STEP {
            world.step(FIXED_STEP);
            self.steps += 1;
            for (body, node) in &self.bindings {
                if let Some(position) = world.position(*body) {
                    stage.set_position(*node, position);
                    self.position_writes += 1;
                }
            }
            self.accumulator -= FIXED_STEP;
        }
    }

    /// Stop, then drop the world for good
    pub fn release(&mut self) {
        self.drain_commands();
        self.stop();
        self.world = None;
        self.state = DriverState::Released;
        debug!("physics world released");
    }
}

fn command_name(command: &DriverCommand) -> &'static str {
    match command {
        DriverCommand::Start { .. } => "start",
        DriverCommand::Stop => "stop",
    }
}

#[cfg(all(test, feature = "rapier"))]
mod tests {
    use super::*;
    use crate::RapierWorld;
    use ember_core::NodeKind;

    fn setup() -> (Stage, NodeId, SimulationDriver<RapierWorld>) {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let node = stage.add(stage.root(), NodeKind::Particle { radius: 2.0 });
        let driver = SimulationDriver::new(RapierWorld::new(Vec2::new(0.0, 500.0)));
        (stage, node, driver)
    }

    fn body(node: NodeId) -> BodySpec {
        BodySpec {
            node,
            position: Point::new(10.0, 10.0),
            radius: 2.0,
            velocity: Vec2::ZERO,
            material: Material::default(),
        }
    }

    #[test]
    fn test_idle_driver_does_not_step() {
        let (mut stage, _, mut driver) = setup();
        driver.on_frame(1.0, &mut stage);
        assert_eq!(driver.steps(), 0);
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let (mut stage, node, mut driver) = setup();
        assert!(driver.handle().start(vec![body(node)], None));

        // Half a step: command applied, nothing simulated yet.
        driver.on_frame(FIXED_STEP / 2.0, &mut stage);
        assert!(driver.is_running());
        assert_eq!(driver.steps(), 0);

        driver.on_frame(FIXED_STEP / 2.0 + 0.001, &mut stage);
        assert_eq!(driver.steps(), 1);
        assert_eq!(driver.position_writes(), 1);

        let y = stage.node(node).map(|n| n.position.y).unwrap_or_default();
        assert!(y > 10.0);
    }

    #[test]
    fn test_backlog_is_capped() {
        let (mut stage, node, mut driver) = setup();
        driver.handle().start(vec![body(node)], None);
        driver.on_frame(10.0, &mut stage);
        assert!(driver.steps() <= (MAX_BACKLOG / FIXED_STEP).ceil() as u64);
    }

    #[test]
    fn test_stop_halts_writes() {
        let (mut stage, node, mut driver) = setup();
        let handle = driver.handle();
        handle.start(vec![body(node)], None);
        driver.on_frame(0.1, &mut stage);
        let writes = driver.position_writes();
        assert!(writes > 0);

        handle.stop();
        driver.on_frame(0.1, &mut stage);
        assert_eq!(driver.position_writes(), writes);
        assert_eq!(driver.body_count(), 0);
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_commands_after_release_are_dropped() {
        let (mut stage, node, mut driver) = setup();
        let handle = driver.handle();
        driver.release();
        assert!(driver.is_released());

        handle.start(vec![body(node)], None);
        driver.on_frame(0.5, &mut stage);
        assert!(driver.is_released());
        assert_eq!(driver.steps(), 0);
    }

    #[test]
    fn test_floor_is_created() {
        let (mut stage, node, mut driver) = setup();
        driver
            .handle()
            .start(vec![body(node)], Some(Rect::new(0.0, 100.0, 200.0, 20.0)));
        driver.on_frame(0.0, &mut stage);
        assert_eq!(driver.body_count(), 2);
    }
}
