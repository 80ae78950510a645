//! Geometry waterfall
//!
//! The image dissolves into its point cloud, which then pours down under
//! physics. The timeline brackets the simulation with cues and never touches
//! the world itself; the strategy turns the cues into driver commands.
//!
//! Phases:
//!
//! 1. fade in the raster image, then rest
//! 2. fade in the particle layer with a random per-particle stagger and fade
//!    the raster out; cue the simulation start; let it run for
//!    `pointsFade.duration`; fade everything out; cue the simulation stop

use ember_animation::{
    AdvanceOutcome, AnimationPreset, ControlledTimeline, Easing, Fired, Timeline,
};
use ember_core::{NodeId, NodeKind, Point, Property, Rect, Stage, Vec2};
use ember_physics::{
    BodySpec, DriverHandle, Material, PhysicsWorld, RapierWorld, SimulationDriver,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{has_cue, AnimationStrategy, Cue, TrackContext};
use crate::config::WaterfallConfig;
use crate::geometry::PointCloud;

/// Stage units per second squared for one unit of configured gravity
pub const GRAVITY_SCALE: f32 = 1000.0;
/// Configured velocities are per 60 Hz step; the world wants per second
const VELOCITY_SCALE: f32 = 60.0;
/// Drag lost per second by each particle
const AIR_FRICTION: f32 = 0.06;
const FLOOR_THICKNESS: f32 = 20.0;
const LAYER_FADE: f32 = 0.5;
const PARTICLE_FADE: f32 = 2.0;
const FINAL_FADE: f32 = 1.0;

pub struct WaterfallAnimation<W: PhysicsWorld = RapierWorld> {
    geometry: PointCloud,
    config: WaterfallConfig,
    driver: SimulationDriver<W>,
    handle: DriverHandle,
    rng: StdRng,
    timeline: Option<ControlledTimeline<Cue>>,
    particles: Vec<NodeId>,
    floor: Option<Rect>,
}

impl WaterfallAnimation<RapierWorld> {
    pub fn new(geometry: PointCloud, config: WaterfallConfig) -> Self {
        let world = RapierWorld::new(Vec2::new(0.0, config.gravity * GRAVITY_SCALE));
        Self::with_world(geometry, config, world)
    }
}

impl<W: PhysicsWorld> WaterfallAnimation<W> {
    pub fn with_world(geometry: PointCloud, config: WaterfallConfig, world: W) -> Self {
        let driver = SimulationDriver::new(world);
        let handle = driver.handle();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            geometry,
            config,
            driver,
            handle,
            rng,
            timeline: None,
            particles: Vec::new(),
            floor: None,
        }
    }

    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }

    pub fn driver(&self) -> &SimulationDriver<W> {
        &self.driver
    }

    pub fn particles(&self) -> &[NodeId] {
        &self.particles
    }

    fn on_cues(&mut self, fired: Fired<Cue>, stage: &Stage) {
        if has_cue(&fired, Cue::StartSimulation) {
            self.start_simulation(stage);
        }
        if has_cue(&fired, Cue::StopSimulation) {
            self.handle.stop();
        }
    }

    fn start_simulation(&mut self, stage: &Stage) {
        let material = Material {
            restitution: self.config.bounce,
            friction: self.config.friction,
            air_friction: AIR_FRICTION,
        };
        let dispersion = self.config.horizontal_dispersion;
        let bodies: Vec<BodySpec> = self
            .particles
            .iter()
            .filter_map(|node| {
                let position = stage.node(*node)?.position;
                Some((*node, position))
            })
            .map(|(node, position)| BodySpec {
                node,
                position,
                radius: self.config.particle_size,
                velocity: Vec2::new(
                    (self.rng.gen::<f32>() - 0.5) * dispersion * VELOCITY_SCALE,
                    0.0,
                ),
                material,
            })
            .collect();
        info!(bodies = bodies.len(), "waterfall simulation starting");
        self.handle.start(bodies, self.floor);
    }
}

impl<W: PhysicsWorld> AnimationStrategy for WaterfallAnimation<W> {
    fn name(&self) -> &'static str {
        "waterfall"
    }

    fn create_timeline(&mut self, ctx: &TrackContext, stage: &mut Stage) {
        let root = stage.add_container(ctx.layer);
        stage.set_position(root, ctx.surface.center());
        let layer = stage.add_container(root);
        stage.set(layer, Property::Alpha, 0.0);

        self.particles = self
            .geometry
            .points()
            .iter()
            .map(|p| {
                let particle = stage.add(
                    layer,
                    NodeKind::Particle {
                        radius: self.config.particle_size,
                    },
                );
                stage.set_position(particle, ctx.to_centered(*p));
                stage.set(particle, Property::Alpha, 0.0);
                particle
            })
            .collect();

        let half = Point::new(
            ctx.source.width * ctx.scale / 2.0,
            ctx.source.height * ctx.scale / 2.0,
        );
        self.floor = Some(Rect::new(
            -half.x * 2.0,
            half.y,
            half.x * 4.0,
            FLOOR_THICKNESS,
        ));

        let raster = self.config.raster_fade;
        let mut tl = Timeline::new();

        // Phase 1
        if ctx.owns_image {
            tl.to(AnimationPreset::fade_in(ctx.image, raster.duration, raster.ease));
        } else {
            tl.hold(raster.duration);
        }
        tl.add_pause();

        // Phase 2
        tl.to(AnimationPreset::fade_in(layer, LAYER_FADE, Easing::Linear));
        let start = tl.end();
        let mut order: Vec<usize> = (0..self.particles.len()).collect();
        order.shuffle(&mut self.rng);
        let step = if order.len() > 1 {
            self.config.points_fade.stagger / (order.len() - 1) as f32
        } else {
            0.0
        };
        for (rank, index) in order.into_iter().enumerate() {
            tl.to_at(
                AnimationPreset::fade_in(self.particles[index], PARTICLE_FADE, Easing::Linear),
                start + rank as f32 * step,
            );
        }
        if ctx.owns_image {
            tl.to(AnimationPreset::fade_out(ctx.image, raster.duration, raster.ease));
        } else {
            tl.hold(raster.duration);
        }
        let mut finale = vec![AnimationPreset::fade_out(
            layer,
            FINAL_FADE,
            Easing::EaseInOutCubic,
        )];
        if ctx.owns_image {
            finale.push(AnimationPreset::fade_out(ctx.image, FINAL_FADE, Easing::EaseInOutCubic));
        }
        tl.add_cue(Cue::StartSimulation)
            .hold(self.config.points_fade.duration)
            .group(finale)
            .add_cue(Cue::StopSimulation);

        debug!(
            particles = self.particles.len(),
            duration = tl.duration(),
            "waterfall timeline built"
        );
        self.timeline = Some(ControlledTimeline::new(tl));
    }

    fn timeline(&self) -> Option<&ControlledTimeline<Cue>> {
        self.timeline.as_ref()
    }

    fn advance(&mut self, stage: &mut Stage) -> AdvanceOutcome {
        let Some(tl) = self.timeline.as_mut() else {
            return AdvanceOutcome::Ignored;
        };
        let (outcome, fired) = tl.advance(stage);
        debug!(?outcome, phase = tl.cursor(), "waterfall advance");
        self.on_cues(fired, stage);
        outcome
    }

    fn tick(&mut self, dt: f32, stage: &mut Stage) {
        if let Some(tl) = self.timeline.as_mut() {
            let fired = tl.tick(dt, stage);
            self.on_cues(fired, stage);
        }
        self.driver.on_frame(dt, stage);
        if self.is_complete() && !self.driver.is_released() {
            self.driver.release();
        }
    }

    fn is_active(&self) -> bool {
        self.driver.is_running() || self.timeline.as_ref().is_some_and(|t| t.is_active())
    }

    fn complete(&mut self, stage: &mut Stage) {
        if let Some(tl) = self.timeline.as_mut() {
            // Cues fired by the fast-forward are dropped: a simulation that
            // never started is not started now.
            tl.force_complete(stage);
        }
        self.handle.stop();
        self.driver.release();
        info!(steps = self.driver.steps(), "waterfall simulation released");
    }

    fn is_complete(&self) -> bool {
        self.timeline.as_ref().map_or(true, |t| t.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::{run, track};
    use ember_animation::PlaybackStatus;

    fn cloud() -> PointCloud {
        PointCloud::new(
            (0..20)
                .map(|i| Point::new(100.0 + i as f32 * 10.0, 150.0))
                .collect(),
        )
    }

    fn seeded() -> WaterfallConfig {
        WaterfallConfig {
            seed: Some(7),
            ..WaterfallConfig::default()
        }
    }

    #[test]
    fn test_phase_one_rests_before_particles() {
        let (mut stage, ctx) = track();
        let mut wf = WaterfallAnimation::new(cloud(), seeded());
        wf.create_timeline(&ctx, &mut stage);
        assert_eq!(wf.particles().len(), 20);

        wf.advance(&mut stage);
        run(&mut wf, &mut stage, 3.0);
        assert_eq!(wf.status(), PlaybackStatus::Paused);
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(1.0));
        assert!(wf
            .particles()
            .iter()
            .all(|p| stage.get(*p, Property::Alpha) == Some(0.0)));
        assert_eq!(wf.driver().steps(), 0);
    }

    #[test]
    fn test_simulation_moves_particles_then_stops() {
        let (mut stage, ctx) = track();
        let mut wf = WaterfallAnimation::new(cloud(), seeded());
        wf.create_timeline(&ctx, &mut stage);
        let first = wf.particles()[0];
        let start_y = stage.node(first).map(|n| n.position.y).unwrap_or_default();

        wf.advance(&mut stage);
        run(&mut wf, &mut stage, 3.0);
        wf.advance(&mut stage);
        // Layer fade, stagger, particle fades and raster fade-out.
        run(&mut wf, &mut stage, 5.5);
        assert!(wf.driver().is_running());
        run(&mut wf, &mut stage, 1.0);
        assert!(wf.driver().position_writes() > 0);
        let y = stage.node(first).map(|n| n.position.y).unwrap_or_default();
        assert!(y > start_y, "particle did not fall: {start_y} -> {y}");

        run(&mut wf, &mut stage, 12.0);
        assert!(wf.is_complete());
        assert!(wf.driver().is_released());
        assert!(!wf.is_active());
    }

    #[test]
    fn test_complete_mid_simulation_stops_writes() {
        let (mut stage, ctx) = track();
        let mut wf = WaterfallAnimation::new(cloud(), seeded());
        wf.create_timeline(&ctx, &mut stage);
        wf.advance(&mut stage);
        wf.advance(&mut stage);
        wf.advance(&mut stage);
        run(&mut wf, &mut stage, 7.0);
        assert!(wf.driver().is_running());

        wf.complete(&mut stage);
        assert!(wf.is_complete());
        assert!(wf.driver().is_released());
        assert_eq!(wf.driver().body_count(), 0);

        let writes = wf.driver().position_writes();
        run(&mut wf, &mut stage, 1.0);
        assert_eq!(wf.driver().position_writes(), writes);
        assert!(!wf.is_active());
    }

    #[test]
    fn test_complete_before_simulation_never_starts_it() {
        let (mut stage, ctx) = track();
        let mut wf = WaterfallAnimation::new(cloud(), seeded());
        wf.create_timeline(&ctx, &mut stage);
        wf.advance(&mut stage);
        wf.complete(&mut stage);
        run(&mut wf, &mut stage, 1.0);
        assert_eq!(wf.driver().steps(), 0);
        assert!(wf.driver().is_released());
    }
}
