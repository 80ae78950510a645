//! Scene orchestrator
//!
//! Owns the stage and the three tracks of the current scene (image, geometry,
//! text) and routes the two advance signals to them. Scene lifecycle is a
//! small state machine:
//!
//! ```text
//!   Empty --load--> Loading --loaded--> Active --complete--> Completing
//!     ^                |                                         |
//!     +----failed------+                                         |
//!     +-------------------------cleared--------------------------+
//! ```
//!
//! `Loading` and `Completing` are the transitioning states. Advance signals
//! arriving in them are dropped, and a load requested in them is refused.
//! Completion is cooperative: [`SceneOrchestrator::complete_scene`] asks every
//! track to finish, and the scene is torn down on the first poll (immediately,
//! or on a later [`SceneOrchestrator::tick`]) at which every track reports
//! complete.

use ember_animation::AdvanceOutcome;
use ember_core::{NodeId, NodeKind, Property, Signal, Size, Stage, StateId, StateMachine};
use tracing::{debug, info, warn};

use crate::assets::AssetSource;
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::geometry::{Geometry, GeometryKind};
use crate::registry;
use crate::strategy::{AnimationStrategy, LineAdvance, TextStrategy, TrackContext};

pub mod states {
    use ember_core::StateId;

    pub const EMPTY: StateId = 0;
    pub const LOADING: StateId = 1;
    pub const ACTIVE: StateId = 2;
    pub const COMPLETING: StateId = 3;
}

mod events {
    use ember_core::EventId;

    pub const LOAD: EventId = 1;
    pub const LOADED: EventId = 2;
    pub const FAILED: EventId = 3;
    pub const COMPLETE: EventId = 4;
    pub const CLEARED: EventId = 5;
}

/// Scene lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneState {
    Empty,
    Loading,
    Active,
    Completing,
}

impl SceneState {
    fn from_id(id: StateId) -> Self {
        match id {
            states::LOADING => SceneState::Loading,
            states::ACTIVE => SceneState::Active,
            states::COMPLETING => SceneState::Completing,
            _ => SceneState::Empty,
        }
    }
}

/// Per-track result of one advance-visual signal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualAdvance {
    pub image: Option<AdvanceOutcome>,
    pub geometry: Option<AdvanceOutcome>,
}

/// Stage containers, bottom to top
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layers {
    pub image: NodeId,
    pub geometry: NodeId,
    pub text: NodeId,
}

/// Strategies resolved for a scene, before anything touches the stage
struct Resolved {
    image: Option<Box<dyn AnimationStrategy>>,
    geometry: Option<Box<dyn AnimationStrategy>>,
    text: Option<Box<dyn TextStrategy>>,
    source: Size,
}

pub struct SceneOrchestrator<A: AssetSource> {
    assets: A,
    stage: Stage,
    layers: Layers,
    image: Option<Box<dyn AnimationStrategy>>,
    geometry: Option<Box<dyn AnimationStrategy>>,
    text: Option<Box<dyn TextStrategy>>,
    lifecycle: StateMachine,
    current: Option<SceneConfig>,
}

fn lifecycle() -> StateMachine {
    use events::*;
    use states::*;

    StateMachine::builder(EMPTY)
        .on(EMPTY, LOAD, LOADING)
        .on(LOADING, LOADED, ACTIVE)
        .on(LOADING, FAILED, EMPTY)
        .on(ACTIVE, COMPLETE, COMPLETING)
        .on(COMPLETING, CLEARED, EMPTY)
        .build()
}

impl<A: AssetSource> SceneOrchestrator<A> {
    pub fn new(assets: A, surface: Size) -> Self {
        let mut stage = Stage::new(surface);
        let root = stage.root();
        let layers = Layers {
            image: stage.add_container(root),
            geometry: stage.add_container(root),
            text: stage.add_container(root),
        };
        Self {
            assets,
            stage,
            layers,
            image: None,
            geometry: None,
            text: None,
            lifecycle: lifecycle(),
            current: None,
        }
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn layers(&self) -> Layers {
        self.layers
    }

    /// Resize the rendering surface. Applies from the next scene load.
    pub fn set_surface(&mut self, surface: Size) {
        self.stage.set_surface(surface);
    }

    pub fn state(&self) -> SceneState {
        SceneState::from_id(self.lifecycle.current_state())
    }

    pub fn current_scene(&self) -> Option<&SceneConfig> {
        self.current.as_ref()
    }

    pub fn image_track(&self) -> Option<&dyn AnimationStrategy> {
        self.image.as_deref()
    }

    pub fn geometry_track(&self) -> Option<&dyn AnimationStrategy> {
        self.geometry.as_deref()
    }

    pub fn text_track(&self) -> Option<&dyn TextStrategy> {
        self.text.as_deref()
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state(), SceneState::Loading | SceneState::Completing)
    }

    /// True while any track is still moving
    pub fn is_scene_active(&self) -> bool {
        self.image.as_ref().is_some_and(|t| t.is_active())
            || self.geometry.as_ref().is_some_and(|t| t.is_active())
            || self.text.as_ref().is_some_and(|t| t.is_active())
    }

    pub fn load_scene_by_id(&mut self, id: &str) -> Result<()> {
        if self.is_transitioning() {
            return Err(SceneError::Busy);
        }
        let config = self.assets.load_scene(id)?;
        self.load_scene(config)
    }

    /// Replace the current scene. An active scene is torn down without
    /// waiting for its tracks; use [`complete_scene`](Self::complete_scene)
    /// first for a graceful handover.
    pub fn load_scene(&mut self, config: SceneConfig) -> Result<()> {
        if self.is_transitioning() {
            return Err(SceneError::Busy);
        }
        if self.state() == SceneState::Active {
            self.lifecycle.send(events::COMPLETE);
            self.complete_tracks();
            self.teardown();
        }

        self.lifecycle.send(events::LOAD);
        info!(scene = %config.id, "loading scene");
        let resolved = match self.resolve(&config) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(scene = %config.id, error = %err, "scene load failed");
                self.lifecycle.send(events::FAILED);
                return Err(err);
            }
        };
        self.build(&config, resolved);
        self.current = Some(config);
        self.lifecycle.send(events::LOADED);
        Ok(())
    }

    /// Load assets and resolve strategies. Nothing touches the stage.
    fn resolve(&self, config: &SceneConfig) -> Result<Resolved> {
        config.validate()?;
        let image = self.assets.load_image(&config.image.path)?;

        let geometry = match &config.image.geometry {
            Some(geo) => {
                let kind = GeometryKind::from_name(&geo.kind)?;
                let data = self.assets.load_geometry(kind, &geo.data)?;
                let geometry = Geometry::load(kind, &data)?;
                Some(registry::geometry_strategy(
                    &geo.animation,
                    geometry,
                    config.duration,
                )?)
            }
            None => None,
        };

        // With geometry present the image only gets its own track when asked.
        let image_track = match (&geometry, &config.image.animation) {
            (Some(_), None) => None,
            (_, spec) => Some(registry::image_strategy(spec.as_ref())?),
        };

        let text = match &config.text {
            Some(text) => Some(registry::text_strategy(&text.animation)?),
            None => None,
        };

        Ok(Resolved {
            image: image_track,
            geometry,
            text,
            source: image.size,
        })
    }

    fn build(&mut self, config: &SceneConfig, resolved: Resolved) {
        let Resolved {
            mut image,
            mut geometry,
            mut text,
            source,
        } = resolved;
        let surface = self.stage.surface();
        let scale = source.fit_scale(surface, config.image.padding);

        let sprite = self.stage.add(
            self.layers.image,
            NodeKind::Sprite {
                path: config.image.path.clone(),
                size: source,
            },
        );
        self.stage.set_position(sprite, surface.center());
        self.stage.set(sprite, Property::Scale, scale);
        self.stage.set(sprite, Property::Alpha, 0.0);

        let ctx = TrackContext {
            layer: self.layers.image,
            image: sprite,
            owns_image: true,
            scale,
            source,
            surface,
        };
        if let Some(track) = image.as_mut() {
            track.create_timeline(&ctx, &mut self.stage);
        }
        if let Some(track) = geometry.as_mut() {
            let ctx = TrackContext {
                layer: self.layers.geometry,
                owns_image: image.is_none(),
                ..ctx
            };
            track.create_timeline(&ctx, &mut self.stage);
        }
        if let (Some(track), Some(config)) = (text.as_mut(), config.text.as_ref()) {
            track.create_container(self.layers.text, &mut self.stage);
            track.set_verses(config.verses.clone(), &mut self.stage);
        }

        info!(
            scene = %config.id,
            scale,
            image = image.as_ref().map(|t| t.name()),
            geometry = geometry.as_ref().map(|t| t.name()),
            text = text.as_ref().map(|t| t.name()),
            "scene loaded"
        );
        self.image = image;
        self.geometry = geometry;
        self.text = text;
    }

    /// Route an advance-visual signal to the image and geometry tracks.
    /// Returns `None` if the signal was dropped.
    pub fn on_advance_visual(&mut self) -> Option<VisualAdvance> {
        if self.state() != SceneState::Active {
            debug!(state = ?self.state(), "advance visual dropped");
            return None;
        }
        let stage = &mut self.stage;
        let result = VisualAdvance {
            image: self.image.as_mut().map(|t| t.advance(stage)),
            geometry: self.geometry.as_mut().map(|t| t.advance(stage)),
        };
        debug!(?result, "advance visual");
        Some(result)
    }

    /// Route an advance-text signal to the text track. Returns `None` if the
    /// signal was dropped or the scene has no text.
    pub fn on_advance_text(&mut self) -> Option<LineAdvance> {
        if self.state() != SceneState::Active {
            debug!(state = ?self.state(), "advance text dropped");
            return None;
        }
        let line = self.text.as_mut()?.advance_line(&mut self.stage);
        debug!(?line, "advance text");
        Some(line)
    }

    /// Handle an advance signal. Scene navigation signals are not ours.
    pub fn on_signal(&mut self, signal: Signal) -> bool {
        match signal {
            Signal::AdvanceVisual => self.on_advance_visual().is_some(),
            Signal::AdvanceText => self.on_advance_text().is_some(),
            Signal::NextScene | Signal::PreviousScene => false,
        }
    }

    /// Ask every track to finish and tear the scene down once they have.
    /// Safe to call with no scene loaded or while already completing.
    pub fn complete_scene(&mut self) {
        if self.state() != SceneState::Active {
            debug!(state = ?self.state(), "complete_scene ignored");
            return;
        }
        self.lifecycle.send(events::COMPLETE);
        info!(
            scene = self.current.as_ref().map(|c| c.id.as_str()),
            "completing scene"
        );
        self.complete_tracks();
        self.poll_completion();
    }

    fn complete_tracks(&mut self) {
        if let Some(track) = self.geometry.as_mut() {
            track.complete(&mut self.stage);
        }
        if let Some(track) = self.image.as_mut() {
            track.complete(&mut self.stage);
        }
        if let Some(track) = self.text.as_mut() {
            track.complete(&mut self.stage);
        }
    }

    fn tracks_complete(&self) -> bool {
        self.image.as_ref().map_or(true, |t| t.is_complete())
            && self.geometry.as_ref().map_or(true, |t| t.is_complete())
            && self.text.as_ref().map_or(true, |t| t.is_complete())
    }

    fn poll_completion(&mut self) {
        if self.state() == SceneState::Completing && self.tracks_complete() {
            self.teardown();
        }
    }

    fn teardown(&mut self) {
        self.image = None;
        self.geometry = None;
        self.text = None;
        self.stage.clear_children(self.layers.image);
        self.stage.clear_children(self.layers.geometry);
        self.stage.clear_children(self.layers.text);
        if let Some(scene) = self.current.take() {
            info!(scene = %scene.id, "scene torn down");
        }
        self.lifecycle.send(events::CLEARED);
    }

    /// Advance every track by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if let Some(track) = self.image.as_mut() {
            track.tick(dt, &mut self.stage);
        }
        if let Some(track) = self.geometry.as_mut() {
            track.tick(dt, &mut self.stage);
        }
        if let Some(track) = self.text.as_mut() {
            track.tick(dt, &mut self.stage);
        }
        self.poll_completion();
    }
}
