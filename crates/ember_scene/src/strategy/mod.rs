//! Animation strategies
//!
//! A strategy turns one track of a scene (the base image, its geometry, or
//! its text) into stage nodes plus a timeline, and reacts to that track's
//! advance signal. Image and geometry strategies share the
//! [`AnimationStrategy`] contract and the phase discipline of
//! [`ControlledTimeline`]; the text strategy has its own line-driven contract,
//! [`TextStrategy`].
//!
//! Completion is cooperative: `complete` fast-forwards whatever can be
//! fast-forwarded and releases resources, and `is_complete` turns true once
//! the visual state is final. Some strategies still need a few ticks after
//! `complete` (pan/zoom always plays its fade-out).

use ember_animation::{AdvanceOutcome, ControlledTimeline, Fired, PlaybackStatus};
use ember_core::{NodeId, Point, Size, Stage};

use crate::config::Verse;

pub mod falling;
pub mod fadein;
pub mod panzoom;
pub mod slidestack;
pub mod waterfall;

pub use fadein::FadeInAnimation;
pub use falling::FallingAnimation;
pub use panzoom::PanZoomAnimation;
pub use slidestack::{LineAdvance, SlideStackAnimation};
pub use waterfall::WaterfallAnimation;

/// Requests a timeline hands back to the strategy that owns it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Populate the physics world and start stepping
    StartSimulation,
    /// Stop stepping and release the physics world
    StopSimulation,
    /// Remove the strategy's nodes from the stage
    Cleanup,
}

/// Where a track's strategy builds its nodes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackContext {
    /// Container the strategy owns nodes under
    pub layer: NodeId,
    /// The scene's base image sprite
    pub image: NodeId,
    /// Whether this track animates and removes the base image. A track that
    /// does not own it leaves the sprite untouched.
    pub owns_image: bool,
    /// Fit-to-surface scale applied to the base image
    pub scale: f32,
    /// Base image dimensions in pixels
    pub source: Size,
    /// Rendering surface dimensions
    pub surface: Size,
}

impl TrackContext {
    /// Map a point in source image pixels to coordinates relative to the
    /// image center, at the fit scale.
    pub fn to_centered(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.source.width / 2.0) * self.scale,
            (p.y - self.source.height / 2.0) * self.scale,
        )
    }
}

/// An image or geometry track
pub trait AnimationStrategy {
    /// Config type tag this strategy was resolved from
    fn name(&self) -> &'static str;

    /// Build nodes and the timeline. Called once, before any advance.
    fn create_timeline(&mut self, ctx: &TrackContext, stage: &mut Stage);

    /// The controlled timeline, once created
    fn timeline(&self) -> Option<&ControlledTimeline<Cue>>;

    /// Handle one advance-visual signal
    fn advance(&mut self, stage: &mut Stage) -> AdvanceOutcome;

    fn tick(&mut self, dt: f32, stage: &mut Stage);

    /// True while any motion or simulation has not come to rest
    fn is_active(&self) -> bool;

    /// Fast-forward to the terminal state and release resources
    fn complete(&mut self, stage: &mut Stage);

    /// True once the terminal visual state has been reached
    fn is_complete(&self) -> bool;

    fn status(&self) -> PlaybackStatus {
        self.timeline()
            .map_or(PlaybackStatus::NotStarted, |t| t.status())
    }
}

/// A text track
pub trait TextStrategy {
    fn name(&self) -> &'static str;

    /// Build the text nodes under `layer`
    fn create_container(&mut self, layer: NodeId, stage: &mut Stage);

    /// Replace the verses and rewind to the first line
    fn set_verses(&mut self, verses: Vec<Verse>, stage: &mut Stage);

    /// Handle one advance-text signal
    fn advance_line(&mut self, stage: &mut Stage) -> LineAdvance;

    /// Whether any line is still unseen
    fn has_more_content(&self) -> bool;

    fn tick(&mut self, dt: f32, stage: &mut Stage);

    fn is_active(&self) -> bool;

    /// Clear everything and move the cursor to the end
    fn complete(&mut self, stage: &mut Stage);

    fn is_complete(&self) -> bool;
}

pub(crate) fn has_cue(fired: &Fired<Cue>, cue: Cue) -> bool {
    fired.iter().any(|c| *c == cue)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use ember_core::NodeKind;

    pub const SURFACE: Size = Size::new(1000.0, 800.0);
    pub const SOURCE: Size = Size::new(500.0, 400.0);

    /// A stage with a track layer and a transparent base image at the center
    pub fn track() -> (Stage, TrackContext) {
        let mut stage = Stage::new(SURFACE);
        let layer = stage.add_container(stage.root());
        let image = stage.add(
            layer,
            NodeKind::Sprite {
                path: "test.png".into(),
                size: SOURCE,
            },
        );
        let scale = SOURCE.fit_scale(SURFACE, 0.0);
        stage.set_position(image, SURFACE.center());
        stage.set(image, ember_core::Property::Scale, scale);
        stage.set(image, ember_core::Property::Alpha, 0.0);
        let ctx = TrackContext {
            layer,
            image,
            owns_image: true,
            scale,
            source: SOURCE,
            surface: SURFACE,
        };
        (stage, ctx)
    }

    /// Tick in 1/60 s frames
    pub fn run(strategy: &mut dyn AnimationStrategy, stage: &mut Stage, seconds: f32) {
        let frames = (seconds * 60.0).ceil() as usize;
        for _ in 0..frames {
            strategy.tick(1.0 / 60.0, stage);
        }
    }
}
