//! Image pan/zoom
//!
//! A camera-like walk through a list of keyframe views. Phase 1 shows the
//! image at the first view and fades it in; each following phase moves to the
//! next view; the last phase fades the image out.
//!
//! View offsets are fractions of the surface measured from its center, so
//! `x = 0.2` looks at a point one fifth of the surface width right of center
//! (the image moves left). Scales multiply the fit scale and are capped at
//! twice the cover scale.

use ember_animation::{AdvanceOutcome, AnimationPreset, ControlledTimeline, Timeline, Tween};
use ember_core::{NodeId, Point, Property, Size, Stage};
use tracing::debug;

use super::{AnimationStrategy, Cue, TrackContext};
use crate::config::{PanZoomConfig, View};

pub struct PanZoomAnimation {
    config: PanZoomConfig,
    timeline: Option<ControlledTimeline<Cue>>,
    /// Final view plus fade-out, used when completed mid-sequence
    closing: Option<Timeline<Cue>>,
    target: Option<Resolved>,
}

#[derive(Clone, Copy, Debug)]
struct Resolved {
    image: NodeId,
    final_position: Point,
    final_scale: f32,
}

impl PanZoomAnimation {
    pub fn new(config: PanZoomConfig) -> Self {
        Self {
            config,
            timeline: None,
            closing: None,
            target: None,
        }
    }

    pub fn config(&self) -> &PanZoomConfig {
        &self.config
    }

    fn views(&self) -> Vec<View> {
        if self.config.keyframes.is_empty() {
            return vec![View::new(0.0, 0.0, 1.0, 0.0)];
        }
        self.config.keyframes.iter().map(|k| k.view).collect()
    }
}

/// Stage position and scale of the image for a view
fn place_view(view: &View, ctx: &TrackContext) -> (Point, f32) {
    let center = ctx.surface.center();
    let position = Point::new(
        center.x - view.x * ctx.surface.width,
        center.y - view.y * ctx.surface.height,
    );
    (position, (view.scale * ctx.scale).min(max_scale(ctx.source, ctx.surface)))
}

fn max_scale(source: Size, surface: Size) -> f32 {
    if source.width <= 0.0 || source.height <= 0.0 {
        return f32::MAX;
    }
    (surface.width / source.width).max(surface.height / source.height) * 2.0
}

impl AnimationStrategy for PanZoomAnimation {
    fn name(&self) -> &'static str {
        "panzoom"
    }

    fn create_timeline(&mut self, ctx: &TrackContext, stage: &mut Stage) {
        stage.set(ctx.image, Property::Alpha, 0.0);
        let views = self.views();
        let mut tl = Timeline::new();

        let (first_position, first_scale) = place_view(&views[0], ctx);
        tl.group(AnimationPreset::place(ctx.image, first_position, first_scale));
        tl.to(AnimationPreset::fade_in(
            ctx.image,
            self.config.fade_in.duration,
            self.config.fade_in.ease,
        ));

        let mut last = (first_position, first_scale);
        for view in &views[1..] {
            let (position, scale) = place_view(view, ctx);
            tl.add_pause().group(AnimationPreset::view_to(
                ctx.image,
                position,
                scale,
                view.duration,
                self.config.transition_ease,
            ));
            last = (position, scale);
        }

        tl.add_pause().to(AnimationPreset::fade_out(
            ctx.image,
            self.config.fade_out.duration,
            self.config.fade_out.ease,
        ));

        debug!(keyframes = views.len(), "panzoom timeline built");
        self.target = Some(Resolved {
            image: ctx.image,
            final_position: last.0,
            final_scale: last.1,
        });
        self.timeline = Some(ControlledTimeline::new(tl));
    }

    fn timeline(&self) -> Option<&ControlledTimeline<Cue>> {
        self.timeline.as_ref()
    }

    fn advance(&mut self, stage: &mut Stage) -> AdvanceOutcome {
        if self.closing.is_some() {
            return AdvanceOutcome::Ignored;
        }
        let Some(tl) = self.timeline.as_mut() else {
            return AdvanceOutcome::Ignored;
        };
        let (outcome, _) = tl.advance(stage);
        debug!(?outcome, phase = tl.cursor(), "panzoom advance");
        outcome
    }

    fn tick(&mut self, dt: f32, stage: &mut Stage) {
        if let Some(closing) = self.closing.as_mut() {
            closing.tick(dt, stage);
        } else if let Some(tl) = self.timeline.as_mut() {
            tl.tick(dt, stage);
        }
    }

    fn is_active(&self) -> bool {
        match &self.closing {
            Some(closing) => closing.is_active(),
            None => self.timeline.as_ref().is_some_and(|t| t.is_active()),
        }
    }

    fn complete(&mut self, stage: &mut Stage) {
        if self.closing.is_some() {
            return;
        }
        let (Some(tl), Some(target)) = (self.timeline.as_mut(), self.target) else {
            return;
        };
        if tl.is_complete() {
            return;
        }
        // Already fading out: let it finish.
        if tl.cursor() == tl.phase_count() {
            return;
        }

        // Jump to the last view, then always play the fade-out.
        let mut closing = Timeline::new();
        closing.group(AnimationPreset::place(
            target.image,
            target.final_position,
            target.final_scale,
        ));
        if tl.cursor() > 0 {
            closing.to(Tween::set(target.image, Property::Alpha, 1.0));
        }
        closing.to(AnimationPreset::fade_out(
            target.image,
            self.config.fade_out.duration,
            self.config.fade_out.ease,
        ));
        tl.kill();
        closing.play();
        closing.tick(0.0, stage);
        debug!("panzoom completing with fade-out");
        self.closing = Some(closing);
    }

    fn is_complete(&self) -> bool {
        match &self.closing {
            Some(closing) => closing.is_complete(),
            None => self.timeline.as_ref().map_or(true, |t| t.is_complete()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyframe;
    use crate::strategy::testing::{run, track};
    use ember_animation::{Easing, PlaybackStatus};

    fn two_keyframes() -> PanZoomConfig {
        PanZoomConfig {
            keyframes: vec![
                Keyframe {
                    view: View::new(0.0, 0.0, 1.0, 1.0),
                },
                Keyframe {
                    view: View::new(0.2, 0.0, 2.0, 2.0),
                },
            ],
            transition_ease: Easing::Linear,
            ..PanZoomConfig::default()
        }
    }

    fn pos(stage: &Stage, node: NodeId) -> Point {
        stage.node(node).map(|n| n.position).unwrap_or_default()
    }

    #[test]
    fn test_four_advances() {
        let (mut stage, ctx) = track();
        let mut pz = PanZoomAnimation::new(two_keyframes());
        pz.create_timeline(&ctx, &mut stage);
        let center = ctx.surface.center();

        // First advance: keyframe 0 placed instantly, then fade in.
        assert_eq!(pz.advance(&mut stage), AdvanceOutcome::Started);
        assert_eq!(pos(&stage, ctx.image), center);
        assert_eq!(stage.get(ctx.image, Property::Scale), Some(ctx.scale));
        run(&mut pz, &mut stage, 2.5);
        assert_eq!(pz.status(), PlaybackStatus::Paused);
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(1.0));
        assert_eq!(pos(&stage, ctx.image), center);

        // Second advance: move to keyframe 1 over 2 seconds.
        assert_eq!(pz.advance(&mut stage), AdvanceOutcome::Resumed);
        run(&mut pz, &mut stage, 1.0);
        let halfway = pos(&stage, ctx.image);
        assert!(halfway.x < center.x && halfway.x > center.x - 200.0);
        run(&mut pz, &mut stage, 1.1);
        assert_eq!(pz.status(), PlaybackStatus::Paused);
        assert!((pos(&stage, ctx.image).x - (center.x - 200.0)).abs() < 1e-3);
        assert_eq!(stage.get(ctx.image, Property::Scale), Some(2.0 * ctx.scale));

        // Third advance: fade out.
        assert_eq!(pz.advance(&mut stage), AdvanceOutcome::Resumed);
        run(&mut pz, &mut stage, 2.5);
        assert!(pz.is_complete());
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(0.0));

        // Fourth advance: nothing left.
        assert_eq!(pz.advance(&mut stage), AdvanceOutcome::Ignored);
    }

    #[test]
    fn test_scale_is_capped() {
        let (mut stage, ctx) = track();
        let config = PanZoomConfig {
            keyframes: vec![Keyframe {
                view: View::new(0.0, 0.0, 50.0, 1.0),
            }],
            ..PanZoomConfig::default()
        };
        let mut pz = PanZoomAnimation::new(config);
        pz.create_timeline(&ctx, &mut stage);
        pz.advance(&mut stage);
        let cap = max_scale(ctx.source, ctx.surface);
        assert_eq!(stage.get(ctx.image, Property::Scale), Some(cap));
    }

    #[test]
    fn test_complete_mid_sequence_plays_fade_out() {
        let (mut stage, ctx) = track();
        let mut pz = PanZoomAnimation::new(two_keyframes());
        pz.create_timeline(&ctx, &mut stage);
        pz.advance(&mut stage);
        run(&mut pz, &mut stage, 0.5);

        pz.complete(&mut stage);
        assert!(!pz.is_complete());
        assert!((pos(&stage, ctx.image).x - (ctx.surface.center().x - 200.0)).abs() < 1e-3);
        assert_eq!(stage.get(ctx.image, Property::Scale), Some(2.0 * ctx.scale));
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(1.0));
        assert_eq!(pz.advance(&mut stage), AdvanceOutcome::Ignored);

        run(&mut pz, &mut stage, 1.0);
        assert!(!pz.is_complete());
        run(&mut pz, &mut stage, 1.1);
        assert!(pz.is_complete());
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(0.0));
    }
}
