//! Geometry falling
//!
//! Each line-art level drops into place from above the frame, one level
//! after another, while the base image fades in and out on its own schedule.
//!
//! Two phases:
//!
//! 1. levels fall and the image fades run; the timeline then rests
//! 2. the levels (and the base image, when this track owns it) fade out over
//!    one second, then every node this strategy created is removed

use ember_animation::{
    AdvanceOutcome, AnimationPreset, ControlledTimeline, Easing, Fired, Timeline, Tween,
};
use ember_core::{NodeId, NodeKind, Property, Stage};
use tracing::debug;

use super::{has_cue, AnimationStrategy, Cue, TrackContext};
use crate::config::FallingConfig;
use crate::geometry::LineArt;

/// Seconds each level takes to become visible before it falls
const LEVEL_FADE: f32 = 0.1;
/// Stroke width of line-art segments
const LINE_WIDTH: f32 = 1.0;

pub struct FallingAnimation {
    geometry: LineArt,
    config: FallingConfig,
    timeline: Option<ControlledTimeline<Cue>>,
    root: Option<NodeId>,
    image: Option<NodeId>,
    cleaned_up: bool,
}

impl FallingAnimation {
    pub fn new(geometry: LineArt, config: FallingConfig) -> Self {
        Self {
            geometry,
            config,
            timeline: None,
            root: None,
            image: None,
            cleaned_up: false,
        }
    }

    pub fn config(&self) -> &FallingConfig {
        &self.config
    }

    /// Start delay of level `index` out of `total`.
    ///
    /// Linear in the level index when acceleration is zero; otherwise
    /// `1 - (1 - i/N)^(1 + acceleration)`, which packs later levels closer
    /// together.
    pub fn level_delay(&self, index: usize, total: usize) -> f32 {
        if total == 0 {
            return 0.0;
        }
        let span = (self.config.duration - 2.0).max(0.0);
        let linear = index as f32 / total as f32;
        let fraction = if self.config.acceleration == 0.0 {
            linear
        } else {
            1.0 - (1.0 - linear).powf(1.0 + self.config.acceleration)
        };
        fraction * span
    }

    /// Start delays for every level, in level order
    pub fn level_delays(&self) -> Vec<f32> {
        let total = self.geometry.level_count();
        (0..total).map(|i| self.level_delay(i, total)).collect()
    }

    fn on_cues(&mut self, fired: Fired<Cue>, stage: &mut Stage) {
        if has_cue(&fired, Cue::Cleanup) {
            self.cleanup(stage);
        }
    }

    fn cleanup(&mut self, stage: &mut Stage) {
        if self.cleaned_up {
            return;
        }
        if let Some(root) = self.root.take() {
            stage.remove(root);
        }
        if let Some(image) = self.image.take() {
            stage.remove(image);
        }
        self.cleaned_up = true;
        debug!("falling cleanup done");
    }
}

impl AnimationStrategy for FallingAnimation {
    fn name(&self) -> &'static str {
        "falling"
    }

    fn create_timeline(&mut self, ctx: &TrackContext, stage: &mut Stage) {
        let root = stage.add_container(ctx.layer);
        stage.set_position(root, ctx.surface.center());

        let mut tl = Timeline::new();
        let total = self.geometry.level_count();
        let fall_from = -ctx.surface.height;

        for (index, level) in self.geometry.levels().iter().enumerate() {
            if level.is_empty() {
                continue;
            }
            let group = stage.add_container(root);
            for segment in level {
                stage.add(
                    group,
                    NodeKind::Line {
                        from: ctx.to_centered(segment.start),
                        to: ctx.to_centered(segment.end),
                        width: LINE_WIDTH,
                    },
                );
            }
            stage.set(group, Property::Y, fall_from);
            stage.set(group, Property::Alpha, 0.0);

            let delay = self.level_delay(index, total);
            tl.to_at(
                AnimationPreset::fade_in(group, LEVEL_FADE, Easing::Linear),
                delay,
            );
            tl.to_at(
                Tween::new(group, Property::Y, 0.0, self.config.fall_duration)
                    .ease(Easing::EaseOutCubic),
                delay,
            );
        }

        if let Some(fade) = self.config.fade_in.filter(|_| ctx.owns_image) {
            tl.to_at(
                AnimationPreset::fade_in(ctx.image, fade.duration, Easing::EaseInOutQuad),
                fade.start_time,
            );
        }
        if let Some(fade) = self.config.fade_out {
            if ctx.owns_image {
                tl.to_at(
                    AnimationPreset::fade_out(ctx.image, fade.duration, Easing::EaseInOutQuad),
                    fade.start_time,
                );
            }
            tl.to_at(
                AnimationPreset::fade_out(root, fade.duration, Easing::EaseInOutQuad),
                fade.start_time,
            );
        }

        let mut finale = vec![AnimationPreset::fade_out(root, 1.0, Easing::EaseInOutCubic)];
        if ctx.owns_image {
            finale.push(AnimationPreset::fade_out(ctx.image, 1.0, Easing::EaseInOutCubic));
        }
        tl.add_pause().group(finale).add_cue(Cue::Cleanup);

        debug!(
            levels = total,
            segments = self.geometry.segment_count(),
            "falling timeline built"
        );
        self.root = Some(root);
        self.image = ctx.owns_image.then_some(ctx.image);
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
        debug!(?outcome, phase = tl.cursor(), "falling advance");
        self.on_cues(fired, stage);
        outcome
    }

    fn tick(&mut self, dt: f32, stage: &mut Stage) {
        let Some(tl) = self.timeline.as_mut() else {
            return;
        };
        let fired = tl.tick(dt, stage);
        self.on_cues(fired, stage);
    }

    fn is_active(&self) -> bool {
        self.timeline.as_ref().is_some_and(|t| t.is_active())
    }

    fn complete(&mut self, stage: &mut Stage) {
        let Some(tl) = self.timeline.as_mut() else {
            return;
        };
        let fired = tl.force_complete(stage);
        self.on_cues(fired, stage);
        // The cleanup cue may have fired on an earlier tick; make sure.
        self.cleanup(stage);
    }

    fn is_complete(&self) -> bool {
        self.timeline.as_ref().map_or(true, |t| t.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use crate::strategy::testing::{run, track};
    use ember_animation::PlaybackStatus;
    use ember_core::Point;

    fn levels(count: usize) -> LineArt {
        LineArt::new(
            (0..count)
                .map(|i| {
                    vec![Segment {
                        start: Point::new(i as f32, 0.0),
                        end: Point::new(i as f32, 10.0),
                    }]
                })
                .collect(),
        )
    }

    fn config(acceleration: f32, duration: f32) -> FallingConfig {
        FallingConfig {
            acceleration,
            duration,
            ..FallingConfig::default()
        }
    }

    #[test]
    fn test_linear_delays_are_even() {
        let falling = FallingAnimation::new(levels(10), config(0.0, 12.0));
        let delays = falling.level_delays();
        assert_eq!(delays.len(), 10);
        for pair in delays.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_acceleration_compresses_toward_end() {
        let falling = FallingAnimation::new(levels(10), config(2.0, 12.0));
        let delays = falling.level_delays();
        let gaps: Vec<f32> = delays.windows(2).map(|p| p[1] - p[0]).collect();
        assert!(gaps.iter().all(|g| *g > 0.0));
        for pair in gaps.windows(2) {
            assert!(pair[1] < pair[0], "gaps not shrinking: {gaps:?}");
        }
    }

    #[test]
    fn test_short_duration_clamps_to_zero() {
        let falling = FallingAnimation::new(levels(3), config(0.0, 1.0));
        assert!(falling.level_delays().iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_two_phases_then_cleanup() {
        let (mut stage, ctx) = track();
        let mut falling = FallingAnimation::new(levels(4), config(0.0, 6.0));
        falling.create_timeline(&ctx, &mut stage);
        let root = stage.children(ctx.layer)[1];
        let groups = stage.children(root).to_vec();
        assert_eq!(groups.len(), 4);
        assert!(groups
            .iter()
            .all(|g| stage.get(*g, Property::Y) == Some(-ctx.surface.height)));

        assert_eq!(falling.advance(&mut stage), AdvanceOutcome::Started);
        run(&mut falling, &mut stage, 20.0);
        assert_eq!(falling.status(), PlaybackStatus::Paused);
        assert!(!falling.is_active());
        assert!(groups.iter().all(|g| stage.get(*g, Property::Y) == Some(0.0)));

        assert_eq!(falling.advance(&mut stage), AdvanceOutcome::Resumed);
        run(&mut falling, &mut stage, 1.1);
        assert!(falling.is_complete());
        assert!(!stage.contains(root));
        assert!(!stage.contains(ctx.image));
    }

    #[test]
    fn test_shared_image_is_left_alone() {
        let (mut stage, ctx) = track();
        let ctx = TrackContext {
            owns_image: false,
            ..ctx
        };
        let mut falling = FallingAnimation::new(levels(2), config(0.0, 4.0));
        falling.create_timeline(&ctx, &mut stage);
        let root = stage.children(ctx.layer)[1];

        falling.advance(&mut stage);
        run(&mut falling, &mut stage, 20.0);
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(0.0));

        falling.advance(&mut stage);
        run(&mut falling, &mut stage, 1.1);
        assert!(falling.is_complete());
        assert!(!stage.contains(root));
        assert!(stage.contains(ctx.image));
    }

    #[test]
    fn test_empty_levels_are_skipped() {
        let (mut stage, ctx) = track();
        let art = LineArt::new(vec![vec![], levels(1).levels()[0].clone()]);
        let mut falling = FallingAnimation::new(art, FallingConfig::default());
        falling.create_timeline(&ctx, &mut stage);
        let root = stage.children(ctx.layer)[1];
        assert_eq!(stage.children(root).len(), 1);
    }

    #[test]
    fn test_complete_removes_everything() {
        let (mut stage, ctx) = track();
        let mut falling = FallingAnimation::new(levels(3), FallingConfig::default());
        falling.create_timeline(&ctx, &mut stage);
        falling.advance(&mut stage);
        run(&mut falling, &mut stage, 0.5);

        falling.complete(&mut stage);
        assert!(falling.is_complete());
        assert_eq!(stage.children(ctx.layer).len(), 0);
    }
}
