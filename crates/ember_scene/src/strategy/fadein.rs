//! Image fade-in: the default image animation

use ember_animation::{AdvanceOutcome, AnimationPreset, ControlledTimeline, Timeline};
use ember_core::{Property, Stage};
use tracing::debug;

use super::{AnimationStrategy, Cue, TrackContext};
use crate::config::FadeInConfig;

/// Fades the base image in on the first advance
pub struct FadeInAnimation {
    config: FadeInConfig,
    timeline: Option<ControlledTimeline<Cue>>,
}

impl FadeInAnimation {
    pub fn new(config: FadeInConfig) -> Self {
        Self {
            config,
            timeline: None,
        }
    }

    pub fn config(&self) -> &FadeInConfig {
        &self.config
    }
}

impl AnimationStrategy for FadeInAnimation {
    fn name(&self) -> &'static str {
        "fadein"
    }

    fn create_timeline(&mut self, ctx: &TrackContext, stage: &mut Stage) {
        stage.set(ctx.image, Property::Alpha, 0.0);
        let mut tl = Timeline::new();
        tl.to(AnimationPreset::fade_in(
            ctx.image,
            self.config.duration,
            self.config.ease,
        ));
        self.timeline = Some(ControlledTimeline::new(tl));
    }

    fn timeline(&self) -> Option<&ControlledTimeline<Cue>> {
        self.timeline.as_ref()
    }

    fn advance(&mut self, stage: &mut Stage) -> AdvanceOutcome {
        let Some(tl) = self.timeline.as_mut() else {
            return AdvanceOutcome::Ignored;
        };
        let (outcome, _) = tl.advance(stage);
        debug!(?outcome, "fadein advance");
        outcome
    }

    fn tick(&mut self, dt: f32, stage: &mut Stage) {
        if let Some(tl) = self.timeline.as_mut() {
            tl.tick(dt, stage);
        }
    }

    fn is_active(&self) -> bool {
        self.timeline.as_ref().is_some_and(|t| t.is_active())
    }

    fn complete(&mut self, stage: &mut Stage) {
        if let Some(tl) = self.timeline.as_mut() {
            tl.force_complete(stage);
        }
    }

    fn is_complete(&self) -> bool {
        self.timeline.as_ref().map_or(true, |t| t.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::{run, track};

    #[test]
    fn test_fades_in_on_first_advance() {
        let (mut stage, ctx) = track();
        let mut fade = FadeInAnimation::new(FadeInConfig::default());
        fade.create_timeline(&ctx, &mut stage);
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(0.0));

        run(&mut fade, &mut stage, 1.0);
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(0.0));

        assert_eq!(fade.advance(&mut stage), AdvanceOutcome::Started);
        assert!(fade.is_active());
        run(&mut fade, &mut stage, 1.6);
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(1.0));
        assert!(fade.is_complete());
        assert!(!fade.is_active());
    }

    #[test]
    fn test_complete_before_start() {
        let (mut stage, ctx) = track();
        let mut fade = FadeInAnimation::new(FadeInConfig::default());
        fade.create_timeline(&ctx, &mut stage);
        fade.complete(&mut stage);
        assert!(fade.is_complete());
        assert_eq!(stage.get(ctx.image, Property::Alpha), Some(1.0));
    }
}
