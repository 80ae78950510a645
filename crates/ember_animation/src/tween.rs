//! Property tweens
//!
//! A tween drives one scalar property of one stage node from a start value to
//! an end value over a duration. Unless an explicit start is given, the start
//! value is read from the stage the first time the tween becomes active, so a
//! tween always continues from wherever an earlier tween left the property.

use ember_core::{NodeId, Property, Stage};

use crate::easing::Easing;

/// A single property interpolation
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub target: NodeId,
    pub property: Property,
    /// Explicit start value; `None` reads the current value on activation
    pub from: Option<f32>,
    pub to: f32,
    /// Duration in seconds; zero makes the tween an instant set
    pub duration: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(target: NodeId, property: Property, to: f32, duration: f32) -> Self {
        Self {
            target,
            property,
            from: None,
            to,
            duration: duration.max(0.0),
            easing: Easing::Linear,
        }
    }

    /// An instantaneous assignment
    pub fn set(target: NodeId, property: Property, value: f32) -> Self {
        Self::new(target, property, value, 0.0)
    }

    /// Builder: set the easing curve
    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: fix the start value instead of reading it from the stage
    pub fn from(mut self, value: f32) -> Self {
        self.from = Some(value);
        self
    }

    /// Value at `progress` (0.0 to 1.0) given the resolved start value
    pub fn sample(&self, start: f32, progress: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        start + (self.to - start) * self.easing.apply(progress)
    }
}

/// Lifecycle of a scheduled tween
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TweenState {
    Pending,
    Running { start: f32 },
    Done,
}

/// A tween placed at an absolute offset on a timeline
#[derive(Clone, Debug)]
pub(crate) struct ScheduledTween {
    pub offset: f32,
    pub tween: Tween,
    pub state: TweenState,
}

impl ScheduledTween {
    pub fn new(offset: f32, tween: Tween) -> Self {
        Self {
            offset: offset.max(0.0),
            tween,
            state: TweenState::Pending,
        }
    }

    pub fn end(&self) -> f32 {
        self.offset + self.tween.duration
    }

    /// Write the tween's value at timeline time `time` to the stage.
    ///
    /// Finished tweens are not rewritten, so other writers (the physics
    /// driver, a later tween) keep control of the property afterwards.
    pub fn render(&mut self, time: f32, stage: &mut Stage) {
        if time < self.offset || self.state == TweenState::Done {
            return;
        }
        let start = match self.state {
            TweenState::Running { start } => start,
            _ => {
                let start = self.tween.from.unwrap_or_else(|| {
                    stage
                        .get(self.tween.target, self.tween.property)
                        .unwrap_or(self.tween.to)
                });
                self.state = TweenState::Running { start };
                start
            }
        };
        let progress = if self.tween.duration <= 0.0 {
            1.0
        } else {
            ((time - self.offset) / self.tween.duration).clamp(0.0, 1.0)
        };
        stage.set(
            self.tween.target,
            self.tween.property,
            self.tween.sample(start, progress),
        );
        if progress >= 1.0 {
            self.state = TweenState::Done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{NodeKind, Size};

    fn stage_with_node() -> (Stage, NodeId) {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let node = stage.add(stage.root(), NodeKind::Particle { radius: 1.0 });
        (stage, node)
    }

    #[test]
    fn test_start_value_is_captured_on_activation() {
        let (mut stage, node) = stage_with_node();
        stage.set(node, Property::X, 10.0);

        let mut scheduled = ScheduledTween::new(1.0, Tween::new(node, Property::X, 20.0, 2.0));
        scheduled.render(0.5, &mut stage);
        assert_eq!(stage.get(node, Property::X), Some(10.0));

        stage.set(node, Property::X, 12.0);
        scheduled.render(1.0, &mut stage);
        scheduled.render(2.0, &mut stage);
        assert_eq!(stage.get(node, Property::X), Some(16.0));
    }

    #[test]
    fn test_done_tweens_do_not_rewrite() {
        let (mut stage, node) = stage_with_node();
        let mut scheduled =
            ScheduledTween::new(0.0, Tween::new(node, Property::Alpha, 0.0, 1.0).from(1.0));
        scheduled.render(1.0, &mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.0));

        stage.set(node, Property::Alpha, 0.7);
        scheduled.render(1.5, &mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.7));
    }

    #[test]
    fn test_zero_duration_sets_immediately() {
        let (mut stage, node) = stage_with_node();
        let mut scheduled = ScheduledTween::new(0.0, Tween::set(node, Property::Scale, 3.0));
        scheduled.render(0.0, &mut stage);
        assert_eq!(stage.get(node, Property::Scale), Some(3.0));
        assert_eq!(scheduled.state, TweenState::Done);
    }
}
