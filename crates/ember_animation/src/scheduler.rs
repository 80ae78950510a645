//! Animation scheduler
//!
//! Owns fire-and-forget timelines (the ones nobody advances explicitly) and
//! ticks them each frame, dropping each one once it finishes.

use ember_core::Stage;
use slotmap::{new_key_type, SlotMap};

use crate::timeline::Timeline;

new_key_type! {
    pub struct TimelineId;
}

/// The animation scheduler that ticks all free-running timelines
pub struct AnimationScheduler {
    timelines: SlotMap<TimelineId, Timeline>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            timelines: SlotMap::with_key(),
        }
    }

    /// Start a timeline immediately and keep it until it finishes
    pub fn spawn(&mut self, mut timeline: Timeline, stage: &mut Stage) -> TimelineId {
        timeline.play();
        timeline.tick(0.0, stage);
        self.timelines.insert(timeline)
    }

    /// Tick all timelines, removing the finished ones
    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        for (_, timeline) in self.timelines.iter_mut() {
            timeline.tick(dt, stage);
        }
        self.timelines.retain(|_, t| !t.is_complete());
    }

    pub fn is_running(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(id)
    }

    /// Jump every timeline to its end state
    pub fn finish_all(&mut self, stage: &mut Stage) {
        for (_, mut timeline) in self.timelines.drain() {
            timeline.progress_to_end(stage);
        }
    }

    /// Drop every timeline where it stands
    pub fn cancel_all(&mut self) {
        self.timelines.clear();
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        !self.timelines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Tween;
    use ember_core::{NodeKind, Property, Size};

    #[test]
    fn test_scheduler_tick_removes_finished() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let node = stage.add(stage.root(), NodeKind::Particle { radius: 1.0 });
        let mut scheduler = AnimationScheduler::new();

        let mut tl = Timeline::new();
        tl.to(Tween::new(node, Property::X, 10.0, 1.0));
        let id = scheduler.spawn(tl, &mut stage);
        assert!(scheduler.has_active_animations());

        scheduler.tick(0.5, &mut stage);
        assert_eq!(stage.get(node, Property::X), Some(5.0));
        assert!(scheduler.is_running(id));

        scheduler.tick(0.5, &mut stage);
        assert!(!scheduler.is_running(id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_finish_all_applies_end_state() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let node = stage.add(stage.root(), NodeKind::Particle { radius: 1.0 });
        let mut scheduler = AnimationScheduler::new();

        let mut tl = Timeline::new();
        tl.to(Tween::new(node, Property::Alpha, 0.0, 3.0));
        scheduler.spawn(tl, &mut stage);

        scheduler.finish_all(&mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.0));
        assert!(!scheduler.has_active_animations());
    }
}
