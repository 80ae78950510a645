//! Timeline orchestration for multiple tweens
//!
//! A timeline places tweens, pause points and cues at absolute offsets (in
//! seconds). Appending with [`Timeline::to`] sequences after everything already
//! placed; the `*_at` variants place at an explicit offset so several tweens can
//! overlap.
//!
//! Cues are opaque values handed back to the owner when the playhead crosses
//! them. They are how a timeline asks its owner to do something it cannot do
//! itself, like starting a physics simulation.

use ember_core::Stage;
use smallvec::SmallVec;

use crate::tween::{ScheduledTween, Tween};

/// Cues fired by a single tick or seek
pub type Fired<C> = SmallVec<[C; 2]>;

struct CueEntry<C> {
    offset: f32,
    cue: C,
    fired: bool,
}

/// A timeline of tweens with pause points
pub struct Timeline<C = ()> {
    tweens: Vec<ScheduledTween>,
    pauses: Vec<f32>,
    cues: Vec<CueEntry<C>>,
    /// Offset at which the next appended item starts
    cursor: f32,
    duration: f32,
    current_time: f32,
    playing: bool,
    complete: bool,
}

impl<C: Clone> Timeline<C> {
    pub fn new() -> Self {
        Self {
            tweens: Vec::new(),
            pauses: Vec::new(),
            cues: Vec::new(),
            cursor: 0.0,
            duration: 0.0,
            current_time: 0.0,
            playing: false,
            complete: false,
        }
    }

    /// Append a tween after everything placed so far
    pub fn to(&mut self, tween: Tween) -> &mut Self {
        let at = self.cursor;
        self.to_at(tween, at)
    }

    /// Place a tween at an absolute offset
    pub fn to_at(&mut self, tween: Tween, at: f32) -> &mut Self {
        let entry = ScheduledTween::new(at, tween);
        self.extend_to(entry.end());
        // Keep tweens ordered by offset; equal offsets keep insertion order.
        let idx = self.tweens.partition_point(|t| t.offset <= entry.offset);
        self.tweens.insert(idx, entry);
        self
    }

    /// Place several tweens starting together at the current end
    pub fn group(&mut self, tweens: impl IntoIterator<Item = Tween>) -> &mut Self {
        let at = self.cursor;
        for tween in tweens {
            self.to_at(tween, at);
        }
        self
    }

    /// Extend the timeline by an empty interval
    pub fn hold(&mut self, duration: f32) -> &mut Self {
        let end = self.cursor + duration.max(0.0);
        self.extend_to(end);
        self
    }

    /// Add a pause point at the current end
    pub fn add_pause(&mut self) -> &mut Self {
        let at = self.cursor;
        self.add_pause_at(at)
    }

    pub fn add_pause_at(&mut self, at: f32) -> &mut Self {
        let idx = self.pauses.partition_point(|p| *p <= at);
        self.pauses.insert(idx, at);
        self.extend_to(at);
        self
    }

    /// Add a cue at the current end
    pub fn add_cue(&mut self, cue: C) -> &mut Self {
        let at = self.cursor;
        self.add_cue_at(cue, at)
    }

    pub fn add_cue_at(&mut self, cue: C, at: f32) -> &mut Self {
        let at = at.max(0.0);
        let idx = self.cues.partition_point(|c| c.offset <= at);
        self.cues.insert(
            idx,
            CueEntry {
                offset: at,
                cue,
                fired: false,
            },
        );
        self.extend_to(at);
        self
    }

    fn extend_to(&mut self, end: f32) {
        self.cursor = self.cursor.max(end);
        self.duration = self.duration.max(end);
    }

    /// Offset of the current end (where the next `to` lands)
    pub fn end(&self) -> f32 {
        self.cursor
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time(&self) -> f32 {
        self.current_time
    }

    pub fn pause_points(&self) -> &[f32] {
        &self.pauses
    }

    pub fn play(&mut self) {
        if !self.complete {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playing and not yet at the end
    pub fn is_active(&self) -> bool {
        self.playing && !self.complete
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the playhead is at a declared pause point
    pub fn is_at_pause(&self) -> bool {
        self.pauses.iter().any(|p| *p == self.current_time)
    }

    /// First pause point strictly after the playhead
    pub fn next_pause(&self) -> Option<f32> {
        self.pauses
            .iter()
            .copied()
            .find(|p| *p > self.current_time)
    }

    /// Advance the playhead by `dt` seconds.
    ///
    /// Stops at the next pause point if one is crossed, and at the end.
    pub fn tick(&mut self, dt: f32, stage: &mut Stage) -> Fired<C> {
        if !self.playing || self.complete {
            return Fired::new();
        }
        let mut target = (self.current_time + dt.max(0.0)).min(self.duration);
        let mut paused = false;
        if let Some(pause) = self.next_pause() {
            if pause <= target && pause < self.duration {
                target = pause;
                paused = true;
            }
        }
        let fired = self.render(target, stage);
        if paused {
            self.playing = false;
        }
        fired
    }

    /// Jump to the next pause point (or the end), applying every tween's
    /// state at that point. Leaves the timeline stopped there.
    pub fn skip_to_next_pause(&mut self, stage: &mut Stage) -> Fired<C> {
        let target = match self.next_pause() {
            Some(pause) if pause < self.duration => pause,
            _ => self.duration,
        };
        let fired = self.render(target, stage);
        self.playing = false;
        fired
    }

    /// Jump to the end, ignoring pause points
    pub fn progress_to_end(&mut self, stage: &mut Stage) -> Fired<C> {
        let duration = self.duration;
        let fired = self.render(duration, stage);
        self.playing = false;
        fired
    }

    /// Drop every tween, pause and cue without touching the stage
    pub fn kill(&mut self) {
        self.tweens.clear();
        self.pauses.clear();
        self.cues.clear();
        self.playing = false;
        self.complete = true;
    }

    /// Apply tween values at `time` and collect cues crossed on the way
    fn render(&mut self, time: f32, stage: &mut Stage) -> Fired<C> {
        self.current_time = time;
        for tween in self.tweens.iter_mut() {
            tween.render(time, stage);
        }
        let mut fired = Fired::new();
        for entry in self.cues.iter_mut() {
            if !entry.fired && entry.offset <= time {
                entry.fired = true;
                fired.push(entry.cue.clone());
            }
        }
        if time >= self.duration {
            self.complete = true;
            self.playing = false;
        }
        fired
    }
}

impl<C: Clone> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{NodeId, NodeKind, Property, Size};

    fn stage_with_node() -> (Stage, NodeId) {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let node = stage.add(stage.root(), NodeKind::Particle { radius: 1.0 });
        stage.set(node, Property::Alpha, 0.0);
        (stage, node)
    }

    #[test]
    fn test_sequential_append() {
        let (mut stage, node) = stage_with_node();
        let mut tl: Timeline = Timeline::new();
        tl.to(Tween::new(node, Property::Alpha, 1.0, 1.0))
            .to(Tween::new(node, Property::Alpha, 0.0, 2.0));
        assert_eq!(tl.duration(), 3.0);

        tl.play();
        tl.tick(0.5, &mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.5));
        tl.tick(1.5, &mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.5));
        tl.tick(5.0, &mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.0));
        assert!(tl.is_complete());
        assert!(!tl.is_active());
    }

    #[test]
    fn test_stops_at_pause_point() {
        let (mut stage, node) = stage_with_node();
        let mut tl: Timeline = Timeline::new();
        tl.to(Tween::new(node, Property::Alpha, 1.0, 1.0))
            .add_pause()
            .to(Tween::new(node, Property::X, 10.0, 1.0));

        tl.play();
        tl.tick(5.0, &mut stage);
        assert_eq!(tl.time(), 1.0);
        assert!(tl.is_at_pause());
        assert!(!tl.is_playing());
        assert_eq!(stage.get(node, Property::X), Some(0.0));

        tl.play();
        tl.tick(0.5, &mut stage);
        assert_eq!(stage.get(node, Property::X), Some(5.0));
    }

    #[test]
    fn test_cues_fire_once_in_order() {
        let (mut stage, node) = stage_with_node();
        let mut tl: Timeline<&'static str> = Timeline::new();
        tl.add_cue("start")
            .to(Tween::new(node, Property::Alpha, 1.0, 1.0))
            .add_cue("middle")
            .hold(1.0)
            .add_cue("end");

        tl.play();
        assert_eq!(tl.tick(0.0, &mut stage).as_slice(), &["start"]);
        assert!(tl.tick(0.5, &mut stage).is_empty());
        assert_eq!(tl.tick(2.0, &mut stage).as_slice(), &["middle", "end"]);
        assert!(tl.tick(1.0, &mut stage).is_empty());
    }

    #[test]
    fn test_skip_to_next_pause_snaps_in_flight_tween() {
        let (mut stage, node) = stage_with_node();
        let mut tl: Timeline = Timeline::new();
        tl.to(Tween::new(node, Property::Alpha, 1.0, 2.0))
            .add_pause()
            .to(Tween::new(node, Property::Alpha, 0.0, 1.0));

        tl.play();
        tl.tick(0.5, &mut stage);
        tl.skip_to_next_pause(&mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(1.0));
        assert_eq!(tl.time(), 2.0);
        assert!(!tl.is_complete());
    }

    #[test]
    fn test_progress_to_end_ignores_pauses() {
        let (mut stage, node) = stage_with_node();
        let mut tl: Timeline<u8> = Timeline::new();
        tl.to(Tween::new(node, Property::Alpha, 1.0, 1.0))
            .add_pause()
            .add_cue(7)
            .to(Tween::new(node, Property::Alpha, 0.25, 1.0));

        let fired = tl.progress_to_end(&mut stage);
        assert_eq!(fired.as_slice(), &[7]);
        assert_eq!(stage.get(node, Property::Alpha), Some(0.25));
        assert!(tl.is_complete());
    }

    #[test]
    fn test_overlapping_offsets() {
        let (mut stage, node) = stage_with_node();
        let mut tl: Timeline = Timeline::new();
        tl.to_at(Tween::new(node, Property::X, 10.0, 1.0), 2.0)
            .to_at(Tween::new(node, Property::Alpha, 1.0, 1.0), 0.0);
        assert_eq!(tl.duration(), 3.0);

        tl.play();
        tl.tick(1.0, &mut stage);
        assert_eq!(stage.get(node, Property::Alpha), Some(1.0));
        assert_eq!(stage.get(node, Property::X), Some(0.0));
    }
}
