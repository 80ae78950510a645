//! Controlled timelines
//!
//! A [`ControlledTimeline`] wraps a [`Timeline`] with the advance-driven phase
//! discipline every paced effect shares:
//!
//! - the first advance starts phase 1
//! - an advance while a phase is still interpolating snaps that phase to its
//!   end state; it never queues a second request
//! - an advance while resting at a pause point starts the next phase
//! - after the last pause point the timeline runs to completion unattended,
//!   and further advances are ignored
//!
//! The cursor counts started phases: 0 before the first advance, never more
//! than the number of pause points plus one.

use ember_core::Stage;

use crate::timeline::{Fired, Timeline};

/// Playback status of a controlled timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    NotStarted,
    Playing,
    Paused,
    Complete,
}

/// What an advance did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Phase 1 began
    Started,
    /// An in-flight phase was snapped to its end state
    Snapped,
    /// The next phase began from a pause point
    Resumed,
    /// Nothing left to do
    Ignored,
}

/// A pausable, advance-driven timeline
pub struct ControlledTimeline<C = ()> {
    timeline: Timeline<C>,
    cursor: usize,
}

impl<C: Clone> ControlledTimeline<C> {
    pub fn new(timeline: Timeline<C>) -> Self {
        Self {
            timeline,
            cursor: 0,
        }
    }

    /// Number of advance-bounded phases
    pub fn phase_count(&self) -> usize {
        self.timeline.pause_points().len() + 1
    }

    /// Number of phases started so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.timeline.is_complete() {
            PlaybackStatus::Complete
        } else if self.cursor == 0 {
            PlaybackStatus::NotStarted
        } else if self.timeline.is_playing() {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        }
    }

    /// Handle one user advance
    pub fn advance(&mut self, stage: &mut Stage) -> (AdvanceOutcome, Fired<C>) {
        match self.status() {
            PlaybackStatus::NotStarted => {
                self.cursor = 1;
                self.timeline.play();
                // Apply anything placed at the start right away.
                let fired = self.timeline.tick(0.0, stage);
                (AdvanceOutcome::Started, fired)
            }
            PlaybackStatus::Playing => {
                let fired = self.timeline.skip_to_next_pause(stage);
                (AdvanceOutcome::Snapped, fired)
            }
            PlaybackStatus::Paused => {
                self.cursor = (self.cursor + 1).min(self.phase_count());
                self.timeline.play();
                let fired = self.timeline.tick(0.0, stage);
                (AdvanceOutcome::Resumed, fired)
            }
            PlaybackStatus::Complete => (AdvanceOutcome::Ignored, Fired::new()),
        }
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) -> Fired<C> {
        self.timeline.tick(dt, stage)
    }

    /// Jump to the terminal state, ignoring pause points
    pub fn force_complete(&mut self, stage: &mut Stage) -> Fired<C> {
        self.cursor = self.phase_count();
        self.timeline.progress_to_end(stage)
    }

    /// Abandon the timeline where it stands, leaving the stage untouched
    pub fn kill(&mut self) {
        self.cursor = self.phase_count();
        self.timeline.kill();
    }

    pub fn is_complete(&self) -> bool {
        self.timeline.is_complete()
    }

    /// Whether a phase is currently playing
    pub fn is_active(&self) -> bool {
        self.timeline.is_active()
    }

    pub fn timeline(&self) -> &Timeline<C> {
        &self.timeline
    }
}
