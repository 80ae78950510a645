//! Ember Animation System
//!
//! Tweens, timelines, and the advance-driven phase discipline scenes are
//! built on.
//!
//! # Features
//!
//! - **Easing**: named curves matching the scene authoring vocabulary
//! - **Tweens**: single-property interpolations that start from the live value
//! - **Timelines**: tweens at offsets, with pause points and owner cues
//! - **Controlled Timelines**: user-advance phases with snap-to-end debounce
//! - **Scheduler**: free-running timelines ticked until they finish

pub mod controlled;
pub mod easing;
pub mod presets;
pub mod scheduler;
pub mod timeline;
pub mod tween;

pub use controlled::{AdvanceOutcome, ControlledTimeline, PlaybackStatus};
pub use easing::Easing;
pub use presets::AnimationPreset;
pub use scheduler::{AnimationScheduler, TimelineId};
pub use timeline::{Fired, Timeline};
pub use tween::Tween;
