//! Tween presets for common fades and moves

use ember_core::{NodeId, Point, Property};

use crate::easing::Easing;
use crate::tween::Tween;

/// Pre-built tweens for recurring patterns
pub struct AnimationPreset;

impl AnimationPreset {
    // ========================================================================
    // Fades
    // ========================================================================

    /// Fade to fully opaque from wherever the node currently is
    pub fn fade_in(target: NodeId, duration: f32, easing: Easing) -> Tween {
        Tween::new(target, Property::Alpha, 1.0, duration).ease(easing)
    }

    /// Fade to fully transparent from wherever the node currently is
    pub fn fade_out(target: NodeId, duration: f32, easing: Easing) -> Tween {
        Tween::new(target, Property::Alpha, 0.0, duration).ease(easing)
    }

    // ========================================================================
    // Moves
    // ========================================================================

    /// Move to `to` along both axes; returns the x and y tweens
    pub fn move_to(target: NodeId, to: Point, duration: f32, easing: Easing) -> [Tween; 2] {
        [
            Tween::new(target, Property::X, to.x, duration).ease(easing),
            Tween::new(target, Property::Y, to.y, duration).ease(easing),
        ]
    }

    /// Move and scale together (a camera-like view change)
    pub fn view_to(
        target: NodeId,
        to: Point,
        scale: f32,
        duration: f32,
        easing: Easing,
    ) -> [Tween; 3] {
        let [x, y] = Self::move_to(target, to, duration, easing);
        [
            x,
            y,
            Tween::new(target, Property::Scale, scale, duration).ease(easing),
        ]
    }

    /// Place a node instantly
    pub fn place(target: NodeId, at: Point, scale: f32) -> [Tween; 3] {
        [
            Tween::set(target, Property::X, at.x),
            Tween::set(target, Property::Y, at.y),
            Tween::set(target, Property::Scale, scale),
        ]
    }
}
