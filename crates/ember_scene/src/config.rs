//! Scene and novel configuration
//!
//! Scene configs are JSON documents authored by the config tool:
//!
//! ```json
//! {
//!   "id": "harbor",
//!   "duration": 12,
//!   "image": {
//!     "path": "harbor.png",
//!     "padding": 0.1,
//!     "animation": { "type": "panzoom", "config": { "keyframes": [] } },
//!     "geometry": {
//!       "type": "lineart",
//!       "data": "harbor.json",
//!       "animation": { "type": "falling", "config": { "acceleration": 2 } }
//!     }
//!   },
//!   "text": {
//!     "verses": [{ "id": 1, "lines": ["The tide came in"] }],
//!     "animation": { "type": "slidestack", "config": {} }
//!   }
//! }
//! ```
//!
//! Animation `config` blocks stay untyped here; each strategy parses its own
//! block with defaults filled in (see [`parse_animation_config`]).

use ember_animation::Easing;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SceneError};

// ============================================================================
// Scene
// ============================================================================

/// One scene: a base image, optional geometry, optional text
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SceneConfig {
    pub id: String,
    /// Target length in seconds; paces some effects, never enforced
    #[serde(default = "default_scene_duration")]
    pub duration: f32,
    pub image: ImageConfig,
    #[serde(default)]
    pub text: Option<TextConfig>,
}

fn default_scene_duration() -> f32 {
    10.0
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ImageConfig {
    /// Path under the image asset root
    pub path: String,
    /// Fraction of the surface left empty around the image
    #[serde(default)]
    pub padding: f32,
    #[serde(default)]
    pub animation: Option<AnimationSpec>,
    #[serde(default)]
    pub geometry: Option<GeometryConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GeometryConfig {
    #[serde(rename = "type")]
    pub kind: String,
    /// File name under `assets/geometry/<type>/`
    pub data: String,
    pub animation: AnimationSpec,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TextConfig {
    #[serde(default)]
    pub verses: Vec<Verse>,
    pub animation: AnimationSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Verse {
    #[serde(default)]
    pub id: Option<u32>,
    pub lines: Vec<String>,
}

impl Verse {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            id: None,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// An animation reference: a type tag plus its untyped config block
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnimationSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: Value,
}

impl AnimationSpec {
    pub fn new(kind: impl Into<String>, config: Value) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Shape checks beyond what deserialization enforces
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SceneError::Validation("scene id must not be empty".into()));
        }
        if self.image.path.trim().is_empty() {
            return Err(SceneError::Validation(format!(
                "scene {}: image path must not be empty",
                self.id
            )));
        }
        if !(0.0..1.0).contains(&self.image.padding) {
            return Err(SceneError::Validation(format!(
                "scene {}: image padding {} must be in [0, 1)",
                self.id, self.image.padding
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SceneError::Validation(format!(
                "scene {}: duration must be a non-negative number",
                self.id
            )));
        }
        if let Some(text) = &self.text {
            for (i, verse) in text.verses.iter().enumerate() {
                if verse.lines.is_empty() {
                    return Err(SceneError::Validation(format!(
                        "scene {}: verse {i} has no lines",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Novel
// ============================================================================

/// An ordered list of scenes played as one sequence
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NovelConfig {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub scenes: Vec<String>,
}

impl NovelConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ============================================================================
// Strategy configs
// ============================================================================

/// Parse an animation config block; `null` means all defaults
pub fn parse_animation_config<T: DeserializeOwned + Default>(value: &Value) -> Result<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value.clone())?)
}

/// A fade with its own duration and easing
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct FadeSpec {
    #[serde(default = "default_fade_duration")]
    pub duration: f32,
    #[serde(default)]
    pub ease: Easing,
}

fn default_fade_duration() -> f32 {
    2.0
}

impl Default for FadeSpec {
    fn default() -> Self {
        Self {
            duration: default_fade_duration(),
            ease: Easing::default(),
        }
    }
}

/// A fade placed at an absolute start time
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedFade {
    pub start_time: f32,
    pub duration: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FadeInConfig {
    #[serde(default = "default_fadein_duration")]
    pub duration: f32,
    #[serde(default)]
    pub ease: Easing,
}

fn default_fadein_duration() -> f32 {
    1.5
}

impl Default for FadeInConfig {
    fn default() -> Self {
        Self {
            duration: default_fadein_duration(),
            ease: Easing::default(),
        }
    }
}

/// A pan/zoom target view
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct View {
    /// Horizontal offset from center, in surface widths
    #[serde(default)]
    pub x: f32,
    /// Vertical offset from center, in surface heights
    #[serde(default)]
    pub y: f32,
    /// Multiple of the fit-to-surface scale
    #[serde(default = "default_view_scale")]
    pub scale: f32,
    /// Seconds to reach this view from the previous one
    #[serde(default = "default_view_duration")]
    pub duration: f32,
}

fn default_view_scale() -> f32 {
    1.0
}

fn default_view_duration() -> f32 {
    1.0
}

impl View {
    pub fn new(x: f32, y: f32, scale: f32, duration: f32) -> Self {
        Self {
            x,
            y,
            scale,
            duration,
        }
    }
}

/// Keyframes are written as `{ "view": {...} }` by the config tool; a bare
/// view object is accepted too.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "KeyframeRepr")]
pub struct Keyframe {
    pub view: View,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyframeRepr {
    Wrapped { view: View },
    Flat(View),
}

impl From<KeyframeRepr> for Keyframe {
    fn from(repr: KeyframeRepr) -> Self {
        match repr {
            KeyframeRepr::Wrapped { view } | KeyframeRepr::Flat(view) => Keyframe { view },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanZoomConfig {
    #[serde(default)]
    pub fade_in: FadeSpec,
    #[serde(default)]
    pub fade_out: FadeSpec,
    #[serde(default)]
    pub transition_ease: Easing,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallingConfig {
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    #[serde(default = "default_fall_duration")]
    pub fall_duration: f32,
    #[serde(default = "default_falling_fade_in")]
    pub fade_in: Option<TimedFade>,
    #[serde(default = "default_falling_fade_out")]
    pub fade_out: Option<TimedFade>,
    /// Scene duration, merged in by the loader
    #[serde(default = "default_scene_duration")]
    pub duration: f32,
}

fn default_acceleration() -> f32 {
    2.0
}

fn default_fall_duration() -> f32 {
    1.0
}

fn default_falling_fade_in() -> Option<TimedFade> {
    Some(TimedFade {
        start_time: 3.0,
        duration: 5.0,
    })
}

fn default_falling_fade_out() -> Option<TimedFade> {
    Some(TimedFade {
        start_time: 4.0,
        duration: 4.0,
    })
}

impl Default for FallingConfig {
    fn default() -> Self {
        Self {
            acceleration: default_acceleration(),
            fall_duration: default_fall_duration(),
            fade_in: default_falling_fade_in(),
            fade_out: default_falling_fade_out(),
            duration: default_scene_duration(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct PointsFade {
    /// Seconds the simulation runs before the final fade
    #[serde(default = "default_points_duration")]
    pub duration: f32,
    /// Total spread of per-particle fade start times
    #[serde(default = "default_points_stagger")]
    pub stagger: f32,
}

fn default_points_duration() -> f32 {
    10.0
}

fn default_points_stagger() -> f32 {
    0.5
}

impl Default for PointsFade {
    fn default() -> Self {
        Self {
            duration: default_points_duration(),
            stagger: default_points_stagger(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallConfig {
    #[serde(default = "default_particle_size")]
    pub particle_size: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_dispersion")]
    pub horizontal_dispersion: f32,
    #[serde(default = "default_bounce")]
    pub bounce: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default)]
    pub raster_fade: FadeSpec,
    #[serde(default)]
    pub points_fade: PointsFade,
    /// Fixed seed for stagger order and initial velocities
    #[serde(default)]
    pub seed: Option<u64>,
    /// Scene duration, merged in by the loader
    #[serde(default = "default_scene_duration")]
    pub duration: f32,
}

fn default_particle_size() -> f32 {
    2.0
}

fn default_gravity() -> f32 {
    0.5
}

fn default_dispersion() -> f32 {
    0.2
}

fn default_bounce() -> f32 {
    0.3
}

fn default_friction() -> f32 {
    0.1
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            particle_size: default_particle_size(),
            gravity: default_gravity(),
            horizontal_dispersion: default_dispersion(),
            bounce: default_bounce(),
            friction: default_friction(),
            raster_fade: FadeSpec::default(),
            points_fade: PointsFade::default(),
            seed: None,
            duration: default_scene_duration(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideStackConfig {
    #[serde(default = "default_slide_distance")]
    pub slide_distance: f32,
    #[serde(default = "default_slide_duration")]
    pub slide_duration: f32,
    #[serde(default = "default_push_duration")]
    pub push_duration: f32,
    #[serde(default = "default_bottom_padding")]
    pub bottom_padding: f32,
}

fn default_slide_distance() -> f32 {
    100.0
}

fn default_slide_duration() -> f32 {
    0.5
}

fn default_push_duration() -> f32 {
    0.4
}

fn default_bottom_padding() -> f32 {
    50.0
}

impl Default for SlideStackConfig {
    fn default() -> Self {
        Self {
            slide_distance: default_slide_distance(),
            slide_duration: default_slide_duration(),
            push_duration: default_push_duration(),
            bottom_padding: default_bottom_padding(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scene_defaults() {
        let scene = SceneConfig::from_json(r#"{ "id": "a", "image": { "path": "a.png" } }"#)
            .unwrap();
        assert_eq!(scene.duration, 10.0);
        assert_eq!(scene.image.padding, 0.0);
        assert!(scene.image.animation.is_none());
        assert!(scene.image.geometry.is_none());
        assert!(scene.text.is_none());
    }

    #[test]
    fn test_scene_rejects_bad_padding() {
        let err = SceneConfig::from_json(
            r#"{ "id": "a", "image": { "path": "a.png", "padding": 1.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Validation(_)));
    }

    #[test]
    fn test_strategy_defaults_from_null_and_partial() {
        let falling: FallingConfig = parse_animation_config(&Value::Null).unwrap();
        assert_eq!(falling, FallingConfig::default());

        let waterfall: WaterfallConfig =
            parse_animation_config(&json!({ "gravity": 1.0, "pointsFade": { "stagger": 2 } }))
                .unwrap();
        assert_eq!(waterfall.gravity, 1.0);
        assert_eq!(waterfall.points_fade.stagger, 2.0);
        assert_eq!(waterfall.points_fade.duration, 10.0);
        assert_eq!(waterfall.raster_fade.duration, 2.0);
    }

    #[test]
    fn test_falling_fade_can_be_disabled() {
        let falling: FallingConfig =
            parse_animation_config(&json!({ "fadeOut": null })).unwrap();
        assert!(falling.fade_out.is_none());
        assert!(falling.fade_in.is_some());
    }

    #[test]
    fn test_keyframe_shapes() {
        let config: PanZoomConfig = parse_animation_config(&json!({
            "keyframes": [
                { "view": { "x": 0.1, "y": 0, "scale": 1.5, "duration": 3 } },
                { "x": 0.2, "scale": 2 }
            ],
            "transitionEase": "power1.inOut"
        }))
        .unwrap();
        assert_eq!(config.keyframes.len(), 2);
        assert_eq!(config.keyframes[0].view.duration, 3.0);
        assert_eq!(config.keyframes[1].view, View::new(0.2, 0.0, 2.0, 1.0));
        assert_eq!(config.transition_ease, Easing::EaseInOutQuad);
        assert_eq!(config.fade_in.duration, 2.0);
    }

    #[test]
    fn test_novel() {
        let novel = NovelConfig::from_json(r#"{ "id": "n", "scenes": ["a", "b"] }"#).unwrap();
        assert_eq!(novel.scenes, vec!["a", "b"]);
        assert!(novel.title.is_none());
    }
}
