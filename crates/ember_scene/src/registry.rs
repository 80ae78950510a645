//! Strategy registry
//!
//! Maps the `type` strings of scene configs onto a closed set of strategy
//! kinds, and builds boxed strategies from them. Image animations are lenient:
//! a missing or unknown type resolves to [`ImageAnimationKind::FadeIn`].
//! Geometry and text animations are strict.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{parse_animation_config, AnimationSpec};
use crate::error::{Result, SceneError};
use crate::geometry::{Geometry, GeometryKind};
use crate::strategy::{
    AnimationStrategy, FadeInAnimation, FallingAnimation, PanZoomAnimation, SlideStackAnimation,
    TextStrategy, WaterfallAnimation,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageAnimationKind {
    FadeIn,
    PanZoom,
}

impl ImageAnimationKind {
    pub const ALL: [ImageAnimationKind; 2] =
        [ImageAnimationKind::FadeIn, ImageAnimationKind::PanZoom];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fadein" => Some(ImageAnimationKind::FadeIn),
            "panzoom" => Some(ImageAnimationKind::PanZoom),
            _ => None,
        }
    }

    /// Resolve an optional type tag, falling back to fade-in
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            None => ImageAnimationKind::FadeIn,
            Some(name) => Self::from_name(name).unwrap_or_else(|| {
                warn!(requested = name, "unknown image animation, using fadein");
                ImageAnimationKind::FadeIn
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImageAnimationKind::FadeIn => "fadein",
            ImageAnimationKind::PanZoom => "panzoom",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryAnimationKind {
    Falling,
    Waterfall,
}

impl GeometryAnimationKind {
    pub const ALL: [GeometryAnimationKind; 2] = [
        GeometryAnimationKind::Falling,
        GeometryAnimationKind::Waterfall,
    ];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "falling" => Ok(GeometryAnimationKind::Falling),
            "waterfall" => Ok(GeometryAnimationKind::Waterfall),
            _ => Err(SceneError::UnknownType {
                kind: "geometry animation",
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeometryAnimationKind::Falling => "falling",
            GeometryAnimationKind::Waterfall => "waterfall",
        }
    }

    /// The one geometry variant this animation can drive
    pub fn geometry(&self) -> GeometryKind {
        match self {
            GeometryAnimationKind::Falling => GeometryKind::LineArt,
            GeometryAnimationKind::Waterfall => GeometryKind::PointCloud,
        }
    }

    pub fn supports(&self, kind: GeometryKind) -> bool {
        self.geometry() == kind
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnimationKind {
    SlideStack,
}

impl TextAnimationKind {
    pub const ALL: [TextAnimationKind; 1] = [TextAnimationKind::SlideStack];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "slidestack" => Ok(TextAnimationKind::SlideStack),
            _ => Err(SceneError::UnknownType {
                kind: "text animation",
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextAnimationKind::SlideStack => "slidestack",
        }
    }
}

/// Build the image strategy for a scene.
///
/// An unknown type falls back to fade-in and its config is read as a fade-in
/// config where it can be, otherwise defaults are used. A known type with a
/// malformed config is an error.
pub fn image_strategy(spec: Option<&AnimationSpec>) -> Result<Box<dyn AnimationStrategy>> {
    let kind = ImageAnimationKind::resolve(spec.map(|s| s.kind.as_str()));
    let config = spec.map_or(&Value::Null, |s| &s.config);
    let recognized = spec.map_or(true, |s| ImageAnimationKind::from_name(&s.kind).is_some());

    let strategy: Box<dyn AnimationStrategy> = match kind {
        ImageAnimationKind::FadeIn if !recognized => {
            let config = parse_animation_config(config).unwrap_or_else(|err| {
                debug!(%err, "fallback fadein config unreadable, using defaults");
                Default::default()
            });
            Box::new(FadeInAnimation::new(config))
        }
        ImageAnimationKind::FadeIn => {
            Box::new(FadeInAnimation::new(parse_animation_config(config)?))
        }
        ImageAnimationKind::PanZoom => {
            Box::new(PanZoomAnimation::new(parse_animation_config(config)?))
        }
    };
    Ok(strategy)
}

/// Build the geometry strategy for a scene, checking that the animation can
/// drive the loaded geometry. The scene duration overrides any `duration`
/// in the animation config.
pub fn geometry_strategy(
    spec: &AnimationSpec,
    geometry: Geometry,
    scene_duration: f32,
) -> Result<Box<dyn AnimationStrategy>> {
    let kind = GeometryAnimationKind::from_name(&spec.kind)?;
    if !kind.supports(geometry.kind()) {
        return Err(SceneError::UnsupportedGeometry {
            animation: kind.name(),
            geometry: geometry.kind().name(),
        });
    }
    let config = with_duration(&spec.config, scene_duration)?;

    let strategy: Box<dyn AnimationStrategy> = match (kind, geometry) {
        (GeometryAnimationKind::Falling, Geometry::LineArt(art)) => {
            Box::new(FallingAnimation::new(art, parse_animation_config(&config)?))
        }
        (GeometryAnimationKind::Waterfall, Geometry::PointCloud(cloud)) => {
            Box::new(WaterfallAnimation::new(cloud, parse_animation_config(&config)?))
        }
        (kind, geometry) => {
            return Err(SceneError::UnsupportedGeometry {
                animation: kind.name(),
                geometry: geometry.kind().name(),
            })
        }
    };
    Ok(strategy)
}

pub fn text_strategy(spec: &AnimationSpec) -> Result<Box<dyn TextStrategy>> {
    match TextAnimationKind::from_name(&spec.kind)? {
        TextAnimationKind::SlideStack => Ok(Box::new(SlideStackAnimation::new(
            parse_animation_config(&spec.config)?,
        ))),
    }
}

fn with_duration(config: &Value, duration: f32) -> Result<Value> {
    let mut merged = match config {
        Value::Null => serde_json::Map::new(),
        Value::Object(map) => map.clone(),
        other => {
            return Err(SceneError::Validation(format!(
                "animation config must be an object, got {other}"
            )))
        }
    };
    merged.insert("duration".into(), Value::from(duration));
    Ok(Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LineArt, PointCloud};
    use serde_json::json;

    #[test]
    fn test_image_fallback() {
        assert_eq!(ImageAnimationKind::resolve(None), ImageAnimationKind::FadeIn);
        assert_eq!(
            ImageAnimationKind::resolve(Some("kenburns")),
            ImageAnimationKind::FadeIn
        );
        assert_eq!(
            ImageAnimationKind::resolve(Some("panzoom")),
            ImageAnimationKind::PanZoom
        );

        let spec = AnimationSpec::new("kenburns", json!({ "zoom": "lots" }));
        let strategy = image_strategy(Some(&spec)).map(|s| s.name());
        assert_eq!(strategy.ok(), Some("fadein"));
    }

    #[test]
    fn test_known_image_type_with_bad_config_fails() {
        let spec = AnimationSpec::new("panzoom", json!({ "keyframes": "none" }));
        assert!(matches!(image_strategy(Some(&spec)), Err(SceneError::Config(_))));
    }

    #[test]
    fn test_strict_kinds() {
        assert!(matches!(
            GeometryAnimationKind::from_name("melting"),
            Err(SceneError::UnknownType { kind: "geometry animation", .. })
        ));
        assert!(matches!(
            TextAnimationKind::from_name("typewriter"),
            Err(SceneError::UnknownType { kind: "text animation", .. })
        ));
    }

    #[test]
    fn test_geometry_compatibility() {
        let spec = AnimationSpec::new("waterfall", Value::Null);
        let art = Geometry::LineArt(LineArt::new(vec![]));
        assert!(matches!(
            geometry_strategy(&spec, art, 10.0),
            Err(SceneError::UnsupportedGeometry {
                animation: "waterfall",
                geometry: "lineart"
            })
        ));

        let cloud = Geometry::PointCloud(PointCloud::new(vec![]));
        let built = geometry_strategy(&spec, cloud, 10.0).map(|s| s.name());
        assert_eq!(built.ok(), Some("waterfall"));
    }

    #[test]
    fn test_scene_duration_is_merged() {
        let merged = with_duration(&json!({ "duration": 3, "acceleration": 0 }), 12.0);
        assert_eq!(
            merged.ok(),
            Some(json!({ "duration": 12.0, "acceleration": 0 }))
        );
        assert_eq!(with_duration(&Value::Null, 5.0).ok(), Some(json!({ "duration": 5.0 })));
        assert!(with_duration(&json!([1, 2]), 5.0).is_err());
    }
}
