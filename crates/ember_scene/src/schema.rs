//! Authoring schema registry
//!
//! Field descriptions, defaults and bounds for every animation and geometry
//! type, for config tooling. Nothing here is enforced when scenes load; the
//! typed configs in [`crate::config`] only check shape.

use serde_json::{json, Value};

use crate::geometry::GeometryKind;
use crate::registry::{GeometryAnimationKind, ImageAnimationKind, TextAnimationKind};

/// Easing names offered to authors
pub const EASING_OPTIONS: [&str; 4] =
    ["power1.inOut", "power2.inOut", "power3.inOut", "sine.inOut"];

fn ease_field(default: &str) -> Value {
    json!({ "type": "select", "default": default, "options": EASING_OPTIONS })
}

fn number(default: f64, min: f64, max: Option<f64>, step: Option<f64>) -> Value {
    let mut field = json!({ "type": "number", "default": default, "min": min });
    if let Some(max) = max {
        field["max"] = json!(max);
    }
    if let Some(step) = step {
        field["step"] = json!(step);
    }
    field
}

pub fn image_animation(kind: ImageAnimationKind) -> Value {
    match kind {
        ImageAnimationKind::FadeIn => json!({
            "name": "Fade In",
            "description": "Simple fade in animation",
            "config": {
                "duration": number(1.5, 0.1, Some(5.0), None),
                "ease": ease_field("power2.inOut"),
            }
        }),
        ImageAnimationKind::PanZoom => {
            let fade = json!({
                "type": "group",
                "fields": {
                    "duration": number(2.0, 0.1, Some(5.0), None),
                    "ease": ease_field("power2.inOut"),
                }
            });
            json!({
                "name": "Pan & Zoom",
                "description": "Camera-like pan and zoom between keyframe views",
                "config": {
                    "fadeIn": fade.clone(),
                    "fadeOut": fade,
                    "transitionEase": ease_field("power2.inOut"),
                    "keyframes": {
                        "type": "keyframes",
                        "description": "Center offsets in surface units, scale relative to fit",
                        "fields": {
                            "x": number(0.0, -1.0, Some(1.0), Some(0.01)),
                            "y": number(0.0, -1.0, Some(1.0), Some(0.01)),
                            "scale": number(1.0, 0.1, None, Some(0.1)),
                            "duration": number(1.0, 0.0, None, Some(0.1)),
                        }
                    }
                }
            })
        }
    }
}

pub fn geometry_animation(kind: GeometryAnimationKind) -> Value {
    let config = match kind {
        GeometryAnimationKind::Falling => json!({
            "name": "Falling Geometry",
            "config": {
                "acceleration": number(2.0, 0.0, None, Some(0.1)),
                "fallDuration": number(1.0, 0.0, None, Some(0.1)),
                "fadeIn": {
                    "type": "group",
                    "fields": {
                        "startTime": number(3.0, 0.0, None, Some(0.1)),
                        "duration": number(5.0, 0.0, None, Some(0.1)),
                    }
                },
                "fadeOut": {
                    "type": "group",
                    "fields": {
                        "startTime": number(4.0, 0.0, None, Some(0.1)),
                        "duration": number(4.0, 0.0, None, Some(0.1)),
                    }
                }
            }
        }),
        GeometryAnimationKind::Waterfall => json!({
            "name": "Water Fall Effect",
            "config": {
                "particleSize": number(2.0, 1.0, None, Some(1.0)),
                "gravity": number(0.5, 0.0, None, Some(0.1)),
                "horizontalDispersion": number(0.2, 0.0, None, Some(0.1)),
                "bounce": number(0.3, 0.0, Some(1.0), Some(0.1)),
                "friction": number(0.1, 0.0, Some(1.0), Some(0.1)),
            }
        }),
    };
    let mut schema = config;
    schema["geometryType"] = json!(kind.geometry().name());
    schema
}

pub fn text_animation(kind: TextAnimationKind) -> Value {
    match kind {
        TextAnimationKind::SlideStack => json!({
            "name": "Slide Stack",
            "description": "Slides text lines in from alternating sides",
            "config": {
                "slideDistance": number(100.0, 0.0, Some(500.0), None),
                "slideDuration": number(0.5, 0.1, Some(2.0), None),
                "pushDuration": number(0.4, 0.1, Some(2.0), None),
                "bottomPadding": number(50.0, 0.0, Some(200.0), None),
            }
        }),
    }
}

pub fn geometry_type(kind: GeometryKind) -> Value {
    match kind {
        GeometryKind::LineArt => json!({
            "name": "Line Art",
            "description": "Segments grouped into levels, animated one level at a time",
            "dataFormat": {
                "levels": {
                    "type": "array",
                    "items": {
                        "type": "array",
                        "items": {
                            "start": { "x": "number", "y": "number" },
                            "end": { "x": "number", "y": "number" },
                        }
                    }
                }
            }
        }),
        GeometryKind::PointCloud => json!({
            "name": "Point Cloud",
            "description": "Points sampled from the image",
            "dataFormat": {
                "points": { "type": "array", "items": { "x": "number", "y": "number" } }
            }
        }),
    }
}

/// Every schema, keyed by section and type tag
pub fn all_schemas() -> Value {
    let mut image = serde_json::Map::new();
    for kind in ImageAnimationKind::ALL {
        image.insert(kind.name().into(), image_animation(kind));
    }
    let mut geometry = serde_json::Map::new();
    for kind in GeometryAnimationKind::ALL {
        geometry.insert(kind.name().into(), geometry_animation(kind));
    }
    let mut text = serde_json::Map::new();
    for kind in TextAnimationKind::ALL {
        text.insert(kind.name().into(), text_animation(kind));
    }
    let mut types = serde_json::Map::new();
    for kind in GeometryKind::ALL {
        types.insert(kind.name().into(), geometry_type(kind));
    }
    json!({
        "animations": {
            "image": image,
            "geometry": geometry,
            "text": text,
        },
        "geometryTypes": types,
        "easing": EASING_OPTIONS,
    })
}
