//! Ember Scenes
//!
//! Scenes are an image, optional line or point geometry derived from it, and
//! optional stacked text, each animated by its own track and paced by two
//! advance signals.
//!
//! - **Geometry**: validated line-art levels and point clouds
//! - **Strategies**: fade-in, pan/zoom, falling, physics waterfall, slide stack
//! - **Orchestrator**: loads scenes, routes advance signals, tears scenes down
//! - **Sequence**: walks a list of scenes one transition at a time
//!
//! # Example
//!
//! ```rust
//! use ember_core::Size;
//! use ember_scene::{MemoryAssets, SceneConfig, SceneOrchestrator};
//!
//! let config = SceneConfig::from_json(r#"{ "id": "dawn", "image": { "path": "dawn.png" } }"#)?;
//! let assets = MemoryAssets::new().with_image("dawn.png", Size::new(640.0, 480.0));
//! let mut scene = SceneOrchestrator::new(assets, Size::new(1280.0, 720.0));
//!
//! scene.load_scene(config)?;
//! scene.on_advance_visual();
//! scene.tick(1.0 / 60.0);
//! assert!(scene.is_scene_active());
//! # Ok::<(), ember_scene::SceneError>(())
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod geometry;
pub mod orchestrator;
pub mod registry;
pub mod schema;
pub mod sequence;
pub mod strategy;

pub use assets::{AssetSource, FsAssets, ImageInfo, MemoryAssets};
pub use config::{AnimationSpec, NovelConfig, SceneConfig, Verse};
pub use error::{Result, SceneError};
pub use geometry::{Geometry, GeometryKind, LineArt, PointCloud, Segment};
pub use orchestrator::{Layers, SceneOrchestrator, SceneState, VisualAdvance};
pub use registry::{GeometryAnimationKind, ImageAnimationKind, TextAnimationKind};
pub use sequence::SequenceController;
pub use strategy::{AnimationStrategy, Cue, LineAdvance, TextStrategy, TrackContext};
