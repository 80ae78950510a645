//! Asset sources
//!
//! The orchestrator fetches everything through an [`AssetSource`]: image
//! dimensions, raw geometry data, scene configs and novels. [`FsAssets`] reads
//! a project directory laid out as
//!
//! ```text
//! assets/images/<path>
//! assets/geometry/<type>/<file>
//! scenes/configs/<id>.json
//! novels/<id>.json
//! ```
//!
//! [`MemoryAssets`] keeps everything in maps, for tests and embedding.

use std::fs;
use std::path::{Path, PathBuf};

use ember_core::Size;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use crate::config::{NovelConfig, SceneConfig};
use crate::error::{Result, SceneError};
use crate::geometry::GeometryKind;

/// A loaded base image. Only its dimensions matter to the engine; pixels
/// are the renderer's business.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub path: String,
    pub size: Size,
}

/// Where scenes and their assets come from
pub trait AssetSource {
    fn load_image(&self, path: &str) -> Result<ImageInfo>;

    fn load_geometry(&self, kind: GeometryKind, file: &str) -> Result<Value>;

    fn load_scene(&self, id: &str) -> Result<SceneConfig>;

    fn load_novel(&self, id: &str) -> Result<NovelConfig>;
}

/// Relative path of a geometry data file
pub fn geometry_asset_path(kind: GeometryKind, file: &str) -> String {
    format!("assets/geometry/{}/{}", kind.name(), file)
}

// ============================================================================
// File system
// ============================================================================

/// Assets read from a project directory
#[derive(Clone, Debug)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_text(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        debug!("reading {}", path.display());
        fs::read_to_string(&path).map_err(|e| SceneError::asset(relative, e))
    }

    fn read_json(&self, relative: &str) -> Result<Value> {
        let text = self.read_text(relative)?;
        serde_json::from_str(&text).map_err(|e| SceneError::asset(relative, e))
    }
}

impl AssetSource for FsAssets {
    fn load_image(&self, path: &str) -> Result<ImageInfo> {
        let relative = format!("assets/images/{path}");
        let (width, height) = image::image_dimensions(self.root.join(&relative))
            .map_err(|e| SceneError::asset(&relative, e))?;
        Ok(ImageInfo {
            path: path.to_string(),
            size: Size::new(width as f32, height as f32),
        })
    }

    fn load_geometry(&self, kind: GeometryKind, file: &str) -> Result<Value> {
        self.read_json(&geometry_asset_path(kind, file))
    }

    fn load_scene(&self, id: &str) -> Result<SceneConfig> {
        let text = self.read_text(&format!("scenes/configs/{id}.json"))?;
        SceneConfig::from_json(&text)
    }

    fn load_novel(&self, id: &str) -> Result<NovelConfig> {
        let text = self.read_text(&format!("novels/{id}.json"))?;
        NovelConfig::from_json(&text)
    }
}

// ============================================================================
// In memory
// ============================================================================

/// Assets held in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    images: FxHashMap<String, Size>,
    geometry: FxHashMap<String, Value>,
    scenes: FxHashMap<String, SceneConfig>,
    novels: FxHashMap<String, NovelConfig>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: impl Into<String>, size: Size) -> Self {
        self.images.insert(path.into(), size);
        self
    }

    pub fn with_geometry(mut self, kind: GeometryKind, file: &str, data: Value) -> Self {
        self.geometry.insert(geometry_asset_path(kind, file), data);
        self
    }

    pub fn with_scene(mut self, scene: SceneConfig) -> Self {
        self.scenes.insert(scene.id.clone(), scene);
        self
    }

    pub fn with_novel(mut self, novel: NovelConfig) -> Self {
        self.novels.insert(novel.id.clone(), novel);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn load_image(&self, path: &str) -> Result<ImageInfo> {
        self.images
            .get(path)
            .map(|size| ImageInfo {
                path: path.to_string(),
                size: *size,
            })
            .ok_or_else(|| SceneError::asset(path, "not found"))
    }

    fn load_geometry(&self, kind: GeometryKind, file: &str) -> Result<Value> {
        let key = geometry_asset_path(kind, file);
        self.geometry
            .get(&key)
            .cloned()
            .ok_or_else(|| SceneError::asset(key, "not found"))
    }

    fn load_scene(&self, id: &str) -> Result<SceneConfig> {
        let scene = self
            .scenes
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::asset(format!("scenes/configs/{id}.json"), "not found"))?;
        scene.validate()?;
        Ok(scene)
    }

    fn load_novel(&self, id: &str) -> Result<NovelConfig> {
        self.novels
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::asset(format!("novels/{id}.json"), "not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_geometry_asset_path() {
        assert_eq!(
            geometry_asset_path(GeometryKind::LineArt, "harbor.json"),
            "assets/geometry/lineart/harbor.json"
        );
    }

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new()
            .with_image("a.png", Size::new(640.0, 480.0))
            .with_geometry(GeometryKind::PointCloud, "a.json", json!({ "points": [] }));

        assert_eq!(assets.load_image("a.png").unwrap().size, Size::new(640.0, 480.0));
        assert!(assets.load_geometry(GeometryKind::PointCloud, "a.json").is_ok());
        assert!(matches!(
            assets.load_geometry(GeometryKind::LineArt, "a.json"),
            Err(SceneError::AssetLoad { .. })
        ));
        assert!(matches!(
            assets.load_image("missing.png"),
            Err(SceneError::AssetLoad { .. })
        ));
    }

    #[test]
    fn test_fs_assets_missing_file() {
        let assets = FsAssets::new("/nonexistent-ember-root");
        let err = assets.load_scene("intro").unwrap_err();
        match err {
            SceneError::AssetLoad { path, .. } => assert_eq!(path, "scenes/configs/intro.json"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
