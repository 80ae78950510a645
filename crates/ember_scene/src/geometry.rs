//! Geometry model
//!
//! Derived geometry shipped alongside a scene image. Two variants exist:
//!
//! - **LineArt**: segments grouped into levels of detail; each level falls as
//!   one unit
//! - **PointCloud**: loose points, one particle each
//!
//! Geometry is validated once at load and never mutated afterwards.

use ember_core::Point;
use serde_json::Value;

use crate::error::{Result, SceneError};

/// Geometry variants known to the loader
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    LineArt,
    PointCloud,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 2] = [GeometryKind::LineArt, GeometryKind::PointCloud];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "lineart" => Ok(GeometryKind::LineArt),
            "pointcloud" => Ok(GeometryKind::PointCloud),
            other => Err(SceneError::UnknownType {
                kind: "geometry",
                name: other.to_string(),
            }),
        }
    }

    /// Name used in scene configs and asset paths
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::LineArt => "lineart",
            GeometryKind::PointCloud => "pointcloud",
        }
    }
}

/// One line-art segment, in source image pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A segment together with the level it belongs to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRef<'a> {
    pub segment: &'a Segment,
    pub level: usize,
}

/// Segments grouped into levels
#[derive(Clone, Debug, PartialEq)]
pub struct LineArt {
    levels: Vec<Vec<Segment>>,
    /// Flattened index of each level's first segment
    offsets: Vec<usize>,
    total: usize,
}

impl LineArt {
    /// Build from already-validated levels
    pub fn new(levels: Vec<Vec<Segment>>) -> Self {
        let mut offsets = Vec::with_capacity(levels.len());
        let mut total = 0;
        for level in &levels {
            offsets.push(total);
            total += level.len();
        }
        Self {
            levels,
            offsets,
            total,
        }
    }

    /// Parse `{ "levels": [[{ "start": {x, y}, "end": {x, y} }, ...], ...] }`
    pub fn from_value(data: &Value) -> Result<Self> {
        let levels = data
            .get("levels")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SceneError::Validation("line art data must contain a levels array".into())
            })?;

        let mut parsed = Vec::with_capacity(levels.len());
        for (i, level) in levels.iter().enumerate() {
            let segments = level
                .as_array()
                .ok_or_else(|| SceneError::Validation(format!("level {i} must be an array")))?;
            let mut out = Vec::with_capacity(segments.len());
            for (j, segment) in segments.iter().enumerate() {
                let invalid = || {
                    SceneError::Validation(format!("invalid segment at level {i}, index {j}"))
                };
                let start = point(segment.get("start")).ok_or_else(invalid)?;
                let end = point(segment.get("end")).ok_or_else(invalid)?;
                out.push(Segment { start, end });
            }
            parsed.push(out);
        }
        Ok(Self::new(parsed))
    }

    pub fn levels(&self) -> &[Vec<Segment>] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn segment_count(&self) -> usize {
        self.total
    }

    /// Look up a segment by its flattened, level-major index
    pub fn segment_at(&self, index: usize) -> Result<SegmentRef<'_>> {
        if index >= self.total {
            return Err(SceneError::Index {
                index,
                len: self.total,
            });
        }
        // Last level starting at or before `index`; empty levels share an
        // offset with their successor and are skipped by this.
        let level = self.offsets.partition_point(|&o| o <= index) - 1;
        Ok(SegmentRef {
            segment: &self.levels[level][index - self.offsets[level]],
            level,
        })
    }

    /// All segments in level-major order
    pub fn segments(&self) -> impl Iterator<Item = SegmentRef<'_>> {
        self.levels.iter().enumerate().flat_map(|(level, segments)| {
            segments
                .iter()
                .map(move |segment| SegmentRef { segment, level })
        })
    }
}

/// An ordered set of points
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    points: Vec<Point>,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Parse `{ "points": [{x, y}, ...] }`
    pub fn from_value(data: &Value) -> Result<Self> {
        let points = data
            .get("points")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SceneError::Validation("point cloud data must contain a points array".into())
            })?;
        let parsed = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                point(Some(p))
                    .ok_or_else(|| SceneError::Validation(format!("invalid point at index {i}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(parsed))
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Geometry loaded for a scene
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    LineArt(LineArt),
    PointCloud(PointCloud),
}

impl Geometry {
    /// Validate raw geometry data as the given variant
    pub fn load(kind: GeometryKind, data: &Value) -> Result<Self> {
        match kind {
            GeometryKind::LineArt => LineArt::from_value(data).map(Geometry::LineArt),
            GeometryKind::PointCloud => PointCloud::from_value(data).map(Geometry::PointCloud),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::LineArt(_) => GeometryKind::LineArt,
            Geometry::PointCloud(_) => GeometryKind::PointCloud,
        }
    }
}

fn point(value: Option<&Value>) -> Option<Point> {
    let value = value?;
    let x = value.get("x")?.as_f64()? as f32;
    let y = value.get("y")?.as_f64()? as f32;
    (x.is_finite() && y.is_finite()).then_some(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seg(x: f32) -> Value {
        json!({ "start": { "x": x, "y": 0.0 }, "end": { "x": x + 1.0, "y": 1.0 } })
    }

    #[test]
    fn test_segment_count_and_lookup() {
        let data = json!({ "levels": [[seg(0.0), seg(1.0)], [], [seg(2.0), seg(3.0), seg(4.0)]] });
        let art = LineArt::from_value(&data).unwrap();
        assert_eq!(art.level_count(), 3);
        assert_eq!(art.segment_count(), 5);

        let levels: Vec<usize> = (0..5).map(|i| art.segment_at(i).unwrap().level).collect();
        assert_eq!(levels, vec![0, 0, 2, 2, 2]);
        assert_eq!(art.segment_at(3).unwrap().segment.start.x, 3.0);
    }

    #[test]
    fn test_segment_at_out_of_range() {
        let art = LineArt::from_value(&json!({ "levels": [[seg(0.0)]] })).unwrap();
        assert!(matches!(
            art.segment_at(1),
            Err(SceneError::Index { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_missing_levels() {
        let err = LineArt::from_value(&json!({ "points": [] })).unwrap_err();
        assert!(matches!(err, SceneError::Validation(_)));
    }

    #[test]
    fn test_non_numeric_coordinate_names_position() {
        let bad = json!({ "start": { "x": "1", "y": 0 }, "end": { "x": 1, "y": 1 } });
        let data = json!({ "levels": [[seg(0.0)], [seg(1.0), bad]] });
        let err = LineArt::from_value(&data).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("level 1"), "{message}");
        assert!(message.contains("index 1"), "{message}");
    }

    #[test]
    fn test_point_cloud() {
        let data = json!({ "points": [{ "x": 1, "y": 2 }, { "x": 3.5, "y": 4 }] });
        let cloud = PointCloud::from_value(&data).unwrap();
        assert_eq!(cloud.points(), &[Point::new(1.0, 2.0), Point::new(3.5, 4.0)]);

        let err = PointCloud::from_value(&json!({ "points": [{ "x": 1 }] })).unwrap_err();
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(
            GeometryKind::from_name("svg"),
            Err(SceneError::UnknownType { kind: "geometry", .. })
        ));
    }
}
