//! Layer model for the scene stage
//!
//! All visual state produced by the engine lives in a [`Stage`]: an arena of
//! nodes arranged as a tree. A hosting renderer walks the stage every frame and
//! draws what it finds; the engine never draws anything itself.
//!
//! # Node kinds
//!
//! - **Container**: groups children, carries its own transform and alpha
//! - **Sprite**: the scene's base raster image
//! - **Line**: one line-art segment
//! - **Particle**: one point-cloud particle
//! - **Text**: one line of verse text
//! - **Panel**: a rounded background rectangle

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

// ─────────────────────────────────────────────────────────────────────────────
// Core Geometry Types
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center point of a rect of this size placed at the origin
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Uniform scale that fits `self` inside `bounds`, shrunk by `padding`
    /// (a fraction of `bounds`, 0.0 = edge to edge).
    pub fn fit_scale(&self, bounds: Size, padding: f32) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return 1.0;
        }
        let usable = 1.0 - padding;
        ((bounds.width * usable) / self.width).min((bounds.height * usable) / self.height)
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }
}

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage
// ─────────────────────────────────────────────────────────────────────────────

new_key_type! {
    /// Handle to a node on the stage
    pub struct NodeId;
}

/// Animatable scalar properties of a node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Scale,
    Alpha,
}

/// What a node draws
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Container,
    Sprite {
        path: String,
        size: Size,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
    },
    Particle {
        radius: f32,
    },
    Text {
        content: String,
    },
    Panel {
        rect: Rect,
        corner_radius: f32,
        fill_alpha: f32,
    },
}

/// A node on the stage
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Point,
    pub scale: f32,
    pub alpha: f32,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            position: Point::ZERO,
            scale: 1.0,
            alpha: 1.0,
            parent,
            children: SmallVec::new(),
        }
    }

    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::X => self.position.x,
            Property::Y => self.position.y,
            Property::Scale => self.scale,
            Property::Alpha => self.alpha,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::X => self.position.x = value,
            Property::Y => self.position.y = value,
            Property::Scale => self.scale = value,
            Property::Alpha => self.alpha = value,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of visual nodes shared by every track of a scene
///
/// Writes to removed nodes are ignored rather than reported: tweens and the
/// physics driver may outlive the nodes they target by one frame during
/// teardown.
pub struct Stage {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    surface: Size,
}

impl Stage {
    pub fn new(surface: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeKind::Container, None));
        Self {
            nodes,
            root,
            surface,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Size of the rendering surface the stage is drawn onto
    pub fn surface(&self) -> Size {
        self.surface
    }

    pub fn set_surface(&mut self, surface: Size) {
        self.surface = surface;
    }

    /// Add a node as the last (top-most) child of `parent`
    pub fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            self.root
        };
        let id = self.nodes.insert(Node::new(kind, Some(parent)));
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn add_container(&mut self, parent: NodeId) -> NodeId {
        self.add(parent, NodeKind::Container)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn get(&self, id: NodeId, property: Property) -> Option<f32> {
        self.nodes.get(id).map(|n| n.get(property))
    }

    pub fn set(&mut self, id: NodeId, property: Property, value: f32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set(property, value);
        }
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.position = position;
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    /// Remove a node and everything below it
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            self.clear_children(id);
            return;
        }
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack: Vec<NodeId> = node.children.into_vec();
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(child) {
                stack.extend(removed.children);
            }
        }
    }

    /// Remove every descendant of `id`, keeping `id` itself
    pub fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    /// Alpha of a node multiplied through its ancestors
    pub fn effective_alpha(&self, id: NodeId) -> f32 {
        let mut alpha = 1.0;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(current) {
                Some(node) => {
                    alpha *= node.alpha;
                    cursor = node.parent;
                }
                None => return 0.0,
            }
        }
        alpha
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}
