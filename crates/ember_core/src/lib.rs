//! Ember Core
//!
//! Foundational primitives shared by every Ember crate:
//!
//! - **Stage**: the arena of visual nodes a hosting renderer draws from
//! - **Signals**: the logical inputs the engine consumes, and default key bindings
//! - **State Machines**: flat transition tables for lifecycle tracking
//!
//! # Example
//!
//! ```rust
//! use ember_core::{NodeKind, Property, Size, Stage};
//!
//! let mut stage = Stage::new(Size::new(1920.0, 1080.0));
//! let layer = stage.add_container(stage.root());
//! let dot = stage.add(layer, NodeKind::Particle { radius: 2.0 });
//!
//! stage.set(dot, Property::Alpha, 0.0);
//! assert_eq!(stage.get(dot, Property::Alpha), Some(0.0));
//! ```

pub mod events;
pub mod fsm;
pub mod layer;

pub use events::{KeyBindings, KeyCode, Signal};
pub use fsm::{EventId, StateId, StateMachine, Transition};
pub use layer::{Node, NodeId, NodeKind, Point, Property, Rect, Size, Stage, Vec2};
