//! Ember Physics Bridge
//!
//! Scene effects that hand particles to a rigid-body simulation do it through
//! this crate:
//!
//! - [`PhysicsWorld`]: the interface any simulation backend implements
//! - [`RapierWorld`]: the `rapier2d` world (behind the `rapier` feature)
//! - [`SimulationDriver`]: steps a world at a fixed 60 Hz and mirrors body
//!   positions onto stage nodes, controlled through a [`DriverHandle`]

pub mod driver;
#[cfg(feature = "rapier")]
pub mod rapier;
pub mod world;

pub use driver::{BodySpec, DriverCommand, DriverHandle, DriverState, SimulationDriver, FIXED_STEP};
#[cfg(feature = "rapier")]
pub use rapier::RapierWorld;
pub use world::{BodyHandle, Material, PhysicsWorld};
