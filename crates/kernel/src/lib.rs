//! Simulation kernel: world stepping, pong and view-mode systems, arena
//! setup, scene extraction and the per-frame session driver.
//!
//! # Invariants
//! - Systems run once per tick in a fixed order and mutate state only
//!   through the component store.
//! - An entity's transform shape always matches its view-mode component;
//!   only [`systems::ViewModeAdapter`] converts between shapes.
//! - Given the same seed, parameters and inputs, a run is reproducible.
//! - Balls stay inside the field between scoring resets; paddles stay
//!   inside `[-1, 1 - length]` along their travel axis.

pub mod arena;
pub mod config;
pub mod scene;
pub mod session;
pub mod systems;
pub mod world;

pub use arena::{ArenaBuilder, ArenaConfig, ArenaEntities, Controller, spawn_arena};
pub use config::{ConfigError, SessionConfig, SimParams};
pub use scene::{Drawables, extract};
pub use session::Session;
pub use systems::{System, SystemContext, default_schedule};
pub use world::{World, WorldEvent};
