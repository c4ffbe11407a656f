//! Simulation systems and the fixed schedule they run in.
//!
//! A system reads components through the store, computes new values and
//! writes them back with `add_component` or `remove_component`. Nothing
//! else is mutated, except the RNG and event sink handed in through
//! [`SystemContext`].

mod collision;
mod movement;
mod paddle;
mod parameter_sync;
mod rotation;
mod scoring;
mod transform_sync;
mod view_mode;

pub use collision::CollisionSystem;
pub use movement::MovementSystem;
pub use paddle::{PaddleAiSystem, PlayerControlSystem};
pub use parameter_sync::ParameterSyncSystem;
pub use rotation::RotationSystem;
pub use scoring::{ScoringSystem, serve_velocity};
pub use transform_sync::{
    SPATIAL_EXTENT, TransformSyncSystem, planar_scale, render_transform, to_pixel, to_spatial,
};
pub use view_mode::{ViewModeAdapter, planar_to_spatial, spatial_to_planar};

use phosphor_common::ViewMode;
use phosphor_ecs::ComponentStore;
use phosphor_input::InputState;
use rand_pcg::Pcg32;

use crate::SimParams;
use crate::world::WorldEvent;

/// Inputs handed to every system for one tick.
pub struct SystemContext<'a> {
    /// Global view mode requested for this tick.
    pub view_mode: ViewMode,
    /// True when `view_mode` differs from the previous tick's.
    pub mode_changed: bool,
    pub input: &'a InputState,
    pub params: &'a SimParams,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<WorldEvent>,
}

/// One step of the per-tick pipeline.
pub trait System {
    fn name(&self) -> &'static str;

    fn execute(&mut self, store: &mut ComponentStore, dt: f32, ctx: &mut SystemContext<'_>);
}

/// The default schedule, in execution order.
pub fn default_schedule() -> Vec<Box<dyn System>> {
    vec![
        Box::new(MovementSystem),
        Box::new(PlayerControlSystem),
        Box::new(PaddleAiSystem),
        Box::new(CollisionSystem),
        Box::new(ScoringSystem),
        Box::new(TransformSyncSystem),
        Box::new(RotationSystem),
        Box::new(ViewModeAdapter),
        Box::new(ParameterSyncSystem),
    ]
}
