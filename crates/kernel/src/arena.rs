//! Pong arena setup: four paddles on the field edges and one ball.

use glam::{Vec2, Vec3};
use phosphor_assets::{Mesh, MeshLibrary};
use phosphor_common::{Color, EntityId, MeshHandle, Shape2D, Side, ViewMode};
use phosphor_ecs::{
    Aabb, Ball, ComponentStore, Mesh3D, Name, Paddle, PaddleAi, PlayerControl, Position,
    Renderable2D, RotationBehavior, Score, Velocity, ViewModeComponent,
};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SimParams;
use crate::systems::{render_transform, serve_velocity};
use crate::world::World;

/// Distance between a paddle's outer face and the field boundary.
const EDGE_INSET: f32 = 0.05;

/// Who moves a paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Player,
    #[default]
    Ai,
    /// Never moves.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Sides missing from the map get an AI paddle.
    pub controllers: BTreeMap<Side, Controller>,
    /// Ball spin in radians per second.
    pub ball_spin: Vec3,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            controllers: BTreeMap::from([
                (Side::Left, Controller::Player),
                (Side::Right, Controller::Ai),
                (Side::Top, Controller::Ai),
                (Side::Bottom, Controller::Ai),
            ]),
            ball_spin: Vec3::new(0.6, 1.1, 0.0),
        }
    }
}

impl ArenaConfig {
    pub fn controller(&self, side: Side) -> Controller {
        self.controllers.get(&side).copied().unwrap_or_default()
    }
}

/// Entity ids of a spawned arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaEntities {
    pub paddles: BTreeMap<Side, EntityId>,
    pub ball: EntityId,
}

/// Spawns pong entities that can be shown in either view mode.
pub struct ArenaBuilder<'a> {
    library: &'a mut MeshLibrary,
    params: &'a SimParams,
    mode: ViewMode,
    color: Color,
}

impl<'a> ArenaBuilder<'a> {
    /// Entities start in `mode` and draw planar outlines in `color`.
    pub fn new(library: &'a mut MeshLibrary, params: &'a SimParams, mode: ViewMode, color: Color) -> Self {
        Self {
            library,
            params,
            mode,
            color,
        }
    }

    fn mesh(&mut self, name: &str, build: impl FnOnce() -> Mesh) -> MeshHandle {
        match self.library.handle(name) {
            Some(handle) => handle,
            None => self.library.insert_named(name, build()),
        }
    }

    /// Box size of a paddle guarding `side`.
    pub fn paddle_size(&self, side: Side) -> Vec2 {
        let mut size = Vec2::ZERO;
        size[side.travel_axis()] = self.params.paddle_length;
        size[side.normal_axis()] = self.params.paddle_thickness;
        size
    }

    /// Minimum corner of a centered paddle on `side`.
    pub fn paddle_position(&self, side: Side) -> Vec2 {
        let thickness = self.params.paddle_thickness;
        let mut at = Vec2::ZERO;
        at[side.travel_axis()] = -self.params.paddle_length * 0.5;
        at[side.normal_axis()] = if side.sign() > 0.0 {
            1.0 - EDGE_INSET - thickness
        } else {
            -1.0 + EDGE_INSET
        };
        at
    }

    pub fn spawn_paddle(&mut self, store: &mut ComponentStore, side: Side, controller: Controller) -> EntityId {
        let handle = self.mesh("paddle", || Mesh::cuboid(1.0, 1.0, 1.0));
        let size = self.paddle_size(side);
        let at = self.paddle_position(side);

        let id = store.spawn();
        store.add_component(id, Name(format!("{side} paddle")));
        store.add_component(
            id,
            Paddle {
                side,
                length: self.params.paddle_length,
                speed: self.params.paddle_speed,
            },
        );
        store.add_component(id, Position(at));
        store.add_component(id, Aabb { size });
        store.add_component(id, Score::default());
        match controller {
            Controller::Player => store.add_component(id, PlayerControl),
            Controller::Ai => store.add_component(id, PaddleAi),
            Controller::Idle => {}
        }
        self.attach_geometry(store, id, at + size * 0.5, size, handle);
        tracing::debug!(entity = %id, %side, ?controller, "paddle spawned");
        id
    }

    /// Ball with its minimum corner at the origin, moving at `velocity`.
    pub fn spawn_ball(&mut self, store: &mut ComponentStore, velocity: Vec2, spin: Vec3) -> EntityId {
        let handle = self.mesh("ball", || Mesh::icosphere(0.5, 1));
        let size = Vec2::splat(self.params.ball_size);

        let id = store.spawn();
        store.add_component(id, Name("ball".to_string()));
        store.add_component(
            id,
            Ball {
                serve_speed: self.params.serve_speed,
            },
        );
        store.add_component(id, Position(Vec2::ZERO));
        store.add_component(id, Velocity(velocity));
        store.add_component(id, Aabb { size });
        store.add_component(id, RotationBehavior { angular_velocity: spin });
        self.attach_geometry(store, id, size * 0.5, size, handle);
        tracing::debug!(entity = %id, ?velocity, "ball spawned");
        id
    }

    fn attach_geometry(
        &self,
        store: &mut ComponentStore,
        id: EntityId,
        center: Vec2,
        size: Vec2,
        handle: MeshHandle,
    ) {
        let shape = Renderable2D {
            shape: Shape2D::Rect { size: Vec2::ONE },
            color: self.color,
        };
        let mesh = Mesh3D { handle, color: None };
        store.add_component(id, ViewModeComponent::dual(self.mode, shape, mesh));
        store.add_component(id, render_transform(center, size, self.mode, self.params));
        match self.mode {
            ViewMode::Planar => store.add_component(id, shape),
            ViewMode::Spatial => store.add_component(id, mesh),
        }
    }
}

/// Spawn the full arena into `world`. The serve direction derives from the world seed.
pub fn spawn_arena(
    world: &mut World,
    library: &mut MeshLibrary,
    config: &ArenaConfig,
    mode: ViewMode,
    color: Color,
) -> ArenaEntities {
    let params = world.params().clone();
    let mut rng = Pcg32::seed_from_u64(world.seed());
    let serve = serve_velocity(&mut rng, params.serve_speed);

    let mut builder = ArenaBuilder::new(library, &params, mode, color);
    let store = world.store_mut();
    let paddles = Side::ALL
        .into_iter()
        .map(|side| (side, builder.spawn_paddle(store, side, config.controller(side))))
        .collect();
    let ball = builder.spawn_ball(store, serve, config.ball_spin);
    tracing::info!(entities = store.entity_count(), %mode, "arena spawned");
    ArenaEntities { paddles, ball }
}
