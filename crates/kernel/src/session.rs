//! Frame driver tying input, simulation and rendering together.
//!
//! One [`Session::frame`] call is one display refresh: camera input is read
//! first, then the world steps once, then the current component state is
//! extracted and rendered. Nothing is held across frames except the
//! session's own state, so a host stops the loop simply by not calling
//! `frame` again. The world's event and change logs are drained on every
//! advance; only the most recent tick's records are kept.

use phosphor_assets::MeshLibrary;
use phosphor_common::{Side, ViewMode};
use phosphor_ecs::{ComponentEvent, Score};
use phosphor_input::{Action, InputState};
use phosphor_render::{Camera, Canvas, LineSegment, WireframeRenderer};
use std::collections::BTreeMap;

use crate::arena::{ArenaEntities, spawn_arena};
use crate::config::{SessionConfig, SimParams};
use crate::scene::{Drawables, extract};
use crate::world::{World, WorldEvent};

pub struct Session {
    world: World,
    library: MeshLibrary,
    renderer: WireframeRenderer,
    camera: Camera,
    input: InputState,
    arena: ArenaEntities,
    last_events: Vec<WorldEvent>,
    last_changes: Vec<ComponentEvent>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let config = config.sanitized();
        let mut world = World::new(config.seed, config.sim.clone());
        let mut library = MeshLibrary::with_defaults();
        let arena = spawn_arena(
            &mut world,
            &mut library,
            &config.arena,
            config.view_mode,
            config.render.phosphor_color,
        );

        let mut input = InputState::new(config.view_mode);
        if !config.render.hidden_line_removal {
            input.apply(Action::ToggleHiddenLines);
        }
        if !config.render.backface_culling {
            input.apply(Action::ToggleCulling);
        }

        tracing::info!(seed = config.seed, mode = %config.view_mode, "session started");
        Self {
            world,
            library,
            renderer: WireframeRenderer::new(config.render),
            camera: config.camera,
            input,
            arena,
            last_events: Vec::new(),
            last_changes: Vec::new(),
        }
    }

    pub fn apply(&mut self, action: Action) {
        self.input.apply(action);
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &WireframeRenderer {
        &self.renderer
    }

    pub fn arena(&self) -> &ArenaEntities {
        &self.arena
    }

    pub fn view_mode(&self) -> ViewMode {
        self.input.view_mode()
    }

    pub fn set_params(&mut self, params: SimParams) {
        self.world.set_params(params);
    }

    /// World events raised by the most recent advance.
    pub fn last_events(&self) -> &[WorldEvent] {
        &self.last_events
    }

    /// Component writes made by the most recent advance.
    pub fn last_changes(&self) -> &[ComponentEvent] {
        &self.last_changes
    }

    /// Apply pending camera input and step the world once.
    pub fn advance(&mut self, dt: f32) {
        let delta = self.input.take_camera_delta();
        if !delta.is_zero() {
            self.camera.orbit(delta.orbit.x, delta.orbit.y);
            if delta.zoom != 0.0 {
                self.camera.zoom(delta.zoom);
            }
            if delta.pan != glam::Vec2::ZERO {
                self.camera.pan(delta.pan.x, delta.pan.y);
            }
            tracing::trace!(?delta, distance = self.camera.distance(), "camera moved");
        }

        let config = self.renderer.config();
        if config.hidden_line_removal != self.input.hidden_line_removal()
            || config.backface_culling != self.input.backface_culling()
        {
            let mut config = config.clone();
            config.hidden_line_removal = self.input.hidden_line_removal();
            config.backface_culling = self.input.backface_culling();
            self.renderer.set_config(config);
        }

        self.world.step(dt, self.input.view_mode(), &self.input);
        self.last_events = self.world.drain_events();
        self.last_changes = self.world.drain_changes();
    }

    /// What the current state would draw.
    pub fn drawables(&self) -> Drawables {
        extract(
            self.world.store(),
            &self.library,
            self.renderer.config().phosphor_color,
        )
    }

    /// Advance, then render onto `canvas`. Returns the drawn segments in draw order.
    pub fn frame(&mut self, dt: f32, canvas: &mut dyn Canvas) -> Vec<LineSegment> {
        self.advance(dt);
        let drawables = self.drawables();
        self.renderer
            .render_frame(&drawables.meshes, &drawables.shapes, &self.camera, dt, canvas)
    }

    /// Points per side for the arena's paddles.
    pub fn scores(&self) -> BTreeMap<Side, u32> {
        self.arena
            .paddles
            .iter()
            .map(|(&side, &id)| {
                let points = self.world.store().get::<Score>(id).map_or(0, |s| s.points);
                (side, points)
            })
            .collect()
    }
}
