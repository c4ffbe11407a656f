use glam::Vec2;
use phosphor_common::{EntityId, Side, ViewMode};
use phosphor_ecs::{ComponentEvent, ComponentStore};
use phosphor_input::InputState;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::SimParams;
use crate::systems::{System, SystemContext, default_schedule};

/// Notable things that happened during a tick, for observers and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorldEvent {
    /// Simulation advanced one tick. `changes` counts component writes.
    Stepped { tick: u64, seed: u64, changes: usize },
    /// A ball bounced off a paddle and now has `velocity`.
    Bounced {
        ball: EntityId,
        paddle: EntityId,
        velocity: Vec2,
    },
    /// A ball crossed `side`; the paddle guarding it now has `points`.
    Scored {
        side: Side,
        paddle: EntityId,
        points: u32,
    },
    /// An entity converted its transform and geometry to `mode`.
    ModeSwitched { entity: EntityId, mode: ViewMode },
}

/// The authoritative simulation state.
///
/// Owns the component store, the fixed system schedule and the seeded RNG.
/// Given the same seed, parameters and per-tick inputs, two worlds produce
/// identical states (compare with [`World::state_hash`]).
pub struct World {
    store: ComponentStore,
    systems: Vec<Box<dyn System>>,
    tick: u64,
    /// Mixed with splitmix64 every step.
    seed: u64,
    rng: Pcg32,
    params: SimParams,
    last_mode: Option<ViewMode>,
    event_log: Vec<WorldEvent>,
    /// Every component write since the last drain, in order.
    changes: Vec<ComponentEvent>,
}

impl World {
    /// A world running the default schedule.
    pub fn new(seed: u64, params: SimParams) -> Self {
        let mut world = Self::empty(seed, params);
        world.systems = default_schedule();
        world
    }

    /// A world with no systems; add them with [`World::add_system`].
    pub fn empty(seed: u64, params: SimParams) -> Self {
        Self {
            store: ComponentStore::new(),
            systems: Vec::new(),
            tick: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            params,
            last_mode: None,
            event_log: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Append a system to the end of the schedule.
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Replace the parameters. Components pick them up at the end of the next step.
    pub fn set_params(&mut self, params: SimParams) {
        self.params = params.sanitized();
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Events since the last drain. Both logs grow every step until drained;
    /// [`crate::Session`] drains them on each advance.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn changes(&self) -> &[ComponentEvent] {
        &self.changes
    }

    pub fn drain_changes(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.changes)
    }

    /// Advance one tick: run every system in order against `view_mode` and `input`.
    ///
    /// A negative or non-finite `dt` is treated as zero.
    pub fn step(&mut self, dt: f32, view_mode: ViewMode, input: &InputState) {
        let _span = tracing::debug_span!("world_step", tick = self.tick + 1).entered();
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        self.tick += 1;
        self.seed = splitmix64(self.seed);
        let mode_changed = self.last_mode != Some(view_mode);
        self.last_mode = Some(view_mode);

        let mut ctx = SystemContext {
            view_mode,
            mode_changed,
            input,
            params: &self.params,
            rng: &mut self.rng,
            events: &mut self.event_log,
        };
        for system in &mut self.systems {
            tracing::trace!(system = system.name(), "execute");
            system.execute(&mut self.store, dt, &mut ctx);
        }

        let changes = self.store.drain_events();
        let count = changes.len();
        self.changes.extend(changes);
        self.event_log.push(WorldEvent::Stepped {
            tick: self.tick,
            seed: self.seed,
            changes: count,
        });
    }

    /// Deterministic FNV-1a hash over tick, seed and every stored component.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                h ^= u64::from(b);
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&self.tick.to_le_bytes());
        mix(&self.seed.to_le_bytes());
        mix(&serde_json::to_vec(&self.store).unwrap_or_default());
        h
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("seed", &self.seed)
            .field("systems", &self.system_names())
            .field("entities", &self.store.entity_count())
            .finish_non_exhaustive()
    }
}

/// One splitmix64 step; advances the world seed reproducibly on every platform.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::MovementSystem;
    use phosphor_ecs::{Ball, Position, Velocity};

    fn ball_world(seed: u64) -> (World, EntityId) {
        let mut world = World::new(seed, SimParams::default());
        let store = world.store_mut();
        let ball = store.spawn();
        store.add_component(ball, Ball { serve_speed: 1.0 });
        store.add_component(ball, Position(Vec2::ZERO));
        store.add_component(ball, Velocity(Vec2::new(0.9, 0.7)));
        (world, ball)
    }

    #[test]
    fn step_advances_tick_and_seed() {
        let mut w = World::empty(42, SimParams::default());
        let input = InputState::default();
        w.step(0.016, ViewMode::Planar, &input);
        w.step(0.016, ViewMode::Planar, &input);
        assert_eq!(w.tick(), 2);
        assert_eq!(w.seed(), splitmix64(splitmix64(42)));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = World::empty(1, SimParams::default());
        let mut b = World::empty(2, SimParams::default());
        let input = InputState::default();
        a.step(0.016, ViewMode::Planar, &input);
        b.step(0.016, ViewMode::Planar, &input);
        assert_ne!(a.seed(), b.seed());
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn same_seed_same_run() {
        let input = InputState::default();
        let (mut a, _) = ball_world(42);
        let (mut b, _) = ball_world(42);
        for _ in 0..300 {
            a.step(1.0 / 60.0, ViewMode::Planar, &input);
            b.step(1.0 / 60.0, ViewMode::Planar, &input);
        }
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.events(), b.events());
    }

    #[test]
    fn stepped_event_counts_changes() {
        let mut w = World::empty(0, SimParams::default());
        w.add_system(Box::new(MovementSystem));
        let e = w.store_mut().spawn();
        w.store_mut().add_component(e, Position(Vec2::ZERO));
        w.store_mut().add_component(e, Velocity(Vec2::X));
        let input = InputState::default();

        w.step(0.5, ViewMode::Planar, &input);
        // two setup writes plus one movement update
        assert_eq!(
            w.events(),
            [WorldEvent::Stepped {
                tick: 1,
                seed: w.seed(),
                changes: 3
            }]
        );
        assert_eq!(w.drain_changes().len(), 3);
        assert!(w.changes().is_empty());
        assert_eq!(w.drain_events().len(), 1);
        assert!(w.events().is_empty());
    }

    #[test]
    fn bad_dt_is_ignored() {
        let mut w = World::empty(0, SimParams::default());
        w.add_system(Box::new(MovementSystem));
        let e = w.store_mut().spawn();
        w.store_mut().add_component(e, Position(Vec2::ZERO));
        w.store_mut().add_component(e, Velocity(Vec2::X));
        let input = InputState::default();
        for dt in [f32::NAN, f32::INFINITY, -1.0] {
            w.step(dt, ViewMode::Planar, &input);
        }
        assert_eq!(w.store().get::<Position>(e), Some(&Position(Vec2::ZERO)));
    }

    #[test]
    fn replayed_changes_rebuild_the_store() {
        let input = InputState::default();
        let (mut w, _) = ball_world(9);
        for _ in 0..120 {
            w.step(1.0 / 30.0, ViewMode::Planar, &input);
        }
        let mut replayed = ComponentStore::new();
        for change in w.changes() {
            replayed.apply_event(change);
        }
        assert_eq!(
            serde_json::to_value(&replayed).unwrap(),
            serde_json::to_value(w.store()).unwrap()
        );
    }

    #[test]
    fn default_schedule_is_installed() {
        let w = World::new(0, SimParams::default());
        assert_eq!(w.system_names().len(), 9);
        assert_eq!(w.system_names()[0], "movement");
    }
}
