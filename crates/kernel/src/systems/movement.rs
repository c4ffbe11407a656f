use phosphor_ecs::{ComponentKind, ComponentStore, Position, Velocity};

use super::{System, SystemContext};

/// Integrates `position += velocity * dt` for everything that moves.
pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn execute(&mut self, store: &mut ComponentStore, dt: f32, _ctx: &mut SystemContext<'_>) {
        for entity in store.query(&[ComponentKind::Position, ComponentKind::Velocity]) {
            let (Some(&Position(p)), Some(&Velocity(v))) =
                (store.get::<Position>(entity), store.get::<Velocity>(entity))
            else {
                continue;
            };
            if v != glam::Vec2::ZERO {
                store.add_component(entity, Position(p + v * dt));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Harness;
    use approx::assert_abs_diff_eq;
    use glam::Vec2;

    #[test]
    fn integrates_velocity() {
        let mut store = ComponentStore::new();
        let ball = store.spawn();
        store.add_component(ball, Position(Vec2::ZERO));
        store.add_component(ball, Velocity(Vec2::new(0.5, -0.25)));
        let wall = store.spawn();
        store.add_component(wall, Position(Vec2::ONE));

        let mut h = Harness::new();
        h.run(&mut MovementSystem, &mut store, 0.5);
        let p = store.get::<Position>(ball).unwrap().0;
        assert_abs_diff_eq!(p.x, 0.25);
        assert_abs_diff_eq!(p.y, -0.125);
        assert_eq!(store.get::<Position>(wall), Some(&Position(Vec2::ONE)));
    }

    #[test]
    fn split_steps_match_one_step() {
        let mut a = ComponentStore::new();
        let mut b = ComponentStore::new();
        for store in [&mut a, &mut b] {
            let e = store.spawn();
            store.add_component(e, Position(Vec2::ZERO));
            store.add_component(e, Velocity(Vec2::new(0.3, 0.6)));
        }
        let mut h = Harness::new();
        h.run(&mut MovementSystem, &mut a, 0.2);
        for _ in 0..4 {
            h.run(&mut MovementSystem, &mut b, 0.05);
        }
        let pa = a.column::<Position>().map(|(_, p)| p.0).next().unwrap();
        let pb = b.column::<Position>().map(|(_, p)| p.0).next().unwrap();
        assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-6);
        assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-6);
    }
}
