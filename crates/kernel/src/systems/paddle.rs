use glam::Vec2;
use phosphor_common::EntityId;
use phosphor_ecs::{Aabb, ComponentKind, ComponentStore, Paddle, Position};

use super::{System, SystemContext};

/// Moves player paddles by the requested direction, `speed * dt` per tick.
pub struct PlayerControlSystem;

/// Moves AI paddles toward the closest ball.
///
/// A paddle holds still once its center is within one step of the ball,
/// so it does not jitter around the target.
pub struct PaddleAiSystem;

impl System for PlayerControlSystem {
    fn name(&self) -> &'static str {
        "player_control"
    }

    fn execute(&mut self, store: &mut ComponentStore, dt: f32, ctx: &mut SystemContext<'_>) {
        let kinds = [
            ComponentKind::Paddle,
            ComponentKind::Position,
            ComponentKind::PlayerControl,
        ];
        for entity in store.query(&kinds) {
            let Some(&paddle) = store.get::<Paddle>(entity) else {
                continue;
            };
            let direction = ctx.input.paddle_direction(paddle.side);
            if direction != 0.0 {
                slide(store, entity, &paddle, direction * paddle.speed * dt);
            }
        }
    }
}

impl System for PaddleAiSystem {
    fn name(&self) -> &'static str {
        "paddle_ai"
    }

    fn execute(&mut self, store: &mut ComponentStore, dt: f32, _ctx: &mut SystemContext<'_>) {
        let balls: Vec<Vec2> = store
            .query(&[ComponentKind::Ball, ComponentKind::Position])
            .into_iter()
            .filter_map(|ball| center_of(store, ball))
            .collect();
        if balls.is_empty() {
            return;
        }

        let kinds = [
            ComponentKind::Paddle,
            ComponentKind::Position,
            ComponentKind::PaddleAi,
        ];
        for entity in store.query(&kinds) {
            let (Some(&paddle), Some(center)) = (store.get::<Paddle>(entity), center_of(store, entity))
            else {
                continue;
            };
            let Some(target) = balls
                .iter()
                .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)))
            else {
                continue;
            };

            let axis = paddle.side.travel_axis();
            let gap = target[axis] - center[axis];
            let step = paddle.speed * dt;
            if gap.abs() > step {
                slide(store, entity, &paddle, step.copysign(gap));
            }
        }
    }
}

/// Box center, or the bare position for entities without a box.
pub(crate) fn center_of(store: &ComponentStore, entity: EntityId) -> Option<Vec2> {
    let Position(p) = *store.get::<Position>(entity)?;
    let size = store.get::<Aabb>(entity).map_or(Vec2::ZERO, |b| b.size);
    Some(p + size * 0.5)
}

/// Shift a paddle along its travel axis, clamped to its travel range.
fn slide(store: &mut ComponentStore, entity: EntityId, paddle: &Paddle, delta: f32) {
    let Some(&Position(mut p)) = store.get::<Position>(entity) else {
        return;
    };
    let axis = paddle.side.travel_axis();
    let (lo, hi) = paddle.travel_range();
    p[axis] = (p[axis] + delta).clamp(lo, hi);
    store.add_component(entity, Position(p));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Harness;
    use approx::assert_abs_diff_eq;
    use phosphor_common::Side;
    use phosphor_ecs::{Ball, PaddleAi, PlayerControl};
    use phosphor_input::Action;

    fn paddle(store: &mut ComponentStore, side: Side, at: Vec2) -> EntityId {
        let id = store.spawn();
        store.add_component(
            id,
            Paddle {
                side,
                length: 0.3,
                speed: 1.0,
            },
        );
        store.add_component(id, Position(at));
        store.add_component(
            id,
            Aabb {
                size: if side.travel_axis() == 1 {
                    Vec2::new(0.04, 0.3)
                } else {
                    Vec2::new(0.3, 0.04)
                },
            },
        );
        id
    }

    #[test]
    fn player_paddle_follows_input() {
        let mut store = ComponentStore::new();
        let left = paddle(&mut store, Side::Left, Vec2::new(-0.95, 0.0));
        store.add_component(left, PlayerControl);

        let mut h = Harness::new();
        h.input.apply(Action::MovePaddle {
            side: Side::Left,
            direction: 1.0,
        });
        h.run(&mut PlayerControlSystem, &mut store, 0.25);
        let p = store.get::<Position>(left).unwrap().0;
        assert_abs_diff_eq!(p.y, 0.25);
        assert_abs_diff_eq!(p.x, -0.95);
    }

    #[test]
    fn paddle_never_leaves_its_range() {
        let mut store = ComponentStore::new();
        let bottom = paddle(&mut store, Side::Bottom, Vec2::new(0.0, -0.95));
        store.add_component(bottom, PlayerControl);

        let mut h = Harness::new();
        for direction in [1.0, -1.0] {
            h.input.apply(Action::MovePaddle {
                side: Side::Bottom,
                direction,
            });
            for _ in 0..200 {
                h.run(&mut PlayerControlSystem, &mut store, 0.05);
                let x = store.get::<Position>(bottom).unwrap().0.x;
                assert!((-1.0..=0.7 + 1e-6).contains(&x), "paddle escaped to {x}");
            }
        }
        assert_abs_diff_eq!(store.get::<Position>(bottom).unwrap().0.x, -1.0);
    }

    #[test]
    fn ai_tracks_ball_and_rests_when_close() {
        let mut store = ComponentStore::new();
        let right = paddle(&mut store, Side::Right, Vec2::new(0.91, -0.15));
        store.add_component(right, PaddleAi);
        let ball = store.spawn();
        store.add_component(ball, Ball { serve_speed: 1.0 });
        store.add_component(ball, Position(Vec2::new(0.0, 0.48)));
        store.add_component(ball, Aabb { size: Vec2::splat(0.04) });

        let mut h = Harness::new();
        h.run(&mut PaddleAiSystem, &mut store, 0.1);
        assert_abs_diff_eq!(store.get::<Position>(right).unwrap().0.y, -0.05, epsilon = 1e-6);

        for _ in 0..20 {
            h.run(&mut PaddleAiSystem, &mut store, 0.1);
        }
        // center settles within one step of the ball center at y = 0.5
        let center_y = store.get::<Position>(right).unwrap().0.y + 0.15;
        assert!((center_y - 0.5).abs() <= 0.1 + 1e-5);

        let before = store.get::<Position>(right).copied();
        h.run(&mut PaddleAiSystem, &mut store, 0.1);
        assert_eq!(store.get::<Position>(right).copied(), before);
    }

    #[test]
    fn ai_without_balls_is_a_noop() {
        let mut store = ComponentStore::new();
        let top = paddle(&mut store, Side::Top, Vec2::new(0.2, 0.91));
        store.add_component(top, PaddleAi);
        let mut h = Harness::new();
        h.run(&mut PaddleAiSystem, &mut store, 0.1);
        assert_eq!(store.get::<Position>(top), Some(&Position(Vec2::new(0.2, 0.91))));
    }
}
