use glam::Vec2;
use phosphor_common::Side;
use phosphor_ecs::{Ball, ComponentKind, ComponentStore, Paddle, Position, Score, Velocity};
use rand::Rng;

use super::{System, SystemContext};
use crate::world::WorldEvent;

/// Detects balls past a boundary, credits that side's paddle and re-serves.
pub struct ScoringSystem;

/// The side a ball at `p` has crossed, if any.
pub fn crossed_side(p: Vec2) -> Option<Side> {
    if p.x > 1.0 {
        Some(Side::Right)
    } else if p.x < -1.0 {
        Some(Side::Left)
    } else if p.y > 1.0 {
        Some(Side::Top)
    } else if p.y < -1.0 {
        Some(Side::Bottom)
    } else {
        None
    }
}

/// Serve direction with an independent random sign per axis, at `speed`.
pub fn serve_velocity(rng: &mut impl Rng, speed: f32) -> Vec2 {
    let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    Vec2::new(sx, sy).normalize() * speed
}

impl System for ScoringSystem {
    fn name(&self) -> &'static str {
        "scoring"
    }

    fn execute(&mut self, store: &mut ComponentStore, _dt: f32, ctx: &mut SystemContext<'_>) {
        for ball in store.query(&[ComponentKind::Ball, ComponentKind::Position]) {
            let Some(&Position(p)) = store.get::<Position>(ball) else {
                continue;
            };
            let Some(side) = crossed_side(p) else {
                continue;
            };

            let owner = store
                .column::<Paddle>()
                .find(|(_, paddle)| paddle.side == side)
                .map(|(id, _)| id);
            match owner {
                Some(paddle) => {
                    let points = store.get::<Score>(paddle).map_or(0, |s| s.points) + 1;
                    store.add_component(paddle, Score { points });
                    tracing::info!(%side, points, "point scored");
                    ctx.events.push(WorldEvent::Scored {
                        side,
                        paddle,
                        points,
                    });
                }
                None => tracing::debug!(%side, "ball crossed an unguarded side"),
            }

            let speed = store.get::<Ball>(ball).map_or(ctx.params.serve_speed, |b| b.serve_speed);
            store.add_component(ball, Position(Vec2::ZERO));
            store.add_component(ball, Velocity(serve_velocity(&mut *ctx.rng, speed)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Harness;
    use approx::assert_abs_diff_eq;
    use phosphor_common::EntityId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn paddle(store: &mut ComponentStore, side: Side) -> EntityId {
        let id = store.spawn();
        store.add_component(
            id,
            Paddle {
                side,
                length: 0.3,
                speed: 1.0,
            },
        );
        store.add_component(id, Score::default());
        id
    }

    #[test]
    fn crossing_detection() {
        assert_eq!(crossed_side(Vec2::new(1.01, 0.0)), Some(Side::Right));
        assert_eq!(crossed_side(Vec2::new(0.0, -1.2)), Some(Side::Bottom));
        assert_eq!(crossed_side(Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn serve_is_unit_speed_on_diagonals() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..32 {
            let v = serve_velocity(&mut rng, 1.0);
            assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(v.x.abs(), v.y.abs(), epsilon = 1e-6);
        }
    }

    #[test]
    fn crossing_scores_for_that_side_and_resets_ball() {
        let mut store = ComponentStore::new();
        let left = paddle(&mut store, Side::Left);
        let right = paddle(&mut store, Side::Right);
        let ball = store.spawn();
        store.add_component(ball, Ball { serve_speed: 1.0 });
        store.add_component(ball, Position(Vec2::new(1.02, 0.3)));
        store.add_component(ball, Velocity(Vec2::new(0.6, 0.0)));

        let mut h = Harness::new();
        h.run(&mut ScoringSystem, &mut store, 0.016);

        assert_eq!(store.get::<Score>(right), Some(&Score { points: 1 }));
        assert_eq!(store.get::<Score>(left), Some(&Score { points: 0 }));
        assert_eq!(store.get::<Position>(ball), Some(&Position(Vec2::ZERO)));
        let v = store.get::<Velocity>(ball).unwrap().0;
        assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-6);
        assert!(matches!(
            h.events.as_slice(),
            [WorldEvent::Scored {
                side: Side::Right,
                points: 1,
                ..
            }]
        ));
    }

    #[test]
    fn ball_in_field_is_untouched() {
        let mut store = ComponentStore::new();
        paddle(&mut store, Side::Right);
        let ball = store.spawn();
        store.add_component(ball, Ball { serve_speed: 1.0 });
        store.add_component(ball, Position(Vec2::new(0.99, 0.0)));
        let mut h = Harness::new();
        h.run(&mut ScoringSystem, &mut store, 0.016);
        assert_eq!(store.get::<Position>(ball), Some(&Position(Vec2::new(0.99, 0.0))));
        assert!(h.events.is_empty());
    }
}
