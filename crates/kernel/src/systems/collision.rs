use glam::Vec2;
use phosphor_common::Side;
use phosphor_ecs::{Aabb, ComponentKind, ComponentStore, Paddle, Position, Velocity};
use rand::Rng;

use super::{System, SystemContext};
use crate::world::WorldEvent;

/// Bounces balls off paddles on AABB overlap.
///
/// A bounce fires only while the ball still moves toward the paddle's side,
/// so a ball that keeps overlapping after the bounce is not reflected again.
pub struct CollisionSystem;

/// True when `velocity` carries a ball toward the boundary `side` guards.
pub fn approaching(side: Side, velocity: Vec2) -> bool {
    velocity[side.normal_axis()] * side.sign() > 0.0
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn execute(&mut self, store: &mut ComponentStore, _dt: f32, ctx: &mut SystemContext<'_>) {
        let paddles: Vec<_> = store
            .query(&[ComponentKind::Paddle, ComponentKind::Position, ComponentKind::Aabb])
            .into_iter()
            .filter_map(|id| {
                Some((
                    id,
                    *store.get::<Paddle>(id)?,
                    store.get::<Position>(id)?.0,
                    *store.get::<Aabb>(id)?,
                ))
            })
            .collect();

        let balls = store.query(&[
            ComponentKind::Ball,
            ComponentKind::Position,
            ComponentKind::Velocity,
            ComponentKind::Aabb,
        ]);
        for ball in balls {
            let (Some(&Position(at)), Some(&Velocity(mut v)), Some(&bounds)) = (
                store.get::<Position>(ball),
                store.get::<Velocity>(ball),
                store.get::<Aabb>(ball),
            ) else {
                continue;
            };

            let mut bounced = false;
            for &(paddle_id, paddle, paddle_at, paddle_box) in &paddles {
                if !bounds.overlaps(at, &paddle_box, paddle_at) || !approaching(paddle.side, v) {
                    continue;
                }
                let normal = paddle.side.normal_axis();
                let travel = paddle.side.travel_axis();
                v[normal] = -v[normal] * ctx.params.bounce_factor;
                let jitter = ctx.params.bounce_jitter;
                if jitter > 0.0 {
                    v[travel] += ctx.rng.random_range(-jitter..=jitter);
                }
                tracing::debug!(%ball, paddle = %paddle_id, side = %paddle.side, ?v, "bounce");
                ctx.events.push(WorldEvent::Bounced {
                    ball,
                    paddle: paddle_id,
                    velocity: v,
                });
                bounced = true;
            }
            if bounced {
                store.add_component(ball, Velocity(v));
            }
        }
    }
}
