//! Per-tick collision and effect rules.
//!
//! Each function handles one step of the lobby tick and is called in a fixed
//! order by `Lobby::tick`: effect, integration, goal, wall bounce, paddles,
//! power-ups.

use pong_shared::config::GameConfig;
use pong_shared::vec2::Vec2;

use crate::ball::{Ball, Effect};
use crate::player::Player;
use crate::power_up::PowerUp;

/// Half of the field; also which paddle a player holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Position of the paddle owner in the lobby's player list.
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Apply the ball's active effect before it moves.
pub fn resolve_effect(ball: &mut Ball, config: &GameConfig) {
    match ball.effect {
        Some(Effect::FastBall { remaining_ticks: 0 }) => {
            ball.vel = ball.vel.with_length(ball.base_speed);
            ball.effect = None;
        }
        Some(Effect::FastBall { remaining_ticks }) => {
            ball.vel = ball
                .vel
                .with_length(ball.base_speed * config.fast_ball_multiplier);
            ball.effect = Some(Effect::FastBall {
                remaining_ticks: remaining_ticks - 1,
            });
        }
        Some(Effect::ReverseBall) => {
            ball.vel = -ball.vel;
            ball.effect = None;
        }
        None => {}
    }
}

/// Side credited with a point if the ball has left the field horizontally.
pub fn check_goal(ball: &Ball, config: &GameConfig) -> Option<Side> {
    if ball.pos.x - ball.radius < 0.0 {
        Some(Side::Right)
    } else if ball.pos.x + ball.radius > config.field_width {
        Some(Side::Left)
    } else {
        None
    }
}

/// Reflect off the top or bottom wall. Only vy changes.
pub fn bounce_off_walls(ball: &mut Ball, config: &GameConfig) -> bool {
    let hit_top = ball.pos.y - ball.radius < 0.0 && ball.vel.y < 0.0;
    let hit_bottom = ball.pos.y + ball.radius > config.field_height && ball.vel.y > 0.0;
    if hit_top || hit_bottom {
        ball.vel.y = -ball.vel.y;
        true
    } else {
        false
    }
}

/// Bounce the ball off a paddle if their boxes overlap.
///
/// The ball is sent away from the paddle center and placed flush against
/// the struck face, so the same paddle cannot catch it again next tick. A
/// moving paddle bends the outgoing angle; `tanh` saturates its influence,
/// and the result is capped at `max_bounce_angle`.
pub fn collide_paddle(ball: &mut Ball, paddle: &Player, config: &GameConfig) -> bool {
    let min = paddle.pos;
    let max = paddle.pos + paddle.size;
    let r = ball.radius;
    let overlaps = ball.pos.x + r > min.x
        && ball.pos.x - r < max.x
        && ball.pos.y + r > min.y
        && ball.pos.y - r < max.y;
    if !overlaps {
        return false;
    }

    let dir = if ball.pos.x < paddle.center().x {
        ball.pos.x = min.x - r;
        -1.0
    } else {
        ball.pos.x = max.x + r;
        1.0
    };

    let speed = ball.speed();
    let influence = config.paddle_deflection * (paddle.vel_y / config.paddle_speed).tanh();
    let angle = (ball.vel.y.atan2(ball.vel.x.abs()) + influence)
        .clamp(-config.max_bounce_angle, config.max_bounce_angle);
    ball.vel = Vec2::new(dir * angle.cos() * speed, angle.sin() * speed);
    true
}

/// Overlap with the power-up's spawn origin. The bob is drawn only.
pub fn touches_power_up(ball: &Ball, power_up: &PowerUp) -> bool {
    ball.pos.distance(power_up.origin) < ball.radius + power_up.radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::off_axis_angle;
    use pong_shared::protocol::{PlayerId, PowerUpKind};

    fn ball_at(x: f64, y: f64, vx: f64, vy: f64) -> Ball {
        let mut ball = Ball::new(&GameConfig::default());
        ball.pos = Vec2::new(x, y);
        ball.vel = Vec2::new(vx, vy);
        ball
    }

    fn left_paddle(y: f64, vel_y: f64) -> Player {
        let config = GameConfig::default();
        let mut p = Player::new(PlayerId::from("left"));
        p.pos = Vec2::new(config.paddle_offset, y);
        p.size = Vec2::new(config.paddle_width, config.paddle_height);
        p.vel_y = vel_y;
        p
    }

    fn right_paddle(y: f64) -> Player {
        let config = GameConfig::default();
        let mut p = Player::new(PlayerId::from("right"));
        p.pos = Vec2::new(
            config.field_width - config.paddle_offset - config.paddle_width,
            y,
        );
        p.size = Vec2::new(config.paddle_width, config.paddle_height);
        p
    }

    // --- effects ---

    #[test]
    fn fast_ball_doubles_speed_and_counts_down() {
        let config = GameConfig::default();
        let mut ball = ball_at(400.0, 300.0, 6.0, 0.0);
        ball.effect = Some(Effect::FastBall { remaining_ticks: 5 });
        resolve_effect(&mut ball, &config);
        assert!((ball.speed() - 12.0).abs() < 1e-9);
        assert_eq!(ball.effect, Some(Effect::FastBall { remaining_ticks: 4 }));
    }

    #[test]
    fn fast_ball_reverts_after_exact_duration() {
        let config = GameConfig {
            fast_ball_duration: 3,
            ..Default::default()
        };
        let mut ball = ball_at(400.0, 300.0, 3.0, 4.0);
        ball.effect = Some(Effect::FastBall {
            remaining_ticks: config.fast_ball_duration,
        });

        for _ in 0..config.fast_ball_duration {
            resolve_effect(&mut ball, &config);
            assert!((ball.speed() - ball.base_speed * 2.0).abs() < 1e-9);
        }
        resolve_effect(&mut ball, &config);
        assert!((ball.speed() - ball.base_speed).abs() < 1e-9);
        assert!(ball.effect.is_none());
    }

    #[test]
    fn reverse_ball_flips_once() {
        let config = GameConfig::default();
        let mut ball = ball_at(400.0, 300.0, 5.0, -2.0);
        ball.effect = Some(Effect::ReverseBall);
        resolve_effect(&mut ball, &config);
        assert_eq!(ball.vel, Vec2::new(-5.0, 2.0));
        assert!(ball.effect.is_none());
        resolve_effect(&mut ball, &config);
        assert_eq!(ball.vel, Vec2::new(-5.0, 2.0));
    }

    // --- goals ---

    #[test]
    fn crossing_left_edge_credits_right() {
        let config = GameConfig::default();
        let ball = ball_at(5.0, 300.0, -6.0, 0.0);
        assert_eq!(check_goal(&ball, &config), Some(Side::Right));
    }

    #[test]
    fn crossing_right_edge_credits_left() {
        let config = GameConfig::default();
        let ball = ball_at(795.0, 300.0, 6.0, 0.0);
        assert_eq!(check_goal(&ball, &config), Some(Side::Left));
    }

    #[test]
    fn ball_touching_edge_is_not_a_goal() {
        let config = GameConfig::default();
        let ball = ball_at(10.0, 300.0, -6.0, 0.0);
        assert_eq!(check_goal(&ball, &config), None);
    }

    // --- walls ---

    #[test]
    fn top_wall_flips_only_vy() {
        let config = GameConfig::default();
        let mut ball = ball_at(400.0, 5.0, 4.0, -3.0);
        let speed_before = ball.speed();
        assert!(bounce_off_walls(&mut ball, &config));
        assert_eq!(ball.vel, Vec2::new(4.0, 3.0));
        assert!((ball.speed() - speed_before).abs() < 1e-12);
    }

    #[test]
    fn bottom_wall_flips_only_vy() {
        let config = GameConfig::default();
        let mut ball = ball_at(400.0, 595.0, -4.0, 3.0);
        assert!(bounce_off_walls(&mut ball, &config));
        assert_eq!(ball.vel, Vec2::new(-4.0, -3.0));
    }

    #[test]
    fn ball_leaving_wall_is_not_flipped_again() {
        let config = GameConfig::default();
        let mut ball = ball_at(400.0, 5.0, 4.0, 3.0);
        assert!(!bounce_off_walls(&mut ball, &config));
        assert_eq!(ball.vel, Vec2::new(4.0, 3.0));
    }

    // --- paddles ---

    #[test]
    fn ball_bounces_off_left_paddle_face() {
        let config = GameConfig::default();
        let paddle = left_paddle(200.0, 0.0);
        let mut ball = ball_at(45.0, 280.0, -6.0, 0.0);
        assert!(collide_paddle(&mut ball, &paddle, &config));
        assert!(ball.vel.x > 0.0);
        assert_eq!(ball.pos.x, paddle.pos.x + paddle.size.x + ball.radius);
        assert!((ball.speed() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn ball_bounces_off_right_paddle_face() {
        let config = GameConfig::default();
        let paddle = right_paddle(200.0);
        let mut ball = ball_at(755.0, 280.0, 6.0, 1.0);
        assert!(collide_paddle(&mut ball, &paddle, &config));
        assert!(ball.vel.x < 0.0);
        assert_eq!(ball.pos.x, paddle.pos.x - ball.radius);
    }

    #[test]
    fn flush_ball_does_not_collide_again() {
        let config = GameConfig::default();
        let paddle = left_paddle(200.0, 0.0);
        let mut ball = ball_at(45.0, 280.0, -6.0, 0.0);
        assert!(collide_paddle(&mut ball, &paddle, &config));
        let vel_after = ball.vel;
        assert!(!collide_paddle(&mut ball, &paddle, &config));
        assert_eq!(ball.vel, vel_after);
    }

    #[test]
    fn miss_leaves_ball_untouched() {
        let config = GameConfig::default();
        let paddle = left_paddle(200.0, 0.0);
        let mut ball = ball_at(45.0, 100.0, -6.0, 0.0);
        assert!(!collide_paddle(&mut ball, &paddle, &config));
        assert_eq!(ball.vel, Vec2::new(-6.0, 0.0));
    }

    #[test]
    fn moving_paddle_steepens_the_bounce() {
        let config = GameConfig::default();
        let mut still = ball_at(45.0, 280.0, -6.0, 0.0);
        let mut pushed = still.clone();
        collide_paddle(&mut still, &left_paddle(200.0, 0.0), &config);
        collide_paddle(
            &mut pushed,
            &left_paddle(200.0, config.paddle_speed),
            &config,
        );
        assert_eq!(still.vel.y, 0.0);
        assert!(pushed.vel.y > 0.0, "paddle moving down should push the ball down");
    }

    #[test]
    fn extreme_paddle_speed_is_capped() {
        let config = GameConfig::default();
        let mut ball = ball_at(45.0, 280.0, -3.0, 5.0);
        collide_paddle(&mut ball, &left_paddle(200.0, 1e6), &config);
        assert!(off_axis_angle(ball.vel) <= config.max_bounce_angle + 1e-9);
        assert!(ball.vel.x > 0.0);
    }

    // --- power-ups ---

    #[test]
    fn overlapping_circles_touch() {
        let ball = ball_at(400.0, 300.0, 6.0, 0.0);
        let p = PowerUp::new(PowerUpKind::FastBall, Vec2::new(420.0, 300.0), 15.0);
        assert!(touches_power_up(&ball, &p));
    }

    #[test]
    fn distant_circles_do_not_touch() {
        let ball = ball_at(400.0, 300.0, 6.0, 0.0);
        let p = PowerUp::new(PowerUpKind::FastBall, Vec2::new(430.0, 300.0), 15.0);
        assert!(!touches_power_up(&ball, &p));
    }

    #[test]
    fn bobbed_position_is_ignored_for_pickup() {
        let ball = ball_at(400.0, 300.0, 0.0, 0.0);
        let mut p = PowerUp::new(PowerUpKind::FastBall, Vec2::new(400.0, 340.0), 15.0);
        p.pos = Vec2::new(400.0, 310.0);
        assert!(!touches_power_up(&ball, &p));
    }
}
