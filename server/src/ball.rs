use std::f64::consts::PI;

use pong_shared::config::GameConfig;
use pong_shared::vec2::Vec2;
use rand::Rng;

/// Temporary modifier attached to the ball by a power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ball travels at `base_speed * fast_ball_multiplier` until the counter runs out
    FastBall { remaining_ticks: u32 },
    /// Both velocity components flip once, then the effect clears
    ReverseBall,
}

#[derive(Debug, Clone)]
pub struct Ball {
    /// Center of the ball
    pub pos: Vec2,
    pub radius: f64,
    pub base_speed: f64,
    pub vel: Vec2,
    pub effect: Option<Effect>,
}

impl Ball {
    /// Resting ball at field center.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: config.center(),
            radius: config.ball_radius,
            base_speed: config.ball_speed,
            vel: Vec2::ZERO,
            effect: None,
        }
    }

    /// Put the ball back at center heading off at a fresh launch angle.
    pub fn launch(&mut self, config: &GameConfig, rng: &mut impl Rng) {
        self.pos = config.center();
        self.vel = Vec2::from_angle(launch_angle(config.launch_cone, rng)) * self.base_speed;
        self.effect = None;
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }
}

/// Uniform angle in [-cone, cone] around +x, turned around to face -x half
/// of the time.
pub fn launch_angle(cone: f64, rng: &mut impl Rng) -> f64 {
    let angle = rng.gen_range(-cone..=cone);
    if rng.gen_bool(0.5) {
        angle + PI
    } else {
        angle
    }
}

/// Angle between a direction and the horizontal axis, ignoring which way
/// along the axis it points. Always in [0, PI/2].
pub fn off_axis_angle(vel: Vec2) -> f64 {
    vel.y.abs().atan2(vel.x.abs())
}
