use pong_shared::config::GameConfig;
use pong_shared::protocol::PowerUpKind;
use pong_shared::vec2::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ball::Effect;

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Spawn point; the bob oscillates around it
    pub origin: Vec2,
    pub pos: Vec2,
    pub radius: f64,
    /// Picked up this tick, purged at cleanup
    pub dead: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, origin: Vec2, radius: f64) -> Self {
        Self {
            kind,
            origin,
            pos: origin,
            radius,
            dead: false,
        }
    }

    /// Random kind in a narrow band around the center line.
    pub fn spawn(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let kind = *PowerUpKind::ALL
            .choose(rng)
            .unwrap_or(&PowerUpKind::FastBall);
        let band = config.power_up_spawn_band;
        let x = config.field_width / 2.0 + rng.gen_range(-band..=band);
        let r = config.power_up_radius;
        let y = rng.gen_range(r..=config.field_height - r);
        Self::new(kind, Vec2::new(x, y), r)
    }

    /// Vertical drift as a function of the lobby tick.
    pub fn bob(&mut self, tick: u64, config: &GameConfig) {
        let phase = tick as f64 * config.power_up_bob_step;
        self.pos = Vec2::new(
            self.origin.x,
            self.origin.y + config.power_up_bob_amplitude * phase.sin(),
        );
    }

    /// What the ball gains when it touches this power-up.
    pub fn effect(&self, config: &GameConfig) -> Effect {
        match self.kind {
            PowerUpKind::FastBall => Effect::FastBall {
                remaining_ticks: config.fast_ball_duration,
            },
            PowerUpKind::ReverseBall => Effect::ReverseBall,
        }
    }
}
