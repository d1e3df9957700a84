//! Conversions from simulation entities to their wire snapshots.

pub use pong_shared::protocol::*;

use crate::ball::Ball;
use crate::player::Player;
use crate::power_up::PowerUp;

impl From<&Player> for PlayerWire {
    fn from(player: &Player) -> Self {
        Self {
            uid: player.id.clone(),
            pos: player.pos.trunc(),
            size: player.size.trunc(),
            score: player.score,
        }
    }
}

impl From<&Ball> for BallWire {
    fn from(ball: &Ball) -> Self {
        Self {
            pos: ball.pos.trunc(),
            radius: ball.radius.trunc() as i32,
        }
    }
}

impl From<&PowerUp> for PowerUpWire {
    fn from(power_up: &PowerUp) -> Self {
        Self {
            kind: power_up.kind,
            pos: power_up.pos.trunc(),
            radius: power_up.radius.trunc() as i32,
        }
    }
}
