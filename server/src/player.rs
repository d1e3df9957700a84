use pong_shared::config::GameConfig;
use pong_shared::protocol::{PlayerId, PlayerInputs};
use pong_shared::vec2::Vec2;

/// Paddle-owning player inside a lobby.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub is_ready: bool,
    pub score: u32,
    /// Top-left corner of the paddle
    pub pos: Vec2,
    pub vel_y: f64,
    /// Paddle width and height
    pub size: Vec2,
    pub input: PlayerInputs,
}

impl Player {
    /// A freshly joined player. Geometry stays unset until the game starts.
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            is_ready: false,
            score: 0,
            pos: Vec2::ZERO,
            vel_y: 0.0,
            size: Vec2::ZERO,
            input: PlayerInputs::default(),
        }
    }

    /// Velocity comes straight from the held keys; up wins over down.
    pub fn update(&mut self, config: &GameConfig) {
        self.vel_y = if self.input.up {
            -config.paddle_speed
        } else if self.input.down {
            config.paddle_speed
        } else {
            0.0
        };

        let (min_y, max_y) = config.paddle_y_bounds();
        self.pos.y = (self.pos.y + self.vel_y).clamp(min_y, max_y);
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed_player(y: f64) -> Player {
        let config = GameConfig::default();
        let mut player = Player::new(PlayerId::from("p1"));
        player.pos = Vec2::new(config.paddle_offset, y);
        player.size = Vec2::new(config.paddle_width, config.paddle_height);
        player
    }

    #[test]
    fn new_player_is_unready_with_zero_score() {
        let player = Player::new(PlayerId::from("p1"));
        assert!(!player.is_ready);
        assert_eq!(player.score, 0);
        assert_eq!(player.input, PlayerInputs::default());
    }

    #[test]
    fn up_moves_paddle_up() {
        let config = GameConfig::default();
        let mut player = placed_player(200.0);
        player.input.up = true;
        player.update(&config);
        assert_eq!(player.vel_y, -config.paddle_speed);
        assert_eq!(player.pos.y, 200.0 - config.paddle_speed);
    }

    #[test]
    fn up_wins_over_down() {
        let config = GameConfig::default();
        let mut player = placed_player(200.0);
        player.input.up = true;
        player.input.down = true;
        player.update(&config);
        assert_eq!(player.vel_y, -config.paddle_speed);
    }

    #[test]
    fn no_input_stops_paddle() {
        let config = GameConfig::default();
        let mut player = placed_player(200.0);
        player.input.down = true;
        player.update(&config);
        player.input.down = false;
        player.update(&config);
        assert_eq!(player.vel_y, 0.0);
        assert_eq!(player.pos.y, 200.0 + config.paddle_speed);
    }

    #[test]
    fn left_right_do_not_move_paddle() {
        let config = GameConfig::default();
        let mut player = placed_player(200.0);
        player.input.left = true;
        player.input.right = true;
        player.update(&config);
        assert_eq!(player.pos, Vec2::new(config.paddle_offset, 200.0));
    }

    #[test]
    fn paddle_stays_within_bounds_for_all_ticks() {
        let config = GameConfig::default();
        let (min_y, max_y) = config.paddle_y_bounds();
        let mut player = placed_player(200.0);

        player.input.up = true;
        for _ in 0..100 {
            player.update(&config);
            assert!(player.pos.y >= min_y && player.pos.y <= max_y);
        }
        assert_eq!(player.pos.y, min_y);

        player.input.up = false;
        player.input.down = true;
        for _ in 0..100 {
            player.update(&config);
            assert!(player.pos.y >= min_y && player.pos.y <= max_y);
        }
        assert_eq!(player.pos.y, max_y);
    }
}
