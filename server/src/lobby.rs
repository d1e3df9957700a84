use pong_shared::config::GameConfig;
use pong_shared::protocol::{
    GameUpdateMsg, LobbyDetail, LobbyId, LobbyMemberWire, LobbySummary, PlayerId, PlayerInputs,
    PowerUpKind,
};
use pong_shared::vec2::Vec2;
use rand::Rng;

use crate::ball::Ball;
use crate::error::LobbyError;
use crate::physics::{self, Side};
use crate::player::Player;
use crate::power_up::PowerUp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyState {
    /// Accepting joins and ready toggles
    Waiting,
    /// Game in progress, ticked by the scheduler
    Running,
    /// A player left mid-game; the scheduler will empty the lobby
    Resetting,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    pub goal: Option<Side>,
    pub wall_bounce: bool,
    pub paddle_hits: usize,
    pub spawned: Option<PowerUpKind>,
    pub picked_up: Vec<PowerUpKind>,
}

/// One independent game session.
pub struct Lobby {
    pub id: LobbyId,
    pub target_player_count: usize,
    pub state: LobbyState,
    pub players: Vec<Player>,
    pub ball: Ball,
    pub power_ups: Vec<PowerUp>,
    pub tick: u64,
    /// Ticks until the next power-up spawn
    pub power_up_countdown: i64,
    config: GameConfig,
}

impl Lobby {
    pub fn new(id: LobbyId, target_player_count: usize, config: GameConfig) -> Self {
        Self {
            id,
            target_player_count,
            state: LobbyState::Waiting,
            players: Vec::with_capacity(target_player_count),
            ball: Ball::new(&config),
            power_ups: Vec::new(),
            tick: 0,
            power_up_countdown: 0,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn has_started(&self) -> bool {
        self.state != LobbyState::Waiting
    }

    pub fn is_member(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }

    fn player_mut(&mut self, id: &PlayerId) -> Result<&mut Player, LobbyError> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(LobbyError::PlayerNotFound)
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.iter().map(|p| &p.id)
    }

    /// Add a player. Only while waiting, below capacity, and not already in.
    pub fn join(&mut self, id: PlayerId) -> Result<(), LobbyError> {
        match self.state {
            LobbyState::Waiting => {}
            LobbyState::Running => return Err(LobbyError::AlreadyStarted),
            LobbyState::Resetting => return Err(LobbyError::NotWaiting),
        }
        if self.is_member(&id) {
            return Err(LobbyError::AlreadyJoined);
        }
        if self.players.len() >= self.target_player_count {
            return Err(LobbyError::LobbyFull);
        }
        self.players.push(Player::new(id));
        Ok(())
    }

    /// Remove a player in any state. A running game that drops below its
    /// target goes to `Resetting`.
    pub fn quit(&mut self, id: &PlayerId) -> Result<(), LobbyError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or(LobbyError::PlayerNotFound)?;
        self.players.remove(index);

        if self.state == LobbyState::Running && self.players.len() < self.target_player_count {
            self.state = LobbyState::Resetting;
        }
        Ok(())
    }

    /// Set a ready flag. Returns true if this started the game.
    pub fn set_ready(
        &mut self,
        id: &PlayerId,
        is_ready: bool,
        rng: &mut impl Rng,
    ) -> Result<bool, LobbyError> {
        if self.state != LobbyState::Waiting {
            return Err(LobbyError::NotWaiting);
        }
        self.player_mut(id)?.is_ready = is_ready;

        if self.all_ready() {
            self.start(rng);
            return Ok(true);
        }
        Ok(false)
    }

    /// Full lobby and every player ready.
    pub fn all_ready(&self) -> bool {
        self.players.len() == self.target_player_count && self.players.iter().all(|p| p.is_ready)
    }

    /// Place paddles on opposite walls, launch the ball, and go `Running`.
    pub fn start(&mut self, rng: &mut impl Rng) {
        let c = self.config;
        let size = Vec2::new(c.paddle_width, c.paddle_height);
        let y = (c.field_height - c.paddle_height) / 2.0;

        for (i, player) in self.players.iter_mut().enumerate() {
            let x = if i % 2 == 0 {
                c.paddle_offset
            } else {
                c.field_width - c.paddle_offset - c.paddle_width
            };
            player.pos = Vec2::new(x, y);
            player.size = size;
            player.vel_y = 0.0;
            player.score = 0;
            player.is_ready = false;
            player.input = PlayerInputs::default();
        }

        self.ball = Ball::new(&c);
        self.ball.launch(&c, rng);
        self.power_ups.clear();
        self.power_up_countdown = spawn_countdown(&c, rng);
        self.tick = 0;
        self.state = LobbyState::Running;
        tracing::info!("Lobby {} started with {} players", self.id, self.players.len());
    }

    /// Store the latest input. Overwrites, never queues.
    pub fn set_input(&mut self, id: &PlayerId, input: PlayerInputs) -> Result<(), LobbyError> {
        self.player_mut(id)?.input = input;
        Ok(())
    }

    /// Empty the lobby and return to `Waiting`. Returns the removed players.
    pub fn reset(&mut self) -> Vec<PlayerId> {
        let removed: Vec<PlayerId> = self.players.drain(..).map(|p| p.id).collect();
        self.ball = Ball::new(&self.config);
        self.power_ups.clear();
        self.power_up_countdown = 0;
        self.tick = 0;
        self.state = LobbyState::Waiting;
        removed
    }

    /// Advance one tick. Does nothing unless `Running`.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickEvents {
        let mut events = TickEvents::default();
        if self.state != LobbyState::Running {
            return events;
        }
        let c = self.config;

        physics::resolve_effect(&mut self.ball, &c);
        self.ball.integrate();
        for player in &mut self.players {
            player.update(&c);
        }

        if let Some(side) = physics::check_goal(&self.ball, &c) {
            if let Some(scorer) = self.players.get_mut(side.index()) {
                scorer.score = scorer.score.saturating_add(1);
            }
            self.ball.launch(&c, rng);
            events.goal = Some(side);
        }

        events.wall_bounce = physics::bounce_off_walls(&mut self.ball, &c);

        for player in &self.players {
            if physics::collide_paddle(&mut self.ball, player, &c) {
                events.paddle_hits += 1;
            }
        }

        self.power_up_countdown -= 1;
        if self.power_up_countdown <= 0 {
            let power_up = PowerUp::spawn(&c, rng);
            events.spawned = Some(power_up.kind);
            self.power_ups.push(power_up);
            self.power_up_countdown = spawn_countdown(&c, rng);
        }

        for power_up in &mut self.power_ups {
            power_up.bob(self.tick, &c);
        }

        for power_up in self.power_ups.iter_mut().filter(|p| !p.dead) {
            if physics::touches_power_up(&self.ball, power_up) {
                power_up.dead = true;
                self.ball.effect = Some(power_up.effect(&c));
                events.picked_up.push(power_up.kind);
            }
        }

        self.power_ups.retain(|p| !p.dead);
        self.tick += 1;
        events
    }

    /// Entry for the lobby list.
    pub fn summary(&self) -> LobbySummary {
        LobbySummary {
            id: self.id.clone(),
            player_count: self.players.len(),
            target_player_count: self.target_player_count,
            has_started: self.has_started(),
            player_list: self.member_ids().cloned().collect(),
        }
    }

    /// Detailed view with ready flags and display names.
    pub fn detail(&self, name_of: impl Fn(&PlayerId) -> Option<String>) -> LobbyDetail {
        LobbyDetail {
            id: self.id.clone(),
            player_count: self.players.len(),
            target_player_count: self.target_player_count,
            has_started: self.has_started(),
            player_list: self
                .players
                .iter()
                .map(|p| LobbyMemberWire {
                    uid: p.id.clone(),
                    name: name_of(&p.id),
                    is_ready: p.is_ready,
                })
                .collect(),
        }
    }

    pub fn snapshot(&self) -> GameUpdateMsg {
        GameUpdateMsg {
            tick: self.tick,
            players: self.players.iter().map(Into::into).collect(),
            ball: (&self.ball).into(),
            power_ups: self.power_ups.iter().map(Into::into).collect(),
        }
    }
}

fn spawn_countdown(config: &GameConfig, rng: &mut impl Rng) -> i64 {
    rng.gen_range(config.power_up_spawn_min..=config.power_up_spawn_max) as i64
}
