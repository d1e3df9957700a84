use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ServerConfig;
use crate::error::LobbyError;
use crate::lobby::{Lobby, LobbyState};
use crate::protocol::{
    ClientMsg, GameStartMsg, IdentityMsg, JoinRejectedMsg, LobbyId, LobbyInfoMsg, LobbyListMsg,
    LobbyRefMsg, PlayerId, PlayerInputs, ServerMsg, PROTOCOL_VERSION,
};
use crate::registry::{Outbound, SessionRegistry};

/// Central game state owned by the game loop task. Every mutation of a
/// lobby goes through here, one command or tick at a time.
pub struct GameState {
    pub lobbies: Vec<Lobby>,
    pub registry: SessionRegistry,
    pub rng: ChaCha8Rng,
}

impl GameState {
    pub fn new(server_config: &ServerConfig) -> Self {
        let mut rng = match server_config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut lobbies: Vec<Lobby> = Vec::with_capacity(server_config.lobby_count);
        while lobbies.len() < server_config.lobby_count {
            let id = LobbyId(format!("{:08x}", rng.gen::<u32>()));
            if lobbies.iter().any(|l| l.id == id) {
                continue;
            }
            lobbies.push(Lobby::new(
                id,
                server_config.target_player_count,
                server_config.game,
            ));
        }

        Self {
            lobbies,
            registry: SessionRegistry::new(),
            rng,
        }
    }

    /// Register a connection and tell it who it is.
    pub fn connect(&mut self, outbound: Outbound) -> PlayerId {
        let id = self.registry.register(outbound, &mut self.rng);
        self.registry.send(
            &id,
            ServerMsg::IdentityAssigned(IdentityMsg {
                protocol_version: PROTOCOL_VERSION,
                uid: id.clone(),
            }),
        );
        tracing::info!("Player {} connected ({} online)", id, self.registry.len());
        id
    }

    /// Connection closed. Same as quitting whatever lobby it was in.
    pub fn disconnect(&mut self, id: &PlayerId) {
        if let Some(lobby_id) = self.registry.lobby_of(id).cloned() {
            if let Err(err) = self.leave_lobby(id, &lobby_id) {
                tracing::warn!("Player {} disconnect from lobby {}: {}", id, lobby_id, err);
            }
        }
        if self.registry.unregister(id).is_some() {
            tracing::info!("Player {} disconnected ({} online)", id, self.registry.len());
        }
    }

    /// Dispatch one inbound message. Failures are logged and dropped; only
    /// join rejections are answered.
    pub fn handle_message(&mut self, id: &PlayerId, msg: ClientMsg) {
        if !self.registry.contains(id) {
            tracing::warn!("Message from unknown player {}", id);
            return;
        }

        let (action, result) = match msg {
            ClientMsg::GetLobbyList => {
                self.registry
                    .send(id, ServerMsg::LobbyList(self.lobby_list()));
                ("get lobby list", Ok(()))
            }
            ClientMsg::Join { lobby_id } => {
                let result = self.join_lobby(id, &lobby_id);
                if let Err(err) = &result {
                    if err.is_rejection() {
                        self.registry.send(
                            id,
                            ServerMsg::JoinRejected(JoinRejectedMsg {
                                lobby_id,
                                reason: err.to_string(),
                            }),
                        );
                    }
                }
                ("join", result)
            }
            ClientMsg::Quit { lobby_id } => ("quit", self.quit_lobby(id, &lobby_id)),
            ClientMsg::ReadyState { lobby_id, is_ready } => {
                ("ready", self.set_ready(id, &lobby_id, is_ready))
            }
            ClientMsg::PlayerInput { lobby_id, inputs } => {
                ("input", self.set_input(id, &lobby_id, inputs))
            }
            ClientMsg::SaveName { name } => ("save name", self.save_name(id, &name)),
        };

        match result {
            Ok(()) => {}
            Err(err) if err.is_rejection() => {
                tracing::info!("Player {} {} rejected: {}", id, action, err)
            }
            Err(err) => tracing::debug!("Player {} {} ignored: {}", id, action, err),
        }
    }

    /// One scheduler step over every lobby.
    pub fn tick(&mut self) {
        let mut lobbies_changed = false;

        for lobby in &mut self.lobbies {
            match lobby.state {
                LobbyState::Running => {
                    let events = lobby.tick(&mut self.rng);
                    if let Some(side) = events.goal {
                        tracing::debug!(
                            "Lobby {} goal for {:?} at tick {}",
                            lobby.id,
                            side,
                            lobby.tick
                        );
                    }
                    if events.wall_bounce || events.paddle_hits > 0 {
                        tracing::trace!(
                            "Lobby {} bounce: wall={} paddle_hits={}",
                            lobby.id,
                            events.wall_bounce,
                            events.paddle_hits
                        );
                    }
                    for kind in &events.picked_up {
                        tracing::debug!("Lobby {} ball picked up {:?}", lobby.id, kind);
                    }
                    let snapshot = ServerMsg::GameUpdate(lobby.snapshot());
                    self.registry.send_to(lobby.member_ids(), &snapshot);
                }
                LobbyState::Resetting => {
                    let removed = lobby.reset();
                    for id in &removed {
                        self.registry.set_lobby(id, None);
                        self.registry.send(id, ServerMsg::QuitAck);
                    }
                    tracing::info!("Lobby {} reset, removed {} players", lobby.id, removed.len());
                    lobbies_changed = true;
                }
                LobbyState::Waiting => {}
            }
        }

        if lobbies_changed {
            self.broadcast_lobby_list();
        }
    }

    pub fn lobby_list(&self) -> LobbyListMsg {
        LobbyListMsg {
            lobbies: self.lobbies.iter().map(Lobby::summary).collect(),
        }
    }

    pub fn lobby(&self, lobby_id: &LobbyId) -> Option<&Lobby> {
        self.lobbies.iter().find(|l| &l.id == lobby_id)
    }

    fn broadcast_lobby_list(&self) {
        self.registry
            .broadcast(&ServerMsg::LobbyList(self.lobby_list()));
    }

    fn join_lobby(&mut self, id: &PlayerId, lobby_id: &LobbyId) -> Result<(), LobbyError> {
        match self.registry.lobby_of(id) {
            Some(current) if current == lobby_id => return Err(LobbyError::AlreadyJoined),
            Some(current) => return Err(LobbyError::AlreadyInLobby(current.clone())),
            None => {}
        }

        let lobby = find_lobby_mut(&mut self.lobbies, lobby_id)?;
        lobby.join(id.clone())?;
        self.registry.set_lobby(id, Some(lobby_id.clone()));
        tracing::info!(
            "Player {} joined lobby {} ({}/{})",
            id,
            lobby_id,
            lobby.players.len(),
            lobby.target_player_count
        );

        self.registry.send(
            id,
            ServerMsg::JoinAccepted(LobbyRefMsg {
                lobby_id: lobby_id.clone(),
            }),
        );
        let info = lobby_info(lobby, &self.registry);
        self.registry.send_to(lobby.member_ids(), &info);
        self.broadcast_lobby_list();
        Ok(())
    }

    fn quit_lobby(&mut self, id: &PlayerId, lobby_id: &LobbyId) -> Result<(), LobbyError> {
        if self.registry.lobby_of(id) != Some(lobby_id) {
            return Err(LobbyError::NotInLobby(lobby_id.clone()));
        }
        self.leave_lobby(id, lobby_id)?;
        self.registry.send(id, ServerMsg::QuitAck);
        Ok(())
    }

    fn leave_lobby(&mut self, id: &PlayerId, lobby_id: &LobbyId) -> Result<(), LobbyError> {
        let lobby = find_lobby_mut(&mut self.lobbies, lobby_id)?;
        lobby.quit(id)?;
        self.registry.set_lobby(id, None);
        tracing::info!("Player {} left lobby {}", id, lobby_id);
        if lobby.state == LobbyState::Resetting {
            tracing::info!("Lobby {} below target mid-game, resetting", lobby_id);
        }

        let info = lobby_info(lobby, &self.registry);
        self.registry.send_to(lobby.member_ids(), &info);
        self.broadcast_lobby_list();
        Ok(())
    }

    fn set_ready(
        &mut self,
        id: &PlayerId,
        lobby_id: &LobbyId,
        is_ready: bool,
    ) -> Result<(), LobbyError> {
        let lobby = find_lobby_mut(&mut self.lobbies, lobby_id)?;
        let started = lobby.set_ready(id, is_ready, &mut self.rng)?;

        let info = lobby_info(lobby, &self.registry);
        self.registry.send_to(lobby.member_ids(), &info);

        if started {
            let start = ServerMsg::GameStart(GameStartMsg {
                lobby_id: lobby.id.clone(),
                config: *lobby.config(),
            });
            self.registry.send_to(lobby.member_ids(), &start);
            self.broadcast_lobby_list();
        }
        Ok(())
    }

    fn set_input(
        &mut self,
        id: &PlayerId,
        lobby_id: &LobbyId,
        inputs: PlayerInputs,
    ) -> Result<(), LobbyError> {
        find_lobby_mut(&mut self.lobbies, lobby_id)?.set_input(id, inputs)
    }

    fn save_name(&mut self, id: &PlayerId, name: &str) -> Result<(), LobbyError> {
        self.registry.set_name(id, name)?;
        if let Some(lobby) = self
            .registry
            .lobby_of(id)
            .and_then(|lobby_id| self.lobbies.iter().find(|l| &l.id == lobby_id))
        {
            let info = lobby_info(lobby, &self.registry);
            self.registry.send_to(lobby.member_ids(), &info);
        }
        Ok(())
    }
}

fn find_lobby_mut<'a>(
    lobbies: &'a mut [Lobby],
    lobby_id: &LobbyId,
) -> Result<&'a mut Lobby, LobbyError> {
    lobbies
        .iter_mut()
        .find(|l| &l.id == lobby_id)
        .ok_or_else(|| LobbyError::UnknownLobby(lobby_id.clone()))
}

fn lobby_info(lobby: &Lobby, registry: &SessionRegistry) -> ServerMsg {
    ServerMsg::LobbyInfo(LobbyInfoMsg {
        lobby: lobby.detail(|id| registry.name(id)),
    })
}
