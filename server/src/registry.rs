use std::collections::HashMap;

use rand::Rng;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::LobbyError;
use crate::protocol::{LobbyId, PlayerId, ServerMsg};

/// Longest display name kept, in characters
pub const MAX_NAME_CHARS: usize = 24;

/// Queue from the game loop to one connection's writer task.
pub type Outbound = mpsc::Sender<ServerMsg>;

/// A live connection as seen by the game loop.
#[derive(Debug)]
pub struct Connection {
    outbound: Outbound,
    pub name: Option<String>,
    pub lobby: Option<LobbyId>,
}

/// Maps identities to connections and lobby membership, and fans messages
/// out to them. Owned by `GameState`; never shared across tasks.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    connections: HashMap<PlayerId, Connection>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection under a fresh 12-hex-digit identity.
    pub fn register(&mut self, outbound: Outbound, rng: &mut impl Rng) -> PlayerId {
        let id = loop {
            let candidate = PlayerId(format!("{:012x}", rng.gen::<u64>() & 0xffff_ffff_ffff));
            if !self.connections.contains_key(&candidate) {
                break candidate;
            }
        };
        self.connections.insert(
            id.clone(),
            Connection {
                outbound,
                name: None,
                lobby: None,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: &PlayerId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn lobby_of(&self, id: &PlayerId) -> Option<&LobbyId> {
        self.connections.get(id).and_then(|c| c.lobby.as_ref())
    }

    pub fn set_lobby(&mut self, id: &PlayerId, lobby: Option<LobbyId>) {
        if let Some(conn) = self.connections.get_mut(id) {
            conn.lobby = lobby;
        }
    }

    pub fn name(&self, id: &PlayerId) -> Option<String> {
        self.connections.get(id).and_then(|c| c.name.clone())
    }

    /// Store a display name. Blank names clear it.
    pub fn set_name(&mut self, id: &PlayerId, raw: &str) -> Result<(), LobbyError> {
        let conn = self
            .connections
            .get_mut(id)
            .ok_or(LobbyError::PlayerNotFound)?;
        conn.name = sanitize_name(raw);
        Ok(())
    }

    /// Queue a message for one connection. Never waits: a full queue drops
    /// the message, a closed one means the disconnect is already on its way.
    pub fn send(&self, id: &PlayerId, msg: ServerMsg) -> bool {
        let Some(conn) = self.connections.get(id) else {
            tracing::debug!("No connection for player {}", id);
            return false;
        };
        match conn.outbound.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Player {} lagging, dropped outbound message", id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Send to each listed identity.
    pub fn send_to<'a>(&self, ids: impl IntoIterator<Item = &'a PlayerId>, msg: &ServerMsg) {
        for id in ids {
            self.send(id, msg.clone());
        }
    }

    /// Send to every live connection.
    pub fn broadcast(&self, msg: &ServerMsg) {
        self.send_to(self.connections.keys(), msg);
    }
}

fn sanitize_name(raw: &str) -> Option<String> {
    let name: String = raw.trim().chars().take(MAX_NAME_CHARS).collect();
    let name = name.trim_end().to_string();
    (!name.is_empty()).then_some(name)
}
