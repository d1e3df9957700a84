use pong_shared::protocol::LobbyId;

/// Why a lobby request was refused. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("Lobby is full")]
    LobbyFull,
    #[error("Game already in progress")]
    AlreadyStarted,
    #[error("Player already in this lobby")]
    AlreadyJoined,
    #[error("Player already in lobby {0}")]
    AlreadyInLobby(LobbyId),
    #[error("Lobby is not waiting for players")]
    NotWaiting,
    #[error("Unknown lobby {0}")]
    UnknownLobby(LobbyId),
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Player is not a member of lobby {0}")]
    NotInLobby(LobbyId),
}

impl LobbyError {
    /// Rule violations get an explicit rejection; lookups that miss are
    /// only logged.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LobbyError::LobbyFull
                | LobbyError::AlreadyStarted
                | LobbyError::AlreadyJoined
                | LobbyError::AlreadyInLobby(_)
                | LobbyError::NotWaiting
        )
    }
}
