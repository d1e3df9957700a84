use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::GameConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Opaque identity assigned to a connection by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LobbyId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for LobbyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PowerUpKind {
    FastBall,
    ReverseBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::FastBall, PowerUpKind::ReverseBall];
}

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMsg {
    #[serde(rename = "UID:get")]
    IdentityAssigned(IdentityMsg),
    #[serde(rename = "Lobby:list")]
    LobbyList(LobbyListMsg),
    #[serde(rename = "Lobby:info")]
    LobbyInfo(LobbyInfoMsg),
    #[serde(rename = "Lobby:join")]
    JoinAccepted(LobbyRefMsg),
    #[serde(rename = "Lobby:joinRejected")]
    JoinRejected(JoinRejectedMsg),
    #[serde(rename = "Lobby:quit")]
    QuitAck,
    #[serde(rename = "Game:start")]
    GameStart(GameStartMsg),
    #[serde(rename = "Game:update")]
    GameUpdate(GameUpdateMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMsg {
    pub protocol_version: u32,
    pub uid: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LobbyListMsg {
    pub lobbies: Vec<LobbySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    pub id: LobbyId,
    pub player_count: usize,
    pub target_player_count: usize,
    pub has_started: bool,
    pub player_list: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LobbyInfoMsg {
    pub lobby: LobbyDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LobbyDetail {
    pub id: LobbyId,
    pub player_count: usize,
    pub target_player_count: usize,
    pub has_started: bool,
    pub player_list: Vec<LobbyMemberWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LobbyMemberWire {
    pub uid: PlayerId,
    pub name: Option<String>,
    pub is_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LobbyRefMsg {
    #[serde(rename = "lobbyID")]
    pub lobby_id: LobbyId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JoinRejectedMsg {
    #[serde(rename = "lobbyID")]
    pub lobby_id: LobbyId,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameStartMsg {
    #[serde(rename = "lobbyID")]
    pub lobby_id: LobbyId,
    pub config: GameConfig,
}

/// Per-tick snapshot. Geometry is truncated to whole field units.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdateMsg {
    pub tick: u64,
    pub players: Vec<PlayerWire>,
    pub ball: BallWire,
    pub power_ups: Vec<PowerUpWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerWire {
    pub uid: PlayerId,
    pub pos: [i32; 2],
    pub size: [i32; 2],
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BallWire {
    pub pos: [i32; 2],
    pub radius: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PowerUpWire {
    pub kind: PowerUpKind,
    pub pos: [i32; 2],
    pub radius: i32,
}

// === Client -> Server ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "data")]
pub enum ClientMsg {
    #[serde(rename = "Lobby:getList")]
    GetLobbyList,
    #[serde(rename = "Lobby:join")]
    Join {
        #[serde(rename = "lobbyID")]
        lobby_id: LobbyId,
    },
    #[serde(rename = "Lobby:quit")]
    Quit {
        #[serde(rename = "lobbyID")]
        lobby_id: LobbyId,
    },
    #[serde(rename = "Lobby:readyState")]
    ReadyState {
        #[serde(rename = "lobbyID")]
        lobby_id: LobbyId,
        #[serde(rename = "isReady")]
        is_ready: bool,
    },
    #[serde(rename = "Game:playerInput")]
    PlayerInput {
        #[serde(rename = "lobbyID")]
        lobby_id: LobbyId,
        inputs: PlayerInputs,
    },
    #[serde(rename = "Name:save")]
    SaveName { name: String },
}

/// Latest held keys. Only up/down move a paddle; left/right are carried
/// for clients that send them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerInputs {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_assigned_wire_format() {
        let msg = ServerMsg::IdentityAssigned(IdentityMsg {
            protocol_version: PROTOCOL_VERSION,
            uid: PlayerId::from("a1b2c3d4e5f6"),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"UID:get\""));
        assert!(json.contains("\"payload\":{"));
        assert!(json.contains("\"uid\":\"a1b2c3d4e5f6\""));
        assert!(json.contains("\"protocolVersion\":1"));
    }

    #[test]
    fn quit_ack_has_no_payload() {
        let json = serde_json::to_string(&ServerMsg::QuitAck).unwrap();
        assert_eq!(json, r#"{"type":"Lobby:quit"}"#);
    }

    #[test]
    fn lobby_list_uses_camel_case() {
        let msg = ServerMsg::LobbyList(LobbyListMsg {
            lobbies: vec![LobbySummary {
                id: LobbyId::from("deadbeef"),
                player_count: 1,
                target_player_count: 2,
                has_started: false,
                player_list: vec![PlayerId::from("p1")],
            }],
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"Lobby:list\""));
        assert!(json.contains("\"targetPlayerCount\":2"));
        assert!(json.contains("\"hasStarted\":false"));
        assert!(json.contains("\"playerList\":[\"p1\"]"));
    }

    #[test]
    fn game_update_roundtrip() {
        let msg = ServerMsg::GameUpdate(GameUpdateMsg {
            tick: 12,
            players: vec![PlayerWire {
                uid: PlayerId::from("p1"),
                pos: [20, 212],
                size: [20, 175],
                score: 3,
            }],
            ball: BallWire {
                pos: [400, 300],
                radius: 10,
            },
            power_ups: vec![PowerUpWire {
                kind: PowerUpKind::ReverseBall,
                pos: [410, 120],
                radius: 15,
            }],
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"powerUps\":[{\"kind\":\"ReverseBall\""));
        let parsed: ServerMsg = serde_json::from_str(&json).unwrap();
        match parsed {
            ServerMsg::GameUpdate(u) => {
                assert_eq!(u.tick, 12);
                assert_eq!(u.players[0].score, 3);
                assert_eq!(u.ball.pos, [400, 300]);
                assert_eq!(u.power_ups.len(), 1);
            }
            _ => panic!("Expected GameUpdate"),
        }
    }

    #[test]
    fn client_join_parses_original_wire_format() {
        let parsed: ClientMsg =
            serde_json::from_str(r#"{"type":"Lobby:join","data":{"lobbyID":"0badf00d"}}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMsg::Join {
                lobby_id: LobbyId::from("0badf00d")
            }
        );
    }

    #[test]
    fn client_get_list_needs_no_data() {
        let parsed: ClientMsg = serde_json::from_str(r#"{"type":"Lobby:getList"}"#).unwrap();
        assert_eq!(parsed, ClientMsg::GetLobbyList);
    }

    #[test]
    fn client_player_input_parses() {
        let json = r#"{"type":"Game:playerInput","data":{"lobbyID":"l1","inputs":{"up":true,"down":false,"left":false,"right":true}}}"#;
        match serde_json::from_str::<ClientMsg>(json).unwrap() {
            ClientMsg::PlayerInput { lobby_id, inputs } => {
                assert_eq!(lobby_id, LobbyId::from("l1"));
                assert!(inputs.up);
                assert!(!inputs.down);
                assert!(inputs.right);
            }
            other => panic!("Expected PlayerInput, got {:?}", other),
        }
    }

    #[test]
    fn client_msg_missing_field_is_rejected() {
        let json = r#"{"type":"Lobby:readyState","data":{"lobbyID":"l1"}}"#;
        assert!(serde_json::from_str::<ClientMsg>(json).is_err());
    }

    #[test]
    fn unknown_client_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"Game:cheat"}"#).is_err());
    }
}
