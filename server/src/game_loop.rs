use crate::config::ServerConfig;
use crate::protocol::{ClientMsg, PlayerId};
use crate::registry::Outbound;
use crate::state::GameState;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Commands from client connections to the game loop
#[derive(Debug)]
pub enum GameCommand {
    Connect {
        outbound: Outbound,
        response: oneshot::Sender<PlayerId>,
    },
    Message {
        id: PlayerId,
        msg: ClientMsg,
    },
    Disconnect {
        id: PlayerId,
    },
}

/// Run the main game loop. Owns all game state; commands and ticks are
/// handled one at a time so no lobby is ever touched concurrently.
pub async fn run_game_loop(mut cmd_rx: mpsc::Receiver<GameCommand>, server_config: ServerConfig) {
    let mut state = GameState::new(&server_config);
    tracing::info!(
        "Game loop started: {} lobbies at {} Hz",
        state.lobbies.len(),
        server_config.tick_rate_hz
    );

    let tick_duration = Duration::from_secs_f64(1.0 / server_config.tick_rate_hz as f64);
    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => state.tick(),

            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => handle_command(&mut state, cmd),
                None => break,
            },
        }
    }

    tracing::info!("Game loop ended");
}

fn handle_command(state: &mut GameState, cmd: GameCommand) {
    match cmd {
        GameCommand::Connect { outbound, response } => {
            let id = state.connect(outbound);
            // Handler gave up before the identity came back
            if response.send(id.clone()).is_err() {
                state.disconnect(&id);
            }
        }
        GameCommand::Message { id, msg } => state.handle_message(&id, msg),
        GameCommand::Disconnect { id } => state.disconnect(&id),
    }
}
