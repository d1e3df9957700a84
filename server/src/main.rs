use anyhow::Context;
use pong_server::config::ServerConfig;
use pong_server::game_loop::{run_game_loop, GameCommand};
use pong_server::ws::{router, AppState};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load_or_default();
    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid server configuration: {}", e);
    }

    let listen_addr = config.listen_addr.clone();
    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let app = router(
        AppState::new(game_tx, &config),
        config.static_dir.as_deref(),
    );

    tokio::spawn(run_game_loop(game_rx, config));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", listen_addr))?;
    tracing::info!("Pong server listening on {}", listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
