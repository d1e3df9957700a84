use std::path::PathBuf;
use std::str::FromStr;

use pong_shared::config::GameConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    /// Lobbies created at startup; they live for the whole process
    pub lobby_count: usize,
    pub target_player_count: usize,
    /// Fixed seed for reproducible runs; entropy when unset
    pub rng_seed: Option<u64>,
    pub max_connections: usize,
    /// Largest accepted WebSocket frame
    pub max_message_bytes: usize,
    /// Per-connection outbound queue length
    pub outbound_queue: usize,
    /// Client files served at `/` when present
    pub static_dir: Option<PathBuf>,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9876".to_string(),
            tick_rate_hz: 60,
            lobby_count: 4,
            target_player_count: 2,
            rng_seed: None,
            max_connections: 256,
            max_message_bytes: 1024,
            outbound_queue: 64,
            static_dir: None,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from the environment, keeping defaults for anything
    /// missing or unparseable.
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        override_parsed(&lookup, "TICK_RATE_HZ", &mut config.tick_rate_hz);
        override_parsed(&lookup, "LOBBY_COUNT", &mut config.lobby_count);
        override_parsed(&lookup, "MAX_CONNECTIONS", &mut config.max_connections);
        override_parsed(&lookup, "MAX_MESSAGE_BYTES", &mut config.max_message_bytes);
        override_parsed(&lookup, "OUTBOUND_QUEUE", &mut config.outbound_queue);

        if let Some(raw) = lookup("RNG_SEED") {
            match raw.parse::<u64>() {
                Ok(seed) => config.rng_seed = Some(seed),
                Err(_) => tracing::warn!("Invalid RNG_SEED '{}', seeding from entropy", raw),
            }
        }

        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = Some(PathBuf::from(dir));
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err("tick_rate_hz must be 1-1000".to_string());
        }
        if self.lobby_count == 0 {
            return Err("lobby_count must be > 0".to_string());
        }
        if self.target_player_count != 2 {
            return Err("target_player_count must be 2".to_string());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }
        if self.max_message_bytes < 64 {
            return Err("max_message_bytes must be >= 64".to_string());
        }
        if self.outbound_queue == 0 {
            return Err("outbound_queue must be > 0".to_string());
        }
        self.game.validate()
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(key) {
        match raw.parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Invalid {} '{}', using default", key, raw),
        }
    }
}
