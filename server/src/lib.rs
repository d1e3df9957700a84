//! Pong server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod ball;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod lobby;
pub mod physics;
pub mod player;
pub mod power_up;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod ws;
