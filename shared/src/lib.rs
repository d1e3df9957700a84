//! Types shared between the pong server and its clients.

pub mod config;
pub mod protocol;
pub mod vec2;
