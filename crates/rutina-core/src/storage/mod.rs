//! Storage layer: the state database and the TOML configuration.

mod config;
mod state_db;

pub use config::{Config, PolicyConfig, TimerConfig};
pub use state_db::StateDb;

use std::path::PathBuf;

/// Returns the per-user data directory, `~/.config/rutina`, creating it
/// if needed.
///
/// Set `RUTINA_ENV=dev` to use `~/.config/rutina-dev` instead, which keeps
/// development state away from the real one.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");
    let env = std::env::var("RUTINA_ENV").unwrap_or_default();
    let dir = if env == "dev" {
        base.join("rutina-dev")
    } else {
        base.join("rutina")
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
