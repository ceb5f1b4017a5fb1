//! Configuration commands.

use clap::Subcommand;
use rutina_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the whole configuration
    List,
    /// Get a value by key path (e.g. policy.running)
    Get {
        /// Dot-separated key path
        key: String,
    },
    /// Set a value by key path
    Set {
        /// Dot-separated key path
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}
