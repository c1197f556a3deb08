use calmroom_core::{Config, ConfigError};
use clap::Subcommand;

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get an effective value, including CALMROOM_URL / CALMROOM_ANON_KEY overrides
    Get {
        /// Config key (e.g. "backend.url", "breathing.tick_ms")
        key: String,
    },
    /// Write a value to the config file (environment overrides are not saved)
    Set {
        /// Config key
        key: String,
        /// New value ("none" clears an optional number)
        value: String,
    },
    /// Print the effective configuration as JSON
    List,
    /// Overwrite the config file with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            Config::update(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(&Config::load()?)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            Config::reset()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
