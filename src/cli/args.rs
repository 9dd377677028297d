//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

use crate::domain::recording::Duration;

/// VoiceRelay - record speech and send it for processing
#[derive(Parser, Debug)]
#[command(name = "voice-relay")]
#[command(version)]
#[command(about = "Record speech, transcode it to canonical WAV, and upload it for processing")]
#[command(long_about = None)]
pub struct Cli {
    /// Processing backend endpoint URL
    #[arg(short, long, value_name = "URL", env = "VOICE_RELAY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Maximum capture duration (e.g., 30s, 1m, 2m30s)
    #[arg(short = 'd', long, value_name = "TIME")]
    pub max_capture: Option<String>,

    /// Print the full backend response as JSON
    #[arg(long)]
    pub json: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed record options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub endpoint: String,
    pub max_capture: Duration,
    pub json: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["endpoint", "max_capture"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
