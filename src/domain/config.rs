//! # Configuration
//!
//! Loads the bot's settings from the environment (optionally seeded from a `.env` file).
//! Required values abort start-up when missing; everything else has a default.

use clap::Parser;
use std::fmt;

use crate::domain::types::{ChannelId, UserId};

/// Main application configuration structure.
#[derive(Parser, Clone)]
#[command(name = "ptero-bot", about = "Discord bot for Pterodactyl panel administration")]
pub struct AppConfig {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    #[command(flatten)]
    pub panel: PanelConfig,

    #[command(flatten)]
    pub limits: LimitsConfig,

    /// Comma-separated Discord user ids allowed to run admin commands
    #[arg(long, env = "ADMIN_IDS", value_delimiter = ',', default_value = "")]
    pub admin_ids: Vec<AdminId>,

    /// Channel receiving audit records; 0 disables audit routing
    #[arg(long, env = "ADMIN_LOG_CHANNEL_ID", default_value_t = 0)]
    pub admin_log_channel_id: u64,

    /// Directory for the session log file
    #[arg(long, env = "LOG_DIR", default_value = "data")]
    pub log_dir: String,
}

/// Panel connection settings.
#[derive(clap::Args, Clone)]
pub struct PanelConfig {
    /// Panel base URL, e.g. https://panel.example.com
    #[arg(long = "panel-url", env = "PTERODACTYL_PANEL_URL")]
    pub url: String,

    /// Application API key
    #[arg(long = "panel-api-key", env = "PTERODACTYL_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Length of generated panel passwords
    #[arg(long, env = "DEFAULT_USER_PASSWORD_LENGTH", default_value_t = 16)]
    pub password_length: usize,
}

/// Per-server resource ceilings.
#[derive(clap::Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Maximum RAM in MB
    #[arg(long, env = "MAX_RAM", default_value_t = 32768)]
    pub max_ram: i64,

    /// Maximum CPU in percent
    #[arg(long, env = "MAX_CPU", default_value_t = 800)]
    pub max_cpu: i64,

    /// Maximum disk in MB
    #[arg(long, env = "MAX_DISK", default_value_t = 200000)]
    pub max_disk: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_ram: 32768,
            max_cpu: 800,
            max_disk: 200000,
        }
    }
}

/// One entry of `ADMIN_IDS`. Empty entries (e.g. a trailing comma) are allowed and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminId(pub Option<UserId>);

impl std::str::FromStr for AdminId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self(None));
        }
        trimmed
            .parse::<u64>()
            .map(|id| Self(Some(UserId(id))))
            .map_err(|_| format!("`{trimmed}` is not a numeric Discord user id"))
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn admins(&self) -> Vec<UserId> {
        self.admin_ids.iter().filter_map(|a| a.0).collect()
    }

    pub fn audit_channel(&self) -> Option<ChannelId> {
        (self.admin_log_channel_id != 0).then_some(ChannelId(self.admin_log_channel_id))
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("discord_token", &"<redacted>")
            .field("panel", &self.panel)
            .field("limits", &self.limits)
            .field("admin_ids", &self.admins())
            .field("admin_log_channel_id", &self.admin_log_channel_id)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("password_length", &self.password_length)
            .finish()
    }
}
