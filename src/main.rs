//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Discord, Panel API client
//! - Application: Router, Provisioning, Notifications, Logging
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

use crate::application::access::AdminSet;
use crate::application::router::{self, BotData};
use crate::domain::config::AppConfig;
use crate::infrastructure::discord::DiscordService;
use crate::infrastructure::panel::{PanelClient, PanelCredentials};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Configuration
    let config = AppConfig::load();

    // 2. Setup Logging
    let _guard = application::logging::init(&config.log_dir)?;
    tracing::info!("Starting ptero-bot...");

    // 3. Initialize Infrastructure
    let credentials = PanelCredentials::new(&config.panel.url, &config.panel.api_key)
        .context("Invalid panel configuration")?;
    let panel = Arc::new(
        PanelClient::new(credentials, config.panel.password_length)
            .context("Failed to build panel client")?,
    );
    panel.open().context("Failed to open panel session")?;
    if panel.is_open() {
        tracing::info!("Panel session open for {}", config.panel.url);
    }

    let admins = AdminSet::new(config.admins());
    if admins.is_empty() {
        tracing::warn!("ADMIN_IDS is empty: every admin command will be denied");
    } else {
        tracing::info!("{} admin(s) configured", admins.len());
    }
    let audit_channel = config.audit_channel();
    if audit_channel.is_none() {
        tracing::warn!("ADMIN_LOG_CHANNEL_ID not set: audit records are only logged locally");
    }
    let limits = config.limits;

    // 4. Build Framework
    let setup_panel = panel.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: router::commands(),
            on_error: |error| Box::pin(router::on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!(
                    "Logged in as {}; registered {} commands",
                    ready.user.name,
                    framework.options().commands.len()
                );
                Ok(BotData {
                    panel: setup_panel,
                    chat: DiscordService::new(ctx.http.clone()),
                    admins,
                    limits,
                    audit_channel,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Failed to build Discord client")?;

    // 5. Shutdown on Ctrl-C
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                shard_manager.shutdown_all().await;
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let result = client.start().await;
    panel.close();
    result.context("Discord client stopped with an error")
}
