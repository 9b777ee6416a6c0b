//! # Command Router
//!
//! Poise slash-command definitions. Each command defers ephemerally, builds a
//! [`CommandContext`] from the shared [`BotData`], runs its handler and sends the
//! handler's notice as the single ephemeral follow-up.

use poise::serenity_prelude as serenity;
use std::sync::Arc;

use crate::application::access::AdminSet;
use crate::application::provisioning::ProvisionRequest;
use crate::domain::config::LimitsConfig;
use crate::domain::types::{ChannelId, ChatUser, Notice, ResourceSpec, ResourceUpdate};
use crate::infrastructure::discord::{DiscordService, render};
use crate::infrastructure::panel::PanelClient;
use crate::interface::commands::{self, CommandContext};

/// State shared by every command invocation. Read-only after start-up.
pub struct BotData {
    pub panel: Arc<PanelClient>,
    pub chat: DiscordService,
    pub admins: AdminSet,
    pub limits: LimitsConfig,
    pub audit_channel: Option<ChannelId>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, BotData, Error>;

pub fn commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        createserver(),
        delete_server(),
        suspend(),
        unsuspend(),
        set_resources(),
        list_servers(),
        server_info(),
        server_search(),
        user_list(),
        user_search(),
        delete_user(),
        change_password(),
        nodes(),
        eggs(),
        panel_status(),
        backup_list(),
        maintenance_on(),
        maintenance_off(),
    ]
}

fn chat_user(user: &serenity::User) -> ChatUser {
    ChatUser::new(user.id.get(), user.name.clone())
}

fn command_context<'a>(ctx: Context<'a>) -> CommandContext<'a> {
    let data = ctx.data();
    CommandContext {
        panel: data.panel.as_ref(),
        chat: &data.chat,
        admins: &data.admins,
        limits: data.limits,
        audit_channel: data.audit_channel,
        invoker: chat_user(ctx.author()),
    }
}

/// Acknowledges the interaction so slow panel calls cannot time it out.
async fn begin(ctx: Context<'_>) -> Result<CommandContext<'_>, Error> {
    ctx.defer_ephemeral().await?;
    let context = command_context(ctx);
    tracing::info!("/{} invoked by {}", ctx.command().qualified_name, context.invoker);
    Ok(context)
}

async fn respond(ctx: Context<'_>, notice: Notice) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(render(&notice))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Logs command failures and tells the invoker; everything else goes to poise's default handler.
pub async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Framework setup failed: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("/{} failed: {:?}", ctx.command().qualified_name, error);
            if let Err(e) = respond(ctx, Notice::error("Command failed", error.to_string())).await {
                tracing::error!("Could not report command failure: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

// Servers

/// Create a server for a Discord user (creates their panel account if needed)
#[poise::command(slash_command)]
pub async fn createserver(
    ctx: Context<'_>,
    #[description = "Server name"] name: String,
    #[description = "Memory in MB"] ram: i64,
    #[description = "CPU limit in percent (100 = one core)"] cpu: i64,
    #[description = "Disk in MB"] disk: i64,
    #[description = "Node ID"] node_id: u64,
    #[description = "Egg ID"] egg_id: u64,
    #[description = "Discord user who will own the server"] user: serenity::User,
    #[description = "Startup command (defaults to the egg's)"] startup: Option<String>,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let request = ProvisionRequest {
        name,
        resources: ResourceSpec { ram, cpu, disk },
        node_id,
        egg_id,
        owner: chat_user(&user),
        startup,
    };
    respond(ctx, commands::servers::handle_create_server(&context, request).await).await
}

/// Delete a server and notify its owner
#[poise::command(slash_command)]
pub async fn delete_server(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
    #[description = "Discord user to notify"] user: serenity::User,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let notice = commands::servers::handle_delete_server(&context, &server_id, &chat_user(&user)).await;
    respond(ctx, notice).await
}

/// Suspend a server and notify its owner
#[poise::command(slash_command)]
pub async fn suspend(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
    #[description = "Discord user to notify"] user: serenity::User,
    #[description = "Reason shown to the user"] reason: Option<String>,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let notice =
        commands::servers::handle_suspend(&context, &server_id, &chat_user(&user), reason.as_deref()).await;
    respond(ctx, notice).await
}

/// Unsuspend a server and notify its owner
#[poise::command(slash_command)]
pub async fn unsuspend(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
    #[description = "Discord user to notify"] user: serenity::User,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let notice = commands::servers::handle_unsuspend(&context, &server_id, &chat_user(&user)).await;
    respond(ctx, notice).await
}

/// Change a server's memory, CPU or disk limits
#[poise::command(slash_command)]
pub async fn set_resources(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
    #[description = "Discord user to notify"] user: serenity::User,
    #[description = "Memory in MB"] memory: Option<i64>,
    #[description = "CPU limit in percent"] cpu: Option<i64>,
    #[description = "Disk in MB"] disk: Option<i64>,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let update = ResourceUpdate {
        ram: memory,
        cpu,
        disk,
    };
    let notice =
        commands::servers::handle_set_resources(&context, &server_id, &chat_user(&user), update).await;
    respond(ctx, notice).await
}

/// List servers on the panel
#[poise::command(slash_command)]
pub async fn list_servers(ctx: Context<'_>) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::servers::handle_list_servers(&context).await).await
}

/// Get info for a server
#[poise::command(slash_command)]
pub async fn server_info(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::servers::handle_server_info(&context, &server_id).await).await
}

/// Search servers by name or owner
#[poise::command(slash_command)]
pub async fn server_search(
    ctx: Context<'_>,
    #[description = "Search query (name or owner)"] query: String,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::servers::handle_server_search(&context, &query).await).await
}

// Users

/// List panel users
#[poise::command(slash_command)]
pub async fn user_list(ctx: Context<'_>) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::users::handle_user_list(&context).await).await
}

/// Search users by email or username
#[poise::command(slash_command)]
pub async fn user_search(
    ctx: Context<'_>,
    #[description = "Query (email or username)"] query: String,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::users::handle_user_search(&context, &query).await).await
}

/// Delete a panel user
#[poise::command(slash_command)]
pub async fn delete_user(
    ctx: Context<'_>,
    #[description = "Panel user ID"] user_id: u64,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::users::handle_delete_user(&context, user_id).await).await
}

/// Reset a panel user's password
#[poise::command(slash_command)]
pub async fn change_password(
    ctx: Context<'_>,
    #[description = "Panel user ID"] user_id: u64,
    #[description = "New password (generated when omitted)"] new_password: Option<String>,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(
        ctx,
        commands::users::handle_change_password(&context, user_id, new_password).await,
    )
    .await
}

// Panel

/// List nodes
#[poise::command(slash_command)]
pub async fn nodes(ctx: Context<'_>) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::panel::handle_nodes(&context).await).await
}

/// List eggs
#[poise::command(slash_command)]
pub async fn eggs(ctx: Context<'_>) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::panel::handle_eggs(&context).await).await
}

/// Check whether the panel API is reachable
#[poise::command(slash_command)]
pub async fn panel_status(ctx: Context<'_>) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::panel::handle_panel_status(&context).await).await
}

/// List backups for a server
#[poise::command(slash_command)]
pub async fn backup_list(
    ctx: Context<'_>,
    #[description = "Server ID"] server_id: String,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    respond(ctx, commands::panel::handle_backup_list(&context, &server_id).await).await
}

/// Tell a server's owner that maintenance has started
#[poise::command(slash_command)]
pub async fn maintenance_on(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
    #[description = "Discord user to notify"] user: serenity::User,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let notice = commands::panel::handle_maintenance(&context, &server_id, &chat_user(&user), true).await;
    respond(ctx, notice).await
}

/// Tell a server's owner that maintenance is over
#[poise::command(slash_command)]
pub async fn maintenance_off(
    ctx: Context<'_>,
    #[description = "Server ID or UUID"] server_id: String,
    #[description = "Discord user to notify"] user: serenity::User,
) -> Result<(), Error> {
    let context = begin(ctx).await?;
    let notice = commands::panel::handle_maintenance(&context, &server_id, &chat_user(&user), false).await;
    respond(ctx, notice).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_is_registered_once() {
        let names: Vec<String> = commands().into_iter().map(|c| c.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
        for expected in ["createserver", "set_resources", "panel_status", "maintenance_off"] {
            assert!(names.iter().any(|n| n == expected), "missing /{expected}");
        }
        assert_eq!(names.len(), 18);
    }

    #[test]
    fn test_commands_are_slash_only() {
        for command in commands() {
            assert!(command.slash_action.is_some(), "/{} is not a slash command", command.name);
            assert!(command.prefix_action.is_none());
        }
    }
}
