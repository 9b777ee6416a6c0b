//! # Server Commands
//!
//! Creation, lifecycle (delete, suspend, unsuspend), resource changes and
//! read-only server listings.

use serde_json::Value;

use super::CommandContext;
use crate::application::provisioning::{ProvisionRequest, Provisioner};
use crate::application::validator;
use crate::domain::types::{AuditEvent, ChatUser, Notice, ResourceUpdate};
use crate::infrastructure::panel::PanelResource;
use crate::strings::messages;

/// Server listings are cut to fit one embed.
pub const MAX_LISTED_SERVERS: usize = 25;

pub async fn handle_create_server(ctx: &CommandContext<'_>, request: ProvisionRequest) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("createserver");
    }
    let owner = request.owner.clone();
    let name = request.name.clone();

    match Provisioner::new(ctx.panel, ctx.limits).provision(request).await {
        Ok(done) => {
            let label = done.server.label();
            let mut dm = messages::server_created_dm(&done.server, ctx.panel.base_url(), &done.startup);
            if let Some(account) = &done.new_account {
                dm = dm
                    .with_field("Username", &account.username)
                    .with_field("Password (new user)", &account.password);
            }
            let event = AuditEvent::new(
                &ctx.invoker,
                "created server",
                format!("{name} (Server ID: {label}) for {owner}"),
            )
            .with_details(messages::panel_user_detail(&done.panel_user));
            let sent = ctx
                .notify_and_record(&owner, &dm, &format!("Server {label} created"), event)
                .await;
            Notice::success(
                "Server created",
                format!("Server created for {}. DM sent: {sent}", owner.mention()),
            )
        }
        Err(e) if e.is_validation() => Notice::error(e.title(), e.to_string()),
        Err(e) => {
            tracing::warn!("Provisioning '{}' for {} failed: {}", name, owner, e);
            let event = AuditEvent::new(&ctx.invoker, "created server", format!("{name} for {owner}"));
            ctx.record_failure(event, e.to_string()).await;
            Notice::error(e.title(), e.to_string())
        }
    }
}

pub async fn handle_delete_server(ctx: &CommandContext<'_>, server_id: &str, user: &ChatUser) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("delete_server");
    }
    let event = AuditEvent::new(&ctx.invoker, "deleted server", format!("{server_id} for {user}"));
    let result = ctx.panel.delete_server(server_id).await;
    if !result.is_empty_ok() {
        return ctx.panel_failure("Delete failed", &result, event).await;
    }

    let at = chrono::Utc::now().to_rfc3339();
    let dm = messages::server_deleted_dm(server_id, &ctx.invoker, &at);
    let sent = ctx
        .notify_and_record(user, &dm, &format!("Server {server_id} deleted"), event)
        .await;
    Notice::success(
        "Server deleted",
        format!("Server {server_id} deleted. {}", messages::user_notified(sent)),
    )
}

pub async fn handle_suspend(
    ctx: &CommandContext<'_>,
    server_id: &str,
    user: &ChatUser,
    reason: Option<&str>,
) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("suspend");
    }
    let mut event = AuditEvent::new(&ctx.invoker, "suspended server", format!("{server_id} for {user}"));
    if let Some(reason) = reason {
        event = event.with_details(format!("Reason: {reason}"));
    }
    let result = ctx.panel.suspend_server(server_id).await;
    if !result.is_empty_ok() {
        return ctx.panel_failure("Suspend failed", &result, event).await;
    }

    let dm = messages::server_suspended_dm(server_id, reason);
    let sent = ctx
        .notify_and_record(user, &dm, &format!("Server {server_id} suspended"), event)
        .await;
    Notice::success(
        "Server suspended",
        format!("Server {server_id} suspended. {}", messages::user_notified(sent)),
    )
}

pub async fn handle_unsuspend(ctx: &CommandContext<'_>, server_id: &str, user: &ChatUser) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("unsuspend");
    }
    let event = AuditEvent::new(&ctx.invoker, "unsuspended server", format!("{server_id} for {user}"));
    let result = ctx.panel.unsuspend_server(server_id).await;
    if !result.is_empty_ok() {
        return ctx.panel_failure("Unsuspend failed", &result, event).await;
    }

    let dm = messages::server_unsuspended_dm(server_id);
    let sent = ctx
        .notify_and_record(user, &dm, &format!("Server {server_id} unsuspended"), event)
        .await;
    Notice::success(
        "Server unsuspended",
        format!("Server {server_id} unsuspended. {}", messages::user_notified(sent)),
    )
}

pub async fn handle_set_resources(
    ctx: &CommandContext<'_>,
    server_id: &str,
    user: &ChatUser,
    update: ResourceUpdate,
) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("set_resources");
    }
    if let Err(violation) = validator::validate_update(&update, &ctx.limits) {
        if let Some(resource) = violation.resource() {
            tracing::info!("Rejected {} change for {}: {}", resource, server_id, violation);
        }
        return Notice::error(messages::INVALID_RESOURCES, violation.to_string());
    }

    let details = messages::resource_details(&update);
    let event = AuditEvent::new(&ctx.invoker, "changed resources for", format!("{server_id} ({user})"))
        .with_details(details.clone());
    let result = ctx.panel.set_server_resources(server_id, &update).await;
    if !result.is_ok() {
        return ctx
            .panel_failure("Failed to update resources", &result, event)
            .await;
    }

    let dm = messages::resources_updated_dm(server_id, &details);
    let sent = ctx
        .notify_and_record(user, &dm, &format!("Resources updated for {server_id}"), event)
        .await;
    Notice::success("Resources updated", messages::user_notified(sent))
}

pub async fn handle_list_servers(ctx: &CommandContext<'_>) -> Notice {
    let result = ctx.panel.list_servers().await;
    if !result.is_ok() {
        return messages::panel_failure("Failed to list servers", &result);
    }
    let lines = result
        .envelope()
        .into_list()
        .iter()
        .take(MAX_LISTED_SERVERS)
        .map(messages::server_line)
        .collect();
    Notice::success("Servers", messages::listing(lines, messages::NO_SERVERS))
}

/// Scalar fields shown by `server_info`; limits live in a nested object.
const INFO_FIELDS: &[&str] = &["name", "identifier", "uuid", "node"];
const LIMIT_FIELDS: &[&str] = &["memory", "disk", "cpu"];

fn info_lines(server: &PanelResource) -> Vec<String> {
    let mut lines: Vec<String> = INFO_FIELDS
        .iter()
        .filter_map(|key| server.text(key).map(|value| format!("{key}: {value}")))
        .collect();
    let limits = server.get("limits").and_then(Value::as_object);
    for key in LIMIT_FIELDS {
        let value = limits
            .and_then(|l| l.get(*key))
            .or_else(|| server.get(key));
        if let Some(value) = value.filter(|v| !v.is_null()) {
            lines.push(format!("{key}: {value}"));
        }
    }
    lines
}

pub async fn handle_server_info(ctx: &CommandContext<'_>, server_id: &str) -> Notice {
    let result = ctx.panel.get_server(server_id).await;
    if !result.is_ok() {
        return messages::panel_failure("Failed to fetch server", &result);
    }
    match result.envelope().first() {
        Some(server) => Notice::success("Server Info", info_lines(&server).join("\n")),
        None => Notice::error(messages::UNEXPECTED_RESPONSE, result.data.to_string()),
    }
}

/// Case-insensitive match on the name, or on the owner's panel id.
fn matches_query(server: &PanelResource, query: &str) -> bool {
    let needle = query.to_lowercase();
    let name = server.text("name").unwrap_or_default().to_lowercase();
    let owner = server.text("user").unwrap_or_default();
    name.contains(&needle) || owner.contains(query)
}

pub async fn handle_server_search(ctx: &CommandContext<'_>, query: &str) -> Notice {
    let result = ctx.panel.list_servers().await;
    if !result.is_ok() {
        return messages::panel_failure("Search failed", &result);
    }
    let lines = result
        .envelope()
        .into_list()
        .iter()
        .filter(|server| matches_query(server, query))
        .take(MAX_LISTED_SERVERS)
        .map(messages::server_line)
        .collect();
    Notice::success("Search results", messages::listing(lines, messages::NO_MATCHES))
}
