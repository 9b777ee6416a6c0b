//! # Panel Commands
//!
//! Inventory (nodes, eggs, backups), the health check and maintenance notices.

use super::CommandContext;
use crate::domain::types::{AuditEvent, ChatUser, Notice};
use crate::infrastructure::panel::PanelResource;
use crate::strings::messages;

pub async fn handle_nodes(ctx: &CommandContext<'_>) -> Notice {
    let result = ctx.panel.list_nodes().await;
    if !result.is_ok() {
        return messages::panel_failure("Failed to fetch nodes", &result);
    }
    let lines = result
        .envelope()
        .into_list()
        .iter()
        .map(messages::node_line)
        .collect();
    Notice::success("Nodes", messages::listing(lines, messages::NO_NODES))
}

/// Eggs are listed through their nests; a nest without included eggs contributes nothing.
fn eggs_of(nests: Vec<PanelResource>) -> Vec<PanelResource> {
    nests
        .iter()
        .flat_map(|nest| nest.relationship("eggs"))
        .collect()
}

pub async fn handle_eggs(ctx: &CommandContext<'_>) -> Notice {
    let result = ctx.panel.list_eggs().await;
    if !result.is_ok() {
        return messages::panel_failure("Failed to fetch eggs", &result);
    }
    let lines = eggs_of(result.envelope().into_list())
        .iter()
        .map(messages::egg_line)
        .collect();
    Notice::success("Eggs", messages::listing(lines, messages::NO_EGGS))
}

pub async fn handle_panel_status(ctx: &CommandContext<'_>) -> Notice {
    if ctx.panel.ping_panel().await {
        Notice::success("Panel status", messages::PANEL_REACHABLE)
    } else {
        Notice::error("Panel unreachable", messages::PANEL_UNREACHABLE)
    }
}

pub async fn handle_backup_list(ctx: &CommandContext<'_>, server_id: &str) -> Notice {
    let result = ctx.panel.list_backups(server_id).await;
    if !result.is_ok() {
        return messages::panel_failure("Failed to fetch backups", &result);
    }
    let lines = result
        .envelope()
        .into_list()
        .iter()
        .map(messages::backup_line)
        .collect();
    Notice::success("Backups", messages::listing(lines, messages::NO_BACKUPS))
}

/// The panel has no maintenance toggle; this only informs the owner and the audit channel.
pub async fn handle_maintenance(
    ctx: &CommandContext<'_>,
    server_id: &str,
    user: &ChatUser,
    on: bool,
) -> Notice {
    let (command, state) = if on {
        ("maintenance_on", "ON")
    } else {
        ("maintenance_off", "OFF")
    };
    if !ctx.is_admin() {
        return ctx.denied(command);
    }
    let event = AuditEvent::new(
        &ctx.invoker,
        format!("set maintenance {state} for"),
        format!("{server_id} ({user})"),
    );
    let dm = messages::maintenance_dm(server_id, on);
    let sent = ctx
        .notify_and_record(user, &dm, &format!("Maintenance {state} for {server_id}"), event)
        .await;
    Notice::success(format!("Maintenance {state}"), messages::user_notified(sent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Tone;
    use crate::infrastructure::panel::ApiResult;
    use crate::interface::commands::test_support::{ADMIN, admins, context};
    use crate::testing::{FakeChat, FakePanel};
    use serde_json::json;

    #[tokio::test]
    async fn test_inventory_listings() {
        let panel = FakePanel::new();
        let chat = FakeChat::default();
        let admins = admins();
        let ctx = context(&panel, &chat, &admins, 999);

        let nodes = handle_nodes(&ctx).await;
        assert_eq!(nodes.body, "node-1 (ID: 1) Location: 1");

        let eggs = handle_eggs(&ctx).await;
        assert_eq!(eggs.body, "Paper (ID: 2) Nest: 1");

        let backups = handle_backup_list(&ctx, "5").await;
        assert!(backups.body.contains("Backup ID: b-1 | Name: nightly"));
    }

    #[tokio::test]
    async fn test_failed_listing_shows_panel_answer() {
        let panel = FakePanel::new()
            .with_response("list_nodes", ApiResult::transport_error("connection refused"));
        let chat = FakeChat::default();
        let admins = admins();
        let ctx = context(&panel, &chat, &admins, ADMIN);

        let reply = handle_nodes(&ctx).await;

        assert_eq!(reply.tone, Tone::Error);
        assert!(reply.body.contains("Panel unreachable: connection refused"));
    }

    #[tokio::test]
    async fn test_empty_eggs_listing() {
        let panel = FakePanel::new()
            .with_response("list_eggs", ApiResult::new(200, json!({"data": []})));
        let chat = FakeChat::default();
        let admins = admins();
        let ctx = context(&panel, &chat, &admins, ADMIN);

        assert_eq!(handle_eggs(&ctx).await.body, messages::NO_EGGS);
    }

    #[tokio::test]
    async fn test_panel_status() {
        let chat = FakeChat::default();
        let admins = admins();

        let up = FakePanel::new();
        let ctx = context(&up, &chat, &admins, 999);
        assert_eq!(handle_panel_status(&ctx).await.tone, Tone::Success);

        let down = FakePanel::new().with_response("ping_panel", ApiResult::transport_error("timeout"));
        let ctx = context(&down, &chat, &admins, 999);
        assert_eq!(handle_panel_status(&ctx).await.tone, Tone::Error);
    }

    #[tokio::test]
    async fn test_maintenance_notifies_without_panel_calls() {
        let panel = FakePanel::new();
        let chat = FakeChat::default();
        let admins = admins();
        let ctx = context(&panel, &chat, &admins, ADMIN);
        let owner = ChatUser::new(42, "player");

        let on = handle_maintenance(&ctx, "5", &owner, true).await;
        let off = handle_maintenance(&ctx, "5", &owner, false).await;

        assert_eq!(on.title, "Maintenance ON");
        assert_eq!(off.title, "Maintenance OFF");
        assert!(panel.calls().is_empty());
        let dms = chat.direct_messages();
        assert_eq!(dms[0].1.tone, Tone::Warning);
        assert!(dms[1].1.body.contains("Maintenance: OFF"));
        assert_eq!(chat.channel_messages().len(), 2);
    }

    #[tokio::test]
    async fn test_maintenance_is_gated() {
        let panel = FakePanel::new();
        let chat = FakeChat::default();
        let admins = admins();
        let ctx = context(&panel, &chat, &admins, 999);

        let reply = handle_maintenance(&ctx, "5", &ChatUser::new(42, "player"), true).await;

        assert_eq!(reply.title, messages::PERMISSION_DENIED);
        assert!(chat.direct_messages().is_empty());
    }
}
