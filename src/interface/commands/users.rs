//! # User Commands
//!
//! Panel account listings plus the admin-only delete and password reset.
//! These act on panel accounts, not chat users, so nobody is DMed.

use super::CommandContext;
use crate::domain::types::{AuditEvent, Notice};
use crate::strings::messages;

pub const MAX_LISTED_USERS: usize = 50;

pub async fn handle_user_list(ctx: &CommandContext<'_>) -> Notice {
    let result = ctx.panel.list_users().await;
    if !result.is_ok() {
        return messages::panel_failure("Failed to list users", &result);
    }
    let lines = result
        .envelope()
        .into_list()
        .iter()
        .take(MAX_LISTED_USERS)
        .map(messages::user_line)
        .collect();
    Notice::success("Panel Users", messages::listing(lines, messages::NO_USERS))
}

pub async fn handle_user_search(ctx: &CommandContext<'_>, query: &str) -> Notice {
    let result = ctx.panel.search_users(query).await;
    if !result.is_ok() {
        return messages::panel_failure("Search failed", &result);
    }
    let lines = result
        .envelope()
        .into_list()
        .iter()
        .take(MAX_LISTED_USERS)
        .map(messages::user_line)
        .collect();
    Notice::success("User Search", messages::listing(lines, messages::NO_MATCHES))
}

pub async fn handle_delete_user(ctx: &CommandContext<'_>, user_id: u64) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("delete_user");
    }
    let event = AuditEvent::new(&ctx.invoker, "deleted panel user", user_id.to_string());
    let result = ctx.panel.delete_user(user_id).await;
    if !result.is_empty_ok() {
        return ctx.panel_failure("Deletion failed", &result, event).await;
    }
    ctx.notifier().record(&event).await;
    Notice::success("User deleted", format!("User {user_id} deleted."))
}

/// The new password is only ever shown to the invoker, hidden behind a spoiler.
pub async fn handle_change_password(
    ctx: &CommandContext<'_>,
    user_id: u64,
    new_password: Option<String>,
) -> Notice {
    if !ctx.is_admin() {
        return ctx.denied("change_password");
    }
    let event = AuditEvent::new(&ctx.invoker, "changed password for panel user", user_id.to_string());
    let reset = ctx.panel.reset_password(user_id, new_password).await;
    let password = match reset.password {
        Some(password) if reset.result.is_empty_ok() => password,
        _ => return ctx.panel_failure("Change failed", &reset.result, event).await,
    };
    ctx.notifier().record(&event).await;
    Notice::success("Password changed", format!("New password: ||{password}||"))
}
