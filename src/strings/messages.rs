//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes command replies, direct-message notices and audit-channel templates.

use crate::domain::types::{ChatUser, Notice, Outcome, PanelUser, ResourceUpdate, ServerRecord};
use crate::infrastructure::panel::{ApiResult, PanelResource};

pub const PERMISSION_DENIED: &str = "Permission denied";
pub const PERMISSION_DENIED_BODY: &str = "You are not allowed to use this command.";

pub const INVALID_RESOURCES: &str = "Invalid resources";
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response";

pub const NO_SERVERS: &str = "No servers found.";
pub const NO_USERS: &str = "No users found.";
pub const NO_NODES: &str = "No nodes found.";
pub const NO_EGGS: &str = "No eggs found.";
pub const NO_BACKUPS: &str = "No backups found.";
pub const NO_MATCHES: &str = "No matches found.";

pub const PANEL_REACHABLE: &str = "Panel is reachable";
pub const PANEL_UNREACHABLE: &str = "Could not reach panel API";

pub fn permission_denied() -> Notice {
    Notice::error(PERMISSION_DENIED, PERMISSION_DENIED_BODY)
}

/// Error reply carrying the panel's own answer.
pub fn panel_failure(title: &str, result: &ApiResult) -> Notice {
    Notice::error(title, result.describe())
}

pub fn user_notified(sent: bool) -> String {
    format!("User notified: {sent}")
}

/// Warning for the audit channel when a DM could not be delivered.
pub fn dm_failure(user: &ChatUser, reason: &str, fallback: &str) -> Notice {
    Notice::warning(
        "DM Failure: Could not notify user",
        format!("Could not DM {user}. Reason: {reason}\nFallback: {fallback}"),
    )
}

pub fn audit_title(action: &str, outcome: Outcome) -> String {
    match outcome {
        Outcome::Succeeded => format!("Audit: {action}"),
        Outcome::Failed => format!("Audit: {action} (failed)"),
    }
}

pub fn panel_user_detail(user: &PanelUser) -> String {
    format!("Panel user: {} (ID: {})", user.username, user.id)
}

// Direct messages

pub fn server_created_dm(record: &ServerRecord, panel_url: &str, startup: &str) -> Notice {
    Notice::success(
        "✅ SERVER CREATED",
        format!(
            "Server Name: {}\nServer ID: {}\nNode: {}\nRAM: {} MB\nCPU: {}\nDisk: {} MB\nStartup: {startup}\nPanel URL: {panel_url}",
            record.name,
            record.label(),
            record.node_id,
            record.resources.ram,
            record.resources.cpu,
            record.resources.disk,
        ),
    )
}

pub fn server_deleted_dm(server_id: &str, by: &ChatUser, at: &str) -> Notice {
    Notice::error(
        "❌ SERVER DELETED",
        format!("Server ID: {server_id}\nDeleted By: {by}\nDate & Time: {at}"),
    )
}

pub fn server_suspended_dm(server_id: &str, reason: Option<&str>) -> Notice {
    Notice::warning(
        "⚠️ SERVER SUSPENDED",
        format!(
            "Server ID: {server_id}\nReason: {}",
            reason.unwrap_or("No reason provided")
        ),
    )
}

pub fn server_unsuspended_dm(server_id: &str) -> Notice {
    Notice::success("✅ SERVER UNSUSPENDED", format!("Server ID: {server_id}"))
}

pub fn resources_updated_dm(server_id: &str, details: &str) -> Notice {
    Notice::success(
        "✅ RESOURCES UPDATED",
        format!("Server ID: {server_id}\n{details}"),
    )
}

pub fn maintenance_dm(server_id: &str, on: bool) -> Notice {
    if on {
        Notice::warning(
            "⚠️ MAINTENANCE ON",
            format!("Server ID: {server_id}\nMaintenance: ON"),
        )
    } else {
        Notice::success(
            "✅ MAINTENANCE OFF",
            format!("Server ID: {server_id}\nMaintenance: OFF"),
        )
    }
}

/// One line per field that is being changed.
pub fn resource_details(update: &ResourceUpdate) -> String {
    let mut lines = Vec::new();
    if let Some(ram) = update.ram {
        lines.push(format!("Memory: {ram} MB"));
    }
    if let Some(cpu) = update.cpu {
        lines.push(format!("CPU: {cpu}%"));
    }
    if let Some(disk) = update.disk {
        lines.push(format!("Disk: {disk} MB"));
    }
    lines.join("\n")
}

// Listing lines

pub fn server_line(server: &PanelResource) -> String {
    format!(
        "{} (ID: {}) Owner: {}",
        server.show("name"),
        server.show("id"),
        server.show("user")
    )
}

pub fn user_line(user: &PanelResource) -> String {
    format!(
        "{} (ID: {}) Email: {}",
        user.show("username"),
        user.show("id"),
        user.show("email")
    )
}

pub fn node_line(node: &PanelResource) -> String {
    format!(
        "{} (ID: {}) Location: {}",
        node.show("name"),
        node.show("id"),
        node.show("location_id")
    )
}

pub fn egg_line(egg: &PanelResource) -> String {
    format!(
        "{} (ID: {}) Nest: {}",
        egg.show("name"),
        egg.show("id"),
        egg.show("nest")
    )
}

pub fn backup_line(backup: &PanelResource) -> String {
    format!(
        "Backup ID: {} | Name: {} | Size: {}",
        backup.show("uuid"),
        backup.show("name"),
        backup.show("bytes")
    )
}

/// Joins listing lines, or `empty` when there are none.
pub fn listing(lines: Vec<String>, empty: &str) -> String {
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}
