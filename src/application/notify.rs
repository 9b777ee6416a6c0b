//! # Notification Sequencer
//!
//! Direct-message the affected user, fall back to the audit channel when that fails,
//! and write audit records. Nothing here returns an error: failures are reported as
//! `bool`s and logged, so they can never fail the command that triggered them.

use crate::domain::traits::ChatProvider;
use crate::domain::types::{AuditEvent, ChannelId, ChatUser, Notice, Outcome};
use crate::strings::messages;

pub struct Notifier<'a> {
    chat: &'a dyn ChatProvider,
    audit_channel: Option<ChannelId>,
}

impl<'a> Notifier<'a> {
    /// `audit_channel` of `None` disables audit routing.
    pub fn new(chat: &'a dyn ChatProvider, audit_channel: Option<ChannelId>) -> Self {
        Self {
            chat,
            audit_channel,
        }
    }

    /// One DM attempt. On failure a warning naming the user and the reason goes to
    /// the audit channel. Returns whether the DM was delivered.
    pub async fn notify_user(&self, user: &ChatUser, notice: &Notice, fallback: &str) -> bool {
        match self.chat.send_direct(user.id, notice).await {
            Ok(()) => {
                tracing::info!("Notified {} ({})", user, notice.title);
                true
            }
            Err(reason) => {
                tracing::warn!("Could not DM {}: {}", user, reason);
                self.audit(&messages::dm_failure(user, &reason, fallback))
                    .await;
                false
            }
        }
    }

    /// Best-effort post to the audit channel. Returns whether it was delivered.
    pub async fn audit(&self, notice: &Notice) -> bool {
        let Some(channel) = self.audit_channel else {
            tracing::debug!("Audit channel disabled; dropping '{}'", notice.title);
            return false;
        };
        match self.chat.send_to_channel(channel, notice).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to write audit record to channel {}: {}", channel, e);
                false
            }
        }
    }

    /// Writes the command's own audit record.
    pub async fn record(&self, event: &AuditEvent) -> bool {
        tracing::info!(
            actor = %event.actor,
            action = %event.action,
            target = %event.target,
            outcome = ?event.outcome,
            notified = ?event.notified,
            "audit"
        );
        self.audit(&audit_notice(event)).await
    }
}

/// Renders an audit event. Never includes secrets: events do not carry any.
pub fn audit_notice(event: &AuditEvent) -> Notice {
    let mut body = format!("{} {} {}", event.actor, event.action, event.target);
    match event.outcome {
        Outcome::Succeeded => body.push_str("\nOutcome: succeeded"),
        Outcome::Failed => body.push_str("\nOutcome: failed"),
    }
    if let Some(sent) = event.notified {
        body.push_str(&format!("\nDM sent: {sent}"));
    }
    if let Some(details) = &event.details {
        body.push('\n');
        body.push_str(details);
    }
    let title = messages::audit_title(&event.action, event.outcome);
    match event.outcome {
        Outcome::Succeeded => Notice::success(title, body),
        Outcome::Failed => Notice::warning(title, body),
    }
}
