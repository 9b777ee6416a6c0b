//! # Command Handlers
//!
//! One handler per slash command. Handlers take a [`CommandContext`] and return the
//! single [`Notice`] the router sends back to the invoker. Side effects (DMs, audit
//! records) happen inside the handler and never turn into errors.

pub mod panel;
pub mod servers;
pub mod users;

use crate::application::access::AdminSet;
use crate::application::notify::Notifier;
use crate::domain::config::LimitsConfig;
use crate::domain::traits::{ChatProvider, PanelApi};
use crate::domain::types::{AuditEvent, ChannelId, ChatUser, Notice};
use crate::infrastructure::panel::ApiResult;
use crate::strings::messages;

/// Everything a handler needs for one invocation.
pub struct CommandContext<'a> {
    pub panel: &'a dyn PanelApi,
    pub chat: &'a dyn ChatProvider,
    pub admins: &'a AdminSet,
    pub limits: LimitsConfig,
    pub audit_channel: Option<ChannelId>,
    pub invoker: ChatUser,
}

impl<'a> CommandContext<'a> {
    pub fn is_admin(&self) -> bool {
        self.admins.is_admin(self.invoker.id)
    }

    pub fn notifier(&self) -> Notifier<'a> {
        Notifier::new(self.chat, self.audit_channel)
    }

    /// Reply for a non-admin calling a gated command. Nothing is audited.
    pub fn denied(&self, command: &str) -> Notice {
        tracing::warn!("{} denied /{}", self.invoker, command);
        messages::permission_denied()
    }

    /// DMs the affected user, then writes the audit record with the DM outcome.
    pub async fn notify_and_record(
        &self,
        user: &ChatUser,
        dm: &Notice,
        fallback: &str,
        event: AuditEvent,
    ) -> bool {
        let notifier = self.notifier();
        let sent = notifier.notify_user(user, dm, fallback).await;
        notifier.record(&event.notified(sent)).await;
        sent
    }

    /// Audit record for a state-changing command whose panel call failed.
    pub async fn record_failure(&self, event: AuditEvent, details: String) {
        self.notifier()
            .record(&event.failed().with_details(details))
            .await;
    }

    /// Failure reply plus failed-outcome audit record.
    pub async fn panel_failure(&self, title: &str, result: &ApiResult, event: AuditEvent) -> Notice {
        tracing::warn!("{} failed: {}", event.action, result.describe());
        self.record_failure(event, result.describe()).await;
        messages::panel_failure(title, result)
    }
}
