//! # Domain Types
//!
//! Common data structures and enums used across the application logic.
//! Everything here is call-scoped: built for one command invocation and dropped afterwards.

use std::fmt;

/// Discord account identifier (snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discord channel identifier (snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat account as seen by a command: the invoker or the user being notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: UserId,
    pub name: String,
}

impl ChatUser {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }

    /// Deterministic panel email for this account, e.g. `1234@discord.local`.
    pub fn panel_email(&self) -> String {
        format!("{}@discord.local", self.id)
    }

    /// Panel username: display name with spaces replaced, at most 32 characters.
    pub fn panel_username(&self) -> String {
        self.name.replace(' ', "_").chars().take(32).collect()
    }

    /// Discord mention markup.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl fmt::Display for ChatUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Requested server limits. RAM and disk are MB, CPU is percent of one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub ram: i64,
    pub cpu: i64,
    pub disk: i64,
}

/// Partial limits update; `None` leaves the panel-side value unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUpdate {
    pub ram: Option<i64>,
    pub cpu: Option<i64>,
    pub disk: Option<i64>,
}

impl ResourceUpdate {
    pub fn is_empty(&self) -> bool {
        self.ram.is_none() && self.cpu.is_none() && self.disk.is_none()
    }
}

/// Panel account bridged to a chat account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelUser {
    pub id: u64,
    pub email: String,
    pub username: String,
}

/// Projection of a freshly created server. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
    pub id: Option<u64>,
    pub identifier: Option<String>,
    pub name: String,
    pub node_id: u64,
    pub egg_id: u64,
    pub resources: ResourceSpec,
    pub owner_panel_user_id: u64,
}

impl ServerRecord {
    /// Best label for messages: numeric id, else short identifier.
    pub fn label(&self) -> String {
        match (&self.id, &self.identifier) {
            (Some(id), _) => id.to_string(),
            (None, Some(identifier)) => identifier.clone(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// Colour/intent of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
}

/// Platform-neutral message handed to the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub title: String,
    pub body: String,
    pub fields: Vec<(String, String)>,
}

impl Notice {
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Tone::Success, title, body)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Tone::Error, title, body)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Tone::Warning, title, body)
    }

    fn new(tone: Tone, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            tone,
            title: title.into(),
            body: body.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// Result of the panel operation behind a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// One audit-channel record per state-changing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub actor: ChatUser,
    pub action: String,
    pub target: String,
    pub outcome: Outcome,
    /// `None` when no DM was attempted (failed operation or no chat user involved).
    pub notified: Option<bool>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(actor: &ChatUser, action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            actor: actor.clone(),
            action: action.into(),
            target: target.into(),
            outcome: Outcome::Succeeded,
            notified: None,
            details: None,
        }
    }

    pub fn failed(mut self) -> Self {
        self.outcome = Outcome::Failed;
        self
    }

    pub fn notified(mut self, sent: bool) -> Self {
        self.notified = Some(sent);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
