//! Response and payload types for the panel application API.
//!
//! The panel is not consistent about response shapes: listings come wrapped in
//! `{"data": [...]}`, single resources in `{"attributes": {...}}`, some creates
//! answer `{"data": {"attributes": ...}}` and error bodies are arbitrary JSON or
//! text. [`normalize`] is the only place that knows about this.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::types::ResourceSpec;

/// Statuses accepted for reads and partial updates.
pub const READ_OK: &[u16] = &[200];
/// Statuses accepted for creates.
pub const CREATE_OK: &[u16] = &[200, 201];
/// Statuses accepted for deletes and state transitions (the panel answers either).
pub const EMPTY_OK: &[u16] = &[200, 204];

/// Status used when the request never produced an HTTP response.
pub const TRANSPORT_FAILURE: u16 = 0;

/// Uniform result of every panel call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub status: u16,
    pub data: Value,
    pub error: Option<String>,
}

impl ApiResult {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            status,
            data,
            error: None,
        }
    }

    /// Builds a result from a raw response body. Empty or non-JSON bodies become `{}`;
    /// non-empty text is kept in `error` so it can still be shown.
    pub fn from_body(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::new(status, empty_object());
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(data) => Self::new(status, data),
            Err(_) => Self {
                status,
                data: empty_object(),
                error: Some(trimmed.to_string()),
            },
        }
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            status: TRANSPORT_FAILURE,
            data: empty_object(),
            error: Some(message.into()),
        }
    }

    pub fn accepted(&self, statuses: &[u16]) -> bool {
        statuses.contains(&self.status)
    }

    pub fn is_ok(&self) -> bool {
        self.accepted(READ_OK)
    }

    pub fn is_created(&self) -> bool {
        self.accepted(CREATE_OK)
    }

    pub fn is_empty_ok(&self) -> bool {
        self.accepted(EMPTY_OK)
    }

    pub fn envelope(&self) -> Envelope {
        normalize(&self.data)
    }

    /// Human-readable failure description: transport/raw text first, else the panel's payload.
    pub fn describe(&self) -> String {
        let payload = match &self.error {
            Some(error) => error.clone(),
            None => self.data.to_string(),
        };
        if self.status == TRANSPORT_FAILURE {
            format!("Panel unreachable: {payload}")
        } else {
            format!("HTTP {}: {payload}", self.status)
        }
    }
}

/// A result whose success carries a secret (generated or supplied password).
#[derive(Debug, Clone, PartialEq)]
pub struct SecretResult {
    pub result: ApiResult,
    /// Only set when the call succeeded.
    pub password: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Normalized response shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    List(Vec<PanelResource>),
    Single(PanelResource),
    Raw(Value),
}

impl Envelope {
    /// All resources, regardless of shape. `Raw` yields nothing.
    pub fn into_list(self) -> Vec<PanelResource> {
        match self {
            Envelope::List(items) => items,
            Envelope::Single(item) => vec![item],
            Envelope::Raw(_) => Vec::new(),
        }
    }

    pub fn first(self) -> Option<PanelResource> {
        self.into_list().into_iter().next()
    }
}

/// Converts any panel body into one canonical shape.
pub fn normalize(value: &Value) -> Envelope {
    match value {
        Value::Array(items) => Envelope::List(items.iter().filter_map(PanelResource::from_value).collect()),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("data") {
                return Envelope::List(items.iter().filter_map(PanelResource::from_value).collect());
            }
            if map.get("attributes").is_some_and(Value::is_object) || map.contains_key("id") {
                if let Some(resource) = PanelResource::from_value(value) {
                    return Envelope::Single(resource);
                }
            }
            if let Some(inner @ Value::Object(_)) = map.get("data") {
                if let Some(resource) = PanelResource::from_value(inner) {
                    return Envelope::Single(resource);
                }
            }
            Envelope::Raw(value.clone())
        }
        other => Envelope::Raw(other.clone()),
    }
}

/// Attribute map of one panel object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelResource(Map<String, Value>);

impl PanelResource {
    /// Unwraps `{"attributes": {...}}` or accepts a bare object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        match map.get("attributes") {
            Some(Value::Object(attributes)) => {
                let mut attributes = attributes.clone();
                // Bare id next to the attributes block still counts.
                if !attributes.contains_key("id") {
                    if let Some(id) = map.get("id") {
                        attributes.insert("id".to_string(), id.clone());
                    }
                }
                Some(Self(attributes))
            }
            _ => Some(Self(map.clone())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric id, accepting numbers and numeric strings.
    pub fn id(&self) -> Option<u64> {
        self.u64_field("id")
    }

    pub fn u64_field(&self, key: &str) -> Option<u64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Scalar field rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like [`text`](Self::text) but never empty, for listings.
    pub fn show(&self, key: &str) -> String {
        self.text(key).unwrap_or_else(|| "-".to_string())
    }

    /// Resources included through `?include=<name>`.
    pub fn relationship(&self, name: &str) -> Vec<PanelResource> {
        self.0
            .get("relationships")
            .and_then(|r| r.get(name))
            .map(normalize)
            .map(Envelope::into_list)
            .unwrap_or_default()
    }
}

/// Payload for `POST /users`. The password is filled in by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserPayload<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

/// Payload for `POST /servers`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewServer {
    pub name: String,
    pub user: u64,
    pub egg: u64,
    pub docker_image: Option<String>,
    pub startup: String,
    pub environment: Map<String, Value>,
    pub limits: ServerLimits,
    pub feature_limits: FeatureLimits,
    pub allocation: AllocationRef,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ServerLimits {
    pub memory: i64,
    pub swap: i64,
    pub disk: i64,
    pub io: i64,
    pub cpu: i64,
}

impl From<ResourceSpec> for ServerLimits {
    fn from(spec: ResourceSpec) -> Self {
        Self {
            memory: spec.ram,
            swap: 0,
            disk: spec.disk,
            io: 500,
            cpu: spec.cpu,
        }
    }
}

/// Databases and backups are never granted by this bot.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct FeatureLimits {
    pub databases: u32,
    pub backups: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AllocationRef {
    pub default: u64,
}

/// Body of `PATCH /servers/{id}/build`: only the limits that were set.
#[derive(Debug, Serialize)]
pub(crate) struct BuildPayload {
    pub limits: Map<String, Value>,
}

impl BuildPayload {
    pub fn from_update(update: &crate::domain::types::ResourceUpdate) -> Self {
        let mut limits = Map::new();
        if let Some(ram) = update.ram {
            limits.insert("memory".to_string(), Value::from(ram));
        }
        if let Some(cpu) = update.cpu {
            limits.insert("cpu".to_string(), Value::from(cpu));
        }
        if let Some(disk) = update.disk {
            limits.insert("disk".to_string(), Value::from(disk));
        }
        Self { limits }
    }
}
