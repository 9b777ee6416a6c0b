//! # Server Provisioning
//!
//! Turns one `createserver` invocation into the ordered panel calls:
//! validate, check node and egg, find or create the owner's panel account,
//! pick an allocation, create the server. The first failure aborts the run;
//! nothing already created is rolled back.

use serde_json::{Map, Value};

use crate::application::validator::{self, ResourceViolation};
use crate::domain::config::LimitsConfig;
use crate::domain::traits::PanelApi;
use crate::domain::types::{ChatUser, PanelUser, ResourceSpec, ServerRecord};
use crate::infrastructure::panel::{
    AllocationRef, FeatureLimits, NewServer, NewUser, PanelResource, ServerLimits,
};

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub name: String,
    pub resources: ResourceSpec,
    pub node_id: u64,
    pub egg_id: u64,
    pub owner: ChatUser,
    /// Overrides the egg's startup command.
    pub startup: Option<String>,
}

/// Credentials of a panel account created during this run.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Provisioned {
    pub server: ServerRecord,
    pub panel_user: PanelUser,
    /// Startup command the server was created with.
    pub startup: String,
    pub new_account: Option<NewAccount>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Invalid(#[from] ResourceViolation),
    #[error("Node {0} not found or unreachable.")]
    NodeNotFound(u64),
    #[error("Egg {0} not found or unreachable.")]
    EggNotFound(u64),
    #[error("Panel user lookup failed: {0}")]
    UserLookup(String),
    #[error("Failed to create panel user: {0}")]
    UserCreate(String),
    #[error("Could not determine panel user ID.")]
    UserIdMissing,
    #[error("Failed to fetch allocations for node {node_id}: {detail}")]
    Allocations { node_id: u64, detail: String },
    #[error("No allocations available on node {node_id}.")]
    NoAllocations { node_id: u64 },
    #[error("Allocation on node {node_id} has no id.")]
    AllocationIdMissing { node_id: u64 },
    #[error("Server creation failed: {0}")]
    ServerCreate(String),
}

impl ProvisionError {
    /// Validation errors are rejected before any panel call and are not audited.
    pub fn is_validation(&self) -> bool {
        matches!(self, ProvisionError::Invalid(_))
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProvisionError::Invalid(_) => "Invalid resources",
            ProvisionError::NodeNotFound(_) => "Invalid node",
            ProvisionError::EggNotFound(_) => "Invalid egg",
            ProvisionError::UserLookup(_) | ProvisionError::UserIdMissing => "User resolution error",
            ProvisionError::UserCreate(_) => "Failed to create panel user",
            ProvisionError::Allocations { .. }
            | ProvisionError::NoAllocations { .. }
            | ProvisionError::AllocationIdMissing { .. } => "No allocation",
            ProvisionError::ServerCreate(_) => "Server creation failed",
        }
    }
}

/// What the egg contributes to a new server.
struct EggDefaults {
    docker_image: Option<String>,
    startup: String,
    environment: Map<String, Value>,
}

impl EggDefaults {
    fn from_resource(egg: &PanelResource) -> Self {
        let environment = egg
            .relationship("variables")
            .iter()
            .filter_map(|variable| {
                let key = variable.text("env_variable")?;
                let value = variable.text("default_value").unwrap_or_default();
                Some((key, Value::String(value)))
            })
            .collect();
        Self {
            docker_image: egg.text("docker_image"),
            startup: egg.text("startup").unwrap_or_default(),
            environment,
        }
    }
}

pub struct Provisioner<'a> {
    panel: &'a dyn PanelApi,
    limits: LimitsConfig,
}

impl<'a> Provisioner<'a> {
    pub fn new(panel: &'a dyn PanelApi, limits: LimitsConfig) -> Self {
        Self { panel, limits }
    }

    pub async fn provision(&self, request: ProvisionRequest) -> Result<Provisioned, ProvisionError> {
        validator::validate_spec(&request.resources, &self.limits)?;

        let node = self.panel.get_node(request.node_id).await;
        if !node.is_ok() {
            tracing::warn!("Node {} rejected: {}", request.node_id, node.describe());
            return Err(ProvisionError::NodeNotFound(request.node_id));
        }

        let egg = self.panel.get_egg(request.egg_id).await;
        if !egg.is_ok() {
            tracing::warn!("Egg {} rejected: {}", request.egg_id, egg.describe());
            return Err(ProvisionError::EggNotFound(request.egg_id));
        }
        let defaults = egg
            .envelope()
            .first()
            .map(|egg| EggDefaults::from_resource(&egg))
            .unwrap_or(EggDefaults {
                docker_image: None,
                startup: String::new(),
                environment: Map::new(),
            });

        let (panel_user, new_account) = self.ensure_panel_user(&request.owner).await?;

        let allocation = self.first_allocation(request.node_id).await?;

        let startup = request.startup.clone().unwrap_or(defaults.startup);
        let payload = NewServer {
            name: request.name.clone(),
            user: panel_user.id,
            egg: request.egg_id,
            docker_image: defaults.docker_image,
            startup: startup.clone(),
            environment: defaults.environment,
            limits: ServerLimits::from(request.resources),
            feature_limits: FeatureLimits::default(),
            allocation: AllocationRef {
                default: allocation,
            },
        };
        let created = self.panel.create_server(&payload).await;
        if !created.is_created() {
            return Err(ProvisionError::ServerCreate(created.describe()));
        }

        let resource = created.envelope().first().unwrap_or_default();
        let server = ServerRecord {
            id: resource.id(),
            identifier: resource.text("identifier"),
            name: request.name,
            node_id: request.node_id,
            egg_id: request.egg_id,
            resources: request.resources,
            owner_panel_user_id: panel_user.id,
        };
        tracing::info!(
            "Created server {} ({}) for {} on node {}",
            server.label(),
            server.name,
            request.owner,
            server.node_id
        );

        Ok(Provisioned {
            server,
            panel_user,
            startup,
            new_account,
        })
    }

    /// Finds the owner's panel account by derived email, creating it when absent.
    /// A failed lookup aborts instead of risking a duplicate account.
    pub async fn ensure_panel_user(
        &self,
        owner: &ChatUser,
    ) -> Result<(PanelUser, Option<NewAccount>), ProvisionError> {
        let email = owner.panel_email();
        let found = self.panel.find_user_by_email(&email).await;
        if !found.is_ok() {
            return Err(ProvisionError::UserLookup(found.describe()));
        }
        // The email filter is a substring match: 1@discord.local also finds 11@discord.local.
        let existing = found.envelope().into_list().into_iter().find(|user| {
            user.text("email")
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(&email))
        });
        if let Some(existing) = existing {
            let id = existing.id().ok_or(ProvisionError::UserIdMissing)?;
            return Ok((
                PanelUser {
                    id,
                    email,
                    username: existing.text("username").unwrap_or_else(|| owner.panel_username()),
                },
                None,
            ));
        }

        let username = owner.panel_username();
        let created = self
            .panel
            .create_user(NewUser {
                email: email.clone(),
                username: username.clone(),
                first_name: owner.name.clone(),
                last_name: String::new(),
                password: None,
            })
            .await;
        if !created.result.is_created() {
            return Err(ProvisionError::UserCreate(created.result.describe()));
        }
        let id = created
            .result
            .envelope()
            .first()
            .and_then(|user| user.id())
            .ok_or(ProvisionError::UserIdMissing)?;
        tracing::info!("Created panel user {} for {}", id, owner);

        let account = created.password.map(|password| NewAccount {
            username: username.clone(),
            password,
        });
        Ok((
            PanelUser {
                id,
                email,
                username,
            },
            account,
        ))
    }

    async fn first_allocation(&self, node_id: u64) -> Result<u64, ProvisionError> {
        let allocations = self.panel.get_node_allocations(node_id).await;
        if !allocations.is_ok() {
            return Err(ProvisionError::Allocations {
                node_id,
                detail: allocations.describe(),
            });
        }
        let first = allocations
            .envelope()
            .first()
            .ok_or(ProvisionError::NoAllocations { node_id })?;
        first
            .id()
            .ok_or(ProvisionError::AllocationIdMissing { node_id })
    }
}
