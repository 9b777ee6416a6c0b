//! # Domain Traits
//!
//! Abstract interfaces for core system components (Chat, Panel).
//! Allows for pluggable implementations in the Infrastructure layer and scripted fakes in tests.

use async_trait::async_trait;

use crate::domain::types::{ChannelId, Notice, ResourceUpdate, UserId};
use crate::infrastructure::panel::{ApiResult, NewServer, NewUser, SecretResult};

/// Abstract interface for a Chat Provider (e.g., Discord)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a direct message to a user
    async fn send_direct(&self, user: UserId, notice: &Notice) -> Result<(), String>;

    /// Send a message to a channel
    async fn send_to_channel(&self, channel: ChannelId, notice: &Notice) -> Result<(), String>;
}

/// Abstract interface for the game panel's application API.
///
/// Every operation resolves to an [`ApiResult`]; transport failures are folded
/// into it, so implementations never return `Err`.
#[async_trait]
pub trait PanelApi: Send + Sync {
    /// Public base URL of the panel, shown to users.
    fn base_url(&self) -> &str;

    async fn get_node(&self, node_id: u64) -> ApiResult;
    async fn list_nodes(&self) -> ApiResult;
    async fn get_node_allocations(&self, node_id: u64) -> ApiResult;
    async fn get_egg(&self, egg_id: u64) -> ApiResult;
    async fn list_eggs(&self) -> ApiResult;

    async fn get_server(&self, server_id: &str) -> ApiResult;
    async fn list_servers(&self) -> ApiResult;
    async fn create_server(&self, server: &NewServer) -> ApiResult;
    async fn set_server_resources(&self, server_id: &str, update: &ResourceUpdate) -> ApiResult;
    async fn suspend_server(&self, server_id: &str) -> ApiResult;
    async fn unsuspend_server(&self, server_id: &str) -> ApiResult;
    async fn delete_server(&self, server_id: &str) -> ApiResult;
    async fn list_backups(&self, server_id: &str) -> ApiResult;

    async fn list_users(&self) -> ApiResult;
    async fn search_users(&self, query: &str) -> ApiResult;
    async fn find_user_by_email(&self, email: &str) -> ApiResult;
    async fn create_user(&self, user: NewUser) -> SecretResult;
    async fn delete_user(&self, user_id: u64) -> ApiResult;
    async fn reset_password(&self, user_id: u64, password: Option<String>) -> SecretResult;

    /// Health check; `true` only for a 200 from the API root.
    async fn ping_panel(&self) -> bool;
}
