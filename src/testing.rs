//! In-memory fakes for the chat platform and the panel, used by unit tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::traits::{ChatProvider, PanelApi};
use crate::domain::types::{ChannelId, Notice, PanelUser, ResourceUpdate, UserId};
use crate::infrastructure::panel::{ApiResult, NewServer, NewUser, SecretResult};

pub const GENERATED_PASSWORD: &str = "Gen3rated-Pass_01";

/// Records every message; can be told to fail DMs and/or channel sends.
#[derive(Default)]
pub struct FakeChat {
    dm_error: Option<String>,
    channel_error: Option<String>,
    dms: Mutex<Vec<(UserId, Notice)>>,
    channel: Mutex<Vec<(ChannelId, Notice)>>,
}

impl FakeChat {
    pub fn failing_dms(reason: &str) -> Self {
        Self {
            dm_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_everything(reason: &str) -> Self {
        Self {
            dm_error: Some(reason.to_string()),
            channel_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn direct_messages(&self) -> Vec<(UserId, Notice)> {
        self.dms.lock().unwrap().clone()
    }

    pub fn channel_messages(&self) -> Vec<(ChannelId, Notice)> {
        self.channel.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for FakeChat {
    async fn send_direct(&self, user: UserId, notice: &Notice) -> Result<(), String> {
        if let Some(reason) = &self.dm_error {
            return Err(reason.clone());
        }
        self.dms.lock().unwrap().push((user, notice.clone()));
        Ok(())
    }

    async fn send_to_channel(&self, channel: ChannelId, notice: &Notice) -> Result<(), String> {
        if let Some(reason) = &self.channel_error {
            return Err(reason.clone());
        }
        self.channel.lock().unwrap().push((channel, notice.clone()));
        Ok(())
    }
}

/// Panel operations that change panel state.
pub const MUTATING_OPS: &[&str] = &[
    "create_user",
    "create_server",
    "set_server_resources",
    "suspend_server",
    "unsuspend_server",
    "delete_server",
    "delete_user",
    "reset_password",
];

/// Stateful panel double: known nodes/eggs, a user table and per-operation overrides.
pub struct FakePanel {
    pub nodes: Vec<u64>,
    pub eggs: Vec<u64>,
    pub allocations: Vec<u64>,
    users: Mutex<Vec<PanelUser>>,
    overrides: Mutex<HashMap<&'static str, ApiResult>>,
    calls: Mutex<Vec<&'static str>>,
    servers: Mutex<Vec<NewServer>>,
}

impl Default for FakePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePanel {
    /// Node 1 with one free allocation (id 10), egg 2, no users.
    pub fn new() -> Self {
        Self {
            nodes: vec![1],
            eggs: vec![2],
            allocations: vec![10],
            users: Mutex::new(Vec::new()),
            overrides: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            servers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_allocations(mut self, allocations: Vec<u64>) -> Self {
        self.allocations = allocations;
        self
    }

    pub fn with_user(self, id: u64, email: &str, username: &str) -> Self {
        self.users.lock().unwrap().push(PanelUser {
            id,
            email: email.to_string(),
            username: username.to_string(),
        });
        self
    }

    /// Forces `op` to answer with `result`.
    pub fn with_response(self, op: &'static str, result: ApiResult) -> Self {
        self.overrides.lock().unwrap().insert(op, result);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    pub fn mutating_calls(&self) -> usize {
        self.calls().iter().filter(|c| MUTATING_OPS.contains(*c)).count()
    }

    pub fn created_servers(&self) -> Vec<NewServer> {
        self.servers.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<PanelUser> {
        self.users.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) -> Option<ApiResult> {
        self.calls.lock().unwrap().push(op);
        self.overrides.lock().unwrap().get(op).cloned()
    }

    fn user_json(user: &PanelUser) -> Value {
        json!({
            "object": "user",
            "attributes": {"id": user.id, "email": user.email, "username": user.username}
        })
    }

    fn not_found() -> ApiResult {
        ApiResult::new(
            404,
            json!({"errors": [{"code": "NotFoundHttpException", "status": "404"}]}),
        )
    }
}

#[async_trait]
impl PanelApi for FakePanel {
    fn base_url(&self) -> &str {
        "https://panel.test"
    }

    async fn get_node(&self, node_id: u64) -> ApiResult {
        if let Some(result) = self.record("get_node") {
            return result;
        }
        if self.nodes.contains(&node_id) {
            ApiResult::new(200, json!({"object": "node", "attributes": {"id": node_id, "name": "node"}}))
        } else {
            Self::not_found()
        }
    }

    async fn list_nodes(&self) -> ApiResult {
        if let Some(result) = self.record("list_nodes") {
            return result;
        }
        let data: Vec<Value> = self
            .nodes
            .iter()
            .map(|id| json!({"attributes": {"id": id, "name": format!("node-{id}"), "location_id": 1}}))
            .collect();
        ApiResult::new(200, json!({"object": "list", "data": data}))
    }

    async fn get_node_allocations(&self, _node_id: u64) -> ApiResult {
        if let Some(result) = self.record("get_node_allocations") {
            return result;
        }
        let data: Vec<Value> = self
            .allocations
            .iter()
            .map(|id| json!({"object": "allocation", "attributes": {"id": id, "ip": "10.0.0.1", "port": 25565, "assigned": false}}))
            .collect();
        ApiResult::new(200, json!({"object": "list", "data": data}))
    }

    async fn get_egg(&self, egg_id: u64) -> ApiResult {
        if let Some(result) = self.record("get_egg") {
            return result;
        }
        if !self.eggs.contains(&egg_id) {
            return Self::not_found();
        }
        ApiResult::new(
            200,
            json!({
                "object": "egg",
                "attributes": {
                    "id": egg_id,
                    "name": "Paper",
                    "docker_image": "ghcr.io/pterodactyl/yolks:java_17",
                    "startup": "java -jar server.jar",
                    "relationships": {
                        "variables": {"object": "list", "data": [
                            {"object": "egg_variable", "attributes": {"env_variable": "SERVER_JARFILE", "default_value": "server.jar"}},
                            {"object": "egg_variable", "attributes": {"env_variable": "BUILD_NUMBER", "default_value": null}}
                        ]}
                    }
                }
            }),
        )
    }

    async fn list_eggs(&self) -> ApiResult {
        if let Some(result) = self.record("list_eggs") {
            return result;
        }
        let eggs: Vec<Value> = self
            .eggs
            .iter()
            .map(|id| json!({"attributes": {"id": id, "name": "Paper", "nest": 1}}))
            .collect();
        ApiResult::new(
            200,
            json!({"object": "list", "data": [
                {"attributes": {"id": 1, "name": "Minecraft", "relationships": {"eggs": {"object": "list", "data": eggs}}}}
            ]}),
        )
    }

    async fn get_server(&self, server_id: &str) -> ApiResult {
        if let Some(result) = self.record("get_server") {
            return result;
        }
        ApiResult::new(
            200,
            json!({"object": "server", "attributes": {
                "id": server_id, "identifier": "abcd1234", "uuid": "abcd1234-0000", "name": "test",
                "node": 1, "limits": {"memory": 1024, "cpu": 100, "disk": 5000}
            }}),
        )
    }

    async fn list_servers(&self) -> ApiResult {
        if let Some(result) = self.record("list_servers") {
            return result;
        }
        ApiResult::new(
            200,
            json!({"object": "list", "data": [
                {"attributes": {"id": 5, "name": "Survival", "user": 3}},
                {"attributes": {"id": 6, "name": "Creative", "user": 4}}
            ]}),
        )
    }

    async fn create_server(&self, server: &NewServer) -> ApiResult {
        self.servers.lock().unwrap().push(server.clone());
        if let Some(result) = self.record("create_server") {
            return result;
        }
        ApiResult::new(
            201,
            json!({"object": "server", "attributes": {"id": 99, "identifier": "abcd1234", "name": server.name}}),
        )
    }

    async fn set_server_resources(&self, _server_id: &str, _update: &ResourceUpdate) -> ApiResult {
        self.record("set_server_resources")
            .unwrap_or_else(|| ApiResult::new(200, json!({"object": "server", "attributes": {}})))
    }

    async fn suspend_server(&self, _server_id: &str) -> ApiResult {
        self.record("suspend_server")
            .unwrap_or_else(|| ApiResult::new(204, json!({})))
    }

    async fn unsuspend_server(&self, _server_id: &str) -> ApiResult {
        self.record("unsuspend_server")
            .unwrap_or_else(|| ApiResult::new(204, json!({})))
    }

    async fn delete_server(&self, _server_id: &str) -> ApiResult {
        self.record("delete_server")
            .unwrap_or_else(|| ApiResult::new(204, json!({})))
    }

    async fn list_backups(&self, _server_id: &str) -> ApiResult {
        self.record("list_backups").unwrap_or_else(|| {
            ApiResult::new(
                200,
                json!({"object": "list", "data": [
                    {"attributes": {"uuid": "b-1", "name": "nightly", "bytes": 1048576}}
                ]}),
            )
        })
    }

    async fn list_users(&self) -> ApiResult {
        if let Some(result) = self.record("list_users") {
            return result;
        }
        let data: Vec<Value> = self.users().iter().map(Self::user_json).collect();
        ApiResult::new(200, json!({"object": "list", "data": data}))
    }

    async fn search_users(&self, query: &str) -> ApiResult {
        if let Some(result) = self.record("search_users") {
            return result;
        }
        let data: Vec<Value> = self
            .users()
            .iter()
            .filter(|u| u.email.contains(query))
            .map(Self::user_json)
            .collect();
        ApiResult::new(200, json!({"object": "list", "data": data}))
    }

    async fn find_user_by_email(&self, email: &str) -> ApiResult {
        if let Some(result) = self.record("find_user_by_email") {
            return result;
        }
        let data: Vec<Value> = self
            .users()
            .iter()
            // Substring match, like the panel's filter[email].
            .filter(|u| u.email.contains(email))
            .map(Self::user_json)
            .collect();
        ApiResult::new(200, json!({"object": "list", "data": data}))
    }

    async fn create_user(&self, user: NewUser) -> SecretResult {
        if let Some(result) = self.record("create_user") {
            return SecretResult {
                result,
                password: None,
            };
        }
        let mut users = self.users.lock().unwrap();
        let id = 100 + users.len() as u64;
        let created = PanelUser {
            id,
            email: user.email,
            username: user.username,
        };
        let body = Self::user_json(&created);
        users.push(created);
        SecretResult {
            result: ApiResult::new(201, body),
            password: Some(user.password.unwrap_or_else(|| GENERATED_PASSWORD.to_string())),
        }
    }

    async fn delete_user(&self, _user_id: u64) -> ApiResult {
        self.record("delete_user")
            .unwrap_or_else(|| ApiResult::new(204, json!({})))
    }

    async fn reset_password(&self, _user_id: u64, password: Option<String>) -> SecretResult {
        if let Some(result) = self.record("reset_password") {
            let password = result.is_empty_ok().then(|| {
                password
                    .clone()
                    .unwrap_or_else(|| GENERATED_PASSWORD.to_string())
            });
            return SecretResult { result, password };
        }
        SecretResult {
            result: ApiResult::new(204, json!({})),
            password: Some(password.unwrap_or_else(|| GENERATED_PASSWORD.to_string())),
        }
    }

    async fn ping_panel(&self) -> bool {
        match self.record("ping_panel") {
            Some(result) => result.status == 200,
            None => true,
        }
    }
}
