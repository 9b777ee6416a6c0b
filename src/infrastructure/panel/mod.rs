//! # Panel API
//!
//! Client for the game panel's application API plus the response/payload types it speaks.

mod client;
mod types;

pub use client::{PanelClient, PanelCredentials};
pub use types::{
    AllocationRef, ApiResult, FeatureLimits, NewServer, NewUser, PanelResource, SecretResult,
    ServerLimits,
};
