//! # Application Layer
//!
//! Orchestration of the bot: command routing, access control, resource validation,
//! server provisioning, user notification and logging setup.

pub mod access;
pub mod logging;
pub mod notify;
pub mod provisioning;
pub mod router;
pub mod validator;
