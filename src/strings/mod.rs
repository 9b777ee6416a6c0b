//! # Strings Module
//!
//! Centralizes user-facing strings so replies, DMs and audit records stay consistent.

pub mod messages;
