//! Core types and rules for the Tally finance client.
//!
//! This crate is deliberately free of HTTP and runtime dependencies. It holds
//! the notification data model, the severity classifier, the role mapper and
//! the permission gate, plus the [`api::NotificationApi`] abstraction the
//! notification store is built on.

pub mod api;
pub mod classify;
pub mod error;
pub mod notification;
pub mod permission;
pub mod role;

pub use error::{Error, Result};
