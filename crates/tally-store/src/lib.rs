//! Client-side notification cache for Tally.
//!
//! [`NotificationStore`] mirrors the server's notifications for the current
//! session and brokers every mutation through a
//! [`tally_core::api::NotificationApi`]. State is published on a
//! [`tokio::sync::watch`] channel so a UI layer can render snapshots and await
//! changes.

mod poller;
mod state;
mod store;

pub mod error;

pub use error::{Result, StoreError};
pub use poller::{MIN_POLL_PERIOD, Poller, spawn_poller};
pub use state::NotificationState;
pub use store::NotificationStore;

#[cfg(test)]
mod tests;
