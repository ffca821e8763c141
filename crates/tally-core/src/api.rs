//! The `NotificationApi` trait.
//!
//! The trait is implemented by transports (e.g. the HTTP client in
//! `tally-cli`). The notification store depends on this abstraction, not on
//! any concrete client, which keeps it testable against in-memory fakes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  notification::{RawNotification, UnreadCount},
  role::RawUser,
};

/// The remote operations the client core consumes.
///
/// Wire format, authentication and timeouts belong to the implementation.
/// All methods return `Send` futures so the store can drive them from a
/// spawned tokio task.
pub trait NotificationApi: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Every notification visible to the current session.
  fn list_notifications(
    &self,
  ) -> impl Future<Output = Result<Vec<RawNotification>, Self::Error>> + Send + '_;

  /// Cheap count used for polling.
  fn unread_count(
    &self,
  ) -> impl Future<Output = Result<UnreadCount, Self::Error>> + Send + '_;

  fn mark_notification_as_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn mark_all_notifications_as_read(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Users with their raw backend roles; map them with
  /// [`map_role_to_user_type`](crate::role::map_role_to_user_type).
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<RawUser>, Self::Error>> + Send + '_;
}
