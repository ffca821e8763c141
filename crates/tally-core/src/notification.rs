//! Notification types.
//!
//! Notifications are created and destroyed by the server. The client only
//! ever fetches them, marks them read, or deletes them, so [`RawNotification`]
//! mirrors the wire shape and [`Notification`] adds the one field the client
//! derives for itself: the display severity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::{DisplayType, classify};

// ─── Priority ────────────────────────────────────────────────────────────────

/// Server-assigned urgency of a notification.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
  Low,
  #[default]
  Normal,
  High,
  Urgent,
}

impl Priority {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Low => "low",
      Self::Normal => "normal",
      Self::High => "high",
      Self::Urgent => "urgent",
    }
  }
}

/// Unknown priorities degrade to [`Priority::Normal`] rather than failing the
/// whole list.
impl From<String> for Priority {
  fn from(value: String) -> Self {
    match value.to_lowercase().as_str() {
      "low" => Self::Low,
      "high" => Self::High,
      "urgent" => Self::Urgent,
      _ => Self::Normal,
    }
  }
}

impl std::fmt::Display for Priority {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Wire shape ──────────────────────────────────────────────────────────────

/// A notification exactly as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNotification {
  pub id:         Uuid,
  /// The user this notification is addressed to.
  pub user_id:    Uuid,
  /// Free-form tag from a server-defined vocabulary, e.g. `budget_exceeded`.
  #[serde(rename = "type")]
  pub kind:       String,
  #[serde(default)]
  pub title:      String,
  #[serde(default)]
  pub message:    String,
  #[serde(default)]
  pub is_read:    bool,
  #[serde(default)]
  pub priority:   Priority,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub read_at:    Option<DateTime<Utc>>,
  #[serde(default)]
  pub expires_at: Option<DateTime<Utc>>,
  /// Deep link into the application, if the notification has a target.
  #[serde(default)]
  pub action_url: Option<String>,
}

/// Response body of the unread-count endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
  pub unread_count: usize,
}

// ─── Classified notification ─────────────────────────────────────────────────

/// A notification with its display severity attached.
///
/// The severity is computed from `(type, title, message)` when the raw item
/// is ingested and is never accepted from the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
  pub id:         Uuid,
  pub user_id:    Uuid,
  #[serde(rename = "type")]
  pub kind:       String,
  pub title:      String,
  pub message:    String,
  pub is_read:    bool,
  pub priority:   Priority,
  pub created_at: DateTime<Utc>,
  pub read_at:    Option<DateTime<Utc>>,
  pub expires_at: Option<DateTime<Utc>>,
  pub action_url: Option<String>,
  display_type:   DisplayType,
}

impl Notification {
  pub fn display_type(&self) -> DisplayType { self.display_type }

  /// Whether `expires_at` lies at or before `now`.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|at| at <= now)
  }

  /// Flag the notification as read at `at`. Returns `false` if it already was.
  pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
    if self.is_read {
      return false;
    }
    self.is_read = true;
    self.read_at.get_or_insert(at);
    true
  }
}

impl From<RawNotification> for Notification {
  fn from(raw: RawNotification) -> Self {
    let display_type =
      classify(&raw.kind, Some(&raw.title), Some(&raw.message));
    Self {
      id: raw.id,
      user_id: raw.user_id,
      kind: raw.kind,
      title: raw.title,
      message: raw.message,
      is_read: raw.is_read,
      priority: raw.priority,
      created_at: raw.created_at,
      read_at: raw.read_at,
      expires_at: raw.expires_at,
      action_url: raw.action_url,
      display_type,
    }
  }
}
