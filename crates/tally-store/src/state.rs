//! The state the store publishes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tally_core::notification::Notification;
use uuid::Uuid;

/// Everything the UI needs to render the notification panel.
///
/// `notifications` and `unread_count` are only reachable through accessors;
/// every mutation goes through a method that recounts, so the count cannot
/// drift from the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
  notifications:           Vec<Notification>,
  unread_count:            usize,
  /// Owners whose notifications are kept; `None` keeps everything.
  pub accessible_user_ids: Option<HashSet<Uuid>>,
  pub is_initialized:      bool,
  pub is_loading:          bool,
  /// Message of the last failed fetch, cleared by the next successful one.
  pub error:               Option<String>,
  pub last_synced:         Option<DateTime<Utc>>,
}

impl NotificationState {
  /// Newest first.
  pub fn notifications(&self) -> &[Notification] { &self.notifications }

  pub fn unread_count(&self) -> usize { self.unread_count }

  pub fn get(&self, id: Uuid) -> Option<&Notification> {
    self.notifications.iter().find(|n| n.id == id)
  }

  pub fn unread(&self) -> impl Iterator<Item = &Notification> {
    self.notifications.iter().filter(|n| !n.is_read)
  }

  // ── Mutations (crate-private) ─────────────────────────────────────────

  /// Replace the list with `items`: sort newest first, then apply the owner
  /// allow-list.
  pub(crate) fn replace(&mut self, mut items: Vec<Notification>) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(allowed) = &self.accessible_user_ids {
      items.retain(|n| allowed.contains(&n.user_id));
    }
    self.notifications = items;
    self.recount();
  }

  /// Returns `true` if an unread item with `id` was flipped.
  pub(crate) fn mark_read(&mut self, id: Uuid, at: DateTime<Utc>) -> bool {
    let changed = self
      .notifications
      .iter_mut()
      .find(|n| n.id == id)
      .is_some_and(|n| n.mark_read(at));
    self.recount();
    changed
  }

  pub(crate) fn mark_all_read(&mut self, at: DateTime<Utc>) -> bool {
    let mut changed = false;
    for n in &mut self.notifications {
      changed |= n.mark_read(at);
    }
    self.recount();
    changed
  }

  /// Returns `true` if an item was removed.
  pub(crate) fn remove(&mut self, id: Uuid) -> bool {
    let before = self.notifications.len();
    self.notifications.retain(|n| n.id != id);
    self.recount();
    self.notifications.len() != before
  }

  fn recount(&mut self) {
    self.unread_count = self.unread().count();
  }
}
