//! `NotificationStore`, the client-side notification cache.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use tally_core::{
  api::NotificationApi,
  notification::{Notification, UnreadCount},
};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{NotificationState, Result, StoreError};

/// The single authoritative cache of notification state for a session.
///
/// Cloning is cheap and every clone shares the same state. No operation holds
/// the state across an `.await`: each one awaits the API first and then
/// applies its update in one step, so concurrent calls resolve
/// last-write-wins.
pub struct NotificationStore<A> {
  api:   Arc<A>,
  state: Arc<watch::Sender<NotificationState>>,
}

impl<A> Clone for NotificationStore<A> {
  fn clone(&self) -> Self {
    Self { api: Arc::clone(&self.api), state: Arc::clone(&self.state) }
  }
}

impl<A: NotificationApi> NotificationStore<A> {
  pub fn new(api: A) -> Self { Self::with_api(Arc::new(api)) }

  pub fn with_api(api: Arc<A>) -> Self {
    let (tx, _) = watch::channel(NotificationState::default());
    Self { api, state: Arc::new(tx) }
  }

  pub fn api(&self) -> &A { &self.api }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub fn snapshot(&self) -> NotificationState { self.state.borrow().clone() }

  /// A receiver that observes every published change.
  pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
    self.state.subscribe()
  }

  pub fn unread_count(&self) -> usize { self.state.borrow().unread_count() }

  pub fn notifications(&self) -> Vec<Notification> {
    self.state.borrow().notifications().to_vec()
  }

  // ── Sync ──────────────────────────────────────────────────────────────

  /// Replace the cached list with the server's.
  ///
  /// On failure the previous list is kept and `error` carries the message.
  pub async fn fetch_notifications(&self, show_loading: bool) {
    if show_loading {
      self.state.send_modify(|s| s.is_loading = true);
    }

    match self.api.list_notifications().await {
      Ok(raw) => {
        let items: Vec<Notification> =
          raw.into_iter().map(Notification::from).collect();
        let synced_at = Utc::now();
        self.state.send_modify(|s| {
          s.replace(items);
          s.last_synced = Some(synced_at);
          s.error = None;
          s.is_loading = false;
        });
        let (count, unread) = {
          let s = self.state.borrow();
          (s.notifications().len(), s.unread_count())
        };
        debug!(count, unread, "notifications synced");
      }
      Err(e) => {
        warn!(error = %e, "failed to fetch notifications");
        self.state.send_modify(|s| {
          s.error = Some(e.to_string());
          s.is_loading = false;
        });
      }
    }
  }

  /// Cheap poll: compare the server's unread count with the cached one and
  /// refetch the full list only when they differ.
  ///
  /// The server counts every owner while the cache counts only
  /// `accessible_user_ids`, so with a filter that hides unread items every
  /// poll refetches.
  pub async fn fetch_unread_count(&self) {
    let UnreadCount { unread_count } = match self.api.unread_count().await {
      Ok(count) => count,
      Err(e) => {
        warn!(error = %e, "failed to fetch unread count");
        return;
      }
    };

    let cached = self.unread_count();
    if unread_count != cached {
      debug!(server = unread_count, cached, "unread count changed, resyncing");
      self.fetch_notifications(false).await;
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Mark one notification read. Failures are logged, not returned.
  pub async fn mark_as_read(&self, id: Uuid) {
    if let Err(e) = self.api.mark_notification_as_read(id).await {
      warn!(%id, error = %e, "failed to mark notification as read");
      return;
    }
    let now = Utc::now();
    self.state.send_if_modified(|s| s.mark_read(id, now));
  }

  /// Mark every notification read. Failures are logged, not returned.
  pub async fn mark_all_as_read(&self) {
    if let Err(e) = self.api.mark_all_notifications_as_read().await {
      warn!(error = %e, "failed to mark all notifications as read");
      return;
    }
    let now = Utc::now();
    self.state.send_if_modified(|s| s.mark_all_read(now));
  }

  /// Delete one notification. Unlike the mark operations, a failure is
  /// returned so the caller can surface it.
  pub async fn delete_notification(&self, id: Uuid) -> Result<()> {
    self
      .api
      .delete_notification(id)
      .await
      .map_err(StoreError::api)?;
    self.state.send_if_modified(|s| s.remove(id));
    Ok(())
  }

  // ── Session ───────────────────────────────────────────────────────────

  /// Restrict the cache to notifications owned by `ids` and mark the store
  /// initialized. Takes effect on the next fetch.
  pub fn set_accessible_user_ids(&self, ids: impl IntoIterator<Item = Uuid>) {
    let ids: HashSet<Uuid> = ids.into_iter().collect();
    self.state.send_modify(|s| {
      s.accessible_user_ids = Some(ids);
      s.is_initialized = true;
    });
  }

  /// Back to the empty, uninitialized state (logout).
  pub fn clear_notifications(&self) {
    self.state.send_replace(NotificationState::default());
  }
}
