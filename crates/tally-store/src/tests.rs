//! Behavioural tests for `NotificationStore` against an in-memory API.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use tally_core::{
  api::NotificationApi,
  classify::DisplayType,
  notification::{Priority, RawNotification, UnreadCount},
  role::RawUser,
};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{NotificationState, NotificationStore, StoreError, spawn_poller};

// ─── Fake API ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake api failure: {0}")]
struct FakeError(&'static str);

#[derive(Default)]
struct Server {
  notifications: Vec<RawNotification>,
  fail_list:     bool,
  fail_count:    bool,
  fail_mark:     bool,
  fail_delete:   bool,
  list_calls:    usize,
  list_gate:     Option<Arc<Notify>>,
}

#[derive(Default)]
struct FakeApi {
  server: Mutex<Server>,
}

impl FakeApi {
  fn with(notifications: Vec<RawNotification>) -> Self {
    Self {
      server: Mutex::new(Server { notifications, ..Default::default() }),
    }
  }

  fn server(&self) -> std::sync::MutexGuard<'_, Server> {
    self.server.lock().unwrap()
  }
}

impl NotificationApi for FakeApi {
  type Error = FakeError;

  async fn list_notifications(&self) -> Result<Vec<RawNotification>, FakeError> {
    let gate = self.server().list_gate.clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    let mut server = self.server();
    server.list_calls += 1;
    if server.fail_list {
      return Err(FakeError("list"));
    }
    Ok(server.notifications.clone())
  }

  async fn unread_count(&self) -> Result<UnreadCount, FakeError> {
    let server = self.server();
    if server.fail_count {
      return Err(FakeError("count"));
    }
    let unread_count = server.notifications.iter().filter(|n| !n.is_read).count();
    Ok(UnreadCount { unread_count })
  }

  async fn mark_notification_as_read(&self, id: Uuid) -> Result<(), FakeError> {
    let mut server = self.server();
    if server.fail_mark {
      return Err(FakeError("mark"));
    }
    if let Some(n) = server.notifications.iter_mut().find(|n| n.id == id) {
      n.is_read = true;
    }
    Ok(())
  }

  async fn mark_all_notifications_as_read(&self) -> Result<(), FakeError> {
    let mut server = self.server();
    if server.fail_mark {
      return Err(FakeError("mark all"));
    }
    server.notifications.iter_mut().for_each(|n| n.is_read = true);
    Ok(())
  }

  async fn delete_notification(&self, id: Uuid) -> Result<(), FakeError> {
    let mut server = self.server();
    if server.fail_delete {
      return Err(FakeError("delete"));
    }
    server.notifications.retain(|n| n.id != id);
    Ok(())
  }

  async fn list_users(&self) -> Result<Vec<RawUser>, FakeError> { Ok(Vec::new()) }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const ALICE: Uuid = Uuid::from_u128(0xa11ce);
const BOB: Uuid = Uuid::from_u128(0xb0b);

fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

fn raw(n: u128, kind: &str, hour: u32, is_read: bool) -> RawNotification {
  RawNotification {
    id: Uuid::from_u128(n),
    user_id: ALICE,
    kind: kind.into(),
    title: format!("notification {n}"),
    message: String::new(),
    is_read,
    priority: Priority::Normal,
    created_at: at(hour),
    read_at: None,
    expires_at: None,
    action_url: None,
  }
}

fn seeded() -> NotificationStore<FakeApi> {
  NotificationStore::new(FakeApi::with(vec![
    raw(1, "expense_approved", 8, false),
    raw(2, "budget_exceeded", 12, false),
    raw(3, "weekly_digest", 10, true),
    raw(4, "approval_request", 9, false),
  ]))
}

fn assert_unread_invariant(state: &NotificationState) {
  assert_eq!(
    state.unread_count(),
    state.notifications().iter().filter(|n| !n.is_read).count()
  );
}

fn ids(state: &NotificationState) -> Vec<u128> {
  state.notifications().iter().map(|n| n.id.as_u128()).collect()
}

// ─── Fetch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_sorts_newest_first_and_classifies() {
  let store = seeded();
  store.fetch_notifications(true).await;

  let state = store.snapshot();
  assert_eq!(ids(&state), vec![2, 3, 4, 1]);
  assert_eq!(state.unread_count(), 3);
  assert!(state.last_synced.is_some());
  assert!(state.error.is_none());
  assert!(!state.is_loading);

  let types: Vec<_> =
    state.notifications().iter().map(|n| n.display_type()).collect();
  assert_eq!(
    types,
    vec![
      DisplayType::Error,
      DisplayType::Info,
      DisplayType::Warning,
      DisplayType::Success,
    ]
  );
}

#[tokio::test]
async fn fetch_failure_keeps_previous_list() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let before = store.snapshot();

  store.api().server().fail_list = true;
  store.fetch_notifications(true).await;

  let after = store.snapshot();
  assert_eq!(after.notifications(), before.notifications());
  assert_eq!(after.unread_count(), before.unread_count());
  assert_eq!(after.last_synced, before.last_synced);
  assert!(after.error.as_deref().unwrap().contains("list"));
  assert!(!after.is_loading);

  store.api().server().fail_list = false;
  store.fetch_notifications(false).await;
  assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn loading_flag_is_visible_while_fetching() {
  let gate = Arc::new(Notify::new());
  let store = seeded();
  store.api().server().list_gate = Some(gate.clone());

  let mut rx = store.subscribe();
  let task = tokio::spawn({
    let store = store.clone();
    async move { store.fetch_notifications(true).await }
  });

  rx.wait_for(|s| s.is_loading).await.unwrap();
  gate.notify_one();
  task.await.unwrap();

  let state = store.snapshot();
  assert!(!state.is_loading);
  assert_eq!(state.notifications().len(), 4);
}

#[tokio::test]
async fn accessible_user_ids_filter_applies_on_fetch() {
  let mut bobs = raw(5, "report_ready", 11, false);
  bobs.user_id = BOB;
  let store = NotificationStore::new(FakeApi::with(vec![
    raw(1, "expense_approved", 8, false),
    bobs,
  ]));

  store.set_accessible_user_ids([BOB]);
  assert_eq!(store.api().server().list_calls, 0);
  assert!(store.snapshot().is_initialized);
  assert!(store.snapshot().notifications().is_empty());

  store.fetch_notifications(false).await;
  let state = store.snapshot();
  assert_eq!(ids(&state), vec![5]);
  assert_eq!(state.unread_count(), 1);
}

// ─── Unread-count polling ────────────────────────────────────────────────────

#[tokio::test]
async fn unchanged_count_does_not_refetch() {
  let store = seeded();
  store.fetch_notifications(false).await;
  assert_eq!(store.api().server().list_calls, 1);

  store.fetch_unread_count().await;
  assert_eq!(store.api().server().list_calls, 1);
}

#[tokio::test]
async fn changed_count_triggers_full_refetch() {
  let store = seeded();
  store.fetch_notifications(false).await;

  store
    .api()
    .server()
    .notifications
    .push(raw(9, "deadline_reminder", 20, false));
  store.fetch_unread_count().await;

  let state = store.snapshot();
  assert_eq!(store.api().server().list_calls, 2);
  assert_eq!(ids(&state)[0], 9);
  assert_eq!(state.unread_count(), 4);
}

#[tokio::test]
async fn count_failure_leaves_state_alone() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let before = store.snapshot();

  store.api().server().fail_count = true;
  store.fetch_unread_count().await;

  assert_eq!(store.snapshot(), before);
  assert_eq!(store.api().server().list_calls, 1);
}

// ─── Mark read ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_as_read_updates_item_and_count() {
  let store = seeded();
  store.fetch_notifications(false).await;

  store.mark_as_read(Uuid::from_u128(2)).await;

  let state = store.snapshot();
  let n = state.get(Uuid::from_u128(2)).unwrap();
  assert!(n.is_read);
  assert!(n.read_at.is_some());
  assert_eq!(state.unread_count(), 2);
}

#[tokio::test]
async fn mark_as_read_failure_is_swallowed_and_state_untouched() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let before = store.snapshot();

  store.api().server().fail_mark = true;
  store.mark_as_read(Uuid::from_u128(2)).await;

  assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn mark_all_as_read_zeroes_unread() {
  let store = seeded();
  store.fetch_notifications(false).await;

  store.mark_all_as_read().await;

  let state = store.snapshot();
  assert_eq!(state.unread_count(), 0);
  assert!(state.notifications().iter().all(|n| n.is_read));
  // The already-read item keeps its server timestamp (none).
  assert!(state.get(Uuid::from_u128(3)).unwrap().read_at.is_none());
}

#[tokio::test]
async fn mark_all_as_read_failure_is_swallowed() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let before = store.snapshot();

  store.api().server().fail_mark = true;
  store.mark_all_as_read().await;

  assert_eq!(store.snapshot(), before);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_unread_item_decrements_count() {
  let store = seeded();
  store.fetch_notifications(false).await;

  store.delete_notification(Uuid::from_u128(4)).await.unwrap();

  let state = store.snapshot();
  assert_eq!(ids(&state), vec![2, 3, 1]);
  assert_eq!(state.unread_count(), 2);
}

#[tokio::test]
async fn delete_read_item_keeps_count() {
  let store = seeded();
  store.fetch_notifications(false).await;

  store.delete_notification(Uuid::from_u128(3)).await.unwrap();

  let state = store.snapshot();
  assert_eq!(ids(&state), vec![2, 4, 1]);
  assert_eq!(state.unread_count(), 3);
}

#[tokio::test]
async fn delete_failure_propagates_and_state_untouched() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let before = store.snapshot();

  store.api().server().fail_delete = true;
  let err = store.delete_notification(Uuid::from_u128(2)).await.unwrap_err();

  assert!(matches!(err, StoreError::Api(_)));
  assert!(err.to_string().contains("delete"));
  assert_eq!(store.snapshot(), before);
}

// ─── Invariant across a sequence ─────────────────────────────────────────────

#[tokio::test]
async fn unread_count_tracks_list_through_any_sequence() {
  let store = seeded();
  assert_unread_invariant(&store.snapshot());

  store.fetch_notifications(true).await;
  assert_unread_invariant(&store.snapshot());

  store.mark_as_read(Uuid::from_u128(1)).await;
  assert_unread_invariant(&store.snapshot());

  // Marking an unknown id is harmless.
  store.mark_as_read(Uuid::from_u128(77)).await;
  assert_unread_invariant(&store.snapshot());

  store.delete_notification(Uuid::from_u128(2)).await.unwrap();
  assert_unread_invariant(&store.snapshot());

  store.api().server().notifications.push(raw(6, "sale_created", 23, false));
  store.fetch_unread_count().await;
  assert_unread_invariant(&store.snapshot());
  assert_eq!(store.unread_count(), 2);

  store.api().server().fail_delete = true;
  assert!(store.delete_notification(Uuid::from_u128(6)).await.is_err());
  assert_unread_invariant(&store.snapshot());

  store.mark_all_as_read().await;
  assert_unread_invariant(&store.snapshot());
  assert_eq!(store.unread_count(), 0);

  store.fetch_notifications(false).await;
  assert_unread_invariant(&store.snapshot());
}

// ─── Session & subscription ──────────────────────────────────────────────────

#[tokio::test]
async fn clear_resets_everything() {
  let store = seeded();
  store.set_accessible_user_ids([ALICE]);
  store.fetch_notifications(false).await;
  assert!(!store.notifications().is_empty());

  store.clear_notifications();

  assert_eq!(store.snapshot(), NotificationState::default());
}

#[tokio::test]
async fn subscribers_see_mutations() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let mut rx = store.subscribe();
  rx.borrow_and_update();

  store.mark_as_read(Uuid::from_u128(4)).await;

  assert!(rx.has_changed().unwrap());
  assert_eq!(rx.borrow_and_update().unread_count(), 2);
}

#[tokio::test]
async fn poller_picks_up_new_notifications() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let mut rx = store.subscribe();

  let poller = spawn_poller(store.clone(), Duration::from_millis(10));
  store
    .api()
    .server()
    .notifications
    .push(raw(8, "inventory_low", 22, false));

  tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.unread_count() == 4))
    .await
    .expect("poller resynced")
    .unwrap();
  assert_eq!(ids(&store.snapshot())[0], 8);

  poller.stop();
}

#[tokio::test]
async fn zero_period_poller_keeps_running() {
  let store = seeded();
  store.fetch_notifications(false).await;
  let mut rx = store.subscribe();

  let _poller = spawn_poller(store.clone(), Duration::ZERO);
  tokio::time::sleep(Duration::from_millis(20)).await;
  store
    .api()
    .server()
    .notifications
    .push(raw(9, "budget_exceeded", 23, false));

  tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.unread_count() == 4))
    .await
    .expect("zero-period poller still resyncs")
    .unwrap();
  assert_eq!(ids(&store.snapshot())[0], 9);
}
