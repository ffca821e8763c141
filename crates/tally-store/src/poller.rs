//! Background unread-count polling.

use std::time::Duration;

use tally_core::api::NotificationApi;
use tokio::{
  task::JoinHandle,
  time::{MissedTickBehavior, interval},
};
use tracing::{debug, warn};

use crate::NotificationStore;

/// Shortest period a poller runs at. `tokio::time::interval` rejects zero.
pub const MIN_POLL_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running poll task. The task stops when the handle is dropped.
#[derive(Debug)]
pub struct Poller {
  handle: JoinHandle<()>,
}

impl Poller {
  /// Same as dropping the handle.
  pub fn stop(self) {}
}

impl Drop for Poller {
  fn drop(&mut self) { self.handle.abort(); }
}

/// Run [`NotificationStore::fetch_unread_count`] every `period`, starting
/// immediately. A full refetch only happens when the count moves.
///
/// Periods below [`MIN_POLL_PERIOD`] are raised to it.
pub fn spawn_poller<A>(store: NotificationStore<A>, period: Duration) -> Poller
where
  A: NotificationApi + 'static,
{
  if period < MIN_POLL_PERIOD {
    warn!(?period, min = ?MIN_POLL_PERIOD, "poll period too short, clamping");
  }
  let period = period.max(MIN_POLL_PERIOD);
  let handle = tokio::spawn(async move {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      debug!("polling unread count");
      store.fetch_unread_count().await;
    }
  });
  Poller { handle }
}
