//! Plain-text rendering of store state.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use tally_core::{
  classify::DisplayType,
  notification::Notification,
  role::StoreUser,
};
use tally_store::NotificationState;

fn badge(display: DisplayType) -> &'static str {
  match display {
    DisplayType::Success => "[ok]  ",
    DisplayType::Error => "[err] ",
    DisplayType::Warning => "[warn]",
    DisplayType::Info => "[info]",
  }
}

/// One notification. Items whose `expires_at` has passed by `now` are tagged.
pub fn notification_line(n: &Notification, now: DateTime<Utc>) -> String {
  let marker = if n.is_read { ' ' } else { '*' };
  let when = n.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
  let mut line = format!(
    "{marker} {} {when}  {}  {}",
    badge(n.display_type()),
    n.id,
    n.title
  );
  if !n.message.is_empty() {
    let _ = write!(line, ": {}", n.message);
  }
  if let Some(url) = &n.action_url {
    let _ = write!(line, " <{url}>");
  }
  if n.is_expired(now) {
    line.push_str(" (expired)");
  }
  line
}

/// The notification panel: header with unread count, then one line per item.
pub fn panel(
  state: &NotificationState,
  unread_only: bool,
  now: DateTime<Utc>,
) -> String {
  let mut out = format!(
    "{} notifications, {} unread\n",
    state.notifications().len(),
    state.unread_count()
  );
  if let Some(error) = &state.error {
    let _ = writeln!(out, "! last sync failed: {error}");
  }
  for n in state.notifications() {
    if unread_only && n.is_read {
      continue;
    }
    let _ = writeln!(out, "{}", notification_line(n, now));
  }
  out
}

pub fn user_line(user: &StoreUser) -> String {
  format!(
    "{}  {:<14} {:<16} {}  <{}>",
    user.id,
    user.role,
    user.role.store_role(),
    user.name,
    user.email
  )
}
