//! Display-severity classification for notifications.
//!
//! The server tags notifications with a free-form `type` string. The UI shows
//! each one in one of four severities. The mapping is an ordered rule table,
//! evaluated top to bottom; the first rule that matches decides. Adding a new
//! notification type means adding a row to [`RULES`], not new control flow.

use serde::{Deserialize, Serialize};

// ─── Severity ────────────────────────────────────────────────────────────────

/// The four-way bucket a notification is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
  Success,
  Error,
  Warning,
  Info,
}

impl DisplayType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Success => "success",
      Self::Error => "error",
      Self::Warning => "warning",
      Self::Info => "info",
    }
  }
}

impl std::fmt::Display for DisplayType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// A predicate over a lowercased `(type, title, message)` triple.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
  /// `type` equals one of the tags.
  TypeIs(&'static [&'static str]),
  /// `type` contains one of the fragments.
  TypeContains(&'static [&'static str]),
  /// `type` equals `kind` and the title or message contains one of `needles`.
  Mentions {
    kind:    &'static str,
    needles: &'static [&'static str],
  },
}

impl Matcher {
  /// All arguments must already be lowercased.
  pub fn matches(&self, kind: &str, title: &str, message: &str) -> bool {
    match self {
      Self::TypeIs(tags) => tags.contains(&kind),
      Self::TypeContains(fragments) => fragments.iter().any(|f| kind.contains(f)),
      Self::Mentions { kind: k, needles } => {
        *k == kind
          && needles
            .iter()
            .any(|n| title.contains(n) || message.contains(n))
      }
    }
  }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
  pub matcher: Matcher,
  pub display: DisplayType,
}

const fn rule(matcher: Matcher, display: DisplayType) -> Rule {
  Rule { matcher, display }
}

/// The classification table, in evaluation order.
///
/// The `system_alert` text rules sit ahead of the `alert` substring rule so a
/// system alert is judged on its wording first. The `approval_decision` +
/// "approved" row is already covered by the exact-tag row above it and is
/// kept so the table reads the same as the server's vocabulary docs.
pub const RULES: &[Rule] = &[
  // ── success ───────────────────────────────────────────────────────────
  rule(
    Matcher::TypeIs(&[
      "approval_decision",
      "expense_approved",
      "revenue_approved",
      "sale_posted",
      "forecast_created",
      "ml_training_complete",
      "inventory_created",
      "inventory_updated",
      "report_ready",
    ]),
    DisplayType::Success,
  ),
  rule(
    Matcher::TypeContains(&[
      "approved",
      "completed",
      "confirmed",
      "posted",
      "success",
    ]),
    DisplayType::Success,
  ),
  rule(
    Matcher::Mentions {
      kind:    "system_alert",
      needles: &["welcome", "user created"],
    },
    DisplayType::Success,
  ),
  rule(
    Matcher::Mentions {
      kind:    "approval_decision",
      needles: &["approved"],
    },
    DisplayType::Success,
  ),
  // ── error ─────────────────────────────────────────────────────────────
  rule(
    Matcher::TypeIs(&["budget_exceeded", "expense_rejected", "revenue_rejected"]),
    DisplayType::Error,
  ),
  rule(
    Matcher::Mentions {
      kind:    "approval_decision",
      needles: &["rejected"],
    },
    DisplayType::Error,
  ),
  // ── warning (system alert wording, ahead of the `alert` fragment) ─────
  rule(
    Matcher::Mentions {
      kind:    "system_alert",
      needles: &["approval required", "pending approval"],
    },
    DisplayType::Warning,
  ),
  rule(
    Matcher::TypeContains(&[
      "rejected",
      "error",
      "failed",
      "cancelled",
      "denied",
      "alert",
    ]),
    DisplayType::Error,
  ),
  // ── warning ───────────────────────────────────────────────────────────
  rule(
    Matcher::TypeIs(&[
      "approval_request",
      "deadline_reminder",
      "inventory_low",
      "expense_created",
      "revenue_created",
      "sale_created",
    ]),
    DisplayType::Warning,
  ),
  rule(
    Matcher::TypeContains(&["pending", "reminder", "required", "warning"]),
    DisplayType::Warning,
  ),
];

// ─── Classifier ──────────────────────────────────────────────────────────────

/// Map a notification's `type`, title and message to a [`DisplayType`].
///
/// Total: anything no rule recognises is [`DisplayType::Info`]. Matching is
/// case-insensitive on all three inputs.
pub fn classify(
  kind: &str,
  title: Option<&str>,
  message: Option<&str>,
) -> DisplayType {
  classify_with(RULES, kind, title, message)
}

/// [`classify`] against a caller-supplied table.
pub fn classify_with(
  rules: &[Rule],
  kind: &str,
  title: Option<&str>,
  message: Option<&str>,
) -> DisplayType {
  let kind = kind.to_lowercase();
  let title = title.unwrap_or_default().to_lowercase();
  let message = message.unwrap_or_default().to_lowercase();

  rules
    .iter()
    .find(|r| r.matcher.matches(&kind, &title, &message))
    .map_or(DisplayType::Info, |r| r.display)
}
