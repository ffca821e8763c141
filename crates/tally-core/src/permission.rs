//! Display-time permission gating.
//!
//! The capability matrix belongs to the server's authorization model; the
//! client receives it as configuration ([`PermissionMatrix`]) and only ever
//! answers "render or fall back". Every doubt resolves to deny: no user, an
//! undeclared capability, or a missing grant.

use std::{
  collections::{BTreeMap, HashMap},
  fmt,
  str::FromStr,
  sync::Arc,
};

use serde::Deserialize;
use tracing::debug;

use crate::{
  Error, Result,
  role::{StoreUser, UserType},
};

const COMPONENT_PREFIX: &str = "component";
const WILDCARD: &str = "*";

// ─── Capability ──────────────────────────────────────────────────────────────

/// Something protected UI requires before it renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
  /// An action on a resource, e.g. `expenses:approve`.
  Resource { resource: String, action: String },
  /// A named UI component, e.g. `component:budget_editor`.
  Component(String),
}

impl Capability {
  pub fn resource(resource: &str, action: &str) -> Self {
    Self::Resource {
      resource: resource.to_lowercase(),
      action:   action.to_lowercase(),
    }
  }

  pub fn component(id: &str) -> Self { Self::Component(id.to_lowercase()) }

  /// Whether `grant` (already lowercased) covers this capability.
  fn granted_by(&self, grant: &str) -> bool {
    if grant == WILDCARD {
      return true;
    }
    let Some((head, tail)) = grant.split_once(':') else {
      return false;
    };
    match self {
      Self::Component(id) => {
        head == COMPONENT_PREFIX && (tail == WILDCARD || tail == id)
      }
      Self::Resource { resource, action } => {
        head == resource && (tail == WILDCARD || tail == action)
      }
    }
  }
}

impl FromStr for Capability {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidCapability(s.to_string());
    let (head, tail) = s.trim().split_once(':').ok_or_else(invalid)?;
    if head.is_empty() || tail.is_empty() || tail.contains(':') {
      return Err(invalid());
    }
    if head.eq_ignore_ascii_case(COMPONENT_PREFIX) {
      Ok(Self::component(tail))
    } else {
      Ok(Self::resource(head, tail))
    }
  }
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Resource { resource, action } => write!(f, "{resource}:{action}"),
      Self::Component(id) => write!(f, "{COMPONENT_PREFIX}:{id}"),
    }
  }
}

// ─── Matrix ──────────────────────────────────────────────────────────────────

/// The capability matrix, as delivered by configuration.
///
/// ```toml
/// components = ["budget_editor", "admin_panel"]
///
/// [resources]
/// expenses = ["read", "create", "approve"]
///
/// [grants]
/// ADMIN = ["*"]
/// ACCOUNTANT = ["expenses:*", "component:budget_editor"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionMatrix {
  /// Declared resources and the actions each supports.
  #[serde(default)]
  pub resources:  BTreeMap<String, Vec<String>>,
  /// Declared component ids.
  #[serde(default)]
  pub components: Vec<String>,
  /// Grant strings per user type.
  #[serde(default)]
  pub grants:     HashMap<UserType, Vec<String>>,
}

impl PermissionMatrix {
  pub fn from_toml_str(raw: &str) -> Result<Self> { Ok(toml::from_str(raw)?) }

  /// Whether the matrix knows about `capability` at all.
  pub fn declares(&self, capability: &Capability) -> bool {
    match capability {
      Capability::Resource { resource, action } => self
        .resources
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(resource))
        .is_some_and(|(_, actions)| {
          actions.iter().any(|a| a.eq_ignore_ascii_case(action))
        }),
      Capability::Component(id) => {
        self.components.iter().any(|c| c.eq_ignore_ascii_case(id))
      }
    }
  }

  pub fn grants_for(&self, user_type: UserType) -> &[String] {
    self.grants.get(&user_type).map(Vec::as_slice).unwrap_or_default()
  }

  /// Declared, and covered by one of `user_type`'s grants.
  pub fn allows(&self, user_type: UserType, capability: &Capability) -> bool {
    self.declares(capability)
      && self
        .grants_for(user_type)
        .iter()
        .any(|g| capability.granted_by(&g.to_lowercase()))
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Decides whether protected output is produced. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
  matrix: Arc<PermissionMatrix>,
}

impl PermissionGate {
  pub fn new(matrix: PermissionMatrix) -> Self {
    Self { matrix: Arc::new(matrix) }
  }

  /// `false` when there is no user, the capability is undeclared, or no
  /// grant covers it.
  pub fn evaluate(&self, user: Option<UserType>, required: &Capability) -> bool {
    let Some(user_type) = user else {
      debug!(%required, "permission denied: no current user");
      return false;
    };
    if !self.matrix.declares(required) {
      debug!(%required, "permission denied: capability not declared");
      return false;
    }
    let allowed = self.matrix.allows(user_type, required);
    if !allowed {
      debug!(%required, %user_type, "permission denied: no matching grant");
    }
    allowed
  }

  pub fn evaluate_user(
    &self,
    user: Option<&StoreUser>,
    required: &Capability,
  ) -> bool {
    self.evaluate(user.map(|u| u.role), required)
  }

  /// Produce `children()` when allowed, `fallback()` otherwise.
  pub fn render<T>(
    &self,
    user: Option<UserType>,
    required: &Capability,
    children: impl FnOnce() -> T,
    fallback: impl FnOnce() -> T,
  ) -> T {
    if self.evaluate(user, required) { children() } else { fallback() }
  }
}
