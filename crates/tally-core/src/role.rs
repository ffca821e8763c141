//! Coarse user categories and the mapping from backend role strings.
//!
//! The server's authorization model is authoritative. The client only needs a
//! coarse [`UserType`] to decide what to show, and it must never show more
//! than the role allows: anything unrecognised maps to [`UserType::Employee`].

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

// ─── UserType ────────────────────────────────────────────────────────────────

/// Client-side role category used for display gating.
///
/// Ordered by privilege: Admin > FinanceAdmin > Accountant > Employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
  #[serde(rename = "ADMIN", alias = "admin")]
  Admin,
  #[serde(rename = "FINANCE_ADMIN", alias = "finance_admin")]
  FinanceAdmin,
  #[serde(rename = "ACCOUNTANT", alias = "accountant")]
  Accountant,
  #[serde(rename = "EMPLOYEE", alias = "employee")]
  Employee,
}

impl UserType {
  pub const ALL: [UserType; 4] =
    [Self::Admin, Self::FinanceAdmin, Self::Accountant, Self::Employee];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "ADMIN",
      Self::FinanceAdmin => "FINANCE_ADMIN",
      Self::Accountant => "ACCOUNTANT",
      Self::Employee => "EMPLOYEE",
    }
  }

  /// The role name the client-side user record carries.
  pub fn store_role(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::FinanceAdmin => "finance_manager",
      Self::Accountant => "accountant",
      Self::Employee => "employee",
    }
  }

  pub fn privilege_level(&self) -> u8 {
    match self {
      Self::Admin => 4,
      Self::FinanceAdmin => 3,
      Self::Accountant => 2,
      Self::Employee => 1,
    }
  }

  pub fn has_at_least(&self, other: UserType) -> bool {
    self.privilege_level() >= other.privilege_level()
  }
}

impl std::fmt::Display for UserType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}

// ─── Mapper ──────────────────────────────────────────────────────────────────

/// Map a raw backend role to a [`UserType`]. Case-insensitive and total.
///
/// | Backend role                 | UserType       |
/// |------------------------------|----------------|
/// | `admin`, `super_admin`       | `Admin`        |
/// | `manager`, `finance_manager` | `FinanceAdmin` |
/// | `accountant`                 | `Accountant`   |
/// | anything else, or absent     | `Employee`     |
pub fn map_role_to_user_type(role: Option<&str>) -> UserType {
  let Some(role) = role else {
    return UserType::Employee;
  };
  match role.to_lowercase().as_str() {
    "admin" | "super_admin" => UserType::Admin,
    "manager" | "finance_manager" => UserType::FinanceAdmin,
    "accountant" => UserType::Accountant,
    "employee" => UserType::Employee,
    other => {
      debug!(role = other, "unrecognised role, treating as employee");
      UserType::Employee
    }
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// A user as returned by the users endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
  pub id:        Uuid,
  #[serde(default)]
  pub email:     String,
  #[serde(default)]
  pub full_name: Option<String>,
  /// Backend role string, in whatever vocabulary the server uses.
  #[serde(default)]
  pub role:      Option<String>,
}

/// A user with its role already mapped at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreUser {
  pub id:    Uuid,
  pub email: String,
  /// `full_name` when present, the email address otherwise.
  pub name:  String,
  pub role:  UserType,
}

impl From<RawUser> for StoreUser {
  fn from(raw: RawUser) -> Self {
    let role = map_role_to_user_type(raw.role.as_deref());
    let name = raw
      .full_name
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| raw.email.clone());
    Self { id: raw.id, email: raw.email, name, role }
  }
}
