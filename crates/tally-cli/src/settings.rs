//! Layered configuration: TOML file, then `TALLY_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;
use tally_core::permission::PermissionMatrix;
use uuid::Uuid;

/// Runtime settings, deserialised from `tally.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_base_url")]
  pub base_url:           String,
  #[serde(default)]
  pub token:              Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:       u64,
  #[serde(default = "default_poll_interval_secs")]
  pub poll_interval_secs: u64,
  /// Only notifications owned by these users are shown. Empty shows all.
  #[serde(default)]
  pub user_ids:           Vec<Uuid>,
  /// TOML file holding the [`PermissionMatrix`].
  #[serde(default)]
  pub permissions_file:   Option<PathBuf>,
}

fn default_base_url() -> String { "http://localhost:8000".to_string() }

fn default_timeout_secs() -> u64 { 30 }

fn default_poll_interval_secs() -> u64 { 30 }

impl Settings {
  /// Read `path` (if it exists) and overlay `TALLY_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with_env(path, None)
  }

  /// As [`Settings::load`], reading variables from `env` instead of the
  /// process environment when given. `TALLY_USER_IDS` is comma-separated.
  pub(crate) fn load_with_env(
    path: &Path,
    env: Option<config::Map<String, String>>,
  ) -> anyhow::Result<Self> {
    let environment = config::Environment::with_prefix("TALLY")
      .try_parsing(true)
      .list_separator(",")
      .with_list_parse_key("user_ids")
      .source(env);

    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(environment)
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs.max(1))
  }

  /// The configured matrix, or an empty one (which denies everything).
  pub fn permission_matrix(&self) -> anyhow::Result<PermissionMatrix> {
    let Some(path) = &self.permissions_file else {
      tracing::warn!("no permissions_file configured; every capability is denied");
      return Ok(PermissionMatrix::default());
    };
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading permissions file {}", path.display()))?;
    PermissionMatrix::from_toml_str(&raw)
      .with_context(|| format!("parsing permissions file {}", path.display()))
  }
}
