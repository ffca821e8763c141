//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid capability {0:?}: expected `resource:action` or `component:<id>`")]
  InvalidCapability(String),

  #[error("invalid permission matrix: {0}")]
  Matrix(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
