//! Error type for `tally-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("notification api error: {0}")]
  Api(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
  pub(crate) fn api<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Api(Box::new(err))
  }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
