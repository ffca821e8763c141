//! Async HTTP client wrapping the finance JSON API.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tally_core::{
  api::NotificationApi,
  notification::{RawNotification, UnreadCount},
  role::RawUser,
};
use thiserror::Error;
use uuid::Uuid;

/// Connection settings for the finance API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token; requests go out unauthenticated when `None`.
  pub token:    Option<String>,
  pub timeout:  Duration,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("{method} {path} failed: {source}")]
  Http {
    method: Method,
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{method} {path} → {status}")]
  Status {
    method: Method,
    path:   String,
    status: StatusCode,
  },

  #[error("deserialising {path}: {source}")]
  Decode {
    path:   String,
    #[source]
    source: reqwest::Error,
  },
}

/// Async HTTP client for the finance REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(ClientError::Build)?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn send(&self, method: Method, path: &str) -> Result<Response, ClientError> {
    let mut req = self.client.request(method.clone(), self.url(path));
    if let Some(token) = &self.config.token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await.map_err(|source| ClientError::Http {
      method: method.clone(),
      path: path.to_string(),
      source,
    })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(ClientError::Status { method, path: path.to_string(), status });
    }
    Ok(resp)
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
    self
      .send(Method::GET, path)
      .await?
      .json()
      .await
      .map_err(|source| ClientError::Decode { path: path.to_string(), source })
  }
}

impl NotificationApi for ApiClient {
  type Error = ClientError;

  // ── Notifications ─────────────────────────────────────────────────────────

  /// `GET /api/notifications`
  async fn list_notifications(&self) -> Result<Vec<RawNotification>, ClientError> {
    self.get_json("/notifications").await
  }

  /// `GET /api/notifications/unread-count`
  async fn unread_count(&self) -> Result<UnreadCount, ClientError> {
    self.get_json("/notifications/unread-count").await
  }

  /// `PUT /api/notifications/<id>/read`
  async fn mark_notification_as_read(&self, id: Uuid) -> Result<(), ClientError> {
    self
      .send(Method::PUT, &format!("/notifications/{id}/read"))
      .await
      .map(drop)
  }

  /// `PUT /api/notifications/read-all`
  async fn mark_all_notifications_as_read(&self) -> Result<(), ClientError> {
    self.send(Method::PUT, "/notifications/read-all").await.map(drop)
  }

  /// `DELETE /api/notifications/<id>`
  async fn delete_notification(&self, id: Uuid) -> Result<(), ClientError> {
    self
      .send(Method::DELETE, &format!("/notifications/{id}"))
      .await
      .map(drop)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `GET /api/users`
  async fn list_users(&self) -> Result<Vec<RawUser>, ClientError> {
    self.get_json("/users").await
  }
}
