//! `tally`: command-line front end for the finance notification core.
//!
//! # Usage
//!
//! ```text
//! tally --url http://localhost:8000 --token $TOKEN notifications --unread
//! tally --config ~/.config/tally/tally.toml watch
//! tally --config tally.toml can --role accountant expenses:approve
//! ```

mod client;
mod render;
mod settings;


use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use settings::Settings;
use tally_core::{
  api::NotificationApi,
  classify::classify,
  permission::{Capability, PermissionGate},
  role::{StoreUser, map_role_to_user_type},
};
use tally_store::{NotificationStore, spawn_poller};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Finance notifications and access checks")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "tally.toml")]
  config: PathBuf,

  /// Base URL of the finance API (overrides the config file).
  #[arg(long)]
  url: Option<String>,

  /// Bearer token (overrides the config file).
  #[arg(long)]
  token: Option<String>,

  /// Only show notifications owned by this user. Repeatable.
  #[arg(long = "user-id", value_name = "UUID")]
  user_ids: Vec<Uuid>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  #[command(flatten)]
  Notify(NotifyCommand),
  /// List users with their mapped user type.
  Users {
    /// Only users at or above this backend role, e.g. `accountant`.
    #[arg(long, value_name = "ROLE")]
    at_least: Option<String>,
  },
  /// Check whether a backend role may use a capability.
  Can {
    /// Backend role string, e.g. `finance_manager`. Omit for no user.
    #[arg(long)]
    role: Option<String>,
    /// `resource:action` or `component:<id>`.
    capability: Capability,
  },
  /// Show how a notification type would be displayed.
  Classify {
    kind: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    message: Option<String>,
  },
}

/// Commands that go through the notification store.
#[derive(Subcommand, Debug)]
enum NotifyCommand {
  /// Fetch and list notifications, newest first.
  Notifications {
    /// Hide notifications that are already read.
    #[arg(long)]
    unread: bool,
  },
  /// Print the server's unread count.
  Unread,
  /// Mark one notification read.
  Read { id: Uuid },
  /// Mark every notification read.
  ReadAll,
  /// Delete one notification.
  Delete { id: Uuid },
  /// Poll for changes and reprint the panel whenever it changes.
  Watch {
    /// Poll interval in seconds (overrides the config file).
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;

  // CLI flags override the config file, which overrides defaults.
  if let Some(url) = cli.url {
    settings.base_url = url;
  }
  if cli.token.is_some() {
    settings.token = cli.token;
  }
  if !cli.user_ids.is_empty() {
    settings.user_ids = cli.user_ids;
  }

  run(cli.command, settings).await
}

async fn run(command: Command, settings: Settings) -> anyhow::Result<ExitCode> {
  match command {
    Command::Classify { kind, title, message } => {
      println!("{}", classify(&kind, title.as_deref(), message.as_deref()));
      Ok(ExitCode::SUCCESS)
    }
    Command::Can { role, capability } => {
      let gate = PermissionGate::new(settings.permission_matrix()?);
      let user = role.as_deref().map(|r| map_role_to_user_type(Some(r)));
      let who = user.map_or_else(|| "no user".to_string(), |u| u.to_string());
      let (verdict, code) = gate.render(
        user,
        &capability,
        || ("allowed", ExitCode::SUCCESS),
        || ("denied", ExitCode::FAILURE),
      );
      println!("{who}: {capability} {verdict}");
      Ok(code)
    }
    Command::Users { at_least } => {
      let min = at_least.as_deref().map(|r| map_role_to_user_type(Some(r)));
      let client = connect(&settings)?;
      let users = client.list_users().await.context("listing users")?;
      for user in users
        .into_iter()
        .map(StoreUser::from)
        .filter(|u| min.is_none_or(|min| u.role.has_at_least(min)))
      {
        println!("{}", render::user_line(&user));
      }
      Ok(ExitCode::SUCCESS)
    }
    Command::Notify(command) => {
      let store = NotificationStore::new(connect(&settings)?);
      if !settings.user_ids.is_empty() {
        store.set_accessible_user_ids(settings.user_ids.iter().copied());
      }
      notify(command, store, &settings).await
    }
  }
}

fn connect(settings: &Settings) -> anyhow::Result<ApiClient> {
  tracing::debug!(base_url = %settings.base_url, "using finance API");
  ApiClient::new(ApiConfig {
    base_url: settings.base_url.clone(),
    token:    settings.token.clone(),
    timeout:  settings.timeout(),
  })
  .context("building API client")
}

async fn notify<A>(
  command: NotifyCommand,
  store: NotificationStore<A>,
  settings: &Settings,
) -> anyhow::Result<ExitCode>
where
  A: NotificationApi + 'static,
{
  match command {
    NotifyCommand::Notifications { unread } => {
      store.fetch_notifications(true).await;
      print_panel(&store, unread)
    }
    NotifyCommand::Unread => {
      let count = store
        .api()
        .unread_count()
        .await
        .context("fetching unread count")?;
      println!("{}", count.unread_count);
      Ok(ExitCode::SUCCESS)
    }
    NotifyCommand::Read { id } => {
      store.fetch_notifications(false).await;
      store.mark_as_read(id).await;
      if store.snapshot().get(id).is_some_and(|n| !n.is_read) {
        eprintln!("notification {id} is still unread; see the log for details");
      }
      print_panel(&store, false)
    }
    NotifyCommand::ReadAll => {
      store.fetch_notifications(false).await;
      store.mark_all_as_read().await;
      print_panel(&store, false)
    }
    NotifyCommand::Delete { id } => {
      store.fetch_notifications(false).await;
      store
        .delete_notification(id)
        .await
        .with_context(|| format!("deleting notification {id}"))?;
      print_panel(&store, false)
    }
    NotifyCommand::Watch { interval } => {
      let period = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| settings.poll_interval());
      watch(store, period).await
    }
  }
}

fn print_panel<A: NotificationApi>(
  store: &NotificationStore<A>,
  unread_only: bool,
) -> anyhow::Result<ExitCode> {
  let state = store.snapshot();
  print!("{}", render::panel(&state, unread_only, Utc::now()));
  Ok(if state.error.is_some() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

// ─── Watch loop ───────────────────────────────────────────────────────────────

async fn watch<A>(store: NotificationStore<A>, period: Duration) -> anyhow::Result<ExitCode>
where
  A: NotificationApi + 'static,
{
  store.fetch_notifications(true).await;
  print_panel(&store, false)?;

  let mut changes = store.subscribe();
  let _poller = spawn_poller(store.clone(), period);
  tracing::info!(?period, "watching for notifications (ctrl-c to stop)");

  loop {
    tokio::select! {
      changed = changes.changed() => {
        changed.context("notification store closed")?;
        let state = changes.borrow_and_update().clone();
        if !state.is_loading {
          print!("{}", render::panel(&state, false, Utc::now()));
        }
      }
      signal = tokio::signal::ctrl_c() => {
        signal.context("listening for ctrl-c")?;
        break;
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}
