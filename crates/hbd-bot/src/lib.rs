//! Command line and process configuration for the `hbd-bot` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use config::{Environment, File, FileFormat, Source};
use hbd_core::{user::NewUser, Error};
use hbd_notify::NotifyConfig;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

// ─── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Birthday notification bot")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, env = "CONFIG_PATH", default_value = "config.toml")]
  pub config: PathBuf,
}

// ─── Environment ─────────────────────────────────────────────────────────────

/// Deployment environment; picks the default log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
  #[default]
  Dev,
  Prod,
}

impl Env {
  /// Used unless `RUST_LOG` says otherwise.
  pub fn default_level(self) -> LevelFilter {
    match self {
      Self::Dev => LevelFilter::DEBUG,
      Self::Prod => LevelFilter::WARN,
    }
  }
}

// ─── Config ──────────────────────────────────────────────────────────────────

fn default_store_path() -> PathBuf { PathBuf::from("hbd.sqlite") }

fn default_poll_timeout_secs() -> u64 { 60 }

/// Top-level configuration, read from `config.toml` and `HBD_*` environment
/// variables (nested keys joined with `__`, as in
/// `HBD_NOTIFY__NOTIFY_HOUR`).
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  #[serde(default)]
  pub env:               Env,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  pub telegram_token:    String,
  /// Long-poll timeout for `getUpdates`.
  #[serde(default = "default_poll_timeout_secs")]
  pub poll_timeout_secs: u64,
  pub notify:            NotifyConfig,
  /// Seed users, synced into the store at startup.
  #[serde(default)]
  pub users:             Vec<NewUser>,
}

impl BotConfig {
  /// Load from `path` (which may be missing) layered under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_sources(File::from(path).required(false), environment())
  }

  /// Load from an in-memory TOML document layered under the environment.
  pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
    Self::from_sources(File::from_str(raw, FileFormat::Toml), environment())
  }

  fn from_sources(
    file: impl Source + Send + Sync + 'static,
    env: Environment,
  ) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(file)
      .add_source(env)
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise BotConfig")
  }

  pub fn validate(&self) -> hbd_core::Result<()> {
    if self.telegram_token.trim().is_empty() {
      return Err(Error::InvalidConfig("telegram_token must be set".into()));
    }
    self.notify.validate()
  }
}

/// `HBD_TELEGRAM_TOKEN`, `HBD_NOTIFY__NOTIFY_HOUR` and so on.
fn environment() -> Environment {
  Environment::with_prefix("HBD")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
