//! `hbd-bot`: the birthday notification service.
//!
//! Reads `config.toml` (or the path given with `--config` or `CONFIG_PATH`),
//! syncs the configured users into SQLite, then runs the daily birthday
//! scheduler and the Telegram command router until Ctrl-C.
//!
//! ```
//! hbd-bot --config /etc/hbd/config.toml
//! ```

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use hbd_bot::{BotConfig, Cli, Env, expand_tilde};
use hbd_notify::{
  BirthdayCycle, Clock, DailyScheduler, StaticUserSource, SystemClock, UserService,
};
use hbd_store_sqlite::SqliteStore;
use hbd_telegram::{CommandHandler, TelegramClient, UpdateRouter};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(env: Env) {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(env.default_level().into())
        .from_env_lossy(),
    )
    .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // The log level depends on the config, so tracing starts after loading it.
  let cfg = BotConfig::load(&cli.config)?;
  init_tracing(cfg.env);
  cfg.validate().context("invalid configuration")?;
  info!(env = ?cfg.env, config = %cli.config.display(), "configuration loaded");

  let notify_at = cfg.notify.notify_at()?;
  let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(cfg.notify.utc_offset()?));

  // Open SQLite store.
  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  let added = UserService::new(Arc::clone(&store))
    .sync_users(&StaticUserSource::new(cfg.users.clone()))
    .await
    .context("failed to sync users")?;
  info!(added, "user directory synced");

  let client = TelegramClient::new(&cfg.telegram_token)
    .context("failed to build Telegram client")?;
  let client = Arc::new(client);

  let cancel = CancellationToken::new();
  let tracker = TaskTracker::new();

  let cycle = Arc::new(BirthdayCycle::new(
    Arc::clone(&store),
    Arc::clone(&client),
    Arc::clone(&clock),
    &cfg.notify,
  ));
  DailyScheduler::new(cycle, notify_at, clock).spawn(cancel.clone(), tracker.clone());

  let handler = Arc::new(CommandHandler::new(store, Arc::clone(&client)));
  UpdateRouter::new(client, handler, cfg.poll_timeout_secs)
    .spawn(cancel.clone(), tracker.clone());

  info!("hbd-bot running");
  tokio::signal::ctrl_c()
    .await
    .context("failed to listen for Ctrl-C")?;

  // In-flight cycles cut their grace period short and evict before exiting.
  info!("shutting down");
  cancel.cancel();
  tracker.close();
  tracker.wait().await;
  info!("stopped");

  Ok(())
}
