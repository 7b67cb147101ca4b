//! Long-polling `getUpdates` and dispatching each message.

use std::{sync::Arc, time::Duration};

use hbd_core::store::{SubscriptionStore, UserStore};
use tokio::task::JoinHandle;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{info, warn};

use crate::{CommandHandler, TelegramClient};

/// Pause after a failed poll before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct UpdateRouter<S> {
  client:       Arc<TelegramClient>,
  handler:      Arc<CommandHandler<S, TelegramClient>>,
  poll_timeout: u64,
}

impl<S> UpdateRouter<S>
where
  S: UserStore + SubscriptionStore + 'static,
{
  pub fn new(
    client: Arc<TelegramClient>,
    handler: Arc<CommandHandler<S, TelegramClient>>,
    poll_timeout_secs: u64,
  ) -> Self {
    Self { client, handler, poll_timeout: poll_timeout_secs }
  }

  /// Start polling on `tracker`. Each message is handled in its own task on
  /// the same tracker, so a slow reply never holds up the poll loop.
  pub fn spawn(self, cancel: CancellationToken, tracker: TaskTracker) -> JoinHandle<()> {
    let handlers = tracker.clone();
    tracker.spawn(self.run(cancel, handlers))
  }

  async fn run(self, cancel: CancellationToken, tracker: TaskTracker) {
    info!(timeout_secs = self.poll_timeout, "update router started");
    let mut offset = 0;

    loop {
      let polled = tokio::select! {
        biased;
        _ = cancel.cancelled() => break,
        polled = self.client.get_updates(offset, self.poll_timeout) => polled,
      };

      let updates = match polled {
        Ok(updates) => updates,
        Err(e) => {
          warn!(error = %e, "getUpdates failed, retrying");
          tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(RETRY_DELAY) => {}
          }
          continue;
        }
      };

      for update in updates {
        offset = offset.max(update.update_id + 1);
        let Some(message) = update.message else {
          continue;
        };
        let handler = Arc::clone(&self.handler);
        tracker.spawn(async move { handler.handle(&message).await });
      }
    }

    info!("update router shutting down");
  }
}
