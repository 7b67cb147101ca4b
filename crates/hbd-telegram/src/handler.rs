//! Answering chat commands.
//!
//! Every command, `/help` included, is reserved for registered users. Each
//! message gets exactly one reply in the chat it came from.

use std::sync::Arc;

use hbd_core::{
  gateway::MessagingGateway,
  store::{SubscriptionStore, UserStore},
  user::{Identity, MonthDay},
  Error,
};
use hbd_notify::{SubscriptionManager, UserService};
use tracing::{debug, error, instrument};

use crate::{
  command::{self, Command, Target},
  types::Message,
};

// ─── Replies ─────────────────────────────────────────────────────────────────

pub const HELP_TEXT: &str = "You can use these commands:
/subscribeTo @username or telegram_id: subscribe to a user's birthday
/unSubscribeFrom @username or telegram_id: unsubscribe from a user
/subscribeToNotifications true or false: turn your birthday notifications on or off
/users: list users you can subscribe to";

pub const NOT_REGISTERED: &str = "You are not register in this service";
pub const INTERNAL_ERROR: &str = "internal server error";
pub const UNKNOWN_COMMAND: &str =
  "unknown command, please send /help to get a list of commands";

// ─── Handler ─────────────────────────────────────────────────────────────────

pub struct CommandHandler<S, G> {
  users:         UserService<S>,
  subscriptions: SubscriptionManager<S>,
  gateway:       Arc<G>,
}

impl<S, G> CommandHandler<S, G>
where
  S: UserStore + SubscriptionStore,
  G: MessagingGateway,
{
  pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
    Self {
      users: UserService::new(Arc::clone(&store)),
      subscriptions: SubscriptionManager::new(store),
      gateway,
    }
  }

  /// Handle one incoming message. Anything that is not a command from a
  /// known sender is ignored silently.
  #[instrument(skip_all, fields(message_id = message.message_id))]
  pub async fn handle(&self, message: &Message) {
    let (Some(text), Some(sender)) = (message.text.as_deref(), &message.from) else {
      return;
    };
    let Some(parsed) = command::parse(text) else {
      return;
    };

    let reply = match self.users.find(sender.id).await {
      Ok(_) => match parsed {
        Ok(command) => {
          debug!(sender = %sender.id, ?command, "handling command");
          self.execute(sender.id, command).await
        }
        Err(e) => e.to_string(),
      },
      Err(e) if e.is_not_found() => NOT_REGISTERED.to_owned(),
      Err(e) => {
        error!(sender = %sender.id, error = %e, "could not look up sender");
        INTERNAL_ERROR.to_owned()
      }
    };

    self.gateway.send_message(message.chat.id, &reply).await;
  }

  async fn execute(&self, sender: Identity, command: Command) -> String {
    match command {
      Command::Help => HELP_TEXT.to_owned(),
      Command::SubscribeTo(target) => self.subscribe(sender, target).await,
      Command::UnsubscribeFrom(target) => self.unsubscribe(sender, target).await,
      Command::SetNotifications(notify) => {
        match self.users.set_notify(sender, notify).await {
          Ok(_) => format!("success, notification change to {notify}"),
          Err(e) => {
            error!(%sender, error = %e, "could not change notification flag");
            "couldn't change notification, try again later".to_owned()
          }
        }
      }
      Command::Users => self.list_candidates(sender).await,
      Command::Unknown(name) => {
        debug!(%sender, %name, "unknown command");
        UNKNOWN_COMMAND.to_owned()
      }
    }
  }

  /// Resolve a target to an identity, or produce the reply explaining why
  /// not.
  async fn resolve(&self, target: Target) -> Result<Identity, String> {
    match target {
      Target::Identity(identity) => Ok(identity),
      Target::Handle(handle) => match self.users.identity_for_handle(&handle).await {
        Ok(identity) => Ok(identity),
        Err(e) if e.is_not_found() => Err(format!("user @{handle} not register in service")),
        Err(e) => {
          error!(%handle, error = %e, "could not resolve handle");
          Err(INTERNAL_ERROR.to_owned())
        }
      },
    }
  }

  async fn subscribe(&self, sender: Identity, target: Target) -> String {
    let target = match self.resolve(target).await {
      Ok(identity) => identity,
      Err(reply) => return reply,
    };

    match self.subscriptions.subscribe(sender, target).await {
      Ok(_) => "success, you are subscribed".to_owned(),
      Err(Error::AlreadyExists(_)) => "you are already subscribed to user".to_owned(),
      Err(Error::SelfSubscription) => "you can't subscribe to yourself".to_owned(),
      Err(Error::NotFound(_)) => "user not register in service".to_owned(),
      Err(e) => {
        error!(%sender, %target, error = %e, "could not subscribe");
        INTERNAL_ERROR.to_owned()
      }
    }
  }

  async fn unsubscribe(&self, sender: Identity, target: Target) -> String {
    let target = match self.resolve(target).await {
      Ok(identity) => identity,
      Err(reply) => return reply,
    };

    match self.subscriptions.unsubscribe(sender, target).await {
      Ok(()) => "success, subscription removed".to_owned(),
      Err(e) if e.is_not_found() => "you are not subscribe for this user".to_owned(),
      Err(e) => {
        error!(%sender, %target, error = %e, "could not unsubscribe");
        INTERNAL_ERROR.to_owned()
      }
    }
  }

  async fn list_candidates(&self, sender: Identity) -> String {
    let users = match self.users.candidates(sender).await {
      Ok(users) => users,
      Err(e) => {
        error!(%sender, error = %e, "could not list candidates");
        return INTERNAL_ERROR.to_owned();
      }
    };
    if users.is_empty() {
      return "there is nobody else to subscribe to yet".to_owned();
    }

    let lines: Vec<String> = users
      .iter()
      .map(|u| {
        format!("{} ({}), birthday {}", u.mention(), u.identity, MonthDay::of(u.birthday))
      })
      .collect();
    format!("users you can subscribe to:\n{}", lines.join("\n"))
  }
}
