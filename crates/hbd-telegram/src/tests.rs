use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use hbd_core::{
  gateway::MessagingGateway,
  store::{SubscriptionStore, UserStore},
  user::{ChatId, Identity, NewUser},
};
use hbd_store_sqlite::SqliteStore;

use crate::{
  Error,
  command::{parse, Command, ParseError, Target},
  handler::{CommandHandler, HELP_TEXT, NOT_REGISTERED, UNKNOWN_COMMAND},
  types::{ApiResponse, Message, Update},
};

const ALICE: Identity = Identity(1);
const BOB: Identity = Identity(2);
const STRANGER: Identity = Identity(99);

// ─── Commands ────────────────────────────────────────────────────────────────

#[test]
fn plain_text_is_not_a_command() {
  assert_eq!(parse("hello there"), None);
  assert_eq!(parse("/"), None);
  assert_eq!(parse(""), None);
}

#[test]
fn parses_known_commands() {
  assert_eq!(parse("/help"), Some(Ok(Command::Help)));
  assert_eq!(parse("/users"), Some(Ok(Command::Users)));
  assert_eq!(
    parse("/subscribeTo @alice"),
    Some(Ok(Command::SubscribeTo(Target::Handle("alice".into()))))
  );
  assert_eq!(
    parse("/unSubscribeFrom 42"),
    Some(Ok(Command::UnsubscribeFrom(Target::Identity(Identity(42)))))
  );
  assert_eq!(
    parse("/subscribeToNotifications false"),
    Some(Ok(Command::SetNotifications(false)))
  );
}

#[test]
fn bot_suffix_is_dropped() {
  assert_eq!(parse("/help@hbd_bot"), Some(Ok(Command::Help)));
  assert_eq!(
    parse("/subscribeTo@hbd_bot  @bob "),
    Some(Ok(Command::SubscribeTo(Target::Handle("bob".into()))))
  );
}

#[test]
fn bad_arguments_are_reported() {
  assert_eq!(parse("/subscribeTo"), Some(Err(ParseError::MissingTarget)));
  assert_eq!(parse("/subscribeTo bob@x"), Some(Err(ParseError::BadHandle)));
  assert_eq!(parse("/subscribeTo @"), Some(Err(ParseError::BadHandle)));
  assert_eq!(parse("/unSubscribeFrom bob"), Some(Err(ParseError::BadTarget)));
  assert_eq!(parse("/subscribeToNotifications yes"), Some(Err(ParseError::BadFlag)));
}

#[test]
fn unknown_command_keeps_its_name() {
  assert_eq!(parse("/dance now"), Some(Ok(Command::Unknown("dance".into()))));
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[test]
fn decodes_message_update() {
  let raw = r#"{
    "update_id": 10,
    "message": {
      "message_id": 7,
      "from": { "id": 1, "is_bot": false, "first_name": "Alice", "username": "alice" },
      "chat": { "id": 1, "type": "private" },
      "date": 1718956800,
      "text": "/help"
    }
  }"#;
  let update: Update = serde_json::from_str(raw).unwrap();
  let message = update.message.unwrap();
  assert_eq!(update.update_id, 10);
  assert_eq!(message.from.unwrap().id, ALICE);
  assert_eq!(message.chat.id, ChatId(1));
  assert_eq!(message.text.as_deref(), Some("/help"));
}

#[test]
fn non_message_update_has_no_message() {
  let raw = r#"{ "update_id": 11, "edited_message": { "message_id": 1 } }"#;
  let update: Update = serde_json::from_str(raw).unwrap();
  assert!(update.message.is_none());
}

#[test]
fn api_error_envelope_becomes_error() {
  let raw = r#"{ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }"#;
  let envelope: ApiResponse<bool> = serde_json::from_str(raw).unwrap();
  match envelope.into_result("banChatMember") {
    Err(Error::Api { method, description }) => {
      assert_eq!(method, "banChatMember");
      assert!(description.contains("chat not found"));
    }
    other => panic!("unexpected {other:?}"),
  }

  let ok: ApiResponse<String> =
    serde_json::from_str(r#"{ "ok": true, "result": "https://t.me/+abc" }"#).unwrap();
  assert_eq!(ok.into_result("exportChatInviteLink").unwrap(), "https://t.me/+abc");
}

// ─── Handler ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("unused")]
struct Unused;

#[derive(Default)]
struct Replies(Mutex<Vec<(ChatId, String)>>);

impl Replies {
  fn all(&self) -> Vec<(ChatId, String)> { self.0.lock().unwrap().clone() }

  fn last(&self) -> String {
    self.0.lock().unwrap().last().map(|(_, t)| t.clone()).unwrap_or_default()
  }
}

impl MessagingGateway for Replies {
  type Error = Unused;

  async fn send_message(&self, chat: ChatId, text: &str) {
    self.0.lock().unwrap().push((chat, text.to_owned()));
  }

  async fn invite_link(&self, _: ChatId, _: &str) -> Result<String, Unused> { Err(Unused) }

  async fn admit_member(&self, _: ChatId, _: Identity) -> Result<(), Unused> { Err(Unused) }

  async fn remove_member(&self, _: ChatId, _: Identity) -> Result<(), Unused> { Err(Unused) }
}

async fn setup() -> (Arc<SqliteStore>, Arc<Replies>, CommandHandler<SqliteStore, Replies>) {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  for (name, identity, month) in [("alice", ALICE, 6), ("bob", BOB, 3)] {
    store
      .insert_user(NewUser {
        username: name.into(),
        identity,
        birthday: NaiveDate::from_ymd_opt(1990, month, 21).unwrap(),
        notify_birthday: true,
      })
      .await
      .unwrap();
  }
  let replies = Arc::new(Replies::default());
  let handler = CommandHandler::new(store.clone(), replies.clone());
  (store, replies, handler)
}

fn message(from: Identity, text: &str) -> Message {
  serde_json::from_value(serde_json::json!({
    "message_id": 1,
    "from": { "id": from.0 },
    "chat": { "id": from.0 },
    "text": text,
  }))
  .unwrap()
}

#[tokio::test]
async fn unregistered_sender_is_turned_away() {
  let (_, replies, handler) = setup().await;

  handler.handle(&message(STRANGER, "/help")).await;

  assert_eq!(replies.all(), [(ChatId(99), NOT_REGISTERED.to_owned())]);
}

#[tokio::test]
async fn non_commands_get_no_reply() {
  let (_, replies, handler) = setup().await;

  handler.handle(&message(ALICE, "hi!")).await;

  assert!(replies.all().is_empty());
}

#[tokio::test]
async fn help_and_unknown() {
  let (_, replies, handler) = setup().await;

  handler.handle(&message(ALICE, "/help")).await;
  assert_eq!(replies.last(), HELP_TEXT);

  handler.handle(&message(ALICE, "/dance")).await;
  assert_eq!(replies.last(), UNKNOWN_COMMAND);
}

#[tokio::test]
async fn subscribe_by_handle_then_by_id() {
  let (store, replies, handler) = setup().await;

  handler.handle(&message(BOB, "/subscribeTo @alice")).await;
  assert_eq!(replies.last(), "success, you are subscribed");

  handler.handle(&message(BOB, "/subscribeTo 1")).await;
  assert_eq!(replies.last(), "you are already subscribed to user");

  let alice = store.find_by_identity(ALICE).await.unwrap();
  let subscribers = store.list_subscribers_of(&[alice]).await.unwrap();
  assert_eq!(subscribers.len(), 1);
  assert_eq!(subscribers[0].identity, BOB);
}

#[tokio::test]
async fn subscribe_errors_are_explained() {
  let (_, replies, handler) = setup().await;

  handler.handle(&message(ALICE, "/subscribeTo @alice")).await;
  assert_eq!(replies.last(), "you can't subscribe to yourself");

  handler.handle(&message(ALICE, "/subscribeTo @carol")).await;
  assert_eq!(replies.last(), "user @carol not register in service");

  handler.handle(&message(ALICE, "/subscribeTo 77")).await;
  assert_eq!(replies.last(), "user not register in service");

  handler.handle(&message(ALICE, "/subscribeTo")).await;
  assert_eq!(replies.last(), ParseError::MissingTarget.to_string());
}

#[tokio::test]
async fn unsubscribe_flow() {
  let (store, replies, handler) = setup().await;
  store.insert_edge(BOB, ALICE).await.unwrap();

  handler.handle(&message(BOB, "/unSubscribeFrom @alice")).await;
  assert_eq!(replies.last(), "success, subscription removed");

  handler.handle(&message(BOB, "/unSubscribeFrom @alice")).await;
  assert_eq!(replies.last(), "you are not subscribe for this user");
}

#[tokio::test]
async fn notification_toggle() {
  let (store, replies, handler) = setup().await;

  handler.handle(&message(ALICE, "/subscribeToNotifications false")).await;
  assert_eq!(replies.last(), "success, notification change to false");
  assert!(!store.find_by_identity(ALICE).await.unwrap().notify_birthday);

  handler.handle(&message(ALICE, "/subscribeToNotifications maybe")).await;
  assert_eq!(replies.last(), ParseError::BadFlag.to_string());
}

#[tokio::test]
async fn users_lists_everyone_else() {
  let (_, replies, handler) = setup().await;

  handler.handle(&message(ALICE, "/users")).await;

  let reply = replies.last();
  assert!(reply.contains("@bob (2), birthday 03-21"));
  assert!(!reply.contains("@alice"));
}
