//! Async HTTP client for the Telegram Bot API.

use std::time::Duration;

use hbd_core::{
  gateway::MessagingGateway,
  user::{ChatId, Identity},
};
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
  Result,
  types::{ApiResponse, Update},
};

const API_BASE: &str = "https://api.telegram.org";

/// Headroom on top of the long-poll timeout before the HTTP request itself
/// gives up.
const POLL_SLACK: Duration = Duration::from_secs(10);

/// Bot API client.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramClient {
  client: Client,
  base:   String,
}

impl TelegramClient {
  pub fn new(token: &str) -> Result<Self> {
    Self::with_base_url(API_BASE, token)
  }

  /// Point the client at a Bot API server other than `api.telegram.org`.
  pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    let base = format!("{}/bot{}", base_url.trim_end_matches('/'), token);
    Ok(Self { client, base })
  }

  fn url(&self, method: &str) -> String { format!("{}/{}", self.base, method) }

  /// `POST /bot<token>/<method>` with a JSON body.
  ///
  /// The Bot API reports failures in the response envelope, with a non-2xx
  /// status alongside, so the body is decoded regardless of status.
  async fn call<T: DeserializeOwned>(
    &self,
    method: &'static str,
    params: Value,
  ) -> Result<T> {
    let resp = self.client.post(self.url(method)).json(&params).send().await?;
    let envelope: ApiResponse<T> = resp.json().await?;
    envelope.into_result(method)
  }

  /// `getUpdates`, holding the connection open for up to `timeout_secs`.
  pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
    let params = json!({
      "offset": offset,
      "timeout": timeout_secs,
      "allowed_updates": ["message"],
    });
    let resp = self
      .client
      .post(self.url("getUpdates"))
      .timeout(Duration::from_secs(timeout_secs) + POLL_SLACK)
      .json(&params)
      .send()
      .await?;
    let envelope: ApiResponse<Vec<Update>> = resp.json().await?;
    envelope.into_result("getUpdates")
  }
}

impl MessagingGateway for TelegramClient {
  type Error = crate::Error;

  async fn send_message(&self, chat: ChatId, text: &str) {
    let params = json!({ "chat_id": chat, "text": text });
    match self.call::<IgnoredAny>("sendMessage", params).await {
      Ok(_) => debug!(%chat, "message sent"),
      Err(e) => warn!(%chat, error = %e, "could not send message"),
    }
  }

  /// `exportChatInviteLink` has no label, so `context` only shows up in
  /// logs.
  async fn invite_link(&self, space: ChatId, context: &str) -> Result<String> {
    let link: String = self
      .call("exportChatInviteLink", json!({ "chat_id": space }))
      .await?;
    debug!(%space, context, "invite link exported");
    Ok(link)
  }

  /// Lifts a ban without kicking members who are already in the group.
  async fn admit_member(&self, space: ChatId, member: Identity) -> Result<()> {
    let params = json!({
      "chat_id": space,
      "user_id": member,
      "only_if_banned": true,
    });
    let _: bool = self.call("unbanChatMember", params).await?;
    Ok(())
  }

  async fn remove_member(&self, space: ChatId, member: Identity) -> Result<()> {
    let params = json!({ "chat_id": space, "user_id": member });
    let _: bool = self.call("banChatMember", params).await?;
    Ok(())
  }
}
