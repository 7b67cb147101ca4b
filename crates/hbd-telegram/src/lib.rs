//! Telegram front-end for the birthday service.
//!
//! [`TelegramClient`] speaks the Bot API over HTTPS and implements
//! [`hbd_core::gateway::MessagingGateway`] for the notification engine.
//! [`UpdateRouter`] long-polls for incoming messages and hands chat commands
//! to a [`CommandHandler`].

mod client;
mod router;

pub mod command;
pub mod error;
pub mod handler;
pub mod types;

pub use client::TelegramClient;
pub use error::{Error, Result};
pub use handler::CommandHandler;
pub use router::UpdateRouter;

#[cfg(test)]
mod tests;
