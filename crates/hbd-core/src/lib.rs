//! Core types and trait definitions for the birthday notification service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the messaging transport, and the orchestration engine
//! all depend on it.

pub mod error;
pub mod gateway;
pub mod source;
pub mod store;
pub mod subscription;
pub mod user;

pub use error::{Error, Result};
