//! SQL schema for the birthday SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id         TEXT PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    telegram_id     INTEGER NOT NULL UNIQUE,
    birthday        TEXT NOT NULL,             -- YYYY-MM-DD
    notify_birthday INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    subscriber      TEXT NOT NULL REFERENCES users(user_id),
    subscribe_to    TEXT NOT NULL REFERENCES users(user_id),
    created_at      TEXT NOT NULL,
    UNIQUE (subscriber, subscribe_to),
    CHECK  (subscriber != subscribe_to)
);

CREATE INDEX IF NOT EXISTS subscriptions_target_idx ON subscriptions(subscribe_to);

PRAGMA user_version = 1;
";
