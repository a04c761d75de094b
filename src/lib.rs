//! # Profile Bot
//!
//! A Telegram bot that keeps a small per-user profile (name, join date,
//! message count) in a local JSON file and answers commands, free text,
//! photos and inline button presses with canned or templated replies.

pub mod bot;
pub mod config;
pub mod errors;
pub mod localization;
pub mod observability;
pub mod observability_config;
pub mod profile_store;

// Re-export types for easier access
pub use bot::{InboundEvent, Outbox, Router};
pub use profile_store::{JoinDate, ProfileStore, ProfileTable, UserProfile};
