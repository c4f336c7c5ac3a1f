//! Symlink lifecycle engine for dotfiles.
//!
//! Materializes symbolic links from a version-controlled repository into
//! the home directory, safely displacing pre-existing files into
//! timestamped backups, and records every run so it can be fully reversed.
//!
//! The public API is organised into focused layers:
//!
//! - **[`config`]** — parse and normalize `links.toml`
//! - **[`engine`]** — condition evaluation, classification, conflict
//!   resolution, and link materialization
//! - **[`backup`]** — timestamped backup store with retention pruning
//! - **[`run_state`]** — persisted run record and rollback
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod fsutil;
pub mod logging;
pub mod run_state;
