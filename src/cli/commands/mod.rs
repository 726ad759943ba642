//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that probe build their
//! orchestrator and async runtime through [`context`]; cache-only commands
//! (`lookup`, `latest`, `cache`) never need a host or catalog.

pub mod cache;
pub mod check;
pub mod completions;
pub mod context;
pub mod dispatcher;
pub mod latest;
pub mod lookup;
pub mod recheck;
pub mod scan;

pub use context::CommandContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
