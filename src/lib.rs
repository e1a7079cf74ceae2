//! Configuration compiler for a cross-branch integration bot.
//!
//! Turns a lenient JSON branch-graph document into a validated
//! [`parse::BranchGraphDefinition`] plus the bot's [`config::BotConfig`], or
//! explains exactly why it cannot.

pub mod compile;
pub mod config;
pub mod error;
pub mod graph;
pub mod names;
pub mod parse;
pub mod stream;
pub mod validate;

pub use compile::{parse_and_validate, parse_and_validate_preview, Failure, FailureReport, ParseResult};
pub use config::BotConfig;
pub use error::{Diagnostic, Phase, StructuralError};
pub use graph::BranchGraph;
pub use names::NameTable;
pub use parse::BranchGraphDefinition;
pub use stream::{calculate_stream, StaticStreamChecker, StreamCheckError, StreamChecker, StreamResult};
