//! Offline training and service checks.

pub mod cli;
pub mod commands;
pub mod convert;
pub mod smoke;

pub use cli::{Cli, Command, CorpusArgs};
