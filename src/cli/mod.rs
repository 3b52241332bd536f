//! CLI module
//!
//! Command-line interface for paging through collections.
//!
//! # Commands
//!
//! - `list` - Print every item of a collection as JSON
//! - `validate` - Check the configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{list, Runner};
