//! Command-line driver for the nestegg retirement simulator
//!
//! Reads household plans as JSON, runs them through `nestegg_core` and writes
//! JSON results to stdout.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Args, Command};
pub use commands::{execute, write_output};
pub use logging::init_logging;
