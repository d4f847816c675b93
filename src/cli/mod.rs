//! CLI module for aerocas
//!
//! Provides command-line tools over serialized CAS documents:
//! - inspect: views, index sizes and counts
//! - check: deserialize and report the error code on failure
//! - roundtrip: read and re-serialize with configured options
//! - types: dump the type system descriptor

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, inspect, roundtrip, run, run_command, types};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
