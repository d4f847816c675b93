//! CLI argument definitions using clap
//!
//! Commands:
//! - aerocas inspect <file>
//! - aerocas check <file>
//! - aerocas roundtrip <input> <output>
//! - aerocas types <file>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aerocas - typed feature structure store with a JSON wire format
#[derive(Parser, Debug)]
#[command(name = "aerocas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log to stderr (RUST_LOG overrides the level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a JSON summary of a serialized CAS
    Inspect {
        /// Serialized CAS
        file: PathBuf,
    },

    /// Deserialize a CAS and report success or the error code
    Check {
        /// Serialized CAS
        file: PathBuf,
    },

    /// Deserialize a CAS and serialize it again with the configured options
    Roundtrip {
        /// Serialized CAS to read
        input: PathBuf,
        /// Destination file
        output: PathBuf,
    },

    /// Print the type system of a serialized CAS as a descriptor
    Types {
        /// Serialized CAS
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
