//! aerocas CLI entry point
//!
//! Parses arguments, installs the log subscriber when asked to, and
//! delegates everything else to the CLI module. Errors go to stderr and
//! the process exits non-zero.

use aerocas::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Cli::parse_args();
    if args.verbose {
        init_logging();
    }

    if let Err(e) = cli::run_command(&args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// stdout carries command output, so logs go to stderr
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
