//! CLI command implementations
//!
//! Commands read one serialized CAS, never modify their input and print a
//! single JSON response on stdout.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::cas::Cas;
use crate::codec::{serialize_to_file, CodecResult};
use crate::config::StoreConfig;

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{write_error, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli)
}

/// Run a parsed command line
pub fn run_command(cli: &Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Inspect { file } => inspect(&config, file),
        Command::Check { file } => check(&config, file),
        Command::Roundtrip { input, output } => roundtrip(&config, input, output),
        Command::Types { file } => types(&config, file),
    }
}

/// Defaults apply when no config file is given
fn load_config(path: Option<&Path>) -> CliResult<StoreConfig> {
    match path {
        Some(path) => {
            let config = StoreConfig::load(path)?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(StoreConfig::default()),
    }
}

/// Print views, index sizes and counts of a serialized CAS
pub fn inspect(config: &StoreConfig, file: &Path) -> CliResult<()> {
    let cas = config.deserializer().read_file(file)?;
    write_response(summarize(&cas)?)
}

/// Report whether a file deserializes cleanly
///
/// The error response carries the library error code; the command still
/// fails so the exit status is non-zero.
pub fn check(config: &StoreConfig, file: &Path) -> CliResult<()> {
    match config.deserializer().read_file(file) {
        Ok(cas) => write_response(json!({
            "file": file.display().to_string(),
            "feature_structures": cas.store().len(),
            "views": cas.views().count(),
        })),
        Err(e) => {
            write_error(e.code(), &e.to_string())?;
            Err(e.into())
        }
    }
}

/// Read `input` and write it back out with the configured codec options
pub fn roundtrip(config: &StoreConfig, input: &Path, output: &Path) -> CliResult<()> {
    let cas = config.deserializer().read_file(input)?;
    serialize_to_file(&cas, &config.codec, output)?;
    write_response(json!({
        "input": input.display().to_string(),
        "output": output.display().to_string(),
        "feature_structures": cas.store().len(),
    }))
}

/// Print the type system of a serialized CAS as a descriptor
pub fn types(config: &StoreConfig, file: &Path) -> CliResult<()> {
    let cas = config.deserializer().read_file(file)?;
    let description = cas.type_system().describe();
    write_response(serde_json::to_value(&description)?)
}

fn summarize(cas: &Cas) -> CodecResult<Value> {
    let mut views = Vec::new();
    for view in cas.views() {
        let repository = view.indexes();
        let mut indexes = Map::new();
        for name in repository.index_names() {
            indexes.insert(name.to_string(), json!(repository.index(name)?.size()));
        }
        let text = cas.document_text(view.name())?;
        views.push(json!({
            "name": view.name(),
            "sofa_num": view.sofa_num(),
            "members": repository.member_count(),
            "document_length": text.map(|t| t.chars().count()),
            "language": cas.document_language(view.name())?,
            "indexes": indexes,
        }));
    }

    Ok(json!({
        "types": cas.type_system().type_count(),
        "feature_structures": cas.store().len(),
        "views": views,
    }))
}
