//! Configuration
//!
//! One JSON file, every field optional:
//!
//! ```json
//! {
//!   "type_order": "supertypes_first",
//!   "codec": { "fs_layout": "array", "pretty": true },
//!   "datapath": ["./descriptors"],
//!   "indexes": [
//!     { "name": "TokensByBegin", "type_name": "org.example.Token", "kind": "sorted",
//!       "keys": [{ "feature": "begin", "order": "ascending" }] }
//!   ]
//! }
//! ```

mod errors;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use errors::{ConfigError, ConfigResult};

use crate::codec::{CasDeserializer, CodecOptions, DataPathLocator};
use crate::index::IndexDescription;
use crate::typesystem::TypeOrderPolicy;

/// Store-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Linear type order policy for aggregate merge ties
    #[serde(default)]
    pub type_order: TypeOrderPolicy,

    /// Serializer options
    #[serde(default)]
    pub codec: CodecOptions,

    /// Directories searched for referenced resources
    #[serde(default)]
    pub datapath: Vec<PathBuf>,

    /// Indexes declared in every view
    #[serde(default)]
    pub indexes: Vec<IndexDescription>,
}

impl StoreConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a config without validating it.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks what serde cannot: datapath entries and index names.
    ///
    /// Index keys are resolved against a type system only when a CAS is
    /// built.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.datapath.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid("datapath entries must not be empty".to_string()));
        }

        let mut names = HashSet::new();
        for index in &self.indexes {
            if index.name.trim().is_empty() {
                return Err(ConfigError::Invalid("index name must not be empty".to_string()));
            }
            if !names.insert(index.name.as_str()) {
                return Err(ConfigError::Invalid(format!("index '{}' is declared twice", index.name)));
            }
        }
        Ok(())
    }

    /// Resource locator over `datapath`.
    pub fn locator(&self) -> DataPathLocator {
        DataPathLocator::new(self.datapath.clone())
    }

    /// A deserializer honouring this config.
    pub fn deserializer(&self) -> CasDeserializer {
        CasDeserializer::new()
            .with_locator(self.locator())
            .with_indexes(self.indexes.clone())
            .with_type_order(self.type_order)
    }
}
