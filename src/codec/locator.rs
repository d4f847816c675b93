//! Resource locator
//!
//! Resolves resource names (such as `%TYPE_SYSTEM_REF`) to files.

use std::path::{Path, PathBuf};

/// Maps a resource name onto a readable location.
pub trait ResourceLocator {
    /// Returns the path of `name`, if it can be found.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Searches a list of directories in order.
///
/// Absolute names are returned as-is when they exist.
#[derive(Debug, Clone, Default)]
pub struct DataPathLocator {
    roots: Vec<PathBuf>,
}

impl DataPathLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Parses a platform search path (`:`-separated on Unix).
    pub fn from_search_path(path: &str) -> Self {
        Self::new(std::env::split_paths(path).collect())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceLocator for DataPathLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        self.roots
            .iter()
            .map(|root| root.join(path))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_root_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("types.json"), "{}").unwrap();
        fs::write(second.path().join("types.json"), "{}").unwrap();
        fs::write(second.path().join("only.json"), "{}").unwrap();

        let locator = DataPathLocator::new(vec![first.path().into(), second.path().into()]);
        assert_eq!(locator.locate("types.json"), Some(first.path().join("types.json")));
        assert_eq!(locator.locate("only.json"), Some(second.path().join("only.json")));
        assert_eq!(locator.locate("missing.json"), None);
    }

    #[test]
    fn test_absolute_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abs.json");
        fs::write(&file, "{}").unwrap();
        let locator = DataPathLocator::default();
        assert_eq!(locator.locate(file.to_str().unwrap()), Some(file.clone()));
        assert_eq!(locator.locate(dir.path().join("nope.json").to_str().unwrap()), None);
    }
}
