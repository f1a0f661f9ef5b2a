//! Harness configuration.
//!
//! The run mode is never read from a file or the environment here; the entry
//! point decides it once and passes it in.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compare::OrderingMode;
use crate::compiler::CompilerConfig;
use crate::errors::{GoldenError, Result};
use crate::golden::{GoldenMode, HeaderPolicy};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding the golden files.
    pub testdata_dir: PathBuf,
    #[serde(skip)]
    pub mode: GoldenMode,
    pub ordering: OrderingMode,
    pub header_policy: HeaderPolicy,
    #[serde(skip)]
    pub use_colors: bool,
    pub compiler: CompilerConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            testdata_dir: PathBuf::from("testdata"),
            mode: GoldenMode::Verify,
            ordering: OrderingMode::Preserved,
            header_policy: HeaderPolicy::Warn,
            use_colors: atty::is(atty::Stream::Stderr),
            compiler: CompilerConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load a YAML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GoldenError::io(path, e))?;
        let config: HarnessConfig = serde_yaml::from_str(&text).map_err(|e| GoldenError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(config.with_colors(atty::is(atty::Stream::Stderr)))
    }

    pub fn with_mode(mut self, mode: GoldenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_testdata(mut self, dir: impl Into<PathBuf>) -> Self {
        self.testdata_dir = dir.into();
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingMode) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("golden.yaml");
        fs::write(
            &path,
            "testdata_dir: sdk/tests/testdata\nordering: unstable\ncompiler:\n  program: dsl-compile\n  args: [--quiet]\n",
        )
        .unwrap();

        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.testdata_dir, PathBuf::from("sdk/tests/testdata"));
        assert_eq!(config.ordering, OrderingMode::Unstable);
        assert_eq!(config.header_policy, HeaderPolicy::Warn);
        assert_eq!(config.mode, GoldenMode::Verify);
        assert_eq!(config.compiler.program, Some(PathBuf::from("dsl-compile")));
        assert_eq!(config.compiler.args, vec!["--quiet".to_string()]);
    }

    #[test]
    fn mode_cannot_come_from_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("golden.yaml");
        fs::write(&path, "mode: Record\n").unwrap();
        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.mode, GoldenMode::Verify);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("golden.yaml");
        fs::write(&path, "ordering: sideways\n").unwrap();
        let err = HarnessConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
