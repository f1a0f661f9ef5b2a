//! The golden store: where reference documents live and how they are
//! recorded or loaded.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::document::{load_document, to_yaml};
use crate::errors::{GoldenError, Result};

/// Environment variable whose value selects the mode of a whole run.
pub const GOLDEN_ENV_VAR: &str = "GENERATE_GOLDEN_YAML";

/// Banner written at the top of every recorded golden file.
pub const LICENSE_HEADER: &str = "\
# Copyright 2020 kubeflow.org
#
# Licensed under the Apache License, Version 2.0 (the \"License\");
# you may not use this file except in compliance with the License.
# You may obtain a copy of the License at
#
#      http://www.apache.org/licenses/LICENSE-2.0
#
# Unless required by applicable law or agreed to in writing, software
# distributed under the License is distributed on an \"AS IS\" BASIS,
# WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
# See the License for the specific language governing permissions and
# limitations under the License.

";

/// Verify against the goldens, or regenerate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoldenMode {
    #[default]
    Verify,
    Record,
}

impl GoldenMode {
    /// Exactly `"True"` selects record mode; anything else, including an
    /// unset flag, selects verify mode.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("True") => GoldenMode::Record,
            _ => GoldenMode::Verify,
        }
    }

    /// Read [`GOLDEN_ENV_VAR`]. Call once, at process start.
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(GOLDEN_ENV_VAR).ok().as_deref())
    }

    pub fn is_record(self) -> bool {
        self == GoldenMode::Record
    }
}

/// What verify mode does when a golden file lacks the license header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    Ignore,
    #[default]
    Warn,
    Enforce,
}

/// Result of writing one golden file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub path: PathBuf,
    /// Hex SHA-256 of the bytes written.
    pub digest: String,
    /// False when the file already held exactly these bytes.
    pub changed: bool,
}

/// Goldens that exist without a scenario, and scenarios without a golden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoldenAudit {
    pub orphaned: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

impl GoldenAudit {
    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty() && self.missing.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GoldenStore {
    root: PathBuf,
    header_policy: HeaderPolicy,
}

impl GoldenStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            header_policy: HeaderPolicy::default(),
        }
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Overwrite `path` with the license header followed by `value` as YAML.
    pub fn record(&self, path: &Path, value: &Value) -> Result<RecordOutcome> {
        let mut text = String::from(LICENSE_HEADER);
        text.push_str(&to_yaml(value)?);

        let changed = match fs::read(path) {
            Ok(previous) => previous != text.as_bytes(),
            Err(_) => true,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GoldenError::io(parent, e))?;
        }
        fs::write(path, &text).map_err(|e| GoldenError::io(path, e))?;

        let digest = format!("{:x}", Sha256::digest(text.as_bytes()));
        tracing::info!(path = %path.display(), %digest, changed, "recorded golden");
        Ok(RecordOutcome {
            path: path.to_path_buf(),
            digest,
            changed,
        })
    }

    /// Load the golden at `path`. Never creates it.
    pub fn load(&self, path: &Path) -> Result<Value> {
        if !path.is_file() {
            return Err(GoldenError::GoldenNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| GoldenError::io(path, e))?;
        self.check_header(path, &text)?;
        load_document(&text, &path.display().to_string())
    }

    fn check_header(&self, path: &Path, text: &str) -> Result<()> {
        if text.starts_with(LICENSE_HEADER.trim_end()) {
            return Ok(());
        }
        match self.header_policy {
            HeaderPolicy::Ignore => Ok(()),
            HeaderPolicy::Warn => {
                tracing::warn!(path = %path.display(), "golden file lacks the license header");
                Ok(())
            }
            HeaderPolicy::Enforce => Err(GoldenError::HeaderMismatch {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Compare the YAML files under the root with the golden names in use.
    pub fn audit<'a, I>(&self, referenced: I) -> GoldenAudit
    where
        I: IntoIterator<Item = &'a str>,
    {
        let referenced: BTreeSet<PathBuf> =
            referenced.into_iter().map(|name| self.resolve(name)).collect();
        let on_disk: BTreeSet<PathBuf> = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .map(|ext| ext == "yaml" || ext == "yml")
                        .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        GoldenAudit {
            orphaned: on_disk.difference(&referenced).cloned().collect(),
            missing: referenced.difference(&on_disk).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn only_exact_true_selects_record() {
        assert_eq!(GoldenMode::from_flag(Some("True")), GoldenMode::Record);
        assert_eq!(GoldenMode::from_flag(Some("true")), GoldenMode::Verify);
        assert_eq!(GoldenMode::from_flag(Some("1")), GoldenMode::Verify);
        assert_eq!(GoldenMode::from_flag(None), GoldenMode::Verify);
    }

    #[test]
    fn record_prepends_header_and_loads_back() {
        let dir = tempdir().unwrap();
        let store = GoldenStore::new(dir.path());
        let path = store.resolve("sequential.yaml");
        let value = load_document("kind: PipelineRun\nspec: {tasks: [a, b]}\n", "v").unwrap();

        let outcome = store.record(&path, &value).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.digest.len(), 64);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(LICENSE_HEADER));
        assert_eq!(store.load(&path).unwrap(), value);
    }

    #[test]
    fn recording_twice_is_byte_identical() {
        let dir = tempdir().unwrap();
        let store = GoldenStore::new(dir.path());
        let path = store.resolve("retry.yaml");
        let value = load_document("spec: {retries: 3}\nkind: Pipeline\n", "v").unwrap();

        let first = store.record(&path, &value).unwrap();
        let bytes = fs::read(&path).unwrap();
        let second = store.record(&path, &value).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(first.digest, second.digest);
        assert!(!second.changed);
    }

    #[test]
    fn missing_golden_is_not_created() {
        let dir = tempdir().unwrap();
        let store = GoldenStore::new(dir.path());
        let path = store.resolve("absent.yaml");
        let err = store.load(&path).unwrap_err();
        assert!(matches!(err, GoldenError::GoldenNotFound { .. }));
        assert!(!path.exists());
    }

    /// Collects formatted log lines so a test can assert on them.
    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        /// Run `f` with a subscriber that writes into this log.
        fn during<T>(&self, f: impl FnOnce() -> T) -> T {
            let sink = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || sink.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn header_policy_controls_headerless_goldens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bare.yaml");
        fs::write(&path, "kind: Pipeline\n").unwrap();

        let log = CapturedLog::default();
        let ignore = GoldenStore::new(dir.path()).with_header_policy(HeaderPolicy::Ignore);
        assert!(log.during(|| ignore.load(&path)).is_ok());
        assert!(!log.text().contains("license header"));

        let warn = GoldenStore::new(dir.path());
        assert!(log.during(|| warn.load(&path)).is_ok());
        let logged = log.text();
        assert!(logged.contains("WARN"), "{}", logged);
        assert!(logged.contains("golden file lacks the license header"), "{}", logged);
        assert!(logged.contains("bare.yaml"), "{}", logged);

        let enforce = GoldenStore::new(dir.path()).with_header_policy(HeaderPolicy::Enforce);
        let err = enforce.load(&path).unwrap_err();
        assert_eq!(err.kind(), "header");
    }

    #[test]
    fn audit_reports_orphans_and_missing() {
        let dir = tempdir().unwrap();
        let store = GoldenStore::new(dir.path());
        fs::write(store.resolve("used.yaml"), LICENSE_HEADER).unwrap();
        fs::write(store.resolve("stale.yaml"), LICENSE_HEADER).unwrap();
        fs::write(store.resolve("notes.txt"), "not a golden").unwrap();

        let audit = store.audit(["used.yaml", "new.yaml"]);
        assert_eq!(audit.orphaned, vec![store.resolve("stale.yaml")]);
        assert_eq!(audit.missing, vec![store.resolve("new.yaml")]);
        assert!(!audit.is_clean());
    }
}
