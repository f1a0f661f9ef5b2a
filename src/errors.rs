//! Error taxonomy for the golden-master harness.
//!
//! Every failure is terminal for the scenario that raised it. Nothing here is
//! retried: nondeterministic compiler output must be handled by a
//! [`Normalizer`](crate::normalize::Normalizer), never by re-running.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GoldenError>;

/// Unified error type for every stage of a scenario run.
#[derive(Debug, Error, Diagnostic)]
pub enum GoldenError {
    #[error("Compile error for '{definition}': {message}")]
    #[diagnostic(code(golden::compile))]
    Compile { definition: String, message: String },

    #[error("Parse error in {origin}: {source}")]
    #[diagnostic(
        code(golden::parse),
        help("the document is not well-formed YAML")
    )]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Golden file not found: {}", path.display())]
    #[diagnostic(
        code(golden::not_found),
        help("run with GENERATE_GOLDEN_YAML=True to record the missing fixture")
    )]
    GoldenNotFound { path: PathBuf },

    #[error("\n===[ {golden} ]===\n{actual}")]
    #[diagnostic(
        code(golden::mismatch),
        help("compare the dump with the golden file; re-record if the new output is correct")
    )]
    Mismatch { golden: String, actual: String },

    #[error("Golden file {} does not start with the license header", path.display())]
    #[diagnostic(code(golden::header))]
    HeaderMismatch { path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    #[diagnostic(code(golden::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {message}")]
    #[diagnostic(code(golden::serialize))]
    Serialize { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(golden::config))]
    Config { message: String },
}

impl GoldenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GoldenError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short, stable name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            GoldenError::Compile { .. } => "compile",
            GoldenError::Parse { .. } => "parse",
            GoldenError::GoldenNotFound { .. } => "not-found",
            GoldenError::Mismatch { .. } => "mismatch",
            GoldenError::HeaderMismatch { .. } => "header",
            GoldenError::Io { .. } => "io",
            GoldenError::Serialize { .. } => "serialize",
            GoldenError::Config { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display_names_golden_and_dump() {
        let err = GoldenError::Mismatch {
            golden: "condition.yaml".to_string(),
            actual: "{\n  \"kind\": \"Pipeline\"\n}".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("\n===[ condition.yaml ]===\n"));
        assert!(text.ends_with("\"kind\": \"Pipeline\"\n}"));
        assert_eq!(err.kind(), "mismatch");
    }

    #[test]
    fn diagnostic_codes_are_namespaced() {
        let err = GoldenError::GoldenNotFound {
            path: PathBuf::from("testdata/missing.yaml"),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("golden::not_found"));
    }
}
