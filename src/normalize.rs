//! Text-level normalization of raw compiler output.
//!
//! A normalizer runs once, on the serialized text, strictly before parsing.
//! It must be deterministic; idempotence is not required.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{GoldenError, Result};

type NormalizeFn = dyn Fn(&str) -> String + Send + Sync;

/// A named, pure text-to-text transform.
#[derive(Clone)]
pub struct Normalizer {
    label: String,
    transform: Arc<NormalizeFn>,
}

impl Normalizer {
    pub fn from_fn<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            transform: Arc::new(f),
        }
    }

    /// Replace every match of `pattern` with `replacement`.
    pub fn regex(pattern: &str, replacement: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| GoldenError::Config {
            message: format!("invalid normalizer pattern '{}': {}", pattern, e),
        })?;
        let replacement = replacement.to_string();
        Ok(Self::from_fn(
            format!("s/{}/{}/", pattern, replacement),
            move |text| re.replace_all(text, replacement.as_str()).into_owned(),
        ))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn apply(&self, text: &str) -> String {
        (self.transform)(text)
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").field("label", &self.label).finish()
    }
}

/// Apply an optional normalizer; identity when absent.
pub fn normalize(text: String, normalizer: Option<&Normalizer>) -> String {
    match normalizer {
        Some(n) => n.apply(&text),
        None => text,
    }
}

static LOOP_ITEM_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new("loop-item-param-.*-subvar").expect("static pattern"));

/// Collapse the generated disambiguator in loop item parameter names.
///
/// `loop-item-param-7f3a-subvar` becomes `loop-item-param-subvar`. The match
/// is greedy within a line.
pub fn collapse_loop_item_suffix(text: &str) -> String {
    LOOP_ITEM_SUFFIX
        .replace_all(text, "loop-item-param-subvar")
        .into_owned()
}

/// The built-in loop item normalizer.
pub fn loop_item_normalizer() -> Normalizer {
    Normalizer::from_fn("collapse-loop-item-suffix", collapse_loop_item_suffix)
}
