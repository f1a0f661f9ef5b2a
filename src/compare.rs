//! Structural comparison of compiled and golden documents.
//!
//! Two strategies are provided. [`DirectEquality`] compares the values as
//! they are: mapping key order never matters, sequence order always does.
//! [`CanonicalEquality`] first rewrites both values into a canonical form so
//! that container ordering produced by an unstable emitter cannot cause a
//! spurious mismatch. Canonicalization is always applied to both sides.

use serde::Deserialize;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::document::{key_text, to_compact_text, to_pretty_json};
use crate::errors::{GoldenError, Result};

/// Whether the compiler's container ordering can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    /// Sequences are compared element by element, in order.
    #[default]
    Preserved,
    /// Both documents are canonicalized before comparing.
    Unstable,
}

/// Pluggable equality used by the harness.
pub trait EqualityStrategy: Send + Sync {
    /// Rewrite a value before it is compared. The same rewrite is applied to
    /// the golden and the compiled value.
    fn prepare(&self, value: Value) -> Value {
        value
    }

    fn equivalent(&self, golden: &Value, compiled: &Value) -> bool {
        structurally_equal(golden, compiled)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectEquality;

impl EqualityStrategy for DirectEquality {}

#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalEquality;

impl EqualityStrategy for CanonicalEquality {
    fn prepare(&self, value: Value) -> Value {
        canonicalize(&value)
    }
}

pub fn strategy_for(mode: OrderingMode) -> Box<dyn EqualityStrategy> {
    match mode {
        OrderingMode::Preserved => Box::new(DirectEquality),
        OrderingMode::Unstable => Box::new(CanonicalEquality),
    }
}

/// Deep equality: identical key sets with equal values for mappings,
/// same length and pairwise equal elements for sequences.
pub fn structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Mapping(left), Value::Mapping(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, value)| {
                    right
                        .get(key)
                        .map_or(false, |other| structurally_equal(value, other))
                })
        }
        (Value::Sequence(left), Value::Sequence(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(x, y)| structurally_equal(x, y))
        }
        (Value::Tagged(left), Value::Tagged(right)) => {
            left.tag == right.tag && structurally_equal(&left.value, &right.value)
        }
        _ => a == b,
    }
}

/// Ordering key for sequence elements. The compact text comes first; distinct
/// values that render alike (`.inf` and `null`, `!t 1` and `{"!t": 1}`) fall
/// back to the variant and then to the YAML dump.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    text: String,
    rank: u8,
    dump: String,
}

impl SortKey {
    fn of(value: &Value) -> Self {
        let rank = match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Sequence(_) => 4,
            Value::Mapping(_) => 5,
            Value::Tagged(_) => 6,
        };
        Self {
            text: to_compact_text(value),
            rank,
            dump: serde_yaml::to_string(value).unwrap_or_else(|_| format!("{:?}", value)),
        }
    }
}

/// Rebuild a value with mapping keys visited in sorted order and every
/// sequence sorted by the compact textual form of its canonical elements.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| key_text(k));
            let mut out = Mapping::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), canonicalize(v));
            }
            Value::Mapping(out)
        }
        Value::Sequence(items) => {
            let mut keyed: Vec<(SortKey, Value)> = items
                .iter()
                .map(|item| {
                    let canonical = canonicalize(item);
                    (SortKey::of(&canonical), canonical)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Sequence(keyed.into_iter().map(|(_, v)| v).collect())
        }
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: canonicalize(&tagged.value),
        })),
        other => other.clone(),
    }
}

/// Reconcile a compiled value with its golden reference.
///
/// On mismatch the error carries the golden file name and the full compiled
/// structure as an indented dump, not a diff.
pub fn verify(
    golden_name: &str,
    golden: Value,
    compiled: Value,
    strategy: &dyn EqualityStrategy,
) -> Result<()> {
    let golden = strategy.prepare(golden);
    let compiled = strategy.prepare(compiled);
    if strategy.equivalent(&golden, &compiled) {
        return Ok(());
    }
    Err(GoldenError::Mismatch {
        golden: golden_name.to_string(),
        actual: to_pretty_json(&compiled)?,
    })
}
