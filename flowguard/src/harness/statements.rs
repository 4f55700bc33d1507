//! Helpers for scenario step glue.

use crate::engine::VariableMap;

/// Builds a variable map from name/value pairs.
///
/// ```
/// use flowguard::harness::with_variables;
/// use serde_json::json;
///
/// let variables = with_variables([("contractId", json!("C-1")), ("isAutomatic", json!(true))]);
/// assert_eq!(variables.len(), 2);
/// ```
pub fn with_variables<I, K>(pairs: I) -> VariableMap
where
    I: IntoIterator<Item = (K, serde_json::Value)>,
    K: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect()
}

/// Maps a natural-language verb phrase to a boolean decision.
///
/// True iff the negation marker is absent from the phrase; `default` when no
/// phrase was given. Used by step code to turn "is"/"is not" wording into a
/// flag.
#[must_use]
pub fn parse_statement(negation: &str, value: Option<&str>, default: bool) -> bool {
    value.map_or(default, |phrase| !phrase.contains(negation))
}
