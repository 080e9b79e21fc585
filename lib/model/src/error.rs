use oxrdf::NamedNode;
use thiserror::Error;

/// Indicates that a lexical value cannot be turned into an RDF term of the requested kind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Value '{value}' is not a valid {target}: {reason}")]
pub struct TermCoercionError {
    value: String,
    target: String,
    reason: String,
}

impl TermCoercionError {
    /// Creates a new error for `value` that could not be coerced into `target`.
    pub fn new(value: impl Into<String>, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new error for a literal with the given `datatype`.
    pub fn for_datatype(value: impl Into<String>, datatype: &NamedNode, reason: impl Into<String>) -> Self {
        Self::new(value, datatype.to_string(), reason)
    }

    /// The offending lexical value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// A description of what the value should have been coerced into.
    pub fn target(&self) -> &str {
        &self.target
    }
}
