use crate::{CompileError, CompileResult};
use serde::Deserialize;
use shapeql_model::{NamedNode, VariableStore};

/// Holds the configuration of the query compiler.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// The prefix of the generated query variables.
    pub variable_prefix: String,
    /// The namespace of synthetic predicates. A property whose path cannot be written as a single
    /// triple appears in the CONSTRUCT template as `<{synthetic_namespace}{property name}>`.
    pub synthetic_namespace: String,
    /// The page size if a request does not ask for one.
    pub default_page_size: usize,
    /// The largest page size a request may ask for.
    pub max_page_size: usize,
}

impl CompilerConfig {
    /// Checks that the configuration can be used to compile queries.
    pub fn validate(&self) -> CompileResult<()> {
        if VariableStore::try_new(self.variable_prefix.as_str()).is_err() {
            return Err(CompileError::InvalidConfig(format!(
                "'{}' is not a valid variable prefix",
                self.variable_prefix
            )));
        }
        if NamedNode::new(format!("{}property", self.synthetic_namespace)).is_err() {
            return Err(CompileError::InvalidConfig(format!(
                "'{}' is not a valid namespace",
                self.synthetic_namespace
            )));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(CompileError::InvalidConfig(format!(
                "default page size {} must be between 1 and the maximum page size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Creates the synthetic predicate for the property `name`.
    pub fn synthetic_predicate(&self, name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{}{name}", self.synthetic_namespace))
    }

    /// Creates a fresh [VariableStore] for one compilation.
    pub fn variable_store(&self) -> CompileResult<VariableStore> {
        VariableStore::try_new(self.variable_prefix.as_str())
            .map_err(|err| CompileError::InvalidConfig(err.to_string()))
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            variable_prefix: "x".to_owned(),
            synthetic_namespace: "urn:shapeql:property:".to_owned(),
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}
