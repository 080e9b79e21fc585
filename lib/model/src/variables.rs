use oxrdf::{Variable, VariableNameParseError};

/// Hands out fresh query variables for a single compilation.
///
/// Variables are named `{prefix}{n}` with `n` counting up from zero in the order of their creation.
/// Compiling the same request twice therefore yields the same variable names.
#[derive(Clone, Debug)]
pub struct VariableStore {
    prefix: String,
    next: usize,
}

impl VariableStore {
    /// Creates a new store. Fails if `prefix` cannot start a SPARQL variable name.
    pub fn try_new(prefix: impl Into<String>) -> Result<Self, VariableNameParseError> {
        let prefix = prefix.into();
        Variable::new(format!("{prefix}0"))?;
        Ok(Self { prefix, next: 0 })
    }

    /// Returns a variable that has not been handed out by this store before.
    pub fn next_variable(&mut self) -> Variable {
        let variable = Variable::new_unchecked(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        variable
    }

    /// The number of variables handed out so far.
    pub fn len(&self) -> usize {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self {
            prefix: "x".to_owned(),
            next: 0,
        }
    }
}
