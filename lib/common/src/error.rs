use shapeql_model::TermCoercionError;

/// An error raised while compiling a request into a query.
///
/// Errors are a pure function of the shapes and the request. Retrying a failed compilation yields
/// the same error. Most errors only concern a single field of the request (see
/// [CompileError::is_field_scoped]); the compiler records those and continues with the remaining
/// fields.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A path segment has no matching property shape.
    #[error("No property shape found for name '{name}' nodeshape '{shape}'")]
    ShapeResolution { name: String, shape: String },
    /// A filter operator outside the supported set.
    #[error("Unsupported filter operator '{operator}'")]
    UnsupportedOperator { operator: String },
    /// A path step cannot be matched unambiguously.
    #[error("Ambiguous constraint on nodeshape '{shape}': {reason}")]
    Multiplicity { shape: String, reason: String },
    /// A filter value cannot be coerced into the kind of term the property holds.
    #[error("Invalid value for filter on '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },
    /// A resource filter that does not address a node directly reachable from the root.
    #[error("Resource filter on '{field}' must address the root or one of its direct properties")]
    InvalidResourceFilter { field: String },
    /// The registry holds no node shape with this name.
    #[error("No node shape found for name '{name}'")]
    UnknownShape { name: String },
    /// A shape definition that is inconsistent with the rest of the registry.
    #[error("Invalid shape definition: {0}")]
    InvalidShape(String),
    /// An unusable compiler configuration.
    #[error("Invalid compiler configuration: {0}")]
    InvalidConfig(String),
}

impl CompileError {
    pub fn shape_resolution(name: impl Into<String>, shape: impl Into<String>) -> Self {
        Self::ShapeResolution {
            name: name.into(),
            shape: shape.into(),
        }
    }

    pub fn invalid_filter_value(field: impl Into<String>, error: &TermCoercionError) -> Self {
        Self::InvalidFilterValue {
            field: field.into(),
            reason: error.to_string(),
        }
    }

    /// Whether this error only invalidates the field it was raised for.
    ///
    /// Field-scoped errors are surfaced as an execution error for the affected field while the
    /// rest of the request is compiled. Every other error aborts the compilation.
    pub fn is_field_scoped(&self) -> bool {
        matches!(
            self,
            Self::ShapeResolution { .. }
                | Self::UnsupportedOperator { .. }
                | Self::InvalidFilterValue { .. }
                | Self::InvalidResourceFilter { .. }
        )
    }
}

/// A [CompileError] that only concerns the field at `field` (a dotted path from the root).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {error}")]
pub struct FieldError {
    pub field: String,
    #[source]
    pub error: CompileError,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: CompileError) -> Self {
        Self {
            field: field.into(),
            error,
        }
    }
}
