use std::fmt::{Display, Formatter};

/// A dotted field path such as `beers.ingredients.name`, addressing a property relative to a shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Splits `path` at its dots. The empty string is the empty path.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }
        Self(path.split('.').map(str::to_owned).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path that starts with `prefix` followed by this path.
    #[must_use]
    pub fn prefixed(&self, prefix: &[String]) -> Self {
        Self(prefix.iter().chain(self.0.iter()).cloned().collect())
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// How a filter is combined with the filters that precede it on the same node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterJoin {
    #[default]
    And,
    Or,
}

/// A pre-parsed filter argument.
///
/// The operator is kept as given by the client and validated during compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterRule {
    pub path: FieldPath,
    pub operator: String,
    pub values: Vec<String>,
    pub join: FilterJoin,
    /// Compares the identifier of the addressed node instead of one of its literal properties.
    pub is_resource: bool,
}

impl FilterRule {
    pub fn new(
        path: &str,
        operator: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            path: FieldPath::parse(path),
            operator: operator.into(),
            values: values.into_iter().map(Into::into).collect(),
            join: FilterJoin::And,
            is_resource: false,
        }
    }

    /// Combines this filter with the preceding filters of its node using `OR`.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.join = FilterJoin::Or;
        self
    }

    #[must_use]
    pub fn resource(mut self) -> Self {
        self.is_resource = true;
        self
    }

    /// Returns a copy of this filter whose path starts with `prefix`.
    #[must_use]
    pub fn prefixed(&self, prefix: &[String]) -> Self {
        Self {
            path: self.path.prefixed(prefix),
            ..self.clone()
        }
    }
}

/// A pre-parsed sort argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub path: FieldPath,
    /// The requested direction (`ASC` or `DESC`). Anything but `ASC` sorts descending.
    pub direction: Option<String>,
    /// Sorts by the identifier of the addressed node instead of a literal value.
    pub is_resource: bool,
}

impl OrderBy {
    pub fn new(path: &str) -> Self {
        Self {
            path: FieldPath::parse(path),
            direction: None,
            is_resource: false,
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    #[must_use]
    pub fn resource(mut self) -> Self {
        self.is_resource = true;
        self
    }
}

/// Pagination arguments of a collection request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Paging {
    pub first: Option<usize>,
    pub offset: Option<usize>,
}

impl Paging {
    pub fn new(first: Option<usize>, offset: Option<usize>) -> Self {
        Self { first, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_path() {
        let path = FieldPath::parse("beers.ingredients.name");
        assert_eq!(path.segments(), ["beers", "ingredients", "name"]);
        assert_eq!(path.to_string(), "beers.ingredients.name");
        assert!(FieldPath::parse("").is_empty());
    }

    #[test]
    fn test_prefixed_filter() {
        let filter = FilterRule::new("name", "eq", ["Pils"]).or();
        let prefixed = filter.prefixed(&["beers".to_owned()]);
        assert_eq!(prefixed.path.to_string(), "beers.name");
        assert_eq!(prefixed.join, FilterJoin::Or);
        assert_eq!(prefixed.values, ["Pils"]);
    }
}
