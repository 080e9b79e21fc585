use crate::FilterRule;

/// One requested field of a selection set.
///
/// `qualified_name` is the path of the field from the root of the selection, e.g.
/// `beers/ingredients/name`. Selections may also contain type-qualified duplicates of a field
/// (`Beer.name`); those are meta fields and are skipped by the compiler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedField {
    pub name: String,
    pub qualified_name: String,
    pub type_name: String,
    /// Filter arguments given on this field, relative to the shape of the field.
    pub filters: Vec<FilterRule>,
    pub children: Vec<SelectedField>,
}

impl SelectedField {
    /// Creates a scalar field.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            name,
            type_name: String::new(),
            filters: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a field with a nested selection.
    pub fn nested(name: impl Into<String>, children: impl IntoIterator<Item = SelectedField>) -> Self {
        Self::new(name).with_children(children)
    }

    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces the children of this field, qualifying their names with the name of this field.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SelectedField>) -> Self {
        self.children = children.into_iter().collect();
        let qualified_name = self.qualified_name.clone();
        for child in &mut self.children {
            child.qualify(&qualified_name);
        }
        self
    }

    fn qualify(&mut self, parent: &str) {
        self.qualified_name = format!("{parent}/{}", self.name);
        let qualified_name = self.qualified_name.clone();
        for child in &mut self.children {
            child.qualify(&qualified_name);
        }
    }

    /// Whether the field is a synthetic meta field that does not map to a property.
    pub fn is_meta(&self) -> bool {
        self.name.contains('.') || self.name.starts_with("__")
    }

    /// Whether the field is a connection or reference wrapper around the actual nodes.
    pub fn is_wrapper(&self) -> bool {
        matches!(self.name.as_str(), "nodes" | "node")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_names() {
        let field = SelectedField::nested(
            "beers",
            [SelectedField::nested("ingredients", [SelectedField::new("name")])],
        );
        let ingredients = &field.children[0];
        assert_eq!(ingredients.qualified_name, "beers/ingredients");
        assert_eq!(ingredients.children[0].qualified_name, "beers/ingredients/name");
    }

    #[test]
    fn test_meta_fields() {
        assert!(SelectedField::new("Brewery.name").is_meta());
        assert!(SelectedField::new("__typename").is_meta());
        assert!(!SelectedField::new("name").is_meta());
        assert!(SelectedField::new("nodes").is_wrapper());
    }
}
