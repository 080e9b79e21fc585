use rustc_hash::FxHashMap;
use shapeql_common::{CompileError, CompileResult};
use shapeql_model::vocab::xsd;
use shapeql_model::{NamedNode, PropertyPath, Term};
use std::fmt::{Display, Formatter};

/// The kind of RDF term a property points to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Iri,
    BlankNode,
    BlankNodeOrIri,
    #[default]
    Literal,
}

impl NodeKind {
    /// Whether values of this kind are resources (as opposed to literals).
    pub fn is_resource(self) -> bool {
        !matches!(self, Self::Literal)
    }
}

/// The function of an [Aggregate].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
    GroupConcat { separator: String },
}

/// A computed value over all nodes reachable via a property path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub distinct: bool,
}

impl Aggregate {
    pub fn new(function: AggregateFunction) -> Self {
        Self {
            function,
            distinct: false,
        }
    }

    pub fn count() -> Self {
        Self::new(AggregateFunction::Count)
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

impl Display for AggregateFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Avg => "AVG",
            Self::GroupConcat { .. } => "GROUP_CONCAT",
        })
    }
}

/// One named property of a [NodeShape].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyShape {
    name: String,
    path: PropertyPath,
    node_kind: NodeKind,
    datatype: NamedNode,
    node: Option<String>,
    min_count: usize,
    has_value: Option<Term>,
    aggregate: Option<Aggregate>,
}

impl PropertyShape {
    /// Creates an optional, literal-valued property.
    pub fn new(name: impl Into<String>, path: impl Into<PropertyPath>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            node_kind: NodeKind::Literal,
            datatype: xsd::STRING.into_owned(),
            node: None,
            min_count: 0,
            has_value: None,
            aggregate: None,
        }
    }

    /// Points the property to the node shape called `shape`. The property then holds resources.
    #[must_use]
    pub fn with_node(mut self, shape: impl Into<String>) -> Self {
        self.node = Some(shape.into());
        if self.node_kind == NodeKind::Literal {
            self.node_kind = NodeKind::BlankNodeOrIri;
        }
        self
    }

    #[must_use]
    pub fn with_node_kind(mut self, node_kind: NodeKind) -> Self {
        self.node_kind = node_kind;
        self
    }

    #[must_use]
    pub fn with_datatype(mut self, datatype: NamedNode) -> Self {
        self.datatype = datatype;
        self
    }

    #[must_use]
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    /// Marks the property as mandatory (`minCount 1`).
    #[must_use]
    pub fn required(self) -> Self {
        self.with_min_count(1)
    }

    /// Restricts the property to a single, fixed value.
    #[must_use]
    pub fn with_has_value(mut self, value: impl Into<Term>) -> Self {
        self.has_value = Some(value.into());
        self
    }

    /// Turns the property into an aggregate over its path.
    #[must_use]
    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    pub fn node_kind(&self) -> NodeKind {
        self.node_kind
    }

    /// The declared datatype, `xsd:string` if none is declared.
    pub fn datatype(&self) -> &NamedNode {
        &self.datatype
    }

    /// The name of the nested node shape, if the property points to one.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn has_value(&self) -> Option<&Term> {
        self.has_value.as_ref()
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        self.aggregate.as_ref()
    }

    /// Whether every focus node has at least one value for this property.
    pub fn is_required(&self) -> bool {
        self.min_count > 0
    }
}

/// A declarative description of an entity type: its class constraints and its properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeShape {
    name: String,
    target_classes: Vec<Vec<NamedNode>>,
    properties: Vec<PropertyShape>,
    index: FxHashMap<String, usize>,
}

impl NodeShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_classes: Vec::new(),
            properties: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Adds an alternative group that consists of the single class `class`.
    #[must_use]
    pub fn with_target_class(self, class: NamedNode) -> Self {
        self.with_target_class_group([class])
    }

    /// Adds an alternative group of classes. A node conforms to the shape if it is an instance of
    /// all classes of at least one group.
    #[must_use]
    pub fn with_target_class_group(mut self, group: impl IntoIterator<Item = NamedNode>) -> Self {
        self.target_classes.push(group.into_iter().collect());
        self
    }

    /// Adds a property. A property with the name of an existing property replaces it.
    #[must_use]
    pub fn with_property(mut self, property: PropertyShape) -> Self {
        match self.index.get(property.name()) {
            Some(&idx) => self.properties[idx] = property,
            None => {
                self.index
                    .insert(property.name().to_owned(), self.properties.len());
                self.properties.push(property);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_classes(&self) -> &[Vec<NamedNode>] {
        &self.target_classes
    }

    pub fn properties(&self) -> &[PropertyShape] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyShape> {
        self.index.get(name).map(|&idx| &self.properties[idx])
    }

    /// Looks up the property `name`, raising a field-scoped error if there is none.
    pub fn resolve_property(&self, name: &str) -> CompileResult<&PropertyShape> {
        self.property(name)
            .ok_or_else(|| CompileError::shape_resolution(name, self.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beer() -> NodeShape {
        NodeShape::new("Beer")
            .with_target_class(NamedNode::new_unchecked("https://example.org/def#Beer"))
            .with_property(PropertyShape::new(
                "name",
                NamedNode::new_unchecked("https://example.org/def#name"),
            ))
    }

    #[test]
    fn test_resolve_property() {
        let shape = beer();
        assert_eq!(shape.resolve_property("name").unwrap().name(), "name");
        assert_eq!(
            shape.resolve_property("unexisting").unwrap_err(),
            CompileError::shape_resolution("unexisting", "Beer")
        );
    }

    #[test]
    fn test_property_is_replaced() {
        let shape = beer().with_property(
            PropertyShape::new(
                "name",
                NamedNode::new_unchecked("https://example.org/def#label"),
            )
            .required(),
        );
        assert_eq!(shape.properties().len(), 1);
        assert!(shape.resolve_property("name").unwrap().is_required());
    }

    #[test]
    fn test_defaults() {
        let property = PropertyShape::new(
            "brewery",
            NamedNode::new_unchecked("https://example.org/def#brewery"),
        );
        assert_eq!(property.datatype().as_ref(), xsd::STRING);
        assert!(!property.is_required());
        assert!(!property.node_kind().is_resource());

        let property = property.with_node("Brewery");
        assert_eq!(property.node(), Some("Brewery"));
        assert!(property.node_kind().is_resource());
    }
}
