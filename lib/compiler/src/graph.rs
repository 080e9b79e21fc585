use crate::constraint::Constraint;
use crate::filter::Filter;
use crate::order::Ordering;
use shapeql_common::CompilerConfig;
use shapeql_model::{ConstructDirection, NamedNode, PropertyPath, Variable, VariableStore};
use shapeql_shapes::{Aggregate, PropertyShape};
use std::fmt::{Display, Formatter};

/// The index of a [Vertice] in its [QueryGraph].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerticeId(usize);

/// The index of an [Edge] in its [QueryGraph].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

/// A node of the query graph, bound to a variable.
///
/// For the root and for nested shapes, the variable is the subject of the outgoing edges. For
/// leaves, it binds the value of the property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vertice {
    subject: Variable,
    edges: Vec<EdgeId>,
    constraints: Vec<Constraint>,
    filters: Vec<Filter>,
    orderings: Vec<Ordering>,
}

impl Vertice {
    fn new(subject: Variable) -> Self {
        Self {
            subject,
            edges: Vec::new(),
            constraints: Vec::new(),
            filters: Vec::new(),
            orderings: Vec::new(),
        }
    }

    pub fn subject(&self) -> &Variable {
        &self.subject
    }

    /// The outgoing edges, in the order in which they are rendered.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// The accumulated ordering expressions. Only the root of a graph has any.
    pub fn orderings(&self) -> &[Ordering] {
        &self.orderings
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn add_ordering(&mut self, ordering: Ordering) {
        self.orderings.push(ordering);
    }

    pub(crate) fn take_edges(&mut self) -> Vec<EdgeId> {
        std::mem::take(&mut self.edges)
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<EdgeId>) {
        self.edges = edges;
    }
}

/// What an [Edge] relates its parent to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeLabel {
    /// The nodes reachable via a property path.
    Path(PropertyPath),
    /// A computed value over the nodes reachable via a property path. `inner` binds the
    /// aggregated nodes inside the grouped sub-select.
    Aggregate {
        path: PropertyPath,
        aggregate: Aggregate,
        inner: Variable,
    },
}

impl EdgeLabel {
    /// The key that decides whether two edges address the same relationship.
    pub fn identity(&self) -> String {
        match self {
            Self::Path(path) => path.identity(),
            Self::Aggregate {
                path, aggregate, ..
            } => aggregate_identity(path, aggregate),
        }
    }

    /// The identity an edge for `property` has, without creating the edge.
    pub fn identity_of(property: &PropertyShape) -> String {
        match property.aggregate() {
            None => property.path().identity(),
            Some(aggregate) => aggregate_identity(property.path(), aggregate),
        }
    }

    pub fn path(&self) -> &PropertyPath {
        match self {
            Self::Path(path) | Self::Aggregate { path, .. } => path,
        }
    }
}

fn aggregate_identity(path: &PropertyPath, aggregate: &Aggregate) -> String {
    let distinct = if aggregate.distinct { "DISTINCT " } else { "" };
    format!("{}({distinct}{})", aggregate.function, path.identity())
}

impl Display for EdgeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity())
    }
}

/// A directed, labeled relationship from a parent [Vertice] to a child [Vertice].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    label: EdgeLabel,
    construct_predicate: NamedNode,
    construct_direction: ConstructDirection,
    target: VerticeId,
    /// Emit the edge in the CONSTRUCT template.
    pub visible: bool,
    /// Wrap the edge (and everything below it) in an OPTIONAL block.
    pub optional: bool,
}

impl Edge {
    pub fn label(&self) -> &EdgeLabel {
        &self.label
    }

    pub fn identity(&self) -> String {
        self.label.identity()
    }

    pub fn target(&self) -> VerticeId {
        self.target
    }

    pub fn construct_predicate(&self) -> &NamedNode {
        &self.construct_predicate
    }

    pub fn construct_direction(&self) -> ConstructDirection {
        self.construct_direction
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.label, EdgeLabel::Aggregate { .. })
    }
}

/// The query graph of one compilation.
///
/// All vertices and edges live in two arenas and reference each other by index. Nothing in the
/// graph is shared with other compilations.
#[derive(Clone, Debug)]
pub struct QueryGraph {
    vertices: Vec<Vertice>,
    edges: Vec<Edge>,
    root: VerticeId,
    variables: VariableStore,
}

impl QueryGraph {
    /// Creates a graph that only consists of its root.
    pub fn new(mut variables: VariableStore) -> Self {
        let root = Vertice::new(variables.next_variable());
        Self {
            vertices: vec![root],
            edges: Vec::new(),
            root: VerticeId(0),
            variables,
        }
    }

    pub fn root(&self) -> VerticeId {
        self.root
    }

    pub fn vertice(&self, id: VerticeId) -> &Vertice {
        &self.vertices[id.0]
    }

    pub fn vertice_mut(&mut self, id: VerticeId) -> &mut Vertice {
        &mut self.vertices[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    /// Returns a variable that is not used anywhere in the graph yet.
    pub fn next_variable(&mut self) -> Variable {
        self.variables.next_variable()
    }

    /// Creates a new child vertice below `parent`, connected by an edge labeled with the
    /// relationship of `property`.
    ///
    /// The edge is appended to the edges of `parent`.
    pub fn add_edge(
        &mut self,
        parent: VerticeId,
        property: &PropertyShape,
        config: &CompilerConfig,
        visible: bool,
        optional: bool,
    ) -> EdgeId {
        let target = VerticeId(self.vertices.len());
        let subject = self.next_variable();
        self.vertices.push(Vertice::new(subject));

        let label = match property.aggregate() {
            None => EdgeLabel::Path(property.path().clone()),
            Some(aggregate) => EdgeLabel::Aggregate {
                path: property.path().clone(),
                aggregate: aggregate.clone(),
                inner: self.next_variable(),
            },
        };
        let (construct_predicate, construct_direction) = match &label {
            EdgeLabel::Path(path) => match path.construct_predicate() {
                Some((predicate, direction)) => (predicate.clone(), direction),
                None => (
                    config.synthetic_predicate(property.name()),
                    ConstructDirection::Forward,
                ),
            },
            EdgeLabel::Aggregate { .. } => (
                config.synthetic_predicate(property.name()),
                ConstructDirection::Forward,
            ),
        };

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            label,
            construct_predicate,
            construct_direction,
            target,
            visible,
            optional,
        });
        self.vertices[parent.0].edges.push(id);
        id
    }

    /// Iterates over the outgoing edges of `vertice`.
    pub fn edges_of(&self, vertice: VerticeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.vertice(vertice)
            .edges()
            .iter()
            .map(|&id| (id, self.edge(id)))
    }

    /// Finds the outgoing edge of `vertice` whose identity is `identity` and whose target
    /// satisfies `accept`.
    pub fn find_edge(
        &self,
        vertice: VerticeId,
        identity: &str,
        accept: impl Fn(&Vertice) -> bool,
    ) -> Option<EdgeId> {
        self.edges_of(vertice)
            .find(|(_, edge)| edge.identity() == identity && accept(self.vertice(edge.target)))
            .map(|(id, _)| id)
    }

    /// The number of edges reachable from the root.
    pub fn reachable_edge_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(vertice) = stack.pop() {
            for (_, edge) in self.edges_of(vertice) {
                count += 1;
                stack.push(edge.target);
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &str) -> PropertyShape {
        PropertyShape::new(
            name,
            NamedNode::new_unchecked(format!("https://example.org/def#{name}")),
        )
    }

    #[test]
    fn test_add_edge() {
        let config = CompilerConfig::default();
        let mut graph = QueryGraph::new(VariableStore::default());
        let root = graph.root();
        let edge = graph.add_edge(root, &property("name"), &config, true, true);

        assert_eq!(graph.vertice(root).edges(), [edge]);
        let edge = graph.edge(edge);
        assert!(edge.visible && edge.optional);
        assert_eq!(graph.vertice(root).subject().as_str(), "x0");
        assert_eq!(graph.vertice(edge.target()).subject().as_str(), "x1");
        assert_eq!(edge.identity(), "<https://example.org/def#name>");
        assert_eq!(
            edge.construct_predicate().as_str(),
            "https://example.org/def#name"
        );
    }

    #[test]
    fn test_aggregate_edge_uses_synthetic_predicate() {
        let config = CompilerConfig::default();
        let mut graph = QueryGraph::new(VariableStore::default());
        let root = graph.root();
        let beer_count = PropertyShape::new(
            "beerCount",
            NamedNode::new_unchecked("https://example.org/def#beers"),
        )
        .with_aggregate(Aggregate::count().distinct());
        let edge = graph.add_edge(root, &beer_count, &config, true, true);

        let edge = graph.edge(edge);
        assert!(edge.is_aggregate());
        assert_eq!(
            edge.identity(),
            "COUNT(DISTINCT <https://example.org/def#beers>)"
        );
        assert_eq!(EdgeLabel::identity_of(&beer_count), edge.identity());
        assert_eq!(
            edge.construct_predicate().as_str(),
            "urn:shapeql:property:beerCount"
        );
    }

    #[test]
    fn test_find_edge() {
        let config = CompilerConfig::default();
        let mut graph = QueryGraph::new(VariableStore::default());
        let root = graph.root();
        graph.add_edge(root, &property("name"), &config, true, true);
        let beers = graph.add_edge(root, &property("beers"), &config, true, true);

        assert_eq!(
            graph.find_edge(root, "<https://example.org/def#beers>", |_| true),
            Some(beers)
        );
        assert_eq!(
            graph.find_edge(root, "<https://example.org/def#beers>", |_| false),
            None
        );
        assert_eq!(graph.reachable_edge_count(), 2);
    }
}
