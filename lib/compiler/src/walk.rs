use crate::constraint::{Constraint, TypeConstraint};
use crate::graph::{EdgeId, EdgeLabel, QueryGraph, Vertice, VerticeId};
use shapeql_common::{CompileError, CompileResult, CompilerConfig};
use shapeql_shapes::{NodeShape, PropertyShape, ShapeRegistry};

/// One resolved segment of a dotted field path.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PathStep<'s> {
    pub property: &'s PropertyShape,
    pub nested: Option<&'s NodeShape>,
}

/// The edges visited while walking a field path and the vertice the path ends in.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedPath {
    pub edges: Vec<EdgeId>,
    pub target: VerticeId,
}

/// Resolves every segment of `segments` against the shapes, starting at `shape`.
///
/// Does not touch any query graph, so a path that cannot be resolved leaves no traces.
pub(crate) fn resolve_steps<'s>(
    registry: &'s ShapeRegistry,
    shape: &'s NodeShape,
    segments: &[String],
) -> CompileResult<Vec<PathStep<'s>>> {
    let mut steps: Vec<PathStep<'s>> = Vec::with_capacity(segments.len());
    let mut current = shape;
    for segment in segments {
        if let Some(previous) = steps.last() {
            current = previous
                .nested
                .ok_or_else(|| CompileError::shape_resolution(segment, current.name()))?;
        }
        let property = current.resolve_property(segment)?;
        let nested = registry.nested_shape(property)?;
        steps.push(PathStep { property, nested });
    }
    Ok(steps)
}

/// Walks `steps` from the root of `graph`, reusing existing edges where possible.
///
/// An existing edge is reused if it has the identity of the step's property and, for object
/// valued properties, its target carries the class constraint of the nested shape. Otherwise, an
/// invisible edge is created that is optional unless the property is mandatory.
pub(crate) fn find_or_create(
    graph: &mut QueryGraph,
    config: &CompilerConfig,
    steps: &[PathStep<'_>],
) -> CompileResult<ResolvedPath> {
    let mut vertice = graph.root();
    let mut edges = Vec::with_capacity(steps.len());
    for step in steps {
        let identity = EdgeLabel::identity_of(step.property);
        let existing = graph.find_edge(vertice, &identity, |child| {
            step.nested
                .map_or(true, |nested| has_classes_of(child, nested))
        });
        let edge = match existing {
            Some(edge) => edge,
            None => {
                let edge = graph.add_edge(
                    vertice,
                    step.property,
                    config,
                    false,
                    !step.property.is_required(),
                );
                let child = graph.edge(edge).target();
                attach_value_constraint(graph, child, step.property);
                if let Some(nested) = step.nested {
                    attach_type_constraint(graph, child, nested)?;
                }
                tracing::trace!(identity = %identity, "Created edge while resolving a field path");
                edge
            }
        };
        edges.push(edge);
        vertice = graph.edge(edge).target();
    }
    Ok(ResolvedPath {
        edges,
        target: vertice,
    })
}

/// Marks every edge in `edges` as non-optional.
pub(crate) fn force_required(graph: &mut QueryGraph, edges: &[EdgeId]) {
    for &edge in edges {
        graph.edge_mut(edge).optional = false;
    }
}

/// Attaches the class constraint of `shape` to `vertice`.
pub(crate) fn attach_type_constraint(
    graph: &mut QueryGraph,
    vertice: VerticeId,
    shape: &NodeShape,
) -> CompileResult<()> {
    if let Some(constraint) = TypeConstraint::try_from_shape(shape, || graph.next_variable())? {
        graph
            .vertice_mut(vertice)
            .add_constraint(Constraint::Type(constraint));
    }
    Ok(())
}

/// Attaches the fixed value of `property`, if any, to `vertice`.
pub(crate) fn attach_value_constraint(
    graph: &mut QueryGraph,
    vertice: VerticeId,
    property: &PropertyShape,
) {
    if let Some(value) = property.has_value() {
        graph
            .vertice_mut(vertice)
            .add_constraint(Constraint::Value(value.clone()));
    }
}

/// Whether `vertice` carries the class constraint of `shape`.
fn has_classes_of(vertice: &Vertice, shape: &NodeShape) -> bool {
    match vertice.constraints().iter().find_map(Constraint::as_type) {
        Some(constraint) => constraint.has_same_classes(shape.target_classes()),
        None => shape.target_classes().is_empty(),
    }
}
