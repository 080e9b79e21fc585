use crate::graph::QueryGraph;
use crate::walk::{find_or_create, resolve_steps};
use shapeql_common::{CompileError, CompileResult, CompilerConfig};
use shapeql_model::Variable;
use shapeql_shapes::{NodeShape, OrderBy, ShapeRegistry};
use std::fmt::{Display, Formatter};

/// The direction of an [Ordering].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses a requested direction.
    ///
    /// Only `ASC` (in any case) sorts ascending. A missing or unrecognized direction sorts
    /// descending, which callers relying on the more common ascending default should be aware of.
    pub fn parse(direction: Option<&str>) -> Self {
        match direction {
            Some(direction) if direction.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

/// A sort key of the query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ordering {
    pub direction: SortDirection,
    pub key: Variable,
    /// Whether the key may be unbound and must be replaced by a fallback value.
    pub null_safe: bool,
}

/// Attaches [OrderBy] arguments to the root of the query graph.
#[derive(Clone, Copy, Debug)]
pub struct OrderResolver<'a> {
    registry: &'a ShapeRegistry,
    config: &'a CompilerConfig,
}

impl<'a> OrderResolver<'a> {
    pub fn new(registry: &'a ShapeRegistry, config: &'a CompilerConfig) -> Self {
        Self { registry, config }
    }

    /// Resolves the path of `order` relative to `shape` and appends an [Ordering] to the root.
    ///
    /// The sort key is the variable of the vertice the path ends in: the aggregate variable for
    /// aggregates, the value for literals and the identifier for resources. If any edge on the
    /// path is optional, the key is marked null-safe. Edges keep their optionality; only filters
    /// make them required.
    pub fn apply_order(
        &self,
        graph: &mut QueryGraph,
        shape: &NodeShape,
        order: &OrderBy,
    ) -> CompileResult<()> {
        let direction = SortDirection::parse(order.direction.as_deref());

        let (key, null_safe) = if order.is_resource && order.path.is_empty() {
            (graph.vertice(graph.root()).subject().clone(), false)
        } else {
            let steps = resolve_steps(self.registry, shape, order.path.segments())?;
            if steps.is_empty() {
                return Err(CompileError::shape_resolution("", shape.name()));
            }
            let resolved = find_or_create(graph, self.config, &steps)?;
            let null_safe = resolved
                .edges
                .iter()
                .any(|&edge| graph.edge(edge).optional);
            (graph.vertice(resolved.target).subject().clone(), null_safe)
        };

        tracing::debug!(field = %order.path, %direction, null_safe, "Attaching ordering");
        let root = graph.root();
        graph.vertice_mut(root).add_ordering(Ordering {
            direction,
            key,
            null_safe,
        });
        Ok(())
    }
}
