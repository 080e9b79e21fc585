use crate::dedup::dedupe;
use crate::graph::{QueryGraph, VerticeId};
use crate::walk::{attach_type_constraint, attach_value_constraint};
use shapeql_common::{CompileResult, CompilerConfig, FieldError};
use shapeql_shapes::{FilterRule, NodeShape, SelectedField, ShapeRegistry};

/// The result of building the query graph for a selection.
#[derive(Clone, Debug)]
pub struct BuildOutput {
    pub graph: QueryGraph,
    /// Filter arguments found on selected fields, with paths relative to the root shape.
    pub filters: Vec<FilterRule>,
    /// Fields that could not be compiled. The rest of the selection is part of the graph.
    pub errors: Vec<FieldError>,
}

/// Turns a node shape and a field selection into a [QueryGraph].
///
/// The builder only reads from the registry. Everything it creates belongs to the returned graph.
#[derive(Clone, Copy, Debug)]
pub struct QueryGraphBuilder<'a> {
    registry: &'a ShapeRegistry,
    config: &'a CompilerConfig,
}

struct BuildState {
    graph: QueryGraph,
    filters: Vec<FilterRule>,
    errors: Vec<FieldError>,
}

impl<'a> QueryGraphBuilder<'a> {
    pub fn new(registry: &'a ShapeRegistry, config: &'a CompilerConfig) -> Self {
        Self { registry, config }
    }

    /// Builds the graph for `fields` selected on `shape`.
    ///
    /// Every selected field becomes a visible edge below the root that is optional unless the
    /// property is mandatory. Fields with a nested shape recurse into their own selection. A field
    /// without a property shape is reported in [BuildOutput::errors] and skipped. Only an
    /// ambiguous class constraint fails the whole build.
    pub fn build(&self, shape: &NodeShape, fields: &[SelectedField]) -> CompileResult<BuildOutput> {
        let mut state = BuildState {
            graph: QueryGraph::new(self.config.variable_store()?),
            filters: Vec::new(),
            errors: Vec::new(),
        };
        let root = state.graph.root();
        self.build_vertice(&mut state, root, shape, fields, &[])?;

        Ok(BuildOutput {
            graph: state.graph,
            filters: state.filters,
            errors: state.errors,
        })
    }

    fn build_vertice(
        &self,
        state: &mut BuildState,
        vertice: VerticeId,
        shape: &NodeShape,
        fields: &[SelectedField],
        prefix: &[String],
    ) -> CompileResult<()> {
        let mut wrapper_filters = Vec::new();
        let selection = unwrap_selection(fields, shape, &mut wrapper_filters);
        state
            .filters
            .extend(wrapper_filters.into_iter().map(|filter| filter.prefixed(prefix)));

        for field in selection {
            match self.build_field(state, vertice, shape, field, prefix) {
                Ok(()) => {}
                Err(error) if error.is_field_scoped() => {
                    tracing::warn!(field = %field.qualified_name, %error, "Skipping field");
                    state
                        .errors
                        .push(FieldError::new(field.qualified_name.as_str(), error));
                }
                Err(error) => return Err(error),
            }
        }

        dedupe(&mut state.graph, vertice);
        attach_type_constraint(&mut state.graph, vertice, shape)
    }

    fn build_field(
        &self,
        state: &mut BuildState,
        vertice: VerticeId,
        shape: &NodeShape,
        field: &SelectedField,
        prefix: &[String],
    ) -> CompileResult<()> {
        let property = shape.resolve_property(&field.name)?;
        let nested = self.registry.nested_shape(property)?;

        let edge = state.graph.add_edge(
            vertice,
            property,
            self.config,
            true,
            !property.is_required(),
        );
        let target = state.graph.edge(edge).target();
        attach_value_constraint(&mut state.graph, target, property);

        let mut path = prefix.to_vec();
        path.push(field.name.clone());
        state
            .filters
            .extend(field.filters.iter().map(|filter| filter.prefixed(&path)));

        if let Some(nested) = nested {
            self.build_vertice(state, target, nested, &field.children, &path)?;
        }
        Ok(())
    }
}

/// Returns the fields of `fields` that map to properties of `shape`.
///
/// Meta fields are dropped. Connection or reference wrappers (`nodes`, `node`) that are not a
/// property of the shape are replaced by their children. Their filters address `shape` and are
/// pushed onto `filters`.
fn unwrap_selection<'f>(
    fields: &'f [SelectedField],
    shape: &NodeShape,
    filters: &mut Vec<&'f FilterRule>,
) -> Vec<&'f SelectedField> {
    let mut result = Vec::with_capacity(fields.len());
    for field in fields {
        if field.is_meta() {
            continue;
        }
        if field.is_wrapper() && shape.property(&field.name).is_none() {
            filters.extend(&field.filters);
            result.extend(unwrap_selection(&field.children, shape, filters));
        } else {
            result.push(field);
        }
    }
    result
}
