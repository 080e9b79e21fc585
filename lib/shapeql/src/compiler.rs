//! Compiles requests against a shared [ShapeRegistry].
//!
//! The entry point of the module is the [`QueryCompiler`] struct.
//!
//! Usage example:
//! ```
//! use shapeql::compiler::{CompileRequest, QueryCompiler};
//! use shapeql::model::NamedNode;
//! use shapeql::shapes::{NodeShape, PropertyShape, SelectedField, ShapeRegistry};
//! use shapeql::CompilerConfig;
//! use std::sync::Arc;
//!
//! let ex = |name: &str| NamedNode::new(format!("https://example.org/{name}"));
//! let registry = ShapeRegistry::builder()
//!     .with_shape(
//!         NodeShape::new("Brewery")
//!             .with_target_class(ex("Brewery")?)
//!             .with_property(PropertyShape::new("name", ex("name")?).required()),
//!     )
//!     .build()?;
//!
//! let compiler = QueryCompiler::new(Arc::new(registry), CompilerConfig::default())?;
//! let request = CompileRequest::new("Brewery").with_selection([SelectedField::new("name")]);
//! let query = compiler.compile(&request)?;
//!
//! assert!(query.errors().is_empty());
//! assert!(query.select_query().starts_with("SELECT DISTINCT ?x0"));
//! assert!(query.select_query().ends_with("LIMIT 10"));
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

use shapeql_common::{CompileError, CompileResult, CompilerConfig, FieldError};
use shapeql_compiler::{
    render, BuildOutput, FilterResolver, OrderResolver, QueryGraphBuilder, RenderedGraph,
};
use shapeql_shapes::{FilterRule, OrderBy, Paging, SelectedField, ShapeRegistry};
use std::sync::Arc;

/// Everything a client asks for in one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileRequest {
    /// The name of the node shape the request starts from.
    pub shape: String,
    pub selection: Vec<SelectedField>,
    /// Filters that are not attached to a selected field, relative to the root shape.
    pub filters: Vec<FilterRule>,
    /// Sort keys in priority order.
    pub order_by: Vec<OrderBy>,
    pub paging: Paging,
}

impl CompileRequest {
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: impl IntoIterator<Item = SelectedField>) -> Self {
        self.selection = selection.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    #[must_use]
    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }
}

/// The result of a compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledQuery {
    rendered: RenderedGraph,
    limit: usize,
    offset: usize,
    errors: Vec<FieldError>,
}

impl CompiledQuery {
    pub fn rendered(&self) -> &RenderedGraph {
        &self.rendered
    }

    /// The query that describes the selected fields of all matching nodes.
    pub fn construct_query(&self) -> String {
        self.rendered.construct_query()
    }

    /// The query that selects the requested page of matching nodes.
    pub fn select_query(&self) -> String {
        self.rendered.select_query(self.limit, self.offset)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The fields and arguments that were left out of the query.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether the whole request made it into the query.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compiles [CompileRequest]s into SPARQL.
///
/// A compiler is cheap to clone and can be used from many threads at once. Every compilation
/// builds its own query graph, so concurrent compilations of the same request produce identical
/// text.
#[derive(Clone, Debug)]
pub struct QueryCompiler {
    registry: Arc<ShapeRegistry>,
    config: Arc<CompilerConfig>,
}

impl QueryCompiler {
    /// Creates a compiler. Fails if `config` is not valid.
    pub fn new(registry: Arc<ShapeRegistry>, config: CompilerConfig) -> CompileResult<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            config: Arc::new(config),
        })
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles `request`.
    ///
    /// Selected fields, filters and sort keys that cannot be resolved are skipped and reported in
    /// [CompiledQuery::errors]. The compilation only fails if the root shape is unknown or if a
    /// shape has class constraints that cannot be expressed.
    #[tracing::instrument(skip_all, fields(shape = %request.shape))]
    pub fn compile(&self, request: &CompileRequest) -> CompileResult<CompiledQuery> {
        let shape = self.registry.resolve(&request.shape)?;
        let BuildOutput {
            mut graph,
            filters,
            mut errors,
        } = QueryGraphBuilder::new(&self.registry, &self.config).build(shape, &request.selection)?;

        let filter_resolver = FilterResolver::new(&self.registry, &self.config);
        for rule in filters.iter().chain(&request.filters) {
            if let Err(error) = filter_resolver.apply_filter(&mut graph, shape, rule) {
                skip_argument(&mut errors, rule.path.to_string(), error)?;
            }
        }

        let order_resolver = OrderResolver::new(&self.registry, &self.config);
        for order in &request.order_by {
            if let Err(error) = order_resolver.apply_order(&mut graph, shape, order) {
                skip_argument(&mut errors, order.path.to_string(), error)?;
            }
        }

        let (limit, offset) = self.page(request.paging);
        tracing::debug!(
            edges = graph.reachable_edge_count(),
            errors = errors.len(),
            limit,
            offset,
            "Compiled query"
        );
        Ok(CompiledQuery {
            rendered: render(&graph),
            limit,
            offset,
            errors,
        })
    }

    fn page(&self, paging: Paging) -> (usize, usize) {
        let limit = paging
            .first
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        (limit, paging.offset.unwrap_or_default())
    }
}

fn skip_argument(
    errors: &mut Vec<FieldError>,
    field: String,
    error: CompileError,
) -> CompileResult<()> {
    if !error.is_field_scoped() {
        return Err(error);
    }
    tracing::warn!(%field, %error, "Skipping argument");
    errors.push(FieldError::new(field, error));
    Ok(())
}
