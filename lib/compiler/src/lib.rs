//! Compiles a field selection over a node shape into a SPARQL query graph and renders it.
//!
//! A compilation runs in four steps: [QueryGraphBuilder] creates one visible edge per selected
//! field, [FilterResolver] and [OrderResolver] walk their paths through the graph and attach
//! filters and sort keys, and [render] turns the result into SPARQL fragments.

mod builder;
mod constraint;
mod dedup;
mod filter;
mod graph;
mod order;
mod render;
mod walk;

pub use builder::{BuildOutput, QueryGraphBuilder};
pub use constraint::{Constraint, TypeConstraint};
pub use dedup::dedupe;
pub use filter::{Filter, FilterOperator, FilterResolver};
pub use graph::{Edge, EdgeId, EdgeLabel, QueryGraph, Vertice, VerticeId};
pub use order::{OrderResolver, Ordering, SortDirection};
pub use render::{render, RenderedGraph};
