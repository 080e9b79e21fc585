//! The inputs of the query graph compiler.
//!
//! A [ShapeRegistry] describes the entity types of the API. It is built once at startup and is
//! read-only afterwards. A request consists of a tree of [SelectedField]s and the pre-parsed
//! [FilterRule], [OrderBy] and [Paging] arguments.

mod arguments;
mod registry;
mod selection;
mod shape;

pub use arguments::{FieldPath, FilterJoin, FilterRule, OrderBy, Paging};
pub use registry::{ShapeRegistry, ShapeRegistryBuilder};
pub use selection::SelectedField;
pub use shape::{Aggregate, AggregateFunction, NodeKind, NodeShape, PropertyShape};
