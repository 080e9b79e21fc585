//! Vocabularies used while rendering query graphs.

pub use oxrdf::vocab::{rdf, rdfs, xsd};
