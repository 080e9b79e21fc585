mod error;
mod literal;
mod path;
mod variables;
pub mod vocab;

pub use error::*;
pub use literal::*;
pub use path::*;
pub use variables::*;

// Re-export some oxrdf types.
pub use oxrdf::{
    IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef, Term,
    TermRef, Variable, VariableNameParseError, VariableRef,
};
