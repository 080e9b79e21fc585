#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod compiler;

pub mod error {
    pub use shapeql_common::{CompileError, CompileResult, FieldError};
}

pub mod model {
    pub use shapeql_model::*;
}

pub mod shapes {
    pub use shapeql_shapes::*;
}

pub mod graph {
    pub use shapeql_compiler::*;
}

pub use shapeql_common::CompilerConfig;
