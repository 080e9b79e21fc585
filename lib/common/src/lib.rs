mod config;
pub mod error;

pub use config::CompilerConfig;
pub use error::{CompileError, FieldError};

pub type CompileResult<T> = Result<T, CompileError>;
