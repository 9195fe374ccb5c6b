//! Errors for all shc compiler phases.
//!
//! Lexing, parsing, semantic checking and code generation all report
//! [`CompileError`]. Each error is fatal to the file that produced it; there
//! is no warning-only mode.

mod error;
mod error_code;
mod render;

pub use error::{CompileError, ErrorKind, Location};
pub use error_code::ErrorCode;
pub use render::render;

/// Result alias used across the compiler crates.
pub type CompileResult<T> = Result<T, CompileError>;
