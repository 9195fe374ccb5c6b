//! The shc shader compiler.
//!
//! ```text
//! source ──► preprocess (once per backend define)
//!               │
//!               ▼
//!            parse ──► Shader           (shared across identical expansions)
//!               │
//!               ▼
//!     optimize_stage ──► StageView      (per stage)
//!               │
//!               ▼
//!     generate_stage ──► text           (per stage × backend, concurrently)
//!               │
//!               ▼
//!             pack ──► ShaderRecord     (blob + offsets + reflection)
//! ```
//!
//! Every error is fatal to the file that raised it. Files never share AST
//! state, so a batch compiles them in parallel.

pub mod build;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod preprocess;
pub mod record;

pub use build::{build_file, build_files, shader_name, write_record, BuildError, FileOutcome};
pub use config::BuildConfig;
pub use pipeline::compile_source;
pub use preprocess::{preprocess, Defines};
pub use record::{OutputEntry, ShaderRecord};

pub use shc_diagnostic::{render, CompileError, CompileResult, ErrorCode, ErrorKind};
pub use shc_ir::{Backend, Stage};
