//! Code generation for shc.
//!
//! A single driver walks a [`StageView`] and emits one stage for one
//! backend. Everything target-specific (type spelling, intrinsic mapping,
//! resource binding syntax, entry boilerplate) comes from the backend's
//! dialect; the backend set is closed, so [`generate_stage`] matches each
//! [`Backend`] to one driver instance. [`reflect`] derives the host-side
//! binding and layout metadata.
//!
//! Views are read-only here. Backends for the same stage can therefore run
//! concurrently, and a construct one target cannot express fails only that
//! target.

mod dialect;
mod driver;
mod interface;
mod layout;
mod reflect;
mod writer;

#[cfg(test)]
mod tests;

pub use reflect::{
    reflect, BindingConflict, BufferField, BufferLayout, ConflictSubject, Reflection,
    RenderTarget, TextureBinding, VertexAttribute, VertexFormat,
};

use dialect::{Glsl, Hlsl, Metal};
use driver::Generator;
use rayon::prelude::*;
use shc_diagnostic::CompileResult;
use shc_ir::{Backend, Shader};
use shc_opt::StageView;

/// Emit `view`'s stage as `backend` source text.
#[tracing::instrument(level = "debug", skip_all, fields(stage = %view.stage, %backend))]
pub fn generate_stage(shader: &Shader, view: &StageView, backend: Backend) -> CompileResult<String> {
    let text = match backend {
        Backend::Hlsl => Generator::new(shader, view, &Hlsl).run(),
        Backend::Glsl => Generator::new(shader, view, &Glsl).run(),
        Backend::Metal => Generator::new(shader, view, &Metal).run(),
    }?;
    tracing::debug!(bytes = text.len(), "stage generated");
    Ok(text)
}

/// Emit one stage for several backends. Each result stands alone: a
/// failure on one backend leaves the others intact.
pub fn generate_backends(
    shader: &Shader,
    view: &StageView,
    backends: &[Backend],
    parallel: bool,
) -> Vec<(Backend, CompileResult<String>)> {
    let run = |&backend: &Backend| (backend, generate_stage(shader, view, backend));
    if parallel {
        backends.par_iter().map(run).collect()
    } else {
        backends.iter().map(run).collect()
    }
}
