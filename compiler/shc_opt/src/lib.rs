//! Per-stage optimization for shc.
//!
//! [`optimize_stage`] prunes a parsed shader down to what one stage's entry
//! can reach and folds constants on a private copy of the arena. The result
//! is a [`StageView`] that generators read; the shader itself is never
//! modified, so each stage sees only its own rewrites.

mod fold;
mod reach;
mod walk;

#[cfg(test)]
mod tests;

pub use walk::{children, Children};

use fold::Folder;
use reach::Reach;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{
    DenseId, FunctionId, NodeArena, Shader, Span, Stage, StructId, TextureId, VariableId,
};

/// What one stage's entry reaches, over a folded copy of the arena.
#[derive(Clone, Debug)]
pub struct StageView {
    pub stage: Stage,
    pub entry: FunctionId,
    /// Folded copy of the shader's arena. Node ids match the original.
    pub arena: NodeArena,
    /// Reachable functions with callees before callers; the entry is last.
    pub functions: Vec<FunctionId>,
    /// Reachable structs in declaration order.
    pub structs: Vec<StructId>,
    /// Uniform buffers read by the stage, in declaration order.
    pub buffers: Vec<VariableId>,
    /// Global constants referenced by the stage, in declaration order.
    pub constants: Vec<VariableId>,
    /// Textures referenced by the stage, in declaration order.
    pub textures: Vec<TextureId>,
}

impl StageView {
    pub fn helpers(&self) -> &[FunctionId] {
        &self.functions[..self.functions.len().saturating_sub(1)]
    }

    pub fn uses_buffer(&self, var: VariableId) -> bool {
        self.buffers.contains(&var)
    }

    pub fn uses_texture(&self, texture: TextureId) -> bool {
        self.textures.contains(&texture)
    }
}

fn sorted<I: DenseId + Copy>(set: impl IntoIterator<Item = I>) -> Vec<I> {
    let mut ids: Vec<I> = set.into_iter().collect();
    ids.sort_by_key(|id| id.index());
    ids
}

/// Build the optimized view of `stage`.
///
/// Fails when the shader has no entry for the stage, or when code reachable
/// from the entry uses an operation the stage does not allow.
#[tracing::instrument(level = "debug", skip_all, fields(shader = %shader.name, %stage))]
pub fn optimize_stage(shader: &Shader, stage: Stage) -> CompileResult<StageView> {
    let Some(entry) = shader.entry(stage) else {
        return Err(CompileError::semantic(
            ErrorCode::E2010,
            format!("shader `{}` has no {stage} entry", shader.name),
            Span::DUMMY,
            0,
        ));
    };

    let mut folder = Folder::new(shader, stage);
    let mut reach = Reach::default();
    reach.visit_function(shader, &mut folder, entry)?;

    let view = StageView {
        stage,
        entry,
        functions: reach.functions,
        structs: sorted(reach.structs),
        buffers: sorted(reach.buffers),
        constants: sorted(reach.constants),
        textures: sorted(reach.textures),
        arena: folder.arena,
    };
    tracing::debug!(
        functions = view.functions.len(),
        buffers = view.buffers.len(),
        textures = view.textures.len(),
        folded = folder.folded,
        "stage optimized"
    );
    Ok(view)
}
