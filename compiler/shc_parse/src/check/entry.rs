//! Stage entry validation.

use crate::Parser;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{Direction, FunctionId, Stage, StructId, SystemValue, Token, TypeId};

/// Upper bound on threads per compute group.
const MAX_GROUP_THREADS: u64 = 1024;

impl Parser<'_> {
    /// Check an entry's signature against its stage and claim the render
    /// targets a fragment entry writes.
    pub(crate) fn validate_entry(
        &mut self,
        stage: Stage,
        function: FunctionId,
        name: Token,
    ) -> CompileResult<()> {
        let def = self.shader.functions.get(function);
        let return_ty = def.return_ty;
        let params = def.params.clone();

        match stage {
            Stage::Vertex => {
                let output = self.entry_struct(return_ty, "vertex", name)?;
                let positions = self.check_struct_io(output, stage, Direction::Out)?;
                if positions.iter().filter(|&&sv| sv == SystemValue::Position).count() != 1 {
                    return Err(self.semantic_at(
                        ErrorCode::E2010,
                        "vertex entry must return a struct with exactly one `sv_position` field",
                        name,
                    ));
                }
            }
            Stage::Fragment => {
                let output = self.entry_struct(return_ty, "fragment", name)?;
                let record = self.shader.structs.get(output);
                if let Some(field) = record.fields.iter().find(|f| !f.semantic.is_some_and(SystemValue::is_fragment_output)) {
                    return Err(CompileError::semantic(
                        ErrorCode::E2010,
                        format!(
                            "fragment output field `{}` must carry `sv_target*` or `sv_depth`",
                            self.name_text(field.name)
                        ),
                        field.span,
                        field.line,
                    ));
                }
                let values = self.check_struct_io(output, stage, Direction::Out)?;
                for value in values {
                    if let SystemValue::Target(slot) = value {
                        if self.shader.target_slots.claim(u32::from(slot)).is_err() {
                            return Err(self.semantic_at(
                                ErrorCode::E2007,
                                format!("render target {slot} is already claimed"),
                                name,
                            ));
                        }
                    }
                }
            }
            Stage::Compute => {
                if return_ty != TypeId::VOID {
                    return Err(self.semantic_at(
                        ErrorCode::E2010,
                        "compute entry must return `void`",
                        name,
                    ));
                }
            }
        }

        let mut struct_inputs = 0;
        for param in params {
            let var = self.shader.variables.get(param);
            let (ty, semantic, line, param_name) = (var.ty, var.semantic, var.line, var.name);
            if let Some(sv) = semantic {
                if !sv.allowed(stage, Direction::In) {
                    return Err(CompileError::semantic(
                        ErrorCode::E2009,
                        format!("`{}` is not a {stage} input", sv.name()),
                        name.span,
                        line,
                    ));
                }
                continue;
            }
            match self.shader.types.struct_id(ty) {
                Some(input) if stage != Stage::Compute => {
                    struct_inputs += 1;
                    if struct_inputs > 1 {
                        return Err(CompileError::semantic(
                            ErrorCode::E2010,
                            format!("{stage} entry takes at most one input struct"),
                            name.span,
                            line,
                        ));
                    }
                    self.check_struct_io(input, stage, Direction::In)?;
                }
                _ => {
                    return Err(CompileError::semantic(
                        ErrorCode::E2010,
                        format!(
                            "parameter `{}` of the {stage} entry needs a system-value semantic",
                            self.name_text(param_name)
                        ),
                        name.span,
                        line,
                    ));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn validate_thread_group(&self, dims: [u32; 3], at: Token) -> CompileResult<()> {
        let product: u64 = dims.iter().map(|&d| u64::from(d)).product();
        if dims.contains(&0) || product > MAX_GROUP_THREADS {
            return Err(self.semantic_at(
                ErrorCode::E2010,
                format!(
                    "thread group {}x{}x{} must have every dimension >= 1 and at most {MAX_GROUP_THREADS} threads",
                    dims[0], dims[1], dims[2]
                ),
                at,
            ));
        }
        Ok(())
    }

    fn entry_struct(&self, ty: TypeId, stage: &str, name: Token) -> CompileResult<StructId> {
        self.shader.types.struct_id(ty).ok_or_else(|| {
            self.semantic_at(
                ErrorCode::E2010,
                format!("{stage} entry must return a struct, found `{}`", self.type_name(ty)),
                name,
            )
        })
    }

    /// Every semantic in the struct must be legal on this side of the
    /// stage. Returns the semantics in field order.
    fn check_struct_io(
        &self,
        id: StructId,
        stage: Stage,
        direction: Direction,
    ) -> CompileResult<Vec<SystemValue>> {
        let record = self.shader.structs.get(id);
        let mut values = Vec::new();
        for field in &record.fields {
            let Some(sv) = field.semantic else { continue };
            if !sv.allowed(stage, direction) {
                let side = match direction {
                    Direction::In => "input",
                    Direction::Out => "output",
                };
                return Err(CompileError::semantic(
                    ErrorCode::E2009,
                    format!(
                        "`{}` on field `{}` is not a {stage} {side}",
                        sv.name(),
                        self.name_text(field.name)
                    ),
                    field.span,
                    field.line,
                ));
            }
            values.push(sv);
        }
        Ok(values)
    }
}
