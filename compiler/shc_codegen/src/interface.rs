//! Stage interface: what crosses the boundary of an entry point.

use shc_ir::{FunctionId, Shader, StructDef, StructId, SystemValue, TypeId, TypeKind, TypeTable, VariableId};

#[derive(Copy, Clone, Debug)]
pub(crate) enum Input {
    System(SystemValue),
    Struct(StructId),
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct EntryParam {
    pub(crate) var: VariableId,
    pub(crate) ty: TypeId,
    pub(crate) input: Input,
}

pub(crate) struct Interface {
    pub(crate) params: Vec<EntryParam>,
    /// Returned struct; `None` for compute.
    pub(crate) output: Option<StructId>,
}

impl Interface {
    pub(crate) fn of(shader: &Shader, entry: FunctionId) -> Self {
        let def = shader.functions.get(entry);
        let params = def
            .params
            .iter()
            .filter_map(|&var| {
                let param = shader.variables.get(var);
                let input = match (param.semantic, shader.types.struct_id(param.ty)) {
                    (Some(sv), _) => Input::System(sv),
                    (None, Some(id)) => Input::Struct(id),
                    (None, None) => return None,
                };
                Some(EntryParam {
                    var,
                    ty: param.ty,
                    input,
                })
            })
            .collect();
        Interface {
            params,
            output: shader.types.struct_id(def.return_ty),
        }
    }

    /// The input struct of a vertex or fragment entry.
    pub(crate) fn input_struct(&self) -> Option<StructId> {
        self.params.iter().find_map(|param| match param.input {
            Input::Struct(id) => Some(id),
            Input::System(_) => None,
        })
    }

    pub(crate) fn is_io_struct(&self, id: StructId) -> bool {
        self.output == Some(id) || self.input_struct() == Some(id)
    }
}

/// Interface locations of a struct's fields, in field order. System-value
/// fields have none; matrices and arrays take one location per row or
/// element.
pub(crate) fn locations(types: &TypeTable, def: &StructDef) -> Vec<Option<u32>> {
    let mut next = 0;
    def.fields
        .iter()
        .map(|field| {
            if field.semantic.is_some() {
                return None;
            }
            let location = next;
            next += location_count(types, field.ty);
            Some(location)
        })
        .collect()
}

fn location_count(types: &TypeTable, ty: TypeId) -> u32 {
    match types.kind(ty) {
        TypeKind::Matrix(_, dim) => u32::from(dim),
        TypeKind::Array(element, len) => len * location_count(types, element),
        _ => 1,
    }
}
