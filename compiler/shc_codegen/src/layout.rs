//! Uniform buffer layout.
//!
//! Reflection publishes std140 offsets for every target. GLSL blocks are
//! declared `std140` and need nothing more. HLSL cbuffers and Metal structs
//! pack by their own rules, so a struct reachable from a buffer is emitted
//! with `float` padding members that put each field at its std140 offset.
//! Metal additionally widens scalar and two-component array elements to
//! four components, and packs a `*3` field when the next field sits in its
//! last word.

use crate::dialect::Unsupported;
use rustc_hash::FxHashMap;
use shc_diagnostic::ErrorCode;
use shc_ir::{Backend, Name, ScalarKind, Shader, StructId, TypeId, TypeKind};

pub(crate) const fn align(offset: u32, alignment: u32) -> u32 {
    offset.div_ceil(alignment) * alignment
}

pub(crate) struct Std140<'a> {
    pub(crate) shader: &'a Shader,
}

impl Std140<'_> {
    /// Size and base alignment of `ty`.
    pub(crate) fn size_align(&self, ty: TypeId) -> (u32, u32) {
        match self.shader.types.kind(ty) {
            TypeKind::Void => (0, 1),
            TypeKind::Scalar(_) => (4, 4),
            TypeKind::Vector(_, 2) => (8, 8),
            TypeKind::Vector(_, 3) => (12, 16),
            TypeKind::Vector(..) => (16, 16),
            TypeKind::Matrix(_, dim) => (16 * u32::from(dim), 16),
            TypeKind::Array(element, len) => (self.array_stride(element) * len, 16),
            TypeKind::Struct(id) => {
                let end = self
                    .offsets(id)
                    .last()
                    .map_or(0, |&(offset, size)| offset + size);
                (align(end, 16), 16)
            }
        }
    }

    pub(crate) fn array_stride(&self, element: TypeId) -> u32 {
        let (size, alignment) = self.size_align(element);
        align(align(size, alignment), 16)
    }

    /// `(offset, size)` of each field of `id`, in declaration order.
    pub(crate) fn offsets(&self, id: StructId) -> Vec<(u32, u32)> {
        let mut end = 0;
        let mut offsets = Vec::new();
        for field in &self.shader.structs.get(id).fields {
            let (size, alignment) = self.size_align(field.ty);
            let offset = align(end, alignment);
            offsets.push((offset, size));
            end = offset + size;
        }
        offsets
    }
}

/// How a buffer struct field is declared on the target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Spelling {
    #[default]
    Native,
    /// Metal `packed_<scalar>3`.
    Packed,
    /// Array elements widened to four components; an element read selects
    /// the swizzle.
    Widened(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FieldLayout {
    /// `float` padding members emitted before the field.
    pub(crate) pad_before: u32,
    pub(crate) spelling: Spelling,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StructLayout {
    pub(crate) fields: Vec<FieldLayout>,
    pub(crate) pad_after: u32,
}

impl StructLayout {
    pub(crate) fn is_native(&self) -> bool {
        self.pad_after == 0 && self.fields.iter().all(|field| *field == FieldLayout::default())
    }
}

/// A field no padding can place, with its source line.
pub(crate) type LayoutError = (Unsupported, u32);

/// Layouts of every struct reachable from the buffer types `roots`, for
/// `backend`.
pub(crate) fn buffer_layouts(
    shader: &Shader,
    backend: Backend,
    roots: impl IntoIterator<Item = TypeId>,
) -> Result<FxHashMap<StructId, StructLayout>, LayoutError> {
    let mut layouts = FxHashMap::default();
    if backend == Backend::Glsl {
        return Ok(layouts);
    }
    let mut pending: Vec<StructId> = roots
        .into_iter()
        .filter_map(|ty| shader.types.struct_id(ty))
        .collect();
    let std140 = Std140 { shader };
    while let Some(id) = pending.pop() {
        if layouts.contains_key(&id) {
            continue;
        }
        let layout = struct_layout(&std140, id, backend)?;
        for field in &shader.structs.get(id).fields {
            if let Some(inner) = shader.types.struct_id(innermost(shader, field.ty)) {
                pending.push(inner);
            }
        }
        layouts.insert(id, layout);
    }
    Ok(layouts)
}

fn innermost(shader: &Shader, ty: TypeId) -> TypeId {
    match shader.types.kind(ty) {
        TypeKind::Array(element, _) => innermost(shader, element),
        _ => ty,
    }
}

fn struct_layout(std140: &Std140<'_>, id: StructId, backend: Backend) -> Result<StructLayout, LayoutError> {
    let shader = std140.shader;
    let def = shader.structs.get(id);
    let offsets = std140.offsets(id);
    let mut fields = Vec::with_capacity(def.fields.len());
    let mut native_end = 0;
    for (index, field) in def.fields.iter().enumerate() {
        let (offset, _) = offsets[index];
        if backend == Backend::Metal {
            check_metal_field(shader, id, field.name, field.ty).map_err(|error| (error, field.line))?;
        }
        let next = offsets.get(index + 1).map(|&(next, _)| next);
        let spelling = match (backend, shader.types.kind(field.ty)) {
            (Backend::Metal, TypeKind::Vector(_, 3)) if next.is_some_and(|next| next < offset + 16) => {
                Spelling::Packed
            }
            (Backend::Metal, TypeKind::Array(..)) => {
                match shader.types.kind(innermost(shader, field.ty)) {
                    TypeKind::Scalar(_) => Spelling::Widened("x"),
                    TypeKind::Vector(_, 2) => Spelling::Widened("xy"),
                    _ => Spelling::Native,
                }
            }
            _ => Spelling::Native,
        };
        fields.push(FieldLayout {
            pad_before: (offset - native_end) / 4,
            spelling,
        });
        native_end = offset + native_size(std140, backend, field.ty, spelling);
    }
    let (size, _) = std140.size_align(def.ty);
    Ok(StructLayout {
        fields,
        pad_after: (size - native_end) / 4,
    })
}

/// Bytes `ty` occupies on `backend` when declared with `spelling` inside a
/// padded struct.
fn native_size(std140: &Std140<'_>, backend: Backend, ty: TypeId, spelling: Spelling) -> u32 {
    let types = &std140.shader.types;
    match (backend, types.kind(ty)) {
        (_, TypeKind::Void) => 0,
        (_, TypeKind::Scalar(_)) => 4,
        (Backend::Metal, TypeKind::Vector(_, 3)) if spelling != Spelling::Packed => 16,
        (_, TypeKind::Vector(_, width)) => 4 * u32::from(width),
        (Backend::Hlsl, TypeKind::Matrix(_, dim)) => 16 * (u32::from(dim) - 1) + 4 * u32::from(dim),
        (Backend::Hlsl, TypeKind::Array(element, len)) => {
            let element_size = native_size(std140, backend, element, Spelling::Native);
            align(element_size, 16) * (len - 1) + element_size
        }
        // Matrices, arrays with widened elements and padded structs all
        // take their std140 size.
        _ => std140.size_align(ty).0,
    }
}

/// Metal scalars narrower than four bytes and `float2x2` columns cannot
/// match std140 by padding.
fn check_metal_field(shader: &Shader, id: StructId, name: Name, ty: TypeId) -> Result<(), Unsupported> {
    let types = &shader.types;
    let element = innermost(shader, ty);
    let narrow = match types.kind(element) {
        TypeKind::Matrix(_, 2) => Some("`float2x2`".to_string()),
        _ => match types.scalar_kind(element) {
            Some(kind @ (ScalarKind::Bool | ScalarKind::Half)) => Some(format!("`{}`", kind.name())),
            _ => None,
        },
    };
    match narrow {
        Some(what) => Err(Unsupported::new(
            ErrorCode::E3001,
            format!(
                "{what} field `{}` in uniform buffer struct `{}`",
                shader.name_of(name),
                shader.name_of(shader.structs.get(id).name)
            ),
            Backend::Metal,
        )),
        None => Ok(()),
    }
}
