//! Host-side binding and layout metadata.
//!
//! Uniform buffers follow std140. Matrices are stored column-major on every
//! target, so a `floatNxN` occupies `N` vec4 columns with a 16-byte stride.

use crate::interface::{locations, Interface};
use crate::layout::{align, Std140};
use serde::Serialize;
use shc_ir::{
    PackFormat, ScalarKind, Shader, Stage, StageMask, Storage, SystemValue, TextureKind, TypeId,
    TypeKind,
};
use shc_opt::StageView;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub vertex_format: Option<VertexFormat>,
    pub buffers: Vec<BufferLayout>,
    pub textures: Vec<TextureBinding>,
    pub render_targets: Vec<RenderTarget>,
    pub thread_group: Option<[u32; 3]>,
}

/// Layout of one vertex in the vertex stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VertexFormat {
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VertexAttribute {
    pub name: String,
    pub location: u32,
    /// Scalar kind of the shader-side field.
    pub component: &'static str,
    pub count: u32,
    pub packing: PackFormat,
    pub offset: u32,
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BufferLayout {
    pub name: String,
    pub slot: u32,
    pub size: u32,
    pub stages: StageMask,
    pub fields: Vec<BufferField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BufferField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub offset: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_len: Option<u32>,
    /// Members of a struct-typed field, with offsets relative to the field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<BufferField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextureBinding {
    pub name: String,
    pub kind: TextureKind,
    pub slot: u32,
    pub stages: StageMask,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderTarget {
    pub slot: u32,
    pub field: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// What two reflections of one source disagree about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictSubject {
    /// A buffer or texture, by source name.
    Resource(String),
    /// The interface or thread group of a stage entry.
    Entry(Stage),
}

/// A binding that two preprocessor expansions of one source declare
/// differently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingConflict {
    pub subject: ConflictSubject,
    pub message: String,
}

impl BindingConflict {
    fn resource(name: &str, message: String) -> Self {
        BindingConflict {
            subject: ConflictSubject::Resource(name.to_string()),
            message,
        }
    }

    fn entry(stage: Stage, message: String) -> Self {
        BindingConflict {
            subject: ConflictSubject::Entry(stage),
            message,
        }
    }
}

impl Reflection {
    /// Fold in the reflection of another expansion of the same source.
    /// Bindings match by name and their stage masks are unioned; a name or
    /// slot bound differently is a conflict.
    pub fn merge(&mut self, other: Reflection) -> Result<(), BindingConflict> {
        for buffer in other.buffers {
            if let Some(existing) = self.buffers.iter_mut().find(|b| b.name == buffer.name) {
                if existing.slot != buffer.slot || existing.size != buffer.size || existing.fields != buffer.fields {
                    return Err(BindingConflict::resource(
                        &buffer.name,
                        format!("buffer `{}` is declared differently across backends", buffer.name),
                    ));
                }
                existing.stages |= buffer.stages;
                continue;
            }
            if let Some(existing) = self.buffers.iter().find(|b| b.slot == buffer.slot) {
                return Err(BindingConflict::resource(
                    &buffer.name,
                    format!(
                        "buffer slot {} is bound to both `{}` and `{}` across backends",
                        buffer.slot, existing.name, buffer.name
                    ),
                ));
            }
            self.buffers.push(buffer);
        }

        for texture in other.textures {
            if let Some(existing) = self.textures.iter_mut().find(|t| t.name == texture.name) {
                if existing.slot != texture.slot || existing.kind != texture.kind {
                    return Err(BindingConflict::resource(
                        &texture.name,
                        format!("texture `{}` is declared differently across backends", texture.name),
                    ));
                }
                existing.stages |= texture.stages;
                continue;
            }
            if let Some(existing) = self.textures.iter().find(|t| t.slot == texture.slot) {
                return Err(BindingConflict::resource(
                    &texture.name,
                    format!(
                        "texture slot {} is bound to both `{}` and `{}` across backends",
                        texture.slot, existing.name, texture.name
                    ),
                ));
            }
            self.textures.push(texture);
        }

        if let Some(theirs) = other.vertex_format {
            match &self.vertex_format {
                None => self.vertex_format = Some(theirs),
                Some(format) if *format != theirs => {
                    return Err(BindingConflict::entry(
                        Stage::Vertex,
                        "the vertex input layout differs across backends".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }

        for target in other.render_targets {
            match self.render_targets.iter().find(|t| t.slot == target.slot) {
                Some(existing) if *existing != target => {
                    return Err(BindingConflict::entry(
                        Stage::Fragment,
                        format!("render target {} differs across backends", target.slot),
                    ));
                }
                Some(_) => {}
                None => self.render_targets.push(target),
            }
        }
        self.render_targets.sort_by_key(|target| target.slot);

        match (self.thread_group, other.thread_group) {
            (None, Some(size)) => self.thread_group = Some(size),
            (Some(size), Some(theirs)) if size != theirs => {
                return Err(BindingConflict::entry(
                    Stage::Compute,
                    "the thread-group size differs across backends".to_string(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Collect reflection for a shader from the views of its built stages.
pub fn reflect(shader: &Shader, views: &[StageView]) -> Reflection {
    let view_of = |stage: Stage| views.iter().find(|view| view.stage == stage);

    let buffers = shader
        .variables
        .iter()
        .filter_map(|(id, def)| {
            let Storage::Buffer { slot } = def.storage else { return None };
            let stages = views
                .iter()
                .filter(|view| view.uses_buffer(id))
                .fold(StageMask::empty(), |mask, view| mask | view.stage.mask());
            let std140 = Std140 { shader };
            let (size, _) = std140.size_align(def.ty);
            Some(BufferLayout {
                name: shader.name_of(def.name).to_string(),
                slot,
                size,
                stages,
                fields: fields(&std140, def.ty),
            })
        })
        .collect();

    let textures = shader
        .textures
        .iter()
        .map(|(id, def)| TextureBinding {
            name: shader.name_of(def.name).to_string(),
            kind: def.kind,
            slot: def.slot,
            stages: views
                .iter()
                .filter(|view| view.uses_texture(id))
                .fold(StageMask::empty(), |mask, view| mask | view.stage.mask()),
        })
        .collect();

    let reflection = Reflection {
        vertex_format: view_of(Stage::Vertex).and_then(|view| vertex_format(shader, view)),
        buffers,
        textures,
        render_targets: view_of(Stage::Fragment)
            .map(|view| render_targets(shader, view))
            .unwrap_or_default(),
        thread_group: view_of(Stage::Compute)
            .and_then(|view| shader.functions.get(view.entry).thread_group),
    };
    tracing::debug!(
        shader = %shader.name,
        buffers = reflection.buffers.len(),
        textures = reflection.textures.len(),
        "reflection collected"
    );
    reflection
}

fn component_count(shader: &Shader, ty: TypeId) -> u32 {
    match shader.types.kind(ty) {
        TypeKind::Scalar(_) => 1,
        TypeKind::Vector(_, n) => u32::from(n),
        TypeKind::Matrix(_, n) => u32::from(n) * u32::from(n),
        TypeKind::Array(element, len) => len * component_count(shader, element),
        TypeKind::Void | TypeKind::Struct(_) => 0,
    }
}

fn vertex_format(shader: &Shader, view: &StageView) -> Option<VertexFormat> {
    let input = Interface::of(shader, view.entry).input_struct()?;
    let def = shader.structs.get(input);
    let mut offset = 0;
    let mut attributes = Vec::new();
    for (field, location) in def.fields.iter().zip(locations(&shader.types, def)) {
        let Some(location) = location else { continue };
        let kind = shader.types.scalar_kind(element_type(shader, field.ty)).unwrap_or(ScalarKind::Float);
        let packing = field.packing.unwrap_or(PackFormat::natural(kind));
        let count = component_count(shader, field.ty);
        let size = count * packing.component_size();
        attributes.push(VertexAttribute {
            name: shader.name_of(field.name).to_string(),
            location,
            component: kind.name(),
            count,
            packing,
            offset,
            size,
        });
        offset = align(offset + size, 4);
    }
    Some(VertexFormat {
        stride: offset,
        attributes,
    })
}

fn element_type(shader: &Shader, ty: TypeId) -> TypeId {
    match shader.types.kind(ty) {
        TypeKind::Array(element, _) => element_type(shader, element),
        _ => ty,
    }
}

fn render_targets(shader: &Shader, view: &StageView) -> Vec<RenderTarget> {
    let Some(output) = shader.types.struct_id(shader.functions.get(view.entry).return_ty) else {
        return Vec::new();
    };
    let mut targets: Vec<RenderTarget> = shader
        .structs
        .get(output)
        .fields
        .iter()
        .filter_map(|field| match field.semantic {
            Some(SystemValue::Target(slot)) => Some(RenderTarget {
                slot: u32::from(slot),
                field: shader.name_of(field.name).to_string(),
                ty: shader.types.display(field.ty, &shader.interner).to_string(),
            }),
            _ => None,
        })
        .collect();
    targets.sort_by_key(|target| target.slot);
    targets
}

/// Fields of the struct `ty`, in declaration order.
fn fields(std140: &Std140<'_>, ty: TypeId) -> Vec<BufferField> {
    let shader = std140.shader;
    let Some(id) = shader.types.struct_id(ty) else {
        return Vec::new();
    };
    shader
        .structs
        .get(id)
        .fields
        .iter()
        .zip(std140.offsets(id))
        .map(|(field, (offset, size))| BufferField {
            name: shader.name_of(field.name).to_string(),
            ty: shader.types.display(field.ty, &shader.interner).to_string(),
            offset,
            size,
            array_len: match shader.types.kind(field.ty) {
                TypeKind::Array(_, len) => Some(len),
                _ => None,
            },
            members: fields(std140, element_type(shader, field.ty)),
        })
        .collect()
}
