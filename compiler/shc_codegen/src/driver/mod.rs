//! The shared generator driver.
//!
//! Emission order is fixed: prelude, structs, constants, resources and
//! interface globals, helpers (callees first), the entry, then any target
//! entry wrapper.

mod expr;
mod stmt;

use crate::dialect::{Dialect, Unsupported};
use crate::interface::{locations, Interface};
use crate::layout::{buffer_layouts, Spelling, StructLayout};
use crate::writer::Writer;
use rustc_hash::{FxHashMap, FxHashSet};
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{
    DenseId, FunctionId, Name, NodeId, NodeKind, Shader, Span, Storage, StructId, TextureId,
    TypeId, TypeKind, VariableId,
};
use std::cell::Cell;
use shc_opt::{children, StageView};

/// Buffers and textures a function touches, directly or through calls.
#[derive(Clone, Debug, Default)]
pub(crate) struct Resources {
    pub(crate) buffers: Vec<VariableId>,
    pub(crate) textures: Vec<TextureId>,
}

pub(crate) struct Generator<'a, D> {
    shader: &'a Shader,
    view: &'a StageView,
    dialect: &'a D,
    pub(crate) out: Writer,
    interface: Interface,
    resources: FxHashMap<FunctionId, Resources>,
    layouts: FxHashMap<StructId, StructLayout>,
    /// Set while emitting an assignment target.
    place: Cell<bool>,
    /// Set while emitting the base of a subscript.
    element: Cell<bool>,
}

impl<'a, D: Dialect> Generator<'a, D> {
    pub(crate) fn new(shader: &'a Shader, view: &'a StageView, dialect: &'a D) -> Self {
        Generator {
            shader,
            view,
            dialect,
            out: Writer::new(),
            interface: Interface::of(shader, view.entry),
            resources: collect_resources(shader, view),
            layouts: FxHashMap::default(),
            place: Cell::new(false),
            element: Cell::new(false),
        }
    }

    pub(crate) fn run(mut self) -> CompileResult<String> {
        let dialect = self.dialect;
        let (shader, view) = (self.shader, self.view);
        let roots = view.buffers.iter().map(|&var| shader.variables.get(var).ty);
        self.layouts = buffer_layouts(shader, dialect.backend(), roots)
            .map_err(|(error, line)| self.unsupported_at_line(error, line))?;
        dialect.prelude(&mut self);
        self.structs()?;
        self.constants()?;
        dialect.globals(&mut self)?;
        for &function in self.view.helpers() {
            self.function(function)?;
        }
        self.function(self.view.entry)?;
        dialect.entry_wrapper(&mut self)?;
        Ok(self.out.finish())
    }

    pub(crate) fn shader(&self) -> &'a Shader {
        self.shader
    }

    pub(crate) fn view(&self) -> &'a StageView {
        self.view
    }

    pub(crate) fn interface(&self) -> &Interface {
        &self.interface
    }

    pub(crate) fn resources(&self, function: FunctionId) -> &Resources {
        static EMPTY: Resources = Resources {
            buffers: Vec::new(),
            textures: Vec::new(),
        };
        self.resources.get(&function).unwrap_or(&EMPTY)
    }

    pub(crate) fn ty(&self, id: NodeId) -> TypeId {
        self.view.arena.get(id).ty
    }

    /// Declared spelling of field `index` of `id` inside a buffer struct.
    pub(crate) fn spelling(&self, id: StructId, index: u32) -> Spelling {
        self.layouts
            .get(&id)
            .and_then(|layout| layout.fields.get(index as usize))
            .map_or(Spelling::Native, |field| field.spelling)
    }

    // Naming

    /// A source identifier, renamed when it collides with a target word.
    pub(crate) fn ident(&self, text: &str) -> String {
        let generated = ["vs_main", "fs_main", "cs_main", "main"];
        if self.dialect.is_reserved(text) || generated.contains(&text) {
            format!("{text}_")
        } else {
            text.to_string()
        }
    }

    pub(crate) fn name(&self, name: Name) -> String {
        self.ident(self.shader.name_of(name))
    }

    pub(crate) fn raw_name(&self, name: Name) -> &'a str {
        self.shader.name_of(name)
    }

    pub(crate) fn var_name(&self, var: VariableId) -> String {
        self.name(self.shader.variables.get(var).name)
    }

    pub(crate) fn struct_name(&self, id: StructId) -> String {
        self.name(self.shader.structs.get(id).name)
    }

    pub(crate) fn texture_name(&self, texture: TextureId) -> String {
        self.name(self.shader.textures.get(texture).name)
    }

    pub(crate) fn sampler_name(&self, texture: TextureId) -> String {
        format!("{}_sampler", self.raw_name(self.shader.textures.get(texture).name))
    }

    pub(crate) fn function_name(&self, function: FunctionId) -> String {
        if function == self.view.entry {
            self.dialect.entry_name(self)
        } else {
            self.name(self.shader.functions.get(function).name)
        }
    }

    pub(crate) fn type_name(&self, ty: TypeId) -> String {
        let dialect = self.dialect;
        match self.shader.types.kind(ty) {
            TypeKind::Void => "void".to_string(),
            TypeKind::Scalar(kind) => dialect.scalar(kind).to_string(),
            TypeKind::Vector(kind, width) => dialect.vector(kind, width),
            TypeKind::Matrix(kind, dim) => dialect.matrix(kind, dim),
            TypeKind::Array(element, len) => format!("{}[{len}]", self.type_name(element)),
            TypeKind::Struct(id) => self.struct_name(id),
        }
    }

    /// `type name` with array extents after the name.
    pub(crate) fn declarator(&self, ty: TypeId, name: &str) -> String {
        let mut extents = String::new();
        let mut base = ty;
        while let TypeKind::Array(element, len) = self.shader.types.kind(base) {
            extents.push_str(&format!("[{len}]"));
            base = element;
        }
        format!("{} {name}{extents}", self.type_name(base))
    }

    // Errors

    pub(crate) fn unsupported(&self, error: Unsupported, at: NodeId) -> CompileError {
        let node = self.view.arena.get(at);
        CompileError::generation(self.dialect.backend(), error.code, error.message, node.span, node.line)
    }

    pub(crate) fn unsupported_at_line(&self, error: Unsupported, line: u32) -> CompileError {
        CompileError::generation(self.dialect.backend(), error.code, error.message, Span::DUMMY, line)
    }

    // Program sections

    fn structs(&mut self) -> CompileResult<()> {
        let shader = self.shader;
        let empty = StructLayout::default();
        for &id in &self.view.structs {
            let def = shader.structs.get(id);
            let layout = self.layouts.get(&id).unwrap_or(&empty);
            let is_io = self.interface.is_io_struct(id);
            if is_io && !layout.is_native() {
                let error = Unsupported::new(
                    ErrorCode::E3001,
                    format!(
                        "struct `{}` as both a padded uniform buffer and a stage interface",
                        self.raw_name(def.name)
                    ),
                    self.dialect.backend(),
                );
                return Err(self.unsupported_at_line(error, def.line));
            }
            let locations = if is_io {
                locations(&shader.types, def)
            } else {
                vec![None; def.fields.len()]
            };
            let mut pads = 0..;
            let mut pad = |out: &mut Writer, count: u32| {
                for n in pads.by_ref().take(count as usize) {
                    out.line(format!("float shc_pad{n};"));
                }
            };
            self.out.line(format!("struct {} {{", self.struct_name(id)));
            self.out.indent();
            for (index, (field, location)) in def.fields.iter().zip(locations).enumerate() {
                let field_layout = layout.fields.get(index).cloned().unwrap_or_default();
                pad(&mut self.out, field_layout.pad_before);
                let name = self.name(field.name);
                let declaration = match field_layout.spelling {
                    Spelling::Native => self.declarator(field.ty, &name),
                    Spelling::Packed => format!("packed_{} {name}", self.type_name(field.ty)),
                    Spelling::Widened(_) => self.widened_declarator(field.ty, &name),
                };
                let suffix = self.dialect.field_suffix(field, location);
                self.out.line(format!("{declaration}{suffix};"));
            }
            pad(&mut self.out, layout.pad_after);
            self.out.dedent();
            self.out.line("};");
            self.out.blank();
        }
        Ok(())
    }

    /// An array of scalars or two-component vectors declared with
    /// four-component elements.
    fn widened_declarator(&self, ty: TypeId, name: &str) -> String {
        let types = &self.shader.types;
        let mut extents = String::new();
        let mut base = ty;
        while let TypeKind::Array(element, len) = types.kind(base) {
            extents.push_str(&format!("[{len}]"));
            base = element;
        }
        let element = match types.kind(base) {
            TypeKind::Scalar(kind) | TypeKind::Vector(kind, _) => self.dialect.vector(kind, 4),
            _ => self.type_name(base),
        };
        format!("{element} {name}{extents}")
    }

    fn constants(&mut self) -> CompileResult<()> {
        for &var in &self.view.constants {
            let def = self.shader.variables.get(var);
            let Some(init) = def.init else { continue };
            let value = self.top_expr(init)?;
            let declaration = self.declarator(def.ty, &self.var_name(var));
            self.out
                .line(format!("{} {declaration} = {value};", self.dialect.constant_qualifier()));
        }
        self.out.blank();
        Ok(())
    }

    fn function(&mut self, function: FunctionId) -> CompileResult<()> {
        let def = self.shader.functions.get(function);
        let Some(body) = def.body else { return Ok(()) };
        let dialect = self.dialect;
        let is_entry = function == self.view.entry;

        let mut params: Vec<String> = def
            .params
            .iter()
            .map(|&param| {
                let var = self.shader.variables.get(param);
                let suffix = if is_entry {
                    dialect.entry_param_suffix(var.semantic)
                } else {
                    String::new()
                };
                format!("{}{suffix}", self.declarator(var.ty, &self.var_name(param)))
            })
            .collect();
        params.extend(dialect.extra_params(self, function));

        if is_entry {
            for attribute in dialect.entry_attributes(self, def) {
                self.out.line(attribute);
            }
        }
        self.out.line(format!(
            "{} {}({}) {{",
            self.type_name(def.return_ty),
            self.function_name(function),
            params.join(", ")
        ));
        self.out.indent();
        self.block_contents(body)?;
        self.out.dedent();
        self.out.line("}");
        self.out.blank();
        Ok(())
    }
}

fn collect_resources(shader: &Shader, view: &StageView) -> FxHashMap<FunctionId, Resources> {
    let mut map: FxHashMap<FunctionId, Resources> = FxHashMap::default();
    for &function in &view.functions {
        let mut buffers = FxHashSet::default();
        let mut textures = FxHashSet::default();
        let mut stack: Vec<NodeId> = shader.functions.get(function).body.into_iter().collect();
        while let Some(id) = stack.pop() {
            let kind = &view.arena.get(id).kind;
            match *kind {
                NodeKind::Variable(var)
                    if matches!(shader.variables.get(var).storage, Storage::Buffer { .. }) =>
                {
                    buffers.insert(var);
                }
                NodeKind::Texture(texture) => {
                    textures.insert(texture);
                }
                NodeKind::Call { function: callee, .. } => {
                    if let Some(used) = map.get(&callee) {
                        buffers.extend(used.buffers.iter().copied());
                        textures.extend(used.textures.iter().copied());
                    }
                }
                _ => {}
            }
            stack.extend(children(&view.arena, kind));
        }
        let mut buffers: Vec<VariableId> = buffers.into_iter().collect();
        let mut textures: Vec<TextureId> = textures.into_iter().collect();
        buffers.sort_by_key(|id| id.index());
        textures.sort_by_key(|id| id.index());
        map.insert(function, Resources { buffers, textures });
    }
    map
}
