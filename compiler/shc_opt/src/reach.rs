//! Stage reachability: functions, structs and resources used from an entry.

use crate::fold::Folder;
use crate::walk::children;
use rustc_hash::FxHashSet;
use shc_diagnostic::CompileResult;
use shc_ir::{
    FunctionId, NodeId, NodeKind, Shader, Storage, StructId, TextureId, TypeId, TypeKind,
    VariableId,
};

#[derive(Default)]
pub(crate) struct Reach {
    visited: FxHashSet<FunctionId>,
    /// Callees before callers.
    pub(crate) functions: Vec<FunctionId>,
    pub(crate) structs: FxHashSet<StructId>,
    pub(crate) buffers: FxHashSet<VariableId>,
    pub(crate) constants: FxHashSet<VariableId>,
    pub(crate) textures: FxHashSet<TextureId>,
}

impl Reach {
    /// Fold and scan `function`, then everything it calls.
    pub(crate) fn visit_function(
        &mut self,
        shader: &Shader,
        folder: &mut Folder<'_>,
        function: FunctionId,
    ) -> CompileResult<()> {
        if !self.visited.insert(function) {
            return Ok(());
        }
        folder.fold_function(function)?;

        let def = shader.functions.get(function);
        self.add_type(shader, def.return_ty);
        for &param in &def.params {
            self.add_type(shader, shader.variables.get(param).ty);
        }

        let mut callees = Vec::new();
        if let Some(body) = def.body {
            self.scan(shader, folder, body, &mut callees)?;
        }
        for callee in callees {
            self.visit_function(shader, folder, callee)?;
        }
        self.functions.push(function);
        Ok(())
    }

    /// Record everything a subtree uses. Calls are collected in order of
    /// appearance.
    fn scan(
        &mut self,
        shader: &Shader,
        folder: &mut Folder<'_>,
        root: NodeId,
        callees: &mut Vec<FunctionId>,
    ) -> CompileResult<()> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = folder.arena.get(id);
            self.add_type(shader, node.ty);
            match node.kind {
                NodeKind::Call { function, .. } if !callees.contains(&function) => {
                    callees.push(function);
                }
                NodeKind::Variable(var) => self.add_variable(shader, folder, var)?,
                NodeKind::VarDecl { variable, .. } => {
                    self.add_type(shader, shader.variables.get(variable).ty);
                }
                NodeKind::Texture(texture) => {
                    self.textures.insert(texture);
                }
                _ => {}
            }
            let node = folder.arena.get(id);
            let mut kids = children(&folder.arena, &node.kind);
            kids.reverse();
            stack.extend(kids);
        }
        Ok(())
    }

    fn add_variable(
        &mut self,
        shader: &Shader,
        folder: &mut Folder<'_>,
        var: VariableId,
    ) -> CompileResult<()> {
        let def = shader.variables.get(var);
        match def.storage {
            Storage::Buffer { .. } => {
                self.buffers.insert(var);
            }
            Storage::Constant => {
                if self.constants.insert(var) {
                    if let Some(init) = def.init {
                        folder.expr(init)?;
                        let mut callees = Vec::new();
                        self.scan(shader, folder, init, &mut callees)?;
                    }
                }
            }
            Storage::Local | Storage::Param => {}
        }
        Ok(())
    }

    /// Structs reachable through a type, including nested fields.
    fn add_type(&mut self, shader: &Shader, ty: TypeId) {
        match shader.types.kind(ty) {
            TypeKind::Struct(id) => {
                if self.structs.insert(id) {
                    for field in &shader.structs.get(id).fields {
                        self.add_type(shader, field.ty);
                    }
                }
            }
            TypeKind::Array(element, _) => self.add_type(shader, element),
            _ => {}
        }
    }
}
