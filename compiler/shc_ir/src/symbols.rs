//! Symbol records and the dense tables that own them.

use crate::{
    DenseId, Literal, Name, NodeId, PackFormat, Span, Stage, SystemValue, TypeId,
};
use rustc_hash::FxHashMap;
use std::marker::PhantomData;

/// Dense, id-indexed record table with an optional name index.
#[derive(Clone, Debug)]
pub struct Table<I, T> {
    records: Vec<T>,
    by_name: FxHashMap<Name, I>,
    _id: PhantomData<I>,
}

impl<I: DenseId, T> Table<I, T> {
    pub fn new() -> Self {
        Table {
            records: Vec::new(),
            by_name: FxHashMap::default(),
            _id: PhantomData,
        }
    }

    /// Append a named record. The caller is responsible for rejecting
    /// duplicates; a later insert under the same name shadows the index.
    pub fn insert(&mut self, name: Name, record: T) -> I {
        let id = self.push(record);
        self.by_name.insert(name, id);
        id
    }

    /// Append a record that is not reachable by name (locals, parameters).
    pub fn push(&mut self, record: T) -> I {
        let id = I::from_index(self.records.len());
        self.records.push(record);
        id
    }

    pub fn lookup(&self, name: Name) -> Option<I> {
        self.by_name.get(&name).copied()
    }

    #[inline]
    pub fn get(&self, id: I) -> &T {
        &self.records[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.records[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (I::from_index(i), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<I: DenseId, T> Default for Table<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct StructField {
    pub name: Name,
    pub ty: TypeId,
    pub semantic: Option<SystemValue>,
    pub packing: Option<PackFormat>,
    pub span: Span,
    pub line: u32,
}

#[derive(Clone, Debug)]
pub struct StructDef {
    pub name: Name,
    pub ty: TypeId,
    pub fields: Vec<StructField>,
    pub line: u32,
}

impl StructDef {
    pub fn field_index(&self, name: Name) -> Option<u32> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .and_then(|i| u32::try_from(i).ok())
    }

    pub fn field(&self, index: u32) -> Option<&StructField> {
        self.fields.get(index as usize)
    }
}

/// Serialized under the source keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, serde::Serialize)]
pub enum TextureKind {
    #[serde(rename = "texture2d")]
    Texture2D,
    #[serde(rename = "texture3d")]
    Texture3D,
    #[serde(rename = "texture_cube")]
    TextureCube,
    #[serde(rename = "texture2d_array")]
    Texture2DArray,
    #[serde(rename = "rwtexture2d")]
    RwTexture2D,
}

impl TextureKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            TextureKind::Texture2D => "texture2d",
            TextureKind::Texture3D => "texture3d",
            TextureKind::TextureCube => "texture_cube",
            TextureKind::Texture2DArray => "texture2d_array",
            TextureKind::RwTexture2D => "rwtexture2d",
        }
    }

    /// Storage textures bind to UAV/image slots and have no sampler.
    pub const fn is_storage(self) -> bool {
        matches!(self, TextureKind::RwTexture2D)
    }

    /// Component count of a sampling coordinate.
    pub const fn sample_width(self) -> u8 {
        match self {
            TextureKind::Texture2D | TextureKind::RwTexture2D => 2,
            TextureKind::Texture3D | TextureKind::TextureCube | TextureKind::Texture2DArray => 3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextureDef {
    pub name: Name,
    pub kind: TextureKind,
    pub slot: u32,
    pub line: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Storage {
    Local,
    Param,
    /// Global `const`.
    Constant,
    /// Uniform buffer bound at `slot`; the variable's type is its struct.
    Buffer { slot: u32 },
}

#[derive(Clone, Debug)]
pub struct VariableDef {
    pub name: Name,
    pub ty: TypeId,
    pub storage: Storage,
    pub is_const: bool,
    pub semantic: Option<SystemValue>,
    pub init: Option<NodeId>,
    /// Folded value of a `const` scalar with a constant initializer.
    pub constant: Option<Literal>,
    pub line: u32,
}

impl VariableDef {
    pub fn new(name: Name, ty: TypeId, storage: Storage, line: u32) -> Self {
        VariableDef {
            name,
            ty,
            storage,
            is_const: false,
            semantic: None,
            init: None,
            constant: None,
            line,
        }
    }

    /// Buffers and constants can never be written.
    pub fn is_read_only(&self) -> bool {
        self.is_const || matches!(self.storage, Storage::Buffer { .. } | Storage::Constant)
    }

    pub fn is_global(&self) -> bool {
        matches!(self.storage, Storage::Buffer { .. } | Storage::Constant)
    }
}

#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub name: Name,
    pub return_ty: TypeId,
    pub params: Vec<crate::VariableId>,
    /// `None` for a prototype that was never defined.
    pub body: Option<NodeId>,
    pub stage: Option<Stage>,
    pub thread_group: Option<[u32; 3]>,
    /// Direct callees in first-call order, without duplicates.
    pub calls: Vec<crate::FunctionId>,
    pub span: Span,
    pub line: u32,
}

impl FunctionDef {
    pub fn is_entry(&self) -> bool {
        self.stage.is_some()
    }

    pub fn record_call(&mut self, callee: crate::FunctionId) {
        if !self.calls.contains(&callee) {
            self.calls.push(callee);
        }
    }
}

/// Kind of a top-level name, for namespace-conflict checks.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GlobalSymbol {
    Struct(crate::StructId),
    Texture(crate::TextureId),
    Function(crate::FunctionId),
    Variable(crate::VariableId),
    Type(TypeId),
}

impl GlobalSymbol {
    pub const fn describe(self) -> &'static str {
        match self {
            GlobalSymbol::Struct(_) => "struct",
            GlobalSymbol::Texture(_) => "texture",
            GlobalSymbol::Function(_) => "function",
            GlobalSymbol::Variable(_) => "variable",
            GlobalSymbol::Type(_) => "type",
        }
    }
}
