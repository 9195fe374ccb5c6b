//! Type table.
//!
//! Builtin types are registered first in a fixed order so the common
//! scalar ids are constants ([`TypeId::FLOAT`] and friends). User structs,
//! typedef aliases and array types are appended as the parser meets them.

use crate::{Name, StringInterner, StructId, TypeId};
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Half,
    Float,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 5] = [
        ScalarKind::Bool,
        ScalarKind::Int,
        ScalarKind::UInt,
        ScalarKind::Half,
        ScalarKind::Float,
    ];

    /// Promotion rank: `int < uint < half < float`.
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            ScalarKind::Bool => 0,
            ScalarKind::Int => 1,
            ScalarKind::UInt => 2,
            ScalarKind::Half => 3,
            ScalarKind::Float => 4,
        }
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::UInt)
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::Half | ScalarKind::Float)
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, ScalarKind::Bool)
    }

    /// The wider of two numeric kinds.
    #[must_use]
    pub fn promote(self, other: ScalarKind) -> ScalarKind {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Half => "half",
            ScalarKind::Float => "float",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Void,
    Scalar(ScalarKind),
    /// Vector of 2 to 4 components.
    Vector(ScalarKind, u8),
    /// Square matrix `float{n}x{n}`. Subscript yields row vectors.
    Matrix(ScalarKind, u8),
    Array(TypeId, u32),
    Struct(StructId),
}

#[derive(Clone, Debug)]
pub struct TypeTable {
    kinds: Vec<TypeKind>,
    names: Vec<Name>,
    by_name: FxHashMap<Name, TypeId>,
    by_kind: FxHashMap<TypeKind, TypeId>,
}

impl TypeTable {
    /// Table with every builtin type registered.
    pub fn new(interner: &mut StringInterner) -> Self {
        let mut table = TypeTable {
            kinds: Vec::with_capacity(64),
            names: Vec::with_capacity(64),
            by_name: FxHashMap::default(),
            by_kind: FxHashMap::default(),
        };
        table.insert(interner.intern("void"), TypeKind::Void);
        for scalar in ScalarKind::ALL {
            table.insert(interner.intern(scalar.name()), TypeKind::Scalar(scalar));
        }
        for scalar in ScalarKind::ALL {
            for width in 2..=4u8 {
                let name = interner.intern(&format!("{}{width}", scalar.name()));
                table.insert(name, TypeKind::Vector(scalar, width));
            }
        }
        for dim in 2..=4u8 {
            let name = interner.intern(&format!("float{dim}x{dim}"));
            table.insert(name, TypeKind::Matrix(ScalarKind::Float, dim));
        }
        debug_assert_eq!(table.kinds[TypeId::FLOAT.raw() as usize], TypeKind::Scalar(ScalarKind::Float));
        table
    }

    fn insert(&mut self, name: Name, kind: TypeKind) -> TypeId {
        let id = TypeId::new(u32::try_from(self.kinds.len()).unwrap_or(u32::MAX));
        self.kinds.push(kind);
        self.names.push(name);
        self.by_name.insert(name, id);
        self.by_kind.entry(kind).or_insert(id);
        id
    }

    #[inline]
    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.kinds
            .get(id.raw() as usize)
            .copied()
            .unwrap_or(TypeKind::Void)
    }

    #[inline]
    pub fn name(&self, id: TypeId) -> Name {
        self.names
            .get(id.raw() as usize)
            .copied()
            .unwrap_or(Name::EMPTY)
    }

    /// Resolve a type name (builtin, struct, or typedef alias).
    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.by_name.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn scalar(&self, kind: ScalarKind) -> TypeId {
        match kind {
            ScalarKind::Bool => TypeId::BOOL,
            ScalarKind::Int => TypeId::INT,
            ScalarKind::UInt => TypeId::UINT,
            ScalarKind::Half => TypeId::HALF,
            ScalarKind::Float => TypeId::FLOAT,
        }
    }

    /// Vector of `width` components; width 1 is the scalar itself.
    pub fn vector(&self, scalar: ScalarKind, width: u8) -> Option<TypeId> {
        if width == 1 {
            return Some(self.scalar(scalar));
        }
        self.by_kind.get(&TypeKind::Vector(scalar, width)).copied()
    }

    pub fn matrix(&self, scalar: ScalarKind, dim: u8) -> Option<TypeId> {
        self.by_kind.get(&TypeKind::Matrix(scalar, dim)).copied()
    }

    /// Array type, interned by element and length.
    pub fn array(&mut self, element: TypeId, len: u32, interner: &mut StringInterner) -> TypeId {
        let kind = TypeKind::Array(element, len);
        if let Some(&id) = self.by_kind.get(&kind) {
            return id;
        }
        let text = format!("{}[{len}]", interner.lookup(self.name(element)));
        let name = interner.intern(&text);
        self.insert(name, kind)
    }

    pub fn register_struct(&mut self, name: Name, id: StructId) -> TypeId {
        self.insert(name, TypeKind::Struct(id))
    }

    /// Bind `alias` to an existing type without creating a new id.
    pub fn register_alias(&mut self, alias: Name, target: TypeId) {
        self.by_name.insert(alias, target);
    }

    /// Scalar kind of a scalar, vector or matrix type.
    pub fn scalar_kind(&self, id: TypeId) -> Option<ScalarKind> {
        match self.kind(id) {
            TypeKind::Scalar(s) | TypeKind::Vector(s, _) | TypeKind::Matrix(s, _) => Some(s),
            _ => None,
        }
    }

    /// Component count of a scalar (1) or vector; 0 for everything else.
    pub fn width(&self, id: TypeId) -> u8 {
        match self.kind(id) {
            TypeKind::Scalar(_) => 1,
            TypeKind::Vector(_, n) => n,
            _ => 0,
        }
    }

    /// Same shape with a different scalar kind.
    pub fn with_scalar(&self, id: TypeId, scalar: ScalarKind) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Scalar(_) => Some(self.scalar(scalar)),
            TypeKind::Vector(_, n) => self.vector(scalar, n),
            TypeKind::Matrix(_, n) => self.matrix(scalar, n),
            _ => None,
        }
    }

    pub fn is_scalar(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Scalar(_))
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.scalar_kind(id).is_some_and(ScalarKind::is_numeric)
    }

    pub fn is_matrix(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Matrix(..))
    }

    pub fn struct_id(&self, id: TypeId) -> Option<StructId> {
        match self.kind(id) {
            TypeKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Display name, e.g. `float3` or `Light[4]`.
    pub fn display<'a>(&self, id: TypeId, interner: &'a StringInterner) -> &'a str {
        interner.lookup(self.name(id))
    }
}
