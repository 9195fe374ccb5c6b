//! Intermediate representation for the shc shader compiler.
//!
//! - [`Span`], [`Name`]/[`StringInterner`]: positions and identifiers
//! - [`Token`]/[`TokenKind`]: lexer output
//! - [`NodeArena`]/[`Node`]: the paged AST store
//! - [`TypeTable`] and the symbol [`Table`]s: structs, textures, functions,
//!   variables
//! - [`Shader`]: one compilation unit with its entries, slots and outputs

mod arena;
mod ast;
pub mod constant;
mod ids;
mod interner;
mod intrinsic;
mod semantic;
mod shader;
mod span;
mod stage;
mod swizzle;
mod symbols;
mod token;
mod types;

pub use arena::{NodeArena, NodeId, NodeRange, PAGE_CAPACITY};
pub use ast::{AssignOp, BinaryOp, Literal, Node, NodeKind, PostfixOp, UnaryOp};
pub use ids::{DenseId, FunctionId, StructId, TextureId, TypeId, VariableId};
pub use interner::{Name, StringInterner};
pub use intrinsic::Intrinsic;
pub use semantic::{Direction, PackFormat, SemanticTable, SystemValue};
pub use shader::{
    Shader, ShaderState, SlotError, SlotSet, StageOutput, MAX_BUFFER_SLOTS, MAX_RENDER_TARGETS,
    MAX_TEXTURE_SLOTS,
};
pub use span::Span;
pub use stage::{Backend, Stage, StageMask};
pub use swizzle::{Swizzle, SwizzleTable};
pub use symbols::{
    FunctionDef, GlobalSymbol, Storage, StructDef, StructField, Table, TextureDef, TextureKind,
    VariableDef,
};
pub use token::{Token, TokenKind};
pub use types::{ScalarKind, TypeKind, TypeTable};
