//! AST node definitions.
//!
//! Children are referenced by [`NodeId`]; variable-length child lists use
//! [`NodeRange`]. Names are resolved while parsing, so nodes carry symbol ids
//! rather than identifiers.

use crate::{
    FunctionId, Intrinsic, NodeId, NodeRange, Span, StructId, Swizzle, TextureId, TypeId,
    VariableId,
};

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub line: u32,
    /// Result type for expressions, [`TypeId::VOID`] for statements.
    pub ty: TypeId,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span, line: u32) -> Self {
        Node {
            kind,
            span,
            line,
            ty: TypeId::VOID,
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.ty = ty;
        self
    }
}

/// Literal payload. Floats are stored as `f64` bits so nodes stay `Eq`;
/// the node type says whether the value is `float` or `half`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(u64),
}

impl Literal {
    pub fn float(value: f64) -> Self {
        Literal::Float(value.to_bits())
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Literal::Bool(b) => f64::from(u8::from(b)),
            Literal::Int(v) => f64::from(v),
            Literal::UInt(v) => f64::from(v),
            Literal::Float(bits) => f64::from_bits(bits),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::UInt(v) => write!(f, "{v}u"),
            Literal::Float(bits) => write!(f, "{:?}", f64::from_bits(bits)),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Operators that require integer operands.
    pub const fn is_integer_only(self) -> bool {
        matches!(
            self,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
}

impl UnaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }

    pub const fn mutates(self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PreDec)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

/// `=` or a compound assignment such as `+=`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

impl AssignOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Compound(BinaryOp::Add) => "+=",
            AssignOp::Compound(BinaryOp::Sub) => "-=",
            AssignOp::Compound(BinaryOp::Mul) => "*=",
            AssignOp::Compound(BinaryOp::Div) => "/=",
            AssignOp::Compound(BinaryOp::Rem) => "%=",
            AssignOp::Compound(BinaryOp::BitAnd) => "&=",
            AssignOp::Compound(BinaryOp::BitOr) => "|=",
            AssignOp::Compound(BinaryOp::BitXor) => "^=",
            AssignOp::Compound(BinaryOp::Shl) => "<<=",
            AssignOp::Compound(BinaryOp::Shr) => ">>=",
            AssignOp::Compound(_) => "=",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum NodeKind {
    // Expressions
    Literal(Literal),
    Variable(VariableId),
    Texture(TextureId),
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Postfix {
        op: PostfixOp,
        operand: NodeId,
    },
    Assign {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    Ternary {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Call {
        function: FunctionId,
        args: NodeRange,
    },
    Intrinsic {
        intrinsic: Intrinsic,
        args: NodeRange,
    },
    /// `float4(a, b)`: vector, matrix or scalar constructor.
    Construct {
        ty: TypeId,
        args: NodeRange,
    },
    /// `(float3)e`
    Cast {
        ty: TypeId,
        operand: NodeId,
    },
    /// Struct field access; `index` is the field's position in its struct.
    Field {
        base: NodeId,
        index: u32,
    },
    Swizzle {
        base: NodeId,
        swizzle: Swizzle,
    },
    Index {
        base: NodeId,
        index: NodeId,
    },

    // Statements
    Block(NodeRange),
    /// Several declarations from one statement (`float a, b;`), emitted
    /// without opening a scope.
    DeclGroup(NodeRange),
    ExprStmt(NodeId),
    VarDecl {
        variable: VariableId,
        init: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        step: Option<NodeId>,
        body: NodeId,
    },
    Switch {
        selector: NodeId,
        body: NodeId,
    },
    /// `case K:` label; the value is folded at parse time.
    Case(Literal),
    Default,
    Return(Option<NodeId>),
    Break,
    Continue,
    Discard,
    Empty,

    // Declarations
    StructDecl(StructId),
    TextureDecl(TextureId),
    FunctionDecl(FunctionId),
    /// Global `const` or `buffer` declaration.
    GlobalDecl(VariableId),
    Typedef(TypeId),
}

impl NodeKind {
    /// Statement kinds after which the rest of a block never runs.
    pub const fn is_terminator(&self) -> bool {
        matches!(
            self,
            NodeKind::Return(_) | NodeKind::Break | NodeKind::Continue | NodeKind::Discard
        )
    }
}
