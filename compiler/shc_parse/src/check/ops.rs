//! Operator typing and implicit conversions.

use crate::Parser;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::constant::ConstEnv;
use shc_ir::{BinaryOp, Literal, NodeId, NodeKind, ScalarKind, Token, TypeId, TypeKind, UnaryOp};

impl Parser<'_> {
    /// Type a binary operator, converting both operands to the promoted
    /// scalar kind. Returns the converted operands and the result type.
    pub(crate) fn type_binary(
        &mut self,
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
        op_token: Token,
    ) -> CompileResult<(NodeId, NodeId, TypeId)> {
        let (lt, rt) = (self.ty(lhs), self.ty(rhs));
        if op.is_logical() {
            if lt == TypeId::BOOL && rt == TypeId::BOOL {
                return Ok((lhs, rhs, TypeId::BOOL));
            }
            return Err(self.invalid_operands(op, lt, rt, op_token));
        }

        let types = &self.shader.types;
        if types.is_matrix(lt) || types.is_matrix(rt) {
            return self.type_matrix_binary(op, lhs, rhs, op_token);
        }

        let (Some(ls), Some(rs)) = (types.scalar_kind(lt), types.scalar_kind(rt)) else {
            return Err(self.invalid_operands(op, lt, rt, op_token));
        };
        let (lw, rw) = (types.width(lt), types.width(rt));
        let width = if lw == rw || rw == 1 {
            lw
        } else if lw == 1 {
            rw
        } else {
            return Err(self
                .semantic_at(
                    ErrorCode::E2003,
                    format!(
                        "type mismatch: `{}` and `{}` have different widths",
                        self.type_name(lt),
                        self.type_name(rt)
                    ),
                    op_token,
                ));
        };

        let kinds_ok = if op.is_integer_only() {
            ls.is_integer() && rs.is_integer()
        } else if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            ls.is_numeric() == rs.is_numeric()
        } else {
            ls.is_numeric() && rs.is_numeric()
        };
        if !kinds_ok {
            return Err(self.invalid_operands(op, lt, rt, op_token));
        }

        let kind = if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
            ls
        } else {
            ls.promote(rs)
        };
        let lhs = self.convert_scalar_kind(lhs, kind);
        let rhs = self.convert_scalar_kind(rhs, kind);
        let result_kind = if op.is_comparison() {
            ScalarKind::Bool
        } else {
            kind
        };
        let result = self
            .shader
            .types
            .vector(result_kind, width)
            .unwrap_or(TypeId::VOID);
        Ok((lhs, rhs, result))
    }

    /// Matrices combine component-wise with same-shape matrices or with
    /// scalars. Products go through `mul`.
    fn type_matrix_binary(
        &mut self,
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
        op_token: Token,
    ) -> CompileResult<(NodeId, NodeId, TypeId)> {
        let (lt, rt) = (self.ty(lhs), self.ty(rhs));
        if !matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) {
            return Err(self.invalid_operands(op, lt, rt, op_token));
        }
        let types = &self.shader.types;
        match (types.kind(lt), types.kind(rt)) {
            (TypeKind::Matrix(_, a), TypeKind::Matrix(_, b)) if a == b => Ok((lhs, rhs, lt)),
            (TypeKind::Matrix(s, _), TypeKind::Scalar(k)) if k.is_numeric() => {
                let rhs = self.convert_scalar_kind(rhs, s);
                Ok((lhs, rhs, lt))
            }
            (TypeKind::Scalar(k), TypeKind::Matrix(s, _)) if k.is_numeric() => {
                let lhs = self.convert_scalar_kind(lhs, s);
                Ok((lhs, rhs, rt))
            }
            _ => Err(self
                .invalid_operands(op, lt, rt, op_token)
                .with_note("use `mul` for matrix-vector and matrix-matrix products")),
        }
    }

    fn invalid_operands(&self, op: BinaryOp, lt: TypeId, rt: TypeId, token: Token) -> CompileError {
        self.semantic_at(
            ErrorCode::E2004,
            format!(
                "invalid operands to `{}`: `{}` and `{}`",
                op.symbol(),
                self.type_name(lt),
                self.type_name(rt)
            ),
            token,
        )
    }

    pub(crate) fn type_unary(
        &mut self,
        op: UnaryOp,
        operand: NodeId,
        op_token: Token,
    ) -> CompileResult<TypeId> {
        let ty = self.ty(operand);
        let types = &self.shader.types;
        let scalar = types.scalar_kind(ty);
        let ok = match op {
            UnaryOp::Neg => scalar.is_some_and(ScalarKind::is_numeric),
            UnaryOp::Not => scalar == Some(ScalarKind::Bool) && !types.is_matrix(ty),
            UnaryOp::BitNot => scalar.is_some_and(ScalarKind::is_integer),
            UnaryOp::PreInc | UnaryOp::PreDec => {
                scalar.is_some_and(ScalarKind::is_numeric) && !types.is_matrix(ty)
            }
        };
        if !ok {
            return Err(self.semantic_at(
                ErrorCode::E2004,
                format!(
                    "invalid operand to unary `{}`: `{}`",
                    op.symbol(),
                    self.type_name(ty)
                ),
                op_token,
            ));
        }
        if op.mutates() {
            self.check_lvalue(operand)?;
        }
        Ok(ty)
    }

    /// Rewrite `id` to the same shape with scalar kind `kind`.
    pub(crate) fn convert_scalar_kind(&mut self, id: NodeId, kind: ScalarKind) -> NodeId {
        let ty = self.ty(id);
        match self.shader.types.with_scalar(ty, kind) {
            Some(target) if target != ty => self.convert_node(id, target),
            _ => id,
        }
    }

    /// Implicit conversion: same type, numeric kind change with equal
    /// width, or scalar broadcast to a vector.
    pub(crate) fn can_convert(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let types = &self.shader.types;
        match (types.kind(from), types.kind(to)) {
            (TypeKind::Scalar(a), TypeKind::Scalar(b))
            | (TypeKind::Scalar(a), TypeKind::Vector(b, _)) => a.is_numeric() && b.is_numeric(),
            (TypeKind::Vector(a, n), TypeKind::Vector(b, m)) => {
                n == m && a.is_numeric() && b.is_numeric()
            }
            _ => false,
        }
    }

    /// Explicit cast: any scalar/vector kind change with equal width or
    /// from a scalar, and same-shape matrices.
    pub(crate) fn can_cast(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let types = &self.shader.types;
        match (types.kind(from), types.kind(to)) {
            (TypeKind::Scalar(_), TypeKind::Scalar(_) | TypeKind::Vector(..)) => true,
            (TypeKind::Vector(_, n), TypeKind::Vector(_, m)) => n == m,
            (TypeKind::Matrix(_, n), TypeKind::Matrix(_, m)) => n == m,
            _ => false,
        }
    }

    /// Convert `id` to `to`, or report a type mismatch naming `context`.
    pub(crate) fn coerce(&mut self, id: NodeId, to: TypeId, context: &str) -> CompileResult<NodeId> {
        let from = self.ty(id);
        if from == to {
            return Ok(id);
        }
        if !self.can_convert(from, to) {
            return Err(self.semantic_node(
                ErrorCode::E2003,
                format!(
                    "type mismatch in {context}: expected `{}`, found `{}`",
                    self.type_name(to),
                    self.type_name(from)
                ),
                id,
            ));
        }
        Ok(self.convert_node(id, to))
    }

    /// Wrap `id` in a conversion to `to`. Scalar literals are converted in
    /// place so `float x = 1;` keeps a plain literal.
    fn convert_node(&mut self, id: NodeId, to: TypeId) -> NodeId {
        let node = self.node(id);
        let (span, line) = (node.span, node.line);
        let literal = match node.kind {
            NodeKind::Literal(value) => Some(value),
            _ => None,
        };
        let types = &self.shader.types;
        if let (Some(value), Some(kind), true) = (literal, types.scalar_kind(to), types.is_scalar(to)) {
            let value = shc_ir::constant::convert(value, kind);
            return self.alloc(NodeKind::Literal(value), span, line, to);
        }
        self.alloc(NodeKind::Cast { ty: to, operand: id }, span, line, to)
    }

    pub(crate) fn check_lvalue(&self, id: NodeId) -> CompileResult<()> {
        match &self.node(id).kind {
            NodeKind::Variable(var) => {
                let def = self.shader.variables.get(*var);
                if def.is_read_only() {
                    return Err(self.semantic_node(
                        ErrorCode::E2005,
                        format!("cannot assign to read-only `{}`", self.name_text(def.name)),
                        id,
                    ));
                }
                Ok(())
            }
            NodeKind::Field { base, .. } | NodeKind::Index { base, .. } => self.check_lvalue(*base),
            NodeKind::Swizzle { base, swizzle } => {
                if swizzle.has_duplicates() {
                    return Err(self.semantic_node(
                        ErrorCode::E2005,
                        format!("cannot assign to swizzle `.{}` with repeated components", swizzle.letters()),
                        id,
                    ));
                }
                self.check_lvalue(*base)
            }
            _ => Err(self.semantic_node(ErrorCode::E2005, "expression is not assignable", id)),
        }
    }

    /// Fold a scalar constant expression.
    pub(crate) fn constant_value(&self, id: NodeId) -> Option<Literal> {
        ConstEnv {
            arena: &self.shader.arena,
            types: &self.shader.types,
            variables: &self.shader.variables,
        }
        .evaluate(id)
    }

    /// Whether `id` is built only from literals, constants, constructors,
    /// casts and operators over those.
    pub(crate) fn is_constant_expr(&self, id: NodeId) -> bool {
        match &self.node(id).kind {
            NodeKind::Literal(_) => true,
            NodeKind::Variable(var) => {
                let def = self.shader.variables.get(*var);
                def.is_const && (def.constant.is_some() || def.init.is_some_and(|init| self.is_constant_expr(init)))
            }
            NodeKind::Unary { op, operand } => !op.mutates() && self.is_constant_expr(*operand),
            NodeKind::Binary { lhs, rhs, .. } => self.is_constant_expr(*lhs) && self.is_constant_expr(*rhs),
            NodeKind::Ternary { cond, then_expr, else_expr } => {
                self.is_constant_expr(*cond)
                    && self.is_constant_expr(*then_expr)
                    && self.is_constant_expr(*else_expr)
            }
            NodeKind::Cast { operand, .. } => self.is_constant_expr(*operand),
            NodeKind::Swizzle { base, .. } | NodeKind::Field { base, .. } => self.is_constant_expr(*base),
            NodeKind::Construct { args, .. } => self
                .shader
                .arena
                .list(*args)
                .iter()
                .all(|&arg| self.is_constant_expr(arg)),
            _ => false,
        }
    }

    /// Evaluate a constant integer (array sizes, thread-group sizes).
    pub(crate) fn constant_u32(&self, id: NodeId, what: &str) -> CompileResult<u32> {
        let value = match self.constant_value(id) {
            Some(Literal::Int(v)) => u32::try_from(v).ok(),
            Some(Literal::UInt(v)) => Some(v),
            _ => None,
        };
        value.ok_or_else(|| {
            self.semantic_node(
                ErrorCode::E2014,
                format!("{what} must be a non-negative integer constant"),
                id,
            )
        })
    }
}
