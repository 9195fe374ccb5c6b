//! Postfix chaining: `.member`, `[index]`, `++`, `--`.
//!
//! Every postfix form applies to the expression built so far, so
//! `a[b].c++` parses as `((a[b]).c)++`.

use crate::Parser;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{Literal, NodeId, NodeKind, PostfixOp, TokenKind, TypeId, TypeKind, UnaryOp};

impl Parser<'_> {
    pub(crate) fn parse_postfix(&mut self) -> CompileResult<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.current_kind() {
                TokenKind::Dot => self.parse_member_access(expr)?,
                TokenKind::LBracket => self.parse_subscript(expr)?,
                TokenKind::PlusPlus => self.parse_postfix_step(expr, PostfixOp::Inc)?,
                TokenKind::MinusMinus => self.parse_postfix_step(expr, PostfixOp::Dec)?,
                _ => return Ok(expr),
            };
        }
    }

    /// `.field` on a struct or `.swizzle` on a vector.
    pub(crate) fn parse_member_access(&mut self, base: NodeId) -> CompileResult<NodeId> {
        self.advance()?;
        let (name, token) = self.expect_ident()?;
        let ty = self.ty(base);
        let span = self.span_of(base).merge(token.span);
        let line = self.node(base).line;

        if let Some(id) = self.shader.types.struct_id(ty) {
            let record = self.shader.structs.get(id);
            let field = record
                .field_index(name)
                .and_then(|index| record.field(index).map(|field| (index, field.ty)));
            let Some((index, field_ty)) = field else {
                return Err(self.semantic_at(
                    ErrorCode::E2016,
                    format!(
                        "struct `{}` has no field `{}`",
                        self.type_name(ty),
                        self.name_text(name)
                    ),
                    token,
                ));
            };
            return Ok(self.alloc(NodeKind::Field { base, index }, span, line, field_ty));
        }

        let TypeKind::Vector(kind, width) = self.shader.types.kind(ty) else {
            return Err(self.semantic_at(
                ErrorCode::E2016,
                format!("`{}` has no members", self.type_name(ty)),
                token,
            ));
        };
        let text = self.text(token);
        let found = self.swizzles().lookup(text);
        match found {
            Some(swizzle) if swizzle.max_component() < width => {
                let result = self
                    .shader
                    .types
                    .vector(kind, swizzle.len())
                    .unwrap_or(TypeId::VOID);
                Ok(self.alloc(NodeKind::Swizzle { base, swizzle }, span, line, result))
            }
            _ => Err(self.semantic_at(
                ErrorCode::E2016,
                format!("invalid swizzle `.{text}` on `{}`", self.type_name(ty)),
                token,
            )),
        }
    }

    /// `[index]` on an array, vector or matrix row.
    pub(crate) fn parse_subscript(&mut self, base: NodeId) -> CompileResult<NodeId> {
        let open = self.advance()?;
        let index = self.parse_expression()?;
        let close = self.expect(TokenKind::RBracket)?;

        let index_ty = self.ty(index);
        if !matches!(index_ty, TypeId::INT | TypeId::UINT) {
            return Err(self.semantic_node(
                ErrorCode::E2003,
                format!(
                    "subscript index must be `int` or `uint`, found `{}`",
                    self.type_name(index_ty)
                ),
                index,
            ));
        }

        let ty = self.ty(base);
        let types = &self.shader.types;
        let (element, len) = match types.kind(ty) {
            TypeKind::Array(element, len) => (element, len),
            TypeKind::Vector(kind, n) => (types.scalar(kind), u32::from(n)),
            TypeKind::Matrix(kind, n) => (types.vector(kind, n).unwrap_or(TypeId::VOID), u32::from(n)),
            _ => {
                return Err(self.semantic_at(
                    ErrorCode::E2004,
                    format!("cannot subscript `{}`", self.type_name(ty)),
                    open,
                ))
            }
        };

        let constant = match self.constant_value(index) {
            Some(Literal::Int(v)) => Some(i64::from(v)),
            Some(Literal::UInt(v)) => Some(i64::from(v)),
            _ => None,
        };
        if let Some(v) = constant {
            if v < 0 || v >= i64::from(len) {
                return Err(self.semantic_node(
                    ErrorCode::E2004,
                    format!("index {v} is out of bounds for `{}`", self.type_name(ty)),
                    index,
                ));
            }
        }

        let span = self.span_of(base).merge(close.span);
        let line = self.node(base).line;
        Ok(self.alloc(NodeKind::Index { base, index }, span, line, element))
    }

    fn parse_postfix_step(&mut self, operand: NodeId, op: PostfixOp) -> CompileResult<NodeId> {
        let token = self.advance()?;
        let check = match op {
            PostfixOp::Inc => UnaryOp::PreInc,
            PostfixOp::Dec => UnaryOp::PreDec,
        };
        let ty = self.type_unary(check, operand, token)?;
        let span = self.span_of(operand).merge(token.span);
        let line = self.node(operand).line;
        Ok(self.alloc(NodeKind::Postfix { op, operand }, span, line, ty))
    }
}
