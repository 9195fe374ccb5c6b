//! Expression parsing by precedence climbing, one function per level.
//!
//! Lowest to highest:
//! assignment, ternary, `||`, `&&`, `|`, `^`, `&`, equality, relational,
//! shift, additive, multiplicative, prefix unary and casts, postfix, primary.
//! Assignment and ternary associate to the right; everything else to the left.

mod postfix;
mod primary;

use crate::stack::ensure_sufficient_stack;
use crate::Parser;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{AssignOp, BinaryOp, NodeId, NodeKind, Token, TokenKind, TypeId, TypeKind, UnaryOp};

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> CompileResult<NodeId> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    pub(crate) fn parse_assignment(&mut self) -> CompileResult<NodeId> {
        let target = self.parse_ternary()?;
        let Some(op) = assign_op(self.current_kind()) else {
            return Ok(target);
        };
        let op_token = self.advance()?;
        let value = self.parse_assignment()?;
        self.check_lvalue(target)?;

        let target_ty = self.ty(target);
        let value = match op {
            AssignOp::Assign => self.coerce(value, target_ty, "assignment")?,
            AssignOp::Compound(binary) => {
                let (_, _, result) = self.type_binary(binary, target, value, op_token)?;
                if !self.can_convert(result, target_ty) {
                    return Err(self.semantic_at(
                        ErrorCode::E2003,
                        format!(
                            "type mismatch in `{}`: cannot store `{}` into `{}`",
                            op.symbol(),
                            self.type_name(result),
                            self.type_name(target_ty)
                        ),
                        op_token,
                    ));
                }
                match self.shader.types.scalar_kind(target_ty) {
                    Some(kind) => self.convert_scalar_kind(value, kind),
                    None => value,
                }
            }
        };
        let span = self.span_of(target).merge(self.span_of(value));
        let line = self.node(target).line;
        Ok(self.alloc(NodeKind::Assign { op, target, value }, span, line, target_ty))
    }

    pub(crate) fn parse_ternary(&mut self) -> CompileResult<NodeId> {
        let cond = self.parse_logical_or()?;
        if !self.check(TokenKind::Question) {
            return Ok(cond);
        }
        let question = self.advance()?;
        self.check_condition(cond, "ternary")?;
        let then_expr = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_ternary()?;
        let (then_expr, else_expr, ty) = self.unify_arms(then_expr, else_expr, question)?;
        let span = self.span_of(cond).merge(self.span_of(else_expr));
        let line = self.node(cond).line;
        Ok(self.alloc(
            NodeKind::Ternary {
                cond,
                then_expr,
                else_expr,
            },
            span,
            line,
            ty,
        ))
    }

    /// Both arms of `?:` converted to one type.
    fn unify_arms(
        &mut self,
        then_expr: NodeId,
        else_expr: NodeId,
        question: Token,
    ) -> CompileResult<(NodeId, NodeId, TypeId)> {
        let (a, b) = (self.ty(then_expr), self.ty(else_expr));
        if a == b {
            return Ok((then_expr, else_expr, a));
        }
        let types = &self.shader.types;
        let shape = |kind: TypeKind| match kind {
            TypeKind::Scalar(k) => Some((k, 1)),
            TypeKind::Vector(k, n) => Some((k, n)),
            _ => None,
        };
        let target = match (shape(types.kind(a)), shape(types.kind(b))) {
            (Some((ka, wa)), Some((kb, wb)))
                if ka.is_numeric() && kb.is_numeric() && (wa == wb || wa == 1 || wb == 1) =>
            {
                types.vector(ka.promote(kb), wa.max(wb))
            }
            _ => None,
        };
        let Some(target) = target else {
            return Err(self.semantic_at(
                ErrorCode::E2003,
                format!(
                    "ternary arms have incompatible types `{}` and `{}`",
                    self.type_name(a),
                    self.type_name(b)
                ),
                question,
            ));
        };
        let then_expr = self.coerce(then_expr, target, "ternary arm")?;
        let else_expr = self.coerce(else_expr, target, "ternary arm")?;
        Ok((then_expr, else_expr, target))
    }

    fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, op_token: Token) -> CompileResult<NodeId> {
        let (lhs, rhs, ty) = self.type_binary(op, lhs, rhs, op_token)?;
        let span = self.span_of(lhs).merge(self.span_of(rhs));
        let line = self.node(lhs).line;
        Ok(self.alloc(NodeKind::Binary { op, lhs, rhs }, span, line, ty))
    }

    fn parse_logical_or(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_logical_and()?;
        while self.check(TokenKind::PipePipe) {
            let op_token = self.advance()?;
            let right = self.parse_logical_and()?;
            left = self.binary(BinaryOp::Or, left, right, op_token)?;
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_bitwise_or()?;
        while self.check(TokenKind::AmpAmp) {
            let op_token = self.advance()?;
            let right = self.parse_bitwise_or()?;
            left = self.binary(BinaryOp::And, left, right, op_token)?;
        }
        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_bitwise_xor()?;
        while self.check(TokenKind::Pipe) {
            let op_token = self.advance()?;
            let right = self.parse_bitwise_xor()?;
            left = self.binary(BinaryOp::BitOr, left, right, op_token)?;
        }
        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_bitwise_and()?;
        while self.check(TokenKind::Caret) {
            let op_token = self.advance()?;
            let right = self.parse_bitwise_and()?;
            left = self.binary(BinaryOp::BitXor, left, right, op_token)?;
        }
        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::Amp) {
            let op_token = self.advance()?;
            let right = self.parse_equality()?;
            left = self.binary(BinaryOp::BitAnd, left, right, op_token)?;
        }
        Ok(left)
    }

    /// `==` `!=`
    fn parse_equality(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            let op_token = self.advance()?;
            let right = self.parse_relational()?;
            left = self.binary(op, left, right, op_token)?;
        }
        Ok(left)
    }

    /// `<` `>` `<=` `>=`
    fn parse_relational(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let op_token = self.advance()?;
            let right = self.parse_shift()?;
            left = self.binary(op, left, right, op_token)?;
        }
        Ok(left)
    }

    /// `<<` `>>`
    fn parse_shift(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Shl => BinaryOp::Shl,
                TokenKind::Shr => BinaryOp::Shr,
                _ => break,
            };
            let op_token = self.advance()?;
            let right = self.parse_additive()?;
            left = self.binary(op, left, right, op_token)?;
        }
        Ok(left)
    }

    /// `+` `-`
    fn parse_additive(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let op_token = self.advance()?;
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right, op_token)?;
        }
        Ok(left)
    }

    /// `*` `/` `%`
    fn parse_multiplicative(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            let op_token = self.advance()?;
            let right = self.parse_unary()?;
            left = self.binary(op, left, right, op_token)?;
        }
        Ok(left)
    }

    /// Prefix operators and C-style casts.
    fn parse_unary(&mut self) -> CompileResult<NodeId> {
        let token = self.current();
        let op = match token.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::MinusMinus => UnaryOp::PreDec,
            TokenKind::Plus => {
                self.advance()?;
                let operand = ensure_sufficient_stack(|| self.parse_unary())?;
                if !self.shader.types.is_numeric(self.ty(operand)) {
                    return Err(self.semantic_at(
                        ErrorCode::E2004,
                        format!("invalid operand to unary `+`: `{}`", self.type_name(self.ty(operand))),
                        token,
                    ));
                }
                return Ok(operand);
            }
            TokenKind::LParen if self.is_cast()? => return self.parse_cast(),
            _ => return self.parse_postfix(),
        };
        self.advance()?;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let ty = self.type_unary(op, operand, token)?;
        let span = token.span.merge(self.span_of(operand));
        Ok(self.alloc(NodeKind::Unary { op, operand }, span, token.line, ty))
    }

    /// `( type )` ahead of the cursor.
    fn is_cast(&mut self) -> CompileResult<bool> {
        let ty = self.peek_nth(1)?;
        if self.resolve_type(ty).is_none() {
            return Ok(false);
        }
        Ok(self.peek_nth(2)?.kind == TokenKind::RParen)
    }

    fn parse_cast(&mut self) -> CompileResult<NodeId> {
        let open = self.expect(TokenKind::LParen)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::RParen)?;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let from = self.ty(operand);
        if !self.can_cast(from, ty) {
            return Err(self.semantic_at(
                ErrorCode::E2003,
                format!("cannot cast `{}` to `{}`", self.type_name(from), self.type_name(ty)),
                open,
            ));
        }
        let span = open.span.merge(self.span_of(operand));
        Ok(self.alloc(NodeKind::Cast { ty, operand }, span, open.line, ty))
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => return Some(AssignOp::Assign),
        TokenKind::PlusEq => BinaryOp::Add,
        TokenKind::MinusEq => BinaryOp::Sub,
        TokenKind::StarEq => BinaryOp::Mul,
        TokenKind::SlashEq => BinaryOp::Div,
        TokenKind::PercentEq => BinaryOp::Rem,
        TokenKind::AmpEq => BinaryOp::BitAnd,
        TokenKind::PipeEq => BinaryOp::BitOr,
        TokenKind::CaretEq => BinaryOp::BitXor,
        TokenKind::ShlEq => BinaryOp::Shl,
        TokenKind::ShrEq => BinaryOp::Shr,
        _ => return None,
    };
    Some(AssignOp::Compound(op))
}
