//! Primary expressions: literals, names, calls, constructors, parentheses.

use crate::Parser;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::constant;
use shc_ir::{
    FunctionId, GlobalSymbol, Intrinsic, Literal, NodeId, NodeKind, ScalarKind, Token, TokenKind,
    TypeId, TypeKind,
};
use smallvec::SmallVec;

type Args = SmallVec<[NodeId; 4]>;

impl Parser<'_> {
    pub(crate) fn parse_primary(&mut self) -> CompileResult<NodeId> {
        let allow_texture = std::mem::take(&mut self.texture_allowed);
        let token = self.current();
        let (literal, ty) = match token.kind {
            // Only hex literals reach past `i32::MAX`; they keep their bits.
            TokenKind::Int(v) => (Literal::Int(v as u32 as i32), TypeId::INT),
            TokenKind::UInt(v) => (Literal::UInt(v as u32), TypeId::UINT),
            TokenKind::Float(bits) => (
                constant::convert(Literal::Float(bits), ScalarKind::Float),
                TypeId::FLOAT,
            ),
            TokenKind::Half(bits) => (
                constant::convert(Literal::Float(bits), ScalarKind::Half),
                TypeId::HALF,
            ),
            TokenKind::True => (Literal::Bool(true), TypeId::BOOL),
            TokenKind::False => (Literal::Bool(false), TypeId::BOOL),
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::Ident => return self.parse_name(allow_texture),
            _ => {
                return Err(CompileError::parse(
                    ErrorCode::E1002,
                    format!("expected expression, found {}", self.describe_current()),
                    token.span,
                    token.line,
                ))
            }
        };
        self.advance()?;
        Ok(self.alloc(NodeKind::Literal(literal), token.span, token.line, ty))
    }

    /// An identifier: variable, texture, call or constructor.
    fn parse_name(&mut self, allow_texture: bool) -> CompileResult<NodeId> {
        let token = self.current();
        if self.check_type() && self.peek_nth(1)?.kind == TokenKind::LParen {
            let ty = self.parse_type()?;
            return self.parse_constructor(ty, token);
        }
        self.advance()?;
        let name = self.intern(token);
        let text = self.text(token);

        if self.check(TokenKind::LParen) {
            if let Some(&GlobalSymbol::Function(function)) = self.shader.globals.get(&name) {
                return self.parse_call(function, token);
            }
            if let Some(intrinsic) = Intrinsic::from_name(text) {
                return self.parse_intrinsic(intrinsic, token);
            }
            if self.scopes.lookup(name).is_some() || self.shader.globals.contains_key(&name) {
                return Err(self.semantic_at(
                    ErrorCode::E2004,
                    format!("`{text}` is not a function"),
                    token,
                ));
            }
            return Err(self.semantic_at(
                ErrorCode::E2001,
                format!("undeclared function `{text}`"),
                token,
            ));
        }

        if let Some(var) = self.scopes.lookup(name) {
            let ty = self.shader.variables.get(var).ty;
            return Ok(self.alloc(NodeKind::Variable(var), token.span, token.line, ty));
        }
        match self.shader.globals.get(&name).copied() {
            Some(GlobalSymbol::Variable(var)) => {
                let ty = self.shader.variables.get(var).ty;
                Ok(self.alloc(NodeKind::Variable(var), token.span, token.line, ty))
            }
            Some(GlobalSymbol::Texture(texture)) if allow_texture => Ok(self.alloc(
                NodeKind::Texture(texture),
                token.span,
                token.line,
                TypeId::VOID,
            )),
            Some(GlobalSymbol::Texture(_)) => Err(self.semantic_at(
                ErrorCode::E2015,
                format!(
                    "texture `{text}` may only be the first argument of `sample`, `sample_level`, `load` or `store`"
                ),
                token,
            )),
            Some(GlobalSymbol::Function(_)) => Err(self.semantic_at(
                ErrorCode::E2004,
                format!("function `{text}` used as a value"),
                token,
            )),
            Some(GlobalSymbol::Struct(_) | GlobalSymbol::Type(_)) => Err(CompileError::parse(
                ErrorCode::E1002,
                format!("expected expression, found type `{text}`"),
                token.span,
                token.line,
            )),
            None if self.shader.types.lookup(name).is_some() => Err(CompileError::parse(
                ErrorCode::E1002,
                format!("expected expression, found type `{text}`"),
                token.span,
                token.line,
            )),
            None => Err(self.semantic_at(
                ErrorCode::E2001,
                format!("undeclared identifier `{text}`"),
                token,
            )),
        }
    }

    /// `( arg, ... )`. With `texture_first`, the first argument may name a
    /// texture.
    fn parse_args(&mut self, texture_first: bool) -> CompileResult<(Args, Token)> {
        self.expect(TokenKind::LParen)?;
        let mut args = Args::new();
        if !self.check(TokenKind::RParen) {
            loop {
                self.texture_allowed = texture_first && args.is_empty();
                let arg = self.parse_expression();
                self.texture_allowed = false;
                args.push(arg?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok((args, close))
    }

    fn parse_call(&mut self, function: FunctionId, name: Token) -> CompileResult<NodeId> {
        let (mut args, close) = self.parse_args(false)?;
        let def = self.shader.functions.get(function);
        let return_ty = def.return_ty;
        let params: SmallVec<[TypeId; 4]> = def
            .params
            .iter()
            .map(|&p| self.shader.variables.get(p).ty)
            .collect();
        let text = self.text(name);
        if args.len() != params.len() {
            return Err(self.semantic_at(
                ErrorCode::E2006,
                format!(
                    "`{text}` takes {} argument(s), found {}",
                    params.len(),
                    args.len()
                ),
                name,
            ));
        }
        for (i, (arg, &ty)) in args.iter_mut().zip(&params).enumerate() {
            let context = format!("argument {} of `{text}`", i + 1);
            *arg = self.coerce(*arg, ty, &context)?;
        }
        if let Some(caller) = self.function {
            self.shader.functions.get_mut(caller).record_call(function);
        }
        let range = self.shader.arena.alloc_list(args);
        Ok(self.alloc(
            NodeKind::Call { function, args: range },
            name.span.merge(close.span),
            name.line,
            return_ty,
        ))
    }

    fn parse_intrinsic(&mut self, intrinsic: Intrinsic, name: Token) -> CompileResult<NodeId> {
        let (mut args, close) = self.parse_args(intrinsic.takes_texture())?;
        let ty = self.type_intrinsic(intrinsic, &mut args, name)?;
        let range = self.shader.arena.alloc_list(args);
        Ok(self.alloc(
            NodeKind::Intrinsic { intrinsic, args: range },
            name.span.merge(close.span),
            name.line,
            ty,
        ))
    }

    /// `float4(a, b)`, `float3x3(r0, r1, r2)`, `int(x)`.
    fn parse_constructor(&mut self, ty: TypeId, name: Token) -> CompileResult<NodeId> {
        let (mut args, close) = self.parse_args(false)?;
        let types = &self.shader.types;
        let arg_shapes: SmallVec<[Option<(ScalarKind, u8)>; 4]> = args
            .iter()
            .map(|&arg| match types.kind(self.ty(arg)) {
                TypeKind::Scalar(k) => Some((k, 1)),
                TypeKind::Vector(k, n) => Some((k, n)),
                _ => None,
            })
            .collect();

        let converted_to = match types.kind(ty) {
            TypeKind::Scalar(kind) => {
                if args.len() != 1 || arg_shapes[0].map(|(_, n)| n) != Some(1) {
                    return Err(self.constructor_error(ty, "one scalar", &args, name));
                }
                kind
            }
            TypeKind::Vector(kind, width) => {
                let components: Option<u32> = arg_shapes
                    .iter()
                    .map(|shape| shape.map(|(_, n)| u32::from(n)))
                    .sum();
                let broadcast = args.len() == 1 && arg_shapes[0].map(|(_, n)| n) == Some(1);
                if !broadcast && components != Some(u32::from(width)) {
                    let expected = format!("{width} components");
                    return Err(self.constructor_error(ty, &expected, &args, name));
                }
                kind
            }
            TypeKind::Matrix(kind, dim) => {
                let copy = args.len() == 1 && self.ty(args[0]) == ty;
                let rows = args.len() == usize::from(dim)
                    && arg_shapes.iter().all(|s| s.is_some_and(|(k, n)| n == dim && k.is_numeric()));
                let scalars = args.len() == usize::from(dim) * usize::from(dim)
                    && arg_shapes.iter().all(|s| s.is_some_and(|(k, n)| n == 1 && k.is_numeric()));
                if !(copy || rows || scalars) {
                    let expected = format!("{dim} row vectors or {} scalars", dim * dim);
                    return Err(self.constructor_error(ty, &expected, &args, name));
                }
                kind
            }
            _ => {
                return Err(self.semantic_at(
                    ErrorCode::E2004,
                    format!("cannot construct `{}`", self.type_name(ty)),
                    name,
                ))
            }
        };

        for arg in &mut args {
            *arg = self.convert_scalar_kind(*arg, converted_to);
        }
        let range = self.shader.arena.alloc_list(args);
        Ok(self.alloc(
            NodeKind::Construct { ty, args: range },
            name.span.merge(close.span),
            name.line,
            ty,
        ))
    }

    fn constructor_error(
        &self,
        ty: TypeId,
        expected: &str,
        args: &[NodeId],
        name: Token,
    ) -> CompileError {
        let found: Vec<&str> = args.iter().map(|&arg| self.type_name(self.ty(arg))).collect();
        self.semantic_at(
            ErrorCode::E2006,
            format!(
                "`{}` constructor expects {expected}, found ({})",
                self.type_name(ty),
                found.join(", ")
            ),
            name,
        )
    }
}
