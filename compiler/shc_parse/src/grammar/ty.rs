//! Type names.

use crate::Parser;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{Token, TokenKind, TypeId};

impl Parser<'_> {
    /// Resolve `token` as a type name without interning anything.
    pub(crate) fn resolve_type(&self, token: Token) -> Option<TypeId> {
        if token.kind != TokenKind::Ident {
            return None;
        }
        let name = self.shader.interner.get(self.text(token))?;
        if self.scopes.lookup(name).is_some() {
            return None;
        }
        self.shader.types.lookup(name)
    }

    /// Whether the lookahead names a type.
    pub(crate) fn check_type(&self) -> bool {
        self.resolve_type(self.current()).is_some()
    }

    pub(crate) fn parse_type(&mut self) -> CompileResult<TypeId> {
        match self.resolve_type(self.current()) {
            Some(ty) => {
                self.advance()?;
                Ok(ty)
            }
            None => Err(CompileError::parse(
                ErrorCode::E1004,
                format!("expected type, found {}", self.describe_current()),
                self.current_span(),
                self.current().line,
            )),
        }
    }

    /// A type usable for a value: anything but `void`.
    pub(crate) fn parse_value_type(&mut self, what: &str) -> CompileResult<TypeId> {
        let token = self.current();
        let ty = self.parse_type()?;
        if ty == TypeId::VOID {
            return Err(CompileError::parse(
                ErrorCode::E1004,
                format!("{what} cannot have type `void`"),
                token.span,
                token.line,
            ));
        }
        Ok(ty)
    }

    /// Optional `[N]` after a declarator name.
    pub(crate) fn parse_array_suffix(&mut self, element: TypeId) -> CompileResult<TypeId> {
        if !self.eat(TokenKind::LBracket)? {
            return Ok(element);
        }
        let size = self.parse_ternary()?;
        self.expect(TokenKind::RBracket)?;
        let len = self.constant_u32(size, "array size")?;
        if len == 0 {
            return Err(self.semantic_node(ErrorCode::E2014, "array size must be at least 1", size));
        }
        let shader = &mut *self.shader;
        Ok(shader.types.array(element, len, &mut shader.interner))
    }
}
