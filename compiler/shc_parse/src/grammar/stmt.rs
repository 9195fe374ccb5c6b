//! Statements.

use crate::{Breakable, Parser};
use rustc_hash::FxHashSet;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::constant;
use shc_ir::{NodeId, NodeKind, Storage, Token, TokenKind, TypeId, VariableDef};
use smallvec::SmallVec;

impl Parser<'_> {
    pub(crate) fn parse_statement(&mut self) -> CompileResult<NodeId> {
        let token = self.current();
        match token.kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(self.alloc(NodeKind::Empty, token.span, token.line, TypeId::VOID))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Case => self.parse_case(),
            TokenKind::Default => self.parse_default(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_jump(NodeKind::Break),
            TokenKind::Continue => self.parse_jump(NodeKind::Continue),
            TokenKind::Discard => self.parse_jump(NodeKind::Discard),
            TokenKind::Const => self.parse_local_decl(),
            TokenKind::Ident if self.check_type() && self.peek_nth(1)?.kind == TokenKind::Ident => {
                self.parse_local_decl()
            }
            TokenKind::Struct
            | TokenKind::Typedef
            | TokenKind::Buffer
            | TokenKind::Texture2D
            | TokenKind::Texture3D
            | TokenKind::TextureCube
            | TokenKind::Texture2DArray
            | TokenKind::RwTexture2D
            | TokenKind::Vertex
            | TokenKind::Fragment
            | TokenKind::Compute => Err(self.semantic_at(
                ErrorCode::E1005,
                format!("{} declarations are only allowed at file scope", token.kind.describe()),
                token,
            )),
            _ => {
                let expr = self.parse_expression()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                let span = self.span_of(expr).merge(semi.span);
                Ok(self.alloc(NodeKind::ExprStmt(expr), span, token.line, TypeId::VOID))
            }
        }
    }

    /// `{ ... }` in a fresh scope.
    pub(crate) fn parse_block(&mut self) -> CompileResult<NodeId> {
        let open = self.expect(TokenKind::LBrace)?;
        self.scopes.push();
        let block = self.parse_block_contents(open);
        self.scopes.pop();
        block
    }

    /// Statements up to the closing brace; `open` is already consumed.
    pub(crate) fn parse_block_contents(&mut self, open: Token) -> CompileResult<NodeId> {
        let mut statements: SmallVec<[NodeId; 8]> = SmallVec::new();
        while !self.check(TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected("`}`"));
            }
            statements.push(self.parse_statement()?);
        }
        let close = self.advance()?;
        let range = self.shader.arena.alloc_list(statements);
        Ok(self.alloc(NodeKind::Block(range), open.span.merge(close.span), open.line, TypeId::VOID))
    }

    /// `( expr )` whose value must be a `bool` scalar.
    fn parse_condition(&mut self, what: &str) -> CompileResult<NodeId> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        self.check_condition(cond, what)?;
        Ok(cond)
    }

    pub(crate) fn check_condition(&self, cond: NodeId, what: &str) -> CompileResult<()> {
        let ty = self.ty(cond);
        if ty != TypeId::BOOL {
            return Err(self.semantic_node(
                ErrorCode::E2003,
                format!("{what} condition must be `bool`, found `{}`", self.type_name(ty)),
                cond,
            ));
        }
        Ok(())
    }

    fn parse_if(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let cond = self.parse_condition("`if`")?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.eat(TokenKind::Else)? {
            Some(self.parse_body()?)
        } else {
            None
        };
        let end = self.span_of(else_branch.unwrap_or(then_branch));
        Ok(self.alloc(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            keyword.span.merge(end),
            keyword.line,
            TypeId::VOID,
        ))
    }

    /// Branch or loop body. Generators always brace it, so an unbraced
    /// declaration is scoped to the body.
    fn parse_body(&mut self) -> CompileResult<NodeId> {
        self.scopes.push();
        let body = self.parse_statement();
        self.scopes.pop();
        body
    }

    /// Loop body with `break` and `continue` bound to the loop.
    fn parse_loop_body(&mut self) -> CompileResult<NodeId> {
        self.breakables.push(Breakable::Loop);
        let body = self.parse_body();
        self.breakables.pop();
        body
    }

    fn parse_while(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let cond = self.parse_condition("`while`")?;
        let body = self.parse_loop_body()?;
        let span = keyword.span.merge(self.span_of(body));
        Ok(self.alloc(NodeKind::While { cond, body }, span, keyword.line, TypeId::VOID))
    }

    fn parse_do_while(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let body = self.parse_loop_body()?;
        self.expect(TokenKind::While)?;
        let cond = self.parse_condition("`do-while`")?;
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(self.alloc(
            NodeKind::DoWhile { body, cond },
            keyword.span.merge(semi.span),
            keyword.line,
            TypeId::VOID,
        ))
    }

    fn parse_for(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        self.expect(TokenKind::LParen)?;
        self.scopes.push();

        let init = if self.eat(TokenKind::Semicolon)? {
            None
        } else if self.check(TokenKind::Const)
            || (self.check_type() && self.peek_nth(1)?.kind == TokenKind::Ident)
        {
            Some(self.parse_local_decl()?)
        } else {
            let start = self.current();
            let expr = self.parse_expression()?;
            let semi = self.expect(TokenKind::Semicolon)?;
            let span = self.span_of(expr).merge(semi.span);
            Some(self.alloc(NodeKind::ExprStmt(expr), span, start.line, TypeId::VOID))
        };

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            let cond = self.parse_expression()?;
            self.check_condition(cond, "`for`")?;
            Some(cond)
        };
        self.expect(TokenKind::Semicolon)?;

        let step = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = self.parse_loop_body()?;
        self.scopes.pop();
        let span = keyword.span.merge(self.span_of(body));
        Ok(self.alloc(
            NodeKind::For {
                init,
                cond,
                step,
                body,
            },
            span,
            keyword.line,
            TypeId::VOID,
        ))
    }

    fn parse_switch(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        self.expect(TokenKind::LParen)?;
        let selector = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let ty = self.ty(selector);
        if !matches!(ty, TypeId::INT | TypeId::UINT) {
            return Err(self.semantic_node(
                ErrorCode::E2003,
                format!("switch selector must be `int` or `uint`, found `{}`", self.type_name(ty)),
                selector,
            ));
        }
        if !self.check(TokenKind::LBrace) {
            return Err(self.unexpected("`{`"));
        }
        self.breakables.push(Breakable::Switch {
            selector: ty,
            cases: FxHashSet::default(),
            has_default: false,
        });
        let body = self.parse_block();
        self.breakables.pop();
        let body = body?;
        let span = keyword.span.merge(self.span_of(body));
        Ok(self.alloc(NodeKind::Switch { selector, body }, span, keyword.line, TypeId::VOID))
    }

    fn parse_case(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let selector = match self.breakables.last() {
            Some(Breakable::Switch { selector, .. }) => *selector,
            _ => {
                return Err(self.semantic_at(
                    ErrorCode::E2011,
                    "`case` label outside of a switch",
                    keyword,
                ))
            }
        };
        let expr = self.parse_ternary()?;
        let colon = self.expect(TokenKind::Colon)?;
        let kind = self.shader.types.scalar_kind(selector);
        let value = match (self.constant_value(expr), kind) {
            (Some(value), Some(kind)) if self.shader.types.is_scalar(self.ty(expr)) => {
                constant::convert(value, kind)
            }
            _ => {
                return Err(self.semantic_node(
                    ErrorCode::E2014,
                    "case value must be an integer constant",
                    expr,
                ))
            }
        };
        let duplicate = match self.breakables.last_mut() {
            Some(Breakable::Switch { cases, .. }) => !cases.insert(value),
            _ => false,
        };
        if duplicate {
            return Err(self.semantic_node(
                ErrorCode::E2012,
                format!("duplicate case value {value}"),
                expr,
            ));
        }
        Ok(self.alloc(
            NodeKind::Case(value),
            keyword.span.merge(colon.span),
            keyword.line,
            TypeId::VOID,
        ))
    }

    fn parse_default(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let colon = self.expect(TokenKind::Colon)?;
        match self.breakables.last_mut() {
            Some(Breakable::Switch { has_default, .. }) => {
                if std::mem::replace(has_default, true) {
                    return Err(self.semantic_at(
                        ErrorCode::E2012,
                        "duplicate `default` label",
                        keyword,
                    ));
                }
            }
            _ => {
                return Err(self.semantic_at(
                    ErrorCode::E2011,
                    "`default` label outside of a switch",
                    keyword,
                ))
            }
        }
        Ok(self.alloc(
            NodeKind::Default,
            keyword.span.merge(colon.span),
            keyword.line,
            TypeId::VOID,
        ))
    }

    fn parse_return(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let return_ty = self
            .function
            .map_or(TypeId::VOID, |f| self.shader.functions.get(f).return_ty);
        let value = if self.check(TokenKind::Semicolon) {
            if return_ty != TypeId::VOID {
                return Err(self.semantic_at(
                    ErrorCode::E2003,
                    format!("missing return value of type `{}`", self.type_name(return_ty)),
                    keyword,
                ));
            }
            None
        } else {
            let value = self.parse_expression()?;
            if return_ty == TypeId::VOID {
                return Err(self.semantic_node(
                    ErrorCode::E2003,
                    "function returning `void` cannot return a value",
                    value,
                ));
            }
            Some(self.coerce(value, return_ty, "return value")?)
        };
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(self.alloc(
            NodeKind::Return(value),
            keyword.span.merge(semi.span),
            keyword.line,
            TypeId::VOID,
        ))
    }

    /// `break;`, `continue;` or `discard;`.
    fn parse_jump(&mut self, kind: NodeKind) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let misplaced = match kind {
            NodeKind::Break => self.breakables.is_empty().then_some("`break` outside of a loop or switch"),
            NodeKind::Continue => (!self.breakables.iter().any(|b| matches!(b, Breakable::Loop)))
                .then_some("`continue` outside of a loop"),
            _ => None,
        };
        if let Some(message) = misplaced {
            return Err(self.semantic_at(ErrorCode::E2011, message, keyword));
        }
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(self.alloc(kind, keyword.span.merge(semi.span), keyword.line, TypeId::VOID))
    }

    // const? type a ([N])? (= e)? (, b ([N])? (= e)?)*;
    fn parse_local_decl(&mut self) -> CompileResult<NodeId> {
        let start = self.current();
        let is_const = self.eat(TokenKind::Const)?;
        let element = self.parse_value_type("variable")?;

        let mut decls: SmallVec<[NodeId; 4]> = SmallVec::new();
        loop {
            let (name, token) = self.expect_ident()?;
            if self.shader.types.lookup(name).is_some() {
                return Err(self.semantic_at(
                    ErrorCode::E2002,
                    format!("namespace conflict: `{}` is a type", self.name_text(name)),
                    token,
                ));
            }
            let ty = self.parse_array_suffix(element)?;
            let is_array = ty != element;

            // The initializer is resolved before the name is in scope.
            let init = if self.eat(TokenKind::Eq)? {
                if is_array {
                    return Err(self.semantic_at(
                        ErrorCode::E1005,
                        format!("array `{}` cannot have an initializer", self.name_text(name)),
                        token,
                    ));
                }
                let value = self.parse_assignment()?;
                let context = format!("initializer of `{}`", self.name_text(name));
                Some(self.coerce(value, ty, &context)?)
            } else {
                None
            };
            if is_const && init.is_none() {
                return Err(self.semantic_at(
                    ErrorCode::E1005,
                    format!("const `{}` requires an initializer", self.name_text(name)),
                    token,
                ));
            }

            let mut def = VariableDef::new(name, ty, Storage::Local, token.line);
            def.is_const = is_const;
            def.init = init;
            if is_const {
                def.constant = init.and_then(|init| self.constant_value(init));
            }
            let variable = self.shader.variables.push(def);
            if self.scopes.declare(name, variable).is_err() {
                return Err(self.semantic_at(
                    ErrorCode::E2002,
                    format!(
                        "namespace conflict: `{}` is already declared in this scope",
                        self.name_text(name)
                    ),
                    token,
                ));
            }
            let end = init.map_or(token.span, |init| self.span_of(init));
            decls.push(self.alloc(
                NodeKind::VarDecl { variable, init },
                token.span.merge(end),
                token.line,
                ty,
            ));

            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        let semi = self.expect(TokenKind::Semicolon)?;
        let span = start.span.merge(semi.span);
        if decls.len() == 1 {
            return Ok(decls[0]);
        }
        let range = self.shader.arena.alloc_list(decls);
        Ok(self.alloc(NodeKind::DeclGroup(range), span, start.line, TypeId::VOID))
    }
}
