//! Top-level declarations.

use crate::Parser;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{
    FunctionDef, FunctionId, GlobalSymbol, Intrinsic, Name, NodeId, NodeKind, PackFormat,
    SlotError, Stage, Storage, StructDef, StructField, SystemValue, TextureDef, TextureKind, Token,
    TokenKind, TypeId, VariableDef, VariableId,
};

/// A parsed parameter before it becomes a variable.
struct Param {
    name: Name,
    ty: TypeId,
    semantic: Option<SystemValue>,
    line: u32,
}

impl Parser<'_> {
    /// Parse every top-level item until end of file.
    pub(crate) fn parse_items(&mut self) -> CompileResult<()> {
        while !self.is_at_end() {
            if let Some(item) = self.parse_item()? {
                self.shader.items.push(item);
            }
        }
        Ok(())
    }

    fn parse_item(&mut self) -> CompileResult<Option<NodeId>> {
        tracing::trace!(token = ?self.current_kind(), line = self.current().line, "item");
        match self.current_kind() {
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(None)
            }
            TokenKind::Struct => self.parse_struct().map(Some),
            TokenKind::Typedef => self.parse_typedef().map(Some),
            TokenKind::Const => self.parse_global_const().map(Some),
            TokenKind::Buffer => self.parse_buffer().map(Some),
            TokenKind::Texture2D => self.parse_texture(TextureKind::Texture2D).map(Some),
            TokenKind::Texture3D => self.parse_texture(TextureKind::Texture3D).map(Some),
            TokenKind::TextureCube => self.parse_texture(TextureKind::TextureCube).map(Some),
            TokenKind::Texture2DArray => self.parse_texture(TextureKind::Texture2DArray).map(Some),
            TokenKind::RwTexture2D => self.parse_texture(TextureKind::RwTexture2D).map(Some),
            TokenKind::Vertex => self.parse_entry(Stage::Vertex).map(Some),
            TokenKind::Fragment => self.parse_entry(Stage::Fragment).map(Some),
            TokenKind::Compute => self.parse_entry(Stage::Compute).map(Some),
            TokenKind::Hash => Err(CompileError::parse(
                ErrorCode::E1006,
                "preprocessor directive in expanded source",
                self.current_span(),
                self.current().line,
            )),
            TokenKind::Ident => self.parse_function(),
            _ => Err(self.unexpected("declaration")),
        }
    }

    /// Reject a top-level name that is already taken.
    fn check_global_name(&self, name: Name, token: Token) -> CompileResult<()> {
        let text = self.name_text(name);
        let taken = if let Some(existing) = self.shader.globals.get(&name) {
            Some(existing.describe())
        } else if self.shader.types.lookup(name).is_some() {
            Some("type")
        } else if Intrinsic::from_name(text).is_some() {
            Some("intrinsic")
        } else {
            None
        };
        match taken {
            Some(what) => Err(self.semantic_at(
                ErrorCode::E2002,
                format!("namespace conflict: `{text}` is already declared ({what})"),
                token,
            )),
            None => Ok(()),
        }
    }

    // struct Name { type field ([N])? (: semantic)? (packed_as format)?; ... };
    fn parse_struct(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let (name, name_token) = self.expect_ident()?;
        self.check_global_name(name, name_token)?;
        self.expect(TokenKind::LBrace)?;

        let mut fields: Vec<StructField> = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let field = self.parse_field()?;
            if fields.iter().any(|f| f.name == field.name) {
                return Err(CompileError::semantic(
                    ErrorCode::E2002,
                    format!("duplicate field `{}`", self.name_text(field.name)),
                    field.span,
                    field.line,
                ));
            }
            fields.push(field);
        }
        let close = self.expect(TokenKind::RBrace)?;
        self.eat(TokenKind::Semicolon)?;
        if fields.is_empty() {
            return Err(self.semantic_at(
                ErrorCode::E1005,
                format!("struct `{}` must have at least one field", self.name_text(name)),
                name_token,
            ));
        }

        let id = self.shader.structs.insert(
            name,
            StructDef {
                name,
                ty: TypeId::VOID,
                fields,
                line: keyword.line,
            },
        );
        let ty = self.shader.types.register_struct(name, id);
        self.shader.structs.get_mut(id).ty = ty;
        self.shader.globals.insert(name, GlobalSymbol::Struct(id));
        Ok(self.alloc(
            NodeKind::StructDecl(id),
            keyword.span.merge(close.span),
            keyword.line,
            ty,
        ))
    }

    fn parse_field(&mut self) -> CompileResult<StructField> {
        let element = self.parse_value_type("struct field")?;
        let (name, token) = self.expect_ident()?;
        let ty = self.parse_array_suffix(element)?;
        let semantic = if self.eat(TokenKind::Colon)? {
            Some(self.parse_semantic(ty)?)
        } else {
            None
        };
        let packing = if self.check(TokenKind::PackedAs) {
            let packed = self.advance()?;
            let format = self.expect(TokenKind::Ident)?;
            Some(self.check_packing(ty, semantic, packed, format)?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(StructField {
            name,
            ty,
            semantic,
            packing,
            span: token.span,
            line: token.line,
        })
    }

    fn check_packing(
        &self,
        ty: TypeId,
        semantic: Option<SystemValue>,
        packed: Token,
        format: Token,
    ) -> CompileResult<PackFormat> {
        let text = self.text(format);
        let Some(pack) = PackFormat::from_name(text) else {
            return Err(self.semantic_at(ErrorCode::E2019, format!("unknown packing format `{text}`"), format));
        };
        if let Some(sv) = semantic {
            return Err(self.semantic_at(
                ErrorCode::E2019,
                format!("`packed_as` is not allowed on system-value field `{}`", sv.name()),
                packed,
            ));
        }
        let types = &self.shader.types;
        let accepted = types.width(ty) > 0 && types.scalar_kind(ty).is_some_and(|k| pack.accepts(k));
        if !accepted {
            return Err(self.semantic_at(
                ErrorCode::E2019,
                format!("packing format `{text}` cannot hold `{}`", self.type_name(ty)),
                format,
            ));
        }
        Ok(pack)
    }

    /// Semantic name after `:`, checked against the annotated type.
    fn parse_semantic(&mut self, ty: TypeId) -> CompileResult<SystemValue> {
        if !self.check(TokenKind::Ident) {
            return Err(self.unexpected("semantic name"));
        }
        let token = self.advance()?;
        let text = self.text(token);
        let found = self.semantics().lookup(text);
        let Some(sv) = found else {
            return Err(self.semantic_at(ErrorCode::E2009, format!("unknown semantic `{text}`"), token));
        };
        let (kind, width) = sv.expected();
        let expected = self.shader.types.vector(kind, width);
        if expected != Some(ty) {
            let expected = expected.map_or("?", |e| self.type_name(e));
            return Err(self.semantic_at(
                ErrorCode::E2009,
                format!(
                    "semantic `{text}` requires `{expected}`, found `{}`",
                    self.type_name(ty)
                ),
                token,
            ));
        }
        Ok(sv)
    }

    // typedef type Alias;
    fn parse_typedef(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let target = self.parse_type()?;
        let (alias, token) = self.expect_ident()?;
        self.check_global_name(alias, token)?;
        let semi = self.expect(TokenKind::Semicolon)?;
        self.shader.types.register_alias(alias, target);
        self.shader.globals.insert(alias, GlobalSymbol::Type(target));
        Ok(self.alloc(
            NodeKind::Typedef(target),
            keyword.span.merge(semi.span),
            keyword.line,
            target,
        ))
    }

    // const type NAME = constant-expression;
    fn parse_global_const(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let ty = self.parse_value_type("constant")?;
        let (name, token) = self.expect_ident()?;
        let ty = self.parse_array_suffix(ty)?;
        self.check_global_name(name, token)?;
        if !self.check(TokenKind::Eq) {
            return Err(self.semantic_at(
                ErrorCode::E1005,
                format!("constant `{}` requires an initializer", self.name_text(name)),
                token,
            ));
        }
        self.advance()?;
        let init = self.parse_expression()?;
        let init = self.coerce(init, ty, "constant initializer")?;
        if !self.is_constant_expr(init) {
            return Err(self.semantic_node(
                ErrorCode::E2014,
                format!("initializer of `{}` is not a compile-time constant", self.name_text(name)),
                init,
            ));
        }
        let semi = self.expect(TokenKind::Semicolon)?;

        let mut def = VariableDef::new(name, ty, Storage::Constant, token.line);
        def.is_const = true;
        def.init = Some(init);
        def.constant = self.constant_value(init);
        let var = self.shader.variables.insert(name, def);
        self.shader.globals.insert(name, GlobalSymbol::Variable(var));
        Ok(self.alloc(
            NodeKind::GlobalDecl(var),
            keyword.span.merge(semi.span),
            keyword.line,
            ty,
        ))
    }

    /// Optional `(slot)` binding annotation.
    fn parse_slot(&mut self) -> CompileResult<Option<u32>> {
        if !self.eat(TokenKind::LParen)? {
            return Ok(None);
        }
        let expr = self.parse_ternary()?;
        self.expect(TokenKind::RParen)?;
        self.constant_u32(expr, "slot").map(Some)
    }

    fn slot_error(
        &self,
        error: SlotError,
        requested: Option<u32>,
        capacity: u32,
        what: &str,
        token: Token,
    ) -> CompileError {
        let slot = requested.unwrap_or_default();
        let message = match error {
            SlotError::Claimed => format!("{what} slot {slot} is already claimed"),
            SlotError::OutOfRange => format!("{what} slot {slot} is out of range (0..{capacity})"),
            SlotError::Exhausted => format!("no free {what} slot"),
        };
        self.semantic_at(ErrorCode::E2007, message, token)
    }

    // buffer(slot)? StructType name;
    fn parse_buffer(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let requested = self.parse_slot()?;
        let ty_token = self.current();
        let ty = self.parse_type()?;
        if self.shader.types.struct_id(ty).is_none() {
            return Err(self.semantic_at(
                ErrorCode::E1004,
                format!("buffer type must be a struct, found `{}`", self.type_name(ty)),
                ty_token,
            ));
        }
        let (name, token) = self.expect_ident()?;
        self.check_global_name(name, token)?;
        let semi = self.expect(TokenKind::Semicolon)?;

        let claimed = match requested {
            Some(slot) => self.shader.buffer_slots.claim(slot),
            None => self.shader.buffer_slots.claim_next(),
        };
        let capacity = self.shader.buffer_slots.capacity();
        let slot = claimed.map_err(|e| self.slot_error(e, requested, capacity, "buffer", token))?;
        tracing::trace!(buffer = self.name_text(name), slot, "claimed buffer slot");

        let def = VariableDef::new(name, ty, Storage::Buffer { slot }, token.line);
        let var = self.shader.variables.insert(name, def);
        self.shader.globals.insert(name, GlobalSymbol::Variable(var));
        Ok(self.alloc(
            NodeKind::GlobalDecl(var),
            keyword.span.merge(semi.span),
            keyword.line,
            ty,
        ))
    }

    // texture2d name(slot)?;
    fn parse_texture(&mut self, kind: TextureKind) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let (name, token) = self.expect_ident()?;
        self.check_global_name(name, token)?;
        let requested = self.parse_slot()?;
        let semi = self.expect(TokenKind::Semicolon)?;

        let claimed = match requested {
            Some(slot) => self.shader.texture_slots.claim(slot),
            None => self.shader.texture_slots.claim_next(),
        };
        let capacity = self.shader.texture_slots.capacity();
        let slot = claimed.map_err(|e| self.slot_error(e, requested, capacity, "texture", token))?;

        let id = self.shader.textures.insert(
            name,
            TextureDef {
                name,
                kind,
                slot,
                line: token.line,
            },
        );
        self.shader.globals.insert(name, GlobalSymbol::Texture(id));
        Ok(self.alloc(
            NodeKind::TextureDecl(id),
            keyword.span.merge(semi.span),
            keyword.line,
            TypeId::VOID,
        ))
    }

    /// `(params)`: empty, `(void)`, or a comma-separated list.
    fn parse_params(&mut self, entry: bool) -> CompileResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params: Vec<Param> = Vec::new();
        if self.check(TokenKind::Ident)
            && self.text(self.current()) == "void"
            && self.peek_nth(1)?.kind == TokenKind::RParen
        {
            self.advance()?;
        }
        while !self.check(TokenKind::RParen) {
            let ty = self.parse_value_type("parameter")?;
            let (name, token) = self.expect_ident()?;
            if params.iter().any(|p| p.name == name) {
                return Err(self.semantic_at(
                    ErrorCode::E2002,
                    format!("duplicate parameter `{}`", self.name_text(name)),
                    token,
                ));
            }
            let semantic = if self.check(TokenKind::Colon) {
                let colon = self.advance()?;
                if !entry {
                    return Err(self.semantic_at(
                        ErrorCode::E2009,
                        "semantics are only allowed on stage entry parameters",
                        colon,
                    ));
                }
                Some(self.parse_semantic(ty)?)
            } else {
                None
            };
            params.push(Param {
                name,
                ty,
                semantic,
                line: token.line,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn declare_params(&mut self, params: Vec<Param>) -> Vec<VariableId> {
        params
            .into_iter()
            .map(|param| {
                let mut def = VariableDef::new(param.name, param.ty, Storage::Param, param.line);
                def.semantic = param.semantic;
                self.shader.variables.push(def)
            })
            .collect()
    }

    // type name(params); | type name(params) { ... }
    fn parse_function(&mut self) -> CompileResult<Option<NodeId>> {
        let start = self.current();
        let return_ty = self.parse_type()?;
        let (name, token) = self.expect_ident()?;
        if !self.check(TokenKind::LParen) {
            return Err(self.semantic_at(
                ErrorCode::E1005,
                format!(
                    "global variable `{}` must be declared `const` or `buffer`",
                    self.name_text(name)
                ),
                token,
            ));
        }
        let params = self.parse_params(false)?;
        let is_definition = self.check(TokenKind::LBrace);

        let previous = match self.shader.globals.get(&name) {
            Some(&GlobalSymbol::Function(f)) => Some(f),
            _ => {
                self.check_global_name(name, token)?;
                None
            }
        };

        let param_types: Vec<TypeId> = params.iter().map(|p| p.ty).collect();
        let function = match previous {
            Some(f) => {
                self.check_redeclaration(f, return_ty, &param_types, is_definition, token)?;
                if is_definition {
                    let ids = self.declare_params(params);
                    let def = self.shader.functions.get_mut(f);
                    def.params = ids;
                    def.span = token.span;
                    def.line = token.line;
                }
                f
            }
            None => {
                let ids = self.declare_params(params);
                let f = self.shader.functions.insert(
                    name,
                    FunctionDef {
                        name,
                        return_ty,
                        params: ids,
                        body: None,
                        stage: None,
                        thread_group: None,
                        calls: Vec::new(),
                        span: token.span,
                        line: token.line,
                    },
                );
                self.shader.globals.insert(name, GlobalSymbol::Function(f));
                f
            }
        };

        let end = if is_definition {
            let body = self.parse_function_body(function)?;
            self.shader.functions.get_mut(function).body = Some(body);
            self.span_of(body)
        } else {
            self.expect(TokenKind::Semicolon)?.span
        };

        if previous.is_some() {
            return Ok(None);
        }
        Ok(Some(self.alloc(
            NodeKind::FunctionDecl(function),
            start.span.merge(end),
            start.line,
            return_ty,
        )))
    }

    fn check_redeclaration(
        &self,
        function: FunctionId,
        return_ty: TypeId,
        param_types: &[TypeId],
        is_definition: bool,
        token: Token,
    ) -> CompileResult<()> {
        let def = self.shader.functions.get(function);
        let text = self.name_text(def.name);
        if is_definition && def.body.is_some() {
            return Err(self
                .semantic_at(ErrorCode::E2002, format!("redefinition of function `{text}`"), token)
                .with_note(format!("first defined at line {}", def.line)));
        }
        let same = def.return_ty == return_ty
            && def.params.len() == param_types.len()
            && def
                .params
                .iter()
                .zip(param_types)
                .all(|(&p, &ty)| self.shader.variables.get(p).ty == ty);
        if !same {
            return Err(self
                .semantic_at(
                    ErrorCode::E2002,
                    format!("conflicting declaration of function `{text}`"),
                    token,
                )
                .with_note(format!("previous declaration at line {}", def.line)));
        }
        Ok(())
    }

    /// Parse `{ ... }` with the parameters in the outermost body scope.
    fn parse_function_body(&mut self, function: FunctionId) -> CompileResult<NodeId> {
        let open = self.expect(TokenKind::LBrace)?;
        self.scopes.push();
        let params = self.shader.functions.get(function).params.clone();
        for param in params {
            let name = self.shader.variables.get(param).name;
            // Parameter names were checked for duplicates already.
            let _ = self.scopes.declare(name, param);
        }
        self.function = Some(function);
        let body = self.parse_block_contents(open);
        self.function = None;
        self.scopes.pop();
        body
    }

    // vertex Ret main(params) { ... } | compute(x, y, z) void main(params) { ... }
    fn parse_entry(&mut self, stage: Stage) -> CompileResult<NodeId> {
        let keyword = self.advance()?;
        let thread_group = if stage == Stage::Compute {
            self.expect(TokenKind::LParen)?;
            let mut dims = [0u32; 3];
            for (i, dim) in dims.iter_mut().enumerate() {
                if i > 0 {
                    self.expect(TokenKind::Comma)?;
                }
                let expr = self.parse_ternary()?;
                *dim = self.constant_u32(expr, "thread group size")?;
            }
            self.expect(TokenKind::RParen)?;
            self.validate_thread_group(dims, keyword)?;
            Some(dims)
        } else {
            None
        };

        let return_ty = self.parse_type()?;
        let (name, token) = self.expect_ident()?;
        if self.name_text(name) != "main" {
            return Err(self.semantic_at(
                ErrorCode::E1005,
                format!(
                    "{stage} entry must be named `main`, found `{}`",
                    self.name_text(name)
                ),
                token,
            ));
        }
        let params = self.parse_params(true)?;
        let params = self.declare_params(params);
        let function = self.shader.functions.push(FunctionDef {
            name,
            return_ty,
            params,
            body: None,
            stage: Some(stage),
            thread_group,
            calls: Vec::new(),
            span: token.span,
            line: token.line,
        });
        if let Err(first) = self.shader.set_entry(stage, function) {
            let line = self.shader.functions.get(first).line;
            return Err(self.semantic_at(
                ErrorCode::E2008,
                format!("duplicate {stage} entry; first declared at line {line}"),
                keyword,
            ));
        }
        self.validate_entry(stage, function, token)?;
        tracing::trace!(%stage, line = token.line, "entry");

        let body = self.parse_function_body(function)?;
        self.shader.functions.get_mut(function).body = Some(body);
        let span = keyword.span.merge(self.span_of(body));
        Ok(self.alloc(NodeKind::FunctionDecl(function), span, keyword.line, return_ty))
    }
}
