//! Recursive descent parser for shc.
//!
//! Builds the AST directly in the shader's [`NodeArena`] while populating
//! the symbol tables. Names are resolved and types checked as nodes are
//! built, so a successful parse leaves a fully typed tree. The first error
//! aborts the file.

mod check;
mod grammar;
mod scope;
mod stack;

#[cfg(test)]
mod tests;

pub use scope::ScopeStack;

use rustc_hash::FxHashSet;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{
    FunctionId, Literal, Name, Node, NodeId, NodeKind, SemanticTable, Shader, ShaderState, Span,
    SwizzleTable, Token, TokenKind, TypeId,
};
use shc_lexer::Lexer;

/// Parse `source` into `shader`.
///
/// On success the shader is in [`ShaderState::Parsed`]. Errors carry the
/// line and span of the offending token or node.
#[tracing::instrument(level = "debug", skip_all, fields(shader = %shader.name))]
pub fn parse(shader: &mut Shader, source: &str) -> CompileResult<()> {
    let mut parser = Parser::new(shader, source)?;
    parser.parse_items()?;
    check::calls::check_call_graph(parser.shader)?;
    tracing::debug!(
        nodes = shader.arena.len(),
        functions = shader.functions.len(),
        "parsed"
    );
    shader.advance(ShaderState::Parsed);
    Ok(())
}

/// Enclosing construct that `break`, `continue` and `case` refer to.
pub(crate) enum Breakable {
    Loop,
    Switch {
        selector: TypeId,
        cases: FxHashSet<Literal>,
        has_default: bool,
    },
}

/// Parser state.
pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a str,
    pub(crate) shader: &'a mut Shader,
    /// Lookahead: the next unconsumed token.
    token: Token,
    /// Last consumed token.
    previous: Token,
    pub(crate) scopes: ScopeStack,
    swizzles: Option<SwizzleTable>,
    semantics: Option<SemanticTable>,
    /// Function whose body is being parsed.
    pub(crate) function: Option<FunctionId>,
    pub(crate) breakables: Vec<Breakable>,
    /// Set while parsing the first argument of a texture intrinsic.
    pub(crate) texture_allowed: bool,
}

impl<'a> Parser<'a> {
    fn new(shader: &'a mut Shader, source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let token = lexer.next()?;
        Ok(Parser {
            lexer,
            source,
            shader,
            token,
            previous: token,
            scopes: ScopeStack::new(),
            swizzles: None,
            semantics: None,
            function: None,
            breakables: Vec::new(),
            texture_allowed: false,
        })
    }

    // Token navigation

    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.token
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.token.kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.token.span
    }

    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        self.previous.span
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.token.kind == TokenKind::Eof
    }

    /// Consume the lookahead and return it.
    pub(crate) fn advance(&mut self) -> CompileResult<Token> {
        let consumed = self.token;
        self.token = self.lexer.next()?;
        self.previous = consumed;
        Ok(consumed)
    }

    /// Consume the lookahead if it is `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            return self.advance();
        }
        if kind == TokenKind::Semicolon && self.previous.line < self.token.line {
            // Report a missing `;` at the end of the line that lacks it.
            return Err(CompileError::parse(
                ErrorCode::E1001,
                format!("expected `;`, found {}", self.describe_current()),
                Span::point(self.previous_span().end),
                self.previous.line,
            ));
        }
        Err(self.unexpected(kind.describe()))
    }

    /// Token `n` positions past the lookahead (`n >= 1`).
    pub(crate) fn peek_nth(&mut self, n: usize) -> CompileResult<Token> {
        let mut token = self.token;
        for _ in 0..n {
            token = self.lexer.next()?;
        }
        for _ in 0..n {
            self.lexer.back();
        }
        Ok(token)
    }

    /// Source text of a token.
    #[inline]
    pub(crate) fn text(&self, token: Token) -> &'a str {
        token.lexeme(self.source)
    }

    pub(crate) fn intern(&mut self, token: Token) -> Name {
        let text = self.text(token);
        self.shader.interner.intern(text)
    }

    pub(crate) fn expect_ident(&mut self) -> CompileResult<(Name, Token)> {
        if self.check(TokenKind::Ident) {
            let token = self.advance()?;
            Ok((self.intern(token), token))
        } else {
            Err(CompileError::parse(
                ErrorCode::E1003,
                format!("expected identifier, found {}", self.describe_current()),
                self.current_span(),
                self.token.line,
            ))
        }
    }

    // Errors

    pub(crate) fn describe_current(&self) -> String {
        match self.token.kind {
            TokenKind::Ident => format!("`{}`", self.text(self.token)),
            TokenKind::Eof => "end of file".to_string(),
            kind => kind.describe().to_string(),
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> CompileError {
        CompileError::parse(
            ErrorCode::E1001,
            format!("expected {expected}, found {}", self.describe_current()),
            self.current_span(),
            self.token.line,
        )
    }

    /// Semantic error pointing at `token`.
    pub(crate) fn semantic_at(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        token: Token,
    ) -> CompileError {
        CompileError::semantic(code, message, token.span, token.line)
    }

    /// Semantic error pointing at a node.
    pub(crate) fn semantic_node(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        id: NodeId,
    ) -> CompileError {
        let node = self.shader.arena.get(id);
        CompileError::semantic(code, message, node.span, node.line)
    }

    // Arena helpers

    pub(crate) fn alloc(&mut self, kind: NodeKind, span: Span, line: u32, ty: TypeId) -> NodeId {
        self.shader
            .arena
            .alloc(Node::new(kind, span, line).with_type(ty))
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.shader.arena.get(id)
    }

    #[inline]
    pub(crate) fn ty(&self, id: NodeId) -> TypeId {
        self.shader.arena.get(id).ty
    }

    #[inline]
    pub(crate) fn span_of(&self, id: NodeId) -> Span {
        self.shader.arena.get(id).span
    }

    pub(crate) fn type_name(&self, ty: TypeId) -> &str {
        self.shader.types.display(ty, &self.shader.interner)
    }

    pub(crate) fn name_text(&self, name: Name) -> &str {
        self.shader.interner.lookup(name)
    }

    // Lazily built tables

    pub(crate) fn swizzles(&mut self) -> &SwizzleTable {
        self.swizzles.get_or_insert_with(|| {
            tracing::trace!("building swizzle table");
            SwizzleTable::new()
        })
    }

    pub(crate) fn semantics(&mut self) -> &SemanticTable {
        self.semantics.get_or_insert_with(|| {
            tracing::trace!("building semantic table");
            SemanticTable::new()
        })
    }
}
