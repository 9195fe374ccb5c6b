//! Lexer for shc using logos.
//!
//! Tokens are produced lazily. The [`Lexer`] keeps a short history and a
//! pushback stack so the parser can step back after peeking. Comments and
//! newlines are dropped unless the lexer runs in preprocessor mode.

mod raw;

use logos::Logos;
use raw::{RawError, RawToken};
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{Span, Token, TokenKind};
use smallvec::SmallVec;

/// Tokens remembered for [`Lexer::back`].
const HISTORY: usize = 8;

pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, RawToken>,
    line: u32,
    preprocessor: bool,
    current: Token,
    history: SmallVec<[Token; HISTORY]>,
    pushback: SmallVec<[Token; 4]>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            inner: RawToken::lexer(source),
            line: 1,
            preprocessor: false,
            current: Token::new(TokenKind::Eof, Span::point(0), 1),
            history: SmallVec::new(),
            pushback: SmallVec::new(),
        }
    }

    /// Lexer that also yields [`TokenKind::Newline`] and
    /// [`TokenKind::Comment`] tokens.
    pub fn preprocessor(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        lexer.preprocessor = true;
        lexer
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// The most recently returned token.
    pub fn current(&self) -> Token {
        self.current
    }

    /// Advance to the next token. At end of input this keeps returning
    /// [`TokenKind::Eof`].
    pub fn next(&mut self) -> CompileResult<Token> {
        let token = match self.pushback.pop() {
            Some(token) => token,
            None => self.scan()?,
        };
        if self.history.len() == HISTORY {
            self.history.remove(0);
        }
        self.history.push(token);
        self.current = token;
        Ok(token)
    }

    /// Push the current token back so the next call to [`Lexer::next`]
    /// returns it again.
    pub fn back(&mut self) {
        if let Some(token) = self.history.pop() {
            self.pushback.push(token);
            self.current = self
                .history
                .last()
                .copied()
                .unwrap_or_else(|| Token::new(TokenKind::Eof, Span::point(0), 1));
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> CompileResult<Token> {
        let token = self.next()?;
        self.back();
        Ok(token)
    }

    fn scan(&mut self) -> CompileResult<Token> {
        loop {
            let Some(result) = self.inner.next() else {
                let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
                return Ok(Token::new(TokenKind::Eof, Span::point(end), self.line));
            };
            let span = Span::from_range(self.inner.span());
            let slice = self.inner.slice();
            let line = self.line;
            let newlines = u32::try_from(slice.bytes().filter(|&b| b == b'\n').count())
                .unwrap_or(u32::MAX);
            self.line = self.line.saturating_add(newlines);

            let raw = match result {
                Ok(raw) => raw,
                Err(err) => return Err(lex_error(err, slice, span, line)),
            };
            let kind = match raw {
                RawToken::LineComment | RawToken::BlockComment => {
                    if !self.preprocessor {
                        continue;
                    }
                    TokenKind::Comment
                }
                RawToken::Newline => {
                    if !self.preprocessor {
                        continue;
                    }
                    TokenKind::Newline
                }
                RawToken::Char => match unescape_char(slice) {
                    Some(c) => TokenKind::Char(c),
                    None => {
                        return Err(CompileError::lex(
                            ErrorCode::E0003,
                            format!("invalid character literal {slice}"),
                            span,
                            line,
                        ))
                    }
                },
                other => convert_token(other),
            };
            tracing::trace!(?kind, line, "token");
            return Ok(Token::new(kind, span, line));
        }
    }
}

fn lex_error(err: RawError, slice: &str, span: Span, line: u32) -> CompileError {
    match err {
        RawError::MalformedNumber => CompileError::lex(
            ErrorCode::E0002,
            format!("malformed numeric literal `{slice}`"),
            span,
            line,
        ),
        RawError::UnterminatedComment => {
            CompileError::lex(ErrorCode::E0004, "unterminated block comment", span, line)
        }
        RawError::Unrecognized if slice.starts_with('"') || slice.starts_with('\'') => {
            CompileError::lex(ErrorCode::E0003, "unterminated literal", span, line)
        }
        RawError::Unrecognized => CompileError::lex(
            ErrorCode::E0001,
            format!("unrecognized character `{}`", slice.escape_debug()),
            span,
            line,
        ),
    }
}

fn convert_token(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Number(kind) => kind,
        RawToken::String => TokenKind::String,
        RawToken::Ident => TokenKind::Ident,

        RawToken::Struct => TokenKind::Struct,
        RawToken::Typedef => TokenKind::Typedef,
        RawToken::Const => TokenKind::Const,
        RawToken::Buffer => TokenKind::Buffer,
        RawToken::Texture2D => TokenKind::Texture2D,
        RawToken::Texture3D => TokenKind::Texture3D,
        RawToken::TextureCube => TokenKind::TextureCube,
        RawToken::Texture2DArray => TokenKind::Texture2DArray,
        RawToken::RwTexture2D => TokenKind::RwTexture2D,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Case => TokenKind::Case,
        RawToken::Default => TokenKind::Default,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Discard => TokenKind::Discard,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Vertex => TokenKind::Vertex,
        RawToken::Fragment => TokenKind::Fragment,
        RawToken::Compute => TokenKind::Compute,
        RawToken::PackedAs => TokenKind::PackedAs,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::Hash => TokenKind::Hash,

        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Eq => TokenKind::Eq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::ShlEq => TokenKind::ShlEq,
        RawToken::ShrEq => TokenKind::ShrEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,

        RawToken::LineComment | RawToken::BlockComment => TokenKind::Comment,
        RawToken::Newline => TokenKind::Newline,
        RawToken::Char => TokenKind::Char('\0'),
    }
}

fn unescape_char(slice: &str) -> Option<char> {
    let inner = slice.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let c = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            _ => return None,
        },
        c => c,
    };
    chars.next().is_none().then_some(c)
}

/// Lex all of `source` into a vector ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next()?;
        tokens.push(token);
        if token.kind == TokenKind::Eof {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shc_diagnostic::ErrorKind;

    fn kinds(source: &str) -> Vec<TokenKind> {
        match tokenize(source) {
            Ok(tokens) => tokens.into_iter().map(|t| t.kind).collect(),
            Err(err) => panic!("lex failed: {err}"),
        }
    }

    #[test]
    fn test_lex_declaration() {
        assert_eq!(
            kinds("const float scale = 2.5f;"),
            vec![
                TokenKind::Const,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Float(2.5f64.to_bits()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_operators_longest_match() {
        assert_eq!(
            kinds("a <<= b >> c && d"),
            vec![
                TokenKind::Ident,
                TokenKind::ShlEq,
                TokenKind::Ident,
                TokenKind::Shr,
                TokenKind::Ident,
                TokenKind::AmpAmp,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_swizzle_not_number() {
        assert_eq!(
            kinds("v.xy"),
            vec![TokenKind::Ident, TokenKind::Dot, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comments_skipped_and_lines_counted() {
        let source = "a // one\n/* two\nthree */ b\nc";
        let tokens = tokenize(source).unwrap_or_default();
        let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4, 4]);
        assert_eq!(tokens[1].lexeme(source), "b");
    }

    #[test]
    fn test_preprocessor_mode_keeps_trivia() {
        let mut lexer = Lexer::preprocessor("#define X 1 // c\nX");
        let mut seen = Vec::new();
        loop {
            let token = lexer.next().unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY, 0));
            seen.push(token.kind);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![
                TokenKind::Hash,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Int(1),
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_back_and_current() {
        let mut lexer = Lexer::new("a b c");
        let a = lexer.next().unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY, 0));
        let b = lexer.next().unwrap_or(a);
        assert_eq!(lexer.current(), b);
        lexer.back();
        assert_eq!(lexer.current(), a);
        assert_eq!(lexer.next().ok(), Some(b));
        assert_eq!(lexer.peek().map(|t| t.lexeme("a b c")).ok(), Some("c"));
        assert_eq!(lexer.current(), b);
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("float x;\n  x = @;").err();
        let err = err.unwrap_or_else(|| panic!("expected error"));
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.code, ErrorCode::E0001);
        assert_eq!(err.line(), 2);
        assert_eq!(err.span, Span::new(15, 16));
    }

    #[test]
    fn test_malformed_literal() {
        for source in ["x = 1e;", "x = 0xg;", "x = 3.0q;", "x = 3000000000;"] {
            let err = tokenize(source).err();
            assert_eq!(err.map(|e| e.code), Some(ErrorCode::E0002), "{source}");
        }
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("a /* never closed").err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::E0004));
    }

    #[test]
    fn test_char_and_string() {
        assert_eq!(
            kinds(r#"'\n' "hi""#),
            vec![TokenKind::Char('\n'), TokenKind::String, TokenKind::Eof]
        );
    }
}
