//! Token definitions shared by the lexer and parser.

use crate::Span;
use std::fmt;

/// Token produced by the lexer.
///
/// Identifier text is not interned by the lexer; the parser slices it out
/// of the source with [`Token::lexeme`] when it needs it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based source line of the first byte.
    pub line: u32,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span, line: u32) -> Self {
        Token { kind, span, line }
    }

    /// Source text of the token.
    pub fn lexeme<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.to_range()).unwrap_or("")
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Token kinds. Literal payloads are already decoded.
///
/// Float payloads are `f64::to_bits` so the enum stays `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Ident,
    Int(u64),
    UInt(u64),
    Float(u64),
    Half(u64),
    /// String literal; the text is the lexeme without quotes.
    String,
    Char(char),

    // Keywords
    Struct,
    Typedef,
    Const,
    Buffer,
    Texture2D,
    Texture3D,
    TextureCube,
    Texture2DArray,
    RwTexture2D,
    If,
    Else,
    While,
    Do,
    For,
    Switch,
    Case,
    Default,
    Return,
    Break,
    Continue,
    Discard,
    True,
    False,
    Vertex,
    Fragment,
    Compute,
    PackedAs,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    Hash,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,

    // Only produced in preprocessor mode
    Newline,
    Comment,

    Eof,
}

impl TokenKind {
    /// Human-readable description used in "expected X, found Y" messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Int(_) | TokenKind::UInt(_) => "integer literal",
            TokenKind::Float(_) | TokenKind::Half(_) => "float literal",
            TokenKind::String => "string literal",
            TokenKind::Char(_) => "character literal",
            TokenKind::Struct => "`struct`",
            TokenKind::Typedef => "`typedef`",
            TokenKind::Const => "`const`",
            TokenKind::Buffer => "`buffer`",
            TokenKind::Texture2D => "`texture2d`",
            TokenKind::Texture3D => "`texture3d`",
            TokenKind::TextureCube => "`texture_cube`",
            TokenKind::Texture2DArray => "`texture2d_array`",
            TokenKind::RwTexture2D => "`rwtexture2d`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::Do => "`do`",
            TokenKind::For => "`for`",
            TokenKind::Switch => "`switch`",
            TokenKind::Case => "`case`",
            TokenKind::Default => "`default`",
            TokenKind::Return => "`return`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::Discard => "`discard`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Vertex => "`vertex`",
            TokenKind::Fragment => "`fragment`",
            TokenKind::Compute => "`compute`",
            TokenKind::PackedAs => "`packed_as`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Question => "`?`",
            TokenKind::Hash => "`#`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::Eq => "`=`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::AmpEq => "`&=`",
            TokenKind::PipeEq => "`|=`",
            TokenKind::CaretEq => "`^=`",
            TokenKind::ShlEq => "`<<=`",
            TokenKind::ShrEq => "`>>=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::Newline => "newline",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of file",
        }
    }

    /// True when the token can only appear in preprocessor mode.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Comment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexeme_slices_source() {
        let source = "float4 color;";
        let token = Token::new(TokenKind::Ident, Span::new(7, 12), 1);
        assert_eq!(token.lexeme(source), "color");
        assert!(token.is(TokenKind::Ident));
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Semicolon.to_string(), "`;`");
        assert_eq!(TokenKind::Float(0).describe(), "float literal");
    }
}
