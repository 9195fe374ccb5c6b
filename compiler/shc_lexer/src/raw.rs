//! Raw logos tokens before classification.

use logos::Logos;
use shc_ir::TokenKind;

/// Error produced by the raw lexer.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawError {
    #[default]
    Unrecognized,
    MalformedNumber,
    UnterminatedComment,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(error = RawError)]
#[logos(skip r"[ \t\r\f]+")]
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("\n")]
    Newline,

    // Keywords
    #[token("struct")]
    Struct,
    #[token("typedef")]
    Typedef,
    #[token("const")]
    Const,
    #[token("buffer")]
    Buffer,
    #[token("texture2d")]
    Texture2D,
    #[token("texture3d")]
    Texture3D,
    #[token("texture_cube")]
    TextureCube,
    #[token("texture2d_array")]
    Texture2DArray,
    #[token("rwtexture2d")]
    RwTexture2D,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("discard")]
    Discard,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("vertex")]
    Vertex,
    #[token("fragment")]
    Fragment,
    #[token("compute")]
    Compute,
    #[token("packed_as")]
    PackedAs,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("#")]
    Hash,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    // Any digit-led run, classified by `classify_number`. Trailing
    // alphanumerics are swallowed so `3.0q` is one malformed token rather
    // than a float followed by an identifier.
    #[regex(
        r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?[a-zA-Z0-9_]*",
        |lex| classify_number(lex.slice()).ok_or(RawError::MalformedNumber)
    )]
    Number(TokenKind),

    #[regex(r#""([^"\\\n\r]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\\n\r]|\\.)'")]
    Char,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

fn block_comment(lex: &mut logos::Lexer<RawToken>) -> Result<(), RawError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(RawError::UnterminatedComment)
        }
    }
}

/// Decode a numeric literal.
///
/// Accepts decimal and hex integers with an optional `u` suffix, and
/// floats with a fraction and/or exponent and an optional `f` or `h`
/// suffix. A bare integer with an `f`/`h` suffix is a float. An unsuffixed
/// decimal must fit `int`; an unsuffixed hex literal keeps its 32-bit
/// pattern.
pub(crate) fn classify_number(text: &str) -> Option<TokenKind> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        let (digits, unsigned) = strip_suffix(hex, b"uU");
        if digits.is_empty() {
            return None;
        }
        let value = u64::from_str_radix(digits, 16).ok().filter(|&v| v <= u64::from(u32::MAX))?;
        return Some(if unsigned {
            TokenKind::UInt(value)
        } else {
            TokenKind::Int(value)
        });
    }

    let (body, unsigned) = strip_suffix(text, b"uU");
    if unsigned {
        let value = parse_decimal(body)?;
        return Some(TokenKind::UInt(value));
    }
    let (body, half) = strip_suffix(text, b"hH");
    if half {
        return parse_float(body).map(|v| TokenKind::Half(v.to_bits()));
    }
    let (body, float) = strip_suffix(text, b"fF");
    if float {
        return parse_float(body).map(|v| TokenKind::Float(v.to_bits()));
    }
    if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return parse_float(text).map(|v| TokenKind::Float(v.to_bits()));
    }
    parse_decimal(text)
        .filter(|&v| i32::try_from(v).is_ok())
        .map(TokenKind::Int)
}

fn strip_suffix<'a>(text: &'a str, suffixes: &[u8]) -> (&'a str, bool) {
    match text.as_bytes().last() {
        Some(last) if suffixes.contains(last) => (&text[..text.len() - 1], true),
        _ => (text, false),
    }
}

fn parse_decimal(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok().filter(|&v| v <= u64::from(u32::MAX))
}

fn parse_float(text: &str) -> Option<f64> {
    let valid = !text.is_empty()
        && text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !valid {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_integers() {
        assert_eq!(classify_number("42"), Some(TokenKind::Int(42)));
        assert_eq!(classify_number("42u"), Some(TokenKind::UInt(42)));
        assert_eq!(classify_number("0xFF"), Some(TokenKind::Int(255)));
        assert_eq!(classify_number("0xffU"), Some(TokenKind::UInt(255)));
        assert_eq!(classify_number("4294967296"), None);
    }

    #[test]
    fn test_decimal_int_must_fit() {
        assert_eq!(classify_number("2147483647"), Some(TokenKind::Int(2_147_483_647)));
        assert_eq!(classify_number("2147483648"), None);
        assert_eq!(classify_number("3000000000"), None);
        assert_eq!(classify_number("3000000000u"), Some(TokenKind::UInt(3_000_000_000)));
        assert_eq!(classify_number("0xFFFFFFFF"), Some(TokenKind::Int(0xFFFF_FFFF)));
    }

    #[test]
    fn test_classify_floats() {
        assert_eq!(classify_number("1.5"), Some(TokenKind::Float(1.5f64.to_bits())));
        assert_eq!(classify_number("1.5f"), Some(TokenKind::Float(1.5f64.to_bits())));
        assert_eq!(classify_number("2h"), Some(TokenKind::Half(2.0f64.to_bits())));
        assert_eq!(classify_number("1e3"), Some(TokenKind::Float(1000.0f64.to_bits())));
        assert_eq!(classify_number(".25"), Some(TokenKind::Float(0.25f64.to_bits())));
        assert_eq!(classify_number("3."), Some(TokenKind::Float(3.0f64.to_bits())));
    }

    #[test]
    fn test_classify_malformed() {
        for text in ["1e", "0xg", "3.0q", "12abc", "0x", "1.5u"] {
            assert_eq!(classify_number(text), None, "{text}");
        }
    }
}
