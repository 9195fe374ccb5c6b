//! Minimal preprocessor run ahead of the lexer.
//!
//! Supports `#define NAME value?`, `#undef`, `#ifdef`, `#ifndef`,
//! `#if NAME|0|1`, `#else` and `#endif`, plus object-like substitution of
//! identifiers. Directive lines and inactive lines are replaced by blank
//! lines, so every surviving token keeps its source line.

#[cfg(test)]
mod tests;

use rustc_hash::FxHashMap;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{Backend, Span, Token, TokenKind};
use shc_lexer::Lexer;

/// Object-like macro table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Defines {
    values: FxHashMap<String, String>,
}

impl Defines {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table a backend compiles under: its identifying define set to `1`.
    pub fn for_backend(backend: Backend) -> Self {
        let mut defines = Defines::new();
        defines.define(backend.define(), "1");
        defines
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn undefine(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// State of one open `#if`/`#ifdef` group.
#[derive(Copy, Clone, Debug)]
struct Group {
    /// Whether the current arm is taken.
    taken: bool,
    seen_else: bool,
    line: u32,
    span: Span,
}

/// Expand `source` under `defines`. Definitions made in the text are local
/// to this call.
#[tracing::instrument(level = "debug", skip_all)]
pub fn preprocess(source: &str, defines: &Defines) -> CompileResult<String> {
    let mut defines = defines.clone();
    let mut lexer = Lexer::preprocessor(source);
    let mut groups: Vec<Group> = Vec::new();
    let mut out = String::with_capacity(source.len());
    let mut line_start = 0usize;

    loop {
        let tokens = next_line(&mut lexer)?;
        let Some(last) = tokens.last().copied() else { break };
        let line_end = last.span.end as usize;
        let active = groups.iter().all(|group| group.taken);
        let code: Vec<Token> = tokens
            .iter()
            .copied()
            .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Newline | TokenKind::Eof))
            .collect();

        if code.first().is_some_and(|t| t.kind == TokenKind::Hash) {
            directive(source, &code, active, &mut groups, &mut defines)?;
            blank(&mut out, &source[line_start..line_end]);
        } else if active {
            let mut cursor = line_start;
            for token in &code {
                let start = token.span.start as usize;
                out.push_str(&source[cursor..start]);
                let text = token.lexeme(source);
                match defines.get(text) {
                    Some(value) if token.kind == TokenKind::Ident => out.push_str(value),
                    _ => out.push_str(text),
                }
                cursor = token.span.end as usize;
            }
            out.push_str(&source[cursor..line_end]);
        } else {
            blank(&mut out, &source[line_start..line_end]);
        }

        line_start = line_end;
        if last.kind == TokenKind::Eof {
            break;
        }
    }

    if let Some(group) = groups.last() {
        return Err(CompileError::parse(
            ErrorCode::E1006,
            "unterminated conditional group",
            group.span,
            group.line,
        ));
    }
    tracing::debug!(bytes = out.len(), "preprocessed");
    Ok(out)
}

/// Tokens up to and including the next newline (or end of input).
fn next_line(lexer: &mut Lexer<'_>) -> CompileResult<Vec<Token>> {
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next()?;
        tokens.push(token);
        if matches!(token.kind, TokenKind::Newline | TokenKind::Eof) {
            return Ok(tokens);
        }
        // A block comment spanning lines ends the logical line too.
        if token.kind == TokenKind::Comment && token.lexeme(lexer.source()).contains('\n') {
            return Ok(tokens);
        }
    }
}

/// Keep only the newlines of `text`.
fn blank(out: &mut String, text: &str) {
    out.extend(text.chars().filter(|&c| c == '\n'));
}

fn directive(
    source: &str,
    code: &[Token],
    active: bool,
    groups: &mut Vec<Group>,
    defines: &mut Defines,
) -> CompileResult<()> {
    let hash = code[0];
    let malformed = |message: String| CompileError::parse(ErrorCode::E1006, message, hash.span, hash.line);
    let Some(&keyword) = code.get(1) else {
        return Err(malformed("empty preprocessor directive".to_string()));
    };
    let name = keyword.lexeme(source);
    let args = &code[2..];
    let ident = |what: &str| match args.first() {
        Some(t) if t.kind == TokenKind::Ident => Ok(t.lexeme(source)),
        _ => Err(malformed(format!("`#{what}` expects a macro name"))),
    };

    match name {
        "define" if active => {
            let macro_name = ident("define")?;
            let value = match (args.get(1), args.last()) {
                (Some(first), Some(last)) => {
                    expand(source, &args[1..], first.span.start, last.span.end, defines)
                }
                _ => String::new(),
            };
            defines.define(macro_name, value);
        }
        "undef" if active => {
            let macro_name = ident("undef")?;
            defines.undefine(macro_name);
        }
        "define" | "undef" => {}
        "ifdef" | "ifndef" => {
            let defined = defines.is_defined(ident(name)?);
            groups.push(Group {
                taken: defined == (name == "ifdef"),
                seen_else: false,
                line: hash.line,
                span: hash.span,
            });
        }
        "if" => {
            let taken = match args {
                [t] if t.kind == TokenKind::Int(0) => false,
                [t] if t.kind == TokenKind::Int(1) => true,
                [t] if t.kind == TokenKind::Ident => {
                    defines.get(t.lexeme(source)).is_some_and(|value| value.trim() != "0")
                }
                _ => return Err(malformed("`#if` expects a macro name, `0` or `1`".to_string())),
            };
            groups.push(Group {
                taken,
                seen_else: false,
                line: hash.line,
                span: hash.span,
            });
        }
        "else" => {
            let Some(group) = groups.last_mut() else {
                return Err(malformed("`#else` without `#if`".to_string()));
            };
            if group.seen_else {
                return Err(malformed("duplicate `#else`".to_string()));
            }
            group.seen_else = true;
            group.taken = !group.taken;
        }
        "endif" => {
            if groups.pop().is_none() {
                return Err(malformed("`#endif` without `#if`".to_string()));
            }
        }
        other => return Err(malformed(format!("unknown directive `#{other}`"))),
    }
    Ok(())
}

/// Substitute already-defined macros into a definition's value.
fn expand(source: &str, tokens: &[Token], start: u32, end: u32, defines: &Defines) -> String {
    let mut value = String::new();
    let mut cursor = start as usize;
    for token in tokens {
        let token_start = token.span.start as usize;
        value.push_str(&source[cursor..token_start]);
        let text = token.lexeme(source);
        match defines.get(text) {
            Some(replacement) if token.kind == TokenKind::Ident => value.push_str(replacement),
            _ => value.push_str(text),
        }
        cursor = token.span.end as usize;
    }
    value.push_str(&source[cursor..end as usize]);
    value
}
