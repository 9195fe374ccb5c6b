//! The compile error type.

use crate::ErrorCode;
use shc_ir::{Backend, Span};
use std::fmt;
use std::path::{Path, PathBuf};

/// Phase that produced an error. Every kind is fatal to the current file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    Lex,
    Parse,
    Semantic,
    Generation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lex => write!(f, "lex error"),
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Semantic => write!(f, "semantic error"),
            ErrorKind::Generation => write!(f, "generation error"),
        }
    }
}

/// File and line an error points at.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Location {
    pub file: Option<PathBuf>,
    pub line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// An error from any compiler phase.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("{location}: {kind} [{code}]: {message}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    pub location: Location,
    /// Target that rejected the construct, for generation errors.
    pub backend: Option<Backend>,
    pub notes: Vec<String>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, code: ErrorCode, message: impl Into<String>, span: Span, line: u32) -> Self {
        CompileError {
            kind,
            code,
            message: message.into(),
            span,
            location: Location { file: None, line },
            backend: None,
            notes: Vec::new(),
        }
    }

    pub fn lex(code: ErrorCode, message: impl Into<String>, span: Span, line: u32) -> Self {
        Self::new(ErrorKind::Lex, code, message, span, line)
    }

    pub fn parse(code: ErrorCode, message: impl Into<String>, span: Span, line: u32) -> Self {
        Self::new(ErrorKind::Parse, code, message, span, line)
    }

    pub fn semantic(code: ErrorCode, message: impl Into<String>, span: Span, line: u32) -> Self {
        Self::new(ErrorKind::Semantic, code, message, span, line)
    }

    /// A construct `backend` cannot express.
    pub fn generation(
        backend: Backend,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        line: u32,
    ) -> Self {
        let mut error = Self::new(ErrorKind::Generation, code, message, span, line);
        error.backend = Some(backend);
        error
    }

    #[must_use]
    pub fn with_file(mut self, file: impl AsRef<Path>) -> Self {
        self.location.file = Some(file.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    pub fn file(&self) -> Option<&Path> {
        self.location.file.as_deref()
    }
}
