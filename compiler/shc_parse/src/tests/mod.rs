//! Parser tests.
//!
//! - `parser`: grammar shape, precedence and postfix chaining
//! - `semantic`: name resolution, type checking, slots and entry validation

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod parser;

use crate::parse;
use shc_diagnostic::{CompileError, ErrorCode};
use shc_ir::{NodeId, NodeKind, Shader, Stage};

pub(super) fn parse_source(source: &str) -> Result<Shader, CompileError> {
    let mut shader = Shader::new("test");
    parse(&mut shader, source)?;
    Ok(shader)
}

pub(super) fn parse_ok(source: &str) -> Shader {
    parse_source(source).unwrap_or_else(|e| panic!("unexpected error: {e}"))
}

pub(super) fn parse_err(source: &str) -> CompileError {
    match parse_source(source) {
        Ok(_) => panic!("expected an error for:\n{source}"),
        Err(e) => e,
    }
}

pub(super) fn assert_code(source: &str, code: ErrorCode) -> CompileError {
    let error = parse_err(source);
    assert_eq!(error.code, code, "wrong error: {error}");
    error
}

/// Wrap statements in a compute entry.
pub(super) fn in_compute(body: &str) -> String {
    format!("compute(1, 1, 1) void main() {{\n{body}\n}}\n")
}

/// Top-level statements of a stage entry's body.
pub(super) fn entry_statements(shader: &Shader, stage: Stage) -> Vec<NodeId> {
    let entry = shader.entry(stage).expect("entry");
    let body = shader.functions.get(entry).body.expect("body");
    match &shader.arena.get(body).kind {
        NodeKind::Block(range) => shader.arena.list(*range).to_vec(),
        other => panic!("expected block, found {other:?}"),
    }
}

/// The expression of an expression statement.
pub(super) fn expr_of(shader: &Shader, stmt: NodeId) -> NodeId {
    match shader.arena.get(stmt).kind {
        NodeKind::ExprStmt(expr) => expr,
        ref other => panic!("expected expression statement, found {other:?}"),
    }
}

pub(super) const VERTEX: &str = "struct VsOut { float4 pos : sv_position; };\n\
vertex VsOut main() { VsOut o; o.pos = float4(0, 0, 0, 1); return o; }\n";
