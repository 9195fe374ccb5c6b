//! Generator tests.
//!
//! - `hlsl`, `glsl`, `metal`: emitted text per backend
//! - `errors`: constructs a backend rejects
//! - `reflect`: vertex formats, std140 layouts and bindings

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod glsl;
mod hlsl;
mod metal;
mod reflect;

use crate::generate_stage;
use pretty_assertions::assert_eq;
use shc_diagnostic::CompileError;
use shc_ir::{Backend, Shader, Stage};
use shc_opt::{optimize_stage, StageView};

pub(super) fn parse(source: &str) -> Shader {
    let mut shader = Shader::new("test");
    shc_parse::parse(&mut shader, source).unwrap_or_else(|e| panic!("parse failed: {e}"));
    shader
}

pub(super) fn view(shader: &Shader, stage: Stage) -> StageView {
    optimize_stage(shader, stage).unwrap_or_else(|e| panic!("optimize failed: {e}"))
}

pub(super) fn try_generate(source: &str, stage: Stage, backend: Backend) -> Result<String, CompileError> {
    let shader = parse(source);
    let view = view(&shader, stage);
    generate_stage(&shader, &view, backend)
}

pub(super) fn generate(source: &str, stage: Stage, backend: Backend) -> String {
    try_generate(source, stage, backend).unwrap_or_else(|e| panic!("generation failed: {e}"))
}

pub(super) fn generate_err(source: &str, stage: Stage, backend: Backend) -> CompileError {
    match try_generate(source, stage, backend) {
        Ok(text) => panic!("expected an error on {backend}, generated:\n{text}"),
        Err(e) => e,
    }
}

/// Statements wrapped in a compute entry with a dispatch id in scope.
pub(super) fn in_compute(body: &str) -> String {
    format!("compute(1, 1, 1) void main(uint3 id : sv_dispatch_thread_id) {{\n{body}\n}}\n")
}

/// Assert that every line of `expected` appears in `text`, trimmed.
#[track_caller]
pub(super) fn assert_lines(text: &str, expected: &[&str]) {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    for line in expected {
        assert!(lines.contains(line), "missing line `{line}` in:\n{text}");
    }
}

/// A buffer whose std140 offsets differ from HLSL and Metal packing.
pub(super) const PADDED: &str = "\
struct P { float a; float2 b; float c[2]; };
buffer(0) P p;
rwtexture2d outp(0);
compute(1, 1, 1) void main(uint3 id : sv_dispatch_thread_id) {
    store(outp, int2(id.xy), float4(p.a, p.b, p.c[1]));
}
";

pub(super) const TEXTURED: &str = "\
struct VsIn { float3 pos; float2 uv; };
struct VsOut { float4 pos : sv_position; float2 uv; };
struct PsOut { float4 color : sv_target0; };
struct Globals { float4x4 mvp; float4 tint; };
buffer(0) Globals globals;
texture2d albedo(0);
vertex VsOut main(VsIn input) {
    VsOut o;
    o.pos = mul(globals.mvp, float4(input.pos, 1.0));
    o.uv = input.uv;
    return o;
}
fragment PsOut main(VsOut input) {
    PsOut o;
    o.color = sample(albedo, input.uv) * globals.tint;
    return o;
}
";

#[test]
fn test_backends_are_independent() {
    let shader = parse(&in_compute(
        "float2x2 a = float2x2(1.0, 2.0, 3.0, 4.0);\nfloat2x2 b = a * a;",
    ));
    let view = view(&shader, Stage::Compute);
    let results = crate::generate_backends(&shader, &view, &Backend::ALL, true);
    let outcome: Vec<(Backend, bool)> = results
        .iter()
        .map(|(backend, result)| (*backend, result.is_ok()))
        .collect();
    assert_eq!(
        outcome,
        vec![(Backend::Hlsl, true), (Backend::Glsl, true), (Backend::Metal, false)]
    );
}

#[test]
fn test_generation_is_deterministic() {
    for backend in Backend::ALL {
        let first = generate(TEXTURED, Stage::Fragment, backend);
        let second = generate(TEXTURED, Stage::Fragment, backend);
        assert_eq!(first, second, "{backend} output differs between runs");
    }
}

#[test]
fn test_pruned_stage_declares_nothing_from_other_stages() {
    for backend in Backend::ALL {
        let text = generate(TEXTURED, Stage::Vertex, backend);
        assert!(!text.contains("albedo"), "{backend} vertex text mentions the texture:\n{text}");
        assert!(!text.contains("PsOut"), "{backend} vertex text mentions PsOut:\n{text}");
    }
}
