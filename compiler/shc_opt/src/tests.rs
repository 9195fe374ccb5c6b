#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{optimize_stage, StageView};
use pretty_assertions::assert_eq;
use shc_diagnostic::{CompileError, ErrorCode};
use shc_ir::{FunctionId, Literal, NodeId, NodeKind, Shader, Stage};

fn parse(source: &str) -> Shader {
    let mut shader = Shader::new("test");
    shc_parse::parse(&mut shader, source).unwrap_or_else(|e| panic!("parse failed: {e}"));
    shader
}

fn compute(body: &str) -> Shader {
    parse(&format!("compute(1, 1, 1) void main() {{\n{body}\n}}\n"))
}

fn view(shader: &Shader, stage: Stage) -> StageView {
    optimize_stage(shader, stage).unwrap_or_else(|e| panic!("optimize failed: {e}"))
}

fn optimize_err(source: &str, stage: Stage) -> CompileError {
    let shader = parse(source);
    match optimize_stage(&shader, stage) {
        Ok(_) => panic!("expected an error for:\n{source}"),
        Err(e) => e,
    }
}

/// Statements of the entry body after folding.
fn body(shader: &Shader, view: &StageView) -> Vec<NodeId> {
    let body = shader.functions.get(view.entry).body.expect("body");
    match &view.arena.get(body).kind {
        NodeKind::Block(range) => view.arena.list(*range).to_vec(),
        other => panic!("expected block, found {other:?}"),
    }
}

fn kinds(view: &StageView, ids: &[NodeId]) -> Vec<NodeKind> {
    ids.iter().map(|&id| view.arena.get(id).kind.clone()).collect()
}

fn init_of(view: &StageView, decl: NodeId) -> &NodeKind {
    match view.arena.get(decl).kind {
        NodeKind::VarDecl { init: Some(init), .. } => &view.arena.get(init).kind,
        ref other => panic!("expected initialized declaration, found {other:?}"),
    }
}

fn function(shader: &Shader, name: &str) -> FunctionId {
    let name = shader.interner.get(name).expect("interned");
    shader.functions.lookup(name).expect("function")
}

fn function_names(shader: &Shader, view: &StageView) -> Vec<String> {
    view.functions
        .iter()
        .map(|&f| {
            if f == view.entry {
                "<entry>".to_string()
            } else {
                shader.name_of(shader.functions.get(f).name).to_string()
            }
        })
        .collect()
}

const TWO_STAGES: &str = "\
struct VsOut { float4 pos : sv_position; };
struct PsOut { float4 color : sv_target0; };
struct Tint { float4 color; };
buffer Tint tint;
float4 shade() { return tint.color; }
vertex VsOut main() { VsOut o; o.pos = float4(0, 0, 0, 1); return o; }
fragment PsOut main() { PsOut o; o.color = shade(); return o; }
";

#[test]
fn test_constant_if_keeps_taken_arm() {
    let shader = compute("int a = 0;\nif (1 == 1) { a = 1; } else { a = 2; }");
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    assert_eq!(statements.len(), 2);

    let NodeKind::Block(arm) = view.arena.get(statements[1]).kind else {
        panic!("expected the taken arm");
    };
    let arm = view.arena.list(arm).to_vec();
    assert_eq!(arm.len(), 1);
    let NodeKind::ExprStmt(assign) = view.arena.get(arm[0]).kind else {
        panic!("expected assignment statement");
    };
    let NodeKind::Assign { value, .. } = view.arena.get(assign).kind else {
        panic!("expected assignment");
    };
    assert_eq!(view.arena.get(value).kind, NodeKind::Literal(Literal::Int(1)));
}

#[test]
fn test_false_if_without_else_drops_statement() {
    let shader = compute("int a = 0;\nif (false) { a = 2; }");
    let view = view(&shader, Stage::Compute);
    assert_eq!(body(&shader, &view).len(), 1);
}

#[test]
fn test_stage_views_prune_other_stages() {
    let shader = parse(TWO_STAGES);
    let tint = shader
        .variables
        .lookup(shader.interner.get("tint").expect("interned"))
        .expect("buffer");

    let vertex = view(&shader, Stage::Vertex);
    assert_eq!(function_names(&shader, &vertex), vec!["<entry>"]);
    assert!(vertex.buffers.is_empty());
    assert!(!vertex.uses_buffer(tint));

    let fragment = view(&shader, Stage::Fragment);
    assert_eq!(function_names(&shader, &fragment), vec!["shade", "<entry>"]);
    assert_eq!(fragment.helpers(), &[function(&shader, "shade")]);
    assert_eq!(fragment.buffers, vec![tint]);

    let structs = |view: &StageView| -> Vec<String> {
        view.structs
            .iter()
            .map(|&s| shader.name_of(shader.structs.get(s).name).to_string())
            .collect()
    };
    assert_eq!(structs(&vertex), vec!["VsOut"]);
    assert_eq!(structs(&fragment), vec!["PsOut", "Tint"]);
}

#[test]
fn test_missing_stage_entry() {
    let shader = parse(TWO_STAGES);
    let error = optimize_stage(&shader, Stage::Compute).expect_err("no compute entry");
    assert_eq!(error.code, ErrorCode::E2010);
}

#[test]
fn test_folding_leaves_shader_untouched() {
    let shader = compute("int a = 2 * 3;");
    let folded = view(&shader, Stage::Compute);
    let statements = body(&shader, &folded);
    assert_eq!(init_of(&folded, statements[0]), &NodeKind::Literal(Literal::Int(6)));

    let NodeKind::VarDecl { init: Some(init), .. } = shader.arena.get(statements[0]).kind else {
        panic!("expected declaration");
    };
    assert!(matches!(shader.arena.get(init).kind, NodeKind::Binary { .. }));
}

#[test]
fn test_helper_pruned_by_folded_branch() {
    let shader = parse(
        "int helper() { return 7; }\n\
         compute(1, 1, 1) void main() { int x = 0; if (false) { x = helper(); } }\n",
    );
    let view = view(&shader, Stage::Compute);
    assert_eq!(function_names(&shader, &view), vec!["<entry>"]);
}

#[test]
fn test_constant_propagation() {
    let shader = parse("const int N = 4;\ncompute(1, 1, 1) void main() { int a = N * 2; }\n");
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    assert_eq!(init_of(&view, statements[0]), &NodeKind::Literal(Literal::Int(8)));
    assert!(view.constants.is_empty());
}

#[test]
fn test_vector_constant_is_kept_as_reference() {
    let shader = parse(
        "const float2 OFFSET = float2(1.0, 2.0);\n\
         compute(1, 1, 1) void main() { float2 p = OFFSET; }\n",
    );
    let view = view(&shader, Stage::Compute);
    assert_eq!(view.constants.len(), 1);
}

#[test]
fn test_integer_division_by_zero_not_folded() {
    let shader = compute("int a = 1 / 0;");
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    assert!(matches!(
        init_of(&view, statements[0]),
        NodeKind::Binary { .. }
    ));
}

#[test]
fn test_statements_after_return_dropped() {
    let shader = compute("int a = 0;\nreturn;\na = 1;");
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    assert_eq!(statements.len(), 2);
    assert_eq!(view.arena.get(statements[1]).kind, NodeKind::Return(None));
}

#[test]
fn test_false_loops_dropped() {
    let shader = compute("int a = 0;\nwhile (false) { a = 1; }\nfor (int i = 0; false; i++) { a = i; }");
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    assert_eq!(statements.len(), 2);

    // The `for` init survives in its own block.
    let NodeKind::Block(init) = view.arena.get(statements[1]).kind else {
        panic!("expected the retained init");
    };
    let init = view.arena.list(init).to_vec();
    assert!(matches!(
        kinds(&view, &init).as_slice(),
        [NodeKind::VarDecl { .. }]
    ));
}

#[test]
fn test_switch_labels_survive_break() {
    let shader = compute(
        "int a = 0;\nint s = 1;\n\
         switch (s) { case 0: a = 1; break; case 1: a = 2; break; default: break; }",
    );
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    let NodeKind::Switch { body: switch_body, .. } = view.arena.get(statements[2]).kind else {
        panic!("expected switch");
    };
    let NodeKind::Block(cases) = view.arena.get(switch_body).kind else {
        panic!("expected switch block");
    };
    assert_eq!(view.arena.list(cases).len(), 8);
}

#[test]
fn test_pure_ternary_picks_arm() {
    let shader = compute("int b = 5;\nint c = 6;\nint a = true ? b : c;\nint d = false ? b++ : c;");
    let view = view(&shader, Stage::Compute);
    let statements = body(&shader, &view);
    assert!(matches!(init_of(&view, statements[2]), NodeKind::Variable(_)));
    assert!(matches!(init_of(&view, statements[3]), NodeKind::Ternary { .. }));
}

#[test]
fn test_discard_outside_fragment() {
    let error = optimize_err(
        "struct VsOut { float4 pos : sv_position; };\n\
         vertex VsOut main() { VsOut o; o.pos = float4(0, 0, 0, 1); discard; return o; }\n",
        Stage::Vertex,
    );
    assert_eq!(error.code, ErrorCode::E2017);
    assert_eq!(error.line(), 2);
}

#[test]
fn test_discard_in_pruned_branch_is_allowed() {
    let shader = parse(
        "struct VsOut { float4 pos : sv_position; };\n\
         vertex VsOut main() { VsOut o; o.pos = float4(0, 0, 0, 1); if (false) discard; return o; }\n",
    );
    assert!(optimize_stage(&shader, Stage::Vertex).is_ok());
}

#[test]
fn test_discard_through_helper() {
    let error = optimize_err(
        "void kill() { discard; }\n\
         compute(1, 1, 1) void main() { kill(); }\n",
        Stage::Compute,
    );
    assert_eq!(error.code, ErrorCode::E2017);
    assert_eq!(error.line(), 1);
}

#[test]
fn test_sample_outside_fragment() {
    let error = optimize_err(
        "texture2d t;\ncompute(1, 1, 1) void main() { float4 c = sample(t, float2(0.5, 0.5)); }\n",
        Stage::Compute,
    );
    assert_eq!(error.code, ErrorCode::E2017);
}

#[test]
fn test_callees_before_callers() {
    let shader = parse(
        "float b(float x);\n\
         float a(float x) { return b(x) * 2.0; }\n\
         float b(float x) { return x + 1.0; }\n\
         compute(1, 1, 1) void main() { float y = a(1.0); }\n",
    );
    let view = view(&shader, Stage::Compute);
    assert_eq!(function_names(&shader, &view), vec!["b", "a", "<entry>"]);
}

#[test]
fn test_textures_collected_per_stage() {
    let shader = parse(
        "struct VsOut { float4 pos : sv_position; };\n\
         struct PsOut { float4 color : sv_target0; };\n\
         texture2d albedo;\n\
         texture2d unused;\n\
         vertex VsOut main() { VsOut o; o.pos = float4(0, 0, 0, 1); return o; }\n\
         fragment PsOut main() { PsOut o; o.color = sample(albedo, float2(0.5, 0.5)); return o; }\n",
    );
    assert!(view(&shader, Stage::Vertex).textures.is_empty());
    let fragment = view(&shader, Stage::Fragment);
    assert_eq!(fragment.textures.len(), 1);
    let name = shader.textures.get(fragment.textures[0]).name;
    assert_eq!(shader.name_of(name), "albedo");
}
