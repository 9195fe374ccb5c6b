//! Grammar shape tests.

use super::{entry_statements, expr_of, in_compute, parse_err, parse_ok, VERTEX};
use pretty_assertions::assert_eq;
use shc_diagnostic::ErrorCode;
use shc_ir::{
    AssignOp, BinaryOp, Literal, NodeKind, PostfixOp, ShaderState, Stage, TypeId,
};

fn constant_of(shader: &shc_ir::Shader, name: &str) -> Option<Literal> {
    let name = shader.interner.get(name).expect("interned");
    let var = shader.variables.lookup(name).expect("declared");
    shader.variables.get(var).constant
}

#[test]
fn test_parse_minimal_vertex_shader() {
    let shader = parse_ok(VERTEX);
    assert_eq!(shader.state(), ShaderState::Parsed);
    assert!(shader.entry(Stage::Vertex).is_some());
    assert!(shader.entry(Stage::Fragment).is_none());
    assert_eq!(shader.items.len(), 2);
    assert_eq!(entry_statements(&shader, Stage::Vertex).len(), 3);
}

#[test]
fn test_mul_binds_tighter_than_add() {
    let shader = parse_ok("const int K = 1 + 2 * 3;");
    assert_eq!(constant_of(&shader, "K"), Some(Literal::Int(7)));

    let var = shader.variables.lookup(shader.interner.get("K").unwrap()).unwrap();
    let init = shader.variables.get(var).init.unwrap();
    let NodeKind::Binary { op: BinaryOp::Add, lhs, rhs } = shader.arena.get(init).kind else {
        panic!("expected addition at the root");
    };
    assert!(matches!(shader.arena.get(lhs).kind, NodeKind::Literal(Literal::Int(1))));
    assert!(matches!(
        shader.arena.get(rhs).kind,
        NodeKind::Binary { op: BinaryOp::Mul, .. }
    ));
}

#[test]
fn test_operator_levels_fold() {
    let shader = parse_ok(
        "const int A = 1 << 2 + 1;\n\
         const int B = 6 & 3 | 8;\n\
         const int C = 10 - 4 - 3;\n\
         const bool D = 1 < 2 == true;\n\
         const int E = 7 % 4 * 2;\n",
    );
    assert_eq!(constant_of(&shader, "A"), Some(Literal::Int(8)));
    assert_eq!(constant_of(&shader, "B"), Some(Literal::Int(10)));
    assert_eq!(constant_of(&shader, "C"), Some(Literal::Int(3)));
    assert_eq!(constant_of(&shader, "D"), Some(Literal::Bool(true)));
    assert_eq!(constant_of(&shader, "E"), Some(Literal::Int(6)));
}

#[test]
fn test_postfix_chains_left_to_right() {
    let source = format!(
        "struct S {{ int c; }};\n{}",
        in_compute("S a[4]; int b = 1; a[b].c++;")
    );
    let shader = parse_ok(&source);
    let stmts = entry_statements(&shader, Stage::Compute);
    let expr = expr_of(&shader, stmts[2]);

    let NodeKind::Postfix { op: PostfixOp::Inc, operand } = shader.arena.get(expr).kind else {
        panic!("expected postfix increment at the root");
    };
    let NodeKind::Field { base, index: 0 } = shader.arena.get(operand).kind else {
        panic!("expected field access under the increment");
    };
    assert!(matches!(shader.arena.get(base).kind, NodeKind::Index { .. }));
    assert_eq!(shader.arena.get(expr).ty, TypeId::INT);
}

#[test]
fn test_assignment_is_right_associative() {
    let shader = parse_ok(&in_compute("int x; int y; x = y = 3;"));
    let stmts = entry_statements(&shader, Stage::Compute);
    let expr = expr_of(&shader, stmts[2]);
    let NodeKind::Assign { op: AssignOp::Assign, value, .. } = shader.arena.get(expr).kind else {
        panic!("expected assignment");
    };
    assert!(matches!(shader.arena.get(value).kind, NodeKind::Assign { .. }));
}

#[test]
fn test_cast_and_parenthesized_expression() {
    let shader = parse_ok(&in_compute("int i = 2; float f = (float)i; float g = (f) * 2.0;"));
    let stmts = entry_statements(&shader, Stage::Compute);
    let NodeKind::VarDecl { init: Some(init), .. } = shader.arena.get(stmts[1]).kind else {
        panic!("expected declaration");
    };
    assert!(matches!(
        shader.arena.get(init).kind,
        NodeKind::Cast { ty: TypeId::FLOAT, .. }
    ));
}

#[test]
fn test_integer_literal_converts_in_place() {
    let shader = parse_ok("const float K = 2;");
    assert_eq!(constant_of(&shader, "K"), Some(Literal::float(2.0)));
}

#[test]
fn test_multiple_declarators_form_group() {
    let shader = parse_ok(&in_compute("float a = 1.0, b, c = a;"));
    let stmts = entry_statements(&shader, Stage::Compute);
    let NodeKind::DeclGroup(range) = shader.arena.get(stmts[0]).kind else {
        panic!("expected declaration group");
    };
    assert_eq!(range.len(), 3);
}

#[test]
fn test_prototype_then_definition() {
    let shader = parse_ok(
        "float twice(float x);\n\
         float quad(float x) { return twice(twice(x)); }\n\
         float twice(float v) { return v * 2.0; }\n",
    );
    assert_eq!(shader.functions.len(), 2);
    assert_eq!(shader.items.len(), 2);
    for (_, function) in shader.functions.iter() {
        assert!(function.body.is_some());
    }
}

#[test]
fn test_missing_semicolon_points_at_previous_line() {
    let error = parse_err("const int A = 1\nconst int B = 2;\n");
    assert_eq!(error.code, ErrorCode::E1001);
    assert_eq!(error.line(), 1);
}

#[test]
fn test_constructor_component_count() {
    parse_ok(&in_compute("float2 a = float2(1, 2); float4 b = float4(a, 0.5, 1); float3 c = float3(1);"));
    let error = parse_err(&in_compute("float4 b = float4(1.0, 2.0, 3.0);"));
    assert_eq!(error.code, ErrorCode::E2006);
    assert!(error.message.contains("float4"), "{}", error.message);
}

#[test]
fn test_matrix_constructor_forms() {
    parse_ok(&in_compute(
        "float2x2 a = float2x2(1, 0, 0, 1);\n\
         float2x2 b = float2x2(float2(1, 0), float2(0, 1));\n\
         float2x2 c = float2x2(a);",
    ));
    let error = parse_err(&in_compute("float2x2 a = float2x2(1, 0, 0);"));
    assert_eq!(error.code, ErrorCode::E2006);
}

#[test]
fn test_swizzles() {
    let shader = parse_ok(&in_compute("float4 v = float4(1, 2, 3, 4); float2 w = v.zy; v.xy = w;"));
    let stmts = entry_statements(&shader, Stage::Compute);
    let NodeKind::VarDecl { init: Some(init), .. } = shader.arena.get(stmts[1]).kind else {
        panic!("expected declaration");
    };
    let NodeKind::Swizzle { swizzle, .. } = shader.arena.get(init).kind else {
        panic!("expected swizzle");
    };
    assert_eq!(swizzle.components(), &[2, 1]);

    let error = parse_err(&in_compute("float2 u = float2(1, 2); float a = u.z;"));
    assert_eq!(error.code, ErrorCode::E2016);
    let error = parse_err(&in_compute("float4 v = float4(1, 2, 3, 4); v.xx = float2(1, 2);"));
    assert_eq!(error.code, ErrorCode::E2005);
}

#[test]
fn test_control_flow_statements() {
    parse_ok(&in_compute(
        "int total = 0;\n\
         for (int i = 0; i < 4; i++) { if (i == 2) continue; total += i; }\n\
         while (total > 0) { total--; if (total == 1) break; }\n\
         do { total++; } while (total < 3);\n\
         switch (total) { case 1: total = 2; break; case -1: break; default: break; }\n\
         ;",
    ));
}

#[test]
fn test_for_scope_ends_with_loop() {
    let error = parse_err(&in_compute("for (int i = 0; i < 4; i++) {} i = 1;"));
    assert_eq!(error.code, ErrorCode::E2001);
}

#[test]
fn test_preprocessor_directive_is_rejected() {
    let error = parse_err("#define X 1\n");
    assert_eq!(error.code, ErrorCode::E1006);
}
