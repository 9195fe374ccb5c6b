#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{preprocess, Defines};
use pretty_assertions::assert_eq;
use shc_diagnostic::{ErrorCode, ErrorKind};
use shc_ir::Backend;

fn expand(source: &str, backend: Backend) -> String {
    preprocess(source, &Defines::for_backend(backend)).unwrap()
}

#[test]
fn test_backend_conditionals() {
    let source = "\
#ifdef SHC_METAL
float a;
#else
half a;
#endif
float b;
";
    assert_eq!(expand(source, Backend::Metal), "\nfloat a;\n\n\n\nfloat b;\n");
    assert_eq!(expand(source, Backend::Hlsl), "\n\n\nhalf a;\n\nfloat b;\n");
}

#[test]
fn test_object_macros_substitute_identifiers() {
    let source = "#define SCALE 2.0\n#define TWICE SCALE * SCALE\nfloat x = TWICE; // SCALE\n";
    assert_eq!(expand(source, Backend::Glsl), "\n\nfloat x = 2.0 * 2.0; // SCALE\n");
}

#[test]
fn test_undef_and_if() {
    let source = "\
#define LEVEL 0
#if LEVEL
a
#endif
#undef LEVEL
#ifndef LEVEL
b
#endif
#if 1
c
#endif
";
    assert_eq!(expand(source, Backend::Hlsl), "\n\n\n\n\n\nb\n\n\nc\n\n");
}

#[test]
fn test_nested_groups_inside_inactive_arm() {
    let source = "\
#ifdef MISSING
#ifdef SHC_HLSL
x
#else
y
#endif
#else
z
#endif
";
    let text = expand(source, Backend::Hlsl);
    assert_eq!(text.trim(), "z");
    assert_eq!(text.lines().count(), 9);
}

#[test]
fn test_definitions_in_inactive_arm_are_ignored() {
    let source = "#if 0\n#define X 1\n#endif\n#ifdef X\nbad\n#endif\n";
    assert_eq!(expand(source, Backend::Glsl).trim(), "");
}

#[test]
fn test_lines_preserved_across_block_comments() {
    let source = "/* one\ntwo */ float a;\n#define B 1\nB";
    let text = expand(source, Backend::Glsl);
    assert_eq!(text, "/* one\ntwo */ float a;\n\n1");
}

#[test]
fn test_malformed_directives() {
    for (source, line) in [
        ("#endif\n", 1),
        ("a\n#else\n", 2),
        ("#ifdef A\n#else\n#else\n#endif\n", 3),
        ("#pragma once\n", 1),
        ("#define\n", 1),
        ("#if A + 1\n#endif\n", 1),
        ("\n#ifdef A\nx\n", 2),
    ] {
        let error = preprocess(source, &Defines::new()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Parse, "{source}");
        assert_eq!(error.code, ErrorCode::E1006, "{source}");
        assert_eq!(error.line(), line, "{source}");
    }
}

#[test]
fn test_caller_defines_untouched() {
    let defines = Defines::for_backend(Backend::Metal);
    preprocess("#undef SHC_METAL\n#define EXTRA\n", &defines).unwrap();
    assert!(defines.is_defined("SHC_METAL"));
    assert!(!defines.is_defined("EXTRA"));
}
