use super::{assert_lines, generate, in_compute, PADDED, TEXTURED};
use pretty_assertions::assert_eq;
use shc_ir::{Backend, Stage};

fn hlsl(source: &str, stage: Stage) -> String {
    generate(source, stage, Backend::Hlsl)
}

#[test]
fn test_compute_entry() {
    let text = hlsl(
        "compute(8, 8, 1) void main(uint3 id : sv_dispatch_thread_id) {\n    uint x = id.x * 2u;\n}\n",
        Stage::Compute,
    );
    assert_eq!(
        text,
        "[numthreads(8, 8, 1)]\nvoid cs_main(uint3 id : SV_DispatchThreadID) {\n    uint x = id.x * 2u;\n}\n"
    );
}

#[test]
fn test_vertex_stage() {
    let text = hlsl(TEXTURED, Stage::Vertex);
    assert_lines(
        &text,
        &[
            "struct VsIn {",
            "float3 pos : TEXCOORD0;",
            "float2 uv : TEXCOORD1;",
            "float4 pos : SV_Position;",
            "float2 uv : TEXCOORD0;",
            "float4x4 mvp;",
            "cbuffer globals_cb : register(b0) {",
            "Globals globals;",
            "VsOut vs_main(VsIn input) {",
            "o.pos = mul(globals.mvp, float4(input.pos, 1.0));",
            "o.uv = input.uv;",
            "return o;",
        ],
    );
}

#[test]
fn test_fragment_stage() {
    let text = hlsl(TEXTURED, Stage::Fragment);
    assert_lines(
        &text,
        &[
            "float4 color : SV_Target0;",
            "Texture2D<float4> albedo : register(t0);",
            "SamplerState albedo_sampler : register(s0);",
            "PsOut fs_main(VsOut input) {",
            "o.color = albedo.Sample(albedo_sampler, input.uv) * globals.tint;",
        ],
    );
}

#[test]
fn test_control_flow_layout() {
    let source = in_compute(
        "int total = 0;
for (int i = 0; i < 4; i++) { total += i; }
if (total > 10) { total = 1; } else if (total > 5) { total = 2; } else { total = 3; }
switch (total) { case 1: total = 0; break; default: break; }
do { total--; } while (total > 0);",
    );
    let text = hlsl(&source, Stage::Compute);
    let expected = "\
[numthreads(1, 1, 1)]
void cs_main(uint3 id : SV_DispatchThreadID) {
    int total = 0;
    for (int i = 0; i < 4; i++) {
        total += i;
    }
    if (total > 10) {
        total = 1;
    } else if (total > 5) {
        total = 2;
    } else {
        total = 3;
    }
    switch (total) {
        case 1:
            total = 0;
            break;
        default:
            break;
    }
    do {
        total--;
    } while (total > 0);
}
";
    assert_eq!(text, expected);
}

#[test]
fn test_literals() {
    let text = hlsl(
        &in_compute("int a = -5;\nuint b = 3u;\nfloat c = 0.25;\nhalf h = 1.5h;\nint m = -2147483647 - 1;"),
        Stage::Compute,
    );
    assert_lines(
        &text,
        &[
            "int a = (-5);",
            "uint b = 3u;",
            "float c = 0.25;",
            "half h = 1.5h;",
            "int m = (-2147483647 - 1);",
        ],
    );
}

#[test]
fn test_nested_expressions_are_parenthesized() {
    let text = hlsl(
        &in_compute("int a = int(id.x);\nint b = (a + 1) * (a - 2);\nbool c = a > 0 ? b < 3 : false;"),
        Stage::Compute,
    );
    assert_lines(
        &text,
        &["int b = (a + 1) * (a - 2);", "bool c = (a > 0) ? (b < 3) : false;"],
    );
}

#[test]
fn test_matrix_rows_are_native() {
    let text = hlsl(
        &in_compute(
            "float2x2 m = float2x2(float2(1.0, 2.0), float2(3.0, 4.0));\nm[1] = m[0];\nfloat2x2 n = m * m;",
        ),
        Stage::Compute,
    );
    assert_lines(
        &text,
        &[
            "float2x2 m = float2x2(float2(1.0, 2.0), float2(3.0, 4.0));",
            "m[1] = m[0];",
            "float2x2 n = m * m;",
        ],
    );
}

#[test]
fn test_reserved_names_are_mangled() {
    let text = hlsl(&in_compute("float sampler = 1.0;\nfloat vs_main = sampler;"), Stage::Compute);
    assert_lines(&text, &["float sampler_ = 1.0;", "float vs_main_ = sampler_;"]);
}

#[test]
fn test_storage_texture_access() {
    let source = "\
rwtexture2d outp(2);
compute(8, 8, 1) void main(uint3 id : sv_dispatch_thread_id) {
    int2 p = int2(id.xy);
    store(outp, p, load(outp, p) * 0.5);
}
";
    let text = hlsl(source, Stage::Compute);
    assert_lines(
        &text,
        &["RWTexture2D<float4> outp : register(u2);", "outp[p] = outp[p] * 0.5;"],
    );
    assert!(!text.contains("SamplerState"), "storage textures take no sampler:\n{text}");
}

#[test]
fn test_global_constants() {
    let source = in_compute("float3 v = SCALE * 2.0;");
    let source = format!("const float3 SCALE = float3(1.0, 2.0, 3.0);\n{source}");
    let text = hlsl(&source, Stage::Compute);
    assert_lines(
        &text,
        &["static const float3 SCALE = float3(1.0, 2.0, 3.0);", "float3 v = SCALE * 2.0;"],
    );
}

#[test]
fn test_buffer_struct_is_padded_to_std140() {
    let text = hlsl(PADDED, Stage::Compute);
    assert!(
        text.contains(
            "struct P {\n    float a;\n    float shc_pad0;\n    float2 b;\n    float c[2];\n    \
             float shc_pad1;\n    float shc_pad2;\n    float shc_pad3;\n};"
        ),
        "{text}"
    );
    assert!(text.contains("float4(p.a, p.b, p.c[1])"), "{text}");
}

#[test]
fn test_naturally_aligned_buffer_is_unpadded() {
    let text = hlsl(TEXTURED, Stage::Vertex);
    assert!(!text.contains("shc_pad"), "{text}");
}
