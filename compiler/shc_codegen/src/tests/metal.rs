use super::{assert_lines, generate, PADDED, TEXTURED};
use pretty_assertions::assert_eq;
use shc_ir::{Backend, Stage};

fn metal(source: &str, stage: Stage) -> String {
    generate(source, stage, Backend::Metal)
}

#[test]
fn test_compute_kernel() {
    let text = metal(
        "compute(8, 8, 1) void main(uint3 id : sv_dispatch_thread_id) {\n    uint x = id.x * 2u;\n}\n",
        Stage::Compute,
    );
    let expected = "\
#include <metal_stdlib>
using namespace metal;

void cs_main_body(uint3 id) {
    uint x = id.x * 2u;
}

kernel void cs_main(uint3 shc_id [[thread_position_in_grid]]) {
    cs_main_body(shc_id);
}
";
    assert_eq!(text, expected);
}

#[test]
fn test_vertex_entry() {
    let text = metal(TEXTURED, Stage::Vertex);
    assert_lines(
        &text,
        &[
            "VsOut vs_main_body(VsIn input, constant Globals& globals) {",
            "o.pos = (globals.mvp * float4(input.pos, 1.0f));",
            "struct vs_main_in {",
            "float3 pos [[attribute(0)]];",
            "float2 uv [[attribute(1)]];",
            "struct vs_main_out {",
            "float4 pos [[position]];",
            "float2 uv [[user(locn0)]];",
            "vertex vs_main_out vs_main(vs_main_in shc_in [[stage_in]], constant Globals& globals [[buffer(0)]]) {",
            "VsIn input;",
            "input.pos = shc_in.pos;",
            "VsOut shc_result = vs_main_body(input, globals);",
            "vs_main_out shc_out;",
            "shc_out.pos = shc_result.pos;",
            "return shc_out;",
        ],
    );
}

#[test]
fn test_fragment_entry() {
    let text = metal(TEXTURED, Stage::Fragment);
    assert_lines(
        &text,
        &[
            "PsOut fs_main_body(VsOut input, constant Globals& globals, texture2d<float> albedo, sampler albedo_sampler) {",
            "o.color = albedo.sample(albedo_sampler, input.uv) * globals.tint;",
            "struct fs_main_in {",
            "float4 pos [[position]];",
            "float2 uv [[user(locn0)]];",
            "float4 color [[color(0)]];",
            "fragment fs_main_out fs_main(fs_main_in shc_in [[stage_in]], constant Globals& globals [[buffer(0)]], texture2d<float> albedo [[texture(0)]], sampler albedo_sampler [[sampler(0)]]) {",
            "PsOut shc_result = fs_main_body(input, globals, albedo, albedo_sampler);",
        ],
    );
}

#[test]
fn test_helpers_receive_resources() {
    let source = "\
struct PsOut { float4 color : sv_target0; };
struct Tint { float4 color; };
buffer Tint tint;
texture2d lut;
float4 shade(float2 uv) { return sample(lut, uv) * tint.color; }
fragment PsOut main(float4 pos : sv_position) { PsOut o; o.color = shade(pos.xy); return o; }
";
    let text = metal(source, Stage::Fragment);
    assert_lines(
        &text,
        &[
            "float4 shade(float2 uv, constant Tint& tint, texture2d<float> lut, sampler lut_sampler) {",
            "o.color = shade(pos.xy, tint, lut, lut_sampler);",
            "fragment fs_main_out fs_main(float4 shc_pos [[position]], constant Tint& tint [[buffer(0)]], texture2d<float> lut [[texture(0)]], sampler lut_sampler [[sampler(0)]]) {",
            "PsOut shc_result = fs_main_body(shc_pos, tint, lut, lut_sampler);",
        ],
    );
    assert!(!text.contains("struct fs_main_in"), "no stage_in struct without interpolants:\n{text}");
}

#[test]
fn test_expression_spelling() {
    let source = "\
struct PsOut { float4 color : sv_target0; };
fragment PsOut main(float4 pos : sv_position) {
    PsOut o;
    int k = int(pos.x);
    int s = sign(k);
    float r = pos.x % 2.0;
    float2x2 m = float2x2(1.0, 2.0, 3.0, 4.0);
    half h = 0.5h;
    if (pos.y < 0.0) { discard; }
    o.color = float4(r);
    return o;
}
";
    let text = metal(source, Stage::Fragment);
    assert_lines(
        &text,
        &[
            "int s = (int(k > 0) - int(k < 0));",
            "float r = fmod(pos.x, 2.0f);",
            "float2x2 m = transpose(float2x2(float2(1.0f, 2.0f), float2(3.0f, 4.0f)));",
            "half h = 0.5h;",
            "if (pos.y < 0.0f) {",
            "discard_fragment();",
        ],
    );
}

#[test]
fn test_texture_array_addressing() {
    let source = "\
struct PsOut { float4 color : sv_target0; };
texture2d_array layers;
fragment PsOut main(float4 pos : sv_position) {
    PsOut o;
    float3 c = float3(pos.xy, 2.0);
    o.color = sample(layers, c) + load(layers, int3(c));
    return o;
}
";
    let text = metal(source, Stage::Fragment);
    assert_lines(
        &text,
        &["o.color = layers.sample(layers_sampler, (c).xy, uint((c).z)) + layers.read(uint2((int3(c)).xy), uint((int3(c)).z));"],
    );
}

#[test]
fn test_buffer_arrays_are_widened() {
    let text = metal(PADDED, Stage::Compute);
    assert!(
        text.contains("struct P {\n    float a;\n    float shc_pad0;\n    float2 b;\n    float4 c[2];\n};"),
        "{text}"
    );
    assert!(text.contains("float4(p.a, p.b, p.c[1].x)"), "{text}");
}

#[test]
fn test_vector3_before_scalar_is_packed() {
    let source = "\
struct Light { float3 dir; float intensity; };
buffer(0) Light light;
rwtexture2d outp(0);
compute(1, 1, 1) void main(uint3 id : sv_dispatch_thread_id) {
    store(outp, int2(id.xy), float4(light.dir, light.intensity));
}
";
    let text = metal(source, Stage::Compute);
    assert_lines(&text, &["packed_float3 dir;", "float intensity;"]);
    assert!(text.contains("float4(float3(light.dir), light.intensity)"), "{text}");
    assert!(!text.contains("shc_pad"), "{text}");
}
