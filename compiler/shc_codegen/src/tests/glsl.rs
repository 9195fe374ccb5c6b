use super::{assert_lines, generate, in_compute, TEXTURED};
use pretty_assertions::assert_eq;
use shc_ir::{Backend, Stage};

fn glsl(source: &str, stage: Stage) -> String {
    generate(source, stage, Backend::Glsl)
}

#[test]
fn test_compute_wrapper() {
    let text = glsl(
        "compute(8, 8, 1) void main(uint3 id : sv_dispatch_thread_id) {\n    uint x = id.x * 2u;\n}\n",
        Stage::Compute,
    );
    let expected = "\
#version 450 core

layout(local_size_x = 8, local_size_y = 8, local_size_z = 1) in;

void cs_main(uvec3 id) {
    uint x = id.x * 2u;
}

void main() {
    cs_main(gl_GlobalInvocationID);
}
";
    assert_eq!(text, expected);
}

#[test]
fn test_vertex_interface() {
    let text = glsl(TEXTURED, Stage::Vertex);
    assert_lines(
        &text,
        &[
            "layout(std140, binding = 0) uniform globals_block {",
            "Globals globals;",
            "layout(location = 0) in vec3 a_pos;",
            "layout(location = 1) in vec2 a_uv;",
            "layout(location = 0) out vec2 v_uv;",
            "mat4 mvp;",
            "VsOut vs_main(VsIn input_) {",
            "o.pos = (globals.mvp * vec4(input_.pos, 1.0));",
            "void main() {",
            "VsIn input_;",
            "input_.pos = a_pos;",
            "input_.uv = a_uv;",
            "VsOut shc_result = vs_main(input_);",
            "gl_Position = shc_result.pos;",
            "v_uv = shc_result.uv;",
        ],
    );
}

#[test]
fn test_fragment_interface() {
    let text = glsl(TEXTURED, Stage::Fragment);
    assert_lines(
        &text,
        &[
            "layout(binding = 0) uniform sampler2D albedo;",
            "layout(location = 0) in vec2 v_uv;",
            "layout(location = 0) out vec4 o_target0;",
            "o.color = texture(albedo, input_.uv) * globals.tint;",
            "input_.pos = gl_FragCoord;",
            "input_.uv = v_uv;",
            "PsOut shc_result = fs_main(input_);",
            "o_target0 = shc_result.color;",
        ],
    );
}

#[test]
fn test_integer_varyings_are_flat() {
    let source = "\
struct VsOut { float4 pos : sv_position; uint material; };
struct PsOut { float4 color : sv_target0; };
vertex VsOut main(uint vid : sv_vertex_id) { VsOut o; o.pos = float4(0.0); o.material = vid; return o; }
fragment PsOut main(VsOut v) { PsOut o; o.color = float4(float(v.material)); return o; }
";
    assert_lines(
        &glsl(source, Stage::Vertex),
        &[
            "layout(location = 0) flat out uint v_material;",
            "VsOut shc_result = vs_main(uint(gl_VertexID));",
        ],
    );
    assert_lines(
        &glsl(source, Stage::Fragment),
        &["layout(location = 0) flat in uint v_material;"],
    );
}

#[test]
fn test_vector_operators() {
    let text = glsl(
        &in_compute(
            "float3 v = float3(id);\nbool3 b = v < 2.0;\nbool3 n = !b;\nfloat r = v.x % 2.0;\nr %= 3.0;",
        ),
        Stage::Compute,
    );
    assert_lines(
        &text,
        &[
            "bvec3 b = lessThan(v, vec3(2.0));",
            "bvec3 n = not(b);",
            "float r = (v.x - 2.0 * trunc(v.x / 2.0));",
            "r = (r - 3.0 * trunc(r / 3.0));",
        ],
    );
}

#[test]
fn test_intrinsic_spelling() {
    let text = glsl(
        &in_compute(
            "float a = float(id.x);
float b = lerp(a, 1.0, 0.5);
float c = frac(a) + rsqrt(a);
float d = saturate(a);
float e = atan2(a, b);
float f = fmod(a + 1.0, b);
bool g = any(a > 0.0);",
        ),
        Stage::Compute,
    );
    assert_lines(
        &text,
        &[
            "float b = mix(a, 1.0, 0.5);",
            "float c = fract(a) + inversesqrt(a);",
            "float d = clamp(a, 0.0, 1.0);",
            "float e = atan(a, b);",
            "float f = ((a + 1.0) - b * trunc((a + 1.0) / b));",
            "bool g = (a > 0.0);",
        ],
    );
}

#[test]
fn test_matrices_are_transposed() {
    let text = glsl(
        &in_compute(
            "float2x2 m = float2x2(float2(1.0, 2.0), float2(3.0, 4.0));
float2 row = m[1];
float2x2 s = float2x2(1.0, 0.0, 0.0, 1.0);
float2x2 p = m * s;
p *= m;
float2 q = mul(m, row);",
        ),
        Stage::Compute,
    );
    assert_lines(
        &text,
        &[
            "mat2 m = transpose(mat2(vec2(1.0, 2.0), vec2(3.0, 4.0)));",
            "vec2 row = transpose(m)[1];",
            "mat2 s = transpose(mat2(1.0, 0.0, 0.0, 1.0));",
            "mat2 p = matrixCompMult(m, s);",
            "p = matrixCompMult(p, m);",
            "vec2 q = (m * row);",
        ],
    );
}

#[test]
fn test_load_and_store() {
    let source = "\
texture2d src;
rwtexture2d dst;
compute(8, 8, 1) void main(uint3 id : sv_dispatch_thread_id) {
    int2 p = int2(id.xy);
    store(dst, p, load(src, p) * 2.0);
}
";
    let text = glsl(source, Stage::Compute);
    assert_lines(
        &text,
        &[
            "layout(binding = 0) uniform sampler2D src;",
            "layout(binding = 1, rgba32f) uniform image2D dst;",
            "imageStore(dst, p, texelFetch(src, p, 0) * 2.0);",
        ],
    );
}
