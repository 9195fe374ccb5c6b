use super::{parse, view, PADDED, TEXTURED};
use crate::{reflect, BufferField, ConflictSubject, RenderTarget, VertexAttribute};
use pretty_assertions::assert_eq;
use shc_ir::{PackFormat, Stage, StageMask};

fn field(name: &str, ty: &str, offset: u32, size: u32) -> BufferField {
    BufferField {
        name: name.to_string(),
        ty: ty.to_string(),
        offset,
        size,
        array_len: None,
        members: Vec::new(),
    }
}

#[test]
fn test_vertex_format_skips_system_values() {
    let shader = parse(
        "\
struct VsIn { float3 pos; float4 color packed_as unorm8; uint vid : sv_vertex_id; float2 uv; };
struct VsOut { float4 pos : sv_position; float4 color; };
vertex VsOut main(VsIn input) {
    VsOut o;
    o.pos = float4(input.pos, float(input.vid));
    o.color = input.color * input.uv.x;
    return o;
}
",
    );
    let vertex = view(&shader, Stage::Vertex);
    let format = reflect(&shader, &[vertex]).vertex_format.expect("vertex format");

    let attribute = |name: &str, location, count, packing, offset, size| VertexAttribute {
        name: name.to_string(),
        location,
        component: "float",
        count,
        packing,
        offset,
        size,
    };
    assert_eq!(
        format.attributes,
        vec![
            attribute("pos", 0, 3, PackFormat::Float32, 0, 12),
            attribute("color", 1, 4, PackFormat::Unorm8, 12, 4),
            attribute("uv", 2, 2, PackFormat::Float32, 16, 8),
        ]
    );
    assert_eq!(format.stride, 24);
}

#[test]
fn test_std140_buffer_layout() {
    let shader = parse(
        "\
struct Light { float3 dir; float intensity; };
struct Frame { float4x4 view; float3 eye; float time; float2 jitter; Light lights[2]; float exposure; };
buffer(1) Frame frame;
compute(4, 4, 1) void main(uint3 id : sv_dispatch_thread_id) {
    float e = frame.exposure * frame.lights[1].intensity;
}
",
    );
    let compute = view(&shader, Stage::Compute);
    let reflection = reflect(&shader, &[compute]);
    let buffer = &reflection.buffers[0];

    assert_eq!(buffer.name, "frame");
    assert_eq!(buffer.slot, 1);
    assert_eq!(buffer.size, 144);
    assert_eq!(buffer.stages, StageMask::COMPUTE);

    let lights = BufferField {
        array_len: Some(2),
        members: vec![field("dir", "float3", 0, 12), field("intensity", "float", 12, 4)],
        ..field("lights", "Light[2]", 96, 32)
    };
    assert_eq!(
        buffer.fields,
        vec![
            field("view", "float4x4", 0, 64),
            field("eye", "float3", 64, 12),
            field("time", "float", 76, 4),
            field("jitter", "float2", 80, 8),
            lights,
            field("exposure", "float", 128, 4),
        ]
    );
    assert_eq!(reflection.thread_group, Some([4, 4, 1]));
    assert_eq!(reflection.vertex_format, None);
}

#[test]
fn test_padded_buffer_reports_std140_offsets() {
    let shader = parse(PADDED);
    let reflection = reflect(&shader, &[view(&shader, Stage::Compute)]);
    let buffer = &reflection.buffers[0];
    assert_eq!(buffer.size, 48);
    assert_eq!(
        buffer.fields,
        vec![
            field("a", "float", 0, 4),
            field("b", "float2", 8, 8),
            BufferField {
                array_len: Some(2),
                ..field("c", "float[2]", 16, 32)
            },
        ]
    );
}

#[test]
fn test_bindings_record_using_stages() {
    let shader = parse(TEXTURED);
    let views = [view(&shader, Stage::Vertex), view(&shader, Stage::Fragment)];
    let reflection = reflect(&shader, &views);

    assert_eq!(reflection.buffers[0].stages, StageMask::VERTEX | StageMask::FRAGMENT);
    assert_eq!(reflection.textures.len(), 1);
    assert_eq!(reflection.textures[0].stages, StageMask::FRAGMENT);
    assert_eq!(
        reflection.render_targets,
        vec![RenderTarget {
            slot: 0,
            field: "color".to_string(),
            ty: "float4".to_string(),
        }]
    );
    assert_eq!(reflection.thread_group, None);

    let json = serde_json::to_value(&reflection).unwrap();
    assert_eq!(json["buffers"][0]["stages"], serde_json::json!(["vertex", "fragment"]));
    assert_eq!(json["textures"][0]["kind"], "texture2d");
    assert_eq!(json["render_targets"][0]["type"], "float4");
    assert_eq!(json["vertex_format"]["attributes"][1]["packing"], "float32");
}

#[test]
fn test_unused_texture_is_listed_without_stages() {
    let shader = parse(&format!("{TEXTURED}texture2d spare(3);\n"));
    let views = [view(&shader, Stage::Vertex), view(&shader, Stage::Fragment)];
    let reflection = reflect(&shader, &views);
    let spare = reflection
        .textures
        .iter()
        .find(|t| t.name == "spare")
        .expect("declared texture is reflected");
    assert_eq!(spare.slot, 3);
    assert!(spare.stages.is_empty());
}

#[test]
fn test_merge_unions_stages_and_adds_bindings() {
    let shader = parse(TEXTURED);
    let mut merged = reflect(&shader, &[view(&shader, Stage::Vertex)]);
    let extended = parse(&format!("{TEXTURED}texture2d spare(3);\n"));
    let views = [view(&extended, Stage::Vertex), view(&extended, Stage::Fragment)];
    merged.merge(reflect(&extended, &views)).unwrap();

    assert_eq!(merged.buffers.len(), 1);
    assert_eq!(merged.buffers[0].stages, StageMask::VERTEX | StageMask::FRAGMENT);
    let names: Vec<&str> = merged.textures.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["albedo", "spare"]);
    assert_eq!(merged.render_targets.len(), 1);
}

#[test]
fn test_merge_rejects_a_rebound_slot() {
    let shader = parse(TEXTURED);
    let mut merged = reflect(&shader, &[]);
    let other = parse(&TEXTURED.replace("texture2d albedo(0);", "texture2d detail(0);").replace("sample(albedo", "sample(detail"));
    let conflict = merged.merge(reflect(&other, &[])).unwrap_err();
    assert_eq!(conflict.subject, ConflictSubject::Resource("detail".to_string()));
    assert!(conflict.message.contains("texture slot 0"), "{}", conflict.message);
}
