//! HLSL (shader model 5).

use super::{Dialect, Emit, IntrinsicCall, Unsupported};
use crate::driver::Generator;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{
    Backend, FunctionDef, Intrinsic, ScalarKind, Stage, Storage, StructField, SystemValue,
    TextureKind,
};

pub(crate) struct Hlsl;

const RESERVED: &[&str] = &[
    "AppendStructuredBuffer", "Buffer", "ByteAddressBuffer", "ConsumeStructuredBuffer",
    "InputPatch", "LineStream", "NULL", "OutputPatch", "PointStream", "RWBuffer",
    "RWByteAddressBuffer", "RWStructuredBuffer", "RWTexture1D", "RWTexture2D", "RWTexture3D",
    "SamplerComparisonState", "SamplerState", "StructuredBuffer", "Texture1D", "Texture2D",
    "Texture2DArray", "Texture3D", "TextureCube", "TriangleStream", "asfloat", "asint", "asm",
    "asuint", "bool", "break", "case", "cbuffer", "centroid", "class", "column_major", "compile",
    "const", "continue", "default", "discard", "do", "double", "dword", "else", "export",
    "extern", "false", "float", "for", "groupshared", "half", "if", "in", "inline", "inout",
    "int", "interface", "line", "lineadj", "linear", "matrix", "min10float", "min12int",
    "min16float", "min16int", "min16uint", "namespace", "nointerpolation", "noperspective",
    "numthreads", "out", "packoffset", "pass", "point", "precise", "register", "return",
    "row_major", "sample", "sampler", "shared", "snorm", "static", "string", "struct", "switch",
    "tbuffer", "technique", "texture", "triangle", "triangleadj", "true", "typedef", "uint",
    "uniform", "unorm", "unsigned", "vector", "void", "volatile", "while",
];

fn semantic(sv: SystemValue) -> String {
    match sv {
        SystemValue::Position => "SV_Position".to_string(),
        SystemValue::VertexId => "SV_VertexID".to_string(),
        SystemValue::InstanceId => "SV_InstanceID".to_string(),
        SystemValue::FrontFacing => "SV_IsFrontFace".to_string(),
        SystemValue::Target(n) => format!("SV_Target{n}"),
        SystemValue::Depth => "SV_Depth".to_string(),
        SystemValue::DispatchThreadId => "SV_DispatchThreadID".to_string(),
        SystemValue::GroupId => "SV_GroupID".to_string(),
        SystemValue::GroupThreadId => "SV_GroupThreadID".to_string(),
        SystemValue::GroupIndex => "SV_GroupIndex".to_string(),
    }
}

fn texture_type(kind: TextureKind) -> &'static str {
    match kind {
        TextureKind::Texture2D => "Texture2D<float4>",
        TextureKind::Texture3D => "Texture3D<float4>",
        TextureKind::TextureCube => "TextureCube<float4>",
        TextureKind::Texture2DArray => "Texture2DArray<float4>",
        TextureKind::RwTexture2D => "RWTexture2D<float4>",
    }
}

impl Dialect for Hlsl {
    fn backend(&self) -> Backend {
        Backend::Hlsl
    }

    fn is_reserved(&self, name: &str) -> bool {
        RESERVED.contains(&name)
    }

    fn scalar(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Half => "half",
            ScalarKind::Float => "float",
        }
    }

    fn float_suffix(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Half => "h",
            _ => "",
        }
    }

    fn float_bits(&self, bits: u32) -> String {
        format!("asfloat(0x{bits:08x}u)")
    }

    fn cast(&self, ty: &str, operand: &str) -> String {
        format!("(({ty})({operand}))")
    }

    fn matrix_from_rows(&self, ty: &str, rows: &[String]) -> String {
        format!("{ty}({})", rows.join(", "))
    }

    fn matrix_from_scalars(&self, ty: &str, _dim: u8, scalars: &[String]) -> String {
        format!("{ty}({})", scalars.join(", "))
    }

    fn matrix_row(&self, base: &str, index: &str) -> String {
        format!("{base}[{index}]")
    }

    fn writes_matrix_rows(&self) -> bool {
        true
    }

    fn intrinsic(&self, g: &Generator<'_, Self>, call: &IntrinsicCall<'_>) -> Emit {
        let text = match call.intrinsic {
            // `sign` returns an integer type in HLSL.
            Intrinsic::Sign => self.cast(&g.type_name(call.types[0]), &call.call("sign")),
            Intrinsic::Sample | Intrinsic::SampleLevel | Intrinsic::Load | Intrinsic::Store => {
                return texture_op(call);
            }
            intrinsic => call.call(intrinsic.name()),
        };
        Ok(text)
    }

    fn constant_qualifier(&self) -> &'static str {
        "static const"
    }

    fn field_suffix(&self, field: &StructField, location: Option<u32>) -> String {
        match (field.semantic, location) {
            (Some(sv), _) => format!(" : {}", semantic(sv)),
            (None, Some(location)) => format!(" : TEXCOORD{location}"),
            (None, None) => String::new(),
        }
    }

    fn entry_param_suffix(&self, sv: Option<SystemValue>) -> String {
        sv.map(|sv| format!(" : {}", semantic(sv))).unwrap_or_default()
    }

    fn globals(&self, g: &mut Generator<'_, Self>) -> CompileResult<()> {
        let shader = g.shader();
        let view = g.view();
        for &var in &view.buffers {
            let def = shader.variables.get(var);
            let Storage::Buffer { slot } = def.storage else { continue };
            g.out.line(format!("cbuffer {}_cb : register(b{slot}) {{", g.raw_name(def.name)));
            g.out.indent();
            let declaration = g.declarator(def.ty, &g.var_name(var));
            g.out.line(format!("{declaration};"));
            g.out.dedent();
            g.out.line("};");
        }
        for &texture in &view.textures {
            let def = shader.textures.get(texture);
            let name = g.texture_name(texture);
            let slot = def.slot;
            if def.kind.is_storage() {
                g.out.line(format!("{} {name} : register(u{slot});", texture_type(def.kind)));
            } else {
                g.out.line(format!("{} {name} : register(t{slot});", texture_type(def.kind)));
                g.out.line(format!("SamplerState {} : register(s{slot});", g.sampler_name(texture)));
            }
        }
        g.out.blank();
        Ok(())
    }

    fn entry_attributes(&self, g: &Generator<'_, Self>, def: &FunctionDef) -> Vec<String> {
        if g.view().stage != Stage::Compute {
            return Vec::new();
        }
        let [x, y, z] = def.thread_group.unwrap_or([1, 1, 1]);
        vec![format!("[numthreads({x}, {y}, {z})]")]
    }
}

fn texture_op(call: &IntrinsicCall<'_>) -> Emit {
    let Some(texture) = &call.texture else {
        return Err(Unsupported::new(
            ErrorCode::E3002,
            format!("`{}` without a texture", call.intrinsic.name()),
            Backend::Hlsl,
        ));
    };
    let (name, args) = (&texture.name, call.args);
    let text = match (call.intrinsic, texture.kind) {
        (Intrinsic::Sample, _) => format!("{name}.Sample({}, {})", texture.sampler, args[0]),
        (Intrinsic::SampleLevel, _) => format!(
            "{name}.SampleLevel({}, {}, {})",
            texture.sampler, args[0], args[1]
        ),
        (Intrinsic::Load, TextureKind::Texture2D) => format!("{name}.Load(int3({}, 0))", args[0]),
        (Intrinsic::Load, TextureKind::Texture3D | TextureKind::Texture2DArray) => {
            format!("{name}.Load(int4({}, 0))", args[0])
        }
        (Intrinsic::Load, TextureKind::RwTexture2D) => format!("{name}[{}]", args[0]),
        (Intrinsic::Store, TextureKind::RwTexture2D) => format!("{name}[{}] = {}", args[0], args[1]),
        (intrinsic, kind) => {
            return Err(Unsupported::new(
                ErrorCode::E3002,
                format!("`{}` on `{}`", intrinsic.name(), kind.keyword()),
                Backend::Hlsl,
            ));
        }
    };
    Ok(text)
}
