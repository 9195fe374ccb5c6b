//! GLSL 4.50 core.
//!
//! GLSL has no semantics, so the user entry is emitted as a plain function
//! and a generated `main` moves values between it and the interface
//! variables: `a_*` vertex attributes, `v_*` varyings and `o_target*`
//! fragment outputs.

use super::{operand, splat_operands, truncated_rem, Dialect, Emit, IntrinsicCall, Unsupported};
use crate::driver::Generator;
use crate::interface::{locations, Input};
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{
    Backend, BinaryOp, Intrinsic, ScalarKind, Stage, Storage, SystemValue, TextureKind, TypeId,
    TypeKind, TypeTable,
};

pub(crate) struct Glsl;

const RESERVED: &[&str] = &[
    "active", "asm", "atan", "atomic_uint", "attribute", "bool", "break", "buffer", "bvec2",
    "bvec3", "bvec4", "case", "cast", "centroid", "clamp", "class", "coherent", "common", "const",
    "continue", "dFdx", "dFdy", "default", "discard", "dmat2", "dmat3", "dmat4", "do", "double",
    "dvec2", "dvec3", "dvec4", "else", "enum", "equal", "extern", "external", "false", "filter",
    "fixed", "flat", "float", "for", "fract", "goto", "greaterThan", "greaterThanEqual", "half",
    "highp", "if", "image2D", "imageLoad", "imageStore", "in", "inline", "inout", "input", "int",
    "interface", "invariant", "inversesqrt", "isampler2D", "ivec2", "ivec3", "ivec4", "layout",
    "lessThan", "lessThanEqual", "long", "lowp", "mat2", "mat3", "mat4", "matrixCompMult",
    "mediump", "mix", "namespace", "noinline", "noperspective", "not", "notEqual", "out",
    "output", "partition", "patch", "precise", "precision", "public", "readonly", "resource",
    "restrict", "return", "sample", "sampler2D", "sampler2DArray", "sampler3D", "samplerCube",
    "short", "sizeof", "smooth", "static", "struct", "subroutine", "superp", "switch", "template",
    "texelFetch", "texture", "textureLod", "this", "true", "trunc", "typedef", "uint",
    "uintBitsToFloat", "union", "uniform", "unsigned", "using", "uvec2", "uvec3", "uvec4",
    "varying", "vec2", "vec3", "vec4", "void", "volatile", "while", "writeonly",
];

fn comparison(op: BinaryOp) -> Option<&'static str> {
    let name = match op {
        BinaryOp::Lt => "lessThan",
        BinaryOp::LtEq => "lessThanEqual",
        BinaryOp::Gt => "greaterThan",
        BinaryOp::GtEq => "greaterThanEqual",
        BinaryOp::Eq => "equal",
        BinaryOp::NotEq => "notEqual",
        _ => return None,
    };
    Some(name)
}

/// Builtin variable read for an input semantic.
fn builtin(sv: SystemValue) -> &'static str {
    match sv {
        SystemValue::Position => "gl_FragCoord",
        SystemValue::VertexId => "uint(gl_VertexID)",
        SystemValue::InstanceId => "uint(gl_InstanceID)",
        SystemValue::FrontFacing => "gl_FrontFacing",
        SystemValue::DispatchThreadId => "gl_GlobalInvocationID",
        SystemValue::GroupId => "gl_WorkGroupID",
        SystemValue::GroupThreadId => "gl_LocalInvocationID",
        SystemValue::GroupIndex => "gl_LocalInvocationIndex",
        SystemValue::Target(_) | SystemValue::Depth => "gl_FragDepth",
    }
}

/// Integer varyings must not be interpolated.
fn is_flat(types: &TypeTable, ty: TypeId) -> bool {
    let mut base = ty;
    while let TypeKind::Array(element, _) = types.kind(base) {
        base = element;
    }
    types.scalar_kind(base).is_some_and(ScalarKind::is_integer)
}

fn sampler_type(kind: TextureKind) -> &'static str {
    match kind {
        TextureKind::Texture2D => "sampler2D",
        TextureKind::Texture3D => "sampler3D",
        TextureKind::TextureCube => "samplerCube",
        TextureKind::Texture2DArray => "sampler2DArray",
        TextureKind::RwTexture2D => "image2D",
    }
}

impl Dialect for Glsl {
    fn backend(&self) -> Backend {
        Backend::Glsl
    }

    fn is_reserved(&self, name: &str) -> bool {
        RESERVED.contains(&name)
    }

    fn scalar(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Half | ScalarKind::Float => "float",
        }
    }

    fn vector(&self, kind: ScalarKind, width: u8) -> String {
        let prefix = match kind {
            ScalarKind::Bool => "b",
            ScalarKind::Int => "i",
            ScalarKind::UInt => "u",
            ScalarKind::Half | ScalarKind::Float => "",
        };
        format!("{prefix}vec{width}")
    }

    fn matrix(&self, _kind: ScalarKind, dim: u8) -> String {
        format!("mat{dim}")
    }

    fn float_bits(&self, bits: u32) -> String {
        format!("uintBitsToFloat(0x{bits:08x}u)")
    }

    fn binary(
        &self,
        g: &Generator<'_, Self>,
        op: BinaryOp,
        lhs: TypeId,
        rhs: TypeId,
        l: &str,
        r: &str,
    ) -> Emit<Option<String>> {
        let types = &g.shader().types;
        if op == BinaryOp::Mul && types.is_matrix(lhs) && types.is_matrix(rhs) {
            return Ok(Some(format!("matrixCompMult({l}, {r})")));
        }
        if let Some(function) = comparison(op) {
            if types.width(lhs) > 1 || types.width(rhs) > 1 {
                let (l, r) = splat_operands(g, lhs, rhs, l, r);
                return Ok(Some(format!("{function}({l}, {r})")));
            }
        }
        if op == BinaryOp::Rem && types.scalar_kind(lhs).is_some_and(ScalarKind::is_float) {
            return Ok(Some(truncated_rem(l, r)));
        }
        Ok(None)
    }

    fn not_vector(&self, operand: &str) -> Option<String> {
        Some(format!("not({operand})"))
    }

    fn intrinsic(&self, g: &Generator<'_, Self>, call: &IntrinsicCall<'_>) -> Emit {
        let args = call.args;
        let text = match call.intrinsic {
            Intrinsic::Lerp => call.call("mix"),
            Intrinsic::Frac => call.call("fract"),
            Intrinsic::Rsqrt => call.call("inversesqrt"),
            Intrinsic::Ddx => call.call("dFdx"),
            Intrinsic::Ddy => call.call("dFdy"),
            Intrinsic::Atan2 => call.call("atan"),
            Intrinsic::Saturate => format!("clamp({}, 0.0, 1.0)", args[0]),
            Intrinsic::Fmod => truncated_rem(&operand(&args[0]), &operand(&args[1])),
            Intrinsic::Mul => format!("({} * {})", operand(&args[0]), operand(&args[1])),
            Intrinsic::Any | Intrinsic::All if g.shader().types.is_scalar(call.types[0]) => {
                format!("({})", args[0])
            }
            Intrinsic::Sample | Intrinsic::SampleLevel | Intrinsic::Load | Intrinsic::Store => {
                return texture_op(call);
            }
            intrinsic => call.call(intrinsic.name()),
        };
        Ok(text)
    }

    fn constant_qualifier(&self) -> &'static str {
        "const"
    }

    fn prelude(&self, g: &mut Generator<'_, Self>) {
        g.out.line("#version 450 core");
        g.out.blank();
    }

    fn globals(&self, g: &mut Generator<'_, Self>) -> CompileResult<()> {
        let shader = g.shader();
        let view = g.view();
        for &var in &view.buffers {
            let def = shader.variables.get(var);
            let Storage::Buffer { slot } = def.storage else { continue };
            g.out.line(format!(
                "layout(std140, binding = {slot}) uniform {}_block {{",
                g.raw_name(def.name)
            ));
            g.out.indent();
            let declaration = g.declarator(def.ty, &g.var_name(var));
            g.out.line(format!("{declaration};"));
            g.out.dedent();
            g.out.line("};");
        }
        for &texture in &view.textures {
            let def = shader.textures.get(texture);
            let name = g.texture_name(texture);
            let format = if def.kind.is_storage() { ", rgba32f" } else { "" };
            g.out.line(format!(
                "layout(binding = {}{format}) uniform {} {name};",
                def.slot,
                sampler_type(def.kind)
            ));
        }
        g.out.blank();
        interface_variables(g);
        Ok(())
    }

    fn entry_wrapper(&self, g: &mut Generator<'_, Self>) -> CompileResult<()> {
        let shader = g.shader();
        let stage = g.view().stage;
        let params = g.interface().params.clone();
        let output = g.interface().output;
        let prefix = if stage == Stage::Vertex { "a_" } else { "v_" };

        g.out.line("void main() {");
        g.out.indent();
        let mut args = Vec::with_capacity(params.len());
        for param in params {
            match param.input {
                Input::System(sv) => args.push(builtin(sv).to_string()),
                Input::Struct(id) => {
                    let local = g.var_name(param.var);
                    g.out.line(format!("{} {local};", g.struct_name(id)));
                    for field in &shader.structs.get(id).fields {
                        let value = match field.semantic {
                            Some(sv) => builtin(sv).to_string(),
                            None => format!("{prefix}{}", g.raw_name(field.name)),
                        };
                        g.out.line(format!("{local}.{} = {value};", g.name(field.name)));
                    }
                    args.push(local);
                }
            }
        }

        let entry = g.function_name(g.view().entry);
        match output {
            Some(id) => {
                g.out.line(format!(
                    "{} shc_result = {entry}({});",
                    g.struct_name(id),
                    args.join(", ")
                ));
                for field in &shader.structs.get(id).fields {
                    let target = match field.semantic {
                        Some(SystemValue::Position) => "gl_Position".to_string(),
                        Some(SystemValue::Target(n)) => format!("o_target{n}"),
                        Some(SystemValue::Depth) => "gl_FragDepth".to_string(),
                        Some(_) => continue,
                        None => format!("v_{}", g.raw_name(field.name)),
                    };
                    g.out.line(format!("{target} = shc_result.{};", g.name(field.name)));
                }
            }
            None => g.out.line(format!("{entry}({});", args.join(", "))),
        }
        g.out.dedent();
        g.out.line("}");
        Ok(())
    }
}

/// `in`/`out` declarations for the stage boundary.
fn interface_variables(g: &mut Generator<'_, Glsl>) {
    let shader = g.shader();
    let types = &shader.types;
    let stage = g.view().stage;
    if stage == Stage::Compute {
        let def = shader.functions.get(g.view().entry);
        let [x, y, z] = def.thread_group.unwrap_or([1, 1, 1]);
        g.out.line(format!(
            "layout(local_size_x = {x}, local_size_y = {y}, local_size_z = {z}) in;"
        ));
        g.out.blank();
        return;
    }

    if let Some(input) = g.interface().input_struct() {
        let def = shader.structs.get(input);
        for (field, location) in def.fields.iter().zip(locations(types, def)) {
            let Some(location) = location else { continue };
            let (prefix, flat) = match stage {
                Stage::Vertex => ("a_", ""),
                _ if is_flat(types, field.ty) => ("v_", "flat "),
                _ => ("v_", ""),
            };
            let declaration = g.declarator(field.ty, &format!("{prefix}{}", g.raw_name(field.name)));
            g.out.line(format!("layout(location = {location}) {flat}in {declaration};"));
        }
    }
    if let Some(output) = g.interface().output {
        let def = shader.structs.get(output);
        for (field, location) in def.fields.iter().zip(locations(types, def)) {
            let line = match (field.semantic, location) {
                (Some(SystemValue::Target(n)), _) => format!(
                    "layout(location = {n}) out {} o_target{n};",
                    g.type_name(field.ty)
                ),
                (None, Some(location)) => {
                    let flat = if is_flat(types, field.ty) { "flat " } else { "" };
                    let declaration = g.declarator(field.ty, &format!("v_{}", g.raw_name(field.name)));
                    format!("layout(location = {location}) {flat}out {declaration};")
                }
                _ => continue,
            };
            g.out.line(line);
        }
    }
    g.out.blank();
}

fn texture_op(call: &IntrinsicCall<'_>) -> Emit {
    let Some(texture) = &call.texture else {
        return Err(Unsupported::new(
            ErrorCode::E3002,
            format!("`{}` without a texture", call.intrinsic.name()),
            Backend::Glsl,
        ));
    };
    let (name, args) = (&texture.name, call.args);
    let text = match (call.intrinsic, texture.kind) {
        (Intrinsic::Sample, _) => format!("texture({name}, {})", args[0]),
        (Intrinsic::SampleLevel, _) => format!("textureLod({name}, {}, {})", args[0], args[1]),
        (
            Intrinsic::Load,
            TextureKind::Texture2D | TextureKind::Texture3D | TextureKind::Texture2DArray,
        ) => format!("texelFetch({name}, {}, 0)", args[0]),
        (Intrinsic::Load, TextureKind::RwTexture2D) => format!("imageLoad({name}, {})", args[0]),
        (Intrinsic::Store, TextureKind::RwTexture2D) => {
            format!("imageStore({name}, {}, {})", args[0], args[1])
        }
        (intrinsic, kind) => {
            return Err(Unsupported::new(
                ErrorCode::E3002,
                format!("`{}` on `{}`", intrinsic.name(), kind.keyword()),
                Backend::Glsl,
            ));
        }
    };
    Ok(text)
}
