//! Metal Shading Language 2.x.
//!
//! Resources are function arguments in Metal. Every emitted function takes
//! the buffers and textures it reaches as trailing parameters, and a thin
//! `vertex`/`fragment`/`kernel` function binds them, unpacks the stage
//! input and calls the user entry, which is emitted as `<symbol>_body`.

use super::{operand, splat_operands, Dialect, Emit, IntrinsicCall, Unsupported};
use crate::driver::Generator;
use crate::interface::{locations, Input};
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{
    Backend, BinaryOp, FunctionId, Intrinsic, ScalarKind, Stage, Storage, StructId, SystemValue,
    TextureKind, TypeId,
};

pub(crate) struct Metal;

/// Highest sampler index plus one.
const MAX_SAMPLERS: u32 = 16;

const RESERVED: &[&str] = &[
    "access", "as_type", "auto", "bool", "break", "case", "catch", "char", "class", "const",
    "constant", "constexpr", "continue", "default", "delete", "device", "dfdx", "dfdy",
    "discard_fragment", "do", "double", "else", "enum", "explicit", "extern", "false", "float",
    "for", "fract", "fragment", "friend", "goto", "half", "if", "inline", "int", "kernel",
    "level", "long", "metal", "mix", "mutable", "namespace", "new", "operator", "private",
    "protected", "public", "register", "return", "sampler", "short", "signed", "sizeof",
    "static", "struct", "switch", "template", "texture2d", "texture2d_array", "texture3d",
    "texturecube", "this", "thread", "threadgroup", "throw", "true", "try", "typedef",
    "typename", "uint", "union", "unsigned", "using", "vertex", "virtual", "void", "volatile",
    "while",
];

/// Argument attribute for a system-value input.
fn input_attribute(sv: SystemValue) -> &'static str {
    match sv {
        SystemValue::Position => "position",
        SystemValue::VertexId => "vertex_id",
        SystemValue::InstanceId => "instance_id",
        SystemValue::FrontFacing => "front_facing",
        SystemValue::DispatchThreadId => "thread_position_in_grid",
        SystemValue::GroupId => "threadgroup_position_in_grid",
        SystemValue::GroupThreadId => "thread_position_in_threadgroup",
        SystemValue::GroupIndex => "thread_index_in_threadgroup",
        SystemValue::Target(_) | SystemValue::Depth => "",
    }
}

fn texture_type(kind: TextureKind) -> &'static str {
    match kind {
        TextureKind::Texture2D => "texture2d<float>",
        TextureKind::Texture3D => "texture3d<float>",
        TextureKind::TextureCube => "texturecube<float>",
        TextureKind::Texture2DArray => "texture2d_array<float>",
        TextureKind::RwTexture2D => "texture2d<float, access::read_write>",
    }
}

impl Metal {
    /// Resource parameter declarations of `function`, with binding
    /// attributes when `bind` is set.
    fn resource_params(
        &self,
        g: &Generator<'_, Self>,
        function: FunctionId,
        bind: bool,
    ) -> Emit<Vec<String>> {
        let shader = g.shader();
        let resources = g.resources(function);
        let mut params = Vec::new();
        for &var in &resources.buffers {
            let def = shader.variables.get(var);
            let mut param = format!("constant {}& {}", g.type_name(def.ty), g.var_name(var));
            if let (true, Storage::Buffer { slot }) = (bind, def.storage) {
                param.push_str(&format!(" [[buffer({slot})]]"));
            }
            params.push(param);
        }
        for &texture in &resources.textures {
            let def = shader.textures.get(texture);
            let slot = def.slot;
            let mut param = format!("{} {}", texture_type(def.kind), g.texture_name(texture));
            if bind {
                param.push_str(&format!(" [[texture({slot})]]"));
            }
            params.push(param);
            if def.kind.is_storage() {
                continue;
            }
            let mut sampler = format!("sampler {}", g.sampler_name(texture));
            if bind {
                if slot >= MAX_SAMPLERS {
                    return Err(Unsupported::new(
                        ErrorCode::E3001,
                        format!("sampler slot {slot} (the limit is {MAX_SAMPLERS})"),
                        Backend::Metal,
                    ));
                }
                sampler.push_str(&format!(" [[sampler({slot})]]"));
            }
            params.push(sampler);
        }
        Ok(params)
    }

    /// `<symbol>_in`: the interpolated or attribute-fed fields of the
    /// entry's input struct. Returns whether it has any fields.
    fn stage_in_struct(&self, g: &mut Generator<'_, Self>, input: StructId, symbol: &str) -> bool {
        let shader = g.shader();
        let stage = g.view().stage;
        let def = shader.structs.get(input);
        let mut fields = Vec::new();
        for (field, location) in def.fields.iter().zip(locations(&shader.types, def)) {
            let attribute = match (field.semantic, location) {
                (None, Some(location)) if stage == Stage::Vertex => format!("attribute({location})"),
                (None, Some(location)) => format!("user(locn{location})"),
                (Some(SystemValue::Position), _) => "position".to_string(),
                _ => continue,
            };
            let declaration = g.declarator(field.ty, &g.name(field.name));
            fields.push(format!("{declaration} [[{attribute}]];"));
        }
        if fields.is_empty() {
            return false;
        }
        g.out.line(format!("struct {symbol}_in {{"));
        g.out.indent();
        for field in fields {
            g.out.line(field);
        }
        g.out.dedent();
        g.out.line("};");
        g.out.blank();
        true
    }

    fn stage_out_struct(&self, g: &mut Generator<'_, Self>, output: StructId, symbol: &str) {
        let shader = g.shader();
        let def = shader.structs.get(output);
        g.out.line(format!("struct {symbol}_out {{"));
        g.out.indent();
        for (field, location) in def.fields.iter().zip(locations(&shader.types, def)) {
            let attribute = match (field.semantic, location) {
                (Some(SystemValue::Position), _) => "position".to_string(),
                (Some(SystemValue::Target(n)), _) => format!("color({n})"),
                (Some(SystemValue::Depth), _) => "depth(any)".to_string(),
                (None, Some(location)) => format!("user(locn{location})"),
                _ => continue,
            };
            let declaration = g.declarator(field.ty, &g.name(field.name));
            g.out.line(format!("{declaration} [[{attribute}]];"));
        }
        g.out.dedent();
        g.out.line("};");
        g.out.blank();
    }
}

impl Dialect for Metal {
    fn backend(&self) -> Backend {
        Backend::Metal
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
            _ => "f",
        }
    }

    fn float_bits(&self, bits: u32) -> String {
        format!("as_type<float>(0x{bits:08x}u)")
    }

    /// Metal has no scalar-list matrix constructor; scalars are grouped
    /// into row vectors first.
    fn matrix_from_scalars(&self, ty: &str, dim: u8, scalars: &[String]) -> String {
        let row_type = ty.strip_suffix(&format!("x{dim}")).unwrap_or(ty);
        let rows: Vec<String> = scalars
            .chunks(usize::from(dim))
            .map(|row| format!("{row_type}({})", row.join(", ")))
            .collect();
        self.matrix_from_rows(ty, &rows)
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
        if matches!(op, BinaryOp::Mul | BinaryOp::Div) && types.is_matrix(lhs) && types.is_matrix(rhs) {
            return Err(Unsupported::new(
                ErrorCode::E3001,
                format!("component-wise matrix `{}`", op.symbol()),
                Backend::Metal,
            ));
        }
        if op == BinaryOp::Rem && types.scalar_kind(lhs).is_some_and(ScalarKind::is_float) {
            let (l, r) = splat_operands(g, lhs, rhs, l, r);
            return Ok(Some(format!("fmod({l}, {r})")));
        }
        Ok(None)
    }

    fn intrinsic(&self, g: &Generator<'_, Self>, call: &IntrinsicCall<'_>) -> Emit {
        let args = call.args;
        let types = &g.shader().types;
        let text = match call.intrinsic {
            Intrinsic::Lerp => call.call("mix"),
            Intrinsic::Frac => call.call("fract"),
            Intrinsic::Ddx => call.call("dfdx"),
            Intrinsic::Ddy => call.call("dfdy"),
            Intrinsic::Mul => format!(
                "({} * {})",
                operand(&args[0]),
                operand(&args[1])
            ),
            Intrinsic::Sign if types.scalar_kind(call.types[0]).is_some_and(ScalarKind::is_integer) => {
                let ty = g.type_name(call.types[0]);
                let x = operand(&args[0]);
                format!("({ty}({x} > 0) - {ty}({x} < 0))")
            }
            Intrinsic::Any | Intrinsic::All if types.is_scalar(call.types[0]) => {
                format!("({})", args[0])
            }
            Intrinsic::Sample | Intrinsic::SampleLevel | Intrinsic::Load | Intrinsic::Store => {
                return texture_op(call);
            }
            intrinsic => call.call(intrinsic.name()),
        };
        Ok(text)
    }

    fn discard(&self) -> &'static str {
        "discard_fragment();"
    }

    fn constant_qualifier(&self) -> &'static str {
        "constant"
    }

    fn entry_name(&self, g: &Generator<'_, Self>) -> String {
        format!("{}_body", g.view().stage.entry_symbol())
    }

    fn extra_params(&self, g: &Generator<'_, Self>, function: FunctionId) -> Vec<String> {
        self.resource_params(g, function, false).unwrap_or_default()
    }

    fn extra_args(&self, g: &Generator<'_, Self>, function: FunctionId) -> Vec<String> {
        let resources = g.resources(function);
        let mut args: Vec<String> = resources.buffers.iter().map(|&var| g.var_name(var)).collect();
        for &texture in &resources.textures {
            args.push(g.texture_name(texture));
            if !g.shader().textures.get(texture).kind.is_storage() {
                args.push(g.sampler_name(texture));
            }
        }
        args
    }

    fn prelude(&self, g: &mut Generator<'_, Self>) {
        g.out.line("#include <metal_stdlib>");
        g.out.line("using namespace metal;");
        g.out.blank();
    }

    fn entry_wrapper(&self, g: &mut Generator<'_, Self>) -> CompileResult<()> {
        let shader = g.shader();
        let view = g.view();
        let stage = view.stage;
        let symbol = stage.entry_symbol();
        let params = g.interface().params.clone();
        let output = g.interface().output;

        let has_stage_in = match g.interface().input_struct() {
            Some(input) => self.stage_in_struct(g, input, symbol),
            None => false,
        };
        if let Some(output) = output {
            self.stage_out_struct(g, output, symbol);
        }

        let mut wrapper_params = Vec::new();
        if has_stage_in {
            wrapper_params.push(format!("{symbol}_in shc_in [[stage_in]]"));
        }
        for param in &params {
            match param.input {
                Input::System(sv) => wrapper_params.push(format!(
                    "{} shc_{} [[{}]]",
                    g.type_name(param.ty),
                    g.raw_name(shader.variables.get(param.var).name),
                    input_attribute(sv)
                )),
                Input::Struct(id) => {
                    for field in &shader.structs.get(id).fields {
                        match field.semantic {
                            Some(SystemValue::Position) | None => {}
                            Some(sv) => wrapper_params.push(format!(
                                "{} shc_{} [[{}]]",
                                g.type_name(field.ty),
                                g.raw_name(field.name),
                                input_attribute(sv)
                            )),
                        }
                    }
                }
            }
        }
        let resources = self
            .resource_params(g, view.entry, true)
            .map_err(|e| g.unsupported_at_line(e, shader.functions.get(view.entry).line))?;
        wrapper_params.extend(resources);

        let (qualifier, return_type) = match stage {
            Stage::Vertex => ("vertex", format!("{symbol}_out")),
            Stage::Fragment => ("fragment", format!("{symbol}_out")),
            Stage::Compute => ("kernel", "void".to_string()),
        };
        g.out.line(format!(
            "{qualifier} {return_type} {symbol}({}) {{",
            wrapper_params.join(", ")
        ));
        g.out.indent();

        let mut args = Vec::with_capacity(params.len());
        for param in &params {
            match param.input {
                Input::System(_) => {
                    args.push(format!("shc_{}", g.raw_name(shader.variables.get(param.var).name)));
                }
                Input::Struct(id) => {
                    let local = g.var_name(param.var);
                    g.out.line(format!("{} {local};", g.struct_name(id)));
                    for field in &shader.structs.get(id).fields {
                        let name = g.name(field.name);
                        let value = match field.semantic {
                            Some(SystemValue::Position) | None => format!("shc_in.{name}"),
                            Some(_) => format!("shc_{}", g.raw_name(field.name)),
                        };
                        g.out.line(format!("{local}.{name} = {value};"));
                    }
                    args.push(local);
                }
            }
        }
        args.extend(self.extra_args(g, view.entry));

        let body = g.function_name(view.entry);
        match output {
            Some(id) => {
                g.out.line(format!(
                    "{} shc_result = {body}({});",
                    g.struct_name(id),
                    args.join(", ")
                ));
                g.out.line(format!("{symbol}_out shc_out;"));
                for field in &shader.structs.get(id).fields {
                    let name = g.name(field.name);
                    g.out.line(format!("shc_out.{name} = shc_result.{name};"));
                }
                g.out.line("return shc_out;");
            }
            None => g.out.line(format!("{body}({});", args.join(", "))),
        }
        g.out.dedent();
        g.out.line("}");
        Ok(())
    }
}

fn texture_op(call: &IntrinsicCall<'_>) -> Emit {
    let Some(texture) = &call.texture else {
        return Err(Unsupported::new(
            ErrorCode::E3002,
            format!("`{}` without a texture", call.intrinsic.name()),
            Backend::Metal,
        ));
    };
    let (name, sampler, args) = (&texture.name, &texture.sampler, call.args);
    let text = match (call.intrinsic, texture.kind) {
        (Intrinsic::Sample, TextureKind::Texture2DArray) => {
            let c = &args[0];
            format!("{name}.sample({sampler}, ({c}).xy, uint(({c}).z))")
        }
        (Intrinsic::Sample, _) => format!("{name}.sample({sampler}, {})", args[0]),
        (Intrinsic::SampleLevel, TextureKind::Texture2DArray) => {
            let c = &args[0];
            format!(
                "{name}.sample({sampler}, ({c}).xy, uint(({c}).z), level({}))",
                args[1]
            )
        }
        (Intrinsic::SampleLevel, _) => {
            format!("{name}.sample({sampler}, {}, level({}))", args[0], args[1])
        }
        (Intrinsic::Load, TextureKind::Texture2D | TextureKind::RwTexture2D) => {
            format!("{name}.read(uint2({}))", args[0])
        }
        (Intrinsic::Load, TextureKind::Texture3D) => format!("{name}.read(uint3({}))", args[0]),
        (Intrinsic::Load, TextureKind::Texture2DArray) => {
            let c = &args[0];
            format!("{name}.read(uint2(({c}).xy), uint(({c}).z))")
        }
        (Intrinsic::Store, TextureKind::RwTexture2D) => {
            format!("{name}.write({}, uint2({}))", args[1], args[0])
        }
        (intrinsic, kind) => {
            return Err(Unsupported::new(
                ErrorCode::E3002,
                format!("`{}` on `{}`", intrinsic.name(), kind.keyword()),
                Backend::Metal,
            ));
        }
    };
    Ok(text)
}
