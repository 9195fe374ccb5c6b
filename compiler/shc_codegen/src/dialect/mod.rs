//! Per-backend dialect tables.
//!
//! The driver owns the walk; a dialect answers spelling questions and
//! contributes the pieces of program structure its target needs. Defaults
//! cover what the C-like targets share.

mod glsl;
mod hlsl;
mod metal;

use crate::driver::Generator;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{
    Backend, BinaryOp, FunctionDef, FunctionId, Intrinsic, ScalarKind, StructField, SystemValue,
    TextureKind, TypeId,
};
use std::fmt;

pub(crate) use glsl::Glsl;
pub(crate) use hlsl::Hlsl;
pub(crate) use metal::Metal;

/// A construct the target cannot express. The driver attaches the node's
/// position.
#[derive(Debug)]
pub(crate) struct Unsupported {
    pub(crate) code: ErrorCode,
    pub(crate) message: String,
}

impl Unsupported {
    pub(crate) fn new(code: ErrorCode, construct: impl fmt::Display, backend: Backend) -> Self {
        Unsupported {
            code,
            message: format!("{construct} is not supported on {backend}"),
        }
    }
}

pub(crate) type Emit<T = String> = Result<T, Unsupported>;

/// Texture argument of a texture intrinsic.
pub(crate) struct TextureArg {
    pub(crate) name: String,
    pub(crate) sampler: String,
    pub(crate) kind: TextureKind,
}

/// An intrinsic call with its arguments already emitted. The texture
/// argument, when present, is not part of `args`.
pub(crate) struct IntrinsicCall<'a> {
    pub(crate) intrinsic: Intrinsic,
    pub(crate) args: &'a [String],
    pub(crate) types: &'a [TypeId],
    pub(crate) texture: Option<TextureArg>,
}

impl IntrinsicCall<'_> {
    /// `name(args...)`.
    pub(crate) fn call(&self, name: &str) -> String {
        format!("{name}({})", self.args.join(", "))
    }
}

pub(crate) trait Dialect: Sized {
    fn backend(&self) -> Backend;

    fn is_reserved(&self, name: &str) -> bool;

    fn scalar(&self, kind: ScalarKind) -> &'static str;

    fn vector(&self, kind: ScalarKind, width: u8) -> String {
        format!("{}{width}", self.scalar(kind))
    }

    fn matrix(&self, kind: ScalarKind, dim: u8) -> String {
        format!("{}{dim}x{dim}", self.scalar(kind))
    }

    /// Suffix for a floating literal of `kind`.
    fn float_suffix(&self, _kind: ScalarKind) -> &'static str {
        ""
    }

    /// A non-finite `float` given by its bit pattern.
    fn float_bits(&self, bits: u32) -> String;

    fn cast(&self, ty: &str, operand: &str) -> String {
        format!("{ty}({operand})")
    }

    /// Vector built from one scalar.
    fn broadcast(&self, ty: &str, operand: &str) -> String {
        self.cast(ty, operand)
    }

    /// Matrix built from row vectors.
    fn matrix_from_rows(&self, ty: &str, rows: &[String]) -> String {
        format!("transpose({ty}({}))", rows.join(", "))
    }

    /// Matrix built from `dim * dim` scalars in row order.
    fn matrix_from_scalars(&self, ty: &str, _dim: u8, scalars: &[String]) -> String {
        format!("transpose({ty}({}))", scalars.join(", "))
    }

    /// Row `index` of matrix `base`.
    fn matrix_row(&self, base: &str, index: &str) -> String {
        format!("transpose({base})[{index}]")
    }

    /// Whether a matrix row may be assigned through a subscript.
    fn writes_matrix_rows(&self) -> bool {
        false
    }

    /// A binary operator needing special spelling, or `None` for the
    /// infix form.
    fn binary(
        &self,
        _g: &Generator<'_, Self>,
        _op: BinaryOp,
        _lhs: TypeId,
        _rhs: TypeId,
        _l: &str,
        _r: &str,
    ) -> Emit<Option<String>> {
        Ok(None)
    }

    /// Logical not of a bool vector, when `!` does not apply.
    fn not_vector(&self, _operand: &str) -> Option<String> {
        None
    }

    fn intrinsic(&self, g: &Generator<'_, Self>, call: &IntrinsicCall<'_>) -> Emit;

    fn discard(&self) -> &'static str {
        "discard;"
    }

    /// Storage qualifier of a global constant.
    fn constant_qualifier(&self) -> &'static str;

    /// Name the entry function is emitted under.
    fn entry_name(&self, g: &Generator<'_, Self>) -> String {
        g.view().stage.entry_symbol().to_string()
    }

    /// Text appended to a struct field declaration.
    fn field_suffix(&self, _field: &StructField, _location: Option<u32>) -> String {
        String::new()
    }

    /// Text appended to an entry parameter declaration.
    fn entry_param_suffix(&self, _semantic: Option<SystemValue>) -> String {
        String::new()
    }

    /// Resource parameters a function takes beyond its declared ones.
    fn extra_params(&self, _g: &Generator<'_, Self>, _function: FunctionId) -> Vec<String> {
        Vec::new()
    }

    /// Arguments matching [`Dialect::extra_params`] at a call site.
    fn extra_args(&self, _g: &Generator<'_, Self>, _function: FunctionId) -> Vec<String> {
        Vec::new()
    }

    fn prelude(&self, _g: &mut Generator<'_, Self>) {}

    /// Resource and interface declarations at file scope.
    fn globals(&self, _g: &mut Generator<'_, Self>) -> CompileResult<()> {
        Ok(())
    }

    /// Lines emitted directly above an entry function.
    fn entry_attributes(&self, _g: &Generator<'_, Self>, _def: &FunctionDef) -> Vec<String> {
        Vec::new()
    }

    /// Target entry point wrapping the user entry, when one is needed.
    fn entry_wrapper(&self, _g: &mut Generator<'_, Self>) -> CompileResult<()> {
        Ok(())
    }
}

/// Broadcast the scalar side of a mixed scalar and vector operation so
/// both operands carry the vector type.
pub(crate) fn splat_operands<D: Dialect>(
    g: &Generator<'_, D>,
    lhs: TypeId,
    rhs: TypeId,
    l: &str,
    r: &str,
) -> (String, String) {
    let types = &g.shader().types;
    let splat = |scalar: TypeId, width: u8, text: &str| {
        types
            .scalar_kind(scalar)
            .and_then(|kind| types.vector(kind, width))
            .map_or_else(|| text.to_string(), |ty| format!("{}({text})", g.type_name(ty)))
    };
    match (types.width(lhs), types.width(rhs)) {
        (1, width) if width > 1 => (splat(lhs, width, l), r.to_string()),
        (width, 1) if width > 1 => (l.to_string(), splat(rhs, width, r)),
        _ => (l.to_string(), r.to_string()),
    }
}

/// Remainder rounded toward zero, for targets without a float `%`.
pub(crate) fn truncated_rem(l: &str, r: &str) -> String {
    format!("({l} - {r} * trunc({l} / {r}))")
}

/// Parenthesize a top-level expression when it has a bare operator.
pub(crate) fn operand(text: &str) -> String {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ' ' if depth == 0 => return format!("({text})"),
            _ => {}
        }
    }
    text.to_string()
}
