//! Expression emission.
//!
//! Nested expressions are parenthesized; `top` positions (statement
//! expressions, initializers, arguments, conditions) are not.

use super::Generator;
use crate::dialect::{Dialect, IntrinsicCall, TextureArg, Unsupported};
use crate::layout::Spelling;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{AssignOp, Literal, NodeId, NodeKind, ScalarKind, TypeId, TypeKind, UnaryOp};

impl<D: Dialect> Generator<'_, D> {
    pub(crate) fn expr(&self, id: NodeId) -> CompileResult<String> {
        self.emit(id, false)
    }

    pub(crate) fn top_expr(&self, id: NodeId) -> CompileResult<String> {
        self.emit(id, true)
    }

    fn list(&self, ids: &[NodeId]) -> CompileResult<Vec<String>> {
        ids.iter().map(|&id| self.top_expr(id)).collect()
    }

    fn emit(&self, id: NodeId, top: bool) -> CompileResult<String> {
        let view = self.view();
        let types = &self.shader().types;
        let dialect = self.dialect;
        let node = view.arena.get(id);
        let wrap = |text: String| if top { text } else { format!("({text})") };
        let place = self.place.replace(false);
        let element = self.element.replace(false);

        let text = match node.kind {
            NodeKind::Literal(value) => self.literal(value, node.ty),
            NodeKind::Variable(var) => self.var_name(var),
            NodeKind::Binary { op, lhs, rhs } => {
                let (l, r) = (self.expr(lhs)?, self.expr(rhs)?);
                let special = dialect
                    .binary(self, op, self.ty(lhs), self.ty(rhs), &l, &r)
                    .map_err(|e| self.unsupported(e, id))?;
                match special {
                    Some(text) => text,
                    None => wrap(format!("{l} {} {r}", op.symbol())),
                }
            }
            NodeKind::Unary { op, operand } => {
                if op.mutates() {
                    self.check_writable(operand, id)?;
                    self.place.set(true);
                }
                let x = self.expr(operand)?;
                match dialect.not_vector(&x) {
                    Some(text) if op == UnaryOp::Not && !types.is_scalar(self.ty(operand)) => text,
                    _ => wrap(format!("{}{x}", op.symbol())),
                }
            }
            NodeKind::Postfix { op, operand } => {
                self.check_writable(operand, id)?;
                self.place.set(true);
                wrap(format!("{}{}", self.expr(operand)?, op.symbol()))
            }
            NodeKind::Assign { op, target, value } => {
                self.check_writable(target, id)?;
                self.place.set(true);
                let t = self.expr(target)?;
                match op {
                    AssignOp::Assign => wrap(format!("{t} = {}", self.top_expr(value)?)),
                    AssignOp::Compound(binary) => {
                        let v = self.expr(value)?;
                        let special = dialect
                            .binary(self, binary, self.ty(target), self.ty(value), &t, &v)
                            .map_err(|e| self.unsupported(e, id))?;
                        match special {
                            Some(text) => wrap(format!("{t} = {text}")),
                            None => wrap(format!("{t} {} {}", op.symbol(), self.top_expr(value)?)),
                        }
                    }
                }
            }
            NodeKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => wrap(format!(
                "{} ? {} : {}",
                self.expr(cond)?,
                self.expr(then_expr)?,
                self.expr(else_expr)?
            )),
            NodeKind::Call { function, args } => {
                let mut args = self.list(view.arena.list(args))?;
                args.extend(dialect.extra_args(self, function));
                format!("{}({})", self.function_name(function), args.join(", "))
            }
            NodeKind::Intrinsic { intrinsic, args } => {
                let ids = view.arena.list(args);
                let (texture, rest) = match ids.split_first() {
                    Some((&first, rest)) if intrinsic.takes_texture() => {
                        match view.arena.get(first).kind {
                            NodeKind::Texture(texture) => (Some(texture), rest),
                            _ => (None, ids),
                        }
                    }
                    _ => (None, ids),
                };
                let args = self.list(rest)?;
                let arg_types: Vec<TypeId> = rest.iter().map(|&arg| self.ty(arg)).collect();
                let call = IntrinsicCall {
                    intrinsic,
                    args: &args,
                    types: &arg_types,
                    texture: texture.map(|t| TextureArg {
                        name: self.texture_name(t),
                        sampler: self.sampler_name(t),
                        kind: self.shader().textures.get(t).kind,
                    }),
                };
                dialect
                    .intrinsic(self, &call)
                    .map_err(|e| self.unsupported(e, id))?
            }
            NodeKind::Construct { ty, args } => {
                let ids = view.arena.list(args);
                // A lone argument already converted to the target type.
                if let [only] = ids {
                    if self.ty(*only) == ty {
                        return self.emit(*only, top);
                    }
                }
                let parts = self.list(ids)?;
                let name = self.type_name(ty);
                let single_scalar = ids.len() == 1 && types.is_scalar(self.ty(ids[0]));
                match types.kind(ty) {
                    TypeKind::Scalar(_) => dialect.cast(&name, &parts.join(", ")),
                    TypeKind::Vector(..) if single_scalar => dialect.broadcast(&name, &parts.join(", ")),
                    TypeKind::Matrix(_, dim) if ids.len() == usize::from(dim) => {
                        dialect.matrix_from_rows(&name, &parts)
                    }
                    TypeKind::Matrix(_, dim) if ids.len() > 1 => {
                        dialect.matrix_from_scalars(&name, dim, &parts)
                    }
                    _ => format!("{name}({})", parts.join(", ")),
                }
            }
            NodeKind::Cast { ty, operand } => {
                dialect.cast(&self.type_name(ty), &self.top_expr(operand)?)
            }
            NodeKind::Field { base, index } => {
                let owner = types.struct_id(self.ty(base));
                let field = owner
                    .and_then(|s| self.shader().structs.get(s).field(index))
                    .map(|field| self.name(field.name))
                    .unwrap_or_default();
                let spelling = owner.map_or(Spelling::Native, |s| self.spelling(s, index));
                self.place.set(place);
                let text = format!("{}.{field}", self.expr(base)?);
                match spelling {
                    // Packed vectors read as their unpacked type.
                    Spelling::Packed if !place => format!("{}({text})", self.type_name(node.ty)),
                    Spelling::Widened(_) if !element => {
                        return Err(self.unsupported(self.whole_widened_array(&field), id));
                    }
                    _ => text,
                }
            }
            NodeKind::Swizzle { base, swizzle } => {
                self.place.set(place);
                format!("{}.{}", self.expr(base)?, swizzle.letters())
            }
            NodeKind::Index { base, index } => {
                self.place.set(place);
                self.element.set(true);
                let b = self.expr(base)?;
                let i = self.top_expr(index)?;
                let is_array = matches!(types.kind(node.ty), TypeKind::Array(..));
                if types.is_matrix(self.ty(base)) {
                    dialect.matrix_row(&b, &i)
                } else {
                    match self.widened_swizzle(base) {
                        Some(_) if is_array && !element => {
                            return Err(self.unsupported(self.whole_widened_array(&b), id));
                        }
                        Some(swizzle) if !is_array => format!("{b}[{i}].{swizzle}"),
                        _ => format!("{b}[{i}]"),
                    }
                }
            }
            NodeKind::Texture(_) => {
                let error = Unsupported::new(
                    ErrorCode::E3002,
                    "a texture outside a texture operation",
                    dialect.backend(),
                );
                return Err(self.unsupported(error, id));
            }
            _ => {
                let error = Unsupported::new(
                    ErrorCode::E3001,
                    "a statement in expression position",
                    dialect.backend(),
                );
                return Err(self.unsupported(error, id));
            }
        };
        Ok(text)
    }

    /// Swizzle selecting the declared components of an element of a
    /// widened buffer array reached through `base`.
    fn widened_swizzle(&self, base: NodeId) -> Option<&'static str> {
        match self.view().arena.get(base).kind {
            NodeKind::Index { base, .. } => self.widened_swizzle(base),
            NodeKind::Field { base, index } => {
                let owner = self.shader().types.struct_id(self.ty(base))?;
                match self.spelling(owner, index) {
                    Spelling::Widened(swizzle) => Some(swizzle),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn whole_widened_array(&self, what: &str) -> Unsupported {
        Unsupported::new(
            ErrorCode::E3001,
            format!("a whole-array use of uniform buffer array `{what}`"),
            self.dialect.backend(),
        )
    }

    /// Reject writes through a matrix row on targets that store matrices
    /// by column.
    fn check_writable(&self, target: NodeId, at: NodeId) -> CompileResult<()> {
        if self.dialect.writes_matrix_rows() || !self.writes_matrix_row(target) {
            return Ok(());
        }
        let error = Unsupported::new(
            ErrorCode::E3001,
            "assignment to a matrix row",
            self.dialect.backend(),
        );
        Err(self.unsupported(error, at))
    }

    fn writes_matrix_row(&self, id: NodeId) -> bool {
        match self.view().arena.get(id).kind {
            NodeKind::Index { base, .. } => {
                self.shader().types.is_matrix(self.ty(base)) || self.writes_matrix_row(base)
            }
            NodeKind::Field { base, .. } | NodeKind::Swizzle { base, .. } => {
                self.writes_matrix_row(base)
            }
            _ => false,
        }
    }

    pub(crate) fn literal(&self, value: Literal, ty: TypeId) -> String {
        match value {
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i32::MIN) => "(-2147483647 - 1)".to_string(),
            Literal::Int(v) if v < 0 => format!("({v})"),
            Literal::Int(v) => v.to_string(),
            Literal::UInt(v) => format!("{v}u"),
            Literal::Float(bits) => {
                let kind = self
                    .shader()
                    .types
                    .scalar_kind(ty)
                    .unwrap_or(ScalarKind::Float);
                #[allow(clippy::cast_possible_truncation)]
                let value = f64::from_bits(bits) as f32;
                if !value.is_finite() {
                    return self.dialect.float_bits(value.to_bits());
                }
                let text = format!("{value:?}{}", self.dialect.float_suffix(kind));
                if value.is_sign_negative() {
                    format!("({text})")
                } else {
                    text
                }
            }
        }
    }
}
