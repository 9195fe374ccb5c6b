//! Intrinsic signatures.

use crate::Parser;
use shc_diagnostic::{CompileResult, ErrorCode};
use shc_ir::{Intrinsic, NodeId, NodeKind, ScalarKind, TextureKind, Token, TypeId, TypeKind};

/// Argument domain of a component-wise intrinsic.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Domain {
    Float,
    Numeric,
}

impl Parser<'_> {
    /// Type an intrinsic call, converting `args` in place.
    pub(crate) fn type_intrinsic(
        &mut self,
        intrinsic: Intrinsic,
        args: &mut [NodeId],
        name: Token,
    ) -> CompileResult<TypeId> {
        if args.len() != intrinsic.arity() {
            return Err(self.semantic_at(
                ErrorCode::E2006,
                format!(
                    "`{}` takes {} argument(s), found {}",
                    intrinsic.name(),
                    intrinsic.arity(),
                    args.len()
                ),
                name,
            ));
        }
        match intrinsic {
            Intrinsic::Sin
            | Intrinsic::Cos
            | Intrinsic::Tan
            | Intrinsic::Asin
            | Intrinsic::Acos
            | Intrinsic::Atan
            | Intrinsic::Sqrt
            | Intrinsic::Rsqrt
            | Intrinsic::Exp
            | Intrinsic::Exp2
            | Intrinsic::Log
            | Intrinsic::Log2
            | Intrinsic::Floor
            | Intrinsic::Ceil
            | Intrinsic::Frac
            | Intrinsic::Round
            | Intrinsic::Trunc
            | Intrinsic::Saturate
            | Intrinsic::Normalize
            | Intrinsic::Ddx
            | Intrinsic::Ddy
            | Intrinsic::Atan2
            | Intrinsic::Pow
            | Intrinsic::Fmod
            | Intrinsic::Step
            | Intrinsic::Lerp
            | Intrinsic::Smoothstep
            | Intrinsic::Reflect => self.unify_args(intrinsic, args, Domain::Float, name),
            Intrinsic::Abs | Intrinsic::Sign | Intrinsic::Min | Intrinsic::Max | Intrinsic::Clamp => {
                self.unify_args(intrinsic, args, Domain::Numeric, name)
            }
            Intrinsic::Dot | Intrinsic::Length | Intrinsic::Distance => {
                let ty = self.unify_args(intrinsic, args, Domain::Float, name)?;
                let kind = self.shader.types.scalar_kind(ty).unwrap_or(ScalarKind::Float);
                Ok(self.shader.types.scalar(kind))
            }
            Intrinsic::Cross => {
                let ty = self.unify_args(intrinsic, args, Domain::Float, name)?;
                if self.shader.types.width(ty) != 3 {
                    return Err(self.semantic_at(
                        ErrorCode::E2003,
                        format!("`cross` expects 3-component vectors, found `{}`", self.type_name(ty)),
                        name,
                    ));
                }
                Ok(ty)
            }
            Intrinsic::Mul => self.type_mul(args, name),
            Intrinsic::Transpose => {
                let ty = self.ty(args[0]);
                if self.shader.types.is_matrix(ty) {
                    Ok(ty)
                } else {
                    Err(self.bad_argument(intrinsic, ty, name))
                }
            }
            Intrinsic::Any | Intrinsic::All => {
                let ty = self.ty(args[0]);
                let types = &self.shader.types;
                if types.scalar_kind(ty) == Some(ScalarKind::Bool) && !types.is_matrix(ty) {
                    Ok(TypeId::BOOL)
                } else {
                    Err(self.bad_argument(intrinsic, ty, name))
                }
            }
            Intrinsic::Sample | Intrinsic::SampleLevel | Intrinsic::Load | Intrinsic::Store => {
                self.type_texture_op(intrinsic, args, name)
            }
        }
    }

    fn bad_argument(&self, intrinsic: Intrinsic, ty: TypeId, name: Token) -> shc_diagnostic::CompileError {
        self.semantic_at(
            ErrorCode::E2003,
            format!("invalid argument to `{}`: `{}`", intrinsic.name(), self.type_name(ty)),
            name,
        )
    }

    /// Promote all arguments to a common scalar kind and width, with
    /// scalars broadcast.
    fn unify_args(
        &mut self,
        intrinsic: Intrinsic,
        args: &mut [NodeId],
        domain: Domain,
        name: Token,
    ) -> CompileResult<TypeId> {
        let mut kind: Option<ScalarKind> = None;
        let mut width = 1u8;
        for &arg in args.iter() {
            let ty = self.ty(arg);
            let types = &self.shader.types;
            let (arg_kind, arg_width) = match types.kind(ty) {
                TypeKind::Scalar(k) => (k, 1),
                TypeKind::Vector(k, n) => (k, n),
                _ => return Err(self.bad_argument(intrinsic, ty, name)),
            };
            if !arg_kind.is_numeric() {
                return Err(self.bad_argument(intrinsic, ty, name));
            }
            if arg_width != 1 && width != 1 && arg_width != width {
                return Err(self.semantic_at(
                    ErrorCode::E2003,
                    format!("arguments to `{}` have mismatched widths", intrinsic.name()),
                    name,
                ));
            }
            width = width.max(arg_width);
            kind = Some(kind.map_or(arg_kind, |k| k.promote(arg_kind)));
        }
        let mut kind = kind.unwrap_or(ScalarKind::Float);
        if domain == Domain::Float && kind.is_integer() {
            kind = ScalarKind::Float;
        }
        let target = self.shader.types.vector(kind, width).unwrap_or(TypeId::VOID);
        for arg in args.iter_mut() {
            *arg = self.coerce(*arg, target, intrinsic.name())?;
        }
        Ok(target)
    }

    fn type_mul(&mut self, args: &mut [NodeId], name: Token) -> CompileResult<TypeId> {
        let (lt, rt) = (self.ty(args[0]), self.ty(args[1]));
        let types = &self.shader.types;
        match (types.kind(lt), types.kind(rt)) {
            (TypeKind::Matrix(_, a), TypeKind::Matrix(_, b)) if a == b => Ok(lt),
            (TypeKind::Matrix(s, a), TypeKind::Vector(k, b)) if a == b && k.is_numeric() => {
                let target = types.vector(s, a).unwrap_or(TypeId::VOID);
                args[1] = self.coerce(args[1], target, "mul")?;
                Ok(target)
            }
            (TypeKind::Vector(k, a), TypeKind::Matrix(s, b)) if a == b && k.is_numeric() => {
                let target = types.vector(s, b).unwrap_or(TypeId::VOID);
                args[0] = self.coerce(args[0], target, "mul")?;
                Ok(target)
            }
            _ => Err(self.semantic_at(
                ErrorCode::E2003,
                format!(
                    "`mul` expects a matrix and a matching matrix or vector, found `{}` and `{}`",
                    self.type_name(lt),
                    self.type_name(rt)
                ),
                name,
            )),
        }
    }

    fn type_texture_op(
        &mut self,
        intrinsic: Intrinsic,
        args: &mut [NodeId],
        name: Token,
    ) -> CompileResult<TypeId> {
        let NodeKind::Texture(texture) = self.node(args[0]).kind else {
            return Err(self.semantic_node(
                ErrorCode::E2015,
                format!("first argument of `{}` must be a texture", intrinsic.name()),
                args[0],
            ));
        };
        let kind = self.shader.textures.get(texture).kind;
        let float4 = self.shader.types.vector(ScalarKind::Float, 4).unwrap_or(TypeId::VOID);
        let sample_coord = self
            .shader
            .types
            .vector(ScalarKind::Float, kind.sample_width())
            .unwrap_or(TypeId::VOID);
        let load_coord = self
            .shader
            .types
            .vector(ScalarKind::Int, kind.sample_width())
            .unwrap_or(TypeId::VOID);

        match intrinsic {
            Intrinsic::Sample | Intrinsic::SampleLevel => {
                if kind.is_storage() {
                    return Err(self.semantic_node(
                        ErrorCode::E2015,
                        format!("cannot sample storage texture with `{}`", intrinsic.name()),
                        args[0],
                    ));
                }
                args[1] = self.coerce(args[1], sample_coord, "texture coordinate")?;
                if intrinsic == Intrinsic::SampleLevel {
                    args[2] = self.coerce(args[2], TypeId::FLOAT, "level of detail")?;
                }
                Ok(float4)
            }
            Intrinsic::Load => {
                args[1] = self.coerce(args[1], load_coord, "texel coordinate")?;
                Ok(float4)
            }
            _ => {
                if kind != TextureKind::RwTexture2D {
                    return Err(self.semantic_at(
                        ErrorCode::E2015,
                        format!(
                            "`store` requires an `rwtexture2d`, found `{}`",
                            kind.keyword()
                        ),
                        name,
                    ));
                }
                args[1] = self.coerce(args[1], load_coord, "texel coordinate")?;
                args[2] = self.coerce(args[2], float4, "stored value")?;
                Ok(TypeId::VOID)
            }
        }
    }
}
