//! Builtin intrinsic functions.

/// Intrinsics callable from shader code. Typing lives in the parser; the
/// per-backend spelling lives in the code generator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Intrinsic {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sqrt,
    Rsqrt,
    Abs,
    Sign,
    Min,
    Max,
    Clamp,
    Saturate,
    Lerp,
    Step,
    Smoothstep,
    Dot,
    Cross,
    Normalize,
    Length,
    Distance,
    Reflect,
    Pow,
    Exp,
    Exp2,
    Log,
    Log2,
    Floor,
    Ceil,
    Frac,
    Round,
    Trunc,
    Fmod,
    Mul,
    Transpose,
    Ddx,
    Ddy,
    Any,
    All,
    Sample,
    SampleLevel,
    Load,
    Store,
}

impl Intrinsic {
    pub fn from_name(name: &str) -> Option<Intrinsic> {
        let intrinsic = match name {
            "sin" => Intrinsic::Sin,
            "cos" => Intrinsic::Cos,
            "tan" => Intrinsic::Tan,
            "asin" => Intrinsic::Asin,
            "acos" => Intrinsic::Acos,
            "atan" => Intrinsic::Atan,
            "atan2" => Intrinsic::Atan2,
            "sqrt" => Intrinsic::Sqrt,
            "rsqrt" => Intrinsic::Rsqrt,
            "abs" => Intrinsic::Abs,
            "sign" => Intrinsic::Sign,
            "min" => Intrinsic::Min,
            "max" => Intrinsic::Max,
            "clamp" => Intrinsic::Clamp,
            "saturate" => Intrinsic::Saturate,
            "lerp" => Intrinsic::Lerp,
            "step" => Intrinsic::Step,
            "smoothstep" => Intrinsic::Smoothstep,
            "dot" => Intrinsic::Dot,
            "cross" => Intrinsic::Cross,
            "normalize" => Intrinsic::Normalize,
            "length" => Intrinsic::Length,
            "distance" => Intrinsic::Distance,
            "reflect" => Intrinsic::Reflect,
            "pow" => Intrinsic::Pow,
            "exp" => Intrinsic::Exp,
            "exp2" => Intrinsic::Exp2,
            "log" => Intrinsic::Log,
            "log2" => Intrinsic::Log2,
            "floor" => Intrinsic::Floor,
            "ceil" => Intrinsic::Ceil,
            "frac" => Intrinsic::Frac,
            "round" => Intrinsic::Round,
            "trunc" => Intrinsic::Trunc,
            "fmod" => Intrinsic::Fmod,
            "mul" => Intrinsic::Mul,
            "transpose" => Intrinsic::Transpose,
            "ddx" => Intrinsic::Ddx,
            "ddy" => Intrinsic::Ddy,
            "any" => Intrinsic::Any,
            "all" => Intrinsic::All,
            "sample" => Intrinsic::Sample,
            "sample_level" => Intrinsic::SampleLevel,
            "load" => Intrinsic::Load,
            "store" => Intrinsic::Store,
            _ => return None,
        };
        Some(intrinsic)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Intrinsic::Sin => "sin",
            Intrinsic::Cos => "cos",
            Intrinsic::Tan => "tan",
            Intrinsic::Asin => "asin",
            Intrinsic::Acos => "acos",
            Intrinsic::Atan => "atan",
            Intrinsic::Atan2 => "atan2",
            Intrinsic::Sqrt => "sqrt",
            Intrinsic::Rsqrt => "rsqrt",
            Intrinsic::Abs => "abs",
            Intrinsic::Sign => "sign",
            Intrinsic::Min => "min",
            Intrinsic::Max => "max",
            Intrinsic::Clamp => "clamp",
            Intrinsic::Saturate => "saturate",
            Intrinsic::Lerp => "lerp",
            Intrinsic::Step => "step",
            Intrinsic::Smoothstep => "smoothstep",
            Intrinsic::Dot => "dot",
            Intrinsic::Cross => "cross",
            Intrinsic::Normalize => "normalize",
            Intrinsic::Length => "length",
            Intrinsic::Distance => "distance",
            Intrinsic::Reflect => "reflect",
            Intrinsic::Pow => "pow",
            Intrinsic::Exp => "exp",
            Intrinsic::Exp2 => "exp2",
            Intrinsic::Log => "log",
            Intrinsic::Log2 => "log2",
            Intrinsic::Floor => "floor",
            Intrinsic::Ceil => "ceil",
            Intrinsic::Frac => "frac",
            Intrinsic::Round => "round",
            Intrinsic::Trunc => "trunc",
            Intrinsic::Fmod => "fmod",
            Intrinsic::Mul => "mul",
            Intrinsic::Transpose => "transpose",
            Intrinsic::Ddx => "ddx",
            Intrinsic::Ddy => "ddy",
            Intrinsic::Any => "any",
            Intrinsic::All => "all",
            Intrinsic::Sample => "sample",
            Intrinsic::SampleLevel => "sample_level",
            Intrinsic::Load => "load",
            Intrinsic::Store => "store",
        }
    }

    /// Exact argument count.
    pub const fn arity(self) -> usize {
        match self {
            Intrinsic::Atan2
            | Intrinsic::Min
            | Intrinsic::Max
            | Intrinsic::Step
            | Intrinsic::Dot
            | Intrinsic::Cross
            | Intrinsic::Distance
            | Intrinsic::Reflect
            | Intrinsic::Pow
            | Intrinsic::Fmod
            | Intrinsic::Mul
            | Intrinsic::Sample
            | Intrinsic::Load => 2,
            Intrinsic::Clamp
            | Intrinsic::Lerp
            | Intrinsic::Smoothstep
            | Intrinsic::SampleLevel
            | Intrinsic::Store => 3,
            _ => 1,
        }
    }

    /// Intrinsics whose first argument is a texture.
    pub const fn takes_texture(self) -> bool {
        matches!(
            self,
            Intrinsic::Sample | Intrinsic::SampleLevel | Intrinsic::Load | Intrinsic::Store
        )
    }

    /// Screen-space derivatives and implicit-lod sampling are
    /// fragment-only operations.
    pub const fn is_fragment_only(self) -> bool {
        matches!(self, Intrinsic::Ddx | Intrinsic::Ddy | Intrinsic::Sample)
    }

    /// Intrinsics with side effects.
    pub const fn has_side_effects(self) -> bool {
        matches!(self, Intrinsic::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for name in ["sin", "sample_level", "smoothstep", "store", "mul"] {
            assert_eq!(Intrinsic::from_name(name).map(Intrinsic::name), Some(name));
        }
        assert_eq!(Intrinsic::from_name("texture"), None);
    }

    #[test]
    fn test_arity() {
        assert_eq!(Intrinsic::Clamp.arity(), 3);
        assert_eq!(Intrinsic::Dot.arity(), 2);
        assert_eq!(Intrinsic::Normalize.arity(), 1);
    }
}
