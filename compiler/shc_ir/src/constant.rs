//! Compile-time evaluation of scalar expressions.
//!
//! Shared by the parser (global constants, case labels, array sizes) and
//! the optimizer (constant folding), so both agree on every result.
//! Integers wrap at 32 bits and shift amounts are masked to 5 bits. Floats
//! are computed in `f64` and rounded through `f32`. Integer division or
//! remainder by zero, and float results that are not finite, do not fold.

use crate::{
    BinaryOp, Literal, NodeArena, NodeId, NodeKind, ScalarKind, Table, TypeTable, UnaryOp,
    VariableDef, VariableId,
};

/// Convert a literal to another scalar kind with C-style cast semantics.
pub fn convert(value: Literal, to: ScalarKind) -> Literal {
    match to {
        ScalarKind::Bool => Literal::Bool(match value {
            Literal::Bool(b) => b,
            Literal::Int(v) => v != 0,
            Literal::UInt(v) => v != 0,
            Literal::Float(bits) => f64::from_bits(bits) != 0.0,
        }),
        ScalarKind::Int => Literal::Int(match value {
            Literal::Bool(b) => i32::from(b),
            Literal::Int(v) => v,
            Literal::UInt(v) => v as i32,
            Literal::Float(bits) => f64::from_bits(bits) as i32,
        }),
        ScalarKind::UInt => Literal::UInt(match value {
            Literal::Bool(b) => u32::from(b),
            Literal::Int(v) => v as u32,
            Literal::UInt(v) => v,
            Literal::Float(bits) => f64::from_bits(bits) as u32,
        }),
        ScalarKind::Half | ScalarKind::Float => Literal::float(round_f32(value.as_f64())),
    }
}

#[inline]
fn round_f32(value: f64) -> f64 {
    f64::from(value as f32)
}

pub fn fold_unary(op: UnaryOp, value: Literal) -> Option<Literal> {
    match (op, value) {
        (UnaryOp::Neg, Literal::Int(v)) => Some(Literal::Int(v.wrapping_neg())),
        (UnaryOp::Neg, Literal::UInt(v)) => Some(Literal::UInt(v.wrapping_neg())),
        (UnaryOp::Neg, Literal::Float(bits)) => Some(Literal::float(-f64::from_bits(bits))),
        (UnaryOp::Not, Literal::Bool(b)) => Some(Literal::Bool(!b)),
        (UnaryOp::BitNot, Literal::Int(v)) => Some(Literal::Int(!v)),
        (UnaryOp::BitNot, Literal::UInt(v)) => Some(Literal::UInt(!v)),
        _ => None,
    }
}

/// Fold a binary operator. Both operands are first converted to
/// `operand_kind`, the promoted kind of the expression's operands.
pub fn fold_binary(
    op: BinaryOp,
    lhs: Literal,
    rhs: Literal,
    operand_kind: ScalarKind,
) -> Option<Literal> {
    let lhs = convert(lhs, operand_kind);
    let rhs = convert(rhs, operand_kind);
    match (lhs, rhs) {
        (Literal::Int(l), Literal::Int(r)) => fold_int(op, l, r),
        (Literal::UInt(l), Literal::UInt(r)) => fold_uint(op, l, r),
        (Literal::Float(l), Literal::Float(r)) => {
            fold_float(op, f64::from_bits(l), f64::from_bits(r))
        }
        (Literal::Bool(l), Literal::Bool(r)) => fold_bool(op, l, r),
        _ => None,
    }
}

fn compare<T: PartialOrd>(op: BinaryOp, l: T, r: T) -> Option<Literal> {
    let result = match op {
        BinaryOp::Eq => l == r,
        BinaryOp::NotEq => l != r,
        BinaryOp::Lt => l < r,
        BinaryOp::Gt => l > r,
        BinaryOp::LtEq => l <= r,
        BinaryOp::GtEq => l >= r,
        _ => return None,
    };
    Some(Literal::Bool(result))
}

fn fold_int(op: BinaryOp, l: i32, r: i32) -> Option<Literal> {
    let value = match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div if r != 0 => l.wrapping_div(r),
        BinaryOp::Rem if r != 0 => l.wrapping_rem(r),
        BinaryOp::Div | BinaryOp::Rem => return None,
        BinaryOp::Shl => l.wrapping_shl((r & 31) as u32),
        BinaryOp::Shr => l.wrapping_shr((r & 31) as u32),
        BinaryOp::BitAnd => l & r,
        BinaryOp::BitOr => l | r,
        BinaryOp::BitXor => l ^ r,
        _ => return compare(op, l, r),
    };
    Some(Literal::Int(value))
}

fn fold_uint(op: BinaryOp, l: u32, r: u32) -> Option<Literal> {
    let value = match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div if r != 0 => l / r,
        BinaryOp::Rem if r != 0 => l % r,
        BinaryOp::Div | BinaryOp::Rem => return None,
        BinaryOp::Shl => l.wrapping_shl(r & 31),
        BinaryOp::Shr => l.wrapping_shr(r & 31),
        BinaryOp::BitAnd => l & r,
        BinaryOp::BitOr => l | r,
        BinaryOp::BitXor => l ^ r,
        _ => return compare(op, l, r),
    };
    Some(Literal::UInt(value))
}

fn fold_float(op: BinaryOp, l: f64, r: f64) -> Option<Literal> {
    let value = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        BinaryOp::Rem => l % r,
        _ => return compare(op, l, r),
    };
    let value = round_f32(value);
    value.is_finite().then(|| Literal::float(value))
}

fn fold_bool(op: BinaryOp, l: bool, r: bool) -> Option<Literal> {
    let value = match op {
        BinaryOp::And => l && r,
        BinaryOp::Or => l || r,
        BinaryOp::Eq => l == r,
        BinaryOp::NotEq => l != r,
        _ => return None,
    };
    Some(Literal::Bool(value))
}

/// Read-only view of what constant evaluation needs.
#[derive(Copy, Clone)]
pub struct ConstEnv<'a> {
    pub arena: &'a NodeArena,
    pub types: &'a TypeTable,
    pub variables: &'a Table<VariableId, VariableDef>,
}

impl ConstEnv<'_> {
    /// Evaluate a scalar expression tree, or `None` when any leaf is not
    /// a compile-time constant.
    pub fn evaluate(&self, id: NodeId) -> Option<Literal> {
        let node = self.arena.get(id);
        if !self.types.is_scalar(node.ty) {
            return None;
        }
        let kind = self.types.scalar_kind(node.ty)?;
        match &node.kind {
            NodeKind::Literal(value) => Some(*value),
            NodeKind::Variable(var) => self.variables.get(*var).constant,
            NodeKind::Unary { op, operand } => {
                let value = convert(self.evaluate(*operand)?, kind);
                fold_unary(*op, value)
            }
            NodeKind::Binary { op, lhs, rhs } => {
                let operand_kind = self.operand_kind(*op, *lhs, *rhs)?;
                let l = self.evaluate(*lhs)?;
                let r = self.evaluate(*rhs)?;
                fold_binary(*op, l, r, operand_kind).map(|v| convert(v, kind))
            }
            NodeKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let Literal::Bool(cond) = self.evaluate(*cond)? else {
                    return None;
                };
                let picked = if cond { *then_expr } else { *else_expr };
                Some(convert(self.evaluate(picked)?, kind))
            }
            NodeKind::Cast { operand, .. } => Some(convert(self.evaluate(*operand)?, kind)),
            NodeKind::Construct { args, .. } => match self.arena.list(*args) {
                [single] => Some(convert(self.evaluate(*single)?, kind)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Promoted operand kind of a binary node.
    pub fn operand_kind(&self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> Option<ScalarKind> {
        if op.is_logical() {
            return Some(ScalarKind::Bool);
        }
        let l = self.types.scalar_kind(self.arena.get(lhs).ty)?;
        let r = self.types.scalar_kind(self.arena.get(rhs).ty)?;
        if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
            return Some(l);
        }
        Some(l.promote(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_wraps() {
        assert_eq!(
            fold_binary(BinaryOp::Add, Literal::Int(i32::MAX), Literal::Int(1), ScalarKind::Int),
            Some(Literal::Int(i32::MIN))
        );
        assert_eq!(
            fold_binary(BinaryOp::Div, Literal::Int(i32::MIN), Literal::Int(-1), ScalarKind::Int),
            Some(Literal::Int(i32::MIN))
        );
    }

    #[test]
    fn test_division_by_zero_unfolded() {
        assert_eq!(
            fold_binary(BinaryOp::Div, Literal::Int(1), Literal::Int(0), ScalarKind::Int),
            None
        );
        assert_eq!(
            fold_binary(BinaryOp::Rem, Literal::UInt(1), Literal::UInt(0), ScalarKind::UInt),
            None
        );
        assert_eq!(
            fold_binary(
                BinaryOp::Div,
                Literal::float(1.0),
                Literal::float(0.0),
                ScalarKind::Float
            ),
            None
        );
    }

    #[test]
    fn test_shift_masked() {
        assert_eq!(
            fold_binary(BinaryOp::Shl, Literal::Int(1), Literal::Int(33), ScalarKind::Int),
            Some(Literal::Int(2))
        );
        assert_eq!(
            fold_binary(BinaryOp::Shr, Literal::Int(-8), Literal::Int(1), ScalarKind::Int),
            Some(Literal::Int(-4))
        );
    }

    #[test]
    fn test_mixed_promotes() {
        assert_eq!(
            fold_binary(BinaryOp::Add, Literal::Int(1), Literal::float(0.5), ScalarKind::Float),
            Some(Literal::float(1.5))
        );
        assert_eq!(
            fold_binary(BinaryOp::Lt, Literal::Int(-1), Literal::UInt(0), ScalarKind::UInt),
            Some(Literal::Bool(false))
        );
    }

    #[test]
    fn test_float_rounds_through_f32() {
        let folded = fold_binary(
            BinaryOp::Add,
            Literal::float(0.1),
            Literal::float(0.2),
            ScalarKind::Float,
        );
        assert_eq!(folded, Some(Literal::float(f64::from(0.1f64 as f32 + 0.2f64 as f32))));
    }

    #[test]
    fn test_unary() {
        assert_eq!(fold_unary(UnaryOp::BitNot, Literal::Int(0)), Some(Literal::Int(-1)));
        assert_eq!(fold_unary(UnaryOp::Not, Literal::Bool(true)), Some(Literal::Bool(false)));
        assert_eq!(fold_unary(UnaryOp::PreInc, Literal::Int(0)), None);
    }
}
