//! Child enumeration shared by the passes.

use shc_ir::{NodeArena, NodeId, NodeKind};
use smallvec::SmallVec;

pub type Children = SmallVec<[NodeId; 4]>;

/// Direct children of a node, in source order.
pub fn children(arena: &NodeArena, kind: &NodeKind) -> Children {
    let mut out = Children::new();
    match *kind {
        NodeKind::Binary { lhs, rhs, .. } => out.extend([lhs, rhs]),
        NodeKind::Unary { operand, .. }
        | NodeKind::Postfix { operand, .. }
        | NodeKind::Cast { operand, .. } => out.push(operand),
        NodeKind::Assign { target, value, .. } => out.extend([target, value]),
        NodeKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => out.extend([cond, then_expr, else_expr]),
        NodeKind::Call { args, .. }
        | NodeKind::Intrinsic { args, .. }
        | NodeKind::Construct { args, .. }
        | NodeKind::Block(args)
        | NodeKind::DeclGroup(args) => out.extend(arena.list(args).iter().copied()),
        NodeKind::Field { base, .. } | NodeKind::Swizzle { base, .. } => out.push(base),
        NodeKind::Index { base, index } => out.extend([base, index]),
        NodeKind::ExprStmt(expr) => out.push(expr),
        NodeKind::VarDecl { init, .. } | NodeKind::Return(init) => out.extend(init),
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.extend([cond, then_branch]);
            out.extend(else_branch);
        }
        NodeKind::While { cond, body } => out.extend([cond, body]),
        NodeKind::DoWhile { body, cond } => out.extend([body, cond]),
        NodeKind::For {
            init,
            cond,
            step,
            body,
        } => {
            out.extend(init);
            out.extend(cond);
            out.extend(step);
            out.push(body);
        }
        NodeKind::Switch { selector, body } => out.extend([selector, body]),
        NodeKind::Literal(_)
        | NodeKind::Variable(_)
        | NodeKind::Texture(_)
        | NodeKind::Case(_)
        | NodeKind::Default
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::Discard
        | NodeKind::Empty
        | NodeKind::StructDecl(_)
        | NodeKind::TextureDecl(_)
        | NodeKind::FunctionDecl(_)
        | NodeKind::GlobalDecl(_)
        | NodeKind::Typedef(_) => {}
    }
    out
}

/// Whether evaluating the expression can write state or call user code.
pub(crate) fn is_pure(arena: &NodeArena, id: NodeId) -> bool {
    let kind = &arena.get(id).kind;
    let impure = match kind {
        NodeKind::Assign { .. } | NodeKind::Postfix { .. } | NodeKind::Call { .. } => true,
        NodeKind::Unary { op, .. } => op.mutates(),
        NodeKind::Intrinsic { intrinsic, .. } => intrinsic.has_side_effects(),
        _ => false,
    };
    !impure && children(arena, kind).into_iter().all(|child| is_pure(arena, child))
}
