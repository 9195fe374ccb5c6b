//! Constant folding and dead-code removal over a stage's arena copy.
//!
//! Children fold before their parent, so a parent sees literal operands
//! wherever they fold. Statements are rewritten in place; blocks get a new
//! child list when statements drop out.

use crate::walk::{children, is_pure};
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::constant::ConstEnv;
use shc_ir::{FunctionId, Literal, Node, NodeArena, NodeId, NodeKind, Shader, Stage, TypeId};

pub(crate) struct Folder<'a> {
    shader: &'a Shader,
    stage: Stage,
    pub(crate) arena: NodeArena,
    pub(crate) folded: usize,
}

impl<'a> Folder<'a> {
    pub(crate) fn new(shader: &'a Shader, stage: Stage) -> Self {
        Folder {
            shader,
            stage,
            arena: shader.arena.clone(),
            folded: 0,
        }
    }

    fn env(&self) -> ConstEnv<'_> {
        ConstEnv {
            arena: &self.arena,
            types: &self.shader.types,
            variables: &self.shader.variables,
        }
    }

    fn literal(&self, id: NodeId) -> Option<Literal> {
        match self.arena.get(id).kind {
            NodeKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn fold_function(&mut self, function: FunctionId) -> CompileResult<()> {
        if let Some(body) = self.shader.functions.get(function).body {
            self.stmt(body)?;
        }
        Ok(())
    }

    // Statements

    /// Fold a statement; `None` when it can be dropped.
    fn stmt(&mut self, id: NodeId) -> CompileResult<Option<NodeId>> {
        let node = self.arena.get(id).clone();
        match node.kind {
            NodeKind::Block(range) => {
                let statements = self.arena.list(range).to_vec();
                let kept = self.block(statements)?;
                let range = self.arena.alloc_list(kept);
                self.arena.get_mut(id).kind = NodeKind::Block(range);
            }
            NodeKind::DeclGroup(range) => {
                for decl in self.arena.list(range).to_vec() {
                    self.stmt(decl)?;
                }
            }
            NodeKind::ExprStmt(expr)
            | NodeKind::VarDecl {
                init: Some(expr), ..
            }
            | NodeKind::Return(Some(expr)) => self.expr(expr)?,
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond)?;
                match self.literal(cond) {
                    Some(Literal::Bool(true)) => {
                        self.folded += 1;
                        return self.branch(then_branch);
                    }
                    Some(Literal::Bool(false)) => {
                        self.folded += 1;
                        return match else_branch {
                            Some(branch) => self.branch(branch),
                            None => Ok(None),
                        };
                    }
                    _ => {}
                }
                let then_branch = self.body(then_branch)?;
                let else_branch = match else_branch {
                    Some(branch) => self.stmt(branch)?,
                    None => None,
                };
                self.arena.get_mut(id).kind = NodeKind::If {
                    cond,
                    then_branch,
                    else_branch,
                };
            }
            NodeKind::While { cond, body } => {
                self.expr(cond)?;
                if self.literal(cond) == Some(Literal::Bool(false)) {
                    self.folded += 1;
                    return Ok(None);
                }
                let body = self.body(body)?;
                self.arena.get_mut(id).kind = NodeKind::While { cond, body };
            }
            NodeKind::DoWhile { body, cond } => {
                let body = self.body(body)?;
                self.expr(cond)?;
                self.arena.get_mut(id).kind = NodeKind::DoWhile { body, cond };
            }
            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let init = match init {
                    Some(init) => self.stmt(init)?,
                    None => None,
                };
                if let Some(cond) = cond {
                    self.expr(cond)?;
                    if self.literal(cond) == Some(Literal::Bool(false)) {
                        self.folded += 1;
                        // The init still runs; keep its declarations scoped.
                        return Ok(init.map(|init| self.wrap_block(init, &node)));
                    }
                }
                if let Some(step) = step {
                    self.expr(step)?;
                }
                let body = self.body(body)?;
                self.arena.get_mut(id).kind = NodeKind::For {
                    init,
                    cond,
                    step,
                    body,
                };
            }
            NodeKind::Switch { selector, body } => {
                self.expr(selector)?;
                self.stmt(body)?;
            }
            NodeKind::Discard if self.stage != Stage::Fragment => {
                return Err(CompileError::semantic(
                    ErrorCode::E2017,
                    format!("`discard` is reachable from the {} entry", self.stage),
                    node.span,
                    node.line,
                ));
            }
            _ => {}
        }
        Ok(Some(id))
    }

    /// Fold a block's statements, dropping those after a terminator up to
    /// the next `case`/`default` label.
    fn block(&mut self, statements: Vec<NodeId>) -> CompileResult<Vec<NodeId>> {
        let mut kept = Vec::with_capacity(statements.len());
        let mut dead = false;
        for statement in statements {
            let is_label = matches!(
                self.arena.get(statement).kind,
                NodeKind::Case(_) | NodeKind::Default
            );
            if dead && !is_label {
                self.folded += 1;
                continue;
            }
            dead = false;
            if let Some(statement) = self.stmt(statement)? {
                dead = self.arena.get(statement).kind.is_terminator();
                kept.push(statement);
            }
        }
        Ok(kept)
    }

    /// The surviving arm of a folded `if`.
    fn branch(&mut self, branch: NodeId) -> CompileResult<Option<NodeId>> {
        let Some(kept) = self.stmt(branch)? else {
            return Ok(None);
        };
        let node = self.arena.get(kept).clone();
        Ok(Some(match node.kind {
            NodeKind::VarDecl { .. } | NodeKind::DeclGroup(_) => self.wrap_block(kept, &node),
            _ => kept,
        }))
    }

    /// A statement in a position that must hold one (loop or `if` body).
    fn body(&mut self, id: NodeId) -> CompileResult<NodeId> {
        match self.stmt(id)? {
            Some(kept) => Ok(kept),
            None => {
                let node = self.arena.get(id);
                let empty = Node::new(NodeKind::Empty, node.span, node.line).with_type(TypeId::VOID);
                Ok(self.arena.alloc(empty))
            }
        }
    }

    fn wrap_block(&mut self, statement: NodeId, at: &Node) -> NodeId {
        let range = self.arena.alloc_list([statement]);
        self.arena
            .alloc(Node::new(NodeKind::Block(range), at.span, at.line).with_type(TypeId::VOID))
    }

    // Expressions

    pub(crate) fn expr(&mut self, id: NodeId) -> CompileResult<()> {
        let node = self.arena.get(id).clone();
        for child in children(&self.arena, &node.kind) {
            self.expr(child)?;
        }

        match node.kind {
            NodeKind::Literal(_) => {}
            NodeKind::Intrinsic { intrinsic, .. }
                if intrinsic.is_fragment_only() && self.stage != Stage::Fragment =>
            {
                return Err(CompileError::semantic(
                    ErrorCode::E2017,
                    format!(
                        "`{}` is only available in the fragment stage, found in the {} stage",
                        intrinsic.name(),
                        self.stage
                    ),
                    node.span,
                    node.line,
                ));
            }
            NodeKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } if is_pure(&self.arena, then_expr) && is_pure(&self.arena, else_expr) => {
                if let Some(Literal::Bool(pick)) = self.literal(cond) {
                    let arm = if pick { then_expr } else { else_expr };
                    let mut replacement = self.arena.get(arm).clone();
                    replacement.span = node.span;
                    *self.arena.get_mut(id) = replacement;
                    self.folded += 1;
                }
            }
            _ => {
                if let Some(value) = self.env().evaluate(id) {
                    self.arena.get_mut(id).kind = NodeKind::Literal(value);
                    self.folded += 1;
                }
            }
        }
        Ok(())
    }
}
