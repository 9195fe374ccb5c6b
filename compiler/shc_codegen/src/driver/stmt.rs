//! Statement emission.

use super::Generator;
use crate::dialect::Dialect;
use shc_diagnostic::CompileResult;
use shc_ir::{NodeId, NodeKind, VariableId};

impl<D: Dialect> Generator<'_, D> {
    /// Emit the statements of a block at the current indent, without braces.
    pub(crate) fn block_contents(&mut self, id: NodeId) -> CompileResult<()> {
        let arena = &self.view().arena;
        match arena.get(id).kind {
            NodeKind::Block(range) => {
                for &statement in arena.list(range) {
                    self.stmt(statement)?;
                }
                Ok(())
            }
            _ => self.stmt(id),
        }
    }

    fn nested(&mut self, id: NodeId) -> CompileResult<()> {
        self.out.indent();
        self.block_contents(id)?;
        self.out.dedent();
        Ok(())
    }

    fn stmt(&mut self, id: NodeId) -> CompileResult<()> {
        let arena = &self.view().arena;
        match arena.get(id).kind {
            NodeKind::Block(_) => {
                self.out.line("{");
                self.nested(id)?;
                self.out.line("}");
            }
            NodeKind::DeclGroup(range) => {
                for &decl in arena.list(range) {
                    self.stmt(decl)?;
                }
            }
            NodeKind::ExprStmt(expr) => {
                let text = self.top_expr(expr)?;
                self.out.line(format!("{text};"));
            }
            NodeKind::VarDecl { variable, init } => {
                let text = self.declaration(variable, init)?;
                self.out.line(format!("{text};"));
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.out.line(format!("if ({}) {{", self.top_expr(cond)?));
                self.nested(then_branch)?;
                let mut rest = else_branch;
                while let Some(branch) = rest {
                    match arena.get(branch).kind {
                        NodeKind::If {
                            cond,
                            then_branch,
                            else_branch,
                        } => {
                            self.out.line(format!("}} else if ({}) {{", self.top_expr(cond)?));
                            self.nested(then_branch)?;
                            rest = else_branch;
                        }
                        _ => {
                            self.out.line("} else {");
                            self.nested(branch)?;
                            rest = None;
                        }
                    }
                }
                self.out.line("}");
            }
            NodeKind::While { cond, body } => {
                self.out.line(format!("while ({}) {{", self.top_expr(cond)?));
                self.nested(body)?;
                self.out.line("}");
            }
            NodeKind::DoWhile { body, cond } => {
                self.out.line("do {");
                self.nested(body)?;
                self.out.line(format!("}} while ({});", self.top_expr(cond)?));
            }
            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let mut header = String::from("for (");
                if let Some(init) = init {
                    header.push_str(&self.for_init(init)?);
                }
                header.push(';');
                if let Some(cond) = cond {
                    header.push(' ');
                    header.push_str(&self.top_expr(cond)?);
                }
                header.push(';');
                if let Some(step) = step {
                    header.push(' ');
                    header.push_str(&self.top_expr(step)?);
                }
                self.out.line(format!("{header}) {{"));
                self.nested(body)?;
                self.out.line("}");
            }
            NodeKind::Switch { selector, body } => {
                self.out.line(format!("switch ({}) {{", self.top_expr(selector)?));
                self.out.indent();
                let statements = match arena.get(body).kind {
                    NodeKind::Block(range) => arena.list(range),
                    _ => std::slice::from_ref(&body),
                };
                for &statement in statements {
                    match arena.get(statement).kind {
                        NodeKind::Case(_) | NodeKind::Default => self.stmt(statement)?,
                        _ => {
                            self.out.indent();
                            self.stmt(statement)?;
                            self.out.dedent();
                        }
                    }
                }
                self.out.dedent();
                self.out.line("}");
            }
            NodeKind::Case(value) => {
                let ty = arena.get(id).ty;
                self.out.line(format!("case {}:", self.literal(value, ty)));
            }
            NodeKind::Default => self.out.line("default:"),
            NodeKind::Return(Some(value)) => {
                let text = self.top_expr(value)?;
                self.out.line(format!("return {text};"));
            }
            NodeKind::Return(None) => self.out.line("return;"),
            NodeKind::Break => self.out.line("break;"),
            NodeKind::Continue => self.out.line("continue;"),
            NodeKind::Discard => self.out.line(self.dialect.discard()),
            NodeKind::Empty => self.out.line(";"),
            _ => {}
        }
        Ok(())
    }

    /// `type name = init`, with `const` kept only for folded scalars so
    /// every target accepts it.
    fn declaration(&self, variable: VariableId, init: Option<NodeId>) -> CompileResult<String> {
        let def = self.shader().variables.get(variable);
        let qualifier = if def.is_const && def.constant.is_some() {
            "const "
        } else {
            ""
        };
        let declaration = self.declarator(def.ty, &self.var_name(variable));
        match init {
            Some(init) => Ok(format!("{qualifier}{declaration} = {}", self.top_expr(init)?)),
            None => Ok(format!("{qualifier}{declaration}")),
        }
    }

    fn for_init(&self, init: NodeId) -> CompileResult<String> {
        let arena = &self.view().arena;
        match arena.get(init).kind {
            NodeKind::VarDecl { variable, init } => self.declaration(variable, init),
            NodeKind::DeclGroup(range) => {
                let mut parts = Vec::new();
                for (i, &decl) in arena.list(range).iter().enumerate() {
                    let NodeKind::VarDecl { variable, init } = arena.get(decl).kind else {
                        continue;
                    };
                    if i == 0 {
                        parts.push(self.declaration(variable, init)?);
                        continue;
                    }
                    let name = self.var_name(variable);
                    match init {
                        Some(init) => parts.push(format!("{name} = {}", self.top_expr(init)?)),
                        None => parts.push(name),
                    }
                }
                Ok(parts.join(", "))
            }
            NodeKind::ExprStmt(expr) => self.top_expr(expr),
            _ => Ok(String::new()),
        }
    }
}
