//! Lexical scope stack.
//!
//! A flat stack of `(name, variable)` pairs with one marker per open scope.
//! Lookup walks from the innermost binding outwards so inner declarations
//! shadow outer ones; leaving a scope truncates to its marker.

use shc_ir::{Name, VariableId};

#[derive(Default, Debug)]
pub struct ScopeStack {
    bindings: Vec<(Name, VariableId)>,
    marks: Vec<usize>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    pub fn push(&mut self) {
        self.marks.push(self.bindings.len());
    }

    pub fn pop(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.bindings.truncate(mark);
        }
    }

    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    /// Bind `name` in the innermost scope. Returns the existing binding
    /// when the name is already declared in that same scope.
    pub fn declare(&mut self, name: Name, var: VariableId) -> Result<(), VariableId> {
        if let Some(existing) = self.lookup_current(name) {
            return Err(existing);
        }
        self.bindings.push((name, var));
        Ok(())
    }

    pub fn lookup(&self, name: Name) -> Option<VariableId> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == name)
            .map(|&(_, var)| var)
    }

    fn lookup_current(&self, name: Name) -> Option<VariableId> {
        let start = self.marks.last().copied().unwrap_or(0);
        self.bindings[start..]
            .iter()
            .rev()
            .find(|(bound, _)| *bound == name)
            .map(|&(_, var)| var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shc_ir::StringInterner;

    #[test]
    fn test_shadowing_and_rollback() {
        let mut interner = StringInterner::new();
        let x = interner.intern("x");
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert_eq!(scopes.declare(x, VariableId::new(0)), Ok(()));
        scopes.push();
        assert_eq!(scopes.declare(x, VariableId::new(1)), Ok(()));
        assert_eq!(scopes.lookup(x), Some(VariableId::new(1)));
        scopes.pop();
        assert_eq!(scopes.lookup(x), Some(VariableId::new(0)));
        scopes.pop();
        assert_eq!(scopes.lookup(x), None);
    }

    #[test]
    fn test_same_scope_redeclaration() {
        let mut interner = StringInterner::new();
        let x = interner.intern("x");
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert_eq!(scopes.declare(x, VariableId::new(0)), Ok(()));
        assert_eq!(scopes.declare(x, VariableId::new(1)), Err(VariableId::new(0)));
    }
}
