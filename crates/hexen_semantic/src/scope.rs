//! Symbol table: a stack of lexical scopes.
//!
//! Scopes hold [`SymbolInfo`] keyed by interned [`Symbol`] handles. Lookup
//! walks inner to outer, declaration only touches the top scope, and the
//! global scope is never popped. Shadowing across scopes is legal;
//! redeclaration within one scope is the caller's `Redeclaration` error.

use crate::types::Type;
use hexen_base::Symbol;
use std::collections::HashMap;

/// `val` or `mut` at the declaration site. A symbol's mutability never
/// changes after declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Immutable,
    Mutable,
}

/// Everything the analyzer tracks about one declared name.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: Symbol,
    /// Fixed at declaration; assignments adapt to it, never change it.
    pub ty: Type,
    pub mutability: Mutability,
    /// `false` only when the initializer was `undef`; reads while `false`
    /// are `UseOfUninitialized`.
    pub initialized: bool,
    pub used: bool,
}

impl SymbolInfo {
    pub fn new(name: Symbol, ty: Type, mutability: Mutability) -> Self {
        Self {
            name,
            ty,
            mutability,
            initialized: true,
            used: false,
        }
    }

    pub fn uninitialized(name: Symbol, ty: Type, mutability: Mutability) -> Self {
        Self {
            initialized: false,
            ..Self::new(name, ty, mutability)
        }
    }
}

/// The scope stack. Always holds at least the global scope.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<Symbol, SymbolInfo>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope. The global scope stays put no matter how
    /// unbalanced the caller got.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of live scopes, global included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares in the top scope. `false` when the name is already taken
    /// there - the caller reports `Redeclaration`.
    pub fn declare(&mut self, symbol: SymbolInfo) -> bool {
        // The stack always holds at least the global scope.
        let Some(top) = self.scopes.last_mut() else {
            return false;
        };
        if top.contains_key(&symbol.name) {
            return false;
        }
        top.insert(symbol.name, symbol);
        true
    }

    /// Innermost match, walking outward.
    pub fn lookup(&self, name: Symbol) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    pub fn lookup_mut(&mut self, name: Symbol) -> Option<&mut SymbolInfo> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&name))
    }

    /// `true` when `name` is declared in the *top* scope - the
    /// redeclaration check, blind to outer shadowed bindings.
    pub fn declared_in_current_scope(&self, name: Symbol) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.contains_key(&name))
            .unwrap_or(false)
    }

    /// Flags the resolved symbol as used. `false` when the name is unbound.
    pub fn mark_used(&mut self, name: Symbol) -> bool {
        match self.lookup_mut(name) {
            Some(info) => {
                info.used = true;
                true
            }
            None => false,
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexen_base::Interner;

    fn sym(interner: &mut Interner, name: &str) -> Symbol {
        interner.intern(name)
    }

    #[test]
    fn declare_and_lookup() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = sym(&mut interner, "x");
        assert!(table.declare(SymbolInfo::new(x, Type::I32, Mutability::Immutable)));
        let info = table.lookup(x).expect("x should resolve");
        assert_eq!(info.ty, Type::I32);
        assert!(info.initialized);
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = sym(&mut interner, "x");
        assert!(table.declare(SymbolInfo::new(x, Type::I32, Mutability::Immutable)));
        assert!(!table.declare(SymbolInfo::new(x, Type::I64, Mutability::Mutable)));
    }

    #[test]
    fn shadowing_across_scopes_resolves_innermost() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = sym(&mut interner, "x");
        table.declare(SymbolInfo::new(x, Type::I32, Mutability::Immutable));
        table.enter_scope();
        assert!(table.declare(SymbolInfo::new(x, Type::F64, Mutability::Immutable)));
        assert_eq!(table.lookup(x).unwrap().ty, Type::F64);
        table.exit_scope();
        assert_eq!(table.lookup(x).unwrap().ty, Type::I32);
    }

    #[test]
    fn symbols_die_with_their_scope() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let tmp = sym(&mut interner, "tmp");
        table.enter_scope();
        table.declare(SymbolInfo::new(tmp, Type::Bool, Mutability::Immutable));
        assert!(table.lookup(tmp).is_some());
        table.exit_scope();
        assert!(table.lookup(tmp).is_none());
    }

    #[test]
    fn global_scope_survives_excess_exits() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = sym(&mut interner, "x");
        table.declare(SymbolInfo::new(x, Type::I32, Mutability::Immutable));
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 1);
        assert!(table.lookup(x).is_some());
    }

    #[test]
    fn current_scope_check_ignores_outer_bindings() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = sym(&mut interner, "x");
        table.declare(SymbolInfo::new(x, Type::I32, Mutability::Immutable));
        table.enter_scope();
        assert!(!table.declared_in_current_scope(x));
        assert!(table.lookup(x).is_some());
    }

    #[test]
    fn mark_used_sets_the_flag() {
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = sym(&mut interner, "x");
        table.declare(SymbolInfo::new(x, Type::I32, Mutability::Immutable));
        assert!(table.mark_used(x));
        assert!(table.lookup(x).unwrap().used);
        let ghost = sym(&mut interner, "ghost");
        assert!(!table.mark_used(ghost));
    }

    #[test]
    fn uninitialized_constructor_clears_flag() {
        let mut interner = Interner::new();
        let x = sym(&mut interner, "x");
        let info = SymbolInfo::uninitialized(x, Type::I32, Mutability::Mutable);
        assert!(!info.initialized);
        assert_eq!(info.mutability, Mutability::Mutable);
    }
}
