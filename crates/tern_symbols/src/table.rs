//! The symbol table: per-scope symbol stores and the context stack.
//!
//! Symbols for one lexical scope are kept in a binary search tree ordered by
//! byte-wise name comparison. Each scope is a context; contexts form a chain
//! rooted at a single sentinel scope owned by the `"object"` symbol. Opening
//! a context pushes a scope, either anonymously or attached to a named
//! symbol; closing moves back to the parent without destroying anything, so
//! a populated class or method scope stays re-enterable by name.
//!
//! Symbols and contexts live in index arenas owned by the table. The chain
//! links (`prev`/`next`) and the value/base-class references are navigation
//! handles only; teardown is the table's `Drop`.

use std::cmp::Ordering;

use tern_diagnostics::{messages, Diagnostic, DiagnosticCollection};

use crate::error::SymbolError;
use crate::symbol::{NameType, Symbol, SymbolId, Visibility};

/// A lightweight handle to a context in the symbol table arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ContextId(pub u32);

impl ContextId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One lexical scope. Created when a context is opened on a symbol and kept
/// for the lifetime of the table.
#[derive(Debug)]
pub(crate) struct Context {
    /// The symbol this scope is attached to.
    pub(crate) owner: SymbolId,
    /// Root of the scope's symbol store (None while the scope is empty).
    pub(crate) store: Option<SymbolId>,
    /// The enclosing context. None only for the root.
    pub(crate) prev: Option<ContextId>,
    /// The most-recently opened child, valid only while that child is open.
    pub(crate) next: Option<ContextId>,
}

/// The symbol table for one compilation run.
///
/// Owns every symbol and context created during the run along with the
/// current-scope pointer, the anonymous-scope serial counter, and the
/// diagnostic collection for store and context errors.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    contexts: Vec<Context>,
    root: ContextId,
    current: ContextId,
    /// Names anonymous scopes; reset on every successful close.
    serial: u32,
    diagnostics: DiagnosticCollection,
}

impl SymbolTable {
    /// Name of the sentinel symbol that owns the root scope.
    pub const ROOT_NAME: &'static str = "object";

    /// Create a table with its root scope. The root context is owned by a
    /// sentinel `"object"` symbol and can never be closed.
    pub fn new() -> Self {
        let mut root_symbol = Symbol::new(Self::ROOT_NAME);
        root_symbol.visibility = Visibility::Public;

        let root = ContextId(0);
        root_symbol.context = Some(root);

        let mut table = Self {
            symbols: vec![root_symbol],
            contexts: Vec::new(),
            root,
            current: root,
            serial: 0,
            diagnostics: DiagnosticCollection::new(),
        };
        table.contexts.push(Context {
            owner: SymbolId(0),
            store: None,
            prev: None,
            next: None,
        });
        table
    }

    // ========================================================================
    // Symbol store
    // ========================================================================

    /// Store a completed symbol in the current scope.
    ///
    /// Insertion walks the scope's tree comparing names byte-wise and places
    /// the symbol at the first empty slot. An exact name match anywhere on
    /// the path rejects the insertion without mutating the store.
    ///
    /// # Panics
    ///
    /// Panics if the symbol's name is empty.
    pub fn insert(&mut self, symbol: Symbol) -> Result<SymbolId, SymbolError> {
        assert!(!symbol.name.is_empty(), "cannot store a symbol without a name");
        self.insert_into(self.current, symbol)
    }

    fn insert_into(&mut self, context: ContextId, symbol: Symbol) -> Result<SymbolId, SymbolError> {
        let Some(mut at) = self.contexts[context.index()].store else {
            let id = self.alloc_symbol(symbol);
            self.contexts[context.index()].store = Some(id);
            return Ok(id);
        };

        loop {
            match symbol.name.as_str().cmp(self.symbols[at.index()].name.as_str()) {
                Ordering::Equal => {
                    self.diagnostics.add(Diagnostic::new(
                        &messages::SYMBOL_0_IS_ALREADY_DEFINED,
                        &[&symbol.name],
                    ));
                    return Err(SymbolError::AlreadyExists { name: symbol.name });
                }
                Ordering::Less => match self.symbols[at.index()].left {
                    Some(next) => at = next,
                    None => {
                        let id = self.alloc_symbol(symbol);
                        self.symbols[at.index()].left = Some(id);
                        return Ok(id);
                    }
                },
                Ordering::Greater => match self.symbols[at.index()].right {
                    Some(next) => at = next,
                    None => {
                        let id = self.alloc_symbol(symbol);
                        self.symbols[at.index()].right = Some(id);
                        return Ok(id);
                    }
                },
            }
        }
    }

    fn alloc_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Find a symbol by name in the current scope only. The resolver, not
    /// this function, is responsible for searching enclosing scopes.
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.find_in(self.current, name)
    }

    pub(crate) fn find_in(&self, context: ContextId, name: &str) -> Option<SymbolId> {
        let mut at = self.contexts[context.index()].store;
        while let Some(id) = at {
            let sym = &self.symbols[id.index()];
            match name.cmp(sym.name.as_str()) {
                Ordering::Equal => return Some(id),
                Ordering::Less => at = sym.left,
                Ordering::Greater => at = sym.right,
            }
        }
        None
    }

    /// Get a symbol by its handle.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Get a mutable symbol by its handle.
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    /// Total number of symbols in the table, the sentinel root included.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// The symbols of the current scope in ascending name order.
    pub fn symbols_in_order(&self) -> Vec<SymbolId> {
        let mut out = Vec::new();
        self.in_order(self.contexts[self.current.index()].store, &mut out);
        out
    }

    fn in_order(&self, at: Option<SymbolId>, out: &mut Vec<SymbolId>) {
        if let Some(id) = at {
            let sym = &self.symbols[id.index()];
            self.in_order(sym.left, out);
            out.push(id);
            self.in_order(sym.right, out);
        }
    }

    // ========================================================================
    // Context stack
    // ========================================================================

    /// Open a scope and make it current.
    ///
    /// With a name, the symbol is looked up in the current scope only; a miss
    /// is a `NotFound` error. A symbol that has never had a scope gets a
    /// fresh one; a symbol whose scope was closed earlier is re-entered.
    /// Without a name, a serial-named anonymous symbol is stored in the
    /// current scope and a scope is attached to it.
    ///
    /// # Panics
    ///
    /// Panics if the named symbol's scope is already open.
    pub fn open_context(&mut self, name: Option<&str>) -> Result<ContextId, SymbolError> {
        match name {
            Some(name) => {
                let Some(owner) = self.find(name) else {
                    self.diagnostics.add(Diagnostic::new(
                        &messages::CANNOT_OPEN_CONTEXT_SYMBOL_0_IS_NOT_DEFINED,
                        &[name],
                    ));
                    return Err(SymbolError::NotFound { name: name.to_owned() });
                };
                Ok(self.attach_context(owner))
            }
            None => {
                let mut symbol = Symbol::new(format!("{:09}", self.serial));
                self.serial += 1;
                symbol.name_type = NameType::Anonymous;
                let owner = self.insert(symbol)?;
                Ok(self.attach_context(owner))
            }
        }
    }

    fn attach_context(&mut self, owner: SymbolId) -> ContextId {
        let context = match self.symbols[owner.index()].context {
            Some(existing) => {
                assert!(
                    !self.is_open(existing),
                    "context for '{}' is already open",
                    self.symbols[owner.index()].name
                );
                existing
            }
            None => {
                let context = ContextId(self.contexts.len() as u32);
                self.contexts.push(Context {
                    owner,
                    store: None,
                    prev: Some(self.current),
                    next: None,
                });
                self.symbols[owner.index()].context = Some(context);
                context
            }
        };
        self.contexts[self.current.index()].next = Some(context);
        self.current = context;
        context
    }

    /// Whether a context is on the active chain, the current one included.
    fn is_open(&self, context: ContextId) -> bool {
        let mut at = Some(self.current);
        while let Some(id) = at {
            if id == context {
                return true;
            }
            at = self.contexts[id.index()].prev;
        }
        false
    }

    /// Revert the current scope to its parent.
    ///
    /// The outermost scope cannot be closed: when the current scope is the
    /// root, or its parent is the root, the call fails with `ContextError`
    /// and the current scope is unchanged. A successful close clears the
    /// parent's child link and resets the anonymous serial counter.
    pub fn close_context(&mut self) -> Result<(), SymbolError> {
        let prev = self.contexts[self.current.index()].prev;
        let parent = match prev {
            Some(parent) if parent != self.root => parent,
            _ => {
                self.diagnostics.add(Diagnostic::new(
                    &messages::CANNOT_CLOSE_THE_OUTERMOST_SCOPE,
                    &[],
                ));
                return Err(SymbolError::ContextError);
            }
        };
        self.contexts[parent.index()].next = None;
        self.current = parent;
        self.serial = 0;
        Ok(())
    }

    /// The current scope.
    pub fn current_context(&self) -> ContextId {
        self.current
    }

    /// The root scope.
    pub fn root_context(&self) -> ContextId {
        self.root
    }

    /// The symbol the enclosing scope is attached to.
    ///
    /// # Panics
    ///
    /// Panics when the current scope is the root, which has no enclosing
    /// scope.
    pub fn current_owner(&self) -> SymbolId {
        let prev = self.contexts[self.current.index()]
            .prev
            .expect("current_owner called at the root scope");
        self.contexts[prev.index()].owner
    }

    /// The symbol a scope is attached to.
    pub fn context_owner(&self, context: ContextId) -> SymbolId {
        self.contexts[context.index()].owner
    }

    pub(crate) fn context_parent(&self, context: ContextId) -> Option<ContextId> {
        self.contexts[context.index()].prev
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Diagnostics accumulated by store and context operations.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving the collection empty.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Debugging
    // ========================================================================

    /// Render the whole nested-scope forest as an indented listing, one name
    /// per line with a `-` per nesting level. Within a scope the order is
    /// left subtree, right subtree, then the symbol itself, with the
    /// symbol's nested scope indented one level deeper. A debugging view,
    /// not a stable format.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_symbol(self.contexts[self.root.index()].owner, 0, &mut out);
        out
    }

    fn dump_symbol(&self, id: SymbolId, indent: usize, out: &mut String) {
        let sym = &self.symbols[id.index()];
        if let Some(left) = sym.left {
            self.dump_symbol(left, indent, out);
        }
        if let Some(right) = sym.right {
            self.dump_symbol(right, indent, out);
        }
        for _ in 0..indent {
            out.push('-');
        }
        out.push_str(&sym.name);
        out.push('\n');
        if let Some(context) = sym.context {
            if let Some(store) = self.contexts[context.index()].store {
                self.dump_symbol(store, indent + 1, out);
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
