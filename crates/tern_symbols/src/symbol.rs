//! Symbol data model.
//!
//! A symbol records one declared name together with what kind of declaration
//! it is, how it was assigned, and its visibility. Symbols for one scope are
//! kept in a binary search tree ordered by name; the `left`/`right` links are
//! the tree children, not scope nesting. A symbol that introduces a scope of
//! its own (a class or method body) additionally carries a handle to that
//! nested context.
//!
//! All links are index handles into the arenas owned by
//! [`SymbolTable`](crate::SymbolTable), so no symbol ever owns another
//! through a pointer; dropping the table releases the whole forest at once.

use crate::table::ContextId;

/// A lightweight handle to a symbol in the symbol table arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of declaration a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameType {
    #[default]
    None,
    Class,
    Method,
    Variable,
    Constant,
    Import,
    /// Scope synthesized for an anonymous block; its name is a serial number.
    Anonymous,
}

/// How the symbol's value was assigned at its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignType {
    /// No assignment is allowed; assigning to this name is a syntax error.
    #[default]
    None,
    // Literal constant assignments.
    Int,
    Uint,
    Float,
    Bool,
    Str,
    // An indirection is needed to retrieve a value for the name.
    Dict,
    Map,
    List,
    /// A class with no base class.
    Class,
    /// A class that inherits; the value holds the base-class symbol.
    ClassWithBase,
    /// Assigned from an expression; the type lives with the expression.
    Expr,
}

/// Declared visibility of a symbol. An unspecified scope is private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Protected,
}

/// The constant value bound to a symbol, selected by its [`AssignType`].
/// At most one variant is ever populated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SymbolValue {
    #[default]
    None,
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    /// A reference to another declared entity: the target of a variable
    /// bound to a name, or the base class of an inheriting class. This is a
    /// navigation link, never an ownership link.
    Symbol(SymbolId),
}

/// A named entity declared in the program.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Search name of the symbol. Private copy of the declared text.
    pub name: String,
    pub name_type: NameType,
    pub assign_type: AssignType,
    pub visibility: Visibility,
    /// Constant value, if any.
    pub value: SymbolValue,

    // Tree links within one scope's store, assigned on insertion.
    pub(crate) left: Option<SymbolId>,
    pub(crate) right: Option<SymbolId>,
    /// Nested scope opened on this symbol, if one has been.
    pub(crate) context: Option<ContextId>,
}

impl Symbol {
    /// Create a symbol with the given name. The caller fills in the rest of
    /// the fields before storing it. The name may be empty only for a symbol
    /// that is never stored; storing one is a fatal caller error.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_type: NameType::default(),
            assign_type: AssignType::default(),
            visibility: Visibility::default(),
            value: SymbolValue::default(),
            left: None,
            right: None,
            context: None,
        }
    }

    /// The nested context opened on this symbol, if any.
    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    /// Whether this symbol can directly own member declarations: classes and
    /// imports always can, as can the indirect assignment kinds that carry
    /// their own namespaces.
    pub fn owns_members(&self) -> bool {
        matches!(self.name_type, NameType::Class | NameType::Import)
            || matches!(
                self.assign_type,
                AssignType::Dict
                    | AssignType::Map
                    | AssignType::List
                    | AssignType::Class
                    | AssignType::ClassWithBase
            )
    }
}
