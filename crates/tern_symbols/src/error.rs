//! Typed outcomes for symbol table and resolver operations.

use thiserror::Error;

/// Recoverable failures surfaced by the symbol table and resolver.
///
/// Each variant is also reported on the owning component's diagnostic
/// collection; the caller decides whether it is fatal to the compilation.
/// Caller defects (storing an empty name, finishing a resolution that was
/// never begun) are panics, not variants of this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// A symbol with this name is already stored in the target scope.
    /// The store is left unchanged.
    #[error("symbol '{name}' is already defined in this scope")]
    AlreadyExists { name: String },

    /// The name was not found where the operation is allowed to look.
    #[error("cannot find name '{name}'")]
    NotFound { name: String },

    /// The outermost scope cannot be closed.
    #[error("cannot close the outermost scope")]
    ContextError,

    /// A non-terminal segment of a dotted name cannot own members.
    #[error("'{segment}' cannot contain member declarations")]
    InvalidChain { segment: String },

    /// A new resolution was begun while another one was still in flight.
    #[error("a name resolution is already in flight")]
    AlreadyResolving,
}
