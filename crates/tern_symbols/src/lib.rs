//! tern_symbols: Symbol table and name resolution for the Tern compiler.
//!
//! The parser creates a [`Symbol`] for every declaration and stores it in the
//! [`SymbolTable`] under the current scope, opening and closing contexts as
//! it enters and leaves class, method, and block bodies. When it later meets
//! a dotted reference, the [`Resolver`] matches it one segment at a time:
//! the first segment outward along the scope chain, later segments inward
//! through nested members.

mod error;
mod resolver;
mod symbol;
mod table;

pub use error::SymbolError;
pub use resolver::Resolver;
pub use symbol::{AssignType, NameType, Symbol, SymbolId, SymbolValue, Visibility};
pub use table::{ContextId, SymbolTable};
