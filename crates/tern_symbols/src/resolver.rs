//! Dotted-name resolution, one segment at a time.
//!
//! A complete reference is a series of name segments separated by `.`. The
//! first segment is searched outward along the context chain, from the
//! current scope toward the root; inner scopes shadow outer ones and the
//! search never descends into sibling or child scopes. Every later segment
//! is searched only among the members of the previously matched symbol's
//! nested scope, with no fallback outward. When the caller finishes the
//! resolution, the matched chain is checked for validity: every non-terminal
//! symbol must be able to own members.
//!
//! One resolution is in flight at a time. Beginning a second one before the
//! first finishes is reported as [`SymbolError::AlreadyResolving`] rather
//! than corrupting the frame stack.

use tern_diagnostics::{messages, Diagnostic, DiagnosticCollection};

use crate::error::SymbolError;
use crate::symbol::{SymbolId, SymbolValue};
use crate::table::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    /// No resolution in flight.
    Idle,
    /// A resolution was begun but no segment has matched.
    Open,
    /// At least one segment has matched.
    Chaining,
}

/// The resolver for dotted name references.
///
/// Holds the frame stack of symbols matched so far for the one in-flight
/// resolution, plus its own diagnostic collection. Borrows the table
/// immutably per call.
#[derive(Debug)]
pub struct Resolver {
    state: ResolveState,
    /// Symbols matched so far, in segment order.
    frames: Vec<SymbolId>,
    /// The segment that missed, latched so `finish` reports the failure too.
    failed: Option<String>,
    diagnostics: DiagnosticCollection,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            state: ResolveState::Idle,
            frames: Vec::new(),
            failed: None,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Begin a resolution with the first segment of a dotted name.
    ///
    /// The segment is searched in the current scope's store, then in each
    /// enclosing scope out to the root. A match is pushed on the frame stack
    /// and returned; a miss at the root fails the whole lookup. Returns
    /// `AlreadyResolving` if a resolution is already in flight.
    pub fn begin_segment(
        &mut self,
        table: &SymbolTable,
        segment: &str,
    ) -> Result<SymbolId, SymbolError> {
        if self.state != ResolveState::Idle {
            return Err(SymbolError::AlreadyResolving);
        }
        self.state = ResolveState::Open;

        let mut context = Some(table.current_context());
        while let Some(at) = context {
            if let Some(id) = table.find_in(at, segment) {
                self.frames.push(id);
                self.state = ResolveState::Chaining;
                return Ok(id);
            }
            context = table.context_parent(at);
        }

        self.diagnostics
            .add(Diagnostic::new(&messages::CANNOT_FIND_NAME_0, &[segment]));
        self.failed = Some(segment.to_owned());
        Err(SymbolError::NotFound { name: segment.to_owned() })
    }

    /// Match the next segment of the dotted name.
    ///
    /// Only the store of the nested scope attached to the most recent match
    /// is searched; a symbol without a nested scope has no members. A miss
    /// fails the whole chain, with no fallback to enclosing scopes.
    ///
    /// # Panics
    ///
    /// Panics if no resolution is in flight.
    pub fn chain_segment(
        &mut self,
        table: &SymbolTable,
        segment: &str,
    ) -> Result<SymbolId, SymbolError> {
        assert!(
            self.state != ResolveState::Idle,
            "chain_segment called with no resolution in flight"
        );
        if self.failed.is_some() {
            return Err(SymbolError::NotFound { name: segment.to_owned() });
        }

        let head = *self
            .frames
            .last()
            .expect("chaining state with an empty frame stack");
        let found = table
            .symbol(head)
            .context()
            .and_then(|context| table.find_in(context, segment));

        match found {
            Some(id) => {
                self.frames.push(id);
                Ok(id)
            }
            None => {
                self.diagnostics.add(Diagnostic::new(
                    &messages::NAME_0_HAS_NO_MEMBER_1,
                    &[&table.symbol(head).name, segment],
                ));
                self.failed = Some(segment.to_owned());
                Err(SymbolError::NotFound { name: segment.to_owned() })
            }
        }
    }

    /// Finish the in-flight resolution.
    ///
    /// Validates the matched chain: every symbol before the last must be
    /// able to own members. The frame stack is cleared and the resolver
    /// returns to idle whatever the outcome. On success the terminal symbol
    /// is returned; a segment miss earlier in the resolution is reported
    /// here as well.
    ///
    /// # Panics
    ///
    /// Panics if no resolution is in flight.
    pub fn finish(&mut self, table: &SymbolTable) -> Result<SymbolId, SymbolError> {
        assert!(
            self.state != ResolveState::Idle,
            "finish called with no resolution in flight"
        );
        let frames = std::mem::take(&mut self.frames);
        let failed = self.failed.take();
        self.state = ResolveState::Idle;

        if let Some(segment) = failed {
            return Err(SymbolError::NotFound { name: segment });
        }

        let (terminal, links) = frames
            .split_last()
            .expect("resolution finished with an empty frame stack");
        for &link in links {
            if !can_own_members(table, link) {
                let segment = table.symbol(link).name.clone();
                self.diagnostics.add(Diagnostic::new(
                    &messages::_0_CANNOT_CONTAIN_MEMBER_DECLARATIONS,
                    &[&segment],
                ));
                return Err(SymbolError::InvalidChain { segment });
            }
        }
        Ok(*terminal)
    }

    /// Diagnostics accumulated by resolutions.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving the collection empty.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a chain may continue through this symbol. Classes, imports, and
/// the indirect assignment kinds qualify directly; a variable bound to
/// another symbol chains through when its target qualifies.
fn can_own_members(table: &SymbolTable, id: SymbolId) -> bool {
    let sym = table.symbol(id);
    if sym.owns_members() {
        return true;
    }
    if let SymbolValue::Symbol(target) = sym.value {
        return table.symbol(target).owns_members();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{AssignType, NameType, Symbol};

    #[test]
    fn test_single_segment_resolution() {
        let mut table = SymbolTable::new();
        let id = table.insert(Symbol::new("widget")).unwrap();

        let mut resolver = Resolver::new();
        assert_eq!(resolver.begin_segment(&table, "widget"), Ok(id));
        assert_eq!(resolver.finish(&table), Ok(id));
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let mut table = SymbolTable::new();
        table.insert(Symbol::new("widget")).unwrap();

        let mut resolver = Resolver::new();
        resolver.begin_segment(&table, "widget").unwrap();
        assert_eq!(
            resolver.begin_segment(&table, "widget"),
            Err(SymbolError::AlreadyResolving)
        );
        // Finishing makes the resolver usable again.
        resolver.finish(&table).unwrap();
        assert!(resolver.begin_segment(&table, "widget").is_ok());
    }

    #[test]
    #[should_panic(expected = "no resolution in flight")]
    fn test_chain_without_begin_panics() {
        let table = SymbolTable::new();
        let mut resolver = Resolver::new();
        let _ = resolver.chain_segment(&table, "member");
    }

    #[test]
    #[should_panic(expected = "no resolution in flight")]
    fn test_finish_without_begin_panics() {
        let table = SymbolTable::new();
        let mut resolver = Resolver::new();
        let _ = resolver.finish(&table);
    }

    #[test]
    fn test_member_resolution() {
        let mut table = SymbolTable::new();
        let mut class = Symbol::new("Shape");
        class.name_type = NameType::Class;
        class.assign_type = AssignType::Class;
        table.insert(class).unwrap();
        table.open_context(Some("Shape")).unwrap();
        let area = table.insert(Symbol::new("area")).unwrap();

        let mut resolver = Resolver::new();
        resolver.begin_segment(&table, "Shape").unwrap();
        assert_eq!(resolver.chain_segment(&table, "area"), Ok(area));
        assert_eq!(resolver.finish(&table), Ok(area));
    }
}
