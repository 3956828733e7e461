//! Symbol table integration tests.
//!
//! Exercises the store/find/open/close lifecycle the parser drives while
//! walking declarations, including the nested open-close-reopen choreography
//! and the anonymous-scope serial naming.

use tern_symbols::{NameType, Symbol, SymbolError, SymbolTable};

/// Helper: a class symbol ready to own a scope.
fn class(name: &str) -> Symbol {
    let mut sym = Symbol::new(name);
    sym.name_type = NameType::Class;
    sym.assign_type = tern_symbols::AssignType::Class;
    sym
}

const NAMES: &[&str] = &[
    "asdf", "qwer", "werwe", "rewrew", "dfgddfg", "234908", "ewirou", "poipoi", "lkjlkj",
    "fkjgjh", "sdfkjhlj", "dsfkjl", "293847", "sdflkjsd",
];

// ============================================================================
// Store and find
// ============================================================================

#[test]
fn test_store_and_find_many() {
    let mut table = SymbolTable::new();
    for i in 1..=20 {
        table.insert(Symbol::new(format!("symbol{:02}", i))).unwrap();
    }
    for i in 1..=20 {
        let name = format!("symbol{:02}", i);
        assert!(table.find(&name).is_some(), "stored symbol '{}' not found", name);
    }
    assert!(table.find("mnbgdf").is_none(), "'mnbgdf' was not stored");
}

#[test]
fn test_duplicate_leaves_one_symbol() {
    let mut table = SymbolTable::new();
    for name in NAMES {
        table.insert(Symbol::new(*name)).unwrap();
    }
    let err = table.insert(Symbol::new("qwer")).unwrap_err();
    assert_eq!(err, SymbolError::AlreadyExists { name: "qwer".into() });

    let qwer_count = table
        .symbols_in_order()
        .into_iter()
        .filter(|&id| table.symbol(id).name == "qwer")
        .count();
    assert_eq!(qwer_count, 1, "duplicate insertion must not add a second 'qwer'");
}

#[test]
fn test_in_order_traversal_is_sorted() {
    let mut table = SymbolTable::new();
    for name in NAMES {
        table.insert(Symbol::new(*name)).unwrap();
    }
    let names: Vec<&str> = table
        .symbols_in_order()
        .into_iter()
        .map(|id| table.symbol(id).name.as_str())
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted, "in-order traversal must yield ascending names");
}

// ============================================================================
// Context stack
// ============================================================================

#[test]
fn test_open_requires_symbol_in_current_scope() {
    let mut table = SymbolTable::new();
    table.insert(class("Outer")).unwrap();
    table.open_context(Some("Outer")).unwrap();

    // "Outer" lives in the root scope, not in its own scope, so it is not
    // visible to a named open issued from inside its body.
    let err = table.open_context(Some("Outer")).unwrap_err();
    assert_eq!(err, SymbolError::NotFound { name: "Outer".into() });
}

#[test]
fn test_close_at_root_fails() {
    let mut table = SymbolTable::new();
    assert_eq!(table.close_context(), Err(SymbolError::ContextError));
}

#[test]
fn test_close_to_root_fails_and_leaves_state() {
    let mut table = SymbolTable::new();
    table.open_context(None).unwrap();
    let inside = table.current_context();
    table.insert(Symbol::new("local")).unwrap();

    assert_eq!(table.close_context(), Err(SymbolError::ContextError));
    assert_eq!(table.current_context(), inside, "failed close must not move the scope");
    assert!(table.find("local").is_some(), "failed close must not change visibility");
}

#[test]
fn test_scope_isolation_between_siblings() {
    let mut table = SymbolTable::new();
    table.insert(class("Module")).unwrap();
    table.open_context(Some("Module")).unwrap();
    table.insert(class("First")).unwrap();
    table.insert(class("Second")).unwrap();

    table.open_context(Some("First")).unwrap();
    table.insert(Symbol::new("shared_name")).unwrap();
    table.close_context().unwrap();

    table.open_context(Some("Second")).unwrap();
    assert!(
        table.find("shared_name").is_none(),
        "a sibling scope must not see another scope's symbols"
    );
}

#[test]
fn test_reopen_recovers_closed_scope() {
    let mut table = SymbolTable::new();
    table.insert(class("Module")).unwrap();
    table.open_context(Some("Module")).unwrap();
    table.insert(class("Inner")).unwrap();

    table.open_context(Some("Inner")).unwrap();
    let first = table.current_context();
    table.insert(Symbol::new("payload")).unwrap();
    table.close_context().unwrap();

    assert!(table.find("payload").is_none(), "closed scope leaked a symbol");

    let reopened = table.open_context(Some("Inner")).unwrap();
    assert_eq!(reopened, first, "reopening must recover the same scope, not a fresh one");
    assert!(table.find("payload").is_some());
}

#[test]
fn test_current_owner_names_enclosing_symbol() {
    let mut table = SymbolTable::new();
    table.insert(class("Shape")).unwrap();
    table.open_context(Some("Shape")).unwrap();
    assert_eq!(table.symbol(table.current_owner()).name, SymbolTable::ROOT_NAME);

    let mut draw = Symbol::new("draw");
    draw.name_type = NameType::Method;
    table.insert(draw).unwrap();
    table.open_context(Some("draw")).unwrap();
    assert_eq!(table.symbol(table.current_owner()).name, "Shape");
}

#[test]
#[should_panic(expected = "root scope")]
fn test_current_owner_at_root_panics() {
    let table = SymbolTable::new();
    let _ = table.current_owner();
}

// ============================================================================
// Anonymous scopes
// ============================================================================

#[test]
fn test_anonymous_scope_serial_names() {
    let mut table = SymbolTable::new();
    table.open_context(None).unwrap();
    assert_eq!(table.symbol(table.current_owner()).name, SymbolTable::ROOT_NAME);

    // The first anonymous scope is named from serial zero, padded to nine
    // digits; the next one, opened before any close, takes the next serial.
    table.open_context(None).unwrap();
    assert_eq!(table.symbol(table.current_owner()).name, "000000000");
    table.open_context(None).unwrap();
    assert_eq!(table.symbol(table.current_owner()).name, "000000001");
}

#[test]
fn test_serial_resets_on_close() {
    let mut table = SymbolTable::new();
    table.insert(class("Module")).unwrap();
    table.open_context(Some("Module")).unwrap();

    table.open_context(None).unwrap(); // 000000000, in Module's scope
    table.open_context(None).unwrap(); // 000000001, one deeper
    table.close_context().unwrap();

    // After the close the counter restarts; the next anonymous scope in
    // 000000000's store reuses the zero serial without a collision.
    table.open_context(None).unwrap();
    assert_eq!(table.symbol(table.current_owner()).name, "000000000");
}

#[test]
fn test_serial_reset_can_collide_in_same_scope() {
    let mut table = SymbolTable::new();
    table.insert(class("Module")).unwrap();
    table.open_context(Some("Module")).unwrap();

    table.open_context(None).unwrap(); // 000000000, in Module's scope
    table.close_context().unwrap(); // back to Module, serial reset

    // The reset serial renames the next anonymous scope identically, and the
    // store rejects the duplicate.
    let err = table.open_context(None).unwrap_err();
    assert_eq!(err, SymbolError::AlreadyExists { name: "000000000".into() });
}

// ============================================================================
// End-to-end lifecycle
// ============================================================================

#[test]
fn test_store_find_and_anonymous_visibility() {
    let mut table = SymbolTable::new();
    for name in ["asdf", "qwer", "werwe"] {
        table.insert(Symbol::new(name)).unwrap();
    }
    let qwer = table.find("qwer").expect("'qwer' was stored");
    assert_eq!(table.symbol(qwer).name, "qwer");
    assert!(table.find("zzzz").is_none());

    table.insert(class("Holder")).unwrap();
    table.open_context(Some("Holder")).unwrap();

    table.open_context(None).unwrap();
    table.insert(Symbol::new("inner1")).unwrap();
    table.close_context().unwrap();

    // Not visible from the enclosing scope, but the scope that owns it is
    // still retrievable by its serial name.
    assert!(table.find("inner1").is_none());
    table.open_context(Some("000000000")).unwrap();
    assert!(table.find("inner1").is_some());
}

#[test]
fn test_nested_open_close_reopen_choreography() {
    let mut table = SymbolTable::new();
    table.insert(class("mnbgdf")).unwrap();
    table.open_context(Some("mnbgdf")).unwrap();
    for name in NAMES[5..11].iter().copied() {
        table.insert(class(name)).unwrap();
    }

    table.open_context(None).unwrap();
    for i in 1..=7 {
        table.insert(Symbol::new(format!("symbol{:02}", i))).unwrap();
    }

    table.open_context(None).unwrap();
    for i in 13..=20 {
        table.insert(Symbol::new(format!("symbol{:02}", i))).unwrap();
    }

    table.close_context().unwrap();
    table.close_context().unwrap();

    // Back in mnbgdf's scope: one of its symbols opens as a fresh scope.
    table.open_context(Some("fkjgjh")).unwrap();
    for i in 9..=16 {
        table.insert(Symbol::new(format!("symbol{:02}", i))).unwrap();
    }
    assert!(table.find("symbol09").is_some());
    assert!(table.find("symbol01").is_none(), "anonymous-scope symbols must not leak");

    let dump = table.dump();
    for name in ["object", "mnbgdf", "fkjgjh", "symbol16"] {
        assert!(dump.contains(name), "dump is missing '{}'\n{}", name, dump);
    }
}

// ============================================================================
// Dump format
// ============================================================================

#[test]
fn test_dump_orders_and_indents() {
    let mut table = SymbolTable::new();
    table.insert(class("beta")).unwrap();
    table.insert(Symbol::new("alpha")).unwrap();
    table.insert(Symbol::new("gamma")).unwrap();
    table.open_context(Some("beta")).unwrap();
    table.insert(Symbol::new("member")).unwrap();

    // Left subtree, right subtree, then the symbol, nested scopes one level
    // deeper.
    assert_eq!(table.dump(), "object\n-alpha\n-gamma\n-beta\n--member\n");
}

// ============================================================================
// Diagnostics channel
// ============================================================================

#[test]
fn test_failures_reach_the_diagnostic_channel() {
    let mut table = SymbolTable::new();
    table.insert(Symbol::new("dup")).unwrap();
    let _ = table.insert(Symbol::new("dup"));
    let _ = table.open_context(Some("missing"));
    let _ = table.close_context();

    let diagnostics = table.take_diagnostics();
    assert_eq!(diagnostics.error_count(), 3);
    let texts: Vec<String> = diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.to_string())
        .collect();
    assert!(texts[0].contains("'dup' is already defined"), "{:?}", texts);
    assert!(texts[1].contains("symbol 'missing' is not defined"), "{:?}", texts);
    assert!(texts[2].contains("outermost scope"), "{:?}", texts);
    assert!(table.diagnostics().is_empty(), "take must drain the collection");
}
