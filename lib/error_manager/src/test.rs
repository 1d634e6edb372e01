use crate::{Category, ErrorManager, Severity, Span, StringError};

fn err(msg: &'static str, category: Category) -> StringError {
    StringError { msg: msg.into(), category, span: Span::point(2, 5) }
}

#[test]
fn counts_per_category() {
    let mut em = ErrorManager::new();
    em.emit_error(err("a", Category::Scope));
    em.emit_error(err("b", Category::Type));
    em.emit_error(err("c", Category::Scope));
    em.report(Severity::Warning, err("d", Category::Semantic));

    assert_eq!(em.n_errors(), 3);
    assert_eq!(em.n_warnings(), 1);
    assert_eq!(em.count_in(Category::Scope), 2);
    assert_eq!(em.count_in(Category::Modifier), 0);
}

#[test]
fn halting_policy() {
    let mut em = ErrorManager::new();
    assert!(!em.should_halt());
    em.emit_warning(err("w", Category::Semantic));
    assert!(!em.should_halt());
    em.emit_error(err("e", Category::Type));
    assert!(em.should_halt());

    let mut limited = ErrorManager::with_error_limit(2);
    limited.emit_error(err("e", Category::Type));
    assert!(!limited.should_halt());
    limited.emit_error(err("e", Category::Type));
    assert!(limited.should_halt());

    limited.set_error_limit(Some(3));
    assert_eq!(limited.error_limit(), Some(3));
    assert!(!limited.should_halt());
    limited.set_error_limit(None);
    assert!(limited.should_halt());
}

#[test]
fn printed_format() {
    let mut em = ErrorManager::new();
    em.emit_error(err("use of undeclared name 'x'", Category::Scope));
    let mut out = Vec::new();
    em.print_errors(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "ERROR [2:5] (scope): use of undeclared name 'x'\n"
    );
}
