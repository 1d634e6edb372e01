use crate::{Position, Span, Spanned};

fn span(l1: u32, c1: u32, l2: u32, c2: u32) -> Span {
    Span::new(Position::new(l1, c1), Position::new(l2, c2))
}

#[test]
fn join_covers_both() {
    let a = span(3, 1, 3, 9);
    let b = span(1, 5, 2, 2);
    let j = a.join(&b);
    assert!(j.contains(&a));
    assert!(j.contains(&b));
    assert_eq!(j, b.join(&a));
}

#[test]
fn reversed_positions_are_ordered() {
    let s = Span::new(Position::new(4, 2), Position::new(1, 1));
    assert_eq!(s.start, Position::new(1, 1));
    assert_eq!(s.end, Position::new(4, 2));
}

#[test]
fn before_and_contains() {
    let outer = span(1, 1, 10, 1);
    let first = span(2, 1, 2, 5);
    let second = span(2, 7, 2, 9);

    assert!(first.is_before(&second));
    assert!(!second.is_before(&first));
    assert!(outer.contains(&first));
    assert!(!first.contains(&outer));
}

#[test]
fn display_uses_start() {
    assert_eq!(span(7, 3, 8, 1).to_string(), "[7:3]");
    assert!(Span::dummy().is_dummy());
}

#[test]
fn spanned_compares_values() {
    let a = Spanned::new(4, span(1, 1, 1, 2));
    let b = Spanned::new(4, span(9, 1, 9, 2));
    assert_eq!(a, b);
    assert_eq!(*a + 1, 5);
}
