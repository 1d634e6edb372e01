//! Property tests for the type lattice

use proptest::prelude::*;
use semantic::{NoSubtyping, Type};

fn primitive() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::BOOL),
        Just(Type::CHAR),
        Just(Type::BYTE),
        Just(Type::INT),
        Just(Type::FLOAT),
        Just(Type::DOUBLE),
    ]
}

fn leaf() -> impl Strategy<Value = Type> {
    prop_oneof![
        4 => primitive(),
        1 => "[A-C]".prop_map(|name| Type::class(name.as_str().into())),
    ]
}

/// Concrete types: no error or unresolved types anywhere
fn concrete() -> impl Strategy<Value = Type> {
    leaf().prop_recursive(3, 16, 1, |inner| inner.prop_map(Type::list))
}

proptest! {
    #[test]
    fn compatibility_is_symmetric(a in primitive(), b in primitive()) {
        prop_assert_eq!(a.compatible_with(&b), b.compatible_with(&a));
    }

    #[test]
    fn common_type_is_the_wider(a in primitive(), b in primitive()) {
        if let Some(common) = a.common_type(&b) {
            prop_assert!(a.widens_to(&common));
            prop_assert!(b.widens_to(&common));
        } else {
            prop_assert!(!a.compatible_with(&b));
        }
    }

    #[test]
    fn assignability_is_reflexive(ty in concrete()) {
        prop_assert!(ty.assignable_to(&ty, &NoSubtyping));
    }

    #[test]
    fn lists_are_covariant(a in concrete(), b in concrete()) {
        let lists = Type::list(a.clone()).assignable_to(&Type::list(b.clone()), &NoSubtyping);
        prop_assert_eq!(lists, a.assignable_to(&b, &NoSubtyping));
    }

    #[test]
    fn lists_only_go_into_lists(elem in concrete(), target in leaf()) {
        prop_assert!(!Type::list(elem.clone()).assignable_to(&target, &NoSubtyping));
        prop_assert!(!target.assignable_to(&Type::list(elem), &NoSubtyping));
    }

    #[test]
    fn errors_are_assignable_both_ways(ty in concrete()) {
        prop_assert!(Type::Error.assignable_to(&ty, &NoSubtyping));
        prop_assert!(ty.assignable_to(&Type::Error, &NoSubtyping));
        prop_assert!(!Type::Unresolved.assignable_to(&ty, &NoSubtyping));
        prop_assert!(!ty.assignable_to(&Type::Unresolved, &NoSubtyping));
    }

    #[test]
    fn widening_never_reaches_bool(ty in primitive()) {
        prop_assert_eq!(ty.widens_to(&Type::BOOL), ty == Type::BOOL);
    }
}
