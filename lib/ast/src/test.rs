use core::str::FromStr;

use span::{Span, Spanned};

use crate::ops::{BinaryOperator, OperatorClass, UnaryOperator};
use crate::{Ident, LitValue, Modifier, Modifiers, NodeKind, Tree, TreeError};

fn sp(col: u32) -> Span { Span::point(1, col) }

fn int_ty(tree: &mut Tree) -> crate::NodeId {
    tree.type_name("int", sp(1)).unwrap()
}

#[test]
fn binary_operator_table() {
    assert_eq!(BinaryOperator::ALL.len(), 22);
    for (i, (op, text, class)) in BinaryOperator::ALL.iter().enumerate() {
        assert_eq!(*op as usize, i);
        assert_eq!(op.as_str(), *text);
        assert_eq!(op.class(), *class);
        assert_eq!(BinaryOperator::from_str(text), Ok(*op));
        assert_eq!(op.to_string(), *text);
    }
    assert_eq!(BinaryOperator::from_str(">>>"), Ok(BinaryOperator::UShr));
    assert_eq!(BinaryOperator::Is.class(), OperatorClass::TypeTest);
    assert!(BinaryOperator::from_str("<>").is_err());
    assert_eq!(UnaryOperator::from_str("~"), Ok(UnaryOperator::BitNot));
}

#[test]
fn modifiers_set() {
    let mods: Modifiers = [Modifier::Public, Modifier::Const].into_iter().collect();
    assert!(mods.contains(Modifier::Const));
    assert!(mods.contains(Modifier::Public));
    assert!(!mods.contains(Modifier::Static));
    assert_eq!(mods.iter().collect::<Vec<_>>(), [Modifier::Const, Modifier::Public]);
    assert!(Modifiers::NONE.is_empty());
    assert_eq!(format!("{mods:?}"), r#"{"const", "public"}"#);
}

#[test]
fn parent_links() {
    let mut tree = Tree::new();
    let one = tree.literal(LitValue::Int(1), sp(1)).unwrap();
    let two = tree.literal(LitValue::Int(2), sp(5)).unwrap();
    let sum = tree
        .binary(one, Spanned::new(BinaryOperator::Add, sp(3)), two, sp(1))
        .unwrap();
    let stmt = tree.expr_stmt(sum, sp(1)).unwrap();
    let block = tree.block([stmt], sp(1)).unwrap();

    let one = tree.node(one);
    assert_eq!(one.parent().map(|p| p.id()), Some(sum));
    assert_eq!(one.index_in_parent(), Some(0));
    assert_eq!(tree.node(two).index_in_parent(), Some(2));

    let ancestors: Vec<_> = one.ancestors().map(|n| n.id()).collect();
    assert_eq!(ancestors, [sum, stmt, block]);

    let enclosing = one.enclosing(|k| matches!(k, NodeKind::Block));
    assert_eq!(enclosing.map(|n| n.id()), Some(block));

    let sum = tree.node(sum);
    assert_eq!(sum.child(1).and_then(|n| n.op_str()), Some("+"));
    assert_eq!(sum.present_children().count(), 3);
}

#[test]
fn every_child_appears_once() {
    let mut tree = Tree::new();
    let cond = tree.literal(LitValue::Bool(true), sp(7)).unwrap();
    let stop = tree.stop(sp(13)).unwrap();
    let body = tree.block([stop], sp(12)).unwrap();
    let w = tree.while_stmt(cond, None, body, sp(1)).unwrap();
    let main = tree.block([w], sp(1)).unwrap();
    let ret = int_ty(&mut tree);
    let func = tree
        .func_decl(Ident::new("main", sp(5)), Modifiers::NONE, [], ret, main, sp(1))
        .unwrap();
    let prog = tree.program([func], sp(1)).unwrap();
    tree.set_root(prog).unwrap();

    for node in tree.iter() {
        if let Some(parent) = node.parent() {
            let times = parent.present_children().filter(|c| *c == node).count();
            assert_eq!(times, 1, "{node:?}");
            assert!(!node.ancestors().any(|a| a == node));
        } else {
            assert!(node.is_root());
        }
    }
    assert_eq!(tree.root().map(|r| r.id()), Some(prog));
}

#[test]
fn while_without_step() {
    let mut tree = Tree::new();
    let cond = tree.ident("running", sp(7)).unwrap();
    let body = tree.block([], sp(16)).unwrap();
    let w = tree.while_stmt(cond, None, body, sp(1)).unwrap();

    let w = tree.node(w);
    assert_eq!(w.n_children(), 3);
    assert!(w.child(1).is_none());
    assert_eq!(w.children().filter(Option::is_none).count(), 1);
    assert_eq!(tree.node(body).n_children(), 0);
}

#[test]
fn attach_misuse() {
    let mut tree = Tree::new();
    let x = tree.ident("x", sp(1)).unwrap();
    let stmt = tree.expr_stmt(x, sp(1)).unwrap();

    /* x already belongs to stmt */
    let err = tree.expr_stmt(x, sp(2)).unwrap_err();
    assert_eq!(err, TreeError::AlreadyAttached { child: x, parent: stmt });
    assert_eq!(tree.node(x).parent().map(|p| p.id()), Some(stmt));

    /* A complete node takes no more children */
    let y = tree.ident("y", sp(3)).unwrap();
    assert_eq!(
        tree.attach_child(stmt, Some(y)),
        Err(TreeError::ShapeComplete { kind: "ExprStmt" })
    );
    assert!(tree.node(y).parent().is_none());

    /* Expressions can't go into a block */
    let block = tree.block([], sp(4)).unwrap();
    assert!(matches!(
        tree.attach_child(block, Some(y)),
        Err(TreeError::WrongFamily { slot: 0, found: "Ident", .. })
    ));

    /* A block inside itself */
    assert_eq!(
        tree.attach_child(block, Some(block)),
        Err(TreeError::Cycle { parent: block, child: block })
    );

    /* A block inside one of its descendants */
    let inner = tree.block([], sp(5)).unwrap();
    tree.attach_child(block, Some(inner)).unwrap();
    let outer = block;
    let err = tree.attach_child(inner, Some(outer)).unwrap_err();
    assert_eq!(err, TreeError::Cycle { parent: inner, child: outer });

    /* Required slots can't be absent */
    let cond = tree.literal(LitValue::Bool(true), sp(6)).unwrap();
    let err = tree.alloc(NodeKind::While, sp(6), [Some(cond), None, None]).unwrap_err();
    assert_eq!(err, TreeError::MissingChild { kind: "While", slot: 2 });
    assert!(tree.node(cond).parent().is_none(), "failed alloc must release its children");
}

#[test]
fn failed_operator_build() {
    let mut tree = Tree::new();
    let one = tree.literal(LitValue::Int(1), sp(1)).unwrap();
    let stmt = tree.expr_stmt(one, sp(1)).unwrap();
    let two = tree.literal(LitValue::Int(2), sp(5)).unwrap();
    let len = tree.len();

    let err = tree
        .binary(one, Spanned::new(BinaryOperator::Add, sp(3)), two, sp(1))
        .unwrap_err();
    assert_eq!(err, TreeError::AlreadyAttached { child: one, parent: stmt });
    assert_eq!(tree.len(), len);

    let err = tree
        .unary(Spanned::new(UnaryOperator::Not, sp(2)), one, sp(2))
        .unwrap_err();
    assert_eq!(err, TreeError::AlreadyAttached { child: one, parent: stmt });
    assert_eq!(tree.len(), len);

    /* Every node but the statement has a parent */
    assert!(tree.iter().all(|n| n.id() == stmt || n.parent().is_some()));
    assert!(tree.node(two).parent().is_none());
}

#[test]
fn root_rules() {
    let mut tree = Tree::new();
    let block = tree.block([], sp(1)).unwrap();
    assert_eq!(tree.set_root(block), Err(TreeError::RootNotProgram));

    let prog = tree.program([], sp(1)).unwrap();
    tree.set_root(prog).unwrap();

    let ty = int_ty(&mut tree);
    let decl = tree
        .var_decl(Modifiers::NONE, [Ident::new("a", sp(5))], ty, None, sp(1))
        .unwrap();
    tree.attach_child(prog, Some(decl)).unwrap();
    assert_eq!(tree.node(decl).parent().map(|p| p.id()), Some(prog));

    let other = tree.program([], sp(1)).unwrap();
    let class = tree.class_decl(Ident::new("A", sp(1)), None, [], sp(1)).unwrap();
    assert!(matches!(
        tree.attach_child(class, Some(prog)),
        Err(TreeError::AttachRoot)
    ));
    assert!(tree.node(other).parent().is_none());
}

#[test]
fn var_decl_pads_initializer() {
    let mut tree = Tree::new();
    let ty = int_ty(&mut tree);
    let decl = tree
        .var_decl(
            Modifiers::of(Modifier::Static),
            vec![Ident::new("a", sp(5)), Ident::new("b", sp(8))],
            ty,
            None,
            sp(1),
        )
        .unwrap();
    let decl = tree.node(decl);
    assert_eq!(decl.n_children(), 2);
    assert!(decl.child(1).is_none());
    let NodeKind::VarDecl { names, modifiers } = decl.kind() else {
        panic!("expected a VarDecl, found {:?}", decl.kind())
    };
    assert_eq!(names.len(), 2);
    assert!(modifiers.contains(Modifier::Static));
}
