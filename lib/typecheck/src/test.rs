use ast::ops::BinaryOperator;
use ast::visitor::BaseVisitorCtx;
use ast::{Ident, LitValue, Modifier, Modifiers, Node, NodeId, NodeList, Tree, Visitor};
use error_manager::{Category, ErrorManager};
use semantic::errors::{SemanticError, SemanticErrorKind as K};
use semantic::{AnnotationError, PassError, Semantic, Type, TypeCastError, TypeState};
use span::{Span, Spanned};

/// Builds trees giving every node a different span
#[derive(Default)]
struct Builder {
    tree: Tree,
    col: u32,
}

impl Builder {
    fn sp(&mut self) -> Span {
        self.col += 1;
        Span::point(1, self.col)
    }

    fn name(&mut self, n: &str) -> Ident {
        let span = self.sp();
        Ident::new(n, span)
    }

    fn ty(&mut self, n: &str) -> NodeId {
        let span = self.sp();
        if let Some(elem) = n.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
            let elem = self.ty(elem);
            self.tree.list_type(elem, span).unwrap()
        } else {
            self.tree.type_name(n, span).unwrap()
        }
    }

    fn var_with(&mut self, modifiers: Modifiers, ty: &str, n: &str, init: Option<NodeId>) -> NodeId {
        let ty = self.ty(ty);
        let name = self.name(n);
        let span = self.sp();
        self.tree.var_decl(modifiers, [name], ty, init, span).unwrap()
    }

    fn var(&mut self, ty: &str, n: &str, init: Option<NodeId>) -> NodeId {
        self.var_with(Modifiers::NONE, ty, n, init)
    }

    fn lit(&mut self, value: LitValue) -> NodeId {
        let span = self.sp();
        self.tree.literal(value, span).unwrap()
    }

    fn int(&mut self, n: i64) -> NodeId { self.lit(LitValue::Int(n)) }

    fn id(&mut self, n: &str) -> NodeId {
        let span = self.sp();
        self.tree.ident(n, span).unwrap()
    }

    fn bin(&mut self, left: NodeId, op: BinaryOperator, right: NodeId) -> NodeId {
        let op = Spanned::new(op, self.sp());
        let span = self.sp();
        self.tree.binary(left, op, right, span).unwrap()
    }

    fn call(&mut self, callee: &str, args: Vec<NodeId>) -> NodeId {
        let callee = self.name(callee);
        let span = self.sp();
        self.tree.call(callee, args, span).unwrap()
    }

    fn expr(&mut self, expr: NodeId) -> NodeId {
        let span = self.sp();
        self.tree.expr_stmt(expr, span).unwrap()
    }

    fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        let span = self.sp();
        self.tree.assign(target, value, span).unwrap()
    }

    fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        let span = self.sp();
        self.tree.block(stmts, span).unwrap()
    }

    fn func(&mut self, ret: &str, n: &str, params: Vec<NodeId>, stmts: Vec<NodeId>) -> NodeId {
        let ret = self.ty(ret);
        let body = self.block(stmts);
        let name = self.name(n);
        let span = self.sp();
        self.tree.func_decl(name, Modifiers::NONE, params, ret, body, span).unwrap()
    }

    fn finish(mut self, decls: Vec<NodeId>) -> Tree {
        let span = self.sp();
        let prog = self.tree.program(decls, span).unwrap();
        self.tree.set_root(prog).unwrap();
        self.tree
    }
}

fn check(tree: &Tree) -> (Semantic, ErrorManager) {
    let sem = Semantic::new();
    let mut em = ErrorManager::new();
    identification::identify(tree, &sem, &mut em, None).unwrap();
    crate::check_types(tree, &sem, &mut em, None).unwrap();
    assert!(sem.unresolved_nodes().is_empty());
    (sem, em)
}

fn kinds(em: &ErrorManager) -> Vec<K> {
    em.errors_iterator_cast::<SemanticError>().map(|e| e.kind.clone()).collect()
}

#[test]
fn arithmetic_widening() {
    let mut b = Builder::default();
    let a = b.var("int", "a", None);
    let c = b.var("char", "c", None);
    let f = b.var("float", "f", None);

    let (l, r) = (b.id("a"), b.id("c"));
    let discrete = b.bin(l, BinaryOperator::Add, r);
    let s1 = b.expr(discrete);
    let (l, r) = (b.id("c"), b.id("f"));
    let scalar = b.bin(l, BinaryOperator::Add, r);
    let s2 = b.expr(scalar);

    let main = b.func("int", "main", vec![], vec![a, c, f, s1, s2]);
    let tree = b.finish(vec![main]);

    let (sem, em) = check(&tree);
    assert!(!em.has_errors());
    assert_eq!(sem.type_of(discrete), Some(Type::INT));
    assert_eq!(sem.type_of(scalar), Some(Type::FLOAT));
    assert_eq!(sem.type_of(a), Some(Type::INT));

    /* Resolved exactly once */
    assert_eq!(
        sem.resolve_type(discrete, Type::DOUBLE),
        Err(AnnotationError::AlreadyResolved { node: discrete, previous: Type::INT })
    );
}

#[test]
fn operand_mismatch() {
    let mut b = Builder::default();
    let t = b.lit(LitValue::Bool(true));
    let one = b.int(1);
    let bad = b.bin(t, BinaryOperator::Mul, one);
    let two = b.int(2);
    /* The error type doesn't cascade */
    let outer = b.bin(bad, BinaryOperator::Sub, two);
    let s = b.expr(outer);
    let main = b.func("int", "main", vec![], vec![s]);
    let tree = b.finish(vec![main]);

    let (sem, em) = check(&tree);
    assert_eq!(
        kinds(&em),
        [K::Binary { op: "*", left: Type::BOOL, right: Type::INT }]
    );
    assert_eq!(sem.type_of(bad), Some(Type::Error));
    assert_eq!(sem.type_of(outer), Some(Type::Error));
}

/// Reads the annotations left by the type checker,
/// expecting every variable to be a list
struct ListReader<'a, 'ast> {
    sem: &'a Semantic,
    ctx: BaseVisitorCtx<'ast>,
    seen: usize,
}

impl<'ast> Visitor<'ast> for ListReader<'_, 'ast> {
    type Result = Result<(), PassError>;
    type Ctx = BaseVisitorCtx<'ast>;

    fn get_ctx(&mut self) -> &mut Self::Ctx { &mut self.ctx }

    fn visit_program(&mut self, base: Node<'ast>, _decls: NodeList<'ast>) -> Self::Result {
        ast::visitor::walk_children(self, base)
    }

    fn visit_var_decl(
        &mut self,
        base: Node<'ast>,
        _modifiers: Modifiers,
        _names: &'ast [Ident],
        _ty: Node<'ast>,
        _init: Option<Node<'ast>>,
    ) -> Self::Result {
        let ty = self.sem.type_of(base.id()).unwrap_or(Type::Unresolved);
        ty.as_list_type()?;
        self.seen += 1;
        Ok(())
    }
}

#[test]
fn narrowing_aborts_the_pass() {
    let mut b = Builder::default();
    let elem = b.int(1);
    let span = b.sp();
    let list = b.tree.list_lit([elem], span).unwrap();
    let xs = b.var("[int]", "xs", Some(list));
    let half = b.lit(LitValue::Float(0.5));
    let f = b.var("double", "f", Some(half));
    let ys = b.var("[char]", "ys", None);
    let tree = b.finish(vec![xs, f, ys]);

    let (sem, em) = check(&tree);
    assert!(!em.has_errors());

    let mut reader = ListReader { sem: &sem, ctx: BaseVisitorCtx::new(), seen: 0 };
    let result = tree.root().unwrap().accept(&mut reader);
    assert_eq!(
        result,
        Err(PassError::TypeCast(TypeCastError::Mismatch { expected: "a list", found: Type::DOUBLE }))
    );
    /* Stopped at the first failure */
    assert_eq!(reader.seen, 1);

    assert_eq!(sem.type_of(xs), Some(Type::list(Type::INT)));
    assert_eq!(sem.type_of(list), Some(Type::list(Type::INT)));
    assert_eq!(sem.type_of(half), Some(Type::FLOAT));
    assert_eq!(sem.type_of(ys), Some(Type::list(Type::CHAR)));
}

#[test]
fn undeclared_in_loop_condition() {
    let mut b = Builder::default();
    let n = b.var("int", "n", None);
    let missing = b.id("missing");
    let zero = b.int(0);
    let cond = b.bin(missing, BinaryOperator::Lt, zero);
    let target = b.id("n");
    let one = b.int(1);
    let assign = b.assign(target, one);
    let body = b.block(vec![assign]);
    let span = b.sp();
    let lp = b.tree.while_stmt(cond, None, body, span).unwrap();
    let main = b.func("int", "main", vec![n], vec![lp]);
    let tree = b.finish(vec![main]);

    let (sem, em) = check(&tree);
    assert_eq!(em.n_errors(), 1);
    assert_eq!(em.count_in(Category::Scope), 1);
    assert_eq!(sem.type_of(missing), Some(Type::Error));
    assert_eq!(sem.type_of(cond), Some(Type::Error));
    assert_eq!(sem.type_of(target), Some(Type::INT));
    assert_eq!(sem.type_of(one), Some(Type::INT));
}

#[test]
fn conditions_must_be_boolean() {
    let mut b = Builder::default();
    let cond = b.int(1);
    let then = b.block(vec![]);
    let span = b.sp();
    let if_stmt = b.tree.if_stmt(cond, then, None, span).unwrap();

    let step = b.int(2);
    let cond = b.lit(LitValue::Bool(false));
    let body = b.block(vec![]);
    let span = b.sp();
    let lp = b.tree.while_stmt(cond, Some(step), body, span).unwrap();

    let main = b.func("int", "main", vec![], vec![if_stmt, lp]);
    let tree = b.finish(vec![main]);

    let (_, em) = check(&tree);
    assert_eq!(kinds(&em), [K::NonBooleanCondition("if")]);
    assert_eq!(em.count_in(Category::Type), 1);
}

#[test]
fn class_hierarchy() {
    let mut b = Builder::default();
    let legs = b.var("int", "legs", None);
    let name = b.name("Animal");
    let span = b.sp();
    let animal = b.tree.class_decl(name, None, [legs], span).unwrap();
    let (name, sup) = (b.name("Dog"), b.name("Animal"));
    let span = b.sp();
    let dog = b.tree.class_decl(name, Some(sup), [], span).unwrap();

    let class = b.name("Dog");
    let span = b.sp();
    let new_dog = b.tree.new_object(class, span).unwrap();
    let a = b.var("Animal", "a", Some(new_dog));

    let class = b.name("Animal");
    let span = b.sp();
    let new_animal = b.tree.new_object(class, span).unwrap();
    let d = b.var("Dog", "d", Some(new_animal));

    let object = b.id("d");
    let field = b.name("legs");
    let span = b.sp();
    let legs_access = b.tree.member(object, field, span).unwrap();
    let s1 = b.expr(legs_access);

    let object = b.id("a");
    let field = b.name("wings");
    let span = b.sp();
    let wings = b.tree.member(object, field, span).unwrap();
    let s2 = b.expr(wings);

    let main = b.func("int", "main", vec![], vec![a, d, s1, s2]);
    let tree = b.finish(vec![main, dog, animal]);

    let (sem, em) = check(&tree);
    assert_eq!(
        kinds(&em),
        [
            K::NotAssignable { from: Type::class("Animal".into()), to: Type::class("Dog".into()) },
            K::NonExistingField { class: "Animal".into(), field: "wings".into() },
        ]
    );
    assert_eq!(sem.type_of(new_dog), Some(Type::class("Dog".into())));
    assert_eq!(sem.type_of(legs_access), Some(Type::INT));
    assert_eq!(sem.type_of(wings), Some(Type::Error));
}

#[test]
fn type_tests() {
    let mut b = Builder::default();
    let name = b.name("Animal");
    let span = b.sp();
    let animal = b.tree.class_decl(name, None, [], span).unwrap();
    let (name, sup) = (b.name("Dog"), b.name("Animal"));
    let span = b.sp();
    let dog = b.tree.class_decl(name, Some(sup), [], span).unwrap();
    let name = b.name("Plant");
    let span = b.sp();
    let plant = b.tree.class_decl(name, None, [], span).unwrap();

    let a = b.var("Animal", "a", None);
    fn test(b: &mut Builder, value: NodeId, class: NodeId) -> (NodeId, NodeId) {
        let is = b.bin(value, BinaryOperator::Is, class);
        (is, b.expr(is))
    }

    let (value, class) = (b.id("a"), b.id("Dog"));
    let (is_dog, s1) = test(&mut b, value, class);
    let dog_operand = class;
    let (value, class) = (b.id("a"), b.id("Plant"));
    let (is_plant, s2) = test(&mut b, value, class);
    let (value, class) = (b.id("a"), b.id("Ghost"));
    let (is_ghost, s3) = test(&mut b, value, class);
    let (value, class) = (b.int(1), b.id("Dog"));
    let (_, s4) = test(&mut b, value, class);
    let value = b.id("a");
    let class = b.name("Dog");
    let span = b.sp();
    let object = b.tree.new_object(class, span).unwrap();
    let (is_object, s5) = test(&mut b, value, object);

    let main = b.func("int", "main", vec![], vec![a, s1, s2, s3, s4, s5]);
    let tree = b.finish(vec![animal, dog, plant, main]);

    let (sem, em) = check(&tree);
    let animal_ty = Type::class("Animal".into());
    let dog_ty = Type::class("Dog".into());
    assert_eq!(
        kinds(&em),
        [
            K::Binary { op: "is", left: animal_ty, right: Type::class("Plant".into()) },
            K::Binary { op: "is", left: Type::INT, right: dog_ty.clone() },
            K::TypeTestOperand,
        ]
    );
    /* Ghost is reported once, as an undeclared class */
    assert_eq!(em.count_in(Category::Scope), 1);

    assert_eq!(sem.type_of(is_dog), Some(Type::BOOL));
    assert_eq!(sem.symbol_of(dog_operand), Some(dog));
    assert_eq!(sem.type_of(dog_operand), Some(dog_ty));
    assert_eq!(sem.type_of(is_plant), Some(Type::Error));
    assert_eq!(sem.type_of(is_ghost), Some(Type::Error));
    assert_eq!(sem.type_of(is_object), Some(Type::Error));
}

#[test]
fn call_arguments() {
    let mut b = Builder::default();
    let x = b.var("int", "x", None);
    let y = b.var("double", "y", None);
    let (l, r) = (b.id("x"), b.id("y"));
    let sum = b.bin(l, BinaryOperator::Add, r);
    let span = b.sp();
    let ret = b.tree.return_stmt(Some(sum), span).unwrap();
    let add = b.func("double", "add", vec![x, y], vec![ret]);

    let (c, one) = (b.lit(LitValue::Char('c')), b.int(1));
    let ok = b.call("add", vec![one, c]);
    let s1 = b.expr(ok);
    let one = b.int(1);
    let few = b.call("add", vec![one]);
    let s2 = b.expr(few);
    let (one, t) = (b.int(1), b.lit(LitValue::Bool(true)));
    let wrong = b.call("add", vec![one, t]);
    let s3 = b.expr(wrong);
    let not_fn = b.call("x", vec![]);
    let s4 = b.expr(not_fn);
    let x = b.var("int", "x", None);

    let main = b.func("int", "main", vec![], vec![s1, s2, s3, x, s4]);
    let tree = b.finish(vec![main, add]);

    let (sem, em) = check(&tree);
    assert_eq!(
        kinds(&em),
        [
            K::MismatchedArgsNum { expected: 2, received: 1 },
            K::ArgumentType { index: 1, expected: Type::DOUBLE, found: Type::BOOL },
            K::NotAFunction("x".into()),
        ]
    );
    assert_eq!(sem.type_of(ok), Some(Type::DOUBLE));
    assert_eq!(sem.type_of(few), Some(Type::DOUBLE));
    assert_eq!(sem.type_of(not_fn), Some(Type::Error));
}

#[test]
fn returns() {
    let mut b = Builder::default();
    let t = b.lit(LitValue::Bool(true));
    let span = b.sp();
    let bad = b.tree.return_stmt(Some(t), span).unwrap();
    let span = b.sp();
    let empty = b.tree.return_stmt(None, span).unwrap();
    let c = b.lit(LitValue::Char('a'));
    let span = b.sp();
    let widened = b.tree.return_stmt(Some(c), span).unwrap();
    let f = b.func("int", "f", vec![], vec![bad, empty, widened]);
    let tree = b.finish(vec![f]);

    let (_, em) = check(&tree);
    assert_eq!(
        kinds(&em),
        [
            K::MismatchedReturn { expected: Type::INT, found: Some(Type::BOOL) },
            K::MismatchedReturn { expected: Type::INT, found: None },
        ]
    );
}

#[test]
fn stop_outside_loop() {
    let mut b = Builder::default();
    let span = b.sp();
    let outside = b.tree.stop(span).unwrap();
    let span = b.sp();
    let inside = b.tree.stop(span).unwrap();
    let body = b.block(vec![inside]);
    let cond = b.lit(LitValue::Bool(true));
    let span = b.sp();
    let lp = b.tree.while_stmt(cond, None, body, span).unwrap();
    let main = b.func("int", "main", vec![], vec![lp, outside]);
    let tree = b.finish(vec![main]);

    let (_, em) = check(&tree);
    assert_eq!(kinds(&em), [K::StopOutsideLoop]);
    let err = em.errors_iterator_cast::<SemanticError>().next().unwrap();
    assert_eq!(err.span, tree.node(outside).span());
    assert_eq!(em.count_in(Category::Semantic), 1);
}

#[test]
fn assignments() {
    let mut b = Builder::default();
    let init = b.int(1);
    let c = b.var_with(Modifier::Const.into(), "int", "c", Some(init));
    let l = b.var("[double]", "l", None);

    let (target, value) = (b.id("c"), b.int(2));
    let to_const = b.assign(target, value);
    let (target, value) = (b.int(1), b.int(2));
    let to_literal = b.assign(target, value);

    let (list, index) = (b.id("l"), b.int(0));
    let span = b.sp();
    let elem = b.tree.index(list, index, span).unwrap();
    let value = b.lit(LitValue::Char('x'));
    let widening = b.assign(elem, value);

    let (list, index) = (b.id("l"), b.lit(LitValue::Float(1.0)));
    let span = b.sp();
    let bad_index = b.tree.index(list, index, span).unwrap();
    let value = b.lit(LitValue::Bool(true));
    let narrowing = b.assign(bad_index, value);

    let main = b.func("int", "main", vec![], vec![c, l, to_const, to_literal, widening, narrowing]);
    let tree = b.finish(vec![main]);

    let (sem, em) = check(&tree);
    assert_eq!(
        kinds(&em),
        [
            K::AssignToConst("c".into()),
            K::LValue,
            K::NonIntegerIndex(Type::FLOAT),
            K::NotAssignable { from: Type::BOOL, to: Type::DOUBLE },
        ]
    );
    assert_eq!(em.count_in(Category::Modifier), 1);
    assert_eq!(sem.type_of(elem), Some(Type::DOUBLE));
}

#[test]
fn leftover_unresolved_nodes_are_reported() {
    let mut b = Builder::default();
    let main = b.func("int", "main", vec![], vec![]);
    /* Not attached to the tree, so no pass will visit it */
    let stray = b.int(3);
    let tree = b.finish(vec![main]);

    let sem = Semantic::new();
    let mut em = ErrorManager::new();
    identification::identify(&tree, &sem, &mut em, None).unwrap();
    sem.mark_unresolved(stray).unwrap();
    crate::check_types(&tree, &sem, &mut em, None).unwrap();

    assert_eq!(kinds(&em), [K::UnresolvedType]);
    assert_eq!(sem.type_state(stray), TypeState::Resolved(Type::Error));
}
