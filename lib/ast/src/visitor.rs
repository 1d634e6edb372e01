//! Visitor dispatch
//!
//! Every compiler pass is a [Visitor]. [`accept`] looks at the runtime
//! kind of a node and calls the matching `visit_*` operation, handing it
//! the node itself plus its children, already destructured by slot.
//!
//! The operations decide how to traverse. They can descend into every
//! child with [`walk_children`], visit just some of them through
//! [`accept`], or not descend at all.
//!
//! There's no silent default: an operation that a pass doesn't override
//! fails with [`DispatchError::Unsupported`].

use core::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use span::Span;
use thiserror::Error;

use crate::kind::NodeKind;
use crate::ops::{BinaryOperator, UnaryOperator};
use crate::tree::{Node, NodeList};
use crate::{Ident, LitValue, Modifiers, Symbol};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{span}: this pass doesn't handle {kind} nodes")]
    Unsupported { kind: &'static str, span: Span },
    #[error("{span}: malformed {kind} node")]
    Malformed { kind: &'static str, span: Span },
}

impl DispatchError {
    pub fn unsupported(node: Node<'_>) -> Self {
        Self::Unsupported { kind: node.kind().name(), span: node.span() }
    }

    pub fn malformed(node: Node<'_>) -> Self {
        Self::Malformed { kind: node.kind().name(), span: node.span() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unsupported { kind, .. } | Self::Malformed { kind, .. } => kind,
        }
    }
}

/// The traversal was abandoned because its [`CancelFlag`] was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("traversal cancelled")]
pub struct Cancelled;

/// Shared flag used to ask a running compilation to stop
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed); }

    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

fn unsupported<R: VisitorResult>(base: Node<'_>) -> R {
    R::dispatch_failed(DispatchError::unsupported(base))
}

pub trait Visitor<'ast> {
    type Result: VisitorResult;
    type Ctx: VisitorCtx<'ast>;

    fn get_ctx(&mut self) -> &mut Self::Ctx;

    fn visit_program(&mut self, base: Node<'ast>, _decls: NodeList<'ast>) -> Self::Result {
        unsupported(base)
    }

    fn visit_var_decl(
        &mut self,
        base: Node<'ast>,
        _modifiers: Modifiers,
        _names: &'ast [Ident],
        _ty: Node<'ast>,
        _init: Option<Node<'ast>>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_func_decl(
        &mut self,
        base: Node<'ast>,
        _name: &'ast Ident,
        _modifiers: Modifiers,
        _params: NodeList<'ast>,
        _ret_ty: Node<'ast>,
        _body: Node<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_class_decl(
        &mut self,
        base: Node<'ast>,
        _name: &'ast Ident,
        _superclass: Option<&'ast Ident>,
        _members: NodeList<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_unary(
        &mut self,
        base: Node<'ast>,
        _op: UnaryOperator,
        _operand: Node<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_binary(
        &mut self,
        base: Node<'ast>,
        _left: Node<'ast>,
        _op: BinaryOperator,
        _right: Node<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_literal(&mut self, base: Node<'ast>, _lit: &'ast LitValue) -> Self::Result {
        unsupported(base)
    }

    fn visit_ident(&mut self, base: Node<'ast>, _name: Symbol) -> Self::Result {
        unsupported(base)
    }

    fn visit_call(
        &mut self,
        base: Node<'ast>,
        _callee: &'ast Ident,
        _args: NodeList<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_new(&mut self, base: Node<'ast>, _class: &'ast Ident) -> Self::Result {
        unsupported(base)
    }

    fn visit_member(
        &mut self,
        base: Node<'ast>,
        _object: Node<'ast>,
        _field: &'ast Ident,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_index(
        &mut self,
        base: Node<'ast>,
        _list: Node<'ast>,
        _index: Node<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_list_lit(&mut self, base: Node<'ast>, _elems: NodeList<'ast>) -> Self::Result {
        unsupported(base)
    }

    fn visit_block(&mut self, base: Node<'ast>, _stmts: NodeList<'ast>) -> Self::Result {
        unsupported(base)
    }

    fn visit_while(
        &mut self,
        base: Node<'ast>,
        _cond: Node<'ast>,
        _step: Option<Node<'ast>>,
        _body: Node<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_if(
        &mut self,
        base: Node<'ast>,
        _cond: Node<'ast>,
        _then: Node<'ast>,
        _els: Option<Node<'ast>>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_stop(&mut self, base: Node<'ast>) -> Self::Result { unsupported(base) }

    fn visit_return(&mut self, base: Node<'ast>, _value: Option<Node<'ast>>) -> Self::Result {
        unsupported(base)
    }

    fn visit_expr_stmt(&mut self, base: Node<'ast>, _expr: Node<'ast>) -> Self::Result {
        unsupported(base)
    }

    fn visit_assign(
        &mut self,
        base: Node<'ast>,
        _target: Node<'ast>,
        _value: Node<'ast>,
    ) -> Self::Result {
        unsupported(base)
    }

    fn visit_unary_op(&mut self, base: Node<'ast>, _op: UnaryOperator) -> Self::Result {
        unsupported(base)
    }

    fn visit_binary_op(&mut self, base: Node<'ast>, _op: BinaryOperator) -> Self::Result {
        unsupported(base)
    }

    fn visit_type_name(&mut self, base: Node<'ast>, _name: Symbol) -> Self::Result {
        unsupported(base)
    }

    fn visit_list_type(&mut self, base: Node<'ast>, _elem: Node<'ast>) -> Self::Result {
        unsupported(base)
    }
}

/// Propagates the failure of a visitor operation
///
/// Evaluates to the output of the operation if it succeeded. Otherwise,
/// returns the failure from the enclosing function.
#[macro_export]
macro_rules! try_visit {
    ($e:expr) => {
        match $crate::visitor::VisitorResult::branch($e) {
            ::core::ops::ControlFlow::Continue(c) => c,
            ::core::ops::ControlFlow::Break(b) => {
                return $crate::visitor::VisitorResult::from_residual(b);
            }
        }
    };
}

/// Calls the `visit_*` operation of `v` that matches the kind of `node`
pub fn accept<'ast, V>(v: &mut V, node: Node<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    tracing::trace!(node = ?node, "dispatch");

    macro_rules! required {
        ($child:expr) => {
            match $child {
                Some(c) => c,
                None => return V::Result::dispatch_failed(DispatchError::malformed(node)),
            }
        };
    }

    match node.kind() {
        NodeKind::Program => v.visit_program(node, node.list_from(0)),
        NodeKind::VarDecl { modifiers, names } => {
            v.visit_var_decl(node, *modifiers, names, required!(node.child(0)), node.child(1))
        }
        NodeKind::FuncDecl { name, modifiers } => {
            let ret_ty = required!(node.child(0));
            let body = required!(node.child(1));
            v.visit_func_decl(node, name, *modifiers, node.list_from(2), ret_ty, body)
        }
        NodeKind::ClassDecl { name, superclass } => {
            v.visit_class_decl(node, name, superclass.as_ref(), node.list_from(0))
        }
        NodeKind::Unary => {
            let op = required!(node.child(0).and_then(Node::unary_op));
            v.visit_unary(node, op, required!(node.child(1)))
        }
        NodeKind::Binary => {
            let left = required!(node.child(0));
            let op = required!(node.child(1).and_then(Node::binary_op));
            v.visit_binary(node, left, op, required!(node.child(2)))
        }
        NodeKind::Literal(lit) => v.visit_literal(node, lit),
        NodeKind::Ident(name) => v.visit_ident(node, *name),
        NodeKind::Call { callee } => v.visit_call(node, callee, node.list_from(0)),
        NodeKind::New { class } => v.visit_new(node, class),
        NodeKind::Member { field } => v.visit_member(node, required!(node.child(0)), field),
        NodeKind::Index => {
            let list = required!(node.child(0));
            v.visit_index(node, list, required!(node.child(1)))
        }
        NodeKind::ListLit => v.visit_list_lit(node, node.list_from(0)),
        NodeKind::Block => v.visit_block(node, node.list_from(0)),
        NodeKind::While => {
            let cond = required!(node.child(0));
            let body = required!(node.child(2));
            v.visit_while(node, cond, node.child(1), body)
        }
        NodeKind::If => {
            let cond = required!(node.child(0));
            let then = required!(node.child(1));
            v.visit_if(node, cond, then, node.child(2))
        }
        NodeKind::Stop => v.visit_stop(node),
        NodeKind::Return => v.visit_return(node, node.child(0)),
        NodeKind::ExprStmt => v.visit_expr_stmt(node, required!(node.child(0))),
        NodeKind::Assign => {
            let target = required!(node.child(0));
            v.visit_assign(node, target, required!(node.child(1)))
        }
        NodeKind::UnaryOp(op) => v.visit_unary_op(node, *op),
        NodeKind::BinaryOp(op) => v.visit_binary_op(node, *op),
        NodeKind::TypeName(name) => v.visit_type_name(node, *name),
        NodeKind::ListType => v.visit_list_type(node, required!(node.child(0))),
    }
}

/// Visits every present child of `node`, in order
///
/// Checks for cancellation before each child.
pub fn walk_children<'ast, V>(v: &mut V, node: Node<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    for child in node.present_children() {
        try_visit!(walk_cancellable(v, child));
    }
    V::Result::output()
}

/// Visits every present node of the list, in order
pub fn walk_list<'ast, V>(v: &mut V, list: NodeList<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    for node in list.iter() {
        try_visit!(walk_cancellable(v, node));
    }
    V::Result::output()
}

/// Visits `node` if it's present
pub fn walk_opt<'ast, V>(v: &mut V, node: Option<Node<'ast>>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    match node {
        Some(node) => accept(v, node),
        None => V::Result::output(),
    }
}

fn walk_cancellable<'ast, V>(v: &mut V, node: Node<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    if v.get_ctx().is_cancelled() {
        tracing::warn!(node = ?node, "traversal cancelled");
        return V::Result::cancelled();
    }
    accept(v, node)
}

/// Walks the children of a function declaration, notifying
/// the context that we're inside it
pub fn walk_func_decl<'ast, V>(v: &mut V, base: Node<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    v.get_ctx().enter_function(base);
    let result = walk_children(v, base);
    v.get_ctx().exit_function();
    result
}

pub fn walk_class_decl<'ast, V>(v: &mut V, base: Node<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    v.get_ctx().enter_class(base);
    let result = walk_children(v, base);
    v.get_ctx().exit_class();
    result
}

pub fn walk_while<'ast, V>(v: &mut V, base: Node<'ast>) -> V::Result
where
    V: Visitor<'ast> + ?Sized,
{
    v.get_ctx().enter_loop(base);
    let result = walk_children(v, base);
    v.get_ctx().exit_loop();
    result
}

/// The value returned by [Visitor] operations
///
/// Passes that can fail use [Result], and passes that search for
/// something can use [`ControlFlow`], breaking when they find it.
pub trait VisitorResult {
    type T;
    type Residual;

    fn output() -> Self;
    fn from_residual(residual: Self::Residual) -> Self;
    fn from_branch(b: ControlFlow<Self::Residual, Self::T>) -> Self;
    fn branch(self) -> ControlFlow<Self::Residual, Self::T>;

    /// Builds the result for a node the visitor couldn't dispatch
    fn dispatch_failed(err: DispatchError) -> Self;

    /// Builds the result for a traversal that was cancelled
    fn cancelled() -> Self;
}

impl<B, C> VisitorResult for ControlFlow<B, C>
where
    B: From<DispatchError> + From<Cancelled>,
    C: Default,
{
    type T = C;
    type Residual = B;

    fn output() -> Self { ControlFlow::Continue(C::default()) }

    fn from_residual(residual: Self::Residual) -> Self { ControlFlow::Break(residual) }

    fn from_branch(b: ControlFlow<Self::Residual, Self::T>) -> Self { b }

    fn branch(self) -> ControlFlow<Self::Residual, Self::T> { self }

    fn dispatch_failed(err: DispatchError) -> Self { ControlFlow::Break(err.into()) }

    fn cancelled() -> Self { ControlFlow::Break(Cancelled.into()) }
}

impl<T, E> VisitorResult for Result<T, E>
where
    T: Default,
    E: From<DispatchError> + From<Cancelled>,
{
    type T = T;
    type Residual = E;

    fn output() -> Self { Ok(T::default()) }

    fn from_residual(residual: Self::Residual) -> Self { Err(residual) }

    fn from_branch(b: ControlFlow<Self::Residual, Self::T>) -> Self {
        match b {
            ControlFlow::Continue(c) => Ok(c),
            ControlFlow::Break(b) => Err(b),
        }
    }

    fn branch(self) -> ControlFlow<Self::Residual, Self::T> {
        match self {
            Ok(t) => ControlFlow::Continue(t),
            Err(err) => ControlFlow::Break(err),
        }
    }

    fn dispatch_failed(err: DispatchError) -> Self { Err(err.into()) }

    fn cancelled() -> Self { Err(Cancelled.into()) }
}

/// Context kept by a visitor while it walks the tree
pub trait VisitorCtx<'ast> {
    fn enter_function(&mut self, _func: Node<'ast>) {}
    fn exit_function(&mut self) {}

    fn enter_class(&mut self, _class: Node<'ast>) {}
    fn exit_class(&mut self) {}

    fn enter_loop(&mut self, _lp: Node<'ast>) {}
    fn exit_loop(&mut self) {}

    fn is_cancelled(&self) -> bool { false }
}

impl VisitorCtx<'_> for () {}

/// A [`VisitorCtx`] that keeps track of the enclosing
/// functions, classes and loops
#[derive(Debug, Default)]
pub struct BaseVisitorCtx<'ast> {
    funcs: Vec<Node<'ast>>,
    classes: Vec<Node<'ast>>,
    loops: Vec<Node<'ast>>,
    cancel: Option<CancelFlag>,
}

impl<'ast> BaseVisitorCtx<'ast> {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn current_function(&self) -> Option<Node<'ast>> { self.funcs.last().copied() }

    pub fn current_class(&self) -> Option<Node<'ast>> { self.classes.last().copied() }

    pub fn innermost_loop(&self) -> Option<Node<'ast>> { self.loops.last().copied() }

    pub fn in_loop(&self) -> bool { !self.loops.is_empty() }
}

impl<'ast> VisitorCtx<'ast> for BaseVisitorCtx<'ast> {
    fn enter_function(&mut self, func: Node<'ast>) { self.funcs.push(func); }

    fn exit_function(&mut self) {
        let popped = self.funcs.pop();
        debug_assert!(popped.is_some(), "exit_function without a matching enter");
    }

    fn enter_class(&mut self, class: Node<'ast>) { self.classes.push(class); }

    fn exit_class(&mut self) {
        let popped = self.classes.pop();
        debug_assert!(popped.is_some(), "exit_class without a matching enter");
    }

    fn enter_loop(&mut self, lp: Node<'ast>) { self.loops.push(lp); }

    fn exit_loop(&mut self) {
        let popped = self.loops.pop();
        debug_assert!(popped.is_some(), "exit_loop without a matching enter");
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}
