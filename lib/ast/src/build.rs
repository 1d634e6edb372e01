//! Construction helpers
//!
//! One method per node kind, so trees can be built without spelling
//! out the slot layout of every kind. Operator children are built as
//! leaves from the operator tag and its span. Like [`Tree::alloc`], a
//! failed build leaves the tree as it was, operator leaf included.

use span::{Span, Spanned};

use crate::ops::{BinaryOperator, UnaryOperator};
use crate::tree::{NodeId, Tree, TreeError};
use crate::{Ident, LitValue, Modifiers, NodeKind, Symbol};

type BuildResult = Result<NodeId, TreeError>;

const NO_CHILDREN: [Option<NodeId>; 0] = [];

fn all(ids: impl IntoIterator<Item = NodeId>) -> impl Iterator<Item = Option<NodeId>> {
    ids.into_iter().map(Some)
}

impl Tree {
    pub fn program(&mut self, decls: impl IntoIterator<Item = NodeId>, span: Span) -> BuildResult {
        self.alloc(NodeKind::Program, span, all(decls))
    }

    pub fn var_decl(
        &mut self,
        modifiers: Modifiers,
        names: impl Into<Box<[Ident]>>,
        ty: NodeId,
        init: Option<NodeId>,
        span: Span,
    ) -> BuildResult {
        let kind = NodeKind::VarDecl { modifiers, names: names.into() };
        self.alloc(kind, span, [Some(ty), init])
    }

    pub fn func_decl(
        &mut self,
        name: Ident,
        modifiers: Modifiers,
        params: impl IntoIterator<Item = NodeId>,
        ret_ty: NodeId,
        body: NodeId,
        span: Span,
    ) -> BuildResult {
        let children = [Some(ret_ty), Some(body)].into_iter().chain(all(params));
        self.alloc(NodeKind::FuncDecl { name, modifiers }, span, children)
    }

    pub fn class_decl(
        &mut self,
        name: Ident,
        superclass: Option<Ident>,
        members: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> BuildResult {
        self.alloc(NodeKind::ClassDecl { name, superclass }, span, all(members))
    }

    pub fn unary(&mut self, op: Spanned<UnaryOperator>, operand: NodeId, span: Span) -> BuildResult {
        let op = self.alloc(NodeKind::UnaryOp(op.val), op.span, NO_CHILDREN)?;
        self.alloc(NodeKind::Unary, span, [Some(op), Some(operand)])
            .inspect_err(|_| self.discard(op))
    }

    pub fn binary(
        &mut self,
        left: NodeId,
        op: Spanned<BinaryOperator>,
        right: NodeId,
        span: Span,
    ) -> BuildResult {
        let op = self.alloc(NodeKind::BinaryOp(op.val), op.span, NO_CHILDREN)?;
        self.alloc(NodeKind::Binary, span, [Some(left), Some(op), Some(right)])
            .inspect_err(|_| self.discard(op))
    }

    pub fn literal(&mut self, value: LitValue, span: Span) -> BuildResult {
        self.alloc(NodeKind::Literal(value), span, NO_CHILDREN)
    }

    pub fn ident(&mut self, name: impl Into<Symbol>, span: Span) -> BuildResult {
        self.alloc(NodeKind::Ident(name.into()), span, NO_CHILDREN)
    }

    pub fn call(
        &mut self,
        callee: Ident,
        args: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> BuildResult {
        self.alloc(NodeKind::Call { callee }, span, all(args))
    }

    pub fn new_object(&mut self, class: Ident, span: Span) -> BuildResult {
        self.alloc(NodeKind::New { class }, span, NO_CHILDREN)
    }

    pub fn member(&mut self, object: NodeId, field: Ident, span: Span) -> BuildResult {
        self.alloc(NodeKind::Member { field }, span, [Some(object)])
    }

    pub fn index(&mut self, list: NodeId, index: NodeId, span: Span) -> BuildResult {
        self.alloc(NodeKind::Index, span, [Some(list), Some(index)])
    }

    pub fn list_lit(&mut self, elems: impl IntoIterator<Item = NodeId>, span: Span) -> BuildResult {
        self.alloc(NodeKind::ListLit, span, all(elems))
    }

    pub fn block(&mut self, stmts: impl IntoIterator<Item = NodeId>, span: Span) -> BuildResult {
        self.alloc(NodeKind::Block, span, all(stmts))
    }

    pub fn while_stmt(
        &mut self,
        cond: NodeId,
        step: Option<NodeId>,
        body: NodeId,
        span: Span,
    ) -> BuildResult {
        self.alloc(NodeKind::While, span, [Some(cond), step, Some(body)])
    }

    pub fn if_stmt(
        &mut self,
        cond: NodeId,
        then: NodeId,
        els: Option<NodeId>,
        span: Span,
    ) -> BuildResult {
        self.alloc(NodeKind::If, span, [Some(cond), Some(then), els])
    }

    pub fn stop(&mut self, span: Span) -> BuildResult {
        self.alloc(NodeKind::Stop, span, NO_CHILDREN)
    }

    pub fn return_stmt(&mut self, value: Option<NodeId>, span: Span) -> BuildResult {
        self.alloc(NodeKind::Return, span, [value])
    }

    pub fn expr_stmt(&mut self, expr: NodeId, span: Span) -> BuildResult {
        self.alloc(NodeKind::ExprStmt, span, [Some(expr)])
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId, span: Span) -> BuildResult {
        self.alloc(NodeKind::Assign, span, [Some(target), Some(value)])
    }

    pub fn type_name(&mut self, name: impl Into<Symbol>, span: Span) -> BuildResult {
        self.alloc(NodeKind::TypeName(name.into()), span, NO_CHILDREN)
    }

    pub fn list_type(&mut self, elem: NodeId, span: Span) -> BuildResult {
        self.alloc(NodeKind::ListType, span, [Some(elem)])
    }
}
