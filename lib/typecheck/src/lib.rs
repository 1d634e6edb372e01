//! Type checking
//!
//! Resolves the type of every expression of the program, and checks that
//! the types of every construct agree with each other.
//!
//! The tree is walked in post-order: the children of a node are resolved
//! before the node itself, so each [rule](semantic::rules) can read the
//! types of its operands from the [Semantic] tables.
//!
//! Type nodes and variable declarations are annotated too, with the type
//! they denote.

use ast::ops::{BinaryOperator, UnaryOperator};
use ast::visitor::{
    BaseVisitorCtx, CancelFlag, VisitorCtx, accept, walk_children, walk_class_decl, walk_list,
    walk_opt, walk_while,
};
use ast::{Ident, LitValue, Modifiers, Node, NodeKind, NodeList, Symbol, Tree, Visitor, try_visit};
use error_manager::ErrorManager;
use semantic::errors::{SemanticError, SemanticErrorKind};
use semantic::rules::expr::{
    ResolveIdent, ValidateBinary, ValidateCall, ValidateFieldAccess, ValidateIndex,
    ValidateListLit, ValidateUnary, literal_type,
};
use semantic::rules::stmt::{CheckReturnStmt, ValidateAssignment, ValidateCondition, ValidateVarDecl};
use semantic::rules::{RequireResolved, SemanticRule};
use semantic::{PassError, Semantic, Type, lower_type_node};

type PassResult = Result<(), PassError>;

/// Type checks the given tree
///
/// Any node that was marked as unresolved and still is after the
/// walk is reported, and resolved to [`Type::Error`].
#[tracing::instrument(skip_all)]
pub fn check_types(
    tree: &Tree,
    sem: &Semantic,
    em: &mut ErrorManager,
    cancel: Option<CancelFlag>,
) -> PassResult {
    let Some(root) = tree.root() else {
        tracing::warn!("type checking a tree without a root");
        return Ok(());
    };

    let ctx = match cancel {
        Some(flag) => BaseVisitorCtx::new().with_cancel_flag(flag),
        None => BaseVisitorCtx::new(),
    };
    let mut tc = TypeChecking { sem, em, ctx };
    root.accept(&mut tc)?;

    for node in sem.unresolved_nodes() {
        RequireResolved { node: tree.node(node) }.apply(sem, tc.em)?;
    }
    Ok(())
}

struct TypeChecking<'tc, 'ast> {
    sem: &'tc Semantic,
    em: &'tc mut ErrorManager,
    ctx: BaseVisitorCtx<'ast>,
}

impl<'ast> TypeChecking<'_, 'ast> {
    fn set_type(&self, node: Node<'ast>, ty: Type) -> PassResult {
        self.sem.resolve_type(node.id(), ty)?;
        Ok(())
    }

    fn visit_function_body(&mut self, params: NodeList<'ast>, body: Node<'ast>) -> PassResult {
        try_visit!(walk_list(self, params));
        accept(self, body)
    }
}

impl<'ast> Visitor<'ast> for TypeChecking<'_, 'ast> {
    type Result = PassResult;
    type Ctx = BaseVisitorCtx<'ast>;

    fn get_ctx(&mut self) -> &mut Self::Ctx { &mut self.ctx }

    fn visit_program(&mut self, _base: Node<'ast>, decls: NodeList<'ast>) -> Self::Result {
        walk_list(self, decls)
    }

    fn visit_var_decl(
        &mut self,
        base: Node<'ast>,
        _modifiers: Modifiers,
        _names: &'ast [Ident],
        ty: Node<'ast>,
        init: Option<Node<'ast>>,
    ) -> Self::Result {
        try_visit!(accept(self, ty));
        try_visit!(walk_opt(self, init));

        let ty = ValidateVarDecl { ty, init }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_func_decl(
        &mut self,
        base: Node<'ast>,
        _name: &'ast Ident,
        _modifiers: Modifiers,
        params: NodeList<'ast>,
        ret_ty: Node<'ast>,
        body: Node<'ast>,
    ) -> Self::Result {
        try_visit!(accept(self, ret_ty));

        self.ctx.enter_function(base);
        let result = self.visit_function_body(params, body);
        self.ctx.exit_function();
        result
    }

    fn visit_class_decl(
        &mut self,
        base: Node<'ast>,
        _name: &'ast Ident,
        _superclass: Option<&'ast Ident>,
        _members: NodeList<'ast>,
    ) -> Self::Result {
        walk_class_decl(self, base)
    }

    fn visit_unary(&mut self, base: Node<'ast>, op: UnaryOperator, operand: Node<'ast>) -> Self::Result {
        try_visit!(accept(self, operand));

        let ty = ValidateUnary { op, operand, span: base.span() }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_binary(
        &mut self,
        base: Node<'ast>,
        left: Node<'ast>,
        op: BinaryOperator,
        right: Node<'ast>,
    ) -> Self::Result {
        try_visit!(accept(self, left));
        /* A class name on the right of `is` is resolved by its rule */
        let class_operand = op == BinaryOperator::Is && matches!(right.kind(), NodeKind::Ident(_));
        if !class_operand {
            try_visit!(accept(self, right));
        }

        let ty = ValidateBinary { left, op, right, span: base.span() }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_literal(&mut self, base: Node<'ast>, lit: &'ast LitValue) -> Self::Result {
        self.set_type(base, literal_type(lit))
    }

    fn visit_ident(&mut self, base: Node<'ast>, _name: Symbol) -> Self::Result {
        let ty = ResolveIdent { ident: base }.apply(self.sem, self.em);
        self.set_type(base, ty)
    }

    fn visit_call(&mut self, base: Node<'ast>, callee: &'ast Ident, args: NodeList<'ast>) -> Self::Result {
        try_visit!(walk_list(self, args));

        let ty = ValidateCall { call: base, callee, args }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_new(&mut self, base: Node<'ast>, class: &'ast Ident) -> Self::Result {
        /* Unknown classes were reported by the identification pass */
        let known = self.sem.classes().contains(class.sym);
        let ty = if known { Type::class(class.sym) } else { Type::Error };
        self.set_type(base, ty)
    }

    fn visit_member(&mut self, base: Node<'ast>, object: Node<'ast>, field: &'ast Ident) -> Self::Result {
        try_visit!(accept(self, object));

        let ty = ValidateFieldAccess { object, field }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_index(&mut self, base: Node<'ast>, list: Node<'ast>, index: Node<'ast>) -> Self::Result {
        try_visit!(accept(self, list));
        try_visit!(accept(self, index));

        let ty = ValidateIndex { list, index }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_list_lit(&mut self, base: Node<'ast>, elems: NodeList<'ast>) -> Self::Result {
        try_visit!(walk_list(self, elems));

        let ty = ValidateListLit { elems }.apply(self.sem, self.em)?;
        self.set_type(base, ty)
    }

    fn visit_block(&mut self, _base: Node<'ast>, stmts: NodeList<'ast>) -> Self::Result {
        walk_list(self, stmts)
    }

    fn visit_while(
        &mut self,
        base: Node<'ast>,
        cond: Node<'ast>,
        _step: Option<Node<'ast>>,
        _body: Node<'ast>,
    ) -> Self::Result {
        try_visit!(walk_while(self, base));

        ValidateCondition { cond, construct: "while" }.apply(self.sem, self.em)?;
        Ok(())
    }

    fn visit_if(
        &mut self,
        base: Node<'ast>,
        cond: Node<'ast>,
        _then: Node<'ast>,
        _els: Option<Node<'ast>>,
    ) -> Self::Result {
        try_visit!(walk_children(self, base));

        ValidateCondition { cond, construct: "if" }.apply(self.sem, self.em)?;
        Ok(())
    }

    fn visit_stop(&mut self, base: Node<'ast>) -> Self::Result {
        if !self.ctx.in_loop() {
            self.em.emit_error(SemanticError {
                kind: SemanticErrorKind::StopOutsideLoop,
                span: base.span(),
            });
        }
        Ok(())
    }

    fn visit_return(&mut self, base: Node<'ast>, value: Option<Node<'ast>>) -> Self::Result {
        try_visit!(walk_opt(self, value));

        CheckReturnStmt {
            func: self.ctx.current_function(),
            value,
            span: base.span(),
        }
        .apply(self.sem, self.em)?;
        Ok(())
    }

    fn visit_expr_stmt(&mut self, _base: Node<'ast>, expr: Node<'ast>) -> Self::Result {
        accept(self, expr)
    }

    fn visit_assign(&mut self, base: Node<'ast>, target: Node<'ast>, value: Node<'ast>) -> Self::Result {
        try_visit!(accept(self, target));
        try_visit!(accept(self, value));

        ValidateAssignment { target, value, span: base.span() }.apply(self.sem, self.em)?;
        Ok(())
    }

    fn visit_type_name(&mut self, base: Node<'ast>, _name: Symbol) -> Self::Result {
        let ty = lower_type_node(base, &self.sem.classes());
        self.set_type(base, ty)
    }

    fn visit_list_type(&mut self, base: Node<'ast>, elem: Node<'ast>) -> Self::Result {
        try_visit!(accept(self, elem));

        let ty = lower_type_node(base, &self.sem.classes());
        self.set_type(base, ty)
    }
}

#[cfg(test)]
mod test;
