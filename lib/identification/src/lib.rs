//! Identification phase
//!
//! The main goal of the identification phase is to link every name
//! used in the program with the declaration it refers to.
//!
//! # Example
//! ```text
//! int foo() { ... }           // (id: 1)
//! int main() {
//!     int a = 12;             // (id: 2)
//!     a = a + 1;              // (a -> 2)
//!     while (a < 3) {
//!         char a = 'a';       // (id: 3)
//!         print(a);           // (a -> 3)
//!     }
//!     foo();                  // (foo -> 1)
//! }
//! ```
//!
//! Functions and classes are hoisted: they can be used before they are
//! declared. Variables can only be used after their declaration.
//!
//! This pass also fills the [class table](semantic::ClassTable), checks the
//! modifiers of every declaration and marks every expression as
//! [unresolved](semantic::Type::Unresolved), so the type checker knows
//! which nodes it has to resolve.

use std::collections::HashMap;

use ast::visitor::{
    BaseVisitorCtx, CancelFlag, VisitorCtx, accept, walk_children, walk_list, walk_opt, walk_while,
};
use ast::{Ident, LitValue, Modifier, Modifiers, Node, NodeId, NodeKind, NodeList, Tree, Visitor};
use ast::ops::{BinaryOperator, UnaryOperator};
use error_manager::ErrorManager;
use interner::Symbol;
use semantic::classes::Field;
use semantic::{PassError, Semantic, Type, lower_type_node};
use span::Span;

mod error;
pub use error::{IdentificationError, IdentificationErrorKind};

type PassResult = Result<(), PassError>;

/// Performs identification for the given tree
#[tracing::instrument(skip_all)]
pub fn identify(
    tree: &Tree,
    sem: &Semantic,
    em: &mut ErrorManager,
    cancel: Option<CancelFlag>,
) -> PassResult {
    let Some(root) = tree.root() else {
        tracing::warn!("identification on a tree without a root");
        return Ok(());
    };
    let mut ident = Identification::new(sem, em, cancel);
    root.accept(&mut ident)
}

struct SymbolTable {
    scopes: Vec<HashMap<Symbol, NodeId>>,
}

impl SymbolTable {
    fn new() -> Self {
        Self { scopes: vec![HashMap::new()] }
    }

    fn get_top(&self, sym: Symbol) -> Option<NodeId> {
        self.scopes.last().and_then(|scope| scope.get(&sym).copied())
    }

    fn define(&mut self, sym: Symbol, id: NodeId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(sym, id);
        }
    }

    fn get(&self, sym: Symbol) -> Option<NodeId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&sym).copied())
    }

    fn enter_scope(&mut self) { self.scopes.push(HashMap::default()); }

    fn exit_scope(&mut self) {
        /* The global scope is never popped */
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }
}

struct Ctx<'ast> {
    base: BaseVisitorCtx<'ast>,
    st: SymbolTable,
}

impl<'ast> VisitorCtx<'ast> for Ctx<'ast> {
    fn enter_function(&mut self, func: Node<'ast>) {
        self.base.enter_function(func);
        self.st.enter_scope();
    }

    fn exit_function(&mut self) {
        self.st.exit_scope();
        self.base.exit_function();
    }

    fn enter_class(&mut self, class: Node<'ast>) {
        self.base.enter_class(class);
        self.st.enter_scope();
    }

    fn exit_class(&mut self) {
        self.st.exit_scope();
        self.base.exit_class();
    }

    fn enter_loop(&mut self, lp: Node<'ast>) { self.base.enter_loop(lp); }

    fn exit_loop(&mut self) { self.base.exit_loop(); }

    fn is_cancelled(&self) -> bool { self.base.is_cancelled() }
}

struct Identification<'ident, 'ast> {
    sem: &'ident Semantic,
    em: &'ident mut ErrorManager,
    ctx: Ctx<'ast>,
}

fn is_class_member(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| matches!(p.kind(), NodeKind::ClassDecl { .. }))
}

fn is_param(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| matches!(p.kind(), NodeKind::FuncDecl { .. }))
}

impl<'ident, 'ast> Identification<'ident, 'ast> {
    fn new(sem: &'ident Semantic, em: &'ident mut ErrorManager, cancel: Option<CancelFlag>) -> Self {
        let base = match cancel {
            Some(flag) => BaseVisitorCtx::new().with_cancel_flag(flag),
            None => BaseVisitorCtx::new(),
        };
        Self {
            sem,
            em,
            ctx: Ctx { base, st: SymbolTable::new() },
        }
    }

    fn report(&mut self, kind: IdentificationErrorKind, span: Span) {
        self.em.emit_error(IdentificationError { kind, span });
    }

    fn define(&mut self, name: &Ident, decl: NodeId, what: &'static str) {
        if self.ctx.st.get_top(name.sym).is_some() {
            self.report(IdentificationErrorKind::Redefinition { name: name.sym, what }, name.span);
        } else {
            self.ctx.st.define(name.sym, decl);
        }
    }

    fn bind(&mut self, node: Node<'ast>, name: &Ident) -> PassResult {
        match self.ctx.st.get(name.sym) {
            Some(decl) => self.sem.bind_symbol(node.id(), decl)?,
            None => self.report(IdentificationErrorKind::Undeclared(name.sym), name.span),
        }
        Ok(())
    }

    /// Binds `node` to the declaration of the class `name`
    fn bind_class(&mut self, node: Node<'ast>, name: &Ident) -> PassResult {
        let decl = self.sem.classes().get(name.sym).map(|c| c.decl);
        match decl {
            Some(decl) => self.sem.bind_symbol(node.id(), decl)?,
            None => self.report(IdentificationErrorKind::UndeclaredClass(name.sym), name.span),
        }
        Ok(())
    }

    fn mark(&self, node: Node<'ast>) -> PassResult {
        self.sem.mark_unresolved(node.id())?;
        Ok(())
    }

    fn check_modifiers(&mut self, decl: Node<'ast>, modifiers: Modifiers, on: &'static str) {
        let span = decl.span();
        if modifiers.contains(Modifier::Public) && modifiers.contains(Modifier::Private) {
            self.report(
                IdentificationErrorKind::ConflictingModifiers(Modifier::Public, Modifier::Private),
                span,
            );
        }
        if !is_class_member(decl) {
            for modifier in [Modifier::Public, Modifier::Private, Modifier::Static] {
                if modifiers.contains(modifier) {
                    let kind = IdentificationErrorKind::ModifierNotAllowed { modifier, on };
                    self.report(kind, span);
                }
            }
        }
    }

    /// Registers every class and global function of the program,
    /// so they can be referenced before their declaration
    fn hoist(&mut self, decls: NodeList<'ast>) {
        let classes: Vec<_> = decls
            .iter()
            .filter_map(|decl| match decl.kind() {
                NodeKind::ClassDecl { name, superclass } => Some((decl, name, superclass.as_ref())),
                _ => None,
            })
            .collect();

        for decl in decls.iter() {
            match decl.kind() {
                NodeKind::ClassDecl { name, .. } => {
                    if !self.sem.classes_mut().declare(name.sym, decl.id()) {
                        let kind = IdentificationErrorKind::Redefinition { name: name.sym, what: "class" };
                        self.report(kind, name.span);
                    }
                }
                NodeKind::FuncDecl { name, .. } => self.define(name, decl.id(), "function"),
                _ => {}
            }
        }

        /* Duplicated classes keep the first declaration */
        let registered = |sem: &Semantic, decl: Node<'ast>, name: Symbol| {
            sem.classes().get(name).map(|c| c.decl) == Some(decl.id())
        };

        for (decl, name, superclass) in &classes {
            let Some(sup) = superclass else { continue };
            if !registered(self.sem, *decl, name.sym) {
                continue;
            }
            if self.sem.classes().contains(sup.sym) {
                self.sem.classes_mut().set_superclass(name.sym, sup.sym);
            } else {
                self.report(IdentificationErrorKind::UndeclaredClass(sup.sym), sup.span);
            }
        }

        for (decl, name, _) in &classes {
            if self.sem.classes().in_cycle(name.sym) {
                self.report(IdentificationErrorKind::CyclicInheritance(name.sym), decl.span());
            }
        }

        for (decl, name, _) in &classes {
            if !registered(self.sem, *decl, name.sym) {
                continue;
            }
            for member in decl.present_children() {
                self.hoist_member(name.sym, member);
            }
        }
    }

    /// Duplicated members are reported once their class body is visited
    fn hoist_member(&mut self, class: Symbol, member: Node<'ast>) {
        match member.kind() {
            NodeKind::VarDecl { names, .. } => {
                let ty = member
                    .child(0)
                    .map_or(Type::Error, |ty| lower_type_node(ty, &self.sem.classes()));
                for name in names.iter() {
                    let field = Field { name: name.sym, ty: ty.clone(), decl: member.id() };
                    self.sem.classes_mut().add_field(class, field);
                }
            }
            NodeKind::FuncDecl { name, .. } => {
                self.sem.classes_mut().add_method(class, name.sym, member.id());
            }
            _ => {}
        }
    }

    fn visit_function_scope(&mut self, params: NodeList<'ast>, body: Node<'ast>) -> PassResult {
        ast::try_visit!(walk_list(self, params));
        /* Parameters and the outermost locals share a scope */
        walk_list(self, body.list_from(0))
    }

    fn visit_class_scope(&mut self, members: NodeList<'ast>) -> PassResult {
        for member in members.iter() {
            match member.kind() {
                NodeKind::VarDecl { names, .. } => {
                    for name in names.iter() {
                        self.define(name, member.id(), "field");
                    }
                }
                NodeKind::FuncDecl { name, .. } => self.define(name, member.id(), "method"),
                _ => {}
            }
        }
        walk_list(self, members)
    }
}

impl<'ast> Visitor<'ast> for Identification<'_, 'ast> {
    type Result = PassResult;
    type Ctx = Ctx<'ast>;

    fn get_ctx(&mut self) -> &mut Self::Ctx { &mut self.ctx }

    fn visit_program(&mut self, _base: Node<'ast>, decls: NodeList<'ast>) -> Self::Result {
        self.hoist(decls);
        walk_list(self, decls)
    }

    fn visit_var_decl(
        &mut self,
        base: Node<'ast>,
        modifiers: Modifiers,
        names: &'ast [Ident],
        ty: Node<'ast>,
        init: Option<Node<'ast>>,
    ) -> Self::Result {
        self.mark(base)?;
        self.check_modifiers(base, modifiers, "a variable");
        if modifiers.contains(Modifier::Const) && init.is_none() && !is_param(base) {
            for name in names {
                self.report(IdentificationErrorKind::ConstWithoutInit(name.sym), name.span);
            }
        }

        ast::try_visit!(accept(self, ty));
        /* The initializer can't see the names being declared */
        ast::try_visit!(walk_opt(self, init));

        if !is_class_member(base) {
            for name in names {
                self.define(name, base.id(), "variable");
            }
        }
        Ok(())
    }

    fn visit_func_decl(
        &mut self,
        base: Node<'ast>,
        _name: &'ast Ident,
        modifiers: Modifiers,
        params: NodeList<'ast>,
        ret_ty: Node<'ast>,
        body: Node<'ast>,
    ) -> Self::Result {
        self.check_modifiers(base, modifiers, "a function");
        if modifiers.contains(Modifier::Const) {
            let kind = IdentificationErrorKind::ModifierNotAllowed {
                modifier: Modifier::Const,
                on: "a function",
            };
            self.report(kind, base.span());
        }

        ast::try_visit!(accept(self, ret_ty));

        self.ctx.enter_function(base);
        let result = self.visit_function_scope(params, body);
        self.ctx.exit_function();
        result
    }

    fn visit_class_decl(
        &mut self,
        base: Node<'ast>,
        _name: &'ast Ident,
        _superclass: Option<&'ast Ident>,
        members: NodeList<'ast>,
    ) -> Self::Result {
        self.ctx.enter_class(base);
        let result = self.visit_class_scope(members);
        self.ctx.exit_class();
        result
    }

    fn visit_unary(&mut self, base: Node<'ast>, _op: UnaryOperator, operand: Node<'ast>) -> Self::Result {
        self.mark(base)?;
        accept(self, operand)
    }

    fn visit_binary(
        &mut self,
        base: Node<'ast>,
        left: Node<'ast>,
        op: BinaryOperator,
        right: Node<'ast>,
    ) -> Self::Result {
        self.mark(base)?;
        ast::try_visit!(accept(self, left));

        /* In `value is Class`, the name on the right is a class */
        if let (BinaryOperator::Is, NodeKind::Ident(name)) = (op, right.kind()) {
            self.mark(right)?;
            return self.bind_class(right, &Ident { sym: *name, span: right.span() });
        }
        accept(self, right)
    }

    fn visit_literal(&mut self, base: Node<'ast>, _lit: &'ast LitValue) -> Self::Result {
        self.mark(base)
    }

    fn visit_ident(&mut self, base: Node<'ast>, name: Symbol) -> Self::Result {
        self.mark(base)?;
        self.bind(base, &Ident { sym: name, span: base.span() })
    }

    fn visit_call(&mut self, base: Node<'ast>, callee: &'ast Ident, args: NodeList<'ast>) -> Self::Result {
        self.mark(base)?;
        self.bind(base, callee)?;
        walk_list(self, args)
    }

    fn visit_new(&mut self, base: Node<'ast>, class: &'ast Ident) -> Self::Result {
        self.mark(base)?;
        self.bind_class(base, class)
    }

    fn visit_member(&mut self, base: Node<'ast>, object: Node<'ast>, _field: &'ast Ident) -> Self::Result {
        self.mark(base)?;
        accept(self, object)
    }

    fn visit_index(&mut self, base: Node<'ast>, list: Node<'ast>, index: Node<'ast>) -> Self::Result {
        self.mark(base)?;
        ast::try_visit!(accept(self, list));
        accept(self, index)
    }

    fn visit_list_lit(&mut self, base: Node<'ast>, elems: NodeList<'ast>) -> Self::Result {
        self.mark(base)?;
        walk_list(self, elems)
    }

    fn visit_block(&mut self, _base: Node<'ast>, stmts: NodeList<'ast>) -> Self::Result {
        self.ctx.st.enter_scope();
        let result = walk_list(self, stmts);
        self.ctx.st.exit_scope();
        result
    }

    fn visit_while(
        &mut self,
        base: Node<'ast>,
        _cond: Node<'ast>,
        _step: Option<Node<'ast>>,
        _body: Node<'ast>,
    ) -> Self::Result {
        walk_while(self, base)
    }

    fn visit_if(
        &mut self,
        base: Node<'ast>,
        _cond: Node<'ast>,
        _then: Node<'ast>,
        _els: Option<Node<'ast>>,
    ) -> Self::Result {
        walk_children(self, base)
    }

    fn visit_stop(&mut self, _base: Node<'ast>) -> Self::Result { Ok(()) }

    fn visit_return(&mut self, _base: Node<'ast>, value: Option<Node<'ast>>) -> Self::Result {
        walk_opt(self, value)
    }

    fn visit_expr_stmt(&mut self, _base: Node<'ast>, expr: Node<'ast>) -> Self::Result {
        accept(self, expr)
    }

    fn visit_assign(&mut self, base: Node<'ast>, _target: Node<'ast>, _value: Node<'ast>) -> Self::Result {
        walk_children(self, base)
    }

    fn visit_type_name(&mut self, base: Node<'ast>, name: Symbol) -> Self::Result {
        self.mark(base)?;
        let known = name.borrow(Type::builtin).is_some() || self.sem.classes().contains(name);
        if !known {
            self.report(IdentificationErrorKind::UnknownType(name), base.span());
        }
        Ok(())
    }

    fn visit_list_type(&mut self, base: Node<'ast>, elem: Node<'ast>) -> Self::Result {
        self.mark(base)?;
        accept(self, elem)
    }
}
