use ast::ops::{BinaryOperator, OperatorClass, UnaryOperator};
use ast::{Ident, Node, NodeKind, NodeList};
use error_manager::ErrorManager;
use span::Span;

use super::{SemanticRule, type_of};
use crate::errors::{AnnotationError, SemanticError, SemanticErrorKind};
use crate::type_lowering::{Signature, declared_type};
use crate::{Semantic, SubtypeRelation, Type};

type RuleResult = Result<Type, AnnotationError>;

fn report(em: &mut ErrorManager, kind: SemanticErrorKind, span: Span) -> Type {
    em.emit_error(SemanticError { kind, span });
    Type::Error
}

pub trait Lvalue {
    fn is_lvalue(&self) -> bool;
}

impl Lvalue for Node<'_> {
    fn is_lvalue(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Ident(_) | NodeKind::Index | NodeKind::Member { .. }
        )
    }
}

pub fn literal_type(lit: &ast::LitValue) -> Type {
    use ast::LitValue;
    match lit {
        LitValue::Int(_) => Type::INT,
        LitValue::Float(_) => Type::FLOAT,
        LitValue::Bool(_) => Type::BOOL,
        LitValue::Char(_) => Type::CHAR,
        LitValue::Str(_) => Type::list(Type::CHAR),
    }
}

/// Type of a name used as a value
pub struct ResolveIdent<'ast> {
    pub ident: Node<'ast>,
}

impl SemanticRule for ResolveIdent<'_> {
    type Result = Type;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        /* Names without a declaration were reported by the identification pass */
        let Some(decl) = sem.symbol_of(self.ident.id()) else { return Type::Error };
        let decl = self.ident.tree().node(decl);

        if let Some(ty) = declared_type(decl, &sem.classes()) {
            return ty;
        }
        let NodeKind::Ident(name) = self.ident.kind() else { return Type::Error };
        report(em, SemanticErrorKind::NotAValue(*name), self.ident.span())
    }
}

pub struct ValidateUnary<'ast> {
    pub op: UnaryOperator,
    pub operand: Node<'ast>,
    pub span: Span,
}

impl SemanticRule for ValidateUnary<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let operand = type_of(self.operand, sem, em)?;
        if operand.is_error() {
            return Ok(Type::Error);
        }

        let valid = match self.op {
            UnaryOperator::Not => operand.is_boolean(),
            UnaryOperator::BitNot => operand.is_integer(),
        };

        if valid {
            Ok(operand)
        } else {
            let kind = SemanticErrorKind::Unary { op: self.op.as_str(), operand };
            Ok(report(em, kind, self.span))
        }
    }
}

pub struct ValidateBinary<'ast> {
    pub left: Node<'ast>,
    pub op: BinaryOperator,
    pub right: Node<'ast>,
    pub span: Span,
}

impl ValidateBinary<'_> {
    fn result_type(&self, left: &Type, right: &Type) -> Option<Type> {
        let both = |pred: fn(&Type) -> bool| pred(left) && pred(right);

        match self.op.class() {
            OperatorClass::Arithmetic if self.op == BinaryOperator::IntDiv => {
                both(Type::is_integer).then(|| left.common_type(right)).flatten()
            }
            OperatorClass::Arithmetic | OperatorClass::Exponent => {
                both(Type::is_numeric).then(|| left.common_type(right)).flatten()
            }
            OperatorClass::Equality => left.compatible_with(right).then_some(Type::BOOL),
            OperatorClass::Relational => both(Type::is_numeric).then_some(Type::BOOL),
            OperatorClass::Shift => both(Type::is_integer).then(|| left.clone()),
            /* Checked by ValidateTypeTest */
            OperatorClass::TypeTest => None,
            OperatorClass::Bitwise => {
                if both(Type::is_integer) {
                    left.common_type(right)
                } else {
                    both(Type::is_boolean).then_some(Type::BOOL)
                }
            }
            OperatorClass::Logical => both(Type::is_boolean).then_some(Type::BOOL),
        }
    }
}

impl SemanticRule for ValidateBinary<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        if self.op.class() == OperatorClass::TypeTest {
            let test = ValidateTypeTest { value: self.left, class: self.right, span: self.span };
            return test.apply(sem, em);
        }

        let left = type_of(self.left, sem, em)?;
        let right = type_of(self.right, sem, em)?;
        if left.is_error() || right.is_error() {
            return Ok(Type::Error);
        }

        Ok(self.result_type(&left, &right).unwrap_or_else(|| {
            let kind = SemanticErrorKind::Binary { op: self.op.as_str(), left, right };
            report(em, kind, self.span)
        }))
    }
}

/// `value is Class`
///
/// The value must be an object, and its class must be related to the
/// tested one. The class operand is resolved here, to the class it names.
pub struct ValidateTypeTest<'ast> {
    pub value: Node<'ast>,
    pub class: Node<'ast>,
    pub span: Span,
}

impl ValidateTypeTest<'_> {
    fn class_operand(&self, sem: &Semantic, em: &mut ErrorManager) -> RuleResult {
        let NodeKind::Ident(name) = self.class.kind() else {
            type_of(self.class, sem, em)?;
            return Ok(report(em, SemanticErrorKind::TypeTestOperand, self.class.span()));
        };

        /* Unknown classes were reported by the identification pass */
        let known = sem.symbol_of(self.class.id()).is_some() && sem.classes().contains(*name);
        let ty = if known { Type::class(*name) } else { Type::Error };
        if sem.type_of(self.class.id()).is_none() {
            sem.resolve_type(self.class.id(), ty.clone())?;
        }
        Ok(ty)
    }
}

impl SemanticRule for ValidateTypeTest<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let value = type_of(self.value, sem, em)?;
        let class = self.class_operand(sem, em)?;
        if value.is_error() || class.is_error() {
            return Ok(Type::Error);
        }

        let related = match (&value, &class) {
            (Type::Class(v), Type::Class(c)) => {
                let classes = sem.classes();
                classes.is_subclass_of(v.name, c.name) || classes.is_subclass_of(c.name, v.name)
            }
            _ => false,
        };
        if related {
            Ok(Type::BOOL)
        } else {
            let op = BinaryOperator::Is.as_str();
            let kind = SemanticErrorKind::Binary { op, left: value, right: class };
            Ok(report(em, kind, self.span))
        }
    }
}

pub struct ValidateIndex<'ast> {
    pub list: Node<'ast>,
    pub index: Node<'ast>,
}

impl SemanticRule for ValidateIndex<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let list = type_of(self.list, sem, em)?;
        let index = type_of(self.index, sem, em)?;

        if !index.is_error() && !index.is_integer() {
            report(em, SemanticErrorKind::NonIntegerIndex(index), self.index.span());
        }

        Ok(match list {
            Type::Error => Type::Error,
            Type::List(l) => *l.elem,
            other => report(em, SemanticErrorKind::IndexToNonList(other), self.list.span()),
        })
    }
}

pub struct ValidateFieldAccess<'ast> {
    pub object: Node<'ast>,
    pub field: &'ast Ident,
}

impl SemanticRule for ValidateFieldAccess<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let object = type_of(self.object, sem, em)?;
        let class = match object {
            Type::Error => return Ok(Type::Error),
            Type::Class(c) => c.name,
            other => {
                let kind = SemanticErrorKind::AccessToNonClass(other);
                return Ok(report(em, kind, self.field.span));
            }
        };

        let field = sem.classes().lookup_field(class, self.field.sym).map(|f| f.ty.clone());
        Ok(field.unwrap_or_else(|| {
            let kind = SemanticErrorKind::NonExistingField { class, field: self.field.sym };
            report(em, kind, self.field.span)
        }))
    }
}

pub struct ValidateCall<'ast> {
    pub call: Node<'ast>,
    pub callee: &'ast Ident,
    pub args: NodeList<'ast>,
}

impl SemanticRule for ValidateCall<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let Some(decl) = sem.symbol_of(self.call.id()) else { return Ok(Type::Error) };
        let decl = self.call.tree().node(decl);

        let Some(sig) = Signature::of(decl, &sem.classes()) else {
            let kind = SemanticErrorKind::NotAFunction(self.callee.sym);
            return Ok(report(em, kind, self.callee.span));
        };

        if sig.params.len() != self.args.len() {
            let kind = SemanticErrorKind::MismatchedArgsNum {
                expected: sig.params.len(),
                received: self.args.len(),
            };
            report(em, kind, self.call.span());
        }

        for (index, (arg, expected)) in self.args.iter().zip(&sig.params).enumerate() {
            let found = type_of(arg, sem, em)?;
            if !found.assignable_to(expected, &*sem.classes()) {
                let kind = SemanticErrorKind::ArgumentType {
                    index,
                    expected: expected.clone(),
                    found,
                };
                report(em, kind, arg.span());
            }
        }

        Ok(sig.ret_ty)
    }
}

pub struct ValidateListLit<'ast> {
    pub elems: NodeList<'ast>,
}

impl SemanticRule for ValidateListLit<'_> {
    type Result = RuleResult;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let mut elem_ty: Option<Type> = None;

        for elem in self.elems.iter() {
            let ty = type_of(elem, sem, em)?;
            elem_ty = Some(match elem_ty {
                None => ty,
                Some(acc) if ty.widens_to(&acc) => acc,
                Some(acc) if acc.widens_to(&ty) => ty,
                Some(acc) if ty.is_error() || acc.is_error() => Type::Error,
                Some(acc) => {
                    let kind = SemanticErrorKind::MismatchedListElems {
                        expected: acc.clone(),
                        found: ty,
                    };
                    report(em, kind, elem.span());
                    acc
                }
            });
        }

        /* An empty list is assignable to any other list */
        Ok(Type::list(elem_ty.unwrap_or(Type::Error)))
    }
}
