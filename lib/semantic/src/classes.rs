//! Class hierarchy
//!
//! The [`ClassTable`] is filled by the identification pass, before any
//! expression is type checked, so that types that reference classes
//! declared later in the program can be resolved.

use std::collections::{HashMap, HashSet};

use ast::NodeId;
use interner::Symbol;

use crate::types::{SubtypeRelation, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Symbol,
    pub ty: Type,
    pub decl: NodeId,
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: Symbol,
    pub decl: NodeId,
    pub superclass: Option<Symbol>,
    fields: Vec<Field>,
    methods: HashMap<Symbol, NodeId>,
}

impl ClassInfo {
    pub fn fields(&self) -> &[Field] { &self.fields }

    pub fn method(&self, name: Symbol) -> Option<NodeId> { self.methods.get(&name).copied() }
}

#[derive(Debug, Default)]
pub struct ClassTable {
    classes: HashMap<Symbol, ClassInfo>,
}

impl ClassTable {
    pub fn new() -> Self { Self::default() }

    /// Registers a class
    ///
    /// Returns false if a class with the same name already existed,
    /// in which case the table is left untouched.
    pub fn declare(&mut self, name: Symbol, decl: NodeId) -> bool {
        if self.classes.contains_key(&name) {
            return false;
        }
        self.classes.insert(name, ClassInfo {
            name,
            decl,
            superclass: None,
            fields: Vec::new(),
            methods: HashMap::new(),
        });
        true
    }

    pub fn set_superclass(&mut self, class: Symbol, superclass: Symbol) {
        if let Some(info) = self.classes.get_mut(&class) {
            info.superclass = Some(superclass);
        }
    }

    /// Adds a field to `class`. Returns false if the class
    /// already has a field with that name.
    pub fn add_field(&mut self, class: Symbol, field: Field) -> bool {
        let Some(info) = self.classes.get_mut(&class) else { return false };
        if info.fields.iter().any(|f| f.name == field.name) {
            return false;
        }
        info.fields.push(field);
        true
    }

    pub fn add_method(&mut self, class: Symbol, name: Symbol, decl: NodeId) -> bool {
        let Some(info) = self.classes.get_mut(&class) else { return false };
        info.methods.insert(name, decl).is_none()
    }

    pub fn get(&self, name: Symbol) -> Option<&ClassInfo> { self.classes.get(&name) }

    pub fn contains(&self, name: Symbol) -> bool { self.classes.contains_key(&name) }

    pub fn len(&self) -> usize { self.classes.len() }

    pub fn is_empty(&self) -> bool { self.classes.is_empty() }

    /// The inheritance chain of `class`, starting with the class
    /// itself. Stops at the first unknown class, or before visiting
    /// a class twice.
    pub fn chain(&self, class: Symbol) -> Vec<&ClassInfo> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(name) = current {
            if !seen.insert(name) {
                break;
            }
            let Some(info) = self.classes.get(&name) else { break };
            chain.push(info);
            current = info.superclass;
        }
        chain
    }

    /// Tells if following the superclasses of `class` eventually
    /// leads back to it
    pub fn in_cycle(&self, class: Symbol) -> bool {
        let chain = self.chain(class);
        chain
            .last()
            .and_then(|last| last.superclass)
            .is_some_and(|sup| sup == class)
    }

    /// Searches `field` on `class` and its ancestors
    pub fn lookup_field(&self, class: Symbol, field: Symbol) -> Option<&Field> {
        self.chain(class)
            .into_iter()
            .find_map(|info| info.fields.iter().find(|f| f.name == field))
    }

    pub fn lookup_method(&self, class: Symbol, name: Symbol) -> Option<NodeId> {
        self.chain(class).into_iter().find_map(|info| info.method(name))
    }
}

impl SubtypeRelation for ClassTable {
    fn is_subclass_of(&self, sub: Symbol, sup: Symbol) -> bool {
        sub == sup || self.chain(sub).iter().any(|info| info.name == sup)
    }
}
