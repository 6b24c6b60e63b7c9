//! Read-only access to the type checker's results.

use std::fmt;

use goflow_ast::{Expr, NodeId};
use indexmap::IndexMap;

/// The type of an expression, as far as the pass cares.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    /// Any single-valued type, by name.
    Named(String),
    /// The result list of a multi-value call.
    Tuple(Vec<Type>),
}

impl Type {
    /// Shorthand for [`Type::Named`].
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns the number of values in a tuple type.
    pub fn tuple_len(&self) -> Option<usize> {
        match self {
            Self::Tuple(elems) => Some(elems.len()),
            Self::Named(_) => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Tuple(elems) => {
                f.write_str("(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Answers type queries about expressions of the input tree.
///
/// Nodes the pass synthesizes carry [`NodeId::DUMMY`] and are
/// never queried.
pub trait TypeInfo {
    /// Returns the type of `expr`, if known.
    fn type_of(&self, expr: &Expr) -> Option<&Type>;

    /// Reports whether `expr` produces several values.
    fn is_tuple(&self, expr: &Expr) -> bool {
        matches!(self.type_of(expr), Some(Type::Tuple(_)))
    }
}

impl<T: TypeInfo + ?Sized> TypeInfo for &T {
    fn type_of(&self, expr: &Expr) -> Option<&Type> {
        (**self).type_of(expr)
    }

    fn is_tuple(&self, expr: &Expr) -> bool {
        (**self).is_tuple(expr)
    }
}

/// A [`TypeInfo`] backed by a table keyed on [`NodeId`].
#[derive(Clone, Debug, Default)]
pub struct TypeMap {
    types: IndexMap<NodeId, Type>,
}

impl TypeMap {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the type of `expr`, returning the previous entry.
    pub fn insert(&mut self, expr: &Expr, ty: Type) -> Option<Type> {
        self.types.insert(expr.id, ty)
    }

    /// Returns the number of recorded types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Reports whether no types are recorded.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeInfo for TypeMap {
    fn type_of(&self, expr: &Expr) -> Option<&Type> {
        if expr.id.is_dummy() {
            return None;
        }
        self.types.get(&expr.id)
    }
}

impl FromIterator<(NodeId, Type)> for TypeMap {
    fn from_iter<I: IntoIterator<Item = (NodeId, Type)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
