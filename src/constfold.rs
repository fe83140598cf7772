//! Expression → folded constant, via the type checker's constant table.

use crate::ast::{ConstValue, ExprId, PackageGraph};

/// The result of attempting to fold an expression to a compile-time
/// constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Folded {
    /// A folded string value.
    Str(String),
    /// A folded integer value.
    Int(i64),
}

impl Folded {
    /// Returns the value as a string slice, if it folded to a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Folded::Str(s) => Some(s),
            Folded::Int(_) => None,
        }
    }
}

/// Folds an expression using only the constant value the type checker
/// attached to it. Untyped constants, named constants, and
/// constant-expression arithmetic all fold identically here, because the
/// graph's `expr_const` table makes no distinction between them — it
/// records only the final value. Variables and function-call results,
/// which never appear in that table, yield `None`.
///
/// An empty string is treated as not-foldable: an empty route or path
/// segment is never a meaningful registration.
pub fn fold(graph: &PackageGraph, expr: ExprId) -> Option<Folded> {
    match graph.const_of(expr)? {
        ConstValue::Str(s) if s.is_empty() => None,
        ConstValue::Str(s) => Some(Folded::Str(s.clone())),
        ConstValue::Int(i) => Some(Folded::Int(*i)),
    }
}
