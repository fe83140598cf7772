//! Local variable → defining expression, resolved transitively.

use std::collections::HashMap;

use crate::ast::{DeclId, ExprId, ExprKind, PackageGraph};

/// A cap on resolution chain length, purely defensive: well-formed input
/// cannot cycle because each binding maps a declaration to an expression
/// earlier in the source, but malformed graphs handed in by a caller
/// should not hang the engine.
const MAX_RESOLUTION_DEPTH: usize = 256;

/// Maintains `declaration -> defining expression` bindings accumulated
/// while walking assignments and value declarations, and resolves
/// identifier chains through them.
#[derive(Debug, Default)]
pub struct IdentResolver {
    bindings: HashMap<DeclId, ExprId>,
}

impl IdentResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the bindings introduced by `lhs... = rhs...` (or a `var`
    /// declaration with initializers). Only positions where `lhs[i]` is an
    /// identifier with a resolved declaration are recorded; extra elements
    /// on either side (a mismatched arity) are ignored for the positions
    /// beyond the shorter list.
    ///
    /// Each declaration is bound at most once: a later assignment to an
    /// already-bound declaration does not overwrite the first. This mirrors
    /// a relational write-once map, not a mutable variable slot, and is
    /// sufficient because later assignments to the same router variable are
    /// vanishingly rare in route-registration code.
    pub fn record_assignment(&mut self, graph: &PackageGraph, lhs: &[ExprId], rhs: &[ExprId]) {
        for (lhs_expr, rhs_expr) in lhs.iter().zip(rhs.iter()) {
            if let ExprKind::Ident { decl: Some(decl), .. } = &graph.exprs.get(*lhs_expr).kind {
                self.bind(*decl, *rhs_expr);
            }
        }
    }

    /// Binds a single declaration directly, without going through an
    /// `Ident` expression node. Used to bind a callee's formal parameters
    /// to the actual argument expressions at a cross-package call site.
    pub fn bind(&mut self, decl: DeclId, expr: ExprId) {
        self.bindings.entry(decl).or_insert(expr);
    }

    /// Resolves `expr` to its defining expression: if `expr` is an
    /// identifier bound by a recorded assignment, follows the chain until
    /// it reaches a non-identifier expression (or an identifier with no
    /// recorded binding), and returns that. Non-identifier expressions, and
    /// identifiers with no binding, resolve to themselves.
    pub fn resolve(&self, graph: &PackageGraph, expr: ExprId) -> ExprId {
        let mut current = expr;
        for _ in 0..MAX_RESOLUTION_DEPTH {
            let ExprKind::Ident { decl: Some(decl), .. } = &graph.exprs.get(current).kind else {
                return current;
            };
            match self.bindings.get(decl) {
                Some(&next) => current = next,
                None => return current,
            }
        }
        current
    }
}
