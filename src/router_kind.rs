//! Type → `{Unknown, Engine, RouterGroup}` classification.

use std::rc::Rc;

use crate::ast::GoType;
use crate::config::FrameworkTypeNames;

/// The result of classifying a program type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterKind {
    /// Neither an Engine nor a RouterGroup, as far as this analysis can tell.
    Unknown,
    /// The framework's root router type.
    Engine,
    /// The framework's prefix-holding group type.
    RouterGroup,
}

/// Classifies `ty`, piercing pointer and named-type layers and, failing a
/// direct match, recursing into embedded struct fields only.
///
/// Pointer-to-T and named-T-with-underlying-U are unwrapped repeatedly
/// until a fixed point; the canonical name is checked against the
/// configured framework names at every named-type layer encountered along
/// the way, not just at the fixed point. Non-embedded fields are never
/// inspected, so a service struct that merely *contains* an engine-typed
/// field (rather than embedding it) is correctly classified `Unknown`.
pub fn classify(ty: &Rc<GoType>, names: &FrameworkTypeNames) -> RouterKind {
    let mut current = Rc::clone(ty);
    loop {
        match current.as_ref() {
            GoType::Named { name, underlying } => {
                if name == &names.engine {
                    return RouterKind::Engine;
                }
                if name == &names.router_group {
                    return RouterKind::RouterGroup;
                }
                let next = Rc::clone(underlying);
                current = next;
            }
            GoType::Pointer(inner) => {
                let next = Rc::clone(inner);
                current = next;
            }
            _ => break,
        }
    }

    if let GoType::Struct(fields) = current.as_ref() {
        for field in fields {
            if !field.embedded {
                continue;
            }
            let kind = classify(&field.ty, names);
            if kind != RouterKind::Unknown {
                return kind;
            }
        }
    }

    RouterKind::Unknown
}
