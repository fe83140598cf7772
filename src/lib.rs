//! Static endpoint inference for Gin-style HTTP services.
//!
//! Given a package graph (AST + types + identifier resolution, supplied by
//! an external loader) and a [`config::EngineConfig`], [`find_endpoints`]
//! walks the entry package's route-registration code and returns the flat
//! list of endpoints it discovers, each with OpenAPI-ready parameter,
//! request-body, and response schema information.

pub mod ast;
pub mod config;
pub mod constfold;
pub mod endpoint;
pub mod error;
pub mod group_tree;
pub mod handler_analyzer;
pub mod ident_resolver;
pub mod path_parser;
pub mod router_kind;
pub mod schema;
pub mod visitor;

use ast::PackageGraph;
use config::EngineConfig;
use endpoint::Endpoint;
use visitor::EndpointVisitor;

/// Discovers every HTTP endpoint reachable from `config`'s entry package.
///
/// Traversal is scoped to the entry package's first file only; a cross-file
/// helper function is only visited if a registration call in the first file
/// follows into it by passing a router value as an argument. This mirrors
/// the convention that `main`/route-setup code lives in a single file, while
/// callee lookups for cross-package follow search every file of the callee
/// package (a route-registration helper can live anywhere in its package).
pub fn find_endpoints(graph: &PackageGraph, config: &EngineConfig) -> Vec<Endpoint> {
    let Some(entry) = graph.entry_package(config.entry_package.as_deref()) else {
        return Vec::new();
    };
    let Some(first_file) = entry.files.first() else {
        return Vec::new();
    };

    let mut visitor = EndpointVisitor::new(config.framework_type_names.clone());
    for func in &first_file.funcs {
        visitor.visit_stmts(graph, &func.body);
    }
    visitor.finish()
}
