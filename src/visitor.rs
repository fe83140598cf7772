//! The outer traversal: discovers route registrations, follows aliases and
//! cross-package calls, and builds the route-group tree.

use std::collections::HashSet;

use crate::ast::{ExprId, ExprKind, PackageGraph, Stmt};
use crate::config::FrameworkTypeNames;
use crate::constfold::{fold, Folded};
use crate::endpoint::{Endpoint, Group, Parameter};
use crate::handler_analyzer::{analyze_handler, HandlerResult};
use crate::ident_resolver::IdentResolver;
use crate::path_parser::parse_path_template;
use crate::router_kind::{classify, RouterKind};
use crate::schema::SchemaRegistry;

/// The Gin verb-shortcut method names; `Handle` is dispatched separately
/// since it takes its method as a folded argument rather than as the
/// selector name itself.
const VERB_SHORTCUTS: &[&str] = &["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GroupId(usize);

#[derive(Debug, Default)]
struct GroupNode {
    path_segment: String,
    path_params: Vec<Parameter>,
    endpoints: Vec<Endpoint>,
    children: Vec<GroupId>,
}

/// Arena backing the group forest while it is being built; converted to
/// the public, owned `Group` tree once traversal completes.
#[derive(Debug, Default)]
struct GroupArena {
    nodes: Vec<GroupNode>,
}

impl GroupArena {
    fn new() -> (Self, GroupId) {
        let mut arena = Self::default();
        arena.nodes.push(GroupNode::default());
        (arena, GroupId(0))
    }

    fn create_child(
        &mut self,
        parent: GroupId,
        path_segment: String,
        path_params: Vec<Parameter>,
    ) -> GroupId {
        let id = GroupId(self.nodes.len());
        self.nodes.push(GroupNode {
            path_segment,
            path_params,
            ..Default::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_endpoint(&mut self, group: GroupId, endpoint: Endpoint) {
        self.nodes[group.0].endpoints.push(endpoint);
    }

    fn to_group_tree(&self, id: GroupId) -> Group {
        let node = &self.nodes[id.0];
        Group {
            path_segment: node.path_segment.clone(),
            path_params: node.path_params.clone(),
            endpoints: node.endpoints.clone(),
            child_groups: node.children.iter().map(|c| self.to_group_tree(*c)).collect(),
        }
    }
}

/// Owns every piece of mutable state accumulated during a single
/// traversal: the identifier bindings, the schema registry, the
/// group-by-expression map, and the group forest itself.
pub struct EndpointVisitor {
    framework_names: FrameworkTypeNames,
    resolver: IdentResolver,
    registry: SchemaRegistry,
    groups: GroupArena,
    root: GroupId,
    group_for_expr: std::collections::HashMap<ExprId, GroupId>,
    call_stack: HashSet<(String, String)>,
}

impl EndpointVisitor {
    /// Creates a visitor with an empty root group.
    pub fn new(framework_names: FrameworkTypeNames) -> Self {
        let (groups, root) = GroupArena::new();
        Self {
            framework_names,
            resolver: IdentResolver::new(),
            registry: SchemaRegistry::new(),
            groups,
            root,
            group_for_expr: std::collections::HashMap::new(),
            call_stack: HashSet::new(),
        }
    }

    /// Consumes the visitor, flattening the group forest it built into the
    /// final ordered list of endpoints.
    pub fn finish(self) -> Vec<Endpoint> {
        let tree = self.groups.to_group_tree(self.root);
        crate::group_tree::flatten(&tree)
    }

    /// Walks a statement list, applying all four traversal rules.
    pub fn visit_stmts(&mut self, graph: &PackageGraph, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Assign { lhs, rhs, .. } => {
                    self.resolver.record_assignment(graph, lhs, rhs);
                    for expr in rhs {
                        self.visit_call_candidate(graph, *expr);
                    }
                }
                Stmt::Expr(expr) => self.visit_call_candidate(graph, *expr),
                Stmt::Block(inner) => self.visit_stmts(graph, inner),
                Stmt::If { cond, then_branch, else_branch } => {
                    self.visit_call_candidate(graph, *cond);
                    self.visit_stmts(graph, then_branch);
                    if let Some(else_branch) = else_branch {
                        self.visit_stmts(graph, else_branch);
                    }
                }
            }
        }
    }

    fn visit_call_candidate(&mut self, graph: &PackageGraph, expr: ExprId) {
        let ExprKind::Call { func, args } = &graph.exprs.get(expr).kind else {
            return;
        };
        let func = *func;
        let args = args.clone();

        let has_router_argument = args
            .iter()
            .any(|a| classify(&graph.type_of(*a), &self.framework_names) != RouterKind::Unknown);
        if has_router_argument {
            self.try_cross_package_follow(graph, func, &args);
            return;
        }

        let ExprKind::Selector { base, sel } = &graph.exprs.get(func).kind else {
            return;
        };
        let base = *base;
        let sel = sel.clone();
        let kind = classify(&graph.type_of(base), &self.framework_names);
        if kind == RouterKind::Unknown {
            return;
        }

        if sel == "Group" {
            self.dispatch_group(graph, kind, base, expr, &args);
        } else if sel == "Handle" {
            self.dispatch_handle(graph, kind, base, &args);
        } else if VERB_SHORTCUTS.contains(&sel.as_str()) {
            self.dispatch_verb(graph, kind, base, &sel, &args);
        }
        // Any other selector on a router receiver is not a recognized
        // registration call; silently ignored.
    }

    /// Follows a call into another package when one of its arguments is
    /// itself router-typed — the signature a route-registration helper
    /// function takes (`func Up(r *gin.Engine) { ... }`).
    fn try_cross_package_follow(&mut self, graph: &PackageGraph, func: ExprId, args: &[ExprId]) {
        let ExprKind::Selector { base, sel: func_name } = &graph.exprs.get(func).kind else {
            return;
        };
        let ExprKind::Ident { name: pkg_name, .. } = &graph.exprs.get(*base).kind else {
            return;
        };
        let Some(callee_pkg) = graph.package_by_name(pkg_name) else {
            return;
        };
        let Some(func_decl) = callee_pkg
            .all_funcs()
            .find(|f| f.exported && &f.name == func_name)
        else {
            return;
        };

        let key = (callee_pkg.import_path.clone(), func_decl.name.clone());
        if !self.call_stack.insert(key.clone()) {
            return;
        }

        for (param, arg) in func_decl.params.iter().zip(args.iter()) {
            self.resolver.bind(param.decl, *arg);
        }
        let body = func_decl.body.clone();
        self.visit_stmts(graph, &body);

        self.call_stack.remove(&key);
    }

    fn dispatch_group(
        &mut self,
        graph: &PackageGraph,
        kind: RouterKind,
        base: ExprId,
        call_expr: ExprId,
        args: &[ExprId],
    ) {
        let Some(prefix) = args.first().and_then(|a| fold_str(graph, *a)) else {
            return;
        };
        let Some(parent) = self.parent_group(graph, kind, base) else {
            return;
        };
        let (segment, path_params) = parse_path_template(&prefix);
        let child = self.groups.create_child(parent, segment, path_params);
        self.group_for_expr.insert(call_expr, child);
    }

    fn dispatch_handle(&mut self, graph: &PackageGraph, kind: RouterKind, base: ExprId, args: &[ExprId]) {
        let (Some(method), Some(path)) = (
            args.first().and_then(|a| fold_str(graph, *a)),
            args.get(1).and_then(|a| fold_str(graph, *a)),
        ) else {
            return;
        };
        self.emit_endpoint(graph, kind, base, method, &path, args.last().copied());
    }

    fn dispatch_verb(
        &mut self,
        graph: &PackageGraph,
        kind: RouterKind,
        base: ExprId,
        verb: &str,
        args: &[ExprId],
    ) {
        let Some(path) = args.first().and_then(|a| fold_str(graph, *a)) else {
            return;
        };
        self.emit_endpoint(graph, kind, base, verb.to_string(), &path, args.last().copied());
    }

    fn emit_endpoint(
        &mut self,
        graph: &PackageGraph,
        kind: RouterKind,
        base: ExprId,
        method: String,
        path: &str,
        handler_arg: Option<ExprId>,
    ) {
        let Some(parent) = self.parent_group(graph, kind, base) else {
            return;
        };

        let (openapi_path, mut params) = parse_path_template(path);
        let handler_result = handler_arg
            .and_then(|h| match &graph.exprs.get(h).kind {
                ExprKind::FuncLit { body, .. } => Some(analyze_handler(
                    graph,
                    &mut self.registry,
                    &self.framework_names,
                    body,
                )),
                _ => None,
            })
            .unwrap_or_else(HandlerResult::default);

        params.extend(handler_result.params);

        self.groups.push_endpoint(
            parent,
            Endpoint {
                method,
                path: openapi_path,
                params,
                request_body: handler_result.request_body,
                responses: handler_result.responses,
                description: String::new(),
            },
        );
    }

    /// Resolves the group a route registration should attach to: the root
    /// group for an `Engine` receiver (group membership never depends on a
    /// prior `Group()` call there), or the group created by whichever
    /// `Group()` call the receiver's defining expression was bound to.
    fn parent_group(&self, graph: &PackageGraph, kind: RouterKind, receiver: ExprId) -> Option<GroupId> {
        match kind {
            RouterKind::Engine => Some(self.root),
            RouterKind::RouterGroup => {
                let defining = self.resolver.resolve(graph, receiver);
                self.group_for_expr.get(&defining).copied()
            }
            RouterKind::Unknown => None,
        }
    }
}

fn fold_str(graph: &PackageGraph, expr: ExprId) -> Option<String> {
    match fold(graph, expr)? {
        Folded::Str(s) => Some(s),
        Folded::Int(_) => None,
    }
}
