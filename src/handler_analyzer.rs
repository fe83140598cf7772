//! Route handler literal → parameters, request body, and responses.

use indexmap::IndexMap;

use crate::ast::{ExprId, ExprKind, PackageGraph, Stmt};
use crate::config::FrameworkTypeNames;
use crate::constfold::{fold, Folded};
use crate::endpoint::{ParamLocation, Parameter, RequestBody, Response, Schema};
use crate::schema::{exported_tagged_fields, SchemaRegistry};

/// Everything a handler body contributes to its endpoint.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HandlerResult {
    /// Query and header parameters discovered in the handler body.
    pub params: Vec<Parameter>,
    /// The JSON request body, if any `*BindJSON` call was found (already
    /// flattened when only one alternative was collected).
    pub request_body: Option<RequestBody>,
    /// Responses, status-deduplicated with last-write-wins, in
    /// first-occurrence order.
    pub responses: Vec<Response>,
}

/// Walks `body`, dispatching on every call whose receiver's recorded type
/// is a pointer to the configured framework context type.
pub fn analyze_handler(
    graph: &PackageGraph,
    registry: &mut SchemaRegistry,
    framework_names: &FrameworkTypeNames,
    body: &[Stmt],
) -> HandlerResult {
    let mut params = Vec::new();
    let mut body_schemas = Vec::new();
    let mut responses: IndexMap<u16, Response> = IndexMap::new();

    for call in collect_calls(body) {
        let ExprKind::Call { func, args } = &graph.exprs.get(call).kind else {
            continue;
        };
        let ExprKind::Selector { base, sel } = &graph.exprs.get(*func).kind else {
            continue;
        };
        if graph.type_of(*base).canonical_name().as_deref() != Some(framework_names.context.as_str())
        {
            continue;
        }

        dispatch_method(
            graph,
            registry,
            framework_names,
            sel,
            args,
            &mut params,
            &mut body_schemas,
            &mut responses,
        );
    }

    let request_body = flatten_body_schemas(body_schemas);

    HandlerResult {
        params,
        request_body,
        responses: responses.into_values().collect(),
    }
}

fn dispatch_method(
    graph: &PackageGraph,
    registry: &mut SchemaRegistry,
    framework_names: &FrameworkTypeNames,
    method: &str,
    args: &[ExprId],
    params: &mut Vec<Parameter>,
    body_schemas: &mut Vec<Schema>,
    responses: &mut IndexMap<u16, Response>,
) {
    match method {
        "Query" => {
            if let Some(name) = fold_str(graph, args.first().copied()) {
                params.push(string_param(ParamLocation::Query, name, None));
            }
        }
        "DefaultQuery" => {
            if let Some(name) = fold_str(graph, args.first().copied()) {
                let default = fold_str(graph, args.get(1).copied());
                params.push(string_param(ParamLocation::Query, name, default));
            }
        }
        "ShouldBindQuery" | "BindQuery" => {
            push_bound_fields(graph, args.first().copied(), "form", ParamLocation::Query, params);
        }
        "GetHeader" => {
            if let Some(name) = fold_str(graph, args.first().copied()) {
                params.push(string_param(ParamLocation::Header, name, None));
            }
        }
        "ShouldBindHeader" | "BindHeader" => {
            push_bound_fields(graph, args.first().copied(), "header", ParamLocation::Header, params);
        }
        "ShouldBindJSON" | "BindJSON" => {
            if let Some(operand) = args.first() {
                let ty = graph.type_of(*operand);
                if let Ok(schema) = registry.to_schema_ref(&ty, "json", framework_names) {
                    body_schemas.push(schema);
                }
            }
        }
        "AbortWithError" | "AbortWithStatus" => {
            if let Some(status) = fold_status(graph, args.first().copied()) {
                record_response(responses, status, None, None);
            }
        }
        "AbortWithStatusJSON" | "AsciiJSON" | "IndentedJSON" | "JSON" | "PureJSON"
        | "SecureJSON" => {
            record_tagged_response(
                graph,
                registry,
                framework_names,
                args,
                "json",
                "application/json",
                responses,
            );
        }
        "Data" => {
            if let (Some(status), Some(ct)) = (
                fold_status(graph, args.first().copied()),
                fold_str(graph, args.get(1).copied()),
            ) {
                record_response(responses, status, Some(ct), None);
            }
        }
        "DataFromReader" => {
            if let (Some(status), Some(ct)) = (
                fold_status(graph, args.first().copied()),
                fold_str(graph, args.get(2).copied()),
            ) {
                record_response(responses, status, Some(ct), None);
            }
        }
        "HTML" | "Render" => {
            if let Some(status) = fold_status(graph, args.first().copied()) {
                record_response(responses, status, Some("text/html".to_string()), None);
            }
        }
        "JSONP" => {
            record_tagged_response(
                graph,
                registry,
                framework_names,
                args,
                "json",
                "application/javascript",
                responses,
            );
        }
        "XML" => {
            record_tagged_response(graph, registry, framework_names, args, "xml", "text/xml", responses);
        }
        "YAML" => {
            record_tagged_response(graph, registry, framework_names, args, "yaml", "text/yaml", responses);
        }
        "Redirect" | "Status" | "String" => {
            if let Some(status) = fold_status(graph, args.first().copied()) {
                record_response(responses, status, None, None);
            }
        }
        _ => {}
    }
}

fn record_tagged_response(
    graph: &PackageGraph,
    registry: &mut SchemaRegistry,
    framework_names: &FrameworkTypeNames,
    args: &[ExprId],
    tag_kind: &str,
    content_type: &str,
    responses: &mut IndexMap<u16, Response>,
) {
    let Some(status) = fold_status(graph, args.first().copied()) else {
        return;
    };
    let schema = args
        .get(1)
        .and_then(|v| registry.to_schema_ref(&graph.type_of(*v), tag_kind, framework_names).ok());
    record_response(responses, status, Some(content_type.to_string()), schema);
}

fn record_response(
    responses: &mut IndexMap<u16, Response>,
    status: u16,
    content_type: Option<String>,
    schema: Option<Schema>,
) {
    responses.insert(
        status,
        Response {
            status,
            content_type,
            schema,
        },
    );
}

fn push_bound_fields(
    graph: &PackageGraph,
    operand: Option<ExprId>,
    tag_kind: &str,
    location: ParamLocation,
    params: &mut Vec<Parameter>,
) {
    let Some(operand) = operand else { return };
    let ty = graph.type_of(operand);
    for (name, field_ty) in exported_tagged_fields(&ty, tag_kind) {
        params.push(Parameter {
            name,
            location,
            required: false,
            schema: primitive_or_string_schema(&field_ty),
            default: None,
        });
    }
}

/// Bind-derived query/header parameters always carry a schema even when
/// the field's type can't be lowered through the full registry (a
/// parameter must have *some* schema); unsupported field types degrade to
/// `Schema::String` rather than vanishing, unlike a JSON body field.
fn primitive_or_string_schema(ty: &crate::ast::GoType) -> Schema {
    use crate::ast::{GoType, Primitive};
    match ty {
        GoType::Primitive(Primitive::Bool) => Schema::Boolean,
        GoType::Primitive(Primitive::Int) => Schema::Integer { format: None },
        GoType::Primitive(Primitive::Int32) => Schema::Integer { format: Some("int32") },
        GoType::Primitive(Primitive::Int64) => Schema::Integer { format: Some("int64") },
        GoType::Primitive(Primitive::Float) => Schema::Number,
        _ => Schema::String,
    }
}

fn string_param(location: ParamLocation, name: String, default: Option<String>) -> Parameter {
    Parameter {
        name,
        location,
        required: false,
        schema: Schema::String,
        default,
    }
}

fn fold_str(graph: &PackageGraph, expr: Option<ExprId>) -> Option<String> {
    match fold(graph, expr?)? {
        Folded::Str(s) => Some(s),
        Folded::Int(_) => None,
    }
}

fn fold_status(graph: &PackageGraph, expr: Option<ExprId>) -> Option<u16> {
    match fold(graph, expr?)? {
        Folded::Int(i) => u16::try_from(i).ok(),
        Folded::Str(_) => None,
    }
}

/// Flattens the JSON bodies collected from (possibly multiple)
/// `*BindJSON` calls: a single body is returned as-is; more than one
/// combines into a `oneOf`; none yields no request body.
fn flatten_body_schemas(schemas: Vec<Schema>) -> Option<RequestBody> {
    let schema = match schemas.len() {
        0 => return None,
        1 => schemas.into_iter().next().unwrap(),
        _ => Schema::OneOf(schemas),
    };
    Some(RequestBody {
        content_type: "application/json".to_string(),
        schema,
    })
}

/// Collects, in source order, every call expression reachable by walking
/// statements (expression statements, assignment right-hand sides, and `if`
/// conditions), descending into nested blocks and branches.
fn collect_calls(body: &[Stmt]) -> Vec<ExprId> {
    let mut calls = Vec::new();
    collect_calls_into(body, &mut calls);
    calls
}

fn collect_calls_into(body: &[Stmt], out: &mut Vec<ExprId>) {
    for stmt in body {
        match stmt {
            Stmt::Expr(e) => out.push(*e),
            Stmt::Assign { rhs, .. } => out.extend(rhs.iter().copied()),
            Stmt::Block(inner) => collect_calls_into(inner, out),
            Stmt::If { cond, then_branch, else_branch } => {
                out.push(*cond);
                collect_calls_into(then_branch, out);
                if let Some(else_branch) = else_branch {
                    collect_calls_into(else_branch, out);
                }
            }
        }
    }
}
