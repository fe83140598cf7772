//! The output contract: `Schema`, `Parameter`, `Endpoint`, `Group`.
//!
//! These are the types the engine hands to a caller; assembling them into a
//! validated OpenAPI document is an outer concern this crate does not
//! perform.

use indexmap::IndexMap;
use serde::Serialize;

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Part of the URL path, e.g. `/users/{id}`.
    Path,
    /// A `?name=value` query string entry.
    Query,
    /// An HTTP request header.
    Header,
}

/// An OpenAPI schema tree.
///
/// Deliberately a small custom IR rather than a general-purpose OpenAPI
/// crate's schema type, since the engine only ever needs to *produce* one
/// of a handful of shapes, never parse or validate an arbitrary one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Schema {
    /// `{"type": "string"}`.
    String,
    /// `{"type": "boolean"}`.
    Boolean,
    /// `{"type": "integer"}`, with an optional explicit `format`
    /// (`"int32"` / `"int64"`).
    Integer {
        /// OpenAPI `format`, when the source type carried explicit width.
        format: Option<&'static str>,
    },
    /// `{"type": "number"}`.
    Number,
    /// `{"type": "array", "items": ...}`.
    Array(Box<Schema>),
    /// `{"type": "object", "additionalProperties": ...}`, lowered from a
    /// Go `map[K]V` (the key type is not itself representable in OpenAPI).
    Map(Box<Schema>),
    /// `{"type": "object", "properties": {...}}`.
    Object {
        /// Property name (post struct-tag resolution) to its schema, in
        /// struct field order.
        properties: IndexMap<String, Schema>,
    },
    /// An opaque schema standing in for an interface-typed value, carrying
    /// a human-readable description of the underlying type.
    Opaque {
        /// Description naming the source type, since its shape is unknown.
        description: String,
    },
    /// `#/components/schemas/<name>`, referring into the schema registry.
    Ref(String),
    /// `{"oneOf": [...]}`.
    OneOf(Vec<Schema>),
}

/// A single path/query/header parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name as it appears on the wire.
    pub name: String,
    /// Where the parameter is carried.
    pub location: ParamLocation,
    /// Whether the parameter must be present.
    pub required: bool,
    /// The parameter's schema.
    pub schema: Schema,
    /// A string default value, when the handler supplied one
    /// (`DefaultQuery`).
    pub default: Option<String>,
}

impl Parameter {
    /// Builds a path parameter with the default (string) schema, as
    /// produced by the path parser.
    pub fn path(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Path,
            required,
            schema: Schema::String,
            default: None,
        }
    }
}

/// A JSON request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// MIME content type, always `application/json` for the handler
    /// methods this engine recognizes.
    pub content_type: String,
    /// The body's schema.
    pub schema: Schema,
}

/// A single response, keyed externally by status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code, folded from the handler call's first argument.
    pub status: u16,
    /// MIME content type, when the response carries a body. `Data`'s
    /// content type is itself a folded call argument rather than one of a
    /// fixed set, so this is an owned string rather than a `&'static str`.
    pub content_type: Option<String>,
    /// The response body's schema, when known.
    pub schema: Option<Schema>,
}

/// A single discovered HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    /// HTTP method, e.g. `"GET"`, or any string folded from a `Handle`
    /// call's first argument.
    pub method: String,
    /// Relative to the parent group before flattening, absolute (beginning
    /// with `/`) afterward.
    pub path: String,
    /// All parameters: path parameters contributed by the path parser,
    /// plus query/header parameters contributed by the handler analyzer.
    pub params: Vec<Parameter>,
    /// The JSON request body, if the handler binds one.
    pub request_body: Option<RequestBody>,
    /// Responses, in the order the handler emits them; last-write-wins per
    /// status code already applied.
    pub responses: Vec<Response>,
    /// Free-form description; empty unless populated by an outer layer.
    pub description: String,
}

/// A node in the route-group forest, as built during traversal.
///
/// A group with an empty `path_segment` is the root group. The tree is
/// built once, during traversal, and never mutated afterward.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Group {
    /// This group's own path segment (e.g. `/a`), not yet concatenated with
    /// its ancestors'.
    pub path_segment: String,
    /// Path parameters contributed by this group's own segment.
    pub path_params: Vec<Parameter>,
    /// Nested groups created via `Group(prefix)` on this group.
    pub child_groups: Vec<Group>,
    /// Endpoints registered directly on this group (not on a descendant).
    pub endpoints: Vec<Endpoint>,
}

impl Group {
    /// Creates an empty root group.
    pub fn root() -> Self {
        Self::default()
    }
}
