//! Type → OpenAPI schema reference, with cycle-safe hoisting.
//!
//! The registry is the one place a self- or mutually-referential named
//! type must not cause infinite recursion: a placeholder is inserted under
//! a type's short name (its last `.`/`/`-separated segment, so a
//! component key never contains a package path) *before* its underlying
//! representation is lowered, so a recursive reference encountered
//! mid-lowering sees the name already present and simply returns a `$ref`
//! instead of expanding again.

use std::rc::Rc;

use indexmap::IndexMap;
use regex::Regex;

use crate::ast::{GoType, Primitive};
use crate::config::FrameworkTypeNames;
use crate::endpoint::Schema;
use crate::error::{AppError, AppResult};

/// Owns the `name -> schema` table built up while lowering types
/// encountered during traversal.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: IndexMap<String, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the registry, returning its `components/schemas` table.
    pub fn into_components(self) -> IndexMap<String, Schema> {
        self.entries
    }

    /// Lowers `ty` to a schema, hoisting any named type into the registry
    /// and returning a `$ref` in its place. `tag_kind` selects which
    /// struct-tag namespace (`"json"`, `"form"`, `"header"`) supplies
    /// property names for struct fields encountered during this lowering.
    ///
    /// Returns `Err(AppError::UnsupportedType)` when a field type carries no
    /// schema the registry knows how to represent; this is the one
    /// condition the error-handling design treats as a programmer-visible
    /// bug in the analyzer rather than ordinary unrecognized-pattern noise.
    pub fn to_schema_ref(
        &mut self,
        ty: &Rc<GoType>,
        tag_kind: &str,
        framework_names: &FrameworkTypeNames,
    ) -> AppResult<Schema> {
        let stripped = strip_pointers(ty);

        if let GoType::Named { name, underlying } = stripped.as_ref() {
            if name != &framework_names.engine && name != &framework_names.router_group {
                return self.hoist(name, underlying, tag_kind, framework_names);
            }
        }

        self.lower_kind(&stripped, None, tag_kind, framework_names)
    }

    fn hoist(
        &mut self,
        name: &str,
        underlying: &Rc<GoType>,
        tag_kind: &str,
        framework_names: &FrameworkTypeNames,
    ) -> AppResult<Schema> {
        let short_name = short_name(name);
        if !self.entries.contains_key(short_name) {
            // Placeholder reserves the slot before we recurse, so a cycle
            // back to this name sees it already present.
            self.entries
                .insert(short_name.to_string(), Schema::Object { properties: IndexMap::new() });
            let lowered = self
                .lower_kind(underlying, Some(name), tag_kind, framework_names)
                .unwrap_or(Schema::Object { properties: IndexMap::new() });
            self.entries.insert(short_name.to_string(), lowered);
        }
        Ok(Schema::Ref(short_name.to_string()))
    }

    fn lower_kind(
        &mut self,
        ty: &Rc<GoType>,
        source_name: Option<&str>,
        tag_kind: &str,
        framework_names: &FrameworkTypeNames,
    ) -> AppResult<Schema> {
        match ty.as_ref() {
            GoType::Pointer(inner) => self.lower_kind(
                &strip_pointers(inner),
                source_name,
                tag_kind,
                framework_names,
            ),
            GoType::Named { underlying, .. } => {
                self.lower_kind(underlying, source_name, tag_kind, framework_names)
            }
            GoType::Primitive(p) => Ok(lower_primitive(*p)),
            GoType::Interface => Ok(Schema::Opaque {
                description: source_name.unwrap_or("interface{}").to_string(),
            }),
            GoType::Map(_key, value) => {
                let value_schema = self.to_schema_ref(value, tag_kind, framework_names)?;
                Ok(Schema::Map(Box::new(value_schema)))
            }
            GoType::Slice(elem) => {
                let elem_schema = self.to_schema_ref(elem, tag_kind, framework_names)?;
                Ok(Schema::Array(Box::new(elem_schema)))
            }
            GoType::Struct(fields) => {
                let mut properties = IndexMap::new();
                for field in fields {
                    if !field.exported {
                        continue;
                    }
                    let Some(key) = resolve_tag_name(field.tag.as_deref(), tag_kind, &field.name)
                    else {
                        continue;
                    };
                    match self.to_schema_ref(&field.ty, tag_kind, framework_names) {
                        Ok(field_schema) => {
                            properties.insert(key, field_schema);
                        }
                        Err(err) => {
                            tracing::warn!(field = %field.name, %err, "field skipped");
                        }
                    }
                }
                Ok(Schema::Object { properties })
            }
            GoType::Unknown => {
                let err = AppError::UnsupportedType(
                    source_name.unwrap_or("<anonymous>").to_string(),
                );
                tracing::warn!(%err, "unsupported type during schema lowering");
                Err(err)
            }
        }
    }
}

/// The component key/ref segment a (possibly package-qualified) type name
/// is hoisted under: the part after the last `.` or `/`, so
/// `myapp/models.User` and `myapp.User` both hoist as `User`.
fn short_name(name: &str) -> &str {
    name.rsplit(['.', '/']).next().unwrap_or(name)
}

fn strip_pointers(ty: &Rc<GoType>) -> Rc<GoType> {
    let mut current = Rc::clone(ty);
    while let GoType::Pointer(inner) = current.as_ref() {
        let next = Rc::clone(inner);
        current = next;
    }
    current
}

/// Strips both `Pointer` and `Named` layers until a fixed point, exposing
/// the underlying structural type. Used where a `Bind*`-style operand's
/// type must be inspected as a struct regardless of how many pointer or
/// named-type wrappers sit on top of it.
pub(crate) fn fully_unwrap(ty: &Rc<GoType>) -> Rc<GoType> {
    let mut current = Rc::clone(ty);
    loop {
        match current.as_ref() {
            GoType::Pointer(inner) => current = Rc::clone(inner),
            GoType::Named { underlying, .. } => current = Rc::clone(underlying),
            _ => return current,
        }
    }
}

/// The exported, non-omitted fields of a (possibly wrapped) struct type,
/// resolved to their tag-derived property names for `tag_kind`. Empty for
/// any non-struct operand — the silent "no parameters" behavior a
/// non-struct argument to a `Bind*` call gets.
pub(crate) fn exported_tagged_fields(
    ty: &Rc<GoType>,
    tag_kind: &str,
) -> Vec<(String, Rc<GoType>)> {
    match fully_unwrap(ty).as_ref() {
        GoType::Struct(fields) => fields
            .iter()
            .filter(|f| f.exported)
            .filter_map(|f| {
                resolve_tag_name(f.tag.as_deref(), tag_kind, &f.name)
                    .map(|name| (name, Rc::clone(&f.ty)))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn lower_primitive(p: Primitive) -> Schema {
    match p {
        Primitive::Bool => Schema::Boolean,
        Primitive::String => Schema::String,
        Primitive::Int => Schema::Integer { format: None },
        Primitive::Int32 => Schema::Integer { format: Some("int32") },
        Primitive::Int64 => Schema::Integer { format: Some("int64") },
        Primitive::Float => Schema::Number,
    }
}

/// Resolves the property key a struct field should be lowered under, given
/// its raw tag string and the tag kind (`"json"`, `"form"`, `"header"`) in
/// effect for this lowering. Returns `None` when the tag explicitly omits
/// the field (`kind:"-"`); falls back to the field's own name when the tag
/// is absent or does not mention this kind.
fn resolve_tag_name(tag: Option<&str>, kind: &str, field_name: &str) -> Option<String> {
    let tag = tag?;
    let pattern = format!(r#"{}:"([^"]*)""#, regex::escape(kind));
    let re = Regex::new(&pattern).ok()?;
    match re.captures(tag) {
        Some(cap) => {
            let value = cap[1].split(',').next().unwrap_or("");
            match value {
                "-" => None,
                "" => Some(field_name.to_string()),
                name => Some(name.to_string()),
            }
        }
        None => Some(field_name.to_string()),
    }
}
