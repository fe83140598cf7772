//! Route template → OpenAPI path + path parameters.

use std::sync::OnceLock;

use regex::Regex;

use crate::endpoint::Parameter;

fn param_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/([:*])([^/]+)").unwrap())
}

/// Translates a raw route template into its OpenAPI path plus the path
/// parameters it names.
///
/// A segment beginning with `/:` or `/*` and followed by one or more
/// non-`/` characters is a parameter; `:` is required, `*` (a catch-all)
/// is not. A marker immediately followed by `/` or the end of the string
/// has an empty name and is left as a literal segment, matching the
/// original framework's own route-compilation behavior.
pub fn parse_path_template(template: &str) -> (String, Vec<Parameter>) {
    let mut params = Vec::new();
    let mut out = String::with_capacity(template.len());
    let mut last_end = 0;

    for cap in param_segment_re().captures_iter(template) {
        let whole = cap.get(0).unwrap();
        out.push_str(&template[last_end..whole.start()]);
        let marker = &cap[1];
        let name = &cap[2];
        out.push_str("/{");
        out.push_str(name);
        out.push('}');
        params.push(Parameter::path(name, marker == ":"));
        last_end = whole.end();
    }
    out.push_str(&template[last_end..]);

    (normalize_path(&out), params)
}

/// Normalizes a path to begin with exactly one `/` and carry no trailing
/// `/`, collapsing the empty string (or an all-slash input) to `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Concatenates a parent (already-normalized) path with a child's own raw
/// segment, renormalizing the result. Used both for group flattening and
/// for joining a group's accumulated prefix onto one of its endpoints.
pub fn join_paths(parent: &str, child: &str) -> String {
    if child.is_empty() {
        return normalize_path(parent);
    }
    normalize_path(&format!("{parent}/{child}"))
}
