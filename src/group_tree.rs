//! Nested route groups → a flattened list of absolute endpoints.

use crate::endpoint::{Endpoint, Group, Parameter};
use crate::path_parser::join_paths;

/// Flattens the group forest built during traversal, depth-first. Each
/// endpoint's path becomes absolute (concatenation of every ancestor
/// group's segment with its own, renormalized); each endpoint's parameter
/// list becomes its own parameters followed by every ancestor group's path
/// parameters, innermost ancestor first.
pub fn flatten(root: &Group) -> Vec<Endpoint> {
    let mut out = Vec::new();
    flatten_into(root, "", &[], &mut out);
    out
}

fn flatten_into(
    group: &Group,
    parent_path: &str,
    ancestor_params: &[Parameter],
    out: &mut Vec<Endpoint>,
) {
    let path_here = join_paths(parent_path, &group.path_segment);

    let mut combined: Vec<Parameter> = group.path_params.clone();
    combined.extend(ancestor_params.iter().cloned());

    for endpoint in &group.endpoints {
        let mut params = endpoint.params.clone();
        params.extend(combined.iter().cloned());
        out.push(Endpoint {
            method: endpoint.method.clone(),
            path: join_paths(&path_here, &endpoint.path),
            params,
            request_body: endpoint.request_body.clone(),
            responses: endpoint.responses.clone(),
            description: endpoint.description.clone(),
        });
    }

    for child in &group.child_groups {
        flatten_into(child, &path_here, &combined, out);
    }
}
