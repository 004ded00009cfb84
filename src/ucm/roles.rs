//! Space separated media role lists.

/// Returns true if `role` appears in the space separated list `roles`, ignoring ASCII case.
pub fn role_match(roles: &str, role: &str) -> bool {
    roles
        .split_ascii_whitespace()
        .any(|r| r.eq_ignore_ascii_case(role))
}

/// Merges the role list `add` into `cur`.
///
/// Roles from `add` are appended in order, skipping any already present in `cur`. If either
/// side is absent or empty, the result is a copy of the other.
pub fn merge_roles(cur: Option<&str>, add: Option<&str>) -> Option<String> {
    let cur = cur.filter(|s| !s.trim().is_empty());
    let add = add.filter(|s| !s.trim().is_empty());

    match (cur, add) {
        (None, None) => None,
        (Some(cur), None) => Some(cur.to_owned()),
        (None, Some(add)) => Some(add.to_owned()),
        (Some(cur), Some(add)) => {
            let mut merged = cur.to_owned();
            for role in add.split_ascii_whitespace() {
                if !role_match(&merged, role) {
                    merged.push(' ');
                    merged.push_str(role);
                }
            }

            Some(merged)
        }
    }
}
