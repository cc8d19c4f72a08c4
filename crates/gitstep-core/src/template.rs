//! Commit message and branch name templates.
//!
//! Templates use `{var}` placeholders. Substitution is a single pass over the
//! template, so a value that itself contains `{...}` is never expanded again.
//! Placeholders with no matching variable are left in place verbatim.

/// Variables understood by commit templates.
pub const COMMIT_VARS: &[&str] = &["type", "scope", "breaking", "message"];

/// Variables understood by branch templates.
pub const BRANCH_VARS: &[&str] = &["type", "description"];

/// Expand `{name}` placeholders from `vars`.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        let name = &after[..close];
        match vars.iter().find(|(var, _)| *var == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Placeholder names in `template` that are not in `known`.
pub fn unknown_placeholders(template: &str, known: &[&str]) -> Vec<String> {
    let mut unknown = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !known.contains(&name) && !unknown.iter().any(|u| u == name) {
            unknown.push(name.to_string());
        }
        rest = &after[close + 1..];
    }
    unknown
}

/// Render a commit subject line.
///
/// `{scope}` becomes `(scope)` when a scope is given and nothing otherwise;
/// `{breaking}` becomes `!` or nothing.
pub fn commit_subject(
    template: &str,
    kind: &str,
    scope: Option<&str>,
    breaking: bool,
    message: &str,
) -> String {
    let scope = scope
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("({s})"))
        .unwrap_or_default();
    let breaking = if breaking { "!" } else { "" };
    interpolate(
        template,
        &[
            ("type", kind),
            ("scope", &scope),
            ("breaking", breaking),
            ("message", message.trim()),
        ],
    )
}

/// Render a branch name. The description is slugified first.
pub fn branch_name(template: &str, kind: &str, description: &str) -> String {
    interpolate(
        template,
        &[("type", kind), ("description", &slugify(description))],
    )
}

/// Lowercase `input` and collapse every run of non-alphanumeric characters
/// into a single `-`, trimming dashes from both ends.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
