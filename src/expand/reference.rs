//! Parse and render `{{.path}}` variable templates.

use crate::error::ExpandError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart<'a> {
    Lit(&'a str),
    /// Variable path without the leading dot, e.g. `workflow.params.tag`.
    Var(&'a str),
}

/// Split `input` into literal and variable parts.
pub fn parse_template(input: &str) -> Result<Vec<TemplatePart<'_>>, ExpandError> {
    let mut parts = Vec::new();
    let mut remaining = input;

    while let Some(start) = remaining.find("{{") {
        if start > 0 {
            parts.push(TemplatePart::Lit(&remaining[..start]));
        }

        let after_open = &remaining[start + 2..];
        let Some(end) = after_open.find("}}") else {
            return Err(ExpandError::MalformedExpression(input.to_string()));
        };
        let inner = after_open[..end].trim();
        let path = inner
            .strip_prefix('.')
            .filter(|p| !p.is_empty() && !p.contains(char::is_whitespace))
            .ok_or_else(|| ExpandError::MalformedExpression(input.to_string()))?;
        parts.push(TemplatePart::Var(path));
        remaining = &after_open[end + 2..];
    }

    if !remaining.is_empty() {
        parts.push(TemplatePart::Lit(remaining));
    }

    Ok(parts)
}

/// Variable paths referenced by `input`. Malformed templates yield nothing;
/// rendering reports them.
pub fn references(input: &str) -> Vec<&str> {
    parse_template(input)
        .map(|parts| {
            parts
                .into_iter()
                .filter_map(|p| match p {
                    TemplatePart::Var(path) => Some(path),
                    TemplatePart::Lit(_) => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Substitute every variable in `input` through `resolve`.
pub fn render<F>(input: &str, mut resolve: F) -> Result<String, ExpandError>
where
    F: FnMut(&str) -> Result<String, ExpandError>,
{
    let mut out = String::with_capacity(input.len());
    for part in parse_template(input)? {
        match part {
            TemplatePart::Lit(lit) => out.push_str(lit),
            TemplatePart::Var(path) => out.push_str(&resolve(path)?),
        }
    }
    Ok(out)
}

/// Split `job.<name>.output.<key>` into `(name, key)`.
pub fn job_output_ref(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix("job.")?;
    let (job, key) = rest.split_once(".output.")?;
    if job.is_empty() || key.is_empty() {
        return None;
    }
    Some((job, key))
}

/// The template text for `path`, used when a reference is left for runtime.
pub fn placeholder(path: &str) -> String {
    format!("{{{{.{path}}}}}")
}
