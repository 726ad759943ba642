//! URL template rendering.
//!
//! Package locations are written as templates with `{placeholder}` fields:
//!
//! ```text
//! {host}/desktop/{branch}/{version}/{build}/desktop-{version}-{build}.x86_64.rpm
//! ```
//!
//! - `{name}` - replaced with the value bound to `name`
//! - `{{` / `}}` - literal `{` / `}`

use std::collections::HashMap;

use thiserror::Error;

use crate::version::Version;

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Placeholder reference: {name}
    Placeholder(String),
}

/// Why a single template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template references a key that has no binding.
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    /// A `{` without a matching `}`, or a stray `}`.
    #[error("unbalanced brace at offset {0}")]
    UnbalancedBrace(usize),
}

/// Split a template into literal and placeholder segments.
pub fn parse_template(input: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }

                let mut key = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    if c == '{' {
                        return Err(TemplateError::UnbalancedBrace(offset));
                    }
                    key.push(c);
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace(offset));
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(key));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBrace(offset));
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Values available to URL templates.
#[derive(Debug, Default, Clone)]
pub struct TemplateContext {
    values: HashMap<&'static str, String>,
}

impl TemplateContext {
    /// Bindings for one build: `host`, `version`, `build` and `branch`.
    pub fn for_version(host: &str, version: &Version) -> Self {
        let mut values = HashMap::new();
        values.insert("host", host.to_string());
        values.insert("version", version.without_build());
        values.insert("build", version.build.to_string());
        values.insert("branch", version.branch().to_string());
        Self { values }
    }

    /// Look up a placeholder value.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Render a template against a context.
///
/// # Errors
///
/// Returns [`TemplateError`] for unknown placeholders or unbalanced braces.
pub fn render(template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    for segment in parse_template(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Placeholder(key) => {
                let value = context
                    .resolve(&key)
                    .ok_or(TemplateError::UnknownPlaceholder(key))?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
