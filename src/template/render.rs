//! Placeholder substitution
//!
//! An explicit scanner over `{name}` placeholders. Names are restricted to
//! the identifier alphabet [A-Za-z0-9_]. `{{` and `}}` escape to literal
//! braces; an unescaped bare `}` is malformed, as is an unclosed `{`.
//! Substitution is single-pass: substituted values are never re-scanned,
//! so a value containing `{other}` stays as-is.
//!
//! Undefined variables are an error rather than a silent empty substitution.
//! Bindings not referenced by any placeholder are ignored.

use super::prompt::Bindings;
use crate::error::{PromptrError, Result};

/// One parsed piece of a template string
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    /// Literal text, escapes already resolved
    Literal(String),
    /// A `{name}` substitution site
    Placeholder(String),
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a template into literal and placeholder segments.
fn parse_segments(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    literal.push('{');
                    continue;
                }

                let mut name = String::new();
                let closed = loop {
                    match chars.next() {
                        Some((_, '}')) => break true,
                        Some((_, c)) => name.push(c),
                        None => break false,
                    }
                };

                if !closed {
                    return Err(PromptrError::UnclosedPlaceholder { position: pos });
                }
                if name.is_empty() {
                    return Err(PromptrError::EmptyPlaceholder { position: pos });
                }
                if !name.chars().all(is_identifier_char) {
                    return Err(PromptrError::InvalidPlaceholderName {
                        name,
                        position: pos,
                    });
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            '}' => {
                // Only the }} escape produces a literal }
                match chars.peek() {
                    Some((_, '}')) => {
                        chars.next();
                        literal.push('}');
                    }
                    _ => {
                        return Err(PromptrError::UnmatchedClosingBrace { position: pos });
                    }
                }
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Substitute every `{name}` in `template` with `bindings[name]`.
pub fn render_text(template: &str, bindings: &Bindings) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for segment in parse_segments(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Placeholder(name) => match bindings.get(&name) {
                Some(value) => out.push_str(value),
                None => return Err(PromptrError::MissingVariable(name)),
            },
        }
    }
    Ok(out)
}

/// Collect the placeholder names referenced by `template`, in order of
/// first appearance. Malformed placeholders are reported the same way
/// `render_text` reports them.
pub fn scan_variables(template: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse_segments(template)? {
        if let Segment::Placeholder(name) = segment
            && !names.contains(&name)
        {
            names.push(name);
        }
    }
    Ok(names)
}
