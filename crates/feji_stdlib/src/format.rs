//! `${}` templates.
//!
//! A template mixes literal text with placeholders:
//! - `${name}` or `${component.name}` reads a field of the entity being
//!   formatted
//! - `${}` takes the next positional value
//! - `$${` is a literal `${`
//!
//! Values render through their `Display` impl, so integers print without a
//! decimal point and `2.0` prints as `2`.

use std::fmt::Write as _;

use feji_foundation::{Error, Result, Value};
use feji_storage::EntityView;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Positional,
    Named(String),
}

/// A parsed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    positional: usize,
}

impl Template {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Fails on an unterminated `${` or a placeholder that is not a field
    /// path.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut positional = 0;
        let mut rest = source;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix("$${") {
                literal.push_str("${");
                rest = after;
            } else if let Some(after) = tail.strip_prefix("${") {
                let end = after.find('}').ok_or_else(|| {
                    Error::format(format!(
                        "unterminated placeholder at byte {}",
                        source.len() - tail.len()
                    ))
                })?;
                let name = after[..end].trim();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                if name.is_empty() {
                    positional += 1;
                    segments.push(Segment::Positional);
                } else if is_field_path(name) {
                    segments.push(Segment::Named(name.to_string()));
                } else {
                    return Err(Error::format(format!("invalid placeholder ${{{name}}}")));
                }
                rest = &after[end + 1..];
            } else {
                literal.push('$');
                rest = &tail[1..];
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            segments,
            positional,
        })
    }

    /// Field paths named by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Named(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Number of `${}` placeholders.
    #[must_use]
    pub fn positional_count(&self) -> usize {
        self.positional
    }

    /// Renders the template.
    ///
    /// # Errors
    ///
    /// Fails if the number of `values` differs from the number of `${}`
    /// placeholders, if a named placeholder has no entity to read from, or
    /// if a field does not resolve on the entity.
    pub fn render(&self, entity: Option<&EntityView<'_>>, values: &[Value]) -> Result<String> {
        if values.len() != self.positional {
            return Err(Error::format(format!(
                "template takes {} positional values, got {}",
                self.positional,
                values.len()
            )));
        }

        let mut out = String::new();
        let mut next = values.iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Positional => {
                    if let Some(value) = next.next() {
                        let _ = write!(out, "{value}");
                    }
                }
                Segment::Named(path) => {
                    let view = entity.ok_or_else(|| {
                        Error::format(format!("${{{path}}} needs an entity to read from"))
                    })?;
                    let _ = write!(out, "{}", view.resolve(path)?);
                }
            }
        }
        Ok(out)
    }
}

/// Parses and renders in one call.
///
/// # Errors
///
/// See [`Template::parse`] and [`Template::render`].
pub fn format(template: &str, entity: Option<&EntityView<'_>>, values: &[Value]) -> Result<String> {
    Template::parse(template)?.render(entity, values)
}

fn is_field_path(name: &str) -> bool {
    let mut parts = 0;
    for part in name.split('.') {
        parts += 1;
        let valid = part
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return false;
        }
    }
    parts <= 2
}
