//! Backend code generators — trait-based language dispatch.

pub mod go;
pub mod python;
pub mod rust;
pub mod typescript;

use crate::model::{TypeInfo, TypeKind};
use anyhow::{anyhow, Result};
use regex::Regex;

/// Trait for rendering a [`crate::model::StructData`] into one language's
/// source text.
pub trait Generator {
    fn generate(&self, data: &crate::model::StructData) -> String;
}

/// Create a generator for the given language name.
pub fn create_generator(lang: &str) -> Result<Box<dyn Generator>> {
    match lang {
        "typescript" | "ts" => Ok(Box::new(typescript::TypescriptGenerator)),
        "python" | "py" => Ok(Box::new(python::PythonGenerator)),
        "rust" | "rs" => Ok(Box::new(rust::RustGenerator)),
        "go" => Ok(Box::new(go::GoGenerator)),
        _ => Err(anyhow!(
            "unknown language: {}. Use typescript, python, rust, or go",
            lang
        )),
    }
}

/// One entry of a language's type-mapping table. Entries are evaluated top to
/// bottom, first match wins, so specific patterns must precede general
/// fallbacks.
pub(crate) enum Matcher {
    Exact(&'static str),
    Pattern(Regex),
}

impl Matcher {
    pub(crate) fn pattern(re: &str) -> Matcher {
        Matcher::Pattern(Regex::new(re).expect("type-map pattern is valid"))
    }
}

pub(crate) fn map_type(table: &[(Matcher, &'static str)], input: &str) -> Option<&'static str> {
    for (matcher, target) in table {
        let hit = match matcher {
            Matcher::Exact(k) => input == *k,
            Matcher::Pattern(re) => re.is_match(input),
        };
        if hit {
            return Some(target);
        }
    }
    None
}

/// Shared pattern source for the integer-family tokens.
pub(crate) const INT_PATTERN: &str = r"(?i)^(signed|unsigned)?\s?(byte|short|integer)";
/// Shared pattern source for binary-blob tokens.
pub(crate) const BINARY_PATTERN: &str = r"(?i)^binary data";

/// Plain text of a `TypeInfo` for comment positions: primitives and
/// references verbatim, multilines joined, structured kinds re-serialized
/// into the annotation grammar so nothing ever panics on unexpected shapes.
pub(crate) fn plain_text(info: &TypeInfo) -> String {
    match &info.kind {
        TypeKind::Primitive(s) | TypeKind::Reference(s) => s.clone(),
        TypeKind::Multiline(lines) => lines.join("\n"),
        TypeKind::Array(inner) => format!("array[{}]", plain_text(inner)),
        TypeKind::Tuple(elements) => format!(
            "array[{}]",
            elements.iter().map(plain_text).collect::<Vec<_>>().join(", ")
        ),
        TypeKind::Map(key, value) => {
            format!("map[{}, {}]", plain_text(key), plain_text(value))
        }
    }
}

pub(crate) fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// Strip a leading or trailing `?` from a field name.
pub(crate) fn strip_question(s: &str) -> &str {
    let s = s.strip_prefix('?').unwrap_or(s);
    s.strip_suffix('?').unwrap_or(s)
}

/// A field marked `(deprecated)` in its name cell.
pub(crate) fn is_deprecated_field(field_text: &str) -> bool {
    field_text.contains("(deprecated)")
}

/// Whether an enum value is a plain integer literal.
pub(crate) fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Split a bitfield value `1 << 5` into its halves.
pub(crate) fn split_shift(value: &str) -> Option<(&str, &str)> {
    let (left, right) = value.split_once("<<")?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}
