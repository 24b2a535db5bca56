//! Data model for parsed documentation tables — format-agnostic.
//!
//! `TypeInfo` is the recursive representation of one type annotation as it
//! appears in a table cell (`array[?integer]`, `map[snowflake, string]`,
//! `"foo" object`, …). `StructData` is the parsed shape of one whole table.

use heck::ToUpperCamelCase;

/// The structural variant of a parsed type annotation.
///
/// Exactly one variant is populated per `TypeInfo`; the `optional` flag on
/// [`TypeInfo`] is orthogonal and may co-occur with any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A bare word run, stored verbatim (`"snowflake"`, `"signed integer"`,
    /// `"ISO8601 timestamp"`). Also the fallback for malformed annotations.
    Primitive(String),
    /// A token sequence ending in the literal word `object`, converted to
    /// PascalCase with the suffix stripped (`"partial guild object"` →
    /// `PartialGuild`).
    Reference(String),
    /// `array[T]`
    Array(Box<TypeInfo>),
    /// `array[T1, T2, …]`
    Tuple(Vec<TypeInfo>),
    /// `map[K, V]`
    Map(Box<TypeInfo>, Box<TypeInfo>),
    /// Free-form prose, one entry per rendered line (descriptions).
    Multiline(Vec<String>),
}

/// One parsed type annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub kind: TypeKind,
    /// Set when the raw text began with `?` (nullable position).
    pub optional: bool,
}

impl TypeInfo {
    /// Parse a single-line cell text into a `TypeInfo`.
    ///
    /// Grammar, in match order:
    /// 1. leading `?` → strip and set `optional`
    /// 2. trailing word `object` (with at least one preceding word) → Reference
    /// 3. `array[…]` → Array, or Tuple when the interior splits on a
    ///    top-level comma
    /// 4. `map[K, V]` → Map, split on the first top-level comma
    /// 5. anything else → Primitive, stored verbatim
    ///
    /// Bracketed text that fails rules 3–4 (unbalanced, empty interior) falls
    /// back to Primitive and reports a warning into `warnings`.
    pub fn parse(text: &str, warnings: &mut Vec<String>) -> TypeInfo {
        let mut text = text.trim();
        let mut optional = false;

        if let Some(rest) = text.strip_prefix('?') {
            optional = true;
            text = rest.trim_start();
        }

        // Named reference: `some thing object` → SomeThing
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() > 1 && *words.last().unwrap() == "object" {
            let name = words[..words.len() - 1].join(" ").to_upper_camel_case();
            return TypeInfo {
                kind: TypeKind::Reference(name),
                optional,
            };
        }

        if let Some(interior) = text.strip_prefix("array[").and_then(|r| r.strip_suffix(']')) {
            let parts = split_top_level(interior);
            if parts.len() > 1 {
                let elements = parts
                    .iter()
                    .map(|p| TypeInfo::parse(p, warnings))
                    .collect();
                return TypeInfo {
                    kind: TypeKind::Tuple(elements),
                    optional,
                };
            }
            if let Some(inner) = parts.first().filter(|p| !p.is_empty()) {
                let inner = TypeInfo::parse(inner, warnings);
                return TypeInfo {
                    kind: TypeKind::Array(Box::new(inner)),
                    optional,
                };
            }
            warnings.push(format!("unparsed type annotation \"{text}\""));
            return TypeInfo {
                kind: TypeKind::Primitive(text.to_string()),
                optional,
            };
        }

        if let Some(interior) = text.strip_prefix("map[").and_then(|r| r.strip_suffix(']')) {
            let parts = split_top_level(interior);
            if parts.len() == 2 && parts.iter().all(|p| !p.is_empty()) {
                let key = TypeInfo::parse(parts[0], warnings);
                let value = TypeInfo::parse(parts[1], warnings);
                return TypeInfo {
                    kind: TypeKind::Map(Box::new(key), Box::new(value)),
                    optional,
                };
            }
            warnings.push(format!("unparsed type annotation \"{text}\""));
            return TypeInfo {
                kind: TypeKind::Primitive(text.to_string()),
                optional,
            };
        }

        // Unterminated bracket syntax lands here.
        if text.starts_with("array[") || text.starts_with("map[") {
            warnings.push(format!("unparsed type annotation \"{text}\""));
        }

        TypeInfo {
            kind: TypeKind::Primitive(text.to_string()),
            optional,
        }
    }

    /// Build a multiline `TypeInfo` from already-split lines, skipping the
    /// single-line grammar entirely.
    pub fn multiline(lines: Vec<String>) -> TypeInfo {
        TypeInfo {
            kind: TypeKind::Multiline(lines),
            optional: false,
        }
    }

    /// A plain primitive token, used for titles and synthesized cells.
    pub fn text(value: impl Into<String>) -> TypeInfo {
        TypeInfo {
            kind: TypeKind::Primitive(value.into()),
            optional: false,
        }
    }

    /// The verbatim text of a Primitive or Reference variant.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Primitive(s) | TypeKind::Reference(s) => Some(s),
            _ => None,
        }
    }

    /// Lines of a Multiline variant.
    pub fn lines(&self) -> Option<&[String]> {
        match &self.kind {
            TypeKind::Multiline(lines) => Some(lines),
            _ => None,
        }
    }
}

/// Split `text` on commas that are not inside `[…]` brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// The kind of declaration a documentation table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Struct,
    Enum,
    Event,
    Bitfield,
}

/// One body row of a parsed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Field name (struct), variant name (enum/bitfield), or event name.
    pub field: TypeInfo,
    /// Field type (struct), value (enum/bitfield/event).
    pub ty: TypeInfo,
    pub description: Option<TypeInfo>,
    /// Columns beyond the canonical three: `(header, cell)` pairs.
    pub other_columns: Vec<(TypeInfo, TypeInfo)>,
}

/// The parsed shape of one documentation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructData {
    pub kind: TableKind,
    /// Normalized declared name (PascalCased heading text).
    pub title: TypeInfo,
    /// Prose between the heading and the table, as a Multiline.
    pub description: Option<TypeInfo>,
    pub contents: Vec<Row>,
}
