//! Rust backend.

use std::sync::LazyLock;

use crate::generate::{
    first_word, is_deprecated_field, is_numeric, map_type, plain_text, strip_question, Generator,
    Matcher, BINARY_PATTERN, INT_PATTERN,
};
use crate::model::{Row, StructData, TableKind, TypeInfo, TypeKind};

static TYPE_MAP: LazyLock<Vec<(Matcher, &'static str)>> = LazyLock::new(|| {
    vec![
        (Matcher::Exact("string"), "String"),
        (Matcher::Exact("str"), "String"),
        (Matcher::Exact("boolean"), "bool"),
        (Matcher::Exact("float"), "f64"),
        (Matcher::Exact("snowflake"), "Snowflake"),
        (Matcher::Exact("ISO8601 timestamp"), "Timestamp"),
        (Matcher::Exact("ISO8601 date"), "Timestamp"),
        (Matcher::Exact("file contents"), "Vec<u8>"),
        (Matcher::pattern(BINARY_PATTERN), "Vec<u8>"),
        // i64 just to be safe
        (Matcher::pattern(INT_PATTERN), "i64"),
    ]
});

/// Field names that need `r#` escaping.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
];

pub struct RustGenerator;

impl Generator for RustGenerator {
    fn generate(&self, data: &StructData) -> String {
        let title = plain_text(&data.title);
        let mut output = String::new();

        write_header_docs(&mut output, data);

        match data.kind {
            TableKind::Struct => write_struct(&mut output, data, &title),
            TableKind::Enum | TableKind::Event | TableKind::Bitfield => {
                write_enum(&mut output, data, &title);
            }
        }

        output.push('\n');
        output
    }
}

fn write_header_docs(output: &mut String, data: &StructData) {
    let Some(lines) = data.description.as_ref().and_then(|d| d.lines()) else {
        return;
    };
    for line in lines {
        output.push_str(&format!("/// {line}\n"));
    }
}

fn write_member_docs(output: &mut String, row: &Row) {
    if let Some(description) = row.description.as_ref().map(plain_text) {
        if !description.is_empty() {
            output.push_str(&format!("\t/// {description}\n"));
        }
    }
    for (header, value) in &row.other_columns {
        output.push_str(&format!(
            "\t/// {}: {}\n",
            plain_text(header),
            plain_text(value)
        ));
    }
}

fn write_struct(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("pub struct {title} {{\n"));

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let undefinable = first_word(&raw_field).ends_with('?');
        let field = escape_keyword(strip_question(first_word(&raw_field)));

        write_member_docs(output, row);
        if deprecated {
            output.push_str("\t#[deprecated]\n");
        }
        if undefinable {
            output.push_str("\t#[serde(skip_serializing_if = \"Option::is_none\")]\n");
        }

        let mut rendered = type_to_string(&row.ty);
        // Undefinable and nullable collapse into a single Option wrapper.
        if undefinable && !rendered.starts_with("Option<") {
            rendered = format!("Option<{rendered}>");
        }
        output.push_str(&format!("\tpub {field}: {rendered},\n"));
    }

    output.push_str("}\n");
}

fn write_enum(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("pub enum {title} {{\n"));

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let name = strip_question(first_word(&raw_field)).to_string();

        write_member_docs(output, row);

        let value = plain_text(&row.ty);
        let discriminant = match data.kind {
            TableKind::Bitfield => Some(value.clone()),
            _ => {
                let value = first_word(&value).to_string();
                is_numeric(&value).then_some(value)
            }
        };

        match discriminant {
            Some(value) => {
                if deprecated {
                    output.push_str("\t#[deprecated]\n");
                }
                output.push_str(&format!("\t{name} = {value},\n"));
            }
            None => {
                // Non-numeric values have no valid discriminant position;
                // keep them readable in the docs instead.
                if !value.is_empty() {
                    output.push_str(&format!("\t/// Value: {}\n", first_word(&value)));
                }
                if deprecated {
                    output.push_str("\t#[deprecated]\n");
                }
                output.push_str(&format!("\t{name},\n"));
            }
        }
    }

    output.push_str("}\n");
}

fn escape_keyword(field: &str) -> String {
    if KEYWORDS.contains(&field) {
        format!("r#{field}")
    } else {
        field.to_string()
    }
}

fn type_to_string(info: &TypeInfo) -> String {
    let rendered = match &info.kind {
        TypeKind::Array(inner) => format!("Vec<{}>", type_to_string(inner)),
        TypeKind::Tuple(elements) => format!(
            "({})",
            elements
                .iter()
                .map(type_to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        TypeKind::Map(key, value) => {
            format!("HashMap<{}, {}>", type_to_string(key), type_to_string(value))
        }
        TypeKind::Multiline(lines) => lines.join("\n"),
        TypeKind::Reference(name) => name.clone(),
        TypeKind::Primitive(s) => map_type(&TYPE_MAP, s)
            .map(str::to_string)
            .unwrap_or_else(|| s.clone()),
    };

    if info.optional && !rendered.starts_with("Option<") {
        format!("Option<{rendered}>")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TypeInfo {
        TypeInfo::parse(text, &mut Vec::new())
    }

    fn row(field: &str, ty: &str, description: &str) -> Row {
        Row {
            field: parse(field),
            ty: parse(ty),
            description: if description.is_empty() {
                None
            } else {
                Some(parse(description))
            },
            other_columns: Vec::new(),
        }
    }

    fn struct_data(kind: TableKind, title: &str, contents: Vec<Row>) -> StructData {
        StructData {
            kind,
            title: TypeInfo::text(title),
            description: None,
            contents,
        }
    }

    #[test]
    fn struct_renders_pub_fields() {
        let data = struct_data(
            TableKind::Struct,
            "User",
            vec![row("id", "snowflake", "the id")],
        );
        let output = RustGenerator.generate(&data);
        assert!(output.contains("pub struct User {"));
        assert!(output.contains("\tpub id: Snowflake,\n"));
        assert!(output.contains("\t/// the id\n"));
        assert!(output.ends_with("}\n\n"));
    }

    #[test]
    fn optional_signals_collapse_to_single_option() {
        let data = struct_data(TableKind::Struct, "User", vec![row("name?", "?string", "")]);
        let output = RustGenerator.generate(&data);
        assert!(output.contains("\tpub name: Option<String>,\n"));
        assert!(!output.contains("Option<Option<"));
        assert!(output.contains("#[serde(skip_serializing_if = \"Option::is_none\")]"));
    }

    #[test]
    fn keywords_escaped() {
        let data = struct_data(TableKind::Struct, "X", vec![row("type", "integer", "")]);
        let output = RustGenerator.generate(&data);
        assert!(output.contains("\tpub r#type: i64,\n"));
    }

    #[test]
    fn nested_generics_render() {
        let data = struct_data(
            TableKind::Struct,
            "X",
            vec![row("m", "array[map[snowflake, array[string]]]", "")],
        );
        let output = RustGenerator.generate(&data);
        assert!(output.contains("m: Vec<HashMap<Snowflake, Vec<String>>>,"));
    }

    #[test]
    fn deprecated_field_attribute() {
        let data = struct_data(
            TableKind::Struct,
            "X",
            vec![row("old (deprecated)", "integer", "")],
        );
        let output = RustGenerator.generate(&data);
        assert!(output.contains("\t#[deprecated]\n"));
        assert!(output.contains("\tpub old: i64,\n"));
    }

    #[test]
    fn enum_with_numeric_discriminants() {
        let data = struct_data(TableKind::Enum, "VisibilityType", vec![row("PUBLIC", "1", "")]);
        let output = RustGenerator.generate(&data);
        assert!(output.contains("pub enum VisibilityType {"));
        assert!(output.contains("\tPUBLIC = 1,\n"));
    }

    #[test]
    fn event_values_move_to_docs() {
        let data = struct_data(TableKind::Event, "GatewayEvent", vec![row("Ready", "READY", "")]);
        let output = RustGenerator.generate(&data);
        assert!(output.contains("\t/// Value: READY\n"));
        assert!(output.contains("\tReady,\n"));
    }

    #[test]
    fn bitfield_keeps_shift_verbatim() {
        let data = struct_data(
            TableKind::Bitfield,
            "PermissionFlags",
            vec![row("CREATE_INVITES", "1 << 0", "")],
        );
        let output = RustGenerator.generate(&data);
        assert!(output.contains("\tCREATE_INVITES = 1 << 0,\n"));
    }

    #[test]
    fn malformed_annotation_does_not_panic() {
        let data = struct_data(TableKind::Struct, "X", vec![row("a", "array[string", "")]);
        let output = RustGenerator.generate(&data);
        assert!(output.contains("\tpub a: array[string,\n"));
    }

    #[test]
    fn mapping_table_covers_documented_tokens() {
        for token in [
            "string",
            "boolean",
            "snowflake",
            "ISO8601 timestamp",
            "ISO8601 date",
            "file contents",
            "binary data (base64)",
            "integer",
            "signed integer",
            "unsigned byte",
            "short",
        ] {
            assert!(map_type(&TYPE_MAP, token).is_some(), "unmapped: {token}");
        }
    }
}
