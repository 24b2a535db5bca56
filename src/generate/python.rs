//! Python backend.

use std::sync::LazyLock;

use crate::generate::{
    first_word, is_deprecated_field, is_numeric, map_type, plain_text, split_shift,
    strip_question, Generator, Matcher, BINARY_PATTERN, INT_PATTERN,
};
use crate::model::{Row, StructData, TableKind, TypeInfo, TypeKind};

static TYPE_MAP: LazyLock<Vec<(Matcher, &'static str)>> = LazyLock::new(|| {
    vec![
        (Matcher::Exact("string"), "str"),
        (Matcher::Exact("str"), "str"),
        (Matcher::Exact("boolean"), "bool"),
        (Matcher::Exact("integer"), "int"),
        (Matcher::Exact("float"), "float"),
        (Matcher::Exact("snowflake"), "Snowflake"),
        (Matcher::Exact("ISO8601 timestamp"), "datetime"),
        (Matcher::Exact("ISO8601 date"), "datetime"),
        (Matcher::Exact("file contents"), "bytes"),
        (Matcher::pattern(BINARY_PATTERN), "bytes"),
        (Matcher::pattern(INT_PATTERN), "int"),
    ]
});

pub struct PythonGenerator;

impl Generator for PythonGenerator {
    fn generate(&self, data: &StructData) -> String {
        let title = plain_text(&data.title);
        let mut output = String::new();

        write_header_docs(&mut output, data);

        match data.kind {
            TableKind::Struct => write_struct(&mut output, data, &title),
            TableKind::Enum | TableKind::Event => write_members(&mut output, data, &title, "Enum"),
            TableKind::Bitfield => write_members(&mut output, data, &title, "Flag"),
        }

        output.push('\n');
        output
    }
}

fn write_header_docs(output: &mut String, data: &StructData) {
    let Some(lines) = data.description.as_ref().and_then(|d| d.lines()) else {
        return;
    };
    if lines.is_empty() {
        return;
    }
    output.push_str("\"\"\"\n");
    for (i, line) in lines.iter().enumerate() {
        output.push_str(&format!("{line}\n"));
        if i < lines.len() - 1 {
            output.push('\n');
        }
    }
    output.push_str("\"\"\"\n");
}

/// `#:` single-line form when there is exactly one doc line and no extra
/// columns, a triple-quoted block otherwise.
fn write_member_docs(output: &mut String, row: &Row, deprecated: bool) {
    let description = row.description.as_ref().map(plain_text).unwrap_or_default();

    let mut lines: Vec<String> = Vec::new();
    if deprecated {
        lines.push("Deprecated.".to_string());
    }
    if !description.is_empty() {
        lines.push(description);
    }

    if lines.is_empty() && row.other_columns.is_empty() {
        return;
    }

    if lines.len() == 1 && row.other_columns.is_empty() {
        output.push_str(&format!("\t#: {}\n", lines[0]));
        return;
    }

    output.push_str("\t\"\"\"\n");
    for line in &lines {
        output.push_str(&format!("\t{line}\n"));
    }
    if !row.other_columns.is_empty() {
        output.push_str("\t\n");
        for (header, value) in &row.other_columns {
            output.push_str(&format!("\t{}: {}\n", plain_text(header), plain_text(value)));
        }
    }
    output.push_str("\t\"\"\"\n");
}

fn write_struct(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("class {title}(TypedDict):\n"));

    if data.contents.is_empty() {
        output.push_str("\tpass\n");
        return;
    }

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let undefinable = first_word(&raw_field).ends_with('?');
        let field = strip_question(first_word(&raw_field)).to_string();

        write_member_docs(output, row, deprecated);

        // The two optionality signals compound: nullable adds `| None`,
        // undefinable wraps in `NotRequired`, each at most once.
        let mut rendered = type_to_string(&row.ty);
        if undefinable {
            rendered = format!("NotRequired[{rendered}]");
        }
        output.push_str(&format!("\t{field}: {rendered}\n"));
    }
}

fn write_members(output: &mut String, data: &StructData, title: &str, base: &str) {
    output.push_str(&format!("class {title}({base}):\n"));

    if data.contents.is_empty() {
        output.push_str("\tpass\n");
        return;
    }

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let name = strip_question(first_word(&raw_field)).to_string();

        write_member_docs(output, row, deprecated);

        let value = plain_text(&row.ty);
        if base == "Flag" {
            match split_shift(&value) {
                Some((left, right)) => {
                    output.push_str(&format!("\t{name} = {left} << {right}\n"));
                }
                None => output.push_str(&format!("\t{name} = {value}\n")),
            }
        } else {
            let value = first_word(&value).to_string();
            output.push_str(&format!("\t{name} = {}\n", value_literal(&value)));
        }
    }
}

fn value_literal(value: &str) -> String {
    if is_numeric(value) || value.starts_with('"') {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}

fn type_to_string(info: &TypeInfo) -> String {
    let rendered = match &info.kind {
        TypeKind::Array(inner) => format!("list[{}]", type_to_string(inner)),
        TypeKind::Tuple(elements) => format!(
            "tuple[{}]",
            elements
                .iter()
                .map(type_to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        TypeKind::Map(key, value) => {
            format!("dict[{}, {}]", type_to_string(key), type_to_string(value))
        }
        TypeKind::Multiline(lines) => lines.join("\n"),
        TypeKind::Reference(name) => name.clone(),
        TypeKind::Primitive(s) => map_type(&TYPE_MAP, s)
            .map(str::to_string)
            .unwrap_or_else(|| s.clone()),
    };

    if info.optional {
        format!("{rendered} | None")
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
    fn struct_renders_typed_dict() {
        let data = struct_data(
            TableKind::Struct,
            "User",
            vec![row("id", "snowflake", "the id")],
        );
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("class User(TypedDict):"));
        assert!(output.contains("\tid: Snowflake\n"));
        assert!(output.contains("\t#: the id\n"));
    }

    #[test]
    fn optional_signals_compound() {
        let data = struct_data(TableKind::Struct, "User", vec![row("name?", "?string", "")]);
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("\tname: NotRequired[str | None]\n"));
    }

    #[test]
    fn nullable_only_adds_none_union() {
        let data = struct_data(TableKind::Struct, "User", vec![row("name", "?string", "")]);
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("\tname: str | None\n"));
        assert!(!output.contains("NotRequired"));
    }

    #[test]
    fn nested_generics_render() {
        let data = struct_data(
            TableKind::Struct,
            "X",
            vec![row("m", "array[map[snowflake, array[string]]]", "")],
        );
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("m: list[dict[Snowflake, list[str]]]"));
    }

    #[test]
    fn enum_and_flag_forms() {
        let data = struct_data(TableKind::Enum, "VisibilityType", vec![row("PUBLIC", "1", "")]);
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("class VisibilityType(Enum):"));
        assert!(output.contains("\tPUBLIC = 1\n"));

        let data = struct_data(
            TableKind::Bitfield,
            "PermissionFlags",
            vec![row("CREATE_INVITES", "1 << 0", "")],
        );
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("class PermissionFlags(Flag):"));
        assert!(output.contains("\tCREATE_INVITES = 1 << 0\n"));
    }

    #[test]
    fn malformed_annotation_does_not_panic() {
        let data = struct_data(TableKind::Struct, "X", vec![row("a", "array[string", "")]);
        let output = PythonGenerator.generate(&data);
        assert!(output.contains("\ta: array[string\n"));
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
