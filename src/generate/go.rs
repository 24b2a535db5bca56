//! Go backend.

use std::sync::LazyLock;

use crate::generate::{
    first_word, is_deprecated_field, is_numeric, map_type, plain_text, split_shift,
    strip_question, Generator, Matcher, BINARY_PATTERN, INT_PATTERN,
};
use crate::model::{StructData, TableKind, TypeInfo, TypeKind};
use crate::name::Name;

static TYPE_MAP: LazyLock<Vec<(Matcher, &'static str)>> = LazyLock::new(|| {
    vec![
        (Matcher::Exact("string"), "string"),
        (Matcher::Exact("str"), "string"),
        (Matcher::Exact("boolean"), "bool"),
        (Matcher::Exact("float"), "float64"),
        (Matcher::Exact("snowflake"), "Snowflake"),
        (Matcher::Exact("ISO8601 timestamp"), "time.Time"),
        (Matcher::Exact("ISO8601 date"), "time.Time"),
        (Matcher::Exact("file contents"), "[]byte"),
        (Matcher::pattern(BINARY_PATTERN), "[]byte"),
        // int64 just to be safe
        (Matcher::pattern(INT_PATTERN), "int64"),
    ]
});

pub struct GoGenerator;

impl Generator for GoGenerator {
    fn generate(&self, data: &StructData) -> String {
        let title = plain_text(&data.title);
        let mut output = String::new();

        if let Some(lines) = data.description.as_ref().and_then(|d| d.lines()) {
            for line in lines {
                output.push_str(&format!("// {line}\n"));
            }
        }

        match data.kind {
            TableKind::Struct => write_struct(&mut output, data, &title),
            TableKind::Enum | TableKind::Event => write_enum(&mut output, data, &title),
            TableKind::Bitfield => write_bitfield(&mut output, data, &title),
        }

        output.push('\n');
        output
    }
}

struct Property {
    field: String,
    json_key: String,
    ty: Option<String>,
    description: String,
    other_columns: Vec<(String, String)>,
    deprecated: bool,
    undefinable: bool,
    optional_type: bool,
    raw_value: String,
}

fn properties(data: &StructData) -> Vec<Property> {
    data.contents
        .iter()
        .map(|row| {
            let raw_field = plain_text(&row.field);
            let deprecated = is_deprecated_field(&raw_field);
            let raw = first_word(&raw_field);
            let undefinable = raw.ends_with('?');
            let json_key = strip_question(raw).to_string();

            Property {
                field: exported_name(&json_key),
                json_key,
                ty: Some(type_to_string(&row.ty)).filter(|t| !t.is_empty()),
                description: row.description.as_ref().map(plain_text).unwrap_or_default(),
                other_columns: row
                    .other_columns
                    .iter()
                    .map(|(h, v)| (plain_text(h), plain_text(v)))
                    .collect(),
                deprecated,
                undefinable,
                optional_type: row.ty.optional,
                raw_value: plain_text(&row.ty),
            }
        })
        .collect()
}

fn write_property_docs(output: &mut String, prop: &Property) {
    if prop.deprecated {
        let text = if prop.description.is_empty() {
            "Deprecated.".to_string()
        } else {
            format!("Deprecated: {}", prop.description)
        };
        output.push_str(&format!("\t// {text}\n"));
    } else if !prop.description.is_empty() {
        output.push_str(&format!("\t// {}\n", prop.description));
    }
    for (key, value) in &prop.other_columns {
        output.push_str(&format!("\t// {key}: {value}\n"));
    }
}

fn write_struct(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("type {title} struct {{\n"));

    for prop in properties(data) {
        write_property_docs(output, &prop);

        let base = prop.ty.clone().unwrap_or_else(|| "interface{}".to_string());
        let optional = prop.undefinable || prop.optional_type;
        // Pointer-wrapping a slice or map is redundant.
        let field_type = if optional && should_pointer(&base) {
            format!("*{base}")
        } else {
            base
        };
        let omit_empty = if optional { ",omitempty" } else { "" };

        output.push_str(&format!(
            "\t{} {} `json:\"{}{}\"`\n",
            prop.field, field_type, prop.json_key, omit_empty
        ));
    }

    output.push_str("}\n");
}

fn write_enum(output: &mut String, data: &StructData, title: &str) {
    let props = properties(data);

    let use_iota = props.iter().all(|p| p.raw_value.is_empty());
    let string_backed = props
        .iter()
        .any(|p| !p.raw_value.is_empty() && !is_numeric(first_word(&p.raw_value)));

    let underlying = if string_backed { "string" } else { "int" };
    output.push_str(&format!("type {title} {underlying}\n"));
    output.push_str("const (\n");

    for (i, prop) in props.iter().enumerate() {
        write_property_docs(output, prop);

        let const_name = format!("{title}{}", exported_name(&prop.json_key));
        if use_iota {
            if i == 0 {
                output.push_str(&format!("\t{const_name} {title} = iota\n"));
            } else {
                output.push_str(&format!("\t{const_name}\n"));
            }
        } else {
            let raw = first_word(&prop.raw_value).to_string();
            let value = if string_backed && !raw.starts_with('"') {
                format!("\"{raw}\"")
            } else {
                raw
            };
            output.push_str(&format!("\t{const_name} {title} = {value}\n"));
        }
    }

    output.push_str(")\n");
}

fn write_bitfield(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("type {title} uint64\n"));
    output.push_str("const (\n");

    for prop in properties(data) {
        write_property_docs(output, &prop);

        let const_name = format!("{title}{}", exported_name(&prop.json_key));
        let value = match split_shift(&prop.raw_value) {
            Some((left, right)) => format!("{left} << {right}"),
            None => prop.raw_value.clone(),
        };
        output.push_str(&format!("\t{const_name} {title} = {value}\n"));
    }

    output.push_str(")\n");
}

/// `"guild_id"` → `GuildId`; anything without alphanumerics falls back to
/// `Field`.
fn exported_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let pascal = Name::new(cleaned.trim()).to_pascal_case();
    if pascal.is_empty() {
        "Field".to_string()
    } else {
        pascal
    }
}

fn should_pointer(base: &str) -> bool {
    !base.starts_with("[]") && !base.starts_with("map[")
}

fn type_to_string(info: &TypeInfo) -> String {
    match &info.kind {
        TypeKind::Array(inner) => format!("[]{}", type_to_string(inner)),
        TypeKind::Tuple(_) => "[]any".to_string(),
        TypeKind::Map(key, value) => {
            format!("map[{}]{}", type_to_string(key), type_to_string(value))
        }
        TypeKind::Multiline(lines) => lines.join("\n"),
        TypeKind::Reference(name) => name.clone(),
        TypeKind::Primitive(s) => map_type(&TYPE_MAP, s)
            .map(str::to_string)
            .unwrap_or_else(|| s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

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
    fn struct_renders_json_tags() {
        let data = struct_data(
            TableKind::Struct,
            "User",
            vec![row("guild_id", "snowflake", "the guild")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("type User struct {"));
        assert!(output.contains("\tGuildId Snowflake `json:\"guild_id\"`\n"));
        assert!(output.contains("\t// the guild\n"));
    }

    #[test]
    fn optional_scalar_gets_pointer_and_omitempty() {
        let data = struct_data(TableKind::Struct, "User", vec![row("name?", "?string", "")]);
        let output = GoGenerator.generate(&data);
        assert!(output.contains("\tName *string `json:\"name,omitempty\"`\n"));
    }

    #[test]
    fn optional_slice_skips_pointer() {
        let data = struct_data(
            TableKind::Struct,
            "User",
            vec![row("roles?", "array[snowflake]", "")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("\tRoles []Snowflake `json:\"roles,omitempty\"`\n"));
        assert!(!output.contains("*[]"));
    }

    #[test]
    fn optional_map_skips_pointer() {
        let data = struct_data(
            TableKind::Struct,
            "User",
            vec![row("meta", "?map[string, string]", "")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("\tMeta map[string]string `json:\"meta,omitempty\"`\n"));
    }

    #[test]
    fn nested_generics_render() {
        let data = struct_data(
            TableKind::Struct,
            "X",
            vec![row("m", "array[map[snowflake, array[string]]]", "")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("\tM []map[Snowflake][]string `json:\"m\"`\n"));
    }

    #[test]
    fn enum_with_values() {
        let data = struct_data(
            TableKind::Enum,
            "VisibilityType",
            vec![row("PUBLIC", "1", ""), row("PRIVATE", "2", "")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("type VisibilityType int"));
        assert!(output.contains("\tVisibilityTypePublic VisibilityType = 1\n"));
        assert!(output.contains("\tVisibilityTypePrivate VisibilityType = 2\n"));
    }

    #[test]
    fn string_values_switch_underlying_type() {
        let data = struct_data(
            TableKind::Event,
            "GatewayEvent",
            vec![row("Ready", "READY", "")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("type GatewayEvent string"));
        assert!(output.contains("\tGatewayEventReady GatewayEvent = \"READY\"\n"));
    }

    #[test]
    fn bitfield_const_block() {
        let data = struct_data(
            TableKind::Bitfield,
            "PermissionFlags",
            vec![row("CREATE_INVITES", "1 << 0", "")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("type PermissionFlags uint64"));
        assert!(output.contains("\tPermissionFlagsCreateInvites PermissionFlags = 1 << 0\n"));
    }

    #[test]
    fn deprecated_comment_form() {
        let data = struct_data(
            TableKind::Struct,
            "X",
            vec![row("old (deprecated)", "integer", "gone soon")],
        );
        let output = GoGenerator.generate(&data);
        assert!(output.contains("\t// Deprecated: gone soon\n"));
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
