//! TypeScript backend.

use std::sync::LazyLock;

use crate::generate::{
    first_word, is_deprecated_field, is_numeric, map_type, plain_text, split_shift,
    strip_question, Generator, Matcher, BINARY_PATTERN, INT_PATTERN,
};
use crate::model::{Row, StructData, TableKind, TypeInfo, TypeKind};

static TYPE_MAP: LazyLock<Vec<(Matcher, &'static str)>> = LazyLock::new(|| {
    vec![
        (Matcher::Exact("string"), "string"),
        (Matcher::Exact("str"), "string"),
        (Matcher::Exact("boolean"), "boolean"),
        (Matcher::Exact("integer"), "number"),
        (Matcher::Exact("float"), "number"),
        (Matcher::Exact("snowflake"), "Snowflake"),
        (Matcher::Exact("ISO8601 timestamp"), "string"),
        (Matcher::Exact("ISO8601 date"), "string"),
        (Matcher::Exact("file contents"), "Uint8Array"),
        (Matcher::pattern(BINARY_PATTERN), "Uint8Array"),
        (Matcher::pattern(INT_PATTERN), "number"),
    ]
});

pub struct TypescriptGenerator;

impl Generator for TypescriptGenerator {
    fn generate(&self, data: &StructData) -> String {
        let title = plain_text(&data.title);
        let mut output = String::new();

        write_header_docs(&mut output, data);

        match data.kind {
            TableKind::Struct => write_struct(&mut output, data, &title),
            TableKind::Enum | TableKind::Event => write_enum(&mut output, data, &title),
            TableKind::Bitfield => write_bitfield(&mut output, data, &title),
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
    output.push_str("/**\n");
    for (i, line) in lines.iter().enumerate() {
        output.push_str(&format!(" * {line}\n"));
        if i < lines.len() - 1 {
            output.push_str(" *\n");
        }
    }
    output.push_str(" */\n");
}

fn write_member_docs(output: &mut String, row: &Row, deprecated: bool) {
    let description = row.description.as_ref().map(plain_text).unwrap_or_default();
    if description.is_empty() && row.other_columns.is_empty() && !deprecated {
        return;
    }

    output.push_str("\t/**\n");
    if !description.is_empty() {
        output.push_str(&format!("\t * {description}\n"));
    }
    if deprecated {
        output.push_str("\t * @deprecated\n");
    }
    if !row.other_columns.is_empty() {
        output.push_str("\t *\n");
        for (header, value) in &row.other_columns {
            output.push_str(&format!(
                "\t * @property {} - {}\n",
                plain_text(header),
                plain_text(value)
            ));
        }
    }
    output.push_str("\t */\n");
}

fn write_struct(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("export interface {title} {{\n"));

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let undefinable = first_word(&raw_field).ends_with('?');
        let field = strip_question(first_word(&raw_field)).to_string();

        write_member_docs(output, row, deprecated);

        let mut rendered = type_to_string(&row.ty, false);
        // Nullable and undefinable collapse into a single `| null`.
        if undefinable && !row.ty.optional {
            rendered.push_str(" | null");
        }
        output.push_str(&format!("\t{field}: {rendered};\n"));
    }

    output.push_str("}\n");
}

fn write_enum(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("export enum {title} {{\n"));

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let name = strip_question(first_word(&raw_field)).to_string();

        write_member_docs(output, row, deprecated);

        let value = first_word(&type_to_string(&row.ty, true)).to_string();
        output.push_str(&format!("\t{name} = {},\n", value_literal(&value)));
    }

    output.push_str("}\n");
}

fn write_bitfield(output: &mut String, data: &StructData, title: &str) {
    output.push_str(&format!("const {title} = {{\n"));

    for row in &data.contents {
        let raw_field = plain_text(&row.field);
        let deprecated = is_deprecated_field(&raw_field);
        let name = strip_question(first_word(&raw_field)).to_string();

        write_member_docs(output, row, deprecated);

        let value = plain_text(&row.ty);
        match split_shift(&value) {
            Some((left, right)) => {
                output.push_str(&format!("\t{name}: {left}n << {right}n,\n"));
            }
            None => output.push_str(&format!("\t{name}: {value},\n")),
        }
    }

    output.push_str("} as const;\n");
}

/// Quote enum values that are neither numeric nor already quoted, so event
/// names like `READY` stay valid member initializers.
fn value_literal(value: &str) -> String {
    if is_numeric(value) || value.starts_with('"') {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}

fn type_to_string(info: &TypeInfo, only_first_word: bool) -> String {
    let rendered = match &info.kind {
        TypeKind::Array(inner) => {
            let inner = type_to_string(inner, only_first_word);
            if inner.contains(" | ") {
                format!("({inner})[]")
            } else {
                format!("{inner}[]")
            }
        }
        TypeKind::Tuple(elements) => {
            let inner = elements
                .iter()
                .map(|e| type_to_string(e, only_first_word))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{inner}]")
        }
        TypeKind::Map(key, value) => format!(
            "Record<{}, {}>",
            type_to_string(key, only_first_word),
            type_to_string(value, only_first_word)
        ),
        TypeKind::Multiline(lines) => lines.join("\n"),
        TypeKind::Reference(name) => name.clone(),
        TypeKind::Primitive(s) => {
            let mapped = map_type(&TYPE_MAP, s).map(str::to_string).unwrap_or_else(|| s.clone());
            if only_first_word {
                first_word(&mapped).to_string()
            } else {
                mapped
            }
        }
    };

    if info.optional {
        format!("{rendered} | null")
    } else {
        rendered
    }
}
