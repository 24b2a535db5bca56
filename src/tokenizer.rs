//! Table tokenizer — rendered table tree → [`StructData`].
//!
//! Walks backward from the table through its element siblings to the nearest
//! `<h6>` heading for the title and description, classifies the table kind
//! from its header row, and lexes every cell into a [`TypeInfo`].

use crate::dom::{Element, Node, SiblingContext};
use crate::model::{Row, StructData, TableKind, TypeInfo};
use crate::name::pascal_words;

/// Tokenize the table at `context` into a [`StructData`].
///
/// Returns `None` on structural precondition failures (missing `<thead>` or
/// `<tbody>`, fewer than two header columns), pushing a diagnostic naming the
/// failed heuristic into `warnings`. Malformed type annotations degrade to
/// primitives, also reported through `warnings`.
pub fn tokenize(context: SiblingContext<'_>, warnings: &mut Vec<String>) -> Option<StructData> {
    let table = context.target();
    if table.tag != "table" {
        warnings.push("failed to tokenize: target is not a table".to_string());
        return None;
    }

    let Some(thead) = table.child("thead") else {
        warnings.push("failed to tokenize table: missing <thead>".to_string());
        return None;
    };
    let Some(tbody) = table.child("tbody") else {
        warnings.push("failed to tokenize table: missing <tbody>".to_string());
        return None;
    };
    let Some(header_row) = thead.child("tr") else {
        warnings.push("failed to tokenize table: <thead> has no header row".to_string());
        return None;
    };

    let headings: Vec<String> = header_row
        .children_tagged(&["th", "td"])
        .iter()
        .map(|cell| cell.text_content().trim().to_lowercase())
        .collect();
    if headings.len() < 2 {
        warnings.push("failed to tokenize table: fewer than two header columns".to_string());
        return None;
    }

    let header_cells = header_row.children_tagged(&["th", "td"]);
    let body_rows = tbody.children_tagged(&["tr"]);

    let mut kind = classify(&headings);
    // Enum and Bitfield share a header shape; the upgrade must be decided
    // before any row is interpreted.
    if kind == TableKind::Enum && has_shift_values(&headings, &body_rows) {
        kind = TableKind::Bitfield;
    }

    let (title, description) = title_and_description(&context);

    let mut contents = Vec::new();
    for tr in &body_rows {
        let cells = tr.children_tagged(&["th", "td"]);

        let mut field: Option<TypeInfo> = None;
        let mut ty: Option<TypeInfo> = None;
        let mut row_description: Option<TypeInfo> = None;
        let mut other_columns: Vec<(TypeInfo, TypeInfo)> = Vec::new();

        for (i, cell) in cells.iter().enumerate() {
            let Some(column) = headings.get(i) else {
                break;
            };

            let role = column_role(kind, column);
            match role {
                ColumnRole::Field => field = cell_info(cell, false, warnings),
                ColumnRole::Type => ty = cell_info(cell, false, warnings),
                ColumnRole::Description => row_description = cell_info(cell, true, warnings),
                ColumnRole::Other => {
                    let header = cell_info(header_cells[i], false, warnings);
                    let content = cell_info(cell, true, warnings);
                    if let (Some(header), Some(content)) = (header, content) {
                        other_columns.push((header, content));
                    }
                }
            }
        }

        // Enum tables that carry only values (UPDATE_AGREEMENTS-style) reuse
        // the value text as the name and quote the value.
        if kind == TableKind::Enum && field.is_none() {
            if let Some(value) = ty.take() {
                let first = value
                    .as_text()
                    .and_then(|t| t.split_whitespace().next())
                    .unwrap_or("")
                    .to_string();
                if !first.is_empty() {
                    ty = Some(TypeInfo::text(format!("\"{first}\"")));
                    field = Some(value);
                } else {
                    ty = Some(value);
                }
            }
        }

        if let (Some(field), Some(ty)) = (field, ty) {
            contents.push(Row {
                field,
                ty,
                description: row_description,
                other_columns,
            });
        }
    }

    Some(StructData {
        kind,
        title,
        description,
        contents,
    })
}

fn classify(headings: &[String]) -> TableKind {
    match (headings[0].as_str(), headings[1].as_str()) {
        ("field", "type") => TableKind::Struct,
        ("value", "name") => TableKind::Enum,
        ("event", "value") => TableKind::Event,
        _ => TableKind::Struct,
    }
}

fn has_shift_values(headings: &[String], body_rows: &[&Element]) -> bool {
    let Some(value_index) = headings.iter().position(|h| h == "value") else {
        return false;
    };
    body_rows.iter().any(|tr| {
        tr.children_tagged(&["th", "td"])
            .get(value_index)
            .is_some_and(|cell| cell.text_content().contains("<<"))
    })
}

enum ColumnRole {
    Field,
    Type,
    Description,
    Other,
}

fn column_role(kind: TableKind, column: &str) -> ColumnRole {
    let (field, ty) = match kind {
        TableKind::Struct => ("field", "type"),
        TableKind::Event => ("event", "value"),
        TableKind::Enum | TableKind::Bitfield => ("name", "value"),
    };
    if column == field {
        ColumnRole::Field
    } else if column == ty {
        ColumnRole::Type
    } else if column == "description" {
        ColumnRole::Description
    } else {
        ColumnRole::Other
    }
}

/// Walk backward through element siblings to the nearest `<h6>`: its text is
/// the title, the intermediate block elements (in document order) the
/// description.
fn title_and_description(context: &SiblingContext<'_>) -> (TypeInfo, Option<TypeInfo>) {
    let mut title_text: Option<String> = None;
    let mut between: Vec<&Element> = Vec::new();

    for elem in context.before() {
        if elem.tag == "h6" {
            title_text = Some(elem.text_content());
            break;
        }
        between.push(elem);
    }
    between.reverse();

    let title = match title_text {
        Some(text) => normalize_title(&text),
        None => "UnknownStruct".to_string(),
    };

    let lines: Vec<String> = between
        .iter()
        .flat_map(|elem| elem.visible_lines())
        .collect();
    let description = if lines.is_empty() {
        None
    } else {
        Some(TypeInfo::multiline(lines))
    };

    (TypeInfo::text(title), description)
}

/// `"Audit Log Entry (legacy) Structure"` → `AuditLogEntry`.
fn normalize_title(raw: &str) -> String {
    let base = raw.split('(').next().unwrap_or(raw).trim();
    let pascal = pascal_words(base);
    pascal
        .strip_suffix("Structure")
        .filter(|s| !s.is_empty())
        .unwrap_or(&pascal)
        .to_string()
}

fn cell_info(cell: &Element, with_markdown: bool, warnings: &mut Vec<String>) -> Option<TypeInfo> {
    let text = cell_text(cell, with_markdown);
    if text.is_empty() {
        return None;
    }
    Some(TypeInfo::parse(&text, warnings))
}

/// Single-line text of a cell. Direct child anchors become `[text](href)`
/// when `with_markdown` is set; everything else contributes its plain text.
/// `array [`/`map [` splits introduced by inline markup are rejoined.
fn cell_text(cell: &Element, with_markdown: bool) -> String {
    let mut parts: Vec<String> = Vec::new();

    for node in &cell.children {
        match node {
            Node::Text(t) => parts.extend(t.split_whitespace().map(str::to_string)),
            Node::Element(e) if with_markdown && e.tag == "a" => {
                let text = e.text_content();
                let href = e.attr("href").unwrap_or("");
                parts.push(format!("[{}]({})", text.trim(), href));
            }
            Node::Element(e) => {
                parts.extend(e.text_content().split_whitespace().map(str::to_string));
            }
        }
    }

    parts
        .join(" ")
        .replace("array [", "array[")
        .replace("map [", "map[")
}
