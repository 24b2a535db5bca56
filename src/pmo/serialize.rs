//! Serializer — resolved models → markdown table syntax inside a `<Model>`
//! wrapper carrying the raw JSON model.

use anyhow::Result;

use crate::pmo::resolve::{
    Deprecated, EnumModel, EnumValue, Flag, FlagsModel, Model, Note, PmoType, PrimitiveKind,
    Property, Structure, Variant,
};

/// Serialize one model into its markdown block.
pub fn serialize(model: &Model) -> Result<String> {
    let json = serde_json::to_string(model)?;
    let body = match model {
        Model::Structure(s) => structure_body(s),
        Model::Enum(e) => enum_body(e),
        Model::Flags(f) => flags_body(f),
    };
    Ok(format!("<Model model={{{json}}}>\n\n{body}\n</Model>\n"))
}

/// Collects footnote text paragraphs while numbering `<sup>` markers.
struct Footnotes {
    counter: u32,
    entries: Vec<(u32, String)>,
}

impl Footnotes {
    fn new() -> Footnotes {
        Footnotes {
            counter: 1,
            entries: Vec::new(),
        }
    }

    fn marker(&mut self, note: &Note) -> String {
        match note {
            Note::Reference(n) => format!(" <sup>{n}</sup>"),
            Note::Text(text) => {
                let number = self.counter;
                self.counter += 1;
                self.entries.push((number, text.clone()));
                format!(" <sup>{number}</sup>")
            }
        }
    }

    fn trailing_paragraphs(&self) -> String {
        self.entries
            .iter()
            .map(|(n, text)| format!("\n<sup>{n}</sup> {text}\n"))
            .collect()
    }
}

fn structure_body(structure: &Structure) -> String {
    let mut out = String::new();
    let mut footnotes = Footnotes::new();

    out.push_str(&format!("###### {} Structure\n\n", structure.name));
    if let Some(description) = &structure.description {
        out.push_str(&format!("{description}\n\n"));
    }

    out.push_str("| Field | Type | Description |\n| --- | --- | --- |\n");
    for property in &structure.properties {
        out.push_str(&property_row(property, &mut footnotes));
    }

    out.push_str(&footnotes.trailing_paragraphs());
    out
}

fn property_row(property: &Property, footnotes: &mut Footnotes) -> String {
    let mut name = property.name.clone();
    if property.optional {
        name.push('?');
    }

    let field = member_cell(
        &name,
        &property.notes,
        &property.deprecated,
        property.deleted,
        footnotes,
    );

    let mut ty = serialize_type(&property.ty);
    if property.nullable {
        ty = format!("?{ty}");
    }

    let description = strike_if(
        property.description.as_deref().unwrap_or(""),
        property.deleted,
    );

    format!(
        "| {} | {} | {} |\n",
        escape_cell(&field),
        escape_cell(&ty),
        escape_cell(&description)
    )
}

fn enum_body(model: &EnumModel) -> String {
    let mut out = String::new();
    let mut footnotes = Footnotes::new();

    out.push_str(&format!("###### {}\n\n", model.name));
    if let Some(description) = &model.description {
        out.push_str(&format!("{description}\n\n"));
    }

    out.push_str("| Value | Name | Description |\n| --- | --- | --- |\n");
    for variant in &model.variants {
        out.push_str(&variant_row(variant, &mut footnotes));
    }

    out.push_str(&footnotes.trailing_paragraphs());
    out
}

fn variant_row(variant: &Variant, footnotes: &mut Footnotes) -> String {
    let value = match &variant.value {
        EnumValue::Number(n) => n.to_string(),
        EnumValue::String(s) => format!("\"{s}\""),
    };
    let name = member_cell(
        &variant.name,
        &variant.notes,
        &variant.deprecated,
        variant.deleted,
        footnotes,
    );
    let description = strike_if(variant.description.as_deref().unwrap_or(""), variant.deleted);

    format!(
        "| {} | {} | {} |\n",
        escape_cell(&value),
        escape_cell(&name),
        escape_cell(&description)
    )
}

fn flags_body(model: &FlagsModel) -> String {
    let mut out = String::new();
    let mut footnotes = Footnotes::new();

    out.push_str(&format!("###### {}\n\n", model.name));
    if let Some(description) = &model.description {
        out.push_str(&format!("{description}\n\n"));
    }

    out.push_str("| Value | Name | Description |\n| --- | --- | --- |\n");
    for flag in &model.flags {
        out.push_str(&flag_row(flag, &mut footnotes));
    }

    out.push_str(&footnotes.trailing_paragraphs());
    out
}

fn flag_row(flag: &Flag, footnotes: &mut Footnotes) -> String {
    let value = format!("{} << {}", flag.initial, flag.shift);
    let name = member_cell(
        &flag.name,
        &flag.notes,
        &flag.deprecated,
        flag.deleted,
        footnotes,
    );
    let description = strike_if(flag.description.as_deref().unwrap_or(""), flag.deleted);

    format!(
        "| {} | {} | {} |\n",
        escape_cell(&value),
        escape_cell(&name),
        escape_cell(&description)
    )
}

fn member_cell(
    name: &str,
    notes: &[Note],
    deprecated: &Deprecated,
    deleted: bool,
    footnotes: &mut Footnotes,
) -> String {
    let mut cell = strike_if(name, deleted);
    for note in notes {
        cell.push_str(&footnotes.marker(note));
    }
    if deprecated.is_set() {
        cell.push_str(" **(deprecated)**");
    }
    cell
}

fn strike_if(text: &str, deleted: bool) -> String {
    if deleted && !text.is_empty() {
        format!("~~{text}~~")
    } else {
        text.to_string()
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Serialize a resolved type back into the table annotation grammar, so the
/// emitted tables re-tokenize into the same structural kinds.
pub(crate) fn serialize_type(ty: &PmoType) -> String {
    match ty {
        PmoType::Snowflake => "snowflake".to_string(),
        PmoType::Date => "ISO8601 date".to_string(),
        PmoType::Primitive { kind } => kind_text(*kind).to_string(),
        PmoType::Union { elements } => elements
            .iter()
            .map(serialize_type)
            .collect::<Vec<_>>()
            .join(" | "),
        PmoType::Array { element } => format!("array[{}]", serialize_type(element)),
        PmoType::Tuple { elements } => format!(
            "array[{}]",
            elements
                .iter()
                .map(serialize_type)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        PmoType::Map { key, value } => {
            format!("map[{}, {}]", serialize_type(key), serialize_type(value))
        }
        PmoType::Reference { path } => reference_link(path),
    }
}

fn kind_text(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "string",
        PrimitiveKind::Integer => "integer",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Boolean => "boolean",
        PrimitiveKind::Null => "null",
    }
}

/// `["Resources", "Guild", "PartialGuild"]` →
/// `[PartialGuild](/resources/guild#partial-guild-structure) object`.
fn reference_link(path: &[String]) -> String {
    let last = path.last().map(String::as_str).unwrap_or("");
    let mut anchor = kebab(last);
    if !anchor.ends_with("-flags") && !anchor.ends_with("-type") {
        anchor.push_str("-structure");
    }

    let dirs: Vec<String> = path[..path.len().saturating_sub(1)]
        .iter()
        .map(|s| kebab(s))
        .collect();
    let url = format!("/{}#{}", dirs.join("/"), anchor);

    let trailer = if anchor.ends_with("-structure") {
        " object"
    } else {
        ""
    };
    format!("[{last}]({url}){trailer}")
}

fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && prev_lower {
            out.push('-');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_elements, parse_document};
    use crate::model::{TableKind, TypeKind};
    use crate::pmo::parser::parse;
    use crate::pmo::resolve::resolve;
    use crate::tokenizer::tokenize;
    use regex::Regex;

    fn models(source: &str) -> Vec<Model> {
        resolve(&parse(source).unwrap()).unwrap()
    }

    #[test]
    fn structure_serializes_table_and_wrapper() {
        let models = models(
            r#"
/** A member of a guild. */
interface GuildMember {
  /** The user's id. */
  user_id?: Snowflake | null;
  roles: Snowflake[];
}
"#,
        );
        let block = serialize(&models[0]).unwrap();
        assert!(block.starts_with("<Model model={{\"type\":\"structure\""));
        assert!(block.contains("###### GuildMember Structure\n"));
        assert!(block.contains("A member of a guild.\n"));
        assert!(block.contains("| Field | Type | Description |"));
        assert!(block.contains("| user_id? | ?snowflake | The user's id. |"));
        assert!(block.contains("| roles | array[snowflake] |  |"));
        assert!(block.trim_end().ends_with("</Model>"));
    }

    #[test]
    fn notes_number_and_back_reference() {
        let models = models(
            r#"
interface X {
  /** @note only on gateway */
  a: string;
  /** @note *1 */
  b: string;
}
"#,
        );
        let block = serialize(&models[0]).unwrap();
        assert!(block.contains("| a <sup>1</sup> | string |"));
        assert!(block.contains("| b <sup>1</sup> | string |"));
        // Only one trailing footnote paragraph.
        assert_eq!(block.matches("\n<sup>1</sup> only on gateway\n").count(), 1);
    }

    #[test]
    fn deprecated_and_deleted_markers() {
        let models = models(
            r#"
interface X {
  /** @deprecated */
  a: string;
  /**
   * Old field.
   * @deleted
   */
  b: string;
}
"#,
        );
        let block = serialize(&models[0]).unwrap();
        assert!(block.contains("| a **(deprecated)** | string |"));
        assert!(block.contains("| ~~b~~ | string | ~~Old field.~~ |"));
    }

    #[test]
    fn reference_links_kebab_with_object_trailer() {
        let resolved = models("interface X { g: Resources.Guild.PartialGuild; }");
        let block = serialize(&resolved[0]).unwrap();
        assert!(block.contains(
            "[PartialGuild](/resources/guild#partial-guild-structure) object"
        ));

        let resolved = models("interface X { t: Resources.Guild.VerificationType; }");
        let block = serialize(&resolved[0]).unwrap();
        assert!(block.contains("[VerificationType](/resources/guild#verification-type)"));
        assert!(!block.contains("verification-type) object"));
    }

    #[test]
    fn enum_and_flags_tables() {
        let models = models(
            r#"
enum VisibilityType {
  NONE = 0,
  EVERYONE = "EVERYONE",
}
enum PermissionFlags {
  CREATE_INVITES = 1 << 0,
}
"#,
        );
        let block = serialize(&models[0]).unwrap();
        assert!(block.contains("###### VisibilityType\n"));
        assert!(block.contains("| Value | Name | Description |"));
        assert!(block.contains("| 0 | NONE |  |"));
        assert!(block.contains("| \"EVERYONE\" | EVERYONE |  |"));

        let block = serialize(&models[1]).unwrap();
        assert!(block.contains("###### PermissionFlags\n"));
        assert!(block.contains("| 1 << 0 | CREATE_INVITES |  |"));
    }

    // -- Round trip: serialized tables re-tokenize to the same shapes --------

    /// Render one serialized markdown block into table HTML the way the site
    /// build would, well enough for the tokenizer.
    fn markdown_block_to_html(block: &str) -> String {
        let link = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
        let mut html = String::new();
        let mut lines = block.lines().peekable();

        while let Some(line) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("<Model") || trimmed == "</Model>" {
                continue;
            }
            if let Some(heading) = trimmed.strip_prefix("###### ") {
                html.push_str(&format!("<h6>{heading}</h6>"));
                continue;
            }
            if trimmed.starts_with('|') {
                let mut rows = vec![trimmed.to_string()];
                while let Some(next) = lines.peek() {
                    if next.trim().starts_with('|') {
                        rows.push(lines.next().unwrap().trim().to_string());
                    } else {
                        break;
                    }
                }
                html.push_str("<table><thead><tr>");
                for cell in split_row(&rows[0]) {
                    html.push_str(&format!("<th>{cell}</th>"));
                }
                html.push_str("</tr></thead><tbody>");
                for row in &rows[2..] {
                    html.push_str("<tr>");
                    for cell in split_row(row) {
                        let rendered = link.replace_all(&cell, "<a href=\"$2\">$1</a>");
                        let rendered = rendered.replace("~~", "").replace("**", "");
                        html.push_str(&format!("<td>{rendered}</td>"));
                    }
                    html.push_str("</tr>");
                }
                html.push_str("</tbody></table>");
                continue;
            }
            html.push_str(&format!("<p>{trimmed}</p>"));
        }
        html
    }

    fn split_row(row: &str) -> Vec<String> {
        row.trim_matches('|')
            .split(" | ")
            .map(|cell| cell.trim().replace("\\|", "|"))
            .collect()
    }

    #[test]
    fn structure_round_trips_through_tokenizer() {
        let source = r#"
interface GuildMember {
  user_id?: Snowflake | null;
  roles: Snowflake[];
  pair: [Integer, string];
  meta: Record<string, string>;
  guild: Resources.Guild.PartialGuild;
}
"#;
        let block = serialize(&models(source)[0]).unwrap();
        let html = markdown_block_to_html(&block);
        let doc = parse_document(&html);
        let tables = find_elements(&doc, "table");
        let mut warnings = Vec::new();
        let data = tokenize(tables[0], &mut warnings).unwrap();

        assert!(warnings.is_empty(), "warnings: {warnings:?}");
        assert_eq!(data.kind, TableKind::Struct);
        assert_eq!(data.title.as_text(), Some("GuildMember"));
        assert_eq!(data.contents.len(), 5);

        assert_eq!(data.contents[0].field.as_text(), Some("user_id?"));
        assert!(data.contents[0].ty.optional);
        assert_eq!(data.contents[0].ty.as_text(), Some("snowflake"));

        assert!(matches!(data.contents[1].ty.kind, TypeKind::Array(_)));
        assert!(matches!(data.contents[2].ty.kind, TypeKind::Tuple(_)));
        assert!(matches!(data.contents[3].ty.kind, TypeKind::Map(_, _)));
        assert_eq!(
            data.contents[4].ty.kind,
            TypeKind::Reference("PartialGuild".to_string())
        );
    }

    #[test]
    fn flags_round_trip_classifies_bitfield() {
        let source = "enum PermissionFlags { CREATE_INVITES = 1 << 0, KICK_MEMBERS = 1 << 1, }";
        let block = serialize(&models(source)[0]).unwrap();
        let html = markdown_block_to_html(&block);
        let doc = parse_document(&html);
        let tables = find_elements(&doc, "table");
        let mut warnings = Vec::new();
        let data = tokenize(tables[0], &mut warnings).unwrap();

        assert_eq!(data.kind, TableKind::Bitfield);
        assert_eq!(data.title.as_text(), Some("PermissionFlags"));
        assert_eq!(data.contents[0].field.as_text(), Some("CREATE_INVITES"));
        assert_eq!(data.contents[0].ty.as_text(), Some("1 << 0"));
    }

    #[test]
    fn enum_round_trip_stays_enum() {
        let source = "enum VisibilityType { NONE = 0, EVERYONE = 1, }";
        let block = serialize(&models(source)[0]).unwrap();
        let html = markdown_block_to_html(&block);
        let doc = parse_document(&html);
        let tables = find_elements(&doc, "table");
        let mut warnings = Vec::new();
        let data = tokenize(tables[0], &mut warnings).unwrap();

        assert_eq!(data.kind, TableKind::Enum);
        assert_eq!(data.title.as_text(), Some("VisibilityType"));
    }
}
