//! Resolver — parsed declarations → structure/enum/flags models.

use anyhow::Result;
use serde::Serialize;

use crate::pmo::ast::{EnumDecl, EnumInit, InterfaceDecl, JsDoc, Statement, TypeNode};
use crate::pmo::pmo_error;

/// A resolved authoring model, serialized verbatim into the `<Model>` wrapper
/// for client-side re-hydration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Model {
    Structure(Structure),
    Enum(EnumModel),
    Flags(FlagsModel),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Structure {
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumModel {
    pub name: String,
    pub description: Option<String>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagsModel {
    pub name: String,
    pub description: Option<String>,
    pub flags: Vec<Flag>,
}

/// Member annotations shared by every model kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Deprecated,
    pub deleted: bool,
    pub notes: Vec<Note>,
    pub optional: bool,
    pub nullable: bool,
    #[serde(rename = "type")]
    pub ty: PmoType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Deprecated,
    pub deleted: bool,
    pub notes: Vec<Note>,
    pub value: EnumValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flag {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Deprecated,
    pub deleted: bool,
    pub notes: Vec<Note>,
    pub initial: u64,
    pub shift: u32,
}

/// `false`, `true`, or a reason string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Deprecated {
    Flag(bool),
    Reason(String),
}

impl Deprecated {
    pub fn is_set(&self) -> bool {
        !matches!(self, Deprecated::Flag(false))
    }
}

/// A footnote: new text, or a numeric back-reference to an earlier one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Note {
    Reference(u32),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PmoType {
    Snowflake,
    Date,
    Primitive { kind: PrimitiveKind },
    Union { elements: Vec<PmoType> },
    Array { element: Box<PmoType> },
    Tuple { elements: Vec<PmoType> },
    Map { key: Box<PmoType>, value: Box<PmoType> },
    Reference { path: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Integer,
    Float,
    Boolean,
    Null,
}

/// Resolve top-level statements into models.
pub fn resolve(statements: &[Statement]) -> Result<Vec<Model>> {
    statements
        .iter()
        .map(|statement| match statement {
            Statement::Interface(decl) => Ok(Model::Structure(resolve_structure(decl)?)),
            Statement::Enum(decl) => resolve_enum(decl),
        })
        .collect()
}

fn resolve_structure(decl: &InterfaceDecl) -> Result<Structure> {
    let mut properties = Vec::new();

    for member in &decl.members {
        let (deprecated, deleted, notes) =
            resolve_tags(&decl.name, &member.name, member.doc.as_ref())?;

        let verbatim = resolve_type(&decl.name, &member.name, &member.ty)?;
        let (nullable, ty) = resolve_nullable(&decl.name, &member.name, verbatim)?;

        properties.push(Property {
            name: member.name.clone(),
            description: description_of(member.doc.as_ref()),
            deprecated,
            deleted,
            notes,
            optional: member.optional,
            nullable,
            ty,
        });
    }

    Ok(Structure {
        name: decl.name.clone(),
        description: description_of(decl.doc.as_ref()),
        properties,
    })
}

fn resolve_enum(decl: &EnumDecl) -> Result<Model> {
    let flag_like = decl
        .members
        .iter()
        .filter(|m| matches!(m.init, EnumInit::Shift(_, _)))
        .count();

    if flag_like > 0 {
        if flag_like != decl.members.len() {
            return Err(pmo_error(
                "has flag-like initializers mixed in with non-flag-like initializers",
                Some(&decl.name),
                None,
            ));
        }
        if !decl.name.ends_with("Flags") {
            return Err(pmo_error(
                "flags name must end with `Flags`",
                Some(&decl.name),
                None,
            ));
        }

        let mut flags = Vec::new();
        for member in &decl.members {
            let (deprecated, deleted, notes) =
                resolve_tags(&decl.name, &member.name, member.doc.as_ref())?;
            let EnumInit::Shift(initial, shift) = &member.init else {
                unreachable!("every member is flag-like");
            };
            flags.push(Flag {
                name: member.name.clone(),
                description: description_of(member.doc.as_ref()),
                deprecated,
                deleted,
                notes,
                initial: *initial,
                shift: *shift,
            });
        }

        return Ok(Model::Flags(FlagsModel {
            name: decl.name.clone(),
            description: description_of(decl.doc.as_ref()),
            flags,
        }));
    }

    if !decl.name.ends_with("Type") {
        return Err(pmo_error(
            "enum name must end with `Type`",
            Some(&decl.name),
            None,
        ));
    }

    let mut variants = Vec::new();
    for member in &decl.members {
        let (deprecated, deleted, notes) =
            resolve_tags(&decl.name, &member.name, member.doc.as_ref())?;
        let value = match &member.init {
            EnumInit::Number(n) => EnumValue::Number(*n),
            EnumInit::String(s) => EnumValue::String(s.clone()),
            EnumInit::Shift(_, _) => unreachable!("no member is flag-like"),
        };
        variants.push(Variant {
            name: member.name.clone(),
            description: description_of(member.doc.as_ref()),
            deprecated,
            deleted,
            notes,
            value,
        });
    }

    Ok(Model::Enum(EnumModel {
        name: decl.name.clone(),
        description: description_of(decl.doc.as_ref()),
        variants,
    }))
}

fn description_of(doc: Option<&JsDoc>) -> Option<String> {
    doc.and_then(|d| d.description.clone())
        .filter(|d| !d.trim().is_empty())
}

fn resolve_tags(
    container: &str,
    member: &str,
    doc: Option<&JsDoc>,
) -> Result<(Deprecated, bool, Vec<Note>)> {
    let mut deprecated = Deprecated::Flag(false);
    let mut deleted = false;
    let mut notes = Vec::new();

    let Some(doc) = doc else {
        return Ok((deprecated, deleted, notes));
    };

    for tag in &doc.tags {
        match tag.name.as_str() {
            "deleted" => deleted = true,
            "deprecated" => {
                deprecated = match &tag.comment {
                    Some(reason) => Deprecated::Reason(reason.clone()),
                    None => Deprecated::Flag(true),
                };
            }
            "note" => {
                let Some(comment) = &tag.comment else {
                    return Err(pmo_error(
                        "contains an empty note tag",
                        Some(container),
                        Some(member),
                    ));
                };
                notes.push(parse_note(comment));
            }
            _ => {}
        }
    }

    Ok((deprecated, deleted, notes))
}

/// A note body of exactly `*N` back-references an earlier footnote.
fn parse_note(comment: &str) -> Note {
    if let Some(digits) = comment.strip_prefix('*') {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(number) = digits.parse() {
                return Note::Reference(number);
            }
        }
    }
    Note::Text(comment.to_string())
}

fn resolve_type(container: &str, member: &str, node: &TypeNode) -> Result<PmoType> {
    match node {
        TypeNode::String => Ok(PmoType::Primitive {
            kind: PrimitiveKind::String,
        }),
        TypeNode::Boolean => Ok(PmoType::Primitive {
            kind: PrimitiveKind::Boolean,
        }),
        TypeNode::Null => Ok(PmoType::Primitive {
            kind: PrimitiveKind::Null,
        }),
        TypeNode::Union(arms) => Ok(PmoType::Union {
            elements: arms
                .iter()
                .map(|arm| resolve_type(container, member, arm))
                .collect::<Result<_>>()?,
        }),
        TypeNode::Array(element) => Ok(PmoType::Array {
            element: Box::new(resolve_type(container, member, element)?),
        }),
        TypeNode::Tuple(elements) => Ok(PmoType::Tuple {
            elements: elements
                .iter()
                .map(|e| resolve_type(container, member, e))
                .collect::<Result<_>>()?,
        }),
        TypeNode::Reference { path, args } => resolve_reference(container, member, path, args),
    }
}

fn resolve_reference(
    container: &str,
    member: &str,
    path: &[String],
    args: &[TypeNode],
) -> Result<PmoType> {
    if path.len() > 1 {
        if !args.is_empty() {
            return Err(pmo_error(
                "contains a member with invalid type reference",
                Some(container),
                Some(member),
            ));
        }
        return Ok(PmoType::Reference {
            path: path.to_vec(),
        });
    }

    match (path[0].as_str(), args.len()) {
        ("Snowflake", 0) => Ok(PmoType::Snowflake),
        ("Date", 0) => Ok(PmoType::Date),
        ("Integer", 0) => Ok(PmoType::Primitive {
            kind: PrimitiveKind::Integer,
        }),
        ("Float", 0) => Ok(PmoType::Primitive {
            kind: PrimitiveKind::Float,
        }),
        ("Record", 2) => Ok(PmoType::Map {
            key: Box::new(resolve_type(container, member, &args[0])?),
            value: Box::new(resolve_type(container, member, &args[1])?),
        }),
        _ => Err(pmo_error(
            "contains a member with invalid type reference",
            Some(container),
            Some(member),
        )),
    }
}

/// Only a top-level union against literal `null` unwraps into the `nullable`
/// flag; nested unions stay real unions.
fn resolve_nullable(container: &str, member: &str, ty: PmoType) -> Result<(bool, PmoType)> {
    let PmoType::Union { elements } = ty else {
        return Ok((false, ty));
    };

    let total = elements.len();
    let mut filtered: Vec<PmoType> = elements
        .into_iter()
        .filter(|t| {
            !matches!(
                t,
                PmoType::Primitive {
                    kind: PrimitiveKind::Null
                }
            )
        })
        .collect();

    if filtered.is_empty() {
        return Err(pmo_error(
            "is a union of only null",
            Some(container),
            Some(member),
        ));
    }

    let nullable = filtered.len() != total;
    let ty = if filtered.len() == 1 {
        filtered.pop().unwrap()
    } else {
        PmoType::Union { elements: filtered }
    };
    Ok((nullable, ty))
}
