//! Lexer and recursive-descent parser for the restricted authoring grammar.
//!
//! The grammar is a deliberately small TypeScript subset: top-level
//! `interface` and `enum` declarations, property signatures with explicit
//! type annotations, enum members with numeric, string, or `a << b`
//! initializers, and `/** … */` doc blocks. Anything outside the subset is a
//! hard error — authoring mistakes must fail the build, not degrade.

use anyhow::{bail, Result};

use crate::pmo::ast::{
    EnumDecl, EnumInit, EnumMember, InterfaceDecl, JsDoc, JsDocTag, PropertySig, Statement,
    TypeNode,
};
use crate::pmo::pmo_error;

// -- Lexer --------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Num(String),
    /// Raw interior of a `/** … */` block.
    Doc(String),
    Shift,
    Punct(char),
}

fn lex(source: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut line = 1;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Comments
        if c == '/' && i + 1 < chars.len() {
            if chars[i + 1] == '/' {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            if chars[i + 1] == '*' {
                let is_doc = i + 2 < chars.len() && chars[i + 2] == '*';
                let start = i + if is_doc { 3 } else { 2 };
                let mut j = start;
                while j + 1 < chars.len() && !(chars[j] == '*' && chars[j + 1] == '/') {
                    j += 1;
                }
                if j + 1 >= chars.len() {
                    bail!("pmo parse error at line {line}: unterminated comment");
                }
                let body: String = chars[start..j].iter().collect();
                line += body.matches('\n').count();
                if is_doc {
                    tokens.push((Token::Doc(body), line));
                }
                i = j + 2;
                continue;
            }
        }

        if c == '"' || c == '\'' {
            let quote = c;
            let mut value = String::new();
            let mut j = i + 1;
            while j < chars.len() && chars[j] != quote {
                if chars[j] == '\\' && j + 1 < chars.len() {
                    j += 1;
                }
                if chars[j] == '\n' {
                    bail!("pmo parse error at line {line}: unterminated string literal");
                }
                value.push(chars[j]);
                j += 1;
            }
            if j >= chars.len() {
                bail!("pmo parse error at line {line}: unterminated string literal");
            }
            tokens.push((Token::Str(value), line));
            i = j + 1;
            continue;
        }

        if c.is_ascii_digit() {
            let mut value = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                value.push(chars[i]);
                i += 1;
            }
            tokens.push((Token::Num(value), line));
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut value = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                value.push(chars[i]);
                i += 1;
            }
            tokens.push((Token::Ident(value), line));
            continue;
        }

        if c == '<' && i + 1 < chars.len() && chars[i + 1] == '<' {
            tokens.push((Token::Shift, line));
            i += 2;
            continue;
        }

        if "{}[]<>()|?:;,.=".contains(c) {
            tokens.push((Token::Punct(c), line));
            i += 1;
            continue;
        }

        bail!("pmo parse error at line {line}: unexpected character `{c}`");
    }

    Ok(tokens)
}

/// Split a raw doc-block interior into its description and `@tag` entries.
/// Tag comments continue across lines until the next tag.
fn parse_jsdoc(raw: &str) -> JsDoc {
    let mut description: Vec<String> = Vec::new();
    let mut tags: Vec<JsDocTag> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in raw.lines() {
        let line = line.trim().trim_start_matches('*').trim();

        if let Some(rest) = line.strip_prefix('@') {
            if let Some((name, lines)) = current.take() {
                tags.push(finish_tag(name, lines));
            }
            let mut parts = rest.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or("").to_string();
            let comment = parts.next().map(|s| s.trim().to_string());
            current = Some((name, comment.into_iter().collect()));
        } else if let Some((_, lines)) = current.as_mut() {
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        } else if !line.is_empty() {
            description.push(line.to_string());
        }
    }
    if let Some((name, lines)) = current.take() {
        tags.push(finish_tag(name, lines));
    }

    JsDoc {
        description: if description.is_empty() {
            None
        } else {
            Some(description.join(" "))
        },
        tags,
    }
}

fn finish_tag(name: String, lines: Vec<String>) -> JsDocTag {
    JsDocTag {
        name,
        comment: if lines.is_empty() {
            None
        } else {
            Some(lines.join(" "))
        },
    }
}

// -- Parser -------------------------------------------------------------------

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

/// Parse authoring source into top-level statements.
pub fn parse(source: &str) -> Result<Vec<Statement>> {
    let mut parser = Parser {
        tokens: lex(source)?,
        pos: 0,
    };
    parser.statements()
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            bail!("pmo parse error at line {}: expected `{c}`", self.line());
        }
    }

    fn take_doc(&mut self) -> Option<JsDoc> {
        let mut doc: Option<JsDoc> = None;
        while let Some(Token::Doc(raw)) = self.peek() {
            let parsed = parse_jsdoc(raw);
            doc = Some(match doc.take() {
                None => parsed,
                Some(mut existing) => {
                    // Multiple consecutive blocks merge, descriptions joined.
                    existing.description = match (existing.description, parsed.description) {
                        (Some(a), Some(b)) => Some(format!("{a} {b}")),
                        (a, b) => a.or(b),
                    };
                    existing.tags.extend(parsed.tags);
                    existing
                }
            });
            self.pos += 1;
        }
        doc
    }

    fn statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        while self.peek().is_some() {
            let doc = self.take_doc();

            let mut keyword = match self.next() {
                Some(Token::Ident(k)) => k,
                _ => bail!(
                    "pmo parse error at line {}: expected an interface or enum declaration",
                    self.line()
                ),
            };
            if keyword == "export" {
                keyword = match self.next() {
                    Some(Token::Ident(k)) => k,
                    _ => bail!(
                        "pmo parse error at line {}: expected a declaration after `export`",
                        self.line()
                    ),
                };
            }

            match keyword.as_str() {
                "interface" => statements.push(Statement::Interface(self.interface(doc)?)),
                "enum" => statements.push(Statement::Enum(self.enumeration(doc)?)),
                other => bail!(
                    "pmo parse error at line {}: unsupported top-level declaration `{other}`",
                    self.line()
                ),
            }
        }

        Ok(statements)
    }

    fn declaration_name(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            _ => bail!(
                "pmo parse error at line {}: expected a declaration name",
                self.line()
            ),
        }
    }

    fn interface(&mut self, doc: Option<JsDoc>) -> Result<InterfaceDecl> {
        let name = self.declaration_name()?;
        self.expect_punct('{')?;

        let mut members = Vec::new();
        while !self.eat_punct('}') {
            if self.peek().is_none() {
                bail!("pmo parse error at line {}: unterminated interface body", self.line());
            }
            members.push(self.property(&name)?);
        }

        Ok(InterfaceDecl { name, doc, members })
    }

    fn property(&mut self, container: &str) -> Result<PropertySig> {
        let doc = self.take_doc();

        let member_name = match self.next() {
            Some(Token::Ident(n)) => n,
            Some(Token::Str(n)) => n,
            Some(Token::Num(n)) => n,
            _ => return Err(pmo_error("contains a member with invalid name", Some(container), None)),
        };

        let optional = self.eat_punct('?');

        if !self.eat_punct(':') {
            return Err(pmo_error(
                "contains a member that isn't a property signature or doesn't have a type",
                Some(container),
                None,
            ));
        }

        let ty = self.type_node(container, &member_name)?;

        // `;` separators, the occasional `,`.
        while self.eat_punct(';') || self.eat_punct(',') {}

        Ok(PropertySig {
            name: member_name,
            optional,
            ty,
            doc,
        })
    }

    fn type_node(&mut self, container: &str, member: &str) -> Result<TypeNode> {
        let mut arms = vec![self.postfix_type(container, member)?];
        while self.eat_punct('|') {
            arms.push(self.postfix_type(container, member)?);
        }
        if arms.len() == 1 {
            Ok(arms.pop().unwrap())
        } else {
            Ok(TypeNode::Union(arms))
        }
    }

    fn postfix_type(&mut self, container: &str, member: &str) -> Result<TypeNode> {
        let mut ty = self.primary_type(container, member)?;
        while self.peek() == Some(&Token::Punct('[')) {
            // Array suffix is exactly `[]`.
            self.pos += 1;
            self.expect_punct(']')?;
            ty = TypeNode::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn primary_type(&mut self, container: &str, member: &str) -> Result<TypeNode> {
        match self.next() {
            Some(Token::Ident(name)) => match name.as_str() {
                "string" => Ok(TypeNode::String),
                "boolean" => Ok(TypeNode::Boolean),
                "null" => Ok(TypeNode::Null),
                _ => {
                    let mut path = vec![name];
                    while self.eat_punct('.') {
                        match self.next() {
                            Some(Token::Ident(segment)) => path.push(segment),
                            _ => {
                                return Err(pmo_error(
                                    "contains a member with invalid type reference",
                                    Some(container),
                                    Some(member),
                                ))
                            }
                        }
                    }

                    let mut args = Vec::new();
                    if self.eat_punct('<') {
                        args.push(self.type_node(container, member)?);
                        while self.eat_punct(',') {
                            args.push(self.type_node(container, member)?);
                        }
                        self.expect_punct('>')?;
                    }

                    Ok(TypeNode::Reference { path, args })
                }
            },
            Some(Token::Punct('[')) => {
                let mut elements = vec![self.type_node(container, member)?];
                while self.eat_punct(',') {
                    elements.push(self.type_node(container, member)?);
                }
                self.expect_punct(']')?;
                Ok(TypeNode::Tuple(elements))
            }
            Some(Token::Punct('(')) => {
                let inner = self.type_node(container, member)?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            Some(Token::Str(_)) | Some(Token::Num(_)) => Err(pmo_error(
                "is a literal that isn't null",
                Some(container),
                Some(member),
            )),
            _ => Err(pmo_error(
                "contains a member with unhandled type",
                Some(container),
                Some(member),
            )),
        }
    }

    fn enumeration(&mut self, doc: Option<JsDoc>) -> Result<EnumDecl> {
        let name = self.declaration_name()?;
        self.expect_punct('{')?;

        let mut members = Vec::new();
        while !self.eat_punct('}') {
            if self.peek().is_none() {
                bail!("pmo parse error at line {}: unterminated enum body", self.line());
            }
            members.push(self.enum_member(&name)?);
        }

        Ok(EnumDecl { name, doc, members })
    }

    fn enum_member(&mut self, container: &str) -> Result<EnumMember> {
        let doc = self.take_doc();

        let member_name = match self.next() {
            Some(Token::Ident(n)) => n,
            Some(Token::Str(n)) => n,
            Some(Token::Num(n)) => n,
            _ => return Err(pmo_error("contains a member with invalid name", Some(container), None)),
        };

        if !self.eat_punct('=') {
            return Err(pmo_error(
                "doesn't have an initializer",
                Some(container),
                Some(&member_name),
            ));
        }

        let init = match self.next() {
            Some(Token::Num(left)) => {
                if self.peek() == Some(&Token::Shift) {
                    self.pos += 1;
                    match self.next() {
                        Some(Token::Num(right)) => EnumInit::Shift(
                            parse_number(&left, container, &member_name)?,
                            parse_number(&right, container, &member_name)? as u32,
                        ),
                        _ => {
                            return Err(pmo_error(
                                "should have numeric literals on both sides of the binary expression",
                                Some(container),
                                Some(&member_name),
                            ))
                        }
                    }
                } else {
                    EnumInit::Number(parse_number(&left, container, &member_name)? as i64)
                }
            }
            Some(Token::Str(value)) => EnumInit::String(value),
            _ => {
                return Err(pmo_error(
                    "expected binary expression",
                    Some(container),
                    Some(&member_name),
                ))
            }
        };

        while self.eat_punct(',') || self.eat_punct(';') {}

        Ok(EnumMember {
            name: member_name,
            doc,
            init,
        })
    }
}

fn parse_number(raw: &str, container: &str, member: &str) -> Result<u64> {
    raw.parse().map_err(|_| {
        pmo_error(
            "should have numeric literals on both sides of the binary expression",
            Some(container),
            Some(member),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_with_docs_and_types() {
        let source = r#"
/** A guild member. */
interface GuildMember {
  /**
   * The member's user id.
   * @deprecated use id instead
   * @note only present in gateway payloads
   */
  user_id?: Snowflake | null;
  roles: Snowflake[];
  pair: [Integer, string];
  meta: Record<string, string>;
  guild: Resources.Guild.PartialGuild;
}
"#;
        let statements = parse(source).unwrap();
        assert_eq!(statements.len(), 1);
        let Statement::Interface(decl) = &statements[0] else {
            panic!("expected interface");
        };
        assert_eq!(decl.name, "GuildMember");
        assert_eq!(
            decl.doc.as_ref().unwrap().description.as_deref(),
            Some("A guild member.")
        );
        assert_eq!(decl.members.len(), 5);

        let user_id = &decl.members[0];
        assert_eq!(user_id.name, "user_id");
        assert!(user_id.optional);
        assert_eq!(
            user_id.ty,
            TypeNode::Union(vec![
                TypeNode::Reference {
                    path: vec!["Snowflake".to_string()],
                    args: vec![]
                },
                TypeNode::Null
            ])
        );
        let doc = user_id.doc.as_ref().unwrap();
        assert_eq!(doc.description.as_deref(), Some("The member's user id."));
        assert_eq!(doc.tags.len(), 2);
        assert_eq!(doc.tags[0].name, "deprecated");
        assert_eq!(doc.tags[0].comment.as_deref(), Some("use id instead"));

        assert!(matches!(decl.members[1].ty, TypeNode::Array(_)));
        assert!(matches!(decl.members[2].ty, TypeNode::Tuple(_)));
        let TypeNode::Reference { path, args } = &decl.members[3].ty else {
            panic!("expected reference");
        };
        assert_eq!(path, &["Record".to_string()]);
        assert_eq!(args.len(), 2);
        let TypeNode::Reference { path, .. } = &decl.members[4].ty else {
            panic!("expected qualified reference");
        };
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn enum_with_all_initializer_kinds() {
        let source = r#"
enum VisibilityType {
  NONE = 0,
  EVERYONE = 1,
}
enum StatusType {
  ONLINE = "online",
}
enum PermissionFlags {
  CREATE_INVITES = 1 << 0,
  KICK_MEMBERS = 1 << 1,
}
"#;
        let statements = parse(source).unwrap();
        assert_eq!(statements.len(), 3);
        let Statement::Enum(flags) = &statements[2] else {
            panic!("expected enum");
        };
        assert_eq!(flags.members[0].init, EnumInit::Shift(1, 0));
        assert_eq!(flags.members[1].init, EnumInit::Shift(1, 1));
    }

    #[test]
    fn member_without_type_is_an_error() {
        let err = parse("interface X { name; }").unwrap_err();
        assert!(err.to_string().contains("property signature"));
        assert!(err.to_string().contains("X"));
    }

    #[test]
    fn enum_member_without_initializer_is_an_error() {
        let err = parse("enum XType { A, }").unwrap_err();
        assert!(err.to_string().contains("initializer"));
    }

    #[test]
    fn literal_type_that_is_not_null_is_an_error() {
        let err = parse("interface X { a: \"foo\"; }").unwrap_err();
        assert!(err.to_string().contains("literal that isn't null"));
    }

    #[test]
    fn unsupported_top_level_is_an_error() {
        let err = parse("const x = 1;").unwrap_err();
        assert!(err.to_string().contains("unsupported top-level"));
    }

    #[test]
    fn string_member_names_allowed() {
        let statements = parse("interface X { \"$meta\": string; }").unwrap();
        let Statement::Interface(decl) = &statements[0] else {
            panic!();
        };
        assert_eq!(decl.members[0].name, "$meta");
    }
}
