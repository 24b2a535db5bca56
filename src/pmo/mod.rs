//! PMO authoring pipeline — compact interface/enum declarations in markdown
//! code fences, expanded into documentation tables.
//!
//! The forward direction of the round trip: authors write fenced blocks
//! tagged `pmo`, the build expands them into the same table markup the
//! tokenizer later re-parses. Authoring mistakes are hard errors that abort
//! the build.

pub mod ast;
pub mod parser;
pub mod resolve;
pub mod serialize;

use anyhow::{anyhow, bail, Result};

/// Build an authoring error carrying the container/member path.
pub(crate) fn pmo_error(
    message: &str,
    container: Option<&str>,
    member: Option<&str>,
) -> anyhow::Error {
    let prefix = match (container, member) {
        (Some(container), Some(member)) => format!(" {container}.{member}"),
        (Some(container), None) => format!(" {container}"),
        _ => String::new(),
    };
    anyhow!("pmo definition{prefix}: {message}")
}

/// Rewrite a markdown document, expanding every `pmo` code fence into its
/// serialized table blocks. Other content passes through verbatim.
pub fn expand_document(input: &str) -> Result<String> {
    let lines: Vec<&str> = input.lines().collect();
    let mut output: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        let Some(info) = trimmed.strip_prefix("```") else {
            output.push(line.to_string());
            i += 1;
            continue;
        };

        let mut words = info.trim().split_whitespace();
        let lang = words.next().unwrap_or("");
        let is_pmo = words.any(|w| w == "pmo");

        if !is_pmo {
            // Ordinary fence: copy verbatim through its closing line.
            output.push(line.to_string());
            i += 1;
            while i < lines.len() {
                output.push(lines[i].to_string());
                let closed = lines[i].trim_start().starts_with("```");
                i += 1;
                if closed {
                    break;
                }
            }
            continue;
        }

        if !lang.eq_ignore_ascii_case("ts") && !lang.eq_ignore_ascii_case("typescript") {
            bail!("found a pmo code fence with invalid language `{lang}`");
        }

        let mut body = Vec::new();
        i += 1;
        loop {
            if i >= lines.len() {
                bail!("unterminated pmo code fence");
            }
            if lines[i].trim() == "```" {
                i += 1;
                break;
            }
            body.push(lines[i]);
            i += 1;
        }

        let statements = parser::parse(&body.join("\n"))?;
        let models = resolve::resolve(&statements)?;
        let blocks: Vec<String> = models
            .iter()
            .map(serialize::serialize)
            .collect::<Result<_>>()?;
        output.push(blocks.join("\n"));
    }

    Ok(output.join("\n") + "\n")
}
