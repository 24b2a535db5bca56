//! Endpoint-route pipeline: route header + surrounding prose → per-language
//! URL builders.

pub mod python;
pub mod rust;
pub mod typescript;

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::Regex;

use crate::dom::SiblingContext;
use crate::name::Name;

/// Behavior flags carried on a route header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFlags {
    pub supports_audit_reason: bool,
    pub unauthenticated: bool,
    pub mfa: bool,
    pub supports_oauth2: OAuth2Support,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuth2Support {
    Unsupported,
    Supported,
    /// Supported with a named scope.
    Scoped(String),
}

/// Everything the emitters need about one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointData {
    pub name: Name,
    pub description: Vec<String>,
    pub endpoint: String,
    pub has_query_params: bool,
    pub flags: EndpointFlags,
    pub method: String,
}

/// Trait for rendering an [`EndpointData`] into one language's source text.
pub trait EndpointGenerator {
    fn generate(&self, data: &EndpointData) -> String;
}

pub fn create_endpoint_generator(lang: &str) -> Result<Box<dyn EndpointGenerator>> {
    match lang {
        "typescript" | "ts" => Ok(Box::new(typescript::TypescriptEndpointGenerator)),
        "rust" | "rs" => Ok(Box::new(rust::RustEndpointGenerator)),
        "python" | "py" => Ok(Box::new(python::PythonEndpointGenerator)),
        _ => Err(anyhow!(
            "unknown endpoint language: {}. Use typescript, rust, or python",
            lang
        )),
    }
}

/// Read a `routeheader` element and the siblings following it.
///
/// Description lines come from the elements between the header and the next
/// `<h6>`; that heading's first word being `query` marks a query-parameter
/// table. Hitting an `<h3>` first means the next route section started with
/// no tables at all.
pub fn tokenize_route(
    context: SiblingContext<'_>,
    warnings: &mut Vec<String>,
) -> Option<EndpointData> {
    let header = context.target();

    let Some(url) = header.attr("url") else {
        warnings.push("failed to tokenize route header: missing url attribute".to_string());
        return None;
    };
    let method = header.attr("method").unwrap_or("GET").to_uppercase();
    let name = header.text_content().trim().to_string();
    if name.is_empty() {
        warnings.push("failed to tokenize route header: empty route name".to_string());
        return None;
    }

    let supports_oauth2 = match header.attr("supports-oauth2") {
        None => OAuth2Support::Unsupported,
        Some("") => OAuth2Support::Supported,
        Some(scope) => OAuth2Support::Scoped(scope.to_string()),
    };
    let flags = EndpointFlags {
        supports_audit_reason: header.has_attr("supports-audit-reason"),
        unauthenticated: header.has_attr("unauthenticated"),
        mfa: header.has_attr("mfa"),
        supports_oauth2,
        deprecated: header.has_attr("deprecated"),
    };

    let mut has_query_params = false;
    let mut description = Vec::new();
    for elem in context.after() {
        if elem.tag == "h6" {
            has_query_params = elem
                .text_content()
                .split_whitespace()
                .next()
                .is_some_and(|w| w.eq_ignore_ascii_case("query"));
            break;
        }
        if elem.tag == "h3" || elem.first_element().is_some_and(|e| e.tag == "h3") {
            break;
        }
        description.extend(elem.visible_lines());
    }

    Some(EndpointData {
        name: Name::new(name),
        description,
        endpoint: url.to_string(),
        has_query_params,
        flags,
        method,
    })
}

static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([\w.]+)\}").expect("param pattern is valid"));

/// Replace every `{param}` placeholder via `substitute` and collect the
/// parameter names (dots become spaces, `{guild.id}` → `guild id`).
pub(crate) fn parse_path(
    path: &str,
    mut substitute: impl FnMut(&Name) -> String,
) -> (String, Vec<Name>) {
    let mut params = Vec::new();
    let replaced = PARAM_RE.replace_all(path, |caps: &regex::Captures<'_>| {
        let name = Name::new(caps[1].replace('.', " "));
        let rendered = substitute(&name);
        params.push(name);
        rendered
    });
    (replaced.into_owned(), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_elements, parse_document};

    fn tokenize_first(html: &str) -> (Option<EndpointData>, Vec<String>) {
        let doc = parse_document(html);
        let headers = find_elements(&doc, "routeheader");
        let mut warnings = Vec::new();
        let data = tokenize_route(headers[0], &mut warnings);
        (data, warnings)
    }

    #[test]
    fn route_with_flags_and_description() {
        let (data, warnings) = tokenize_first(
            r#"<routeheader method="get" url="/applications/{application.id}/assets"
                 unauthenticated supports-oauth2="applications.builds.read">
                 Get Application Assets</routeheader>
               <p>Returns the assets.</p>
               <h6>Query String Params</h6>
               <table></table>"#,
        );
        let data = data.unwrap();
        assert!(warnings.is_empty());
        assert_eq!(data.method, "GET");
        assert_eq!(data.endpoint, "/applications/{application.id}/assets");
        assert_eq!(data.name.0, "Get Application Assets");
        assert!(data.flags.unauthenticated);
        assert!(!data.flags.mfa);
        assert_eq!(
            data.flags.supports_oauth2,
            OAuth2Support::Scoped("applications.builds.read".to_string())
        );
        assert!(data.has_query_params);
        assert_eq!(data.description, vec!["Returns the assets."]);
    }

    #[test]
    fn next_section_means_no_query_params() {
        let (data, _) = tokenize_first(
            r#"<routeheader method="get" url="/gateway">Get Gateway</routeheader>
               <p>Simple route.</p>
               <div><h3>Next Route</h3></div>"#,
        );
        let data = data.unwrap();
        assert!(!data.has_query_params);
        assert_eq!(data.description, vec!["Simple route."]);
    }

    #[test]
    fn non_query_heading_is_not_query_params() {
        let (data, _) = tokenize_first(
            r#"<routeheader method="post" url="/guilds">Create Guild</routeheader>
               <h6>JSON Params</h6>
               <table></table>"#,
        );
        assert!(!data.unwrap().has_query_params);
    }

    #[test]
    fn missing_url_fails_softly() {
        let (data, warnings) =
            tokenize_first(r#"<routeheader method="get">Get Gateway</routeheader>"#);
        assert!(data.is_none());
        assert!(warnings[0].contains("url"));
    }

    #[test]
    fn path_params_extracted_with_dots_split() {
        let (clean, params) = parse_path("/guilds/{guild.id}/members/{user_id}", |_| {
            "{}".to_string()
        });
        assert_eq!(clean, "/guilds/{}/members/{}");
        assert_eq!(params[0].0, "guild id");
        assert_eq!(params[1].0, "user_id");
    }
}
