//! TypeScript endpoint backend.

use crate::endpoint::{parse_path, EndpointData, EndpointGenerator, OAuth2Support};

pub struct TypescriptEndpointGenerator;

impl EndpointGenerator for TypescriptEndpointGenerator {
    fn generate(&self, data: &EndpointData) -> String {
        let mut output = String::new();
        let mut comment: Vec<String> = Vec::new();

        comment.push(format!(" * Method: `{}`", data.method));

        if data.flags.deprecated {
            comment.push(" * @deprecated".to_string());
        }
        if data.flags.mfa {
            comment.push(" * Valid MFA code is required for some actions".to_string());
        }
        if data.flags.supports_audit_reason {
            comment.push(" * Supports the `X-Audit-Log-Reason` header".to_string());
        }
        if data.flags.unauthenticated {
            comment.push(" * Does not require authentication".to_string());
        }
        match &data.flags.supports_oauth2 {
            OAuth2Support::Unsupported => {}
            OAuth2Support::Supported => {
                comment.push(" * Supports OAuth2 for authentication".to_string());
            }
            OAuth2Support::Scoped(scope) => comment.push(format!(
                " * Supports OAuth2 for authentication with the `{scope}` scope"
            )),
        }
        for line in &data.description {
            comment.push(format!(" * {line}"));
        }

        output.push_str("/**\n");
        output.push_str(&comment.join("\n *\n"));
        output.push_str("\n */\n");

        let fn_name = data.name.to_shouting_case();

        if data.endpoint.contains('{') || data.has_query_params {
            let mut params: Vec<String> = Vec::new();
            let (clean_path, _) = parse_path(&data.endpoint, |name| {
                let camel = name.to_camel_case();
                params.push(camel.clone());
                format!("${{{camel}}}")
            });

            let mut args: Vec<String> = Vec::new();
            if data.has_query_params {
                args.push(format!("query: {}QueryParams", data.name.to_pascal_case()));
            }
            args.extend(params.iter().map(|p| format!("{p}: any")));

            output.push_str(&format!(
                "export function {fn_name}({}): string {{\n",
                args.join(", ")
            ));

            let query_suffix = if data.has_query_params {
                "?${new URLSearchParams(Object.entries(query)).toString()}"
            } else {
                ""
            };
            output.push_str(&format!("\treturn `{clean_path}{query_suffix}`;\n"));
            output.push_str("}\n");
        } else {
            output.push_str(&format!(
                "export const {fn_name} = \"{}\";\n",
                data.endpoint
            ));
        }

        output
    }
}
