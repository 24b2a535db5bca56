//! Rust endpoint backend.

use crate::endpoint::{parse_path, EndpointData, EndpointGenerator, OAuth2Support};

pub struct RustEndpointGenerator;

impl EndpointGenerator for RustEndpointGenerator {
    fn generate(&self, data: &EndpointData) -> String {
        let mut output = String::new();
        let mut comment: Vec<String> = Vec::new();

        comment.push(format!("/// Method: `{}`", data.method));

        if data.flags.mfa {
            comment.push("/// Valid MFA code is required for some actions".to_string());
        }
        if data.flags.supports_audit_reason {
            comment.push("/// Supports the `X-Audit-Log-Reason` header".to_string());
        }
        if data.flags.unauthenticated {
            comment.push("/// Does not require authentication".to_string());
        }
        match &data.flags.supports_oauth2 {
            OAuth2Support::Unsupported => {}
            OAuth2Support::Supported => {
                comment.push("/// Supports OAuth2 for authentication".to_string());
            }
            OAuth2Support::Scoped(scope) => comment.push(format!(
                "/// Supports OAuth2 for authentication with the `{scope}` scope"
            )),
        }
        for line in &data.description {
            comment.push(format!("/// {line}"));
        }

        output.push_str(&comment.join("\n///\n"));
        output.push('\n');

        if data.flags.deprecated {
            output.push_str("#[deprecated]\n");
        }

        let fn_name = data.name.to_shouting_case();

        if data.endpoint.contains('{') || data.has_query_params {
            let (clean_path, params) = parse_path(&data.endpoint, |_| "{}".to_string());

            let mut args: Vec<String> = Vec::new();
            if data.has_query_params {
                args.push(format!(
                    "query: &{}QueryParams",
                    data.name.to_pascal_case()
                ));
            }
            args.extend(
                params
                    .iter()
                    .map(|p| format!("{}: &{}", p.to_snake_case(), p.to_pascal_case())),
            );

            output.push_str(&format!("pub fn {fn_name}({}) -> String {{\n", args.join(", ")));

            let mut format_args: Vec<String> =
                params.iter().map(|p| p.to_snake_case()).collect();
            let query_suffix = if data.has_query_params {
                format_args
                    .push("serde_urlencoded::to_string(query).unwrap_or_default()".to_string());
                "?{}"
            } else {
                ""
            };

            if format_args.is_empty() {
                output.push_str(&format!("\tformat!(\"{clean_path}{query_suffix}\")\n"));
            } else {
                output.push_str(&format!(
                    "\tformat!(\"{clean_path}{query_suffix}\", {})\n",
                    format_args.join(", ")
                ));
            }
            output.push_str("}\n");
        } else {
            output.push_str(&format!(
                "pub const {fn_name}: &str = \"{}\";\n",
                data.endpoint
            ));
        }

        output
    }
}
