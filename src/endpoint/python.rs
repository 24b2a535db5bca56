//! Python endpoint backend.

use crate::endpoint::{parse_path, EndpointData, EndpointGenerator, OAuth2Support};

pub struct PythonEndpointGenerator;

impl EndpointGenerator for PythonEndpointGenerator {
    fn generate(&self, data: &EndpointData) -> String {
        let mut output = String::new();
        let mut comment: Vec<String> = Vec::new();

        comment.push(format!("# Method: {}", data.method));

        if data.flags.deprecated {
            comment.push("# Deprecated.".to_string());
        }
        if data.flags.mfa {
            comment.push("# Valid MFA code is required for some actions".to_string());
        }
        if data.flags.supports_audit_reason {
            comment.push("# Supports the X-Audit-Log-Reason header".to_string());
        }
        if data.flags.unauthenticated {
            comment.push("# Does not require authentication".to_string());
        }
        match &data.flags.supports_oauth2 {
            OAuth2Support::Unsupported => {}
            OAuth2Support::Supported => {
                comment.push("# Supports OAuth2 for authentication".to_string());
            }
            OAuth2Support::Scoped(scope) => comment.push(format!(
                "# Supports OAuth2 for authentication with the {scope} scope"
            )),
        }
        for line in &data.description {
            comment.push(format!("# {line}"));
        }

        for line in &comment {
            output.push_str(line);
            output.push('\n');
        }

        if data.endpoint.contains('{') || data.has_query_params {
            let mut params: Vec<String> = Vec::new();
            let (clean_path, _) = parse_path(&data.endpoint, |name| {
                let snake = name.to_snake_case();
                params.push(snake.clone());
                format!("{{{snake}}}")
            });

            let mut args: Vec<String> = params.iter().map(|p| format!("{p}: str")).collect();
            if data.has_query_params {
                args.push(format!(
                    "query: {}QueryParams",
                    data.name.to_pascal_case()
                ));
            }

            output.push_str(&format!(
                "def {}({}) -> str:\n",
                data.name.to_snake_case(),
                args.join(", ")
            ));

            let query_suffix = if data.has_query_params {
                "?{urlencode(query)}"
            } else {
                ""
            };
            output.push_str(&format!("\treturn f\"{clean_path}{query_suffix}\"\n"));
        } else {
            output.push_str(&format!(
                "{} = \"{}\"\n",
                data.name.to_shouting_case(),
                data.endpoint
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointFlags;
    use crate::name::Name;

    fn data(url: &str, has_query: bool) -> EndpointData {
        EndpointData {
            name: Name::new("Get Application Assets"),
            description: vec!["Returns the assets.".to_string()],
            endpoint: url.to_string(),
            has_query_params: has_query,
            flags: EndpointFlags {
                supports_audit_reason: false,
                unauthenticated: false,
                mfa: true,
                supports_oauth2: OAuth2Support::Unsupported,
                deprecated: false,
            },
            method: "GET".to_string(),
        }
    }

    #[test]
    fn constant_for_plain_route() {
        let output = PythonEndpointGenerator.generate(&data("/applications", false));
        assert!(output.contains("# Method: GET"));
        assert!(output.contains("# Valid MFA code is required for some actions"));
        assert!(output.contains("GET_APPLICATION_ASSETS = \"/applications\"\n"));
    }

    #[test]
    fn builder_uses_f_string() {
        let output = PythonEndpointGenerator
            .generate(&data("/oauth2/applications/{application.id}/assets", false));
        assert!(output.contains("def get_application_assets(application_id: str) -> str:"));
        assert!(output.contains("\treturn f\"/oauth2/applications/{application_id}/assets\"\n"));
    }

    #[test]
    fn query_params_urlencoded() {
        let output = PythonEndpointGenerator.generate(&data("/applications", true));
        assert!(output.contains("query: GetApplicationAssetsQueryParams"));
        assert!(output.contains("?{urlencode(query)}"));
    }
}
