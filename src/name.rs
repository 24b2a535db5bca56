//! Case conversions for route and field names.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// A raw space-separated name (`"Get Application Assets"`, `"application id"`)
/// with conversions into the identifier style each target language expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(raw: impl Into<String>) -> Name {
        Name(raw.into())
    }

    pub fn to_snake_case(&self) -> String {
        self.0.to_snake_case()
    }

    pub fn to_pascal_case(&self) -> String {
        self.0.to_upper_camel_case()
    }

    pub fn to_camel_case(&self) -> String {
        self.0.to_lower_camel_case()
    }

    /// Snake case in capitals, for constant and route-builder names.
    pub fn to_shouting_case(&self) -> String {
        self.to_snake_case().to_uppercase()
    }
}

/// PascalCase a heading or cell word run the way table titles are normalized:
/// split on spaces, underscores, and hyphens, capitalize each word.
pub fn pascal_words(raw: &str) -> String {
    raw.to_upper_camel_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case() {
        assert_eq!(Name::new("Get Application Assets").to_snake_case(), "get_application_assets");
    }

    #[test]
    fn pascal_case() {
        assert_eq!(Name::new("get application assets").to_pascal_case(), "GetApplicationAssets");
    }

    #[test]
    fn camel_case() {
        assert_eq!(Name::new("application id").to_camel_case(), "applicationId");
    }

    #[test]
    fn shouting_case() {
        assert_eq!(Name::new("Get Applications").to_shouting_case(), "GET_APPLICATIONS");
    }

    #[test]
    fn pascal_words_mixed_separators() {
        assert_eq!(pascal_words("audit log_entry"), "AuditLogEntry");
        assert_eq!(pascal_words("ISO8601 timestamp"), "Iso8601Timestamp");
    }
}
