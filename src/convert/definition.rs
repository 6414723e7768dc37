use super::hcl::{self, ProviderBlock};

/// A declared resource awaiting import
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceDefinition {
    pub resource_type: String,
    pub name: String,
    pub provider: String,
}

impl ResourceDefinition {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            provider: provider.into(),
        }
    }

    /// `type.name` address used by the IaC tool
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }

    /// Remote id embedded in the name after the first `-`
    pub fn import_id(&self) -> Option<&str> {
        self.name
            .split_once('-')
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
    }
}

/// Render the placeholder declarations the IaC tool imports into
///
/// One empty provider stanza per distinct provider tag (explicit `providers`
/// first, then any tag only found on a definition), followed by one empty
/// resource stanza per definition in input order. Uniqueness of names is the
/// caller's responsibility.
pub fn assemble_headers(definitions: &[ResourceDefinition], providers: &[&str]) -> String {
    let mut provider_tags: Vec<&str> = Vec::new();
    let declared = providers
        .iter()
        .copied()
        .chain(definitions.iter().map(|d| d.provider.as_str()));

    for tag in declared {
        if !provider_tags.contains(&tag) {
            provider_tags.push(tag);
        }
    }

    let mut out = String::new();

    for tag in provider_tags {
        out.push_str(&hcl::render_provider(&ProviderBlock::new(tag)));
        out.push('\n');
    }

    for definition in definitions {
        out.push_str(&hcl::render_empty_resource(
            &definition.resource_type,
            &definition.name,
        ));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::classifier::classify_all;
    use crate::test_helpers::{StaticAppSource, remote_app};
    use std::collections::HashSet;

    #[test]
    fn test_address_and_import_id() {
        let definition = ResourceDefinition::new("onelogin_saml_apps", "my_app-1234", "onelogin");
        assert_eq!(definition.address(), "onelogin_saml_apps.my_app-1234");
        assert_eq!(definition.import_id(), Some("1234"));

        let no_id = ResourceDefinition::new("onelogin_apps", "orphan", "onelogin");
        assert_eq!(no_id.import_id(), None);
    }

    #[test]
    fn test_assemble_headers() {
        let definitions = vec![
            ResourceDefinition::new("onelogin_saml_apps", "saml-100", "onelogin"),
            ResourceDefinition::new("onelogin_oidc_apps", "oidc-200", "onelogin"),
        ];

        let headers = assemble_headers(&definitions, &["onelogin"]);

        assert_eq!(
            headers,
            "provider \"onelogin\" {}\n\n\
             resource \"onelogin_saml_apps\" \"saml-100\" {}\n\n\
             resource \"onelogin_oidc_apps\" \"oidc-200\" {}\n\n"
        );
    }

    #[test]
    fn test_assemble_headers_one_provider_stanza_per_tag() {
        let definitions = vec![
            ResourceDefinition::new("onelogin_apps", "a-1", "onelogin"),
            ResourceDefinition::new("okta_app_basic_auth", "b-2", "okta"),
        ];

        let headers = assemble_headers(&definitions, &["onelogin", "onelogin"]);

        assert_eq!(headers.matches("provider \"onelogin\"").count(), 1);
        assert_eq!(headers.matches("provider \"okta\"").count(), 1);
    }

    #[test]
    fn test_classified_definitions_have_unique_keys() {
        let source = StaticAppSource::new(Vec::new());
        // Same display name, distinct ids
        let apps: Vec<_> = (1..=50)
            .map(|id| remote_app(id, "Shared Name", [1, 2, 8][(id % 3) as usize]))
            .collect();

        let definitions = classify_all(&apps, &source);
        let headers = assemble_headers(&definitions, &["onelogin"]);

        let keys: HashSet<(String, String)> = definitions
            .iter()
            .map(|d| (d.resource_type.clone(), d.name.clone()))
            .collect();
        assert_eq!(keys.len(), definitions.len());
        assert_eq!(headers.matches("resource \"").count(), 50);
    }
}
