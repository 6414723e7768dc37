use heck::ToSnakeCase;
use lazy_static::lazy_static;
use regex::Regex;

use super::definition::ResourceDefinition;
use crate::remote::{AppSource, RemoteResource};

const OIDC_AUTH_METHOD: i32 = 8;
const SAML_AUTH_METHOD: i32 = 2;

lazy_static! {
    static ref SPECIAL_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_\s]").unwrap();
}

/// Authentication method reported by the provider for an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    Oidc,
    Saml,
    /// Any discriminant without a dedicated destination type (password,
    /// WS-Fed, bookmarks, ...)
    Other(i32),
}

/// Discriminants with a dedicated destination type. Everything else is `Other`.
const AUTH_METHOD_TABLE: &[(i32, AuthMethod)] = &[
    (OIDC_AUTH_METHOD, AuthMethod::Oidc),
    (SAML_AUTH_METHOD, AuthMethod::Saml),
];

impl AuthMethod {
    pub fn from_discriminant(value: i32) -> Self {
        AUTH_METHOD_TABLE
            .iter()
            .find(|(discriminant, _)| *discriminant == value)
            .map(|(_, method)| *method)
            .unwrap_or(AuthMethod::Other(value))
    }
}

/// Destination resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppType {
    OidcApp,
    SamlApp,
    GenericApp,
}

impl AppType {
    pub const ALL: [AppType; 3] = [AppType::GenericApp, AppType::SamlApp, AppType::OidcApp];

    /// Resource type tag used in declaration files
    pub fn tag(&self) -> &'static str {
        match self {
            AppType::OidcApp => "onelogin_oidc_apps",
            AppType::SamlApp => "onelogin_saml_apps",
            AppType::GenericApp => "onelogin_apps",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|app_type| app_type.tag() == tag)
    }

    /// Destination type of a fetched app
    pub fn of(resource: &RemoteResource) -> Self {
        AppType::from(AuthMethod::from_discriminant(resource.auth_method))
    }

    /// Native listing filter for this type. `None` lists every type.
    pub fn auth_method_filter(&self) -> Option<i32> {
        match self {
            AppType::OidcApp => Some(OIDC_AUTH_METHOD),
            AppType::SamlApp => Some(SAML_AUTH_METHOD),
            AppType::GenericApp => None,
        }
    }
}

impl From<AuthMethod> for AppType {
    fn from(method: AuthMethod) -> Self {
        match method {
            AuthMethod::Oidc => AppType::OidcApp,
            AuthMethod::Saml => AppType::SamlApp,
            AuthMethod::Other(_) => AppType::GenericApp,
        }
    }
}

/// Assign a destination type and a unique declaration name to a fetched app
pub fn classify(resource: &RemoteResource, source: &dyn AppSource) -> ResourceDefinition {
    let app_type = AppType::of(resource);
    let seed = source.name_seed(resource, app_type);

    ResourceDefinition::new(
        app_type.tag(),
        resource_name(&seed, app_type, resource.id),
        source.provider(),
    )
}

/// Classify every resource, preserving input order
pub fn classify_all(resources: &[RemoteResource], source: &dyn AppSource) -> Vec<ResourceDefinition> {
    resources.iter().map(|r| classify(r, source)).collect()
}

/// Build `<snake_case_seed>-<id>`
///
/// The normalized part never contains `-`, so the id is always the text after
/// the first `-`. Seeds that normalize to nothing fall back to the type tag.
pub fn resource_name(seed: &str, app_type: AppType, id: i64) -> String {
    let mut base = normalize(seed);

    if base.is_empty() {
        base = app_type.tag().to_string();
    }

    // Identifiers must not start with a digit
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        base = format!("app_{}", base);
    }

    format!("{}-{}", base, id)
}

fn normalize(seed: &str) -> String {
    SPECIAL_CHARS.replace_all(seed, "").to_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StaticAppSource, remote_app};
    use crate::remote::NameFrom;

    #[test]
    fn test_classification_is_total() {
        for discriminant in [-1, 0, 1, 2, 3, 4, 7, 8, 9, i32::MAX] {
            let app_type = AppType::from(AuthMethod::from_discriminant(discriminant));
            assert!(AppType::ALL.contains(&app_type));
        }

        assert_eq!(AppType::from(AuthMethod::from_discriminant(8)), AppType::OidcApp);
        assert_eq!(AppType::from(AuthMethod::from_discriminant(2)), AppType::SamlApp);
        assert_eq!(AppType::from(AuthMethod::from_discriminant(1)), AppType::GenericApp);
        assert_eq!(AuthMethod::from_discriminant(5), AuthMethod::Other(5));
    }

    #[test]
    fn test_tag_round_trip() {
        for app_type in AppType::ALL {
            assert_eq!(AppType::from_tag(app_type.tag()), Some(app_type));
        }
        assert_eq!(AppType::from_tag("okta_apps"), None);
    }

    #[test]
    fn test_filter_matches_discriminant() {
        for app_type in AppType::ALL {
            if let Some(filter) = app_type.auth_method_filter() {
                assert_eq!(AppType::from(AuthMethod::from_discriminant(filter)), app_type);
            }
        }
        assert_eq!(AppType::GenericApp.auth_method_filter(), None);
    }

    #[test]
    fn test_classify_display_name() {
        let source = StaticAppSource::new(Vec::new());
        let definition = classify(&remote_app(100, "My SAML App!", 2), &source);

        assert_eq!(definition.resource_type, "onelogin_saml_apps");
        assert_eq!(definition.name, "my_saml_app-100");
        assert_eq!(definition.provider, "onelogin");
    }

    #[test]
    fn test_classify_type_tag_naming() {
        let source = StaticAppSource::new(Vec::new()).naming(NameFrom::TypeTag);
        let definition = classify(&remote_app(200, "Anything", 8), &source);

        assert_eq!(definition.resource_type, "onelogin_oidc_apps");
        assert_eq!(definition.name, "onelogin_oidc_apps-200");
    }

    #[test]
    fn test_classify_is_deterministic() {
        let source = StaticAppSource::new(Vec::new());
        let app = remote_app(42, "Sales Force - Prod", 1);

        let first = classify(&app, &source);
        let second = classify(&app, &source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_id_recoverable_after_first_dash() {
        let source = StaticAppSource::new(Vec::new());
        for (id, name) in [
            (1, "a-b-c"),
            (22, "Dash - Separated - Name"),
            (333, "---"),
            (4444, "9 to 5"),
            (55555, "Ünïcödé app"),
        ] {
            let definition = classify(&remote_app(id, name, 2), &source);
            let (_, recovered) = definition.name.split_once('-').unwrap();
            assert_eq!(recovered, id.to_string(), "name was {}", definition.name);
        }
    }

    #[test]
    fn test_resource_name_fallbacks() {
        assert_eq!(resource_name("!!!", AppType::GenericApp, 7), "onelogin_apps-7");
        assert_eq!(resource_name("9 to 5", AppType::GenericApp, 8), "app_9_to_5-8");
        assert_eq!(resource_name("HRPortal", AppType::SamlApp, 9), "hr_portal-9");
    }

    #[test]
    fn test_classify_all_preserves_order() {
        let source = StaticAppSource::new(Vec::new());
        let apps = vec![
            remote_app(3, "Three", 0),
            remote_app(1, "One", 8),
            remote_app(2, "Two", 2),
        ];

        let names: Vec<String> = classify_all(&apps, &source)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["three-3", "one-1", "two-2"]);
    }
}
