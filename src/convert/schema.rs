use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use super::classifier::AppType;
use crate::error::ConvertError;

/// Which declaration file a conversion pass produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Re-declaration of the imported resource on its own provider
    Source,
    /// New resource to create on the destination provider
    Destination,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Source => write!(f, "source"),
            Variant::Destination => write!(f, "destination"),
        }
    }
}

/// One allow-listed field, optionally renamed, optionally a nested block
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub rename: Option<String>,
    pub nested: Option<AllowList>,
}

impl Field {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rename: None,
            nested: None,
        }
    }

    pub fn renamed(key: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            rename: Some(to.into()),
            ..Self::new(key)
        }
    }

    pub fn block(key: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            nested: Some(AllowList::new(fields)),
            ..Self::new(key)
        }
    }

    /// Key written to the output record
    pub fn output_key(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.key)
    }
}

/// Ordered set of fields carried over for one resource type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowList {
    fields: Vec<Field>,
}

impl AllowList {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Flat allow-list of scalar fields
    pub fn of(keys: &[&str]) -> Self {
        Self::new(keys.iter().map(|k| Field::new(*k)).collect())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Resolves a resource type tag to its allow-list for a variant
#[derive(Debug, Clone, Default)]
pub struct SchemaSelector {
    tables: HashMap<Variant, HashMap<String, AllowList>>,
}

impl SchemaSelector {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Allow-lists for every type the classifier can produce
    pub fn builtin() -> Self {
        let mut selector = Self::empty();

        for variant in [Variant::Source, Variant::Destination] {
            for app_type in AppType::ALL {
                selector.insert(variant, app_type.tag(), builtin_allow_list(app_type, variant));
            }
        }

        selector
    }

    pub fn insert(&mut self, variant: Variant, type_tag: impl Into<String>, allow_list: AllowList) {
        self.tables
            .entry(variant)
            .or_default()
            .insert(type_tag.into(), allow_list);
    }

    pub fn resolve(&self, type_tag: &str, variant: Variant) -> Result<&AllowList, ConvertError> {
        self.tables
            .get(&variant)
            .and_then(|table| table.get(type_tag))
            .ok_or_else(|| ConvertError::SchemaMismatch {
                resource_type: type_tag.to_string(),
                variant,
            })
    }

    /// Replace allow-lists with the ones given in configuration
    pub fn apply_overrides(&mut self, overrides: &SchemaOverrides) {
        for (variant, table) in [
            (Variant::Source, &overrides.source),
            (Variant::Destination, &overrides.destination),
        ] {
            for (type_tag, fields) in table {
                let allow_list = AllowList::new(fields.iter().map(Field::from).collect());
                self.insert(variant, type_tag.clone(), allow_list);
            }
        }
    }
}

/// Allow-list overrides as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaOverrides {
    #[serde(default)]
    pub source: HashMap<String, Vec<FieldConfig>>,
    #[serde(default)]
    pub destination: HashMap<String, Vec<FieldConfig>>,
}

/// A field entry: either a bare name or `{ key, rename, fields }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldConfig {
    Key(String),
    Detailed {
        key: String,
        #[serde(default)]
        rename: Option<String>,
        #[serde(default)]
        fields: Option<Vec<FieldConfig>>,
    },
}

impl From<&FieldConfig> for Field {
    fn from(config: &FieldConfig) -> Self {
        match config {
            FieldConfig::Key(key) => Field::new(key.clone()),
            FieldConfig::Detailed {
                key,
                rename,
                fields,
            } => Field {
                key: key.clone(),
                rename: rename.clone(),
                nested: fields
                    .as_ref()
                    .map(|nested| AllowList::new(nested.iter().map(Field::from).collect())),
            },
        }
    }
}

fn builtin_allow_list(app_type: AppType, variant: Variant) -> AllowList {
    let mut fields: Vec<Field> = [
        "name",
        "description",
        "notes",
        "visible",
        "connector_id",
        "allow_assumed_signin",
    ]
    .into_iter()
    .map(Field::new)
    .collect();

    fields.push(Field::block("provisioning", vec![Field::new("enabled")]));
    fields.push(Field::block("parameters", parameter_fields(variant)));

    match app_type {
        AppType::OidcApp => fields.push(Field::block(
            "configuration",
            [
                "redirect_uri",
                "refresh_token_expiration_minutes",
                "login_url",
                "oidc_application_type",
                "token_endpoint_auth_method",
                "access_token_expiration_minutes",
            ]
            .into_iter()
            .map(Field::new)
            .collect(),
        )),
        AppType::SamlApp => fields.push(Field::block(
            "configuration",
            vec![Field::new("provider_arn"), Field::new("signature_algorithm")],
        )),
        AppType::GenericApp => {}
    }

    fields.push(Field::block(
        "rules",
        vec![
            Field::new("name"),
            Field::new("match"),
            Field::new("enabled"),
            Field::block(
                "conditions",
                vec![Field::new("source"), Field::new("operator"), Field::new("value")],
            ),
            Field::block(
                "actions",
                vec![Field::new("action"), Field::new("value"), Field::new("expression")],
            ),
        ],
    ));

    AllowList::new(fields)
}

fn parameter_fields(variant: Variant) -> Vec<Field> {
    let mut keys = Vec::new();

    // Parameter ids are assigned by the tenant that owns the app
    if variant == Variant::Source {
        keys.push("id");
    }

    keys.extend([
        "label",
        "user_attribute_mappings",
        "user_attribute_macros",
        "attributes_transformations",
        "skip_if_blank",
        "values",
        "default_values",
        "param_key_name",
        "provisioned_entitlements",
        "safe_entitlements_enabled",
        "include_in_saml_assertion",
    ]);

    keys.into_iter().map(Field::new).collect()
}
