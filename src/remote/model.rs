use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// An application as returned by the provider API
///
/// Only `id`, `name` and `auth_method` drive classification. The rest feeds
/// the listing shown before confirmation; full attributes come from state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteResource {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub auth_method: i32,
    #[serde(default)]
    pub connector_id: Option<i64>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub provisioning: Option<Provisioning>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Provisioning {
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl RemoteResource {
    /// One-line description for listings
    pub fn summary(&self) -> String {
        let mut details = vec![format!("auth method {}", self.auth_method)];

        if let Some(connector_id) = self.connector_id {
            details.push(format!("connector {}", connector_id));
        }
        if self.visible == Some(false) {
            details.push("hidden".to_string());
        }
        if self.provisioning.as_ref().and_then(|p| p.enabled) == Some(true) {
            details.push("provisioning enabled".to_string());
        }
        if !self.parameters.is_empty() {
            details.push(format!("{} parameter(s)", self.parameters.len()));
        }
        if !self.rules.is_empty() {
            details.push(format!("{} rule(s)", self.rules.len()));
        }

        format!("{} ({})", self.name, details.join(", "))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
