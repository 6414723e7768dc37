use super::classifier::AppType;
use crate::error::ConvertError;
use crate::remote::AppQuery;

/// Destination identifiers and the provider tag they declare resources under
const DESTINATIONS: &[(&str, &str)] = &[("onelogin_apps", "onelogin")];

/// A resolved `<source> => <destination>` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: String,
    /// Type filter applied when listing the source
    pub app_type: AppType,
    pub destination: String,
    pub destination_provider: String,
}

impl Conversion {
    /// Look up a conversion by its CLI identifiers (case-insensitive)
    pub fn resolve(source: &str, destination: &str) -> Result<Self, ConvertError> {
        let source_id = source.to_lowercase();
        let destination_id = destination.to_lowercase();

        let app_type = AppType::from_tag(&source_id);
        let destination_provider = DESTINATIONS
            .iter()
            .find(|(id, _)| *id == destination_id)
            .map(|(_, provider)| *provider);

        match (app_type, destination_provider) {
            (Some(app_type), Some(provider)) => Ok(Self {
                source: source_id,
                app_type,
                destination: destination_id,
                destination_provider: provider.to_string(),
            }),
            _ => Err(ConvertError::UnknownConversion {
                source: source.to_string(),
                destination: destination.to_string(),
                available: Self::available(),
            }),
        }
    }

    /// Every supported `<source> => <destination>` pair
    pub fn available() -> Vec<String> {
        AppType::ALL
            .iter()
            .flat_map(|app_type| {
                DESTINATIONS
                    .iter()
                    .map(move |(destination, _)| format!("{} => {}", app_type.tag(), destination))
            })
            .collect()
    }

    /// Listing query for this conversion, optionally narrowed to one app
    pub fn query(&self, id: Option<i64>) -> AppQuery {
        AppQuery {
            auth_method: self.app_type.auth_method_filter(),
            id,
        }
    }
}
