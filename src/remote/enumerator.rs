use anyhow::Result;
use serde::Deserialize;

use super::model::RemoteResource;
use crate::convert::AppType;
use crate::error::ConvertError;

/// Listing filter sent to the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppQuery {
    /// Native discriminant filter, `None` for every type
    pub auth_method: Option<i32>,
    /// Fetch exactly this app instead of listing
    pub id: Option<i64>,
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub resources: Vec<RemoteResource>,
    /// Cursor for the next page; `None` or empty on the last page
    pub next_cursor: Option<String>,
}

/// Which part of an app seeds its declaration name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFrom {
    #[default]
    DisplayName,
    TypeTag,
}

impl NameFrom {
    pub fn seed(&self, resource: &RemoteResource, app_type: AppType) -> String {
        match self {
            NameFrom::DisplayName => resource.name.clone(),
            NameFrom::TypeTag => app_type.tag().to_string(),
        }
    }
}

/// What a remote integration has to provide for classification to work on it
pub trait AppSource {
    /// Provider tag resources from this source are declared under
    fn provider(&self) -> &str;

    /// Fetch one page of apps; `cursor` is `None` for the first page
    fn fetch_page(&self, query: &AppQuery, cursor: Option<&str>) -> Result<Page>;

    /// Raw text the declaration name is derived from
    fn name_seed(&self, resource: &RemoteResource, app_type: AppType) -> String;
}

/// Follow cursors until the last page and return every app in API order
///
/// Any failed request aborts the listing. Apps accumulated from earlier pages
/// are discarded; their count is reported in `ConvertError::RemoteFetch`.
pub fn fetch_all(source: &dyn AppSource, query: &AppQuery) -> Result<Vec<RemoteResource>> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source
            .fetch_page(query, cursor.as_deref())
            .map_err(|e| ConvertError::RemoteFetch {
                fetched: all.len(),
                message: format!("{:#}", e),
            })?;

        all.extend(page.resources);

        match page.next_cursor.filter(|next| !next.is_empty()) {
            Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                return Err(ConvertError::RemoteFetch {
                    fetched: all.len(),
                    message: format!("API returned the same cursor '{}' twice", next),
                }
                .into());
            }
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(all)
}
