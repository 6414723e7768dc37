//! Test helpers for building fetched apps, canned app sources and state files

#![cfg(test)]

use anyhow::{Result, bail};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::convert::AppType;
use crate::convert::state::{StateInstance, StateParser};
use crate::remote::{AppQuery, AppSource, NameFrom, Page, RemoteResource};

/// A minimal app with no parameters or rules
pub fn remote_app(id: i64, name: &str, auth_method: i32) -> RemoteResource {
    RemoteResource {
        id,
        name: name.to_string(),
        auth_method,
        connector_id: None,
        visible: Some(true),
        provisioning: None,
        parameters: BTreeMap::new(),
        rules: Vec::new(),
    }
}

/// App source serving fixed pages, linked by cursors `page-1`, `page-2`, ...
pub struct StaticAppSource {
    pages: Vec<Vec<RemoteResource>>,
    failing_at: Option<usize>,
    repeating_cursor: bool,
    name_from: NameFrom,
    cursors: Mutex<Vec<Option<String>>>,
    queries: Mutex<Vec<AppQuery>>,
}

impl StaticAppSource {
    pub fn new(pages: Vec<Vec<RemoteResource>>) -> Self {
        Self {
            pages,
            failing_at: None,
            repeating_cursor: false,
            name_from: NameFrom::DisplayName,
            cursors: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail the request for the page at `index`
    pub fn failing_at(mut self, index: usize) -> Self {
        self.failing_at = Some(index);
        self
    }

    /// Always answer with cursor `page-1`
    pub fn repeating_cursor(mut self) -> Self {
        self.repeating_cursor = true;
        self
    }

    pub fn naming(mut self, name_from: NameFrom) -> Self {
        self.name_from = name_from;
        self
    }

    pub fn cursors_seen(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    pub fn queries_seen(&self) -> Vec<AppQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn page_index(cursor: Option<&str>) -> Result<usize> {
        match cursor {
            None => Ok(0),
            Some(cursor) => match cursor.strip_prefix("page-").map(str::parse) {
                Some(Ok(index)) => Ok(index),
                _ => bail!("unknown cursor '{}'", cursor),
            },
        }
    }
}

impl AppSource for StaticAppSource {
    fn provider(&self) -> &str {
        "onelogin"
    }

    fn fetch_page(&self, query: &AppQuery, cursor: Option<&str>) -> Result<Page> {
        self.cursors.lock().unwrap().push(cursor.map(String::from));
        self.queries.lock().unwrap().push(query.clone());

        let index = Self::page_index(cursor)?;

        if self.failing_at == Some(index) {
            bail!("HTTP request failed with status 500");
        }

        if let Some(id) = query.id {
            let found = self.pages.iter().flatten().find(|app| app.id == id);
            return match found {
                Some(app) => Ok(Page {
                    resources: vec![app.clone()],
                    next_cursor: None,
                }),
                None => bail!("HTTP request failed with status 404"),
            };
        }

        let resources: Vec<RemoteResource> = self
            .pages
            .get(index)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|app| query.auth_method.is_none_or(|m| app.auth_method == m))
            .collect();

        let next_cursor = if self.repeating_cursor {
            Some("page-1".to_string())
        } else if index + 1 < self.pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };

        Ok(Page {
            resources,
            next_cursor,
        })
    }

    fn name_seed(&self, resource: &RemoteResource, app_type: AppType) -> String {
        self.name_from.seed(resource, app_type)
    }
}

/// Builder for `terraform.tfstate` documents
pub struct StateBuilder {
    resources: Vec<Value>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Add a managed resource with a single instance
    pub fn resource(mut self, resource_type: &str, name: &str, attributes: Value) -> Self {
        self.resources.push(json!({
            "mode": "managed",
            "type": resource_type,
            "name": name,
            "provider": "provider[\"registry.terraform.io/onelogin/onelogin\"]",
            "instances": [
                {
                    "schema_version": 0,
                    "attributes": attributes
                }
            ]
        }));
        self
    }

    pub fn to_json(&self) -> String {
        let state = json!({
            "version": 4,
            "terraform_version": "1.5.7",
            "serial": 1,
            "lineage": "00000000-0000-0000-0000-000000000000",
            "outputs": {},
            "resources": self.resources
        });
        serde_json::to_string_pretty(&state).unwrap()
    }

    pub fn instances(&self) -> Vec<StateInstance> {
        StateParser::parse_str(&self.to_json()).unwrap()
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
