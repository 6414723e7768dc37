use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Value, json};
use std::cell::OnceCell;
use std::collections::HashMap;
use url::Url;

use super::enumerator::{AppQuery, AppSource, NameFrom, Page};
use super::model::RemoteResource;
use crate::convert::AppType;
use crate::error::ConvertError;

pub const DEFAULT_API_URL: &str = "https://api.us.onelogin.com";
const PROVIDER: &str = "onelogin";
const CURSOR_HEADER: &str = "after-cursor";

/// Response as seen by the integration: status, lowercased headers, body
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client trait for testing
pub trait HttpClient {
    fn get(&self, url: &Url, bearer_token: &str) -> Result<HttpResponse>;

    fn post_json(&self, url: &Url, headers: &[(&str, String)], body: &Value) -> Result<HttpResponse>;
}

/// Real HTTP client using reqwest
///
/// Requests block until the transport gives up; no extra timeout is set.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    fn collect(response: reqwest::blocking::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().context("Failed to read response body")?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url, bearer_token: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(bearer_token)
            .send()
            .with_context(|| format!("Failed to fetch URL: {}", url))?;

        Self::collect(response)
    }

    fn post_json(&self, url: &Url, headers: &[(&str, String)], body: &Value) -> Result<HttpResponse> {
        let mut request = self.client.post(url.clone()).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to post to URL: {}", url))?;

        Self::collect(response)
    }
}

/// API client credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneLoginCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OneLogin apps via the v2 REST API
pub struct OneLoginApps<H: HttpClient> {
    api_url: Url,
    credentials: OneLoginCredentials,
    http: H,
    name_from: NameFrom,
    token: OnceCell<String>,
}

impl OneLoginApps<ReqwestClient> {
    pub fn new(api_url: &str, credentials: OneLoginCredentials, name_from: NameFrom) -> Result<Self> {
        Self::with_client(api_url, credentials, name_from, ReqwestClient::new())
    }
}

impl<H: HttpClient> OneLoginApps<H> {
    /// Create a source with a custom HTTP client (for testing)
    pub fn with_client(
        api_url: &str,
        credentials: OneLoginCredentials,
        name_from: NameFrom,
        http: H,
    ) -> Result<Self> {
        // Trailing slash so joins append instead of replacing the last segment
        let normalized = format!("{}/", api_url.trim_end_matches('/'));
        let api_url = Url::parse(&normalized)
            .map_err(|e| ConvertError::Config(format!("invalid API URL '{}': {}", api_url, e)))?;

        Ok(Self {
            api_url,
            credentials,
            http,
            name_from,
            token: OnceCell::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .with_context(|| format!("Invalid API path: {}", path))
    }

    fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.get() {
            return Ok(token.clone());
        }

        let url = self.endpoint("auth/oauth2/v2/token")?;
        let authorization = format!(
            "client_id:{}, client_secret:{}",
            self.credentials.client_id, self.credentials.client_secret
        );
        let response = self.http.post_json(
            &url,
            &[("Authorization", authorization)],
            &json!({"grant_type": "client_credentials"}),
        )?;

        if !response.is_success() {
            bail!(
                "Token request failed with status {}: {}",
                response.status,
                response.body
            );
        }

        let token: TokenResponse =
            serde_json::from_str(&response.body).context("Failed to parse token response")?;
        let _ = self.token.set(token.access_token.clone());
        Ok(token.access_token)
    }

    fn get(&self, url: &Url) -> Result<HttpResponse> {
        let token = self.access_token()?;
        let response = self.http.get(url, &token)?;

        if !response.is_success() {
            bail!(
                "HTTP request failed with status {}: {}",
                response.status,
                url
            );
        }

        Ok(response)
    }
}

impl<H: HttpClient> AppSource for OneLoginApps<H> {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn fetch_page(&self, query: &AppQuery, cursor: Option<&str>) -> Result<Page> {
        if let Some(id) = query.id {
            let url = self.endpoint(&format!("api/2/apps/{}", id))?;
            let response = self.get(&url)?;
            let app: RemoteResource = serde_json::from_str(&response.body)
                .with_context(|| format!("Failed to parse app {}", id))?;

            return Ok(Page {
                resources: vec![app],
                next_cursor: None,
            });
        }

        let mut url = self.endpoint("api/2/apps")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(auth_method) = query.auth_method {
                pairs.append_pair("auth_method", &auth_method.to_string());
            }
            if let Some(cursor) = cursor {
                pairs.append_pair("cursor", cursor);
            }
        }
        // An empty query_pairs_mut still leaves a bare '?'
        if url.query() == Some("") {
            url.set_query(None);
        }

        let response = self.get(&url)?;
        let resources: Vec<RemoteResource> =
            serde_json::from_str(&response.body).context("Failed to parse app listing")?;

        Ok(Page {
            resources,
            next_cursor: response.headers.get(CURSOR_HEADER).cloned(),
        })
    }

    fn name_seed(&self, resource: &RemoteResource, app_type: AppType) -> String {
        self.name_from.seed(resource, app_type)
    }
}
