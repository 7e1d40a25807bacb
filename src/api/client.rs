use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

use crate::api::auth::Session;
use crate::api::error::ApiError;
use crate::config::settings::ServiceSettings;

/// Client for the remote data service: authentication, row queries and
/// named procedures all go through here.
pub struct ServiceClient {
    http: Client,
    base_url: String,
    anon_key: String,
    session: Option<Session>,
}

impl ServiceClient {
    pub fn new(settings: &ServiceSettings) -> Result<Self> {
        let http = Self::build_http(settings)?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key.clone(),
            session: None,
        })
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// Bearer used on requests: the signed-in session token, or the
    /// anonymous key before login.
    pub fn bearer_token(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .unwrap_or(&self.anon_key)
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub(crate) fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    pub(crate) fn functions_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, function)
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url)
    }

    pub(crate) fn patch(&self, url: &str) -> RequestBuilder {
        self.http.patch(url)
    }

    pub(crate) fn put(&self, url: &str) -> RequestBuilder {
        self.http.put(url)
    }

    /// Send with the service headers applied and the status checked.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.headers(self.service_headers()).send().await?;
        Self::check_status(response).await
    }

    fn service_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.bearer_token())) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body)
                .unwrap_or_else(|| format!("serviço retornou status {}", status)),
        })
    }

    fn build_http(settings: &ServiceSettings) -> Result<Client> {
        Client::builder()
            .user_agent(settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Best-effort extraction of the human-readable message from an error
/// body. The auth and query endpoints use different field names.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for field in ["message", "error_description", "msg", "error"] {
        if let Some(text) = value.get(field).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_builders_compose_service_paths() {
        let settings = ServiceSettings {
            base_url: "https://club.example.co/".to_string(),
            anon_key: "anon".to_string(),
            user_agent: "test",
            timeout_secs: 5,
        };
        let client = ServiceClient::new(&settings).unwrap();
        assert_eq!(
            client.rest_url("players"),
            "https://club.example.co/rest/v1/players"
        );
        assert_eq!(
            client.rpc_url("checkin_tournament"),
            "https://club.example.co/rest/v1/rpc/checkin_tournament"
        );
        assert_eq!(
            client.auth_url("token?grant_type=password"),
            "https://club.example.co/auth/v1/token?grant_type=password"
        );
        assert_eq!(
            client.functions_url("notify-pairings"),
            "https://club.example.co/functions/v1/notify-pairings"
        );
    }

    #[test]
    fn error_message_extracted_from_known_fields() {
        assert_eq!(
            extract_error_message(r#"{"message":"row not found"}"#),
            Some("row not found".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(extract_error_message("not json"), None);
    }

    #[test]
    fn bearer_prefers_session_token() {
        let settings = ServiceSettings {
            base_url: "https://club.example.co".to_string(),
            anon_key: "anon".to_string(),
            user_agent: "test",
            timeout_secs: 5,
        };
        let mut client = ServiceClient::new(&settings).unwrap();
        assert_eq!(client.bearer_token(), "anon");

        client.set_session(Some(Session {
            access_token: "jwt".to_string(),
            refresh_token: None,
        }));
        assert_eq!(client.bearer_token(), "jwt");
    }
}
