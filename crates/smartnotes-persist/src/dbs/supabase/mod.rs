// Supabase implementation: GoTrue for auth, PostgREST for the notes table

mod auth;
mod notes;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, Url};

use crate::builder::SupabaseClientBuilder;
use crate::error::{PersistError, Result};
use crate::session::SessionCell;

pub struct SupabaseClient {
    http: reqwest::Client,
    url: String,
    anon_key: String,
    notes_table: String,
    session: Arc<SessionCell>,
}

impl SupabaseClient {
    pub fn builder() -> SupabaseClientBuilder {
        SupabaseClientBuilder::new()
    }

    pub(crate) fn from_parts(
        http: reqwest::Client,
        url: String,
        anon_key: String,
        notes_table: String,
    ) -> Self {
        Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            notes_table,
            session: Arc::new(SessionCell::new()),
        }
    }

    pub fn session(&self) -> &SessionCell {
        &self.session
    }

    /// Authorization URL for a third-party sign-in (e.g. `google`).
    /// The browser leg of the OAuth flow happens outside this crate.
    pub fn oauth_authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> Result<String> {
        let mut params = vec![("provider", provider)];
        if let Some(redirect) = redirect_to {
            params.push(("redirect_to", redirect));
        }
        let url = Url::parse_with_params(&self.auth_url("authorize"), &params)
            .map_err(|e| PersistError::Internal(format!("Invalid Supabase URL: {}", e)))?;
        Ok(url.into())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.notes_table)
    }

    /// Signed-in requests use the user's JWT, anonymous ones the anon key
    fn bearer(&self) -> String {
        self.session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn auth_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.auth_url(path))
            .header("apikey", &self.anon_key)
    }

    fn rest_request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, self.rest_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }
}

/// Pass successful responses through, turn the rest into `Remote` errors
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(%status, body = %body, "Supabase request failed");
    Err(PersistError::Remote {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Best human-readable message from a GoTrue or PostgREST error body
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "empty response".to_string()
            } else {
                body.to_string()
            }
        })
}
