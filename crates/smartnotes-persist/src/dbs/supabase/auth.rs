use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::{check, error_message, SupabaseClient};
use crate::error::{PersistError, Result};
use crate::models::{AuthState, Session, User};
use crate::trait_client::AuthProvider;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Credential problems are auth errors, everything else is a remote failure
async fn check_auth(response: reqwest::Response) -> Result<reqwest::Response> {
    match response.status() {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::UNPROCESSABLE_ENTITY => {
            let body = response.text().await.unwrap_or_default();
            Err(PersistError::Auth(error_message(&body)))
        }
        _ => check(response).await,
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .auth_request(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password })
            .send()
            .await?;

        let token: TokenResponse = check_auth(response).await?.json().await?;
        let session = token.into_session(Utc::now());
        self.session.set(session.clone());

        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .auth_request(Method::POST, "signup")
            .json(&Credentials { email, password })
            .send()
            .await?;
        check_auth(response).await?;

        tracing::info!(email = %email, "sign-up requested, confirmation pending");
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(token) = self.session.access_token() else {
            return Ok(());
        };

        // The local session is dropped even when revocation fails
        let result = self
            .auth_request(Method::POST, "logout")
            .bearer_auth(token)
            .send()
            .await;
        self.session.clear();

        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "token revocation rejected");
            }
            Err(e) => tracing::warn!(error = %e, "token revocation failed"),
            Ok(_) => {}
        }

        tracing::info!("signed out");
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>> {
        let Some(session) = self.session.get() else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            tracing::debug!("session expired locally");
            self.session.clear();
            return Ok(None);
        }

        let response = self
            .auth_request(Method::GET, "user")
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::info!("session rejected by auth provider");
            self.session.clear();
            return Ok(None);
        }

        let user: User = check(response).await?.json().await?;
        Ok(Some(user))
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session.subscribe()
    }
}
