//! OAuth2 client-credentials provider for the content graph.
//!
//! The GraphQL endpoint only answers authenticated server-side requests. The
//! gateway exchanges its client id/secret for a bearer token at
//! `{auth_uri}/oauth/token` and reuses it until shortly before it expires.
//! The token identifies the gateway itself; per-request preview tokens are a
//! separate concern and travel as query variables.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Refresh the token this long before the server says it expires.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Upper bound on a server-declared token lifetime (one day).
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Errors from the token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token endpoint could not be reached.
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned HTTP {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// The token response could not be decoded.
    #[error("malformed token response: {0}")]
    Decode(String),
}

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A token ready to be sent as an `Authorization` header value.
#[derive(Debug, Clone)]
struct AccessToken {
    header: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_none_or(|expires_at| now + Duration::seconds(EXPIRY_MARGIN_SECS) < expires_at)
    }
}

/// Client-credentials grant against a Drupal `simple_oauth` style endpoint.
#[derive(Debug)]
pub struct ClientCredentials {
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: RwLock<Option<AccessToken>>,
}

impl ClientCredentials {
    /// Create a provider for the given auth base URI.
    pub fn new(auth_uri: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            token_url: format!("{}/oauth/token", auth_uri.trim_end_matches('/')),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: RwLock::new(None),
        }
    }

    /// The token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Return an `Authorization` header value, fetching a new token if needed.
    pub async fn authorization(&self, http: &reqwest::Client) -> Result<String, AuthError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                return Ok(token.header.clone());
            }
        }

        let mut slot = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.header.clone());
        }

        let token = self.fetch(http).await?;
        let header = token.header.clone();
        *slot = Some(token);
        Ok(header)
    }

    /// Drop the cached token so the next call fetches a fresh one.
    ///
    /// Called when the content graph rejects the token before it expires.
    pub async fn invalidate(&self) {
        let mut slot = self.cached.write().await;
        if slot.take().is_some() {
            tracing::info!("discarded rejected content graph access token");
        }
    }

    async fn fetch(&self, http: &reqwest::Client) -> Result<AccessToken, AuthError> {
        let response = http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "token endpoint rejected credentials");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: crate::graph::truncate_body(body),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: TokenResponse =
            serde_json::from_slice(&bytes).map_err(|e| AuthError::Decode(e.to_string()))?;

        if parsed.access_token.is_empty() {
            return Err(AuthError::Decode("empty access_token".to_string()));
        }

        let token_type = parsed
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Bearer".to_string());
        let expires_at = parsed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs.clamp(0, MAX_TOKEN_LIFETIME_SECS)));

        tracing::debug!(
            expires_in = ?parsed.expires_in,
            "obtained content graph access token"
        );

        Ok(AccessToken {
            header: format!("{token_type} {}", parsed.access_token),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body(expires_in: i64) -> serde_json::Value {
        serde_json::json!({
            "access_token": "abc123",
            "token_type": "Bearer",
            "expires_in": expires_in,
        })
    }

    #[test]
    fn token_url_strips_trailing_slash() {
        let creds = ClientCredentials::new("https://cms.example/", "id", "secret");
        assert_eq!(creds.token_url(), "https://cms.example/oauth/token");
    }

    #[test]
    fn token_without_expiry_is_always_fresh() {
        let token = AccessToken {
            header: "Bearer x".to_string(),
            expires_at: None,
        };
        assert!(token.is_fresh(Utc::now()));
    }

    #[test]
    fn token_inside_margin_is_stale() {
        let now = Utc::now();
        let token = AccessToken {
            header: "Bearer x".to_string(),
            expires_at: Some(now + Duration::seconds(10)),
        };
        assert!(!token.is_fresh(now));
    }

    #[tokio::test]
    async fn token_is_fetched_once_and_reused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=gateway"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(300)))
            .expect(1)
            .mount(&server)
            .await;

        let creds = ClientCredentials::new(&server.uri(), "gateway", "s3cret");
        let http = reqwest::Client::new();

        let first = creds.authorization(&http).await.unwrap();
        let second = creds.authorization(&http).await.unwrap();
        assert_eq!(first, "Bearer abc123");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(0)))
            .expect(2)
            .mount(&server)
            .await;

        let creds = ClientCredentials::new(&server.uri(), "gateway", "s3cret");
        let http = reqwest::Client::new();

        creds.authorization(&http).await.unwrap();
        creds.authorization(&http).await.unwrap();
    }

    #[tokio::test]
    async fn invalidated_token_is_fetched_again() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "abc123" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let creds = ClientCredentials::new(&server.uri(), "gateway", "s3cret");
        let http = reqwest::Client::new();

        creds.authorization(&http).await.unwrap();
        creds.authorization(&http).await.unwrap();
        creds.invalidate().await;
        creds.authorization(&http).await.unwrap();
    }

    #[tokio::test]
    async fn missing_token_type_defaults_to_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "xyz" })),
            )
            .mount(&server)
            .await;

        let creds = ClientCredentials::new(&server.uri(), "gateway", "s3cret");
        let header = creds.authorization(&reqwest::Client::new()).await.unwrap();
        assert_eq!(header, "Bearer xyz");
    }

    #[tokio::test]
    async fn rejected_credentials_surface_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let creds = ClientCredentials::new(&server.uri(), "gateway", "wrong");
        let err = creds
            .authorization(&reqwest::Client::new())
            .await
            .unwrap_err();
        match err {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_token_response_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let creds = ClientCredentials::new(&server.uri(), "gateway", "s3cret");
        let err = creds
            .authorization(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Decode(_)));
    }
}
