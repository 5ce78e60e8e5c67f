//! Gateway configuration loaded from environment variables.

use std::time::Duration;

use anyhow::{Context, bail};

use crate::projects::MAX_PAGE_SIZE;

/// Gateway configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8082").
    pub bind_addr: String,

    /// Content graph GraphQL endpoint.
    pub graphql_uri: String,

    /// Base URI of the OAuth token endpoint (`{auth_uri}/oauth/token`).
    pub auth_uri: String,

    /// OAuth client id for server-side queries.
    pub client_id: Option<String>,

    /// OAuth client secret. Never logged.
    pub client_secret: Option<String>,

    /// Timeout for a single content graph request.
    pub query_timeout: Duration,

    /// Number of projects per listing page.
    pub projects_page_size: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("graphql_uri", &self.graphql_uri)
            .field("auth_uri", &self.auth_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("query_timeout", &self.query_timeout)
            .field("projects_page_size", &self.projects_page_size)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `GATEWAY_BIND_ADDR`: Server bind address (default: "0.0.0.0:8082")
    /// - `DRUPAL_GRAPHQL_URI`: GraphQL endpoint (default: "http://localhost:8080/graphql")
    /// - `DRUPAL_AUTH_URI`: OAuth base URI (default: origin of the GraphQL endpoint)
    /// - `DRUPAL_CLIENT_ID` / `DRUPAL_CLIENT_SECRET`: OAuth client credentials;
    ///   set both or neither
    /// - `GATEWAY_QUERY_TIMEOUT_SECS`: Per-query timeout (default: 10)
    /// - `GATEWAY_PROJECTS_PAGE_SIZE`: Projects per page (default: 8, max 50)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("GATEWAY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8082".to_string());

        let graphql_uri = std::env::var("DRUPAL_GRAPHQL_URI")
            .unwrap_or_else(|_| "http://localhost:8080/graphql".to_string())
            .trim_end_matches('/')
            .to_string();

        let graphql_url = reqwest::Url::parse(&graphql_uri)
            .with_context(|| format!("DRUPAL_GRAPHQL_URI '{graphql_uri}' is not a valid URL"))?;

        let auth_uri = match non_empty_var("DRUPAL_AUTH_URI") {
            Some(uri) => uri.trim_end_matches('/').to_string(),
            None => graphql_url.origin().ascii_serialization(),
        };

        let client_id = non_empty_var("DRUPAL_CLIENT_ID");
        let client_secret = non_empty_var("DRUPAL_CLIENT_SECRET");
        if client_id.is_some() != client_secret.is_some() {
            bail!("DRUPAL_CLIENT_ID and DRUPAL_CLIENT_SECRET must be set together");
        }

        let query_timeout_secs: u64 = match non_empty_var("GATEWAY_QUERY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("GATEWAY_QUERY_TIMEOUT_SECS '{raw}' is not a number"))?,
            None => 10,
        };
        if query_timeout_secs == 0 {
            bail!("GATEWAY_QUERY_TIMEOUT_SECS must be greater than zero");
        }

        let projects_page_size: u32 = match non_empty_var("GATEWAY_PROJECTS_PAGE_SIZE") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("GATEWAY_PROJECTS_PAGE_SIZE '{raw}' is not a number"))?,
            None => 8,
        };
        if !(1..=MAX_PAGE_SIZE).contains(&projects_page_size) {
            bail!("GATEWAY_PROJECTS_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}");
        }

        tracing::info!(
            bind_addr = %bind_addr,
            graphql_uri = %graphql_uri,
            auth_uri = %auth_uri,
            authenticated = client_id.is_some(),
            query_timeout_secs,
            projects_page_size,
            "gateway configuration loaded"
        );

        Ok(Self {
            bind_addr,
            graphql_uri,
            auth_uri,
            client_id,
            client_secret,
            query_timeout: Duration::from_secs(query_timeout_secs),
            projects_page_size,
        })
    }

    /// Client id and secret, when the gateway queries with credentials.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "GATEWAY_BIND_ADDR",
        "DRUPAL_GRAPHQL_URI",
        "DRUPAL_AUTH_URI",
        "DRUPAL_CLIENT_ID",
        "DRUPAL_CLIENT_SECRET",
        "GATEWAY_QUERY_TIMEOUT_SECS",
        "GATEWAY_PROJECTS_PAGE_SIZE",
    ];

    /// Helper to run config tests with isolated env vars.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:8082");
            assert_eq!(config.graphql_uri, "http://localhost:8080/graphql");
            assert_eq!(config.auth_uri, "http://localhost:8080");
            assert!(config.credentials().is_none());
            assert_eq!(config.query_timeout, Duration::from_secs(10));
            assert_eq!(config.projects_page_size, 8);
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("GATEWAY_BIND_ADDR", "127.0.0.1:9090"),
                ("DRUPAL_GRAPHQL_URI", "https://cms.example/graphql/"),
                ("DRUPAL_AUTH_URI", "https://auth.example/"),
                ("DRUPAL_CLIENT_ID", "gateway"),
                ("DRUPAL_CLIENT_SECRET", "s3cret"),
                ("GATEWAY_QUERY_TIMEOUT_SECS", "3"),
                ("GATEWAY_PROJECTS_PAGE_SIZE", "12"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9090");
                assert_eq!(config.graphql_uri, "https://cms.example/graphql");
                assert_eq!(config.auth_uri, "https://auth.example");
                assert_eq!(config.credentials(), Some(("gateway", "s3cret")));
                assert_eq!(config.query_timeout, Duration::from_secs(3));
                assert_eq!(config.projects_page_size, 12);
            },
        );
    }

    #[test]
    fn config_auth_uri_defaults_to_graphql_origin() {
        with_env_vars(
            &[("DRUPAL_GRAPHQL_URI", "https://cms.example:8443/api/graphql")],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.auth_uri, "https://cms.example:8443");
            },
        );
    }

    #[test]
    fn config_rejects_invalid_graphql_uri() {
        with_env_vars(&[("DRUPAL_GRAPHQL_URI", "not a url")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_rejects_half_credentials() {
        with_env_vars(&[("DRUPAL_CLIENT_ID", "gateway")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_rejects_zero_timeout() {
        with_env_vars(&[("GATEWAY_QUERY_TIMEOUT_SECS", "0")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_rejects_oversized_page() {
        with_env_vars(&[("GATEWAY_PROJECTS_PAGE_SIZE", "500")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_blank_values_fall_back_to_defaults() {
        with_env_vars(
            &[("DRUPAL_CLIENT_ID", "  "), ("GATEWAY_PROJECTS_PAGE_SIZE", "")],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.client_id.is_none());
                assert_eq!(config.projects_page_size, 8);
            },
        );
    }

    #[test]
    fn config_debug_redacts_secret() {
        with_env_vars(
            &[
                ("DRUPAL_CLIENT_ID", "gateway"),
                ("DRUPAL_CLIENT_SECRET", "s3cret"),
            ],
            || {
                let config = Config::from_env().unwrap();
                let debug = format!("{config:?}");
                assert!(!debug.contains("s3cret"));
                assert!(debug.contains("<redacted>"));
            },
        );
    }
}
