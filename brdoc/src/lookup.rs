// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CNPJ registry lookup client.
//!
//! Issues `GET {base_url}{cnpj}` through a [`RateLimiter`] and interprets
//! the reply:
//!
//! - 200: the JSON object body is the registry record
//! - 404: not found, a normal outcome
//! - 429: the body's `detalhes` text names a release time; the client waits
//!   until then and retries
//! - anything else: [`ApiError::UnexpectedStatus`]

use crate::cnpj::Cnpj;
use crate::config::LookupConfig;
use crate::error::{ApiError, LookupError};
use crate::input::DocumentInput;
use crate::limiter::RateLimiter;
use crate::release;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Registry data for a CNPJ, relayed as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryRecord(Map<String, Value>);

impl RegistryRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RegistryRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Diagnostic fields the API puts in error bodies.
#[derive(Debug, Default)]
struct ErrorBody {
    titulo: Option<String>,
    detalhes: Option<String>,
}

impl ErrorBody {
    /// Lenient parse: each field is read on its own, so a missing or
    /// non-string field never hides the other one.
    fn parse(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            titulo: field("titulo"),
            detalhes: field("detalhes"),
        }
    }
}

/// Raw reply from one request.
struct Reply {
    status: u16,
    body: Vec<u8>,
}

/// Rate-limited client for the CNPJ registry API.
pub struct RegistryClient {
    /// Configuration
    config: LookupConfig,
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Throttle shared by every request from this client
    limiter: RateLimiter,
}

impl RegistryClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LookupConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("brdoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;
        Self::with_http_client(config, http)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(config: LookupConfig, http: reqwest::Client) -> Result<Self, ApiError> {
        check_base_url(&config.base_url)?;
        let limiter = RateLimiter::per_minute(config.max_rate_rpm);
        Ok(Self {
            config,
            http,
            limiter,
        })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Look up a CNPJ in the registry.
    ///
    /// Invalid input is reported as not found without any network I/O.
    /// `timeout` bounds each HTTP request, not the throttling waits.
    pub async fn lookup<'a>(
        &self,
        cnpj: impl Into<DocumentInput<'a>>,
        timeout: Duration,
    ) -> Result<Option<RegistryRecord>, ApiError> {
        match Cnpj::parse(cnpj) {
            Ok(cnpj) => self.fetch(&cnpj, timeout).await,
            Err(err) => {
                debug!(error = %err, "Skipping lookup of invalid CNPJ");
                Ok(None)
            }
        }
    }

    /// Look up a CNPJ, reporting invalid input as [`LookupError::Invalid`].
    pub async fn lookup_checked<'a>(
        &self,
        cnpj: impl Into<DocumentInput<'a>>,
        timeout: Duration,
    ) -> Result<Option<RegistryRecord>, LookupError> {
        let cnpj = Cnpj::parse(cnpj)?;
        Ok(self.fetch(&cnpj, timeout).await?)
    }

    /// Look up an already validated CNPJ.
    ///
    /// A throttled request is retried through the same limiter, so the retry
    /// starts no sooner than the later of the declared release time and the
    /// configured minimum interval.
    pub async fn fetch(
        &self,
        cnpj: &Cnpj,
        timeout: Duration,
    ) -> Result<Option<RegistryRecord>, ApiError> {
        let mut throttled: u32 = 0;

        loop {
            let reply = self.limiter.run(|| self.request(cnpj, timeout)).await?;

            match reply.status {
                200 => {
                    let record: Map<String, Value> =
                        serde_json::from_slice(&reply.body).map_err(|source| {
                            ApiError::MalformedBody {
                                status: reply.status,
                                source,
                            }
                        })?;
                    debug!(%cnpj, "CNPJ found in registry");
                    return Ok(Some(record.into()));
                }
                404 => {
                    let body = ErrorBody::parse(&reply.body);
                    info!(
                        %cnpj,
                        titulo = ?body.titulo,
                        detalhes = ?body.detalhes,
                        "CNPJ not found in registry"
                    );
                    return Ok(None);
                }
                429 => {
                    throttled += 1;
                    if throttled > self.config.max_throttle_retries {
                        return Err(ApiError::ThrottleRetriesExhausted {
                            attempts: throttled,
                        });
                    }

                    let body = ErrorBody::parse(&reply.body);
                    let release_at = body
                        .detalhes
                        .as_deref()
                        .and_then(release::parse_release_time)
                        .ok_or_else(|| ApiError::ReleaseTimeMissing {
                            detalhes: body.detalhes.clone(),
                        })?;

                    let wait = release::wait_until(release_at, Utc::now());
                    if wait > self.config.max_release_wait() {
                        return Err(ApiError::ReleaseTooDistant { wait });
                    }

                    warn!(
                        %cnpj,
                        titulo = ?body.titulo,
                        %release_at,
                        ?wait,
                        attempt = throttled,
                        "Registry API throttled, waiting for release"
                    );
                    tokio::time::sleep(wait).await;
                }
                status => {
                    let body = ErrorBody::parse(&reply.body);
                    warn!(%cnpj, status, "Unexpected registry API status");
                    return Err(ApiError::UnexpectedStatus {
                        status,
                        titulo: body.titulo,
                        detalhes: body.detalhes,
                    });
                }
            }
        }
    }

    async fn request(&self, cnpj: &Cnpj, timeout: Duration) -> Result<Reply, ApiError> {
        let url = format!("{}{}", self.config.base_url, cnpj.as_str());
        debug!(%url, ?timeout, "Querying registry API");

        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(ApiError::transport)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ApiError::transport)?;

        Ok(Reply {
            status,
            body: body.to_vec(),
        })
    }
}

/// The base URL must be absolute http(s) with a host.
fn check_base_url(base_url: &str) -> Result<(), ApiError> {
    let usable = match Url::parse(base_url) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    };
    if usable {
        Ok(())
    } else {
        debug!(%base_url, "Invalid registry base URL");
        Err(ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;

    fn unreachable_client() -> RegistryClient {
        // Port 9 (discard) on localhost; never contacted in these tests.
        RegistryClient::new(LookupConfig {
            base_url: "http://127.0.0.1:9/cnpj/".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_error_body_parse() {
        let body = ErrorBody::parse(br#"{"titulo": "Not found", "detalhes": "CNPJ inexistente", "status": 404}"#);
        assert_eq!(body.titulo.as_deref(), Some("Not found"));
        assert_eq!(body.detalhes.as_deref(), Some("CNPJ inexistente"));

        let empty = ErrorBody::parse(b"<html>bad gateway</html>");
        assert!(empty.titulo.is_none());
        assert!(empty.detalhes.is_none());

        let partial = ErrorBody::parse(br#"{"detalhes": "only details"}"#);
        assert!(partial.titulo.is_none());
        assert_eq!(partial.detalhes.as_deref(), Some("only details"));

        let mistyped = ErrorBody::parse(br#"{"titulo": 429, "detalhes": "Tente mais tarde"}"#);
        assert!(mistyped.titulo.is_none());
        assert_eq!(mistyped.detalhes.as_deref(), Some("Tente mais tarde"));

        assert!(ErrorBody::parse(br#"["titulo"]"#).detalhes.is_none());
    }

    #[test]
    fn test_registry_record_accessors() {
        let value = json!({"razao_social": "Empresa Teste LTDA", "capital_social": 1000});
        let record: RegistryRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.get_str("razao_social"), Some("Empresa Teste LTDA"));
        assert_eq!(record.get_str("capital_social"), None);
        assert_eq!(record.get("capital_social"), Some(&json!(1000)));
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
        assert_eq!(record.into_inner().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_found() {
        let client = unreachable_client();
        let timeout = Duration::from_secs(1);

        assert!(client.lookup("11111111111111", timeout).await.unwrap().is_none());
        assert!(client.lookup("123", timeout).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checked_lookup_reports_invalid_input() {
        let client = unreachable_client();
        let err = client
            .lookup_checked("11222333000182", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LookupError::Invalid(ValidationError::Invalid { .. })
        ));
    }

    #[test]
    fn test_base_url_must_be_http() {
        for base_url in ["publica.cnpj.ws/cnpj/", "ftp://publica.cnpj.ws/cnpj/", "file:///tmp/"] {
            let result = RegistryClient::new(LookupConfig {
                base_url: base_url.to_string(),
                ..Default::default()
            });
            assert!(
                matches!(result, Err(ApiError::InvalidBaseUrl { .. })),
                "{base_url} accepted"
            );
        }
        assert!(check_base_url("https://publica.cnpj.ws/cnpj/").is_ok());
    }

    #[test]
    fn test_client_uses_configured_interval() {
        let client = RegistryClient::new(LookupConfig {
            max_rate_rpm: 30,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.limiter.min_interval(), Duration::from_secs(2));
        assert_eq!(client.config().max_rate_rpm, 30);
    }
}
