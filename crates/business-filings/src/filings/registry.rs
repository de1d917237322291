//! Typed client for the registry Business and Filing Submission APIs.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `businesses/{identifier}` | Fetch a business |
//! | POST   | `businesses/{identifier}/filings` | File against an existing business |
//! | POST   | `businesses?draft=false` | File a business-creating application |

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::domain::{BusinessEntity, FilingId};
use super::rules::is_registry_identifier;
use super::wizard::SubmissionRequest;
use crate::config::RegistryConfig;

/// One field-level complaint from the registry, e.g. `{"error": "...", "path": "/filing/..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFieldError {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryApiError {
    #[error("registry API is not configured")]
    NotConfigured,
    #[error("'{0}' is not a registry identifier")]
    InvalidIdentifier(String),
    #[error("invalid registry URL for {endpoint}: {source}")]
    InvalidUrl {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
        field_errors: Vec<ApiFieldError>,
    },
    #[error("failed to decode response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} response is missing {field}")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
}

/// Failure to get a filing accepted. Section data is never touched, so the
/// caller can fix and retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("registry rejected the filing ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        field_errors: Vec<ApiFieldError>,
    },
    #[error("registry unavailable: {0}")]
    Transport(String),
}

impl SubmissionError {
    pub fn field_errors(&self) -> &[ApiFieldError] {
        match self {
            Self::Rejected { field_errors, .. } => field_errors,
            Self::Transport(_) => &[],
        }
    }
}

impl From<RegistryApiError> for SubmissionError {
    fn from(value: RegistryApiError) -> Self {
        match value {
            RegistryApiError::Api {
                status,
                body,
                field_errors,
                ..
            } => {
                let message = field_errors
                    .first()
                    .map(|field_error| field_error.error.clone())
                    .unwrap_or(body);
                Self::Rejected {
                    status,
                    message,
                    field_errors,
                }
            }
            other => Self::Transport(other.to_string()),
        }
    }
}

#[async_trait]
pub trait BusinessLookup: Send + Sync {
    async fn fetch_business(
        &self,
        identifier: &str,
    ) -> Result<Option<BusinessEntity>, RegistryApiError>;
}

#[async_trait]
pub trait FilingSubmitter: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> Result<FilingId, SubmissionError>;
}

#[derive(Debug, Deserialize)]
struct BusinessEnvelope {
    business: BusinessEntity,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ApiFieldError>,
}

/// Registry REST client.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryApiError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or(RegistryApiError::NotConfigured)?;

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| RegistryApiError::NotConfigured)?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|source| RegistryApiError::Http {
                endpoint: "client_init".into(),
                source,
            })?;

        Ok(Self { http, base_url })
    }

    /// Appends `segments` to the base path, percent-encoding each one so a
    /// value can never add segments, a query or a fragment of its own.
    fn endpoint_url(&self, endpoint: &str, segments: &[&str]) -> Result<Url, RegistryApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RegistryApiError::InvalidUrl {
                endpoint: endpoint.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Calls `GET {base_url}/businesses/{identifier}`; 404 means the business does not exist.
    pub async fn get_business(
        &self,
        identifier: &str,
    ) -> Result<Option<BusinessEntity>, RegistryApiError> {
        if !is_registry_identifier(identifier) {
            return Err(RegistryApiError::InvalidIdentifier(identifier.to_string()));
        }
        let endpoint = format!("GET /businesses/{identifier}");
        let url = self.endpoint_url(&endpoint, &["businesses", identifier])?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| RegistryApiError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(&endpoint, resp).await?;

        let envelope: BusinessEnvelope =
            resp.json()
                .await
                .map_err(|source| RegistryApiError::Deserialization {
                    endpoint: endpoint.clone(),
                    source,
                })?;
        Ok(Some(envelope.business))
    }

    /// Calls `POST {base_url}/businesses/{identifier}/filings`, or
    /// `POST {base_url}/businesses?draft=false` for filings that create a business.
    pub async fn submit_filing(
        &self,
        request: &SubmissionRequest,
    ) -> Result<FilingId, RegistryApiError> {
        let (endpoint, url) = if request.creates_business() {
            let endpoint = "POST /businesses".to_string();
            let mut url = self.endpoint_url(&endpoint, &["businesses"])?;
            url.query_pairs_mut().append_pair("draft", "false");
            (endpoint, url)
        } else {
            let identifier = request.identifier.as_str();
            if !is_registry_identifier(identifier) {
                return Err(RegistryApiError::InvalidIdentifier(identifier.to_string()));
            }
            let endpoint = format!("POST /businesses/{identifier}/filings");
            let url = self.endpoint_url(&endpoint, &["businesses", identifier, "filings"])?;
            (endpoint, url)
        };

        debug!(%endpoint, filing = request.filing_type.name(), "submitting filing");
        let resp = self
            .http
            .post(url)
            .json(&request.payload())
            .send()
            .await
            .map_err(|source| RegistryApiError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        let resp = check_status(&endpoint, resp).await?;

        let body: Value = resp
            .json()
            .await
            .map_err(|source| RegistryApiError::Deserialization {
                endpoint: endpoint.clone(),
                source,
            })?;
        body.pointer("/filing/header/filingId")
            .and_then(Value::as_u64)
            .map(FilingId)
            .ok_or(RegistryApiError::MissingField {
                endpoint,
                field: "filing.header.filingId",
            })
    }
}

async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RegistryApiError> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let field_errors = serde_json::from_str::<ErrorEnvelope>(&body)
        .unwrap_or_default()
        .errors;
    warn!(endpoint, status, errors = field_errors.len(), "registry call failed");
    Err(RegistryApiError::Api {
        endpoint: endpoint.to_string(),
        status,
        body,
        field_errors,
    })
}

#[async_trait]
impl BusinessLookup for RegistryClient {
    async fn fetch_business(
        &self,
        identifier: &str,
    ) -> Result<Option<BusinessEntity>, RegistryApiError> {
        self.get_business(identifier).await
    }
}

#[async_trait]
impl FilingSubmitter for RegistryClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<FilingId, SubmissionError> {
        self.submit_filing(request).await.map_err(SubmissionError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RegistryClient {
        RegistryClient::new(&RegistryConfig {
            base_url: Some(Url::parse(base).expect("url")),
            api_token: None,
            timeout_secs: 5,
        })
        .expect("client")
    }

    #[test]
    fn endpoint_urls_keep_the_base_prefix() {
        for base in ["https://registry.example/api/v2", "https://registry.example/api/v2/"] {
            let url = client(base)
                .endpoint_url("GET /businesses", &["businesses", "BC0871234"])
                .expect("url");
            assert_eq!(url.as_str(), "https://registry.example/api/v2/businesses/BC0871234");
        }
    }

    #[test]
    fn segments_are_encoded_in_place() {
        let url = client("https://registry.example/api/v2")
            .endpoint_url("GET /businesses", &["businesses", "../../admin?drop=all#top"])
            .expect("url");
        assert!(url.path().starts_with("/api/v2/businesses/"), "{url}");
        assert_eq!(url.path_segments().map(Iterator::count), Some(4));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn api_errors_become_rejections_with_field_errors() {
        let error = RegistryApiError::Api {
            endpoint: "POST /businesses/BC1/filings".to_string(),
            status: 400,
            body: "{}".to_string(),
            field_errors: vec![ApiFieldError {
                error: "Invalid office".to_string(),
                path: "/filing/restoration/offices".to_string(),
            }],
        };
        match SubmissionError::from(error) {
            SubmissionError::Rejected {
                status, message, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid office");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn missing_base_url_is_reported() {
        let config = RegistryConfig::default();
        assert!(matches!(
            RegistryClient::new(&config),
            Err(RegistryApiError::NotConfigured)
        ));
    }
}
