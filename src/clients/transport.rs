use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One API call relative to the client's base url
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("decode error: {message}")]
    Decode { message: String },
    #[error("invalid url: {message}")]
    InvalidUrl { message: String },
}

impl ClientError {
    /// Transport failures, timeouts and 5xx are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network { .. } | ClientError::Timeout { .. } => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Decode { .. } | ClientError::InvalidUrl { .. } => false,
        }
    }

    /// Text safe to show an end user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { status, message } if *status < 500 => message.clone(),
            ClientError::Decode { .. } => {
                "Received an unexpected response from the server.".to_string()
            }
            _ => "The server is not responding. Please try again later.".to_string(),
        }
    }
}

/// Single attempt at an API call. Retries and signals live above this seam.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Body of a 2xx response; any other status is a [`ClientError::Status`]
    async fn send(&self, request: &ApiRequest) -> Result<String, ClientError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            message: format!("{}: {}", config.base_url, e),
        })?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Network {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            message: format!("{}: {}", raw, e),
        })
    }
}

/// Pull `message` (or `reply`) out of a JSON error body, else use the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("reply"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<String, ClientError> {
        let url = self.url_for(&request.path)?;
        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let mut builder = builder.query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ClientError::Network {
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ClientError::Network { message: "reset".into() }.is_retryable());
        assert!(ClientError::Timeout { timeout_ms: 30_000 }.is_retryable());
        assert!(
            ClientError::Status {
                status: 503,
                message: "unavailable".into()
            }
            .is_retryable()
        );
        assert!(
            !ClientError::Status {
                status: 404,
                message: "Career not found".into()
            }
            .is_retryable()
        );
        assert!(!ClientError::Decode { message: "eof".into() }.is_retryable());
    }

    #[test]
    fn test_user_message_hides_transient_details() {
        let err = ClientError::Network {
            message: "connection refused (os error 111)".into(),
        };
        assert!(err.user_message().contains("try again later"));

        let not_found = ClientError::Status {
            status: 404,
            message: "Career not found".into(),
        };
        assert_eq!(not_found.user_message(), "Career not found");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Career not found"}"#), "Career not found");
        assert_eq!(
            error_message(r#"{"reply":"Please provide a message."}"#),
            "Please provide a message."
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let config = ClientConfig {
            base_url: "http://localhost:5000/api/".into(),
            ..ClientConfig::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(
            transport.url_for("/careers/3").unwrap().as_str(),
            "http://localhost:5000/api/careers/3"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            ReqwestTransport::new(&config),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
