use crate::catalog::{Career, Question, Roadmap};
use crate::clients::retry::RetryPolicy;
use crate::clients::signal::{ServerStatus, StatusSignals};
use crate::clients::transport::{ApiRequest, ClientError, ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::http::ChatReply;
use crate::query::{CareerPage, EntryPage, ListParams};
use crate::quiz::{AssessmentRequest, AssessmentResult};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Catalog API client that retries transient failures and reports cold starts on
/// [`StatusSignals`]
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    signals: StatusSignals,
    timeout: Duration,
    slow_after: Duration,
}

/// Aborts the slow-request timer when the logical request ends, however it ends
struct SlowTimer(JoinHandle<()>);

impl Drop for SlowTimer {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            policy: RetryPolicy::from_config(config),
            signals: StatusSignals::default(),
            timeout: config.timeout(),
            slow_after: Duration::from_millis(config.slow_after_ms),
        }
    }

    pub fn signals(&self) -> &StatusSignals {
        &self.signals
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Marks the backend as waking up, at most once per logical request
    fn wake_once(signals: &StatusSignals, woke: &AtomicBool) {
        if !woke.swap(true, Ordering::SeqCst) {
            signals.emit(ServerStatus::WakingUp);
        }
    }

    fn arm_slow_timer(&self, woke: Arc<AtomicBool>, path: String) -> SlowTimer {
        let signals = self.signals.clone();
        let slow_after = self.slow_after;
        SlowTimer(tokio::spawn(async move {
            tokio::time::sleep(slow_after).await;
            info!("Request to {} is slow; server may be waking up", path);
            Self::wake_once(&signals, &woke);
        }))
    }

    async fn attempt(&self, request: &ApiRequest) -> Result<String, ClientError> {
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// Run one logical request: attempts, backoff between them, and status signals
    pub async fn execute(&self, request: ApiRequest) -> Result<String, ClientError> {
        let woke = Arc::new(AtomicBool::new(false));
        let timer = self.arm_slow_timer(woke.clone(), request.path.clone());

        let mut retry = 0u32;
        let outcome = loop {
            match self.attempt(&request).await {
                Ok(body) => break Ok(body),
                Err(e) if e.is_retryable() && retry < self.policy.retries => {
                    retry += 1;
                    if retry == 1 {
                        Self::wake_once(&self.signals, &woke);
                    }
                    let delay = self.policy.delay_for(retry);
                    warn!(
                        "Request to {} failed ({}); retry {}/{} in {:?}",
                        request.path, e, retry, self.policy.retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => break Err(e),
            }
        };
        drop(timer);

        match &outcome {
            Ok(_) => self.signals.emit(ServerStatus::Ready),
            Err(e) => warn!("Request to {} failed after {} retries: {}", request.path, retry, e),
        }
        outcome
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            message: e.to_string(),
        })
    }

    pub async fn careers(&self, params: &ListParams) -> Result<CareerPage, ClientError> {
        self.fetch(ApiRequest::get("careers").with_query(list_query(params)))
            .await
    }

    /// A missing career is `Ok(None)`
    pub async fn career(&self, id: i64) -> Result<Option<Career>, ClientError> {
        match self.fetch(ApiRequest::get(format!("careers/{}", id))).await {
            Ok(career) => Ok(Some(career)),
            Err(ClientError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn questions(&self) -> Result<Vec<Question>, ClientError> {
        self.fetch(ApiRequest::get("questions")).await
    }

    pub async fn roadmaps(&self) -> Result<Vec<Roadmap>, ClientError> {
        self.fetch(ApiRequest::get("roadmaps")).await
    }

    pub async fn colleges(&self, params: &ListParams) -> Result<EntryPage, ClientError> {
        self.fetch(ApiRequest::get("colleges").with_query(list_query(params)))
            .await
    }

    pub async fn chat(&self, message: &str) -> Result<String, ClientError> {
        let reply: ChatReply = self
            .fetch(ApiRequest::post("chat", json!({ "message": message })))
            .await?;
        Ok(reply.reply)
    }

    pub async fn assess(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResult, ClientError> {
        let body = serde_json::to_value(request).map_err(|e| ClientError::Decode {
            message: e.to_string(),
        })?;
        self.fetch(ApiRequest::post("assessment", body)).await
    }
}

fn list_query(params: &ListParams) -> Vec<(String, String)> {
    [
        ("page", &params.page),
        ("limit", &params.limit),
        ("search", &params.search),
        ("type", &params.kind),
    ]
    .into_iter()
    .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
    .collect()
}
