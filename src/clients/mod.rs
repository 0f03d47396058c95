//! Resilient HTTP client for the catalog API.
//!
//! Requests that hit network failures, timeouts or 5xx responses are retried with
//! exponential backoff. Slow or retried requests announce [`ServerStatus::WakingUp`] on a
//! broadcast channel so a UI can show a cold-start notice; success announces
//! [`ServerStatus::Ready`].

pub mod api;
pub mod retry;
pub mod signal;
pub mod transport;

pub use api::ApiClient;
pub use retry::RetryPolicy;
pub use signal::{ServerStatus, StatusSignals};
pub use transport::{ApiRequest, ClientError, Method, ReqwestTransport, Transport};
