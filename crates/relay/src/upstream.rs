use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Failure talking to an external collaborator. Every variant ends in a
/// fallback reply; none of them reach the HTTP caller.
#[derive(Error, Debug)]
pub(crate) enum UpstreamError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
    #[error("analysis {0} did not complete in time")]
    Pending(String),
    #[error("upstream returned an empty reply")]
    Empty,
}

impl UpstreamError {
    /// Stable label for structured logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            UpstreamError::NotConfigured(_)
            | UpstreamError::Transport(_)
            | UpstreamError::Status(_)
            | UpstreamError::Pending(_) => "upstream_unavailable",
            UpstreamError::Malformed(_) | UpstreamError::Empty => "malformed_upstream_response",
        }
    }
}

pub(crate) fn build_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("pmai-relay/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Sends the request built by `build`, retrying once when the failure is a
/// connect error or a timeout. Non-2xx statuses are not retried.
pub(crate) async fn send_json<F>(label: &'static str, build: F) -> Result<Value, UpstreamError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = match build().send().await {
        Ok(response) => response,
        Err(err) if err.is_connect() || err.is_timeout() => {
            tracing::warn!(
                event = "upstream.retry",
                upstream = label,
                error = %err,
                "transient upstream failure, retrying once"
            );
            build().send().await?
        }
        Err(err) => return Err(err.into()),
    };

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }
    response
        .json::<Value>()
        .await
        .map_err(|err| UpstreamError::Malformed(format!("{label} body is not JSON: {err}")))
}

pub(crate) fn require_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str, UpstreamError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::Malformed(format!("missing {pointer}")))
}
