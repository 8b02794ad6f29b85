use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use protocol::config::ThreatIntelConfig;
use reputation::DetectionCounts;
use serde_json::Value;

use crate::config::read_api_key;
use crate::upstream::{build_http_client, require_str, send_json, UpstreamError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlAnalysis {
    pub(crate) completed: bool,
    pub(crate) counts: DetectionCounts,
    /// Identifier of the scanned URL object, when the service reports one.
    pub(crate) url_id: Option<String>,
}

#[async_trait]
pub(crate) trait ThreatIntel: Send + Sync {
    /// Queues `url` for analysis and returns the analysis identifier.
    async fn submit_url(&self, url: &str) -> Result<String, UpstreamError>;

    async fn fetch_analysis(&self, analysis_id: &str) -> Result<UrlAnalysis, UpstreamError>;

    async fn url_categories(&self, url_id: &str) -> Result<BTreeSet<String>, UpstreamError>;
}

#[derive(Debug, Default)]
pub(crate) struct DisabledThreatIntel;

#[async_trait]
impl ThreatIntel for DisabledThreatIntel {
    async fn submit_url(&self, _url: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured("threat intel"))
    }

    async fn fetch_analysis(&self, _analysis_id: &str) -> Result<UrlAnalysis, UpstreamError> {
        Err(UpstreamError::NotConfigured("threat intel"))
    }

    async fn url_categories(&self, _url_id: &str) -> Result<BTreeSet<String>, UpstreamError> {
        Err(UpstreamError::NotConfigured("threat intel"))
    }
}

/// VirusTotal v3 client.
#[derive(Debug, Clone)]
pub(crate) struct VirusTotalClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VirusTotalClient {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ThreatIntel for VirusTotalClient {
    async fn submit_url(&self, url: &str) -> Result<String, UpstreamError> {
        let endpoint = self.url("urls");
        let body = send_json("virustotal.submit", || {
            self.client
                .post(&endpoint)
                .header("x-apikey", &self.api_key)
                .form(&[("url", url)])
        })
        .await?;
        parse_submission(&body)
    }

    async fn fetch_analysis(&self, analysis_id: &str) -> Result<UrlAnalysis, UpstreamError> {
        let endpoint = self.url(&format!("analyses/{analysis_id}"));
        let body = send_json("virustotal.analysis", || {
            self.client
                .get(&endpoint)
                .header("x-apikey", &self.api_key)
        })
        .await?;
        parse_analysis(&body)
    }

    async fn url_categories(&self, url_id: &str) -> Result<BTreeSet<String>, UpstreamError> {
        let endpoint = self.url(&format!("urls/{url_id}"));
        let body = send_json("virustotal.url", || {
            self.client
                .get(&endpoint)
                .header("x-apikey", &self.api_key)
        })
        .await?;
        Ok(parse_categories(&body))
    }
}

fn parse_submission(body: &Value) -> Result<String, UpstreamError> {
    require_str(body, "/data/id").map(str::to_string)
}

fn parse_analysis(body: &Value) -> Result<UrlAnalysis, UpstreamError> {
    let status = require_str(body, "/data/attributes/status")?;
    let stats = body
        .pointer("/data/attributes/stats")
        .and_then(Value::as_object)
        .ok_or_else(|| UpstreamError::Malformed("missing /data/attributes/stats".to_string()))?;
    let counter = |name: &str| -> Result<u32, UpstreamError> {
        match stats.get(name) {
            None => Ok(0),
            Some(value) => value
                .as_u64()
                .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
                .ok_or_else(|| UpstreamError::Malformed(format!("stats.{name} is not a count"))),
        }
    };
    Ok(UrlAnalysis {
        completed: status.eq_ignore_ascii_case("completed"),
        counts: DetectionCounts {
            malicious: counter("malicious")?,
            suspicious: counter("suspicious")?,
            harmless: counter("harmless")?,
            undetected: counter("undetected")?,
        },
        url_id: body
            .pointer("/meta/url_info/id")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn parse_categories(body: &Value) -> BTreeSet<String> {
    body.pointer("/data/attributes/categories")
        .and_then(Value::as_object)
        .map(|categories| {
            categories
                .values()
                .filter_map(Value::as_str)
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn build_threat_intel(config: &ThreatIntelConfig) -> anyhow::Result<Arc<dyn ThreatIntel>> {
    let Some(api_key) = read_api_key(&config.api_key_env) else {
        tracing::warn!(
            event = "threat_intel.disabled",
            api_key_env = %config.api_key_env,
            "threat intel key missing; scans will use the generative fallback"
        );
        return Ok(Arc::new(DisabledThreatIntel));
    };
    tracing::info!(base_url = %config.base_url, "threat intel configured");
    Ok(Arc::new(VirusTotalClient {
        client: build_http_client(config.timeout_secs)?,
        base_url: config.base_url.clone(),
        api_key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_submission_id() {
        let body = json!({ "data": { "type": "analysis", "id": "u-abc-123" } });
        assert_eq!(parse_submission(&body).unwrap(), "u-abc-123");
        assert!(parse_submission(&json!({ "error": {} })).is_err());
    }

    #[test]
    fn parses_completed_analysis() {
        let body = json!({
            "data": {
                "attributes": {
                    "status": "completed",
                    "stats": {
                        "malicious": 2,
                        "suspicious": 1,
                        "harmless": 60,
                        "undetected": 9,
                        "timeout": 0
                    }
                }
            },
            "meta": { "url_info": { "id": "deadbeef", "url": "http://example.com/" } }
        });
        let analysis = parse_analysis(&body).unwrap();
        assert!(analysis.completed);
        assert_eq!(
            analysis.counts,
            DetectionCounts {
                malicious: 2,
                suspicious: 1,
                harmless: 60,
                undetected: 9,
            }
        );
        assert_eq!(analysis.url_id.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn queued_analysis_is_not_completed() {
        let body = json!({
            "data": { "attributes": { "status": "queued", "stats": {} } }
        });
        let analysis = parse_analysis(&body).unwrap();
        assert!(!analysis.completed);
        assert_eq!(analysis.counts, DetectionCounts::default());
        assert_eq!(analysis.url_id, None);
    }

    #[test]
    fn analysis_without_stats_is_malformed() {
        let body = json!({ "data": { "attributes": { "status": "completed" } } });
        assert!(matches!(
            parse_analysis(&body),
            Err(UpstreamError::Malformed(_))
        ));
        let body = json!({
            "data": { "attributes": { "status": "completed", "stats": { "harmless": "ten" } } }
        });
        assert!(parse_analysis(&body).is_err());
    }

    #[test]
    fn collects_category_labels() {
        let body = json!({
            "data": {
                "attributes": {
                    "categories": {
                        "Forcepoint ThreatSeeker": "phishing",
                        "Sophos": "phishing",
                        "BitDefender": "financial",
                        "Xcitium": " "
                    }
                }
            }
        });
        let categories = parse_categories(&body);
        assert_eq!(
            categories.into_iter().collect::<Vec<_>>(),
            vec!["financial".to_string(), "phishing".to_string()]
        );
        assert!(parse_categories(&json!({})).is_empty());
    }
}
