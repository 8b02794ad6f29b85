use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reputation::DetectionCounts;

use crate::generation::TextGenerator;
use crate::threat_intel::{ThreatIntel, UrlAnalysis};
use crate::upstream::UpstreamError;

/// Records every instruction and answers with a fixed reply, or fails.
#[derive(Clone, Default)]
pub(crate) struct StubGenerator {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubGenerator {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Arc::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::default()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn generate(&self, instruction: &str) -> Result<String, UpstreamError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(instruction.to_string());
        self.reply.clone().ok_or(UpstreamError::Status(502))
    }
}

#[derive(Default)]
struct ThreatIntelLog {
    submitted: Vec<String>,
    fetches: u32,
}

#[derive(Clone)]
pub(crate) struct StubThreatIntel {
    counts: DetectionCounts,
    failure_status: Option<u16>,
    pending_fetches: u32,
    categories: Option<BTreeSet<String>>,
    log: Arc<Mutex<ThreatIntelLog>>,
}

impl StubThreatIntel {
    pub(crate) fn completed(counts: DetectionCounts) -> Self {
        Self {
            counts,
            failure_status: None,
            pending_fetches: 0,
            categories: Some(BTreeSet::new()),
            log: Arc::default(),
        }
    }

    /// Every call fails with the given HTTP status.
    pub(crate) fn status(code: u16) -> Self {
        Self {
            failure_status: Some(code),
            ..Self::completed(DetectionCounts::default())
        }
    }

    pub(crate) fn pending_for(mut self, fetches: u32) -> Self {
        self.pending_fetches = fetches;
        self
    }

    pub(crate) fn with_categories(mut self, labels: &[&str]) -> Self {
        self.categories = Some(labels.iter().map(|label| label.to_string()).collect());
        self
    }

    pub(crate) fn with_failing_categories(mut self) -> Self {
        self.categories = None;
        self
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.log.lock().expect("log lock").submitted.clone()
    }

    pub(crate) fn fetches(&self) -> u32 {
        self.log.lock().expect("log lock").fetches
    }

    fn check_status(&self) -> Result<(), UpstreamError> {
        match self.failure_status {
            Some(code) => Err(UpstreamError::Status(code)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ThreatIntel for StubThreatIntel {
    async fn submit_url(&self, url: &str) -> Result<String, UpstreamError> {
        self.check_status()?;
        self.log
            .lock()
            .expect("log lock")
            .submitted
            .push(url.to_string());
        Ok("analysis-1".to_string())
    }

    async fn fetch_analysis(&self, _analysis_id: &str) -> Result<UrlAnalysis, UpstreamError> {
        self.check_status()?;
        let mut log = self.log.lock().expect("log lock");
        log.fetches += 1;
        let completed = log.fetches > self.pending_fetches;
        Ok(UrlAnalysis {
            completed,
            counts: if completed {
                self.counts
            } else {
                DetectionCounts::default()
            },
            url_id: Some("url-1".to_string()),
        })
    }

    async fn url_categories(&self, _url_id: &str) -> Result<BTreeSet<String>, UpstreamError> {
        self.check_status()?;
        self.categories
            .clone()
            .ok_or_else(|| UpstreamError::Malformed("categories".to_string()))
    }
}
