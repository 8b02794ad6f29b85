use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use protocol::config::ThreatIntelConfig;
use protocol::{Language, Mode};
use reputation::{
    classify, inspect_email, render_email_report, render_url_report, score_email, ScanTarget,
    UrlScan,
};

use crate::canned::SCAN_UNAVAILABLE;
use crate::generation::{complete, TextGenerator};
use crate::persona::PersonaTable;
use crate::threat_intel::{ThreatIntel, UrlAnalysis};
use crate::upstream::UpstreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollSettings {
    pub(crate) attempts: u32,
    pub(crate) interval: Duration,
}

impl PollSettings {
    pub(crate) fn from_config(config: &ThreatIntelConfig) -> Self {
        Self {
            attempts: config.poll_attempts.max(1),
            interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Handles `mode = scan`: emails are checked locally, links go to threat
/// intel, anything else is answered by the generator with the scan persona.
pub(crate) struct ScanDispatcher {
    threat_intel: Arc<dyn ThreatIntel>,
    generator: Arc<dyn TextGenerator>,
    personas: Arc<PersonaTable>,
    polling: PollSettings,
}

impl ScanDispatcher {
    pub(crate) fn new(
        threat_intel: Arc<dyn ThreatIntel>,
        generator: Arc<dyn TextGenerator>,
        personas: Arc<PersonaTable>,
        polling: PollSettings,
    ) -> Self {
        Self {
            threat_intel,
            generator,
            personas,
            polling,
        }
    }

    pub(crate) async fn scan(&self, input: &str, language: Language) -> String {
        match classify(input) {
            ScanTarget::Email(address) => scan_email(&address),
            ScanTarget::Url(url) => match self.scan_url(&url).await {
                Ok(report) => report,
                Err(err) => {
                    tracing::warn!(
                        event = "scan.lookup_failed",
                        kind = err.kind(),
                        error = %err,
                        url = %url,
                        "link lookup failed, using generative fallback"
                    );
                    self.generative_fallback(input, language).await
                }
            },
            ScanTarget::Text(text) => {
                tracing::debug!(event = "scan.unclassified", "scan input is neither link nor email");
                self.generative_fallback(&text, language).await
            }
        }
    }

    async fn scan_url(&self, url: &str) -> Result<String, UpstreamError> {
        let analysis_id = self.threat_intel.submit_url(url).await?;
        let analysis = self.wait_for_analysis(&analysis_id).await?;
        let categories = match analysis.url_id.as_deref() {
            Some(url_id) => self
                .threat_intel
                .url_categories(url_id)
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!(
                        event = "scan.categories_failed",
                        error = %err,
                        "category lookup failed"
                    );
                    BTreeSet::new()
                }),
            None => BTreeSet::new(),
        };
        let scan = UrlScan {
            source_url: url.to_string(),
            counts: analysis.counts,
            categories,
        };
        let verdict = scan.verdict();
        tracing::info!(
            event = "scan.url_scored",
            analysis_id = %analysis_id,
            score = verdict.score,
            tier = ?verdict.tier,
            "link scored"
        );
        Ok(render_url_report(&scan, &verdict))
    }

    async fn wait_for_analysis(&self, analysis_id: &str) -> Result<UrlAnalysis, UpstreamError> {
        for attempt in 1..=self.polling.attempts {
            let analysis = self.threat_intel.fetch_analysis(analysis_id).await?;
            if analysis.completed {
                return Ok(analysis);
            }
            tracing::debug!(
                event = "scan.analysis_pending",
                analysis_id = %analysis_id,
                attempt,
                "analysis not ready"
            );
            if attempt < self.polling.attempts {
                tokio::time::sleep(self.polling.interval).await;
            }
        }
        Err(UpstreamError::Pending(analysis_id.to_string()))
    }

    async fn generative_fallback(&self, input: &str, language: Language) -> String {
        let instruction = self.personas.instruction(Mode::Scan, language, input);
        match complete(self.generator.as_ref(), &instruction).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    event = "scan.fallback_failed",
                    generator = self.generator.name(),
                    kind = err.kind(),
                    error = %err,
                    "generative scan fallback failed"
                );
                SCAN_UNAVAILABLE.to_string()
            }
        }
    }
}

fn scan_email(address: &str) -> String {
    let scan = inspect_email(address);
    let verdict = score_email(&scan.detected_issues);
    tracing::info!(
        event = "scan.email_scored",
        domain = %scan.domain,
        issues = scan.detected_issues.len(),
        score = verdict.score,
        "email scored"
    );
    render_email_report(&scan, &verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StubGenerator, StubThreatIntel};
    use reputation::DetectionCounts;

    fn dispatcher(threat_intel: StubThreatIntel, generator: StubGenerator) -> ScanDispatcher {
        ScanDispatcher::new(
            Arc::new(threat_intel),
            Arc::new(generator),
            Arc::new(PersonaTable::default()),
            PollSettings {
                attempts: 3,
                interval: Duration::ZERO,
            },
        )
    }

    fn counts(malicious: u32, suspicious: u32, harmless: u32, undetected: u32) -> DetectionCounts {
        DetectionCounts {
            malicious,
            suspicious,
            harmless,
            undetected,
        }
    }

    #[tokio::test]
    async fn clean_link_scores_full_trust() {
        let threat_intel = StubThreatIntel::completed(counts(0, 0, 10, 0));
        let generator = StubGenerator::failing();
        let scanner = dispatcher(threat_intel.clone(), generator.clone());

        let reply = scanner.scan("http://example.com", Language::English).await;

        assert!(reply.contains("Malicious: 0"));
        assert!(reply.contains("Trust Score: 100%"));
        assert!(reply.contains("likely safe"));
        assert_eq!(threat_intel.submitted(), vec!["http://example.com".to_string()]);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn bare_host_is_coerced_to_http() {
        let threat_intel = StubThreatIntel::completed(counts(3, 2, 5, 0));
        let scanner = dispatcher(threat_intel.clone(), StubGenerator::failing());

        let reply = scanner.scan("example.com", Language::English).await;

        assert_eq!(threat_intel.submitted(), vec!["http://example.com".to_string()]);
        assert!(reply.starts_with("Link: http://example.com\n"));
        assert!(reply.contains("Trust Score: 50%"));
    }

    #[tokio::test]
    async fn categories_appear_in_report() {
        let threat_intel = StubThreatIntel::completed(counts(9, 0, 1, 0))
            .with_categories(&["phishing", "malicious"]);
        let scanner = dispatcher(threat_intel, StubGenerator::failing());

        let reply = scanner.scan("https://login-bank.example", Language::English).await;

        assert!(reply.contains("Category: malicious, phishing"));
        assert!(reply.contains("avoid or report"));
    }

    #[tokio::test]
    async fn category_failure_reports_unknown() {
        let threat_intel =
            StubThreatIntel::completed(counts(0, 0, 4, 1)).with_failing_categories();
        let scanner = dispatcher(threat_intel, StubGenerator::failing());

        let reply = scanner.scan("https://example.org", Language::English).await;

        assert!(reply.contains("Category: Unknown"));
        assert!(reply.contains("Trust Score: 80%"));
    }

    #[tokio::test]
    async fn polls_until_analysis_completes() {
        let threat_intel = StubThreatIntel::completed(counts(0, 0, 10, 0)).pending_for(2);
        let scanner = dispatcher(threat_intel.clone(), StubGenerator::failing());

        let reply = scanner.scan("http://example.com", Language::English).await;

        assert!(reply.contains("Trust Score: 100%"));
        assert_eq!(threat_intel.fetches(), 3);
    }

    #[tokio::test]
    async fn never_completed_analysis_falls_back_to_generator() {
        let threat_intel = StubThreatIntel::completed(counts(0, 0, 10, 0)).pending_for(10);
        let generator = StubGenerator::replying("  Looks like a normal site.  ");
        let scanner = dispatcher(threat_intel.clone(), generator.clone());

        let reply = scanner.scan("http://example.com", Language::English).await;

        assert_eq!(reply, "Looks like a normal site.");
        assert_eq!(threat_intel.fetches(), 3);
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Act like a cybersecurity analyst."));
        assert!(prompts[0].contains("User: http://example.com"));
    }

    #[tokio::test]
    async fn upstream_error_status_degrades_to_generator() {
        let generator = StubGenerator::replying("I could not verify that link.");
        let scanner = dispatcher(StubThreatIntel::status(503), generator);

        let reply = scanner.scan("http://example.com", Language::Pidgin).await;

        assert_eq!(reply, "I could not verify that link.");
    }

    #[tokio::test]
    async fn double_failure_returns_scan_unavailable() {
        let scanner = dispatcher(StubThreatIntel::status(500), StubGenerator::failing());

        let reply = scanner.scan("http://example.com", Language::English).await;

        assert_eq!(reply, SCAN_UNAVAILABLE);
    }

    #[tokio::test]
    async fn lookalike_email_scores_seventy() {
        let threat_intel = StubThreatIntel::status(500);
        let generator = StubGenerator::failing();
        let scanner = dispatcher(threat_intel.clone(), generator.clone());

        let reply = scanner.scan("someone@paypa1.com", Language::English).await;

        assert!(reply.starts_with("Email: someone@paypa1.com\n"));
        assert!(reply.contains("Trust Score: 70%"));
        assert!(reply.contains("Lookalike spelling of paypal.com"));
        assert!(threat_intel.submitted().is_empty());
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn free_text_goes_to_generator_with_scan_persona() {
        let generator = StubGenerator::replying("Send me the link and I go check am.");
        let scanner = dispatcher(StubThreatIntel::status(500), generator.clone());

        let reply = scanner.scan("is this safe?", Language::Pidgin).await;

        assert_eq!(reply, "Send me the link and I go check am.");
        let prompts = generator.prompts();
        assert!(prompts[0].contains("Use only Nigerian Pidgin."));
    }
}
