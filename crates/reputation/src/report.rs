use serde::Serialize;
use std::collections::BTreeSet;

use crate::email::EmailScan;
use crate::score::TrustVerdict;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DetectionCounts {
    pub malicious: u32,
    pub suspicious: u32,
    pub harmless: u32,
    pub undetected: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UrlScan {
    pub source_url: String,
    pub counts: DetectionCounts,
    pub categories: BTreeSet<String>,
}

impl UrlScan {
    pub fn verdict(&self) -> TrustVerdict {
        crate::score::score_url(
            self.counts.malicious,
            self.counts.suspicious,
            self.counts.harmless,
            self.counts.undetected,
        )
    }
}

pub fn render_url_report(scan: &UrlScan, verdict: &TrustVerdict) -> String {
    let categories = if scan.categories.is_empty() {
        "Unknown".to_string()
    } else {
        scan.categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    [
        format!("Link: {}", scan.source_url),
        format!("Malicious: {}", scan.counts.malicious),
        format!("Harmless: {}", scan.counts.harmless),
        format!("Suspicious: {}", scan.counts.suspicious),
        format!("Trust Score: {}%", verdict.score),
        format!("Category: {categories}"),
        format!(
            "Verdict: {}, {}. {}",
            verdict.tier.risk_label(),
            verdict.status,
            verdict.recommendation
        ),
    ]
    .join("\n")
}

pub fn render_email_report(scan: &EmailScan, verdict: &TrustVerdict) -> String {
    let mut lines = vec![
        format!("Email: {}", scan.address),
        format!("Trust Score: {}%", verdict.score),
        format!("Status: {}", verdict.status),
    ];
    if scan.detected_issues.is_empty() {
        lines.push("Detected Issues: None".to_string());
    } else {
        lines.push("Detected Issues:".to_string());
        lines.extend(scan.detected_issues.iter().map(|issue| format!("- {issue}")));
    }
    lines.push(format!("Confidence Level: {}", verdict.confidence));
    lines.push(format!("Recommendation: {}", verdict.recommendation));
    lines.join("\n")
}
