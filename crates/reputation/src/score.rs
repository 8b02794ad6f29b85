//! Trust scoring for scanned links and email senders.
//!
//! Thresholds and penalties are fixed policy, not derived from upstream data,
//! so identical inputs always yield identical verdicts.

use serde::Serialize;
use std::fmt;

use crate::email::EmailIssue;

pub const URL_SAFE_THRESHOLD: u8 = 80;
pub const URL_CAUTION_THRESHOLD: u8 = 40;

pub const EMAIL_BASELINE: u8 = 100;
pub const EMAIL_SAFE_THRESHOLD: u8 = 80;
pub const EMAIL_SUSPICIOUS_THRESHOLD: u8 = 50;

pub const IMPERSONATION_PENALTY: u8 = 35;
pub const LOOKALIKE_PENALTY: u8 = 30;
pub const TRACKING_PENALTY: u8 = 20;

const REPUTATION_MIDPOINT: i64 = 50;
const REPUTATION_WEIGHT: i64 = 10;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Safe,
    Moderate,
    High,
}

impl RiskTier {
    pub fn risk_label(&self) -> &'static str {
        match self {
            RiskTier::Safe => "Low risk",
            RiskTier::Moderate => "Moderate risk",
            RiskTier::High => "High risk",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
    ExtremelyHigh,
}

impl Confidence {
    /// Scores near the middle of the range are the least conclusive.
    pub fn for_score(score: u8) -> Self {
        let distance = (i16::from(score) - 50).unsigned_abs();
        match distance {
            45..=u16::MAX => Confidence::ExtremelyHigh,
            30..=44 => Confidence::High,
            15..=29 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
            Confidence::ExtremelyHigh => "EXTREMELY HIGH",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrustVerdict {
    pub score: u8,
    pub tier: RiskTier,
    pub status: &'static str,
    pub confidence: Confidence,
    pub recommendation: &'static str,
}

/// Share of engines that called the link harmless, as a whole percentage.
/// No engines reporting means no trust.
pub fn score_url(malicious: u32, suspicious: u32, harmless: u32, undetected: u32) -> TrustVerdict {
    let total = u64::from(malicious)
        + u64::from(suspicious)
        + u64::from(harmless)
        + u64::from(undetected);
    let score = if total == 0 {
        0
    } else {
        let ratio = harmless as f64 / total as f64 * 100.0;
        ratio.round_ties_even().clamp(0.0, 100.0) as u8
    };
    url_verdict(score)
}

fn url_verdict(score: u8) -> TrustVerdict {
    let (tier, status, recommendation) = if score >= URL_SAFE_THRESHOLD {
        (
            RiskTier::Safe,
            "likely safe",
            "Link seems okay, but stay cautious with personal details.",
        )
    } else if score >= URL_CAUTION_THRESHOLD {
        (
            RiskTier::Moderate,
            "use with caution",
            "Open it only if you trust the sender and never enter passwords there.",
        )
    } else {
        (
            RiskTier::High,
            "avoid or report",
            "Avoid visiting this site and report it.",
        )
    };
    TrustVerdict {
        score,
        tier,
        status,
        confidence: Confidence::for_score(score),
        recommendation,
    }
}

/// Heuristic penalty policy: every distinct issue kind costs its fixed
/// penalty once, starting from the baseline, floored at zero.
pub fn score_email(issues: &[EmailIssue]) -> TrustVerdict {
    let mut penalty: u32 = 0;
    let mut charged = Vec::with_capacity(issues.len());
    for issue in issues {
        let kind = std::mem::discriminant(issue);
        if charged.contains(&kind) {
            continue;
        }
        charged.push(kind);
        penalty += u32::from(issue.penalty());
    }
    let score = u32::from(EMAIL_BASELINE).saturating_sub(penalty).min(100) as u8;
    email_verdict(score)
}

/// Alternative policy for an upstream reputation integer. Clamped to 0..=100.
pub fn reputation_score(reputation: i64) -> u8 {
    REPUTATION_MIDPOINT
        .saturating_add(reputation.saturating_mul(REPUTATION_WEIGHT))
        .clamp(0, 100) as u8
}

pub fn email_verdict(score: u8) -> TrustVerdict {
    let score = score.min(100);
    let (tier, status, recommendation) = if score >= EMAIL_SAFE_THRESHOLD {
        (
            RiskTier::Safe,
            "Likely safe",
            "No action needed, but never share passwords or OTPs by email.",
        )
    } else if score >= EMAIL_SUSPICIOUS_THRESHOLD {
        (
            RiskTier::Moderate,
            "Suspicious",
            "Verify the sender through another channel before replying or clicking links.",
        )
    } else {
        (RiskTier::High, "High-risk / Phishing", "Block & report")
    };
    TrustVerdict {
        score,
        tier,
        status,
        confidence: Confidence::for_score(score),
        recommendation,
    }
}
