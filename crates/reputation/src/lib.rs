//! Reputation scoring for links and email senders.
//!
//! Pure functions only: detection counters and local heuristics go in, a
//! [`TrustVerdict`] and a plain-text report come out.

pub mod classify;
pub mod email;
pub mod report;
pub mod score;

pub use classify::{classify, ScanTarget};
pub use email::{extract_domain, inspect_email, is_email, EmailIssue, EmailScan};
pub use report::{render_email_report, render_url_report, DetectionCounts, UrlScan};
pub use score::{
    reputation_score, score_email, score_url, Confidence, RiskTier, TrustVerdict,
};
