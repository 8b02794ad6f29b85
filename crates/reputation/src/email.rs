//! Local sender heuristics. Nothing here touches the network.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::score::{IMPERSONATION_PENALTY, LOOKALIKE_PENALTY, TRACKING_PENALTY};

/// Domains that phishing senders most often imitate.
pub const WELL_KNOWN_DOMAINS: &[&str] = &[
    "paypal.com",
    "google.com",
    "gmail.com",
    "apple.com",
    "microsoft.com",
    "amazon.com",
    "facebook.com",
    "instagram.com",
    "netflix.com",
    "linkedin.com",
    "whatsapp.com",
];

/// Domains run by the same owners as a well-known brand.
pub const OFFICIAL_SIBLING_DOMAINS: &[&str] = &[
    "googlemail.com",
    "amazonaws.com",
    "paypal-objects.com",
    "microsoftonline.com",
];

/// Matched against the local part plus its trailing `@` only.
pub const TRACKING_MARKERS: &[&str] = &["tracking", "mailer@"];

// digit and symbol stand-ins for letters; `1` is tried as both `l` and `i`
const LOOKALIKE_FOLDS: [&[(char, char)]; 2] = [
    &[('0', 'o'), ('1', 'l'), ('3', 'e'), ('4', 'a'), ('5', 's'), ('7', 't'), ('$', 's')],
    &[('0', 'o'), ('1', 'i'), ('3', 'e'), ('4', 'a'), ('5', 's'), ('7', 't'), ('$', 's')],
];

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$")
            .expect("email pattern is valid")
    })
}

/// `local@domain` with at least one dot in the domain.
pub fn is_email(input: &str) -> bool {
    email_pattern().is_match(input.trim())
}

pub fn extract_domain(address: &str) -> Option<&str> {
    let (_, domain) = address.trim().rsplit_once('@')?;
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmailIssue {
    Impersonation { brand: String },
    Lookalike { brand: String },
    TrackingMarker { marker: String },
}

impl EmailIssue {
    pub fn penalty(&self) -> u8 {
        match self {
            EmailIssue::Impersonation { .. } => IMPERSONATION_PENALTY,
            EmailIssue::Lookalike { .. } => LOOKALIKE_PENALTY,
            EmailIssue::TrackingMarker { .. } => TRACKING_PENALTY,
        }
    }
}

impl fmt::Display for EmailIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailIssue::Impersonation { brand } => {
                write!(f, "Domain imitates {brand} but is not the official domain")
            }
            EmailIssue::Lookalike { brand } => {
                write!(f, "Lookalike spelling of {brand} (character substitution)")
            }
            EmailIssue::TrackingMarker { marker } => {
                write!(f, "Sender address contains tracking marker '{marker}'")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailScan {
    pub address: String,
    pub domain: String,
    pub detected_issues: Vec<EmailIssue>,
}

/// Runs every heuristic against `address`. Issues come back in a fixed order:
/// impersonation, lookalike spelling, tracking markers.
pub fn inspect_email(address: &str) -> EmailScan {
    let address = address.trim().to_string();
    let lowered = address.to_ascii_lowercase();
    let domain = extract_domain(&lowered).unwrap_or_default().to_string();

    let mut detected_issues = Vec::new();
    if let Some(brand) = impersonated_brand(&domain) {
        detected_issues.push(EmailIssue::Impersonation {
            brand: brand.to_string(),
        });
    }
    if let Some(brand) = lookalike_brand(&domain) {
        detected_issues.push(EmailIssue::Lookalike {
            brand: brand.to_string(),
        });
    }
    let local_with_at = lowered
        .rfind('@')
        .map_or(lowered.as_str(), |at| &lowered[..=at]);
    if let Some(marker) = TRACKING_MARKERS
        .iter()
        .find(|marker| local_with_at.contains(**marker))
    {
        detected_issues.push(EmailIssue::TrackingMarker {
            marker: marker.to_string(),
        });
    }

    EmailScan {
        address,
        domain,
        detected_issues,
    }
}

fn brand_token(known: &str) -> &str {
    known.split('.').next().unwrap_or(known)
}

fn is_official(domain: &str, known: &str) -> bool {
    domain == known
        || domain
            .strip_suffix(known)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn impersonated_brand(domain: &str) -> Option<&'static str> {
    if OFFICIAL_SIBLING_DOMAINS
        .iter()
        .any(|sibling| is_official(domain, sibling))
    {
        return None;
    }
    WELL_KNOWN_DOMAINS.iter().copied().find(|known| {
        starts_label_segment(domain, brand_token(known)) && !is_official(domain, known)
    })
}

/// True when `token` begins the domain or follows a `.` or `-`, so `pineapple`
/// does not count as `apple`.
fn starts_label_segment(domain: &str, token: &str) -> bool {
    domain
        .match_indices(token)
        .any(|(at, _)| at == 0 || matches!(domain.as_bytes()[at - 1], b'.' | b'-'))
}

fn lookalike_brand(domain: &str) -> Option<&'static str> {
    LOOKALIKE_FOLDS.iter().find_map(|folds| {
        let folded = fold_lookalikes(domain, folds);
        if folded == domain {
            return None;
        }
        WELL_KNOWN_DOMAINS.iter().copied().find(|known| {
            let token = brand_token(known);
            folded.contains(token) && !domain.contains(token)
        })
    })
}

fn fold_lookalikes(domain: &str, folds: &[(char, char)]) -> String {
    let folded: String = domain
        .chars()
        .map(|ch| {
            folds
                .iter()
                .find(|(from, _)| *from == ch)
                .map(|(_, to)| *to)
                .unwrap_or(ch)
        })
        .collect();
    folded.replace("rn", "m").replace("vv", "w")
}
