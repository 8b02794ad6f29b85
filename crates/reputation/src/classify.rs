use crate::email::is_email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    Email(String),
    Url(String),
    /// Free text that is neither an address nor a link.
    Text(String),
}

pub fn classify(input: &str) -> ScanTarget {
    let trimmed = input.trim();
    if is_email(trimmed) {
        return ScanTarget::Email(trimmed.to_string());
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return ScanTarget::Url(trimmed.to_string());
    }
    if looks_like_host(trimmed) {
        return ScanTarget::Url(format!("http://{trimmed}"));
    }
    ScanTarget::Text(trimmed.to_string())
}

fn looks_like_host(value: &str) -> bool {
    if value.is_empty() || value.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    let host = value.split(['/', '?', '#']).next().unwrap_or(value);
    let host = host.split(':').next().unwrap_or(host);
    host.contains('.')
        && host.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
        })
        && host
            .rsplit('.')
            .next()
            .is_some_and(|tld| tld.chars().any(|ch| ch.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_addresses_to_email() {
        assert_eq!(
            classify(" someone@paypa1.com "),
            ScanTarget::Email("someone@paypa1.com".to_string())
        );
    }

    #[test]
    fn keeps_explicit_schemes() {
        assert_eq!(
            classify("https://example.com/login"),
            ScanTarget::Url("https://example.com/login".to_string())
        );
        assert_eq!(
            classify("HTTP://Example.com"),
            ScanTarget::Url("HTTP://Example.com".to_string())
        );
    }

    #[test]
    fn coerces_bare_hosts() {
        assert_eq!(
            classify("example.com/path?q=1"),
            ScanTarget::Url("http://example.com/path?q=1".to_string())
        );
        assert_eq!(
            classify("sub.example.ng:8080"),
            ScanTarget::Url("http://sub.example.ng:8080".to_string())
        );
    }

    #[test]
    fn leaves_prose_as_text() {
        assert_eq!(
            classify("is this link safe?"),
            ScanTarget::Text("is this link safe?".to_string())
        );
        assert_eq!(classify("3.14"), ScanTarget::Text("3.14".to_string()));
        assert_eq!(classify("hello"), ScanTarget::Text("hello".to_string()));
    }
}
