//! UTM URL construction and base URL validation.

use std::fmt;
use url::Url;

use crate::row::Row;

/// Query keys in the order they are appended
const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

const FORBIDDEN_CHARS: [char; 4] = ['<', '>', '"', '`'];

fn has_http_scheme(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Prefix `https://` when the (trimmed) value has no http(s) scheme.
/// Blank values are returned untouched.
pub fn normalize_base_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || has_http_scheme(trimmed) {
        return value.to_string();
    }
    format!("https://{}", trimmed)
}

/// Build the tagged URL for a row.
///
/// Returns an empty string when the base URL is empty or cannot be parsed;
/// callers treat that as "no URL available".
pub fn build_utm_url(row: &Row) -> String {
    if row.base_url.is_empty() {
        return String::new();
    }

    let full = if has_http_scheme(&row.base_url) {
        row.base_url.clone()
    } else {
        format!("https://{}", row.base_url)
    };
    let Ok(mut url) = Url::parse(&full) else {
        return String::new();
    };

    let values = [
        row.source.as_str(),
        row.medium.as_str(),
        row.campaign.as_str(),
        row.term.as_str(),
        row.content.as_str(),
    ];
    let updates: Vec<(&str, &str)> = UTM_KEYS
        .iter()
        .zip(values)
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (*k, v))
        .collect();
    if updates.is_empty() {
        return url.to_string();
    }

    // Keys already in the base URL are replaced in place, like URLSearchParams::set.
    let existing: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut pairs: Vec<(String, String)> = Vec::with_capacity(existing.len() + updates.len());
    let mut applied = [false; UTM_KEYS.len()];
    for (key, value) in existing {
        match updates.iter().position(|(k, _)| *k == key) {
            Some(i) if applied[i] => continue,
            Some(i) => {
                applied[i] = true;
                pairs.push((key, updates[i].1.to_string()));
            }
            None => pairs.push((key, value)),
        }
    }
    for (i, (key, value)) in updates.iter().enumerate() {
        if !applied[i] {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// Whether the fields needed for a meaningful campaign link are filled in
pub fn has_required_fields(row: &Row) -> bool {
    !row.base_url.is_empty()
        && !row.source.is_empty()
        && !row.medium.is_empty()
        && !row.campaign.is_empty()
}

/// Reason a base URL was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlProblem {
    Whitespace,
    Scheme,
    Malformed,
    MissingHost,
    HostWithoutDot,
    HostTooShort,
    ForbiddenCharacter,
}

impl fmt::Display for UrlProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            UrlProblem::Whitespace => "URL contains whitespace",
            UrlProblem::Scheme => "Only http:// and https:// URLs are allowed",
            UrlProblem::Malformed => "Not a valid URL",
            UrlProblem::MissingHost => "Enter a domain",
            UrlProblem::HostWithoutDot => "Not a valid domain (e.g. example.com)",
            UrlProblem::HostTooShort => "Domain is too short",
            UrlProblem::ForbiddenCharacter => "URL contains characters that are not allowed",
        };
        f.write_str(msg)
    }
}

/// Validate a base URL as typed by the user. Blank input is valid.
pub fn validate_url(url: &str) -> Result<(), UrlProblem> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if url.chars().any(char::is_whitespace) {
        return Err(UrlProblem::Whitespace);
    }

    let full = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        if let Some((scheme, _)) = trimmed.split_once("://") {
            let looks_like_scheme = !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if looks_like_scheme {
                return Err(UrlProblem::Scheme);
            }
        }
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&full).map_err(|_| UrlProblem::Malformed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlProblem::Scheme);
    }
    let host = parsed.host_str().unwrap_or("");
    if host.is_empty() {
        return Err(UrlProblem::MissingHost);
    }
    if !host.contains('.') {
        return Err(UrlProblem::HostWithoutDot);
    }
    if host.chars().count() < 3 {
        return Err(UrlProblem::HostTooShort);
    }
    if trimmed.contains(FORBIDDEN_CHARS) {
        return Err(UrlProblem::ForbiddenCharacter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(base_url: &str, params: [&str; 5]) -> Row {
        let mut row = Row::new_empty();
        row.base_url = base_url.to_string();
        row.source = params[0].to_string();
        row.medium = params[1].to_string();
        row.campaign = params[2].to_string();
        row.term = params[3].to_string();
        row.content = params[4].to_string();
        row
    }

    #[test]
    fn test_empty_base_url_builds_nothing() {
        assert_eq!(build_utm_url(&row("", ["google", "cpc", "x", "", ""])), "");
    }

    #[test]
    fn test_build_adds_protocol_and_params() {
        let r = row("example.com", ["google", "cpc", "spring_sale", "", ""]);
        assert_eq!(
            build_utm_url(&r),
            "https://example.com/?utm_source=google&utm_medium=cpc&utm_campaign=spring_sale"
        );
    }

    #[test]
    fn test_build_without_params_keeps_plain_url() {
        assert_eq!(
            build_utm_url(&row("http://example.com/path", ["", "", "", "", ""])),
            "http://example.com/path"
        );
    }

    #[test]
    fn test_build_encodes_and_replaces_existing_keys() {
        let r = row(
            "https://example.com/?a=1&utm_source=old",
            ["news letter", "", "", "", ""],
        );
        assert_eq!(
            build_utm_url(&r),
            "https://example.com/?a=1&utm_source=news+letter"
        );
    }

    #[test]
    fn test_build_unparseable_is_empty() {
        assert_eq!(build_utm_url(&row("exa mple.com", ["g", "", "", "", ""])), "");
        assert_eq!(build_utm_url(&row("https://", ["g", "", "", "", ""])), "");
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url(""), Ok(()));
        assert_eq!(validate_url("   "), Ok(()));
        assert_eq!(validate_url("example.com"), Ok(()));
        assert_eq!(validate_url("https://example.com/landing?x=1"), Ok(()));
        assert_eq!(validate_url("exa mple.com"), Err(UrlProblem::Whitespace));
        assert_eq!(validate_url(" example.com"), Err(UrlProblem::Whitespace));
        assert_eq!(validate_url("ftp://example.com"), Err(UrlProblem::Scheme));
        assert_eq!(validate_url("localhost"), Err(UrlProblem::HostWithoutDot));
        assert_eq!(
            validate_url("example.com/<script>"),
            Err(UrlProblem::ForbiddenCharacter)
        );
    }

    #[test]
    fn test_validate_host_length_boundary() {
        assert_eq!(validate_url("a.b"), Ok(()));
        assert_eq!(validate_url("ab"), Err(UrlProblem::HostWithoutDot));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("example.com"), "https://example.com");
        assert_eq!(normalize_base_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_has_required_fields() {
        assert!(has_required_fields(&row("a.com", ["g", "cpc", "c", "", ""])));
        assert!(!has_required_fields(&row("a.com", ["g", "", "c", "", ""])));
    }
}
