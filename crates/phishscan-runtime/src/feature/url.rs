//! Lexical URL splitting
//!
//! Splits a raw URL string into host, subdomain, registrable domain label and
//! public suffix without validating it as a URL. Anything a browser would
//! reject, spaces and control characters included, is still split on a
//! best-effort basis; only unbalanced IPv6 brackets are an error.

use super::suffix::SuffixList;
use phishscan_core::ExtractionError;

/// Host components of a URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    /// Host with userinfo, port, brackets and trailing dot removed
    pub host: String,

    /// Labels left of the registrable domain, joined with '.'
    pub subdomain: String,

    /// Registrable domain label (the label right before the suffix)
    pub domain: String,

    /// Public suffix, empty when no suffix rule matched
    pub suffix: String,
}

impl UrlParts {
    /// Split `url` into host components
    pub fn parse(url: &str, suffixes: &SuffixList) -> Result<Self, ExtractionError> {
        if url.trim().is_empty() {
            return Err(ExtractionError::EmptyUrl);
        }

        let host = Self::host_of(url)?;

        if is_dotted_quad(&host) || host.contains(':') {
            // IPv4 and IPv6 literals have no suffix or subdomain
            return Ok(Self {
                domain: host.clone(),
                host,
                ..Default::default()
            });
        }

        let labels: Vec<&str> = host.split('.').collect();
        let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
        let suffix_index = suffixes.suffix_index(&lowered);

        if suffix_index == 0 {
            return Ok(Self {
                suffix: host.clone(),
                host,
                ..Default::default()
            });
        }

        Ok(Self {
            subdomain: labels[..suffix_index - 1].join("."),
            domain: labels[suffix_index - 1].to_string(),
            suffix: labels[suffix_index..].join("."),
            host,
        })
    }

    /// Number of dot-separated labels in the subdomain
    pub fn subdomain_depth(&self) -> usize {
        if self.subdomain.is_empty() {
            0
        } else {
            self.subdomain.split('.').count()
        }
    }

    /// Extract the bare host from the authority component
    fn host_of(url: &str) -> Result<String, ExtractionError> {
        let rest = strip_scheme(url.trim());

        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();

        let after_userinfo = match authority.rfind('@') {
            Some(pos) => &authority[pos + 1..],
            None => authority,
        };

        if let Some(bracketed) = after_userinfo.strip_prefix('[') {
            return match bracketed.split_once(']') {
                Some((address, _)) => Ok(address.to_string()),
                None => Err(ExtractionError::MalformedAuthority {
                    authority: authority.to_string(),
                    reason: "unterminated IPv6 literal".to_string(),
                }),
            };
        }

        if after_userinfo.contains(']') {
            return Err(ExtractionError::MalformedAuthority {
                authority: authority.to_string(),
                reason: "unbalanced ']'".to_string(),
            });
        }

        let host = after_userinfo.split(':').next().unwrap_or_default();
        Ok(host.trim_end_matches('.').to_string())
    }
}

/// Drop a leading `scheme://` (or bare `//`) prefix
fn strip_scheme(url: &str) -> &str {
    if let Some(rest) = url.strip_prefix("//") {
        return rest;
    }

    match url.find("://") {
        Some(pos)
            if pos > 0
                && url[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            &url[pos + 3..]
        }
        _ => url,
    }
}

/// Four dot-separated groups of ASCII digits, each at most 3 long and <= 255
fn is_dotted_quad(host: &str) -> bool {
    let groups: Vec<&str> = host.split('.').collect();
    groups.len() == 4
        && groups.iter().all(|g| {
            !g.is_empty()
                && g.len() <= 3
                && g.chars().all(|c| c.is_ascii_digit())
                && g.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> UrlParts {
        UrlParts::parse(url, &SuffixList::builtin()).unwrap()
    }

    #[test]
    fn test_simple_domain() {
        let parts = parse("https://www.example.com/login");
        assert_eq!(parts.subdomain, "www");
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "com");
        assert_eq!(parts.subdomain_depth(), 1);
    }

    #[test]
    fn test_multi_label_suffix() {
        let parts = parse("http://a.b.shop.example.co.uk/");
        assert_eq!(parts.subdomain, "a.b.shop");
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "co.uk");
        assert_eq!(parts.subdomain_depth(), 3);
    }

    #[test]
    fn test_userinfo_is_skipped() {
        let parts = parse("http://192.168.1.1@evil-bank.com/login");
        assert_eq!(parts.domain, "evil-bank");
        assert_eq!(parts.suffix, "com");
        assert_eq!(parts.subdomain, "");
    }

    #[test]
    fn test_port_and_trailing_dot() {
        let parts = parse("http://login.example.com.:8080/path");
        assert_eq!(parts.host, "login.example.com");
        assert_eq!(parts.domain, "example");
    }

    #[test]
    fn test_ip_host() {
        let parts = parse("http://10.0.0.1/admin");
        assert_eq!(parts.domain, "10.0.0.1");
        assert_eq!(parts.subdomain, "");
        assert_eq!(parts.suffix, "");
    }

    #[test]
    fn test_ipv6_host() {
        let parts = parse("http://[::1]:8080/");
        assert_eq!(parts.domain, "::1");
    }

    #[test]
    fn test_schemeless_and_unknown_suffix() {
        let parts = parse("intranet.corp.localdomain/page");
        assert_eq!(parts.suffix, "");
        assert_eq!(parts.domain, "localdomain");
        assert_eq!(parts.subdomain, "intranet.corp");
    }

    #[test]
    fn test_host_that_is_only_a_suffix() {
        let parts = parse("http://co.uk/");
        assert_eq!(parts.domain, "");
        assert_eq!(parts.suffix, "co.uk");
    }

    #[test]
    fn test_domain_case_is_preserved() {
        let parts = parse("http://PayPal-Secure.COM/");
        assert_eq!(parts.domain, "PayPal-Secure");
        assert_eq!(parts.suffix, "COM");
    }

    #[test]
    fn test_mailto_has_host_after_at() {
        let parts = parse("mailto:victim@example.org");
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "org");
    }

    #[test]
    fn test_empty_url_fails() {
        let err = UrlParts::parse("   ", &SuffixList::builtin()).unwrap_err();
        assert_eq!(err, ExtractionError::EmptyUrl);
    }

    #[test]
    fn test_unbalanced_brackets_fail() {
        let suffixes = SuffixList::builtin();
        assert!(matches!(
            UrlParts::parse("http://[::1/", &suffixes),
            Err(ExtractionError::MalformedAuthority { .. })
        ));
        assert!(matches!(
            UrlParts::parse("http://example.com]/", &suffixes),
            Err(ExtractionError::MalformedAuthority { .. })
        ));
    }

    #[test]
    fn test_whitespace_in_host_still_splits() {
        let parts = parse("http://exa mple.com/");
        assert_eq!(parts.domain, "exa mple");
        assert_eq!(parts.suffix, "com");

        let parts = parse("http://login.\tbank.com/");
        assert_eq!(parts.subdomain, "login");
        assert_eq!(parts.domain, "\tbank");
    }

    #[test]
    fn test_dotted_quad_detection() {
        assert!(is_dotted_quad("192.168.1.1"));
        assert!(!is_dotted_quad("192.168.1"));
        assert!(!is_dotted_quad("999.1.1.1"));
        assert!(!is_dotted_quad("a.b.c.d"));
    }
}
