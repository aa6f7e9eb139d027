//! Link extraction from excerpt markup

use regex::Regex;
use std::sync::LazyLock;

static RE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
});
static RE_BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhttps?://[^\s"'<>()\[\]]+"#).unwrap());

/// Second-level labels that act as part of a public suffix (`example.co.uk`)
const GENERIC_SECOND_LEVEL: &[&str] = &["co", "com", "org", "net", "ac", "gov", "edu"];

/// Every link target in `text`: href attributes first, then bare URLs
///
/// Duplicates are dropped; first occurrence wins.
pub fn extract_links(text: &str) -> Vec<String> {
    let hrefs = RE_HREF.captures_iter(text).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim().to_string())
    });
    let bare = RE_BARE_URL
        .find_iter(text)
        .map(|m| m.as_str().to_string());

    let mut links: Vec<String> = Vec::new();
    for link in hrefs.chain(bare) {
        if !link.is_empty() && !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

/// Lowercased host of an absolute URL, if it has one
pub fn host_of(link: &str) -> Option<String> {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_end_matches('.').to_lowercase()))
        .filter(|h| !h.is_empty())
}

/// The registrable part of a host name
///
/// Keeps the last two labels, or the last three when the second-level
/// label is a generic one such as `co` in `example.co.uk`.
pub fn registrable_domain(host: &str) -> String {
    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }

    let second_level = labels[labels.len() - 2];
    let keep = if GENERIC_SECOND_LEVEL.contains(&second_level) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_href() {
        let links = extract_links(r#"<a href="http://chinaaircatering.com">spam</a>"#);
        assert_eq!(links, vec!["http://chinaaircatering.com"]);
    }

    #[test]
    fn test_extract_quoting_styles_and_bare_urls() {
        let text = r#"<a HREF='http://a.example/x'>a</a> <a href=http://b.example>b</a>
            see https://c.example/path?q=1 and http://a.example/x again"#;
        let links = extract_links(text);

        assert_eq!(
            links,
            vec![
                "http://a.example/x",
                "http://b.example",
                "https://c.example/path?q=1",
            ]
        );
    }

    #[test]
    fn test_plain_text_has_no_links() {
        assert!(extract_links("bland").is_empty());
        assert!(extract_links("").is_empty());
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("http://WWW.Example.com/path"), Some("www.example.com".to_string()));
        assert_eq!(host_of("/relative/path"), None);
        assert_eq!(host_of("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("www.chinaircatering.com"), "chinaircatering.com");
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("shop.example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }
}
