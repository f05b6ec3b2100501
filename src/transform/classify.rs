//! Browsing-type classification
//!
//! Each URL is bucketed into a base-domain token, the most frequent token
//! is selected (earliest first occurrence wins ties), and the token is
//! matched against fixed category lists.

use std::collections::HashMap;

use crate::models::BrowsingType;

/// Shopping sites, checked first
pub const SHOPPING_DOMAINS: &[&str] = &["amazon", "ebay", "shopify"];

/// Social media sites, checked second
pub const SOCIAL_DOMAINS: &[&str] = &["facebook", "twitter", "instagram", "linkedin", "x"];

/// News sites, checked last
pub const NEWS_DOMAINS: &[&str] = &["cnn", "bbc", "nytimes", "reuters"];

/// Token used for URLs without a usable host
pub const UNKNOWN_TOKEN: &str = "unknown";

/// Extract the base-domain token of a URL
///
/// `https://www.shop.amazon.co.uk/x` → `co`, `https://twitter.com/a` → `twitter`,
/// `localhost:8080/x` → `localhost:8080`. URLs with an empty host map to
/// [`UNKNOWN_TOKEN`].
pub fn extract_base_domain(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split('/').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let token = match host.rsplitn(3, '.').collect::<Vec<_>>().as_slice() {
        [_, second_to_last, ..] => *second_to_last,
        _ => host,
    };

    if token.is_empty() { UNKNOWN_TOKEN } else { token }
}

/// Most frequent base-domain token, ties broken by first occurrence
pub fn most_common_domain<S: AsRef<str>>(urls: &[S]) -> Option<&str> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for url in urls {
        let token = extract_base_domain(url.as_ref());
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for token in order {
        let count = counts[token];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((token, count));
        }
    }
    best.map(|(token, _)| token)
}

/// Classify a base-domain token by case-sensitive substring match
pub fn categorize(token: &str) -> BrowsingType {
    let matches = |list: &[&str]| list.iter().any(|candidate| token.contains(candidate));

    if matches(SHOPPING_DOMAINS) {
        BrowsingType::Shopping
    } else if matches(SOCIAL_DOMAINS) {
        BrowsingType::SocialMedia
    } else if matches(NEWS_DOMAINS) {
        BrowsingType::News
    } else {
        BrowsingType::General
    }
}

/// Determine the browsing type of a URL list
///
/// Returns [`BrowsingType::Unknown`] for an empty list.
pub fn determine_browsing_type<S: AsRef<str>>(urls: &[S]) -> BrowsingType {
    match most_common_domain(urls) {
        Some(token) => categorize(token),
        None => BrowsingType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_base_domain() {
        assert_eq!(extract_base_domain("https://www.amazon.com/x"), "amazon");
        assert_eq!(extract_base_domain("http://news.bbc.co.uk/a/b"), "co");
        assert_eq!(extract_base_domain("twitter.com/home"), "twitter");
        assert_eq!(extract_base_domain("https://localhost/"), "localhost");
        assert_eq!(extract_base_domain("https://example.com:8443/p"), "example");
    }

    #[test]
    fn test_extract_base_domain_malformed() {
        assert_eq!(extract_base_domain(""), UNKNOWN_TOKEN);
        assert_eq!(extract_base_domain("https:///path"), UNKNOWN_TOKEN);
        assert_eq!(extract_base_domain("https://www./x"), UNKNOWN_TOKEN);
        assert_eq!(extract_base_domain("https://a..com"), UNKNOWN_TOKEN);
    }

    #[test]
    fn test_empty_list_is_unknown() {
        let urls: [&str; 0] = [];
        assert_eq!(determine_browsing_type(&urls), BrowsingType::Unknown);
    }

    #[test]
    fn test_single_shopping_url() {
        assert_eq!(
            determine_browsing_type(&["https://www.amazon.com/x"]),
            BrowsingType::Shopping
        );
    }

    #[test]
    fn test_frequency_beats_category_priority() {
        let urls = [
            "https://twitter.com/a",
            "https://twitter.com/b",
            "https://cnn.com/c",
        ];
        assert_eq!(determine_browsing_type(&urls), BrowsingType::SocialMedia);
    }

    #[test]
    fn test_tie_broken_by_first_occurrence() {
        let urls = [
            "https://cnn.com/1",
            "https://amazon.com/1",
            "https://amazon.com/2",
            "https://cnn.com/2",
        ];
        assert_eq!(most_common_domain(&urls), Some("cnn"));
        assert_eq!(determine_browsing_type(&urls), BrowsingType::News);
    }

    #[test]
    fn test_malformed_urls_are_counted() {
        let urls = ["", "not a url", "https://ebay.com/x"];
        // "" and "not a url" map to "unknown" and "not a url" respectively
        assert_eq!(most_common_domain(&urls), Some(UNKNOWN_TOKEN));
        assert_eq!(determine_browsing_type(&urls), BrowsingType::General);

        let urls = ["", "https:///x", "https://ebay.com/x"];
        assert_eq!(most_common_domain(&urls), Some(UNKNOWN_TOKEN));
    }

    #[test]
    fn test_categorize_priority_and_case() {
        assert_eq!(categorize("shopify"), BrowsingType::Shopping);
        assert_eq!(categorize("nytimes"), BrowsingType::News);
        assert_eq!(categorize("wikipedia"), BrowsingType::General);
        assert_eq!(categorize("Amazon"), BrowsingType::General);
        // substring matching: single-letter "x" matches any token containing it
        assert_eq!(categorize("netflix"), BrowsingType::SocialMedia);
    }
}
