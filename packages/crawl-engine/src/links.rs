//! Outbound link extraction.
//!
//! Pure function over already-fetched HTML: anchor `href` values resolved
//! against the page URL.

use scraper::{Html, Selector};
use url::Url;

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Extract absolute http(s) links from the anchors in `html`.
///
/// Relative hrefs are joined onto `base`. Non-navigable schemes and
/// anything that does not resolve to http(s) are dropped. Order follows the
/// document; duplicates are kept for the caller's visited check.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let anchor_selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let document = Html::parse_document(html);

    document
        .select(&anchor_selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
        })
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .collect()
}
