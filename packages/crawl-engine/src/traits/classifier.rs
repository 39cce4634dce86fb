//! Product page classification.
//!
//! Classification is a pure function of the URL list: no state, no I/O, and
//! the output keeps the input order.

use std::sync::LazyLock;

use regex::Regex;

/// Picks out the URLs that look like product detail pages.
pub trait Classifier: Send + Sync {
    fn classify(&self, urls: &[String]) -> Vec<String>;
}

/// URL path patterns that mark product detail pages on common storefronts.
const PRODUCT_PATTERNS: &[&str] = &[
    // /p/<id>
    r"/p/[\w-]+",
    r"/product/[\w-]+",
    r"/item/[\w-]+",
    // category/subcategory/p/<id>
    r"/[\w-]+/[\w-]+/p/[\w-]+",
    // product detail pages
    r"/pd/[\w-]+",
    // numeric id pages
    r"/[\w-]+/\d+\.html",
    r"/products?/[\w-]{6,}",
    // Magento
    r"/catalog/product/view/id/\d+",
    // ASIN
    r"/dp/[A-Z0-9]{10}",
    r"-pid-\d+",
];

static PRODUCT_URL: LazyLock<Regex> = LazyLock::new(|| {
    let combined = PRODUCT_PATTERNS
        .iter()
        .map(|p| format!("({p})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){combined}")).expect("product URL patterns are valid")
});

/// Heuristic classifier matching well-known product URL shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductUrlClassifier;

impl ProductUrlClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Whether a single URL looks like a product page.
    pub fn is_product_url(url: &str) -> bool {
        PRODUCT_URL.is_match(url)
    }
}

impl Classifier for ProductUrlClassifier {
    fn classify(&self, urls: &[String]) -> Vec<String> {
        urls.iter()
            .filter(|url| Self::is_product_url(url))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_product_patterns() {
        let products = [
            "https://shop.test/p/blue-shirt",
            "https://shop.test/product/abc-123",
            "https://shop.test/item/42",
            "https://shop.test/men/shirts/p/itm123",
            "https://shop.test/pd/widget",
            "https://shop.test/phones/12345.html",
            "https://shop.test/products/summer-dress",
            "https://shop.test/catalog/product/view/id/987",
            "https://www.amazon.test/Some-Thing/dp/B08N5WRWNW",
            "https://shop.test/red-shoes-pid-5521",
        ];

        for url in products {
            assert!(ProductUrlClassifier::is_product_url(url), "{url}");
        }
    }

    #[test]
    fn test_rejects_non_product_pages() {
        let others = [
            "https://shop.test/",
            "https://shop.test/about",
            "https://shop.test/products/abc",
            "https://shop.test/dp/short",
            "https://shop.test/blog/2024/summer",
        ];

        for url in others {
            assert!(!ProductUrlClassifier::is_product_url(url), "{url}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert!(ProductUrlClassifier::is_product_url(
            "https://SHOP.TEST/PRODUCT/Widget"
        ));
        assert!(ProductUrlClassifier::is_product_url(
            "https://amazon.test/dp/b08n5wrwnw"
        ));
    }

    #[test]
    fn test_classify_keeps_input_order() {
        let classifier = ProductUrlClassifier::new();
        let input = urls(&[
            "https://shop.test/item/b",
            "https://shop.test/about",
            "https://shop.test/item/a",
        ]);

        assert_eq!(
            classifier.classify(&input),
            urls(&["https://shop.test/item/b", "https://shop.test/item/a"])
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let classifier = ProductUrlClassifier::new();
        let input = urls(&[
            "https://shop.test/p/one",
            "https://shop.test/contact",
            "https://shop.test/x-pid-77",
        ]);

        let once = classifier.classify(&input);
        let twice = classifier.classify(&once);
        assert_eq!(once, twice);

        // No hidden state between calls
        assert_eq!(classifier.classify(&input), once);
    }
}
