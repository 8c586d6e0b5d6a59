//! Scraped-value hygiene.
//!
//! Retailer pages leak pricing, rating and cart chrome into the text next to a
//! variant selector. [`clean`] strips the pricing suffixes that ride along with
//! otherwise good values; [`is_valid`] rejects anything that still looks like
//! page noise. Rejecting a legitimate short value is acceptable; accepting
//! noise is not.

use once_cell::sync::Lazy;
use regex::Regex;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const MAX_VALUE_CHARS: usize = 100;
const MAX_VALUE_WORDS: usize = 5;

/// Trailing noise, applied in this order.
const SUFFIX_PATTERNS: &[&str] = &[
    // "Lightning 1 option from $587.49"
    r"(?i)\s*\d+\s+options?\s+from\s+\$\s?[\d,]+(?:\.\d+)?\s*$",
    // "Black from $24.99"
    r"(?i)\s*\bfrom\s+\$\s?[\d,]+(?:\.\d+)?\s*$",
    // "Large $19.99"
    r"(?i)\s*\$\s?[\d,]+(?:\.\d+)?\s*$",
    // "Blue 3 options"
    r"(?i)\s*\b\d+\s+options?\s*$",
];

const NOISE_PATTERNS: &[&str] = &[
    // review and rating chrome
    r"(?i)\bout\s+of\s+\d+(?:\.\d+)?\s+stars?\b",
    r"(?i)^\d+(?:\.\d+)?\s*stars?$",
    r"(?i)\b[\d,.]+k?\s+(?:global\s+)?(?:ratings?|reviews?)\b",
    r"(?i)\bcustomer\s+reviews?\b",
    r"(?i)\b(?:write|read)\s+(?:a\s+)?reviews?\b",
    r"(?i)\bbest\s*seller\b",
    r"(?i)#\d+\s+in\b",
    r"(?i)\b\d+\+?\s+bought\b",
    // cart and page affordances
    r"(?i)\bitems?\s+in\s+(?:your\s+)?(?:cart|bag|basket)\b",
    r"(?i)\badd(?:ed)?\s+to\s+(?:cart|bag|basket|list|wish\s*list|registry)\b",
    r"(?i)\bbuy\s+(?:it\s+)?now\b",
    r"(?i)\b(?:in|out\s+of)\s+stock\b",
    r"(?i)\bonly\s+\d+\s+left\b",
    r"(?i)\bfree\s+(?:shipping|delivery|returns?)\b",
    r"(?i)\b(?:click|tap)\s+(?:to|here)\b",
    r"(?i)\bsee\s+(?:more|all|less|details|options)\b",
    r"(?i)\bshow\s+(?:more|less)\b",
    r"(?i)\b(?:qty|quantity)\b",
    r"(?i)\bvisit\s+the\b.*\bstore\b",
    r"(?i)\bsave\s+\d+%|\b\d+%\s+off\b",
    // serialisation and placeholder artifacts
    r"^\s*[\[{].*[\]}]\s*$",
    r"(?i)\[object\s+object\]",
    r"(?i)^(?:undefined|null|nan|none|n/?a|default|select|choose(?:\s+an?)?(?:\s+option)?)$",
    r"\$\{.*\}|\{\{.*\}\}",
    // selection echo text
    r"(?i)\bselected\s+(?:colou?r|style|size|pattern|option|configuration)\b",
    r"(?i)^(?:colou?r|style|size|pattern|configuration)\s*(?::|is\b)",
    r"(?i)\bcurrently\s+(?:selected|unavailable)\b",
];

static SUFFIXES: Lazy<Vec<Regex>> = Lazy::new(|| compile_patterns(SUFFIX_PATTERNS));
static NOISE: Lazy<Vec<Regex>> = Lazy::new(|| compile_patterns(NOISE_PATTERNS));

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log_warn!("skipping value pattern {pattern:?}: {err}");
                None
            }
        })
        .collect()
}

/// Strip pricing and option-count suffixes, trimming after each rule.
/// Repeats the rule pass until nothing changes, so `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let mut current = raw.trim().to_string();
    loop {
        let mut next = current.clone();
        for suffix in SUFFIXES.iter() {
            next = suffix.replace(&next, "").trim().to_string();
        }
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Whether a scraped value is safe to show and persist. The value is judged in
/// its cleaned form.
pub fn is_valid(raw: &str) -> bool {
    let value = clean(raw);

    if value.is_empty() || value.chars().count() > MAX_VALUE_CHARS {
        return false;
    }

    if !value.chars().any(char::is_alphabetic) {
        return false;
    }

    if value.split_whitespace().count() > MAX_VALUE_WORDS {
        return false;
    }

    !NOISE.iter().any(|pattern| pattern.is_match(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        assert_eq!(SUFFIXES.len(), SUFFIX_PATTERNS.len());
        assert_eq!(NOISE.len(), NOISE_PATTERNS.len());
    }

    #[test]
    fn clean_strips_price_and_option_suffixes() {
        assert_eq!(clean("Lightning 1 option from $587.49"), "Lightning");
        assert_eq!(clean("Black from $24.99"), "Black");
        assert_eq!(clean("Large $1,019.00"), "Large");
        assert_eq!(clean("Blue 3 options"), "Blue");
        assert_eq!(clean("  Midnight  "), "Midnight");
        assert_eq!(clean("Midnight"), "Midnight");
    }

    #[test]
    fn clean_is_idempotent() {
        let samples = [
            "Lightning 1 option from $587.49",
            "Red 2 options 3 options",
            "Rose Gold $5 $6",
            "USB-C",
            "",
            "$12.00",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn keeps_ordinary_variant_values() {
        for value in [
            "Red",
            "Midnight",
            "Space Gray",
            "Over-Ear",
            "128GB",
            "Large",
            "Lightning 1 option from $587.49",
            "Stainless Steel",
        ] {
            assert!(is_valid(value), "should accept {value:?}");
        }
    }

    #[test]
    fn rejects_rating_and_review_chrome() {
        for value in [
            "4.5 out of 5 stars",
            "4.7 stars",
            "1,234 ratings",
            "Customer Reviews",
            "Write a review",
            "Best Seller",
            "#1 in Headphones",
        ] {
            assert!(!is_valid(value), "should reject {value:?}");
        }
    }

    #[test]
    fn rejects_cart_and_page_affordances() {
        for value in [
            "12 items in cart",
            "Add to Cart",
            "Buy Now",
            "In Stock",
            "Only 3 left",
            "Free Shipping",
            "See more",
            "Qty",
            "Save 20%",
        ] {
            assert!(!is_valid(value), "should reject {value:?}");
        }
    }

    #[test]
    fn rejects_placeholders_and_selection_echo() {
        for value in [
            "[object Object]",
            "[\"Red\",\"Blue\"]",
            "undefined",
            "N/A",
            "Select",
            "${color}",
            "Selected Color is Black",
            "Color: Black",
            "Style is Classic",
        ] {
            assert!(!is_valid(value), "should reject {value:?}");
        }
    }

    #[test]
    fn rejects_structurally_implausible_values() {
        assert!(!is_valid(""));
        assert!(!is_valid("   "));
        assert!(!is_valid("12345"));
        assert!(!is_valid("$587.49"));
        assert!(!is_valid(&"a".repeat(101)));
        assert!(!is_valid("one two three four five six"));
        assert!(is_valid("one two three four five"));
    }
}
