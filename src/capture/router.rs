use crate::slots::{AttributeMap, CapturedMedia};

use super::cleaner::{clean, is_valid};
use super::normalizer::{canonical_attribute, normalize_key, CanonicalAttribute};
use super::raw::RawCapture;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Slot-ready data distilled from one [`RawCapture`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedCapture {
    pub attributes: AttributeMap,
    pub media: CapturedMedia,
}

impl RoutedCapture {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.media.is_empty()
    }
}

/// Normalize every variant key, keep only values that pass validation, and
/// fall back to the specifications table for `Style` when the variant
/// selector did not carry one.
pub fn route_capture(capture: &RawCapture) -> RoutedCapture {
    let mut attributes = AttributeMap::new();

    for (raw_key, raw_value) in &capture.variants {
        let key = normalize_key(raw_key);
        if !is_valid(raw_value) {
            log_debug!("discarding {key} value {raw_value:?} from capture");
            continue;
        }
        attributes.entry(key).or_insert_with(|| clean(raw_value));
    }

    let style_key = CanonicalAttribute::Style.as_str();
    if !attributes.contains_key(style_key) {
        let documented_style = capture
            .specifications
            .iter()
            .filter(|(key, _)| canonical_attribute(key) == Some(CanonicalAttribute::Style))
            .find(|(_, value)| is_valid(value))
            .map(|(_, value)| clean(value));
        if let Some(style) = documented_style {
            attributes.insert(style_key.to_string(), style);
        }
    }

    RoutedCapture {
        attributes,
        media: CapturedMedia {
            image_url: capture.image.clone(),
            title: capture.title.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(variants: &[(&str, &str)], specifications: &[(&str, &str)]) -> RawCapture {
        RawCapture {
            variants: variants
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            specifications: specifications
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..RawCapture::default()
        }
    }

    #[test]
    fn keeps_clean_values_under_canonical_keys() {
        let routed = route_capture(&capture(
            &[
                ("colour", "Red"),
                ("size", "12 items in cart"),
                ("configuration", "Lightning 1 option from $587.49"),
                ("band_width", "Slim"),
            ],
            &[],
        ));

        let keys: Vec<&str> = routed.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Band Width", "Color", "Set"]);
        assert_eq!(routed.attributes["Set"], "Lightning");
    }

    #[test]
    fn first_valid_value_wins_when_keys_collide() {
        let routed = route_capture(&capture(
            &[
                ("color", "Midnight"),
                ("color_name", "Out of Stock"),
                ("strap_color", "Tan"),
            ],
            &[],
        ));
        assert_eq!(routed.attributes.len(), 1);
        assert_eq!(routed.attributes["Color"], "Midnight");
    }

    #[test]
    fn style_falls_back_to_specifications() {
        let routed = route_capture(&capture(
            &[("color", "Black")],
            &[("Headphone Style", "Over-Ear"), ("Weight", "250 g")],
        ));
        assert_eq!(routed.attributes["Style"], "Over-Ear");
        assert!(!routed.attributes.contains_key("Weight"));
    }

    #[test]
    fn variant_style_wins_over_specifications() {
        let routed = route_capture(&capture(
            &[("style_name", "Sport")],
            &[("Style", "Classic")],
        ));
        assert_eq!(routed.attributes["Style"], "Sport");
    }

    #[test]
    fn media_only_capture_still_routes_media() {
        let routed = route_capture(&RawCapture {
            image: Some("http://img".into()),
            title: Some("Desk Lamp".into()),
            ..RawCapture::default()
        });
        assert!(routed.attributes.is_empty());
        assert_eq!(routed.media.image_url.as_deref(), Some("http://img"));
        assert!(!routed.is_empty());
    }
}
