use serde::{Deserialize, Serialize};

/// Attribute names the wishlist UI and persistence layer understand,
/// regardless of how the retailer labelled them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CanonicalAttribute {
    Style,
    Color,
    Size,
    Set,
    Brand,
    Material,
    Connectivity,
}

impl CanonicalAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalAttribute::Style => "Style",
            CanonicalAttribute::Color => "Color",
            CanonicalAttribute::Size => "Size",
            CanonicalAttribute::Set => "Set",
            CanonicalAttribute::Brand => "Brand",
            CanonicalAttribute::Material => "Material",
            CanonicalAttribute::Connectivity => "Connectivity",
        }
    }
}

enum KeyMatch {
    Contains(&'static str),
    Equals(&'static str),
}

/// First matching row wins, so colour is tested before size, size before style.
const KEY_RULES: &[(CanonicalAttribute, &[KeyMatch])] = &[
    (
        CanonicalAttribute::Color,
        &[KeyMatch::Contains("color"), KeyMatch::Contains("colour")],
    ),
    (
        CanonicalAttribute::Size,
        &[KeyMatch::Equals("formfactor"), KeyMatch::Contains("size")],
    ),
    (
        CanonicalAttribute::Style,
        &[
            KeyMatch::Contains("style"),
            KeyMatch::Contains("earplacement"),
            KeyMatch::Equals("headphonestyle"),
        ],
    ),
    (
        CanonicalAttribute::Set,
        &[
            KeyMatch::Contains("config"),
            KeyMatch::Contains("pattern"),
            KeyMatch::Equals("set"),
        ],
    ),
    (CanonicalAttribute::Brand, &[KeyMatch::Contains("brand")]),
    (CanonicalAttribute::Material, &[KeyMatch::Contains("material")]),
    (
        CanonicalAttribute::Connectivity,
        &[KeyMatch::Contains("connectivity")],
    ),
];

const FALLBACK_KEY: &str = "Option";

/// Look up the canonical attribute for a scraped key, if any rule matches.
pub fn canonical_attribute(raw_key: &str) -> Option<CanonicalAttribute> {
    let compact: String = raw_key
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.' | ':' | '/'))
        .collect::<String>()
        .to_lowercase();

    if compact.is_empty() {
        return None;
    }

    KEY_RULES.iter().find_map(|(attribute, rules)| {
        rules
            .iter()
            .any(|rule| match rule {
                KeyMatch::Contains(needle) => compact.contains(needle),
                KeyMatch::Equals(exact) => compact == *exact,
            })
            .then_some(*attribute)
    })
}

/// Map a scraped key to its canonical name. Unmapped keys keep their own
/// label, title-cased with underscores turned into spaces, so they survive as
/// custom attributes.
pub fn normalize_key(raw_key: &str) -> String {
    if let Some(attribute) = canonical_attribute(raw_key) {
        return attribute.as_str().to_string();
    }

    let spaced = raw_key.replace('_', " ");
    let titled = spaced
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");

    if titled.is_empty() {
        FALLBACK_KEY.to_string()
    } else {
        titled
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_synonyms_collapse_to_color() {
        for raw in ["colour", "Colour", "COLOR_VALUE", "color", "Strap Color", "colour-name"] {
            assert_eq!(normalize_key(raw), "Color", "key {raw}");
        }
    }

    #[test]
    fn size_matches_form_factor_and_size_substrings() {
        assert_eq!(normalize_key("formFactor"), "Size");
        assert_eq!(normalize_key("size_name"), "Size");
        assert_eq!(normalize_key("Ring Size"), "Size");
    }

    #[test]
    fn style_matches_ear_placement_and_headphone_style() {
        assert_eq!(normalize_key("earPlacement"), "Style");
        assert_eq!(normalize_key("headphoneStyle"), "Style");
        assert_eq!(normalize_key("style_name"), "Style");
    }

    #[test]
    fn set_matches_configuration_and_pattern() {
        assert_eq!(normalize_key("configuration"), "Set");
        assert_eq!(normalize_key("Pattern Name"), "Set");
        assert_eq!(normalize_key("set"), "Set");
        assert_eq!(normalize_key("SET"), "Set");
    }

    #[test]
    fn remaining_canonical_groups() {
        assert_eq!(normalize_key("brand_name"), "Brand");
        assert_eq!(normalize_key("Material Type"), "Material");
        assert_eq!(normalize_key("connectivityTechnology"), "Connectivity");
    }

    #[test]
    fn unmapped_keys_are_title_cased() {
        assert_eq!(normalize_key("band_width"), "Band Width");
        assert_eq!(normalize_key("capacity"), "Capacity");
        assert_eq!(normalize_key("  scent  "), "Scent");
    }

    #[test]
    fn blank_key_still_yields_a_usable_name() {
        assert_eq!(normalize_key(""), "Option");
        assert_eq!(normalize_key("__"), "Option");
    }
}
