//! Submission-time assembly of the wishlist payload.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capture::{clean, is_valid};
use crate::error::CommitError;
use crate::slots::{AttributeMap, CustomField, PreferenceSlot, PreferenceSlots, SlotId};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Product-level label the wishlist API stores next to the item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PreferenceLabel {
    Ideal,
    Alternative,
    #[serde(rename = "Nice to have")]
    NiceToHave,
}

impl PreferenceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceLabel::Ideal => "Ideal",
            PreferenceLabel::Alternative => "Alternative",
            PreferenceLabel::NiceToHave => "Nice to have",
        }
    }
}

impl From<SlotId> for PreferenceLabel {
    fn from(slot: SlotId) -> Self {
        match slot {
            SlotId::Ideal => PreferenceLabel::Ideal,
            SlotId::Alternative => PreferenceLabel::Alternative,
            SlotId::OkToBuy => PreferenceLabel::NiceToHave,
        }
    }
}

impl fmt::Display for PreferenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the item being added, supplied by the surrounding workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub url: Option<String>,
    pub price: Option<f64>,
}

/// What one active slot contributes to the wishlist entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotPreference {
    pub image: Option<String>,
    pub title: Option<String>,
    pub attributes: AttributeMap,
    pub custom_fields: Vec<CustomField>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    pub product: ProductDraft,
    pub primary_preference: PreferenceLabel,
    pub preferences: BTreeMap<SlotId, SlotPreference>,
}

impl CommitPayload {
    /// The per-slot structure as the opaque JSON blob the wishlist API stores.
    pub fn preferences_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.preferences)
    }
}

/// Validate the slots and assemble the payload. The primary preference is the
/// first active slot in `Ideal > Alternative > OkToBuy` order. Attribute values
/// are re-cleaned here because manual edits bypass the capture pipeline.
pub fn build_payload(
    slots: &PreferenceSlots,
    product: ProductDraft,
) -> Result<CommitPayload, CommitError> {
    let active = slots.active_ids();
    let primary = *active.first().ok_or(CommitError::NoPreferenceSelected)?;

    let preferences = active
        .into_iter()
        .map(|id| (id, slot_preference(slots.get(id))))
        .collect();

    Ok(CommitPayload {
        product,
        primary_preference: primary.into(),
        preferences,
    })
}

fn slot_preference(slot: &PreferenceSlot) -> SlotPreference {
    let attributes = slot
        .attributes
        .iter()
        .filter_map(|(key, value)| {
            if is_valid(value) {
                Some((key.clone(), clean(value)))
            } else {
                log_debug!("dropping {key} value {value:?} from {} at commit", slot.id);
                None
            }
        })
        .collect();

    SlotPreference {
        image: slot.media.image_url.clone(),
        title: slot.media.title.clone(),
        attributes,
        custom_fields: slot.custom_fields.clone(),
        notes: slot.notes.clone(),
    }
}
