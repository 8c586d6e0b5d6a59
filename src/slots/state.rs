use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SlotError;

/// Canonical attribute name (or a custom key) to cleaned value.
pub type AttributeMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum SlotId {
    Ideal,
    Alternative,
    OkToBuy,
}

impl SlotId {
    /// Priority order, highest first.
    pub const ALL: [SlotId; 3] = [SlotId::Ideal, SlotId::Alternative, SlotId::OkToBuy];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotId::Ideal => "Ideal",
            SlotId::Alternative => "Alternative",
            SlotId::OkToBuy => "OkToBuy",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            SlotId::Ideal => 0,
            SlotId::Alternative => 1,
            SlotId::OkToBuy => 2,
        }
    }

    /// Accepts the serialized names plus a few spellings users type.
    pub fn parse(value: &str) -> Option<SlotId> {
        let compact: String = value
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "ideal" => Some(SlotId::Ideal),
            "alternative" | "alt" => Some(SlotId::Alternative),
            "oktobuy" | "nicetohave" => Some(SlotId::OkToBuy),
            _ => None,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-entered attribute outside the canonical vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapturedMedia {
    pub image_url: Option<String>,
    pub title: Option<String>,
}

impl CapturedMedia {
    pub fn is_empty(&self) -> bool {
        self.image_url.is_none() && self.title.is_none()
    }
}

/// One preference tier.
///
/// `Inactive → Active → Active(armed) → Active`, and back to `Inactive` on
/// `deactivate`. An inactive slot always holds no data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSlot {
    pub id: SlotId,
    pub active: bool,
    pub attributes: AttributeMap,
    pub custom_fields: Vec<CustomField>,
    pub notes: String,
    pub media: CapturedMedia,
    pub armed: bool,
}

impl PreferenceSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            active: false,
            attributes: AttributeMap::new(),
            custom_fields: Vec::new(),
            notes: String::new(),
            media: CapturedMedia::default(),
            armed: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Become the capture target. Captured attributes and media from any earlier
    /// capture are dropped; notes and custom fields are the user's and stay.
    pub fn arm(&mut self) {
        self.attributes.clear();
        self.media = CapturedMedia::default();
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Accept routed capture data. A slot that is no longer armed rejects the
    /// delivery and stays untouched.
    pub fn receive_capture(
        &mut self,
        attributes: AttributeMap,
        media: CapturedMedia,
    ) -> Result<(), SlotError> {
        if !self.armed {
            return Err(SlotError::NotArmed(self.id));
        }

        self.attributes = attributes;
        if media.image_url.is_some() {
            self.media.image_url = media.image_url;
        }
        if media.title.is_some() {
            self.media.title = media.title;
        }
        self.active = true;
        self.armed = false;
        Ok(())
    }

    pub fn edit_attribute(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        self.ensure_active()?;
        let key = non_empty(key, "attribute name")?;
        let value = non_empty(value, "attribute value")?;
        self.attributes.insert(key, value);
        Ok(())
    }

    pub fn delete_attribute(&mut self, key: &str) -> Result<bool, SlotError> {
        self.ensure_active()?;
        Ok(self.attributes.remove(key.trim()).is_some())
    }

    /// Returns the new field's id.
    pub fn add_custom_field(&mut self, key: &str, value: &str) -> Result<String, SlotError> {
        self.ensure_active()?;
        let field = CustomField {
            id: Uuid::new_v4().to_string(),
            key: non_empty(key, "field name")?,
            value: non_empty(value, "field value")?,
        };
        let id = field.id.clone();
        self.custom_fields.push(field);
        Ok(id)
    }

    pub fn update_custom_field(&mut self, id: &str, key: &str, value: &str) -> Result<(), SlotError> {
        self.ensure_active()?;
        let key = non_empty(key, "field name")?;
        let value = non_empty(value, "field value")?;
        let field = self
            .custom_fields
            .iter_mut()
            .find(|field| field.id == id)
            .ok_or_else(|| SlotError::UnknownCustomField(id.to_string()))?;
        field.key = key;
        field.value = value;
        Ok(())
    }

    pub fn remove_custom_field(&mut self, id: &str) -> Result<bool, SlotError> {
        self.ensure_active()?;
        let before = self.custom_fields.len();
        self.custom_fields.retain(|field| field.id != id);
        Ok(self.custom_fields.len() != before)
    }

    pub fn set_notes(&mut self, text: &str) -> Result<(), SlotError> {
        self.ensure_active()?;
        self.notes = text.trim().to_string();
        Ok(())
    }

    pub fn deactivate(&mut self) {
        *self = Self::new(self.id);
    }

    fn ensure_active(&self) -> Result<(), SlotError> {
        if self.active {
            Ok(())
        } else {
            Err(SlotError::Inactive(self.id))
        }
    }
}

fn non_empty(text: &str, what: &'static str) -> Result<String, SlotError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(SlotError::EmptyInput(what))
    } else {
        Ok(trimmed.to_string())
    }
}
