use serde::{Deserialize, Serialize};

use super::{PreferenceSlot, SlotId};

/// The three preference tiers of one wishlist item, always in priority order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSlots {
    slots: [PreferenceSlot; 3],
}

impl Default for PreferenceSlots {
    fn default() -> Self {
        Self {
            slots: SlotId::ALL.map(PreferenceSlot::new),
        }
    }
}

impl PreferenceSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SlotId) -> &PreferenceSlot {
        &self.slots[id.index()]
    }

    pub fn get_mut(&mut self, id: SlotId) -> &mut PreferenceSlot {
        &mut self.slots[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreferenceSlot> {
        self.slots.iter()
    }

    /// The slot currently waiting for a capture, if any.
    pub fn armed(&self) -> Option<SlotId> {
        self.slots.iter().find(|slot| slot.armed).map(|slot| slot.id)
    }

    /// Active slots, highest priority first.
    pub fn active_ids(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|slot| slot.active)
            .map(|slot| slot.id)
            .collect()
    }
}
