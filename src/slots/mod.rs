pub mod board;
pub mod state;

pub use board::PreferenceSlots;
pub use state::{AttributeMap, CapturedMedia, CustomField, PreferenceSlot, SlotId};
