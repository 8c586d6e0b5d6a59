pub mod controller;
pub mod loop_worker;
pub mod session;

pub use controller::{DeliveryOutcome, SyncCoordinator, SyncSnapshot};
pub use session::SyncSession;
