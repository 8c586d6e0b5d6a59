pub mod capture;
pub mod commit;
pub mod error;
pub mod mailbox;
pub mod settings;
pub mod slots;
pub mod sync;
pub mod utils;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

pub use capture::{clean, is_valid, normalize_key, RawCapture};
pub use commit::{build_payload, CommitPayload, PreferenceLabel, ProductDraft};
pub use error::{CommitError, MailboxError, SlotError};
pub use mailbox::{HttpMailbox, InMemoryMailbox, MailboxClient, MailboxSource};
pub use settings::{MailboxSettings, SettingsStore, SyncSettings};
pub use slots::{AttributeMap, CapturedMedia, CustomField, PreferenceSlot, PreferenceSlots, SlotId};
pub use sync::{DeliveryOutcome, SyncCoordinator, SyncSnapshot};

const SETTINGS_ENV: &str = "VARIANT_SYNC_SETTINGS";
const SLOT_ENV: &str = "VARIANT_SYNC_SLOT";
const DEFAULT_SETTINGS_FILE: &str = "variant-sync.json";

/// Arm one slot against the configured mailbox, wait for the browser agent's
/// capture (or Ctrl-C), and print the resulting slot as JSON.
pub async fn run() -> Result<()> {
    utils::logging::init();
    info!("variant-sync starting up...");

    let settings_path = std::env::var(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let store = SettingsStore::new(settings_path)?;
    let settings = store.settings();
    if settings.mailbox.session_id.trim().is_empty() {
        return Err(anyhow!(
            "no mailbox session id configured; set mailbox.sessionId or VARIANT_SYNC_SESSION_ID"
        ));
    }

    let slot = match std::env::var(SLOT_ENV) {
        Ok(name) => SlotId::parse(&name).ok_or_else(|| anyhow!("unknown slot '{name}'"))?,
        Err(_) => SlotId::Ideal,
    };

    let coordinator = SyncCoordinator::from_settings(&settings)?;
    let mut updates = coordinator.subscribe();
    coordinator.arm(slot).await;
    info!("waiting for a capture for the {slot} slot; press Ctrl-C to give up");

    tokio::select! {
        changed = updates.wait_for(|snapshot| snapshot.armed.is_none()) => {
            changed.context("coordinator stopped publishing")?;
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted before a capture arrived");
        }
    }
    coordinator.close().await;

    let snapshot = coordinator.snapshot().await;
    println!("{}", serde_json::to_string_pretty(snapshot.slots.get(slot))?);
    Ok(())
}
