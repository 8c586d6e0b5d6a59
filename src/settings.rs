use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

const ENV_MAILBOX_URL: &str = "VARIANT_SYNC_MAILBOX_URL";
const ENV_SESSION_ID: &str = "VARIANT_SYNC_SESSION_ID";
const ENV_POLL_MS: &str = "VARIANT_SYNC_POLL_MS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct MailboxSettings {
    pub base_url: String,
    /// Identity of the shopper whose browser agent fills the mailbox.
    pub session_id: String,
    pub request_timeout_ms: u64,
}

impl Default for MailboxSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/variant-mailbox".into(),
            session_id: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    pub mailbox: MailboxSettings,
    pub poll_interval_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            mailbox: MailboxSettings::default(),
            poll_interval_ms: 2_000,
        }
    }
}

impl SyncSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.mailbox.request_timeout_ms.max(1))
    }

    /// Environment variables win over the file so a deployment can point the
    /// same settings file at another mailbox.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_MAILBOX_URL) {
            self.mailbox.base_url = url;
        }
        if let Some(session) = lookup(ENV_SESSION_ID) {
            self.mailbox.session_id = session;
        }
        if let Some(poll_ms) = lookup(ENV_POLL_MS).and_then(|value| value.trim().parse().ok()) {
            self.poll_interval_ms = poll_ms;
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<SyncSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            SyncSettings::default()
        };
        data.apply_env_overrides(|name| std::env::var(name).ok());

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> SyncSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: SyncSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, SyncSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, SyncSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &SyncSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("absent.json")).unwrap();
        let settings = store.settings();
        assert_eq!(settings.mailbox, MailboxSettings::default());
        assert_eq!(settings.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.settings();
        settings.mailbox.base_url = "https://gift.example/api/variant-mailbox".into();
        settings.mailbox.session_id = "shopper-7".into();
        store.update(settings.clone()).unwrap();

        let reloaded: SyncSettings =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.mailbox.session_id, "shopper-7");
        assert_eq!(reloaded.mailbox.base_url, settings.mailbox.base_url);
    }

    #[test]
    fn partial_and_corrupt_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{"pollIntervalMs": 500}"#).unwrap();
        let settings: SyncSettings =
            serde_json::from_str(&fs::read_to_string(&partial).unwrap()).unwrap();
        assert_eq!(settings.poll_interval_ms, 500);
        assert_eq!(settings.mailbox.request_timeout_ms, 10_000);

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{not json").unwrap();
        let store = SettingsStore::new(corrupt).unwrap();
        assert_eq!(store.settings().mailbox.request_timeout_ms, 10_000);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut settings = SyncSettings::default();
        settings.apply_env_overrides(|name| match name {
            ENV_MAILBOX_URL => Some("https://other.example/mailbox".into()),
            ENV_SESSION_ID => Some("abc".into()),
            ENV_POLL_MS => Some(" 750 ".into()),
            _ => None,
        });
        assert_eq!(settings.mailbox.base_url, "https://other.example/mailbox");
        assert_eq!(settings.mailbox.session_id, "abc");
        assert_eq!(settings.poll_interval_ms, 750);

        settings.apply_env_overrides(|name| (name == ENV_POLL_MS).then(|| "soon".into()));
        assert_eq!(settings.poll_interval_ms, 750);
    }
}
