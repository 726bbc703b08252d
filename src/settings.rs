//! Target-language settings seam.
//! The engine reads the stored language once at startup and falls back to the
//! default silently; later changes arrive through `HoverHandle::set_target_lang`.

use async_trait::async_trait;
use tracing::debug;

/// Language used when the store has no value or cannot be read.
pub const DEFAULT_TARGET_LANG: &str = "es";

/// Fixed source language for lookups.
pub const SOURCE_LANG: &str = "en";

#[derive(Debug)]
pub enum SettingsError {
    Unavailable(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Unavailable(msg) => write!(f, "settings store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Async key-value read of the user's chosen target language.
/// Change notifications are the host's responsibility: on every update it
/// must call `HoverHandle::set_target_lang`, which clears the translation
/// cache synchronously.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn read_target_lang(&self) -> Result<Option<String>, SettingsError>;
}

/// Startup read with silent fallback to the default language.
pub async fn resolve_target_lang(store: &dyn SettingsStore) -> String {
    match store.read_target_lang().await {
        Ok(Some(lang)) if !lang.trim().is_empty() => lang,
        Ok(_) => DEFAULT_TARGET_LANG.to_string(),
        Err(e) => {
            debug!(error = %e, "settings read failed, using default language");
            DEFAULT_TARGET_LANG.to_string()
        }
    }
}
