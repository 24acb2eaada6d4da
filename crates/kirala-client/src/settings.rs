//! Client-local settings, stored as one JSON row.

use serde::{Deserialize, Serialize};

use kirala_store::StoreError;

use crate::state::{lock, SharedState};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Whether the onboarding carousel has been dismissed.
    pub onboarding_seen: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            onboarding_seen: false,
        }
    }
}

/// Read the settings, falling back to defaults when never written.
pub fn get_settings(state: &SharedState) -> Result<AppSettings, StoreError> {
    let guard = lock(state);

    match guard.database.get_settings_json()? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(AppSettings::default()),
    }
}

/// Persist the onboarding-seen flag.
pub fn mark_onboarding_seen(state: &SharedState) -> Result<(), StoreError> {
    let mut settings = get_settings(state)?;
    settings.onboarding_seen = true;

    let json = serde_json::to_string(&settings)?;
    lock(state).database.put_settings_json(&json)?;
    Ok(())
}
