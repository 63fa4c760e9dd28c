//! Preference persistence collaborator.

use std::collections::HashMap;

use palaver_core::{UiField, UiPreferences};

/// Where the four persistent preference fields live between sessions.
///
/// The store reads the whole record once at startup and writes back one
/// field at a time as `PersistPreference` effects come out of transitions.
/// Implementations decide the medium; defaults fill any field that has
/// never been written.
pub trait PreferenceStore {
    /// Load the persisted preferences, falling back to defaults for
    /// missing fields.
    fn load(&self) -> UiPreferences;

    /// Persist one field.
    fn save(&mut self, field: UiField, value: &str);
}

/// In-memory [`PreferenceStore`], for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    fields: HashMap<UiField, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self) -> UiPreferences {
        let mut preferences = UiPreferences::default();
        for (&field, value) in &self.fields {
            preferences.set(field, value.clone());
        }
        preferences
    }

    fn save(&mut self, field: UiField, value: &str) {
        self.fields.insert(field, value.to_owned());
    }
}
