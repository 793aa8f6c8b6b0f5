/*!
 * In-memory preference registry.
 *
 * Serves both lookups from two maps. Used by the simulator and by tests;
 * a browser embedding would back the lookup traits with its own storage.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{LanguagePreferenceLookup, Preference, SitePreferenceLookup};
use crate::errors::LookupError;

/// Site and language preferences kept in memory
#[derive(Clone, Default)]
pub struct InMemoryPreferences {
    sites: Arc<RwLock<HashMap<String, Preference>>>,
    languages: Arc<RwLock<HashMap<String, Preference>>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a site preference; `Unset` removes it
    pub fn set_site(&self, hostname: &str, preference: Preference) {
        let key = hostname.trim().to_lowercase();
        debug!("Site preference for '{}' set to {}", key, preference);
        let mut sites = self.sites.write();
        match preference {
            Preference::Unset => {
                sites.remove(&key);
            }
            _ => {
                sites.insert(key, preference);
            }
        }
    }

    /// Store a language preference; `Unset` removes it
    pub fn set_language(&self, language: &str, preference: Preference) {
        let key = language.trim().to_lowercase();
        debug!("Language preference for '{}' set to {}", key, preference);
        let mut languages = self.languages.write();
        match preference {
            Preference::Unset => {
                languages.remove(&key);
            }
            _ => {
                languages.insert(key, preference);
            }
        }
    }

    /// Forget a site preference; returns whether one existed
    pub fn delete_site(&self, hostname: &str) -> bool {
        self.sites
            .write()
            .remove(&hostname.trim().to_lowercase())
            .is_some()
    }

    /// Forget a language preference; returns whether one existed
    pub fn delete_language(&self, language: &str) -> bool {
        self.languages
            .write()
            .remove(&language.trim().to_lowercase())
            .is_some()
    }

    /// Languages the user asked to always auto-translate
    pub fn auto_translated_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .languages
            .read()
            .iter()
            .filter(|(_, preference)| **preference == Preference::Yes)
            .map(|(language, _)| language.clone())
            .collect();
        languages.sort();
        languages
    }

    fn site(&self, hostname: &str) -> Preference {
        self.sites
            .read()
            .get(&hostname.trim().to_lowercase())
            .copied()
            .unwrap_or_default()
    }

    fn language(&self, language: &str) -> Preference {
        self.languages
            .read()
            .get(&language.trim().to_lowercase())
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SitePreferenceLookup for InMemoryPreferences {
    async fn lookup(&self, hostname: &str) -> Result<Preference, LookupError> {
        Ok(self.site(hostname))
    }
}

#[async_trait]
impl LanguagePreferenceLookup for InMemoryPreferences {
    async fn lookup(&self, language: &str) -> Result<Preference, LookupError> {
        Ok(self.language(language))
    }
}
