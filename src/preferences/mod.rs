/*!
 * Auto-translation preferences.
 *
 * Users store yes/no opinions about auto-translating a site (by hostname) and
 * about auto-translating a source language in general. This module defines
 * the three-valued [`Preference`], the lookups that produce it, and the pure
 * two-tier [`resolve`] policy in which the site preference always dominates.
 */

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::LookupError;

pub mod memory;

pub use memory::InMemoryPreferences;

/// A stored yes/no opinion, or the absence of one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    /// Always auto-translate
    Yes,
    /// Never auto-translate
    No,
    /// No opinion stored
    #[default]
    Unset,
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unset => "unset",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Preference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "yes" | "always" => Ok(Self::Yes),
            "no" | "never" => Ok(Self::No),
            "unset" | "default" => Ok(Self::Unset),
            _ => Err(anyhow::anyhow!("Invalid preference: {}", s)),
        }
    }
}

impl From<Option<bool>> for Preference {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unset,
        }
    }
}

/// Outcome of combining the site and language preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreferenceDecision {
    DoNotTranslate,
    Translate,
    NoPreference,
}

/// Combine a site and a language preference.
///
/// The site preference is consulted first; when it is set, the language
/// preference is ignored entirely.
pub fn resolve(site: Preference, lang: Preference) -> PreferenceDecision {
    match site {
        Preference::No => PreferenceDecision::DoNotTranslate,
        Preference::Yes => PreferenceDecision::Translate,
        Preference::Unset => match lang {
            Preference::No => PreferenceDecision::DoNotTranslate,
            Preference::Yes => PreferenceDecision::Translate,
            Preference::Unset => PreferenceDecision::NoPreference,
        },
    }
}

/// Site-level preference source, keyed by hostname
#[async_trait]
pub trait SitePreferenceLookup: Send + Sync {
    async fn lookup(&self, hostname: &str) -> Result<Preference, LookupError>;
}

/// Language-level preference source, keyed by source language code
#[async_trait]
pub trait LanguagePreferenceLookup: Send + Sync {
    async fn lookup(&self, language: &str) -> Result<Preference, LookupError>;
}

/// Look up the site preference, treating failures as "no opinion"
pub async fn site_preference_or_unset(
    lookup: &dyn SitePreferenceLookup,
    hostname: &str,
) -> Preference {
    match lookup.lookup(hostname).await {
        Ok(preference) => preference,
        Err(e) => {
            warn!("Site preference lookup for '{}' failed: {}", hostname, e);
            Preference::Unset
        }
    }
}

/// Look up the language preference, treating failures as "no opinion"
pub async fn language_preference_or_unset(
    lookup: &dyn LanguagePreferenceLookup,
    language: &str,
) -> Preference {
    match lookup.lookup(language).await {
        Ok(preference) => preference,
        Err(e) => {
            warn!("Language preference lookup for '{}' failed: {}", language, e);
            Preference::Unset
        }
    }
}
