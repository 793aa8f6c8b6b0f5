/*!
 * Page-load auto-translation decision.
 *
 * Runs once per page load, after the readiness point. The sequence suspends
 * on detection and on both preference lookups, and a manual action may land
 * at any of those points. It therefore re-reads the canonical state after
 * every suspension and commits its result with a guarded transition, so a
 * page that is already being translated always keeps its direction.
 */

use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use crate::config_store::ConfigStore;
use crate::detection::{PageLanguageDetector, detect_or_unknown};
use crate::language_utils::language_codes_match;
use crate::preferences::{
    LanguagePreferenceLookup, Preference, PreferenceDecision, SitePreferenceLookup,
    language_preference_or_unset, resolve, site_preference_or_unset,
};
use crate::state::{PageDataStore, TranslateDirection, TranslationEvent, TranslationStateStore};

/// Why the page was left untranslated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The readiness trigger was dropped without firing
    PageNeverReady,
    /// A page translation was already active (manual action or earlier decision)
    AlreadyTranslating,
    /// The page language could not be detected
    UnknownLanguage,
    /// Page and target language match and the policy forbids that
    SameLanguage,
    /// The site preference says never
    SiteDeclined,
    /// The language preference says never
    LanguageDeclined,
    /// Neither preference asks for translation
    NoPreference,
}

/// Result of one decision sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutoTranslateOutcome {
    /// The page translation was requested
    Translated { direction: TranslateDirection },
    /// Nothing was changed
    Skipped { reason: SkipReason },
}

impl AutoTranslateOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated { .. })
    }
}

/// Everything the decision sequence reads or writes
pub struct AutoTranslator {
    pub(crate) log_prefix: String,
    pub(crate) hostname: String,
    pub(crate) config: ConfigStore,
    pub(crate) state: TranslationStateStore,
    pub(crate) page_data: PageDataStore,
    pub(crate) detector: Arc<dyn PageLanguageDetector>,
    pub(crate) site_preferences: Arc<dyn SitePreferenceLookup>,
    pub(crate) language_preferences: Arc<dyn LanguagePreferenceLookup>,
}

impl AutoTranslator {
    /// `Some` when the page is already being translated
    fn preempted(&self, stage: &str) -> Option<AutoTranslateOutcome> {
        let state = self.state.snapshot();
        let direction = state.page_translation?;
        debug!(
            "[{}] Auto-translate pre-empted {} (page already translating {})",
            self.log_prefix, stage, direction
        );
        Some(AutoTranslateOutcome::skipped(SkipReason::AlreadyTranslating))
    }

    /// Run the decision sequence to completion
    pub async fn run(&self) -> AutoTranslateOutcome {
        let outcome = self.decide().await;
        match &outcome {
            AutoTranslateOutcome::Translated { direction } => info!(
                "[{}] Auto-translating {} ({})",
                self.log_prefix, self.hostname, direction
            ),
            AutoTranslateOutcome::Skipped { reason } => info!(
                "[{}] Not auto-translating {}: {:?}",
                self.log_prefix, self.hostname, reason
            ),
        }
        outcome
    }

    async fn decide(&self) -> AutoTranslateOutcome {
        if let Some(outcome) = self.preempted("before detection") {
            return outcome;
        }

        let use_content = self.config.snapshot().page_translator.detect_language_by_content;
        let detected = detect_or_unknown(self.detector.as_ref(), use_content).await;

        if let Some(language) = &detected {
            if self.page_data.update_language(language) {
                debug!("[{}] Page language updated to '{}'", self.log_prefix, language);
            }
        }

        if let Some(outcome) = self.preempted("after detection") {
            return outcome;
        }

        let Some(from) = detected else {
            return AutoTranslateOutcome::skipped(SkipReason::UnknownLanguage);
        };

        let config = self.config.snapshot();
        let to = config.language.clone();

        if language_codes_match(&from, &to) && !config.auto_translate.allow_same_language {
            return AutoTranslateOutcome::skipped(SkipReason::SameLanguage);
        }

        let site = site_preference_or_unset(self.site_preferences.as_ref(), &self.hostname).await;
        debug!(
            "[{}] Site preference for {}: {}",
            self.log_prefix, self.hostname, site
        );

        if let Some(outcome) = self.preempted("after site lookup") {
            return outcome;
        }

        match resolve(site, Preference::Unset) {
            PreferenceDecision::DoNotTranslate => {
                return AutoTranslateOutcome::skipped(SkipReason::SiteDeclined);
            }
            PreferenceDecision::Translate => {}
            PreferenceDecision::NoPreference => {
                let lang =
                    language_preference_or_unset(self.language_preferences.as_ref(), &from).await;
                debug!("[{}] Language preference for {}: {}", self.log_prefix, from, lang);

                if let Some(outcome) = self.preempted("after language lookup") {
                    return outcome;
                }

                match resolve(site, lang) {
                    PreferenceDecision::DoNotTranslate => {
                        return AutoTranslateOutcome::skipped(SkipReason::LanguageDeclined);
                    }
                    PreferenceDecision::NoPreference => {
                        return AutoTranslateOutcome::skipped(SkipReason::NoPreference);
                    }
                    PreferenceDecision::Translate => {}
                }
            }
        }

        let direction = TranslateDirection::new(from, to);
        let committed = self.state.apply_if(
            |state| state.page_translation.is_none(),
            TranslationEvent::SetPageTranslation(Some(direction.clone())),
        );

        match committed {
            Some(_) => AutoTranslateOutcome::Translated { direction },
            None => AutoTranslateOutcome::skipped(SkipReason::AlreadyTranslating),
        }
    }
}
