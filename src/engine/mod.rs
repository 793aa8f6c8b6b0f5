/*!
 * Orchestration context for one page.
 *
 * An [`OrchestrationContext`] owns the stores and controllers of a single page
 * and has an explicit lifecycle:
 * - `new`: wire configuration, lookups and controllers together
 * - `start`: detect the page language, spawn the reconciliation task and
 *   schedule the auto-translate decision behind the readiness signal
 * - `settle`: wait until every queued change has been reconciled
 * - `dispose`: stop the controllers and surface any fatal error
 *
 * All work happens on the caller's runtime. The model assumes a single page
 * thread with cooperative scheduling (a current-thread runtime); correctness
 * does not depend on it because the stores serialize transitions and every
 * watcher re-checks state before acting.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config_store::ConfigStore;
use crate::controllers::{DomTranslator, SelectionTranslatorFactory};
use crate::detection::{PageLanguageDetector, detect_or_unknown};
use crate::errors::EngineError;
use crate::page::PageContext;
use crate::preferences::{LanguagePreferenceLookup, SitePreferenceLookup};
use crate::state::{
    PageDataStore, StateTransition, TranslateDirection, TranslationEvent, TranslationState,
    TranslationStateStore,
};

pub mod auto_translate;
pub mod readiness;
pub mod reconcile;

pub use auto_translate::{AutoTranslateOutcome, AutoTranslator, SkipReason};
pub use readiness::{PageReadiness, ReadinessTrigger};
pub use reconcile::text_translation_allowed;

use reconcile::{Command, Reconciler};

/// External lookups consumed by the decision sequence
#[derive(Clone)]
pub struct ContextServices {
    pub detector: Arc<dyn PageLanguageDetector>,
    pub site_preferences: Arc<dyn SitePreferenceLookup>,
    pub language_preferences: Arc<dyn LanguagePreferenceLookup>,
}

/// Controllers driven by the reconciliation task
#[derive(Clone)]
pub struct ContextControllers {
    pub dom: Arc<dyn DomTranslator>,
    pub selection_factory: Arc<dyn SelectionTranslatorFactory>,
}

struct RunningContext {
    commands: UnboundedSender<Command>,
    reconciler: JoinHandle<Result<(), EngineError>>,
    auto_translate: Option<JoinHandle<AutoTranslateOutcome>>,
}

/// Translation orchestration for one page
pub struct OrchestrationContext {
    id: Uuid,
    page: PageContext,
    config: ConfigStore,
    state: TranslationStateStore,
    page_data: PageDataStore,
    services: ContextServices,
    controllers: ContextControllers,
    running: Option<RunningContext>,
}

impl OrchestrationContext {
    /// Create a stopped context for `page`
    pub fn new(
        page: PageContext,
        config: ConfigStore,
        services: ContextServices,
        controllers: ContextControllers,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            config,
            state: TranslationStateStore::new(),
            page_data: PageDataStore::new(None),
            services,
            controllers,
            running: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn state_store(&self) -> &TranslationStateStore {
        &self.state
    }

    /// Copy of the canonical state
    pub fn state(&self) -> TranslationState {
        self.state.snapshot()
    }

    pub fn page_data(&self) -> &PageDataStore {
        &self.page_data
    }

    /// The page's single DOM translator
    pub fn dom_translator(&self) -> Arc<dyn DomTranslator> {
        Arc::clone(&self.controllers.dom)
    }

    /// Handle for manual translation actions
    pub fn knobs(&self) -> TranslationKnobs {
        TranslationKnobs {
            config: self.config.clone(),
            state: self.state.clone(),
            page_data: self.page_data.clone(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    fn log_prefix(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// Start reconciliation and schedule the auto-translate decision
    pub async fn start(&mut self, readiness: PageReadiness) -> Result<(), EngineError> {
        if self.running.is_some() {
            return Err(EngineError::AlreadyStarted);
        }

        let prefix = self.log_prefix();
        info!("[{}] Starting translation context for {}", prefix, self.page.host());

        let use_content = self.config.snapshot().page_translator.detect_language_by_content;
        match detect_or_unknown(self.services.detector.as_ref(), use_content).await {
            Some(language) => {
                self.page_data.update_language(&language);
                debug!("[{}] Initial page language '{}'", prefix, language);
            }
            None => debug!("[{}] Initial page language unknown", prefix),
        }

        // Subscribe before the first sync so no change can fall in between
        let config_changes = self.config.subscribe();
        let transitions = self.state.subscribe();
        let (commands, command_rx) = unbounded_channel();

        let reconciler = Reconciler {
            log_prefix: prefix.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            page_data: self.page_data.clone(),
            dom: Arc::clone(&self.controllers.dom),
            selection_factory: Arc::clone(&self.controllers.selection_factory),
            selection: None,
            selection_fingerprint: None,
            text_policy: None,
        };
        let reconciler = tokio::spawn(reconciler.run(config_changes, transitions, command_rx));

        let auto_translator = AutoTranslator {
            log_prefix: prefix.clone(),
            hostname: self.page.host().to_string(),
            config: self.config.clone(),
            state: self.state.clone(),
            page_data: self.page_data.clone(),
            detector: Arc::clone(&self.services.detector),
            site_preferences: Arc::clone(&self.services.site_preferences),
            language_preferences: Arc::clone(&self.services.language_preferences),
        };
        let auto_translate = tokio::spawn(async move {
            if !readiness.wait().await {
                debug!("[{}] Page never became ready", auto_translator.log_prefix);
                return AutoTranslateOutcome::Skipped {
                    reason: SkipReason::PageNeverReady,
                };
            }
            auto_translator.run().await
        });

        self.running = Some(RunningContext {
            commands,
            reconciler,
            auto_translate: Some(auto_translate),
        });
        Ok(())
    }

    /// Wait until every change applied so far has been reconciled
    pub async fn settle(&self) -> Result<(), EngineError> {
        let running = self.running.as_ref().ok_or(EngineError::NotStarted)?;
        let (reply, done) = oneshot::channel();
        running
            .commands
            .send(Command::Settle(reply))
            .map_err(|_| EngineError::Halted)?;
        done.await.map_err(|_| EngineError::Halted)
    }

    /// Wait for the auto-translate decision; it can be awaited once
    pub async fn auto_translate_outcome(&mut self) -> Result<AutoTranslateOutcome, EngineError> {
        let handle = self
            .running
            .as_mut()
            .and_then(|running| running.auto_translate.take())
            .ok_or(EngineError::NotStarted)?;
        handle
            .await
            .map_err(|e| EngineError::TaskFailed(e.to_string()))
    }

    /// Stop the controllers and end the context
    ///
    /// Returns the fatal error that halted reconciliation, if any.
    pub async fn dispose(mut self) -> Result<(), EngineError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        let prefix = self.log_prefix();
        if let Some(auto_translate) = running.auto_translate {
            auto_translate.abort();
        }

        if running.commands.send(Command::Shutdown).is_err() {
            warn!("[{}] Reconciliation already stopped", prefix);
        }

        let result = running
            .reconciler
            .await
            .map_err(|e| EngineError::TaskFailed(e.to_string()))?;
        info!("[{}] Translation context disposed", prefix);
        result
    }
}

/// Manual translation actions
///
/// Manual actions go through the same events as the engine's own decisions,
/// so the reconciliation task treats them identically. A manual page
/// translation always wins over a pending auto-translate decision.
#[derive(Clone)]
pub struct TranslationKnobs {
    config: ConfigStore,
    state: TranslationStateStore,
    page_data: PageDataStore,
}

impl TranslationKnobs {
    /// Translate the page in the given direction
    pub fn translate_page(&self, from: &str, to: &str) -> StateTransition {
        self.state
            .apply(TranslationEvent::SetPageTranslation(Some(TranslateDirection::new(from, to))))
    }

    /// Stop page translation and show the original
    pub fn show_original(&self) -> StateTransition {
        self.state.apply(TranslationEvent::SetPageTranslation(None))
    }

    /// Request selection translation on or off; the request is filtered by policy
    pub fn set_text_translation(&self, requested: bool) -> StateTransition {
        let config = self.config.snapshot();
        let page_translation = self.state.snapshot().page_translation;
        let allowed = text_translation_allowed(&config.select_translator, page_translation.as_ref());
        self.state
            .apply(TranslationEvent::SetTextTranslationDesired(requested && allowed))
    }

    /// Record a newly detected page language; never triggers translation
    pub fn update_page_language(&self, language: &str) -> bool {
        self.page_data.update_language(language)
    }
}
