/*!
 * Reconciliation of controllers against the canonical state.
 *
 * A single task consumes configuration snapshots and state transitions in
 * order and runs the watchers they trigger:
 * - configuration change: text flag (only when one of its policy inputs
 *   changed), DOM reconfiguration, selection recreation (only when the
 *   selection subtree fingerprint changed)
 * - page translation transition: text flag
 * - any state transition: DOM run/stop, selection run/stop
 *
 * Every watcher compares the desired state with what the controller reports
 * and acts only on a difference, so re-running any of them is harmless.
 * After acting, the controller must report the requested state; a mismatch
 * is a contract violation and ends the loop.
 */

use log::{debug, error};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

use crate::app_config::{Config, ConfigFingerprint, PageTranslatorConfig, SelectTranslatorConfig};
use crate::config_store::ConfigStore;
use crate::controllers::{
    DomTranslator, SelectionTranslator, SelectionTranslatorFactory, SelectionTranslatorOptions,
};
use crate::errors::EngineError;
use crate::state::{
    PageDataStore, StateTransition, TranslateDirection, TranslationEvent, TranslationState,
    TranslationStateStore,
};
use crate::store::Subscription;

/// Whether selection translation may be active.
///
/// It needs the selection translator enabled, and is suppressed while the page
/// is translated if `disable_while_translate_page` is set.
pub fn text_translation_allowed(
    select: &SelectTranslatorConfig,
    page_translation: Option<&TranslateDirection>,
) -> bool {
    select.enabled && (page_translation.is_none() || !select.disable_while_translate_page)
}

/// Requests sent from the context to the reconciliation task
#[derive(Debug)]
pub(crate) enum Command {
    /// Reply once every queued change has been reconciled
    Settle(oneshot::Sender<()>),
    /// Stop the controllers and end the loop
    Shutdown,
}

/// Owner of the controllers while the context runs
pub(crate) struct Reconciler {
    pub(crate) log_prefix: String,
    pub(crate) config: ConfigStore,
    pub(crate) state: TranslationStateStore,
    pub(crate) page_data: PageDataStore,
    pub(crate) dom: Arc<dyn DomTranslator>,
    pub(crate) selection_factory: Arc<dyn SelectionTranslatorFactory>,
    pub(crate) selection: Option<Box<dyn SelectionTranslator>>,
    pub(crate) selection_fingerprint: Option<ConfigFingerprint>,
    pub(crate) text_policy: Option<TextPolicy>,
}

/// Configuration inputs of the text flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextPolicy {
    enabled: bool,
    disable_while_translate_page: bool,
}

impl TextPolicy {
    fn of(select: &SelectTranslatorConfig) -> Self {
        Self {
            enabled: select.enabled,
            disable_while_translate_page: select.disable_while_translate_page,
        }
    }
}

impl Reconciler {
    /// Run until shutdown or a fatal error
    pub(crate) async fn run(
        mut self,
        config_changes: Subscription<Arc<Config>>,
        transitions: Subscription<StateTransition>,
        commands: UnboundedReceiver<Command>,
    ) -> Result<(), EngineError> {
        let result = self.event_loop(config_changes, transitions, commands).await;
        if let Err(e) = &result {
            error!("[{}] Reconciliation halted: {}", self.log_prefix, e);
        }
        result
    }

    async fn event_loop(
        &mut self,
        mut config_changes: Subscription<Arc<Config>>,
        mut transitions: Subscription<StateTransition>,
        mut commands: UnboundedReceiver<Command>,
    ) -> Result<(), EngineError> {
        self.sync_all().await?;

        loop {
            tokio::select! {
                biased;

                Some(transition) = transitions.recv() => {
                    self.on_transition(transition).await?;
                }
                Some(config) = config_changes.recv() => {
                    self.on_config(config).await?;
                }
                command = commands.recv() => match command {
                    Some(Command::Settle(reply)) => {
                        let _ = reply.send(());
                    }
                    Some(Command::Shutdown) | None => {
                        self.teardown().await?;
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Bring every controller in line with the current snapshots
    async fn sync_all(&mut self) -> Result<(), EngineError> {
        let config = self.config.snapshot();
        self.on_config(config).await?;

        let state = self.state.snapshot();
        self.reconcile_dom_run(&state).await?;
        self.reconcile_selection_run(&state).await
    }

    async fn on_config(&mut self, config: Arc<Config>) -> Result<(), EngineError> {
        debug!("[{}] Configuration changed", self.log_prefix);

        // Other settings leave the flag alone, so a manual request survives them
        let policy = TextPolicy::of(&config.select_translator);
        if self.text_policy != Some(policy) {
            self.text_policy = Some(policy);
            let page_translation = self.state.snapshot().page_translation;
            self.publish_text_flag(&config.select_translator, page_translation.as_ref());
        }

        self.reconcile_dom_config(&config.page_translator).await?;

        let fingerprint = config.select_translator.fingerprint();
        if self.selection_fingerprint != Some(fingerprint) {
            debug!(
                "[{}] Selection settings changed ({})",
                self.log_prefix,
                &fingerprint.to_hex()[..12]
            );
            self.selection_fingerprint = Some(fingerprint);
            self.recreate_selection(&config.select_translator).await?;
        }

        Ok(())
    }

    async fn on_transition(&mut self, transition: StateTransition) -> Result<(), EngineError> {
        debug!(
            "[{}] Transition #{} {}",
            self.log_prefix,
            transition.sequence,
            transition.event.event_type()
        );

        if let TranslationEvent::SetPageTranslation(direction) = &transition.event {
            let config = self.config.snapshot();
            self.publish_text_flag(&config.select_translator, direction.as_ref());
        }

        self.reconcile_dom_run(&transition.state).await?;
        self.reconcile_selection_run(&transition.state).await
    }

    /// Write the policy value of the text flag; the write is never skipped
    fn publish_text_flag(
        &self,
        select: &SelectTranslatorConfig,
        page_translation: Option<&TranslateDirection>,
    ) {
        let desired = text_translation_allowed(select, page_translation);
        self.state
            .apply(TranslationEvent::SetTextTranslationDesired(desired));
    }

    /// Push new DOM settings, restarting a running translator around the change
    async fn reconcile_dom_config(&mut self, config: &PageTranslatorConfig) -> Result<(), EngineError> {
        if !self.dom.is_running() {
            self.dom.update_configuration(config).await?;
            return Ok(());
        }

        let direction = self.dom.current_direction().ok_or_else(|| {
            EngineError::ContractViolation(
                "DOM translator reports running without a translate direction".to_string(),
            )
        })?;

        debug!(
            "[{}] Restarting DOM translator ({}) to apply new settings",
            self.log_prefix, direction
        );
        self.dom.stop().await?;
        self.dom.update_configuration(config).await?;
        self.dom.run(&direction).await?;
        self.expect_dom_running(true)
    }

    async fn reconcile_dom_run(&mut self, state: &TranslationState) -> Result<(), EngineError> {
        let desired = state.page_translation.is_some();
        if desired == self.dom.is_running() {
            return Ok(());
        }

        match &state.page_translation {
            Some(direction) => {
                debug!("[{}] Starting DOM translator ({})", self.log_prefix, direction);
                self.dom.run(direction).await?;
            }
            None => {
                debug!("[{}] Stopping DOM translator", self.log_prefix);
                self.dom.stop().await?;
            }
        }

        self.expect_dom_running(desired)
    }

    /// Replace the selection translator after its settings changed
    async fn recreate_selection(&mut self, config: &SelectTranslatorConfig) -> Result<(), EngineError> {
        if !config.enabled {
            if let Some(previous) = self.selection.take() {
                if previous.is_running() {
                    previous.stop().await?;
                }
                debug!("[{}] Selection translator discarded", self.log_prefix);
            }
            return Ok(());
        }

        let options = SelectionTranslatorOptions::build(config, self.page_data.language());

        let Some(previous) = self.selection.take() else {
            debug!("[{}] Selection translator created", self.log_prefix);
            self.selection = Some(self.selection_factory.create(options));
            return Ok(());
        };

        let was_running = previous.is_running();
        if was_running {
            previous.stop().await?;
        }
        drop(previous);

        let replacement = self.selection_factory.create(options);
        if was_running {
            replacement.start().await?;
        }
        debug!(
            "[{}] Selection translator recreated (running: {})",
            self.log_prefix, was_running
        );

        let running = replacement.is_running();
        self.selection = Some(replacement);
        if running != was_running {
            return Err(EngineError::ContractViolation(format!(
                "recreated selection translator reports running={} but was restored to {}",
                running, was_running
            )));
        }
        Ok(())
    }

    async fn reconcile_selection_run(&mut self, state: &TranslationState) -> Result<(), EngineError> {
        let Some(selection) = self.selection.as_ref() else {
            return Ok(());
        };

        let desired = state.text_translation;
        if desired == selection.is_running() {
            return Ok(());
        }

        if desired {
            debug!("[{}] Starting selection translator", self.log_prefix);
            selection.start().await?;
        } else {
            debug!("[{}] Stopping selection translator", self.log_prefix);
            selection.stop().await?;
        }

        let running = selection.is_running();
        if running != desired {
            return Err(EngineError::ContractViolation(format!(
                "selection translator reports running={} after being set to {}",
                running, desired
            )));
        }
        Ok(())
    }

    fn expect_dom_running(&self, desired: bool) -> Result<(), EngineError> {
        let running = self.dom.is_running();
        if running != desired {
            return Err(EngineError::ContractViolation(format!(
                "DOM translator reports running={} after being set to {}",
                running, desired
            )));
        }
        if running && self.dom.current_direction().is_none() {
            return Err(EngineError::ContractViolation(
                "DOM translator reports running without a translate direction".to_string(),
            ));
        }
        Ok(())
    }

    /// Stop everything the context started
    async fn teardown(&mut self) -> Result<(), EngineError> {
        if let Some(selection) = self.selection.take() {
            if selection.is_running() {
                selection.stop().await?;
            }
        }
        if self.dom.is_running() {
            self.dom.stop().await?;
        }
        debug!("[{}] Controllers stopped", self.log_prefix);
        Ok(())
    }
}
