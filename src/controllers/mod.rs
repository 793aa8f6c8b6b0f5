/*!
 * Translator controllers driven by the orchestration engine.
 *
 * Controllers own the actual translation side-effects. The engine only starts,
 * stops and reconfigures them:
 * - [`DomTranslator`]: one instance for the lifetime of the page, reconfigured in place
 * - [`SelectionTranslator`]: rebuilt from scratch through a
 *   [`SelectionTranslatorFactory`] whenever its settings change
 */

use async_trait::async_trait;
use serde::Serialize;

use crate::app_config::{PageTranslatorConfig, SelectTranslatorConfig, SelectTranslatorMode};
use crate::errors::ControllerError;
use crate::state::TranslateDirection;

pub mod mock;

/// Whole-page translator
///
/// While `is_running()` is true, `current_direction()` must return the
/// direction it runs with; anything else is a contract violation.
#[async_trait]
pub trait DomTranslator: Send + Sync {
    fn is_running(&self) -> bool;

    fn current_direction(&self) -> Option<TranslateDirection>;

    async fn run(&self, direction: &TranslateDirection) -> Result<(), ControllerError>;

    async fn stop(&self) -> Result<(), ControllerError>;

    async fn update_configuration(&self, config: &PageTranslatorConfig) -> Result<(), ControllerError>;
}

/// Translator of user-selected text
#[async_trait]
pub trait SelectionTranslator: Send + Sync {
    fn is_running(&self) -> bool;

    async fn start(&self) -> Result<(), ControllerError>;

    async fn stop(&self) -> Result<(), ControllerError>;
}

/// Builds selection translators; a fresh one per settings change
pub trait SelectionTranslatorFactory: Send + Sync {
    /// Construct a stopped selection translator
    fn create(&self, options: SelectionTranslatorOptions) -> Box<dyn SelectionTranslator>;
}

/// Construction input of a selection translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionTranslatorOptions {
    /// Page language at construction time, if known
    pub page_language: Option<String>,
    /// Translate immediately on selection
    pub quick_translate: bool,
    /// Offer translation from the context menu
    pub enable_translate_from_context_menu: bool,
    pub show_original_text: bool,
    pub strict_selection: bool,
    pub detected_lang_first: bool,
    pub timeout_for_hiding_ms: u64,
}

impl SelectionTranslatorOptions {
    /// Derive options from settings plus the current page language.
    ///
    /// The invocation mode is flattened into two flags; `Off` leaves both false.
    pub fn build(config: &SelectTranslatorConfig, page_language: Option<String>) -> Self {
        Self {
            page_language,
            quick_translate: config.mode == SelectTranslatorMode::QuickTranslate,
            enable_translate_from_context_menu: config.mode == SelectTranslatorMode::ContextMenu,
            show_original_text: config.show_original_text,
            strict_selection: config.strict_selection,
            detected_lang_first: config.detected_lang_first,
            timeout_for_hiding_ms: config.timeout_for_hiding_ms,
        }
    }
}
