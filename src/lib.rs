/*!
 * # page-autotranslate - page translation orchestration
 *
 * Decides whether a web page should be translated as a whole and whether
 * selection translation should be active, and keeps the translator
 * controllers in line with that decision while configuration, preferences
 * and the page itself change underneath.
 *
 * ## Features
 *
 * - Page-load auto-translation driven by site and language preferences
 *   (the site preference always dominates)
 * - A single ordered source of truth for the desired translation state
 * - Idempotent reconciliation of the DOM and selection translators
 * - Hot reconfiguration of a running DOM translator
 * - Recreation of the selection translator when its settings change,
 *   preserving its run state
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration snapshots and JSON loading
 * - `config_store`: Ordered stream of configuration snapshots
 * - `store`: Ordered publish/subscribe primitive
 * - `state`: Canonical translation state and page data
 * - `preferences`: Three-valued preferences, lookups and the resolver
 * - `detection`: Page language detection
 * - `page`: Page URL and preference key
 * - `controllers`: DOM and selection translator interfaces:
 *   - `controllers::mock`: Recording controllers for tests and simulation
 * - `engine`: The orchestration context:
 *   - `engine::auto_translate`: Page-load decision sequence
 *   - `engine::reconcile`: Controller reconciliation
 *   - `engine::readiness`: Page readiness signal
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod config_store;
pub mod controllers;
pub mod detection;
pub mod engine;
pub mod errors;
pub mod language_utils;
pub mod page;
pub mod preferences;
pub mod state;
pub mod store;

// Re-export main types for easier usage
pub use app_config::Config;
pub use config_store::ConfigStore;
pub use engine::{
    AutoTranslateOutcome, ContextControllers, ContextServices, OrchestrationContext,
    PageReadiness, ReadinessTrigger, SkipReason, TranslationKnobs, text_translation_allowed,
};
pub use errors::{AppError, ControllerError, EngineError, LookupError};
pub use preferences::{Preference, PreferenceDecision, resolve};
pub use state::{TranslateDirection, TranslationEvent, TranslationState, TranslationStateStore};
