/*!
 * Canonical translation state of a page.
 *
 * [`TranslationStateStore`] is the single source of truth for what the page
 * should be doing: translating the DOM in some direction, and whether
 * selection translation is wanted. It only changes through named
 * [`TranslationEvent`]s, and every resulting state is delivered to subscribers
 * together with the event that produced it, in application order.
 */

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::store::{Store, Subscribers, Subscription};

/// Direction of a page translation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TranslateDirection {
    /// Source language code
    pub from: String,
    /// Target language code
    pub to: String,
}

impl TranslateDirection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for TranslateDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Desired state of both translation subsystems
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationState {
    /// Whole-page translation direction, `None` while showing the original
    pub page_translation: Option<TranslateDirection>,
    /// Whether selection translation should be active
    pub text_translation: bool,
}

/// Named transitions of [`TranslationState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    /// Start translating the page in a direction, or stop with `None`
    SetPageTranslation(Option<TranslateDirection>),
    /// Desired selection-translation flag, already filtered by policy
    SetTextTranslationDesired(bool),
}

impl TranslationEvent {
    /// Short name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SetPageTranslation(_) => "set_page_translation",
            Self::SetTextTranslationDesired(_) => "set_text_translation_desired",
        }
    }

    fn reduce(&self, state: &TranslationState) -> TranslationState {
        match self {
            Self::SetPageTranslation(direction) => TranslationState {
                page_translation: direction.clone(),
                ..state.clone()
            },
            Self::SetTextTranslationDesired(enabled) => TranslationState {
                text_translation: *enabled,
                ..state.clone()
            },
        }
    }
}

/// One applied transition as seen by subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    /// Position of this transition in application order, starting at 1
    pub sequence: u64,
    /// The event that was applied
    pub event: TranslationEvent,
    /// The state right after the event
    pub state: TranslationState,
}

struct StateInner {
    state: TranslationState,
    sequence: u64,
    subscribers: Subscribers<StateTransition>,
}

/// Ordered, single-writer store of [`TranslationState`]
#[derive(Clone)]
pub struct TranslationStateStore {
    inner: Arc<Mutex<StateInner>>,
}

impl TranslationStateStore {
    /// Create a store in the initial state: no page translation, no text translation
    pub fn new() -> Self {
        Self::with_state(TranslationState::default())
    }

    /// Create a store starting from `state`
    pub fn with_state(state: TranslationState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateInner {
                state,
                sequence: 0,
                subscribers: Subscribers::new(),
            })),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> TranslationState {
        self.inner.lock().state.clone()
    }

    /// Apply a transition atomically and publish the resulting state
    pub fn apply(&self, event: TranslationEvent) -> StateTransition {
        let mut inner = self.inner.lock();
        Self::apply_locked(&mut inner, event)
    }

    /// Apply a transition only if `guard` holds for the current state.
    ///
    /// The check and the transition happen under the same lock, so nothing can
    /// slip in between them.
    pub fn apply_if(
        &self,
        guard: impl FnOnce(&TranslationState) -> bool,
        event: TranslationEvent,
    ) -> Option<StateTransition> {
        let mut inner = self.inner.lock();
        if !guard(&inner.state) {
            return None;
        }
        Some(Self::apply_locked(&mut inner, event))
    }

    /// Subscribe to every future transition
    pub fn subscribe(&self) -> Subscription<StateTransition> {
        self.inner.lock().subscribers.subscribe()
    }

    /// Number of transitions applied so far
    pub fn sequence(&self) -> u64 {
        self.inner.lock().sequence
    }

    fn apply_locked(inner: &mut StateInner, event: TranslationEvent) -> StateTransition {
        let next = event.reduce(&inner.state);
        inner.state = next.clone();
        inner.sequence += 1;

        let transition = StateTransition {
            sequence: inner.sequence,
            event,
            state: next,
        };
        inner.subscribers.publish(&transition);
        transition
    }
}

impl Default for TranslationStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Facts collected about the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageData {
    /// Detected page language, `None` when unknown
    pub language: Option<String>,
}

/// Store of [`PageData`]; updates are informational and never trigger translation
#[derive(Clone)]
pub struct PageDataStore {
    store: Store<PageData>,
}

impl PageDataStore {
    pub fn new(language: Option<String>) -> Self {
        Self {
            store: Store::new(PageData { language }),
        }
    }

    pub fn snapshot(&self) -> PageData {
        self.store.snapshot()
    }

    /// Current page language
    pub fn language(&self) -> Option<String> {
        self.store.read(|data| data.language.clone())
    }

    /// Record a newly detected language; returns whether it changed
    pub fn update_language(&self, language: &str) -> bool {
        let mut changed = false;
        self.store.update(|data| {
            changed = data.language.as_deref() != Some(language);
            PageData {
                language: Some(language.to_string()),
            }
        });
        changed
    }
}
