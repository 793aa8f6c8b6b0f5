/*!
 * Tests for the canonical translation state and page data stores
 */

use page_autotranslate::state::{PageDataStore, StateTransition};
use page_autotranslate::{TranslateDirection, TranslationEvent, TranslationState, TranslationStateStore};

fn drain(subscription: &mut tokio::sync::mpsc::UnboundedReceiver<StateTransition>) -> Vec<StateTransition> {
    let mut transitions = Vec::new();
    while let Ok(transition) = subscription.try_recv() {
        transitions.push(transition);
    }
    transitions
}

#[test]
fn test_new_store_shouldStartIdle() {
    let store = TranslationStateStore::new();
    assert_eq!(store.snapshot(), TranslationState::default());
    assert_eq!(store.snapshot().page_translation, None);
    assert!(!store.snapshot().text_translation);
    assert_eq!(store.sequence(), 0);
}

#[test]
fn test_subscribe_withSeveralEvents_shouldDeliverInApplicationOrder() {
    let store = TranslationStateStore::new();
    let mut first = store.subscribe();
    let mut second = store.subscribe();

    let direction = TranslateDirection::new("de", "en");
    store.apply(TranslationEvent::SetTextTranslationDesired(true));
    store.apply(TranslationEvent::SetPageTranslation(Some(direction.clone())));
    store.apply(TranslationEvent::SetTextTranslationDesired(false));
    store.apply(TranslationEvent::SetPageTranslation(None));

    let seen = drain(&mut first);
    assert_eq!(seen.len(), 4);
    assert_eq!(
        seen.iter().map(|t| t.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(seen[1].state.page_translation, Some(direction));
    assert!(seen[1].state.text_translation);
    assert_eq!(seen[3].state, TranslationState::default());

    assert_eq!(drain(&mut second), seen);
}

#[test]
fn test_apply_withIdenticalEvent_shouldStillPublish() {
    let store = TranslationStateStore::new();
    let mut transitions = store.subscribe();

    store.apply(TranslationEvent::SetTextTranslationDesired(false));
    store.apply(TranslationEvent::SetTextTranslationDesired(false));

    let seen = drain(&mut transitions);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].state, seen[1].state);
}

#[test]
fn test_apply_if_withPassingGuard_shouldApply() {
    let store = TranslationStateStore::new();
    let applied = store.apply_if(
        |state| state.page_translation.is_none(),
        TranslationEvent::SetPageTranslation(Some(TranslateDirection::new("ja", "en"))),
    );

    assert!(applied.is_some());
    assert_eq!(
        store.snapshot().page_translation,
        Some(TranslateDirection::new("ja", "en"))
    );

    let second = store.apply_if(
        |state| state.page_translation.is_none(),
        TranslationEvent::SetPageTranslation(Some(TranslateDirection::new("ja", "fr"))),
    );
    assert!(second.is_none());
    assert_eq!(store.sequence(), 1);
}

#[test]
fn test_dropped_subscriber_shouldNotBlockPublishing() {
    let store = TranslationStateStore::new();
    let dropped = store.subscribe();
    let mut kept = store.subscribe();
    drop(dropped);

    store.apply(TranslationEvent::SetTextTranslationDesired(true));
    assert_eq!(drain(&mut kept).len(), 1);
}

#[test]
fn test_direction_display_shouldShowArrow() {
    assert_eq!(TranslateDirection::new("de", "en").to_string(), "de -> en");
}

#[test]
fn test_page_data_update_shouldReplaceLanguage() {
    let page = PageDataStore::new(None);

    assert!(page.update_language("de"));
    assert!(!page.update_language("de"));
    assert_eq!(page.snapshot().language.as_deref(), Some("de"));
}
