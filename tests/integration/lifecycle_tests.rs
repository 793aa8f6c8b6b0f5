/*!
 * Orchestration context lifecycle and fatal error handling
 */

use page_autotranslate::controllers::DomTranslator;
use page_autotranslate::controllers::mock::{
    ControllerCall, RecordingDomTranslator, RecordingSelectionFactory,
};
use page_autotranslate::errors::{ControllerError, EngineError};
use page_autotranslate::{PageReadiness, Preference, TranslateDirection};

use crate::common::TestPageBuilder;

#[tokio::test]
async fn test_start_twice_shouldFail() {
    let mut page = TestPageBuilder::new(Some("de")).build();
    assert!(!page.context.is_started());

    page.start_interactive().await;
    assert!(page.context.is_started());

    let second = page
        .context
        .start(PageReadiness::already_interactive())
        .await;
    assert_eq!(second, Err(EngineError::AlreadyStarted));
}

#[tokio::test]
async fn test_settle_beforeStart_shouldReportNotStarted() {
    let mut page = TestPageBuilder::new(Some("de")).build();

    assert_eq!(page.context.settle().await, Err(EngineError::NotStarted));
    assert_eq!(
        page.context.auto_translate_outcome().await,
        Err(EngineError::NotStarted)
    );
}

#[tokio::test]
async fn test_outcome_awaitedTwice_shouldFailSecondTime() {
    let mut page = TestPageBuilder::new(Some("de")).build();
    page.start_interactive().await;

    assert!(page.context.auto_translate_outcome().await.is_ok());
    assert_eq!(
        page.context.auto_translate_outcome().await,
        Err(EngineError::NotStarted)
    );
}

#[tokio::test]
async fn test_dispose_shouldStopControllers() {
    let mut page = TestPageBuilder::new(Some("de"))
        .config(|config| config.select_translator.disable_while_translate_page = false)
        .site_preference(Preference::Yes)
        .build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();
    page.settle().await;
    assert!(page.dom_running());
    assert!(page.selection_running());

    page.context.dispose().await.unwrap();

    assert!(!page.dom.is_running());
    assert_eq!(page.selection.alive(), 0);
    assert!(page.calls.calls().ends_with(&[
        ControllerCall::SelectionStop { instance: 1 },
        ControllerCall::SelectionDropped { instance: 1 },
        ControllerCall::DomStop,
    ]));
}

#[tokio::test]
async fn test_dispose_beforeStart_shouldSucceed() {
    let page = TestPageBuilder::new(Some("de")).build();
    assert!(page.context.dispose().await.is_ok());
}

#[tokio::test]
async fn test_dom_running_withoutDirection_shouldHaltReconciliation() {
    let mut page = TestPageBuilder::new(Some("de"))
        .dom(RecordingDomTranslator::forgets_direction)
        .build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();
    page.settle().await;

    page.context.knobs().translate_page("de", "en");

    assert_eq!(page.context.settle().await, Err(EngineError::Halted));
    let result = page.context.dispose().await;
    assert!(matches!(result, Err(EngineError::ContractViolation(_))));
}

#[tokio::test]
async fn test_selection_never_starting_shouldHaltReconciliation() {
    let mut page = TestPageBuilder::new(Some("de"))
        .selection(|log| RecordingSelectionFactory::stalling_from(log, 1))
        .build();
    page.start_interactive().await;

    assert_eq!(page.context.settle().await, Err(EngineError::Halted));
    let result = page.context.dispose().await;
    assert!(matches!(
        result,
        Err(EngineError::ContractViolation(ref message)) if message.contains("running=false")
    ));
}

#[tokio::test]
async fn test_recreated_selection_never_starting_shouldHaltReconciliation() {
    let mut page = TestPageBuilder::new(Some("de"))
        .selection(|log| RecordingSelectionFactory::stalling_from(log, 2))
        .build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();
    page.settle().await;
    assert!(page.selection_running());

    page.config
        .modify(|config| config.select_translator.strict_selection = true);

    assert_eq!(page.context.settle().await, Err(EngineError::Halted));
    assert!(page.calls.calls().contains(&ControllerCall::SelectionStart { instance: 2 }));
    let result = page.context.dispose().await;
    assert!(matches!(result, Err(EngineError::ContractViolation(_))));
}

#[tokio::test]
async fn test_failing_controller_shouldSurfaceOnDispose() {
    let mut page = TestPageBuilder::new(Some("de"))
        .dom(RecordingDomTranslator::failing_run)
        .build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();

    page.context.knobs().translate_page("de", "en");

    let result = page.context.dispose().await;
    assert!(matches!(
        result,
        Err(EngineError::Controller(ControllerError::Failed(_)))
    ));
}

#[tokio::test]
async fn test_knob_text_request_shouldBeFilteredByPolicy() {
    let mut page = TestPageBuilder::new(Some("de")).build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();
    let knobs = page.context.knobs();

    knobs.translate_page("de", "en");
    let transition = knobs.set_text_translation(true);
    assert!(!transition.state.text_translation);

    knobs.show_original();
    page.settle().await;
    let transition = knobs.set_text_translation(false);
    assert!(!transition.state.text_translation);
    page.settle().await;
    assert!(!page.selection_running());

    let transition = knobs.set_text_translation(true);
    assert!(transition.state.text_translation);
    page.settle().await;
    assert!(page.selection_running());
}

#[tokio::test]
async fn test_page_language_update_shouldNotTriggerTranslation() {
    let mut page = TestPageBuilder::new(Some("de"))
        .language_preference("fr", Preference::Yes)
        .build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();

    assert!(page.context.knobs().update_page_language("fr"));
    page.settle().await;

    assert_eq!(page.context.page_data().language().as_deref(), Some("fr"));
    assert_eq!(page.context.state().page_translation, None);
    assert!(!page.dom_running());
}

#[tokio::test]
async fn test_context_accessors_shouldExposePage() {
    let page = TestPageBuilder::new(Some("de")).build();

    assert_eq!(page.context.page().host(), crate::common::HOST);
    assert_eq!(page.context.config().snapshot().language, "en");
    assert!(!page.context.dom_translator().is_running());
    assert_eq!(page.context.id().to_string().len(), 36);
    assert_eq!(
        page.context.state().page_translation,
        None::<TranslateDirection>
    );
}

#[tokio::test]
async fn test_manual_text_off_withUnrelatedConfigChange_shouldStayOff() {
    let mut page = TestPageBuilder::new(Some("de")).build();
    page.start_interactive().await;
    page.context.auto_translate_outcome().await.unwrap();
    page.settle().await;
    assert!(page.selection_running());

    page.context.knobs().set_text_translation(false);
    page.settle().await;
    assert!(!page.selection_running());

    page.config.modify(|config| config.language = "fr".to_string());
    page.config
        .modify(|config| config.page_translator.lazy_translate = false);
    page.config
        .modify(|config| config.select_translator.timeout_for_hiding_ms = 4000);
    page.settle().await;

    assert!(!page.context.state().text_translation);
    assert!(!page.selection_running());

    page.config
        .modify(|config| config.select_translator.disable_while_translate_page = false);
    page.settle().await;

    assert!(page.context.state().text_translation);
    assert!(page.selection_running());
}
