/*!
 * Tests for error types and conversions
 */

use page_autotranslate::errors::{AppError, ControllerError, EngineError, LookupError};

#[test]
fn test_lookupError_unavailable_shouldDisplayCorrectly() {
    let error = LookupError::Unavailable("storage offline".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Lookup unavailable"));
    assert!(display.contains("storage offline"));
}

#[test]
fn test_engineError_fromControllerError_shouldWrapMessage() {
    let error: EngineError = ControllerError::Failed("cannot attach".to_string()).into();
    assert_eq!(
        error,
        EngineError::Controller(ControllerError::Failed("cannot attach".to_string()))
    );
    assert!(error.to_string().contains("cannot attach"));
}

#[test]
fn test_engineError_contractViolation_shouldDisplayDiagnostic() {
    let error = EngineError::ContractViolation("running without a direction".to_string());
    let display = format!("{}", error);
    assert!(display.contains("contract violation"));
    assert!(display.contains("running without a direction"));
}

#[test]
fn test_appError_fromEngineError_shouldKeepVariant() {
    let error: AppError = EngineError::Halted.into();
    assert!(matches!(error, AppError::Engine(EngineError::Halted)));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "conf.json missing");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
    assert!(error.to_string().contains("conf.json missing"));
}

#[test]
fn test_appError_fromSerdeError_shouldBecomeConfigError() {
    let serde_error = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
    let error: AppError = serde_error.into();
    assert!(matches!(error, AppError::Config(_)));
}
