use ace_core::errors::{AceError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("ordinal", "7")
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = AceError::Config(sample_info("CF001", "empty component set"));
    assert_eq!(err.info().code, "CF001");
    assert!(err.info().context.contains_key("ordinal"));
}

#[test]
fn data_error_surface() {
    let err = AceError::Data(sample_info("DA001", "sample larger than population"));
    assert_eq!(err.info().code, "DA001");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn estimator_error_surface() {
    let err = AceError::Estimator(sample_info("ES001", "diverged"));
    assert_eq!(err.info().code, "ES001");
}

#[test]
fn checkpoint_error_surface() {
    let err = AceError::Checkpoint(sample_info("CK001", "write failed"));
    assert_eq!(err.info().code, "CK001");
}

#[test]
fn stitch_error_surface() {
    let err = AceError::Stitch(sample_info("ST001", "missing ordinals"));
    assert_eq!(err.info().code, "ST001");
}

#[test]
fn display_includes_hint_and_context() {
    let err = AceError::Serde(sample_info("SE001", "schema mismatch").with_hint("regenerate"));
    let rendered = err.to_string();
    assert!(rendered.contains("SE001"));
    assert!(rendered.contains("ordinal=7"));
    assert!(rendered.contains("regenerate"));
}
