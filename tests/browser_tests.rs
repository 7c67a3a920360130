use form_prober::browser::driver::{FormDriver, Locator, Probe, probe_enabled, probe_visible, tolerate};
use form_prober::browser::session::{BrowserRequest, BrowserResponse};
use form_prober::error::DriverError;
use serde_json::{Value, json};

mod common;

use common::mock_driver::{MockDriver, PageState, SUBMIT, registration_step};
use common::utils::FORM_URL;

fn to_json(req: &BrowserRequest) -> Value {
    serde_json::to_value(req).unwrap()
}

// =========================================================================
// Request serialization (NDJSON wire format)
// =========================================================================

#[test]
fn navigate_request_carries_url_and_timeout() {
    let v = to_json(&BrowserRequest::navigate("https://example.com", 60_000));
    assert_eq!(
        v,
        json!({ "cmd": "navigate", "url": "https://example.com", "timeout_ms": 60000 })
    );
}

#[test]
fn fill_request_is_an_element_action() {
    let v = to_json(&BrowserRequest::fill(&Locator::new("#email"), "a@b.co", 5000));
    assert_eq!(
        v,
        json!({
            "cmd": "action",
            "action": "fill",
            "selector": "#email",
            "value": "a@b.co",
            "timeout_ms": 5000
        })
    );
}

#[test]
fn click_and_clear_omit_value() {
    let click = to_json(&BrowserRequest::click(&Locator::new("#go"), 5000));
    assert_eq!(click["action"], "click");
    assert!(click.get("value").is_none());

    let clear = to_json(&BrowserRequest::clear(&Locator::new("#otp1"), 5000));
    assert_eq!(clear["action"], "clear");
    assert!(clear.get("duration_ms").is_none());
}

#[test]
fn wait_request_has_no_selector() {
    let v = to_json(&BrowserRequest::wait(800));
    assert_eq!(v, json!({ "cmd": "action", "action": "wait", "duration_ms": 800 }));
}

#[test]
fn query_and_bare_requests() {
    let v = to_json(&BrowserRequest::query_enabled(&Locator::new(SUBMIT), 5000));
    assert_eq!(v["cmd"], "query_enabled");
    assert_eq!(v["selector"], SUBMIT);

    assert_eq!(to_json(&BrowserRequest::current_url()), json!({ "cmd": "current_url" }));
    assert_eq!(to_json(&BrowserRequest::quit()), json!({ "cmd": "quit" }));
}

#[test]
fn radio_option_locator() {
    let loc = Locator::new("input[name='gender']").with_value("female");
    assert_eq!(loc.as_str(), "input[name='gender'][value='female']");
}

// =========================================================================
// Response -> error mapping
// =========================================================================

fn failed_response(extra: Value) -> BrowserResponse {
    let mut base = json!({ "ok": false, "error": "boom" });
    if let (Some(obj), Some(more)) = (base.as_object_mut(), extra.as_object()) {
        obj.extend(more.clone());
    }
    serde_json::from_value(base).unwrap()
}

#[test]
fn timed_out_response_maps_to_timeout() {
    let err = failed_response(json!({ "timed_out": true })).into_error("click", None, 5000);
    assert!(matches!(err, DriverError::Timeout { ms: 5000, .. }));
    assert!(!err.is_fatal());
}

#[test]
fn not_found_response_maps_to_element_not_found() {
    let loc = Locator::new("#missing");
    let err = failed_response(json!({ "not_found": true })).into_error("fill", Some(&loc), 5000);
    assert_eq!(err.to_string(), "Element '#missing' not found");
}

#[test]
fn plain_failure_on_navigate_is_fatal() {
    let err = failed_response(json!({})).into_error("navigate", None, 60_000);
    assert!(matches!(err, DriverError::SessionProtocol { .. }));
    assert!(err.is_fatal());

    let local = failed_response(json!({})).into_error("fill", None, 5000);
    assert!(!local.is_fatal());
}

#[test]
fn ready_line_parses() {
    let r: BrowserResponse = serde_json::from_str(r#"{"ok":true,"ready":true}"#).unwrap();
    assert!(r.ok);
    assert_eq!(r.ready, Some(true));
}

// =========================================================================
// Probe tri-state
// =========================================================================

#[test]
fn probe_from_result_downgrades_local_errors() {
    let absent = Probe::<()>::from_result(Err(DriverError::ElementNotFound {
        locator: "#x".into(),
    }))
    .unwrap();
    assert_eq!(absent, Probe::Absent);

    let failed = Probe::<()>::from_result(Err(DriverError::Timeout {
        command: "query_visible".into(),
        ms: 5000,
    }))
    .unwrap();
    assert!(matches!(failed, Probe::Failed(_)));

    let fatal = Probe::<()>::from_result(Err(DriverError::SessionIO("pipe closed".into())));
    assert!(fatal.is_err());
}

#[test]
fn probe_visible_and_enabled_against_mock_page() {
    let mut driver = MockDriver::new(FORM_URL, registration_step()).without("#gone");
    driver.render(
        PageState::new(FORM_URL, registration_step())
            .showing(".alert-success")
            .with_disabled(SUBMIT),
    );

    assert!(probe_visible(&mut driver, &Locator::new(".alert-success")).unwrap().is_present());
    assert_eq!(probe_visible(&mut driver, &Locator::new(".error")).unwrap(), Probe::Absent);
    assert_eq!(
        probe_enabled(&mut driver, &Locator::new(SUBMIT)).unwrap(),
        Probe::Present(false)
    );
    assert_eq!(probe_enabled(&mut driver, &Locator::new("#gone")).unwrap(), Probe::Absent);
}

#[test]
fn tolerate_reports_skipped_interaction() {
    let mut driver = MockDriver::new(FORM_URL, registration_step()).without("#gone");

    let done = tolerate(&mut driver, "fill", |d| d.fill(&Locator::new("#name"), "x")).unwrap();
    let skipped = tolerate(&mut driver, "fill", |d| d.fill(&Locator::new("#gone"), "x")).unwrap();

    assert!(done);
    assert!(!skipped);
}
