//! Test form submission and select search against an in-memory backend

mod common;

use common::{app, MockTransport};
use sdui_client::{App, ClientError, FilePart, FormValues, Method};
use sdui_model::forms::SelectOption;
use sdui_model::SelectItem;
use sdui_renderer::Handler;
use serde_json::{json, Value};
use std::sync::Arc;

fn values(pairs: &[(&str, &str)]) -> FormValues {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn form_page(method: &str) -> Value {
    json!([{
        "type": "ModelForm",
        "submitUrl": "/api/login",
        "method": method,
        "formFields": [
            {"type": "FormFieldInput", "name": "email", "title": "Email", "required": true},
            {"type": "FormFieldInput", "name": "password", "title": "Password", "htmlType": "password"}
        ]
    }])
}

/// Load a page holding one form and return the form's key
async fn form_app(method: &str) -> (Arc<MockTransport>, App, String) {
    let transport = MockTransport::new();
    transport.respond_json("/api/login-page", 200, form_page(method));
    let mut app = app(&transport, "/login-page");
    let output = app.settle().await;

    let form = output
        .find(&|node| node.handler("submit").is_some())
        .expect("rendered form");
    let Some(Handler::SubmitForm { form: key }) = form.handler("submit").cloned() else {
        panic!("form without submit handler");
    };
    (transport, app, key)
}

#[tokio::test]
async fn test_validation_errors_attach_to_fields() {
    let (transport, mut app, key) = form_app("POST").await;
    transport.respond_json(
        "/api/login",
        422,
        json!({"detail": {"form": [{"type": "value_error", "loc": ["email"], "msg": "not a valid email"}]}}),
    );

    app.submit_form(&key, values(&[("email", "nope"), ("password", "x")]))
        .await
        .expect("422 is handled");

    let request = transport.requests().pop().expect("submit request");
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.form, Some(values(&[("email", "nope"), ("password", "x")])));

    let state = app.state().forms.state(&key);
    assert!(!state.locked);
    assert_eq!(state.field_errors["email"], "not a valid email");
    assert!(!app.state().errors.is_set());
    assert!(app.render().text().contains("not a valid email"));

    println!("✓ 422 field errors are shown next to their fields");
}

#[tokio::test]
async fn test_file_fields_travel_with_post() {
    let (transport, app, key) = form_app("POST").await;
    transport.respond_json(
        "/api/login",
        200,
        json!({"type": "FormResponse", "event": {"type": "go-to", "url": "/dashboard"}}),
    );

    let avatar = FilePart::new("avatar", "me.png", vec![0x89, b'P', b'N', b'G']).with_content_type("image/png");
    app.submit_form_with_files(&key, values(&[("email", "a@b.c")]), vec![avatar.clone()])
        .await
        .expect("submit succeeds");

    let request = transport.requests().pop().expect("submit request");
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.form, Some(values(&[("email", "a@b.c")])));
    assert_eq!(request.files, vec![avatar]);
    assert!(!app.state().forms.state(&key).locked);

    println!("✓ File fields are sent with POST forms");
}

#[tokio::test]
async fn test_file_fields_dropped_for_get() {
    let (transport, app, key) = form_app("GET").await;
    transport.respond_json(
        "/api/login?email=a%40b.c",
        200,
        json!({"type": "FormResponse", "event": {"type": "go-to", "url": "/dashboard"}}),
    );

    let avatar = FilePart::new("avatar", "me.png", b"png".to_vec());
    app.submit_form_with_files(&key, values(&[("email", "a@b.c")]), vec![avatar])
        .await
        .expect("submit succeeds");

    let request = transport.requests().pop().expect("submit request");
    assert_eq!(request.method, Method::Get);
    assert!(request.files.is_empty());

    println!("✓ GET forms never carry files");
}

#[tokio::test]
async fn test_form_response_fires_event() {
    let (transport, app, key) = form_app("POST").await;
    transport.respond_json(
        "/api/login",
        200,
        json!({"type": "FormResponse", "event": {"type": "go-to", "url": "/dashboard"}}),
    );

    app.submit_form(&key, values(&[("email", "a@b.c"), ("password", "x")]))
        .await
        .expect("submit");
    assert_eq!(app.state().navigation.full_path(), "/dashboard");
    assert!(!app.state().forms.state(&key).locked);

    println!("✓ FormResponse event runs after a successful submit");
}

#[tokio::test]
async fn test_unexpected_success_body() {
    let (transport, app, key) = form_app("POST").await;
    transport.respond_json("/api/login", 200, json!({"ok": true}));

    let err = app
        .submit_form(&key, values(&[("email", "a@b.c")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)));
    let error = app.state().errors.get().expect("error set");
    assert_eq!(error.title, "Invalid Server Response");
    assert!(!app.state().forms.state(&key).locked);

    println!("✓ A 200 without FormResponse is a protocol error");
}

#[tokio::test]
async fn test_goto_form_navigates_without_request() {
    let (transport, app, key) = form_app("GOTO").await;
    let before = transport.requests().len();

    app.submit_form(&key, values(&[("email", "a b"), ("password", "")]))
        .await
        .expect("submit");
    assert_eq!(app.state().navigation.full_path(), "/api/login?email=a+b");
    assert_eq!(transport.requests().len(), before);

    println!("✓ GOTO forms navigate with the non-empty values");
}

#[tokio::test]
async fn test_get_form_sends_query() {
    let (transport, app, key) = form_app("GET").await;
    transport.respond_json(
        "/api/login?email=a%40b.c&password=x",
        200,
        json!({"type": "FormResponse", "event": {"type": "back"}}),
    );

    app.submit_form(&key, values(&[("email", "a@b.c"), ("password", "x")]))
        .await
        .expect("submit");
    let request = transport.requests().pop().expect("submit request");
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.form, None);
    assert_eq!(transport.count("/api/login?email=a%40b.c&password=x"), 1);

    println!("✓ GET forms send their values as the query");
}

#[tokio::test]
async fn test_non_field_validation_error() {
    let (transport, app, key) = form_app("POST").await;
    transport.respond_json("/api/login", 422, json!({"detail": "rate limited"}));

    app.submit_form(&key, values(&[("email", "a@b.c")]))
        .await
        .expect("422 is handled");
    let state = app.state().forms.state(&key);
    assert_eq!(state.error.as_deref(), Some("Error submitting form"));
    assert!(state.field_errors.is_empty());

    println!("✓ 422 without field errors shows the generic form error");
}

#[tokio::test]
async fn test_unknown_form() {
    let transport = MockTransport::new();
    let app = app(&transport, "/");
    let err = app.submit_form("nope", values(&[])).await.unwrap_err();
    assert!(matches!(err, ClientError::UnknownForm(_)));
    assert!(transport.requests().is_empty());

    println!("✓ Submitting an unregistered form fails");
}

#[tokio::test(start_paused = true)]
async fn test_search_debounce_keeps_latest() {
    let transport = MockTransport::new();
    transport.respond_json(
        "/api/countries?q=sw",
        200,
        json!({"options": [{"value": "se", "label": "Sweden"}, {"value": "ch", "label": "Switzerland"}]}),
    );
    let app = app(&transport, "/");

    let (first, second) = tokio::join!(
        app.search("/api/countries", 300, "s"),
        app.search("/api/countries", 300, "sw"),
    );
    assert_eq!(first.expect("first search"), None);
    let options = second.expect("second search").expect("latest options");
    assert_eq!(
        options[0],
        SelectItem::Option(SelectOption {
            value: "se".to_string(),
            label: "Sweden".to_string(),
        })
    );
    assert_eq!(options.len(), 2);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(transport.count("/api/countries?q=sw"), 1);

    println!("✓ Only the latest debounced query is sent");
}
