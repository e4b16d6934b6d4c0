//! Test full render cycles: page loads, navigation, errors and forms

use sdui_model::ComponentNode;
use sdui_renderer::vdom::VNode;
use sdui_renderer::{
    to_html, CommitResult, Endpoint, ErrorDetails, Handler, HtmlOptions, LoadOutcome, RenderOutput, Renderer,
    ThemeClassNames, UiState,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn nodes(value: Value) -> Vec<ComponentNode> {
    ComponentNode::list_from_value(value).unwrap()
}

fn users_page() -> Vec<ComponentNode> {
    nodes(json!([{
        "type": "Page",
        "className": "+ container",
        "components": [
            {"type": "PageTitle", "text": "Users"},
            {"type": "Heading", "text": "Users"},
            {
                "type": "Link",
                "components": [{"type": "Text", "text": "Next"}],
                "onClick": {"type": "go-to", "query": {"page": 2}}
            }
        ]
    }]))
}

fn fire_click(state: &UiState, node: &VNode) {
    match node.handler("click") {
        Some(Handler::Fire { event }) => state.dispatcher().fire(Some(event)),
        other => panic!("expected a fire handler, got {:?}", other),
    }
}

fn themed() -> Renderer {
    let mut theme = ThemeClassNames::default();
    theme.insert("Page", "page-default");
    Renderer::new(Endpoint::new("/api")).with_class_names(theme)
}

fn first_load(renderer: &Renderer, state: &UiState, page: Vec<ComponentNode>) -> RenderOutput {
    let loading = renderer.render(state);
    assert_eq!(loading.pending.len(), 1);
    let ticket = &loading.pending[0];
    assert_eq!(
        state.slots.commit(ticket, LoadOutcome::Loaded(page)),
        CommitResult::Applied
    );
    renderer.render(state)
}

#[test]
fn test_page_load_and_render() {
    let renderer = themed();
    let state = UiState::new("/");

    let loading = renderer.render(&state);
    assert_eq!(loading.pending[0].url, "/api/");
    assert!(loading.text().contains("loading..."));

    let ticket = loading.pending[0].clone();
    state.slots.commit(&ticket, LoadOutcome::Loaded(users_page()));
    let output = renderer.render(&state);

    assert!(output.pending.is_empty());
    assert_eq!(output.title.as_deref(), Some("Users"));
    let page = output
        .find(&|node| node.attr("class") == Some("page-default container"))
        .expect("page with merged class");
    assert!(page.find(&|node| node.attr("id") == Some("users")).is_some());

    let html = to_html(&output.nodes, HtmlOptions::compact());
    assert!(html.contains("<h1 id=\"users\">Users</h1>"));
    assert!(html.contains("href=\"/?page=2\""));

    println!("✓ Page renders once its load is committed");
}

#[test]
fn test_navigation_keeps_previous_page_while_loading() {
    let renderer = themed();
    let state = UiState::new("/");
    let output = first_load(&renderer, &state, users_page());
    let before = state.navigation.current_load();

    let next = output.find(&|node| node.text_content() == "Next" && node.attr("href").is_some());
    fire_click(&state, next.expect("next link"));
    assert_eq!(state.navigation.full_path(), "/?page=2");
    assert_ne!(state.navigation.current_load(), before);

    let transitioning = renderer.render(&state);
    assert_eq!(transitioning.pending.len(), 1);
    assert_eq!(transitioning.pending[0].url, "/api/?page=2");
    let busy = transitioning
        .find(&|node| node.attr("aria-busy") == Some("true"))
        .expect("busy wrapper");
    assert!(busy.text_content().contains("Users"));

    // a cosmetic navigation must not refetch
    let ticket = transitioning.pending[0].clone();
    state
        .slots
        .commit(&ticket, LoadOutcome::Loaded(nodes(json!([{"type": "Text", "text": "page two"}]))));
    state.navigation.goto_cosmetic("/?page=2#bottom");
    let settled = renderer.render(&state);
    assert!(settled.pending.is_empty());
    assert_eq!(settled.text(), "page two");

    println!("✓ Navigation reloads once and keeps the old page while pending");
}

#[test]
fn test_stale_result_dropped() {
    let renderer = Renderer::new(Endpoint::new("/api"));
    let state = UiState::new("/a");

    let first = renderer.render(&state).pending[0].clone();
    state.navigation.goto("/b");
    let second = renderer.render(&state).pending[0].clone();

    assert_eq!(
        state.slots.commit(&second, LoadOutcome::Loaded(nodes(json!([{"type": "Text", "text": "b"}])))),
        CommitResult::Applied
    );
    assert_eq!(
        state.slots.commit(&first, LoadOutcome::Loaded(nodes(json!([{"type": "Text", "text": "a"}])))),
        CommitResult::Stale
    );
    assert_eq!(renderer.render(&state).text(), "b");

    println!("✓ Results of superseded loads are dropped");
}

#[test]
fn test_not_found_and_error_panel() {
    let renderer = Renderer::new(Endpoint::new("/api"));
    let state = UiState::new("/missing");

    let ticket = renderer.render(&state).pending[0].clone();
    state.slots.commit(&ticket, LoadOutcome::NotFound);
    let output = renderer.render(&state);
    assert_eq!(output.text(), "Page not found: /api/missing");

    state.navigation.goto("/down");
    let ticket = renderer.render(&state).pending[0].clone();
    state
        .errors
        .set(Some(ErrorDetails::new("Request Error", "Bad Gateway (502)").with_status(502)));
    state.slots.commit(&ticket, LoadOutcome::Failed);

    let output = renderer.render(&state);
    assert_eq!(output.nodes[0].attr("role"), Some("alert"));
    assert_eq!(output.nodes[0].text_content(), "Backend server down.");
    assert!(!output.text().contains("loading..."));

    state.errors.clear();
    let output = renderer.render(&state);
    assert!(output.find(&|node| node.attr("role") == Some("alert")).is_none());

    println!("✓ 404 and error slot render their panels");
}

#[test]
fn test_deferred_server_load() {
    let renderer = Renderer::new(Endpoint::new("/api"));
    let state = UiState::new("/");
    let page = nodes(json!([{
        "type": "ServerLoad",
        "path": "/details/{id}",
        "loadTrigger": {"type": "page", "name": "show"},
        "components": [{"type": "Text", "text": "pick a row"}]
    }]));
    let output = first_load(&renderer, &state, page);
    assert!(output.pending.is_empty());
    assert_eq!(output.text(), "pick a row");

    let mut context = serde_json::Map::new();
    context.insert("id".to_string(), json!(7));
    state.events.fire(&sdui_model::PageEvent {
        name: "show".to_string(),
        context: Some(context),
        ..Default::default()
    });
    let output = renderer.render(&state);
    assert_eq!(output.pending.len(), 1);
    assert_eq!(output.pending[0].url, "/api/details/7");
    assert_eq!(output.pending[0].key, "root/>/0");

    println!("✓ Deferred ServerLoad waits for its trigger");
}

#[test]
fn test_form_state_layered_over_fields() {
    let renderer = Renderer::new(Endpoint::new("/api"));
    let state = UiState::new("/");
    let tree = nodes(json!([{
        "type": "ModelForm",
        "submitUrl": "/api/login",
        "formFields": [
            {"type": "FormFieldInput", "name": "email", "title": "Email", "required": true},
            {"type": "FormFieldInput", "name": "password", "title": "Password", "htmlType": "password"}
        ],
        "loading": [{"type": "Text", "text": "Signing in"}]
    }]));

    let output = renderer.render_nodes(&state, &tree);
    let form = output.nodes[0].find_tag("form").expect("form element");
    let Some(Handler::SubmitForm { form: key }) = form.handler("submit").cloned() else {
        panic!("form without submit handler");
    };
    let target = state.forms.target(&key).expect("registered form");
    assert_eq!(target.fields, vec!["email".to_string(), "password".to_string()]);
    assert!(output.text().contains("Submit"));

    let guard = state.forms.begin_submit(&key).expect("first submit");
    assert!(state.forms.begin_submit(&key).is_none());
    let locked = renderer.render_nodes(&state, &tree);
    assert!(locked.text().contains("Signing in"));
    let email = locked.find(&|node| node.attr("name") == Some("email")).expect("email input");
    assert_eq!(email.attr("disabled"), Some(""));

    drop(guard);
    let mut errors = HashMap::new();
    errors.insert("email".to_string(), "not a valid email".to_string());
    state.forms.set_field_errors(&key, errors);
    let output = renderer.render_nodes(&state, &tree);
    assert!(output.text().contains("not a valid email"));
    assert!(!output.text().contains("Signing in"));

    println!("✓ Form lock and field errors flow into the rendered fields");
}
