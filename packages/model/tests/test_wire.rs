//! Decoding full backend responses

use sdui_model::component::{ActiveMatch, FormFooter, FormMethod};
use sdui_model::{AnyEvent, ComponentNode};
use serde_json::json;

#[test]
fn test_decode_page_response() {
    let response = json!([
        {"type": "PageTitle", "text": "Users"},
        {"type": "Navbar", "title": "Demo", "links": [
            {"type": "Link", "components": [{"type": "Text", "text": "Home"}],
             "onClick": {"type": "go-to", "url": "/"}, "active": "startswith:/"}
        ]},
        {"type": "Page", "components": [
            {"type": "Table",
             "data": [{"id": 1, "name": "Ann"}],
             "columns": [{"field": "name", "onClick": {"type": "go-to", "url": "/users/{id}/"}}]},
            {"type": "Pagination", "page": 1, "pageSize": 10, "total": 5}
        ]}
    ]);

    let nodes = ComponentNode::list_from_value(response).unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].tag(), "PageTitle");

    let ComponentNode::Navbar(navbar) = &nodes[1] else {
        panic!("expected navbar, got {:?}", nodes[1]);
    };
    assert_eq!(navbar.start_links.len(), 1);
    assert_eq!(
        navbar.start_links[0].active,
        Some(ActiveMatch::Pattern("startswith:/".to_string()))
    );
    assert_eq!(navbar.start_links[0].on_click, Some(AnyEvent::go_to("/")));

    println!("✓ Page response decodes");
}

#[test]
fn test_non_array_response_is_rejected() {
    assert!(ComponentNode::list_from_value(json!({"type": "Text", "text": "x"})).is_err());
    println!("✓ Non-array response rejected");
}

#[test]
fn test_decode_form() {
    let node = ComponentNode::from_value(json!({
        "type": "ModelForm",
        "submitUrl": "/api/users/",
        "method": "GOTO",
        "footer": false,
        "formFields": [
            {"type": "FormFieldInput", "name": "name", "title": "Name", "required": true},
            {"type": "FormFieldBoolean", "name": "admin", "title": "Admin", "initial": true},
            {"type": "FormFieldSelect", "name": "role", "title": "Role",
             "options": [{"value": "a", "label": "A"}]},
            {"type": "FormFieldSelectSearch", "name": "city", "title": "City",
             "searchUrl": "/api/cities/"}
        ]
    }));

    let ComponentNode::ModelForm(form) = node else {
        panic!("expected model form");
    };
    assert_eq!(form.method, FormMethod::Goto);
    assert_eq!(form.footer, Some(FormFooter::Show(false)));
    assert_eq!(form.form_fields.len(), 4);
    for field in &form.form_fields {
        assert!(field.form_field().is_some(), "{} is a form field", field.tag());
    }

    println!("✓ Form decodes");
}

#[test]
fn test_round_trip_preserves_unknown_payload() {
    let raw = json!([{"type": "Div", "components": [{"type": "Chart", "series": [1, 2, 3]}]}]);
    let nodes = ComponentNode::list_from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&nodes).unwrap(), raw);

    println!("✓ Unknown payload survives re-encoding");
}
