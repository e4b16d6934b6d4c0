//! Forms and their fields.
//!
//! A form registers itself in the [`FormStore`](crate::forms::FormStore)
//! under its mount key; submission is driven by the client through the
//! `submit-form` handler on the `<form>` element. The store's lock and error
//! state is layered over each field before it is rendered.

use crate::forms::FormTarget;
use crate::renderer::RenderPass;
use crate::vdom::{Handler, VNode};
use sdui_model::class_name::is_truthy;
use sdui_model::component::{
    Button, ButtonType, FieldBase, FieldTitle, Form, FormFieldBoolean, FormFieldFile, FormFieldInput,
    FormFieldSelect, FormFieldSelectSearch, FormFooter,
};
use sdui_model::context::value_to_string;
use sdui_model::{ComponentNode, SelectItem, SelectOption};
use serde_json::{Map, Value};

/// Default debounce of select search fields, in milliseconds
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

pub(crate) fn form(form: &Form, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let key = pass.mark_mounted();
    let field_names = form
        .form_fields
        .iter()
        .filter_map(ComponentNode::form_field)
        .map(|field| field.name.clone())
        .collect();
    pass.state().forms.register(
        &key,
        FormTarget {
            submit_url: form.submit_url.clone(),
            method: form.method,
            submit_on_change: form.submit_on_change.unwrap_or(false),
            fields: field_names,
        },
    );
    let state = pass.state().forms.state(&key);

    let fields: Vec<ComponentNode> = form
        .form_fields
        .iter()
        .map(|field| {
            let mut field = field.clone();
            if let Some(base) = field.form_field_mut() {
                if let Some(error) = state.field_errors.get(&base.name) {
                    base.error = Some(error.clone());
                }
                base.locked |= state.locked;
                if form.display_mode.is_some() {
                    base.display_mode = form.display_mode.clone();
                }
            }
            if let Some(initial) = form.initial.as_ref() {
                apply_initial(&mut field, initial);
            }
            field
        })
        .collect();

    let container_class = pass.sub_class(node, "form-container");
    let class = pass.class_name(node);

    let mut children = pass.render_children("formFields", &fields);
    if state.locked {
        if let Some(ref loading) = form.loading {
            children.extend(pass.render_children("loading", loading));
        }
    }
    if let Some(ref error) = state.error {
        children.push(VNode::element("div").with_child(VNode::text(format!("Error: {}", error))));
    }
    children.extend(footer(form.footer.as_ref(), pass));

    let mut element = VNode::element("form")
        .with_class(class)
        .with_handler("submit", Handler::SubmitForm { form: key.clone() })
        .with_children(children);
    if form.submit_on_change.unwrap_or(false) {
        element = element.with_handler("change", Handler::ChangeForm { form: key });
    }

    VNode::element("div").with_class(container_class).with_child(element)
}

fn footer(footer: Option<&FormFooter>, pass: &mut RenderPass<'_>) -> Vec<VNode> {
    match footer {
        Some(FormFooter::Show(false)) => Vec::new(),
        Some(FormFooter::Components(components)) => pass.render_children("footer", components),
        Some(FormFooter::Show(true)) | None => {
            let submit = ComponentNode::Button(Button {
                text: "Submit".to_string(),
                on_click: None,
                html_type: Some(ButtonType::Submit),
                named_style: None,
                class_name: None,
            });
            vec![pass.with_key("footer", |pass| pass.render_node(&submit))]
        }
    }
}

/// Fill a field's initial value from the form's `initial` map
fn apply_initial(field: &mut ComponentNode, initial: &Map<String, Value>) {
    let Some(value) = field.form_field().and_then(|base| initial.get(&base.name)).cloned() else {
        return;
    };
    match field {
        ComponentNode::FormFieldInput(input) => input.initial = Some(value),
        ComponentNode::FormFieldBoolean(boolean) => boolean.initial = Some(is_truthy(&value)),
        ComponentNode::FormFieldSelect(select) => select.initial = Some(value),
        ComponentNode::FormFieldSelectSearch(search) => {
            if let Ok(option) = serde_json::from_value::<SelectOption>(value) {
                search.initial = Some(option);
            }
        }
        _ => {}
    }
}

fn input_id(field: &FieldBase) -> String {
    format!("form-field-{}", field.name)
}

fn description_id(field: &FieldBase) -> Option<String> {
    field
        .description
        .as_ref()
        .map(|_| format!("{}-desc", input_id(field)))
}

fn label(field: &FieldBase, node: &ComponentNode, pass: &RenderPass<'_>) -> VNode {
    let parts = match field.title {
        FieldTitle::Text(ref text) => vec![text.clone()],
        FieldTitle::Path(ref parts) => parts.clone(),
    };
    let spans = parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| {
            let text = if index > 0 { format!(" › {}", part) } else { part };
            VNode::element("span").with_child(VNode::text(text))
        })
        .collect();
    VNode::element("label")
        .with_attr("for", input_id(field))
        .with_class(pass.sub_class(node, "label"))
        .with_children(spans)
}

/// Wrapper, label, control, then description and error
fn field_wrapper(field: &FieldBase, node: &ComponentNode, pass: &RenderPass<'_>, control: VNode) -> VNode {
    let mut wrapper = VNode::element("div")
        .with_class(pass.class_name(node))
        .with_opt_attr("data-display-mode", field.display_mode.as_ref())
        .with_child(label(field, node, pass))
        .with_child(control);
    if let Some(ref description) = field.description {
        wrapper = wrapper.with_child(
            VNode::element("div")
                .with_opt_attr("id", description_id(field))
                .with_class(pass.sub_class(node, "description"))
                .with_child(VNode::text(description)),
        );
    }
    if let Some(ref error) = field.error {
        wrapper = wrapper.with_child(
            VNode::element("div")
                .with_class(pass.sub_class(node, "error"))
                .with_child(VNode::text(error)),
        );
    }
    wrapper
}

/// Attributes every control carries
fn control(tag: &str, field: &FieldBase) -> VNode {
    VNode::element(tag)
        .with_attr("id", input_id(field))
        .with_attr("name", &field.name)
        .with_flag("required", field.required)
        .with_flag("disabled", field.locked)
        .with_opt_attr("aria-describedby", description_id(field))
}

pub(crate) fn input(input: &FormFieldInput, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let field = &input.field;
    let value = input
        .initial
        .as_ref()
        .filter(|value| !value.is_null())
        .map(value_to_string);
    let control = control("input", field)
        .with_attr("type", &input.html_type)
        .with_class(pass.sub_class(node, "input"))
        .with_opt_attr("value", value)
        .with_opt_attr("placeholder", input.placeholder.as_ref());
    field_wrapper(field, node, pass, control)
}

pub(crate) fn boolean(boolean: &FormFieldBoolean, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let field = &boolean.field;
    let mut control = control("input", field)
        .with_attr("type", "checkbox")
        .with_class(pass.sub_class(node, "input"))
        .with_flag("checked", boolean.initial.unwrap_or(false));
    if boolean.mode.as_deref() == Some("switch") {
        control = control.with_attr("role", "switch");
    }
    field_wrapper(field, node, pass, control)
}

pub(crate) fn file(file: &FormFieldFile, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let field = &file.field;
    let control = control("input", field)
        .with_attr("type", "file")
        .with_class(pass.sub_class(node, "input"))
        .with_flag("multiple", file.multiple.unwrap_or(false))
        .with_opt_attr("accept", file.accept.as_ref());
    field_wrapper(field, node, pass, control)
}

/// Values the select starts with: a single value or a list for `multiple`
fn selected_values(initial: Option<&Value>) -> Vec<String> {
    match initial {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values.iter().map(value_to_string).collect(),
        Some(value) => vec![value_to_string(value)],
    }
}

fn option_nodes(items: &[SelectItem], selected: &[String]) -> Vec<VNode> {
    items
        .iter()
        .map(|item| match item {
            SelectItem::Option(option) => VNode::element("option")
                .with_attr("value", &option.value)
                .with_flag("selected", selected.contains(&option.value))
                .with_child(VNode::text(&option.label)),
            SelectItem::Group(group) => {
                let options: Vec<SelectItem> = group.options.iter().cloned().map(SelectItem::Option).collect();
                VNode::element("optgroup")
                    .with_attr("label", &group.label)
                    .with_children(option_nodes(&options, selected))
            }
        })
        .collect()
}

/// `vanilla` selects map to a plain `<select>`; the others keep the same
/// markup under the `select-react` sub-element so a host can enhance them.
pub(crate) fn select(select: &FormFieldSelect, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let field = &select.field;
    let multiple = select.multiple.unwrap_or(false);
    let vanilla = select.vanilla.unwrap_or(false);
    let sub_element = if vanilla { "select" } else { "select-react" };

    let selected = selected_values(select.initial.as_ref());
    let mut options = Vec::new();
    if !multiple {
        options.push(VNode::element("option"));
    }
    options.extend(option_nodes(&select.options, &selected));

    let control = control("select", field)
        .with_class(pass.sub_class(node, sub_element))
        .with_flag("multiple", multiple)
        .with_opt_attr("placeholder", select.placeholder.as_ref())
        .with_children(options);
    field_wrapper(field, node, pass, control)
}

/// Text input that asks the client for options as the user types; the chosen
/// value travels in a hidden input named after the field.
pub(crate) fn select_search(
    search: &FormFieldSelectSearch,
    node: &ComponentNode,
    pass: &mut RenderPass<'_>,
) -> VNode {
    let field = &search.field;
    let debounce_ms = search.debounce.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS);

    let query = VNode::element("input")
        .with_attr("type", "search")
        .with_attr("id", input_id(field))
        .with_attr("autocomplete", "off")
        .with_flag("disabled", field.locked)
        .with_opt_attr("placeholder", search.placeholder.as_ref())
        .with_opt_attr("aria-describedby", description_id(field))
        .with_opt_attr("value", search.initial.as_ref().map(|option| &option.label))
        .with_handler(
            "input",
            Handler::Search {
                url: search.search_url.clone(),
                debounce_ms,
            },
        );
    let value = VNode::element("input")
        .with_attr("type", "hidden")
        .with_attr("name", &field.name)
        .with_flag("required", field.required)
        .with_opt_attr("value", search.initial.as_ref().map(|option| &option.value));

    let control = VNode::element("div")
        .with_class(pass.sub_class(node, "select-react"))
        .with_flag("data-multiple", search.multiple.unwrap_or(false))
        .with_child(query)
        .with_child(value);
    field_wrapper(field, node, pass, control)
}
