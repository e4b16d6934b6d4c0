//! Value display and the data views built on it.

use super::links::link_render;
use super::{as_title, group_thousands};
use crate::error::RenderResult;
use crate::renderer::RenderPass;
use crate::vdom::VNode;
use sdui_model::component::{DataModel, Details, Display, DisplayLookup, Json, Table};
use sdui_model::context::value_to_string;
use sdui_model::{render_event, ComponentNode, DisplayMode};
use serde_json::Value;
use std::borrow::Cow;

pub(crate) fn display(display: &Display, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    let mode = display.mode.unwrap_or_default();
    let rendered = display_value(&display.value, mode, pass);
    Ok(match display.on_click {
        Some(ref event) => link_render(pass, Some(event), false, String::new(), vec![rendered]),
        None => rendered,
    })
}

fn display_value(value: &Value, mode: DisplayMode, pass: &mut RenderPass<'_>) -> VNode {
    if mode == DisplayMode::Json {
        let json = ComponentNode::Json(Json {
            value: value.clone(),
            class_name: None,
        });
        return pass.with_key("json", |pass| pass.render_node(&json));
    }

    match value {
        Value::Array(items) => {
            let spans = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let item = nested(pass, index.to_string(), item, mode);
                    VNode::element("span")
                        .with_child(item)
                        .with_child(VNode::text(", "))
                })
                .collect();
            VNode::fragment(spans)
        }
        Value::Object(entries) => {
            let spans = entries
                .iter()
                .map(|(key, item)| {
                    let item = nested(pass, key.clone(), item, mode);
                    VNode::element("span")
                        .with_child(VNode::text(format!("{}: ", key)))
                        .with_child(item)
                        .with_child(VNode::text(", "))
                })
                .collect();
            VNode::fragment(spans)
        }
        primitive => display_primitive(primitive, mode),
    }
}

/// Elements of arrays and objects go through dispatch so a custom `Display`
/// renderer sees them too.
fn nested(pass: &mut RenderPass<'_>, key: String, value: &Value, mode: DisplayMode) -> VNode {
    let node = ComponentNode::Display(Display {
        value: value.clone(),
        mode: Some(mode),
        on_click: None,
    });
    pass.with_key(key, |pass| pass.render_node(&node))
}

fn display_primitive(value: &Value, mode: DisplayMode) -> VNode {
    if value.is_null() {
        return VNode::element("span").with_class("fu-null").with_child(VNode::text("—"));
    }

    match mode {
        DisplayMode::Auto => match value {
            Value::Bool(true) => VNode::text("✓"),
            Value::Bool(false) => VNode::text("×"),
            Value::Number(_) => VNode::text(group_thousands(&value_to_string(value))),
            _ => VNode::text(value_to_string(value)),
        },
        DisplayMode::AsTitle => VNode::text(as_title(&value_to_string(value))),
        DisplayMode::InlineCode | DisplayMode::Json => VNode::element("code")
            .with_class("fu-inline-code")
            .with_child(VNode::text(value_to_string(value))),
        DisplayMode::Plain
        | DisplayMode::Datetime
        | DisplayMode::Date
        | DisplayMode::Duration
        | DisplayMode::Markdown => VNode::text(value_to_string(value)),
    }
}

/// One looked up field of a row, with its `onClick` filled from the row.
/// A null in the url suppresses the link; a missing key fails the node.
fn lookup_cell(lookup: &DisplayLookup, row: &DataModel, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    let value = row.get(&lookup.field).cloned().unwrap_or(Value::Null);
    let on_click = render_event(lookup.on_click.as_ref(), row)?;
    let display = ComponentNode::Display(Display {
        value,
        mode: lookup.mode,
        on_click,
    });
    Ok(pass.render_node(&display))
}

fn lookup_title(lookup: &DisplayLookup) -> String {
    lookup.title.clone().unwrap_or_else(|| as_title(&lookup.field))
}

pub(crate) fn table(table: &Table, node: &ComponentNode, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    let columns: Cow<'_, [DisplayLookup]> = if table.columns.is_empty() {
        let first = table.data.first().map(|row| row.keys().map(DisplayLookup::field).collect::<Vec<_>>());
        Cow::Owned(first.unwrap_or_default())
    } else {
        Cow::Borrowed(&table.columns)
    };

    let class = pass.class_name(node);
    let header = columns
        .iter()
        .map(|column| {
            VNode::element("th")
                .with_opt_attr(
                    "style",
                    column.table_width_percent.map(|width| format!("width: {}%", width)),
                )
                .with_child(VNode::text(lookup_title(column)))
        })
        .collect();

    let rows = pass.with_key("data", |pass| {
        table
            .data
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                pass.with_key(row_index.to_string(), |pass| {
                    let cells = columns
                        .iter()
                        .enumerate()
                        .map(|(col_index, column)| {
                            let cell = pass.with_key(col_index.to_string(), |pass| lookup_cell(column, row, pass))?;
                            Ok(VNode::element("td").with_child(cell))
                        })
                        .collect::<RenderResult<Vec<_>>>()?;
                    Ok(VNode::element("tr").with_children(cells))
                })
            })
            .collect::<RenderResult<Vec<_>>>()
    })?;

    let mut element = VNode::element("table")
        .with_class(class)
        .with_child(VNode::element("thead").with_child(VNode::element("tr").with_children(header)))
        .with_child(VNode::element("tbody").with_children(rows));

    if table.data.is_empty() {
        let message = table
            .no_data_message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or("No data");
        element = element.with_child(
            VNode::element("caption")
                .with_class(pass.sub_class(node, "no-data-message"))
                .with_child(VNode::text(message)),
        );
    }
    Ok(element)
}

pub(crate) fn details(details: &Details, node: &ComponentNode, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    let class = pass.class_name(node);
    let dt_class = pass.sub_class(node, "dt");
    let dd_class = pass.sub_class(node, "dd");

    let mut children = Vec::with_capacity(details.fields.len() * 2);
    pass.with_key("fields", |pass| -> RenderResult<()> {
        for (index, lookup) in details.fields.iter().enumerate() {
            let value = pass.with_key(index.to_string(), |pass| lookup_cell(lookup, &details.data, pass))?;
            children.push(
                VNode::element("dt")
                    .with_class(dt_class.clone())
                    .with_child(VNode::text(lookup_title(lookup))),
            );
            children.push(VNode::element("dd").with_class(dd_class.clone()).with_child(value));
        }
        Ok(())
    })?;

    Ok(VNode::element("dl").with_class(class).with_children(children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_modes() {
        assert_eq!(display_primitive(&Value::Null, DisplayMode::Auto).text_content(), "—");
        assert_eq!(display_primitive(&json!(true), DisplayMode::Auto).text_content(), "✓");
        assert_eq!(display_primitive(&json!(false), DisplayMode::Auto).text_content(), "×");
        assert_eq!(display_primitive(&json!(1234567), DisplayMode::Auto).text_content(), "1,234,567");
        assert_eq!(display_primitive(&json!(1234567), DisplayMode::Plain).text_content(), "1234567");
        assert_eq!(display_primitive(&json!("first_name"), DisplayMode::AsTitle).text_content(), "First Name");

        let code = display_primitive(&json!("x"), DisplayMode::InlineCode);
        assert_eq!(code.attr("class"), Some("fu-inline-code"));
    }
}
