//! Class name resolution.
//!
//! A node's root element takes its class from the node's own `className`, merged
//! with the generator's output when the value carries the `+` marker (or is
//! absent). Named sub-elements (`"label"`, `"input"`, ...) ignore `className`
//! and ask the generator, falling back to a caller supplied default.

use sdui_model::class_name::{combine, render_class_name, wants_merge};
use sdui_model::{ClassName, ComponentNode};
use std::collections::HashMap;
use tracing::trace;

/// Arguments passed to a [`ClassNameGenerator`]
#[derive(Debug, Clone, Copy)]
pub struct GeneratorArgs<'a> {
    pub node: &'a ComponentNode,
    pub full_path: &'a str,
    pub sub_element: Option<&'a str>,
}

/// Supplies default classes for nodes and their sub-elements (a theme).
pub trait ClassNameGenerator: Send + Sync {
    fn generate(&self, args: &GeneratorArgs<'_>) -> Option<ClassName>;
}

impl<F> ClassNameGenerator for F
where
    F: Fn(&GeneratorArgs<'_>) -> Option<ClassName> + Send + Sync,
{
    fn generate(&self, args: &GeneratorArgs<'_>) -> Option<ClassName> {
        self(args)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    pub sub_element: Option<&'a str>,
    pub fallback: Option<&'a ClassName>,
}

impl<'a> ResolveOptions<'a> {
    pub fn sub_element(name: &'a str) -> Self {
        Self {
            sub_element: Some(name),
            fallback: None,
        }
    }

    pub fn fallback(fallback: &'a ClassName) -> Self {
        Self {
            sub_element: None,
            fallback: Some(fallback),
        }
    }

    pub fn with_fallback(mut self, fallback: &'a ClassName) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Compute the final class string for a node or one of its sub-elements.
pub fn resolve_class_name(
    generator: Option<&dyn ClassNameGenerator>,
    full_path: &str,
    node: &ComponentNode,
    options: ResolveOptions<'_>,
) -> String {
    let generate = |sub_element: Option<&str>| -> Option<ClassName> {
        if !node.takes_class_name() {
            return None;
        }
        generator.and_then(|generator| {
            generator.generate(&GeneratorArgs {
                node,
                full_path,
                sub_element,
            })
        })
    };

    match options.sub_element {
        Some(sub_element) => {
            let generated = generate(Some(sub_element)).filter(|c| !c.is_blank());
            trace!(tag = node.tag(), sub_element, ?generated, "Sub-element class name");
            render_class_name(generated.as_ref().or(options.fallback))
        }
        None => {
            let own = node.class_name();
            if wants_merge(own) {
                let generated = generate(None);
                combine(generated.as_ref().or(options.fallback), own)
            } else {
                render_class_name(own)
            }
        }
    }
}

/// Generator backed by a static map of `"<Type>"` / `"<Type>.<subElement>"` to classes.
#[derive(Debug, Clone, Default)]
pub struct ThemeClassNames {
    classes: HashMap<String, ClassName>,
}

impl ThemeClassNames {
    pub fn new(classes: HashMap<String, ClassName>) -> Self {
        Self { classes }
    }

    pub fn insert(&mut self, key: impl Into<String>, class_name: impl Into<ClassName>) {
        self.classes.insert(key.into(), class_name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassNameGenerator for ThemeClassNames {
    fn generate(&self, args: &GeneratorArgs<'_>) -> Option<ClassName> {
        let key = match args.sub_element {
            Some(sub_element) => format!("{}.{}", args.node.tag(), sub_element),
            None => args.node.tag().to_string(),
        };
        self.classes.get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn div_with(class_name: serde_json::Value) -> ComponentNode {
        ComponentNode::from_value(json!({"type": "Div", "components": [], "className": class_name}))
    }

    fn bar(_: &GeneratorArgs<'_>) -> Option<ClassName> {
        Some(ClassName::from("bar"))
    }

    #[test]
    fn test_merge_cases() {
        let generator: &dyn ClassNameGenerator = &bar;
        let resolve = |value| resolve_class_name(Some(generator), "/", &div_with(value), Default::default());

        assert_eq!(resolve(json!("+ foo")), "bar foo");
        assert_eq!(resolve(json!(["+", "foo", "baz"])), "bar foo baz");
        assert_eq!(resolve(json!({"foo": true, "+": true, "bar": false})), "bar foo");
    }

    #[test]
    fn test_no_marker_skips_generator() {
        let calls = AtomicUsize::new(0);
        let counting = |_: &GeneratorArgs<'_>| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(ClassName::from("bar"))
        };
        let result = resolve_class_name(Some(&counting), "/", &div_with(json!("foo")), Default::default());
        assert_eq!(result, "foo");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_absent_class_name_generates() {
        let node = ComponentNode::div(vec![]);
        assert_eq!(resolve_class_name(Some(&bar), "/", &node, Default::default()), "bar");

        let fallback = ClassName::from("dft");
        assert_eq!(
            resolve_class_name(None, "/", &node, ResolveOptions::fallback(&fallback)),
            "dft"
        );
    }

    #[test]
    fn test_sub_element_ignores_own_class() {
        let node = div_with(json!("own"));
        let generator = |args: &GeneratorArgs<'_>| match args.sub_element {
            Some("label") => Some(ClassName::from("form-label")),
            _ => None,
        };
        let fallback = ClassName::from("fallback");

        assert_eq!(
            resolve_class_name(Some(&generator), "/", &node, ResolveOptions::sub_element("label")),
            "form-label"
        );
        assert_eq!(
            resolve_class_name(
                Some(&generator),
                "/",
                &node,
                ResolveOptions::sub_element("input").with_fallback(&fallback)
            ),
            "fallback"
        );
    }

    #[test]
    fn test_blank_sub_element_class_uses_fallback() {
        let node = ComponentNode::div(vec![]);
        let blank = |_: &GeneratorArgs<'_>| Some(ClassName::from(""));
        let fallback = ClassName::from("form-control");

        assert_eq!(
            resolve_class_name(
                Some(&blank),
                "/",
                &node,
                ResolveOptions::sub_element("input").with_fallback(&fallback)
            ),
            "form-control"
        );
        assert_eq!(
            resolve_class_name(Some(&blank), "/", &node, ResolveOptions::sub_element("input")),
            ""
        );
    }

    #[test]
    fn test_generator_receives_path() {
        let generator = |args: &GeneratorArgs<'_>| {
            (args.full_path == "/users").then(|| ClassName::from("active"))
        };
        let node = ComponentNode::div(vec![]);
        assert_eq!(resolve_class_name(Some(&generator), "/users", &node, Default::default()), "active");
        assert_eq!(resolve_class_name(Some(&generator), "/", &node, Default::default()), "");
    }

    #[test]
    fn test_theme_lookup() {
        let mut theme = ThemeClassNames::default();
        theme.insert("Div", "container");
        theme.insert("FormFieldInput.label", "form-label");

        let div = ComponentNode::div(vec![]);
        assert_eq!(resolve_class_name(Some(&theme), "/", &div, Default::default()), "container");

        let input = ComponentNode::from_value(json!({"type": "FormFieldInput", "name": "a", "title": "A"}));
        assert_eq!(
            resolve_class_name(Some(&theme), "/", &input, ResolveOptions::sub_element("label")),
            "form-label"
        );
    }
}
