//! Links and the components built out of them.

use crate::error::{RenderError, RenderResult};
use crate::navigation::path_match;
use crate::renderer::RenderPass;
use crate::vdom::{Handler, VNode};
use sdui_model::component::{ActiveMatch, Footer, Link, LinkList, LinkMode, Navbar, Pagination};
use sdui_model::{AnyEvent, ComponentNode};
use serde_json::{json, Map};

pub(crate) fn link(link: &Link, node: &ComponentNode, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    let active = match link.active {
        Some(ActiveMatch::Flag(flag)) => flag,
        Some(ActiveMatch::Pattern(ref pattern)) => {
            path_match(pattern, pass.full_path()).map_err(|err| RenderError::InvalidPattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?
        }
        None => false,
    };

    let class = pass.class_name(node);
    let children = pass.render_children("components", &link.components);
    let anchor = link_render(pass, link.on_click.as_ref(), link.locked.unwrap_or(false), class, children);
    Ok(anchor.with_opt_attr("aria-current", active.then_some("page")))
}

/// An anchor firing `on_click`. The href mirrors where a `go-to` would lead so
/// the link also works as a plain link; locked links have none.
pub(crate) fn link_render(
    pass: &RenderPass<'_>,
    on_click: Option<&AnyEvent>,
    locked: bool,
    class: String,
    children: Vec<VNode>,
) -> VNode {
    let anchor = VNode::element("a").with_class(class).with_children(children);
    if locked {
        return anchor.with_attr("aria-disabled", "true");
    }

    let href = match on_click {
        Some(AnyEvent::GoTo(go_to)) => match (&go_to.url, &go_to.query) {
            (Some(url), _) => url.clone(),
            (None, Some(query)) => pass.state().navigation.compute_query(query),
            (None, None) => "#".to_string(),
        },
        _ => "#".to_string(),
    };
    let anchor = anchor.with_attr("href", href);
    match on_click {
        Some(event) => anchor.with_handler(
            "click",
            Handler::Fire {
                event: event.clone(),
            },
        ),
        None => anchor,
    }
}

/// Render `links` as `Link` nodes under the `field` key, each with `mode`
/// applied by `with_mode`.
fn render_links(
    pass: &mut RenderPass<'_>,
    field: &str,
    links: &[Link],
    with_mode: impl Fn(Option<LinkMode>) -> Option<LinkMode>,
) -> Vec<VNode> {
    pass.with_key(field, |pass| {
        links
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let mut link = link.clone();
                link.mode = with_mode(link.mode);
                pass.with_key(index.to_string(), |pass| pass.render_node(&ComponentNode::Link(link)))
            })
            .collect()
    })
}

pub(crate) fn link_list(list: &LinkList, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let class = pass.class_name(node);
    let item_class = pass.sub_class(node, "link-list-item");
    let links = render_links(pass, "links", &list.links, |_| list.mode);
    let items = links
        .into_iter()
        .map(|link| VNode::element("div").with_class(item_class.clone()).with_child(link))
        .collect();
    VNode::element("div").with_class(class).with_children(items)
}

pub(crate) fn navbar(navbar: &Navbar, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let class = pass.class_name(node);
    let contents_class = pass.sub_class(node, "contents");

    let mut contents = Vec::new();
    if let Some(ref title) = navbar.title {
        let title_class = pass.sub_class(node, "title");
        let title = vec![VNode::text(title)];
        contents.push(match navbar.title_event {
            Some(ref event) => link_render(pass, Some(event), false, title_class, title),
            None => VNode::element("span").with_class(title_class).with_children(title),
        });
    }

    let navbar_mode = |mode: Option<LinkMode>| mode.or(Some(LinkMode::Navbar));
    contents.extend(render_links(pass, "startLinks", &navbar.start_links, navbar_mode));
    if !navbar.end_links.is_empty() {
        let end_class = pass.sub_class(node, "end-links");
        let end_links = render_links(pass, "endLinks", &navbar.end_links, navbar_mode);
        contents.push(VNode::element("div").with_class(end_class).with_children(end_links));
    }

    VNode::element("nav")
        .with_class(class)
        .with_child(VNode::element("div").with_class(contents_class).with_children(contents))
}

pub(crate) fn footer(footer: &Footer, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let class = pass.class_name(node);
    let mut children = render_links(pass, "links", &footer.links, |mode| mode.or(Some(LinkMode::Footer)));
    if let Some(ref extra) = footer.extra_text {
        let extra_class = pass.sub_class(node, "extra");
        children.push(
            VNode::element("div")
                .with_class(extra_class)
                .with_child(VNode::text(extra)),
        );
    }
    VNode::element("footer").with_class(class).with_children(children)
}

/// Previous / next links patching the `page` query parameter. Nothing is
/// shown for a single page.
pub(crate) fn pagination(pagination: &Pagination, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let page = pagination.page;
    let page_count = pagination.page_count();
    if page_count <= 1 {
        return VNode::comment("pagination: single page");
    }

    let page_link = |text: &str, target: u64, locked: bool| {
        let mut query = Map::new();
        query.insert("page".to_string(), json!(target));
        Link {
            components: vec![ComponentNode::text(text)],
            on_click: Some(AnyEvent::go_to_query(query)),
            mode: None,
            active: None,
            locked: Some(locked),
            class_name: None,
        }
    };
    let list = ComponentNode::LinkList(LinkList {
        links: vec![
            page_link("Previous", page.saturating_sub(1), page <= 1),
            page_link("Next", page + 1, page >= page_count),
        ],
        mode: Some(LinkMode::Pagination),
        class_name: None,
    });

    let class = pass.class_name(node);
    let links = pass.with_key("links", |pass| pass.render_node(&list));
    VNode::element("div").with_class(class).with_child(links)
}
