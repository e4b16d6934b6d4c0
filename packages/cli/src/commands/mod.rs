pub mod check;
pub mod init;
pub mod render;
pub mod watch;

pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use watch::{watch, WatchArgs};

use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{bail, Result};
use sdui_client::{App, HttpTransport};
use sdui_renderer::vdom::VNode;
use std::sync::Arc;

/// App talking to the configured backend over HTTP
pub(crate) fn connect(config: &Config, path: &str, token: Option<&str>) -> Result<App> {
    if config.client.origin.is_none() {
        bail!(
            "No backend origin: pass --origin or set \"origin\" in {}",
            DEFAULT_CONFIG_NAME
        );
    }
    let transport = HttpTransport::new(config.client.origin.as_deref())?;
    let app = App::new(config.renderer(), Arc::new(transport), config.client.clone(), path);
    if let Some(token) = token {
        app.state().auth.set(Some(token.to_string()));
    }
    Ok(app)
}

/// Text of every alert panel in the tree, outermost first
pub(crate) fn alerts(nodes: &[VNode]) -> Vec<String> {
    let mut found = Vec::new();
    collect_alerts(nodes, &mut found);
    found
}

fn collect_alerts(nodes: &[VNode], found: &mut Vec<String>) {
    for node in nodes {
        if node.attr("role") == Some("alert") {
            found.push(node.text_content());
        } else {
            collect_alerts(node.children(), found);
        }
    }
}
