//! Test dev reload polling

mod common;

use common::{app, app_with, MockTransport};
use sdui_client::ClientConfig;
use sdui_renderer::{ErrorDetails, Renderer};

const RELOAD_URL: &str = "/api/__dev__/reload";

fn dev_config() -> ClientConfig {
    ClientConfig {
        dev_mode: true,
        ..ClientConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_reloads_on_changed_token() {
    let transport = MockTransport::new();
    transport.respond(RELOAD_URL, 200, "10");
    transport.respond(RELOAD_URL, 200, "10");
    transport.respond(RELOAD_URL, 200, "1.1");
    transport.respond(RELOAD_URL, 404, "");

    let config = dev_config();
    let renderer = Renderer::new(config.endpoint());
    let app = app_with(&transport, "/", renderer, config);
    let before = app.state().navigation.current_load();
    app.state()
        .errors
        .set(Some(ErrorDetails::new("Request Error", "fetch failed")));

    let handle = app.start_dev_reload().expect("dev mode on");
    let count = handle.await.expect("dev reload task");

    assert_eq!(count, 4);
    assert_eq!(transport.count(RELOAD_URL), 4);
    let load = app.state().navigation.current_load();
    assert_eq!(load.seq, before.seq + 2);
    assert_eq!(load.reload_value, 11);
    assert_eq!(load.path.as_deref(), Some("/"));
    assert!(!app.state().errors.is_set());

    println!("✓ Changed tokens reload the page, 404 stops polling");
}

#[tokio::test(start_paused = true)]
async fn test_stops_after_repeated_failures() {
    let transport = MockTransport::new();
    transport.respond(RELOAD_URL, 500, "");

    let config = dev_config();
    let renderer = Renderer::new(config.endpoint());
    let app = app_with(&transport, "/", renderer, config);
    let before = app.state().navigation.current_load();

    let count = app.start_dev_reload().expect("dev mode on").await.expect("dev reload task");
    assert_eq!(count, 5);
    assert_eq!(transport.count(RELOAD_URL), 5);
    assert_eq!(app.state().navigation.current_load(), before);

    println!("✓ Dev reload gives up after five failed polls");
}

#[tokio::test]
async fn test_disabled_outside_dev_mode() {
    let transport = MockTransport::new();
    let app = app(&transport, "/");
    assert!(app.start_dev_reload().is_none());
    assert!(transport.requests().is_empty());

    println!("✓ Dev reload only runs in dev mode");
}
