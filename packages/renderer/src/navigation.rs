//! Location tracking: a history stack, the current path signal and the load signal.
//!
//! Every navigation funnels through [`Navigation`] so history and the path
//! signal change together.

use crate::errors::ErrorSlot;
use crate::state::lock;
use regex::Regex;
use sdui_model::context::value_to_string;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

/// Dummy origin used to parse paths with the `url` crate
const BASE: &str = "http://sdui.invalid";

/// Request to (re)load the page.
///
/// `seq` changes on every request, so a load for an unchanged path is still
/// distinguishable from no load at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSignal {
    pub seq: u64,
    /// Path to load
    pub path: Option<String>,
    /// Dev reload token that triggered the load, 0 otherwise
    pub reload_value: u64,
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    cursor: usize,
}

#[derive(Debug)]
pub struct Navigation {
    history: Mutex<History>,
    path: watch::Sender<String>,
    load: watch::Sender<LoadSignal>,
    errors: Arc<ErrorSlot>,
    /// Absolute urls on this origin navigate to their path; others are refused
    origin: Mutex<Option<Url>>,
}

impl Navigation {
    pub fn new(initial_path: impl Into<String>, errors: Arc<ErrorSlot>) -> Self {
        let initial = normalize(&initial_path.into());
        let (path, _) = watch::channel(initial.clone());
        let (load, _) = watch::channel(LoadSignal {
            path: Some(initial.clone()),
            ..LoadSignal::default()
        });
        Self {
            history: Mutex::new(History {
                entries: vec![initial],
                cursor: 0,
            }),
            path,
            load,
            errors,
            origin: Mutex::new(None),
        }
    }

    /// Current path including query and fragment
    pub fn full_path(&self) -> String {
        self.path.borrow().clone()
    }

    pub fn subscribe_path(&self) -> watch::Receiver<String> {
        self.path.subscribe()
    }

    pub fn subscribe_load(&self) -> watch::Receiver<LoadSignal> {
        self.load.subscribe()
    }

    pub fn current_load(&self) -> LoadSignal {
        self.load.borrow().clone()
    }

    /// Navigate to `path` and reload from the server.
    ///
    /// A path without a leading `/` is resolved against the current pathname.
    pub fn goto(&self, path: &str) {
        let Some(target) = self.resolve(path) else {
            return;
        };
        debug!(from = %self.full_path(), to = %target, "goto");
        self.push(target.clone());
        self.errors.clear();
        self.fire_load(Some(target), None);
    }

    /// Change the url without reloading anything
    pub fn goto_cosmetic(&self, path: &str) {
        let Some(target) = self.resolve(path) else {
            return;
        };
        debug!(to = %target, "Cosmetic goto");
        self.push(target);
    }

    /// Patch the current query string and navigate there
    pub fn set_query(&self, patch: &Map<String, Value>) {
        let target = self.compute_query(patch);
        self.goto(&target);
    }

    /// A `go-to` event: optional url, then optional query patch, as one navigation.
    pub fn navigate(&self, url: Option<&str>, query: Option<&Map<String, Value>>) {
        let target = match url {
            Some(url) => match self.resolve(url) {
                Some(target) => target,
                None => return,
            },
            None if query.is_some() => self.full_path(),
            None => return,
        };
        let target = match query {
            Some(patch) => patch_query(&target, patch),
            None => target,
        };
        self.goto(&target);
    }

    /// Path the current location would have with `patch` applied to its query.
    /// A `null` value deletes the key.
    pub fn compute_query(&self, patch: &Map<String, Value>) -> String {
        patch_query(&self.full_path(), patch)
    }

    /// History back. Clears the error state and reloads; returns false at the
    /// start of history.
    pub fn back(&self) -> bool {
        let target = {
            let mut history = lock(&self.history);
            if history.cursor == 0 {
                return false;
            }
            history.cursor -= 1;
            history.entries[history.cursor].clone()
        };
        debug!(to = %target, "back");
        self.path.send_replace(target.clone());
        self.errors.clear();
        self.fire_load(Some(target), None);
        true
    }

    /// Ask the page to reload, at `path` or else the current path
    pub fn fire_load(&self, path: Option<String>, reload_value: Option<u64>) {
        let path = path.unwrap_or_else(|| self.full_path());
        self.load.send_modify(|signal| {
            signal.seq += 1;
            signal.path = Some(path);
            signal.reload_value = reload_value.unwrap_or(0);
        });
    }

    pub fn history(&self) -> Vec<String> {
        let history = lock(&self.history);
        history.entries[..=history.cursor].to_vec()
    }

    fn push(&self, target: String) {
        {
            let mut history = lock(&self.history);
            let cursor = history.cursor;
            history.entries.truncate(cursor + 1);
            history.entries.push(target.clone());
            history.cursor += 1;
        }
        self.path.send_replace(target);
    }

    /// Origin the app is served from, for absolute `go-to` urls
    pub fn set_origin(&self, origin: Option<Url>) {
        *lock(&self.origin) = origin;
    }

    /// Location for `path`, `None` when it points at another origin
    fn resolve(&self, path: &str) -> Option<String> {
        if path.starts_with('/') {
            return Some(normalize(path));
        }
        if is_absolute_url(path) {
            let url = match Url::parse(path) {
                Ok(url) => url,
                Err(err) => {
                    warn!(url = path, error = %err, "Refusing navigation to unparsable url");
                    return None;
                }
            };
            let same_origin = lock(&self.origin)
                .as_ref()
                .map_or(false, |origin| origin.origin() == url.origin());
            if !same_origin {
                warn!(url = path, "Refusing navigation to a foreign origin");
                return None;
            }
            return Some(path_of(&url));
        }

        let mut relative = path;
        if let Some(rest) = relative.strip_prefix('.') {
            relative = rest.strip_prefix('/').unwrap_or(rest);
        }

        let current = self.pathname();
        if current.ends_with('/') {
            Some(format!("{}{}", current, relative))
        } else {
            Some(format!("{}/{}", current, relative))
        }
    }

    fn pathname(&self) -> String {
        let full = self.full_path();
        match Url::parse(BASE).and_then(|base| base.join(&full)) {
            Ok(url) => url.path().to_string(),
            Err(_) => full,
        }
    }
}

/// Whether `active` matches `full_path`: `regex:<re>`, `startswith:<prefix>`
/// or an exact comparison.
pub fn path_match(pattern: &str, full_path: &str) -> Result<bool, regex::Error> {
    if let Some(re) = pattern.strip_prefix("regex:") {
        Ok(Regex::new(re)?.is_match(full_path))
    } else if let Some(prefix) = pattern.strip_prefix("startswith:") {
        Ok(full_path.starts_with(prefix))
    } else {
        Ok(full_path == pattern)
    }
}

/// Fragment of a path, without the `#`
pub fn fragment(path: &str) -> Option<&str> {
    path.split_once('#').map(|(_, fragment)| fragment)
}

fn normalize(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

fn path_of(url: &Url) -> String {
    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

fn patch_query(path: &str, patch: &Map<String, Value>) -> String {
    let Ok(mut url) = Url::parse(BASE).and_then(|base| base.join(path)) else {
        return path.to_string();
    };

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in patch {
        match value {
            Value::Null => pairs.retain(|(k, _)| k != key),
            value => {
                let value = value_to_string(value);
                match pairs.iter_mut().find(|(k, _)| k == key) {
                    Some(pair) => pair.1 = value,
                    None => pairs.push((key.clone(), value)),
                }
            }
        }
    }

    url.set_fragment(None);
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
    path_of(&url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nav(path: &str) -> Navigation {
        Navigation::new(path, Arc::new(ErrorSlot::new()))
    }

    fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_goto_pushes_and_fires_load() {
        let nav = nav("/");
        nav.goto("/users");
        assert_eq!(nav.full_path(), "/users");
        let load = nav.current_load();
        assert_eq!(load.seq, 1);
        assert_eq!(load.path.as_deref(), Some("/users"));
    }

    #[test]
    fn test_absolute_urls_need_matching_origin() {
        let nav = nav("/");
        nav.goto("https://other.host/x");
        assert_eq!(nav.full_path(), "/");
        assert_eq!(nav.current_load().seq, 0);

        nav.set_origin(Some(Url::parse("https://app.example").unwrap()));
        nav.goto("https://app.example/users?page=2");
        assert_eq!(nav.full_path(), "/users?page=2");
        assert_eq!(nav.current_load().seq, 1);

        nav.navigate(Some("https://other.host/x"), None);
        nav.goto_cosmetic("http://app.example/insecure");
        assert_eq!(nav.full_path(), "/users?page=2");
        assert_eq!(nav.history(), vec!["/".to_string(), "/users?page=2".to_string()]);
    }

    #[test]
    fn test_relative_goto() {
        let nav = nav("/users/");
        nav.goto("./42");
        assert_eq!(nav.full_path(), "/users/42");
        nav.goto("edit");
        assert_eq!(nav.full_path(), "/users/42/edit");
        nav.goto(".edit");
        assert_eq!(nav.full_path(), "/users/42/edit/edit");
    }

    #[test]
    fn test_compute_query_patch() {
        let nav = nav("/list?page=1&q=x");
        assert_eq!(nav.compute_query(&patch(json!({"page": 2}))), "/list?page=2&q=x");
        assert_eq!(nav.compute_query(&patch(json!({"q": null}))), "/list?page=1");
        assert_eq!(nav.compute_query(&patch(json!({"page": null, "q": null}))), "/list");
        assert_eq!(nav.compute_query(&patch(json!({"sort": "name"}))), "/list?page=1&q=x&sort=name");
    }

    #[test]
    fn test_navigate_with_query_fires_one_load() {
        let nav = nav("/list?page=1");
        nav.navigate(None, Some(&patch(json!({"page": 2}))));
        assert_eq!(nav.full_path(), "/list?page=2");
        assert_eq!(nav.current_load().seq, 1);
    }

    #[test]
    fn test_back_clears_error_and_reloads() {
        let errors = Arc::new(ErrorSlot::new());
        let nav = Navigation::new("/a", Arc::clone(&errors));
        nav.goto("/b");
        errors.set(Some(crate::errors::ErrorDetails::new("x", "y")));

        assert!(nav.back());
        assert_eq!(nav.full_path(), "/a");
        assert!(!errors.is_set());
        assert_eq!(nav.current_load().seq, 2);
        assert!(!nav.back());
    }

    #[test]
    fn test_cosmetic_goto_does_not_load() {
        let nav = nav("/");
        nav.goto_cosmetic("/modal/1");
        assert_eq!(nav.full_path(), "/modal/1");
        assert_eq!(nav.current_load().seq, 0);
    }

    #[test]
    fn test_path_match() {
        assert!(path_match("startswith:/users", "/users/1").unwrap());
        assert!(path_match("regex:^/users/\\d+$", "/users/1").unwrap());
        assert!(!path_match("/users", "/users/1").unwrap());
        assert!(path_match("regex:(", "/").is_err());
    }

    #[test]
    fn test_fragment() {
        assert_eq!(fragment("/docs#intro"), Some("intro"));
        assert_eq!(fragment("/docs"), None);
    }
}
