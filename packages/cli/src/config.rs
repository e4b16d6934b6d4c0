use anyhow::Context;
use sdui_client::ClientConfig;
use sdui_model::ClassName;
use sdui_renderer::{Renderer, ThemeClassNames};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "sdui.config.json";

/// sdui configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Backend settings, inlined at the top level of the file
    #[serde(flatten)]
    pub client: ClientConfig,

    /// Class names by `"<Type>"` or `"<Type>.<subElement>"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, ClassName>,
}

impl Config {
    /// Load config from a directory, defaults when there is no config file
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Cannot read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }

    /// Renderer for the configured endpoint, themed when a theme is set
    pub fn renderer(&self) -> Renderer {
        let renderer = Renderer::new(self.client.endpoint());
        if self.theme.is_empty() {
            return renderer;
        }
        let classes = self
            .theme
            .iter()
            .map(|(key, class_name)| (key.clone(), class_name.clone()))
            .collect();
        renderer.with_class_names(ThemeClassNames::new(classes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdui_renderer::{PathSendMode, UiState};

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "origin": "http://localhost:8000",
            "rootUrl": "/backend",
            "pathSendMode": "query",
            "devMode": true,
            "theme": {
                "Page": "container",
                "Button": ["btn", "btn-primary"]
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.client.origin.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.client.root_url, "/backend");
        assert_eq!(config.client.path_send_mode, PathSendMode::Query);
        assert!(config.client.dev_mode);
        assert_eq!(config.client.stream_retries, 5);
        assert_eq!(config.theme.len(), 2);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.client.root_url, "/api");
        assert!(config.theme.is_empty());

        let written = serde_json::to_value(&config).unwrap();
        assert_eq!(written["rootUrl"], "/api");
        assert!(written.get("theme").is_none());
    }

    #[test]
    fn test_load_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());

        std::fs::write(Config::path(dir.path()), r#"{"theme": {"Text": "lead"}}"#).unwrap();
        let config = Config::load(dir.path()).unwrap();
        let nodes = sdui_model::ComponentNode::list_from_str(
            r#"[{"type": "Div", "components": [{"type": "Paragraph", "text": "x"}]}]"#,
        )
        .unwrap();
        let output = config.renderer().render_nodes(&UiState::new("/"), &nodes);
        assert_eq!(output.text(), "x");

        std::fs::write(Config::path(dir.path()), "{not json").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid"));
    }
}
