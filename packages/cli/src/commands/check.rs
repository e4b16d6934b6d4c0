use super::alerts;
use crate::config::Config;
use crate::watcher::FileWatcher;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use sdui_model::ComponentNode;
use sdui_renderer::{to_html, HtmlOptions, UiState};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Pause after a change before reading, so a save in progress can finish
const SETTLE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// JSON file holding a component list, as a backend would send it
    pub input: PathBuf,

    /// Path the payload is rendered at
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Print the rendered HTML
    #[arg(long)]
    pub html: bool,

    /// Check again whenever the file changes
    #[arg(short, long)]
    pub watch: bool,
}

/// Outcome of rendering one payload
#[derive(Debug)]
pub struct CheckReport {
    pub components: usize,
    /// Text of every error panel the payload rendered
    pub errors: Vec<String>,
    /// Server loads the payload would start
    pub loads: Vec<String>,
    pub html: String,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = cwd.join(&args.input);

    println!("🔍 {} {}", "Checking".green().bold(), args.input.display());
    let result = check_and_print(&config, &input, &args);

    if !args.watch {
        return result;
    }

    let watcher = FileWatcher::new(&input)?;
    println!("\n{}", "👀 Watching for changes...".bright_blue());
    while watcher.wait_for_change().is_some() {
        thread::sleep(SETTLE_DELAY);
        watcher.drain();
        println!();
        if let Err(err) = check_and_print(&config, &input, &args) {
            eprintln!("  {} {}", "✗".red(), err.to_string().red());
        }
    }
    Ok(())
}

fn check_and_print(config: &Config, input: &Path, args: &CheckArgs) -> Result<()> {
    let report = check_file(config, input, &args.path)?;

    if args.html {
        println!("{}", report.html);
    }
    for load in &report.loads {
        println!("  {} loads {}", "→".dimmed(), load);
    }
    for error in &report.errors {
        println!("  {} {}", "✗".red(), error);
    }

    if report.errors.is_empty() {
        println!("  {} {} components render cleanly", "✓".green(), report.components);
        Ok(())
    } else {
        bail!("{} render errors", report.errors.len())
    }
}

pub fn check_file(config: &Config, input: &Path, path: &str) -> Result<CheckReport> {
    let source = fs::read_to_string(input).with_context(|| format!("Cannot read {}", input.display()))?;
    let nodes = ComponentNode::list_from_str(&source).map_err(|err| anyhow!("{}: {}", input.display(), err))?;

    let state = UiState::new(path);
    let output = config.renderer().render_nodes(&state, &nodes);

    Ok(CheckReport {
        components: nodes.len(),
        errors: alerts(&output.nodes),
        loads: output.pending.iter().map(|ticket| ticket.url.clone()).collect(),
        html: to_html(&output.nodes, HtmlOptions::default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, content: &str) -> PathBuf {
        let file = dir.join("page.json");
        fs::write(&file, content).unwrap();
        file
    }

    #[test]
    fn test_clean_payload() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            r#"[
                {"type": "Heading", "text": "Hello", "level": 2},
                {"type": "ServerLoad", "path": "/items"}
            ]"#,
        );

        let report = check_file(&Config::default(), &file, "/").unwrap();
        assert_eq!(report.components, 2);
        assert!(report.errors.is_empty());
        assert_eq!(report.loads, vec!["/api/items".to_string()]);
        assert!(report.html.contains("<h2 id=\"hello\">"));
    }

    #[test]
    fn test_render_errors_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            r#"[
                {"type": "Heading"},
                {"type": "Sparkline"},
                {"type": "Text", "text": "fine"}
            ]"#,
        );

        let report = check_file(&Config::default(), &file, "/").unwrap();
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("Render Error"));
        assert!(report.errors[1].contains("Invalid Server Response"));
        assert!(report.html.contains("fine"));
    }

    #[test]
    fn test_payload_must_be_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), r#"{"type": "Text", "text": "alone"}"#);
        assert!(check_file(&Config::default(), &file, "/").is_err());

        let missing = dir.path().join("absent.json");
        let err = check_file(&Config::default(), &missing, "/").unwrap_err();
        assert!(err.to_string().starts_with("Cannot read"));
    }
}
