use super::{alerts, connect};
use crate::config::Config;
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use sdui_renderer::{to_document, to_html, HtmlOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page path, e.g. /users?page=2
    #[arg(default_value = "/")]
    pub path: String,

    /// Backend origin (overrides config)
    #[arg(long)]
    pub origin: Option<String>,

    /// Auth token sent with every request
    #[arg(long)]
    pub token: Option<String>,

    /// Write the HTML to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Emit the page body only, without the document shell
    #[arg(long)]
    pub fragment: bool,

    /// Disable pretty printing
    #[arg(long)]
    pub compact: bool,
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if let Some(origin) = args.origin.clone() {
        config.client.origin = Some(origin);
    }

    let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
    let (output, error) = runtime.block_on(async {
        let mut app = connect(&config, &args.path, args.token.as_deref())?;
        let output = app.settle().await;
        anyhow::Ok((output, app.state().errors.get()))
    })?;
    info!(path = %args.path, pending = output.pending.len(), "Rendered");

    let options = if args.compact {
        HtmlOptions::compact()
    } else {
        HtmlOptions::default()
    };
    let html = if args.fragment {
        to_html(&output.nodes, options)
    } else {
        to_document(&output, options)
    };

    match args.out {
        Some(ref out) => {
            let out_file = cwd.join(out);
            if let Some(parent) = out_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out_file, &html)?;
            println!("  {} {} → {}", "✓".green(), args.path, out_file.display());
        }
        None => println!("{}", html),
    }

    for alert in alerts(&output.nodes) {
        eprintln!("  {} {}", "⚠️".yellow(), alert);
    }
    if !output.pending.is_empty() {
        eprintln!(
            "  {} {} loads still pending",
            "⚠️".yellow(),
            output.pending.len()
        );
    }
    if let Some(error) = error {
        bail!("{}: {}", error.title, error.description);
    }
    Ok(())
}
