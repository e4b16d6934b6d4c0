use super::{alerts, connect};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sdui_client::App;
use sdui_renderer::{to_html, HtmlOptions, RenderOutput};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Page path, e.g. /live
    #[arg(default_value = "/")]
    pub path: String,

    /// Backend origin (overrides config)
    #[arg(long)]
    pub origin: Option<String>,

    /// Auth token sent with every request
    #[arg(long)]
    pub token: Option<String>,

    /// Poll the dev reload endpoint even when the config leaves it off
    #[arg(long)]
    pub dev: bool,

    /// Print HTML instead of the page text
    #[arg(long)]
    pub html: bool,
}

pub fn watch(args: WatchArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if let Some(origin) = args.origin.clone() {
        config.client.origin = Some(origin);
    }
    if args.dev {
        config.client.dev_mode = true;
    }

    let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
    runtime.block_on(follow(config, args))
}

/// Re-render on every load result or reload until interrupted
async fn follow(config: Config, args: WatchArgs) -> Result<()> {
    let mut app = connect(&config, &args.path, args.token.as_deref())?;
    if app.start_dev_reload().is_some() {
        info!(url = %config.client.dev_reload_path, "Dev reload enabled");
    }

    println!("👀 {} {}", "Following".green().bold(), args.path);
    let mut frame = Frame::default();
    let output = app.settle().await;
    frame.show(&app, &output, args.html);

    loop {
        tokio::select! {
            _ = app.changed() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        let output = app.render();
        frame.show(&app, &output, args.html);
    }

    println!();
    println!("{}", "Stopped".dimmed());
    Ok(())
}

/// Last printed content, so unchanged renders stay quiet
#[derive(Default)]
struct Frame {
    last: Option<String>,
}

impl Frame {
    fn show(&mut self, app: &App, output: &RenderOutput, html: bool) {
        let content = if html {
            to_html(&output.nodes, HtmlOptions::default())
        } else {
            output.text()
        };
        if self.last.as_ref() == Some(&content) {
            debug!("Render unchanged");
            return;
        }

        println!();
        let title = output.title.as_deref().unwrap_or("");
        println!(
            "{} {} {}",
            "──".dimmed(),
            app.state().navigation.full_path().bright_white(),
            title.bright_blue()
        );
        println!("{}", content);
        for alert in alerts(&output.nodes) {
            println!("  {} {}", "⚠️".yellow(), alert);
        }
        if !output.pending.is_empty() {
            println!("  {}", "loading...".dimmed());
        }
        self.last = Some(content);
    }
}
