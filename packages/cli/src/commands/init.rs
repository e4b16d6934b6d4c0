use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Backend origin
    #[arg(short, long, default_value = "http://localhost:8000")]
    pub origin: String,

    /// Prefix of page requests
    #[arg(short, long, default_value = "/api")]
    pub root_url: String,

    /// Enable dev reload
    #[arg(long)]
    pub dev: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = Config::path(cwd);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing sdui config...".bright_blue().bold());

    let mut config = Config::default();
    config.client.origin = Some(args.origin.clone());
    config.client.root_url = args.root_url;
    config.client.dev_mode = args.dev;

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Ready!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Start the backend on {}", args.origin);
    println!("  2. Run: sdui render /");
    println!("  3. Run: sdui watch / to follow live updates");

    Ok(())
}
