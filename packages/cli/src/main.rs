mod commands;
mod config;
mod watcher;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{check, init, render, watch, CheckArgs, InitArgs, RenderArgs, WatchArgs};
use tracing_subscriber::EnvFilter;

/// sdui - render server-driven UI pages from the command line
#[derive(Parser, Debug)]
#[command(name = "sdui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sdui.config.json
    Init(InitArgs),

    /// Load a page from the backend and print it as HTML
    Render(RenderArgs),

    /// Render a local JSON payload and report component errors
    Check(CheckArgs),

    /// Follow a page, re-rendering on streams and dev reloads
    Watch(WatchArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Render(args) => render(args, &cwd),
            Command::Check(args) => check(args, &cwd),
            Command::Watch(args) => watch(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
