mod catalog;
mod commands;
mod core;
mod pipeline;
mod ui;
mod utils;

use anstyle::{AnsiColor, Color, Style};
use clap::{Parser, Subcommand};
use core::error::{RelgenError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate packaging descriptors for upstream releases
#[derive(Parser)]
#[command(name = "relgen")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Use this config file instead of searching for relgen.toml
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Log at debug level (RELGEN_LOG overrides)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate the descriptor for one release
  #[command(disable_version_flag = true)]
  Tag {
    /// Release version, with or without the tag prefix (2.19.0rc2, release_2.19.0rc2)
    version: String,
    /// Regenerate even if the descriptor exists
    #[arg(long)]
    force: bool,
    /// Output the summary in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Generate every release after a starting version
  All {
    /// Exclusive lower bound
    #[arg(long)]
    start: String,
    /// Regenerate descriptors that already exist
    #[arg(long)]
    force: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
    /// Output the summary in JSON format
    #[arg(long)]
    json: bool,
  },

  /// List upstream releases and whether each is generated
  List {
    /// Only releases after this version
    #[arg(long)]
    start: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Rebuild the index from generated descriptors
  Index,
}

/// Help colours: cyan headings, bold flags, red errors
fn get_styles() -> clap::builder::Styles {
  let fg = |colour: AnsiColor| Style::new().fg_color(Some(Color::Ansi(colour)));
  clap::builder::Styles::styled()
    .header(fg(AnsiColor::Cyan).bold())
    .usage(fg(AnsiColor::Cyan).bold())
    .literal(Style::new().bold())
    .placeholder(fg(AnsiColor::BrightBlack))
    .error(fg(AnsiColor::Red).bold())
    .invalid(fg(AnsiColor::Red))
    .valid(fg(AnsiColor::Cyan))
}

fn init_logging(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_env("RELGEN_LOG").unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(filter)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(RelgenError::from(e).context("Failed to get current directory")),
  };

  // Build the run context once (config, catalog)
  let ctx = match core::context::RunContext::build(&cwd, cli.config.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let program = std::env::args().next().unwrap_or_else(|| "relgen".to_string());

  // External commands are the only concurrency; one thread interleaves them
  let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
    Ok(rt) => rt,
    Err(e) => handle_error(RelgenError::from(e).context("Failed to start async runtime")),
  };

  let result = match cli.command {
    Commands::Tag { version, force, json } => runtime.block_on(commands::run_tag(&ctx, &program, &version, force, json)),
    Commands::All {
      start,
      force,
      yes,
      json,
    } => runtime.block_on(commands::run_all(&ctx, &program, &start, force, yes, json)),
    Commands::List { start, json } => runtime.block_on(commands::run_list(&ctx, start.as_deref(), json)),
    Commands::Index => commands::run_index(&ctx),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RelgenError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
