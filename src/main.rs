//! `rev-rewrite` command line entry point.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rev_rewrite::{Document, ProcessInput, Processor, RewriteConfig, SummaryFinder};

#[derive(Parser)]
#[command(name = "rev-rewrite")]
#[command(author, version, about = "Point asset references at their revved files", long_about = None)]
struct Cli {
  /// HTML/CSS document to rewrite, or a JSON document with `--document`
  input: PathBuf,

  /// Reference patterns to apply (html or css)
  #[arg(long)]
  preset: Option<String>,

  /// Revision summary JSON mapping original paths to revved paths
  #[arg(long)]
  summary: Option<PathBuf>,

  /// Directory to resolve references against; repeat to search several
  #[arg(long = "search-path", value_name = "DIR")]
  search_path: Vec<String>,

  /// Treat INPUT as a JSON document with content, blocks and searchPath
  #[arg(long)]
  document: bool,

  /// Fail when a concatenation block cannot be found
  #[arg(long)]
  strict: bool,

  /// Write the result here instead of stdout
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Configuration file (defaults to rev-rewrite.config.json in the working directory)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let config = match &cli.config {
    Some(path) => RewriteConfig::from_path(path)?,
    None => RewriteConfig::discover(&std::env::current_dir()?),
  };

  let preset = cli.preset.unwrap_or(config.preset);
  let search_path = if cli.search_path.is_empty() {
    config.search_path
  } else {
    cli.search_path
  };
  let finder = match cli.summary.or(config.summary) {
    Some(path) => SummaryFinder::from_path(&path)?,
    None => SummaryFinder::default(),
  };

  let processor = Processor::builder()
    .preset(&preset)
    .finder(&finder)
    .strict(cli.strict || config.strict)
    .log(|message| tracing::info!("{message}"))
    .build()?;

  let input = if cli.document {
    let raw = fs::read_to_string(&cli.input)
      .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let document: Document = serde_json::from_str(&raw)
      .with_context(|| format!("failed to parse document {}", cli.input.display()))?;
    ProcessInput::Document(document)
  } else {
    ProcessInput::Path(cli.input)
  };

  let result = processor.process(input, Some(search_path.as_slice()))?;

  match cli.output {
    Some(path) => {
      fs::write(&path, result).with_context(|| format!("failed to write {}", path.display()))?
    }
    None => std::io::stdout()
      .write_all(result.as_bytes())
      .context("failed to write to stdout")?,
  }

  Ok(())
}
