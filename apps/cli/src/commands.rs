//! CLI definitions, routing, and tracing setup.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use writeups_core::{ConvertOutcome, ConvertSummary, ProgressReporter, convert_directory};
use writeups_shared::{
    AppConfig, ConvertConfig, WriteupError, default_config_path, init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Convert Markdown writeups with frontmatter into a JSON content feed.
#[derive(Parser)]
#[command(
    name = "convert-writeups",
    version,
    about = "Convert Markdown writeups with frontmatter into the site's JSON feed.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./writeups.toml when present).
    #[arg(long, global = true, env = "WRITEUPS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub convert: ConvertArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Positional arguments of the default convert action.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Directory of Markdown sources [default: ./writeups-md].
    pub input_dir: Option<PathBuf>,

    /// JSON file to write [default: ./assets/data/writeups.json].
    pub output_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default writeups.toml.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "writeups=warn",
        1 => "writeups=info",
        2 => "writeups=debug",
        _ => "writeups=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(cli.config.as_deref()),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        },
        None => cmd_convert(cli.config.as_deref(), cli.convert),
    }
}

fn cmd_convert(config_path: Option<&Path>, args: ConvertArgs) -> Result<()> {
    let app_config = load_config(config_path)?;
    let config = ConvertConfig::from(&app_config).with_overrides(args.input_dir, args.output_file);

    info!(
        input = %config.input_dir.display(),
        output = %config.output_file.display(),
        "converting writeups"
    );

    println!("📝 Converting Markdown writeups to JSON...");
    println!();

    let reporter = CliProgress::new();
    let outcome = match convert_directory(&config, &reporter) {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.abandon();
            return Err(e.into());
        }
    };

    match outcome {
        ConvertOutcome::NoInput { input_dir } => {
            reporter.abandon();
            eprintln!(
                "No .{} files found in \"{}\"",
                config.extension,
                input_dir.display()
            );
        }
        ConvertOutcome::Converted(summary) => {
            println!();
            println!("✓ Converted {} writeup(s)", summary.converted);
            if !summary.failures.is_empty() {
                println!("✗ Skipped {} file(s)", summary.failures.len());
            }
            if summary.renamed_ids > 0 {
                println!("! Renamed {} duplicate id(s)", summary.renamed_ids);
            }
            println!("✓ Output: {}", summary.output_file.display());
        }
    }

    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let path = init_config(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress bar with one printed line per converted or skipped file.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    fn abandon(&self) {
        self.bar.finish_and_clear();
    }

    /// Print a line to stdout above the bar. Works when the bar is hidden
    /// (stderr not a terminal), unlike `ProgressBar::println`.
    fn emit(&self, line: &str) {
        self.bar.suspend(|| println!("{line}"));
    }
}

impl ProgressReporter for CliProgress {
    fn found(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.emit(&found_line(total));
    }

    fn parsed(&self, file: &str, id: &str) {
        self.emit(&parsed_line(file, id));
        self.bar.set_message(file.to_string());
        self.bar.inc(1);
    }

    fn failed(&self, file: &str, error: &WriteupError) {
        self.emit(&failed_line(file, error));
        self.bar.inc(1);
    }

    fn done(&self, _summary: &ConvertSummary) {
        self.bar.finish_and_clear();
    }
}

fn found_line(total: usize) -> String {
    format!("Found {total} markdown file(s)...")
}

fn parsed_line(file: &str, id: &str) -> String {
    format!("✓ Parsed: {file} → {id}")
}

fn failed_line(file: &str, error: &WriteupError) -> String {
    format!("✗ Error parsing {file}: {error}")
}
