// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use langcache::app_config::{self, Config, ProviderKind};
use langcache::{ImportOptions, ImportSource, Importer, Repository, TranslationEngine, server};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that touches the configuration
#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Translation cache database path (overrides the config file)
    #[arg(long, global = true, env = "LANGCACHE_DB")]
    database: Option<PathBuf>,

    /// Oracle provider kind: ollama, api
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model name for the active provider
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Source language name (e.g., 'English')
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Target language name (e.g., 'Simplified Chinese')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP translation service
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Translate strings from the command line
    Translate {
        /// Strings to translate
        #[arg(value_name = "TEXT")]
        texts: Vec<String>,

        /// JSON file holding an array of strings
        #[arg(short, long, conflicts_with = "texts")]
        input: Option<PathBuf>,

        /// Print the ordered list of translations instead of a mapping
        #[arg(long)]
        list: bool,
    },

    /// Import a community translation pack into the cache
    Import {
        /// Zip archive, unpacked directory or http(s) URL; defaults to the configured archive URL
        #[arg(value_name = "SOURCE")]
        source: Option<String>,

        /// Clear the cache before importing
        #[arg(long)]
        fresh: bool,
    },

    /// Show cache statistics
    Stats,

    /// Generate shell completions for langcache
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// langcache - cache-first translation of short UI strings
///
/// Translates batches of strings from a persistent cache and falls back to a
/// generative provider for strings it has never seen. Every provider answer
/// is stored so it is never requested again.
#[derive(Parser, Debug)]
#[command(name = "langcache")]
#[command(version)]
#[command(about = "Cache-first translation of short UI strings")]
#[command(long_about = "langcache translates short interface strings from a persistent cache and asks an LLM provider only for strings it has not seen before.

EXAMPLES:
    langcache serve                                  # Run the HTTP service on the configured port
    langcache translate \"Iron Ingot\" \"Stone\"         # Translate strings from the command line
    langcache translate --input strings.json --list  # Translate a JSON array, print a list
    langcache import pack.zip                        # Seed the cache from a community pack
    langcache import --fresh                         # Rebuild from the configured pack URL
    langcache stats                                  # Show cache statistics
    langcache completions bash > langcache.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: qwen2:7b)
    api       - OpenAI-compatible chat completions API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself accepts everything; the max level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the configured level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "langcache", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Serve { host, port } => run_serve(config, host, port).await,
        Commands::Translate { texts, input, list } => run_translate(config, texts, input, list).await,
        Commands::Import { source, fresh } => run_import(config, source, fresh).await,
        Commands::Stats => run_stats(config).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the config file, apply command-line overrides and validate
fn load_config(options: &GlobalArgs) -> Result<Config> {
    // Apply a command-line log level before anything gets logged
    if let Some(cli_level) = &options.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.oracle.provider = ProviderKind::from(provider.clone());
    }

    if let Some(model) = &options.model {
        match config.oracle.provider {
            ProviderKind::Ollama => config.oracle.ollama.model = model.clone(),
            ProviderKind::Api => config.oracle.api.model = model.clone(),
            ProviderKind::Unsupported(_) => warn!("Ignoring --model for an unsupported provider"),
        }
    }

    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }

    if let Some(database) = &options.database {
        config.database.path = Some(database.clone());
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn open_cache(config: &Config) -> Result<Repository> {
    let cache = match &config.database.path {
        Some(path) => Repository::open(path)?,
        None => Repository::new_default()?,
    };
    Ok(cache)
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!(
        "🚀 langcache: {} - {}",
        config.oracle.provider.display_name(),
        config.oracle.get_model()
    );

    let engine = Arc::new(TranslationEngine::from_config(&config)?);
    server::serve(engine, &config.server.bind_address()).await
}

/// Strings named on the command line, or the JSON array held in `input`
fn collect_texts(texts: Vec<String>, input: Option<&Path>) -> Result<Vec<String>> {
    match input {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
            serde_json::from_str::<Vec<String>>(&content)
                .with_context(|| format!("Input file must hold a JSON array of strings: {}", path.display()))
        }
        None if texts.is_empty() => Err(anyhow!("Nothing to translate: pass strings or --input")),
        None => Ok(texts),
    }
}

async fn run_translate(config: Config, texts: Vec<String>, input: Option<PathBuf>, list: bool) -> Result<()> {
    let texts = collect_texts(texts, input.as_deref())?;

    let engine = TranslationEngine::from_config(&config)?;

    let output = if list {
        serde_json::to_string_pretty(&engine.resolve(&texts).await?)?
    } else {
        let mapping = engine.resolve_map(&texts).await?;
        // Print in input order
        let ordered: serde_json::Map<String, serde_json::Value> = texts
            .iter()
            .filter_map(|text| {
                mapping
                    .get(text)
                    .map(|value| (text.clone(), serde_json::Value::String(value.clone())))
            })
            .collect();
        serde_json::to_string_pretty(&ordered)?
    };

    println!("{}", output);
    Ok(())
}

async fn run_import(config: Config, source: Option<String>, fresh: bool) -> Result<()> {
    let source = ImportSource::parse(source.as_deref().unwrap_or(&config.import.archive_url));
    let cache = open_cache(&config)?;
    info!("Importing into {}", cache.path().display());

    let importer = Importer::new(
        cache,
        ImportOptions {
            source_locale: config.import.source_locale.clone(),
            target_locale: config.import.target_locale.clone(),
            fresh,
            ..Default::default()
        },
    );

    let progress_bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar.set_message("Reading language files");

    let bar = progress_bar.clone();
    let report = importer
        .run_with_progress(&source, move |done, total| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        })
        .await;
    progress_bar.finish_and_clear();
    let report = report?;

    info!(
        "Import complete: {} pairs written from {} units ({} files read, {} skipped)",
        report.written, report.units_paired, report.files_read, report.files_skipped
    );
    Ok(())
}

async fn run_stats(config: Config) -> Result<()> {
    let cache = open_cache(&config)?;
    let stats = serde_json::json!({
        "database": cache.path(),
        "stored_entries": cache.count().await?,
    });
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
