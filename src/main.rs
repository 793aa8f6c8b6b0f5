// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use page_autotranslate::app_config::{Config, LogLevel};
use page_autotranslate::controllers::mock::{CallLog, RecordingDomTranslator, RecordingSelectionFactory};
use page_autotranslate::detection::StaticLanguageDetector;
use page_autotranslate::page::PageContext;
use page_autotranslate::preferences::{InMemoryPreferences, Preference};
use page_autotranslate::{
    ConfigStore, ContextControllers, ContextServices, OrchestrationContext, PageReadiness,
};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for Preference to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPreference {
    Yes,
    No,
    Unset,
}

impl From<CliPreference> for Preference {
    fn from(cli_preference: CliPreference) -> Self {
        match cli_preference {
            CliPreference::Yes => Preference::Yes,
            CliPreference::No => Preference::No,
            CliPreference::Unset => Preference::Unset,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a page load and print what the engine decided
    Simulate(SimulateArgs),

    /// Generate shell completions for page-autotranslate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Page URL; its host is the site preference key
    #[arg(short, long)]
    url: String,

    /// Language declared by the page markup
    #[arg(short, long)]
    declared_lang: Option<String>,

    /// Language found by the content heuristic
    #[arg(long)]
    content_lang: Option<String>,

    /// Stored site preference for the page host
    #[arg(long, value_enum, default_value = "unset")]
    site_pref: CliPreference,

    /// Stored language preference, as LANG=yes|no (repeatable)
    #[arg(long, value_name = "LANG=PREF")]
    lang_pref: Vec<String>,

    /// Override the configured target language
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// page-autotranslate - page translation orchestration
///
/// Decides whether a page gets translated automatically and keeps the page
/// and selection translators consistent with that decision.
#[derive(Parser, Debug)]
#[command(name = "page-autotranslate")]
#[command(version)]
#[command(about = "Page translation orchestration engine")]
#[command(long_about = "Decides whether a page is auto-translated and drives the translators.

EXAMPLES:
    page-autotranslate simulate -u https://example.com -d de
    page-autotranslate simulate -u https://example.com -d de --site-pref no --lang-pref de=yes
    page-autotranslate simulate -u https://example.com -d de -t fr --log-level debug
    page-autotranslate completions bash > page-autotranslate.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install the logger with the most verbose level; the effective level is
    // lowered through `log::set_max_level` once the configuration is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "page-autotranslate", &mut std::io::stdout());
            Ok(())
        }
        Commands::Simulate(args) => run_simulation(args).await,
    }
}

fn parse_language_preference(raw: &str) -> Result<(String, Preference)> {
    let (language, preference) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected LANG=PREF, got '{}'", raw))?;
    let preference: Preference = preference.parse()?;
    Ok((language.trim().to_lowercase(), preference))
}

async fn run_simulation(args: SimulateArgs) -> Result<()> {
    let mut config = Config::load_or_create(&args.config_path)?;

    if let Some(target_language) = &args.target_language {
        config.language = target_language.clone();
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let page = PageContext::parse(&args.url)?;

    let preferences = InMemoryPreferences::new();
    preferences.set_site(page.host(), args.site_pref.into());
    for raw in &args.lang_pref {
        let (language, preference) = parse_language_preference(raw)?;
        preferences.set_language(&language, preference);
    }

    let detector = StaticLanguageDetector::new(args.declared_lang.as_deref(), args.content_lang.as_deref());
    let calls = CallLog::new();
    let dom = RecordingDomTranslator::working(calls.clone());

    let services = ContextServices {
        detector: Arc::new(detector),
        site_preferences: Arc::new(preferences.clone()),
        language_preferences: Arc::new(preferences),
    };
    let controllers = ContextControllers {
        dom: Arc::new(dom),
        selection_factory: Arc::new(RecordingSelectionFactory::new(calls.clone())),
    };

    let mut context = OrchestrationContext::new(page, ConfigStore::new(config), services, controllers);

    let (trigger, readiness) = PageReadiness::channel();
    context.start(readiness).await?;
    trigger.mark_interactive();

    let outcome = context.auto_translate_outcome().await?;
    context.settle().await?;

    let report = serde_json::json!({
        "host": context.page().host(),
        "outcome": outcome,
        "state": context.state(),
        "page": context.page_data().snapshot(),
        "calls": calls.calls(),
    });

    context.dispose().await?;
    info!("Simulation finished");

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );
    Ok(())
}
