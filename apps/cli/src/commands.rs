//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use advisor_completion::HttpCompletionClient;
use advisor_core::service::StoredArtifact;
use advisor_core::{AdvisoryService, FailurePolicy, GenerationOrchestrator};
use advisor_shared::{
    AgentKind, AppConfig, GenerationRequest, GenerationResult, init_config, load_config,
    resolve_completion_settings,
};
use advisor_store::MemoryStore;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::profile::load_profile;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Advisor: fundraising strategies, outreach drafts, and community answers.
#[derive(Parser)]
#[command(
    name = "advisor",
    version,
    about = "Generate profile-aware fundraising and community advice with a hosted LLM.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Model identifier (overrides the config file).
    #[arg(long, env = "LLAMA_MODEL", global = true)]
    pub model: Option<String>,

    /// Completion API root (overrides the config file).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a fundraising strategy for an organization.
    Strategy {
        /// Organization profile (.toml or .json).
        #[arg(short, long)]
        profile: PathBuf,

        /// What the strategy should address.
        #[arg(short, long)]
        query: String,

        /// Fail instead of printing a degraded result.
        #[arg(long)]
        strict: bool,
    },

    /// Draft an outreach message for an organization.
    Outreach {
        /// Organization profile (.toml or .json).
        #[arg(short, long)]
        profile: PathBuf,

        /// Goal of the outreach.
        #[arg(short, long)]
        goal: String,

        /// Fail instead of printing a degraded result.
        #[arg(long)]
        strict: bool,
    },

    /// Classify a community question into tags.
    Tags {
        #[arg(short, long)]
        question: String,
    },

    /// Suggest an answer to a community question.
    Answer {
        #[arg(short, long)]
        question: String,
    },

    /// Suggest a mentor reply to a mentee message.
    Reply {
        #[arg(short, long)]
        message: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

const LOG_TARGETS: [&str; 5] = [
    "advisor_cli",
    "advisor_core",
    "advisor_completion",
    "advisor_store",
    "advisor_shared",
];

/// Initialize tracing based on CLI flags. Logs go to stderr so `--json`
/// output stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let output = Output { json: cli.json };
    let overrides = Overrides {
        model: cli.model,
        base_url: cli.base_url,
    };

    match cli.command {
        Command::Strategy {
            profile,
            query,
            strict,
        } => {
            cmd_profile_artifact(
                AgentKind::Strategy,
                &profile,
                &query,
                strict,
                &overrides,
                output,
            )
            .await
        }
        Command::Outreach {
            profile,
            goal,
            strict,
        } => {
            cmd_profile_artifact(
                AgentKind::Outreach,
                &profile,
                &goal,
                strict,
                &overrides,
                output,
            )
            .await
        }
        Command::Tags { question } => cmd_tags(&question, &overrides, output).await,
        Command::Answer { question } => {
            cmd_text(
                GenerationRequest::answer_suggestion(question),
                &overrides,
                output,
            )
            .await
        }
        Command::Reply { message } => {
            cmd_text(
                GenerationRequest::reply_suggestion(message),
                &overrides,
                output,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&overrides).await,
        },
    }
}

/// Flag values that override `[completion]` in the config file.
struct Overrides {
    model: Option<String>,
    base_url: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.completion.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.completion.base_url = base_url.clone();
        }
    }
}

fn resolved_config(overrides: &Overrides) -> Result<AppConfig> {
    let mut config = load_config()?;
    overrides.apply(&mut config);
    Ok(config)
}

/// Build an orchestrator from config: HTTP client plus per-kind overrides.
fn build_orchestrator(config: &AppConfig) -> Result<GenerationOrchestrator<HttpCompletionClient>> {
    let settings = resolve_completion_settings(&config.completion)?;
    debug!(?settings, "completion settings resolved");
    let client = HttpCompletionClient::new(settings)?;

    let mut orchestrator = GenerationOrchestrator::new(client);
    for kind in AgentKind::ALL {
        orchestrator = orchestrator.with_options(kind, config.options_for(kind)?);
    }
    Ok(orchestrator)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_profile_artifact(
    kind: AgentKind,
    profile_path: &Path,
    free_text: &str,
    strict: bool,
    overrides: &Overrides,
    output: Output,
) -> Result<()> {
    let profile = load_profile(profile_path)?;
    let config = resolved_config(overrides)?;
    let orchestrator = build_orchestrator(&config)?;

    let store = MemoryStore::new();
    let profile_id = store.insert_profile(&profile).await?;

    let policy = if strict {
        FailurePolicy::RejectDegraded
    } else {
        FailurePolicy::PersistDegraded
    };
    let service = AdvisoryService::new(orchestrator, store).with_policy(policy);

    info!(%kind, org = %profile.name, "generating");
    let spinner = Spinner::start(&format!("Generating {}...", kind_label(kind)));
    let result = match kind {
        AgentKind::Strategy => service.generate_strategy(profile_id, free_text).await,
        AgentKind::Outreach => service.generate_outreach(profile_id, free_text).await,
        other => return Err(eyre!("{other} does not take a profile")),
    };
    spinner.finish();

    output.artifact(&result?)
}

async fn cmd_tags(question: &str, overrides: &Overrides, output: Output) -> Result<()> {
    let config = resolved_config(overrides)?;
    let orchestrator = build_orchestrator(&config)?;

    let spinner = Spinner::start("Classifying question...");
    let tags = orchestrator.classify_tags(question).await;
    spinner.finish();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else {
        println!("{}", tags.iter().collect::<Vec<_>>().join(", "));
    }
    Ok(())
}

async fn cmd_text(request: GenerationRequest, overrides: &Overrides, output: Output) -> Result<()> {
    let config = resolved_config(overrides)?;
    let orchestrator = build_orchestrator(&config)?;

    let spinner = Spinner::start(&format!("Generating {}...", kind_label(request.kind())));
    let result = orchestrator
        .generate(&orchestrator.configured(request))
        .await;
    spinner.finish();

    output.result(&result)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(overrides: &Overrides) -> Result<()> {
    let config = resolved_config(overrides)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");

    match resolve_completion_settings(&config.completion) {
        Ok(_) => println!("# API key: found in ${}", config.completion.api_key_env),
        Err(e) => println!("# {e}"),
    }
    Ok(())
}

fn kind_label(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Strategy => "strategy",
        AgentKind::Outreach => "outreach draft",
        AgentKind::TagClassification => "tags",
        AgentKind::AnswerSuggestion => "answer suggestion",
        AgentKind::ReplySuggestion => "reply suggestion",
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn artifact(&self, artifact: &StoredArtifact) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(artifact)?);
            return Ok(());
        }
        print_block(artifact.title.as_deref(), &artifact.content, artifact.succeeded);
        println!("  Saved as {}", artifact.id);
        println!();
        Ok(())
    }

    fn result(&self, result: &GenerationResult) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }
        print_block(result.title.as_deref(), &result.content, result.succeeded);
        if let Some(detail) = &result.error_detail {
            println!("  Cause: {detail}");
        }
        println!();
        Ok(())
    }
}

fn print_block(title: Option<&str>, content: &str, succeeded: bool) {
    println!();
    if let Some(title) = title {
        println!("  {title}");
        println!();
    }
    for line in content.lines() {
        println!("  {line}");
    }
    if !succeeded {
        println!();
        println!("  (generation failed; showing fallback content)");
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress spinner
// ---------------------------------------------------------------------------

/// indicatif spinner shown while a completion call is in flight.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}
