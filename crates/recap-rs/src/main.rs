//! Summarize long texts with a context-bounded language model, or watch
//! YouTube channels and post caption summaries to Telegram.
//!
//! Secrets and hosts come from the environment: `OLLAMA_HOST` (optional),
//! `OPENROUTER_KEY` for `--backend openrouter`, and `TELEGRAM_TOKEN` plus
//! `CHAT_ID` for `watch`. Logging follows `RUST_LOG` (default `info`).
//!
//! # Examples
//!
//! ```sh
//! # Summarize a file with a local model
//! recap summarize talk.txt --model llama3 --num-ctx 8000
//!
//! # Pipe text in, summarize pages four at a time
//! cat transcript.txt | recap summarize --stdin --concurrency 4
//!
//! # Use a model the built-in table does not know
//! recap summarize notes.txt --model qwen2.5:7b --model-context qwen2.5:7b=32000
//!
//! # Start watching a channel, then check all watched channels
//! recap watch --add rustconf
//! recap watch
//!
//! # Migrate a CSV last-seen table from an older deployment
//! recap watch --import-csv data/latest_videos.csv
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use recap_rs::config::{Backend, RecapConfig, telegram_credentials};
use recap_rs::model::ModelProfile;
use recap_rs::monitor::{LastSeenStore, Monitor, TelegramNotifier, YouTubeSource};
use recap_rs::summarize::{LoggingHandler, RecursiveSummarizer};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Summarize long texts with a context-bounded language model.
#[derive(Parser)]
#[command(name = "recap", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a file or stdin and print the summary
    Summarize(SummarizeArgs),
    /// Check watched channels once and post new videos with summaries
    Watch(WatchArgs),
    /// List models with known context windows
    Models {
        /// Extra NAME=TOKENS profiles to include
        #[arg(long = "model-context", value_name = "NAME=TOKENS")]
        model_context: Vec<ModelProfile>,
    },
}

#[derive(Args)]
struct ModelArgs {
    // ── Backend ────────────────────────────────────────────────
    /// Language-model service (ollama or openrouter)
    #[arg(long, default_value_t = Backend::Ollama)]
    backend: Backend,

    /// Model to summarize with
    #[arg(long, default_value = "mistral-nemo")]
    model: String,

    /// Register or override a model's context window (NAME=TOKENS)
    #[arg(long = "model-context", value_name = "NAME=TOKENS")]
    model_context: Vec<ModelProfile>,

    // ── Token budget ───────────────────────────────────────────
    /// Context size of every model call
    #[arg(long, default_value_t = 16_000)]
    num_ctx: usize,

    /// Tokens kept free for the model's reply
    #[arg(long, default_value_t = 600)]
    reply_reserve: usize,

    /// Give up after this many reduction rounds
    #[arg(long, default_value_t = 8)]
    max_rounds: u32,

    // ── Execution ──────────────────────────────────────────────
    /// Pages summarized concurrently
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Per model call timeout in seconds
    #[arg(long)]
    call_timeout: Option<u64>,
}

#[derive(Args)]
struct SummarizeArgs {
    /// Text file to summarize
    file: Option<PathBuf>,

    /// Read the text from stdin
    #[arg(long, conflicts_with = "file")]
    stdin: bool,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct WatchArgs {
    /// Last-seen store; its channels are the ones checked
    #[arg(long, default_value = "data/latest_videos.json")]
    state: PathBuf,

    /// Where caption files are written
    #[arg(long, default_value = "data/captions")]
    captions_dir: PathBuf,

    /// Caption language code videos must have
    #[arg(long, default_value = "en")]
    language: String,

    /// Add a channel handle to the store and exit
    #[arg(long, value_name = "CHANNEL")]
    add: Vec<String>,

    /// Import a legacy latest_videos.csv table into the store and exit
    #[arg(long, value_name = "PATH")]
    import_csv: Option<PathBuf>,

    /// Retries of a summary after transient backend failures
    #[arg(long, default_value_t = 2)]
    retries: u32,

    #[command(flatten)]
    model: ModelArgs,
}

// ── Helpers ────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn recap_config(args: &ModelArgs) -> RecapConfig {
    let mut config = RecapConfig::default()
        .with_backend(args.backend)
        .with_model(args.model.clone())
        .with_context_tokens(args.num_ctx)
        .with_reply_reserve(args.reply_reserve)
        .with_max_rounds(args.max_rounds)
        .with_page_concurrency(args.concurrency);
    if let Some(secs) = args.call_timeout {
        config = config.with_call_timeout(Duration::from_secs(secs));
    }
    for profile in &args.model_context {
        config = config.with_model_profile(profile.clone());
    }
    config
}

fn read_input(args: &SummarizeArgs) -> anyhow::Result<String> {
    match (&args.file, args.stdin) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, true) => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
        (None, false) => bail!("provide a FILE or --stdin"),
    }
}

// ── Commands ───────────────────────────────────────────────────────

async fn summarize(args: &SummarizeArgs) -> anyhow::Result<String> {
    let text = read_input(args)?;
    let config = recap_config(&args.model);
    let client = config.build_client()?;
    info!(
        "Summarizing {} words with {} via {} (num_ctx={})",
        text.split_whitespace().count(),
        config.model,
        client.backend(),
        config.context_tokens
    );

    let summarizer = RecursiveSummarizer::new(&*client, config.build_summarizer_config())
        .with_registry(config.build_registry())
        .with_event_handler(&LoggingHandler);
    let summary = summarizer
        .summarize(&text, &config.model, config.context_tokens)
        .await?;
    Ok(summary)
}

async fn watch(args: &WatchArgs) -> anyhow::Result<()> {
    let mut config = recap_config(&args.model)
        .with_state_path(args.state.clone())
        .with_captions_dir(args.captions_dir.clone());
    config.caption_language = args.language.clone();
    config.retries = args.retries;

    let mut store = LastSeenStore::load(&config.state_path)?;
    if !args.add.is_empty() || args.import_csv.is_some() {
        if let Some(csv_path) = &args.import_csv {
            let imported = store.import_csv(csv_path)?;
            info!("Imported {imported} channel(s) from {}", csv_path.display());
        }
        for channel in &args.add {
            let channel = channel.trim_start_matches('@');
            if store.add_channel(channel) {
                info!("Watching @{channel}");
            } else {
                info!("Already watching @{channel}");
            }
        }
        store.save()?;
        return Ok(());
    }
    if store.channels().is_empty() {
        bail!(
            "no channels in {}; add one with `recap watch --add CHANNEL`",
            config.state_path.display()
        );
    }

    let (token, chat_id) = telegram_credentials()?;
    let notifier = TelegramNotifier::new(token, chat_id)?;
    let source = YouTubeSource::new()?;
    let client = config.build_client()?;
    let summarizer = RecursiveSummarizer::new(&*client, config.build_summarizer_config())
        .with_registry(config.build_registry())
        .with_event_handler(&LoggingHandler);

    let mut monitor = Monitor::new(
        &source,
        &notifier,
        summarizer,
        store,
        config.build_monitor_config(),
    );
    let report = monitor.run_once().await;
    if !report.failed.is_empty() && report.checked == 0 {
        bail!("every channel failed");
    }
    Ok(())
}

fn list_models(extra: &[ModelProfile]) {
    let mut config = RecapConfig::default();
    for profile in extra {
        config = config.with_model_profile(profile.clone());
    }
    for profile in config.build_registry().iter() {
        println!("{:<24} {:>8}", profile.name, profile.max_context);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Summarize(args) => summarize(args).await.map(|summary| println!("{summary}")),
        Command::Watch(args) => watch(args).await,
        Command::Models { model_context } => {
            list_models(model_context);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
