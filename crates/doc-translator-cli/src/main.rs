//! Doc Translator CLI - Command line tool for translating text and documents.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use doc_translator_core::{
    ApiKey, AppConfig, CancellationFlag, DocumentTranslator, ExportFormat, Lang, PipelineState,
    Progress, RequestContext, SynonymOutcome, SynonymService, TranslateInput, export,
    read_source_file,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatOption {
    Text,
    Html,
    Word,
}

impl From<FormatOption> for ExportFormat {
    fn from(opt: FormatOption) -> Self {
        match opt {
            FormatOption::Text => Self::Text,
            FormatOption::Html => Self::Html,
            FormatOption::Word => Self::Word,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "doc-translate")]
#[command(author, version, about = "Translate text and documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a TXT, PDF or HTML file, or a piece of text
    Translate(TranslateArgs),
    /// Suggest synonyms for a word
    Synonyms(SynonymArgs),
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input file
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Text to translate instead of a file
    #[arg(long)]
    text: Option<String>,

    /// Source language code ("auto" to detect)
    #[arg(short = 's', long)]
    source: Option<String>,

    /// Target language code
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Output file (default: <input>_translated.<ext>, or stdout for --text)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FormatOption,

    /// Translation API key
    #[arg(long, env = "GOOGLE_TRANSLATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Translation API endpoint
    #[arg(long, env = "TRANSLATE_API_BASE")]
    api_base: Option<String>,
}

#[derive(Args, Debug)]
struct SynonymArgs {
    /// Word to look up
    word: String,

    /// Sentence or paragraph the word appears in
    #[arg(long, default_value = "")]
    context: String,

    /// Synonym API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "SYNONYM_API_BASE")]
    api_base: Option<String>,

    /// Model name
    #[arg(long, env = "SYNONYM_MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = if let Some(config_path) = &cli.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    match cli.command {
        Command::Translate(args) => translate(config, args).await,
        Command::Synonyms(args) => synonyms(config, args).await,
    }
}

async fn translate(mut config: AppConfig, args: TranslateArgs) -> Result<()> {
    if let Some(api_base) = args.api_base {
        config.provider.api_base = api_base;
    }
    let credential = args
        .api_key
        .and_then(ApiKey::new)
        .or_else(|| config.provider.default_credential());
    let source = args
        .source
        .map_or_else(|| config.languages.source.clone(), Lang::new);
    let target = args
        .target
        .map_or_else(|| config.languages.target.clone(), Lang::new);
    let format = ExportFormat::from(args.format);

    let (input, input_name) = match (&args.text, &args.input) {
        (Some(text), _) => (
            TranslateInput::direct_text(text.clone(), source, target),
            "text.txt".to_string(),
        ),
        (None, Some(path)) => {
            info!("Reading {}", path.display());
            let payload = read_source_file(path, config.limits.max_file_bytes)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (TranslateInput::file(payload, source, target), file_name(path))
        }
        (None, None) => anyhow::bail!("Provide an input file or --text"),
    };

    let translator =
        DocumentTranslator::new(config).context("Failed to initialize translator")?;

    // Ctrl-C stops before the next request goes out
    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling translation");
            on_interrupt.cancel();
        }
    });

    let pb = progress_bar();
    let bar = pb.clone();
    let ctx = RequestContext::new(credential)
        .with_cancel(cancel)
        .with_progress(Arc::new(move |p: &Progress| update_bar(&bar, p)));

    let result = translator.translate(&ctx, input).await;
    pb.finish_and_clear();
    let result = result.map_err(|e| {
        let stage = e.stage;
        anyhow::Error::new(e).context(format!("Translation failed while {stage}"))
    })?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        if args.output.is_none() && args.text.is_some() && format == ExportFormat::Text {
            println!("{}", result.content);
            if let Some(lang) = &result.detected_source_language {
                info!("Detected source language: {}", lang);
            }
            return Ok(());
        }

        let file = export::render(&result.content, result.content_type, format, &input_name)
            .context("Failed to render output")?;
        let output_path = args.output.unwrap_or_else(|| match &args.input {
            Some(input) => input.with_file_name(&file.file_name),
            None => PathBuf::from(&file.file_name),
        });
        std::fs::write(&output_path, &file.bytes)
            .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

        println!("{}", result.status_message());
        println!("Translated document saved to: {}", output_path.display());
    }

    Ok(())
}

async fn synonyms(mut config: AppConfig, args: SynonymArgs) -> Result<()> {
    if let Some(api_base) = args.api_base {
        config.synonyms.api_base = api_base;
    }
    if let Some(model) = args.model {
        config.synonyms.model = model;
    }
    let credential = args
        .api_key
        .and_then(ApiKey::new)
        .or_else(|| config.synonyms.default_credential())
        .context("A synonym API key is required (--api-key or GROQ_API_KEY)")?;

    let service =
        SynonymService::new(&config.synonyms).context("Failed to initialize synonym service")?;
    let outcome = service
        .suggest(&credential, &args.word, &args.context)
        .await
        .context("Synonym lookup failed")?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    match outcome {
        SynonymOutcome::Found(synonyms) => {
            for synonym in synonyms {
                println!("{synonym}");
            }
        }
        SynonymOutcome::NotFound => println!("No synonyms found for \"{}\"", args.word),
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string()
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

#[allow(clippy::cast_possible_truncation)]
fn update_bar(pb: &ProgressBar, progress: &Progress) {
    if progress.state == PipelineState::Translating && progress.total > 0 {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.completed as u64);
    }
    pb.set_message(progress.message.clone());
}
