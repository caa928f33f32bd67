//! CLI for GenStudio - prompt-to-image generation with local history.

use clap::{Args, Parser, Subcommand, ValueEnum};
use genstudio::shell::{history_table, styles_table, Shell};
use genstudio::{
    default_style, find_style, AspectRatio, GeminiModel, GeminiProvider, GeneratedImageRecord,
    History, HistoryPersistence, ImageProvider, JsonFileStore, Session, StyleDescriptor,
    SubmitOutcome,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genstudio")]
#[command(about = "Generate images from text prompts with Gemini and keep a local history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// History file (default: <data dir>/genstudio/image_history.json)
    #[arg(long, global = true, env = "GENSTUDIO_HISTORY_FILE")]
    history_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a text prompt
    Generate(GenerateArgs),

    /// List generated images, newest first
    History,

    /// Save an image from history to a file
    Show(ShowArgs),

    /// Delete all history
    Clear,

    /// List available styles
    Styles,

    /// Interactive prompt loop
    Shell(ShellArgs),

    /// Verify the API key and model with Gemini
    Check(ProviderArgs),
}

#[derive(Args)]
struct ProviderArgs {
    /// Gemini image model
    #[arg(long, value_enum, default_value = "nano-banana", env = "GENSTUDIO_MODEL")]
    model: ModelArg,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Style id (see `genstudio styles`)
    #[arg(short, long, default_value = "none")]
    style: String,

    /// Aspect ratio
    #[arg(short, long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Save the image to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,
}

#[derive(Args)]
struct ShowArgs {
    /// Record id, or 1-based position in history
    id: String,

    /// Output file path (default: farhanimasi-ai-<id>.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ShellArgs {
    /// Initial style id
    #[arg(short, long, default_value = "none")]
    style: String,

    /// Initial aspect ratio
    #[arg(short, long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Directory for `:save` without a path
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    provider: ProviderArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "3:4")]
    StandardPortrait,
    #[value(name = "4:3")]
    Standard,
    #[value(name = "9:16")]
    Portrait,
    #[value(name = "16:9")]
    Landscape,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::StandardPortrait => AspectRatio::StandardPortrait,
            AspectRatioArg::Standard => AspectRatio::Standard,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.history_file.as_deref())?;

    match cli.command {
        Commands::Generate(args) => generate(args, store, cli.json).await?,
        Commands::History => list_history(&store, cli.json)?,
        Commands::Show(args) => show(args, &store, cli.json).await?,
        Commands::Clear => clear(&store, cli.json)?,
        Commands::Styles => list_styles(cli.json)?,
        Commands::Shell(args) => run_shell(args, store).await?,
        Commands::Check(args) => check(args, cli.json).await?,
    }

    Ok(())
}

fn open_store(path: Option<&Path>) -> anyhow::Result<JsonFileStore> {
    let store = match path {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::open_default()?,
    };
    tracing::debug!(path = %store.path().display(), "using history file");
    Ok(store)
}

fn resolve_style(id: &str) -> anyhow::Result<&'static StyleDescriptor> {
    find_style(id).ok_or_else(|| {
        anyhow::anyhow!("unknown style '{id}' (run `genstudio styles` for the list)")
    })
}

fn build_provider(args: &ProviderArgs) -> anyhow::Result<GeminiProvider> {
    Ok(GeminiProvider::builder().model(args.model.into()).build()?)
}

/// Stored history without a provider, for read-only commands.
fn load_history(store: &JsonFileStore) -> History {
    match store.load() {
        Ok(records) => History::from_records(records),
        Err(e) => {
            tracing::warn!(error = %e, "stored history unreadable, treating as empty");
            History::new()
        }
    }
}

fn record_json(record: &GeneratedImageRecord) -> serde_json::Value {
    // data URIs are too large to print
    let url = if record.url.is_data_uri() {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(record.url.to_string())
    };
    serde_json::json!({
        "id": record.id,
        "prompt": record.prompt,
        "style": record.style_name,
        "created_at": record.created_at.to_rfc3339(),
        "inline": record.url.is_data_uri(),
        "url": url,
    })
}

async fn generate(args: GenerateArgs, store: JsonFileStore, json_output: bool) -> anyhow::Result<()> {
    if args.prompt.trim().is_empty() {
        anyhow::bail!("prompt must not be empty");
    }
    let style = resolve_style(&args.style)?;
    let provider = build_provider(&args.provider)?;
    let mut session = Session::new(provider, store);

    let record = match session
        .submit(&args.prompt, style, args.aspect_ratio.into())
        .await
    {
        SubmitOutcome::Generated(record) => record,
        SubmitOutcome::Failed(e) => return Err(e.into()),
        SubmitOutcome::Ignored => anyhow::bail!("generation was not started"),
    };

    let saved = match args.output {
        Some(ref path) => Some(session.download(&record, path).await?),
        None => None,
    };

    if json_output {
        let mut result = record_json(&record);
        result["success"] = true.into();
        result["history_len"] = session.history().len().into();
        if let (Some(path), Some(bytes)) = (&args.output, saved) {
            result["output"] = path.display().to_string().into();
            result["size_bytes"] = bytes.into();
        }
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Generated image {} ({})", record.id, record.style_name);
        if let (Some(path), Some(bytes)) = (&args.output, saved) {
            println!("Saved: {} ({} bytes)", path.display(), bytes);
        } else {
            println!("Save it with: genstudio show {}", record.id);
        }
    }

    Ok(())
}

fn list_history(store: &JsonFileStore, json_output: bool) -> anyhow::Result<()> {
    let history = load_history(store);
    if json_output {
        let records: Vec<_> = history.iter().map(record_json).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("{}", history_table(history.records()));
    }
    Ok(())
}

async fn show(args: ShowArgs, store: &JsonFileStore, json_output: bool) -> anyhow::Result<()> {
    let history = load_history(store);
    let record = match args.id.parse::<usize>() {
        Ok(n) if n >= 1 && history.get(&args.id).is_none() => history.records().get(n - 1),
        _ => history.get(&args.id),
    }
    .ok_or_else(|| anyhow::anyhow!("no history entry '{}'", args.id))?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(record.download_filename()));
    let bytes = record.url.save_to(&reqwest::Client::new(), &path).await?;

    if json_output {
        let mut result = record_json(record);
        result["output"] = path.display().to_string().into();
        result["size_bytes"] = bytes.into();
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Saved: {} ({} bytes)", path.display(), bytes);
    }
    Ok(())
}

fn clear(store: &JsonFileStore, json_output: bool) -> anyhow::Result<()> {
    store.clear()?;
    if json_output {
        println!("{}", serde_json::json!({ "success": true }));
    } else {
        println!("History cleared");
    }
    Ok(())
}

fn list_styles(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&genstudio::STYLES)?);
    } else {
        println!("Available styles:\n");
        println!("{}", styles_table(default_style()));
    }
    Ok(())
}

async fn run_shell(args: ShellArgs, store: JsonFileStore) -> anyhow::Result<()> {
    let style = resolve_style(&args.style)?;
    let provider = build_provider(&args.provider)?;
    let session = Session::new(provider, store);

    let mut shell = Shell::new(session, args.output_dir).with_selection(style, args.aspect_ratio.into());
    shell.run().await?;
    Ok(())
}

async fn check(args: ProviderArgs, json_output: bool) -> anyhow::Result<()> {
    let model: GeminiModel = args.model.into();
    let provider = build_provider(&args)?;
    let result = provider.health_check().await;

    if json_output {
        let mut out = serde_json::json!({
            "provider": provider.name(),
            "model": model.as_str(),
            "available": result.is_ok(),
        });
        if let Err(ref e) = result {
            out["error"] = e.to_string().into();
            out["kind"] = format!("{:?}", e.kind()).into();
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match &result {
            Ok(()) => println!("{} ({}): ok", provider.name(), model.as_str()),
            Err(e) => println!("{} ({}): {}", provider.name(), model.as_str(), e),
        }
    }

    result.map_err(Into::into)
}
