use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cli::commands::{
    AddCommand, AddPhotoCommand, ChatCommand, DeleteCommand, EditCommand, ImportCommand,
    InitStorageCommand, ListCommand, RecognizeCommand, VoiceCommand,
};
use cli::AppContext;
use common::{init_structured_logging, AppConfig, LogFormat, LoggingConfig};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "aidentify")]
#[command(about = "AIdentify - industrial parts catalog with visual recognition")]
#[command(version)]
struct Cli {
    /// TOML config file (default: $AIDENTIFY_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// pretty | json
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// -v debug, -vv trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog parts, most recent first
    List(ListCommand),
    /// Create a part
    Add(AddCommand),
    /// Change fields of a part and append photos
    Edit(EditCommand),
    /// Append one photo to a part
    AddPhoto(AddPhotoCommand),
    /// Delete a part
    Delete(DeleteCommand),
    /// Bulk-create parts from a CSV spreadsheet
    Import(ImportCommand),
    /// Identify a part from a photo
    Recognize(RecognizeCommand),
    /// Ask the catalog assistant
    Chat(ChatCommand),
    /// Talk to the voice assistant using PCM audio files
    Voice(VoiceCommand),
    /// Create the photo bucket if it does not exist
    InitStorage(InitStorageCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    let level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    init_structured_logging(
        LoggingConfig::default()
            .with_level_name(level)
            .with_format(cli.log_format.unwrap_or(config.logging.format)),
    )?;
    if let Some(path) = &config.source {
        info!(path = %path.display(), "Loaded configuration file");
    }
    debug!(
        supabase = config.supabase_configured(),
        gemini_key = config.gemini.api_key.is_some(),
        "Configuration loaded"
    );

    let ctx = AppContext::new(config);
    match cli.command {
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Add(cmd) => cmd.execute(&ctx).await,
        Commands::Edit(cmd) => cmd.execute(&ctx).await,
        Commands::AddPhoto(cmd) => cmd.execute(&ctx).await,
        Commands::Delete(cmd) => cmd.execute(&ctx).await,
        Commands::Import(cmd) => cmd.execute(&ctx).await,
        Commands::Recognize(cmd) => cmd.execute(&ctx).await,
        Commands::Chat(cmd) => cmd.execute(&ctx).await,
        Commands::Voice(cmd) => cmd.execute(&ctx).await,
        Commands::InitStorage(cmd) => cmd.execute(&ctx).await,
    }
}
