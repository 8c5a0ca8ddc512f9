use std::path::PathBuf;

use clap::{Parser, Subcommand};

use placemap_core::config::load_app_config;

mod commands;
mod session;

#[derive(Debug, Parser)]
#[command(name = "placemap")]
#[command(about = "Turn place-listing text into a structured, geocoded map dataset")]
struct Cli {
    /// Session file holding the extracted text and document tiers.
    #[arg(
        long,
        env = "PLACEMAP_SESSION_PATH",
        default_value = ".placemap-session.json",
        global = true
    )]
    session: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import a JSON dataset into the saved document.
    Import { file: PathBuf },
    /// Store raw listing text (OCR output, pasted notes) for structuring.
    Ingest { file: PathBuf },
    /// Structure the ingested text into a provisional document via the model.
    Extract {
        /// Extra instruction passed to the structuring model.
        #[arg(long, default_value = "")]
        instruction: String,
    },
    /// Apply a free-form instruction to a provisional copy of the saved document.
    Edit { instruction: String },
    /// Show completeness statistics (both tiers while edits are pending).
    Stats,
    /// List every tag in use across items and filter categories.
    Tags,
    /// Show per-item coordinate resolution status.
    Status,
    /// Resolve missing coordinates through the geocoding service.
    Geocode {
        /// Operate on the editing tier instead of the saved document.
        #[arg(long)]
        editing: bool,
    },
    /// Commit pending edits into the saved document.
    Apply,
    /// Drop pending edits and revert the editing copy.
    Discard,
    /// Export the saved document as JSON with viewport framing, or as CSV.
    Export {
        #[arg(long)]
        csv: bool,
        /// Omit empty fields from exported items.
        #[arg(long)]
        remove_empty: bool,
        /// Drop items whose coordinates are still unresolved.
        #[arg(long)]
        remove_zero_coords: bool,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Clear the whole session.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    let mut store = session::load(&cli.session)?;

    match cli.command {
        Commands::Import { file } => commands::import(&mut store, &file)?,
        Commands::Ingest { file } => commands::ingest(&mut store, &file)?,
        Commands::Extract { instruction } => {
            commands::extract(&mut store, &config, &instruction).await?;
        }
        Commands::Edit { instruction } => {
            commands::edit(&mut store, &config, &instruction).await?;
        }
        Commands::Stats => commands::stats(&store),
        Commands::Tags => commands::tags(&store),
        Commands::Status => commands::status(&store),
        Commands::Geocode { editing } => commands::geocode(&mut store, &config, editing).await?,
        Commands::Apply => commands::apply(&mut store)?,
        Commands::Discard => commands::discard(&mut store),
        Commands::Export {
            csv,
            remove_empty,
            remove_zero_coords,
            out,
        } => commands::export_command(&store, csv, remove_empty, remove_zero_coords, out.as_deref())?,
        Commands::Reset => {
            commands::reset(&cli.session, &mut store)?;
            return Ok(());
        }
    }

    session::save(&cli.session, &store)?;
    Ok(())
}
