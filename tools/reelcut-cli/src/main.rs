//! Reelcut CLI: command-line interface for reel editing and export.
//!
//! Usage:
//!   reelcut inspect <INPUT>              Show clip input and caption summary
//!   reelcut subtitles <INPUT>            Write SRT/VTT captions for the trim window
//!   reelcut preview <INPUT>              Print the caption timeline and overlay frames
//!   reelcut export <INPUT> --media <F>   Cut the trim window and write sidecars
//!   reelcut thumbnail <MEDIA>            Extract a JPEG frame
//!   reelcut audio <MEDIA>                Extract transcription-ready audio
//!   reelcut check                        Check the media pipeline

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reelcut",
    about = "Turn long videos into captioned vertical reels",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show clip input and caption summary
    Inspect {
        /// Path to the ReelClipInput JSON
        input: PathBuf,
    },

    /// Write subtitles for the trim window
    Subtitles {
        /// Path to the ReelClipInput JSON
        input: PathBuf,

        /// Output file; the extension picks the format (.srt or .vtt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the caption timeline and overlay frames at a point in time
    Preview {
        /// Path to the ReelClipInput JSON
        input: PathBuf,

        /// Source time to preview (seconds or HH:MM:SS.mmm); defaults to the trim start
        #[arg(long)]
        at: Option<String>,

        /// Timeline viewport height in pixels
        #[arg(long, default_value = "480")]
        height: f64,

        /// Write the full overlay plan as JSON
        #[arg(long)]
        plan: Option<PathBuf>,
    },

    /// Cut the trim window out of the source media
    Export {
        /// Path to the ReelClipInput JSON
        input: PathBuf,

        /// Source media file
        #[arg(short, long)]
        media: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Base URL the exported file will be served from
        #[arg(long)]
        url_base: Option<String>,

        /// Export-seconds budget to check before clipping
        #[arg(long)]
        credits: Option<f64>,

        /// Overlay plan frame rate (defaults to the configured preview fps)
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Extract a single JPEG frame
    Thumbnail {
        /// Source media file
        media: PathBuf,

        /// Timestamp (seconds or HH:MM:SS.mmm)
        #[arg(long, default_value = "0")]
        at: String,

        /// Output file
        #[arg(short, long, default_value = "thumbnail.jpg")]
        output: PathBuf,
    },

    /// Extract mono audio for transcription
    Audio {
        /// Source media file
        media: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "audio.mp3")]
        output: PathBuf,
    },

    /// Check the media pipeline
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = reelcut_common::config::AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    reelcut_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Inspect { input } => commands::inspect::run(input, &config),
        Commands::Subtitles { input, output } => commands::subtitles::run(input, output, &config),
        Commands::Preview {
            input,
            at,
            height,
            plan,
        } => commands::preview::run(input, at, height, plan, &config),
        Commands::Export {
            input,
            media,
            output,
            url_base,
            credits,
            fps,
        } => commands::export::run(input, media, output, url_base, credits, fps, &config).await,
        Commands::Thumbnail { media, at, output } => {
            commands::media::thumbnail(media, at, output, &config).await
        }
        Commands::Audio { media, output } => commands::media::audio(media, output, &config).await,
        Commands::Check => commands::check::run(&config).await,
    }
}
