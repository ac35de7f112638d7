use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "player",
    version,
    about = "Inspect and strip advertisement segments from HLS playlists"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "PLAYER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove advertisement segments from a playlist
    Filter {
        /// Playlist URL (http/https) or local file
        source: String,

        /// URL the playlist was served from, used to resolve relative segments
        #[arg(long)]
        source_url: Option<String>,

        /// Write the filtered playlist here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the filter outcome as JSON instead of the playlist
        #[arg(long)]
        json: bool,
    },

    /// Show discontinuity groups and the decision taken for each
    Inspect {
        /// Playlist URL (http/https) or local file
        source: String,

        /// URL the playlist was served from, used to resolve relative segments
        #[arg(long)]
        source_url: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
    Table,
}
