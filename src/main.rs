use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clonewatch::commands::{self, RunArgs};
use clonewatch_core::SettingsExt;
use clonewatch_types::{CombatStyle, Settings};

#[derive(Parser)]
#[command(version, about = "Countdown overlay for clone rotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the chat file and drive the overlay
    Run {
        /// Chat text file written by the OCR reader
        #[arg(short, long)]
        chat: Option<PathBuf>,
        /// Process lines already in the chat file
        #[arg(long)]
        from_start: bool,
        /// Write the composited overlay to this PNG while running
        #[arg(long)]
        frame_out: Option<PathBuf>,
        #[arg(long, default_value_t = 100)]
        frame_ms: u64,
        /// Run without the interactive prompt
        #[arg(long)]
        no_repl: bool,
    },
    /// Render a preview of the first phase to a PNG
    Preview {
        #[arg(short, long)]
        out: PathBuf,
        #[arg(short, long)]
        style: Option<CombatStyle>,
    },
    /// Show the settings file location and contents
    Config,
    /// List the built-in sequences
    Sequences,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let (settings, load_error) = match Settings::try_load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    let _log_guard = clonewatch::logging::init(settings.debug_mode);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Failed to load settings, using defaults");
    }

    match cli.command {
        Commands::Run {
            chat,
            from_start,
            frame_out,
            frame_ms,
            no_repl,
        } => {
            let args = RunArgs {
                chat,
                from_start,
                frame_out,
                frame_ms,
                no_repl,
            };
            commands::run(settings, args).await
        }
        Commands::Preview { out, style } => commands::preview(&settings, &out, style),
        Commands::Config => commands::show_config(&settings),
        Commands::Sequences => commands::list_sequences(),
    }
}
