//! Interactive command line
//!
//! Lines are split with shlex and parsed with clap, so REPL commands get the
//! same quoting, help and error messages as the top-level CLI.

use std::io::Write;

use clap::{Parser, Subcommand, ValueEnum};
use clonewatch_types::CombatStyle;
use tokio::sync::mpsc;

use crate::service::ServiceCommand;

/// Print a prompt and read one line. Returns `None` at end of input.
pub fn readline() -> Result<Option<String>, String> {
    write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;

    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle == Toggle::On
    }
}

#[derive(Parser)]
#[command(about = "clonewatch commands")]
struct ReplCli {
    #[command(subcommand)]
    command: Option<ReplCommand>,
}

#[derive(Subcommand)]
enum ReplCommand {
    /// Start the countdown for the current combat style
    Start,
    /// Stop the running countdown
    Stop,
    /// Show timer state and settings
    Status,
    /// Draw the position preview
    Preview,
    /// Remove the position preview
    HidePreview,
    /// Select the combat style
    Style { style: CombatStyle },
    /// Round the label down to 600ms game ticks
    Ticks { state: Toggle },
    /// Show phase icons
    Images { state: Toggle },
    /// Show the progress bar
    Bar { state: Toggle },
    /// Start countdowns early by the latency sample
    PingComp { state: Toggle },
    /// Set the latency sample in milliseconds
    Ping { ms: u32 },
    /// Move the overlay anchor (relative to the host window)
    Offset {
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        y: i32,
    },
    /// Overlay scale in percent
    Scale { percent: f32 },
    /// Log every accepted chat line
    Debug { state: Toggle },
    Exit,
}

/// Parse one REPL line into a service command
pub fn respond(line: &str) -> Result<Option<ServiceCommand>, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "clonewatch".to_string());
    let cli = ReplCli::try_parse_from(args).map_err(|e| e.to_string())?;

    let command = match cli.command {
        Some(ReplCommand::Start) => ServiceCommand::Start,
        Some(ReplCommand::Stop) => ServiceCommand::Stop,
        Some(ReplCommand::Status) => ServiceCommand::Status,
        Some(ReplCommand::Preview) => ServiceCommand::ShowPreview,
        Some(ReplCommand::HidePreview) => ServiceCommand::HidePreview,
        Some(ReplCommand::Style { style }) => ServiceCommand::SetStyle(style),
        Some(ReplCommand::Ticks { state }) => ServiceCommand::SetTicks(state.into()),
        Some(ReplCommand::Images { state }) => ServiceCommand::SetShowImage(state.into()),
        Some(ReplCommand::Bar { state }) => ServiceCommand::SetShowBar(state.into()),
        Some(ReplCommand::PingComp { state }) => ServiceCommand::SetPingCompensation(state.into()),
        Some(ReplCommand::Ping { ms }) => ServiceCommand::SetPing(ms),
        Some(ReplCommand::Offset { x, y }) => ServiceCommand::SetOffset(x, y),
        Some(ReplCommand::Scale { percent }) => ServiceCommand::SetScale(percent / 100.0),
        Some(ReplCommand::Debug { state }) => ServiceCommand::SetDebug(state.into()),
        Some(ReplCommand::Exit) => ServiceCommand::Shutdown,
        None => return Ok(None),
    };
    Ok(Some(command))
}

/// Read commands from stdin until `exit` or end of input.
///
/// Blocking; run it on its own thread.
pub fn run(tx: mpsc::Sender<ServiceCommand>) -> Result<(), String> {
    loop {
        let Some(line) = readline()? else {
            let _ = tx.blocking_send(ServiceCommand::Shutdown);
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line) {
            Ok(Some(command)) => {
                let shutdown = matches!(command, ServiceCommand::Shutdown);
                if tx.blocking_send(command).is_err() || shutdown {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggles() {
        assert!(matches!(respond("ticks on"), Ok(Some(ServiceCommand::SetTicks(true)))));
        assert!(matches!(respond("bar off"), Ok(Some(ServiceCommand::SetShowBar(false)))));
        assert!(respond("ticks maybe").is_err());
    }

    #[test]
    fn test_parse_style() {
        assert!(matches!(
            respond("style necro"),
            Ok(Some(ServiceCommand::SetStyle(CombatStyle::Necro)))
        ));
        assert!(respond("style ranged").is_err());
    }

    #[test]
    fn test_parse_negative_offset() {
        assert!(matches!(
            respond("offset -20 340"),
            Ok(Some(ServiceCommand::SetOffset(-20, 340)))
        ));
    }

    #[test]
    fn test_scale_is_percent() {
        match respond("scale 150") {
            Ok(Some(ServiceCommand::SetScale(scale))) => assert!((scale - 1.5).abs() < f32::EPSILON),
            _ => panic!("expected a scale command"),
        }
    }

    #[test]
    fn test_quoting_errors() {
        assert!(respond("style \"magic").is_err());
    }

    #[test]
    fn test_exit_maps_to_shutdown() {
        assert!(matches!(respond("exit"), Ok(Some(ServiceCommand::Shutdown))));
    }
}
