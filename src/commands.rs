use std::path::{Path, PathBuf};
use std::time::Duration;

use clonewatch_core::sequences::SequenceCatalog;
use clonewatch_core::{IconSet, SettingsExt, TimerEngine};
use clonewatch_overlay::{IconLoader, OverlayCanvas, placeholder_set};
use clonewatch_types::{CombatStyle, Settings};
use tokio::sync::mpsc;

use crate::repl;
use crate::service::{CountdownService, ServiceCommand, ServiceOptions};

/// Phase icons from `icon_dir`, or generated placeholders when unset
pub fn load_icons(settings: &Settings, catalog: &SequenceCatalog) -> IconSet {
    match &settings.icon_dir {
        Some(dir) => IconLoader::new(dir).load_all(catalog.icon_ids()),
        None => {
            tracing::debug!("No icon directory configured, using placeholders");
            placeholder_set(catalog.icon_ids())
        }
    }
}

pub struct RunArgs {
    pub chat: Option<PathBuf>,
    pub from_start: bool,
    pub frame_out: Option<PathBuf>,
    pub frame_ms: u64,
    pub no_repl: bool,
}

/// Run the countdown service until `exit`, EOF or Ctrl-C
pub async fn run(settings: Settings, args: RunArgs) -> Result<(), String> {
    let options = ServiceOptions {
        chat: args.chat,
        from_start: args.from_start,
        frame_out: args.frame_out,
        frame_interval: Duration::from_millis(args.frame_ms),
        persist_settings: true,
    };
    let service = CountdownService::new(settings, options).await?;

    let (tx, rx) = mpsc::channel(32);

    let signal_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal_tx.send(ServiceCommand::Shutdown).await;
        }
    });

    if args.no_repl {
        // Keep one sender alive so the service only stops on Ctrl-C
        tokio::spawn(async move {
            tx.closed().await;
        });
    } else {
        std::thread::spawn(move || {
            if let Err(e) = repl::run(tx) {
                tracing::error!(error = %e, "REPL failed");
            }
        });
    }

    service.run(rx).await;
    Ok(())
}

/// Render the first phase of a sequence to a PNG
pub fn preview(settings: &Settings, out: &Path, style: Option<CombatStyle>) -> Result<(), String> {
    let mut settings = settings.clone();
    let host = settings.host;
    settings.initialize_default_position(&host);

    let style = style.unwrap_or(settings.combat_style);
    let catalog = SequenceCatalog::builtin().map_err(|e| e.to_string())?;
    let sequence = catalog
        .get(style)
        .ok_or_else(|| format!("no sequence for style {style}"))?;

    let canvas = OverlayCanvas::new(&settings.host).map_err(|e| e.to_string())?;
    let mut engine = TimerEngine::new(canvas, load_icons(&settings, &catalog));
    engine.preview(&sequence, &settings, &settings.host);
    engine
        .surface_mut()
        .save_png(out)
        .map_err(|e| e.to_string())?;

    println!("wrote {} preview to {}", style, out.display());
    Ok(())
}

pub fn show_config(settings: &Settings) -> Result<(), String> {
    let path = Settings::config_path().map_err(|e| e.to_string())?;
    println!("config file: {}", path.display());
    println!("{settings:#?}");
    Ok(())
}

pub fn list_sequences() -> Result<(), String> {
    let catalog = SequenceCatalog::builtin().map_err(|e| e.to_string())?;
    for (style, sequence) in catalog.styles() {
        println!(
            "{} ({:.1}s)",
            style,
            sequence.total_duration().as_secs_f32()
        );
        for (i, phase) in sequence.phases().iter().enumerate() {
            println!(
                "  {}. {:<16} {}ms",
                i + 1,
                phase.icon_ids.join(" + "),
                phase.duration.as_millis()
            );
        }
    }
    Ok(())
}
