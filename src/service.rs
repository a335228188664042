//! Countdown service loop
//!
//! One task owns the engine, the trigger detector and the settings. It waits
//! on whichever comes first: the engine's next tick deadline, the chat poll
//! interval, a command from the REPL, or the frame dump interval.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clonewatch_core::sequences::SequenceCatalog;
use clonewatch_core::timers::{PhaseStatus, TimerEngine, label_text};
use clonewatch_core::{ChatTail, IconSet, SettingsExt, TriggerDetector};
use clonewatch_overlay::OverlayCanvas;
use clonewatch_types::{CombatStyle, Settings};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

use crate::commands::load_icons;

pub type LiveEngine = TimerEngine<OverlayCanvas, IconSet>;

/// Commands sent to the service from the REPL or signal handlers
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCommand {
    Start,
    Stop,
    Status,
    ShowPreview,
    HidePreview,
    SetStyle(CombatStyle),
    SetTicks(bool),
    SetShowImage(bool),
    SetShowBar(bool),
    SetPingCompensation(bool),
    SetPing(u32),
    SetOffset(i32, i32),
    SetScale(f32),
    SetDebug(bool),
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Chat text file to follow
    pub chat: Option<PathBuf>,
    /// Read existing chat lines instead of starting at the end
    pub from_start: bool,
    /// Write the composited overlay here on every frame tick
    pub frame_out: Option<PathBuf>,
    pub frame_interval: Duration,
    /// Save settings changes made through commands
    pub persist_settings: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            chat: None,
            from_start: false,
            frame_out: None,
            frame_interval: Duration::from_millis(100),
            persist_settings: true,
        }
    }
}

pub struct CountdownService {
    engine: LiveEngine,
    catalog: SequenceCatalog,
    detector: TriggerDetector,
    settings: Settings,
    chat: Option<ChatTail>,
    frame_out: Option<PathBuf>,
    frame_interval: Duration,
    persist_settings: bool,
    preview_visible: bool,
}

impl CountdownService {
    pub async fn new(mut settings: Settings, options: ServiceOptions) -> Result<Self, String> {
        let host = settings.host;
        if settings.initialize_default_position(&host) && options.persist_settings {
            save_settings(&settings);
        }

        let catalog = SequenceCatalog::builtin().map_err(|e| e.to_string())?;
        let icons = load_icons(&settings, &catalog);
        let canvas = OverlayCanvas::new(&settings.host).map_err(|e| e.to_string())?;

        let mut engine = TimerEngine::new(canvas, icons);
        engine.on_complete(|| tracing::info!("Countdown finished"));

        let chat = match options.chat {
            Some(path) if options.from_start => Some(ChatTail::new(path)),
            Some(path) => Some(ChatTail::from_end(path).await.map_err(|e| e.to_string())?),
            None => None,
        };

        Ok(Self {
            engine,
            catalog,
            detector: TriggerDetector::new(&settings.triggers),
            settings,
            chat,
            frame_out: options.frame_out,
            frame_interval: options.frame_interval.max(Duration::from_millis(16)),
            persist_settings: options.persist_settings,
            preview_visible: false,
        })
    }

    pub fn engine(&self) -> &LiveEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    /// Run until `Shutdown` arrives or every sender is dropped
    pub async fn run(mut self, mut rx: mpsc::Receiver<ServiceCommand>) {
        let mut chat_interval = interval(Duration::from_millis(self.settings.chat_poll_ms.max(16)));
        chat_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame_interval = interval(self.frame_interval);
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if let Some(chat) = &self.chat {
            tracing::info!(path = %chat.path().display(), "Watching chat file");
        }

        loop {
            let deadline = self.engine.next_deadline();

            tokio::select! {
                _ = sleep_until_deadline(deadline) => {
                    self.engine.advance(&self.settings);
                }
                _ = chat_interval.tick(), if self.chat.is_some() => {
                    self.poll_chat().await;
                }
                command = rx.recv() => {
                    match command {
                        Some(ServiceCommand::Shutdown) | None => break,
                        Some(command) => self.handle(command),
                    }
                }
                _ = frame_interval.tick(), if self.frame_out.is_some() => {
                    self.dump_frame();
                }
            }
        }

        self.engine.stop();
        self.dump_frame();
        tracing::info!("Countdown service stopped");
    }

    async fn poll_chat(&mut self) {
        let Some(chat) = self.chat.as_mut() else {
            return;
        };

        let lines = match chat.poll().await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "Chat poll failed");
                return;
            }
        };
        if lines.is_empty() {
            return;
        }

        let scan = self.detector.scan(&lines);
        for line in &scan.new_lines {
            if self.settings.debug_mode {
                tracing::info!(line = %line, "Chat line");
            } else {
                tracing::debug!(line = %line, "Chat line");
            }
        }

        if scan.fired {
            tracing::info!("Trigger detected");
            self.start_countdown();
        }
    }

    /// Apply one command
    pub fn handle(&mut self, command: ServiceCommand) {
        match command {
            ServiceCommand::Start => {
                self.start_countdown();
            }
            ServiceCommand::Stop => {
                if !self.engine.stop() {
                    tracing::info!("No countdown running");
                }
            }
            ServiceCommand::Status => println!("{}", self.status()),
            ServiceCommand::ShowPreview => {
                self.preview_visible = true;
                self.redraw_preview();
            }
            ServiceCommand::HidePreview => {
                self.preview_visible = false;
                self.engine.clear_preview();
            }
            ServiceCommand::SetStyle(style) => {
                self.settings.combat_style = style;
                self.settings_changed();
            }
            ServiceCommand::SetTicks(on) => {
                self.settings.use_ticks = on;
                self.settings_changed();
            }
            ServiceCommand::SetShowImage(on) => {
                self.settings.show_image = on;
                self.settings_changed();
            }
            ServiceCommand::SetShowBar(on) => {
                self.settings.show_progress_bar = on;
                self.settings_changed();
            }
            ServiceCommand::SetPingCompensation(on) => {
                self.settings.compensate_for_ping = on;
                self.settings_changed();
            }
            ServiceCommand::SetPing(ms) => {
                // Latency sample, not a setting
                self.settings.host.ping_ms = ms;
            }
            ServiceCommand::SetOffset(x, y) => {
                self.settings.overlay_offset_x = x;
                self.settings.overlay_offset_y = y;
                self.settings_changed();
            }
            ServiceCommand::SetScale(scale) => {
                self.settings.set_scale(scale);
                self.settings_changed();
            }
            ServiceCommand::SetDebug(on) => {
                self.settings.debug_mode = on;
                self.settings_changed();
            }
            ServiceCommand::Shutdown => {}
        }
    }

    fn start_countdown(&mut self) -> Option<u64> {
        let Some(sequence) = self.catalog.get(self.settings.combat_style) else {
            tracing::warn!(style = %self.settings.combat_style, "No sequence for combat style");
            return None;
        };
        Some(self.engine.start(sequence, &self.settings, &self.settings.host))
    }

    fn settings_changed(&mut self) {
        if self.persist_settings {
            save_settings(&self.settings);
        }
        if self.preview_visible {
            self.redraw_preview();
        }
    }

    fn redraw_preview(&mut self) {
        if let Some(sequence) = self.catalog.get(self.settings.combat_style) {
            self.engine
                .preview(&sequence, &self.settings, &self.settings.host);
        }
    }

    pub fn status(&self) -> String {
        let phase = match self.engine.current_phase() {
            Some(PhaseStatus::Active(snapshot)) => format!(
                "phase {} {}",
                snapshot.index + 1,
                label_text(snapshot.remaining, self.settings.use_ticks)
            ),
            Some(PhaseStatus::Exhausted) => "finished".to_string(),
            None => "-".to_string(),
        };

        let shift = match self.engine.run() {
            Some(run) if !run.ping_offset().is_zero() => {
                format!(" (run shifted {}ms)", run.ping_offset().as_millis())
            }
            _ if self.settings.compensate_for_ping => " (compensated)".to_string(),
            _ => String::new(),
        };

        format!(
            "state: {:?} | {} | style: {} | ticks: {} | offset: {},{} | scale: {:.0}% | ping: {}ms{}",
            self.engine.state(),
            phase,
            self.settings.combat_style,
            self.settings.use_ticks,
            self.settings.overlay_offset_x,
            self.settings.overlay_offset_y,
            self.settings.overlay_scale * 100.0,
            self.settings.host.ping_ms,
            shift,
        )
    }

    fn dump_frame(&mut self) {
        let Some(path) = &self.frame_out else {
            return;
        };
        if let Err(e) = self.engine.surface_mut().save_png(path) {
            tracing::debug!(error = %e, "Frame dump failed");
        }
    }
}

fn save_settings(settings: &Settings) {
    if let Err(e) = settings.save() {
        tracing::warn!(error = %e, "Failed to save settings");
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
