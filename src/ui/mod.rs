pub mod layout;
mod piano_roll;
pub mod render;

use crate::engine::AudioEngine;
use crate::midi::MidiDocument;
use crate::settings::Settings;
use crate::timing::{FrameLoop, PlaybackPhase, Session, TickOutcome};
use eframe::egui;
use piano_roll::PianoRoll;
use render::track_color;
use std::path::{Path, PathBuf};

pub struct MidiRollApp {
    session: Session,
    frames: FrameLoop,
    engine: AudioEngine,
    settings: Settings,
    file_path: Option<PathBuf>,
    error_message: Option<String>,
    hovered: Option<(f64, u8)>,
}

impl MidiRollApp {
    pub fn new(settings: Settings, initial_file: Option<PathBuf>) -> Self {
        let mut app = Self {
            session: Session::new(settings.synth.clone()),
            frames: FrameLoop::new(),
            engine: AudioEngine::new(settings.synth.clone()),
            settings,
            file_path: None,
            error_message: None,
            hovered: None,
        };

        if let Some(path) = initial_file {
            app.open_file(&path);
        }
        app
    }

    /// Parses `path` and replaces the session's document. On failure the
    /// current document stays open.
    pub fn open_file(&mut self, path: &Path) {
        match MidiDocument::load(path) {
            Ok(document) => {
                self.session
                    .load(document, &mut self.frames, &mut self.engine);
                self.file_path = Some(path.to_path_buf());
                self.error_message = None;
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to load MIDI file: {e}");
                self.error_message = Some(format!("Failed to load {}: {}", path.display(), e));
            }
        }
    }

    fn play(&mut self) {
        if let Err(e) = self.session.play(&mut self.frames, &mut self.engine) {
            tracing::error!("failed to start playback: {e}");
            self.error_message = Some(format!("Failed to start audio: {}", e));
        }
    }

    fn pause(&mut self) {
        self.session.pause(&mut self.frames, &mut self.engine);
    }

    fn stop(&mut self) {
        self.session.stop(&mut self.frames, &mut self.engine);
    }

    fn advance_frame(&mut self) {
        let Some(request) = self.frames.take_due() else {
            return;
        };
        match self
            .session
            .tick(request, &mut self.frames, &mut self.engine)
        {
            TickOutcome::Finished => tracing::info!("reached end of piece"),
            TickOutcome::Continue { .. } | TickOutcome::Stale => {}
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.last() {
            self.open_file(path);
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            let transport = self.session.transport();
            if transport.play {
                self.play();
            } else if transport.pause {
                self.pause();
            }
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open MIDI...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title("Open MIDI File")
                        .add_filter("MIDI", &["mid", "midi"])
                        .pick_file()
                    {
                        self.open_file(&path);
                    }
                    ui.close();
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            if let Some(path) = &self.file_path {
                ui.label(
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
        });
    }

    fn transport_controls(&mut self, ui: &mut egui::Ui) {
        let transport = self.session.transport();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(transport.play, egui::Button::new("▶ Play"))
                .clicked()
            {
                self.play();
            }
            if ui
                .add_enabled(transport.pause, egui::Button::new("⏸ Pause"))
                .clicked()
            {
                self.pause();
            }
            if ui
                .add_enabled(transport.stop, egui::Button::new("⏹ Stop"))
                .clicked()
            {
                self.stop();
            }
        });

        let status = match self.session.phase() {
            PlaybackPhase::Idle => "No file",
            PlaybackPhase::Stopped => "Stopped",
            PlaybackPhase::Playing => "Playing",
            PlaybackPhase::Paused => "Paused",
        };
        ui.label(format!(
            "{status}  {:.1} / {:.1} s",
            self.session.playhead_time(),
            self.session.total_duration()
        ));
    }

    fn track_list(&mut self, ui: &mut egui::Ui) {
        let filter = self.session.track_filter();
        let mut selected = filter;

        if ui.selectable_label(filter.is_none(), "All tracks").clicked() {
            selected = None;
        }

        for track in self.session.tracks() {
            let is_selected = filter == Some(track.index);
            let render::Rgb(r, g, b) = track_color(track.index);
            let label = egui::RichText::new(&track.label).color(egui::Color32::from_rgb(r, g, b));
            if ui.selectable_label(is_selected, label).clicked() {
                selected = Some(track.index);
            }
        }

        if selected != filter {
            self.session.select_track(selected);
        }
    }
}

impl eframe::App for MidiRollApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for message in self.engine.take_errors() {
            self.error_message = Some(format!("Audio error: {}", message));
        }

        self.handle_input(ctx);
        self.advance_frame();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui);
        });

        if let Some(ref error) = self.error_message {
            egui::TopBottomPanel::top("error").show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, error);
            });
        }

        if self.session.document().is_some() {
            egui::SidePanel::left("tracks")
                .min_width(200.0)
                .show(ctx, |ui| {
                    ui.heading("Transport");
                    self.transport_controls(ui);

                    ui.separator();
                    ui.heading("Tracks");
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.track_list(ui);
                    });

                    if let Some((time, pitch)) = self.hovered {
                        ui.separator();
                        ui.label(format!("{} at {:.2}s", crate::midi::pitch_name(pitch), time));
                    }
                });

            egui::CentralPanel::default().show(ctx, |ui| {
                let response = PianoRoll::new(&self.session, self.settings.canvas_width).show(ui);
                self.hovered = response.hovered;
            });
        } else {
            // An empty grid until the first file arrives.
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("File → Open MIDI... or drop a .mid file here");
                let response = PianoRoll::new(&self.session, self.settings.canvas_width).show(ui);
                self.hovered = response.hovered;
            });
        }

        if self.frames.is_pending() {
            ctx.request_repaint();
        }
    }
}
