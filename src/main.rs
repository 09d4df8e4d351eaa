use midiroll::{MidiRollApp, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("midiroll=info")),
        )
        .init();

    let settings_path = Settings::default_path();
    let settings = Settings::load(&settings_path).unwrap_or_else(|e| {
        tracing::warn!(path = %settings_path.display(), "ignoring settings: {e}");
        Settings::default()
    });

    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("midiroll")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "midiroll",
        options,
        Box::new(move |_cc| Ok(Box::new(MidiRollApp::new(settings, initial_file)))),
    )
}
