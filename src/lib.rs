//! Piano-roll MIDI file viewer and player.
//!
//! A [`midi::MidiDocument`] is flattened into a [`store::NoteStore`], drawn by
//! [`ui::render::render`] and played through a [`engine::SynthEngine`] under
//! the control of a [`timing::Session`].

pub mod audio;
pub mod engine;
pub mod error;
pub mod events;
pub mod midi;
pub mod settings;
pub mod store;
pub mod timing;
pub mod ui;

pub use engine::{AudioEngine, SynthEngine};
pub use error::{Error, Result};
pub use settings::Settings;
pub use ui::MidiRollApp;
