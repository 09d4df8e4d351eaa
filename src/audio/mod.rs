mod instrument;
mod voice;
mod voice_bank;

pub use instrument::{SynthConfig, Wave};
pub use voice::{ADSRConfig, EnvelopeState, Voice};
pub use voice_bank::VoiceBank;

pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
