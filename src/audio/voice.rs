use serde::{Deserialize, Serialize};

use super::{Wave, midi_to_freq};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ADSRConfig {
    /// Seconds
    pub attack: f32,
    /// Seconds
    pub decay: f32,
    /// 0.0 -> 1.0
    pub sustain: f32,
    /// Seconds
    pub release: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeState {
    Attack { time: f32 },
    Decay { time: f32 },
    Sustain,
    /// `from` is the level the release started at
    Release { time: f32, from: f32 },
}

#[derive(Debug, Clone)]
pub struct Voice {
    pub pitch: u8,
    /// 0.0 -> 1.0
    pub velocity: f32,
    pub envelope_state: EnvelopeState,
    pub envelope_level: f32,
    pub phase: f32,
    /// Sample at which the note was triggered
    pub started_at: u64,
    /// Sample at which the release phase begins
    pub release_at: u64,
}

impl Voice {
    pub fn new(pitch: u8, velocity: f32, started_at: u64, release_at: u64) -> Self {
        Self {
            pitch,
            velocity,
            envelope_state: EnvelopeState::Attack { time: 0.0 },
            envelope_level: 0.0,
            phase: 0.0,
            started_at,
            release_at,
        }
    }

    pub fn release(&mut self) {
        if !matches!(self.envelope_state, EnvelopeState::Release { .. }) {
            self.envelope_state = EnvelopeState::Release {
                time: 0.0,
                from: self.envelope_level,
            };
        }
    }

    pub fn is_finished(&self, adsr: &ADSRConfig) -> bool {
        matches!(self.envelope_state, EnvelopeState::Release { time, .. } if time >= adsr.release)
    }

    /// Produces one sample and advances the oscillator and envelope by one
    /// sample period.
    pub fn next_sample(&mut self, wave: Wave, adsr: &ADSRConfig, sample_rate: f32) -> f32 {
        let envelope = calculate_envelope(self, adsr);
        let sample = wave.sample(self.phase) * envelope * self.velocity;

        self.phase += midi_to_freq(self.pitch) / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        advance_envelope(self, adsr, sample_rate, 1);

        sample
    }
}

pub fn calculate_envelope(voice: &Voice, adsr: &ADSRConfig) -> f32 {
    match &voice.envelope_state {
        EnvelopeState::Attack { time } => {
            if adsr.attack == 0.0 {
                1.0
            } else {
                (time / adsr.attack).min(1.0)
            }
        }
        EnvelopeState::Decay { time } => {
            let decay_progress = if adsr.decay == 0.0 {
                1.0
            } else {
                (time / adsr.decay).min(1.0)
            };
            1.0 - (1.0 - adsr.sustain) * decay_progress
        }
        EnvelopeState::Sustain => adsr.sustain,
        EnvelopeState::Release { time, from } => {
            let release_progress = if adsr.release == 0.0 {
                1.0
            } else {
                (time / adsr.release).min(1.0)
            };
            from * (1.0 - release_progress)
        }
    }
}

pub fn advance_envelope(voice: &mut Voice, adsr: &ADSRConfig, sample_rate: f32, samples: usize) {
    let dt = samples as f32 / sample_rate;

    match &mut voice.envelope_state {
        EnvelopeState::Attack { time } => {
            *time += dt;
            if *time >= adsr.attack {
                voice.envelope_state = EnvelopeState::Decay { time: 0.0 };
                voice.envelope_level = 1.0;
            } else {
                voice.envelope_level = calculate_envelope(voice, adsr);
            }
        }
        EnvelopeState::Decay { time } => {
            *time += dt;
            if *time >= adsr.decay {
                voice.envelope_state = EnvelopeState::Sustain;
                voice.envelope_level = adsr.sustain;
            } else {
                voice.envelope_level = calculate_envelope(voice, adsr);
            }
        }
        EnvelopeState::Sustain => {
            voice.envelope_level = adsr.sustain;
        }
        EnvelopeState::Release { time, .. } => {
            *time += dt;
            voice.envelope_level = calculate_envelope(voice, adsr);
        }
    }
}
