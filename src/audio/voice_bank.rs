use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::{SynthConfig, Voice};
use crate::events::ScheduledNote;

/// Orders pending notes by trigger sample only.
#[derive(Debug, Clone)]
struct Pending(ScheduledNote);

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.0.start_sample == other.0.start_sample
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.start_sample.cmp(&other.0.start_sample)
    }
}

/// Polyphonic voice bank living on the audio thread. Notes are queued with
/// absolute sample times and triggered when the clock reaches them.
pub struct VoiceBank {
    voices: Vec<Voice>,
    pending: BinaryHeap<Reverse<Pending>>,
}

impl VoiceBank {
    pub fn new() -> Self {
        Self {
            voices: Vec::new(),
            pending: BinaryHeap::new(),
        }
    }

    pub fn schedule(&mut self, note: ScheduledNote) {
        self.pending.push(Reverse(Pending(note)));
    }

    /// Moves every sounding voice into its release phase. Notes that have
    /// not been triggered yet stay queued.
    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    /// Drops all voices and queued notes.
    pub fn clear(&mut self) {
        self.voices.clear();
        self.pending.clear();
    }

    #[cfg(test)]
    pub(crate) fn active_voices(&self) -> usize {
        self.voices.len()
    }

    #[cfg(test)]
    pub(crate) fn pending_notes(&self) -> usize {
        self.pending.len()
    }

    /// Renders the sample at absolute position `sample`.
    pub fn next_sample(&mut self, sample: u64, config: &SynthConfig, sample_rate: f32) -> f32 {
        while self
            .pending
            .peek()
            .is_some_and(|Reverse(next)| next.0.start_sample <= sample)
        {
            if let Some(Reverse(Pending(note))) = self.pending.pop() {
                self.trigger(note, config.max_voices);
            }
        }

        for voice in &mut self.voices {
            if sample >= voice.release_at {
                voice.release();
            }
        }

        self.mix(config, sample_rate)
    }

    /// Renders the voices already sounding without consulting the clock, so
    /// releases can ring out while the transport is paused.
    pub fn tail_sample(&mut self, config: &SynthConfig, sample_rate: f32) -> f32 {
        self.mix(config, sample_rate)
    }

    fn mix(&mut self, config: &SynthConfig, sample_rate: f32) -> f32 {
        let mut output = 0.0;
        for voice in &mut self.voices {
            output += voice.next_sample(config.oscillator, &config.envelope, sample_rate);
        }

        self.voices.retain(|voice| !voice.is_finished(&config.envelope));

        output * config.gain
    }

    fn trigger(&mut self, note: ScheduledNote, max_voices: usize) {
        let voice = Voice::new(note.pitch, note.velocity, note.start_sample, note.end_sample);

        if self.voices.len() < max_voices.max(1) {
            self.voices.push(voice);
            return;
        }

        // Steal the oldest voice.
        if let Some(oldest) = self
            .voices
            .iter_mut()
            .min_by_key(|voice| voice.started_at)
        {
            *oldest = voice;
        }
    }
}

impl Default for VoiceBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ADSRConfig, EnvelopeState, Wave};

    const RATE: f32 = 1000.0;

    fn config(max_voices: usize) -> SynthConfig {
        SynthConfig {
            oscillator: Wave::Square,
            envelope: ADSRConfig {
                attack: 0.0,
                decay: 0.0,
                sustain: 1.0,
                release: 0.01,
            },
            max_voices,
            gain: 1.0,
        }
    }

    fn note(pitch: u8, start_sample: u64, end_sample: u64) -> ScheduledNote {
        ScheduledNote {
            pitch,
            velocity: 1.0,
            start_sample,
            end_sample,
        }
    }

    #[test]
    fn test_notes_trigger_on_time() {
        let config = config(8);
        let mut bank = VoiceBank::new();
        bank.schedule(note(69, 10, 20));

        for sample in 0..10 {
            assert_eq!(bank.next_sample(sample, &config, RATE), 0.0);
        }
        assert_eq!(bank.active_voices(), 0);
        assert_eq!(bank.pending_notes(), 1);

        assert_ne!(bank.next_sample(10, &config, RATE), 0.0);
        assert_eq!(bank.active_voices(), 1);
        assert_eq!(bank.pending_notes(), 0);
    }

    #[test]
    fn test_voice_released_and_removed() {
        let config = config(8);
        let mut bank = VoiceBank::new();
        bank.schedule(note(60, 0, 5));

        for sample in 0..5 {
            bank.next_sample(sample, &config, RATE);
        }
        assert_eq!(bank.active_voices(), 1);

        // 10 samples of release at 1 kHz
        for sample in 5..20 {
            bank.next_sample(sample, &config, RATE);
        }
        assert_eq!(bank.active_voices(), 0);
    }

    #[test]
    fn test_out_of_order_scheduling() {
        let config = config(8);
        let mut bank = VoiceBank::new();
        bank.schedule(note(72, 100, 200));
        bank.schedule(note(60, 3, 200));

        bank.next_sample(3, &config, RATE);
        assert_eq!(bank.active_voices(), 1);
        assert_eq!(bank.pending_notes(), 1);
    }

    #[test]
    fn test_voice_stealing_replaces_oldest() {
        let config = config(2);
        let mut bank = VoiceBank::new();
        bank.schedule(note(60, 0, 100));
        bank.schedule(note(64, 1, 100));
        bank.schedule(note(67, 2, 100));

        for sample in 0..3 {
            bank.next_sample(sample, &config, RATE);
        }

        let mut pitches: Vec<u8> = bank.voices.iter().map(|v| v.pitch).collect();
        pitches.sort();
        assert_eq!(pitches, vec![64, 67]);
    }

    #[test]
    fn test_release_all_keeps_pending() {
        let config = config(8);
        let mut bank = VoiceBank::new();
        bank.schedule(note(60, 0, 1000));
        bank.schedule(note(62, 500, 1000));
        bank.next_sample(0, &config, RATE);

        bank.release_all();
        assert!(
            bank.voices
                .iter()
                .all(|v| matches!(v.envelope_state, EnvelopeState::Release { .. }))
        );
        assert_eq!(bank.pending_notes(), 1);

        bank.clear();
        assert_eq!(bank.active_voices(), 0);
        assert_eq!(bank.pending_notes(), 0);
    }

    #[test]
    fn test_tail_rings_out_without_triggering() {
        let config = config(8);
        let mut bank = VoiceBank::new();
        bank.schedule(note(60, 0, 1000));
        bank.schedule(note(62, 1, 1000));
        bank.next_sample(0, &config, RATE);
        bank.release_all();

        for _ in 0..20 {
            bank.tail_sample(&config, RATE);
        }
        assert_eq!(bank.active_voices(), 0);
        assert_eq!(bank.pending_notes(), 1);
    }
}
