use serde::{Deserialize, Serialize};

use super::ADSRConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wave {
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Wave {
    /// One sample of the waveform at `phase` in [0, 1).
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Wave::Sine => (phase * 2.0 * std::f32::consts::PI).sin(),
            Wave::Square => {
                if phase < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
            Wave::Saw => phase * 2.0 - 1.0,
            Wave::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        }
    }
}

/// Patch used to build a voice bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub oscillator: Wave,
    pub envelope: ADSRConfig,
    pub max_voices: usize,
    /// Applied to every voice before mixing
    pub gain: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            oscillator: Wave::Triangle,
            envelope: ADSRConfig {
                attack: 0.01,
                decay: 0.1,
                sustain: 0.5,
                release: 0.2,
            },
            max_voices: 32,
            gain: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waves_stay_in_range() {
        for wave in [Wave::Sine, Wave::Square, Wave::Saw, Wave::Triangle] {
            for i in 0..100 {
                let s = wave.sample(i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&s), "{wave:?} produced {s}");
            }
        }
    }

    #[test]
    fn test_triangle_shape() {
        assert_eq!(Wave::Triangle.sample(0.0), 1.0);
        assert_eq!(Wave::Triangle.sample(0.5), -1.0);
        assert_eq!(Wave::Triangle.sample(0.25), 0.0);
    }
}
