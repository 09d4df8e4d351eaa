use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::audio::SynthConfig;

pub const DEFAULT_SETTINGS_FILE: &str = "midiroll.ron";
pub const SETTINGS_ENV: &str = "MIDIROLL_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of the piano roll in pixels; the whole piece is fitted into it
    pub canvas_width: f32,
    pub synth: SynthConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            synth: SynthConfig::default(),
        }
    }
}

impl Settings {
    /// `$MIDIROLL_CONFIG` if set, otherwise `midiroll.ron` in the working
    /// directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Missing files yield the defaults; unreadable or malformed ones are
    /// errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let ron_string = fs::read_to_string(path)?;
        let settings: Settings = ron::from_str(&ron_string)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }
}
