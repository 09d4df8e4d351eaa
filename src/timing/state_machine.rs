#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Nothing loaded
    Idle,
    Stopped,
    Playing,
    /// Voices released and clock frozen. Playing again restarts from the top.
    Paused,
}

/// Which transport controls are usable in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transport {
    pub play: bool,
    pub pause: bool,
    pub stop: bool,
}

impl PlaybackPhase {
    pub fn transport(self) -> Transport {
        match self {
            PlaybackPhase::Idle => Transport {
                play: false,
                pause: false,
                stop: false,
            },
            PlaybackPhase::Stopped => Transport {
                play: true,
                pause: false,
                stop: false,
            },
            PlaybackPhase::Playing => Transport {
                play: false,
                pause: true,
                stop: true,
            },
            PlaybackPhase::Paused => Transport {
                play: true,
                pause: false,
                stop: true,
            },
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, PlaybackPhase::Playing | PlaybackPhase::Paused)
    }
}

/// Result of handing a frame to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The frame was cancelled or superseded, or playback is not running.
    Stale,
    Continue { elapsed: f64 },
    /// Reached the end of the piece and stopped.
    Finished,
}
