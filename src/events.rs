/// A note already converted to absolute sample positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    pub pitch: u8,
    /// 0.0 -> 1.0
    pub velocity: f32,
    pub start_sample: u64,
    pub end_sample: u64,
}

/// Commands sent from the UI thread to the audio callback.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceCommand {
    Schedule(ScheduledNote),
    ReleaseAll,
    /// Drop every voice and every queued note
    Dispose,
}
