use midly::{MetaMessage, Timing, TrackEvent, TrackEventKind};

const DEFAULT_TEMPO: u32 = 500_000;

#[derive(Debug, Clone, Copy)]
struct TempoSegment {
    tick: u64,
    seconds: f64,
    seconds_per_tick: f64,
}

#[derive(Debug, Clone)]
enum ClockKind {
    Metrical { segments: Vec<TempoSegment> },
    Timecode { ticks_per_second: f64 },
}

/// Converts absolute tick positions into seconds.
#[derive(Debug, Clone)]
pub struct TickClock {
    kind: ClockKind,
}

impl TickClock {
    /// Builds the clock for a file. Tempo changes are collected from every
    /// track, as format 1 files usually keep them in the first one only.
    pub fn new(timing: Timing, tracks: &[Vec<TrackEvent<'_>>]) -> Self {
        match timing {
            Timing::Metrical(ticks_per_quarter) => {
                let ticks_per_quarter = ticks_per_quarter.as_int().max(1) as f64;
                Self::metrical(ticks_per_quarter, tempo_changes(tracks))
            }
            Timing::Timecode(fps, ticks_per_frame) => Self {
                kind: ClockKind::Timecode {
                    ticks_per_second: fps.as_f32() as f64 * ticks_per_frame.max(1) as f64,
                },
            },
        }
    }

    fn metrical(ticks_per_quarter: f64, mut changes: Vec<(u64, u32)>) -> Self {
        changes.sort_by_key(|(tick, _)| *tick);

        let spt = |tempo: u32| tempo as f64 / 1_000_000.0 / ticks_per_quarter;
        let mut segments = vec![TempoSegment {
            tick: 0,
            seconds: 0.0,
            seconds_per_tick: spt(DEFAULT_TEMPO),
        }];

        for (tick, tempo) in changes {
            let last = segments[segments.len() - 1];
            let seconds = last.seconds + (tick - last.tick) as f64 * last.seconds_per_tick;
            let segment = TempoSegment {
                tick,
                seconds,
                seconds_per_tick: spt(tempo),
            };
            // A later change at the same tick wins.
            if last.tick == tick {
                let idx = segments.len() - 1;
                segments[idx] = segment;
            } else {
                segments.push(segment);
            }
        }

        Self {
            kind: ClockKind::Metrical { segments },
        }
    }

    pub fn seconds(&self, tick: u64) -> f64 {
        match &self.kind {
            ClockKind::Metrical { segments } => {
                let idx = segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
                let segment = &segments[idx];
                segment.seconds + (tick - segment.tick) as f64 * segment.seconds_per_tick
            }
            ClockKind::Timecode { ticks_per_second } => tick as f64 / ticks_per_second,
        }
    }
}

fn tempo_changes(tracks: &[Vec<TrackEvent<'_>>]) -> Vec<(u64, u32)> {
    let mut changes = Vec::new();
    for track in tracks {
        let mut tick: u64 = 0;
        for event in track {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                changes.push((tick, tempo.as_int()));
            }
        }
    }
    changes
}
