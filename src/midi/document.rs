use std::collections::{HashMap, VecDeque};
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, TrackEvent, TrackEventKind};

use super::{TickClock, pitch_name};
use crate::Result;

/// A note with its timing already resolved to seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiNote {
    pub pitch: u8,
    /// Seconds from the start of the file
    pub start_time: f64,
    /// Seconds
    pub duration: f64,
    /// 0.0 -> 1.0
    pub velocity: f32,
    pub name: String,
}

impl MidiNote {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MidiTrack {
    pub name: Option<String>,
    pub notes: Vec<MidiNote>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MidiDocument {
    /// End of the last note, controller change or pitch bend, in seconds
    pub duration: f64,
    pub tracks: Vec<MidiTrack>,
}

impl MidiDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;
        let clock = TickClock::new(smf.header.timing, &smf.tracks);

        let mut duration: f64 = 0.0;
        let tracks: Vec<MidiTrack> = smf
            .tracks
            .iter()
            .enumerate()
            .map(|(idx, events)| {
                let (track, end) = read_track(idx, events, &clock);
                duration = duration.max(end);
                track
            })
            .collect();

        tracing::debug!(
            tracks = tracks.len(),
            duration,
            format = ?smf.header.format,
            "parsed MIDI file"
        );

        Ok(Self { duration, tracks })
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }
}

/// Reads one track's notes and name. Also returns the time of the track's
/// last note end, controller change or pitch bend.
fn read_track(idx: usize, events: &[TrackEvent<'_>], clock: &TickClock) -> (MidiTrack, f64) {
    let mut track = MidiTrack::default();
    let mut last_control: Option<u64> = None;
    // (channel, key) -> open notes, oldest first
    let mut open: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();
    let mut tick: u64 = 0;

    for event in events {
        tick += event.delta.as_int() as u64;

        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        open.entry((channel, key.as_int()))
                            .or_default()
                            .push_back((tick, vel.as_int()));
                    }
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let pitch = key.as_int();
                        let Some((start_tick, vel)) =
                            open.get_mut(&(channel, pitch)).and_then(|q| q.pop_front())
                        else {
                            continue;
                        };

                        let start_time = clock.seconds(start_tick);
                        let duration = clock.seconds(tick) - start_time;
                        if duration <= 0.0 {
                            tracing::debug!(track = idx, pitch, tick, "dropping zero-length note");
                            continue;
                        }

                        track.notes.push(MidiNote {
                            pitch,
                            start_time,
                            duration,
                            velocity: vel as f32 / 127.0,
                            name: pitch_name(pitch),
                        });
                    }
                    MidiMessage::Controller { .. } | MidiMessage::PitchBend { .. } => {
                        last_control = Some(tick);
                    }
                    _ => {}
                }
            }
            TrackEventKind::Meta(MetaMessage::TrackName(name)) if track.name.is_none() => {
                let name = String::from_utf8_lossy(name).trim().to_string();
                if !name.is_empty() {
                    track.name = Some(name);
                }
            }
            _ => {}
        }
    }

    let unterminated: usize = open.values().map(VecDeque::len).sum();
    if unterminated > 0 {
        tracing::debug!(track = idx, unterminated, "dropping notes without a note off");
    }

    track
        .notes
        .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let end = track
        .notes
        .iter()
        .map(MidiNote::end_time)
        .chain(last_control.map(|tick| clock.seconds(tick)))
        .fold(0.0, f64::max);
    (track, end)
}
