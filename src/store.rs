//! Flattened, track-tagged view of a parsed MIDI document.

use crate::midi::MidiDocument;

pub const PALETTE_SIZE: usize = 13;

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: u8,
    /// Seconds
    pub start_time: f64,
    /// Seconds
    pub duration: f64,
    /// 0.0 -> 1.0
    pub velocity: f32,
    pub track_index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub index: usize,
    pub label: String,
    pub color_index: usize,
}

impl Track {
    fn new(index: usize, name: Option<&str>) -> Self {
        let label = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Track {}", index + 1),
        };
        Self {
            index,
            label,
            color_index: color_index(index),
        }
    }
}

pub fn color_index(track_index: usize) -> usize {
    track_index % PALETTE_SIZE
}

/// Duration used for mapping: anything that is not a positive finite number
/// of seconds counts as one second.
pub fn effective_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteStore {
    pub notes: Vec<Note>,
    pub tracks: Vec<Track>,
    /// As reported by the document, before the degenerate-duration policy
    pub duration: f64,
}

impl NoteStore {
    /// Concatenates every track's notes in track order. Nothing is sorted,
    /// filtered or merged.
    pub fn flatten(document: &MidiDocument) -> Self {
        let notes = document
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(track_index, track)| {
                track.notes.iter().map(move |note| Note {
                    pitch: note.pitch,
                    start_time: note.start_time,
                    duration: note.duration,
                    velocity: note.velocity,
                    track_index,
                    name: note.name.clone(),
                })
            })
            .collect();

        let tracks = document
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| Track::new(index, track.name.as_deref()))
            .collect();

        Self {
            notes,
            tracks,
            duration: document.duration,
        }
    }

    pub fn effective_duration(&self) -> f64 {
        effective_duration(self.duration)
    }

    /// Notes passing the track filter; `None` keeps every track.
    pub fn filtered(&self, filter: Option<usize>) -> impl Iterator<Item = &Note> {
        self.notes
            .iter()
            .filter(move |note| filter.is_none_or(|track| note.track_index == track))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::midi::{MidiNote, MidiTrack, pitch_name};

    pub(crate) fn midi_note(pitch: u8, start_time: f64, duration: f64, velocity: f32) -> MidiNote {
        MidiNote {
            pitch,
            start_time,
            duration,
            velocity,
            name: pitch_name(pitch),
        }
    }

    /// Track 0 holds C4 at 0s, track 1 holds E4 at 2s, three seconds total.
    pub(crate) fn two_track_document() -> MidiDocument {
        MidiDocument {
            duration: 3.0,
            tracks: vec![
                MidiTrack {
                    name: Some("Lead".to_string()),
                    notes: vec![midi_note(60, 0.0, 1.0, 0.8)],
                },
                MidiTrack {
                    name: None,
                    notes: vec![midi_note(64, 2.0, 1.0, 0.6)],
                },
            ],
        }
    }

    #[test]
    fn test_flatten_tags_track_indices_in_order() {
        let doc = MidiDocument {
            duration: 4.0,
            tracks: vec![
                MidiTrack {
                    name: None,
                    notes: vec![midi_note(60, 2.0, 1.0, 0.5), midi_note(62, 0.0, 1.0, 0.5)],
                },
                MidiTrack::default(),
                MidiTrack {
                    name: None,
                    notes: vec![midi_note(40, 1.0, 3.0, 1.0)],
                },
            ],
        };

        let store = NoteStore::flatten(&doc);
        let tagged: Vec<(u8, usize)> = store.notes.iter().map(|n| (n.pitch, n.track_index)).collect();
        assert_eq!(tagged, vec![(60, 0), (62, 0), (40, 2)]);

        for note in &store.notes {
            assert!(note.track_index < doc.tracks.len());
            let source = &doc.tracks[note.track_index];
            assert!(source.notes.iter().any(|n| n.pitch == note.pitch && n.start_time == note.start_time));
        }
    }

    #[test]
    fn test_flatten_keeps_duplicates() {
        let doc = MidiDocument {
            duration: 1.0,
            tracks: vec![MidiTrack {
                name: None,
                notes: vec![midi_note(60, 0.0, 1.0, 0.5), midi_note(60, 0.0, 1.0, 0.5)],
            }],
        };
        assert_eq!(NoteStore::flatten(&doc).notes.len(), 2);
    }

    #[test]
    fn test_track_labels_and_colors() {
        let mut doc = two_track_document();
        doc.tracks.extend((0..12).map(|_| MidiTrack::default()));

        let store = NoteStore::flatten(&doc);
        assert_eq!(store.tracks[0].label, "Lead");
        assert_eq!(store.tracks[1].label, "Track 2");
        assert_eq!(store.tracks[13].color_index, 0);
        for track in &store.tracks {
            assert_eq!(track.color_index, track.index % 13);
        }
    }

    #[test]
    fn test_degenerate_duration() {
        assert_eq!(effective_duration(0.0), 1.0);
        assert_eq!(effective_duration(-2.0), 1.0);
        assert_eq!(effective_duration(f64::NAN), 1.0);
        assert_eq!(effective_duration(f64::INFINITY), 1.0);
        assert_eq!(effective_duration(2.5), 2.5);

        let store = NoteStore::flatten(&MidiDocument::default());
        assert_eq!(store.duration, 0.0);
        assert_eq!(store.effective_duration(), 1.0);
    }

    #[test]
    fn test_filtered() {
        let store = NoteStore::flatten(&two_track_document());
        assert_eq!(store.filtered(None).count(), 2);

        let only_second: Vec<u8> = store.filtered(Some(1)).map(|n| n.pitch).collect();
        assert_eq!(only_second, vec![64]);
        assert_eq!(store.filtered(Some(7)).count(), 0);
    }
}
