use crate::midi::{MAX_PITCH, MIN_PITCH};
use crate::store::{Note, effective_duration};

pub const KEY_RANGE: u32 = (MAX_PITCH - MIN_PITCH) as u32 + 1;
/// Pixels per pitch row, separator included
pub const ROW_HEIGHT: f64 = 5.0;
pub const GRID_HEIGHT: f64 = (KEY_RANGE + 1) as f64 * ROW_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Linear time/pitch to pixel mapping for one canvas width and piece length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollLayout {
    pub width: f64,
    pub duration: f64,
}

impl RollLayout {
    pub fn new(width: f64, duration: f64) -> Self {
        Self {
            width,
            duration: effective_duration(duration),
        }
    }

    pub fn height(&self) -> f64 {
        GRID_HEIGHT
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.width / self.duration
    }

    pub fn time_to_x(&self, time: f64) -> f64 {
        time * self.pixels_per_second()
    }

    pub fn x_to_time(&self, x: f64) -> f64 {
        x / self.pixels_per_second()
    }

    /// Higher pitches sit higher on the canvas.
    pub fn pitch_to_y(&self, pitch: u8) -> f64 {
        (KEY_RANGE as f64 - (pitch - MIN_PITCH) as f64) * ROW_HEIGHT
    }

    pub fn note_rect(&self, note: &Note) -> NoteRect {
        NoteRect {
            x: self.time_to_x(note.start_time),
            y: self.pitch_to_y(note.pitch),
            width: note.duration * self.pixels_per_second(),
            height: ROW_HEIGHT - 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoteStore;
    use crate::store::tests::two_track_document;

    #[test]
    fn test_two_track_scenario() {
        let store = NoteStore::flatten(&two_track_document());
        let layout = RollLayout::new(300.0, store.duration);
        assert_eq!(layout.pixels_per_second(), 100.0);

        let first = layout.note_rect(&store.notes[0]);
        assert_eq!(
            first,
            NoteRect {
                x: 0.0,
                y: 340.0,
                width: 100.0,
                height: 4.0
            }
        );

        let second = layout.note_rect(&store.notes[1]);
        assert_eq!((second.x, second.y, second.width), (200.0, 320.0, 100.0));
    }

    #[test]
    fn test_zero_duration_maps_one_second() {
        let layout = RollLayout::new(640.0, 0.0);
        assert_eq!(layout.pixels_per_second(), 640.0);
        assert!(layout.pixels_per_second().is_finite());
    }

    #[test]
    fn test_time_round_trip() {
        let layout = RollLayout::new(1234.0, 97.3);
        for t in [0.0, 0.001, 1.5, 42.42, 97.3] {
            let back = layout.x_to_time(layout.time_to_x(t));
            assert!((back - t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pitch_rows() {
        let layout = RollLayout::new(100.0, 1.0);
        assert_eq!(layout.pitch_to_y(127), 5.0);
        assert_eq!(layout.pitch_to_y(0), 640.0);
        assert!(layout.pitch_to_y(61) < layout.pitch_to_y(60));
        assert_eq!(layout.height(), 645.0);
    }
}
