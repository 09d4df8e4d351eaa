use super::layout::{KEY_RANGE, NoteRect, ROW_HEIGHT, RollLayout};
use crate::store::{Note, PALETTE_SIZE, color_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const PALETTE: [Rgb; PALETTE_SIZE] = [
    Rgb(0xFF, 0x52, 0x52),
    Rgb(0x40, 0xC4, 0xFF),
    Rgb(0xFF, 0xD7, 0x40),
    Rgb(0x69, 0xF0, 0xAE),
    Rgb(0xFF, 0x6E, 0x40),
    Rgb(0xB3, 0x88, 0xFF),
    Rgb(0x00, 0xE6, 0x76),
    Rgb(0xF5, 0x00, 0x57),
    Rgb(0x29, 0x79, 0xFF),
    Rgb(0xFF, 0xEB, 0x3B),
    Rgb(0x00, 0xB8, 0xD4),
    Rgb(0xFF, 0x8A, 0x65),
    Rgb(0x8D, 0x6E, 0x63),
];

pub const GRID_COLOR: Rgb = Rgb(0x33, 0x33, 0x33);
pub const PLAYHEAD_COLOR: Rgb = Rgb(0xFF, 0xFF, 0xFF);
pub const NOTE_ALPHA: f32 = 0.85;

pub fn track_color(track_index: usize) -> Rgb {
    PALETTE[color_index(track_index)]
}

/// Something the piano roll can be drawn onto. Coordinates are canvas
/// pixels with the origin at the top left.
pub trait Surface {
    fn height(&self) -> f64;
    fn clear(&mut self);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb);
    fn fill_rect(&mut self, rect: NoteRect, color: Rgb, alpha: f32);
}

/// Draws the grid, every note passing `filter` and, when `current_time` is
/// positive, the playhead.
pub fn render<'a, S: Surface + ?Sized>(
    surface: &mut S,
    layout: &RollLayout,
    notes: impl IntoIterator<Item = &'a Note>,
    filter: Option<usize>,
    current_time: f64,
) {
    surface.clear();

    for row in 0..=KEY_RANGE {
        let y = row as f64 * ROW_HEIGHT;
        surface.line((0.0, y), (layout.width, y), GRID_COLOR);
    }

    for note in notes {
        if filter.is_some_and(|track| note.track_index != track) {
            continue;
        }
        surface.fill_rect(layout.note_rect(note), track_color(note.track_index), NOTE_ALPHA);
    }

    if current_time > 0.0 {
        let x = layout.time_to_x(current_time);
        let height = surface.height();
        surface.line((x, 0.0), (x, height), PLAYHEAD_COLOR);
    }
}
