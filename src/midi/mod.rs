mod document;
mod tempo;

pub use document::{MidiDocument, MidiNote, MidiTrack};
pub use tempo::TickClock;

pub const MIN_PITCH: u8 = 0;
pub const MAX_PITCH: u8 = 127;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name with sharps, middle C (60) being "C4".
pub fn pitch_name(pitch: u8) -> String {
    let octave = (pitch / 12) as i32 - 1;
    format!("{}{}", PITCH_CLASSES[(pitch % 12) as usize], octave)
}

/// Inverse of [`pitch_name`]. Also accepts flats ("Eb3") and lowercase letters.
pub fn parse_pitch_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (offset, octave) = if let Some(octave) = rest.strip_prefix('#') {
        (1, octave)
    } else if let Some(octave) = rest.strip_prefix('b') {
        (-1, octave)
    } else {
        (0, rest)
    };

    let octave: i32 = octave.parse().ok()?;
    let pitch = (octave + 1) * 12 + base + offset;
    u8::try_from(pitch).ok().filter(|p| *p <= MAX_PITCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_names() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(61), "C#4");
        assert_eq!(pitch_name(69), "A4");
        assert_eq!(pitch_name(0), "C-1");
        assert_eq!(pitch_name(127), "G9");
    }

    #[test]
    fn test_parse_pitch_names() {
        assert_eq!(parse_pitch_name("C4"), Some(60));
        assert_eq!(parse_pitch_name("C#4"), Some(61));
        assert_eq!(parse_pitch_name("Eb3"), Some(51));
        assert_eq!(parse_pitch_name("c-1"), Some(0));
        assert_eq!(parse_pitch_name("G9"), Some(127));
        assert_eq!(parse_pitch_name("G#9"), None);
        assert_eq!(parse_pitch_name("H2"), None);
        assert_eq!(parse_pitch_name(""), None);
    }

    #[test]
    fn test_every_pitch_name_parses_back() {
        for pitch in MIN_PITCH..=MAX_PITCH {
            assert_eq!(parse_pitch_name(&pitch_name(pitch)), Some(pitch));
        }
    }
}
