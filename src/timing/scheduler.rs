use crate::engine::SynthEngine;
use crate::store::Note;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub scheduled: usize,
    pub failed: usize,
}

/// Issues one attack/release command per note at `origin + start_time`.
/// A note the engine refuses is logged and skipped; the rest still go out.
pub fn schedule_notes<'a, S>(
    notes: impl IntoIterator<Item = &'a Note>,
    origin: f64,
    synth: &mut S,
) -> ScheduleReport
where
    S: SynthEngine + ?Sized,
{
    let mut report = ScheduleReport::default();

    for note in notes {
        match synth.schedule_note(
            &note.name,
            note.duration,
            origin + note.start_time,
            note.velocity,
        ) {
            Ok(()) => report.scheduled += 1,
            Err(e) => {
                tracing::warn!(
                    note = %note.name,
                    track = note.track_index,
                    start = note.start_time,
                    "failed to schedule note: {e}"
                );
                report.failed += 1;
            }
        }
    }

    report
}
