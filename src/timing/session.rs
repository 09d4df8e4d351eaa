use super::{FrameLoop, FrameRequest, PlaybackPhase, TickOutcome, Transport, schedule_notes};
use crate::Result;
use crate::audio::SynthConfig;
use crate::engine::SynthEngine;
use crate::midi::MidiDocument;
use crate::store::{Note, NoteStore, Track};

/// Everything that changes while a file is open and played. Owned by the UI
/// layer; every transition gets the frame loop and synth it acts on.
pub struct Session {
    document: Option<MidiDocument>,
    store: NoteStore,
    track_filter: Option<usize>,
    phase: PlaybackPhase,
    elapsed: f64,
    origin: f64,
    frame: Option<FrameRequest>,
    synth_config: SynthConfig,
}

impl Session {
    pub fn new(synth_config: SynthConfig) -> Self {
        Self {
            document: None,
            store: NoteStore::default(),
            track_filter: None,
            phase: PlaybackPhase::Idle,
            elapsed: 0.0,
            origin: 0.0,
            frame: None,
            synth_config,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn transport(&self) -> Transport {
        self.phase.transport()
    }

    pub fn document(&self) -> Option<&MidiDocument> {
        self.document.as_ref()
    }

    pub fn notes(&self) -> &[Note] {
        &self.store.notes
    }

    pub fn tracks(&self) -> &[Track] {
        &self.store.tracks
    }

    pub fn track_filter(&self) -> Option<usize> {
        self.track_filter
    }

    /// Duration reported by the document, 0 when nothing is loaded.
    pub fn total_duration(&self) -> f64 {
        self.store.duration
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Position the playhead is drawn at; 0 hides it.
    pub fn playhead_time(&self) -> f64 {
        if self.phase.is_active() {
            self.elapsed
        } else {
            0.0
        }
    }

    /// Replaces the open document. Any running playback is torn down first
    /// and the track filter goes back to all tracks.
    pub fn load<S>(&mut self, document: MidiDocument, frames: &mut FrameLoop, synth: &mut S)
    where
        S: SynthEngine + ?Sized,
    {
        if self.phase.is_active() {
            self.cancel_frame(frames);
            synth.release_all();
            synth.pause_transport();
            synth.dispose();
        }

        self.store = NoteStore::flatten(&document);
        tracing::info!(
            tracks = self.store.tracks.len(),
            notes = document.note_count(),
            duration = self.store.duration,
            "loaded MIDI document"
        );

        self.document = Some(document);
        self.track_filter = None;
        self.elapsed = 0.0;
        self.origin = 0.0;
        self.phase = PlaybackPhase::Stopped;
    }

    /// `None` shows and plays every track. Takes effect on the next redraw
    /// and the next `play`; notes already scheduled are left alone.
    pub fn select_track(&mut self, filter: Option<usize>) {
        self.track_filter = filter;
    }

    /// Starts playback from the beginning. Without a document this does
    /// nothing.
    pub fn play<S>(&mut self, frames: &mut FrameLoop, synth: &mut S) -> Result<()>
    where
        S: SynthEngine + ?Sized,
    {
        if self.document.is_none() {
            return Ok(());
        }

        // A failed restart must not leave a Playing session without a frame.
        if let Err(e) = synth
            .build_voice_bank(&self.synth_config)
            .and_then(|()| synth.resume())
        {
            self.stop(frames, synth);
            return Err(e);
        }

        self.cancel_frame(frames);
        self.origin = synth.now();
        self.elapsed = 0.0;

        let report = schedule_notes(self.store.filtered(self.track_filter), self.origin, synth);
        tracing::info!(
            scheduled = report.scheduled,
            failed = report.failed,
            track = ?self.track_filter,
            origin = self.origin,
            "playback started"
        );

        self.phase = PlaybackPhase::Playing;
        self.frame = Some(frames.request());
        Ok(())
    }

    pub fn pause<S>(&mut self, frames: &mut FrameLoop, synth: &mut S)
    where
        S: SynthEngine + ?Sized,
    {
        if self.phase != PlaybackPhase::Playing {
            return;
        }

        self.cancel_frame(frames);
        synth.release_all();
        synth.pause_transport();
        self.phase = PlaybackPhase::Paused;
        tracing::info!(elapsed = self.elapsed, "playback paused");
    }

    pub fn stop<S>(&mut self, frames: &mut FrameLoop, synth: &mut S)
    where
        S: SynthEngine + ?Sized,
    {
        if !self.phase.is_active() {
            return;
        }

        self.cancel_frame(frames);
        synth.release_all();
        synth.pause_transport();
        self.elapsed = 0.0;
        self.phase = PlaybackPhase::Stopped;
        tracing::info!("playback stopped");
    }

    /// Advances the playhead for a frame handed out by `frames`. Only the
    /// request this session is waiting on counts; anything else is stale.
    pub fn tick<S>(&mut self, request: FrameRequest, frames: &mut FrameLoop, synth: &mut S) -> TickOutcome
    where
        S: SynthEngine + ?Sized,
    {
        if self.phase != PlaybackPhase::Playing || self.frame != Some(request) {
            return TickOutcome::Stale;
        }
        self.frame = None;

        self.elapsed = synth.now() - self.origin;
        tracing::trace!(elapsed = self.elapsed, "frame");

        if self.elapsed >= self.store.duration {
            self.stop(frames, synth);
            return TickOutcome::Finished;
        }

        self.frame = Some(frames.request());
        TickOutcome::Continue {
            elapsed: self.elapsed,
        }
    }

    fn cancel_frame(&mut self, frames: &mut FrameLoop) {
        if let Some(request) = self.frame.take() {
            frames.cancel(request);
        }
    }
}
