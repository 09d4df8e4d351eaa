use crate::audio::{SynthConfig, VoiceBank};
use crate::events::{ScheduledNote, VoiceCommand};
use crate::midi::parse_pitch_name;
use crate::{Error, Result};
use arc_swap::ArcSwap;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::{Receiver, Sender};
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Producer, Split},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

const COMMAND_QUEUE_CAPACITY: usize = 1 << 17;

/// What the playback session needs from a synthesizer. Scheduling is
/// fire-and-forget: the engine owns the actual sound timing.
pub trait SynthEngine {
    /// Replaces the current voice bank (if any) with a fresh one.
    fn build_voice_bank(&mut self, config: &SynthConfig) -> Result<()>;

    /// Starts or restarts the audio clock after a pause or at startup.
    fn resume(&mut self) -> Result<()>;

    /// Monotonic engine time in seconds.
    fn now(&self) -> f64;

    fn schedule_note(&mut self, name: &str, duration: f64, at: f64, velocity: f32) -> Result<()>;

    fn release_all(&mut self);

    /// Freezes the engine clock. Notes not yet triggered stay queued until
    /// the bank is rebuilt or disposed.
    fn pause_transport(&mut self);

    fn dispose(&mut self);
}

struct CallbackState {
    bank: VoiceBank,
    consumer: HeapCons<VoiceCommand>,
    config: Arc<ArcSwap<SynthConfig>>,
    sample_rate: f32,
    num_channels: usize,
}

struct OutputStream {
    // Dropping the stream closes the device.
    stream: cpal::Stream,
    producer: HeapProd<VoiceCommand>,
    sample_rate: f64,
}

/// Synthesizer on the default cpal output device. The stream is opened
/// lazily by the first `build_voice_bank`.
pub struct AudioEngine {
    output: Option<OutputStream>,
    config: Arc<ArcSwap<SynthConfig>>,
    sample_counter: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    error_tx: Sender<String>,
    error_rx: Receiver<String>,
}

impl AudioEngine {
    pub fn new(config: SynthConfig) -> Self {
        let (error_tx, error_rx) = crossbeam::channel::unbounded();
        Self {
            output: None,
            config: Arc::new(ArcSwap::from_pointee(config)),
            sample_counter: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(true)),
            error_tx,
            error_rx,
        }
    }

    /// Stream errors reported by the audio thread since the last call.
    pub fn take_errors(&self) -> Vec<String> {
        self.error_rx.try_iter().collect()
    }

    fn send(&mut self, command: VoiceCommand) -> Result<()> {
        let output = self.output.as_mut().ok_or(Error::NoOutputDevice)?;
        output
            .producer
            .try_push(command)
            .map_err(|_| Error::QueueFull)
    }

    fn open_stream(&mut self) -> Result<()> {
        if self.output.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoOutputDevice)?;
        let stream_config: cpal::StreamConfig = device.default_output_config()?.into();

        let sample_rate = stream_config.sample_rate as f32;
        let num_channels = stream_config.channels as usize;
        tracing::info!(channels = num_channels, sample_rate, "audio output opened");

        let ring_buffer = HeapRb::<VoiceCommand>::new(COMMAND_QUEUE_CAPACITY);
        let (producer, consumer) = ring_buffer.split();

        let mut state = CallbackState {
            bank: VoiceBank::new(),
            consumer,
            config: self.config.clone(),
            sample_rate,
            num_channels,
        };

        let counter = self.sample_counter.clone();
        let paused = self.paused.clone();
        let error_tx = self.error_tx.clone();

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                audio_callback(data, &mut state, &counter, &paused);
            },
            move |err| {
                tracing::error!("audio stream error: {err}");
                let _ = error_tx.send(err.to_string());
            },
            None,
        )?;

        self.output = Some(OutputStream {
            stream,
            producer,
            sample_rate: sample_rate as f64,
        });
        Ok(())
    }
}

impl SynthEngine for AudioEngine {
    fn build_voice_bank(&mut self, config: &SynthConfig) -> Result<()> {
        self.open_stream()?;
        self.config.store(Arc::new(config.clone()));
        self.send(VoiceCommand::Dispose)
    }

    fn resume(&mut self) -> Result<()> {
        let output = self.output.as_ref().ok_or(Error::NoOutputDevice)?;
        output.stream.play()?;
        self.paused.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn now(&self) -> f64 {
        match &self.output {
            Some(output) => self.sample_counter.load(Ordering::Relaxed) as f64 / output.sample_rate,
            None => 0.0,
        }
    }

    fn schedule_note(&mut self, name: &str, duration: f64, at: f64, velocity: f32) -> Result<()> {
        let pitch = parse_pitch_name(name).ok_or_else(|| Error::UnknownNoteName(name.into()))?;
        let sample_rate = self
            .output
            .as_ref()
            .ok_or(Error::NoOutputDevice)?
            .sample_rate;

        let (start_sample, end_sample) = note_samples(at, duration, sample_rate);
        self.send(VoiceCommand::Schedule(ScheduledNote {
            pitch,
            velocity,
            start_sample,
            end_sample,
        }))
    }

    fn release_all(&mut self) {
        if let Err(e) = self.send(VoiceCommand::ReleaseAll) {
            tracing::debug!("release ignored: {e}");
        }
    }

    fn pause_transport(&mut self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    fn dispose(&mut self) {
        if let Err(e) = self.send(VoiceCommand::Dispose) {
            tracing::debug!("dispose ignored: {e}");
        }
    }
}

/// Converts a note's start and length in seconds to sample positions. Every
/// note sounds for at least one sample.
fn note_samples(at: f64, duration: f64, sample_rate: f64) -> (u64, u64) {
    let start_sample = (at * sample_rate).round().max(0.0) as u64;
    let end_sample = ((at + duration) * sample_rate).round().max(0.0) as u64;
    (start_sample, end_sample.max(start_sample + 1))
}

fn audio_callback(
    data: &mut [f32],
    state: &mut CallbackState,
    sample_counter: &AtomicU64,
    paused: &AtomicBool,
) {
    while let Some(command) = state.consumer.try_pop() {
        match command {
            VoiceCommand::Schedule(note) => state.bank.schedule(note),
            VoiceCommand::ReleaseAll => state.bank.release_all(),
            VoiceCommand::Dispose => state.bank.clear(),
        }
    }

    data.fill(0.0);
    if state.num_channels == 0 {
        return;
    }

    let config = state.config.load();

    // The clock stands still while paused; voices already released ring out.
    if paused.load(Ordering::Relaxed) {
        for frame in data.chunks_mut(state.num_channels) {
            frame.fill(state.bank.tail_sample(&config, state.sample_rate));
        }
        return;
    }

    let current_sample = sample_counter.load(Ordering::Relaxed);
    let mut frames = 0;

    for frame in data.chunks_mut(state.num_channels) {
        let sample = state
            .bank
            .next_sample(current_sample + frames, &config, state.sample_rate);
        frame.fill(sample);
        frames += 1;
    }

    sample_counter.fetch_add(frames, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 1000.0;

    fn callback_state(num_channels: usize) -> (CallbackState, HeapProd<VoiceCommand>) {
        let (producer, consumer) = HeapRb::<VoiceCommand>::new(64).split();
        let state = CallbackState {
            bank: VoiceBank::new(),
            consumer,
            config: Arc::new(ArcSwap::from_pointee(SynthConfig::default())),
            sample_rate: RATE,
            num_channels,
        };
        (state, producer)
    }

    fn schedule(start_sample: u64, end_sample: u64) -> VoiceCommand {
        VoiceCommand::Schedule(ScheduledNote {
            pitch: 69,
            velocity: 1.0,
            start_sample,
            end_sample,
        })
    }

    #[test]
    fn test_note_samples() {
        assert_eq!(note_samples(1.0, 0.5, 1000.0), (1000, 1500));
        assert_eq!(note_samples(0.25, 0.0, 1000.0), (250, 251));
        assert_eq!(note_samples(-1.0, 0.5, 1000.0), (0, 1));
        assert_eq!(note_samples(2.0, 1.0, 44100.0), (88200, 132300));
    }

    #[test]
    fn test_paused_callback_keeps_clock_still() {
        let (mut state, mut producer) = callback_state(2);
        producer.try_push(schedule(0, 100)).unwrap();
        let counter = AtomicU64::new(0);
        let paused = AtomicBool::new(true);
        let mut data = vec![1.0; 16];

        audio_callback(&mut data, &mut state, &counter, &paused);

        assert_eq!(counter.load(Ordering::Relaxed), 0);
        assert_eq!(state.bank.pending_notes(), 1);
        assert_eq!(state.bank.active_voices(), 0);
        assert!(data.iter().all(|&sample| sample == 0.0));
    }

    #[test]
    fn test_running_callback_advances_clock_per_frame() {
        let (mut state, mut producer) = callback_state(2);
        producer.try_push(schedule(0, 100)).unwrap();
        let counter = AtomicU64::new(0);
        let paused = AtomicBool::new(false);
        let mut data = vec![0.0; 16];

        audio_callback(&mut data, &mut state, &counter, &paused);
        assert_eq!(counter.load(Ordering::Relaxed), 8);
        assert_eq!(state.bank.pending_notes(), 0);
        assert_eq!(state.bank.active_voices(), 1);

        // Both channels of a frame carry the same sample
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }

        audio_callback(&mut data, &mut state, &counter, &paused);
        assert_eq!(counter.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn test_commands_drain_in_order() {
        let (mut state, mut producer) = callback_state(1);
        producer.try_push(schedule(0, 100)).unwrap();
        producer.try_push(VoiceCommand::Dispose).unwrap();
        producer.try_push(schedule(1000, 1100)).unwrap();
        let counter = AtomicU64::new(0);
        let paused = AtomicBool::new(false);
        let mut data = vec![0.0; 8];

        audio_callback(&mut data, &mut state, &counter, &paused);

        // The first note was disposed before it could trigger
        assert_eq!(state.bank.active_voices(), 0);
        assert_eq!(state.bank.pending_notes(), 1);
        assert_eq!(counter.load(Ordering::Relaxed), 8);
    }

    #[test]
    fn test_engine_without_stream() {
        let mut engine = AudioEngine::new(SynthConfig::default());
        assert_eq!(engine.now(), 0.0);
        assert!(matches!(
            engine.schedule_note("C4", 1.0, 0.0, 1.0),
            Err(Error::NoOutputDevice)
        ));
        assert!(matches!(
            engine.schedule_note("H9", 1.0, 0.0, 1.0),
            Err(Error::UnknownNoteName(_))
        ));
        // Teardown without a stream is silent
        engine.release_all();
        engine.dispose();
        assert!(engine.take_errors().is_empty());
    }
}
