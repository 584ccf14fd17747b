//! Period-to-pitch audio feedback.
//!
//! At most one voice plays at a time. The voice is a sine tone whose pitch
//! falls logarithmically with the pulsar period, amplitude-gated at five times
//! the pulsar's rotation rate for the first ten seconds.

use psrcat::PulsarRecord;
use std::f64::consts::TAU;
use std::time::Duration;

pub const MIN_PERIOD_S: f64 = 0.001;
pub const MAX_PERIOD_S: f64 = 10.0;
pub const MIN_FREQ_HZ: f64 = 100.0;
pub const MAX_FREQ_HZ: f64 = 2000.0;

/// Gating runs this many times faster than the real rotation.
pub const PULSE_MODULATION: f64 = 5.0;
/// Length of the pulse train.
pub const PULSE_TRAIN_S: f64 = 10.0;
/// Duration of each exponential ramp (down, then back up).
pub const PULSE_RAMP_S: f64 = 0.05;
/// Gain at the bottom of a pulse.
pub const PULSE_FLOOR_GAIN: f64 = 0.01;

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to open audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("failed to create audio voice: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Logarithmic period → frequency mapping; shorter periods sound higher.
pub fn period_to_frequency(period_s: f64) -> f64 {
    let p = period_s.clamp(MIN_PERIOD_S, MAX_PERIOD_S);
    let norm = 1.0 - (p / MIN_PERIOD_S).ln() / (MAX_PERIOD_S / MIN_PERIOD_S).ln();
    MIN_FREQ_HZ + norm * (MAX_FREQ_HZ - MIN_FREQ_HZ)
}

/// Gain of the pulse gate `t` seconds after the voice started.
pub fn pulse_gain(t: f64, period_s: f64) -> f64 {
    if t < 0.0 || t >= PULSE_TRAIN_S || !(period_s > 0.0) {
        return 1.0;
    }
    let interval = period_s / PULSE_MODULATION;
    let local = t % interval;

    if local < PULSE_RAMP_S {
        PULSE_FLOOR_GAIN.powf(local / PULSE_RAMP_S)
    } else if local < 2.0 * PULSE_RAMP_S {
        PULSE_FLOOR_GAIN.powf(1.0 - (local - PULSE_RAMP_S) / PULSE_RAMP_S)
    } else {
        1.0
    }
}

/// Endless mono sine source with the pulse gate applied.
#[derive(Debug, Clone)]
pub struct PulsarTone {
    period_s: f64,
    frequency: f64,
    sample_rate: u32,
    n: u64,
}

impl PulsarTone {
    pub fn new(period_s: f64) -> Self {
        Self {
            period_s,
            frequency: period_to_frequency(period_s),
            sample_rate: SAMPLE_RATE,
            n: 0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn period(&self) -> f64 {
        self.period_s
    }
}

impl Iterator for PulsarTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let t = self.n as f64 / self.sample_rate as f64;
        self.n += 1;
        let s = (TAU * self.frequency * t).sin() * pulse_gain(t, self.period_s);
        Some(s as f32)
    }
}

impl rodio::Source for PulsarTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// A playing voice.
pub trait VoiceHandle {
    fn set_volume(&self, volume: f32);
    fn stop(&self) -> Result<(), AudioError>;
}

/// Audio output able to start voices.
pub trait AudioBackend {
    type Voice: VoiceHandle;

    fn play(&mut self, tone: PulsarTone, volume: f32) -> Result<Self::Voice, AudioError>;
}

/// Default output device through `rodio`. One `Sink` per voice.
pub struct RodioBackend {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
}

impl RodioBackend {
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = rodio::OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl AudioBackend for RodioBackend {
    type Voice = rodio::Sink;

    fn play(&mut self, tone: PulsarTone, volume: f32) -> Result<rodio::Sink, AudioError> {
        let sink = rodio::Sink::try_new(&self.handle)?;
        sink.set_volume(volume);
        sink.append(tone);
        Ok(sink)
    }
}

impl VoiceHandle for rodio::Sink {
    fn set_volume(&self, volume: f32) {
        rodio::Sink::set_volume(self, volume);
    }

    fn stop(&self) -> Result<(), AudioError> {
        rodio::Sink::stop(self);
        Ok(())
    }
}

pub struct AudioVoice<V> {
    pub period_s: f64,
    pub frequency: f64,
    handle: V,
}

/// Owns the backend and enforces the single-voice rule.
pub struct AudioController<B: AudioBackend> {
    backend: Option<B>,
    voice: Option<AudioVoice<B::Voice>>,
    enabled: bool,
    volume: f32,
}

impl AudioController<RodioBackend> {
    /// Opens the default output device. Without one the controller stays silent.
    pub fn with_default_output(enabled: bool, volume: f32) -> Self {
        let backend = match RodioBackend::new() {
            Ok(b) => {
                log::info!("Audio system initialized");
                Some(b)
            }
            Err(e) => {
                log::error!("Failed to initialize audio: {e}");
                None
            }
        };
        Self::new(backend, enabled, volume)
    }
}

impl<B: AudioBackend> AudioController<B> {
    pub fn new(backend: Option<B>, enabled: bool, volume: f32) -> Self {
        Self {
            backend,
            voice: None,
            enabled,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn active_voices(&self) -> usize {
        usize::from(self.voice.is_some())
    }

    pub fn voice(&self) -> Option<&AudioVoice<B::Voice>> {
        self.voice.as_ref()
    }

    /// Replaces any playing voice with one for `record`. Records without a
    /// usable period stay silent.
    pub fn play(&mut self, record: &PulsarRecord) {
        self.stop();

        if !self.enabled {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let Some(period_s) = record.period().filter(|p| *p > 0.0) else {
            return;
        };

        let tone = PulsarTone::new(period_s);
        let frequency = tone.frequency();
        match backend.play(tone, self.volume) {
            Ok(handle) => {
                log::info!("Playing sound for pulsar with period {period_s}s ({frequency:.2} Hz)");
                self.voice = Some(AudioVoice {
                    period_s,
                    frequency,
                    handle,
                });
            }
            Err(e) => log::error!("Failed to play pulsar sound: {e}"),
        }
    }

    pub fn stop(&mut self) {
        if let Some(voice) = self.voice.take() {
            if let Err(e) = voice.handle.stop() {
                log::error!("Error stopping sound: {e}");
            }
        }
    }

    /// Flips the global flag. Disabling silences the voice; enabling restarts
    /// it for `selected`, if any.
    pub fn set_enabled(&mut self, enabled: bool, selected: Option<&PulsarRecord>) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        } else if let Some(record) = selected {
            self.play(record);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(voice) = &self.voice {
            voice.handle.set_volume(self.volume);
        }
    }

    /// Stops the voice and releases the output device.
    pub fn shutdown(&mut self) {
        self.stop();
        self.backend = None;
    }
}
