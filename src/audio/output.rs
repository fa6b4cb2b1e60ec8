// Audio output - CPAL stream mixing scheduled click tones
//
// The scheduler thread pushes ScheduledTone values into a lock-free ring
// buffer; the audio callback pops them, holds them until their start sample
// comes due, then mixes the rendered clicks into the output buffer. All
// processing is f32 internally; conversion to the device format happens at
// the point of writing via cpal's FromSample.

use crate::audio::clock::SampleClock;
use crate::audio::click::{ClickVoice, ScheduledTone};
use crate::sequencer::ToneEmitter;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

pub type ToneProducer = ringbuf::HeapProd<ScheduledTone>;
pub type ToneConsumer = ringbuf::HeapCons<ScheduledTone>;

pub fn create_tone_channel(capacity: usize) -> (ToneProducer, ToneConsumer) {
    let rb = HeapRb::<ScheduledTone>::new(capacity);
    rb.split()
}

/// Audio error types
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("stream config error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("stream build error: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("stream play error: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// ToneEmitter backed by the lock-free queue to the audio callback
/// Converts absolute audio-clock seconds to sample timestamps using the
/// same clock the callback advances.
pub struct QueuedToneEmitter {
    tones: ToneProducer,
    clock: SampleClock,
}

impl QueuedToneEmitter {
    pub fn new(tones: ToneProducer, clock: SampleClock) -> Self {
        Self { tones, clock }
    }
}

impl ToneEmitter for QueuedToneEmitter {
    fn emit(&mut self, frequency_hz: f64, start_time: f64, duration_seconds: f64) {
        let tone = ScheduledTone {
            start_sample: self.clock.seconds_to_samples(start_time),
            frequency: frequency_hz as f32,
            duration_samples: (duration_seconds * self.clock.sample_rate()) as usize,
        };
        if self.tones.try_push(tone).is_err() {
            log::warn!("tone queue full, dropping click at {start_time:.3}s");
        }
    }
}

/// Mixer state owned by the audio callback
struct ToneMixer {
    tones: ToneConsumer,
    /// Scheduled but not yet due
    pending: Vec<ScheduledTone>,
    /// Currently sounding clicks
    voices: Vec<ClickVoice>,
    sample_rate: f32,
}

impl ToneMixer {
    fn new(tones: ToneConsumer, sample_rate: f32) -> Self {
        Self {
            tones,
            pending: Vec::with_capacity(64),
            voices: Vec::with_capacity(16),
            sample_rate,
        }
    }

    /// Move newly queued tones into the pending list
    fn drain_queue(&mut self) {
        while let Some(tone) = self.tones.try_pop() {
            self.pending.push(tone);
        }
    }

    /// Mono output value for the frame at absolute sample time `now`
    fn next_frame(&mut self, now: u64) -> f32 {
        // Trigger due tones; a tone scheduled in the past starts immediately
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].start_sample <= now {
                let tone = self.pending.swap_remove(i);
                self.voices.push(ClickVoice::new(
                    self.sample_rate,
                    tone.frequency,
                    tone.duration_samples,
                ));
            } else {
                i += 1;
            }
        }

        let mut mixed = 0.0f32;
        self.voices.retain_mut(|voice| match voice.next_sample() {
            Some(sample) => {
                mixed += sample;
                true
            }
            None => false,
        });
        mixed.clamp(-1.0, 1.0)
    }
}

/// Audio output stream
/// Holds the cpal stream alive and exposes the shared sample clock.
pub struct AudioOutput {
    _device: Device,
    _stream: Stream,
    clock: SampleClock,
    sample_rate: f32,
}

impl AudioOutput {
    /// Open the default output device and start the mixing stream
    pub fn new(tone_rx: ToneConsumer) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        log::info!(
            "audio device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let clock = SampleClock::new(sample_rate as f64);
        let mixer = ToneMixer::new(tone_rx, sample_rate);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, mixer, clock.clone())
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, mixer, clock.clone())
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, mixer, clock.clone())
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        }?;

        stream.play()?;

        Ok(Self {
            _device: device,
            _stream: stream,
            clock,
            sample_rate,
        })
    }

    /// Shared audio clock (clone for the scheduler and the emitter)
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut mixer: ToneMixer,
        clock: SampleClock,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _| {
                mixer.drain_queue();
                let block_start = clock.current_sample();
                let frames = data.len() / channels;

                for (i, frame) in data.chunks_mut(channels).enumerate() {
                    let value = mixer.next_frame(block_start + i as u64);
                    for sample in frame.iter_mut() {
                        *sample = T::from_sample(value);
                    }
                }

                clock.advance(frames);
            },
            |err| {
                log::error!("audio stream error: {err}");
            },
            None,
        )?;
        Ok(stream)
    }
}
