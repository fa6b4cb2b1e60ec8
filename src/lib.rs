// clickseq - Metronome sequencer core
// Lookahead-scheduled click playback over an ordered list of measures

pub mod audio;
pub mod engine;
pub mod messaging;
pub mod persist;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioOutput, QueuedToneEmitter, SampleClock, create_tone_channel};
pub use engine::MetronomeEngine;
pub use messaging::{EventConsumer, EventProducer, PlaybackEvent, create_event_channel};
pub use persist::PersistError;
pub use sequencer::{
    AudioClock, LookaheadScheduler, Measure, PlaybackPosition, SchedulerConfig, SequenceStore,
    SequencerError, Tempo, TimeSignature, ToneEmitter,
};
