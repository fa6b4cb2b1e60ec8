// Sequencer module - Measure data model, sequence store, playback position,
// and the lookahead scheduler

pub mod measure;
pub mod position;
pub mod scheduler;
pub mod store;

pub use measure::{Measure, Tempo, TimeSignature};
pub use position::PlaybackPosition;
pub use scheduler::{
    AudioClock, LookaheadScheduler, SchedulerConfig, TONE_DURATION_SECONDS, ToneEmitter,
};
pub use store::SequenceStore;

/// Sequencer error types
/// Every error is local to the command that triggered it; the scheduler and
/// store stay usable afterwards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequencerError {
    #[error("sequence has no measures")]
    EmptySequence,

    #[error("measure index {index} out of range ({len} measures)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid measure data: {0}")]
    InvalidMeasureData(String),
}
