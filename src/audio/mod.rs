// Audio module - CPAL backend, sample clock, and click synthesis

pub mod click;
pub mod clock;
pub mod output;

pub use click::{ClickVoice, ScheduledTone};
pub use clock::SampleClock;
pub use output::{AudioError, AudioOutput, QueuedToneEmitter, create_tone_channel};
