// Messaging module - Lock-free notification channel to the render sink

pub mod channels;
pub mod event;

pub use channels::{EventConsumer, EventProducer, create_event_channel};
pub use event::PlaybackEvent;
