// Communication channel lock-free - Scheduler -> renderer

use crate::messaging::event::PlaybackEvent;
use ringbuf::{HeapRb, traits::Split};

pub type EventProducer = ringbuf::HeapProd<PlaybackEvent>;
pub type EventConsumer = ringbuf::HeapCons<PlaybackEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<PlaybackEvent>::new(capacity);
    rb.split()
}
