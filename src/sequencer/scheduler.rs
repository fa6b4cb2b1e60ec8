// Lookahead scheduler - Converts a coarse wake-up timer into precisely
// timed tone events
//
// The tick driver fires with jitter on the order of tens of milliseconds,
// far coarser than acceptable musical timing error, but the audio layer
// accepts future start times with sample accuracy. Each tick therefore
// drains every beat whose scheduled time falls inside a near-future window
// and hands it to the tone emitter with its exact start time.

use super::SequencerError;
use super::position::PlaybackPosition;
use super::store::SequenceStore;
use crate::messaging::channels::EventProducer;
use crate::messaging::event::PlaybackEvent;
use ringbuf::traits::Producer;
use std::time::Duration;

/// Fixed duration of each scheduled click in seconds
pub const TONE_DURATION_SECONDS: f64 = 0.1;

/// Monotonic audio-clock time source, in seconds
/// The same clock must be used by the scheduler and the tone emitter so
/// that scheduled start times line up with the audio output.
pub trait AudioClock {
    fn now(&self) -> f64;
}

/// Fire-and-forget tone production at an absolute audio-clock time
/// The scheduler never tracks completion of an emitted tone.
pub trait ToneEmitter {
    fn emit(&mut self, frequency_hz: f64, start_time: f64, duration_seconds: f64);
}

/// Scheduler configuration
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// How far into the future tones are pre-scheduled
    pub schedule_ahead_seconds: f64,
    /// Coarse wake-up period for the tick driver
    pub lookahead_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule_ahead_seconds: 0.1,
            lookahead_interval: Duration::from_millis(25),
        }
    }
}

/// The playback scheduler
/// Owns the playback position and the is-playing flag; collaborators
/// (store, clock, emitter) are passed into each call so the same scheduler
/// is driven identically by the timer thread and by tests.
pub struct LookaheadScheduler {
    config: SchedulerConfig,
    position: PlaybackPosition,
    is_playing: bool,
    events: EventProducer,
}

impl LookaheadScheduler {
    /// Create a stopped scheduler
    pub fn new(config: SchedulerConfig, events: EventProducer) -> Self {
        Self {
            config,
            position: PlaybackPosition::start_at(0.0),
            is_playing: false,
            events,
        }
    }

    /// Start playback from the first measure
    ///
    /// Rejects an empty sequence with no state change. Otherwise resets the
    /// position to (measure 0, beat 0), anchors the first beat at the
    /// current audio-clock time, and notifies the render sink.
    pub fn play(
        &mut self,
        store: &SequenceStore,
        clock: &impl AudioClock,
    ) -> Result<(), SequencerError> {
        if store.is_empty() {
            return Err(SequencerError::EmptySequence);
        }
        self.position = PlaybackPosition::start_at(clock.now());
        self.is_playing = true;
        self.notify(PlaybackEvent::Started);
        Ok(())
    }

    /// Stop playback
    /// Idempotent; a second stop is a no-op. The position is not reset
    /// (play() always resets), and tones already handed to the audio layer
    /// will still sound.
    pub fn stop(&mut self) {
        if !self.is_playing {
            return;
        }
        self.is_playing = false;
        self.notify(PlaybackEvent::Stopped);
    }

    /// True while playback is active
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Current playback position
    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    /// Scheduler configuration
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// One coarse timer tick
    ///
    /// Drains all beats due strictly before `now + schedule_ahead_seconds`.
    /// The window may span several beats at high tempo or after a delayed
    /// wake-up, so the loop re-evaluates until the next beat falls outside
    /// it. Store edits are read live; there is no snapshot.
    ///
    /// On invalid measure data (e.g. a tones array shrunk under the playing
    /// position) the scheduler stops itself, notifies the sink, and returns
    /// the error. It stays usable for a subsequent play().
    pub fn tick(
        &mut self,
        store: &SequenceStore,
        clock: &impl AudioClock,
        emitter: &mut impl ToneEmitter,
    ) -> Result<(), SequencerError> {
        if !self.is_playing {
            return Ok(());
        }
        let horizon = clock.now() + self.config.schedule_ahead_seconds;
        while self.is_playing && self.position.next_note_time < horizon {
            if let Err(e) = self.schedule_next_beat(store, emitter) {
                self.stop();
                return Err(e);
            }
        }
        Ok(())
    }

    /// Emit the tone for the current beat and advance the position
    fn schedule_next_beat(
        &mut self,
        store: &SequenceStore,
        emitter: &mut impl ToneEmitter,
    ) -> Result<(), SequencerError> {
        if store.is_empty() {
            return Err(SequencerError::EmptySequence);
        }
        // Wrap a position left dangling by a mid-playback delete
        let index = self.position.measure % store.len();
        let measure = store.get(index).ok_or(SequencerError::EmptySequence)?;
        let frequency = measure.tone(self.position.beat)?;

        emitter.emit(frequency, self.position.next_note_time, TONE_DURATION_SECONDS);
        self.notify(PlaybackEvent::PositionChanged {
            measure: index,
            beat: self.position.beat,
        });
        self.position.advance(store)
    }

    /// Push a notification without blocking
    /// A full channel drops the event; the renderer only loses a repaint.
    fn notify(&mut self, event: PlaybackEvent) {
        let _ = self.events.try_push(event);
    }
}
