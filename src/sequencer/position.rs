// Playback position - Current measure, beat, and the audio-clock time of the
// next unscheduled beat

use super::SequencerError;
use super::store::SequenceStore;

/// Position of the next beat to be scheduled
/// Owned by the scheduler; reset on every play().
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackPosition {
    /// Current measure index into the sequence
    pub measure: usize,
    /// Current beat within the measure
    pub beat: usize,
    /// Absolute audio-clock time (seconds) of the next beat
    pub next_note_time: f64,
}

impl PlaybackPosition {
    /// Position at the start of the sequence, first beat due at `now`
    pub fn start_at(now: f64) -> Self {
        Self {
            measure: 0,
            beat: 0,
            next_note_time: now,
        }
    }

    /// Step to the next beat
    ///
    /// Advances `next_note_time` by one beat of the current measure's tempo,
    /// then increments the beat counter, wrapping to the next measure at the
    /// end of the bar and back to measure 0 after the last measure (infinite
    /// looped playback).
    ///
    /// The measure index is reduced modulo the sequence length before the
    /// read, so a position left dangling by a mid-playback delete wraps
    /// instead of going out of bounds.
    pub fn advance(&mut self, store: &SequenceStore) -> Result<(), SequencerError> {
        if store.is_empty() {
            return Err(SequencerError::EmptySequence);
        }
        let index = self.measure % store.len();
        let measure = store.get(index).ok_or(SequencerError::EmptySequence)?;

        self.next_note_time += measure.seconds_per_beat();
        self.beat += 1;
        if self.beat >= measure.time_signature.beats_per_measure() {
            self.beat = 0;
            self.measure = (index + 1) % store.len();
        } else {
            self.measure = index;
        }
        Ok(())
    }
}
