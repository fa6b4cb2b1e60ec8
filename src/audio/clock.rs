// Audio clock - Sample-accurate time reference shared with the audio callback

use crate::sequencer::AudioClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic audio-clock backed by an atomic sample counter
/// The audio callback advances it by the number of frames it renders; the
/// scheduler thread reads it as seconds. Cloning shares the same counter.
#[derive(Clone)]
pub struct SampleClock {
    /// Current sample position (incremented by the audio callback)
    sample_position: Arc<AtomicU64>,
    /// Sample rate (for timestamp conversions)
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Get current sample position (called from the scheduler thread)
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Relaxed)
    }

    /// Advance sample position (called from the audio callback)
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Convert an absolute time in seconds to a sample count
    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate).max(0.0) as u64
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl AudioClock for SampleClock {
    fn now(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = SampleClock::new(48000.0);
        assert_eq!(clock.current_sample(), 0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_advance_moves_time() {
        let clock = SampleClock::new(48000.0);
        clock.advance(24000);
        assert_eq!(clock.current_sample(), 24000);
        assert_eq!(clock.now(), 0.5);
        clock.advance(24000);
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let clock = SampleClock::new(48000.0);
        let other = clock.clone();
        other.advance(480);
        assert_eq!(clock.current_sample(), 480);
    }

    #[test]
    fn test_seconds_to_samples() {
        let clock = SampleClock::new(48000.0);
        assert_eq!(clock.seconds_to_samples(1.0), 48000);
        assert_eq!(clock.seconds_to_samples(0.1), 4800);
        // Never wraps negative times below zero
        assert_eq!(clock.seconds_to_samples(-0.5), 0);
    }
}
