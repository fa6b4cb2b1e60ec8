// Click synthesis - Short sine bursts with an exponential decay envelope

use std::f32::consts::PI;

/// A tone scheduled for an absolute sample time
/// Crosses from the scheduler thread to the audio callback.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledTone {
    pub start_sample: u64,
    pub frequency: f32,
    pub duration_samples: usize,
}

/// Default click amplitude, leaving headroom when beats overlap
const CLICK_AMPLITUDE: f32 = 0.5;

/// One sounding click
/// Pre-renders its samples at trigger time; the callback then just copies.
#[derive(Debug, Clone)]
pub struct ClickVoice {
    samples: Vec<f32>,
    position: usize,
}

impl ClickVoice {
    /// Render a click at the given frequency and duration
    pub fn new(sample_rate: f32, frequency: f32, num_samples: usize) -> Self {
        Self {
            samples: generate_click(sample_rate, num_samples, frequency, CLICK_AMPLITUDE),
            position: 0,
        }
    }

    /// Next sample of the click, or None once it has finished
    pub fn next_sample(&mut self) -> Option<f32> {
        let sample = self.samples.get(self.position).copied();
        if sample.is_some() {
            self.position += 1;
        }
        sample
    }

    /// True once all samples have been consumed
    pub fn is_finished(&self) -> bool {
        self.position >= self.samples.len()
    }
}

/// Generate a short click sound using a sine wave with an envelope
fn generate_click(sample_rate: f32, num_samples: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
    let mut samples = Vec::with_capacity(num_samples);
    let phase_increment = 2.0 * PI * frequency / sample_rate;

    for i in 0..num_samples {
        // Exponential decay envelope
        let t = i as f32 / num_samples as f32;
        let envelope = (-t * 8.0).exp();

        let phase = i as f32 * phase_increment;
        samples.push(phase.sin() * envelope * amplitude);
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_length_matches_duration() {
        let voice = ClickVoice::new(48000.0, 880.0, 4800);
        assert_eq!(voice.samples.len(), 4800);
    }

    #[test]
    fn test_click_produces_sound_then_finishes() {
        let mut voice = ClickVoice::new(48000.0, 880.0, 480);

        let mut non_zero = 0;
        while let Some(sample) = voice.next_sample() {
            if sample.abs() > 0.0001 {
                non_zero += 1;
            }
        }
        assert!(non_zero > 400);
        assert!(voice.is_finished());
        assert_eq!(voice.next_sample(), None);
    }

    #[test]
    fn test_envelope_decays() {
        let samples = generate_click(48000.0, 4800, 880.0, 0.5);

        let early_peak = samples[..480].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let late_peak = samples[4320..].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(early_peak > late_peak * 4.0);
    }

    #[test]
    fn test_amplitude_stays_in_range() {
        let samples = generate_click(48000.0, 4800, 1200.0, 0.5);
        assert!(samples.iter().all(|s| s.abs() <= 0.5));
    }
}
