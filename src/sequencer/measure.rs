// Measure - Musical unit with its own tempo, time signature, and per-beat tones
// Serialized shape matches the persisted sequence format:
// { "tempo": 120.0, "timeSignature": [4, 4], "tones": [880.0, 440.0, 440.0, 440.0] }

use super::SequencerError;
use std::fmt;

/// Time signature (numerator/denominator)
/// Example: 4/4 time = TimeSignature { numerator: 4, denominator: 4 }
/// Only the numerator (beats per measure) affects timing math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct TimeSignature {
    pub numerator: u8,   // Beats per measure
    pub denominator: u8, // Note value (4 = quarter note, 8 = eighth note)
}

impl TimeSignature {
    /// Creates a new time signature
    /// Validation happens at the store/load boundary, not here
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// Common 3/4 time signature (waltz)
    pub fn three_four() -> Self {
        Self::new(3, 4)
    }

    /// Number of beats per measure
    pub fn beats_per_measure(&self) -> usize {
        self.numerator as usize
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl From<(u8, u8)> for TimeSignature {
    fn from((numerator, denominator): (u8, u8)) -> Self {
        Self::new(numerator, denominator)
    }
}

impl From<TimeSignature> for (u8, u8) {
    fn from(ts: TimeSignature) -> Self {
        (ts.numerator, ts.denominator)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Creates a new tempo
    pub fn new(bpm: f64) -> Self {
        Self { bpm }
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// One measure of the sequence: constant tempo, a time signature, and one
/// click frequency (Hz) per beat. Invariant for playable data:
/// `tones.len() == time_signature.beats_per_measure()`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    pub tones: Vec<f64>,
}

impl Measure {
    /// Creates a new measure
    pub fn new(tempo: Tempo, time_signature: TimeSignature, tones: Vec<f64>) -> Self {
        Self {
            tempo,
            time_signature,
            tones,
        }
    }

    /// Duration of one beat of this measure in seconds
    pub fn seconds_per_beat(&self) -> f64 {
        self.tempo.beat_duration_seconds()
    }

    /// Check structural invariants
    /// Called at every store mutation and load boundary, so bad data is
    /// rejected before playback can read past the tones array.
    pub fn validate(&self) -> Result<(), SequencerError> {
        if !self.tempo.bpm().is_finite() || self.tempo.bpm() <= 0.0 {
            return Err(SequencerError::InvalidMeasureData(format!(
                "tempo must be a positive number, got {}",
                self.tempo.bpm()
            )));
        }
        if self.time_signature.numerator == 0 {
            return Err(SequencerError::InvalidMeasureData(
                "time signature numerator must be > 0".to_string(),
            ));
        }
        if self.time_signature.denominator == 0 {
            return Err(SequencerError::InvalidMeasureData(
                "time signature denominator must be > 0".to_string(),
            ));
        }
        if self.tones.len() != self.time_signature.beats_per_measure() {
            return Err(SequencerError::InvalidMeasureData(format!(
                "{} tones for a {} time signature ({} beats expected)",
                self.tones.len(),
                self.time_signature,
                self.time_signature.beats_per_measure()
            )));
        }
        if let Some(bad) = self.tones.iter().find(|t| !t.is_finite() || **t <= 0.0) {
            return Err(SequencerError::InvalidMeasureData(format!(
                "tone frequency must be a positive number, got {}",
                bad
            )));
        }
        Ok(())
    }

    /// Frequency for a given beat index
    /// Fails with InvalidMeasureData instead of reading past the tones array
    /// (the array can shrink under a live playback position via edits).
    pub fn tone(&self, beat: usize) -> Result<f64, SequencerError> {
        self.tones.get(beat).copied().ok_or_else(|| {
            SequencerError::InvalidMeasureData(format!(
                "beat {} has no tone ({} tones in measure)",
                beat,
                self.tones.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_beat_measure() -> Measure {
        Measure::new(
            Tempo::new(120.0),
            TimeSignature::four_four(),
            vec![880.0, 440.0, 440.0, 440.0],
        )
    }

    #[test]
    fn test_time_signature_display() {
        assert_eq!(TimeSignature::four_four().to_string(), "4/4");
        assert_eq!(TimeSignature::three_four().to_string(), "3/4");
        assert_eq!(TimeSignature::new(7, 8).beats_per_measure(), 7);
    }

    #[test]
    fn test_tempo_beat_duration() {
        assert_eq!(Tempo::new(120.0).beat_duration_seconds(), 0.5);
        assert_eq!(Tempo::new(60.0).beat_duration_seconds(), 1.0);
        assert_eq!(Tempo::default().bpm(), 120.0);
    }

    #[test]
    fn test_validate_accepts_well_formed_measure() {
        assert!(four_beat_measure().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tone_count_mismatch() {
        let measure = Measure::new(
            Tempo::new(120.0),
            TimeSignature::four_four(),
            vec![880.0, 440.0], // 2 tones for 4 beats
        );
        let err = measure.validate().unwrap_err();
        assert!(matches!(err, SequencerError::InvalidMeasureData(_)));
    }

    #[test]
    fn test_validate_rejects_bad_tempo() {
        let mut measure = four_beat_measure();
        measure.tempo = Tempo::new(0.0);
        assert!(measure.validate().is_err());

        measure.tempo = Tempo::new(-60.0);
        assert!(measure.validate().is_err());

        measure.tempo = Tempo::new(f64::NAN);
        assert!(measure.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_numerator() {
        let measure = Measure::new(Tempo::new(120.0), TimeSignature::new(0, 4), vec![]);
        assert!(measure.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_frequency() {
        let mut measure = four_beat_measure();
        measure.tones[2] = -440.0;
        assert!(measure.validate().is_err());
    }

    #[test]
    fn test_tone_lookup() {
        let measure = four_beat_measure();
        assert_eq!(measure.tone(0).unwrap(), 880.0);
        assert_eq!(measure.tone(3).unwrap(), 440.0);
        assert!(measure.tone(4).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let measure = four_beat_measure();
        let json = serde_json::to_value(&measure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tempo": 120.0,
                "timeSignature": [4, 4],
                "tones": [880.0, 440.0, 440.0, 440.0]
            })
        );

        let back: Measure = serde_json::from_value(json).unwrap();
        assert_eq!(back, measure);
    }
}
