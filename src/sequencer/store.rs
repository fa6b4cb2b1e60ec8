// Sequence store - Ordered list of measures, insertion order = playback order

use super::SequencerError;
use super::measure::Measure;

/// Holds the measure sequence and its edit operations
/// Empty is a valid state, but not a playable one.
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    measures: Vec<Measure>,
}

impl SequenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measure, returning its index
    pub fn add(&mut self, measure: Measure) -> Result<usize, SequencerError> {
        measure.validate()?;
        self.measures.push(measure);
        Ok(self.measures.len() - 1)
    }

    /// Replace the measure at `index`
    pub fn edit(&mut self, index: usize, measure: Measure) -> Result<(), SequencerError> {
        measure.validate()?;
        let len = self.measures.len();
        let slot = self
            .measures
            .get_mut(index)
            .ok_or(SequencerError::IndexOutOfRange { index, len })?;
        *slot = measure;
        Ok(())
    }

    /// Remove the measure at `index`, shifting later measures down
    /// Does not correct a live playback position that pointed at or past
    /// the removed entry; the scheduler wraps its index when reading.
    pub fn delete(&mut self, index: usize) -> Result<(), SequencerError> {
        if index >= self.measures.len() {
            return Err(SequencerError::IndexOutOfRange {
                index,
                len: self.measures.len(),
            });
        }
        self.measures.remove(index);
        Ok(())
    }

    /// Replace the whole sequence (used by load)
    /// Validates every measure first; on failure the store is unchanged.
    pub fn replace_all(&mut self, measures: Vec<Measure>) -> Result<(), SequencerError> {
        for measure in &measures {
            measure.validate()?;
        }
        self.measures = measures;
        Ok(())
    }

    /// Remove all measures
    pub fn clear(&mut self) {
        self.measures.clear();
    }

    /// Measure at `index`, if present
    pub fn get(&self, index: usize) -> Option<&Measure> {
        self.measures.get(index)
    }

    /// Number of measures
    pub fn len(&self) -> usize {
        self.measures.len()
    }

    /// True when the sequence has no measures
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// All measures in playback order
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::measure::{Tempo, TimeSignature};

    fn measure(bpm: f64, beats: u8) -> Measure {
        Measure::new(
            Tempo::new(bpm),
            TimeSignature::new(beats, 4),
            vec![440.0; beats as usize],
        )
    }

    #[test]
    fn test_add_returns_new_index() {
        let mut store = SequenceStore::new();
        assert_eq!(store.add(measure(120.0, 4)).unwrap(), 0);
        assert_eq!(store.add(measure(90.0, 3)).unwrap(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_rejects_invalid_measure() {
        let mut store = SequenceStore::new();
        let bad = Measure::new(Tempo::new(120.0), TimeSignature::four_four(), vec![440.0]);
        assert!(store.add(bad).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_edit_replaces_in_place() {
        let mut store = SequenceStore::new();
        store.add(measure(120.0, 4)).unwrap();
        store.edit(0, measure(90.0, 3)).unwrap();
        assert_eq!(store.get(0).unwrap().tempo.bpm(), 90.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_edit_out_of_range_is_an_error() {
        let mut store = SequenceStore::new();
        store.add(measure(120.0, 4)).unwrap();
        let err = store.edit(3, measure(90.0, 3)).unwrap_err();
        assert_eq!(err, SequencerError::IndexOutOfRange { index: 3, len: 1 });
        // Sequence unchanged
        assert_eq!(store.get(0).unwrap().tempo.bpm(), 120.0);
    }

    #[test]
    fn test_delete_shifts_later_measures() {
        let mut store = SequenceStore::new();
        store.add(measure(100.0, 4)).unwrap();
        store.add(measure(110.0, 4)).unwrap();
        store.add(measure(120.0, 4)).unwrap();

        store.delete(1).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().tempo.bpm(), 100.0);
        assert_eq!(store.get(1).unwrap().tempo.bpm(), 120.0);
    }

    #[test]
    fn test_delete_out_of_range_leaves_sequence_unchanged() {
        let mut store = SequenceStore::new();
        for _ in 0..3 {
            store.add(measure(120.0, 4)).unwrap();
        }
        let err = store.delete(5).unwrap_err();
        assert_eq!(err, SequencerError::IndexOutOfRange { index: 5, len: 3 });
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_replace_all_is_atomic() {
        let mut store = SequenceStore::new();
        store.add(measure(120.0, 4)).unwrap();

        let bad_batch = vec![
            measure(90.0, 3),
            Measure::new(Tempo::new(0.0), TimeSignature::four_four(), vec![440.0; 4]),
        ];
        assert!(store.replace_all(bad_batch).is_err());

        // Original content survives a failed load
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().tempo.bpm(), 120.0);

        store
            .replace_all(vec![measure(60.0, 2), measure(80.0, 5)])
            .unwrap();
        assert_eq!(store.len(), 2);
    }
}
