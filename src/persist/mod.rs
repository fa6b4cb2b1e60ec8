// Sequence persistence - JSON save/load of the measure list
//
// The persisted representation is a JSON array of measures:
// [{ "tempo": 120.0, "timeSignature": [4, 4], "tones": [...] }, ...]
// Round-trip contract: load(save(s)) == s.

use crate::sequencer::{Measure, SequenceStore, SequencerError};
use std::fs;
use std::path::Path;

/// Persistence error types
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed sequence data: {0}")]
    MalformedData(String),

    #[error("invalid measure: {0}")]
    Invalid(#[from] SequencerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize the sequence to pretty-printed JSON
pub fn save_to_string(store: &SequenceStore) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(store.measures())?)
}

/// Replace the store content from JSON
/// On any failure (parse or validation) the store is left unchanged.
pub fn load_from_str(store: &mut SequenceStore, json: &str) -> Result<(), PersistError> {
    let measures: Vec<Measure> =
        serde_json::from_str(json).map_err(|e| PersistError::MalformedData(e.to_string()))?;
    store.replace_all(measures)?;
    Ok(())
}

/// Write the sequence to a JSON file
pub fn save_to_path(store: &SequenceStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    fs::write(path, save_to_string(store)?)?;
    Ok(())
}

/// Load the sequence from a JSON file
pub fn load_from_path(store: &mut SequenceStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let json = fs::read_to_string(path)?;
    load_from_str(store, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{Tempo, TimeSignature};

    fn varied_store() -> SequenceStore {
        let mut store = SequenceStore::new();
        store
            .add(Measure::new(
                Tempo::new(120.0),
                TimeSignature::four_four(),
                vec![880.0, 440.0, 440.0, 440.0],
            ))
            .unwrap();
        store
            .add(Measure::new(
                Tempo::new(90.5),
                TimeSignature::three_four(),
                vec![660.0, 330.0, 330.0],
            ))
            .unwrap();
        store
            .add(Measure::new(
                Tempo::new(200.0),
                TimeSignature::new(7, 8),
                vec![990.0, 495.0, 495.0, 495.0, 495.0, 495.0, 495.0],
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_round_trip_preserves_the_sequence() {
        let store = varied_store();
        let json = save_to_string(&store).unwrap();

        let mut loaded = SequenceStore::new();
        load_from_str(&mut loaded, &json).unwrap();

        assert_eq!(loaded.measures(), store.measures());
    }

    #[test]
    fn test_serialized_format_uses_camel_case_keys() {
        let json = save_to_string(&varied_store()).unwrap();
        assert!(json.contains("\"tempo\""));
        assert!(json.contains("\"timeSignature\""));
        assert!(json.contains("\"tones\""));
    }

    #[test]
    fn test_malformed_json_leaves_store_unchanged() {
        let mut store = varied_store();
        let err = load_from_str(&mut store, "{ not json").unwrap_err();
        assert!(matches!(err, PersistError::MalformedData(_)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let mut store = varied_store();
        // Valid JSON, but not a sequence array
        let err = load_from_str(&mut store, r#"{"tempo": 120}"#).unwrap_err();
        assert!(matches!(err, PersistError::MalformedData(_)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_invalid_measure_leaves_store_unchanged() {
        let mut store = varied_store();
        // Parses fine, fails validation: 1 tone for 4 beats
        let json = r#"[{"tempo": 120.0, "timeSignature": [4, 4], "tones": [880.0]}]"#;
        let err = load_from_str(&mut store, json).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Invalid(SequencerError::InvalidMeasureData(_))
        ));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_empty_array_loads_as_empty_sequence() {
        let mut store = varied_store();
        load_from_str(&mut store, "[]").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequence.json");

        let store = varied_store();
        save_to_path(&store, &path).unwrap();

        let mut loaded = SequenceStore::new();
        load_from_path(&mut loaded, &path).unwrap();
        assert_eq!(loaded.measures(), store.measures());
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let mut store = SequenceStore::new();
        let err = load_from_path(&mut store, "/nonexistent/sequence.json").unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }
}
