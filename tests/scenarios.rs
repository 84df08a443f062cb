//! End-to-end scenarios over a BIDS-style directory.

use std::fs;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use serde_json::json;

use rusty_cohort::{
    align, infer, AlignOrder, Aligner, ColumnSpec, ConfigError, InferEngine, PatternSpec, Spec,
    Value,
};

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

fn bids() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "sub-01/anat/sub-01_T1w.nii.gz");
    touch(dir.path(), "sub-02/anat/sub-02_T1w.nii.gz");
    touch(dir.path(), "dataset_description.json");
    fs::write(
        dir.path().join("participants.tsv"),
        "participant_id\tage\tsex\nsub-02\t41\tF\nsub-01\t29\tM\nsub-05\t33\tF\n",
    )
    .unwrap();
    dir
}

#[test]
fn pattern_token_spans_directory_name() {
    let dir = bids();
    let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(dir.path())).unwrap();

    assert_eq!(x.kind(), "pattern");
    assert_eq!(x.ids().unwrap(), ["sub-01", "sub-02"]);
    let paths: Vec<_> = x.values().iter().filter_map(Value::as_path).collect();
    assert_eq!(paths.len(), 2);
    for (path, id) in paths.iter().zip(x.ids().unwrap()) {
        let rel = path.strip_prefix(dir.path()).unwrap();
        assert!(rel.starts_with(id));
    }
}

#[test]
fn align_pattern_against_participants() {
    let dir = bids();
    let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(dir.path())).unwrap();
    let y = infer(
        ColumnSpec::new("participants.tsv", "age").with_id_column("participant_id"),
        Some(dir.path()),
    )
    .unwrap();

    let (x, y) = align(x, y).unwrap();
    assert_eq!(x.ids(), y.ids());
    assert_eq!(x.len(), 2);
    assert_eq!(y.len(), 2);
}

#[test]
fn preserved_order_can_disagree_with_ids() {
    let dir = bids();
    let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(dir.path())).unwrap();
    let y = infer(
        ColumnSpec::new("participants.tsv", "age").with_id_column("participant_id"),
        Some(dir.path()),
    )
    .unwrap();

    // the table lists sub-02 before sub-01; preserve keeps that row order
    let (_, y) = align(x, y).unwrap();
    assert_eq!(y.ids().unwrap(), ["sub-01", "sub-02"]);
    assert_eq!(y.get(0).unwrap().as_cell().unwrap().as_f64(), Some(41.0));
}

#[test]
fn canonical_order_pairs_ids_with_their_rows() {
    let dir = bids();
    let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(dir.path())).unwrap();
    let y = infer(
        ColumnSpec::new("participants.tsv", "age").with_id_column("participant_id"),
        Some(dir.path()),
    )
    .unwrap();

    let (_, y) = Aligner::new(AlignOrder::Canonical).align(x, y).unwrap();
    assert_eq!(y.get(0).unwrap().as_cell().unwrap().as_f64(), Some(29.0));
    assert_eq!(y.get(1).unwrap().as_cell().unwrap().as_f64(), Some(41.0));
}

#[test]
fn missing_y_ids_carry_column_guidance() {
    let dir = bids();
    let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(dir.path())).unwrap();
    let y = infer(ColumnSpec::new("participants.tsv", "age"), Some(dir.path())).unwrap();

    let err = align(x, y).unwrap_err();
    assert!(err.to_string().contains("\"id\""), "{err}");
}

#[test]
fn missing_x_ids_carry_pattern_guidance() {
    let dir = bids();
    let x = infer(PatternSpec::new("*/anat/*T1w*"), Some(dir.path())).unwrap();
    let y = infer(
        ColumnSpec::new("participants.tsv", "age").with_id_column("participant_id"),
        Some(dir.path()),
    )
    .unwrap();

    let err = align(x, y).unwrap_err();
    assert!(err.to_string().contains("{id}"), "{err}");
}

#[test]
fn json_specs_with_no_matches_or_unknown_keys() {
    let dir = bids();
    let engine = InferEngine::new();

    let err = engine
        .infer_json(&json!({"pattern": "x"}), Some(dir.path()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoFilesFound { .. }));

    let err = engine
        .infer_json(&json!({"unknown_key": 1}), Some(dir.path()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedSpecification(_)));
}

#[test]
fn array_of_volumes() {
    let array = ArrayD::from_shape_fn(IxDyn(&[10, 5, 5, 5]), |ix| ix[0] as f64);
    let config = infer(Spec::Array(array), None).unwrap();
    assert_eq!(config.len(), 10);
    for i in 0..10 {
        let value = config.get(i).unwrap();
        assert_eq!(value.as_image().unwrap().shape(), [5, 5, 5]);
    }
}

#[test]
fn compose_of_mixed_configs() {
    let dir = bids();
    let spec = json!([
        {"pattern": "{id}/anat/*T1w*"},
        {"pattern": "*/anat/*.nii.gz"}
    ]);
    let config = InferEngine::new().infer_json(&spec, Some(dir.path())).unwrap();
    assert_eq!(config.kind(), "compose");
    assert_eq!(config.ids().unwrap(), ["sub-01", "sub-02"]);
    for value in config.values() {
        assert_eq!(value.as_tuple().unwrap().len(), 2);
    }
}

#[test]
fn zero_padded_subjects_align_with_table_ids() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "sub-01/anat/T1w.png");
    touch(dir.path(), "sub-02/anat/T1w.png");
    fs::write(dir.path().join("scores.csv"), "subject,score\n02,0.5\n01,0.25\n").unwrap();

    let x = infer(PatternSpec::new("sub-{id}/anat/T1w.png"), Some(dir.path())).unwrap();
    let y = infer(
        ColumnSpec::new("scores.csv", "score").with_id_column("subject"),
        Some(dir.path()),
    )
    .unwrap();
    assert_eq!(x.ids().unwrap(), ["01", "02"]);

    let (x, y) = align(x, y).unwrap();
    assert_eq!(x.ids().unwrap(), ["01", "02"]);
    assert_eq!(y.ids().unwrap(), ["01", "02"]);
}

#[test]
fn unmatched_rows_may_share_an_id() {
    let dir = bids();
    fs::write(
        dir.path().join("participants.tsv"),
        "participant_id\tage\nsub-01\t29\nn/a\t50\nn/a\t51\nsub-02\t41\n",
    )
    .unwrap();
    let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(dir.path())).unwrap();
    let y = infer(
        ColumnSpec::new("participants.tsv", "age").with_id_column("participant_id"),
        Some(dir.path()),
    )
    .unwrap();

    let (x, y) = align(x, y).unwrap();
    assert_eq!(x.ids().unwrap(), ["sub-01", "sub-02"]);
    assert_eq!(y.len(), 2);
    assert_eq!(y.get(1).unwrap().as_cell().unwrap().as_f64(), Some(41.0));
}
