use printmatch::{MatchConfig, Matcher, NormalizedGrid, Normalizer, PrintMatchError};

#[test]
fn grid_rejects_zero_dimensions() {
    let err = NormalizedGrid::new(vec![], 0, 4).err().unwrap();
    assert_eq!(
        err,
        PrintMatchError::InvalidDimensions {
            width: 0,
            height: 4,
        }
    );

    let err = NormalizedGrid::new(vec![], 4, 0).err().unwrap();
    assert_eq!(
        err,
        PrintMatchError::InvalidDimensions {
            width: 4,
            height: 0,
        }
    );
}

#[test]
fn grid_rejects_wrong_sample_count() {
    let err = NormalizedGrid::new(vec![0u8; 5], 2, 3).err().unwrap();
    assert_eq!(
        err,
        PrintMatchError::SampleCountMismatch {
            expected: 6,
            got: 5,
        }
    );
}

#[test]
fn grid_exposes_dimensions_and_samples() {
    let grid = NormalizedGrid::new(vec![1, 2, 3, 4, 5, 6], 3, 2).unwrap();
    assert_eq!(grid.width(), 3);
    assert_eq!(grid.height(), 2);
    assert_eq!(grid.len(), 6);
    assert!(!grid.is_empty());
    assert_eq!(grid.samples(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn normalizer_rejects_zero_dimensions() {
    let err = Normalizer::new(0, 10).err().unwrap();
    assert_eq!(
        err,
        PrintMatchError::InvalidDimensions {
            width: 0,
            height: 10,
        }
    );
}

#[test]
fn config_defaults_are_valid() {
    let cfg = MatchConfig::default();
    assert_eq!(cfg.threshold, 70.0);
    assert_eq!(cfg.canonical_width, 200);
    assert_eq!(cfg.canonical_height, 200);
    assert!(!cfg.parallel);
    cfg.validate().unwrap();
}

#[test]
fn config_rejects_out_of_range_thresholds() {
    for threshold in [-0.1, 100.1, f64::NAN, f64::INFINITY] {
        let cfg = MatchConfig {
            threshold,
            ..MatchConfig::default()
        };
        let err = cfg.validate().err().unwrap();
        match err {
            PrintMatchError::InvalidThreshold { value } => {
                assert!(value.is_nan() || value == threshold)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn config_accepts_threshold_bounds() {
    for threshold in [0.0, 100.0] {
        let cfg = MatchConfig {
            threshold,
            ..MatchConfig::default()
        };
        cfg.validate().unwrap();
    }
}

#[test]
fn config_rejects_zero_dimensions() {
    let cfg = MatchConfig {
        canonical_width: 0,
        ..MatchConfig::default()
    };
    let err = cfg.validate().err().unwrap();
    assert_eq!(
        err,
        PrintMatchError::InvalidDimensions {
            width: 0,
            height: 200,
        }
    );
}

#[test]
fn matcher_rejects_invalid_config() {
    let cfg = MatchConfig {
        threshold: 250.0,
        ..MatchConfig::default()
    };
    let err = Matcher::with_config(cfg).err().unwrap();
    assert_eq!(err, PrintMatchError::InvalidThreshold { value: 250.0 });
}
