//! End-to-end identification over encoded images.
//!
//! Fixtures are synthetic PNGs encoded in memory. Flat images survive the
//! canonical resize unchanged, which makes the expected scores exact.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::SystemTime;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use printmatch::{
    EnrolledReference, ImageSource, MatchConfig, MatchStatus, Matcher, PrintMatchError,
    ReferenceRegistry,
};

fn encode_png(img: GrayImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("in-memory png encoding");
    bytes
}

fn flat_png(width: u32, height: u32, luma: u8) -> Vec<u8> {
    encode_png(GrayImage::from_pixel(width, height, Luma([luma])))
}

fn textured_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(GrayImage::from_fn(width, height, |x, y| {
        Luma([(x * 31 + y * 17) as u8])
    }))
}

fn reference(id: &str, bytes: Vec<u8>) -> EnrolledReference {
    EnrolledReference::new(id, ImageSource::from_bytes(bytes), SystemTime::now())
}

#[test]
fn empty_reference_list_reports_no_references() {
    let matcher = Matcher::new();
    let query = ImageSource::from_bytes(flat_png(32, 32, 128));

    let outcome = matcher.identify(&query, &[]).unwrap();

    assert_eq!(outcome.status, MatchStatus::NoReferences);
    assert_eq!(outcome.matched_id, None);
    assert_eq!(outcome.score, 0.0);
    assert!(!outcome.authenticated);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn byte_identical_reference_scores_full_marks() {
    let matcher = Matcher::new();
    let bytes = textured_png(120, 90);
    let references = vec![
        reference("alpha", flat_png(64, 64, 10)),
        reference("bravo", bytes.clone()),
    ];

    let outcome = matcher
        .identify(&ImageSource::from_bytes(bytes), &references)
        .unwrap();

    assert_eq!(outcome.status, MatchStatus::Matched);
    assert_eq!(outcome.matched_id.as_deref(), Some("bravo"));
    assert_eq!(outcome.score, 100.0);
    assert!(outcome.authenticated);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn tie_break_keeps_earliest_reference() {
    let matcher = Matcher::new();
    let bytes = flat_png(50, 50, 200);
    let references = vec![
        reference("first", bytes.clone()),
        reference("second", bytes.clone()),
    ];

    let outcome = matcher
        .identify(&ImageSource::from_bytes(bytes), &references)
        .unwrap();

    assert_eq!(outcome.matched_id.as_deref(), Some("first"));
    assert_eq!(outcome.score, 100.0);
}

#[test]
fn score_equal_to_threshold_authenticates() {
    // Flat 100 against flat 151: per-sample diff 51, score 204/255 * 100,
    // exactly 80 in double precision.
    let matcher = Matcher::with_config(MatchConfig {
        threshold: 80.0,
        ..MatchConfig::default()
    })
    .unwrap();
    let references = vec![reference("edge", flat_png(40, 40, 151))];

    let outcome = matcher
        .identify(&ImageSource::from_bytes(flat_png(40, 40, 100)), &references)
        .unwrap();

    assert_eq!(outcome.score, 80.0);
    assert!(outcome.authenticated);
    assert_eq!(outcome.matched_id.as_deref(), Some("edge"));
}

#[test]
fn default_threshold_splits_near_boundary_scores() {
    let matcher = Matcher::new();
    let query = ImageSource::from_bytes(flat_png(40, 40, 100));

    // Diff 76: score ~70.2, at or above the default threshold.
    let above = matcher
        .identify(&query, &[reference("above", flat_png(40, 40, 176))])
        .unwrap();
    assert!(above.score >= 70.0);
    assert!(above.authenticated);

    // Diff 77: score ~69.8, below the default threshold. Still the best
    // match, just not authenticated.
    let below = matcher
        .identify(&query, &[reference("below", flat_png(40, 40, 177))])
        .unwrap();
    assert!(below.score < 70.0);
    assert!(!below.authenticated);
    assert_eq!(below.status, MatchStatus::Matched);
    assert_eq!(below.matched_id.as_deref(), Some("below"));
}

#[test]
fn failing_reference_is_skipped_not_scored() {
    let matcher = Matcher::new();
    let target = textured_png(80, 80);
    let references = vec![
        reference("plain", flat_png(64, 64, 0)),
        reference("broken", b"not an image".to_vec()),
        reference("target", target.clone()),
    ];

    let outcome = matcher
        .identify(&ImageSource::from_bytes(target), &references)
        .unwrap();

    assert_eq!(outcome.matched_id.as_deref(), Some("target"));
    assert_eq!(outcome.score, 100.0);
    assert!(outcome.authenticated);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].id, "broken");
    assert!(matches!(
        outcome.skipped[0].error,
        PrintMatchError::Decode { .. }
    ));
}

#[test]
fn query_decode_failure_is_fatal() {
    let matcher = Matcher::new();
    let references = vec![reference("only", flat_png(32, 32, 128))];

    let err = matcher
        .identify(&ImageSource::from_bytes(b"junk".to_vec()), &references)
        .err()
        .unwrap();

    assert!(matches!(err, PrintMatchError::Decode { .. }));
}

#[test]
fn query_read_failure_reports_path() {
    let matcher = Matcher::new();
    let references = vec![reference("only", flat_png(32, 32, 128))];
    let missing = PathBuf::from("definitely/not/here.png");

    let err = matcher
        .identify(&ImageSource::from_path(&missing), &references)
        .err()
        .unwrap();

    match err {
        PrintMatchError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nothing_above_zero_yields_no_match() {
    let matcher = Matcher::new();
    let references = vec![reference("opposite", flat_png(48, 48, 255))];

    let outcome = matcher
        .identify(&ImageSource::from_bytes(flat_png(48, 48, 0)), &references)
        .unwrap();

    assert_eq!(outcome.status, MatchStatus::NoMatch);
    assert_eq!(outcome.matched_id, None);
    assert_eq!(outcome.score, 0.0);
    assert!(!outcome.authenticated);
}

#[test]
fn compare_scores_pairwise() {
    let matcher = Matcher::new();

    // Same flat value at different source sizes lands on the same grid.
    let score = matcher
        .compare(
            &ImageSource::from_bytes(flat_png(64, 64, 100)),
            &ImageSource::from_bytes(flat_png(32, 32, 100)),
        )
        .unwrap();
    assert_eq!(score, 100.0);

    let score = matcher
        .compare(
            &ImageSource::from_bytes(flat_png(64, 64, 40)),
            &ImageSource::from_bytes(flat_png(64, 64, 91)),
        )
        .unwrap();
    assert_eq!(score, 80.0);
}

#[test]
fn registry_snapshot_feeds_identify() {
    let mut registry = ReferenceRegistry::new();
    let bytes = textured_png(100, 100);
    let id = registry
        .enroll(ImageSource::from_bytes(bytes.clone()))
        .id()
        .to_string();
    registry.enroll(ImageSource::from_bytes(flat_png(64, 64, 30)));

    let snapshot = registry.snapshot();
    registry.clear();

    let outcome = Matcher::new()
        .identify(&ImageSource::from_bytes(bytes), &snapshot)
        .unwrap();

    assert_eq!(outcome.matched_id, Some(id));
    assert_eq!(outcome.score, 100.0);
}
