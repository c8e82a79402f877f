//! Best-match selection and the authentication decision.
//!
//! `identify` normalizes a query once, scores it against every enrolled
//! reference, and keeps the highest score under a strict-greater
//! comparison, so the earliest reference wins ties and a zero score never
//! becomes a match. References that fail to normalize are excluded from
//! the maximum and reported separately instead of aborting the scan.

use crate::grid::NormalizedGrid;
use crate::normalize::{ImageSource, Normalizer};
use crate::registry::EnrolledReference;
use crate::score::similarity;
use crate::trace::{trace_event, trace_span};
use crate::util::{PrintMatchError, PrintMatchResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Default decision threshold in score points.
pub const DEFAULT_THRESHOLD: f64 = 70.0;
/// Default canonical grid width in samples.
pub const DEFAULT_CANONICAL_WIDTH: u32 = 200;
/// Default canonical grid height in samples.
pub const DEFAULT_CANONICAL_HEIGHT: u32 = 200;

/// Configuration for the matching process.
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// Minimum similarity score for a positive authentication decision.
    pub threshold: f64,
    /// Canonical grid width every image is normalized to.
    pub canonical_width: u32,
    /// Canonical grid height every image is normalized to.
    pub canonical_height: u32,
    /// Normalize and score references in parallel. Requires the `rayon`
    /// feature; ignored otherwise.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            canonical_width: DEFAULT_CANONICAL_WIDTH,
            canonical_height: DEFAULT_CANONICAL_HEIGHT,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Validates the threshold range and canonical dimensions.
    pub fn validate(&self) -> PrintMatchResult<()> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(PrintMatchError::InvalidThreshold {
                value: self.threshold,
            });
        }
        if self.canonical_width == 0 || self.canonical_height == 0 {
            return Err(PrintMatchError::InvalidDimensions {
                width: self.canonical_width,
                height: self.canonical_height,
            });
        }
        Ok(())
    }
}

/// Why an outcome carries (or lacks) a matched id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    /// No references were enrolled at call time.
    NoReferences,
    /// References were scanned but none scored above zero.
    NoMatch,
    /// A best-scoring reference was selected.
    Matched,
}

/// A reference excluded from scoring because it failed to normalize.
#[derive(Debug, PartialEq)]
pub struct SkippedReference {
    /// Id of the excluded reference.
    pub id: String,
    /// The failure that excluded it.
    pub error: PrintMatchError,
}

/// Outcome of identifying a query against a reference set.
#[derive(Debug)]
pub struct MatchOutcome {
    /// Id of the best-scoring reference. Absent when the reference set was
    /// empty or nothing scored above zero.
    pub matched_id: Option<String>,
    /// Best similarity score seen, in [0, 100].
    pub score: f64,
    /// True iff `score >= threshold`; an empty reference set never
    /// authenticates.
    pub authenticated: bool,
    /// Distinguishes an empty reference set from a scanned one.
    pub status: MatchStatus,
    /// References excluded because they failed to normalize.
    pub skipped: Vec<SkippedReference>,
}

/// Coarse holistic matcher over normalized intensity grids.
pub struct Matcher {
    config: MatchConfig,
    normalizer: Normalizer,
}

impl Matcher {
    /// Creates a matcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MatchConfig::default()).expect("default config is valid")
    }

    /// Creates a matcher with a validated configuration.
    pub fn with_config(config: MatchConfig) -> PrintMatchResult<Self> {
        config.validate()?;
        let normalizer = Normalizer::new(config.canonical_width, config.canonical_height)?;
        Ok(Self { config, normalizer })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Normalizes one image at the matcher's canonical dimensions.
    ///
    /// Exposed so collaborators can precompute grids at enrollment time.
    pub fn normalize(&self, source: &ImageSource) -> PrintMatchResult<NormalizedGrid> {
        self.normalizer.normalize(source)
    }

    /// Scores two images against each other.
    pub fn compare(&self, a: &ImageSource, b: &ImageSource) -> PrintMatchResult<f64> {
        let grid_a = self.normalizer.normalize(a)?;
        let grid_b = self.normalizer.normalize(b)?;
        similarity(&grid_a, &grid_b)
    }

    /// Finds the best-scoring reference for `query` and applies the
    /// decision threshold.
    ///
    /// The query is normalized once; a query failure fails the whole call.
    /// Reference failures are reported in [`MatchOutcome::skipped`] and
    /// never abort the scan or masquerade as zero scores.
    pub fn identify(
        &self,
        query: &ImageSource,
        references: &[EnrolledReference],
    ) -> PrintMatchResult<MatchOutcome> {
        let _span = trace_span!("identify", references = references.len()).entered();

        if references.is_empty() {
            return Ok(MatchOutcome {
                matched_id: None,
                score: 0.0,
                authenticated: false,
                status: MatchStatus::NoReferences,
                skipped: Vec::new(),
            });
        }

        let query_grid = self.normalizer.normalize(query)?;
        let scored = self.score_references(&query_grid, references);

        let mut best: Option<usize> = None;
        let mut best_score = 0.0f64;
        let mut skipped = Vec::new();
        for (idx, result) in scored.into_iter().enumerate() {
            match result {
                // Strict comparison: the earliest reference wins ties, and
                // a score of exactly zero never becomes a match.
                Ok(score) if score > best_score => {
                    best_score = score;
                    best = Some(idx);
                }
                Ok(_) => {}
                Err(error) => skipped.push(SkippedReference {
                    id: references[idx].id().to_string(),
                    error,
                }),
            }
        }

        let status = match best {
            Some(_) => MatchStatus::Matched,
            None => MatchStatus::NoMatch,
        };
        let matched_id = best.map(|idx| references[idx].id().to_string());
        let authenticated = best_score >= self.config.threshold;

        trace_event!(
            "identify_result",
            score = best_score,
            skipped = skipped.len(),
            matched = matched_id.is_some()
        );

        Ok(MatchOutcome {
            matched_id,
            score: best_score,
            authenticated,
            status,
            skipped,
        })
    }

    /// Normalizes and scores every reference, preserving input order.
    ///
    /// The parallel path is a pure indexed map; the caller's sequential
    /// reduction over the returned vector is what keeps the tie-break
    /// deterministic regardless of completion order.
    fn score_references(
        &self,
        query: &NormalizedGrid,
        references: &[EnrolledReference],
    ) -> Vec<PrintMatchResult<f64>> {
        #[cfg(feature = "rayon")]
        if self.config.parallel {
            return references
                .par_iter()
                .map(|reference| self.score_reference(query, reference))
                .collect();
        }

        references
            .iter()
            .map(|reference| self.score_reference(query, reference))
            .collect()
    }

    fn score_reference(
        &self,
        query: &NormalizedGrid,
        reference: &EnrolledReference,
    ) -> PrintMatchResult<f64> {
        let grid = self.normalizer.normalize(reference.image())?;
        similarity(query, &grid)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}
