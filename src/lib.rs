//! PrintMatch is a holistic fingerprint-image similarity library.
//!
//! Images are decoded and normalized to a fixed-size grayscale intensity
//! grid, compared with an L1 similarity score in [0, 100], and matched
//! against an enrolled reference set with a configurable decision
//! threshold. Reference scoring can run in parallel via the `rayon`
//! feature without changing results.
//!
//! The score measures whole-image pixel agreement after resampling. It is
//! a demonstration metric, not minutiae-based fingerprint recognition.

pub mod grid;
pub mod matcher;
pub mod normalize;
pub mod registry;
pub mod score;
mod trace;
pub mod util;

pub use grid::NormalizedGrid;
pub use matcher::{
    MatchConfig, MatchOutcome, MatchStatus, Matcher, SkippedReference, DEFAULT_CANONICAL_HEIGHT,
    DEFAULT_CANONICAL_WIDTH, DEFAULT_THRESHOLD,
};
pub use normalize::{ImageSource, Normalizer};
pub use registry::{EnrolledReference, ReferenceRegistry};
pub use score::{similarity, similarity_samples};
pub use util::{PrintMatchError, PrintMatchResult};
