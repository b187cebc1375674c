//! Component equivalence matching.
//!
//! [`score`] compares two components of the same kind; [`try_find_equivalents`]
//! ranks a candidate pool against a target.
pub mod equivalents;
pub mod error;
pub mod score;

pub use equivalents::{
    find_equivalents, find_equivalents_for_id, try_find_equivalents, MatchOptions, CANDIDATE_CAP,
    DEFAULT_MIN_SCORE,
};
pub use error::MatchError;
pub use score::{numeric_similarity, score, Difference, MatchResult};
