//! Pairwise interchangeability scoring.
//!
//! Every parameter present on either component contributes to a
//! `matched / total` point tally:
//!
//! | case                                   | total | matched          |
//! |----------------------------------------|-------|------------------|
//! | both numeric                           | 10    | 10 × similarity  |
//! | both text, equal ignoring case         | 10    | 10               |
//! | both present, otherwise different      | 10    | 2                |
//! | only one side has a value              | 5     | 0                |
//! | package, both present, equal           | 10    | 10               |
//! | package, both present, different       | 10    | 0                |
//!
//! The weights and the 0.9 reporting threshold are tuning constants, not
//! derived values.

use serde::Serialize;
use std::collections::BTreeSet;

use partdb_core::types::Component;
use partdb_core::value::{parse, SpecValue};

pub const SHARED_PARAMETER_POINTS: f64 = 10.0;
pub const TEXT_MISMATCH_POINTS: f64 = 2.0;
pub const ONE_SIDED_PARAMETER_POINTS: f64 = 5.0;
pub const PACKAGE_POINTS: f64 = 10.0;
/// Numeric pairs below this similarity are reported as differences.
pub const DIFFERENCE_THRESHOLD: f64 = 0.9;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const PACKAGE_PARAMETER: &str = "Package";

/// A parameter on which target (`original`) and candidate (`equivalent`)
/// diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub parameter: String,
    pub original: String,
    pub equivalent: String,
}

impl Difference {
    fn new(parameter: &str, original: &str, equivalent: &str) -> Self {
        Self {
            parameter: parameter.to_string(),
            original: original.to_string(),
            equivalent: equivalent.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub component: Component,
    /// 0..=100
    pub match_score: u32,
    pub differences: Vec<Difference>,
}

/// Square root of `min / max`, so close values score higher than their
/// plain ratio. Two negatives compare by absolute value; opposite signs, or
/// zero against non-zero, give 0.
#[allow(clippy::float_cmp)]
pub fn numeric_similarity(a: f64, b: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    let (a, b) = if a < 0.0 && b < 0.0 { (-a, -b) } else { (a, b) };
    if a <= 0.0 || b <= 0.0 {
        return 0.0;
    }
    (a.min(b) / a.max(b)).sqrt()
}

#[derive(Default)]
struct Tally {
    matched: f64,
    total: f64,
    differences: Vec<Difference>,
}

impl Tally {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn score(&self) -> u32 {
        if self.total > 0.0 {
            (self.matched / self.total * 100.0).round().clamp(0.0, 100.0) as u32
        } else {
            0
        }
    }
}

/// Score how well `candidate` can replace `target`.
///
/// Components of different kinds always score 0 with no differences.
/// `match_score` is symmetric under swapping the arguments; the difference
/// list is not, since a parameter only the candidate has is not reported.
pub fn score(target: &Component, candidate: &Component) -> MatchResult {
    if target.kind != candidate.kind {
        return MatchResult {
            component: candidate.clone(),
            match_score: 0,
            differences: Vec::new(),
        };
    }

    let mut tally = Tally::default();
    let parameters: BTreeSet<&str> = target
        .specifications
        .keys()
        .chain(candidate.specifications.keys())
        .map(String::as_str)
        .collect();

    for parameter in parameters {
        match (target.spec(parameter), candidate.spec(parameter)) {
            (Some(original), Some(equivalent)) => {
                tally.total += SHARED_PARAMETER_POINTS;
                match (parse(original), parse(equivalent)) {
                    (
                        SpecValue::Numeric { magnitude: a, .. },
                        SpecValue::Numeric { magnitude: b, .. },
                    ) => {
                        let similarity = numeric_similarity(a, b);
                        tally.matched += similarity * SHARED_PARAMETER_POINTS;
                        if similarity < DIFFERENCE_THRESHOLD {
                            tally
                                .differences
                                .push(Difference::new(parameter, original, equivalent));
                        }
                    }
                    _ if original.to_lowercase() == equivalent.to_lowercase() => {
                        tally.matched += SHARED_PARAMETER_POINTS;
                    }
                    _ => {
                        tally.matched += TEXT_MISMATCH_POINTS;
                        tally
                            .differences
                            .push(Difference::new(parameter, original, equivalent));
                    }
                }
            }
            (Some(original), None) => {
                tally.total += ONE_SIDED_PARAMETER_POINTS;
                tally.differences.push(Difference::new(parameter, original, NOT_SPECIFIED));
            }
            (None, Some(_)) => tally.total += ONE_SIDED_PARAMETER_POINTS,
            // Listed with an empty value on both sides.
            (None, None) => {}
        }
    }

    if let (Some(original), Some(equivalent)) = (target.package(), candidate.package()) {
        tally.total += PACKAGE_POINTS;
        if original.to_lowercase() == equivalent.to_lowercase() {
            tally.matched += PACKAGE_POINTS;
        } else {
            tally.differences.push(Difference::new(PACKAGE_PARAMETER, original, equivalent));
        }
    }

    MatchResult {
        component: candidate.clone(),
        match_score: tally.score(),
        differences: tally.differences,
    }
}
