use tracing::{debug, error};

use partdb_core::config::MatcherSettings;
use partdb_core::traits::KeyValueStore;
use partdb_core::types::Component;
use partdb_store::ComponentStore;

use crate::error::{MatchError, Result};
use crate::score::{score, MatchResult};

pub const DEFAULT_MIN_SCORE: u32 = 70;
/// Same-kind candidates beyond this many are not scored at all.
pub const CANDIDATE_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub min_score: u32,
    pub candidate_cap: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { min_score: DEFAULT_MIN_SCORE, candidate_cap: CANDIDATE_CAP }
    }
}

impl From<&MatcherSettings> for MatchOptions {
    fn from(settings: &MatcherSettings) -> Self {
        Self { min_score: settings.min_score, candidate_cap: settings.candidate_cap }
    }
}

impl MatchOptions {
    fn validate(&self) -> Result<()> {
        if self.min_score > 100 {
            return Err(MatchError::InvalidOptions(format!(
                "min_score must be within 0..=100, got {}",
                self.min_score
            )));
        }
        if self.candidate_cap == 0 {
            return Err(MatchError::InvalidOptions("candidate_cap must be at least 1".into()));
        }
        Ok(())
    }
}

/// Rank `candidates` as replacements for `target`.
///
/// Only candidates of the same kind and a different id are considered, and
/// of those only the first `candidate_cap` in input order are scored, so a
/// perfect match past the cap is never seen. Results below `min_score` are
/// dropped; the rest are sorted by descending score, ties keeping input
/// order.
pub fn try_find_equivalents(
    target: &Component,
    candidates: &[Component],
    options: &MatchOptions,
) -> Result<Vec<MatchResult>> {
    options.validate()?;

    let same_kind = candidates
        .iter()
        .filter(|c| c.id != target.id && c.kind == target.kind);
    let mut results: Vec<MatchResult> = same_kind
        .take(options.candidate_cap)
        .map(|candidate| score(target, candidate))
        .filter(|result| result.match_score >= options.min_score)
        .collect();
    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    debug!(
        target = %target.id,
        pool = candidates.len(),
        matches = results.len(),
        "ranked equivalents"
    );
    Ok(results)
}

/// Lenient form of [`try_find_equivalents`] with the default candidate cap:
/// any failure is logged and reported as no matches.
pub fn find_equivalents(
    target: &Component,
    candidates: &[Component],
    min_score: u32,
) -> Vec<MatchResult> {
    let options = MatchOptions { min_score, ..MatchOptions::default() };
    try_find_equivalents(target, candidates, &options).unwrap_or_else(|e| {
        error!(error = %e, target = %target.id, "error finding equivalent components");
        Vec::new()
    })
}

/// Resolve `id` (exact, then case-insensitive id or name) in `store` and rank
/// the rest of the stored collection against it.
pub fn find_equivalents_for_id<S: KeyValueStore>(
    store: &ComponentStore<S>,
    id: &str,
    options: &MatchOptions,
) -> Result<(Component, Vec<MatchResult>)> {
    let target = store
        .try_load_by_id(id)?
        .ok_or_else(|| MatchError::TargetNotFound(id.to_string()))?;
    let collection = store.try_load()?;
    let results = try_find_equivalents(&target, &collection, options)?;
    Ok((target, results))
}
