use crate::compare::{compare_with, CompareError, VersionDiff};
use crate::model::MixVersion;
use crate::policy::ComparePolicy;

/// Stable sort by timestamp, ascending. Timestamps are compared as strings,
/// so callers must supply a lexicographically sortable format (ISO-8601).
/// Exposed standalone for reporting code that wants the ordering without
/// running any comparisons.
pub fn sort_chronologically(mut versions: Vec<MixVersion>) -> Vec<MixVersion> {
    versions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    versions
}

/// Scan a version history for regressions under the default policy.
pub fn find_regressions(versions: Vec<MixVersion>) -> Result<Vec<VersionDiff>, CompareError> {
    find_regressions_with(&ComparePolicy::default(), versions)
}

/// Sorts the snapshots chronologically, compares each adjacent pair, and
/// returns only the diffs flagged as regressions, in chronological order of
/// the later snapshot. Zero or one snapshots yield an empty result without
/// attempting any comparison.
pub fn find_regressions_with(
    policy: &ComparePolicy,
    versions: Vec<MixVersion>,
) -> Result<Vec<VersionDiff>, CompareError> {
    let sorted = sort_chronologically(versions);
    let mut flagged = Vec::new();
    for pair in sorted.windows(2) {
        let diff = compare_with(policy, &pair[0], &pair[1])?;
        if diff.has_regressions {
            log::debug!(
                "regression between {} and {}: {}",
                diff.v1_id,
                diff.v2_id,
                diff.summary
            );
            flagged.push(diff);
        }
    }
    Ok(flagged)
}
