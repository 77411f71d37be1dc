use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Band, MixVersion, Problem, RecordError};
use crate::policy::{polarity, ComparePolicy, Polarity};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    #[error("invalid snapshot ({side}): health_score {value} outside 0-100")]
    InvalidSnapshot { side: &'static str, value: f64 },
}

/// Which way one band moved between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Improved,
    Regressed,
    Unchanged,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Improved => "improved",
            Direction::Regressed => "regressed",
            Direction::Unchanged => "unchanged",
        }
    }
}

/// Per-band result of one comparison. Only ever constructed by `compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandDelta {
    pub band: Band,
    /// Band level in the earlier snapshot, dB, 2-decimal precision.
    pub v1_db: f64,
    /// Band level in the later snapshot, dB, 2-decimal precision.
    pub v2_db: f64,
    pub delta_db: f64,
    pub direction: Direction,
    pub description: String,
}

/// Immutable result of comparing an earlier version (v1) to a later one (v2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDiff {
    pub v1_id: String,
    pub v2_id: String,
    pub v1_label: String,
    pub v2_label: String,
    /// `v2.health_score - v1.health_score`, 1-decimal precision.
    pub health_delta: f64,
    pub v1_health: f64,
    pub v2_health: f64,
    pub v1_problems_count: u32,
    pub v2_problems_count: u32,
    /// Categories present in v1 but gone in v2, sorted.
    pub resolved_problems: Vec<String>,
    /// Categories absent in v1 but present in v2, sorted.
    pub new_problems: Vec<String>,
    /// Categories in both whose severity dropped past the tie-break margin.
    pub improved_problems: Vec<String>,
    /// Categories in both whose severity rose past the tie-break margin.
    pub regressed_problems: Vec<String>,
    /// Exactly one entry per canonical band, in canonical order.
    pub band_deltas: Vec<BandDelta>,
    /// Width change, 3-decimal precision. None unless both sides measured it.
    pub stereo_delta: Option<f64>,
    /// Reference score change, 1-decimal precision. None unless both sides have one.
    pub reference_score_delta: Option<f64>,
    pub has_regressions: bool,
    pub summary: String,
}

impl VersionDiff {
    /// Canonical mapping form, mirror of [`MixVersion::to_value`].
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("VersionDiff always serializes")
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        serde_json::from_value(value).map_err(|source| RecordError::MalformedRecord {
            kind: "VersionDiff",
            source,
        })
    }
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Compare two snapshots under the default policy.
///
/// Argument order is authoritative: `v1` is "before", `v2` is "after". The
/// engine never reorders by timestamp, so a caller comparing against a
/// reference target (rather than a chronological predecessor) gets exactly
/// the orientation it asked for. Swapped arguments produce a valid but
/// inverted diff.
pub fn compare(v1: &MixVersion, v2: &MixVersion) -> Result<VersionDiff, CompareError> {
    compare_with(&ComparePolicy::default(), v1, v2)
}

/// Compare two snapshots under an explicit policy.
pub fn compare_with(
    policy: &ComparePolicy,
    v1: &MixVersion,
    v2: &MixVersion,
) -> Result<VersionDiff, CompareError> {
    validate(v1, "v1")?;
    validate(v2, "v2")?;

    let health_delta = round_to(v2.health_score - v1.health_score, 1);

    let sev1 = severity_by_category(&v1.problems);
    let sev2 = severity_by_category(&v2.problems);

    // BTreeMap keys iterate sorted, so all four lists come out lexicographic.
    let resolved_problems: Vec<String> = sev1
        .keys()
        .filter(|c| !sev2.contains_key(*c))
        .cloned()
        .collect();
    let new_problems: Vec<String> = sev2
        .keys()
        .filter(|c| !sev1.contains_key(*c))
        .cloned()
        .collect();

    let mut improved_problems = Vec::new();
    let mut regressed_problems = Vec::new();
    for (category, &s1) in &sev1 {
        if let Some(&s2) = sev2.get(category) {
            if s2 < s1 - policy.severity_margin {
                improved_problems.push(category.clone());
            } else if s2 > s1 + policy.severity_margin {
                regressed_problems.push(category.clone());
            }
        }
    }

    let band_deltas: Vec<BandDelta> = Band::ALL
        .iter()
        .map(|&band| band_delta(policy, band, v1, v2))
        .collect();

    let stereo_delta = match (v1.stereo_width, v2.stereo_width) {
        (Some(w1), Some(w2)) => Some(round_to(w2 - w1, 3)),
        _ => None,
    };
    let reference_score_delta = match (v1.reference_score, v2.reference_score) {
        (Some(r1), Some(r2)) => Some(round_to(r2 - r1, 1)),
        _ => None,
    };

    // Strict OR across five independent signals; no single one dominates.
    // Stereo narrowing flags a regression, but widening gets no symmetric
    // "improved" classification; only the raw delta is exposed.
    let any_band_regressed = band_deltas
        .iter()
        .any(|b| b.direction == Direction::Regressed);
    let has_regressions = health_delta < policy.health_regression_threshold
        || !new_problems.is_empty()
        || !regressed_problems.is_empty()
        || any_band_regressed
        || stereo_delta.is_some_and(|d| d < policy.stereo_regression_threshold);

    let summary = summarize(
        policy,
        v1,
        v2,
        health_delta,
        has_regressions,
        &resolved_problems,
        &new_problems,
        &regressed_problems,
    );

    Ok(VersionDiff {
        v1_id: v1.version_id.clone(),
        v2_id: v2.version_id.clone(),
        v1_label: v1.label.clone(),
        v2_label: v2.label.clone(),
        health_delta,
        v1_health: v1.health_score,
        v2_health: v2.health_score,
        v1_problems_count: v1.problems_count,
        v2_problems_count: v2.problems_count,
        resolved_problems,
        new_problems,
        improved_problems,
        regressed_problems,
        band_deltas,
        stereo_delta,
        reference_score_delta,
        has_regressions,
        summary,
    })
}

/// The only validation the engine performs. Band names, problem shapes, and
/// timestamp formats all pass through untouched.
fn validate(v: &MixVersion, side: &'static str) -> Result<(), CompareError> {
    if !(0.0..=100.0).contains(&v.health_score) {
        return Err(CompareError::InvalidSnapshot {
            side,
            value: v.health_score,
        });
    }
    Ok(())
}

/// Category -> severity. Duplicate categories collapse, later entry wins.
fn severity_by_category(problems: &[Problem]) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    for p in problems {
        map.insert(p.category.clone(), p.severity);
    }
    map
}

fn band_delta(policy: &ComparePolicy, band: Band, v1: &MixVersion, v2: &MixVersion) -> BandDelta {
    let v1_db = round_to(v1.band_level(band), 2);
    let v2_db = round_to(v2.band_level(band), 2);
    let delta_db = round_to(v2_db - v1_db, 2);

    let direction = if delta_db.abs() < policy.band_change_threshold {
        Direction::Unchanged
    } else {
        match (polarity(band), delta_db < 0.0) {
            (Polarity::LessIsBetter, true) | (Polarity::MoreIsBetter, false) => Direction::Improved,
            _ => Direction::Regressed,
        }
    };

    let description = match direction {
        Direction::Unchanged => format!("{} unchanged ({:+.1} dB)", band.name(), delta_db),
        _ => format!("{} {} ({:+.1} dB)", band.name(), direction.label(), delta_db),
    };

    BandDelta {
        band,
        v1_db,
        v2_db,
        delta_db,
        direction,
        description,
    }
}

/// One-line summary chosen by an ordered ladder. Order matters: the first
/// two branches both require a positive health delta and differ only by the
/// regression flag, so exactly one branch ever fires.
#[allow(clippy::too_many_arguments)]
fn summarize(
    policy: &ComparePolicy,
    v1: &MixVersion,
    v2: &MixVersion,
    health_delta: f64,
    has_regressions: bool,
    resolved: &[String],
    new: &[String],
    regressed: &[String],
) -> String {
    let clear_improvement =
        health_delta >= policy.clear_improvement_threshold && !has_regressions;
    let improved_with_regressions = health_delta > 0.0 && has_regressions;
    let health_regressed = health_delta < policy.health_regression_threshold;

    if clear_improvement {
        format!(
            "Clear improvement: health score {:.1} -> {:.1} ({:+.1}), {} problem(s) resolved",
            v1.health_score,
            v2.health_score,
            health_delta,
            resolved.len()
        )
    } else if improved_with_regressions {
        let culprits = if !regressed.is_empty() { regressed } else { new };
        let what = if culprits.is_empty() {
            "band or stereo balance".to_string()
        } else {
            culprits.join(", ")
        };
        format!(
            "Mixed results: health score up {:+.1} but regressions in {}",
            health_delta, what
        )
    } else if health_regressed {
        format!(
            "Regression: health score {:.1} -> {:.1} ({:+.1}), {} new problem(s)",
            v1.health_score,
            v2.health_score,
            health_delta,
            new.len()
        )
    } else {
        format!(
            "Minimal change: problems {} -> {}",
            v1.problems_count, v2.problems_count
        )
    }
}
