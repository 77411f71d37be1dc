use serde::Deserialize;

use crate::model::Band;

/// Which way a band's energy should move to count as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Band gets muddy when excessive; less energy is an improvement.
    LessIsBetter,
    /// Presence band; more energy is an improvement.
    MoreIsBetter,
}

/// Polarity lookup for the canonical bands. The low end (`sub`, `low`,
/// `low_mid`) is prone to buildup, so energy coming down there reads as
/// an improvement; everywhere else added presence reads as an improvement.
pub fn polarity(band: Band) -> Polarity {
    match band {
        Band::Sub | Band::Low | Band::LowMid => Polarity::LessIsBetter,
        Band::Mid | Band::HighMid | Band::High | Band::Air => Polarity::MoreIsBetter,
    }
}

/// Thresholds of the comparison policy.
///
/// All fields have defaults, and the `[policy]` table of the config file
/// may override any subset of them. Tests probe boundary behavior through
/// these rather than hardcoded literals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComparePolicy {
    /// A problem's severity must move by more than this before it counts
    /// as improved or regressed. Guards against noise in severity scoring.
    pub severity_margin: f64,
    /// Health deltas below this flag the comparison as a regression.
    pub health_regression_threshold: f64,
    /// Band deltas smaller than this (absolute dB) read as unchanged.
    pub band_change_threshold: f64,
    /// Stereo width deltas below this flag the comparison as a regression.
    pub stereo_regression_threshold: f64,
    /// Health must rise by at least this much (with no regressions) for
    /// the summary to call the move a clear improvement.
    pub clear_improvement_threshold: f64,
}

impl Default for ComparePolicy {
    fn default() -> Self {
        Self {
            severity_margin: 0.5,
            health_regression_threshold: -3.0,
            band_change_threshold: 1.0,
            stereo_regression_threshold: -0.05,
            clear_improvement_threshold: 5.0,
        }
    }
}
