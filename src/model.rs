use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("malformed {kind} record: {source}")]
    MalformedRecord {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The seven canonical frequency bands, in canonical order.
///
/// Serialized as snake_case strings ("sub", "low_mid", ...) — the same keys
/// the upstream analysis pipeline uses in `spectral_bands`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Sub,
    Low,
    LowMid,
    Mid,
    HighMid,
    High,
    Air,
}

impl Band {
    /// All bands in canonical order. Band deltas are always emitted in this order.
    pub const ALL: [Band; 7] = [
        Band::Sub,
        Band::Low,
        Band::LowMid,
        Band::Mid,
        Band::HighMid,
        Band::High,
        Band::Air,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Band::Sub => "sub",
            Band::Low => "low",
            Band::LowMid => "low_mid",
            Band::Mid => "mid",
            Band::HighMid => "high_mid",
            Band::High => "high",
            Band::Air => "air",
        }
    }
}

/// One detected mix issue: a category tag plus a numeric severity.
/// Extra keys from the analysis pipeline are tolerated and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub category: String,
    #[serde(default)]
    pub severity: f64,
}

/// One immutable analysis snapshot of a mix.
///
/// Produced by the upstream analysis pipeline; consumed read-only by the
/// comparison engine. Any "update" is a new snapshot, never a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixVersion {
    pub version_id: String,
    /// Sortable ISO-8601 timestamp. History scans order by lexicographic
    /// comparison of this string, so the format must sort chronologically.
    pub timestamp: String,
    #[serde(default)]
    pub genre: String,
    /// Informational only; the engine never touches the file.
    #[serde(default)]
    pub file_path: String,
    /// Overall mix quality, 0-100. The only field the engine validates.
    pub health_score: f64,
    #[serde(default)]
    pub reference_score: Option<f64>,
    pub problems_count: u32,
    #[serde(default)]
    pub problems: Vec<Problem>,
    /// Band name -> RMS level in dB. Bands missing here read as 0.0 dB.
    #[serde(default)]
    pub spectral_bands: BTreeMap<String, f64>,
    /// Dynamics metrics, opaque to the engine. Carried through serialization.
    #[serde(default)]
    pub dynamics: BTreeMap<String, f64>,
    /// Stereo width in 0-1. None means mono or not measured.
    #[serde(default)]
    pub stereo_width: Option<f64>,
    /// Display name only, may be empty.
    #[serde(default)]
    pub label: String,
}

impl MixVersion {
    /// dB level for one canonical band, 0.0 when the snapshot lacks it.
    pub fn band_level(&self, band: Band) -> f64 {
        self.spectral_bands.get(band.name()).copied().unwrap_or(0.0)
    }

    /// Canonical mapping form for persistence collaborators.
    /// Optional fields serialize as explicit null when absent.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("MixVersion always serializes")
    }

    /// Inverse of [`to_value`]. Fails if a required field (`version_id`,
    /// `timestamp`, `health_score`, `problems_count`) is missing or not
    /// coercible; optional fields default instead of failing.
    ///
    /// [`to_value`]: MixVersion::to_value
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        serde_json::from_value(value).map_err(|source| RecordError::MalformedRecord {
            kind: "MixVersion",
            source,
        })
    }
}
