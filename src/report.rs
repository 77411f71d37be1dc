use std::fmt::Write;

use crate::compare::{Direction, VersionDiff};
use crate::model::MixVersion;

/// Render a full diff as terminal text: header, health move, problem sets,
/// band table, stereo/reference deltas, summary line.
pub fn render_diff(diff: &VersionDiff) -> String {
    let mut out = String::new();

    let name = |id: &str, label: &str| {
        if label.is_empty() {
            id.to_string()
        } else {
            format!("{id} ({label})")
        }
    };
    let _ = writeln!(
        out,
        "{} -> {}",
        name(&diff.v1_id, &diff.v1_label),
        name(&diff.v2_id, &diff.v2_label)
    );
    let _ = writeln!(
        out,
        "Health: {:.1} -> {:.1} ({:+.1})",
        diff.v1_health, diff.v2_health, diff.health_delta
    );
    let _ = writeln!(
        out,
        "Problems: {} -> {}",
        diff.v1_problems_count, diff.v2_problems_count
    );

    let mut problem_line = |title: &str, categories: &[String]| {
        if !categories.is_empty() {
            let _ = writeln!(out, "  {title}: {}", categories.join(", "));
        }
    };
    problem_line("resolved", &diff.resolved_problems);
    problem_line("new", &diff.new_problems);
    problem_line("improved", &diff.improved_problems);
    problem_line("regressed", &diff.regressed_problems);

    let _ = writeln!(out, "Bands:");
    for band in &diff.band_deltas {
        let marker = match band.direction {
            Direction::Improved => "+",
            Direction::Regressed => "!",
            Direction::Unchanged => " ",
        };
        let _ = writeln!(
            out,
            "  {marker} {:<8} {:>7.2} -> {:>7.2} dB ({:+.2})",
            band.band.name(),
            band.v1_db,
            band.v2_db,
            band.delta_db
        );
    }

    if let Some(delta) = diff.stereo_delta {
        let _ = writeln!(out, "Stereo width: {delta:+.3}");
    }
    if let Some(delta) = diff.reference_score_delta {
        let _ = writeln!(out, "Reference score: {delta:+.1}");
    }

    let _ = writeln!(out, "{}", diff.summary);
    out
}

/// Chronological listing: one line per version with its health score and
/// the step from the previous version.
pub fn render_timeline(sorted: &[MixVersion]) -> String {
    let mut out = String::new();
    let mut previous: Option<&MixVersion> = None;
    for v in sorted {
        let step = match previous {
            Some(p) => format!("{:+.1}", v.health_score - p.health_score),
            None => "     ".to_string(),
        };
        let label = if v.label.is_empty() {
            String::new()
        } else {
            format!("  {}", v.label)
        };
        let _ = writeln!(
            out,
            "{}  {:<12} {:>5.1} {step}{label}",
            pretty_timestamp(&v.timestamp),
            v.version_id,
            v.health_score
        );
        previous = Some(v);
    }
    out
}

/// Compact `YYYY-MM-DD HH:MM` when the timestamp parses as RFC 3339,
/// the raw string otherwise.
fn pretty_timestamp(ts: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => ts.to_string(),
    }
}
