use crate::models::{BuildCategory, BuildComposition, BuildKind, CategoryBreakdown, CategoryShare};

const PURE_THRESHOLD: f64 = 75.0;
const FOCUSED_THRESHOLD: f64 = 45.0;
const DUAL_MAX_GAP: f64 = 20.0;
const DUAL_MIN_COMBINED: f64 = 65.0;

/// Classify an equipped-capsule cost distribution.
///
/// Categories are ranked by cost, descending. Equal costs keep the
/// category declaration order (Melee first, Utility last).
///
/// - no cost at all: `No Build`
/// - top category >= 75%: `Pure {cat}`
/// - top category >= 45%: `{cat}-Focused`
/// - top two within 20 points of each other and >= 65% together: `Dual: {a}/{b}`
/// - otherwise: `Balanced Hybrid`
pub fn classify_build(costs: &CategoryBreakdown<i64>) -> BuildComposition {
    let total: i64 = costs.iter().map(|(_, c)| c.max(0)).sum();
    if total <= 0 {
        return BuildComposition::no_build();
    }

    let mut ranked: Vec<(BuildCategory, i64, f64)> = costs
        .iter()
        .map(|(cat, cost)| {
            let cost = cost.max(0);
            (cat, cost, cost as f64 / total as f64 * 100.0)
        })
        .collect();
    // Stable: ties stay in declaration order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let breakdown: Vec<CategoryShare> = ranked
        .iter()
        .filter(|(_, cost, _)| *cost > 0)
        .map(|(cat, cost, pct)| CategoryShare {
            name: cat.as_str().to_string(),
            cost: *cost,
            percent: (pct * 10.0).round() / 10.0,
        })
        .collect();

    let (top, _, top_pct) = ranked[0];
    let (second, second_cost, second_pct) = ranked[1];
    let secondary = (second_cost > 0).then(|| second.as_str().to_string());

    let (primary, label, kind) = if top_pct >= PURE_THRESHOLD {
        (top.as_str().to_string(), format!("Pure {}", top), BuildKind::Pure)
    } else if top_pct >= FOCUSED_THRESHOLD {
        (top.as_str().to_string(), format!("{}-Focused", top), BuildKind::Focused)
    } else if top_pct - second_pct <= DUAL_MAX_GAP && top_pct + second_pct >= DUAL_MIN_COMBINED {
        (
            top.as_str().to_string(),
            format!("Dual: {}/{}", top, second),
            BuildKind::Dual,
        )
    } else {
        ("Hybrid".to_string(), "Balanced Hybrid".to_string(), BuildKind::Balanced)
    };

    BuildComposition {
        primary,
        secondary,
        label,
        kind,
        breakdown,
    }
}
