use serde_json::Value;

use crate::models::{FormStats, SnapshotIndex};
use crate::parser::extract::{hp_gauge, read_counters};

/// Split a character's end-of-match totals into per-form increments.
///
/// `characterIdRecord` holds a snapshot of the cumulative counters taken as
/// the character left each form, keyed by that form's id. With a chain
/// `[original, f1, .., fn]`:
/// - the first form is the original's snapshot as-is,
/// - a middle form is `snapshot[f_i] - snapshot[f_{i-1}]`,
/// - the final form is the live record minus the last snapshot.
///
/// No transformations yields one synthetic form covering the whole record.
/// Without any snapshots nothing can be computed and the result is empty.
/// A form whose snapshot is missing is skipped; the rest are still returned.
pub fn calculate_per_form_stats(
    record: &Value,
    snapshots: &SnapshotIndex,
    form_change_history: &[String],
    original_character_id: &str,
) -> Vec<FormStats> {
    if form_change_history.is_empty() {
        let (hp, hp_max) = hp_gauge(record);
        return vec![FormStats {
            form_number: 1,
            form_id: original_character_id.to_string(),
            is_first_form: true,
            is_final_form: true,
            counters: read_counters(record),
            hp_gauge_value: hp,
            hp_gauge_value_max: hp_max,
        }];
    }

    if snapshots.is_empty() {
        log::warn!(
            "No characterIdRecord snapshots for {} ({} transformation(s)), per-form stats unavailable",
            original_character_id,
            form_change_history.len()
        );
        return Vec::new();
    }

    let chain: Vec<&str> = std::iter::once(original_character_id)
        .chain(form_change_history.iter().map(String::as_str))
        .collect();
    let last = chain.len() - 1;

    let snapshot = |id: &str| {
        let found = snapshots.get(id);
        if found.is_none() {
            log::warn!(
                "Missing snapshot for form {} of {}, skipping that form",
                id,
                original_character_id
            );
        }
        found
    };

    let mut forms = Vec::with_capacity(chain.len());
    for (i, &form_id) in chain.iter().enumerate() {
        let computed = if i == 0 {
            snapshot(form_id).map(|s| (read_counters(s), hp_gauge(s)))
        } else if i == last {
            snapshot(chain[i - 1])
                .map(|prev| (read_counters(record).delta(&read_counters(prev)), hp_gauge(record)))
        } else {
            match (snapshot(form_id), snapshot(chain[i - 1])) {
                (Some(cur), Some(prev)) => {
                    Some((read_counters(cur).delta(&read_counters(prev)), hp_gauge(cur)))
                }
                _ => None,
            }
        };

        if let Some((counters, (hp, hp_max))) = computed {
            forms.push(FormStats {
                form_number: i + 1,
                form_id: form_id.to_string(),
                is_first_form: i == 0,
                is_final_form: i == last,
                counters,
                hp_gauge_value: hp,
                hp_gauge_value_max: hp_max,
            });
        }
    }
    forms
}
