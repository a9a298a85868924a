use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::matches::{collect_matches, MatchRecord};
use super::summary::CharacterSummary;
use crate::data::ReferenceData;
use crate::models::{BattleFile, FormStats};

/// Everything seen for one character across all loaded files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAggregate {
    pub name: String,
    pub character_id: String,
    /// Team names this character played under, sorted.
    pub teams: Vec<String>,
    #[serde(flatten)]
    pub summary: CharacterSummary,
    pub matches: Vec<MatchRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<FormAggregate>,
}

/// Per-form totals for a transforming character, keyed by form id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAggregate {
    pub form_id: String,
    pub form_name: String,
    pub appearances: u32,
    pub active_appearances: u32,
    pub total_damage: i64,
    pub total_damage_taken: i64,
    pub total_battle_time: f64,
    pub total_kills: i64,
    pub total_special_moves: i64,
    pub avg_damage: f64,
    pub dps: f64,
}

impl FormAggregate {
    fn with(mut self, form: &FormStats) -> Self {
        let c = &form.counters;
        self.appearances += 1;
        if c.battle_time > 0.0 {
            self.active_appearances += 1;
        }
        self.total_damage += c.damage_done;
        self.total_damage_taken += c.damage_taken;
        self.total_battle_time += c.battle_time;
        self.total_kills += c.kills;
        self.total_special_moves += c.special_moves_used;
        self
    }

    fn finish(mut self) -> Self {
        let n = if self.active_appearances > 0 {
            self.active_appearances
        } else {
            self.appearances
        };
        if n > 0 {
            self.avg_damage = self.total_damage as f64 / n as f64;
        }
        if self.total_battle_time > 0.0 {
            self.dps = self.total_damage as f64 / self.total_battle_time;
        }
        self
    }
}

/// Aggregate every character slot in every file, keyed by the original
/// (pre-transformation) form so a mid-match transformation stays one identity.
///
/// Sorted by performance score; scores within 0.1 of each other are ordered
/// by average damage, and damage within 1000 by match count.
pub fn character_aggregates(files: &[BattleFile], refs: &ReferenceData) -> Vec<CharacterAggregate> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<MatchRecord>> = HashMap::new();

    for snapshot in collect_matches(files, refs) {
        for record in snapshot.records {
            let key = record.character_key().to_string();
            grouped
                .entry(key)
                .or_insert_with_key(|k| {
                    order.push(k.clone());
                    Vec::new()
                })
                .push(record);
        }
    }

    let mut aggregates: Vec<CharacterAggregate> = order
        .into_iter()
        .filter_map(|key| grouped.remove(&key).map(|records| build_aggregate(key, records, refs)))
        .collect();

    rank(&mut aggregates);
    log::debug!("Aggregated {} character(s)", aggregates.len());
    aggregates
}

fn build_aggregate(name: String, matches: Vec<MatchRecord>, refs: &ReferenceData) -> CharacterAggregate {
    let summary = CharacterSummary::from_appearances(matches.iter().map(|m| (&m.stats, m.won)));
    let teams: BTreeSet<String> = matches.iter().filter_map(|m| m.team.clone()).collect();
    let character_id = matches
        .first()
        .map(|m| m.stats.character_id.clone())
        .unwrap_or_default();

    CharacterAggregate {
        name,
        character_id,
        teams: teams.into_iter().collect(),
        summary,
        forms: form_aggregates(&matches, refs),
        matches,
    }
}

fn form_aggregates(matches: &[MatchRecord], refs: &ReferenceData) -> Vec<FormAggregate> {
    let mut forms: Vec<FormAggregate> = Vec::new();
    for form in matches.iter().flat_map(|m| m.forms.iter()) {
        match forms.iter_mut().find(|f| f.form_id == form.form_id) {
            Some(existing) => *existing = std::mem::take(existing).with(form),
            None => {
                let fresh = FormAggregate {
                    form_id: form.form_id.clone(),
                    form_name: refs.characters.display_name(&form.form_id),
                    ..Default::default()
                };
                forms.push(fresh.with(form));
            }
        }
    }
    forms.into_iter().map(FormAggregate::finish).collect()
}

const SCORE_TIE: f64 = 0.1;
const DAMAGE_TIE: f64 = 1000.0;
const EPSILON: f64 = 1e-9;

/// Score descending; a run of scores within `SCORE_TIE` of its highest member
/// is ordered by average damage (same idea, `DAMAGE_TIE`), then match count.
fn rank(aggregates: &mut [CharacterAggregate]) {
    sort_in_runs(
        aggregates,
        |a| a.summary.averages.combat_performance_score,
        SCORE_TIE,
        |run| {
            sort_in_runs(run, |a| a.summary.averages.avg_damage, DAMAGE_TIE, |run| {
                run.sort_by(|a, b| b.summary.totals.match_count.cmp(&a.summary.totals.match_count))
            })
        },
    );
}

/// Sorts `items` by `key` descending, then hands each run of items within
/// `window` of the run's first member to `within`.
fn sort_in_runs<T>(
    items: &mut [T],
    key: impl Fn(&T) -> f64,
    window: f64,
    mut within: impl FnMut(&mut [T]),
) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
    let mut start = 0;
    while start < items.len() {
        let lead = key(&items[start]);
        let mut end = start + 1;
        while end < items.len() && lead - key(&items[end]) <= window + EPSILON {
            end += 1;
        }
        within(&mut items[start..end]);
        start = end;
    }
}
