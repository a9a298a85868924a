use serde::Serialize;

use crate::data::ReferenceData;
use crate::forms::calculate_per_form_stats;
use crate::models::{BattleFile, BattleResult, CharacterStats, FormStats, Outcome, Position, Side};
use crate::parser::extract::extract_stats;
use crate::parser::normalizer::normalize_document;

/// One character's appearance in one match.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub file_name: String,
    pub slot_key: String,
    pub side: Option<Side>,
    pub slot: Option<u32>,
    /// Own team name; only set when both team names are present.
    pub team: Option<String>,
    pub opponent: Option<String>,
    pub won: bool,
    pub stats: CharacterStats,
    /// Per-form breakdown, present only for transforming characters in
    /// documents that carry snapshots.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<FormStats>,
}

impl MatchRecord {
    pub fn position(&self) -> Option<Position> {
        self.stats.position
    }

    /// Aggregation identity: the original form's display name, or its raw
    /// id when the character table doesn't know it.
    pub fn character_key(&self) -> &str {
        if self.stats.name == "-" && !self.stats.character_id.is_empty() {
            &self.stats.character_id
        } else {
            &self.stats.name
        }
    }
}

/// Every character appearance of one battle result.
#[derive(Debug, Clone)]
pub struct MatchSnapshot {
    pub file_name: String,
    pub outcome: Option<Outcome>,
    pub teams: Option<[String; 2]>,
    pub records: Vec<MatchRecord>,
}

impl MatchSnapshot {
    /// One side's records in slot order.
    pub fn side_records(&self, side: Side) -> Vec<&MatchRecord> {
        let mut records: Vec<&MatchRecord> =
            self.records.iter().filter(|r| r.side == Some(side)).collect();
        records.sort_by_key(|r| r.slot.unwrap_or(u32::MAX));
        records
    }
}

/// Normalize and extract every file. Files with an unrecognized schema
/// contribute nothing.
pub fn collect_matches(files: &[BattleFile], refs: &ReferenceData) -> Vec<MatchSnapshot> {
    let mut matches = Vec::new();
    for file in files {
        let results = normalize_document(&file.content);
        if results.is_empty() {
            log::debug!("Skipping {}: no battle result found", file.name);
        }
        for result in &results {
            matches.push(match_from_result(&file.name, result, refs));
        }
    }
    log::debug!("Collected {} match(es) from {} file(s)", matches.len(), files.len());
    matches
}

pub fn match_from_result(file_name: &str, result: &BattleResult, refs: &ReferenceData) -> MatchSnapshot {
    // Team association needs both names
    let named_teams = result
        .teams
        .as_ref()
        .filter(|t| t.iter().all(|name| !name.trim().is_empty()));

    let mut records = Vec::with_capacity(result.characters.len());
    for side in [Side::Ally, Side::Enemy] {
        let slots = result.side_slots(side);
        let team_size = slots.len();
        for (i, character) in slots.into_iter().enumerate() {
            let position = Position::from_index(i + 1, team_size);
            let stats = extract_stats(&character.node, refs, Some(position));
            let won = match result.outcome {
                Some(outcome) => outcome.side_won(side),
                None => stats.hp_gauge_value > 0.0,
            };
            let forms = per_form(&character.node, result, &stats);
            records.push(MatchRecord {
                file_name: file_name.to_string(),
                slot_key: character.key.clone(),
                side: Some(side),
                slot: character.slot.map(|s| s.slot),
                team: named_teams.map(|t| t[side.team_index()].clone()),
                opponent: named_teams.map(|t| t[side.opposite().team_index()].clone()),
                won,
                stats,
                forms,
            });
        }
    }

    // Keys without a side marker: no position, no team
    for character in result.characters.iter().filter(|c| c.slot.is_none()) {
        let stats = extract_stats(&character.node, refs, None);
        let forms = per_form(&character.node, result, &stats);
        records.push(MatchRecord {
            file_name: file_name.to_string(),
            slot_key: character.key.clone(),
            side: None,
            slot: None,
            team: None,
            opponent: None,
            won: stats.hp_gauge_value > 0.0,
            stats,
            forms,
        });
    }

    MatchSnapshot {
        file_name: file_name.to_string(),
        outcome: result.outcome,
        teams: result.teams.clone(),
        records,
    }
}

fn per_form(node: &serde_json::Value, result: &BattleResult, stats: &CharacterStats) -> Vec<FormStats> {
    if !stats.transformed() || result.snapshots.is_empty() {
        return Vec::new();
    }
    calculate_per_form_stats(node, &result.snapshots, &stats.form_change_keys, &stats.character_id)
}
