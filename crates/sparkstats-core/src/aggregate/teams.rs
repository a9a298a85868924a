use std::collections::BTreeMap;

use serde::Serialize;

use super::matches::{collect_matches, MatchRecord, MatchSnapshot};
use super::summary::{damage_efficiency, CharacterSummary};
use crate::data::ReferenceData;
use crate::models::{BattleFile, Side};

/// Headline figures are taken from this many of a team's best characters.
pub const TOP_CHARACTER_COUNT: usize = 5;

const PLACEHOLDER_TEAM_NAMES: [&str; 3] = ["unknown", "undefined", "null"];

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupRecord {
    pub character: String,
    pub opponent_character: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
}

/// Head-to-head record against one opposing team.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentRecord {
    pub wins: u32,
    pub losses: u32,
    /// Keyed `{character}_vs_{opponent character}`, paired by roster slot.
    pub character_matchups: BTreeMap<String, MatchupRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAggregate {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub matches: u32,
    pub win_rate: f64,
    pub character_details: BTreeMap<String, Vec<MatchRecord>>,
    pub character_averages: BTreeMap<String, CharacterSummary>,
    pub opponent_records: BTreeMap<String, OpponentRecord>,
    /// Best characters by performance score; the headline figures below
    /// cover these only, not the whole roster.
    pub top5_characters: Vec<String>,
    pub avg_damage_per_match: f64,
    pub avg_damage_taken_per_match: f64,
    pub avg_kills_per_match: f64,
    pub damage_efficiency: f64,
    pub avg_performance_score: f64,
    pub avg_health_retention: f64,
}

/// A team name usable as an identity: not blank and not a placeholder.
pub fn is_valid_team_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && !PLACEHOLDER_TEAM_NAMES
            .iter()
            .any(|p| name.eq_ignore_ascii_case(p))
}

/// Per-team records over every file with both a `teams` pair and an outcome.
///
/// A side with an invalid name is skipped while the other side is still
/// counted. Sorted by win rate, then matches played, then damage efficiency.
pub fn team_aggregates(files: &[BattleFile], refs: &ReferenceData) -> Vec<TeamAggregate> {
    let mut teams: BTreeMap<String, TeamAggregate> = BTreeMap::new();

    for snapshot in collect_matches(files, refs) {
        let (Some(outcome), Some(names)) = (snapshot.outcome, snapshot.teams.as_ref()) else {
            continue;
        };
        if !names.iter().any(|n| is_valid_team_name(n)) {
            log::debug!("Skipping {}: no valid team names", snapshot.file_name);
            continue;
        }

        for side in [Side::Ally, Side::Enemy] {
            let name = names[side.team_index()].trim();
            if !is_valid_team_name(name) {
                continue;
            }
            let opponent = names[side.opposite().team_index()].trim();
            let won = outcome.side_won(side);

            let team = teams.entry(name.to_string()).or_insert_with(|| TeamAggregate {
                name: name.to_string(),
                ..Default::default()
            });
            record_side(team, &snapshot, side, won, opponent);
        }
    }

    let mut aggregates: Vec<TeamAggregate> = teams.into_values().map(finish).collect();
    aggregates.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| b.matches.cmp(&a.matches))
            .then_with(|| b.damage_efficiency.total_cmp(&a.damage_efficiency))
    });
    log::debug!("Aggregated {} team(s)", aggregates.len());
    aggregates
}

fn record_side(team: &mut TeamAggregate, snapshot: &MatchSnapshot, side: Side, won: bool, opponent: &str) {
    team.matches += 1;
    if won {
        team.wins += 1;
    } else {
        team.losses += 1;
    }

    let own = snapshot.side_records(side);
    for record in &own {
        let mut record = (*record).clone();
        record.won = won;
        team.character_details
            .entry(record.character_key().to_string())
            .or_default()
            .push(record);
    }

    if !is_valid_team_name(opponent) {
        return;
    }
    let versus = team.opponent_records.entry(opponent.to_string()).or_default();
    if won {
        versus.wins += 1;
    } else {
        versus.losses += 1;
    }

    let theirs = snapshot.side_records(side.opposite());
    for (mine, other) in own.iter().zip(theirs.iter()) {
        let character = mine.character_key();
        let opponent_character = other.character_key();
        let matchup = versus
            .character_matchups
            .entry(format!("{}_vs_{}", character, opponent_character))
            .or_insert_with(|| MatchupRecord {
                character: character.to_string(),
                opponent_character: opponent_character.to_string(),
                ..Default::default()
            });
        matchup.matches += 1;
        if won {
            matchup.wins += 1;
        } else {
            matchup.losses += 1;
        }
    }
}

fn finish(mut team: TeamAggregate) -> TeamAggregate {
    team.win_rate = if team.matches > 0 {
        team.wins as f64 / team.matches as f64 * 100.0
    } else {
        0.0
    };

    team.character_averages = team
        .character_details
        .iter()
        .map(|(name, records)| {
            let summary =
                CharacterSummary::from_appearances(records.iter().map(|r| (&r.stats, r.won)));
            (name.clone(), summary)
        })
        .collect();

    let mut ranked: Vec<(&String, &CharacterSummary)> = team.character_averages.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.averages
            .combat_performance_score
            .total_cmp(&a.1.averages.combat_performance_score)
    });
    ranked.truncate(TOP_CHARACTER_COUNT);

    let top = ranked.len();
    let sum = |f: fn(&CharacterSummary) -> f64| ranked.iter().map(|(_, s)| f(s)).sum::<f64>();
    let damage = sum(|s| s.averages.avg_damage);
    let taken = sum(|s| s.averages.avg_damage_taken);

    team.avg_damage_per_match = damage;
    team.avg_damage_taken_per_match = taken;
    team.avg_kills_per_match = sum(|s| s.averages.avg_kills);
    team.damage_efficiency = damage_efficiency(damage, taken);
    if top > 0 {
        team.avg_performance_score = sum(|s| s.averages.combat_performance_score) / top as f64;
        team.avg_health_retention = sum(|s| s.averages.health_retention) / top as f64;
    }
    team.top5_characters = ranked.iter().map(|(name, _)| (*name).clone()).collect();
    team
}
