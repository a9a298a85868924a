//! Flat CSV projections of the aggregates: one row per character for the
//! averages sheet, one row per appearance for the match-details sheet.

use std::io::Write;

use serde::Serialize;

use crate::aggregate::CharacterAggregate;
use crate::error::Result;
use crate::parser::duration::format_battle_time;

#[derive(Debug, Serialize)]
struct CharacterAverageRow<'a> {
    #[serde(rename = "Character")]
    character: &'a str,
    #[serde(rename = "Matches")]
    matches: u32,
    #[serde(rename = "Active Matches")]
    active_matches: u32,
    #[serde(rename = "Wins")]
    wins: u32,
    #[serde(rename = "Losses")]
    losses: u32,
    #[serde(rename = "Win Rate %")]
    win_rate: f64,
    #[serde(rename = "Avg Damage")]
    avg_damage: f64,
    #[serde(rename = "Avg Damage Taken")]
    avg_damage_taken: f64,
    #[serde(rename = "Avg Battle Time")]
    avg_battle_time: String,
    #[serde(rename = "DPS")]
    dps: f64,
    #[serde(rename = "Efficiency")]
    efficiency: f64,
    #[serde(rename = "Health Retention %")]
    health_retention: f64,
    #[serde(rename = "Avg Kills")]
    avg_kills: f64,
    #[serde(rename = "S1 Hit %")]
    s1_hit_rate: Option<f64>,
    #[serde(rename = "S2 Hit %")]
    s2_hit_rate: Option<f64>,
    #[serde(rename = "Ult Hit %")]
    ult_hit_rate: Option<f64>,
    #[serde(rename = "Performance Score")]
    score: f64,
    #[serde(rename = "Top Build")]
    top_build: &'a str,
}

#[derive(Debug, Serialize)]
struct MatchDetailRow<'a> {
    #[serde(rename = "File")]
    file: &'a str,
    #[serde(rename = "Character")]
    character: &'a str,
    #[serde(rename = "Form")]
    form: &'a str,
    #[serde(rename = "Team")]
    team: &'a str,
    #[serde(rename = "Opponent")]
    opponent: &'a str,
    #[serde(rename = "Position")]
    position: &'a str,
    #[serde(rename = "Result")]
    result: &'a str,
    #[serde(rename = "Damage")]
    damage: i64,
    #[serde(rename = "Damage Taken")]
    damage_taken: i64,
    #[serde(rename = "Battle Time")]
    battle_time: String,
    #[serde(rename = "Kills")]
    kills: i64,
    #[serde(rename = "Specials")]
    specials: i64,
    #[serde(rename = "Ultimates")]
    ultimates: i64,
    #[serde(rename = "Skills")]
    skills: i64,
    #[serde(rename = "S1 Hit %")]
    s1_hit_rate: Option<f64>,
    #[serde(rename = "S2 Hit %")]
    s2_hit_rate: Option<f64>,
    #[serde(rename = "Ult Hit %")]
    ult_hit_rate: Option<f64>,
    #[serde(rename = "Build")]
    build: &'a str,
    #[serde(rename = "AI Strategy")]
    ai_strategy: &'a str,
    #[serde(rename = "Capsule Cost")]
    capsule_cost: i64,
    #[serde(rename = "Form History")]
    form_history: &'a str,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Character averages sheet, in aggregate order.
pub fn write_character_averages<W: Write>(aggregates: &[CharacterAggregate], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for aggregate in aggregates {
        let t = &aggregate.summary.totals;
        let a = &aggregate.summary.averages;
        writer.serialize(CharacterAverageRow {
            character: &aggregate.name,
            matches: t.match_count,
            active_matches: t.active_match_count,
            wins: t.wins,
            losses: t.losses,
            win_rate: round2(a.win_rate),
            avg_damage: round2(a.avg_damage),
            avg_damage_taken: round2(a.avg_damage_taken),
            avg_battle_time: format_battle_time(a.avg_battle_time),
            dps: round2(a.dps),
            efficiency: round2(a.efficiency),
            health_retention: round2(a.health_retention * 100.0),
            avg_kills: round2(a.avg_kills),
            s1_hit_rate: a.s1_hit_rate.map(round2),
            s2_hit_rate: a.s2_hit_rate.map(round2),
            ult_hit_rate: a.ult_hit_rate.map(round2),
            score: round2(a.combat_performance_score),
            top_build: aggregate
                .summary
                .top_builds
                .first()
                .map(|b| b.label.as_str())
                .unwrap_or(""),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Match details sheet: every appearance of every character.
pub fn write_match_details<W: Write>(aggregates: &[CharacterAggregate], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0usize;
    for aggregate in aggregates {
        for record in &aggregate.matches {
            let s = &record.stats;
            writer.serialize(MatchDetailRow {
                file: &record.file_name,
                character: &aggregate.name,
                form: &s.form_name,
                team: record.team.as_deref().unwrap_or(""),
                opponent: record.opponent.as_deref().unwrap_or(""),
                position: record.position().map(|p| p.as_str()).unwrap_or(""),
                result: if record.won { "Win" } else { "Lose" },
                damage: s.counters.damage_done,
                damage_taken: s.counters.damage_taken,
                battle_time: format_battle_time(s.counters.battle_time),
                kills: s.counters.kills,
                specials: s.counters.special_moves_used,
                ultimates: s.counters.ultimates_used,
                skills: s.counters.skills_used,
                s1_hit_rate: s.s1_hit_rate.map(round2),
                s2_hit_rate: s.s2_hit_rate.map(round2),
                ult_hit_rate: s.ult_hit_rate.map(round2),
                build: &s.build_composition.label,
                ai_strategy: s.ai_strategy.as_deref().unwrap_or(""),
                capsule_cost: s.total_capsule_cost,
                form_history: s.form_change_history.as_deref().unwrap_or(""),
            })?;
            rows += 1;
        }
    }
    writer.flush()?;
    log::debug!("Wrote {} match detail row(s)", rows);
    Ok(())
}
