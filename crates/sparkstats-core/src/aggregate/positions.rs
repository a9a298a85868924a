use serde::Serialize;

use super::matches::collect_matches;
use super::summary::{StatAverages, StatTotals};
use crate::data::ReferenceData;
use crate::models::{BattleFile, Position};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCharacter {
    pub name: String,
    #[serde(flatten)]
    pub totals: StatTotals,
    #[serde(flatten)]
    pub averages: StatAverages,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAggregate {
    pub position: Position,
    /// Sorted by average damage, highest first.
    pub characters: Vec<PositionCharacter>,
}

/// Per-position character stats for Lead, Middle and Anchor, in that order.
/// Slots without a side marker have no position and are left out.
pub fn position_aggregates(files: &[BattleFile], refs: &ReferenceData) -> Vec<PositionAggregate> {
    let mut buckets: Vec<(Position, Vec<(String, StatTotals)>)> =
        Position::ALL.iter().map(|&p| (p, Vec::new())).collect();

    for snapshot in collect_matches(files, refs) {
        for record in &snapshot.records {
            let Some(position) = record.position() else {
                continue;
            };
            let Some((_, characters)) = buckets.iter_mut().find(|(p, _)| *p == position) else {
                continue;
            };
            let key = record.character_key();
            match characters.iter_mut().find(|(name, _)| name == key) {
                Some((_, totals)) => *totals = std::mem::take(totals).with(&record.stats, record.won),
                None => characters.push((
                    key.to_string(),
                    StatTotals::default().with(&record.stats, record.won),
                )),
            }
        }
    }

    buckets
        .into_iter()
        .map(|(position, characters)| {
            let mut characters: Vec<PositionCharacter> = characters
                .into_iter()
                .map(|(name, totals)| PositionCharacter {
                    name,
                    averages: StatAverages::from_totals(&totals),
                    totals,
                })
                .collect();
            characters.sort_by(|a, b| b.averages.avg_damage.total_cmp(&a.averages.avg_damage));
            PositionAggregate {
                position,
                characters,
            }
        })
        .collect()
}
