use serde::Serialize;

use super::battle::Position;
use super::build::{BuildComposition, CategoryBreakdown};

/// Cumulative per-character counters as read from `battleCount` and
/// `additionalCounts`. Snapshots taken mid-match carry the same shape, which
/// is what makes per-form subtraction possible.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatCounters {
    pub damage_done: i64,
    pub damage_taken: i64,
    /// Seconds.
    pub battle_time: f64,
    pub special_moves_used: i64,
    pub ultimates_used: i64,
    pub skills_used: i64,
    pub kills: i64,
    pub tags: i64,
    pub sparking_count: i64,
    pub charge_count: i64,
    pub guard_count: i64,
    pub revenge_counters: i64,
    pub z_counters: i64,
    pub super_counters: i64,
    pub ki_blasts: i64,
    pub throws: i64,
    pub combo_count: i64,
    pub combo_damage: i64,
    /// Longest combo; a high-water mark rather than a running total.
    pub max_combo_hits: i64,
    pub vanishing_moves: i64,
    pub dragon_dash_distance: f64,
    pub speed_impacts: i64,
    pub speed_impact_wins: i64,
    pub s1_blast: i64,
    pub s2_blast: i64,
    pub ult_blast: i64,
    pub exa1_blast: i64,
    pub exa2_blast: i64,
    /// `None` for exports that predate hit tracking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s1_hit_blast: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s2_hit_blast: Option<i64>,
    #[serde(rename = "uLTHitBlast", skip_serializing_if = "Option::is_none")]
    pub ult_hit_blast: Option<i64>,
}

impl CombatCounters {
    /// Field-wise `self - earlier` over the cumulative counters.
    /// `max_combo_hits` is kept from `self`.
    pub fn delta(&self, earlier: &CombatCounters) -> CombatCounters {
        CombatCounters {
            damage_done: self.damage_done - earlier.damage_done,
            damage_taken: self.damage_taken - earlier.damage_taken,
            battle_time: self.battle_time - earlier.battle_time,
            special_moves_used: self.special_moves_used - earlier.special_moves_used,
            ultimates_used: self.ultimates_used - earlier.ultimates_used,
            skills_used: self.skills_used - earlier.skills_used,
            kills: self.kills - earlier.kills,
            tags: self.tags - earlier.tags,
            sparking_count: self.sparking_count - earlier.sparking_count,
            charge_count: self.charge_count - earlier.charge_count,
            guard_count: self.guard_count - earlier.guard_count,
            revenge_counters: self.revenge_counters - earlier.revenge_counters,
            z_counters: self.z_counters - earlier.z_counters,
            super_counters: self.super_counters - earlier.super_counters,
            ki_blasts: self.ki_blasts - earlier.ki_blasts,
            throws: self.throws - earlier.throws,
            combo_count: self.combo_count - earlier.combo_count,
            combo_damage: self.combo_damage - earlier.combo_damage,
            max_combo_hits: self.max_combo_hits,
            vanishing_moves: self.vanishing_moves - earlier.vanishing_moves,
            dragon_dash_distance: self.dragon_dash_distance - earlier.dragon_dash_distance,
            speed_impacts: self.speed_impacts - earlier.speed_impacts,
            speed_impact_wins: self.speed_impact_wins - earlier.speed_impact_wins,
            s1_blast: self.s1_blast - earlier.s1_blast,
            s2_blast: self.s2_blast - earlier.s2_blast,
            ult_blast: self.ult_blast - earlier.ult_blast,
            exa1_blast: self.exa1_blast - earlier.exa1_blast,
            exa2_blast: self.exa2_blast - earlier.exa2_blast,
            s1_hit_blast: hit_delta(self.s1_hit_blast, earlier.s1_hit_blast),
            s2_hit_blast: hit_delta(self.s2_hit_blast, earlier.s2_hit_blast),
            ult_hit_blast: hit_delta(self.ult_hit_blast, earlier.ult_hit_blast),
        }
    }
}

fn hit_delta(later: Option<i64>, earlier: Option<i64>) -> Option<i64> {
    match (later, earlier) {
        (Some(l), Some(e)) => Some(l - e),
        (Some(l), None) => Some(l),
        (None, _) => None,
    }
}

/// Hit percentage, `None` when nothing was thrown (or hits weren't tracked).
pub fn hit_rate(hits: Option<i64>, thrown: i64) -> Option<f64> {
    if thrown > 0 {
        hits.map(|h| h as f64 / thrown as f64 * 100.0)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippedCapsule {
    pub id: String,
    pub name: String,
    pub cost: i64,
    pub build_type: String,
}

/// Normalized statistics for one character in one match.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    /// Display name of the original (pre-transformation) form, `-` if unknown.
    pub name: String,
    /// Display name of the form the character ended the match in.
    pub form_name: String,
    pub character_id: String,
    pub form_id: String,
    #[serde(flatten)]
    pub counters: CombatCounters,
    #[serde(rename = "hPGaugeValue")]
    pub hp_gauge_value: f64,
    #[serde(rename = "hPGaugeValueMax")]
    pub hp_gauge_value_max: f64,
    pub s1_hit_rate: Option<f64>,
    pub s2_hit_rate: Option<f64>,
    pub ult_hit_rate: Option<f64>,
    pub equipped_capsules: Vec<EquippedCapsule>,
    pub total_capsule_cost: i64,
    pub capsule_types: CategoryBreakdown<u32>,
    pub capsule_costs: CategoryBreakdown<i64>,
    pub build_composition: BuildComposition,
    pub ai_strategy: Option<String>,
    pub position: Option<Position>,
    /// Transformation names joined in order; `None` when no transformation happened.
    pub form_change_history: Option<String>,
    #[serde(skip)]
    pub form_change_keys: Vec<String>,
}

impl CharacterStats {
    /// A match counts as active once the character saw any battle time.
    pub fn is_active(&self) -> bool {
        self.counters.battle_time > 0.0
    }

    /// Remaining HP as a fraction of max, `None` without a max.
    pub fn health_retention(&self) -> Option<f64> {
        (self.hp_gauge_value_max > 0.0).then(|| self.hp_gauge_value / self.hp_gauge_value_max)
    }

    pub fn transformed(&self) -> bool {
        !self.form_change_keys.is_empty()
    }
}

/// Incremental stats for one form of a transforming character.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStats {
    /// 1-based.
    pub form_number: usize,
    pub form_id: String,
    pub is_first_form: bool,
    pub is_final_form: bool,
    #[serde(flatten)]
    pub counters: CombatCounters,
    #[serde(rename = "hPGaugeValue")]
    pub hp_gauge_value: f64,
    #[serde(rename = "hPGaugeValueMax")]
    pub hp_gauge_value_max: f64,
}
