use serde::Serialize;

use crate::models::{hit_rate, BuildComposition, CharacterStats};

/// Efficiency reported when damage was dealt but none was taken.
pub const EFFICIENCY_SENTINEL: f64 = 999.0;

/// Matches at which the experience bonus reaches its cap.
const FULL_EXPERIENCE_MATCHES: f64 = 12.0;
const MAX_EXPERIENCE_MULTIPLIER: f64 = 1.25;

const TOP_BUILD_COUNT: usize = 3;

/// Damage dealt per damage taken. Finite for every input.
pub fn damage_efficiency(damage_done: f64, damage_taken: f64) -> f64 {
    if damage_taken > 0.0 {
        damage_done / damage_taken
    } else if damage_done > 0.0 {
        EFFICIENCY_SENTINEL
    } else {
        0.0
    }
}

/// `min(1.25, 1 + (matches - 1) * 0.25/11)`; a 12th match earns the full bonus.
pub fn experience_multiplier(matches: u32) -> f64 {
    let extra = (matches.max(1) - 1) as f64;
    let step = (MAX_EXPERIENCE_MULTIPLIER - 1.0) / (FULL_EXPERIENCE_MATCHES - 1.0);
    (1.0 + extra * step).min(MAX_EXPERIENCE_MULTIPLIER)
}

/// Weighted composite: 35% damage output, 25% efficiency, 25% DPS,
/// 15% health retention, scaled by experience.
pub fn combat_performance_score(
    avg_damage: f64,
    efficiency: f64,
    dps: f64,
    health_retention: f64,
    matches: u32,
) -> f64 {
    let base = (avg_damage / 100_000.0) * 35.0
        + efficiency * 25.0
        + (dps / 1000.0) * 25.0
        + health_retention * 15.0;
    base * experience_multiplier(matches)
}

/// Running sums over a set of match appearances.
///
/// Damage, health and battle time only count for active matches
/// (battle time > 0); every other counter counts for every match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatTotals {
    pub match_count: u32,
    pub active_match_count: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_damage: i64,
    pub total_damage_taken: i64,
    pub total_battle_time: f64,
    pub total_health: f64,
    pub total_max_health: f64,
    pub total_health_retention: f64,
    pub total_special_moves: i64,
    pub total_ultimates: i64,
    pub total_skills: i64,
    pub total_kills: i64,
    pub total_tags: i64,
    pub total_sparking: i64,
    pub total_revenge_counters: i64,
    pub total_z_counters: i64,
    pub total_super_counters: i64,
    pub total_s1_blast: i64,
    pub total_s2_blast: i64,
    pub total_ult_blast: i64,
    pub total_capsule_cost: i64,
    // Hit tracking, only over matches that recorded hits
    pub tracked_s1_thrown: i64,
    pub tracked_s1_hits: i64,
    pub tracked_s2_thrown: i64,
    pub tracked_s2_hits: i64,
    pub tracked_ult_thrown: i64,
    pub tracked_ult_hits: i64,
}

impl StatTotals {
    /// Fold one appearance in.
    pub fn with(mut self, stats: &CharacterStats, won: bool) -> Self {
        let c = &stats.counters;
        self.match_count += 1;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }

        if stats.is_active() {
            self.active_match_count += 1;
            self.total_damage += c.damage_done;
            self.total_damage_taken += c.damage_taken;
            self.total_battle_time += c.battle_time;
            self.total_health += stats.hp_gauge_value;
            self.total_max_health += stats.hp_gauge_value_max;
            self.total_health_retention += stats.health_retention().unwrap_or(0.0);
        }

        self.total_special_moves += c.special_moves_used;
        self.total_ultimates += c.ultimates_used;
        self.total_skills += c.skills_used;
        self.total_kills += c.kills;
        self.total_tags += c.tags;
        self.total_sparking += c.sparking_count;
        self.total_revenge_counters += c.revenge_counters;
        self.total_z_counters += c.z_counters;
        self.total_super_counters += c.super_counters;
        self.total_s1_blast += c.s1_blast;
        self.total_s2_blast += c.s2_blast;
        self.total_ult_blast += c.ult_blast;
        self.total_capsule_cost += stats.total_capsule_cost;

        if let Some(hits) = c.s1_hit_blast {
            self.tracked_s1_thrown += c.s1_blast;
            self.tracked_s1_hits += hits;
        }
        if let Some(hits) = c.s2_hit_blast {
            self.tracked_s2_thrown += c.s2_blast;
            self.tracked_s2_hits += hits;
        }
        if let Some(hits) = c.ult_hit_blast {
            self.tracked_ult_thrown += c.ult_blast;
            self.tracked_ult_hits += hits;
        }
        self
    }

    pub fn from_appearances<'a, I>(appearances: I) -> Self
    where
        I: IntoIterator<Item = (&'a CharacterStats, bool)>,
    {
        appearances
            .into_iter()
            .fold(Self::default(), |totals, (stats, won)| totals.with(stats, won))
    }

    /// The averaging denominator: active matches when there are any,
    /// otherwise all matches.
    pub fn divisor(&self) -> u32 {
        if self.active_match_count > 0 {
            self.active_match_count
        } else {
            self.match_count
        }
    }
}

/// Per-match averages and derived metrics for a [`StatTotals`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatAverages {
    pub avg_damage: f64,
    pub avg_damage_taken: f64,
    pub avg_battle_time: f64,
    pub avg_health: f64,
    pub avg_max_health: f64,
    pub avg_special_moves: f64,
    pub avg_ultimates: f64,
    pub avg_skills: f64,
    pub avg_kills: f64,
    pub avg_tags: f64,
    pub avg_s1_blast: f64,
    pub avg_s2_blast: f64,
    pub avg_ult_blast: f64,
    pub avg_capsule_cost: f64,
    pub s1_hit_rate: Option<f64>,
    pub s2_hit_rate: Option<f64>,
    pub ult_hit_rate: Option<f64>,
    pub dps: f64,
    pub efficiency: f64,
    pub health_retention: f64,
    pub win_rate: f64,
    pub experience_multiplier: f64,
    pub combat_performance_score: f64,
}

impl StatAverages {
    pub fn from_totals(t: &StatTotals) -> Self {
        let n = t.divisor();
        if n == 0 {
            return Self::default();
        }
        let per = |total: f64| total / n as f64;

        let avg_damage = per(t.total_damage as f64);
        let dps = if t.total_battle_time > 0.0 {
            t.total_damage as f64 / t.total_battle_time
        } else {
            0.0
        };
        let efficiency = damage_efficiency(t.total_damage as f64, t.total_damage_taken as f64);
        let health_retention = per(t.total_health_retention);

        Self {
            avg_damage,
            avg_damage_taken: per(t.total_damage_taken as f64),
            avg_battle_time: per(t.total_battle_time),
            avg_health: per(t.total_health),
            avg_max_health: per(t.total_max_health),
            avg_special_moves: per(t.total_special_moves as f64),
            avg_ultimates: per(t.total_ultimates as f64),
            avg_skills: per(t.total_skills as f64),
            avg_kills: per(t.total_kills as f64),
            avg_tags: per(t.total_tags as f64),
            avg_s1_blast: per(t.total_s1_blast as f64),
            avg_s2_blast: per(t.total_s2_blast as f64),
            avg_ult_blast: per(t.total_ult_blast as f64),
            avg_capsule_cost: per(t.total_capsule_cost as f64),
            s1_hit_rate: hit_rate(Some(t.tracked_s1_hits), t.tracked_s1_thrown),
            s2_hit_rate: hit_rate(Some(t.tracked_s2_hits), t.tracked_s2_thrown),
            ult_hit_rate: hit_rate(Some(t.tracked_ult_hits), t.tracked_ult_thrown),
            dps,
            efficiency,
            health_retention,
            win_rate: if t.match_count > 0 {
                t.wins as f64 / t.match_count as f64 * 100.0
            } else {
                0.0
            },
            experience_multiplier: experience_multiplier(n),
            combat_performance_score: combat_performance_score(
                avg_damage,
                efficiency,
                dps,
                health_retention,
                n,
            ),
        }
    }
}

/// How one build label fared for a character.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildUsage {
    pub label: String,
    pub composition: BuildComposition,
    pub count: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub avg_damage: f64,
    pub combat_performance_score: f64,
}

/// Group appearances by build label and keep the three most used
/// (ties broken by performance score).
pub fn top_builds<'a, I>(appearances: I) -> Vec<BuildUsage>
where
    I: IntoIterator<Item = (&'a CharacterStats, bool)>,
{
    // First-seen order keeps equal entries deterministic
    let mut groups: Vec<(&'a BuildComposition, StatTotals)> = Vec::new();
    for (stats, won) in appearances {
        let label = &stats.build_composition.label;
        match groups.iter_mut().find(|(c, _)| &c.label == label) {
            Some((_, totals)) => *totals = std::mem::take(totals).with(stats, won),
            None => groups.push((&stats.build_composition, StatTotals::default().with(stats, won))),
        }
    }

    let mut builds: Vec<BuildUsage> = groups
        .into_iter()
        .map(|(composition, totals)| {
            let averages = StatAverages::from_totals(&totals);
            BuildUsage {
                label: composition.label.clone(),
                composition: composition.clone(),
                count: totals.match_count,
                wins: totals.wins,
                win_rate: averages.win_rate,
                avg_damage: averages.avg_damage,
                combat_performance_score: averages.combat_performance_score,
            }
        })
        .collect();

    builds.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.combat_performance_score.total_cmp(&a.combat_performance_score))
    });
    builds.truncate(TOP_BUILD_COUNT);
    builds
}

/// Totals, averages and favourite builds for one character over some
/// set of appearances.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    #[serde(flatten)]
    pub totals: StatTotals,
    #[serde(flatten)]
    pub averages: StatAverages,
    pub top_builds: Vec<BuildUsage>,
}

impl CharacterSummary {
    pub fn from_appearances<'a, I>(appearances: I) -> Self
    where
        I: IntoIterator<Item = (&'a CharacterStats, bool)> + Clone,
    {
        let totals = StatTotals::from_appearances(appearances.clone());
        Self {
            averages: StatAverages::from_totals(&totals),
            top_builds: top_builds(appearances),
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildKind, CharacterStats, CombatCounters};
    use crate::parser::extract::extract_stats;
    use crate::data::ReferenceData;
    use serde_json::json;

    pub(crate) fn stats(damage: i64, taken: i64, seconds: f64, hp: f64) -> CharacterStats {
        let mut s = extract_stats(&json!({}), &ReferenceData::empty(), None);
        s.counters = CombatCounters {
            damage_done: damage,
            damage_taken: taken,
            battle_time: seconds,
            kills: 1,
            ..Default::default()
        };
        s.hp_gauge_value = hp;
        s.hp_gauge_value_max = 10000.0;
        s
    }

    fn with_label(mut s: CharacterStats, label: &str) -> CharacterStats {
        s.build_composition.label = label.to_string();
        s.build_composition.kind = BuildKind::Pure;
        s
    }

    #[test]
    fn test_damage_efficiency_never_infinite() {
        assert_eq!(damage_efficiency(100.0, 50.0), 2.0);
        assert_eq!(damage_efficiency(100.0, 0.0), EFFICIENCY_SENTINEL);
        assert_eq!(damage_efficiency(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_experience_multiplier_caps_at_twelve() {
        assert_eq!(experience_multiplier(0), 1.0);
        assert_eq!(experience_multiplier(1), 1.0);
        assert!((experience_multiplier(2) - (1.0 + 0.25 / 11.0)).abs() < 1e-12);
        assert!((experience_multiplier(12) - 1.25).abs() < 1e-12);
        assert_eq!(experience_multiplier(40), 1.25);
    }

    #[test]
    fn test_score_formula() {
        // (100000/100000)*35 + 2*25 + (1000/1000)*25 + 0.5*15 = 117.5
        let score = combat_performance_score(100_000.0, 2.0, 1000.0, 0.5, 1);
        assert!((score - 117.5).abs() < 1e-9);
        let seasoned = combat_performance_score(100_000.0, 2.0, 1000.0, 0.5, 12);
        assert!((seasoned - 117.5 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_inactive_matches_excluded_from_damage_but_counted() {
        let active = stats(50_000, 25_000, 60.0, 5000.0);
        let idle = stats(0, 0, 0.0, 10000.0);
        let totals = StatTotals::from_appearances([(&active, true), (&idle, false)]);

        assert_eq!(totals.match_count, 2);
        assert_eq!(totals.active_match_count, 1);
        assert_eq!(totals.total_damage, 50_000);
        assert_eq!(totals.total_health, 5000.0);
        assert_eq!(totals.total_kills, 2);
        assert_eq!(totals.divisor(), 1);

        let avg = StatAverages::from_totals(&totals);
        assert_eq!(avg.avg_damage, totals.total_damage as f64 / totals.divisor() as f64);
        assert_eq!(avg.avg_kills, 2.0);
        assert_eq!(avg.win_rate, 50.0);
        assert!((avg.health_retention - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_divisor_falls_back_to_match_count() {
        let idle = stats(0, 0, 0.0, 0.0);
        let totals = StatTotals::from_appearances([(&idle, false), (&idle, false)]);
        assert_eq!(totals.active_match_count, 0);
        assert_eq!(totals.divisor(), 2);
        let avg = StatAverages::from_totals(&totals);
        assert_eq!(avg.avg_kills, 1.0);
        assert_eq!(avg.dps, 0.0);
    }

    #[test]
    fn test_empty_totals_average_to_zero() {
        let avg = StatAverages::from_totals(&StatTotals::default());
        assert_eq!(avg, StatAverages::default());
    }

    #[test]
    fn test_hit_rate_excludes_untracked_matches() {
        let mut tracked = stats(1, 1, 1.0, 1.0);
        tracked.counters.s1_blast = 4;
        tracked.counters.s1_hit_blast = Some(3);
        let mut legacy = stats(1, 1, 1.0, 1.0);
        legacy.counters.s1_blast = 10;
        legacy.counters.s1_hit_blast = None;

        let totals = StatTotals::from_appearances([(&tracked, true), (&legacy, true)]);
        let avg = StatAverages::from_totals(&totals);
        assert_eq!(totals.total_s1_blast, 14);
        assert_eq!(avg.s1_hit_rate, Some(75.0));
        assert_eq!(avg.s2_hit_rate, None);
    }

    #[test]
    fn test_top_builds_order_and_limit() {
        let strong = stats(200_000, 10_000, 60.0, 9000.0);
        let weak = stats(10_000, 50_000, 60.0, 100.0);
        let a1 = with_label(weak.clone(), "Pure Melee");
        let a2 = with_label(weak.clone(), "Pure Melee");
        let b1 = with_label(strong.clone(), "Pure Blast");
        let c1 = with_label(weak.clone(), "Pure Skill");
        let d1 = with_label(weak, "Pure Utility");
        let appearances = [
            (&c1, false),
            (&a1, false),
            (&b1, true),
            (&a2, true),
            (&d1, false),
        ];
        let builds = top_builds(appearances);
        assert_eq!(builds.len(), 3);
        assert_eq!(builds[0].label, "Pure Melee");
        assert_eq!(builds[0].count, 2);
        assert_eq!(builds[0].wins, 1);
        // Single-use builds tie on count; the higher score goes first
        assert_eq!(builds[1].label, "Pure Blast");
        assert_eq!(builds[2].label, "Pure Skill");
    }
}
