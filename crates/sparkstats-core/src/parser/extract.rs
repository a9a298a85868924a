use serde_json::Value;

use crate::composition::classify_build;
use crate::data::ReferenceData;
use crate::models::{
    hit_rate, BuildCategory, CategoryBreakdown, CharacterStats, CombatCounters, EquippedCapsule,
    Position,
};
use crate::parser::duration::battle_time_value;
use crate::parser::normalizer::normalize_record_key;
use crate::parser::patterns::{
    CAPSULE_PREFIX, EXA1_BLAST_MARKER, EXA2_BLAST_MARKER, S1_BLAST_MARKER, S2_BLAST_MARKERS,
};

/// Normalize one character node into a flat statistics record.
///
/// `position` is the caller's roster position for the slot, if known.
/// Missing fields read as zero; the one exception is blast hit counts, which
/// stay `None` for exports without `additionalCounts`.
pub fn extract_stats(node: &Value, refs: &ReferenceData, position: Option<Position>) -> CharacterStats {
    let (character_id, form_id) = character_ids(node);
    let name = refs.characters.display_name(&character_id);
    let form_name = refs.characters.display_name(&form_id);

    let form_change_keys = form_change_keys(node);
    let form_change_history = (!form_change_keys.is_empty()).then(|| {
        form_change_keys
            .iter()
            .map(|k| refs.characters.display_name(k))
            .collect::<Vec<_>>()
            .join(" → ")
    });

    let items = equipped_item_keys(node);

    let equipped_capsules: Vec<EquippedCapsule> = items
        .iter()
        .filter(|k| k.starts_with(CAPSULE_PREFIX))
        .filter_map(|k| refs.capsules.get(k))
        .map(|c| EquippedCapsule {
            id: c.id.clone(),
            name: c.name.clone(),
            cost: c.cost,
            build_type: c.build_type.clone(),
        })
        .collect();
    let total_capsule_cost: i64 = equipped_capsules.iter().map(|c| c.cost).sum();

    let ai_strategy = items
        .iter()
        .find_map(|k| refs.ai_strategies.get(k))
        .map(String::from);

    let mut capsule_types: CategoryBreakdown<u32> = CategoryBreakdown::default();
    let mut capsule_costs: CategoryBreakdown<i64> = CategoryBreakdown::default();
    for capsule in &equipped_capsules {
        if let Some(category) = BuildCategory::classify(&capsule.build_type) {
            capsule_types.add(category, 1);
            capsule_costs.add(category, capsule.cost);
        }
    }

    let counters = read_counters(node);
    let (hp_gauge_value, hp_gauge_value_max) = hp_gauge(node);

    CharacterStats {
        name,
        form_name,
        character_id,
        form_id,
        hp_gauge_value,
        hp_gauge_value_max,
        s1_hit_rate: hit_rate(counters.s1_hit_blast, counters.s1_blast),
        s2_hit_rate: hit_rate(counters.s2_hit_blast, counters.s2_blast),
        ult_hit_rate: hit_rate(counters.ult_hit_blast, counters.ult_blast),
        counters,
        equipped_capsules,
        total_capsule_cost,
        capsule_types,
        build_composition: classify_build(&capsule_costs),
        capsule_costs,
        ai_strategy,
        position,
        form_change_history,
        form_change_keys,
    }
}

/// `(original form id, current form id)`. The original falls back to the
/// current form when the export doesn't record it; both are empty when the
/// node has neither.
pub fn character_ids(node: &Value) -> (String, String) {
    let bpc = node.get("battlePlayCharacter");
    let current = bpc
        .and_then(|b| b.get("character"))
        .and_then(item_key)
        .unwrap_or_default();
    let original = bpc
        .and_then(|b| b.get("originalCharacter"))
        .and_then(item_key)
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| current.clone());
    (original, current)
}

/// `(hPGaugeValue, hPGaugeValueMax)` at the moment the node was captured.
pub fn hp_gauge(node: &Value) -> (f64, f64) {
    let bpc = node.get("battlePlayCharacter");
    (float_field(bpc, "hPGaugeValue"), float_field(bpc, "hPGaugeValueMax"))
}

/// Transformation ids in the order they happened.
pub fn form_change_keys(node: &Value) -> Vec<String> {
    key_list(node, "formChangeHistory")
}

fn equipped_item_keys(node: &Value) -> Vec<String> {
    key_list(node, "equipItem")
}

/// A list field on the node, falling back to the same field under
/// `battlePlayCharacter`.
fn key_list(node: &Value, field: &str) -> Vec<String> {
    let list = node
        .get(field)
        .or_else(|| node.get("battlePlayCharacter").and_then(|b| b.get(field)))
        .and_then(Value::as_array);
    list.map(|items| items.iter().filter_map(item_key).filter(|k| !k.is_empty()).collect())
        .unwrap_or_default()
}

/// Item references come as bare strings or `{ "key": ... }` objects.
fn item_key(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("key")?.as_str()?,
        _ => return None,
    };
    Some(normalize_record_key(raw).to_string())
}

/// Read every cumulative counter from a character node or snapshot.
pub fn read_counters(node: &Value) -> CombatCounters {
    let bc = node.get("battleCount");
    let count = |key: &str| int_field(bc, key);

    let mut counters = CombatCounters {
        damage_done: count("givenDamage"),
        damage_taken: count("takenDamage"),
        battle_time: bc
            .and_then(|b| b.get("battleTime"))
            .map(battle_time_value)
            .unwrap_or(0.0),
        special_moves_used: count("sPMCount"),
        ultimates_used: count("uLTCount"),
        skills_used: count("eXACount"),
        kills: count("killCount"),
        tags: count("tagCount"),
        sparking_count: count("sparkingCount"),
        charge_count: count("chargeCount"),
        guard_count: count("guardCount"),
        revenge_counters: count("revengeCounter"),
        z_counters: count("zCounter"),
        super_counters: count("superCounterCount"),
        ki_blasts: count("shotEnergyBulletCount"),
        throws: count("throwCount"),
        combo_count: count("comboCount"),
        combo_damage: count("comboDamage"),
        max_combo_hits: count("maxComboNum"),
        vanishing_moves: count("vanishingAttackCount"),
        dragon_dash_distance: float_field(bc, "dragonDashMileage"),
        speed_impacts: count("speedImpactCount"),
        speed_impact_wins: count("speedImpactWinCount"),
        ..Default::default()
    };

    let legacy = LegacyBlasts::from_run_blast_count(bc.and_then(|b| b.get("runBlastCount")));
    counters.exa1_blast = legacy.exa1;
    counters.exa2_blast = legacy.exa2;

    match node.get("additionalCounts").filter(|v| v.is_object()) {
        Some(additional) => {
            let add = Some(additional);
            counters.s1_blast = int_field(add, "s1Blast");
            counters.s2_blast = int_field(add, "s2Blast");
            counters.ult_blast = int_field(add, "ultBlast");
            counters.s1_hit_blast = Some(int_field(add, "s1HitBlast"));
            counters.s2_hit_blast = Some(int_field(add, "s2HitBlast"));
            counters.ult_hit_blast = Some(int_field(add, "uLTHitBlast"));
        }
        None => {
            counters.s1_blast = legacy.s1;
            counters.s2_blast = legacy.s2;
            counters.ult_blast = counters.ultimates_used;
        }
    }

    counters
}

/// Thrown counts recovered from the legacy `runBlastCount` map, whose keys
/// embed the move slot (`SPM1`, `SPM2`, `EXA1`, ...).
#[derive(Debug, Default, PartialEq)]
struct LegacyBlasts {
    s1: i64,
    s2: i64,
    exa1: i64,
    exa2: i64,
}

impl LegacyBlasts {
    fn from_run_blast_count(value: Option<&Value>) -> Self {
        let mut blasts = Self::default();
        let Some(map) = value.and_then(Value::as_object) else {
            return blasts;
        };
        for (key, count) in map {
            let n = int_value(count);
            if key.contains(S1_BLAST_MARKER) {
                blasts.s1 += n;
            } else if S2_BLAST_MARKERS.iter().any(|m| key.contains(m)) {
                blasts.s2 += n;
            } else if key.contains(EXA1_BLAST_MARKER) {
                blasts.exa1 += n;
            } else if key.contains(EXA2_BLAST_MARKER) {
                blasts.exa2 += n;
            }
        }
        blasts
    }
}

fn int_field(container: Option<&Value>, key: &str) -> i64 {
    container.and_then(|c| c.get(key)).map(int_value).unwrap_or(0)
}

fn float_field(container: Option<&Value>, key: &str) -> f64 {
    container.and_then(|c| c.get(key)).map(float_value).unwrap_or(0.0)
}

/// Numbers (integral or not) and numeric strings; anything else is 0.
fn int_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f.round() as i64).unwrap_or(0),
        _ => 0,
    }
}

fn float_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}
