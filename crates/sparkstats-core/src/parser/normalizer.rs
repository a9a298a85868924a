use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::models::{BattleResult, CharacterSlot, Outcome, Side, SlotKey, SnapshotIndex};
use crate::parser::patterns::{
    LEGACY_ALLY_MARKER, LEGACY_ENEMY_MARKER, LEGACY_SLOT_DIGITS, TEAM_MEMBER_SLOT, WRAPPED_KEY,
};

/// Deepest nesting the last-resort search will descend into.
const MAX_SEARCH_DEPTH: usize = 5;

/// A schema-variant reader. Returns `None` when the document doesn't have
/// that variant's shape.
type Extractor = fn(&Value) -> Option<Vec<BattleResult>>;

/// Tried in order, first hit wins.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("TeamBattleResults.battleResult", from_team_battle_result),
    ("TeamBattleResults.BattleResults", from_team_battle_results_cinema),
    ("TeamBattleResults", from_team_battle_flat),
    ("teams[]", from_teams_array),
    ("BattleResults", from_root_battle_results),
    ("legacy", from_legacy_flat),
    ("search", from_nested_search),
];

/// Resolve a raw document into its battle results.
///
/// Most variants produce a single result; a root `teams` array of
/// per-team sub-documents produces one per team. An unrecognized schema
/// produces nothing.
pub fn normalize_document(doc: &Value) -> Vec<BattleResult> {
    for (variant, extract) in EXTRACTORS {
        if let Some(results) = extract(doc) {
            if !results.is_empty() {
                log::debug!("Document matched {} schema ({} result(s))", variant, results.len());
                return results;
            }
        }
    }
    log::debug!("Document matched no known battle-result schema");
    Vec::new()
}

/// Strip a `(Key="...")` wrapper, if any.
pub fn normalize_record_key(key: &str) -> &str {
    match WRAPPED_KEY.captures(key).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => key.trim(),
    }
}

/// Parse a `characterRecord` key into side and slot.
///
/// Recognizes `AlliesTeamMemberN` / `EnemyTeamMemberN` (wrapped or not) and
/// legacy `１Ｐ` / `２Ｐ` markers. A legacy key without digits parses with
/// slot 0, meaning "unnumbered"; the normalizer numbers those by order of
/// appearance.
pub fn parse_slot_key(key: &str) -> Option<SlotKey> {
    if let Some(caps) = TEAM_MEMBER_SLOT.captures(key) {
        let side = if &caps[1] == "AlliesTeamMember" {
            Side::Ally
        } else {
            Side::Enemy
        };
        let slot = caps[2].parse().ok()?;
        return Some(SlotKey { side, slot });
    }

    let (side, rest) = if let Some(pos) = key.find(LEGACY_ALLY_MARKER) {
        (Side::Ally, &key[pos + LEGACY_ALLY_MARKER.len()..])
    } else if let Some(pos) = key.find(LEGACY_ENEMY_MARKER) {
        (Side::Enemy, &key[pos + LEGACY_ENEMY_MARKER.len()..])
    } else {
        return None;
    };

    let slot = LEGACY_SLOT_DIGITS
        .find(rest)
        .and_then(|m| parse_digits(m.as_str()))
        .unwrap_or(0);
    Some(SlotKey { side, slot })
}

/// Parse ASCII or full-width decimal digits.
fn parse_digits(s: &str) -> Option<u32> {
    let mut value: u32 = 0;
    for ch in s.chars() {
        let digit = match ch {
            '0'..='9' => ch as u32 - '0' as u32,
            '０'..='９' => ch as u32 - '０' as u32,
            _ => return None,
        };
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    Some(value)
}

fn character_slots(record: &Map<String, Value>) -> Vec<CharacterSlot> {
    let mut next_unnumbered: HashMap<Side, u32> = HashMap::new();
    record
        .iter()
        .filter(|(_, node)| node.is_object())
        .map(|(key, node)| {
            let slot = parse_slot_key(key).map(|mut s| {
                if s.slot == 0 {
                    let next = next_unnumbered.entry(s.side).or_insert(0);
                    *next += 1;
                    s.slot = *next;
                }
                s
            });
            if slot.is_none() {
                log::debug!("Character record key '{}' has no side marker", key);
            }
            CharacterSlot {
                key: key.clone(),
                slot,
                node: node.clone(),
            }
        })
        .collect()
}

/// `teams: ["Team A", "Team B"]` → both names, trimmed.
fn team_names(value: Option<&Value>) -> Option<[String; 2]> {
    let arr = value?.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    let first = arr[0].as_str()?.trim().to_string();
    let second = arr[1].as_str()?.trim().to_string();
    Some([first, second])
}

/// Build a result from any object carrying `characterRecord`.
/// `outer_teams` is the enclosing wrapper's `teams`, used when the container
/// has none of its own.
fn result_from(container: &Value, outer_teams: Option<&Value>) -> Option<BattleResult> {
    let record = container.get("characterRecord")?.as_object()?;
    let teams = team_names(container.get("teams")).or_else(|| team_names(outer_teams));
    let outcome = container
        .get("battleWinLose")
        .and_then(Value::as_str)
        .and_then(Outcome::parse);

    Some(BattleResult {
        outcome,
        characters: character_slots(record),
        snapshots: SnapshotIndex::from_value(container.get("characterIdRecord")),
        teams,
    })
}

fn single(result: Option<BattleResult>) -> Option<Vec<BattleResult>> {
    result.map(|r| vec![r])
}

fn from_team_battle_result(doc: &Value) -> Option<Vec<BattleResult>> {
    let wrapper = doc.get("TeamBattleResults")?;
    single(result_from(wrapper.get("battleResult")?, wrapper.get("teams")))
}

fn from_team_battle_results_cinema(doc: &Value) -> Option<Vec<BattleResult>> {
    let wrapper = doc.get("TeamBattleResults")?;
    single(result_from(wrapper.get("BattleResults")?, wrapper.get("teams")))
}

fn from_team_battle_flat(doc: &Value) -> Option<Vec<BattleResult>> {
    single(result_from(doc.get("TeamBattleResults")?, None))
}

fn from_teams_array(doc: &Value) -> Option<Vec<BattleResult>> {
    let teams = doc.get("teams")?.as_array()?;
    let results: Vec<BattleResult> = teams
        .iter()
        .filter(|team| team.is_object())
        .filter_map(|team| match team.get("BattleResults") {
            Some(inner) => result_from(inner, team.get("teams")),
            None => result_from(team, None),
        })
        .collect();
    Some(results)
}

fn from_root_battle_results(doc: &Value) -> Option<Vec<BattleResult>> {
    single(result_from(doc.get("BattleResults")?, doc.get("teams")))
}

fn from_legacy_flat(doc: &Value) -> Option<Vec<BattleResult>> {
    single(result_from(doc, None))
}

fn from_nested_search(doc: &Value) -> Option<Vec<BattleResult>> {
    single(search(doc, 0).and_then(|found| result_from(found, None)))
}

fn search(value: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Object(obj) => {
            if obj.get("characterRecord").is_some_and(Value::is_object) {
                return Some(value);
            }
            obj.values().find_map(|v| search(v, depth + 1))
        }
        Value::Array(arr) => arr.iter().find_map(|v| search(v, depth + 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "(Key=\"AlliesTeamMember1\")": {"battleCount": {"givenDamage": 100}},
            "(Key=\"EnemyTeamMember1\")": {"battleCount": {"givenDamage": 50}},
        })
    }

    #[test]
    fn test_parse_slot_key_patterns() {
        assert_eq!(
            parse_slot_key("AlliesTeamMember2"),
            Some(SlotKey { side: Side::Ally, slot: 2 })
        );
        assert_eq!(
            parse_slot_key("(Key=\"EnemyTeamMember4\")"),
            Some(SlotKey { side: Side::Enemy, slot: 4 })
        );
        assert_eq!(
            parse_slot_key("１Ｐ_3"),
            Some(SlotKey { side: Side::Ally, slot: 3 })
        );
        assert_eq!(
            parse_slot_key("２Ｐ２"),
            Some(SlotKey { side: Side::Enemy, slot: 2 })
        );
        assert_eq!(parse_slot_key("２Ｐ"), Some(SlotKey { side: Side::Enemy, slot: 0 }));
        assert_eq!(parse_slot_key("Spectator"), None);
    }

    #[test]
    fn test_normalize_record_key() {
        assert_eq!(normalize_record_key("(Key=\"0000_00\")"), "0000_00");
        assert_eq!(normalize_record_key(" 0000_00 "), "0000_00");
    }

    #[test]
    fn test_variant_team_battle_result() {
        let doc = json!({"TeamBattleResults": {
            "teams": ["Red", "Blue"],
            "battleResult": {"battleWinLose": "Win", "characterRecord": record()}
        }});
        let results = normalize_document(&doc);
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.outcome, Some(Outcome::Win));
        assert_eq!(r.characters.len(), 2);
        assert_eq!(r.teams, Some(["Red".to_string(), "Blue".to_string()]));
    }

    #[test]
    fn test_variant_cinema() {
        let doc = json!({"TeamBattleResults": {
            "teams": ["Red", "Blue"],
            "BattleResults": {"battleWinLose": "Lose", "characterRecord": record()}
        }});
        let results = normalize_document(&doc);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Some(Outcome::Lose));
        assert_eq!(results[0].team_name(Side::Enemy), Some("Blue"));
    }

    #[test]
    fn test_variant_flattened_wrapper() {
        let doc = json!({"TeamBattleResults": {
            "battleWinLose": "Win",
            "characterRecord": record(),
            "characterIdRecord": {"(Key=\"0000_00\")": {}},
            "teams": ["Red", "Blue"]
        }});
        let results = normalize_document(&doc);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snapshots.len(), 1);
        assert!(results[0].snapshots.get("0000_00").is_some());
    }

    #[test]
    fn test_variant_teams_array_processes_every_team() {
        let doc = json!({"teams": [
            {"BattleResults": {"battleWinLose": "Win", "characterRecord": record(), "teams": ["A", "B"]}},
            {"BattleResults": {"battleWinLose": "Lose", "characterRecord": record(), "teams": ["C", "D"]}},
            {"characterRecord": record()}
        ]});
        let results = normalize_document(&doc);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].team_name(Side::Ally), Some("A"));
        assert_eq!(results[1].team_name(Side::Ally), Some("C"));
        assert_eq!(results[2].teams, None);
    }

    #[test]
    fn test_variant_root_battle_results() {
        let doc = json!({
            "BattleResults": {"battleWinLose": "Win", "characterRecord": record()},
            "teams": ["X", "Y"]
        });
        let results = normalize_document(&doc);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].team_name(Side::Ally), Some("X"));
    }

    #[test]
    fn test_variant_legacy_flat() {
        let doc = json!({
            "battleWinLose": "Lose",
            "characterRecord": {"１Ｐ": {}, "２Ｐ": {}, "２Ｐ ": {}},
            "teams": ["X", "Y"]
        });
        let results = normalize_document(&doc);
        assert_eq!(results.len(), 1);
        let enemies = results[0].side_slots(Side::Enemy);
        assert_eq!(enemies.len(), 2);
        assert_eq!(enemies[0].slot.unwrap().slot, 1);
        assert_eq!(enemies[1].slot.unwrap().slot, 2);
    }

    #[test]
    fn test_nested_search_depth_bound() {
        let shallow = json!({"export": {"payload": {"characterRecord": record()}}});
        assert_eq!(normalize_document(&shallow).len(), 1);

        let deep = json!({"a": {"b": {"c": {"d": {"e": {"f": {"characterRecord": record()}}}}}}});
        assert!(normalize_document(&deep).is_empty());
    }

    #[test]
    fn test_unrecognized_document() {
        assert!(normalize_document(&json!({"foo": 1})).is_empty());
        assert!(normalize_document(&json!([1, 2, 3])).is_empty());
        assert!(normalize_document(&json!({"characterRecord": "nope"})).is_empty());
    }

    #[test]
    fn test_side_slots_sorted_by_slot_number() {
        let doc = json!({"characterRecord": {
            "AlliesTeamMember3": {},
            "AlliesTeamMember1": {},
            "EnemyTeamMember1": {},
            "AlliesTeamMember2": {},
        }});
        let results = normalize_document(&doc);
        let allies: Vec<u32> = results[0]
            .side_slots(Side::Ally)
            .iter()
            .map(|c| c.slot.unwrap().slot)
            .collect();
        assert_eq!(allies, vec![1, 2, 3]);
    }
}
