//! End-to-end runs through the loader, normalizer and aggregators using
//! battle exports written to a temp directory.
//!
//!     cargo test -p sparkstats-core --test pipeline_scenarios

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use sparkstats_core::aggregate::{character_aggregates, team_aggregates};
use sparkstats_core::{collect_json_files, load_battle_files, ReferenceData};

const CHARACTERS_CSV: &str = "\
name,id
Goku (Z - Early),0000_00
Goku (Super Saiyan),0000_01
Goku (Super Saiyan 2),0000_02
Vegeta (Z - Scouter),0100_00
Frieza (First Form),0200_00
";

const CAPSULES_CSV: &str = "\
name,id,type,exclusiveTo,cost,effect,buildType
Dragon Power,00_0_0001,Capsule,,4,Boosts melee,Melee
Bloodthirsty,00_0_0002,Capsule,,3,Boosts melee,Melee
Ki Control,00_0_0003,Capsule,,3,Ki cost down,Ki Efficiency
Melee Type,00_7_0001,AI,,0,Prefers melee,
Victory BGM,00_9_0001,Sparking BGM,,0,,
";

fn refs() -> ReferenceData {
    ReferenceData::from_csv_bytes(CHARACTERS_CSV.as_bytes(), CAPSULES_CSV.as_bytes()).unwrap()
}

fn fighter(id: &str, damage: i64, seconds: u32, hp: i64) -> Value {
    json!({
        "battlePlayCharacter": {
            "character": {"key": id},
            "hPGaugeValue": hp,
            "hPGaugeValueMax": 40000
        },
        "battleCount": {
            "givenDamage": damage,
            "takenDamage": 25000,
            "battleTime": format!("+00000000.00:{:02}:{:02}.000000", seconds / 60, seconds % 60),
            "killCount": 1,
            "sPMCount": 2
        },
        "equipItem": [{"key": "00_0_0001"}, {"key": "00_0_0002"}, {"key": "00_7_0001"}]
    })
}

fn write(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Mixed schema variants merge under one identity
// ---------------------------------------------------------------------------

#[test]
fn test_wrapped_and_legacy_files_merge_by_original_form() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a_wrapped.json",
        &json!({
            "TeamBattleResults": {
                "teams": ["Saiyans", "Empire"],
                "battleResult": {
                    "battleWinLose": "Win",
                    "characterRecord": {
                        "AlliesTeamMember1": fighter("0000_00", 80000, 90, 12000),
                        "EnemyTeamMember1": fighter("0200_00", 40000, 90, 0)
                    }
                }
            }
        }),
    );
    write(
        dir.path(),
        "b_legacy.json",
        &json!({
            "battleWinLose": "Lose",
            "characterRecord": {
                "AlliesTeamMember1": fighter("0000_00", 20000, 60, 0),
                "EnemyTeamMember1": fighter("0100_00", 90000, 60, 3000)
            }
        }),
    );
    fs::write(dir.path().join("c_broken.json"), b"{\"characterRecord\": ").unwrap();

    let paths = collect_json_files(dir.path(), false).unwrap();
    assert_eq!(paths.len(), 3);
    let report = load_battle_files(&paths);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].name, "c_broken.json");
    assert_eq!(report.errors[0].message, "Invalid JSON file");

    let aggregates = character_aggregates(&report.files, &refs());
    let goku: Vec<_> = aggregates
        .iter()
        .filter(|a| a.name == "Goku (Z - Early)")
        .collect();
    assert_eq!(goku.len(), 1);
    let goku = goku[0];
    assert_eq!(goku.summary.totals.match_count, 2);
    assert_eq!(goku.summary.totals.wins, 1);
    assert_eq!(goku.summary.totals.losses, 1);
    assert_eq!(goku.teams, vec!["Saiyans"]);
    assert_eq!(goku.summary.top_builds[0].label, "Pure Melee");
    assert_eq!(goku.summary.top_builds[0].count, 2);
    assert_eq!(goku.matches[0].stats.ai_strategy.as_deref(), Some("Melee Type"));
}

// ---------------------------------------------------------------------------
// Transformations
// ---------------------------------------------------------------------------

#[test]
fn test_three_form_transformation_breakdown() {
    let mut live = fighter("0000_02", 150000, 180, 9000);
    live["battlePlayCharacter"]["originalCharacter"] = json!({"key": "0000_00"});
    live["formChangeHistory"] = json!([{"key": "0000_01"}, {"key": "0000_02"}]);

    let doc = json!({
        "battleWinLose": "Win",
        "characterRecord": {"AlliesTeamMember1": live},
        "characterIdRecord": {
            "(Key=\"0000_00\")": fighter("0000_00", 40000, 50, 30000),
            "0000_01": fighter("0000_01", 95000, 120, 20000)
        }
    });
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ssj.json", &doc);
    let report = load_battle_files(&collect_json_files(dir.path(), false).unwrap());

    let aggregates = character_aggregates(&report.files, &refs());
    assert_eq!(aggregates.len(), 1);
    let goku = &aggregates[0];
    assert_eq!(goku.name, "Goku (Z - Early)");

    let forms = &goku.matches[0].forms;
    assert_eq!(forms.len(), 3);
    assert!(forms[0].is_first_form && !forms[0].is_final_form);
    assert!(!forms[1].is_first_form && !forms[1].is_final_form);
    assert!(!forms[2].is_first_form && forms[2].is_final_form);
    let damage: i64 = forms.iter().map(|f| f.counters.damage_done).sum();
    assert_eq!(damage, 150000);

    assert_eq!(
        goku.matches[0].stats.form_change_history.as_deref(),
        Some("Goku (Super Saiyan) → Goku (Super Saiyan 2)")
    );
    let form_names: Vec<&str> = goku.forms.iter().map(|f| f.form_name.as_str()).collect();
    assert_eq!(
        form_names,
        vec!["Goku (Z - Early)", "Goku (Super Saiyan)", "Goku (Super Saiyan 2)"]
    );
}

// ---------------------------------------------------------------------------
// Averaging and team headlines
// ---------------------------------------------------------------------------

#[test]
fn test_every_average_uses_the_active_divisor() {
    let docs: Vec<Value> = [(50000, 60), (0, 0), (70000, 100), (0, 0)]
        .iter()
        .map(|&(damage, seconds)| {
            json!({"characterRecord": {"AlliesTeamMember1": fighter("0100_00", damage, seconds, 100)}})
        })
        .collect();
    let dir = tempfile::tempdir().unwrap();
    for (i, doc) in docs.iter().enumerate() {
        write(dir.path(), &format!("{}.json", i), doc);
    }
    let report = load_battle_files(&collect_json_files(dir.path(), false).unwrap());
    let vegeta = &character_aggregates(&report.files, &refs())[0];

    let t = &vegeta.summary.totals;
    let a = &vegeta.summary.averages;
    assert_eq!(t.match_count, 4);
    assert_eq!(t.active_match_count, 2);
    assert_eq!(a.avg_damage, t.total_damage as f64 / t.active_match_count as f64);
    assert_eq!(a.avg_damage_taken, t.total_damage_taken as f64 / 2.0);
    assert_eq!(a.avg_kills, t.total_kills as f64 / 2.0);
    assert!((a.dps - 120000.0 / 160.0).abs() < 1e-9);
}

#[test]
fn test_team_headline_ignores_bench() {
    let mut record = serde_json::Map::new();
    for slot in 1..=8 {
        record.insert(
            format!("AlliesTeamMember{}", slot),
            fighter(&format!("{:04}_00", 5000 + slot), 10000 * slot as i64, 60, 20000),
        );
    }
    let doc = json!({
        "teams": ["Deep Bench", "Opponents"],
        "battleWinLose": "Win",
        "characterRecord": record
    });
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bench.json", &doc);
    let report = load_battle_files(&collect_json_files(dir.path(), false).unwrap());

    let teams = team_aggregates(&report.files, &refs());
    let bench = teams.iter().find(|t| t.name == "Deep Bench").unwrap();
    assert_eq!(bench.character_averages.len(), 8);
    // Slots 4..=8 are the top five
    assert_eq!(bench.avg_damage_per_match, (40000 + 50000 + 60000 + 70000 + 80000) as f64);
    assert_eq!(bench.win_rate, 100.0);
}
