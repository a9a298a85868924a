use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapsuleRow {
    name: String,
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    exclusive_to: String,
    #[serde(default)]
    cost: String,
    #[serde(default)]
    effect: String,
    #[serde(default)]
    build_type: String,
}

/// One gameplay capsule from capsules.csv.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleInfo {
    pub id: String,
    pub name: String,
    pub build_type: String,
    pub cost: i64,
    pub effect: String,
    pub exclusive_to: Option<String>,
}

/// Capsule id → capsule metadata.
#[derive(Debug, Default, Clone)]
pub struct CapsuleTable {
    capsules: HashMap<String, CapsuleInfo>,
}

impl CapsuleTable {
    pub fn get(&self, id: &str) -> Option<&CapsuleInfo> {
        self.capsules.get(id)
    }

    pub fn insert(&mut self, capsule: CapsuleInfo) {
        self.capsules.insert(capsule.id.clone(), capsule);
    }

    pub fn len(&self) -> usize {
        self.capsules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capsules.is_empty()
    }
}

/// AI strategy item id → strategy name.
#[derive(Debug, Default, Clone)]
pub struct AiStrategyTable {
    strategies: HashMap<String, String>,
}

impl AiStrategyTable {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.strategies.get(id).map(|s| s.as_str())
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.strategies.insert(id.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Load capsules.csv (header `name,id,type,exclusiveTo,cost,effect`, optional
/// `buildType`), splitting gameplay capsules from AI strategy entries.
/// Cosmetic rows (Costume, Sparking BGM, ...) are skipped.
pub fn load_capsule_csv(data: &[u8]) -> Result<(CapsuleTable, AiStrategyTable)> {
    let mut capsules = CapsuleTable::default();
    let mut strategies = AiStrategyTable::default();
    let mut skipped = 0usize;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    for result in rdr.deserialize::<CapsuleRow>() {
        let row = result?;
        if row.id.is_empty() {
            continue;
        }
        match row.kind.as_str() {
            "Capsule" => {
                let cost = if row.cost.is_empty() {
                    0
                } else {
                    row.cost.parse::<i64>().unwrap_or_else(|e| {
                        log::warn!("Bad capsule cost for '{}' ({}): {}", row.name, row.cost, e);
                        0
                    })
                };
                capsules.insert(CapsuleInfo {
                    id: row.id,
                    name: row.name,
                    build_type: row.build_type,
                    cost,
                    effect: row.effect,
                    exclusive_to: Some(row.exclusive_to).filter(|s| !s.is_empty()),
                });
            }
            "AI" => strategies.insert(row.id, row.name),
            _ => skipped += 1,
        }
    }

    log::info!(
        "Loaded {} capsules, {} AI strategies ({} cosmetic rows skipped)",
        capsules.len(),
        strategies.len(),
        skipped
    );
    Ok((capsules, strategies))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"name,id,type,exclusiveTo,cost,effect,buildType
Dragon Power,00_0_0001,Capsule,,2,Melee damage up,Melee
Saiyan Spirit,00_0_0002,Capsule,Goku,5,Ki blast damage up,Ki-Blast
Balanced Type,00_7_0001,AI,,0,Balanced tactics,
Battle Suit,00_1_0003,Costume,Vegeta,0,Cosmetic,
Theme,00_5_0004,Sparking BGM,,0,Music,
";

    #[test]
    fn test_split_capsules_and_ai() {
        let (capsules, ai) = load_capsule_csv(SAMPLE).unwrap();
        assert_eq!(capsules.len(), 2);
        assert_eq!(ai.len(), 1);
        assert_eq!(ai.get("00_7_0001"), Some("Balanced Type"));
        assert!(capsules.get("00_1_0003").is_none());
        assert!(capsules.get("00_5_0004").is_none());
    }

    #[test]
    fn test_capsule_fields() {
        let (capsules, _) = load_capsule_csv(SAMPLE).unwrap();
        let c = capsules.get("00_0_0002").unwrap();
        assert_eq!(c.name, "Saiyan Spirit");
        assert_eq!(c.cost, 5);
        assert_eq!(c.build_type, "Ki-Blast");
        assert_eq!(c.exclusive_to.as_deref(), Some("Goku"));

        let c = capsules.get("00_0_0001").unwrap();
        assert_eq!(c.exclusive_to, None);
    }

    #[test]
    fn test_without_build_type_column() {
        let csv = b"name,id,type,exclusiveTo,cost,effect\nWall,00_0_0009,Capsule,,3,Guard up\n";
        let (capsules, _) = load_capsule_csv(csv).unwrap();
        let c = capsules.get("00_0_0009").unwrap();
        assert_eq!(c.cost, 3);
        assert_eq!(c.build_type, "");
    }

    #[test]
    fn test_bad_cost_defaults_to_zero() {
        let csv = b"name,id,type,exclusiveTo,cost,effect\nOdd,00_0_0010,Capsule,,??,x\n";
        let (capsules, _) = load_capsule_csv(csv).unwrap();
        assert_eq!(capsules.get("00_0_0010").unwrap().cost, 0);
    }
}
