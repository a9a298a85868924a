use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct CharacterRow {
    name: String,
    id: String,
}

/// In-memory character id → display name lookup, loaded from characters.csv.
#[derive(Debug, Default, Clone)]
pub struct CharacterNames {
    names: HashMap<String, String>,
}

impl CharacterNames {
    /// Load from CSV bytes (header row `name,id`).
    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        let mut names = HashMap::new();
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);

        for result in rdr.deserialize::<CharacterRow>() {
            let row = result?;
            if row.id.is_empty() || row.name.is_empty() {
                continue;
            }
            names.insert(row.id, row.name);
        }

        log::info!("Loaded {} character names", names.len());
        Ok(Self { names })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_csv_bytes(&std::fs::read(path)?)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(|s| s.as_str())
    }

    /// Display name for an id, `-` when unknown.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id).unwrap_or("-").to_string()
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_bytes() {
        let csv = b"name,id\nGoku (Z - Early),0000_00\nVegeta (Z - Scouter),0010_00\n";
        let names = CharacterNames::from_csv_bytes(csv).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get("0000_00"), Some("Goku (Z - Early)"));
        assert_eq!(names.get("0010_00"), Some("Vegeta (Z - Scouter)"));
    }

    #[test]
    fn test_blank_rows_skipped_and_trimmed() {
        let csv = b"name,id\n  Piccolo , 0100_00 \n,0200_00\nNobody,\n";
        let names = CharacterNames::from_csv_bytes(csv).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get("0100_00"), Some("Piccolo"));
    }

    #[test]
    fn test_display_name_unknown() {
        let names = CharacterNames::default();
        assert_eq!(names.display_name("9999_99"), "-");
    }

    #[test]
    fn test_from_path() {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"name,id\nFrieza,0300_00\n").unwrap();
        let names = CharacterNames::from_path(tmp.path()).unwrap();
        assert_eq!(names.get("0300_00"), Some("Frieza"));
    }
}
