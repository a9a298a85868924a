pub mod capsules;
pub mod characters;

use std::path::Path;

pub use capsules::{load_capsule_csv, AiStrategyTable, CapsuleInfo, CapsuleTable};
pub use characters::CharacterNames;

use crate::error::Result;

/// The reference lookup tables every extractor call needs.
#[derive(Debug, Default, Clone)]
pub struct ReferenceData {
    pub characters: CharacterNames,
    pub capsules: CapsuleTable,
    pub ai_strategies: AiStrategyTable,
}

impl ReferenceData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_csv_bytes(characters_csv: &[u8], capsules_csv: &[u8]) -> Result<Self> {
        let characters = CharacterNames::from_csv_bytes(characters_csv)?;
        let (capsules, ai_strategies) = load_capsule_csv(capsules_csv)?;
        Ok(Self {
            characters,
            capsules,
            ai_strategies,
        })
    }

    /// Load both tables from disk. A missing file leaves its table empty
    /// (names render as `-`, capsules go unresolved); unreadable or
    /// malformed files are errors.
    pub fn load(characters_path: &Path, capsules_path: &Path) -> Result<Self> {
        let mut refs = Self::empty();

        if characters_path.exists() {
            refs.characters = CharacterNames::from_path(characters_path)?;
        } else {
            log::warn!(
                "Character table not found at {}, names will show as '-'",
                characters_path.display()
            );
        }

        if capsules_path.exists() {
            let (capsules, ai_strategies) = load_capsule_csv(&std::fs::read(capsules_path)?)?;
            refs.capsules = capsules;
            refs.ai_strategies = ai_strategies;
        } else {
            log::warn!(
                "Capsule table not found at {}, builds will be unclassified",
                capsules_path.display()
            );
        }

        Ok(refs)
    }
}
