use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parser::normalizer::normalize_record_key;

/// One loaded battle-result document.
#[derive(Debug, Clone)]
pub struct BattleFile {
    pub name: String,
    pub content: Value,
}

impl BattleFile {
    pub fn new(name: impl Into<String>, content: Value) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// `battleWinLose`, always from the allied (team 1) point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Lose => "Lose",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Some(Outcome::Win),
            "lose" => Some(Outcome::Lose),
            _ => None,
        }
    }

    /// Whether the given side won under this outcome.
    pub fn side_won(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Outcome::Win, Side::Ally) | (Outcome::Lose, Side::Enemy)
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    /// Index into a `teams: [team1, team2]` pair.
    pub fn team_index(&self) -> usize {
        match self {
            Side::Ally => 0,
            Side::Enemy => 1,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }
}

/// A parsed character-record key: which side and which 1-based slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub side: Side,
    pub slot: u32,
}

/// Roster position within a team. Serialized as its number (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    Lead = 1,
    Middle = 2,
    Anchor = 3,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Lead, Position::Middle, Position::Anchor];

    /// Position of the `index`-th (1-based) member of a team of `team_size`.
    /// A lone member is the Lead.
    pub fn from_index(index: usize, team_size: usize) -> Self {
        if index <= 1 {
            Position::Lead
        } else if index >= team_size {
            Position::Anchor
        } else {
            Position::Middle
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Lead => "Lead",
            Position::Middle => "Middle",
            Position::Anchor => "Anchor",
        }
    }
}

impl Serialize for Position {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a `characterRecord`.
#[derive(Debug, Clone)]
pub struct CharacterSlot {
    /// Raw key as it appeared in the document.
    pub key: String,
    /// `None` when the key carries no recognizable side marker.
    pub slot: Option<SlotKey>,
    pub node: Value,
}

/// `characterIdRecord` indexed by normalized character id.
/// Both `0000_00` and `(Key="0000_00")` keys resolve to the same entry.
#[derive(Debug, Clone, Default)]
pub struct SnapshotIndex {
    snapshots: HashMap<String, Value>,
}

impl SnapshotIndex {
    pub fn from_value(value: Option<&Value>) -> Self {
        let snapshots = value
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (normalize_record_key(k).to_string(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Self { snapshots }
    }

    pub fn get(&self, character_id: &str) -> Option<&Value> {
        self.snapshots.get(normalize_record_key(character_id))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Canonical battle result, whatever schema variant it was read from.
#[derive(Debug, Clone, Default)]
pub struct BattleResult {
    pub outcome: Option<Outcome>,
    pub characters: Vec<CharacterSlot>,
    pub snapshots: SnapshotIndex,
    pub teams: Option<[String; 2]>,
}

impl BattleResult {
    /// Slots of one side ordered by slot number.
    pub fn side_slots(&self, side: Side) -> Vec<&CharacterSlot> {
        let mut slots: Vec<&CharacterSlot> = self
            .characters
            .iter()
            .filter(|c| c.slot.map(|s| s.side) == Some(side))
            .collect();
        slots.sort_by_key(|c| c.slot.map(|s| s.slot).unwrap_or(u32::MAX));
        slots
    }

    pub fn team_name(&self, side: Side) -> Option<&str> {
        self.teams.as_ref().map(|t| t[side.team_index()].as_str())
    }
}
