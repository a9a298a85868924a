pub mod battle;
pub mod build;
pub mod stats;

pub use battle::{
    BattleFile, BattleResult, CharacterSlot, Outcome, Position, Side, SlotKey, SnapshotIndex,
};
pub use build::{BuildCategory, BuildComposition, BuildKind, CategoryBreakdown, CategoryShare};
pub use stats::{hit_rate, CharacterStats, CombatCounters, EquippedCapsule, FormStats};
