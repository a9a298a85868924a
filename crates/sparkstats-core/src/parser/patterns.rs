use once_cell::sync::Lazy;
use regex::Regex;

// === Durations ===
// "+00000000.00:02:15.500000": optional day count, then HH:MM:SS.fraction
pub static BATTLE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:(\d+)\.)?(\d{2}):(\d{2}):(\d{2})\.(\d+)").unwrap());

// === Record keys ===
// "AlliesTeamMember2", also inside a (Key="...") wrapper
pub static TEAM_MEMBER_SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(AlliesTeamMember|EnemyTeamMember)(\d+)").unwrap());
// (Key="0000_00")
pub static WRAPPED_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*\(\s*Key\s*=\s*"([^"]*)"\s*\)\s*$"#).unwrap());
// Trailing slot digits after a legacy １Ｐ/２Ｐ marker (ASCII or full-width)
pub static LEGACY_SLOT_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9０-９]+").unwrap());

// === Items ===
pub const CAPSULE_PREFIX: &str = "00_0_";

// === Legacy blast keys (runBlastCount) ===
pub const S1_BLAST_MARKER: &str = "SPM1";
pub const S2_BLAST_MARKERS: [&str; 2] = ["SPM2", "SPM3"];
pub const EXA1_BLAST_MARKER: &str = "EXA1";
pub const EXA2_BLAST_MARKER: &str = "EXA2";

// === Legacy player markers ===
pub const LEGACY_ALLY_MARKER: &str = "１Ｐ";
pub const LEGACY_ENEMY_MARKER: &str = "２Ｐ";
