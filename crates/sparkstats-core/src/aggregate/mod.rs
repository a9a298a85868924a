pub mod characters;
pub mod matches;
pub mod positions;
pub mod summary;
pub mod teams;

pub use characters::{character_aggregates, CharacterAggregate, FormAggregate};
pub use matches::{collect_matches, MatchRecord, MatchSnapshot};
pub use positions::{position_aggregates, PositionAggregate, PositionCharacter};
pub use summary::{
    combat_performance_score, damage_efficiency, experience_multiplier, top_builds, BuildUsage,
    CharacterSummary, StatAverages, StatTotals,
};
pub use teams::{team_aggregates, MatchupRecord, OpponentRecord, TeamAggregate};
