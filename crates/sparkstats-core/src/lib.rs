pub mod aggregate;
pub mod composition;
pub mod data;
pub mod encoding;
pub mod error;
pub mod export;
pub mod forms;
pub mod models;
pub mod parser;

pub use aggregate::{character_aggregates, position_aggregates, team_aggregates};
pub use composition::classify_build;
pub use data::ReferenceData;
pub use error::{Result, SparkStatsError};
pub use forms::calculate_per_form_stats;
pub use parser::normalizer::normalize_document;
pub use parser::{collect_json_files, load_battle_file, load_battle_files, LoadReport};
