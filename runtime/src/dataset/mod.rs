//! Grouping of extracted tables into the exportable dataset, and the
//! post-run transforms applied to it.

pub mod consolidator;
pub mod transform;

pub use consolidator::{consolidate, ConsolidatedDataset, Consolidation};
pub use transform::{
    aggregate_players, clean_dataset, merge_players, player_profiles, AggregateRules,
    ColumnRules, Figures, TransformConfig,
};
