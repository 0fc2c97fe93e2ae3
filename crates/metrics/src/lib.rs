pub mod bundle;
pub mod calculator;

pub use bundle::{
    Bucket, CountRow, Granularity, MetricsBundle, ResolutionRow, TableRef, TABLE_NAMES,
};
pub use calculator::{compute_metrics, from_snapshot};
