//! Keyword query resolution over a computed metrics bundle.
//!
//! Matching is exact-substring and case-insensitive, with first-match
//! tie-breaks in declared order: granularity keywords in the order
//! daily, weekly, monthly, yearly; developers in the order they appear
//! in the daily commit table. An unmatched query is an explicit `None`,
//! never an error and never a defaulted series.

use metrics::{Granularity, MetricsBundle};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Line,
    Bar,
}

/// The full contract the presentation layer renders from: an ordered
/// series of (x-axis label, count) points, a style, and a title.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub style: ChartStyle,
    pub points: Vec<(String, u64)>,
}

pub fn resolve(query: &str, metrics: &MetricsBundle) -> Option<ChartSpec> {
    let lowered = query.to_lowercase();

    let granularity = extract_granularity(&lowered)?;
    let developer = extract_developer(&lowered, metrics)?;
    debug!(?granularity, developer = %developer, "query matched");

    let points = metrics.commit_series(granularity, &developer);
    if points.is_empty() {
        debug!(developer = %developer, "no rows at requested granularity");
        return None;
    }

    Some(ChartSpec {
        title: title_for(granularity, &developer),
        style: style_for(granularity),
        points,
    })
}

fn extract_granularity(lowered_query: &str) -> Option<Granularity> {
    Granularity::ALL
        .into_iter()
        .find(|g| lowered_query.contains(g.keyword()))
}

fn extract_developer(lowered_query: &str, metrics: &MetricsBundle) -> Option<String> {
    metrics
        .developers()
        .into_iter()
        .find(|dev| lowered_query.contains(&dev.to_lowercase()))
}

fn style_for(granularity: Granularity) -> ChartStyle {
    match granularity {
        Granularity::Daily | Granularity::Weekly => ChartStyle::Line,
        Granularity::Monthly | Granularity::Yearly => ChartStyle::Bar,
    }
}

fn title_for(granularity: Granularity, developer: &str) -> String {
    match granularity {
        Granularity::Daily | Granularity::Weekly => {
            format!("{} Commits for {} Over Time", granularity.label(), developer)
        }
        Granularity::Monthly | Granularity::Yearly => {
            format!("{} Commits for {}", granularity.label(), developer)
        }
    }
}
