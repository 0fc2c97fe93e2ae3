use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use common::{AppError, Result};
use normalizer::models::{CommitRecord, PullRequestRecord};
use normalizer::NOT_AVAILABLE;
use store::SnapshotStore;
use tracing::warn;

use crate::bundle::{Bucket, CountRow, MetricsBundle, ResolutionRow};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Compute all nine tables from an already-loaded snapshot. Pure in its
/// inputs; rerunning over the same rows yields identical tables.
pub fn compute_metrics(commits: &[CommitRecord], pulls: &[PullRequestRecord]) -> MetricsBundle {
    let (daily_commits, weekly_commits, monthly_commits, yearly_commits) =
        commit_frequency(commits);
    let (daily_pr_merge_rate, weekly_pr_merge_rate, monthly_pr_merge_rate, yearly_pr_merge_rate) =
        pr_merge_rate(pulls);
    let pr_resolution_times = pr_resolution_time(pulls);

    MetricsBundle {
        daily_commits,
        weekly_commits,
        monthly_commits,
        yearly_commits,
        daily_pr_merge_rate,
        weekly_pr_merge_rate,
        monthly_pr_merge_rate,
        yearly_pr_merge_rate,
        pr_resolution_times,
    }
}

/// Load the persisted datasets and aggregate them. The repositories
/// snapshot is read to validate the snapshot set is complete even though
/// aggregation only consumes commits and pull requests.
pub fn from_snapshot(store: &SnapshotStore) -> Result<MetricsBundle> {
    let _repositories = store.load_repositories()?;
    let commits = store.load_commits()?;
    let pulls = store.load_pull_requests()?;
    Ok(compute_metrics(&commits, &pulls))
}

type CountTables = (Vec<CountRow>, Vec<CountRow>, Vec<CountRow>, Vec<CountRow>);

/// Commits bucketed four ways, keyed by author display name. Unparsable
/// dates are excluded from every date-keyed grouping rather than raised.
fn commit_frequency(commits: &[CommitRecord]) -> CountTables {
    let mut grouper = Grouper::default();
    let mut unknown_dates = 0usize;
    for commit in commits {
        let Some(ts) = parse_utc(&commit.date) else {
            unknown_dates += 1;
            continue;
        };
        grouper.add(&commit.author_name, ts);
    }
    if unknown_dates > 0 {
        warn!(
            count = unknown_dates,
            "commits with unparsable dates excluded from grouping"
        );
    }
    grouper.into_tables()
}

/// Merged pull requests bucketed four ways by their merge timestamp,
/// keyed by author login (not display name).
fn pr_merge_rate(pulls: &[PullRequestRecord]) -> CountTables {
    let mut grouper = Grouper::default();
    for pr in pulls {
        let Some(merged_raw) = pr.merged_at.as_deref() else {
            continue;
        };
        let Some(merged) = parse_utc(merged_raw) else {
            let err = AppError::integrity(format!(
                "pull request #{} has an unparsable merged timestamp",
                pr.number
            ));
            warn!(repo = %pr.repo_name, error = %err, "excluded from merge rate");
            continue;
        };
        grouper.add(&pr.author_login, merged);
    }
    grouper.into_tables()
}

/// One row per merged pull request; unmerged pull requests are not
/// represented at all.
fn pr_resolution_time(pulls: &[PullRequestRecord]) -> Vec<ResolutionRow> {
    let mut rows = Vec::new();
    for pr in pulls {
        let Some(merged_raw) = pr.merged_at.as_deref() else {
            continue;
        };
        match resolution_days(pr, merged_raw) {
            Ok(days) => rows.push(ResolutionRow {
                author_login: pr.author_login.clone(),
                repo_name: pr.repo_name.clone(),
                number: pr.number,
                title: pr.title.clone(),
                days,
            }),
            Err(err) => {
                warn!(repo = %pr.repo_name, error = %err, "excluded from resolution times");
            }
        }
    }
    rows
}

/// Elapsed days between creation and merge, rounded to two decimals.
/// Unparsable timestamps and a merge preceding creation are data
/// integrity violations; the row is excluded, never clamped.
fn resolution_days(pr: &PullRequestRecord, merged_raw: &str) -> Result<f64> {
    let created = parse_utc(&pr.created_at).ok_or_else(|| {
        AppError::integrity(format!(
            "pull request #{} has an unparsable created timestamp",
            pr.number
        ))
    })?;
    let merged = parse_utc(merged_raw).ok_or_else(|| {
        AppError::integrity(format!(
            "pull request #{} has an unparsable merged timestamp",
            pr.number
        ))
    })?;
    if merged < created {
        return Err(AppError::integrity(format!(
            "pull request #{} merged before created",
            pr.number
        )));
    }
    Ok(round2((merged - created).num_seconds() as f64 / SECONDS_PER_DAY))
}

/// Accumulates one timestamp into all four granularities at once.
/// BTreeMaps make the flattened row order deterministic.
#[derive(Default)]
struct Grouper {
    daily: BTreeMap<(String, Bucket), u64>,
    weekly: BTreeMap<(String, Bucket), u64>,
    monthly: BTreeMap<(String, Bucket), u64>,
    yearly: BTreeMap<(String, Bucket), u64>,
}

impl Grouper {
    fn add(&mut self, author: &str, ts: DateTime<Utc>) {
        let iso = ts.iso_week();
        bump(&mut self.daily, author, Bucket::Day(ts.date_naive()));
        bump(
            &mut self.weekly,
            author,
            Bucket::Week {
                year: iso.year(),
                week: iso.week(),
            },
        );
        bump(
            &mut self.monthly,
            author,
            Bucket::Month {
                year: ts.year(),
                month: ts.month(),
            },
        );
        bump(&mut self.yearly, author, Bucket::Year(ts.year()));
    }

    fn into_tables(self) -> CountTables {
        (
            flatten(self.daily),
            flatten(self.weekly),
            flatten(self.monthly),
            flatten(self.yearly),
        )
    }
}

fn bump(map: &mut BTreeMap<(String, Bucket), u64>, author: &str, bucket: Bucket) {
    *map.entry((author.to_string(), bucket)).or_insert(0) += 1;
}

fn flatten(map: BTreeMap<(String, Bucket), u64>) -> Vec<CountRow> {
    map.into_iter()
        .map(|((author, bucket), count)| CountRow {
            author,
            bucket,
            count,
        })
        .collect()
}

/// Parse a timestamp into UTC. Zoned stamps are converted; naive stamps
/// are assumed UTC; anything else is `None` (coerce-on-error).
fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Granularity;

    fn commit(author: &str, date: &str) -> CommitRecord {
        CommitRecord {
            repo_id: 1,
            sha: format!("{author}-{date}"),
            date: date.into(),
            message: "m".into(),
            author_name: author.into(),
            author_email: "a@example.com".into(),
        }
    }

    fn pull(
        login: &str,
        number: i64,
        created: &str,
        merged: Option<&str>,
    ) -> PullRequestRecord {
        PullRequestRecord {
            repo_name: "widget".into(),
            number,
            title: format!("pr {number}"),
            author_login: login.into(),
            state: "closed".into(),
            created_at: created.into(),
            updated_at: created.into(),
            merged_at: merged.map(|m| m.to_string()),
            issue_id: number.to_string(),
            author_name: "N/A".into(),
            author_email: "N/A".into(),
        }
    }

    #[test]
    fn daily_buckets_partition_all_commits() {
        let commits = vec![
            commit("Jane Doe", "2024-03-01T09:00:00Z"),
            commit("Jane Doe", "2024-03-01T17:00:00Z"),
            commit("Jane Doe", "2024-03-02T09:00:00Z"),
            commit("Al Smith", "2024-03-01T09:00:00Z"),
        ];
        let bundle = compute_metrics(&commits, &[]);

        for granularity in Granularity::ALL {
            let jane_total: u64 = bundle
                .commit_table(granularity)
                .iter()
                .filter(|r| r.author == "Jane Doe")
                .map(|r| r.count)
                .sum();
            assert_eq!(jane_total, 3, "partition broken at {granularity:?}");
        }
        assert_eq!(
            bundle.commit_series(Granularity::Daily, "Jane Doe"),
            vec![("2024-03-01".to_string(), 2), ("2024-03-02".to_string(), 1)]
        );
    }

    #[test]
    fn unparsable_commit_dates_are_excluded_not_fatal() {
        let commits = vec![
            commit("Jane Doe", "2024-03-01T09:00:00Z"),
            commit("Jane Doe", "not a date"),
        ];
        let bundle = compute_metrics(&commits, &[]);
        let total: u64 = bundle.daily_commits.iter().map(|r| r.count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn iso_week_spans_year_boundary() {
        // 2024-12-30 and 2025-01-02 both fall in ISO week 1 of 2025.
        let commits = vec![
            commit("Jane Doe", "2024-12-30T12:00:00Z"),
            commit("Jane Doe", "2025-01-02T12:00:00Z"),
        ];
        let bundle = compute_metrics(&commits, &[]);
        assert_eq!(bundle.weekly_commits.len(), 1);
        assert_eq!(
            bundle.weekly_commits[0].bucket,
            Bucket::Week { year: 2025, week: 1 }
        );
        assert_eq!(bundle.weekly_commits[0].count, 2);
        // Yearly grouping still uses the calendar year.
        assert_eq!(bundle.yearly_commits.len(), 2);
    }

    #[test]
    fn merge_rate_uses_merged_timestamp_and_login() {
        let pulls = vec![
            pull(
                "jdoe",
                1,
                "2024-01-01T00:00:00Z",
                Some("2024-02-01T00:00:00Z"),
            ),
            pull("jdoe", 2, "2024-01-01T00:00:00Z", None),
        ];
        let bundle = compute_metrics(&[], &pulls);

        let daily = bundle.merge_rate_table(Granularity::Daily);
        assert_eq!(daily.len(), 1);
        let row = &daily[0];
        assert_eq!(row.author, "jdoe");
        // Keyed by merge date, not creation date.
        assert_eq!(
            row.bucket,
            Bucket::Day(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        );
        // The unmerged PR appears nowhere.
        assert_eq!(row.count, 1);
        assert_eq!(bundle.pr_resolution_times.len(), 1);
    }

    #[test]
    fn naive_and_zoned_timestamps_normalize_to_utc() {
        // Created 10:00 naive (assumed UTC), merged next day 12:00 at
        // +02:00, i.e. 10:00 UTC: exactly one day.
        let pulls = vec![pull(
            "jdoe",
            1,
            "2024-01-10T10:00:00",
            Some("2024-01-11T12:00:00+02:00"),
        )];
        let bundle = compute_metrics(&[], &pulls);
        assert_eq!(bundle.pr_resolution_times[0].days, 1.0);
        assert_eq!(
            bundle.daily_pr_merge_rate[0].bucket,
            Bucket::Day(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap())
        );
    }

    #[test]
    fn resolution_time_rounds_to_two_decimals() {
        // Six hours and five minutes is 0.2534... days, rounded to 0.25.
        let pulls = vec![pull(
            "jdoe",
            1,
            "2024-01-10T00:00:00Z",
            Some("2024-01-10T06:05:00Z"),
        )];
        let bundle = compute_metrics(&[], &pulls);
        assert_eq!(bundle.pr_resolution_times[0].days, 0.25);
    }

    #[test]
    fn merged_before_created_is_excluded_not_clamped() {
        let pulls = vec![
            pull(
                "jdoe",
                1,
                "2024-01-10T10:00:00Z",
                Some("2024-01-10T09:00:00Z"),
            ),
            pull(
                "jdoe",
                2,
                "2024-01-10T10:00:00Z",
                Some("2024-01-10T11:00:00Z"),
            ),
        ];
        let bundle = compute_metrics(&[], &pulls);
        assert_eq!(bundle.pr_resolution_times.len(), 1);
        assert_eq!(bundle.pr_resolution_times[0].number, 2);
        assert!(bundle.pr_resolution_times.iter().all(|r| r.days >= 0.0));

        // The exclusion is classified as a data integrity violation.
        let err = resolution_days(&pulls[0], "2024-01-10T09:00:00Z").unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn unparsable_pr_timestamps_are_integrity_exclusions() {
        let pulls = vec![
            pull("jdoe", 1, "2024-01-10T10:00:00Z", Some("not a date")),
            pull("jdoe", 2, "not a date", Some("2024-01-11T10:00:00Z")),
            pull(
                "jdoe",
                3,
                "2024-01-10T10:00:00Z",
                Some("2024-01-11T10:00:00Z"),
            ),
        ];
        let bundle = compute_metrics(&[], &pulls);

        // Only the parsable row survives resolution; the merge-rate
        // tables drop the unparsable merged timestamp too (the row with
        // an unparsable created timestamp still merges on a valid date).
        assert_eq!(bundle.pr_resolution_times.len(), 1);
        assert_eq!(bundle.pr_resolution_times[0].number, 3);
        let merged_total: u64 = bundle
            .merge_rate_table(Granularity::Yearly)
            .iter()
            .map(|r| r.count)
            .sum();
        assert_eq!(merged_total, 2);

        let err = resolution_days(&pulls[0], "not a date").unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
        let err = resolution_days(&pulls[1], "2024-01-11T10:00:00Z").unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let commits = vec![
            commit("Jane Doe", "2024-03-01T09:00:00Z"),
            commit("Al Smith", "2024-04-02T09:00:00Z"),
        ];
        let pulls = vec![pull(
            "jdoe",
            1,
            "2024-01-01T00:00:00Z",
            Some("2024-01-03T00:00:00Z"),
        )];
        let first = compute_metrics(&commits, &pulls);
        let second = compute_metrics(&commits, &pulls);
        assert_eq!(first, second);
    }

    #[test]
    fn table_lookup_covers_all_nine_names() {
        let bundle = compute_metrics(&[], &[]);
        for name in crate::bundle::TABLE_NAMES {
            assert!(bundle.table(name).is_some(), "missing table {name}");
        }
        assert!(bundle.table("hourly_commits").is_none());
    }
}
