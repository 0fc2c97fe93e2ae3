use chrono::NaiveDate;

/// The fixed names of the nine derived tables, in presentation order.
pub const TABLE_NAMES: [&str; 9] = [
    "daily_commits",
    "weekly_commits",
    "monthly_commits",
    "yearly_commits",
    "daily_pr_merge_rate",
    "weekly_pr_merge_rate",
    "monthly_pr_merge_rate",
    "yearly_pr_merge_rate",
    "pr_resolution_times",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    /// Declared scan order for keyword extraction. First match wins.
    pub const ALL: [Granularity; 4] = [
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Yearly,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
            Granularity::Yearly => "Yearly",
        }
    }
}

/// A grouping key. Weeks follow ISO-8601 numbering, so the year
/// component of `Week` is the ISO year, which can differ from the
/// calendar year at year edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    Day(NaiveDate),
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Bucket {
    /// Chart-ready x-axis label.
    pub fn label(&self) -> String {
        match *self {
            Bucket::Day(date) => date.to_string(),
            Bucket::Week { year, week } => format!("{year}-W{week:02}"),
            Bucket::Month { year, month } => format!("{year}-{month:02}"),
            Bucket::Year(year) => year.to_string(),
        }
    }
}

/// One aggregate bucket: (author identity, bucket) -> count. Commit
/// tables key authors by display name, PR merge tables by login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub author: String,
    pub bucket: Bucket,
    pub count: u64,
}

/// One merged pull request's resolution time in days (2 d.p.).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRow {
    pub author_login: String,
    pub repo_name: String,
    pub number: i64,
    pub title: String,
    pub days: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsBundle {
    pub daily_commits: Vec<CountRow>,
    pub weekly_commits: Vec<CountRow>,
    pub monthly_commits: Vec<CountRow>,
    pub yearly_commits: Vec<CountRow>,
    pub daily_pr_merge_rate: Vec<CountRow>,
    pub weekly_pr_merge_rate: Vec<CountRow>,
    pub monthly_pr_merge_rate: Vec<CountRow>,
    pub yearly_pr_merge_rate: Vec<CountRow>,
    pub pr_resolution_times: Vec<ResolutionRow>,
}

#[derive(Debug, Clone, Copy)]
pub enum TableRef<'a> {
    Counts(&'a [CountRow]),
    Resolutions(&'a [ResolutionRow]),
}

impl MetricsBundle {
    pub fn commit_table(&self, granularity: Granularity) -> &[CountRow] {
        match granularity {
            Granularity::Daily => &self.daily_commits,
            Granularity::Weekly => &self.weekly_commits,
            Granularity::Monthly => &self.monthly_commits,
            Granularity::Yearly => &self.yearly_commits,
        }
    }

    pub fn merge_rate_table(&self, granularity: Granularity) -> &[CountRow] {
        match granularity {
            Granularity::Daily => &self.daily_pr_merge_rate,
            Granularity::Weekly => &self.weekly_pr_merge_rate,
            Granularity::Monthly => &self.monthly_pr_merge_rate,
            Granularity::Yearly => &self.yearly_pr_merge_rate,
        }
    }

    /// Lookup by one of the nine fixed table names.
    pub fn table(&self, name: &str) -> Option<TableRef<'_>> {
        let table = match name {
            "daily_commits" => TableRef::Counts(&self.daily_commits),
            "weekly_commits" => TableRef::Counts(&self.weekly_commits),
            "monthly_commits" => TableRef::Counts(&self.monthly_commits),
            "yearly_commits" => TableRef::Counts(&self.yearly_commits),
            "daily_pr_merge_rate" => TableRef::Counts(&self.daily_pr_merge_rate),
            "weekly_pr_merge_rate" => TableRef::Counts(&self.weekly_pr_merge_rate),
            "monthly_pr_merge_rate" => TableRef::Counts(&self.monthly_pr_merge_rate),
            "yearly_pr_merge_rate" => TableRef::Counts(&self.yearly_pr_merge_rate),
            "pr_resolution_times" => TableRef::Resolutions(&self.pr_resolution_times),
            _ => return None,
        };
        Some(table)
    }

    /// Known developer display names in table order, deduplicated. This
    /// order is the declared tie-break for query matching.
    pub fn developers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.daily_commits {
            if !seen.contains(&row.author) {
                seen.push(row.author.clone());
            }
        }
        seen
    }

    /// Ordered (label, count) commit series for one developer. Empty when
    /// the developer has no rows at this granularity.
    pub fn commit_series(&self, granularity: Granularity, author: &str) -> Vec<(String, u64)> {
        self.commit_table(granularity)
            .iter()
            .filter(|row| row.author == author)
            .map(|row| (row.bucket.label(), row.count))
            .collect()
    }
}
