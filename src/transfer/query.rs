//! Search query construction.
//!
//! Builds the `q` parameter of a files.list call from name fragments and an
//! optional minimum age. Fragments are inserted verbatim: quotes and
//! backslashes are not escaped, so a fragment containing them produces a
//! query the provider may reject or read differently.
//!
//! An age of zero still counts as given: the `createdTime` clause is kept
//! and compares against the current instant.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Days counted per year of age.
const DAYS_PER_YEAR: i64 = 365;

/// Timestamp layout of `createdTime` comparisons.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Search query over file names and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    patterns: Vec<String>,
    min_age_years: Option<u32>,
}

impl FileQuery {
    /// Creates a query matching any of `patterns`.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            min_age_years: None,
        }
    }

    /// Restricts the query to files created at least `years` years ago.
    pub fn with_min_age_years(mut self, years: Option<u32>) -> Self {
        self.min_age_years = years;
        self
    }

    /// Name fragments, in order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Builds the query string relative to the current time.
    pub fn build(&self) -> String {
        self.build_at(Utc::now())
    }

    /// Builds the query string relative to `now`.
    pub fn build_at(&self, now: DateTime<Utc>) -> String {
        for pattern in &self.patterns {
            if pattern.contains(|c: char| c == '\'' || c == '\\') {
                warn!(pattern = %pattern, "Pattern contains query delimiters and is used unescaped");
            }
        }

        let names = self
            .patterns
            .iter()
            .map(|pattern| format!("name contains '{}'", pattern))
            .collect::<Vec<_>>()
            .join(" or ");

        match self.min_age_years {
            Some(years) => format!(
                "({}) and createdTime < '{}'",
                names,
                cutoff(now, years).format(TIMESTAMP_FORMAT)
            ),
            None => names,
        }
    }
}

/// Latest creation time a file `years` years old can have.
pub fn cutoff(now: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    now - Duration::days(DAYS_PER_YEAR * i64::from(years))
}
