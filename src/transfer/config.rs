//! Configuration for transfer runs.

use super::error::{TransferError, TransferResult};
use crate::batch::MAX_BATCH_SIZE;
use std::time::Duration;

/// Name fragments searched for by default.
pub const DEFAULT_PATTERNS: [&str; 4] = ["DRAFT", "Technical Narrative", "FY2", "202"];

/// Filename grammar applied after the search by default.
pub const DEFAULT_NAME_REGEX: &str = r"^FY\d{2}_[A-Za-z0-9\s]+_[A-Za-z0-9\s]+_\d{8}.*";

/// Minimum file age in years applied by default.
pub const DEFAULT_MIN_AGE_YEARS: u32 = 2;

/// Chunk size used by a transfer run unless configured otherwise.
pub const DEFAULT_TRANSFER_BATCH_SIZE: usize = 10;

/// Which files a run picks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Name fragments, any of which selects a file.
    pub patterns: Vec<String>,
    /// Only files created at least this many years ago. `None` disables the check.
    pub min_age_years: Option<u32>,
    /// Expression the file name must match from its first character.
    pub name_regex: String,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            min_age_years: Some(DEFAULT_MIN_AGE_YEARS),
            name_regex: DEFAULT_NAME_REGEX.to_string(),
        }
    }
}

/// Transfer run configuration.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// File selection.
    pub criteria: SelectionCriteria,
    /// Trash the source files after copying.
    pub trash: bool,
    /// Files per batch call for grants and copies.
    pub batch_size: usize,
    /// Maximum number of listing pages fetched.
    pub page_ceiling: usize,
    /// Pause before each copy batch.
    pub copy_delay: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            criteria: SelectionCriteria::default(),
            trash: false,
            batch_size: DEFAULT_TRANSFER_BATCH_SIZE,
            page_ceiling: super::DEFAULT_PAGE_CEILING,
            copy_delay: super::DEFAULT_COPY_DELAY,
        }
    }
}

impl TransferConfig {
    /// Creates a new config builder.
    pub fn builder() -> TransferConfigBuilder {
        TransferConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TransferResult<()> {
        if self.criteria.patterns.is_empty() {
            return Err(TransferError::configuration(
                "At least one name pattern is required",
            ));
        }

        if self.criteria.patterns.iter().any(|p| p.is_empty()) {
            return Err(TransferError::configuration("Name patterns must not be empty"));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(TransferError::configuration(format!(
                "Batch size must be between 1 and {}",
                MAX_BATCH_SIZE
            )));
        }

        if self.page_ceiling == 0 {
            return Err(TransferError::configuration(
                "Page ceiling must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Builder for TransferConfig.
#[derive(Debug, Clone, Default)]
pub struct TransferConfigBuilder {
    config: TransferConfig,
}

impl TransferConfigBuilder {
    /// Creates a builder holding the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name fragments.
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.criteria.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the minimum age in years, or disables it with `None`.
    pub fn min_age_years(mut self, years: Option<u32>) -> Self {
        self.config.criteria.min_age_years = years;
        self
    }

    /// Sets the filename expression.
    pub fn name_regex(mut self, regex: impl Into<String>) -> Self {
        self.config.criteria.name_regex = regex.into();
        self
    }

    /// Sets whether source files are trashed after copying.
    pub fn trash(mut self, trash: bool) -> Self {
        self.config.trash = trash;
        self
    }

    /// Sets the number of files per batch call.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Sets the maximum number of listing pages.
    pub fn page_ceiling(mut self, pages: usize) -> Self {
        self.config.page_ceiling = pages;
        self
    }

    /// Sets the pause before each copy batch.
    pub fn copy_delay(mut self, delay: Duration) -> Self {
        self.config.copy_delay = delay;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> TransferResult<TransferConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
