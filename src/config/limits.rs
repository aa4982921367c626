//! Size limits and time windows for the digest pipeline.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Size budgets applied while building a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigestLimits {
    /// Maximum number of failure groups rendered.
    pub max_groups: usize,
    /// Maximum characters of a group's error line.
    pub max_error_chars: usize,
    /// Maximum characters of a group's inputs line.
    pub max_input_chars: usize,
    /// Maximum characters of the whole digest.
    pub max_total_chars: usize,
    /// Maximum number of runs requested from a run source.
    pub max_runs: usize,
}

impl Default for DigestLimits {
    fn default() -> Self {
        Self {
            max_groups: 6,
            max_error_chars: 280,
            max_input_chars: 180,
            max_total_chars: 3500,
            max_runs: 200,
        }
    }
}

/// Time windows relative to the invocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigestWindows {
    /// Runs newer than this many hours count as recent.
    pub recent_hours: i64,
    /// Runs older than this many days are ignored.
    pub max_age_days: i64,
}

impl Default for DigestWindows {
    fn default() -> Self {
        Self {
            recent_hours: 24,
            max_age_days: 7,
        }
    }
}

impl DigestWindows {
    /// Returns the recent window as a duration.
    #[must_use]
    pub fn recent(&self) -> Duration {
        Duration::try_hours(self.recent_hours).unwrap_or(Duration::MAX)
    }

    /// Returns the maximum run age as a duration.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        Duration::try_days(self.max_age_days).unwrap_or(Duration::MAX)
    }

    /// Earliest start time that still counts as recent.
    #[must_use]
    pub fn recent_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.recent())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Earliest start time still admitted into a digest.
    #[must_use]
    pub fn age_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.max_age())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Everything the digest pipeline needs besides its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DigestConfig {
    /// Size budgets.
    pub limits: DigestLimits,
    /// Time windows.
    pub windows: DigestWindows,
}

impl DigestConfig {
    /// Sets the limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: DigestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the maximum number of rendered groups.
    #[must_use]
    pub const fn with_max_groups(mut self, max_groups: usize) -> Self {
        self.limits.max_groups = max_groups;
        self
    }

    /// Sets the maximum digest size.
    #[must_use]
    pub const fn with_max_total_chars(mut self, max_total_chars: usize) -> Self {
        self.limits.max_total_chars = max_total_chars;
        self
    }
}
