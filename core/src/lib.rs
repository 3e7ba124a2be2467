#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the logmix workspace.
//!
//! This crate defines the vocabulary that connects the pure systems, the
//! generator, and the adapters. Callers describe the desired mix of log
//! severities as [`LevelRatios`] together with the [`PinnedLevels`] they fixed
//! explicitly. The validation system gates that input, the distribution system
//! turns it into a [`RangePartition`] over a fixed sampling space of
//! [`RANGE_CAPACITY`] units, and the sampling system draws from that space to
//! emit records through a [`LogSink`] while tallying [`LevelCounts`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod sink;

pub use sink::{CaptureSink, DiscardSink, LogSink};

/// Number of severity levels understood by the generator.
pub const LEVEL_COUNT: usize = 6;

/// Percentage that a complete ratio vector must add up to.
pub const FULL_PERCENT: f64 = 100.0;

/// Units of sampling space allotted to each whole percentage point.
pub const UNITS_PER_PERCENT: u64 = LEVEL_COUNT as u64 * 100;

/// Total width of the sampling space partitioned between the levels.
pub const RANGE_CAPACITY: u64 = UNITS_PER_PERCENT * 100;

/// Process exit code used when a fatal record terminates the run.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Log severity levels ordered from most to least severe.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unrecoverable failure; emitting it terminates the process by default.
    Fatal,
    /// Failure of a single operation.
    Error,
    /// Something unexpected that did not fail.
    Warn,
    /// Routine operational message.
    Info,
    /// Diagnostic detail.
    Debug,
    /// Finest-grained diagnostic detail.
    Trace,
}

impl Severity {
    /// Every severity in index order, Fatal first.
    pub const ALL: [Severity; LEVEL_COUNT] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Trace,
    ];

    /// Position of the level within ratio vectors and partitions.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name of the level.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Fixed body emitted for every synthesized record of this level.
    #[must_use]
    pub const fn placeholder_message(self) -> &'static str {
        match self {
            Self::Fatal => "fatal level message",
            Self::Error => "error level message",
            Self::Warn => "warn level message",
            Self::Info => "info level message",
            Self::Debug => "debug level message",
            Self::Trace => "trace level message",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Percentage share assigned to a single level. Fractional values are allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(f64);

impl Percent {
    /// No share at all.
    pub const ZERO: Percent = Percent(0.0);

    /// The entire sampling space.
    pub const HUNDRED: Percent = Percent(FULL_PERCENT);

    /// Wraps a raw percentage value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Retrieves the raw percentage value.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Returns whether the value lies in `[0, 100]`. Non-finite values never do.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        (0.0..=FULL_PERCENT).contains(&self.0)
    }

    /// Integer part of the value, rounding toward zero.
    #[must_use]
    pub fn truncated(&self) -> i64 {
        self.0.trunc() as i64
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Desired percentage for every level, indexed by [`Severity::index`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRatios([Percent; LEVEL_COUNT]);

impl LevelRatios {
    /// Ratio vector with every level at zero.
    pub const EMPTY: LevelRatios = LevelRatios([Percent::ZERO; LEVEL_COUNT]);

    /// Mix used when the caller does not pin any level.
    pub const DEFAULT_MIX: LevelRatios = LevelRatios::from_percentages([
        0.0, 10.0, 20.0, 50.0, 20.0, 0.0,
    ]);

    /// Creates a ratio vector from raw percentages ordered Fatal to Trace.
    #[must_use]
    pub const fn from_percentages(values: [f64; LEVEL_COUNT]) -> Self {
        let mut ratios = [Percent::ZERO; LEVEL_COUNT];
        let mut index = 0;
        while index < LEVEL_COUNT {
            ratios[index] = Percent::new(values[index]);
            index += 1;
        }
        Self(ratios)
    }

    /// Percentage assigned to the provided level.
    #[must_use]
    pub const fn get(&self, severity: Severity) -> Percent {
        self.0[severity.index()]
    }

    /// Overwrites the percentage assigned to the provided level.
    pub fn set(&mut self, severity: Severity, percent: Percent) {
        self.0[severity.index()] = percent;
    }

    /// Returns a copy with the provided level set to `percent`.
    #[must_use]
    pub fn with(mut self, severity: Severity, percent: Percent) -> Self {
        self.set(severity, percent);
        self
    }

    /// Sum of every level's percentage.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(Percent::get).sum()
    }

    /// Iterates over every level paired with its percentage.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, Percent)> + '_ {
        Severity::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Default for LevelRatios {
    fn default() -> Self {
        Self::DEFAULT_MIX
    }
}

/// Set of levels whose percentage the caller fixed explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PinnedLevels(u8);

impl PinnedLevels {
    /// Set without any pinned level.
    pub const NONE: PinnedLevels = PinnedLevels(0);

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::NONE
    }

    /// Pins the provided level. Returns `false` when it was already pinned.
    pub fn pin(&mut self, severity: Severity) -> bool {
        let inserted = !self.contains(severity);
        self.0 |= Self::bit(severity);
        inserted
    }

    /// Returns a copy with the provided level pinned.
    #[must_use]
    pub fn with(mut self, severity: Severity) -> Self {
        let _ = self.pin(severity);
        self
    }

    /// Returns whether the provided level is pinned.
    #[must_use]
    pub const fn contains(&self, severity: Severity) -> bool {
        self.0 & Self::bit(severity) != 0
    }

    /// Number of pinned levels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns whether no level is pinned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of levels left free for redistribution.
    #[must_use]
    pub const fn unpinned_count(&self) -> usize {
        LEVEL_COUNT - self.len()
    }

    /// Iterates over the pinned levels in severity order.
    pub fn iter(&self) -> impl Iterator<Item = Severity> + '_ {
        Severity::ALL
            .into_iter()
            .filter(move |severity| self.contains(*severity))
    }

    const fn bit(severity: Severity) -> u8 {
        1 << severity.index()
    }
}

impl FromIterator<Severity> for PinnedLevels {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        let mut pinned = Self::new();
        for severity in iter {
            let _ = pinned.pin(severity);
        }
        pinned
    }
}

/// Integer widths of each level's segment within the sampling space.
///
/// Widths nominally add up to [`RANGE_CAPACITY`]. Upward rounding during
/// derivation can leave the total a few units away from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangePartition([u64; LEVEL_COUNT]);

impl RangePartition {
    /// Creates a partition from widths ordered Fatal to Trace.
    #[must_use]
    pub const fn new(widths: [u64; LEVEL_COUNT]) -> Self {
        Self(widths)
    }

    /// Width of the segment assigned to the provided level.
    #[must_use]
    pub const fn width(&self, severity: Severity) -> u64 {
        self.0[severity.index()]
    }

    /// Widths ordered Fatal to Trace.
    #[must_use]
    pub const fn widths(&self) -> &[u64; LEVEL_COUNT] {
        &self.0
    }

    /// Sum of every segment width.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Iterates over every level paired with its width.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        Severity::ALL.into_iter().zip(self.0.iter().copied())
    }
}

/// Observed number of records per level. Levels never observed are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCounts(BTreeMap<Severity, u64>);

impl LevelCounts {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation of the provided level.
    pub fn record(&mut self, severity: Severity) {
        *self.0.entry(severity).or_insert(0) += 1;
    }

    /// Count for the provided level, if it was observed at least once.
    #[must_use]
    pub fn get(&self, severity: Severity) -> Option<u64> {
        self.0.get(&severity).copied()
    }

    /// Returns whether the provided level was observed.
    #[must_use]
    pub fn contains(&self, severity: Severity) -> bool {
        self.0.contains_key(&severity)
    }

    /// Total number of observations across every level.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Returns whether nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over observed levels in severity order.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        self.0.iter().map(|(severity, count)| (*severity, *count))
    }
}

/// A single problem found while validating a ratio vector.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RatioError {
    /// A level's percentage lies outside `[0, 100]`.
    #[error("{severity} level is outside possible range with value {percent}")]
    OutOfRange {
        /// Level carrying the offending value.
        severity: Severity,
        /// Value that was supplied.
        percent: Percent,
    },
    /// The truncated percentages do not add up to 100.
    #[error("log level ratio sum must equal 100, got {sum}")]
    SumMismatch {
        /// Sum of the integer parts of every level's percentage.
        sum: i64,
    },
}

/// Non-empty list of problems that prevented a generator from being built.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(Vec<RatioError>);

impl ValidationErrors {
    /// Wraps the collected errors, returning `None` when there are none.
    #[must_use]
    pub fn from_errors(errors: Vec<RatioError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Collected errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[RatioError] {
        &self.0
    }

}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a RatioError;
    type IntoIter = std::slice::Iter<'a, RatioError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn join_errors(errors: &[RatioError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons a ratio vector cannot be turned into a range partition.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DistributionError {
    /// Every level is pinned but the percentages do not add up to 100.
    #[error("every level is pinned but the ratios add up to {total}, not 100")]
    NoUnpinnedLevels {
        /// Sum of the supplied percentages.
        total: f64,
    },
    /// Only the fatal level is free, and it never absorbs redistributed share.
    #[error("only the fatal level is unpinned, so the remaining {remaining} percent has nowhere to go")]
    OnlyFatalUnpinned {
        /// Percentage left over after the pinned levels.
        remaining: f64,
    },
    /// A level would receive a negative or non-finite share of the sampling space.
    #[error("{severity} level cannot be given a share of {percent} percent")]
    InvalidShare {
        /// Level that would receive the share.
        severity: Severity,
        /// Share that was computed or supplied.
        percent: Percent,
    },
}
