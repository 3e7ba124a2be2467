#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Generator instance that owns a ratio vector, its pinned levels and a sink.
//!
//! Construction is the only gate: a [`LogGenerator`] either exists in a valid
//! state or was never built, in which case the caller receives every
//! [`RatioError`](logmix_core::RatioError) at once. After that, range
//! derivation and sampling are delegated to the pure systems.

use std::time::Duration;

use logmix_core::{
    DistributionError, LevelCounts, LevelRatios, LogSink, PinnedLevels, RangePartition, Severity,
    ValidationErrors,
};
use logmix_system_distribution::RangeDistributor;
use logmix_system_sampling::Sampler;
use logmix_system_validation::RatioValidator;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

mod tracing_sink;

pub use tracing_sink::{TracingSink, RECORD_TARGET};

/// Synthesizes log records at the proportions described by a ratio vector.
#[derive(Debug)]
pub struct LogGenerator<S = TracingSink> {
    pinned: PinnedLevels,
    ratios: LevelRatios,
    sink: S,
}

impl LogGenerator<TracingSink> {
    /// Creates a generator that emits records as `tracing` events.
    pub fn new(pinned: PinnedLevels, ratios: LevelRatios) -> Result<Self, ValidationErrors> {
        Self::with_sink(pinned, ratios, TracingSink)
    }
}

impl<S: LogSink> LogGenerator<S> {
    /// Creates a generator that emits records through `sink`.
    ///
    /// With no pinned level the ratios are validated as-is and every violation
    /// is returned. Once the caller pins a level, validation is skipped and
    /// the unpinned levels are balanced during range derivation instead.
    pub fn with_sink(
        pinned: PinnedLevels,
        ratios: LevelRatios,
        sink: S,
    ) -> Result<Self, ValidationErrors> {
        if pinned.is_empty() {
            let mut violations = Vec::new();
            RatioValidator.validate(&ratios, &mut violations);
            if let Some(errors) = ValidationErrors::from_errors(violations) {
                return Err(errors);
            }
        }

        Ok(Self {
            pinned,
            ratios,
            sink,
        })
    }

    /// Ratios supplied at construction. Derivation never rewrites them.
    #[must_use]
    pub fn ratios(&self) -> &LevelRatios {
        &self.ratios
    }

    /// Levels the caller fixed explicitly.
    #[must_use]
    pub fn pinned(&self) -> PinnedLevels {
        self.pinned
    }

    /// Sink receiving the synthesized records.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink, e.g. to drain captured records.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the generator and returns its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Partitions the sampling space between the levels.
    pub fn derive_distribution_ranges(&self) -> Result<RangePartition, DistributionError> {
        let ranges = RangeDistributor.derive_distribution_ranges(&self.ratios, self.pinned)?;
        debug!(widths = ?ranges.widths(), total = ranges.total(), "derived distribution ranges");
        Ok(ranges)
    }

    /// Draws `output_limit` records from `ranges` and tallies them per level.
    pub fn output<R: Rng + ?Sized>(
        &mut self,
        ranges: &RangePartition,
        output_limit: usize,
        delay: Duration,
        rng: &mut R,
    ) -> LevelCounts {
        debug!(output_limit, delay_ms = delay.as_millis() as u64, "sampling started");
        let counts = Sampler.output(ranges, output_limit, delay, rng, &mut self.sink);
        debug!(emitted = counts.total(), "sampling finished");
        counts
    }

    /// Derives the ranges and samples them in one step.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        output_limit: usize,
        delay: Duration,
        rng: &mut R,
    ) -> Result<GenerationReport, DistributionError> {
        let ranges = self.derive_distribution_ranges()?;
        let counts = self.output(&ranges, output_limit, delay, rng);
        Ok(GenerationReport::new(ranges, counts))
    }
}

/// Outcome of a complete generation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    ranges: RangePartition,
    counts: LevelCounts,
}

impl GenerationReport {
    /// Pairs a partition with the counts sampled from it.
    #[must_use]
    pub fn new(ranges: RangePartition, counts: LevelCounts) -> Self {
        Self { ranges, counts }
    }

    /// Partition the records were drawn from.
    #[must_use]
    pub fn ranges(&self) -> &RangePartition {
        &self.ranges
    }

    /// Observed number of records per level.
    #[must_use]
    pub fn counts(&self) -> &LevelCounts {
        &self.counts
    }

    /// Fraction of the emitted records that carried `severity`, in `[0, 1]`.
    #[must_use]
    pub fn share(&self, severity: Severity) -> f64 {
        let total = self.counts.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(severity).unwrap_or(0) as f64 / total as f64
    }
}
