#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sampling system that draws severities from a range partition and emits records.
//!
//! The sampling space `[0, RANGE_CAPACITY)` is carved from the top down: Fatal
//! owns the highest segment, followed by Error, Warn, Info and Debug, while
//! Trace takes whatever remains below Debug, zero included. Every draw is
//! uniform, so the observed frequencies converge to each segment's share of
//! the space.

use std::{ops::Range, thread, time::Duration};

use logmix_core::{LevelCounts, LogSink, RangePartition, Severity, LEVEL_COUNT, RANGE_CAPACITY};
use rand::Rng;

/// Contiguous segment boundaries derived from a [`RangePartition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentBounds {
    segments: [Range<u64>; LEVEL_COUNT],
}

impl SegmentBounds {
    /// Lays out the partition's widths from [`RANGE_CAPACITY`] downward.
    ///
    /// Trace receives the remainder below Debug rather than its nominal width,
    /// absorbing rounding slack, unless its width is zero, in which case the
    /// slack belongs to no level at all.
    #[must_use]
    pub fn from_partition(partition: &RangePartition) -> Self {
        let mut segments: [Range<u64>; LEVEL_COUNT] = Default::default();
        let mut upper = RANGE_CAPACITY;
        for severity in &Severity::ALL[..LEVEL_COUNT - 1] {
            let low = upper.saturating_sub(partition.width(*severity));
            segments[severity.index()] = low..upper;
            upper = low;
        }

        segments[Severity::Trace.index()] = if partition.width(Severity::Trace) == 0 {
            0..0
        } else {
            0..upper
        };
        Self { segments }
    }

    /// Level whose segment contains `draw`, if any.
    #[must_use]
    pub fn classify(&self, draw: u64) -> Option<Severity> {
        Severity::ALL
            .into_iter()
            .find(|severity| self.segments[severity.index()].contains(&draw))
    }
}

/// Draws severities uniformly from a partition and forwards one record per draw.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sampler;

impl Sampler {
    /// Performs `output_limit` draws and returns how often each level was hit.
    ///
    /// Each classified draw emits the level's placeholder message through
    /// `sink`. Draws that land in unowned rounding slack emit nothing and are
    /// not counted, so levels with zero width never appear in the result. A
    /// non-zero `delay` blocks the calling thread between consecutive draws.
    ///
    /// Emitting a fatal record through a sink that terminates the process ends
    /// the run there; the sampler itself does not treat Fatal specially.
    pub fn output<R, S>(
        &self,
        ranges: &RangePartition,
        output_limit: usize,
        delay: Duration,
        rng: &mut R,
        sink: &mut S,
    ) -> LevelCounts
    where
        R: Rng + ?Sized,
        S: LogSink + ?Sized,
    {
        let bounds = SegmentBounds::from_partition(ranges);
        let mut counts = LevelCounts::new();

        for iteration in 0..output_limit {
            if iteration > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }

            let draw = rng.gen_range(0..RANGE_CAPACITY);
            let Some(severity) = bounds.classify(draw) else {
                continue;
            };
            counts.record(severity);
            sink.emit(severity, severity.placeholder_message());
        }

        counts
    }
}
