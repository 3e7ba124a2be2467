#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure distribution system that turns ratio vectors into range partitions.
//!
//! Percentage mass that the pinned levels leave unclaimed is spread evenly
//! over the unpinned levels. Fatal never absorbs any of it: when Fatal is
//! unpinned its would-be share is folded into the other unpinned levels, so the
//! process-terminating level is only ever emitted when a caller asks for it.

use logmix_core::{
    DistributionError, LevelRatios, Percent, PinnedLevels, RangePartition, Severity,
    FULL_PERCENT, LEVEL_COUNT, UNITS_PER_PERCENT,
};

/// Largest deviation from 100 still treated as a complete ratio vector.
const TOTAL_TOLERANCE: f64 = 1e-9;

/// Number of decimal digits kept when rounding unit counts upward.
const ROUNDING_SCALE: f64 = 100.0;

/// Derives the integer partition of the sampling space from a ratio vector.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeDistributor;

impl RangeDistributor {
    /// Computes the width of every level's segment.
    ///
    /// Unpinned levels first receive their share of the unclaimed mass (see
    /// [`RangeDistributor::redistribute`]). Every percentage is then scaled by
    /// [`UNITS_PER_PERCENT`], rounded upward at two decimal digits and
    /// truncated, so the widths can end up a few units away from
    /// [`logmix_core::RANGE_CAPACITY`] in either direction.
    pub fn derive_distribution_ranges(
        &self,
        ratios: &LevelRatios,
        pinned: PinnedLevels,
    ) -> Result<RangePartition, DistributionError> {
        let resolved = self.redistribute(ratios, pinned)?;

        let mut widths = [0; LEVEL_COUNT];
        for (severity, percent) in resolved.iter() {
            widths[severity.index()] = percent_to_width(severity, percent)?;
        }
        Ok(RangePartition::new(widths))
    }

    /// Returns a copy of `ratios` where every unpinned level other than Fatal
    /// carries an even share of the mass the vector is missing.
    ///
    /// Vectors that already add up to 100, and vectors without any pinned
    /// level, are returned unchanged.
    pub fn redistribute(
        &self,
        ratios: &LevelRatios,
        pinned: PinnedLevels,
    ) -> Result<LevelRatios, DistributionError> {
        let total = ratios.total();
        if pinned.is_empty() || (total - FULL_PERCENT).abs() <= TOTAL_TOLERANCE {
            return Ok(*ratios);
        }

        let remaining = FULL_PERCENT - total;
        let remaining_count = pinned.unpinned_count();
        if remaining_count == 0 {
            return Err(DistributionError::NoUnpinnedLevels { total });
        }

        let mut portion = remaining / remaining_count as f64;
        if !pinned.contains(Severity::Fatal) {
            if remaining_count == 1 {
                return Err(DistributionError::OnlyFatalUnpinned { remaining });
            }
            portion += portion / (remaining_count - 1) as f64;
        }

        let mut resolved = *ratios;
        for severity in Severity::ALL {
            if severity != Severity::Fatal && !pinned.contains(severity) {
                resolved.set(severity, Percent::new(portion));
            }
        }
        Ok(resolved)
    }
}

fn percent_to_width(severity: Severity, percent: Percent) -> Result<u64, DistributionError> {
    let value = percent.get();
    if !value.is_finite() || value < 0.0 {
        return Err(DistributionError::InvalidShare { severity, percent });
    }

    let units = value * UNITS_PER_PERCENT as f64;
    let rounded = (units * ROUNDING_SCALE).ceil() / ROUNDING_SCALE;
    Ok(rounded.trunc() as u64)
}
