#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure validation system that gates caller-supplied ratio vectors.

use logmix_core::{LevelRatios, RatioError, FULL_PERCENT};

/// Checks ratio vectors for per-level bounds and for their overall sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct RatioValidator;

impl RatioValidator {
    /// Appends every violation found in `ratios` to `out`.
    ///
    /// Each level outside `[0, 100]` is reported on its own, in severity
    /// order. The integer parts of all six levels must then add up to exactly
    /// 100, otherwise a single [`RatioError::SumMismatch`] follows. Nothing is
    /// pushed for a valid vector.
    pub fn validate(&self, ratios: &LevelRatios, out: &mut Vec<RatioError>) {
        for (severity, percent) in ratios.iter() {
            if !percent.is_within_bounds() {
                out.push(RatioError::OutOfRange { severity, percent });
            }
        }

        let sum: i64 = ratios.iter().map(|(_, percent)| percent.truncated()).sum();
        if sum != FULL_PERCENT as i64 {
            out.push(RatioError::SumMismatch { sum });
        }
    }

    /// Convenience wrapper returning the violations as a fresh vector.
    #[must_use]
    pub fn violations(&self, ratios: &LevelRatios) -> Vec<RatioError> {
        let mut out = Vec::new();
        self.validate(ratios, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::RatioValidator;
    use logmix_core::{LevelRatios, RatioError};

    #[test]
    fn validate_appends_to_existing_buffer() {
        let mut out = vec![RatioError::SumMismatch { sum: 0 }];
        RatioValidator.validate(&LevelRatios::DEFAULT_MIX, &mut out);
        assert_eq!(out.len(), 1, "valid ratios must not push anything");
    }

    #[test]
    fn fractional_parts_are_dropped_before_summing() {
        let halves = LevelRatios::from_percentages([0.0, 10.5, 20.5, 49.0, 20.0, 0.0]);
        assert_eq!(
            RatioValidator.violations(&halves),
            vec![RatioError::SumMismatch { sum: 99 }]
        );

        let slightly_over = LevelRatios::from_percentages([0.0, 10.0, 20.0, 50.0, 20.75, 0.0]);
        assert!(RatioValidator.violations(&slightly_over).is_empty());

        let slightly_under = LevelRatios::from_percentages([0.0, 10.0, 20.0, 50.0, 19.75, 0.0]);
        assert_eq!(
            RatioValidator.violations(&slightly_under),
            vec![RatioError::SumMismatch { sum: 99 }]
        );
    }
}
