use std::{collections::BTreeMap, time::Duration};

use logmix_core::{LevelRatios, Percent, PinnedLevels, Severity};

use crate::{profile::Profile, Cli, OutputFormat};

/// Records drawn when neither the command line nor the profile sets a count.
pub(crate) const DEFAULT_COUNT: usize = 1_000;

/// Fully resolved parameters for one generation run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunSettings {
    pub(crate) pinned: PinnedLevels,
    pub(crate) ratios: LevelRatios,
    pub(crate) count: usize,
    pub(crate) delay: Duration,
    pub(crate) seed: u64,
    pub(crate) format: OutputFormat,
    pub(crate) dry_run: bool,
}

impl RunSettings {
    /// Merges command-line flags over profile values.
    ///
    /// Levels given a percentage by either source are pinned and every other
    /// level starts at zero. When no level is given at all, the default mix is
    /// used unpinned so it goes through validation. `fallback_seed` is only
    /// invoked when neither source provides a seed.
    pub(crate) fn resolve(cli: &Cli, profile: Profile, fallback_seed: impl FnOnce() -> u64) -> Self {
        let mut overrides: BTreeMap<Severity, f64> = profile.ratios;
        for (severity, percent) in cli.level_overrides() {
            if let Some(percent) = percent {
                let _ = overrides.insert(severity, percent);
            }
        }

        let (pinned, ratios) = if overrides.is_empty() {
            (PinnedLevels::new(), LevelRatios::DEFAULT_MIX)
        } else {
            let pinned: PinnedLevels = overrides.keys().copied().collect();
            let ratios = overrides
                .iter()
                .fold(LevelRatios::EMPTY, |ratios, (severity, percent)| {
                    ratios.with(*severity, Percent::new(*percent))
                });
            (pinned, ratios)
        };

        Self {
            pinned,
            ratios,
            count: cli.count.or(profile.count).unwrap_or(DEFAULT_COUNT),
            delay: Duration::from_millis(cli.delay_ms.or(profile.delay_ms).unwrap_or(0)),
            seed: cli.seed.or(profile.seed).unwrap_or_else(fallback_seed),
            format: cli.format.or(profile.format).unwrap_or_default(),
            dry_run: cli.dry_run,
        }
    }
}
