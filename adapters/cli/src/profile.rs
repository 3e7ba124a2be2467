use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use logmix_core::Severity;
use serde::Deserialize;

use crate::OutputFormat;

/// Run settings loaded from a TOML profile.
///
/// Every field is optional; command-line flags override whatever the profile
/// provides. Each entry under `[ratios]` pins that level.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Profile {
    /// Number of records to draw.
    pub(crate) count: Option<usize>,
    /// Pause between consecutive records, in milliseconds.
    pub(crate) delay_ms: Option<u64>,
    /// Seed for the pseudo-random source.
    pub(crate) seed: Option<u64>,
    /// Formatting applied to emitted records.
    pub(crate) format: Option<OutputFormat>,
    /// Percentages for the pinned levels.
    #[serde(default)]
    pub(crate) ratios: BTreeMap<Severity, f64>,
}

impl Profile {
    /// Loads the profile stored at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load profile at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let profile: Profile =
            toml::from_str(contents).context("failed to parse profile toml contents")?;

        for (severity, percent) in &profile.ratios {
            if !percent.is_finite() {
                bail!("profile ratio for {severity} must be a finite number, got {percent}");
            }
        }

        Ok(profile)
    }
}
