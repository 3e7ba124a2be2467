use std::time::Duration;

use logmix_core::{
    CaptureSink, DiscardSink, DistributionError, LevelRatios, Percent, PinnedLevels,
    RangePartition, RatioError, Severity,
};
use logmix_generator::LogGenerator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Records drawn per scenario.
const LOG_LINES_TO_GENERATE: usize = 100_000;

/// Allowed deviation per level, under five standard deviations of the widest
/// binomial spread at this draw count.
const ALLOWED_DEVIANCE: u64 = 750;

struct Scenario {
    name: &'static str,
    pinned: &'static [Severity],
    ratios: [f64; 6],
    expected_ranges: [u64; 6],
    /// Expected records per 2000 draws, ordered Fatal to Trace.
    expected_counts: [u64; 6],
}

const SCENARIOS: [Scenario; 4] = [
    Scenario {
        name: "sane defaults, no overrides",
        pinned: &[],
        ratios: [0.0, 10.0, 20.0, 50.0, 20.0, 0.0],
        expected_ranges: [0, 6_000, 12_000, 30_000, 12_000, 0],
        expected_counts: [0, 200, 400, 1_000, 400, 0],
    },
    Scenario {
        name: "info pinned at the whole range",
        pinned: &[Severity::Info],
        ratios: [0.0, 0.0, 0.0, 100.0, 0.0, 0.0],
        expected_ranges: [0, 0, 0, 60_000, 0, 0],
        expected_counts: [0, 0, 0, 2_000, 0, 0],
    },
    Scenario {
        name: "error pinned at 10 percent, remainder shared",
        pinned: &[Severity::Error],
        ratios: [0.0, 10.0, 0.0, 0.0, 0.0, 0.0],
        expected_ranges: [0, 6_000, 13_500, 13_500, 13_500, 13_500],
        expected_counts: [0, 200, 450, 450, 450, 450],
    },
    Scenario {
        name: "error, warn and info pinned",
        pinned: &[Severity::Error, Severity::Warn, Severity::Info],
        ratios: [0.0, 13.0, 7.0, 5.0, 0.0, 0.0],
        expected_ranges: [0, 7_800, 4_200, 3_000, 22_500, 22_500],
        expected_counts: [0, 260, 140, 100, 750, 750],
    },
];

#[test]
fn scenarios_derive_expected_ranges_and_converge() {
    let scale = LOG_LINES_TO_GENERATE as u64 / 2_000;

    for (index, scenario) in SCENARIOS.iter().enumerate() {
        let pinned: PinnedLevels = scenario.pinned.iter().copied().collect();
        let ratios = LevelRatios::from_percentages(scenario.ratios);
        let mut generator = LogGenerator::with_sink(pinned, ratios, DiscardSink)
            .unwrap_or_else(|errors| panic!("{}: construction failed: {errors}", scenario.name));

        let ranges = generator
            .derive_distribution_ranges()
            .unwrap_or_else(|error| panic!("{}: derivation failed: {error}", scenario.name));
        assert_eq!(
            ranges,
            RangePartition::new(scenario.expected_ranges),
            "{}: ranges are wrong",
            scenario.name,
        );

        let mut rng = ChaCha8Rng::seed_from_u64(0x1000 + index as u64);
        let counts = generator.output(&ranges, LOG_LINES_TO_GENERATE, Duration::ZERO, &mut rng);

        for severity in Severity::ALL {
            let expected = scenario.expected_counts[severity.index()] * scale;
            if expected == 0 {
                assert!(
                    !counts.contains(severity),
                    "{}: {severity} messages found",
                    scenario.name,
                );
                continue;
            }

            let observed = counts.get(severity).unwrap_or(0);
            assert!(
                observed >= expected - ALLOWED_DEVIANCE,
                "{}: {severity} count {observed} less than expected {expected}",
                scenario.name,
            );
            assert!(
                observed <= expected + ALLOWED_DEVIANCE,
                "{}: {severity} count {observed} larger than expected {expected}",
                scenario.name,
            );
        }
    }
}

#[test]
fn all_zero_ratios_without_overrides_fail_construction() {
    let errors = LogGenerator::with_sink(PinnedLevels::new(), LevelRatios::EMPTY, DiscardSink)
        .expect_err("validation should reject an empty mix");

    assert_eq!(errors.errors(), &[RatioError::SumMismatch { sum: 0 }]);
}

#[test]
fn construction_reports_every_violation() {
    let ratios = LevelRatios::from_percentages([-5.0, 0.0, 0.0, 250.0, 0.0, 0.0]);
    let errors = LogGenerator::with_sink(PinnedLevels::new(), ratios, DiscardSink)
        .expect_err("validation should fail");

    let messages: Vec<String> = errors.errors().iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec![
            "fatal level is outside possible range with value -5".to_owned(),
            "info level is outside possible range with value 250".to_owned(),
            "log level ratio sum must equal 100, got 245".to_owned(),
        ]
    );
}

#[test]
fn pinned_levels_skip_validation() {
    let ratios = LevelRatios::EMPTY.with(Severity::Debug, Percent::new(40.0));
    let pinned = PinnedLevels::new().with(Severity::Debug);

    let generator = LogGenerator::with_sink(pinned, ratios, DiscardSink)
        .expect("pinned input is balanced during derivation");
    let ranges = generator.derive_distribution_ranges().expect("derive");

    assert_eq!(ranges.width(Severity::Debug), 24_000);
    assert_eq!(ranges.width(Severity::Fatal), 0);
    assert_eq!(generator.ratios(), &ratios, "derivation must not rewrite ratios");
}

#[test]
fn derivation_errors_surface_after_construction() {
    let ratios = LevelRatios::from_percentages([5.0; 6]);
    let pinned: PinnedLevels = Severity::ALL.into_iter().collect();

    let generator =
        LogGenerator::with_sink(pinned, ratios, DiscardSink).expect("validation is skipped");
    assert_eq!(
        generator.derive_distribution_ranges(),
        Err(DistributionError::NoUnpinnedLevels { total: 30.0 })
    );
}

#[test]
fn repeated_derivation_is_stable() {
    let ratios = LevelRatios::EMPTY.with(Severity::Error, Percent::new(10.0));
    let pinned = PinnedLevels::new().with(Severity::Error);
    let generator = LogGenerator::with_sink(pinned, ratios, DiscardSink).expect("construct");

    let first = generator.derive_distribution_ranges().expect("first");
    let second = generator.derive_distribution_ranges().expect("second");
    assert_eq!(first, second);
}

#[test]
fn run_reports_ranges_and_counts_and_feeds_the_sink() {
    let mut generator =
        LogGenerator::with_sink(PinnedLevels::new(), LevelRatios::DEFAULT_MIX, CaptureSink::new())
            .expect("default mix validates");
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    let report = generator
        .run(1_000, Duration::ZERO, &mut rng)
        .expect("default mix derives");

    assert_eq!(
        report.ranges(),
        &RangePartition::new([0, 6_000, 12_000, 30_000, 12_000, 0])
    );
    assert_eq!(report.counts().total(), 1_000);
    assert_eq!(generator.sink().records().len(), 1_000);
    for (severity, count) in report.counts().iter() {
        assert_eq!(generator.sink().count(severity) as u64, count);
    }

    generator.sink_mut().clear();
    assert!(generator.into_sink().records().is_empty());
}

#[test]
fn pinned_fatal_is_emitted_through_the_sink() {
    let ratios = LevelRatios::EMPTY.with(Severity::Fatal, Percent::HUNDRED);
    let pinned = PinnedLevels::new().with(Severity::Fatal);
    let mut generator =
        LogGenerator::with_sink(pinned, ratios, CaptureSink::new()).expect("construct");
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let report = generator.run(3, Duration::ZERO, &mut rng).expect("derive");

    assert_eq!(report.counts().get(Severity::Fatal), Some(3));
    assert!(generator
        .sink()
        .records()
        .iter()
        .all(|(severity, message)| *severity == Severity::Fatal
            && message == "fatal level message"));
}

#[test]
fn complete_unpinned_mix_above_one_hundred_is_sampled_as_given() {
    let ratios = LevelRatios::from_percentages([0.0, 10.0, 20.0, 50.0, 20.75, 0.0]);
    let mut generator = LogGenerator::with_sink(PinnedLevels::new(), ratios, CaptureSink::new())
        .expect("integer parts add up to 100");
    let mut rng = ChaCha8Rng::seed_from_u64(31);

    let report = generator.run(2_000, Duration::ZERO, &mut rng).expect("derive");

    assert_eq!(report.ranges().width(Severity::Debug), 12_450);
    assert_eq!(report.counts().total(), 2_000);
    assert!(!report.counts().contains(Severity::Trace));
    assert_eq!(generator.sink().records().len(), 2_000);
}
