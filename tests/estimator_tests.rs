use vpufreq::{
    CompletedJob, Handle,
    config::DvfsConfig,
    dvfs::{
        estimator::{self, FreqTable},
        history::History,
    },
};

const MHZ: u64 = 1_000_000;

fn table() -> FreqTable {
    FreqTable::new(vec![300 * MHZ, 400 * MHZ, 550 * MHZ]).expect("table")
}

fn completed(cycles: u64, submit_us: u64, duration_us: u64, interval_us: u64) -> CompletedJob {
    CompletedJob {
        handle: Handle(1),
        submit_us,
        start_us: submit_us,
        end_us: submit_us + duration_us,
        cycles,
        sw_time_us: 0,
        submit_interval_us: interval_us,
        estimate_mhz: 546,
    }
}

#[test]
fn match_rate_picks_smallest_sufficient_entry() {
    let table = table();
    assert_eq!(table.match_rate(450 * MHZ), 550 * MHZ);
    assert_eq!(table.match_rate(250 * MHZ), 300 * MHZ);
    assert_eq!(table.match_rate(600 * MHZ), 550 * MHZ);
    assert_eq!(table.match_rate(300 * MHZ), 300 * MHZ);
}

#[test]
fn match_rate_is_monotonic_in_the_target() {
    let table = table();
    let mut previous = 0;
    for target in (0..700).map(|mhz| mhz * MHZ) {
        let selected = table.match_rate(target);
        assert!(selected >= previous, "regressed at target {target}");
        previous = selected;
    }
}

#[test]
fn table_normalises_order_and_duplicates() {
    let table = FreqTable::new(vec![550 * MHZ, 300 * MHZ, 550 * MHZ, 0]).expect("table");
    assert_eq!(table.rates_hz(), &[300 * MHZ, 550 * MHZ]);
    assert_eq!(table.max_rate(), 550 * MHZ);
}

#[test]
fn empty_table_is_rejected() {
    assert!(FreqTable::new(vec![]).is_err());
    assert!(FreqTable::new(vec![0]).is_err());
}

#[test]
fn cold_start_returns_the_default_frequency() {
    let config = DvfsConfig::default();
    assert_eq!(estimator::estimate(&config, 1, None), config.default_freq_hz);

    let empty = History::new(config.history_depth);
    assert_eq!(
        estimator::estimate(&config, 1, Some(&empty)),
        config.default_freq_hz
    );
}

#[test]
fn target_is_average_cycles_over_the_submit_budget() {
    let config = DvfsConfig::default();
    let mut history = History::new(config.history_depth);
    history.record(&completed(100, 0, 1_000, 0), 0);
    history.record(&completed(200, 1_000, 1_000, 1_000), 1_000);
    history.record(&completed(300, 2_000, 1_000, 1_000), 1_000);

    // 200 average cycles per job, one queued job, 1ms budget.
    let target = estimator::estimate(&config, 1, Some(&history));
    assert_eq!(target, 200 * 1_000_000 / 1_000);
    assert_eq!(table().match_rate(target), 300 * MHZ);
}

#[test]
fn target_scales_with_queued_jobs() {
    let config = DvfsConfig::default();
    let mut history = History::new(config.history_depth);
    history.record(&completed(900, 0, 3_000, 3_000), 3_000);

    let one = estimator::estimate(&config, 1, Some(&history));
    let three = estimator::estimate(&config, 3, Some(&history));
    assert_eq!(three, one * 3);
}

#[test]
fn drained_queue_still_budgets_one_job() {
    let config = DvfsConfig::default();
    let mut history = History::new(config.history_depth);
    history.record(&completed(500, 0, 2_500, 2_500), 2_500);

    assert_eq!(
        estimator::estimate(&config, 0, Some(&history)),
        estimator::estimate(&config, 1, Some(&history))
    );
}

#[test]
fn bursty_interval_plans_full_rate_service() {
    let config = DvfsConfig::default();

    // Jobs take 500us of hardware time but arrive every 1ms, well under
    // the 2ms bursty threshold: the budget shrinks to the service time.
    let mut history = History::new(config.history_depth);
    history.record(&completed(1_000, 0, 500, 1_000), 1_000);
    let bursty = estimator::estimate(&config, 1, Some(&history));
    assert_eq!(bursty, 1_000 * 1_000_000 / 500);

    // The same jobs arriving every 10ms keep the relaxed budget.
    let mut relaxed = History::new(config.history_depth);
    relaxed.record(&completed(1_000, 0, 500, 10_000), 10_000);
    let steady = estimator::estimate(&config, 1, Some(&relaxed));
    assert_eq!(steady, 1_000 * 1_000_000 / 10_000);
    assert!(bursty > steady);
}

#[test]
fn idle_interval_falls_back_toward_the_default() {
    let config = DvfsConfig::default();
    let mut history = History::new(config.history_depth);
    // Heavy jobs arriving every 2s: raw demand is enormous, but the
    // workload is idle so the default caps the target.
    history.record(&completed(1_000_000_000, 0, 1_000, 2_000_000), 2_000_000);

    let target = estimator::estimate(&config, 1, Some(&history));
    assert_eq!(target, config.default_freq_hz);
}

#[test]
fn estimate_is_pure_given_unchanged_inputs() {
    let config = DvfsConfig::default();
    let mut history = History::new(config.history_depth);
    history.record(&completed(400, 0, 1_500, 4_000), 4_000);

    let first = estimator::estimate(&config, 2, Some(&history));
    let second = estimator::estimate(&config, 2, Some(&history));
    assert_eq!(first, second);
}
