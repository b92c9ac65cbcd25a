use evm_report::{
    AggregateMetrics, EvmTotals, MetricCalculator, MetricValue, Outlook, ProjectSnapshot, Task,
    TaskMetrics, validation::screen_tasks,
};

fn approx(actual: MetricValue, expected: f64, tolerance: f64) {
    match actual {
        MetricValue::Value(v) => assert!(
            (v - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {v}"
        ),
        other => panic!("expected a value near {expected}, got {other:?}"),
    }
}

fn task(name: &str, pv: f64, ac: f64, ev: f64) -> Task {
    Task::new(name, pv, ac, ev)
        .with_department("Engineering")
        .with_resource("Alice")
        .with_risk_level(2)
}

#[test]
fn task_cpi_is_exact_ratio_when_cost_is_positive() {
    let metrics = TaskMetrics::compute("API", 1000.0, 800.0, 600.0);
    assert_eq!(metrics.cpi, MetricValue::Value(600.0 / 800.0));
    assert_eq!(metrics.spi, MetricValue::Value(600.0 / 1000.0));
}

#[test]
fn task_ratios_with_zero_denominator_are_not_applicable() {
    let metrics = TaskMetrics::compute("Kickoff", 0.0, 0.0, 0.0);
    assert_eq!(metrics.cpi, MetricValue::NotApplicable);
    assert_eq!(metrics.spi, MetricValue::NotApplicable);
    assert_eq!(metrics.eac, MetricValue::NotApplicable);
    assert_eq!(metrics.vac, MetricValue::NotApplicable);
}

#[test]
fn task_forecast_follows_cost_efficiency() {
    let metrics = TaskMetrics::compute("Build", 1000.0, 500.0, 250.0);
    approx(metrics.cpi, 0.5, 1e-12);
    approx(metrics.eac, 2000.0, 1e-9);
    approx(metrics.vac, -1000.0, 1e-9);
}

#[test]
fn aggregate_uses_sums_not_mean_of_ratios() {
    // Per-task CPIs are 0.5 and 1.0; their mean would be 0.75.
    let snapshot = ProjectSnapshot::new(
        vec![
            task("Small", 100.0, 100.0, 50.0),
            task("Large", 10_000.0, 10_000.0, 10_000.0),
        ],
        Vec::new(),
    );
    let screening = screen_tasks(&snapshot);
    let metrics = MetricCalculator::compute(&screening.valid);

    let expected = 10_050.0 / 10_100.0;
    approx(metrics.aggregate.cpi, expected, 1e-12);
    approx(metrics.aggregate.spi, expected, 1e-12);
    assert_ne!(metrics.aggregate.cpi, MetricValue::Value(0.75));
    assert_eq!(metrics.aggregate.bac, 10_100.0);
}

#[test]
fn identical_ratios_give_the_same_aggregate_regardless_of_magnitude() {
    let snapshot = ProjectSnapshot::new(
        vec![task("A", 200.0, 100.0, 80.0), task("B", 20_000.0, 10_000.0, 8_000.0)],
        Vec::new(),
    );
    let screening = screen_tasks(&snapshot);
    let metrics = MetricCalculator::compute(&screening.valid);
    approx(metrics.aggregate.cpi, 0.8, 1e-12);
    approx(metrics.aggregate.spi, 0.4, 1e-12);
}

#[test]
fn eac_times_cpi_round_trips_to_bac() {
    let snapshot = ProjectSnapshot::new(
        vec![
            task("A", 1200.0, 900.0, 700.0),
            task("B", 3400.0, 4100.0, 2900.0),
            task("C", 560.0, 0.0, 0.0),
        ],
        Vec::new(),
    );
    let screening = screen_tasks(&snapshot);
    let aggregate = MetricCalculator::compute(&screening.valid).aggregate;

    let cpi = aggregate.cpi.value().expect("cpi");
    let eac = aggregate.eac.value().expect("eac");
    assert!((eac * cpi - aggregate.bac).abs() < 1e-6);
}

#[test]
fn worked_scenario_matches_reference_figures() {
    let aggregate = AggregateMetrics::from_totals(EvmTotals {
        planned_value: 50_000.0,
        earned_value: 40_000.0,
        actual_cost: 55_000.0,
        budget_at_completion: 100_000.0,
    });

    approx(aggregate.cpi, 0.7273, 0.01);
    approx(aggregate.spi, 0.8, 0.01);
    approx(aggregate.eac, 137_500.0, 1.0);
    approx(aggregate.vac, -37_500.0, 1.0);

    let cost = aggregate.cost_indicator().expect("cost indicator");
    assert_eq!(cost.outlook, Outlook::Unfavorable);
    assert!((cost.variance_pct - 27.27).abs() < 0.01);
    let schedule = aggregate.schedule_indicator().expect("schedule indicator");
    assert_eq!(schedule.outlook, Outlook::Unfavorable);
    assert!((schedule.variance_pct - 20.0).abs() < 1e-9);
}

#[test]
fn zero_earned_value_makes_eac_not_computable() {
    let aggregate = AggregateMetrics::from_totals(EvmTotals {
        planned_value: 1000.0,
        earned_value: 0.0,
        actual_cost: 400.0,
        budget_at_completion: 1000.0,
    });
    assert_eq!(aggregate.cpi, MetricValue::Value(0.0));
    assert_eq!(aggregate.eac, MetricValue::NotComputable);
    assert_eq!(aggregate.vac, MetricValue::NotComputable);
}

#[test]
fn empty_task_set_has_no_computable_ratios() {
    let snapshot = ProjectSnapshot::new(Vec::new(), Vec::new());
    let screening = screen_tasks(&snapshot);
    let metrics = MetricCalculator::compute(&screening.valid);

    assert!(metrics.tasks.is_empty());
    assert_eq!(metrics.aggregate.bac, 0.0);
    assert_eq!(metrics.aggregate.cpi, MetricValue::NotComputable);
    assert_eq!(metrics.aggregate.spi, MetricValue::NotComputable);
    assert_eq!(metrics.aggregate.eac, MetricValue::NotComputable);
    assert!(metrics.aggregate.cost_indicator().is_none());
}

#[test]
fn zero_cost_task_still_counts_toward_sums() {
    let snapshot = ProjectSnapshot::new(
        vec![task("Paid", 100.0, 100.0, 100.0), task("Free", 50.0, 0.0, 20.0)],
        Vec::new(),
    );
    let screening = screen_tasks(&snapshot);
    let metrics = MetricCalculator::compute(&screening.valid);

    assert_eq!(metrics.task("Free").unwrap().cpi, MetricValue::NotApplicable);
    assert_eq!(metrics.aggregate.totals.earned_value, 120.0);
    approx(metrics.aggregate.cpi, 1.2, 1e-12);

    let indicator = metrics.aggregate.cost_indicator().unwrap();
    assert_eq!(indicator.outlook, Outlook::Favorable);
}
