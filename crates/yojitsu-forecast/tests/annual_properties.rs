//! Annual aggregation properties.
//!
//! Year totals for ratio metrics must be recomputed from year-level sums,
//! and the variance sheet must exclude months lacking a prerequisite
//! series instead of zero-filling them.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use yojitsu_core::{
    DayInput, Metric, MonthInput, NoHolidays, ReportConfig, Series, SeriesValues, VariancePair,
};
use yojitsu_forecast::build_report;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn values(rooms: f64, revenue: i64) -> SeriesValues {
    SeriesValues::new(rooms, rooms * 2.0, Decimal::from(revenue))
}

/// One-day month: small but enough to steer the month-level ratios.
fn month_with_actual(year: i32, month: u32, rooms: f64, revenue: i64) -> MonthInput {
    MonthInput::new(
        year,
        month,
        vec![DayInput {
            date: date(year, month, 1),
            budget: values(rooms, revenue),
            actual: Some(values(rooms, revenue)),
            on_hand: None,
        }],
    )
}

fn month_budget_only(year: i32, month: u32, rooms: f64, revenue: i64) -> MonthInput {
    MonthInput::new(
        year,
        month,
        vec![DayInput {
            date: date(year, month, 1),
            budget: values(rooms, revenue),
            actual: None,
            on_hand: None,
        }],
    )
}

#[test]
fn year_ratio_differs_from_mean_of_monthly_ratios() {
    let config = ReportConfig::new(100, 4).unwrap();
    // April: 10 rooms at ADR 100. May: 90 rooms at ADR 200.
    // Mean of monthly ADRs = 150; year ADR = (1000 + 18000) / 100 = 190.
    let inputs = vec![
        month_with_actual(2025, 4, 10.0, 1000),
        month_with_actual(2025, 5, 90.0, 18000),
    ];
    let (_, year) = build_report(&inputs, &config, &NoHolidays).unwrap();

    let april = year.month_value(Series::Actual, Metric::Adr, 0).unwrap();
    let may = year.month_value(Series::Actual, Metric::Adr, 1).unwrap();
    let mean_of_ratios = (april + may) / 2.0;
    let year_adr = year.year_value(Series::Actual, Metric::Adr).unwrap();

    assert_eq!(year_adr, 190.0);
    assert_eq!(mean_of_ratios, 150.0);
    assert!(year_adr != mean_of_ratios);
}

#[test]
fn year_occupancy_recomputed_from_year_sums() {
    let config = ReportConfig::new(100, 4).unwrap();
    let inputs = vec![
        month_with_actual(2025, 4, 10.0, 1000),
        month_with_actual(2025, 5, 90.0, 18000),
    ];
    let (_, year) = build_report(&inputs, &config, &NoHolidays).unwrap();

    // 100 rooms over 2 counted days of 100 capacity
    assert_eq!(year.year_value(Series::Actual, Metric::Occupancy), Some(0.5));
    // Additive year totals are plain sums
    assert_eq!(year.year_value(Series::Actual, Metric::Rooms), Some(100.0));
}

#[test]
fn variance_sheet_excludes_months_without_actuals() {
    let config = ReportConfig::new(100, 4).unwrap();
    let inputs = vec![
        month_with_actual(2025, 4, 50.0, 5000),
        month_budget_only(2025, 5, 60.0, 6000),
    ];
    let (_, year) = build_report(&inputs, &config, &NoHolidays).unwrap();

    // April has actuals: the Actual − Budget cell exists (and is zero here).
    assert_eq!(
        year.variance_month_value(VariancePair::ActualMinusBudget, Metric::Rooms, 0),
        Some(0.0)
    );
    // May has none: excluded, not zero-filled.
    assert_eq!(
        year.variance_month_value(VariancePair::ActualMinusBudget, Metric::Rooms, 1),
        None
    );
    // FC − Budget still exists for May (both series populated).
    assert_eq!(
        year.variance_month_value(VariancePair::FcMinusBudget, Metric::Rooms, 1),
        Some(0.0)
    );
    // A fiscal month with no sheet at all is excluded for every pair.
    assert_eq!(
        year.variance_month_value(VariancePair::FcMinusBudget, Metric::Rooms, 6),
        None
    );
}

#[test]
fn variance_is_exact_difference_at_month_and_year_level() {
    let config = ReportConfig::new(100, 4).unwrap();
    // Budget 50 rooms, actual 70 rooms on the only day.
    let inputs = vec![MonthInput::new(
        2025,
        4,
        vec![DayInput {
            date: date(2025, 4, 1),
            budget: values(50.0, 5000),
            actual: Some(values(70.0, 9100)),
            on_hand: None,
        }],
    )];
    let (_, year) = build_report(&inputs, &config, &NoHolidays).unwrap();

    assert_eq!(
        year.variance_month_value(VariancePair::ActualMinusBudget, Metric::Rooms, 0),
        Some(20.0)
    );
    assert_eq!(
        year.variance_year_value(VariancePair::ActualMinusBudget, Metric::Rooms),
        Some(20.0)
    );
    assert_eq!(
        year.variance_year_value(VariancePair::ActualMinusBudget, Metric::Revenue),
        Some(4100.0)
    );
    // Ratio variance recomputed from annual totals: ADR 130 vs 100.
    assert_eq!(
        year.variance_year_value(VariancePair::ActualMinusBudget, Metric::Adr),
        Some(30.0)
    );
}

#[test]
fn undefined_ratio_variance_renders_blank() {
    let config = ReportConfig::new(100, 4).unwrap();
    // Zero rooms everywhere: ADR undefined on both sides.
    let inputs = vec![MonthInput::new(
        2025,
        4,
        vec![DayInput {
            date: date(2025, 4, 1),
            budget: values(0.0, 0),
            actual: Some(values(0.0, 0)),
            on_hand: None,
        }],
    )];
    let (_, year) = build_report(&inputs, &config, &NoHolidays).unwrap();

    assert_eq!(
        year.variance_month_value(VariancePair::ActualMinusBudget, Metric::Adr, 0),
        None
    );
    assert_eq!(
        year.variance_year_value(VariancePair::ActualMinusBudget, Metric::Adr),
        None
    );
    // Occupancy is defined (capacity denominator): 0 − 0 = 0.
    assert_eq!(
        year.variance_month_value(VariancePair::ActualMinusBudget, Metric::Occupancy, 0),
        Some(0.0)
    );
}
