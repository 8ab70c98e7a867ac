//! Forecast-correction acceptance scenarios over whole months.
//!
//! Mirrors the report's core promise: closed days freeze FC/OH to actuals,
//! open days are a pure function of budget and the on-hand feed.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use yojitsu_core::{
    compose_rows, days_in_month, DayInput, Field, MonthInput, NoHolidays, ReportConfig,
    SeriesValues, VariancePair,
};
use yojitsu_forecast::{build_report, derive_month};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A realistic month: the first `closed` days carry actuals, the following
/// `booked` days an on-hand snapshot, the rest only budget.
fn month(year: i32, m: u32, closed: u32, booked: u32) -> MonthInput {
    let days = (1..=days_in_month(year, m))
        .map(|day| {
            let budget = SeriesValues::new(80.0, 120.0, Decimal::from(960_000));
            let actual = (day <= closed)
                .then(|| SeriesValues::new(75.0, 110.0, Decimal::from(900_000)));
            let on_hand = (day > closed && day <= closed + booked)
                .then(|| SeriesValues::new(85.0, 125.0, Decimal::from(1_020_000)));
            DayInput { date: date(year, m, day), budget, actual, on_hand }
        })
        .collect();
    MonthInput::new(year, m, days)
}

#[test]
fn closed_days_freeze_fc_and_oh_to_actuals() {
    let config = ReportConfig::new(100, 4).unwrap();
    let sheet = derive_month(&month(2025, 4, 10, 5), &config, &NoHolidays).unwrap();

    for day in &sheet.days[..10] {
        let actual = day.actual.expect("closed day");
        assert_eq!(day.fc, actual);
        assert_eq!(day.oh, actual);
    }
}

#[test]
fn open_days_are_a_function_of_budget_and_on_hand() {
    let config = ReportConfig::new(100, 4).unwrap();
    let input = month(2025, 4, 10, 5);
    let sheet = derive_month(&input, &config, &NoHolidays).unwrap();

    // On-hand days: OH straight from input, FC keeps the budget shape.
    for day in &sheet.days[10..15] {
        assert_eq!(day.oh.rooms_sold, 85.0);
        assert_eq!(day.fc.rooms_sold, 80.0);
    }
    // Remaining 15 days: each absorbs 5 days × (85 − 80) / 15 rooms.
    let expected_rooms = 80.0 + 5.0 * 5.0 / 15.0;
    for day in &sheet.days[15..] {
        assert_eq!(day.fc.rooms_sold, expected_rooms);
        assert!(day.forecast_only);
    }
    // Recomputation from the same input is byte-identical.
    assert_eq!(sheet, derive_month(&input, &config, &NoHolidays).unwrap());
}

#[test]
fn twelve_month_end_to_end_scenario() {
    // Month 1 fully actual, months 2-12 budget + on-hand, capacity 100,
    // fiscal start April.
    let config = ReportConfig::new(100, 4).unwrap();
    let mut inputs = vec![month(2025, 4, 30, 0)];
    for (year, m) in config.fiscal_months(2025).into_iter().skip(1) {
        inputs.push(month(year, m, 0, days_in_month(year, m)));
    }

    let (months, year) = build_report(&inputs, &config, &NoHolidays).unwrap();

    assert_eq!(months.len(), 12);
    assert_eq!((months[0].year, months[0].month), (2025, 4));
    assert_eq!((months[11].year, months[11].month), (2026, 3));

    // April's FC/OH equal its actuals for every day.
    for day in &months[0].days {
        let actual = day.actual.expect("April is fully actualized");
        assert_eq!(day.fc, actual);
        assert_eq!(day.oh, actual);
    }

    // Annual April Actual block equals the sum of daily actuals.
    let april = &year.months[0];
    assert_eq!(april.actual.rooms, 30.0 * 75.0);
    assert_eq!(april.actual.guests, 30.0 * 110.0);
    assert_eq!(april.actual.revenue, Decimal::from(30 * 900_000));
}

#[test]
fn zero_rooms_day_blanks_adr_and_revpar_but_not_occ() {
    let config = ReportConfig::new(100, 4).unwrap();
    let input = MonthInput::new(
        2025,
        4,
        vec![DayInput {
            date: date(2025, 4, 1),
            budget: SeriesValues::zero(),
            actual: Some(SeriesValues::zero()),
            on_hand: None,
        }],
    );
    let (months, _) = build_report(&[input], &config, &NoHolidays).unwrap();
    let rows = compose_rows(&months[0], &config);

    assert_eq!(rows[0].actual.adr, None);
    assert_eq!(rows[0].actual.occupancy, Some(0.0));
    assert_eq!(rows[0].actual.revpar, None);
    // Variances over the zero day stay exact, not NaN.
    assert_eq!(rows[0].variance(VariancePair::ActualMinusBudget, Field::Rooms), Some(0.0));
}
