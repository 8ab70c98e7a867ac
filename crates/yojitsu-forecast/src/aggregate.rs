//! Fiscal-year aggregation.
//!
//! Folds derived months into the twelve fiscal columns of the annual
//! sheets. Additive metrics sum; occupancy, ADR and RevPAR carry their
//! numerator/denominator sums in [`SeriesTotals`] so year totals are
//! recomputed rather than averaged across monthly ratios.

use chrono::NaiveDate;

use yojitsu_core::{
    MonthAggregate, MonthSheet, ReportConfig, Series, SeriesTotals, YearAggregate,
};

/// Build the fiscal-year aggregate from derived months.
///
/// The fiscal year is anchored on the earliest month present; fiscal months
/// missing from the input appear as absent columns.
pub fn aggregate_year(months: &[MonthSheet], config: &ReportConfig) -> YearAggregate {
    let fiscal_year = months
        .iter()
        .filter_map(|m| NaiveDate::from_ymd_opt(m.year, m.month, 1))
        .map(|d| config.fiscal_year(d))
        .min()
        .unwrap_or(0);

    let columns = config
        .fiscal_months(fiscal_year)
        .into_iter()
        .map(|(year, month)| {
            months
                .iter()
                .find(|m| m.year == year && m.month == month)
                .map_or_else(|| MonthAggregate::absent(year, month), aggregate_month)
        })
        .collect();

    YearAggregate { fiscal_year, capacity: config.capacity, months: columns }
}

fn aggregate_month(sheet: &MonthSheet) -> MonthAggregate {
    let mut totals = [
        SeriesTotals::zero(), // Budget
        SeriesTotals::zero(), // FC
        SeriesTotals::zero(), // OH
        SeriesTotals::zero(), // Actual
    ];

    for day in &sheet.days {
        for (slot, series) in totals.iter_mut().zip(Series::ALL) {
            // Actual only accumulates closed days; its counted_days becomes
            // the occupancy/RevPAR denominator for the partial month.
            if let Some(values) = day.series(series) {
                slot.accumulate(values);
            }
        }
    }

    let [budget, fc, oh, actual] = totals;
    MonthAggregate {
        year: sheet.year,
        month: sheet.month,
        present: true,
        budget,
        fc,
        oh,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use yojitsu_core::{DayData, DayRecord, Metric, SeriesValues};

    fn day(month: u32, day: u32, rooms: f64, actual: bool) -> DayData {
        let values = SeriesValues::new(rooms, rooms * 1.5, dec!(10000) * rust_decimal::Decimal::try_from(rooms).unwrap());
        DayData {
            record: DayRecord {
                date: NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
                holiday: None,
            },
            budget: values,
            fc: values,
            oh: values,
            actual: actual.then_some(values),
            forecast_only: !actual,
        }
    }

    #[test]
    fn fiscal_columns_start_at_fiscal_start_month() {
        let config = ReportConfig::new(100, 4).unwrap();
        let sheets = vec![MonthSheet { year: 2025, month: 4, days: vec![day(4, 1, 80.0, true)] }];
        let year = aggregate_year(&sheets, &config);
        assert_eq!(year.fiscal_year, 2025);
        assert_eq!(year.months.len(), 12);
        assert_eq!((year.months[0].year, year.months[0].month), (2025, 4));
        assert_eq!((year.months[11].year, year.months[11].month), (2026, 3));
        assert!(year.months[0].present);
        assert!(!year.months[1].present);
    }

    #[test]
    fn actual_totals_count_only_closed_days() {
        let config = ReportConfig::new(100, 4).unwrap();
        let sheets = vec![MonthSheet {
            year: 2025,
            month: 4,
            days: vec![day(4, 1, 80.0, true), day(4, 2, 60.0, false)],
        }];
        let year = aggregate_year(&sheets, &config);
        let april = &year.months[0];
        assert_eq!(april.actual.rooms, 80.0);
        assert_eq!(april.actual.counted_days, 1);
        assert_eq!(april.budget.rooms, 140.0);
        assert_eq!(april.budget.counted_days, 2);
        // Actual occupancy over one closed day, not over the whole month
        assert_eq!(year.month_value(Series::Actual, Metric::Occupancy, 0), Some(0.8));
    }

    #[test]
    fn absent_months_contribute_zero_additive_and_blank_ratios() {
        let config = ReportConfig::new(100, 4).unwrap();
        let sheets = vec![MonthSheet { year: 2025, month: 4, days: vec![day(4, 1, 80.0, false)] }];
        let year = aggregate_year(&sheets, &config);
        assert_eq!(year.month_value(Series::Budget, Metric::Rooms, 5), Some(0.0));
        assert_eq!(year.month_value(Series::Budget, Metric::Occupancy, 5), None);
        assert_eq!(year.month_value(Series::Actual, Metric::Adr, 0), None);
    }
}
