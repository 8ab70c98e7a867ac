//! Wide-row composition for the monthly sheets.
//!
//! For each day, assembles the ordered column blocks
//! `[Budget][FC][OH][Actual]` (raw fields plus derived metrics) and the four
//! variance blocks. Pure mapping from derived day data; no I/O and no
//! spreadsheet knowledge, so every value the sheet writer emits can be
//! checked here without opening a workbook.

use rust_decimal::prelude::ToPrimitive;

use crate::{
    fc_oh_style, DayCompleteness, MonthSheet, ReportConfig, Series, SeriesValues, StyleTag,
    VariancePair,
};

/// Raw fields that carry variance columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Rooms,
    Guests,
    Revenue,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Rooms, Field::Guests, Field::Revenue];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Rooms => "室数",
            Field::Guests => "人数",
            Field::Revenue => "売上",
        }
    }

    pub fn of(&self, values: SeriesValues) -> f64 {
        match self {
            Field::Rooms => values.rooms_sold,
            Field::Guests => values.guests,
            Field::Revenue => values.revenue.to_f64().unwrap_or(0.0),
        }
    }
}

/// One series block of a wide row: raw fields plus derived metrics.
/// `None` renders as a blank cell.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MetricCells {
    pub rooms: Option<f64>,
    pub guests: Option<f64>,
    pub revenue: Option<f64>,
    pub occupancy: Option<f64>,
    pub adr: Option<f64>,
    pub revpar: Option<f64>,
    pub days_of_run: Option<u32>,
}

impl MetricCells {
    fn from_values(
        values: SeriesValues,
        days_of_run: Option<u32>,
        capacity: u32,
    ) -> Self {
        Self {
            rooms: Some(values.rooms_sold),
            guests: Some(values.guests),
            revenue: Some(values.revenue.to_f64().unwrap_or(0.0)),
            occupancy: Some(values.occupancy(capacity)),
            adr: values.adr(),
            revpar: values.revpar(capacity),
            days_of_run,
        }
    }

    /// All-blank block for an absent series (a day with no actuals yet).
    fn blank() -> Self {
        Self::default()
    }
}

/// One variance cell: `left - right` for a field, blank when either side is
/// absent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VarianceCell {
    pub pair: VariancePair,
    pub field: Field,
    pub value: Option<f64>,
}

/// One day of the monthly sheet, fully composed.
#[derive(Clone, Debug, PartialEq)]
pub struct WideRow {
    pub date: chrono::NaiveDate,
    /// Weekday label with holiday marker, e.g. `月` or `月・祝`
    pub weekday_label: String,
    pub completeness: DayCompleteness,
    pub budget: MetricCells,
    pub fc: MetricCells,
    pub oh: MetricCells,
    pub actual: MetricCells,
    /// All four pairs × all three fields, in block order
    pub variances: Vec<VarianceCell>,
}

impl WideRow {
    pub fn block(&self, series: Series) -> &MetricCells {
        match series {
            Series::Budget => &self.budget,
            Series::Fc => &self.fc,
            Series::OnHand => &self.oh,
            Series::Actual => &self.actual,
        }
    }

    /// Whether the FC/OH blocks of this row render muted.
    pub fn fc_oh_muted(&self) -> bool {
        fc_oh_style(self.completeness) == StyleTag::Muted
    }

    pub fn variance(&self, pair: VariancePair, field: Field) -> Option<f64> {
        self.variances
            .iter()
            .find(|v| v.pair == pair && v.field == field)
            .and_then(|v| v.value)
    }
}

/// Compose one wide row per calendar day of the month.
pub fn compose_rows(sheet: &MonthSheet, config: &ReportConfig) -> Vec<WideRow> {
    sheet
        .days
        .iter()
        .enumerate()
        .map(|(idx, day)| {
            let block = |series: Series| match day.series(series) {
                Some(values) => MetricCells::from_values(
                    values,
                    sheet.days_of_run_through(series, idx),
                    config.capacity,
                ),
                None => MetricCells::blank(),
            };

            let mut variances = Vec::with_capacity(VariancePair::ALL.len() * Field::ALL.len());
            for pair in VariancePair::ALL {
                let (left, right) = pair.sides();
                for field in Field::ALL {
                    let value = match (day.series(left), day.series(right)) {
                        (Some(l), Some(r)) => Some(field.of(l) - field.of(r)),
                        _ => None,
                    };
                    variances.push(VarianceCell { pair, field, value });
                }
            }

            let mut weekday_label = day.record.weekday_label().to_string();
            if day.record.is_holiday() {
                weekday_label.push_str("・祝");
            }

            WideRow {
                date: day.record.date,
                weekday_label,
                completeness: day.completeness(),
                budget: block(Series::Budget),
                fc: block(Series::Fc),
                oh: block(Series::OnHand),
                actual: block(Series::Actual),
                variances,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DayData, DayRecord};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn sheet() -> MonthSheet {
        let closed = DayData {
            record: DayRecord { date: date(1), holiday: None },
            budget: SeriesValues::new(80.0, 120.0, dec!(960000)),
            fc: SeriesValues::new(75.0, 110.0, dec!(900000)),
            oh: SeriesValues::new(75.0, 110.0, dec!(900000)),
            actual: Some(SeriesValues::new(75.0, 110.0, dec!(900000))),
            forecast_only: false,
        };
        let open = DayData {
            record: DayRecord { date: date(2), holiday: None },
            budget: SeriesValues::new(80.0, 120.0, dec!(960000)),
            fc: SeriesValues::new(82.0, 121.0, dec!(970000)),
            oh: SeriesValues::new(40.0, 55.0, dec!(480000)),
            actual: None,
            forecast_only: false,
        };
        MonthSheet { year: 2025, month: 4, days: vec![closed, open] }
    }

    #[test]
    fn one_row_per_day_with_block_order() {
        let config = ReportConfig::new(100, 4).unwrap();
        let rows = compose_rows(&sheet(), &config);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].budget.rooms, Some(80.0));
        assert_eq!(rows[0].fc.rooms, Some(75.0));
        assert_eq!(rows[0].actual.rooms, Some(75.0));
        assert_eq!(rows[0].budget.occupancy, Some(0.8));
        assert_eq!(rows[0].actual.adr, Some(12000.0));
    }

    #[test]
    fn absent_actual_composes_blank_block() {
        let config = ReportConfig::new(100, 4).unwrap();
        let rows = compose_rows(&sheet(), &config);
        assert_eq!(rows[1].actual, MetricCells::blank());
        assert!(!rows[1].fc_oh_muted());
        assert!(rows[0].fc_oh_muted());
    }

    #[test]
    fn variances_are_exact_differences() {
        let config = ReportConfig::new(100, 4).unwrap();
        let rows = compose_rows(&sheet(), &config);
        // Closed day: FC - Budget = 75 - 80
        assert_eq!(rows[0].variance(VariancePair::FcMinusBudget, Field::Rooms), Some(-5.0));
        assert_eq!(
            rows[0].variance(VariancePair::ActualMinusBudget, Field::Revenue),
            Some(-60000.0)
        );
        // Open day: Actual-based variances are blank, not zero
        assert_eq!(rows[1].variance(VariancePair::ActualMinusFc, Field::Rooms), None);
        assert_eq!(rows[1].variance(VariancePair::OhMinusFc, Field::Rooms), Some(-42.0));
    }

    #[test]
    fn holiday_marker_appended_to_weekday_label() {
        let config = ReportConfig::new(100, 4).unwrap();
        let mut s = sheet();
        s.days[0].record.holiday = Some("昭和の日".into());
        let rows = compose_rows(&s, &config);
        assert_eq!(rows[0].weekday_label, "火・祝");
        assert_eq!(rows[1].weekday_label, "水");
    }
}
