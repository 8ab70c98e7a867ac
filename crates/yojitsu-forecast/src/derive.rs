//! Forecast-correction rules.
//!
//! Once a day has closed, the rolling forecast collapses to reality: FC and
//! OH are frozen to the actual figures. Open days keep the budget's daily
//! shape; the cumulative amount by which the known on-hand days deviate from
//! their budget is redistributed uniformly over the remaining forecast-only
//! days, so the month-level forecast absorbs what ops already knows.

use rust_decimal::Decimal;

use yojitsu_core::{
    DayData, DayInput, DayRecord, DerivationError, HolidayCalendar, MonthInput, MonthSheet,
    ReportConfig, SeriesValues,
};

/// Per-field uniform share of the on-hand-over-budget delta.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Adjustment {
    rooms: f64,
    guests: f64,
    revenue: Decimal,
}

impl Adjustment {
    fn zero() -> Self {
        Self { rooms: 0.0, guests: 0.0, revenue: Decimal::ZERO }
    }

    fn apply(&self, values: SeriesValues) -> SeriesValues {
        SeriesValues {
            rooms_sold: values.rooms_sold + self.rooms,
            guests: values.guests + self.guests,
            revenue: values.revenue + self.revenue,
        }
    }
}

/// Derive FC and OH for every day of a month.
///
/// Fails when the capacity is unusable or when a closed day carries an
/// on-hand entry that contradicts its actuals.
pub fn derive_month(
    input: &MonthInput,
    config: &ReportConfig,
    holidays: &dyn HolidayCalendar,
) -> Result<MonthSheet, DerivationError> {
    // The config constructor validates this, but the fields are public.
    if config.capacity == 0 {
        return Err(DerivationError::InvalidCapacity(0));
    }

    let adjustment = redistribution(input)?;

    let days = input
        .days
        .iter()
        .map(|day| {
            let record = DayRecord {
                date: day.date,
                holiday: holidays.holiday_name(day.date).map(String::from),
            };
            match (day.actual, day.on_hand) {
                // Closed day: forecast collapses to reality.
                (Some(actual), _) => DayData {
                    record,
                    budget: day.budget,
                    fc: actual,
                    oh: actual,
                    actual: Some(actual),
                    forecast_only: false,
                },
                // Open day with an on-hand snapshot: budget shape carried
                // forward as the forecast.
                (None, Some(on_hand)) => DayData {
                    record,
                    budget: day.budget,
                    fc: day.budget,
                    oh: on_hand,
                    actual: None,
                    forecast_only: false,
                },
                // Remaining day: on-hand defaults to zero and the forecast
                // absorbs the redistributed on-hand delta.
                (None, None) => DayData {
                    record,
                    budget: day.budget,
                    fc: adjustment.apply(day.budget),
                    oh: SeriesValues::zero(),
                    actual: None,
                    forecast_only: true,
                },
            }
        })
        .collect();

    Ok(MonthSheet { year: input.year, month: input.month, days })
}

/// Uniform per-day share of the month's on-hand-over-budget delta, spread
/// across the forecast-only days.
fn redistribution(input: &MonthInput) -> Result<Adjustment, DerivationError> {
    let mut delta = Adjustment::zero();
    let mut remaining = 0u32;

    for day in &input.days {
        match (day.actual, day.on_hand) {
            (Some(actual), Some(on_hand)) => check_consistent(day, actual, on_hand)?,
            (Some(_), None) => {}
            (None, Some(on_hand)) => {
                delta.rooms += on_hand.rooms_sold - day.budget.rooms_sold;
                delta.guests += on_hand.guests - day.budget.guests;
                delta.revenue += on_hand.revenue - day.budget.revenue;
            }
            (None, None) => remaining += 1,
        }
    }

    if remaining == 0 {
        return Ok(Adjustment::zero());
    }
    Ok(Adjustment {
        rooms: delta.rooms / f64::from(remaining),
        guests: delta.guests / f64::from(remaining),
        revenue: delta.revenue / Decimal::from(remaining),
    })
}

/// A closed day may echo its actuals in the on-hand feed, but any
/// disagreement means the two sources diverged upstream.
fn check_consistent(
    day: &DayInput,
    actual: SeriesValues,
    on_hand: SeriesValues,
) -> Result<(), DerivationError> {
    let detail = if on_hand.rooms_sold != actual.rooms_sold {
        format!("rooms {} vs {}", on_hand.rooms_sold, actual.rooms_sold)
    } else if on_hand.guests != actual.guests {
        format!("guests {} vs {}", on_hand.guests, actual.guests)
    } else if on_hand.revenue != actual.revenue {
        format!("revenue {} vs {}", on_hand.revenue, actual.revenue)
    } else {
        return Ok(());
    };
    Err(DerivationError::ContradictoryOnHand { date: day.date, detail })
}
