//! # yojitsu-core
//!
//! Core domain model and traits for the yojitsu hotel reporting engine.
//!
//! This crate provides:
//! - Domain types: `ReportConfig`, `SeriesValues`, `DayData`, `MonthSheet`,
//!   `YearAggregate`
//! - The wide-row composer used by the monthly sheet writer
//! - Holiday calendar lookup (injected capability, see [`calendar`])
//! - Error types shared across the pipeline
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use yojitsu_core::{DayInput, MonthInput, ReportConfig, SeriesValues};
//!
//! let config = ReportConfig::new(100, 4).unwrap();
//! let month = MonthInput::new(2025, 4, vec![DayInput {
//!     date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
//!     budget: SeriesValues::new(80.0, 120.0, "960000".parse().unwrap()),
//!     actual: None,
//!     on_hand: None,
//! }]);
//! assert_eq!(month.days_in_month(), 30);
//! assert_eq!(config.fiscal_year(month.days[0].date), 2025);
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod calendar;
pub mod row;

pub use calendar::{HolidayCalendar, JapaneseHolidays, NoHolidays};
pub use row::{compose_rows, Field, MetricCells, VarianceCell, WideRow};

// ============================================================================
// Configuration
// ============================================================================

/// Report-wide parameters, fixed at generation time.
///
/// Exactly one capacity and one fiscal start month apply to a whole report.
/// The interactive collection of these values lives outside the core; the
/// pipeline only requires the validated record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Total sellable rooms of the property
    pub capacity: u32,
    /// Calendar month at which the reporting year begins (1-12)
    pub fiscal_start_month: u32,
}

impl ReportConfig {
    pub fn new(capacity: u32, fiscal_start_month: u32) -> Result<Self, DerivationError> {
        if capacity == 0 {
            return Err(DerivationError::InvalidCapacity(i64::from(capacity)));
        }
        if !(1..=12).contains(&fiscal_start_month) {
            return Err(DerivationError::InvalidFiscalStartMonth(fiscal_start_month));
        }
        Ok(Self { capacity, fiscal_start_month })
    }

    /// Fiscal year a calendar date belongs to.
    ///
    /// With a fiscal start of April, 2025-03-15 falls into fiscal 2024 and
    /// 2025-04-01 into fiscal 2025.
    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        if date.month() >= self.fiscal_start_month {
            date.year()
        } else {
            date.year() - 1
        }
    }

    /// The twelve (year, month) pairs of a fiscal year, in fiscal order,
    /// wrapping December into January of the following calendar year.
    pub fn fiscal_months(&self, fiscal_year: i32) -> Vec<(i32, u32)> {
        let mut year = fiscal_year;
        let mut month = self.fiscal_start_month;
        let mut out = Vec::with_capacity(12);
        for _ in 0..12 {
            out.push((year, month));
            if month == 12 {
                month = 1;
                year += 1;
            } else {
                month += 1;
            }
        }
        out
    }

    /// Sort key ordering calendar months fiscally within one report.
    pub fn fiscal_order_key(&self, year: i32, month: u32) -> (i32, u32) {
        if month >= self.fiscal_start_month {
            (year, month - self.fiscal_start_month)
        } else {
            (year - 1, month + 12 - self.fiscal_start_month)
        }
    }
}

/// Number of calendar days in a month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    match (first, next) {
        (Some(f), Some(n)) => (n - f).num_days() as u32,
        _ => 0,
    }
}

// ============================================================================
// Series
// ============================================================================

/// The four tracked series of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Series {
    /// Originally planned figures, fixed for the year
    Budget,
    /// Rolling forecast, converges to Actual as days close
    Fc,
    /// Booked-so-far figures for not-yet-closed days
    OnHand,
    /// Finalized closed-day figures
    Actual,
}

impl Series {
    pub const ALL: [Series; 4] = [Series::Budget, Series::Fc, Series::OnHand, Series::Actual];

    /// Column-block label used in the output workbook.
    pub fn label(&self) -> &'static str {
        match self {
            Series::Budget => "予算",
            Series::Fc => "FC",
            Series::OnHand => "OH",
            Series::Actual => "実績",
        }
    }
}

/// Raw and derived per-day metrics tracked for every series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Rooms,
    Guests,
    Revenue,
    Occupancy,
    Adr,
    RevPar,
    DaysOfRun,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Rooms,
        Metric::Guests,
        Metric::Revenue,
        Metric::Occupancy,
        Metric::Adr,
        Metric::RevPar,
        Metric::DaysOfRun,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Rooms => "室数",
            Metric::Guests => "人数",
            Metric::Revenue => "宿泊売上",
            Metric::Occupancy => "OCC",
            Metric::Adr => "ADR",
            Metric::RevPar => "RevPAR",
            Metric::DaysOfRun => "DOR",
        }
    }

    /// Additive metrics sum across days and months; ratio metrics must be
    /// recomputed from sums instead.
    pub fn is_additive(&self) -> bool {
        matches!(
            self,
            Metric::Rooms | Metric::Guests | Metric::Revenue | Metric::DaysOfRun
        )
    }
}

/// The four prescribed variance pairs, each `left - right`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariancePair {
    FcMinusBudget,
    OhMinusFc,
    ActualMinusFc,
    ActualMinusBudget,
}

impl VariancePair {
    pub const ALL: [VariancePair; 4] = [
        VariancePair::FcMinusBudget,
        VariancePair::OhMinusFc,
        VariancePair::ActualMinusFc,
        VariancePair::ActualMinusBudget,
    ];

    pub fn sides(&self) -> (Series, Series) {
        match self {
            VariancePair::FcMinusBudget => (Series::Fc, Series::Budget),
            VariancePair::OhMinusFc => (Series::OnHand, Series::Fc),
            VariancePair::ActualMinusFc => (Series::Actual, Series::Fc),
            VariancePair::ActualMinusBudget => (Series::Actual, Series::Budget),
        }
    }

    pub fn label(&self) -> String {
        let (left, right) = self.sides();
        format!("{} − {}", left.label(), right.label())
    }
}

// ============================================================================
// Per-day values
// ============================================================================

/// Raw per-day figures of one series.
///
/// Rooms and guests are `f64` because forecast redistribution produces
/// fractional values; revenue stays in `Decimal` until the workbook boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesValues {
    pub rooms_sold: f64,
    pub guests: f64,
    pub revenue: Decimal,
}

impl SeriesValues {
    pub fn new(rooms_sold: f64, guests: f64, revenue: Decimal) -> Self {
        Self { rooms_sold, guests, revenue }
    }

    pub fn zero() -> Self {
        Self { rooms_sold: 0.0, guests: 0.0, revenue: Decimal::ZERO }
    }

    /// OCC = rooms sold / capacity. Defined for every day because the
    /// denominator is capacity, which the config guarantees positive.
    pub fn occupancy(&self, capacity: u32) -> f64 {
        self.rooms_sold / f64::from(capacity)
    }

    /// ADR = revenue / rooms sold. `None` when no rooms were sold; a blank
    /// cell is less misleading than a zero rate.
    pub fn adr(&self) -> Option<f64> {
        if self.rooms_sold == 0.0 {
            None
        } else {
            Some(self.revenue.to_f64().unwrap_or(0.0) / self.rooms_sold)
        }
    }

    /// RevPAR = revenue / capacity. Blank alongside ADR on a day with no
    /// rooms sold, so an unopened day never shows a misleading zero rate.
    pub fn revpar(&self, capacity: u32) -> Option<f64> {
        if self.rooms_sold == 0.0 {
            None
        } else {
            Some(self.revenue.to_f64().unwrap_or(0.0) / f64::from(capacity))
        }
    }
}

impl std::ops::Add for SeriesValues {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            rooms_sold: self.rooms_sold + rhs.rooms_sold,
            guests: self.guests + rhs.guests,
            revenue: self.revenue + rhs.revenue,
        }
    }
}

impl std::ops::Sub for SeriesValues {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            rooms_sold: self.rooms_sold - rhs.rooms_sold,
            guests: self.guests - rhs.guests,
            revenue: self.revenue - rhs.revenue,
        }
    }
}

// ============================================================================
// Input model (loader output)
// ============================================================================

/// Raw figures for one calendar day as read from the input workbook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayInput {
    pub date: NaiveDate,
    /// Budget row for the day; a day without one carries a zero budget
    pub budget: SeriesValues,
    /// Finalized figures, present once the day has closed
    pub actual: Option<SeriesValues>,
    /// Booked-so-far figures supplied by hotel ops, possibly absent
    pub on_hand: Option<SeriesValues>,
}

/// One input sheet, normalized to one entry per calendar day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthInput {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayInput>,
}

impl MonthInput {
    pub fn new(year: i32, month: u32, days: Vec<DayInput>) -> Self {
        Self { year, month, days }
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }
}

// ============================================================================
// Derived model (forecast output)
// ============================================================================

/// Calendar facts for one day, fixed once derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    /// Public holiday name, if the injected calendar marks the day
    pub holiday: Option<String>,
}

impl DayRecord {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn is_holiday(&self) -> bool {
        self.holiday.is_some()
    }

    /// Single-character weekday label used in the output workbook.
    pub fn weekday_label(&self) -> &'static str {
        match self.weekday() {
            Weekday::Mon => "月",
            Weekday::Tue => "火",
            Weekday::Wed => "水",
            Weekday::Thu => "木",
            Weekday::Fri => "金",
            Weekday::Sat => "土",
            Weekday::Sun => "日",
        }
    }
}

/// How much of a day's data is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCompleteness {
    /// Actual figures exist; FC and OH are frozen to them
    Actualized,
    /// No actuals yet, but hotel ops supplied an on-hand snapshot
    OnHandKnown,
    /// Neither actuals nor on-hand input; pure forecast
    ForecastOnly,
}

/// Visual treatment of FC/OH cells for a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleTag {
    Normal,
    /// Grayed out: reality is known, the forecast is historical
    Muted,
}

/// Style rule for FC/OH cells, kept separate from the workbook writer so it
/// can be tested without any I/O.
pub fn fc_oh_style(completeness: DayCompleteness) -> StyleTag {
    match completeness {
        DayCompleteness::Actualized => StyleTag::Muted,
        DayCompleteness::OnHandKnown | DayCompleteness::ForecastOnly => StyleTag::Normal,
    }
}

/// One fully derived day: budget straight from input, FC/OH per the
/// forecast-correction rules, actuals where the day has closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    pub record: DayRecord,
    pub budget: SeriesValues,
    pub fc: SeriesValues,
    pub oh: SeriesValues,
    pub actual: Option<SeriesValues>,
    /// True when the on-hand figures were absent from input and defaulted
    pub forecast_only: bool,
}

impl DayData {
    pub fn completeness(&self) -> DayCompleteness {
        if self.actual.is_some() {
            DayCompleteness::Actualized
        } else if self.forecast_only {
            DayCompleteness::ForecastOnly
        } else {
            DayCompleteness::OnHandKnown
        }
    }

    /// Values of a series for this day. `None` only for an absent Actual.
    pub fn series(&self, series: Series) -> Option<SeriesValues> {
        match series {
            Series::Budget => Some(self.budget),
            Series::Fc => Some(self.fc),
            Series::OnHand => Some(self.oh),
            Series::Actual => self.actual,
        }
    }
}

/// One derived month: exactly one entry per calendar day, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthSheet {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayData>,
}

impl MonthSheet {
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn has_actual(&self) -> bool {
        self.days.iter().any(|d| d.actual.is_some())
    }

    pub fn actual_day_count(&self) -> u32 {
        self.days.iter().filter(|d| d.actual.is_some()).count() as u32
    }

    /// Worksheet title, e.g. `2025年4月`.
    pub fn sheet_name(&self) -> String {
        format!("{}年{}月", self.year, self.month)
    }

    /// Days-of-run through day index `idx` (inclusive): cumulative count of
    /// days with rooms sold. For the Actual series only actualized days
    /// count, and the value is blank on a day that has not closed.
    pub fn days_of_run_through(&self, series: Series, idx: usize) -> Option<u32> {
        let day = self.days.get(idx)?;
        if series == Series::Actual && day.actual.is_none() {
            return None;
        }
        let count = self.days[..=idx]
            .iter()
            .filter_map(|d| d.series(series))
            .filter(|v| v.rooms_sold > 0.0)
            .count() as u32;
        Some(count)
    }
}

// ============================================================================
// Annual aggregation model
// ============================================================================

/// Month-level sums of one series, with the denominators needed to
/// recompute ratio metrics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesTotals {
    pub rooms: f64,
    pub guests: f64,
    pub revenue: Decimal,
    /// Days with rooms sold (days-of-run)
    pub active_days: u32,
    /// Days the series is populated for; occupancy/RevPAR denominator
    pub counted_days: u32,
}

impl SeriesTotals {
    pub fn zero() -> Self {
        Self {
            rooms: 0.0,
            guests: 0.0,
            revenue: Decimal::ZERO,
            active_days: 0,
            counted_days: 0,
        }
    }

    pub fn accumulate(&mut self, values: SeriesValues) {
        self.rooms += values.rooms_sold;
        self.guests += values.guests;
        self.revenue += values.revenue;
        if values.rooms_sold > 0.0 {
            self.active_days += 1;
        }
        self.counted_days += 1;
    }

    pub fn merge(&mut self, other: &SeriesTotals) {
        self.rooms += other.rooms;
        self.guests += other.guests;
        self.revenue += other.revenue;
        self.active_days += other.active_days;
        self.counted_days += other.counted_days;
    }

    pub fn occupancy(&self, capacity: u32) -> Option<f64> {
        if self.counted_days == 0 {
            return None;
        }
        Some(self.rooms / (f64::from(capacity) * f64::from(self.counted_days)))
    }

    pub fn adr(&self) -> Option<f64> {
        if self.counted_days == 0 || self.rooms == 0.0 {
            return None;
        }
        Some(self.revenue.to_f64().unwrap_or(0.0) / self.rooms)
    }

    pub fn revpar(&self, capacity: u32) -> Option<f64> {
        if self.counted_days == 0 {
            return None;
        }
        Some(self.revenue.to_f64().unwrap_or(0.0) / (f64::from(capacity) * f64::from(self.counted_days)))
    }

    /// Scalar for one metric; `None` renders as a blank cell.
    pub fn metric(&self, metric: Metric, capacity: u32) -> Option<f64> {
        match metric {
            Metric::Rooms => Some(self.rooms),
            Metric::Guests => Some(self.guests),
            Metric::Revenue => Some(self.revenue.to_f64().unwrap_or(0.0)),
            Metric::Occupancy => self.occupancy(capacity),
            Metric::Adr => self.adr(),
            Metric::RevPar => self.revpar(capacity),
            Metric::DaysOfRun => Some(f64::from(self.active_days)),
        }
    }
}

/// One fiscal-month column of the annual sheets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthAggregate {
    pub year: i32,
    pub month: u32,
    /// False when the input workbook had no sheet for this fiscal month
    pub present: bool,
    pub budget: SeriesTotals,
    pub fc: SeriesTotals,
    pub oh: SeriesTotals,
    pub actual: SeriesTotals,
}

impl MonthAggregate {
    pub fn absent(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            present: false,
            budget: SeriesTotals::zero(),
            fc: SeriesTotals::zero(),
            oh: SeriesTotals::zero(),
            actual: SeriesTotals::zero(),
        }
    }

    pub fn totals(&self, series: Series) -> &SeriesTotals {
        match series {
            Series::Budget => &self.budget,
            Series::Fc => &self.fc,
            Series::OnHand => &self.oh,
            Series::Actual => &self.actual,
        }
    }

    pub fn has_actual(&self) -> bool {
        self.actual.counted_days > 0
    }

    /// Whether a series carries any data for this month. Budget/FC/OH exist
    /// for every loaded month; Actual only once days have closed.
    pub fn has_series(&self, series: Series) -> bool {
        match series {
            Series::Actual => self.has_actual(),
            _ => self.present,
        }
    }

    /// Column label, e.g. `2025年4月`.
    pub fn label(&self) -> String {
        format!("{}年{}月", self.year, self.month)
    }
}

/// Fiscal-year aggregate: exactly twelve month columns in fiscal order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearAggregate {
    pub fiscal_year: i32,
    pub capacity: u32,
    pub months: Vec<MonthAggregate>,
}

impl YearAggregate {
    /// Month scalar for a series/metric; `None` renders blank.
    pub fn month_value(&self, series: Series, metric: Metric, idx: usize) -> Option<f64> {
        self.months[idx].totals(series).metric(metric, self.capacity)
    }

    /// Year-level sums of one series across all twelve months.
    pub fn year_totals(&self, series: Series) -> SeriesTotals {
        let mut sum = SeriesTotals::zero();
        for month in &self.months {
            sum.merge(month.totals(series));
        }
        sum
    }

    /// Year-total scalar. Additive metrics sum across months; ratio metrics
    /// are recomputed from the year-level sums, never averaged.
    pub fn year_value(&self, series: Series, metric: Metric) -> Option<f64> {
        self.year_totals(series).metric(metric, self.capacity)
    }

    /// Month cell of the annual variance sheet. A month lacking either side
    /// of the pair is excluded entirely (blank, not zero-filled), and an
    /// undefined ratio on either side renders blank.
    pub fn variance_month_value(
        &self,
        pair: VariancePair,
        metric: Metric,
        idx: usize,
    ) -> Option<f64> {
        let (left, right) = pair.sides();
        let month = &self.months[idx];
        if !month.has_series(left) || !month.has_series(right) {
            return None;
        }
        let l = self.month_value(left, metric, idx)?;
        let r = self.month_value(right, metric, idx)?;
        Some(l - r)
    }

    /// Year-total cell of the annual variance sheet. Additive metrics sum
    /// the included month cells; ratio metrics are recomputed from the
    /// annual totals of each side.
    pub fn variance_year_value(&self, pair: VariancePair, metric: Metric) -> Option<f64> {
        if metric.is_additive() {
            let cells: Vec<f64> = (0..self.months.len())
                .filter_map(|idx| self.variance_month_value(pair, metric, idx))
                .collect();
            if cells.is_empty() {
                return None;
            }
            return Some(cells.iter().sum());
        }
        let (left, right) = pair.sides();
        let l = self.year_value(left, metric)?;
        let r = self.year_value(right, metric)?;
        Some(l - r)
    }
}

// ============================================================================
// Renderer trait
// ============================================================================

/// A renderer turns derived months plus the annual aggregate into an output
/// document.
pub trait ReportRenderer {
    type Output;

    fn render(
        &self,
        months: &[MonthSheet],
        year: &YearAggregate,
        config: &ReportConfig,
    ) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Errors while deriving FC/OH series and metrics
#[derive(Debug, Error)]
pub enum DerivationError {
    #[error("invalid room capacity {0}: must be a positive integer")]
    InvalidCapacity(i64),

    #[error("invalid fiscal start month {0}: must be between 1 and 12")]
    InvalidFiscalStartMonth(u32),

    #[error("{date}: day has actual figures but a conflicting on-hand entry ({detail})")]
    ContradictoryOnHand { date: NaiveDate, detail: String },
}

/// Errors while writing the output workbook
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sheet '{sheet}': missing row for {date}")]
    IncompleteRow { sheet: String, date: NaiveDate },

    #[error("workbook error: {0}")]
    Workbook(String),
}

// ============================================================================
// Tests
// ============================================================================
