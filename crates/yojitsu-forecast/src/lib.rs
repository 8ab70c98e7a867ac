//! # yojitsu-forecast
//!
//! Forecast derivation and annual aggregation.
//!
//! This crate turns loaded month inputs into fully derived months and the
//! fiscal-year aggregate:
//! - [`derive_month`] applies the forecast-correction rules: closed days
//!   freeze FC/OH to the actuals, open days take the on-hand snapshot and a
//!   budget-shaped forecast with the on-hand delta redistributed over the
//!   remaining days.
//! - [`aggregate_year`] folds the derived months into the twelve fiscal
//!   columns of the annual sheets.
//!
//! ## Example
//!
//! ```rust
//! use yojitsu_core::{NoHolidays, ReportConfig};
//! use yojitsu_forecast::build_report;
//!
//! let config = ReportConfig::new(100, 4).unwrap();
//! let (months, year) = build_report(&[], &config, &NoHolidays).unwrap();
//! assert!(months.is_empty());
//! assert_eq!(year.months.len(), 12);
//! ```

mod aggregate;
mod derive;

pub use aggregate::aggregate_year;
pub use derive::derive_month;

use yojitsu_core::{
    DerivationError, HolidayCalendar, MonthInput, MonthSheet, ReportConfig, YearAggregate,
};

/// Run the full derivation pipeline: every month derived, then aggregated
/// into the fiscal-year matrix.
pub fn build_report(
    months: &[MonthInput],
    config: &ReportConfig,
    holidays: &dyn HolidayCalendar,
) -> Result<(Vec<MonthSheet>, YearAggregate), DerivationError> {
    let derived = months
        .iter()
        .map(|m| derive_month(m, config, holidays))
        .collect::<Result<Vec<_>, _>>()?;
    let year = aggregate_year(&derived, config);
    Ok((derived, year))
}
