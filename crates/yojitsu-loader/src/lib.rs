//! # yojitsu-loader
//!
//! Reads the per-month budget workbook into the domain model.
//!
//! Each input sheet holds one calendar month as a flat table. The header row
//! is matched by normalized aliases (Japanese and English), so `日付`,
//! `宿泊日` and `Date` all select the date column. Rows are discriminated by
//! the `type` column: budget rows carry the literal budget marker, on-hand
//! rows the on-hand marker, and rows without a marker are actuals.
//!
//! The loader never mutates the source file and produces one [`MonthInput`]
//! per sheet with an entry for every calendar day of that month, ordered
//! fiscally.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

use yojitsu_core::{days_in_month, DayInput, MonthInput, ReportConfig, SeriesValues};

/// Loading error, carrying enough sheet/row/column detail to locate the
/// offending input.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sheet '{sheet}': required column '{column}' not found in header row")]
    InputFormat { sheet: String, column: &'static str },

    #[error("sheet '{sheet}' row {row}: {detail}")]
    InvalidDate { sheet: String, row: usize, detail: String },

    #[error("sheet '{sheet}' row {row}: duplicate {kind} entry for {date}")]
    DuplicateRow { sheet: String, row: usize, kind: &'static str, date: NaiveDate },

    #[error("workbook has no readable month sheets")]
    EmptyWorkbook,

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
}

/// Which series a data row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowKind {
    Budget,
    OnHand,
    Actual,
}

impl RowKind {
    fn name(self) -> &'static str {
        match self {
            RowKind::Budget => "budget",
            RowKind::OnHand => "on-hand",
            RowKind::Actual => "actual",
        }
    }
}

/// Resolved column indices of one sheet.
struct Columns {
    date: usize,
    kind: usize,
    rooms: usize,
    guests: usize,
    revenue: usize,
}

/// Load the workbook at `path`, one month per sheet, in fiscal order.
///
/// Sheets with no data rows are skipped; a sheet with data but a broken
/// header fails the whole run.
pub fn load_workbook(
    path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<Vec<MonthInput>, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let mut months = Vec::new();
    let names: Vec<String> = workbook.sheet_names().to_owned();
    for sheet in names {
        let range = workbook.worksheet_range(&sheet)?;
        if let Some(month) = load_sheet(&sheet, &range)? {
            months.push(month);
        }
    }

    if months.is_empty() {
        return Err(LoadError::EmptyWorkbook);
    }

    months.sort_by_key(|m| config.fiscal_order_key(m.year, m.month));
    Ok(months)
}

/// Parse one sheet into a month, or `None` when the sheet has no data rows.
fn load_sheet(sheet: &str, range: &Range<Data>) -> Result<Option<MonthInput>, LoadError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(None);
    };
    if range.rows().skip(1).all(row_is_empty) {
        return Ok(None);
    }

    let columns = resolve_columns(sheet, header)?;

    // Collected per date, filled into a full calendar month afterwards.
    let mut budget: BTreeMap<NaiveDate, SeriesValues> = BTreeMap::new();
    let mut actual: BTreeMap<NaiveDate, SeriesValues> = BTreeMap::new();
    let mut on_hand: BTreeMap<NaiveDate, SeriesValues> = BTreeMap::new();

    let mut sheet_month: Option<(i32, u32)> = None;

    for (row_idx, row) in rows.enumerate() {
        let row_num = row_idx + 2; // 1-based, after the header
        if row_is_empty(row) {
            continue;
        }

        let date = parse_date(row.get(columns.date)).ok_or_else(|| LoadError::InvalidDate {
            sheet: sheet.to_string(),
            row: row_num,
            detail: format!("unparseable date cell '{}'", cell_display(row.get(columns.date))),
        })?;

        // All rows of a sheet must fall into the month of the first row.
        let month = *sheet_month.get_or_insert((date.year(), date.month()));
        if (date.year(), date.month()) != month {
            return Err(LoadError::InvalidDate {
                sheet: sheet.to_string(),
                row: row_num,
                detail: format!("date {date} falls outside the sheet's month {}-{:02}", month.0, month.1),
            });
        }

        let kind = parse_kind(row.get(columns.kind));
        let values = SeriesValues::new(
            cell_number(row.get(columns.rooms)),
            cell_number(row.get(columns.guests)),
            cell_decimal(row.get(columns.revenue)),
        );

        let target = match kind {
            RowKind::Budget => &mut budget,
            RowKind::OnHand => &mut on_hand,
            RowKind::Actual => &mut actual,
        };
        if target.insert(date, values).is_some() {
            return Err(LoadError::DuplicateRow {
                sheet: sheet.to_string(),
                row: row_num,
                kind: kind.name(),
                date,
            });
        }
    }

    let Some((year, month)) = sheet_month else {
        return Ok(None);
    };

    // Expand to every calendar day; days without a budget row get zeros.
    let days = (1..=days_in_month(year, month))
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .expect("day within days_in_month is valid");
            DayInput {
                date,
                budget: budget.get(&date).copied().unwrap_or_else(SeriesValues::zero),
                actual: actual.get(&date).copied(),
                on_hand: on_hand.get(&date).copied(),
            }
        })
        .collect();

    Ok(Some(MonthInput::new(year, month, days)))
}

/// Match the required columns against normalized header aliases.
fn resolve_columns(sheet: &str, header: &[Data]) -> Result<Columns, LoadError> {
    let normalized: Vec<String> = header.iter().map(|c| normalize(&c.to_string())).collect();

    let find = |aliases: &[&str], column: &'static str| -> Result<usize, LoadError> {
        normalized
            .iter()
            .position(|h| aliases.contains(&h.as_str()))
            .ok_or_else(|| LoadError::InputFormat { sheet: sheet.to_string(), column })
    };

    Ok(Columns {
        date: find(&["日付", "宿泊日", "date"], "date")?,
        kind: find(&["区分", "種別", "type"], "type")?,
        rooms: find(&["室数", "rooms"], "rooms")?,
        guests: find(&["人数", "guests"], "guests")?,
        revenue: find(&["宿泊売上", "売上", "revenue"], "revenue")?,
    })
}

/// Header normalization: trim, lowercase, strip inner whitespace.
fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn row_is_empty(row: &[Data]) -> bool {
    row.iter().all(|c| matches!(c, Data::Empty) || c.to_string().trim().is_empty())
}

fn parse_kind(cell: Option<&Data>) -> RowKind {
    let text = cell.map(|c| normalize(&c.to_string())).unwrap_or_default();
    match text.as_str() {
        "予算" | "budget" => RowKind::Budget,
        "oh" | "onhand" | "on-hand" | "オンハンド" => RowKind::OnHand,
        // The type marker discriminates budget rows; anything else is actuals
        _ => RowKind::Actual,
    }
}

/// Excel serial day 0 is 1899-12-30 (the 1900 leap-year quirk included).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

fn parse_date(cell: Option<&Data>) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2)?;
    match cell? {
        Data::DateTime(dt) => epoch.checked_add_days(chrono::Days::new(dt.as_f64() as u64)),
        Data::Float(serial) if *serial > 0.0 => {
            epoch.checked_add_days(chrono::Days::new(*serial as u64))
        }
        Data::Int(serial) if *serial > 0 => {
            epoch.checked_add_days(chrono::Days::new(*serial as u64))
        }
        Data::String(text) => {
            let text = text.trim();
            NaiveDate::parse_from_str(text, "%Y/%m/%d")
                .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
                .ok()
        }
        _ => None,
    }
}

fn cell_number(cell: Option<&Data>) -> f64 {
    match cell {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn cell_decimal(cell: Option<&Data>) -> Decimal {
    match cell {
        Some(Data::Float(f)) => Decimal::try_from(*f).unwrap_or(Decimal::ZERO),
        Some(Data::Int(i)) => Decimal::from(*i),
        Some(Data::String(s)) => s.trim().replace(',', "").parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn cell_display(cell: Option<&Data>) -> String {
    cell.map(|c| c.to_string()).unwrap_or_default()
}
