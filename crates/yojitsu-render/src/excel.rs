//! Excel report renderer
//!
//! Generates the consolidated XLSX workbook:
//! - one sheet per month: day rows with the `[予算][FC][OH][実績]` column
//!   blocks, variance columns, a totals row and the revised monthly
//!   forecast row,
//! - `年間集計`: vertical annual summary, one block per series,
//! - `年間差異`: vertical annual variance sheet, one block per pair.
//!
//! Derived metrics (OCC/ADR/RevPAR/DOR) and variance cells are written as
//! native formulas referencing the raw cells of the same row, so the
//! workbook recalculates when a user edits rooms/guests/revenue by hand.
//! Zero denominators are guarded into blank cells, matching the in-memory
//! derivation.
//!
//! Weekday cells are tinted blue for Saturdays and red for Sundays and
//! public holidays. FC/OH cells of actualized days carry a static gray
//! fill chosen by [`yojitsu_core::fc_oh_style`]; negative variances turn
//! red through a conditional format so the coloring tracks manual edits.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Weekday};
use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, Format, FormatAlign, FormatBorder, Workbook,
    Worksheet, XlsxError,
};

use yojitsu_core::{
    compose_rows, days_in_month, Field, Metric, MetricCells, MonthSheet, ReportConfig,
    ReportRenderer, RenderError, Series, SeriesTotals, VariancePair, WideRow, YearAggregate,
};

const DATE_COL: u16 = 0;
const WEEKDAY_COL: u16 = 1;
const FIRST_BLOCK_COL: u16 = 2;
const BLOCK_WIDTH: u16 = Metric::ALL.len() as u16;
const FIRST_VARIANCE_COL: u16 = FIRST_BLOCK_COL + 4 * BLOCK_WIDTH;

/// Excel workbook renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Stem of the output filename
    pub report_name: String,
    /// Whether derived cells are formulas (vs static values)
    pub use_formulas: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self { report_name: "予実管理表".into(), use_formulas: true }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output filename stem
    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    /// Write computed values instead of formulas
    pub fn static_values(mut self) -> Self {
        self.use_formulas = false;
        self
    }

    /// Output filename convention: `<stem>_<fiscal-year>.xlsx`
    pub fn output_filename(&self, fiscal_year: i32) -> String {
        format!("{}_{}.xlsx", self.report_name, fiscal_year)
    }

    /// Render and write the workbook into `dir`, returning the full path.
    pub fn save(
        &self,
        months: &[MonthSheet],
        year: &YearAggregate,
        config: &ReportConfig,
        dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let bytes = self.render_to_bytes(months, year, config)?;
        let path = dir.join(self.output_filename(year.fiscal_year));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Generate the workbook bytes
    pub fn render_to_bytes(
        &self,
        months: &[MonthSheet],
        year: &YearAggregate,
        config: &ReportConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = create_formats();

        for month in months {
            self.add_month_sheet(&mut workbook, month, config, &formats)?;
        }
        self.add_annual_summary(&mut workbook, year, &formats)?;
        self.add_annual_variance(&mut workbook, year, &formats)?;

        workbook.save_to_buffer().map_err(wb_err)
    }

    // ========================================================================
    // Monthly sheets
    // ========================================================================

    fn add_month_sheet(
        &self,
        workbook: &mut Workbook,
        month: &MonthSheet,
        config: &ReportConfig,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet_name = month.sheet_name();
        let expected_days = days_in_month(month.year, month.month);
        let rows = compose_rows(month, config);

        // Every calendar day must appear; a gap would silently shift every
        // formula below it.
        for (idx, row) in rows.iter().enumerate() {
            let expected =
                chrono::NaiveDate::from_ymd_opt(month.year, month.month, idx as u32 + 1);
            if expected != Some(row.date) {
                return Err(RenderError::IncompleteRow {
                    sheet: sheet_name,
                    date: expected.unwrap_or(row.date),
                });
            }
        }
        if rows.len() != expected_days as usize {
            return Err(RenderError::IncompleteRow {
                sheet: sheet_name,
                date: chrono::NaiveDate::from_ymd_opt(
                    month.year,
                    month.month,
                    rows.len() as u32 + 1,
                )
                .expect("missing day index within month"),
            });
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name(&sheet_name).map_err(wb_err)?;

        self.write_month_header(sheet, formats)?;

        let day_count = rows.len() as u32;
        let totals_row = day_count + 1;
        let revised_row = day_count + 2;

        for (idx, row) in rows.iter().enumerate() {
            self.write_day_row(sheet, idx as u32 + 1, row, config, formats)?;
        }
        self.write_totals_row(sheet, totals_row, day_count, config, month, formats)?;
        self.write_revised_forecast_row(sheet, revised_row, day_count, config, month, formats)?;

        // Negative variances in red, tracking manual edits
        let red = Format::new().set_font_color(0xFF0000);
        for offset in 0..(VariancePair::ALL.len() * Field::ALL.len()) as u16 {
            let col = FIRST_VARIANCE_COL + offset;
            let negative = ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::LessThan(0))
                .set_format(red.clone());
            sheet
                .add_conditional_format(1, col, totals_row, col, &negative)
                .map_err(wb_err)?;
        }

        sheet.set_freeze_panes(1, 2).ok();
        Ok(())
    }

    fn write_month_header(
        &self,
        sheet: &mut Worksheet,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet.write_with_format(0, DATE_COL, "日付", &formats.header).map_err(wb_err)?;
        sheet.write_with_format(0, WEEKDAY_COL, "曜日", &formats.header).map_err(wb_err)?;

        for (series_idx, series) in Series::ALL.iter().enumerate() {
            for (metric_idx, metric) in Metric::ALL.iter().enumerate() {
                let col = block_col(series_idx, metric_idx);
                let label = format!("{}_{}", metric.label(), series.label());
                sheet.write_with_format(0, col, &label, &formats.header).map_err(wb_err)?;
            }
        }
        for (pair_idx, pair) in VariancePair::ALL.iter().enumerate() {
            for (field_idx, field) in Field::ALL.iter().enumerate() {
                let col = variance_col(pair_idx, field_idx);
                let label = format!("差_{}_{}", field.label(), pair_short(*pair));
                sheet.write_with_format(0, col, &label, &formats.header).map_err(wb_err)?;
            }
        }

        sheet.set_column_width(DATE_COL, 11).ok();
        sheet.set_column_width(WEEKDAY_COL, 7).ok();
        for col in FIRST_BLOCK_COL..FIRST_VARIANCE_COL + 12 {
            sheet.set_column_width(col, 9).ok();
        }
        Ok(())
    }

    fn write_day_row(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        day: &WideRow,
        config: &ReportConfig,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let date_text = day.date.format("%Y/%m/%d").to_string();
        sheet.write_with_format(row, DATE_COL, &date_text, &formats.date).map_err(wb_err)?;

        // Saturday blue, Sunday and public holidays red
        let weekday_format = if day.weekday_label.contains('祝') || day.date.weekday() == Weekday::Sun {
            &formats.sun
        } else if day.date.weekday() == Weekday::Sat {
            &formats.sat
        } else {
            &formats.text
        };
        sheet
            .write_with_format(row, WEEKDAY_COL, &day.weekday_label, weekday_format)
            .map_err(wb_err)?;

        for (series_idx, series) in Series::ALL.iter().enumerate() {
            let tint = block_tint(*series, day.fc_oh_muted());
            self.write_series_block(sheet, row, series_idx, day.block(*series), config, formats, tint)?;
        }

        for (pair_idx, pair) in VariancePair::ALL.iter().enumerate() {
            for (field_idx, field) in Field::ALL.iter().enumerate() {
                let col = variance_col(pair_idx, field_idx);
                let format = &formats.var_int;
                if self.use_formulas {
                    let (left, right) = pair.sides();
                    let l = cell(field_block_col(left, field_idx), row);
                    let r = cell(field_block_col(right, field_idx), row);
                    let formula =
                        format!("=IF(OR({l}=\"\",{r}=\"\"),\"\",{l}-{r})");
                    sheet
                        .write_formula_with_format(row, col, formula.as_str(), format)
                        .map_err(wb_err)?;
                } else {
                    match day.variance(*pair, *field) {
                        Some(value) => sheet
                            .write_with_format(row, col, value, format)
                            .map_err(wb_err)?,
                        None => sheet.write_blank(row, col, format).map_err(wb_err)?,
                    };
                }
            }
        }
        Ok(())
    }

    fn write_series_block(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        series_idx: usize,
        cells: &MetricCells,
        config: &ReportConfig,
        formats: &ExcelFormats,
        tint: Tint,
    ) -> Result<(), RenderError> {
        let room = cell(block_col(series_idx, 0), row);
        let room_col = col_letter(block_col(series_idx, 0));
        let sales = cell(block_col(series_idx, 2), row);
        let capacity = config.capacity;

        for (metric_idx, metric) in Metric::ALL.iter().enumerate() {
            let col = block_col(series_idx, metric_idx);
            let format = formats.number(*metric, tint);

            // Raw fields are always values; derived metrics are formulas so
            // the sheet recalculates after manual edits.
            let raw = match metric {
                Metric::Rooms => Some(cells.rooms),
                Metric::Guests => Some(cells.guests),
                Metric::Revenue => Some(cells.revenue),
                _ => None,
            };
            if let Some(value) = raw {
                match value {
                    Some(v) => sheet.write_with_format(row, col, v, format).map_err(wb_err)?,
                    None => sheet.write_blank(row, col, format).map_err(wb_err)?,
                };
                continue;
            }

            if self.use_formulas {
                let formula = match metric {
                    Metric::Occupancy => {
                        format!("=IF({room}=\"\",\"\",{room}/{capacity})")
                    }
                    Metric::Adr => format!(
                        "=IF(OR({room}=\"\",{room}=0),\"\",{sales}/{room})"
                    ),
                    Metric::RevPar => format!(
                        "=IF(OR({room}=\"\",{room}=0),\"\",{sales}/{capacity})"
                    ),
                    Metric::DaysOfRun => format!(
                        "=IF({room}=\"\",\"\",COUNTIF({room_col}$2:{room},\">0\"))"
                    ),
                    _ => unreachable!("raw fields handled above"),
                };
                sheet
                    .write_formula_with_format(row, col, formula.as_str(), format)
                    .map_err(wb_err)?;
            } else {
                let value = match metric {
                    Metric::Occupancy => cells.occupancy,
                    Metric::Adr => cells.adr,
                    Metric::RevPar => cells.revpar,
                    Metric::DaysOfRun => cells.days_of_run.map(f64::from),
                    _ => unreachable!("raw fields handled above"),
                };
                match value {
                    Some(v) => sheet.write_with_format(row, col, v, format).map_err(wb_err)?,
                    None => sheet.write_blank(row, col, format).map_err(wb_err)?,
                };
            }
        }
        Ok(())
    }

    fn write_totals_row(
        &self,
        sheet: &mut Worksheet,
        totals_row: u32,
        day_count: u32,
        config: &ReportConfig,
        month: &MonthSheet,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet
            .write_with_format(totals_row, DATE_COL, "合計", &formats.total_label)
            .map_err(wb_err)?;
        sheet
            .write_with_format(totals_row, WEEKDAY_COL, "", &formats.total_label)
            .map_err(wb_err)?;

        let first = 2; // first data row, 1-based
        let last = day_count + 1;
        let capacity = config.capacity;
        let totals = month_totals(month);

        for (series_idx, series) in Series::ALL.iter().enumerate() {
            let room_col = col_letter(block_col(series_idx, 0));
            let sales_col = col_letter(block_col(series_idx, 2));
            let room_total = cell(block_col(series_idx, 0), totals_row);
            let sales_total = cell(block_col(series_idx, 2), totals_row);
            let series_totals = &totals[series_idx];

            for (metric_idx, metric) in Metric::ALL.iter().enumerate() {
                let col = block_col(series_idx, metric_idx);
                let col_l = col_letter(col);
                let format = formats.total_number(*metric);

                if self.use_formulas {
                    let formula = match metric {
                        Metric::Rooms | Metric::Guests | Metric::Revenue => {
                            if *series == Series::OnHand {
                                // Open days only; closed days come from the
                                // actual column so edits there flow through.
                                let act_col =
                                    col_letter(field_block_col(Series::Actual, metric_idx));
                                format!(
                                    "=SUM({act_col}{first}:{act_col}{last})+SUMIFS({col_l}{first}:{col_l}{last},{act_col}{first}:{act_col}{last},\"\")"
                                )
                            } else {
                                format!("=SUM({col_l}{first}:{col_l}{last})")
                            }
                        }
                        Metric::Occupancy => format!(
                            "=IF(COUNT({room_col}{first}:{room_col}{last})=0,\"\",SUM({room_col}{first}:{room_col}{last})/{capacity}/COUNT({room_col}{first}:{room_col}{last}))"
                        ),
                        Metric::Adr => format!(
                            "=IF(OR({room_total}=\"\",{room_total}=0),\"\",{sales_total}/{room_total})"
                        ),
                        Metric::RevPar => format!(
                            "=IF(COUNT({sales_col}{first}:{sales_col}{last})=0,\"\",{sales_total}/{capacity}/{day_count})"
                        ),
                        Metric::DaysOfRun => {
                            format!("=COUNTIF({room_col}{first}:{room_col}{last},\">0\")")
                        }
                    };
                    sheet
                        .write_formula_with_format(totals_row, col, formula.as_str(), format)
                        .map_err(wb_err)?;
                } else {
                    match series_totals.metric(*metric, capacity) {
                        Some(v) => sheet
                            .write_with_format(totals_row, col, v, format)
                            .map_err(wb_err)?,
                        None => sheet.write_blank(totals_row, col, format).map_err(wb_err)?,
                    };
                }
            }
        }

        for (pair_idx, pair) in VariancePair::ALL.iter().enumerate() {
            for (field_idx, _) in Field::ALL.iter().enumerate() {
                let col = variance_col(pair_idx, field_idx);
                if self.use_formulas {
                    let (left, right) = pair.sides();
                    let l = cell(field_block_col(left, field_idx), totals_row);
                    let r = cell(field_block_col(right, field_idx), totals_row);
                    let formula = format!("=IF(OR({l}=\"\",{r}=\"\"),\"\",{l}-{r})");
                    sheet
                        .write_formula_with_format(totals_row, col, formula.as_str(), &formats.var_int)
                        .map_err(wb_err)?;
                } else {
                    sheet.write_blank(totals_row, col, &formats.var_int).map_err(wb_err)?;
                }
            }
        }
        Ok(())
    }

    /// Revised monthly forecast: actuals where known, FC for the open rest.
    fn write_revised_forecast_row(
        &self,
        sheet: &mut Worksheet,
        revised_row: u32,
        day_count: u32,
        config: &ReportConfig,
        month: &MonthSheet,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet
            .write_with_format(revised_row, DATE_COL, "修正月次フォーキャスト", &formats.total_label)
            .map_err(wb_err)?;

        let first = 2;
        let last = day_count + 1;
        let capacity = config.capacity;
        let fc_idx = 1; // FC block position in Series::ALL
        let fc_room = cell(block_col(fc_idx, 0), revised_row);
        let fc_sales = cell(block_col(fc_idx, 2), revised_row);
        let fc_room_col = col_letter(block_col(fc_idx, 0));
        let totals = month_totals(month);

        for (metric_idx, metric) in Metric::ALL.iter().enumerate() {
            let col = block_col(fc_idx, metric_idx);
            let col_l = col_letter(col);
            let format = formats.total_number(*metric);

            if self.use_formulas {
                let formula = match metric {
                    Metric::Rooms | Metric::Guests | Metric::Revenue => {
                        let act_col = col_letter(field_block_col(Series::Actual, metric_idx));
                        format!(
                            "=SUM({act_col}{first}:{act_col}{last})+SUMIFS({col_l}{first}:{col_l}{last},{act_col}{first}:{act_col}{last},\"\")"
                        )
                    }
                    Metric::Occupancy => {
                        format!("=IF({fc_room}=\"\",\"\",{fc_room}/({capacity}*{day_count}))")
                    }
                    Metric::Adr => format!(
                        "=IF(OR({fc_room}=\"\",{fc_room}=0),\"\",{fc_sales}/{fc_room})"
                    ),
                    Metric::RevPar => format!(
                        "=IF({fc_sales}=\"\",\"\",{fc_sales}/({capacity}*{day_count}))"
                    ),
                    Metric::DaysOfRun => format!(
                        "=COUNTIF({fc_room_col}{first}:{fc_room_col}{last},\">0\")"
                    ),
                };
                sheet
                    .write_formula_with_format(revised_row, col, formula.as_str(), format)
                    .map_err(wb_err)?;
            } else {
                // FC already collapses to actuals on closed days, so the
                // revised figures equal the plain FC totals.
                match totals[fc_idx].metric(*metric, capacity) {
                    Some(v) => sheet
                        .write_with_format(revised_row, col, v, format)
                        .map_err(wb_err)?,
                    None => sheet.write_blank(revised_row, col, format).map_err(wb_err)?,
                };
            }
        }
        Ok(())
    }

    // ========================================================================
    // Annual sheets
    // ========================================================================

    fn add_annual_summary(
        &self,
        workbook: &mut Workbook,
        year: &YearAggregate,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("年間集計").map_err(wb_err)?;

        let total_col = year.months.len() as u16 + 1;
        let mut current_row = 0u32;

        for series in Series::ALL {
            sheet
                .write_with_format(current_row, 0, series.label(), &formats.title)
                .map_err(wb_err)?;
            let header_row = current_row + 1;
            self.write_annual_header(sheet, header_row, year, formats)?;

            let tint = match series {
                Series::Budget => Tint::Budget,
                Series::Fc => Tint::Fc,
                _ => Tint::Plain,
            };

            for (metric_idx, metric) in Metric::ALL.iter().enumerate() {
                let row = header_row + 1 + metric_idx as u32;
                sheet
                    .write_with_format(row, 0, metric.label(), formats.number(Metric::Rooms, tint))
                    .map_err(wb_err)?;
                for idx in 0..year.months.len() {
                    let col = idx as u16 + 1;
                    let format = formats.number(*metric, tint);
                    match year.month_value(series, *metric, idx) {
                        Some(v) => {
                            sheet.write_with_format(row, col, v, format).map_err(wb_err)?
                        }
                        None => sheet.write_blank(row, col, format).map_err(wb_err)?,
                    };
                }
                let format = formats.total_number(*metric);
                match year.year_value(series, *metric) {
                    Some(v) => sheet
                        .write_with_format(row, total_col, v, format)
                        .map_err(wb_err)?,
                    None => sheet.write_blank(row, total_col, format).map_err(wb_err)?,
                };
            }
            current_row = header_row + 1 + Metric::ALL.len() as u32 + 1;
        }

        sheet.set_column_width(0, 12).ok();
        for col in 1..=total_col {
            sheet.set_column_width(col, 11).ok();
        }
        sheet.set_freeze_panes(2, 1).ok();
        Ok(())
    }

    fn add_annual_variance(
        &self,
        workbook: &mut Workbook,
        year: &YearAggregate,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("年間差異").map_err(wb_err)?;

        let total_col = year.months.len() as u16 + 1;
        let mut current_row = 0u32;

        for pair in VariancePair::ALL {
            sheet
                .write_with_format(current_row, 0, &pair.label(), &formats.title)
                .map_err(wb_err)?;
            let header_row = current_row + 1;
            self.write_annual_header(sheet, header_row, year, formats)?;

            // Budget comparisons in blue, forecast comparisons in green
            let tint = match pair.sides().1 {
                Series::Budget => Tint::Budget,
                _ => Tint::Fc,
            };

            for (metric_idx, metric) in Metric::ALL.iter().enumerate() {
                let row = header_row + 1 + metric_idx as u32;
                sheet
                    .write_with_format(row, 0, metric.label(), formats.number(Metric::Rooms, tint))
                    .map_err(wb_err)?;
                for idx in 0..year.months.len() {
                    let col = idx as u16 + 1;
                    let format = formats.number(*metric, tint);
                    match year.variance_month_value(pair, *metric, idx) {
                        Some(v) => {
                            sheet.write_with_format(row, col, v, format).map_err(wb_err)?
                        }
                        None => sheet.write_blank(row, col, format).map_err(wb_err)?,
                    };
                }
                let format = formats.total_number(*metric);
                match year.variance_year_value(pair, *metric) {
                    Some(v) => sheet
                        .write_with_format(row, total_col, v, format)
                        .map_err(wb_err)?,
                    None => sheet.write_blank(row, total_col, format).map_err(wb_err)?,
                };
            }

            // Negative cells in red across the whole block
            let first_metric_row = header_row + 1;
            let last_metric_row = header_row + Metric::ALL.len() as u32;
            let red = Format::new().set_font_color(0xFF0000);
            let negative = ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::LessThan(0))
                .set_format(red);
            sheet
                .add_conditional_format(first_metric_row, 1, last_metric_row, total_col, &negative)
                .map_err(wb_err)?;

            current_row = last_metric_row + 2;
        }

        sheet.set_column_width(0, 12).ok();
        for col in 1..=total_col {
            sheet.set_column_width(col, 11).ok();
        }
        Ok(())
    }

    fn write_annual_header(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        year: &YearAggregate,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet.write_with_format(row, 0, "指標", &formats.header).map_err(wb_err)?;
        for (idx, month) in year.months.iter().enumerate() {
            sheet
                .write_with_format(row, idx as u16 + 1, &month.label(), &formats.header)
                .map_err(wb_err)?;
        }
        sheet
            .write_with_format(row, year.months.len() as u16 + 1, "年間合計", &formats.header)
            .map_err(wb_err)?;
        Ok(())
    }
}

impl ReportRenderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(
        &self,
        months: &[MonthSheet],
        year: &YearAggregate,
        config: &ReportConfig,
    ) -> Result<Self::Output, RenderError> {
        self.render_to_bytes(months, year, config)
    }
}

// ============================================================================
// Layout helpers
// ============================================================================

fn block_col(series_idx: usize, metric_idx: usize) -> u16 {
    FIRST_BLOCK_COL + series_idx as u16 * BLOCK_WIDTH + metric_idx as u16
}

/// Column of a raw field (rooms/guests/revenue) within a series block.
fn field_block_col(series: Series, field_idx: usize) -> u16 {
    let series_idx = Series::ALL.iter().position(|s| *s == series).expect("known series");
    block_col(series_idx, field_idx)
}

fn variance_col(pair_idx: usize, field_idx: usize) -> u16 {
    FIRST_VARIANCE_COL + pair_idx as u16 * Field::ALL.len() as u16 + field_idx as u16
}

fn pair_short(pair: VariancePair) -> &'static str {
    match pair {
        VariancePair::FcMinusBudget => "FC-予算",
        VariancePair::OhMinusFc => "OH-FC",
        VariancePair::ActualMinusFc => "実績-FC",
        VariancePair::ActualMinusBudget => "実績-予算",
    }
}

/// `A1`-style reference of a zero-based (col, row) pair.
fn cell(col: u16, row: u32) -> String {
    format!("{}{}", col_letter(col), row + 1)
}

fn col_letter(col: u16) -> String {
    let mut col = i32::from(col);
    let mut letters = String::new();
    loop {
        letters.insert(0, char::from(b'A' + (col % 26) as u8));
        col = col / 26 - 1;
        if col < 0 {
            break;
        }
    }
    letters
}

/// Month totals per series, in `Series::ALL` order (static-value path).
fn month_totals(month: &MonthSheet) -> [SeriesTotals; 4] {
    let mut totals = [SeriesTotals::zero(); 4];
    for day in &month.days {
        for (slot, series) in totals.iter_mut().zip(Series::ALL) {
            if let Some(values) = day.series(series) {
                slot.accumulate(values);
            }
        }
    }
    totals
}

fn wb_err(e: XlsxError) -> RenderError {
    RenderError::Workbook(e.to_string())
}

// ============================================================================
// Formats
// ============================================================================

/// Background treatment of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tint {
    Plain,
    /// Budget block, light blue
    Budget,
    /// FC block, light green
    Fc,
    /// FC/OH cells of an actualized day, gray
    Muted,
}

fn block_tint(series: Series, muted: bool) -> Tint {
    match series {
        Series::Budget => Tint::Budget,
        Series::Fc if muted => Tint::Muted,
        Series::Fc => Tint::Fc,
        Series::OnHand if muted => Tint::Muted,
        Series::OnHand | Series::Actual => Tint::Plain,
    }
}

struct ExcelFormats {
    header: Format,
    title: Format,
    text: Format,
    date: Format,
    sat: Format,
    sun: Format,
    total_label: Format,
    var_int: Format,
    int: [Format; 4],
    pct: [Format; 4],
    dor: [Format; 4],
    total_int: Format,
    total_pct: Format,
    total_dor: Format,
}

impl ExcelFormats {
    /// Number format for a metric under a tint. Index order follows [`Tint`].
    fn number(&self, metric: Metric, tint: Tint) -> &Format {
        let idx = match tint {
            Tint::Plain => 0,
            Tint::Budget => 1,
            Tint::Fc => 2,
            Tint::Muted => 3,
        };
        match metric {
            Metric::Occupancy => &self.pct[idx],
            Metric::DaysOfRun => &self.dor[idx],
            _ => &self.int[idx],
        }
    }

    fn total_number(&self, metric: Metric) -> &Format {
        match metric {
            Metric::Occupancy => &self.total_pct,
            Metric::DaysOfRun => &self.total_dor,
            _ => &self.total_int,
        }
    }
}

const BUDGET_FILL: u32 = 0xE6F2FF;
const FC_FILL: u32 = 0xE6FFE6;
const MUTED_FILL: u32 = 0xDDDDDD;
const VARIANCE_FILL: u32 = 0xFFFAD0;

fn create_formats() -> ExcelFormats {
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(0x4472C4)
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);

    let title = Format::new().set_bold();

    let text = Format::new().set_border(FormatBorder::Thin);
    let date = Format::new().set_border(FormatBorder::Thin);

    let sat = Format::new()
        .set_background_color(0xDDEEFF)
        .set_font_color(0x003366)
        .set_border(FormatBorder::Thin);
    let sun = Format::new()
        .set_background_color(0xFFE5E5)
        .set_font_color(0x990000)
        .set_border(FormatBorder::Thin);

    let total_label = Format::new().set_bold().set_border(FormatBorder::Thin);

    let var_int = Format::new()
        .set_num_format("#,##0")
        .set_background_color(VARIANCE_FILL)
        .set_border(FormatBorder::Thin);

    let tinted = |base: Format, tint: Option<u32>| match tint {
        Some(color) => base.set_background_color(color),
        None => base,
    };
    let number = |num_format: &str| {
        let base = || Format::new().set_num_format(num_format).set_border(FormatBorder::Thin);
        [
            tinted(base(), None),
            tinted(base(), Some(BUDGET_FILL)),
            tinted(base(), Some(FC_FILL)),
            tinted(base(), Some(MUTED_FILL)),
        ]
    };

    let int = number("#,##0");
    let pct = number("0.0%");
    let dor = number("0");

    let total = |num_format: &str| {
        Format::new()
            .set_bold()
            .set_num_format(num_format)
            .set_border(FormatBorder::Thin)
    };

    ExcelFormats {
        header,
        title,
        text,
        date,
        sat,
        sun,
        total_label,
        var_int,
        int,
        pct,
        dor,
        total_int: total("#,##0"),
        total_pct: total("0.0%"),
        total_dor: total("0"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_letters() {
        assert_eq!(col_letter(0), "A");
        assert_eq!(col_letter(25), "Z");
        assert_eq!(col_letter(26), "AA");
        assert_eq!(col_letter(29), "AD");
    }

    #[test]
    fn block_layout_is_contiguous() {
        assert_eq!(block_col(0, 0), 2);
        assert_eq!(block_col(1, 0), 9);
        assert_eq!(block_col(3, 6), 29);
        assert_eq!(variance_col(0, 0), 30);
        assert_eq!(variance_col(3, 2), 41);
    }

    #[test]
    fn output_filename_encodes_fiscal_year() {
        let renderer = ExcelRenderer::new();
        assert_eq!(renderer.output_filename(2025), "予実管理表_2025.xlsx");
        let renderer = renderer.report_name("kpi");
        assert_eq!(renderer.output_filename(2025), "kpi_2025.xlsx");
    }

    #[test]
    fn muting_only_applies_to_fc_and_oh() {
        assert_eq!(block_tint(Series::Budget, true), Tint::Budget);
        assert_eq!(block_tint(Series::Fc, true), Tint::Muted);
        assert_eq!(block_tint(Series::OnHand, true), Tint::Muted);
        assert_eq!(block_tint(Series::Actual, true), Tint::Plain);
        assert_eq!(block_tint(Series::Fc, false), Tint::Fc);
    }
}
