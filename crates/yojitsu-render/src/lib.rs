//! # yojitsu-render
//!
//! Rendering backends for derived yojitsu reports.
//!
//! Currently a single backend: the Excel workbook writer. The output
//! workbook carries one sheet per month plus the annual summary and annual
//! variance sheets, with the derived-metric and variance cells written as
//! native formulas so the workbook stays recalculable when raw cells are
//! edited by hand.
//!
//! ## Example
//!
//! ```rust,ignore
//! use yojitsu_core::ReportRenderer;
//! use yojitsu_render::ExcelRenderer;
//!
//! let renderer = ExcelRenderer::new().report_name("予実管理表");
//! let bytes = renderer.render(&months, &year, &config)?;
//! std::fs::write(renderer.output_filename(year.fiscal_year), bytes)?;
//! ```

pub mod excel;

pub use excel::ExcelRenderer;
