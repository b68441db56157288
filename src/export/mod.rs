//! Spreadsheet export of a backlog's PBIs.
//!
//! The rows are exported in the order they are given, so callers pass the
//! list exactly as it is currently sorted and filtered.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

use crate::database::models::PbiWithDetails;

pub const SHEET_NAME: &str = "Product Backlog Items";
pub const NO_EPIC: &str = "No Epic";

/// Header text and column width, in character units.
pub const COLUMNS: [(&str, f64); 12] = [
    ("No.", 5.0),
    ("Title", 30.0),
    ("Priority", 10.0),
    ("Story Points", 12.0),
    ("PIC", 15.0),
    ("Epic", 20.0),
    ("Business Value", 40.0),
    ("User Story", 50.0),
    ("Acceptance Criteria", 50.0),
    ("Notes", 30.0),
    ("Created Date", 12.0),
    ("Updated Date", 12.0),
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("There are no PBIs to export")]
    Empty,

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One worksheet row, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub number: usize,
    pub title: String,
    pub priority: String,
    pub story_points: i32,
    pub pic: String,
    pub epic: String,
    pub business_value: String,
    pub user_story: String,
    pub acceptance_criteria: String,
    pub notes: String,
    pub created: String,
    pub updated: String,
}

/// Created and updated cells show the exporting machine's local date.
fn format_date(value: DateTime<Utc>) -> String {
    date_in(value, &Local)
}

fn date_in<Tz: TimeZone>(value: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value.with_timezone(tz).format("%Y-%m-%d").to_string()
}

/// Date stamped into the export filename, taken in UTC.
pub fn export_date() -> NaiveDate {
    Utc::now().date_naive()
}

/// Numbers the rows from 1 and fills in display placeholders.
pub fn export_rows(pbis: &[PbiWithDetails]) -> Vec<ExportRow> {
    pbis.iter()
        .enumerate()
        .map(|(index, detail)| {
            let pbi = &detail.pbi;
            ExportRow {
                number: index + 1,
                title: pbi.title.clone(),
                priority: pbi.priority.to_string(),
                story_points: pbi.story_point,
                pic: pbi.pic.clone(),
                epic: detail.epic_title.clone().unwrap_or_else(|| NO_EPIC.to_string()),
                business_value: pbi.business_value.clone(),
                user_story: pbi.user_story.clone(),
                acceptance_criteria: pbi.acceptance_criteria.clone(),
                notes: pbi.notes.clone().unwrap_or_default(),
                created: format_date(pbi.created_at),
                updated: format_date(pbi.updated_at),
            }
        })
        .collect()
}

/// `<title>_PBIs_<YYYY-MM-DD>.xlsx` with every character outside
/// `[A-Za-z0-9]` in the title replaced by `_`.
pub fn export_filename(backlog_title: &str, date: NaiveDate) -> String {
    let safe: String = backlog_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_PBIs_{}.xlsx", safe, date.format("%Y-%m-%d"))
}

/// Builds the workbook. Empty lists are refused.
pub fn build_workbook(pbis: &[PbiWithDetails]) -> Result<Workbook, ExportError> {
    if pbis.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *title, &header)?;
    }

    for (index, row) in export_rows(pbis).iter().enumerate() {
        let r = index as u32 + 1;
        worksheet.write_number(r, 0, row.number as f64)?;
        worksheet.write_number(r, 3, f64::from(row.story_points))?;

        let text_cells: [(u16, &str); 10] = [
            (1, row.title.as_str()),
            (2, row.priority.as_str()),
            (4, row.pic.as_str()),
            (5, row.epic.as_str()),
            (6, row.business_value.as_str()),
            (7, row.user_story.as_str()),
            (8, row.acceptance_criteria.as_str()),
            (9, row.notes.as_str()),
            (10, row.created.as_str()),
            (11, row.updated.as_str()),
        ];
        for (col, text) in text_cells {
            worksheet.write_string(r, col, text)?;
        }
    }

    Ok(workbook)
}

pub fn export_to_buffer(pbis: &[PbiWithDetails]) -> Result<Vec<u8>, ExportError> {
    Ok(build_workbook(pbis)?.save_to_buffer()?)
}

/// Writes the workbook into `dir` under the export filename for
/// `backlog_title` and returns the full path.
pub fn export_to_dir(
    dir: &Path,
    backlog_title: &str,
    pbis: &[PbiWithDetails],
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    let buffer = export_to_buffer(pbis)?;
    let path = dir.join(export_filename(backlog_title, date));
    std::fs::write(&path, buffer).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!("Exported {} PBIs to {}", pbis.len(), path.display());
    Ok(path)
}
