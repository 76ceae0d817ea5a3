//! Statistics table as a spreadsheet.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use super::{statistic_values, ArtifactKind, STATISTIC_COLUMN, STATISTIC_ROWS};
use crate::analyzers::{AnalysisResult, CorrelationMatrix};
use crate::prelude::*;

/// Name of the worksheet holding the statistics table.
pub const STATISTICS_SHEET: &str = "statistics";
/// Name of the worksheet holding the correlation matrix, when there is one.
pub const CORRELATIONS_SHEET: &str = "correlations";

/// Writes the statistics table (and the correlation matrix, if computed)
/// to an `.xlsx` workbook at `path`.
///
/// The workbook is rendered in memory first so that a bad destination
/// surfaces as a plain I/O error.
pub fn write_statistics_xlsx(result: &AnalysisResult, path: &Path) -> Result<()> {
    let kind = ArtifactKind::StatisticsXlsx;
    let buffer = render_workbook(result).map_err(|e| TermError::write(kind, path, e))?;
    fs::write(path, &buffer).map_err(|e| TermError::write(kind, path, e))?;

    debug!(
        bytes = buffer.len(),
        path = %path.display(),
        "Statistics workbook written"
    );
    Ok(())
}

fn render_workbook(result: &AnalysisResult) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(STATISTICS_SHEET)?;
    write_statistics(sheet, result, &bold)?;

    if let Some(matrix) = &result.correlations {
        let sheet = workbook.add_worksheet();
        sheet.set_name(CORRELATIONS_SHEET)?;
        write_correlations(sheet, matrix, &bold)?;
    }

    workbook.save_to_buffer()
}

fn write_statistics(
    sheet: &mut Worksheet,
    result: &AnalysisResult,
    bold: &Format,
) -> std::result::Result<(), XlsxError> {
    sheet.write_string_with_format(0, 0, STATISTIC_COLUMN, bold)?;
    for (row, label) in (1u32..).zip(STATISTIC_ROWS) {
        sheet.write_string_with_format(row, 0, label, bold)?;
    }

    for (col, summary) in (1u16..).zip(&result.numeric) {
        sheet.write_string_with_format(0, col, &summary.column, bold)?;
        for (row, value) in (1u32..).zip(statistic_values(summary)) {
            if let Some(value) = value {
                sheet.write_number(row, col, value)?;
            }
        }
    }
    Ok(())
}

fn write_correlations(
    sheet: &mut Worksheet,
    matrix: &CorrelationMatrix,
    bold: &Format,
) -> std::result::Result<(), XlsxError> {
    for (index, name) in (1u16..).zip(&matrix.columns) {
        sheet.write_string_with_format(0, index, name, bold)?;
        sheet.write_string_with_format(u32::from(index), 0, name, bold)?;
    }
    for (row, values) in (1u32..).zip(&matrix.values) {
        for (col, value) in (1u16..).zip(values) {
            if let Some(value) = value {
                sheet.write_number(row, col, *value)?;
            }
        }
    }
    Ok(())
}
