//! Excel report: Summary / Data / Charts sheets.
//!
//! A key-value summary with the per-series latest values and deltas, the
//! flat month × series table, and one chart image per series.

use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::{Format, Image, Workbook, XlsxError};

use crate::domain::MasterTable;
use crate::error::DashError;

/// Rows between consecutive chart anchors.
const CHART_ROW_STRIDE: u32 = 42;

pub fn write_workbook(
    path: &Path,
    master: &MasterTable,
    charts: &[(String, PathBuf)],
) -> Result<(), DashError> {
    let summary = master.summary();
    if summary.is_empty() {
        return Err(DashError::Export(
            "nothing to export: master table is empty".to_string(),
        ));
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    // --- Summary
    let sheet = workbook
        .add_worksheet()
        .set_name("Summary")
        .map_err(xlsx_err)?;
    sheet.write_with_format(0, 0, "Latest month", &bold).map_err(xlsx_err)?;
    if let Some(month) = master.latest_month() {
        sheet
            .write(0, 1, month.format("%Y-%m").to_string())
            .map_err(xlsx_err)?;
    }
    sheet.write_with_format(2, 0, "series", &bold).map_err(xlsx_err)?;
    sheet.write_with_format(2, 1, "latest", &bold).map_err(xlsx_err)?;
    sheet.write_with_format(2, 2, "delta", &bold).map_err(xlsx_err)?;
    for (i, row) in summary.iter().enumerate() {
        let r = 3 + i as u32;
        sheet.write(r, 0, row.name.as_str()).map_err(xlsx_err)?;
        sheet.write(r, 1, row.latest).map_err(xlsx_err)?;
        if let Some(delta) = row.delta {
            sheet.write(r, 2, delta).map_err(xlsx_err)?;
        }
    }
    let notes_row = 4 + summary.len() as u32;
    sheet.write_with_format(notes_row, 0, "要因（メモ）", &bold).map_err(xlsx_err)?;
    sheet.write_with_format(notes_row + 2, 0, "生成日時", &bold).map_err(xlsx_err)?;
    sheet
        .write(notes_row + 2, 1, Local::now().format("%Y-%m-%d %H:%M").to_string())
        .map_err(xlsx_err)?;

    // --- Data
    let sheet = workbook
        .add_worksheet()
        .set_name("Data")
        .map_err(xlsx_err)?;
    sheet.write_with_format(0, 0, "month", &bold).map_err(xlsx_err)?;
    for (col, column) in master.columns().iter().enumerate() {
        sheet
            .write_with_format(0, 1 + col as u16, column.name.as_str(), &bold)
            .map_err(xlsx_err)?;
    }
    for (row, month) in master.months().iter().enumerate() {
        let r = 1 + row as u32;
        sheet
            .write(r, 0, month.format("%Y-%m").to_string())
            .map_err(xlsx_err)?;
        for (col, column) in master.columns().iter().enumerate() {
            if let Some(value) = column.values[row] {
                sheet.write(r, 1 + col as u16, value).map_err(xlsx_err)?;
            }
        }
    }

    // --- Charts
    let sheet = workbook
        .add_worksheet()
        .set_name("Charts")
        .map_err(xlsx_err)?;
    let mut anchor_row = 0;
    for (name, image_path) in charts {
        sheet
            .write_with_format(anchor_row, 0, name.as_str(), &bold)
            .map_err(xlsx_err)?;
        let image = Image::new(image_path).map_err(xlsx_err)?;
        sheet
            .insert_image(anchor_row + 1, 0, &image)
            .map_err(xlsx_err)?;
        anchor_row += CHART_ROW_STRIDE;
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}

fn xlsx_err(e: XlsxError) -> DashError {
    DashError::Export(format!("workbook: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeSeries;
    use crate::report::chart::render_series_png;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn empty_master_is_an_export_error() {
        let path = std::env::temp_dir().join("costdash_test_empty.xlsx");
        let err = write_workbook(&path, &MasterTable::default(), &[]).unwrap_err();
        assert!(matches!(err, DashError::Export(_)));
    }

    #[test]
    fn writes_summary_data_and_charts() {
        let copper = TimeSeries::from_observations(vec![
            (d(2024, 1), 1400.0),
            (d(2024, 2), 1445.2),
        ]);
        let master = MasterTable::from_series(&[("copper_jpy_kg", &copper)]);

        let chart_path = std::env::temp_dir().join("costdash_test_wb_chart.png");
        render_series_png(&chart_path, &copper).unwrap();

        let path = std::env::temp_dir().join("costdash_test_report.xlsx");
        write_workbook(
            &path,
            &master,
            &[("copper_jpy_kg".to_string(), chart_path.clone())],
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container.
        assert!(bytes.starts_with(&[b'P', b'K']));

        std::fs::remove_file(&path).ok();
        std::fs::remove_file(&chart_path).ok();
    }
}
