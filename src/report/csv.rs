//! Flat CSV artifact of selected master-table columns.
//!
//! Written UTF-8 with a byte-order marker so spreadsheet applications pick
//! the encoding up correctly, one row per month, month formatted `YYYY-MM`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::MasterTable;
use crate::error::DashError;

/// Write `columns` of the master table as CSV. Months where every selected
/// column is null are omitted.
pub fn write_master_csv(
    path: &Path,
    master: &MasterTable,
    columns: &[&str],
) -> Result<(), DashError> {
    let selected: Vec<_> = columns
        .iter()
        .filter_map(|name| master.columns().iter().find(|c| c.name == *name))
        .collect();
    if selected.is_empty() {
        return Err(DashError::Export(format!(
            "none of the requested CSV columns exist: {}",
            columns.join(", ")
        )));
    }

    let mut file = File::create(path).map_err(|e| {
        DashError::Export(format!("failed to create CSV '{}': {e}", path.display()))
    })?;
    file.write_all("\u{feff}".as_bytes())
        .map_err(|e| DashError::Export(format!("failed to write CSV BOM: {e}")))?;

    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec!["month".to_string()];
    header.extend(selected.iter().map(|c| c.name.clone()));
    writer
        .write_record(&header)
        .map_err(|e| DashError::Export(format!("failed to write CSV header: {e}")))?;

    for (row, month) in master.months().iter().enumerate() {
        if selected.iter().all(|c| c.values[row].is_none()) {
            continue;
        }
        let mut record = vec![month.format("%Y-%m").to_string()];
        for column in &selected {
            record.push(match column.values[row] {
                Some(v) => v.to_string(),
                None => String::new(),
            });
        }
        writer
            .write_record(&record)
            .map_err(|e| DashError::Export(format!("failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| DashError::Export(format!("failed to flush CSV: {e}")))?;
    Ok(())
}
