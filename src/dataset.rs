use std::fs::File;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Error;
use crate::weather::{field, DaySet};

/// `{dir}/{country}_{city}_weather_dataset.csv`
pub fn default_path(dir: &Path, country: &str, city: &str) -> PathBuf {
    dir.join(format!("{country}_{city}_weather_dataset.csv"))
}

/// Writes every record as one CSV row, with the first record's keys as the
/// header. `include_day` prepends a `Day` column holding the day key.
///
/// Returns the number of rows written, or `None` if there was nothing to
/// write; no file is created in that case.
pub fn write_csv(days: &DaySet, path: &Path, include_day: bool) -> Result<Option<usize>, Error> {
    if days.is_empty() {
        warn!("no records to write, skipping {}", path.display());
        return Ok(None);
    }
    let keys: Vec<&str> = days
        .first_record()
        .map(|r| r.keys().collect())
        .unwrap_or_default();

    let mut writer = csv::Writer::from_writer(File::create(path)?);

    let mut header = Vec::with_capacity(keys.len() + 1);
    if include_day {
        header.push(field::DAY);
    }
    header.extend(&keys);
    writer.write_record(&header)?;

    let mut rows = 0;
    for day in days.iter() {
        for record in &day.records {
            let mut row = Vec::with_capacity(header.len());
            if include_day {
                row.push(day.key.as_str());
            }
            row.extend(keys.iter().map(|k| record.get(k).unwrap_or_default()));
            writer.write_record(&row)?;
            rows += 1;
        }
    }
    writer.flush()?;

    info!("wrote {rows} rows to {}", path.display());
    Ok(Some(rows))
}
