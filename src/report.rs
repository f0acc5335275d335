use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use log::debug;

use crate::datastructures::Result;

/// Appends one row of numeric run statistics to a tab-separated log.
///
/// The header row (field names) is written once, when the file is first
/// created. Columns are taken in the order the caller passes them; the
/// caller is responsible for keeping them stable across calls.
pub fn append_run_stats(path: &Path, fields: &[(&str, f64)]) -> Result<()> {
    let write_header = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    if write_header {
        writeln!(
            file,
            "{}",
            fields.iter().map(|(name, _)| name).join("\t")
        )?;
    }
    writeln!(
        file,
        "{}",
        fields.iter().map(|(_, value)| value.to_string()).join("\t")
    )?;
    debug!("appended {} fields to {}", fields.len(), path.display());
    Ok(())
}
