// Import module - snapshot spreadsheet exports and validation

pub mod csv_import;
pub mod validation;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

pub use validation::{validate_rows, validate_snapshots, ValidationIssue, ValidationResult};

/// Import snapshots from a spreadsheet export and validate them.
///
/// Only CSV (and tab/semicolon separated text) is supported; export other
/// spreadsheet formats to CSV first.
pub fn import_file<P: AsRef<Path>>(file_path: P) -> Result<ValidationResult> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension"))?
        .to_lowercase();

    info!("Importing snapshot file: {:?} (type: {})", path, extension);

    match extension.as_str() {
        "csv" | "tsv" | "txt" => {
            let rows = csv_import::parse_snapshot_csv(path)?;
            Ok(validate_rows(rows.iter().map(|r| (r.line, &r.snapshot))))
        }
        _ => Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .csv, .tsv, .txt",
            extension
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_issue_rows_are_file_lines() {
        let file = write_export(
            "date,total_assets,net_flow,note\n\
             2024-01-01,1000,,\"opening\nbalance\"\n\
             \n\
             2024-02-01,oops,,\n\
             2024-03-01,1200,lots,\n",
        );
        let result = import_file(file.path()).unwrap();

        assert_eq!(result.snapshots.len(), 3);
        let rows: Vec<(usize, &str)> = result
            .issues
            .iter()
            .map(|i| (i.row, i.field.as_str()))
            .collect();
        assert_eq!(rows, vec![(5, "total_assets"), (6, "net_flow")]);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = import_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }
}
