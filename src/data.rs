//! Dataset
//!
//! Column-oriented CSV table used by every pipeline stage. Loading is a
//! passthrough validation gate: headers are normalized, required columns are
//! checked, values are not transformed.
use crate::errors::DriftError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// An in-memory tabular dataset read from a CSV file.
///
/// Cells are kept as raw strings; numeric access parses on demand so text
/// columns (`text`, `label`) and numeric feature columns can live side by
/// side, the way the processed dataset stores them.
pub struct Dataset {
    path: String,
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl Dataset {
    /// Read a CSV file into a column-oriented table.
    ///
    /// Headers are trimmed and lowercased, matching what the preprocessing
    /// stage writes.
    ///
    /// * `path` - Path of the CSV file to load.
    pub fn read(path: &Path) -> Result<Self, DriftError> {
        if !path.exists() {
            return Err(DriftError::DatasetNotFound(path.display().to_string()));
        }
        let file = File::open(path).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DriftError::UnableToRead(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(|e| DriftError::UnableToRead(e.to_string()))?;
            for (i, cell) in record.iter().enumerate() {
                columns[i].push(cell.to_string());
            }
        }

        Ok(Dataset {
            path: path.display().to_string(),
            headers,
            columns,
        })
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// Column headers in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Raw cells of a column, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(&self.columns[idx])
    }

    /// Validate that every named column is present.
    ///
    /// Fails with the full list of absent columns, not just the first.
    pub fn require_columns(&self, names: &[&str]) -> Result<(), DriftError> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DriftError::MissingColumns {
                path: self.path.clone(),
                columns: missing.join(", "),
            })
        }
    }

    /// Parse a column to `f64`.
    ///
    /// Blank or unparseable cells become NaN; downstream sorts use
    /// `total_cmp` so they stay well-defined.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, DriftError> {
        let cells = self.column(name).ok_or_else(|| DriftError::MissingColumns {
            path: self.path.clone(),
            columns: name.to_string(),
        })?;
        Ok(cells
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                if cell.is_empty() {
                    f64::NAN
                } else {
                    cell.parse::<f64>().unwrap_or(f64::NAN)
                }
            })
            .collect())
    }
}
