//! Download stage
//!
//! Fetches the raw SMS spam dataset from an ordered list of named source
//! strategies. Each strategy is tried in sequence; intermediate failures are
//! logged and the last one is surfaced if every source fails.
use crate::errors::DriftError;
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// One candidate dataset source.
pub struct SourceStrategy {
    /// Short name used in logs and error messages.
    pub name: &'static str,
    /// Location of a delimited `text`/`label` dump of the corpus.
    pub url: &'static str,
    /// Field delimiter of the dump.
    pub delimiter: u8,
}

/// Candidate sources, tried in order.
pub const SOURCE_STRATEGIES: &[SourceStrategy] = &[
    SourceStrategy {
        name: "github-justmarkham",
        url: "https://raw.githubusercontent.com/justmarkham/pycon-2016-tutorial/master/data/sms.tsv",
        delimiter: b'\t',
    },
    SourceStrategy {
        name: "github-mohitgupta-omg",
        url: "https://raw.githubusercontent.com/mohitgupta-omg/Kaggle-SMS-Spam-Collection-Dataset-/master/spam.csv",
        delimiter: b',',
    },
];

/// A raw labeled message.
#[derive(Debug, PartialEq)]
pub struct RawRow {
    pub text: String,
    pub label: String,
}

/// Normalize a header name the way the corpus dumps vary: `v1`/`category`/
/// `class` are labels, `v2`/`message`/`sms` are texts.
fn canonical_header(header: &str) -> &str {
    match header.trim().to_lowercase().as_str() {
        "v1" | "category" | "class" | "label" => "label",
        "v2" | "message" | "sms" | "text" => "text",
        _ => "",
    }
}

/// Parse a delimited dump into labeled rows, keeping only `ham`/`spam`.
///
/// Some dumps are headerless `label<delim>text` pairs; those are detected by
/// the first record starting with a label value.
pub fn parse_rows(body: &str, delimiter: u8) -> Result<Vec<RawRow>, DriftError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = reader.records();
    let first = match records.next() {
        Some(record) => record.map_err(|e| DriftError::UnableToRead(e.to_string()))?,
        None => return Ok(Vec::new()),
    };

    let first_cell = first.get(0).unwrap_or("").trim().to_lowercase();
    let headerless = first_cell == "ham" || first_cell == "spam";

    let (label_idx, text_idx) = if headerless {
        (0, 1)
    } else {
        let label = first
            .iter()
            .position(|h| canonical_header(h) == "label")
            .ok_or_else(|| DriftError::UnableToRead("no label column".to_string()))?;
        let text = first
            .iter()
            .position(|h| canonical_header(h) == "text")
            .ok_or_else(|| DriftError::UnableToRead("no text column".to_string()))?;
        (label, text)
    };

    let mut rows = Vec::new();
    let mut push_row = |record: &csv::StringRecord| {
        let label = record.get(label_idx).unwrap_or("").trim().to_lowercase();
        let text = record.get(text_idx).unwrap_or("").trim().to_string();
        if (label == "ham" || label == "spam") && !text.is_empty() {
            rows.push(RawRow { text, label });
        }
    };

    if headerless {
        push_row(&first);
    }
    for record in records {
        let record = record.map_err(|e| DriftError::UnableToRead(e.to_string()))?;
        push_row(&record);
    }
    Ok(rows)
}

fn fetch(client: &reqwest::blocking::Client, strategy: &SourceStrategy) -> Result<Vec<RawRow>, DriftError> {
    let response = client
        .get(strategy.url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|e| DriftError::UnableToRead(e.to_string()))?;
    let body = response
        .text()
        .map_err(|e| DriftError::UnableToRead(e.to_string()))?;
    parse_rows(&body, strategy.delimiter)
}

/// Run the download stage: try every source strategy in order and write the
/// raw `text,label` dataset. Returns the number of rows written.
pub fn download_raw_dataset(out_path: &Path) -> Result<usize, DriftError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| DriftError::DownloadFailed(e.to_string()))?;

    let mut last_failure = None;
    for strategy in SOURCE_STRATEGIES {
        match fetch(&client, strategy) {
            Ok(rows) if !rows.is_empty() => {
                write_raw(out_path, &rows)?;
                info!(
                    "saved {} rows to {} (source: {})",
                    rows.len(),
                    out_path.display(),
                    strategy.name
                );
                return Ok(rows.len());
            }
            Ok(_) => {
                warn!("source {} returned no usable rows", strategy.name);
                last_failure = Some(format!("{}: empty corpus", strategy.name));
            }
            Err(e) => {
                warn!("source {} failed: {}", strategy.name, e);
                last_failure = Some(format!("{}: {}", strategy.name, e));
            }
        }
    }
    Err(DriftError::DownloadFailed(
        last_failure.unwrap_or_else(|| "no sources configured".to_string()),
    ))
}

fn write_raw(out_path: &Path, rows: &[RawRow]) -> Result<(), DriftError> {
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    let mut writer =
        csv::Writer::from_path(out_path).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    writer
        .write_record(["text", "label"])
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    for row in rows {
        writer
            .write_record([row.text.as_str(), row.label.as_str()])
            .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))
}
