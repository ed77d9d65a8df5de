//! Feature engineering
//!
//! Turns raw SMS text into the numeric feature columns the rest of the
//! pipeline is contracted on. Every stage downstream of preprocessing,
//! including the drift check, consumes exactly these columns.
use crate::data::Dataset;
use crate::errors::DriftError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hashbrown::HashSet;
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::Path;

/// The feature columns shared by every dataset in the pipeline.
pub const FEATURE_COLUMNS: [&str; 6] = [
    "char_len",
    "word_len",
    "num_digits",
    "num_urls",
    "num_domains",
    "upper_ratio",
];

/// Numeric features extracted from a single message.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFeatures {
    pub char_len: usize,
    pub word_len: usize,
    pub num_digits: usize,
    pub num_urls: usize,
    pub num_domains: usize,
    pub upper_ratio: f64,
}

fn url_regex() -> Regex {
    Regex::new(r"(?i)(https?://\S+|www\.\S+)").expect("valid url pattern")
}

fn tag_regex() -> Regex {
    Regex::new(r"<[^>]+>").expect("valid tag pattern")
}

/// Normalize a message: strip markup tags, lowercase, replace URLs with a
/// `<url>` token, collapse whitespace.
pub fn clean_text(text: &str, url_re: &Regex, tag_re: &Regex) -> String {
    let no_tags = tag_re.replace_all(text, " ");
    let lowered = no_tags.to_lowercase();
    let tokenized = url_re.replace_all(&lowered, " <url> ");
    tokenized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Registered domain of a URL, approximated as the last two host labels.
fn registered_domain(url: &str) -> Option<String> {
    let lowered = url.to_lowercase();
    let host = lowered
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = host
        .split(['/', '?', '#', ':'])
        .next()
        .unwrap_or("")
        .trim_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        Some(labels[labels.len() - 2..].join("."))
    } else {
        Some(host.to_string())
    }
}

/// Extract the six numeric features from one raw message.
///
/// Length features come from the cleaned text; digit, URL, domain and
/// uppercase features come from the raw text, before lowercasing destroys
/// them.
pub fn extract_features(text: &str, url_re: &Regex, tag_re: &Regex) -> (String, TextFeatures) {
    let cleaned = clean_text(text, url_re, tag_re);

    let num_digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    let num_urls = url_re.find_iter(text).count();
    let domains: HashSet<String> = url_re
        .find_iter(text)
        .filter_map(|m| registered_domain(m.as_str()))
        .collect();

    let total_chars = text.chars().count();
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    let upper_ratio = upper as f64 / total_chars.max(1) as f64;

    let features = TextFeatures {
        char_len: cleaned.chars().count(),
        word_len: cleaned.split_whitespace().count(),
        num_digits,
        num_urls,
        num_domains: domains.len(),
        upper_ratio,
    };
    (cleaned, features)
}

fn base_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("valid base timestamp")
}

/// Run the preprocessing stage.
///
/// Reads the raw `text,label` dataset, keeps `ham`/`spam` rows, extracts
/// features in parallel and writes the processed dataset consumed by
/// training, evaluation and the drift check. Returns the number of rows
/// written.
///
/// * `raw_path` - Raw dataset written by the download stage.
/// * `out_path` - Destination for the processed CSV.
pub fn preprocess(raw_path: &Path, out_path: &Path) -> Result<usize, DriftError> {
    let dataset = Dataset::read(raw_path)?;
    dataset.require_columns(&["text", "label"])?;

    let texts = dataset.column("text").unwrap_or(&[]);
    let labels = dataset.column("label").unwrap_or(&[]);

    let kept: Vec<(&String, String)> = texts
        .iter()
        .zip(labels)
        .filter_map(|(text, label)| {
            let label = label.trim().to_lowercase();
            (label == "ham" || label == "spam").then_some((text, label))
        })
        .collect();

    let url_re = url_regex();
    let tag_re = tag_regex();
    let extracted: Vec<(String, TextFeatures)> = kept
        .par_iter()
        .map(|(text, _)| extract_features(text, &url_re, &tag_re))
        .collect();

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    let mut writer =
        csv::Writer::from_path(out_path).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    writer
        .write_record([
            "sms_id",
            "event_timestamp",
            "text",
            "text_clean",
            "label",
            "target",
            "char_len",
            "word_len",
            "num_digits",
            "num_urls",
            "num_domains",
            "upper_ratio",
        ])
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;

    let base = base_timestamp();
    for (sms_id, ((text, label), (cleaned, features))) in kept.iter().zip(&extracted).enumerate() {
        let event_timestamp = base + Duration::days((sms_id % 365) as i64);
        let target = u8::from(label.as_str() == "spam");
        writer
            .write_record([
                sms_id.to_string(),
                event_timestamp.to_rfc3339(),
                (*text).clone(),
                cleaned.clone(),
                label.clone(),
                target.to_string(),
                features.char_len.to_string(),
                features.word_len.to_string(),
                features.num_digits.to_string(),
                features.num_urls.to_string(),
                features.num_domains.to_string(),
                features.upper_ratio.to_string(),
            ])
            .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;

    log::info!(
        "preprocessed {} rows from {} into {}",
        kept.len(),
        raw_path.display(),
        out_path.display()
    );
    Ok(kept.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn regexes() -> (Regex, Regex) {
        (url_regex(), tag_regex())
    }

    #[test]
    fn test_clean_text_strips_tags_and_tokenizes_urls() {
        let (url_re, tag_re) = regexes();
        let cleaned = clean_text(
            "<b>WIN</b> now at HTTPS://spam.example.com/claim  !",
            &url_re,
            &tag_re,
        );
        assert_eq!(cleaned, "win now at <url> !");
    }

    #[test]
    fn test_extract_counts_urls_and_digits() {
        let (url_re, tag_re) = regexes();
        let (_, features) = extract_features(
            "Call 0800123456 or visit http://a.example.com and www.b.example.org",
            &url_re,
            &tag_re,
        );
        assert_eq!(features.num_digits, 10);
        assert_eq!(features.num_urls, 2);
        assert_eq!(features.num_domains, 2);
    }

    #[test]
    fn test_extract_domains_deduplicated() {
        let (url_re, tag_re) = regexes();
        let (_, features) = extract_features(
            "http://example.com/a http://www.example.com/b https://example.com",
            &url_re,
            &tag_re,
        );
        assert_eq!(features.num_urls, 3);
        assert_eq!(features.num_domains, 1);
    }

    #[test]
    fn test_upper_ratio() {
        let (url_re, tag_re) = regexes();
        let (_, features) = extract_features("ABcd", &url_re, &tag_re);
        assert_eq!(features.upper_ratio, 0.5);

        let (_, features) = extract_features("", &url_re, &tag_re);
        assert_eq!(features.upper_ratio, 0.0);
    }

    #[test]
    fn test_word_and_char_len_use_cleaned_text() {
        let (url_re, tag_re) = regexes();
        let (cleaned, features) = extract_features("Hello   world", &url_re, &tag_re);
        assert_eq!(cleaned, "hello world");
        assert_eq!(features.char_len, 11);
        assert_eq!(features.word_len, 2);
    }

    #[test]
    fn test_preprocess_filters_and_writes_schema() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.csv");
        fs::write(
            &raw,
            "text,label\nhello there,ham\nWIN CASH 999 NOW,spam\nsomething odd,unknown\n",
        )
        .unwrap();
        let out = dir.path().join("processed/processed.csv");

        let rows = preprocess(&raw, &out).unwrap();
        assert_eq!(rows, 2);

        let processed = Dataset::read(&out).unwrap();
        processed.require_columns(&FEATURE_COLUMNS).unwrap();
        processed.require_columns(&["sms_id", "target", "text_clean"]).unwrap();
        assert_eq!(processed.numeric_column("target").unwrap(), vec![0.0, 1.0]);
    }
}
