/// Record Store: loads and normalizes the raw dataset.
///
/// The store is built once per session from a CSV source and is immutable
/// afterwards. Rows whose `date` cell cannot be parsed are silently dropped
/// at load time (partial data beats total failure); everything else is
/// normalized into typed `TransactionRecord`s in original file order.
/// Alongside the records the store caches the facet domains (distinct
/// weekdays, seasons and month buckets present, plus the observed date
/// range) used to populate filter option defaults.
///
/// # Examples
///
/// ```
/// use storelens::RecordStore;
///
/// let csv = "date,day_of_week,season,total_sales,customer_traffic,conversion_rate,promo_type,units_carnes,units_verduras,units_frutas,units_lacteos,units_bebidas\n\
///            2024-01-01,Monday,Winter,1200.5,340,0.31,None,12,30,24,18,40\n\
///            not-a-date,Tuesday,Winter,900.0,280,0.28,None,10,25,20,15,35\n";
///
/// let store = RecordStore::from_csv(csv).unwrap();
/// assert_eq!(store.len(), 1); // the unparseable-date row is dropped
/// assert_eq!(store.facets().months, vec!["2024-01".to_string()]);
/// ```
use crate::error::PipelineError;
use crate::record::{month_bucket, TransactionRecord, Weekday, CATEGORY_COLUMNS};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Distinct facet values observed in the loaded data.
///
/// These are the defaults for every filter dimension: weekdays in canonical
/// order, seasons and month buckets sorted, date bounds inclusive.
#[derive(Debug, Clone, Serialize)]
pub struct FacetDomains {
    pub weekdays: Vec<Weekday>,
    pub seasons: Vec<String>,
    pub months: Vec<String>,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
}

/// Immutable, ordered set of transaction records plus cached facet domains.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<TransactionRecord>,
    columns: Vec<String>,
    facets: FacetDomains,
}

impl RecordStore {
    /// Load the dataset from a CSV file.
    ///
    /// Fails with `SourceNotFound` when the file is absent. Individual rows
    /// with unparseable dates are dropped, never surfaced as errors.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)?;
        let store = Self::from_csv(&raw)?;
        log::info!(
            "loaded {} records from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Build a store from CSV text.
    ///
    /// The first row is the header. The `date` column is mandatory (the
    /// whole pipeline keys off it); any other column may be absent, in
    /// which case the views that need it report `SchemaInvalid` later.
    pub fn from_csv(csv: &str) -> Result<Self, PipelineError> {
        let mut rows = parse_csv_rows(csv);
        if rows.is_empty() {
            return Err(PipelineError::MalformedInput("CSV is empty".to_string()));
        }

        let header = rows.remove(0);
        if header.iter().all(|h| h.trim().is_empty()) {
            return Err(PipelineError::MalformedInput("CSV header is empty".to_string()));
        }
        let columns: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let date_idx = *index.get("date").ok_or_else(|| PipelineError::SchemaInvalid {
            columns: vec!["date".to_string()],
        })?;
        let day_idx = index.get("day_of_week").copied();
        let season_idx = index.get("season").copied();
        let promo_idx = index.get("promo_type").copied();
        let sales_idx = index.get("total_sales").copied();
        let traffic_idx = index.get("customer_traffic").copied();
        let conversion_idx = index.get("conversion_rate").copied();
        let category_idx: Vec<(&str, usize)> = CATEGORY_COLUMNS
            .iter()
            .filter_map(|col| index.get(col).map(|&i| (*col, i)))
            .collect();

        let mut records = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;

        for row in &rows {
            // Skip blank lines the parser may have kept.
            if row.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            let date = match field(row, date_idx).and_then(parse_date) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };

            let day_of_week = match day_idx {
                Some(i) => match field(row, i).map(Weekday::from_str) {
                    Some(Ok(day)) => day,
                    // An unreadable weekday label could never survive the
                    // default day filter, so the row is dropped here.
                    Some(Err(_)) | None => {
                        dropped += 1;
                        continue;
                    }
                },
                None => Weekday::from_date(date),
            };

            let units: HashMap<String, f64> = category_idx
                .iter()
                .map(|(col, i)| (col.to_string(), parse_measure(row, Some(*i))))
                .collect();

            records.push(TransactionRecord {
                date,
                day_of_week,
                season: parse_label(row, season_idx),
                month: month_bucket(date),
                total_sales: parse_measure(row, sales_idx),
                customer_traffic: parse_measure(row, traffic_idx),
                conversion_rate: parse_measure(row, conversion_idx),
                promo_type: parse_label(row, promo_idx),
                units,
            });
        }

        if dropped > 0 {
            log::debug!("dropped {} rows with unparseable date or weekday", dropped);
        }

        let facets = compute_facets(&records);

        Ok(RecordStore {
            records,
            columns,
            facets,
        })
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Header columns present in the source, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn facets(&self) -> &FacetDomains {
        &self.facets
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn field<'a>(row: &'a [String], idx: usize) -> Option<&'a str> {
    row.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// A categorical cell; absent cells become the empty label.
fn parse_label(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| field(row, i))
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// A numeric cell; absent or unparseable cells become NaN, which the
/// aggregation primitives skip.
fn parse_measure(row: &[String], idx: Option<usize>) -> f64 {
    idx.and_then(|i| field(row, i))
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn compute_facets(records: &[TransactionRecord]) -> FacetDomains {
    let weekdays: Vec<Weekday> = Weekday::ALL
        .into_iter()
        .filter(|day| records.iter().any(|r| r.day_of_week == *day))
        .collect();

    let mut seasons: Vec<String> = records
        .iter()
        .map(|r| r.season.clone())
        .filter(|s| !s.is_empty())
        .collect();
    seasons.sort();
    seasons.dedup();

    let mut months: Vec<String> = records.iter().map(|r| r.month.clone()).collect();
    months.sort();
    months.dedup();

    FacetDomains {
        weekdays,
        seasons,
        months,
        date_min: records.iter().map(|r| r.date).min(),
        date_max: records.iter().map(|r| r.date).max(),
    }
}

/// Split CSV text into rows of fields, honoring quoted fields that may
/// contain commas, escaped quotes ("") and embedded newlines. Handles CRLF.
fn parse_csv_rows(csv: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut buf = String::new();
    let mut quoted = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if quoted && chars.peek() == Some(&'"') {
                    chars.next();
                    buf.push('"');
                } else {
                    quoted = !quoted;
                }
            }
            ',' if !quoted => {
                row.push(std::mem::take(&mut buf));
            }
            '\r' if !quoted => {}
            '\n' if !quoted => {
                row.push(std::mem::take(&mut buf));
                rows.push(std::mem::take(&mut row));
            }
            _ => buf.push(c),
        }
    }

    if !buf.is_empty() || !row.is_empty() {
        row.push(buf);
        rows.push(row);
    }

    rows
}
