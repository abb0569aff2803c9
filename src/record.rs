/// Transaction record and weekday domain.
///
/// A `TransactionRecord` is one row of the retail dataset: a calendar date,
/// its weekday and season, the day's sales measures, the active promotion
/// and per-category unit counts.
///
/// # Examples
///
/// ```
/// use storelens::Weekday;
///
/// let day = Weekday::from_str("Wednesday").unwrap();
/// assert_eq!(day.label(), "Wednesday");
/// assert!(Weekday::Monday < Weekday::Sunday);
/// ```
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five product-category unit columns of the dataset.
pub const CATEGORY_COLUMNS: [&str; 5] = [
    "units_carnes",
    "units_verduras",
    "units_frutas",
    "units_lacteos",
    "units_bebidas",
];

/// Prefix stripped from category column names to get display names.
pub const CATEGORY_PREFIX: &str = "units_";

/// Day of the week in canonical Monday-to-Sunday order.
///
/// The derived `Ord` follows declaration order, so sorting weekday-keyed
/// output by key yields the weekly order, never the lexicographic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven weekdays in canonical order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Parse a weekday from its English name (case-insensitive).
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Ok(Weekday::Monday),
            "tuesday" => Ok(Weekday::Tuesday),
            "wednesday" => Ok(Weekday::Wednesday),
            "thursday" => Ok(Weekday::Thursday),
            "friday" => Ok(Weekday::Friday),
            "saturday" => Ok(Weekday::Saturday),
            "sunday" => Ok(Weekday::Sunday),
            _ => Err(format!("Unknown weekday: '{}'", s)),
        }
    }

    /// The full English name, as it appears in the dataset.
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Map a chrono weekday onto the dataset's weekday domain.
    ///
    /// Used as a fallback when the source file has no `day_of_week` column.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the loaded dataset.
///
/// Numeric measures that failed to parse are carried as NaN and skipped by
/// the aggregation primitives, so a bad cell never poisons a whole group.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub day_of_week: Weekday,
    pub season: String,
    /// `"YYYY-MM"` bucket derived from `date` at load; used for filtering only.
    pub month: String,
    pub total_sales: f64,
    pub customer_traffic: f64,
    pub conversion_rate: f64,
    pub promo_type: String,
    /// Per-category unit counts, keyed by source column name.
    pub units: HashMap<String, f64>,
}

impl TransactionRecord {
    /// Unit count for a category column, NaN when the column was absent.
    pub fn units_for(&self, column: &str) -> f64 {
        self.units.get(column).copied().unwrap_or(f64::NAN)
    }
}

/// The `"YYYY-MM"` month-bucket string used as a filter key.
pub fn month_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
