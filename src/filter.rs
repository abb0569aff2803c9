/// Filter Engine: restricts the record set by facets and date range.
///
/// A `FilterSpec` carries five optional predicates - weekday membership,
/// season membership, month-bucket membership and inclusive date bounds.
/// An unset predicate means "keep everything observed", so the default spec
/// is the identity filter. A record survives only when ALL predicates hold.
///
/// Applying a spec never mutates anything: it produces a fresh, immutable
/// record set preserving the original relative order, which the view
/// builder consumes for one recompute cycle.
///
/// # Examples
///
/// ```
/// use storelens::{FilterSpec, RecordStore, Weekday};
///
/// let csv = "date,day_of_week,season,total_sales\n\
///            2024-01-01,Monday,Winter,100.0\n\
///            2024-01-06,Saturday,Winter,250.0\n";
/// let store = RecordStore::from_csv(csv).unwrap();
///
/// let spec = FilterSpec::default().with_days([Weekday::Saturday]);
/// let filtered = spec.apply(store.records());
/// assert_eq!(filtered.len(), 1);
/// assert_eq!(filtered[0].total_sales, 250.0);
/// ```
use crate::record::{TransactionRecord, Weekday};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Conjunctive filter over the five recognized dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Weekdays to keep; `None` keeps every weekday present in the data.
    pub days: Option<HashSet<Weekday>>,
    /// Season labels to keep; `None` keeps all.
    pub seasons: Option<HashSet<String>>,
    /// `"YYYY-MM"` month buckets to keep; `None` keeps all.
    pub months: Option<HashSet<String>>,
    /// Inclusive lower date bound; `None` means the full observed range.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound; `None` means the full observed range.
    pub date_to: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn with_days<I: IntoIterator<Item = Weekday>>(mut self, days: I) -> Self {
        self.days = Some(days.into_iter().collect());
        self
    }

    pub fn with_seasons<I, S>(mut self, seasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seasons = Some(seasons.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months = Some(months.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// True when the record satisfies all five predicates.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.days
            .as_ref()
            .map_or(true, |days| days.contains(&record.day_of_week))
            && self
                .seasons
                .as_ref()
                .map_or(true, |seasons| seasons.contains(&record.season))
            && self
                .months
                .as_ref()
                .map_or(true, |months| months.contains(&record.month))
            && self.date_from.map_or(true, |from| record.date >= from)
            && self.date_to.map_or(true, |to| record.date <= to)
    }

    /// Produce a new record set containing the surviving records in their
    /// original relative order.
    pub fn apply(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;

    fn week_of_records() -> Vec<TransactionRecord> {
        // One record per weekday, Mon Jan 1 .. Sun Jan 7 2024, sales 100 each.
        let csv = "date,day_of_week,season,total_sales\n\
                   2024-01-01,Monday,Winter,100\n\
                   2024-01-02,Tuesday,Winter,100\n\
                   2024-01-03,Wednesday,Winter,100\n\
                   2024-01-04,Thursday,Winter,100\n\
                   2024-01-05,Friday,Winter,100\n\
                   2024-01-06,Saturday,Winter,100\n\
                   2024-01-07,Sunday,Winter,100\n";
        RecordStore::from_csv(csv).unwrap().records().to_vec()
    }

    #[test]
    fn test_default_spec_keeps_everything() {
        let records = week_of_records();
        let filtered = FilterSpec::default().apply(&records);
        assert_eq!(filtered.len(), records.len());
    }

    #[test]
    fn test_day_filter() {
        let records = week_of_records();
        let spec = FilterSpec::default().with_days([Weekday::Monday, Weekday::Friday]);
        let filtered = spec.apply(&records);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| spec.matches(r)));
    }

    #[test]
    fn test_season_filter() {
        let records = week_of_records();
        let spec = FilterSpec::default().with_seasons(["Summer"]);
        assert!(spec.apply(&records).is_empty());
    }

    #[test]
    fn test_month_filter() {
        let records = week_of_records();
        let spec = FilterSpec::default().with_months(["2024-01"]);
        assert_eq!(spec.apply(&records).len(), 7);
        let spec = FilterSpec::default().with_months(["2024-02"]);
        assert!(spec.apply(&records).is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let records = week_of_records();
        let spec = FilterSpec::default().with_date_range(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        );
        let filtered = spec.apply(&records);
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0].day_of_week, Weekday::Tuesday);
        assert_eq!(filtered[2].day_of_week, Weekday::Thursday);
    }

    #[test]
    fn test_date_range_excluding_sunday_leaves_six() {
        let records = week_of_records();
        let spec = FilterSpec::default().with_date_range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
        );
        let filtered = spec.apply(&records);
        assert_eq!(filtered.len(), 6);
        assert!(filtered.iter().all(|r| r.day_of_week != Weekday::Sunday));
    }

    #[test]
    fn test_conjunction_of_all_predicates() {
        let records = week_of_records();
        let spec = FilterSpec::default()
            .with_days(Weekday::ALL)
            .with_seasons(["Winter"])
            .with_months(["2024-01"])
            .with_date_range(
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            );
        let filtered = spec.apply(&records);
        assert_eq!(filtered.len(), 3);
        // Every survivor independently satisfies every predicate.
        for record in &filtered {
            assert!(spec.matches(record));
        }
    }

    #[test]
    fn test_filtered_set_is_subset_in_original_order() {
        let records = week_of_records();
        let spec = FilterSpec::default().with_days([
            Weekday::Sunday,
            Weekday::Monday,
            Weekday::Wednesday,
        ]);
        let filtered = spec.apply(&records);
        let days: Vec<Weekday> = filtered.iter().map(|r| r.day_of_week).collect();
        // Original file order, not the order the filter listed days in.
        assert_eq!(days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Sunday]);
    }
}
