/// Aggregation Library: reusable grouping and summary primitives.
///
/// Every function here is pure - a total function of its input record set
/// with no side effects. Grouping never emits empty groups: a key is only
/// emitted once at least one finite measure has contributed to it, and NaN
/// measures (unparseable cells) are skipped the same way the store's
/// missing values are. Percentages are uniformly fraction x 100; no
/// rounding happens in this layer.
///
/// # Examples
///
/// ```
/// use storelens::aggregate::period_over_period_growth;
///
/// let growth = period_over_period_growth(&[100.0, 150.0, 120.0]);
/// assert_eq!(growth, vec![50.0, -20.0]); // first period has no growth
/// ```
use crate::record::{TransactionRecord, Weekday, CATEGORY_PREFIX};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Group records by a key and average a measure per group.
///
/// Keys are emitted in order of first occurrence. Records whose measure is
/// non-finite do not contribute; a group with no finite contributions is
/// never emitted.
pub fn group_mean<K, KF, MF>(
    records: &[TransactionRecord],
    key_fn: KF,
    measure_fn: MF,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    KF: Fn(&TransactionRecord) -> K,
    MF: Fn(&TransactionRecord) -> f64,
{
    let mut order: Vec<K> = Vec::new();
    let mut acc: HashMap<K, (f64, usize)> = HashMap::new();

    for record in records {
        let measure = measure_fn(record);
        if !measure.is_finite() {
            continue;
        }
        let key = key_fn(record);
        let entry = acc.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (0.0, 0)
        });
        entry.0 += measure;
        entry.1 += 1;
    }

    order
        .into_iter()
        .map(|key| {
            let (sum, count) = acc[&key];
            (key, sum / count as f64)
        })
        .collect()
}

/// Group records by a key and sum a measure per group.
///
/// Same ordering and skip-missing rules as [`group_mean`].
pub fn group_sum<K, KF, MF>(
    records: &[TransactionRecord],
    key_fn: KF,
    measure_fn: MF,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    KF: Fn(&TransactionRecord) -> K,
    MF: Fn(&TransactionRecord) -> f64,
{
    let mut order: Vec<K> = Vec::new();
    let mut acc: HashMap<K, f64> = HashMap::new();

    for record in records {
        let measure = measure_fn(record);
        if !measure.is_finite() {
            continue;
        }
        let key = key_fn(record);
        *acc.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            0.0
        }) += measure;
    }

    order
        .into_iter()
        .map(|key| {
            let total = acc[&key];
            (key, total)
        })
        .collect()
}

/// Mean of a measure per weekday, emitted in canonical Monday-to-Sunday
/// order regardless of input record order. Absent weekdays do not appear.
pub fn mean_by_weekday<MF>(records: &[TransactionRecord], measure_fn: MF) -> Vec<(Weekday, f64)>
where
    MF: Fn(&TransactionRecord) -> f64,
{
    let mut pairs = group_mean(records, |r| r.day_of_week, measure_fn);
    pairs.sort_by_key(|(day, _)| *day);
    pairs
}

/// Sum of a measure per weekday, in the same canonical order as
/// [`mean_by_weekday`]. Absent weekdays do not appear.
pub fn sum_by_weekday<MF>(records: &[TransactionRecord], measure_fn: MF) -> Vec<(Weekday, f64)>
where
    MF: Fn(&TransactionRecord) -> f64,
{
    let mut pairs = group_sum(records, |r| r.day_of_week, measure_fn);
    pairs.sort_by_key(|(day, _)| *day);
    pairs
}

/// Sort grouped pairs by value, descending (promo/traffic ranking).
pub fn sort_desc_by_value<K>(mut pairs: Vec<(K, f64)>) -> Vec<(K, f64)> {
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    pairs
}

/// Calendar-month truncation of a date: the first day of its month.
///
/// This is deliberately independent of the store's `"YYYY-MM"` string
/// bucket: filtering needs a string equality key, growth and combo views
/// need a sortable, continuous time axis.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("the first of an observed month is a valid date")
}

/// Growth percentage from one period to the next.
///
/// Returns `None` when either value is non-finite or the previous value is
/// zero: growth over a zero base is undefined and is dropped, exactly like
/// the first period's missing history, rather than reported as infinity.
pub fn growth_pct(prev: f64, cur: f64) -> Option<f64> {
    if !prev.is_finite() || !cur.is_finite() || prev == 0.0 {
        return None;
    }
    Some((cur - prev) / prev * 100.0)
}

/// Period-over-period growth percentages for an ordered value sequence.
///
/// The first period has no defined growth and is absent from the output -
/// never emitted as zero or null. Undefined steps (zero base) are dropped
/// under the same policy; see [`growth_pct`].
pub fn period_over_period_growth(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|pair| growth_pct(pair[0], pair[1]))
        .collect()
}

/// One of N equal-width bins spanning the observed value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
}

impl Bin {
    /// Human-readable range label for axis ticks.
    pub fn label(&self) -> String {
        format!("[{:.1}, {:.1}]", self.lower, self.upper)
    }
}

/// Quantize values into `bin_count` equal-width bins over `[min, max]`.
///
/// The output is aligned 1:1 with the input. Both ends are inclusive: the
/// minimum falls inside the first bin and the maximum inside the last (it
/// is clamped there, not excluded as a boundary case). When all values are
/// equal every value lands in bin 0. Without at least one finite value
/// there is no observable range, and the output is empty.
pub fn quantized_bins(values: &[f64], bin_count: usize) -> Vec<Bin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let width = (max - min) / bin_count as f64;

    values
        .iter()
        .map(|&v| {
            let index = if width > 0.0 && v.is_finite() {
                (((v - min) / width) as usize).min(bin_count - 1)
            } else {
                0
            };
            Bin {
                index,
                lower: min + index as f64 * width,
                upper: min + (index + 1) as f64 * width,
            }
        })
        .collect()
}

/// Total units per category column across all records.
///
/// Category names are the column identifiers with the `units_` prefix
/// stripped. Every requested column yields a pair, in the order given.
pub fn category_share(records: &[TransactionRecord], columns: &[&str]) -> Vec<(String, f64)> {
    columns
        .iter()
        .map(|col| {
            let total: f64 = records
                .iter()
                .map(|r| r.units_for(col))
                .filter(|v| v.is_finite())
                .sum();
            let name = col.strip_prefix(CATEGORY_PREFIX).unwrap_or(col).to_string();
            (name, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CATEGORY_COLUMNS;
    use crate::store::RecordStore;

    const HEADER: &str = "date,day_of_week,season,total_sales,customer_traffic,conversion_rate,promo_type,units_carnes,units_verduras,units_frutas,units_lacteos,units_bebidas";

    fn records_from(rows: &str) -> Vec<TransactionRecord> {
        let csv = format!("{HEADER}\n{rows}");
        RecordStore::from_csv(&csv).unwrap().records().to_vec()
    }

    #[test]
    fn test_group_mean_insertion_order() {
        let records = records_from(
            "2024-01-01,Monday,Winter,100,10,0.2,B,1,1,1,1,1\n\
             2024-01-02,Tuesday,Winter,200,20,0.4,A,1,1,1,1,1\n\
             2024-01-03,Wednesday,Winter,300,30,0.6,B,1,1,1,1,1\n",
        );
        let means = group_mean(&records, |r| r.promo_type.clone(), |r| r.total_sales);
        // First occurrence order: B before A, never alphabetical.
        assert_eq!(means, vec![("B".to_string(), 200.0), ("A".to_string(), 200.0)]);
    }

    #[test]
    fn test_group_mean_skips_nan_and_drops_empty_groups() {
        let records = records_from(
            "2024-01-01,Monday,Winter,100,10,0.2,A,1,1,1,1,1\n\
             2024-01-02,Tuesday,Winter,,20,0.4,B,1,1,1,1,1\n\
             2024-01-03,Wednesday,Winter,300,30,0.6,A,1,1,1,1,1\n",
        );
        let means = group_mean(&records, |r| r.promo_type.clone(), |r| r.total_sales);
        // B's only measure was missing, so B is absent rather than NaN.
        assert_eq!(means, vec![("A".to_string(), 200.0)]);
    }

    #[test]
    fn test_group_sum() {
        let records = records_from(
            "2024-01-01,Monday,Winter,100,10,0.2,A,1,1,1,1,1\n\
             2024-01-08,Monday,Winter,50,10,0.2,A,1,1,1,1,1\n",
        );
        let sums = group_sum(&records, |r| r.day_of_week, |r| r.total_sales);
        assert_eq!(sums, vec![(Weekday::Monday, 150.0)]);
    }

    #[test]
    fn test_mean_by_weekday_canonical_order() {
        // Deliberately shuffled input order: Friday, Monday, Wednesday.
        let records = records_from(
            "2024-01-05,Friday,Winter,500,10,0.2,A,1,1,1,1,1\n\
             2024-01-01,Monday,Winter,100,10,0.2,A,1,1,1,1,1\n\
             2024-01-03,Wednesday,Winter,300,10,0.2,A,1,1,1,1,1\n",
        );
        let means = mean_by_weekday(&records, |r| r.total_sales);
        let days: Vec<Weekday> = means.iter().map(|(d, _)| *d).collect();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
        // Absent weekdays are never emitted.
        assert_eq!(means.len(), 3);
    }

    #[test]
    fn test_sum_by_weekday_canonical_order() {
        // Friday comes first in the file; the sums must not.
        let records = records_from(
            "2024-01-05,Friday,Winter,500,10,0.2,A,1,1,1,1,1\n\
             2024-01-01,Monday,Winter,100,10,0.2,A,1,1,1,1,1\n\
             2024-01-08,Monday,Winter,50,10,0.2,A,1,1,1,1,1\n",
        );
        let sums = sum_by_weekday(&records, |r| r.total_sales);
        assert_eq!(sums, vec![(Weekday::Monday, 150.0), (Weekday::Friday, 500.0)]);
    }

    #[test]
    fn test_sort_desc_by_value() {
        let sorted = sort_desc_by_value(vec![("a", 1.0), ("b", 3.0), ("c", 2.0)]);
        assert_eq!(sorted, vec![("b", 3.0), ("c", 2.0), ("a", 1.0)]);
    }

    #[test]
    fn test_month_start() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        assert_eq!(month_start(date), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_growth_first_period_dropped() {
        assert_eq!(period_over_period_growth(&[100.0, 150.0, 120.0]), vec![50.0, -20.0]);
    }

    #[test]
    fn test_growth_zero_base_is_dropped() {
        assert_eq!(growth_pct(0.0, 50.0), None);
        assert_eq!(period_over_period_growth(&[0.0, 50.0, 100.0]), vec![100.0]);
    }

    #[test]
    fn test_growth_of_single_period_is_empty() {
        assert!(period_over_period_growth(&[42.0]).is_empty());
        assert!(period_over_period_growth(&[]).is_empty());
    }

    #[test]
    fn test_quantized_bins_eight_bins_over_zero_to_ten() {
        let bins = quantized_bins(&[0.0, 10.0], 8);
        assert_eq!(bins.len(), 2);
        // Equal widths of 1.25 each.
        assert!((bins[0].upper - bins[0].lower - 1.25).abs() < 1e-9);
        // The minimum falls inside the first bin, the maximum in the last.
        assert_eq!(bins[0].index, 0);
        assert_eq!(bins[1].index, 7);
    }

    #[test]
    fn test_quantized_bins_all_equal_values() {
        let bins = quantized_bins(&[5.0, 5.0, 5.0], 4);
        assert!(bins.iter().all(|b| b.index == 0));
    }

    #[test]
    fn test_quantized_bins_without_finite_values_is_empty() {
        assert!(quantized_bins(&[f64::NAN, f64::INFINITY], 4).is_empty());
        assert!(quantized_bins(&[f64::NAN], 4).is_empty());
    }

    #[test]
    fn test_quantized_bins_alignment() {
        let values = vec![2.0, 9.0, 5.0, 0.0, 10.0];
        let bins = quantized_bins(&values, 5);
        assert_eq!(bins.len(), values.len());
        let indices: Vec<usize> = bins.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![1, 4, 2, 0, 4]);
    }

    #[test]
    fn test_category_share_totals_and_names() {
        let records = records_from(
            "2024-01-01,Monday,Winter,100,10,0.2,A,1,2,3,4,5\n\
             2024-01-02,Tuesday,Winter,100,10,0.2,A,9,18,27,36,45\n",
        );
        let cols: Vec<&str> = CATEGORY_COLUMNS.to_vec();
        let shares = category_share(&records, &cols);

        assert_eq!(shares.len(), 5);
        let names: Vec<&str> = shares.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["carnes", "verduras", "frutas", "lacteos", "bebidas"]);

        let grand: f64 = shares.iter().map(|(_, t)| t).sum();
        assert_eq!(grand, 150.0);
        assert_eq!(shares[0], ("carnes".to_string(), 10.0));
    }
}
