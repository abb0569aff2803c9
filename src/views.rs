/// Derived View Builder: named summary tables for the Presentation layer.
///
/// Each view is an independent, stateless computation over the currently
/// filtered record set: validate the columns it needs (reporting every
/// missing column at once), run the aggregation primitives, return a plain
/// ordered table of row structs. No chart objects, no styling, no theme -
/// presentation consumes these tables and draws whatever it likes.
///
/// [`recompute`] is the single entry point an external event loop calls on
/// every filter change. It is a pure function: callable repeatedly and
/// independently, producing either a full [`ViewBundle`] or the
/// [`Recompute::Empty`] terminal state when the filter conjunction leaves
/// no records. Which views are requested is a configuration list, not a
/// separate pipeline per dashboard variant.
///
/// # Examples
///
/// ```
/// use storelens::{recompute, FilterSpec, RecordStore, Recompute, ViewKind};
///
/// let csv = "date,day_of_week,season,total_sales,customer_traffic,conversion_rate,promo_type,units_carnes,units_verduras,units_frutas,units_lacteos,units_bebidas\n\
///            2024-01-01,Monday,Winter,1200.5,340,0.31,None,12,30,24,18,40\n";
/// let store = RecordStore::from_csv(csv).unwrap();
///
/// match recompute(&store, &FilterSpec::default(), &ViewKind::ALL) {
///     Recompute::Bundle(bundle) => {
///         assert_eq!(bundle.headline.records, 1);
///         assert_eq!(bundle.views.len(), 8);
///     }
///     Recompute::Empty => unreachable!("one record survives the default filter"),
/// }
/// ```
use crate::aggregate::{
    category_share, group_mean, group_sum, growth_pct, mean_by_weekday, month_start,
    quantized_bins, sort_desc_by_value,
};
use crate::error::PipelineError;
use crate::filter::FilterSpec;
use crate::record::{TransactionRecord, Weekday, CATEGORY_COLUMNS};
use crate::store::RecordStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// The named views a dashboard can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    /// Mean conversion rate per weekday, as a percentage.
    ConversionByDay,
    /// Total sales per calendar day.
    DailySalesTotal,
    /// Total units per product category.
    CategoryShare,
    /// Mean customer traffic per promotion type, best first.
    PromoTrafficRanking,
    /// Mean meat units per weekday.
    MeatByDay,
    /// Month-over-month sales growth percentage.
    MonthlyGrowth,
    /// Mean traffic and mean conversion per month, side by side.
    MonthlyCombo,
    /// Record density per (promotion, traffic bin) cell.
    PromoTrafficDensity,
}

impl ViewKind {
    /// Every view, in presentation order.
    pub const ALL: [ViewKind; 8] = [
        ViewKind::ConversionByDay,
        ViewKind::DailySalesTotal,
        ViewKind::CategoryShare,
        ViewKind::PromoTrafficRanking,
        ViewKind::MeatByDay,
        ViewKind::MonthlyGrowth,
        ViewKind::MonthlyCombo,
        ViewKind::PromoTrafficDensity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::ConversionByDay => "conversion_by_day",
            ViewKind::DailySalesTotal => "daily_sales_total",
            ViewKind::CategoryShare => "category_share",
            ViewKind::PromoTrafficRanking => "promo_traffic_ranking",
            ViewKind::MeatByDay => "meat_by_day",
            ViewKind::MonthlyGrowth => "monthly_growth",
            ViewKind::MonthlyCombo => "monthly_combo",
            ViewKind::PromoTrafficDensity => "promo_traffic_density",
        }
    }

    /// Source columns this view cannot compute without.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            ViewKind::ConversionByDay => &["day_of_week", "conversion_rate"],
            ViewKind::DailySalesTotal => &["date", "total_sales"],
            ViewKind::CategoryShare => &CATEGORY_COLUMNS,
            ViewKind::PromoTrafficRanking => &["promo_type", "customer_traffic"],
            ViewKind::MeatByDay => &["day_of_week", "units_carnes"],
            ViewKind::MonthlyGrowth => &["date", "total_sales"],
            ViewKind::MonthlyCombo => &["date", "customer_traffic", "conversion_rate"],
            ViewKind::PromoTrafficDensity => &["promo_type", "customer_traffic"],
        }
    }
}

/// Traffic bin count for the density view.
const DENSITY_BINS: usize = 8;

// ============================================================================
// Row types - one struct per view column set
// ============================================================================

/// A weekday-keyed value (conversion percentage or average units).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub day: Weekday,
    pub value: f64,
}

/// A date-keyed total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRow {
    pub date: NaiveDate,
    pub value: f64,
}

/// Per-category unit total, category name prefix-free.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub category: String,
    pub units: f64,
}

/// Promotion ranked by mean customer traffic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromoRow {
    pub promo_type: String,
    pub avg_traffic: f64,
}

/// Month-over-month growth; months with undefined growth are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRow {
    pub month: NaiveDate,
    pub growth_pct: f64,
}

/// Two monthly means on one time axis (bar + line combo downstream).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboRow {
    pub month: NaiveDate,
    pub avg_traffic: f64,
    pub avg_conversion: f64,
}

/// One non-empty heatmap cell: records in a (promo, traffic-bin) bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityRow {
    pub promo_type: String,
    pub bin: String,
    pub count: usize,
}

/// The computed table for one view.
///
/// Serialized untagged: each view's JSON is its row array, keyed by the
/// view name in the bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewTable {
    ConversionByDay(Vec<DayRow>),
    DailySalesTotal(Vec<DateRow>),
    CategoryShare(Vec<ShareRow>),
    PromoTrafficRanking(Vec<PromoRow>),
    MeatByDay(Vec<DayRow>),
    MonthlyGrowth(Vec<GrowthRow>),
    MonthlyCombo(Vec<ComboRow>),
    PromoTrafficDensity(Vec<DensityRow>),
}

/// Outcome of one requested view: its table, or the schema failure scoped
/// to it. A failure here never blocks the other views in the bundle.
#[derive(Debug)]
pub struct ViewResult {
    pub kind: ViewKind,
    pub table: Result<ViewTable, PipelineError>,
}

/// The three headline numbers plus the gauge scale presentation renders
/// next to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub records: usize,
    pub total_sales: f64,
    /// Mean conversion rate as a percentage.
    pub avg_conversion_pct: f64,
    /// Upper bound for the conversion gauge axis.
    pub gauge_max: f64,
}

/// Everything one recompute cycle hands to the Presentation collaborator.
#[derive(Debug)]
pub struct ViewBundle {
    pub headline: Headline,
    pub views: Vec<ViewResult>,
}

impl ViewBundle {
    /// Render the bundle as JSON, mapping per-view schema failures to
    /// `{"error": ...}` objects so one broken view never hides the rest.
    pub fn to_json(&self) -> serde_json::Value {
        let views: serde_json::Map<String, serde_json::Value> = self
            .views
            .iter()
            .map(|view| {
                let value = match &view.table {
                    Ok(table) => serde_json::to_value(table).unwrap_or(serde_json::Value::Null),
                    Err(err) => json!({ "error": err.to_string() }),
                };
                (view.kind.name().to_string(), value)
            })
            .collect();

        json!({
            "headline": &self.headline,
            "views": views,
        })
    }
}

/// Result of one recompute cycle.
///
/// `Empty` is a normal terminal state, not an error: the filter conjunction
/// left no records, so no view ran and presentation shows "no data for
/// current filters". It is recoverable immediately by changing filters.
#[derive(Debug)]
pub enum Recompute {
    Empty,
    Bundle(ViewBundle),
}

impl Recompute {
    pub fn is_empty(&self) -> bool {
        matches!(self, Recompute::Empty)
    }

    pub fn bundle(&self) -> Option<&ViewBundle> {
        match self {
            Recompute::Bundle(bundle) => Some(bundle),
            Recompute::Empty => None,
        }
    }
}

/// Run one full recompute cycle: filter, then derive every requested view.
///
/// Pure with respect to its inputs; the store is never mutated and nothing
/// is cached across calls.
pub fn recompute(store: &RecordStore, spec: &FilterSpec, kinds: &[ViewKind]) -> Recompute {
    let filtered = spec.apply(store.records());
    if filtered.is_empty() {
        log::debug!("recompute: no records survive the current filters");
        return Recompute::Empty;
    }
    log::debug!(
        "recompute: {} of {} records, {} views",
        filtered.len(),
        store.len(),
        kinds.len()
    );

    let views = kinds
        .iter()
        .map(|&kind| ViewResult {
            kind,
            table: build_view(kind, store, &filtered),
        })
        .collect();

    Recompute::Bundle(ViewBundle {
        headline: headline(&filtered),
        views,
    })
}

/// Compute a single view over an already filtered record set.
///
/// Column validation happens here, per view, so a dataset missing the
/// category columns still serves every view that does not need them.
pub fn build_view(
    kind: ViewKind,
    store: &RecordStore,
    records: &[TransactionRecord],
) -> Result<ViewTable, PipelineError> {
    let missing: Vec<String> = kind
        .required_columns()
        .iter()
        .copied()
        .filter(|col| !store.has_column(col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::SchemaInvalid { columns: missing });
    }

    Ok(match kind {
        ViewKind::ConversionByDay => ViewTable::ConversionByDay(conversion_by_day(records)),
        ViewKind::DailySalesTotal => ViewTable::DailySalesTotal(daily_sales_total(records)),
        ViewKind::CategoryShare => ViewTable::CategoryShare(category_share_view(records)),
        ViewKind::PromoTrafficRanking => {
            ViewTable::PromoTrafficRanking(promo_traffic_ranking(records))
        }
        ViewKind::MeatByDay => ViewTable::MeatByDay(meat_by_day(records)),
        ViewKind::MonthlyGrowth => ViewTable::MonthlyGrowth(monthly_growth(records)),
        ViewKind::MonthlyCombo => ViewTable::MonthlyCombo(monthly_combo(records)),
        ViewKind::PromoTrafficDensity => {
            ViewTable::PromoTrafficDensity(promo_traffic_density(records))
        }
    })
}

fn headline(records: &[TransactionRecord]) -> Headline {
    let total_sales: f64 = records
        .iter()
        .map(|r| r.total_sales)
        .filter(|v| v.is_finite())
        .sum();

    let conversions: Vec<f64> = records
        .iter()
        .map(|r| r.conversion_rate)
        .filter(|v| v.is_finite())
        .collect();
    let avg_conversion_pct = if conversions.is_empty() {
        0.0
    } else {
        conversions.iter().sum::<f64>() / conversions.len() as f64 * 100.0
    };

    Headline {
        records: records.len(),
        total_sales,
        avg_conversion_pct,
        gauge_max: f64::max(40.0, (avg_conversion_pct * 1.35).max(32.0).round()),
    }
}

fn conversion_by_day(records: &[TransactionRecord]) -> Vec<DayRow> {
    mean_by_weekday(records, |r| r.conversion_rate)
        .into_iter()
        .map(|(day, mean)| DayRow {
            day,
            value: mean * 100.0,
        })
        .collect()
}

fn daily_sales_total(records: &[TransactionRecord]) -> Vec<DateRow> {
    let mut rows: Vec<DateRow> = group_sum(records, |r| r.date, |r| r.total_sales)
        .into_iter()
        .map(|(date, value)| DateRow { date, value })
        .collect();
    // A line chart needs a chronological axis whatever the file order was.
    rows.sort_by_key(|row| row.date);
    rows
}

fn category_share_view(records: &[TransactionRecord]) -> Vec<ShareRow> {
    category_share(records, &CATEGORY_COLUMNS)
        .into_iter()
        .map(|(category, units)| ShareRow { category, units })
        .collect()
}

fn promo_traffic_ranking(records: &[TransactionRecord]) -> Vec<PromoRow> {
    let means = group_mean(records, |r| r.promo_type.clone(), |r| r.customer_traffic);
    sort_desc_by_value(means)
        .into_iter()
        .map(|(promo_type, avg_traffic)| PromoRow {
            promo_type,
            avg_traffic,
        })
        .collect()
}

fn meat_by_day(records: &[TransactionRecord]) -> Vec<DayRow> {
    mean_by_weekday(records, |r| r.units_for("units_carnes"))
        .into_iter()
        .map(|(day, value)| DayRow { day, value })
        .collect()
}

fn monthly_growth(records: &[TransactionRecord]) -> Vec<GrowthRow> {
    let mut monthly = group_sum(records, |r| month_start(r.date), |r| r.total_sales);
    monthly.sort_by_key(|(month, _)| *month);

    // The first month and any zero-base month carry no defined growth and
    // are absent from the output, never emitted as zero.
    monthly
        .windows(2)
        .filter_map(|window| {
            growth_pct(window[0].1, window[1].1).map(|pct| GrowthRow {
                month: window[1].0,
                growth_pct: pct,
            })
        })
        .collect()
}

fn monthly_combo(records: &[TransactionRecord]) -> Vec<ComboRow> {
    // One pass accumulating both measures so each month appears once even
    // when one of its measures has gaps.
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut acc: HashMap<NaiveDate, (f64, usize, f64, usize)> = HashMap::new();

    for record in records {
        let month = month_start(record.date);
        let entry = acc.entry(month).or_insert_with(|| {
            order.push(month);
            (0.0, 0, 0.0, 0)
        });
        if record.customer_traffic.is_finite() {
            entry.0 += record.customer_traffic;
            entry.1 += 1;
        }
        if record.conversion_rate.is_finite() {
            entry.2 += record.conversion_rate;
            entry.3 += 1;
        }
    }

    order.sort();
    order
        .into_iter()
        .map(|month| {
            let (t_sum, t_count, c_sum, c_count) = acc[&month];
            ComboRow {
                month,
                avg_traffic: if t_count > 0 { t_sum / t_count as f64 } else { f64::NAN },
                avg_conversion: if c_count > 0 { c_sum / c_count as f64 } else { f64::NAN },
            }
        })
        .collect()
}

fn promo_traffic_density(records: &[TransactionRecord]) -> Vec<DensityRow> {
    let eligible: Vec<&TransactionRecord> = records
        .iter()
        .filter(|r| r.customer_traffic.is_finite())
        .collect();
    let traffic: Vec<f64> = eligible.iter().map(|r| r.customer_traffic).collect();
    let bins = quantized_bins(&traffic, DENSITY_BINS);

    let mut promo_order: Vec<String> = Vec::new();
    let mut counts: HashMap<(String, usize), (String, usize)> = HashMap::new();

    for (record, bin) in eligible.iter().zip(&bins) {
        if !promo_order.contains(&record.promo_type) {
            promo_order.push(record.promo_type.clone());
        }
        let cell = counts
            .entry((record.promo_type.clone(), bin.index))
            .or_insert_with(|| (bin.label(), 0));
        cell.1 += 1;
    }

    // Rows grouped by promo in first-occurrence order, bins ascending;
    // empty cells are never emitted, matching the grouping primitives.
    let mut rows = Vec::new();
    for promo in &promo_order {
        for index in 0..DENSITY_BINS {
            if let Some((label, count)) = counts.get(&(promo.clone(), index)) {
                rows.push(DensityRow {
                    promo_type: promo.clone(),
                    bin: label.clone(),
                    count: *count,
                });
            }
        }
    }
    rows
}
