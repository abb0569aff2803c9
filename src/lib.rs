/// StoreLens - Retail Transactions Analytics Pipeline
///
/// A deterministic filtering and aggregation pipeline for dashboards over a
/// fixed-schema retail transactions dataset. The dataset is loaded once per
/// session into an immutable record store; every filter change triggers one
/// synchronous recompute cycle that derives all requested summary tables
/// from the filtered subset. Rendering is someone else's job: this crate
/// produces plain ordered tables and three headline numbers, nothing more.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod record;
pub mod store;
pub mod views;

pub use error::PipelineError;
pub use filter::FilterSpec;
pub use record::{month_bucket, TransactionRecord, Weekday, CATEGORY_COLUMNS, CATEGORY_PREFIX};
pub use store::{FacetDomains, RecordStore};
pub use views::{
    recompute, ComboRow, DateRow, DayRow, DensityRow, GrowthRow, Headline, PromoRow, Recompute,
    ShareRow, ViewBundle, ViewKind, ViewResult, ViewTable,
};

#[cfg(test)]
mod integration_tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "date,day_of_week,season,total_sales,customer_traffic,conversion_rate,promo_type,units_carnes,units_verduras,units_frutas,units_lacteos,units_bebidas";

    fn dataset() -> String {
        format!(
            "{HEADER}\n\
             2024-01-01,Monday,Winter,1000,100,0.30,None,10,20,30,40,50\n\
             2024-01-02,Tuesday,Winter,1500,150,0.35,2x1,12,22,32,42,52\n\
             2024-01-06,Saturday,Winter,2000,300,0.40,Descuento,20,30,40,50,60\n\
             2024-02-05,Monday,Winter,1200,120,0.25,None,11,21,31,41,51\n\
             2024-02-10,Saturday,Winter,1800,280,0.38,2x1,18,28,38,48,58\n\
             bad-date,Sunday,Winter,999,99,0.99,None,9,9,9,9,9\n"
        )
    }

    #[test]
    fn test_complete_workflow() {
        // Load: the malformed-date row is silently dropped.
        let store = RecordStore::from_csv(&dataset()).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(
            store.facets().months,
            vec!["2024-01".to_string(), "2024-02".to_string()]
        );

        // Filter: keep January only.
        let spec = FilterSpec::default().with_months(["2024-01"]);

        // Recompute: every view, one cycle.
        let result = recompute(&store, &spec, &ViewKind::ALL);
        let bundle = result.bundle().expect("January has records");

        assert_eq!(bundle.headline.records, 3);
        assert_eq!(bundle.headline.total_sales, 4500.0);
        assert!((bundle.headline.avg_conversion_pct - 35.0).abs() < 1e-9);

        // Weekday-keyed views come back Monday-first regardless of data order.
        let conv = bundle
            .views
            .iter()
            .find(|v| v.kind == ViewKind::ConversionByDay)
            .unwrap();
        match conv.table.as_ref().unwrap() {
            ViewTable::ConversionByDay(rows) => {
                let days: Vec<Weekday> = rows.iter().map(|r| r.day).collect();
                assert_eq!(days, vec![Weekday::Monday, Weekday::Tuesday, Weekday::Saturday]);
            }
            other => panic!("wrong table: {:?}", other),
        }

        // Category share covers all five categories, prefix-free.
        let share = bundle
            .views
            .iter()
            .find(|v| v.kind == ViewKind::CategoryShare)
            .unwrap();
        match share.table.as_ref().unwrap() {
            ViewTable::CategoryShare(rows) => {
                assert_eq!(rows.len(), 5);
                assert!(rows.iter().all(|r| !r.category.starts_with("units_")));
            }
            other => panic!("wrong table: {:?}", other),
        }
    }

    #[test]
    fn test_filter_change_recomputes_from_scratch() {
        let store = RecordStore::from_csv(&dataset()).unwrap();

        let january = recompute(
            &store,
            &FilterSpec::default().with_months(["2024-01"]),
            &[ViewKind::DailySalesTotal],
        );
        let february = recompute(
            &store,
            &FilterSpec::default().with_months(["2024-02"]),
            &[ViewKind::DailySalesTotal],
        );

        // No stale state leaks between cycles.
        assert_eq!(january.bundle().unwrap().headline.records, 3);
        assert_eq!(february.bundle().unwrap().headline.records, 2);
    }

    #[test]
    fn test_narrowing_to_nothing_is_empty_not_error() {
        let store = RecordStore::from_csv(&dataset()).unwrap();
        let spec = FilterSpec::default().with_date_range(
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        );
        assert!(recompute(&store, &spec, &ViewKind::ALL).is_empty());

        // Recoverable immediately by widening the filters again.
        let recovered = recompute(&store, &FilterSpec::default(), &ViewKind::ALL);
        assert!(!recovered.is_empty());
    }

    #[test]
    fn test_bundle_serializes_for_presentation() {
        let store = RecordStore::from_csv(&dataset()).unwrap();
        let result = recompute(&store, &FilterSpec::default(), &ViewKind::ALL);
        let json = result.bundle().unwrap().to_json();

        assert_eq!(json["headline"]["records"], 5);
        for kind in ViewKind::ALL {
            assert!(
                !json["views"][kind.name()].is_null(),
                "missing view {} in bundle JSON",
                kind.name()
            );
        }
    }
}
