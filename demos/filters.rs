/// Filters Example
///
/// This example demonstrates:
/// - Building FilterSpecs facet by facet
/// - How predicates combine conjunctively
/// - The empty-result terminal state and recovering from it
use chrono::NaiveDate;
use storelens::{recompute, FilterSpec, RecordStore, ViewKind, Weekday};

const CSV: &str = "\
date,day_of_week,season,total_sales,customer_traffic,conversion_rate,promo_type,units_carnes,units_verduras,units_frutas,units_lacteos,units_bebidas
2024-01-01,Monday,Winter,1250.0,340,0.31,None,12,30,24,18,40
2024-01-06,Saturday,Winter,2450.0,520,0.41,2x1,22,40,35,25,60
2024-04-01,Monday,Spring,1500.0,380,0.34,None,14,32,26,20,44
2024-04-06,Saturday,Spring,2700.0,550,0.43,2x1,25,44,38,28,64
2024-07-01,Monday,Summer,1650.0,400,0.36,Descuento,15,33,27,21,46
";

fn main() {
    println!("=== StoreLens Filters Example ===\n");

    let store = RecordStore::from_csv(CSV).expect("demo CSV is well-formed");
    println!("Loaded {} records\n", store.len());

    // 1. Single facet: weekends only
    let weekends = FilterSpec::default().with_days([Weekday::Saturday, Weekday::Sunday]);
    report("Saturdays only", &store, &weekends);

    // 2. Conjunction: Spring AND Saturday
    let spring_weekends = FilterSpec::default()
        .with_seasons(["Spring"])
        .with_days([Weekday::Saturday]);
    report("Spring + Saturday", &store, &spring_weekends);

    // 3. Date range, inclusive on both ends
    let early = FilterSpec::default().with_date_range(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
    );
    report("Jan 1 - Apr 1", &store, &early);

    // 4. Contradictory predicates: Winter in July
    let nothing = FilterSpec::default()
        .with_seasons(["Winter"])
        .with_months(["2024-07"]);
    report("Winter in July", &store, &nothing);
}

fn report(label: &str, store: &RecordStore, spec: &FilterSpec) {
    match recompute(store, spec, &[ViewKind::DailySalesTotal]) {
        storelens::Recompute::Empty => {
            println!("{label}: no data for current filters");
        }
        storelens::Recompute::Bundle(bundle) => {
            println!(
                "{label}: {} records, ${:.2} total sales",
                bundle.headline.records, bundle.headline.total_sales
            );
        }
    }
}
