/// Dashboard Example
///
/// This example demonstrates the full pipeline end to end:
/// - Loading a record store from CSV
/// - Inspecting the cached facet domains
/// - Running a recompute cycle over all eight views
/// - Reading the headline numbers and individual view tables
use storelens::{recompute, FilterSpec, Recompute, RecordStore, ViewKind, ViewTable};

const CSV: &str = "\
date,day_of_week,season,total_sales,customer_traffic,conversion_rate,promo_type,units_carnes,units_verduras,units_frutas,units_lacteos,units_bebidas
2024-01-01,Monday,Winter,1250.0,340,0.31,None,12,30,24,18,40
2024-01-02,Tuesday,Winter,980.5,280,0.27,2x1,9,28,22,14,36
2024-01-03,Wednesday,Winter,1100.0,310,0.29,Descuento,11,26,20,16,38
2024-01-06,Saturday,Winter,2450.0,520,0.41,2x1,22,40,35,25,60
2024-01-07,Sunday,Winter,2100.0,470,0.38,Descuento,19,35,30,22,55
2024-02-05,Monday,Winter,1400.0,360,0.33,None,13,31,25,19,42
2024-02-10,Saturday,Winter,2600.0,540,0.42,2x1,24,42,36,27,62
";

fn main() {
    println!("=== StoreLens Dashboard Example ===\n");

    // 1. Load the dataset
    println!("1. Loading dataset...");
    let store = RecordStore::from_csv(CSV).expect("demo CSV is well-formed");
    println!("   Loaded {} records", store.len());

    let facets = store.facets();
    println!("   Seasons: {:?}", facets.seasons);
    println!("   Months:  {:?}", facets.months);
    println!(
        "   Dates:   {:?} .. {:?}\n",
        facets.date_min, facets.date_max
    );

    // 2. Recompute all views with the default (identity) filters
    println!("2. Recomputing all views...");
    let bundle = match recompute(&store, &FilterSpec::default(), &ViewKind::ALL) {
        Recompute::Bundle(bundle) => bundle,
        Recompute::Empty => {
            println!("   No data for current filters.");
            return;
        }
    };

    println!("   Records:        {}", bundle.headline.records);
    println!("   Total sales:    ${:.2}", bundle.headline.total_sales);
    println!(
        "   Avg conversion: {:.2}% (gauge to {})\n",
        bundle.headline.avg_conversion_pct, bundle.headline.gauge_max
    );

    // 3. Walk the individual views
    println!("3. View tables:");
    for view in &bundle.views {
        println!("   -- {} --", view.kind.name());
        match &view.table {
            Ok(ViewTable::ConversionByDay(rows)) => {
                for row in rows {
                    println!("      {:<9} {:.2}%", row.day, row.value);
                }
            }
            Ok(ViewTable::DailySalesTotal(rows)) => {
                for row in rows {
                    println!("      {} ${:.2}", row.date, row.value);
                }
            }
            Ok(ViewTable::CategoryShare(rows)) => {
                for row in rows {
                    println!("      {:<9} {:.0} units", row.category, row.units);
                }
            }
            Ok(ViewTable::PromoTrafficRanking(rows)) => {
                for row in rows {
                    println!("      {:<10} {:.1} customers", row.promo_type, row.avg_traffic);
                }
            }
            Ok(ViewTable::MeatByDay(rows)) => {
                for row in rows {
                    println!("      {:<9} {:.1} units", row.day, row.value);
                }
            }
            Ok(ViewTable::MonthlyGrowth(rows)) => {
                for row in rows {
                    println!("      {} {:+.2}%", row.month, row.growth_pct);
                }
            }
            Ok(ViewTable::MonthlyCombo(rows)) => {
                for row in rows {
                    println!(
                        "      {} traffic {:.1}, conversion {:.3}",
                        row.month, row.avg_traffic, row.avg_conversion
                    );
                }
            }
            Ok(ViewTable::PromoTrafficDensity(rows)) => {
                for row in rows {
                    println!("      {:<10} {} x{}", row.promo_type, row.bin, row.count);
                }
            }
            Err(err) => println!("      unavailable: {}", err),
        }
    }

    println!("\nDone.");
}
