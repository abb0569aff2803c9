//! Minimal CLI: load the source file, run one recompute cycle with the
//! default (identity) filters and print the view bundle as JSON.

use storelens::{recompute, FilterSpec, Recompute, RecordStore, ViewKind};

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "retail_transactions.csv".to_string());

    let store = match RecordStore::load(&path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    match recompute(&store, &FilterSpec::default(), &ViewKind::ALL) {
        Recompute::Empty => println!("no data for current filters"),
        Recompute::Bundle(bundle) => {
            let json = bundle.to_json();
            println!(
                "{}",
                serde_json::to_string_pretty(&json).expect("bundle JSON is serializable")
            );
        }
    }
}
