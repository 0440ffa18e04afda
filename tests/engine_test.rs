use cropscope::aggregate::{aggregate_by, best_group, stats_table, summarize, value_counts};
use cropscope::filter::{filter_by, ALL};
use cropscope::insight::{crop_report, key_findings, CropInsight, InsightOptions};
use cropscope::{
    aggregate, filter, format_crop_report, format_key_findings, rank, CategoricalColumn, Dataset,
    NumericColumn, Order, QueryError, Selection, StatSet, Statistic,
};

mod common;

fn all_stats() -> StatSet {
    StatSet::of(&Statistic::ALL)
}

#[test]
fn filter_partitions_every_categorical_column() {
    let ds = common::sample_dataset();
    let all = ds.records().unwrap();
    for column in CategoricalColumn::ALL {
        let mut union = Vec::new();
        for value in ds.distinct(column).unwrap() {
            let subset = filter(&ds, column.ident(), &value).unwrap();
            let records = subset.records().unwrap();
            assert!(records.iter().all(|r| r.categorical(column) == value));
            union.extend(records);
        }
        assert_eq!(union.len(), all.len(), "column {}", column.ident());
        for r in &all {
            assert_eq!(
                union.iter().filter(|u| *u == r).count(),
                all.iter().filter(|a| *a == r).count()
            );
        }
    }
}

#[test]
fn filter_all_is_identity() {
    let ds = common::sample_dataset();
    for column in ["crop", "season", "Soil type"] {
        let same = filter(&ds, column, ALL).unwrap();
        assert_eq!(same.records().unwrap(), ds.records().unwrap());
    }
}

#[test]
fn aggregate_is_order_independent() {
    let mut records = common::sample_records();
    let forward = Dataset::from_records(&records).unwrap();
    records.reverse();
    records.rotate_left(3);
    let shuffled = Dataset::from_records(&records).unwrap();

    for group_by in CategoricalColumn::ALL {
        for value in NumericColumn::ALL {
            let a = aggregate_by(&forward, group_by, value, all_stats()).unwrap();
            let b = aggregate_by(&shuffled, group_by, value, all_stats()).unwrap();
            assert_eq!(a.len(), b.len());
            for g in &a.groups {
                let h = b.get(&g.key).unwrap();
                assert_eq!(g.count, h.count);
                assert_eq!(g.min, h.min);
                assert_eq!(g.max, h.max);
                let close = |x: Option<f64>, y: Option<f64>| {
                    let (x, y) = (x.unwrap(), y.unwrap());
                    (x.is_nan() && y.is_nan()) || (x - y).abs() < 1e-9
                };
                assert!(close(g.mean, h.mean));
                assert!(close(g.std, h.std));
            }
        }
    }
}

#[test]
fn rank_length_order_and_idempotence() {
    let ds = common::sample_dataset();
    let result = aggregate(&ds, "crop", "yield", all_stats()).unwrap();
    for n in 0..6 {
        let ranked = rank(&result, Statistic::Mean, n, Order::Descending).unwrap();
        assert_eq!(ranked.len(), n.min(result.len()));
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(
            ranked,
            rank(&result, Statistic::Mean, n, Order::Descending).unwrap()
        );
    }

    // Rice and Wheat both have three records; the tie goes to the smaller key.
    let counts = rank(&result, Statistic::Count, 4, Order::Descending).unwrap();
    let keys: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["Rice", "Wheat", "Maize", "Ragi"]);
}

#[test]
fn rice_wheat_scenario() {
    let ds = Dataset::from_records(&[
        common::record("Rice", "Kharif", "clay", 25.0, 800.0, 70.0, 100.0, 2000.0),
        common::record("Rice", "Kharif", "clay", 25.0, 800.0, 70.0, 200.0, 2000.0),
        common::record("Wheat", "Rabi", "loamy", 18.0, 300.0, 50.0, 50.0, 2200.0),
    ])
    .unwrap();
    let result = aggregate(
        &ds,
        "crop",
        "yield",
        StatSet::of(&[Statistic::Mean, Statistic::Count]),
    )
    .unwrap();
    assert_eq!(result.len(), 2);
    let rice = result.get("Rice").unwrap();
    assert_eq!((rice.mean, rice.count), (Some(150.0), Some(2)));
    let wheat = result.get("Wheat").unwrap();
    assert_eq!((wheat.mean, wheat.count), (Some(50.0), Some(1)));
    assert_eq!(
        best_group(&result, Statistic::Mean, Order::Descending).unwrap(),
        "Rice"
    );
}

#[test]
fn maize_scenario_empty_subset() {
    let ds = Dataset::from_records(&[
        common::record("Rice", "Kharif", "clay", 25.0, 800.0, 70.0, 100.0, 2000.0),
        common::record("Wheat", "Rabi", "loamy", 18.0, 300.0, 50.0, 50.0, 2200.0),
    ])
    .unwrap();
    let subset = filter(&ds, "crop", "Maize").unwrap();
    assert!(subset.is_empty());
    let result = aggregate(&subset, "crop", "yield", all_stats()).unwrap();
    assert!(result.is_empty());
    assert!(matches!(
        best_group(&result, Statistic::Mean, Order::Descending),
        Err(QueryError::EmptyResult)
    ));

    // The failed call leaves the dataset usable.
    let again = aggregate(&ds, "crop", "yield", all_stats()).unwrap();
    assert_eq!(again.len(), 2);
}

#[test]
fn summary_over_zero_rows_is_nan() {
    let ds = common::sample_dataset();
    let empty = filter_by(&ds, CategoricalColumn::Crop, &Selection::parse("Cotton")).unwrap();
    let s = summarize(&empty, NumericColumn::Price).unwrap();
    assert_eq!(s.count, 0);
    assert!(s.mean.is_nan());
    assert!(value_counts(&empty, CategoricalColumn::Season).unwrap().is_empty());
}

#[test]
fn stats_table_for_prices() {
    let ds = common::sample_dataset();
    let result = aggregate(&ds, "crop", "price", all_stats()).unwrap();
    let table = stats_table(&result).unwrap();
    let keys: Vec<&str> = table.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Ragi", "Wheat", "Rice", "Maize"]);
    assert_eq!(table[0].mean, 3350.0);
    assert_eq!(table[0].min, 3300.0);
    assert_eq!(table[0].max, 3400.0);
    assert_eq!(table[0].std, 70.71);
}

#[test]
fn key_findings_content() {
    let ds = common::sample_dataset();
    let text = format_key_findings(&ds).unwrap();
    assert!(text.starts_with("## Key Findings from the Analysis\n"));
    assert!(text.contains("Rice (3100 units), Maize (2450 units), Wheat (2333 units)"));
    assert!(text.contains("Ragi (₹3350), Wheat (₹2150), Rice (₹1950)"));
    assert!(text.contains("Rice (3 records), Wheat (3 records), Maize (2 records)"));
    assert!(text.contains("- **Best Performing Season:** Rabi"));
    assert!(text.contains("- **Temperature Range:** 16.0°C to 32.0°C"));
    assert!(text.contains("### Notable Trends"));
}

#[test]
fn key_findings_is_deterministic() {
    let ds = common::sample_dataset();
    let first = format_key_findings(&ds).unwrap();
    let second = format_key_findings(&ds).unwrap();
    assert_eq!(first, second);
}

#[test]
fn key_findings_respects_top_n() {
    let ds = common::sample_dataset();
    let opts = InsightOptions {
        top_n: 1,
        ..InsightOptions::default()
    };
    let text = key_findings(&ds, &opts).unwrap().render_markdown();
    assert!(text.contains("   Rice (3100 units)\n"));
}

#[test]
fn key_findings_on_empty_dataset() {
    let ds = common::sample_dataset();
    let empty = filter(&ds, "crop", "Cotton").unwrap();
    let text = format_key_findings(&empty).unwrap();
    assert!(text.contains("- **Best Performing Season:** n/a"));
    assert!(text.contains("   n/a\n"));
}

#[test]
fn crop_report_sections() {
    let ds = common::sample_dataset();
    let text = format_crop_report(&ds, "Rice").unwrap();
    assert!(text.starts_with("Detailed Analysis for Rice:\n"));
    assert!(text.contains("1. Production Metrics:"));
    assert!(text.contains("   - Average Yield: 3100.00 units per area"));
    assert!(text.contains("   - Maximum Yield: 3300.00"));
    assert!(text.contains("   - Minimum Yield: 2900.00"));
    assert!(text.contains("   - Average Temperature: 27.33°C"));
    assert!(text.contains("   - Price Range: ₹1900.00 - ₹2000.00"));
    assert!(text.contains("4. Seasonal Distribution:\n   Kharif  2\n   Rabi    1\n"));
    assert!(text.contains("5. Preferred Soil Types:\n   clay   2\n   loamy  1\n"));
}

#[test]
fn crop_report_placeholders() {
    let ds = common::sample_dataset();
    for all in ["All", "All Crops"] {
        assert_eq!(
            format_crop_report(&ds, all).unwrap(),
            "Please select a specific crop for detailed insights."
        );
    }
    let missing = crop_report(
        &ds,
        &Selection::parse("Cotton"),
        &InsightOptions::default(),
    )
    .unwrap();
    assert_eq!(
        missing,
        CropInsight::Placeholder("No records found for crop 'Cotton'.".into())
    );
}
