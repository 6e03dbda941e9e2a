//! Indicator, feature and predictor tests over synthetic price series.

use autotrade::services::{FeatureBuilder, IndicatorEngine, Predictor, PredictorConfig};
use autotrade::types::PriceBar;
use chrono::{Duration, NaiveDate};

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 5_000.0,
        })
        .collect()
}

fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            250.0 + (t * 0.21).sin() * 12.0 + (t * 0.07).cos() * 6.0 + t * 0.1
        })
        .collect()
}

#[test]
fn test_leading_rows_undefined_and_excluded() {
    let rows = IndicatorEngine::default().apply(&bars(&wave(60)));

    assert!(rows[..14].iter().all(|r| r.rsi.is_none()));
    assert!(rows[14].rsi.is_some());
    assert!(rows[..33].iter().all(|r| r.macd_signal.is_none()));
    assert!(rows[33..].iter().all(|r| r.is_complete()));

    let set = FeatureBuilder::new().build(&rows).unwrap();
    // 27 complete rows; the first has no previous close and the last is `latest`.
    assert_eq!(set.rows.len(), 25);
    assert!(set.rows.iter().all(|r| r.date >= rows[34].bar.date));
    assert_eq!(set.latest.date, rows[59].bar.date);
}

#[test]
fn test_labels_compare_next_close() {
    let rows = IndicatorEngine::default().apply(&bars(&wave(80)));
    let set = FeatureBuilder::new().build(&rows).unwrap();

    for (i, label) in set.labels.iter().enumerate() {
        let next = set.rows.get(i + 1).unwrap_or(&set.latest);
        assert_eq!(*label, next.close > set.rows[i].close);
    }
}

#[test]
fn test_rsi_bounds_and_extremes() {
    let rows = IndicatorEngine::default().apply(&bars(&wave(90)));
    assert!(rows
        .iter()
        .filter_map(|r| r.rsi)
        .all(|v| (0.0..=100.0).contains(&v)));

    let rising: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let rows = IndicatorEngine::default().apply(&bars(&rising));
    assert_eq!(rows[39].rsi, Some(100.0));
}

#[test]
fn test_predictor_deterministic_for_seed() {
    let rows = IndicatorEngine::default().apply(&bars(&wave(250)));
    let set = FeatureBuilder::new().build(&rows).unwrap();

    let config = PredictorConfig {
        trees: 40,
        seed: 7,
        ..Default::default()
    };
    let a = Predictor::new(config.clone()).train_and_predict(&set).unwrap();
    let b = Predictor::new(config).train_and_predict(&set).unwrap();
    assert_eq!(a, b);
}
