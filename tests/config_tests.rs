use std::collections::HashMap;
use std::time::Duration;

use rustorders::config::{self, StoreBackend};

fn settings_from(pairs: &[(&str, &str)]) -> config::Settings {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    config::from_lookup(move |key| vars.get(key).cloned())
}

#[test]
fn defaults_when_unset() {
    let s = settings_from(&[]);

    assert_eq!(s.port, 3000);
    assert_eq!(s.store_backend, StoreBackend::Mongo);
    assert_eq!(s.price_ttl, Duration::from_secs(60));
    assert_eq!(s.price_jitter, 1.0);
    assert_eq!(s.settlement_interval, Some(Duration::from_secs(10)));
    assert_eq!(s.settlement_probability, 0.5);
}

#[test]
fn non_finite_floats_fall_back_to_defaults() {
    let s = settings_from(&[("PRICE_JITTER", "inf"), ("SETTLEMENT_PROBABILITY", "NaN")]);
    assert_eq!(s.price_jitter, 1.0);
    assert_eq!(s.settlement_probability, 0.5);

    let s = settings_from(&[("PRICE_JITTER", "-inf"), ("SETTLEMENT_PROBABILITY", "-inf")]);
    assert_eq!(s.price_jitter, 1.0);
    assert_eq!(s.settlement_probability, 0.5);
}

#[test]
fn values_are_normalized() {
    let s = settings_from(&[
        ("STORE_BACKEND", "MEMORY"),
        ("PRICE_JITTER", "-2.5"),
        ("SETTLEMENT_PROBABILITY", "7"),
        ("SETTLEMENT_INTERVAL_SECS", "0"),
        ("PORT", "not-a-port"),
    ]);

    assert_eq!(s.store_backend, StoreBackend::Memory);
    assert_eq!(s.price_jitter, 2.5);
    assert_eq!(s.settlement_probability, 1.0);
    assert_eq!(s.settlement_interval, None);
    assert_eq!(s.port, 3000);
}
