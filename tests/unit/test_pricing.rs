use bsm_implied_vol::prelude::*;
use chrono::{Duration, NaiveDate};

fn valuation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn option(spot: f64, strike: f64, days: i64, rate: f64, volatility: f64) -> CallOption {
    let start = valuation_date();
    CallOption::new(spot, strike, start, start + Duration::days(days), rate, volatility).unwrap()
}

#[test]
fn test_reference_scenario_price() {
    let call = option(100.0, 100.0, 365, 0.05, 0.2);
    assert!((call.time_to_maturity().unwrap() - 1.0).abs() < 1e-12);

    let price = call.value().unwrap();
    assert!((price - 10.45).abs() < 0.05, "price was {price}");
}

#[test]
fn test_atm_zero_rate_price_is_bounded_and_increasing_in_volatility() {
    let mut previous = 0.0;
    for step in 1..=40 {
        let vol = step as f64 * 0.05;
        let price = option(100.0, 100.0, 180, 0.0, vol).value().unwrap();
        assert!((0.0..=100.0).contains(&price));
        assert!(price > previous, "price not increasing at vol {vol}");
        previous = price;
    }
}

#[test]
fn test_value_within_zero_and_spot() {
    for spot in [20.0, 80.0, 100.0, 125.0, 400.0] {
        for days in [1, 30, 365, 3650] {
            for rate in [-0.01, 0.0, 0.05, 0.15] {
                for vol in [0.01, 0.2, 0.8, 3.0] {
                    let price = option(spot, 100.0, days, rate, vol).value().unwrap();
                    assert!(price.is_finite());
                    assert!(price >= 0.0, "negative for S={spot} days={days} r={rate} vol={vol}");
                    assert!(price <= spot, "above spot for S={spot} days={days} r={rate} vol={vol}");
                }
            }
        }
    }
}

#[test]
fn test_vega_positive_away_from_degeneracy() {
    for strike in [80.0, 90.0, 100.0, 110.0, 125.0] {
        for days in [30, 90, 365, 1000] {
            for vol in [0.1, 0.2, 0.6, 1.5] {
                let vega = option(100.0, strike, days, 0.03, vol).vega().unwrap();
                assert!(vega > 0.0, "vega not positive for K={strike} days={days} vol={vol}");
            }
        }
    }
}

#[test]
fn test_d2_uses_the_same_d1() {
    let call = option(105.0, 95.0, 200, 0.02, 0.35);
    let d1 = call.d1().unwrap();
    let d2 = call.d2().unwrap();
    let sqrt_t = call.time_to_maturity().unwrap().sqrt();
    assert!((d1 - d2 - 0.35 * sqrt_t).abs() < 1e-12);
}

#[test]
fn test_valuation_after_maturity_is_rejected() {
    let start = valuation_date();
    let result = CallOption::new(100.0, 100.0, start, start - Duration::days(1), 0.05, 0.2);
    match result {
        Err(PricingError::InvalidDateOrdering {
            valuation_date,
            maturity_date,
        }) => {
            assert_eq!(valuation_date, start);
            assert!(maturity_date < valuation_date);
        }
        other => panic!("expected InvalidDateOrdering, got {other:?}"),
    }
}

#[test]
fn test_zero_volatility_raises_degenerate_input() {
    let call = option(100.0, 100.0, 365, 0.05, 0.0);
    assert!(matches!(
        call.value(),
        Err(PricingError::DegenerateInput { volatility, .. }) if volatility == 0.0
    ));
    assert!(matches!(
        call.vega(),
        Err(PricingError::DegenerateInput { .. })
    ));
}

#[test]
fn test_zero_time_raises_degenerate_input() {
    let call = option(100.0, 100.0, 0, 0.05, 0.2);
    assert!(matches!(
        call.value(),
        Err(PricingError::DegenerateInput { .. })
    ));
}

#[test]
fn test_greeks_against_kernel() {
    let call = option(100.0, 100.0, 365, 0.05, 0.2);
    let greeks = call.greeks().unwrap();
    let inputs = call.inputs().unwrap();
    assert_eq!(greeks, BlackScholes::greeks(&inputs, 0.2));
    assert!((greeks.delta - 0.6368).abs() < 1e-4);
}

#[test]
fn test_option_json_round_trip() {
    let call = option(100.0, 95.0, 90, 0.04, 0.3);
    let decoded = CallOption::from_json(&call.to_json().unwrap()).unwrap();
    assert_eq!(decoded, call);
    assert_eq!(decoded.value().unwrap(), call.value().unwrap());
}
