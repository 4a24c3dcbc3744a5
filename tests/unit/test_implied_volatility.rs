use bsm_implied_vol::prelude::*;
use chrono::{Duration, NaiveDate};

fn option_on(spot: f64, strike: f64, days: i64, rate: f64, volatility: f64) -> CallOption {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    CallOption::new(spot, strike, start, start + Duration::days(days), rate, volatility).unwrap()
}

fn option(strike: f64, days: i64, rate: f64, volatility: f64) -> CallOption {
    option_on(100.0, strike, days, rate, volatility)
}

/// Solves the option's own price back to a volatility.
///
/// Returns `true` when the solve succeeded. A success must reproduce the
/// pricing volatility to 1e-5 relative; a failure must be one of the errors
/// that say the price does not determine the volatility.
fn recovers_or_rejects(call: &CallOption) -> bool {
    let vol = call.volatility();
    let price = call.value().unwrap();
    let label = format!(
        "S={} K={} T={:.4} r={} vol={vol} price={price:e}",
        call.spot(),
        call.strike(),
        call.time_to_maturity().unwrap(),
        call.risk_free_rate()
    );

    match call.implied_volatility(price) {
        Ok(iv) => {
            assert!(((iv - vol) / vol).abs() < 1e-5, "{label}: got {iv}");
            true
        }
        Err(
            PricingError::IllConditioned { .. }
            | PricingError::PriceOutOfBounds { .. }
            | PricingError::VolatilityOutOfBounds { .. },
        ) => false,
        Err(other) => panic!("{label}: unexpected {other:?}"),
    }
}

#[test]
fn test_reference_scenario_round_trip() {
    let call = option(100.0, 365, 0.05, 0.2);
    let price = call.value().unwrap();
    assert!((price - 10.45).abs() < 0.05);

    let iv = call.implied_volatility_with_estimate(price, 0.2).unwrap();
    assert!((iv - 0.2).abs() < 1e-4);
}

#[test]
fn test_round_trip_recovers_volatility() {
    for strike in [85.0, 95.0, 100.0, 105.0, 115.0] {
        for days in [91, 182, 365, 730] {
            for vol in [0.1, 0.25, 0.5, 1.0] {
                for rate in [0.0, 0.05] {
                    let call = option(strike, days, rate, vol);
                    let price = call.value().unwrap();
                    let iv = call.implied_volatility(price).unwrap();
                    assert!(
                        ((iv - vol) / vol).abs() < 1e-5,
                        "K={strike} days={days} vol={vol} rate={rate}: got {iv}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_far_out_of_the_money_short_dated_round_trip() {
    for strike in [150.0, 160.0, 200.0] {
        for days in [3, 5, 7] {
            for vol in [0.5, 0.6, 0.8, 1.0] {
                for rate in [0.0, 0.02] {
                    let call = option(strike, days, rate, vol);
                    assert!(call.value().unwrap() < 0.05);
                    assert!(
                        recovers_or_rejects(&call),
                        "K={strike} days={days} vol={vol} rate={rate} was not solved"
                    );
                }
            }
        }
    }
}

#[test]
fn test_tiny_price_is_not_mistaken_for_convergence() {
    // prices at about 3.3e-9, far below any fixed price tolerance
    let call = option(150.0, 7, 0.0, 0.5);
    let price = call.value().unwrap();
    assert!(price < 1e-8);

    for estimate in [0.05, 0.2, 1.0, 3.0] {
        let iv = call.implied_volatility_with_estimate(price, estimate).unwrap();
        assert!(((iv - 0.5) / 0.5).abs() < 1e-8, "estimate {estimate} gave {iv}");
    }

    let wide = option(200.0, 7, 0.0, 1.0);
    let iv = wide.implied_volatility(wide.value().unwrap()).unwrap();
    assert!((iv - 1.0).abs() < 1e-8);
}

#[test]
fn test_deep_in_the_money_round_trip() {
    let mut solved = 0;
    for strike in [40.0, 60.0, 70.0, 80.0] {
        for days in [7, 30, 182, 365, 730] {
            for vol in [0.05, 0.1, 0.15, 0.3] {
                for rate in [0.0, 0.05] {
                    if recovers_or_rejects(&option(strike, days, rate, vol)) {
                        solved += 1;
                    }
                }
            }
        }
    }
    assert!(solved > 0);
}

#[test]
fn test_deep_in_the_money_with_resolvable_time_value() {
    for (strike, days, rate, vol) in [
        (60.0, 365, 0.05, 0.1),
        (70.0, 182, 0.03, 0.15),
        (80.0, 91, 0.0, 0.2),
        (60.0, 730, 0.05, 0.2),
    ] {
        let call = option(strike, days, rate, vol);
        let iv = call.implied_volatility(call.value().unwrap()).unwrap();
        assert!(
            ((iv - vol) / vol).abs() < 1e-5,
            "K={strike} days={days} vol={vol}: got {iv}"
        );
    }
}

#[test]
fn test_time_value_below_rounding_is_ill_conditioned() {
    // 10.000000000000028: the time value is lost in the rounding of the price
    let call = option(90.0, 30, 0.0, 0.05);
    let price = call.value().unwrap();

    match call.implied_volatility(price) {
        Err(PricingError::IllConditioned { uncertainty, .. }) => assert!(uncertainty > 1e-4),
        other => panic!("expected an ill-conditioned solve, got {other:?}"),
    }
}

#[test]
fn test_large_notional_round_trip() {
    for days in [7, 30, 91, 365, 730] {
        for vol in [0.02, 0.05, 0.2, 0.5, 1.0] {
            for rate in [0.0, 0.05] {
                let call = option_on(1e8, 1e8, days, rate, vol);
                assert!(
                    recovers_or_rejects(&call),
                    "days={days} vol={vol} rate={rate} was not solved"
                );
            }
        }
    }

    let call = option_on(1e8, 1e8, 365, 0.05, 0.02);
    let result = call
        .solve_implied_volatility(call.value().unwrap(), &SolverConfig::default())
        .unwrap();
    assert!(((result.iv - 0.02) / 0.02).abs() < 1e-8);
}

#[test]
fn test_round_trip_from_distant_estimates() {
    let call = option(105.0, 182, 0.03, 0.4);
    let price = call.value().unwrap();
    for estimate in [0.05, 0.2, 1.5, 4.0] {
        let iv = call.implied_volatility_with_estimate(price, estimate).unwrap();
        assert!((iv - 0.4).abs() < 1e-6, "estimate {estimate} gave {iv}");
    }
}

#[test]
fn test_result_carries_diagnostics() {
    let call = option(100.0, 365, 0.05, 0.3);
    let price = call.value().unwrap();
    let config = SolverConfig::default();

    let result = call.solve_implied_volatility(price, &config).unwrap();
    assert!(result.iterations >= 1 && result.iterations <= config.max_iterations);
    assert!(result.residual.abs() < 1e-10);
    assert_eq!(result.price_used, price);
    assert!((result.iv_percent() - 30.0).abs() < 1e-4);
}

#[test]
fn test_bisection_agrees_with_newton() {
    let call = option(95.0, 182, 0.02, 0.35);
    let price = call.value().unwrap();
    let inputs = call.inputs().unwrap();
    let config = SolverConfig::default();

    let newton = solve_iv(&inputs, price, &config).unwrap();
    let bisection = solve_iv_bisection(&inputs, price, &config).unwrap();
    assert!((newton.iv - bisection.iv).abs() < 1e-6);
}

#[test]
fn test_target_above_spot_is_rejected() {
    let call = option(100.0, 365, 0.05, 0.2);
    let result = call.implied_volatility(150.0);
    assert!(matches!(
        result,
        Err(PricingError::PriceOutOfBounds { upper, .. }) if upper == 100.0
    ));
}

#[test]
fn test_target_below_discounted_intrinsic_is_rejected() {
    let call = option(80.0, 365, 0.05, 0.2);
    let (lower, _) = no_arbitrage_bounds(&call.inputs().unwrap());
    assert!(lower > 20.0);

    let result = call.implied_volatility(lower - 0.5);
    assert!(matches!(result, Err(PricingError::PriceOutOfBounds { .. })));
}

#[test]
fn test_non_positive_target_is_rejected() {
    let call = option(100.0, 365, 0.05, 0.2);
    assert!(matches!(
        call.implied_volatility(0.0),
        Err(PricingError::InvalidParams { .. })
    ));
}

#[test]
fn test_exhausted_budget_reports_non_convergence() {
    let call = option(100.0, 365, 0.05, 1.2);
    let price = call.value().unwrap();
    let config = SolverConfig::default().with_max_iterations(2);

    let result = call.solve_implied_volatility(price, &config);
    assert!(matches!(
        result,
        Err(PricingError::SolverNonConvergence { iterations: 2, .. })
    ));
}

#[test]
fn test_unreachable_target_within_bounds_is_rejected() {
    // the price at the 0.5 cap is well below a quote implying 150% volatility
    let call = option(100.0, 365, 0.0, 1.5);
    let price = call.value().unwrap();
    let config = SolverConfig::default().with_bounds(0.01, 0.5);

    let result = call.solve_implied_volatility(price, &config);
    match result {
        Err(PricingError::VolatilityOutOfBounds {
            volatility,
            max_bound,
            ..
        }) => {
            assert_eq!(volatility, 0.5);
            assert_eq!(max_bound, 0.5);
        }
        other => panic!("expected a volatility bound error, got {other:?}"),
    }
}

#[test]
fn test_independent_instances_price_in_parallel() {
    let handles: Vec<_> = [0.15, 0.3, 0.45, 0.6]
        .into_iter()
        .map(|vol| {
            std::thread::spawn(move || {
                let call = option(100.0, 365, 0.01, vol);
                let price = call.value().unwrap();
                (vol, call.implied_volatility(price).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (vol, iv) = handle.join().unwrap();
        assert!((iv - vol).abs() < 1e-6);
    }
}
