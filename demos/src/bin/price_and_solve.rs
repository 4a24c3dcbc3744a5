//! Example demonstrating call pricing and the implied volatility round trip
//!
//! This example shows how to:
//! 1. Build a dated call option and price it
//! 2. Inspect d1, d2, vega and the other Greeks
//! 3. Recover the volatility from a quoted price
//! 4. Handle the explicit error cases instead of NaN results

use bsm_implied_vol::prelude::*;
use chrono::NaiveDate;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Starting price and solve example");

    let valuation = NaiveDate::from_ymd_opt(2025, 1, 1).ok_or("invalid valuation date")?;
    let maturity = NaiveDate::from_ymd_opt(2026, 1, 1).ok_or("invalid maturity date")?;

    let option = CallOption::new(100.0, 100.0, valuation, maturity, 0.05, 0.2)?;
    info!("Option: {}", option.to_json()?);

    let price = option.value()?;
    info!(
        "T = {:.4} years, d1 = {:.6}, d2 = {:.6}",
        option.time_to_maturity()?,
        option.d1()?,
        option.d2()?
    );
    info!("Call value: {:.6}", price);

    let greeks = option.greeks()?;
    info!("Greeks: {}", serde_json::to_string(&greeks)?);

    // Quote the option at a higher price and back out the volatility
    let quoted = price + 1.5;
    let result = option.solve_implied_volatility(quoted, &SolverConfig::default())?;
    info!(
        "Quoted {:.4} implies volatility {:.4}% ({} iterations, residual {:.2e})",
        quoted,
        result.iv_percent(),
        result.iterations,
        result.residual
    );

    let check = option.with_volatility(result.iv)?.value()?;
    info!("Repricing at implied volatility gives {:.6}", check);

    // Error cases
    match CallOption::new(100.0, 100.0, maturity, valuation, 0.05, 0.2) {
        Ok(_) => error!("Reversed dates were accepted"),
        Err(e) => warn!("Rejected option: {}", e),
    }

    match option.with_volatility(0.0)?.value() {
        Ok(value) => error!("Zero volatility priced at {}", value),
        Err(e) => warn!("Rejected pricing: {}", e),
    }

    match option.implied_volatility(option.spot() + 1.0) {
        Ok(iv) => error!("Arbitrage price solved to {}", iv),
        Err(e) => warn!("Rejected solve: {}", e),
    }

    let tight = SolverConfig::default().with_max_iterations(1);
    match option.solve_implied_volatility(quoted * 2.0, &tight) {
        Ok(result) => info!("Solved in one step: {:.6}", result.iv),
        Err(e) => warn!("Rejected solve: {}", e),
    }

    info!("Example completed");
    Ok(())
}
