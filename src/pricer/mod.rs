//! European call pricing and implied volatility under Black-Scholes-Merton.
//!
//! # Overview
//!
//! A [`CallOption`] bundles spot, strike, valuation and maturity dates,
//! risk-free rate and volatility. From these it derives time to maturity
//! (Actual/365 Fixed), the d1/d2 terms, the closed-form price, vega and the
//! other first-order Greeks.
//!
//! # Black-Scholes Inversion
//!
//! There is no closed form for the volatility that reproduces an observed
//! price, so [`solve_iv`] runs a bounded Newton-Raphson iteration with analytic
//! vega as the derivative. Vega is strictly positive away from σ = 0 and
//! T = 0, which makes the price monotone in σ and the root unique. A solve
//! converges once the volatility step is below the configured tolerance, or
//! returns [`PricingError::SolverNonConvergence`]; an unconverged iterate is
//! never reported as a result. A converged root the price cannot resolve, such
//! as deep in the money with no measurable time value, returns
//! [`PricingError::IllConditioned`].
//!
//! Target prices outside the no-arbitrage interval
//! `(max(0, S0 - K·e^(-rT)), S0)` are rejected before iterating.
//!
//! # Example
//!
//! ```
//! use bsm_implied_vol::pricer::CallOption;
//! use chrono::NaiveDate;
//!
//! let valuation = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let maturity = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//! let option = CallOption::new(100.0, 100.0, valuation, maturity, 0.05, 0.2).unwrap();
//!
//! let price = option.value().unwrap();
//! assert!((price - 10.45).abs() < 0.05);
//!
//! let iv = option.implied_volatility(price).unwrap();
//! assert!((iv - 0.2).abs() < 1e-4);
//! ```

mod black_scholes;
mod error;
mod option;
mod solver;
mod types;

pub use black_scholes::{BlackScholes, DAYS_PER_YEAR};
pub use error::PricingError;
pub use option::CallOption;
pub use solver::{
    DEFAULT_VOLATILITY_ESTIMATE, SolverConfig, no_arbitrage_bounds, solve_iv, solve_iv_bisection,
};
pub use types::{Greeks, IVResult, PricingInputs};
