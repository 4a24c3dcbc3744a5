//! # bsm-implied-vol
//!
//! Black-Scholes-Merton pricing for European call options and an implied
//! volatility solver built on top of it.
//!
//! ## Features
//!
//! - Dated contracts: time to maturity is derived from a valuation date and a
//!   maturity date on an Actual/365 Fixed basis.
//! - Closed-form call price, d1/d2, vega, delta, gamma, theta and rho.
//! - Bounded Newton-Raphson implied volatility with analytic vega, plus a
//!   bisection alternative.
//! - Explicit errors instead of NaN: invalid date ordering, zero volatility or
//!   zero time to maturity, target prices outside no-arbitrage bounds, and
//!   solver non-convergence.
//! - `serde` support for options, solver configuration and results.
//!
//! All types are plain values. Pricing many options in parallel is a matter of
//! building one [`pricer::CallOption`] per request.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`trace` per solver iteration, `debug` on
//! convergence, `warn` on non-convergence) and never installs a subscriber.

pub mod pricer;

/// Prelude with commonly used types.
pub mod prelude {
    pub use crate::pricer::{
        BlackScholes, CallOption, DEFAULT_VOLATILITY_ESTIMATE, Greeks, IVResult, PricingError,
        PricingInputs, SolverConfig, no_arbitrage_bounds, solve_iv, solve_iv_bisection,
    };
}

pub use pricer::{CallOption, PricingError};
