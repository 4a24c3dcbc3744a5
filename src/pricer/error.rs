//! Error types for option pricing and implied volatility calculation.

use chrono::NaiveDate;
use std::fmt;

/// Errors raised while pricing a call option or solving for its implied volatility.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Valuation date falls after the maturity date.
    InvalidDateOrdering {
        /// Date the option is valued on.
        valuation_date: NaiveDate,
        /// Date the option expires.
        maturity_date: NaiveDate,
    },

    /// Zero volatility or zero time to maturity reached the pricing formula.
    DegenerateInput {
        /// Volatility in use.
        volatility: f64,
        /// Time to maturity in years.
        time_to_maturity: f64,
    },

    /// Newton-Raphson solver did not converge within max iterations.
    SolverNonConvergence {
        /// Number of iterations attempted.
        iterations: u32,
        /// Last volatility estimate before giving up.
        last_volatility: f64,
    },

    /// The target price pins the volatility down no better than the
    /// floating-point rounding of the price allows.
    IllConditioned {
        /// Volatility the solver settled on.
        volatility: f64,
        /// Volatility change equivalent to the price rounding error.
        uncertainty: f64,
    },

    /// Invalid input parameters.
    InvalidParams {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Target price lies outside the no-arbitrage interval of a European call.
    PriceOutOfBounds {
        /// Target price supplied by the caller.
        price: f64,
        /// Lower bound, `max(0, S0 - K·e^(-rT))`.
        lower: f64,
        /// Upper bound, the spot price.
        upper: f64,
    },

    /// Target price is not attainable within the configured volatility bounds.
    VolatilityOutOfBounds {
        /// Bound nearest to the target.
        volatility: f64,
        /// Minimum bound.
        min_bound: f64,
        /// Maximum bound.
        max_bound: f64,
    },

    /// JSON encoding or decoding failed.
    Serialization {
        /// Underlying serde_json message.
        message: String,
    },
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidDateOrdering {
                valuation_date,
                maturity_date,
            } => {
                write!(
                    f,
                    "valuation date {valuation_date} is later than maturity date {maturity_date}"
                )
            }
            PricingError::DegenerateInput {
                volatility,
                time_to_maturity,
            } => {
                write!(
                    f,
                    "degenerate input: volatility {volatility:.6} and time to maturity {time_to_maturity:.6} must both be positive"
                )
            }
            PricingError::SolverNonConvergence {
                iterations,
                last_volatility,
            } => {
                write!(
                    f,
                    "solver did not converge after {iterations} iterations, last volatility: {last_volatility:.6}"
                )
            }
            PricingError::IllConditioned {
                volatility,
                uncertainty,
            } => {
                write!(
                    f,
                    "price is insensitive to volatility near {volatility:.6}: rounding error alone moves it by {uncertainty:.3e}"
                )
            }
            PricingError::InvalidParams { message } => {
                write!(f, "invalid parameters: {message}")
            }
            PricingError::PriceOutOfBounds {
                price,
                lower,
                upper,
            } => {
                write!(
                    f,
                    "target price {price:.6} is outside no-arbitrage bounds ({lower:.6}, {upper:.6})"
                )
            }
            PricingError::VolatilityOutOfBounds {
                volatility,
                min_bound,
                max_bound,
            } => {
                write!(
                    f,
                    "volatility {volatility:.4} is outside bounds [{min_bound:.4}, {max_bound:.4}]"
                )
            }
            PricingError::Serialization { message } => {
                write!(f, "serialization error: {message}")
            }
        }
    }
}

impl std::error::Error for PricingError {}

impl From<serde_json::Error> for PricingError {
    fn from(error: serde_json::Error) -> Self {
        PricingError::Serialization {
            message: error.to_string(),
        }
    }
}
