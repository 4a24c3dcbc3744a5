//! Value types shared by the pricing kernels and the solver.

use super::error::PricingError;
use serde::{Deserialize, Serialize};

/// Market inputs of a European call with the volatility left free.
///
/// Every pricing kernel takes volatility as an explicit argument, so one
/// `PricingInputs` value serves a whole implied volatility solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingInputs {
    /// Underlying spot price (S0).
    pub spot: f64,
    /// Option strike price (K).
    pub strike: f64,
    /// Time to maturity in years (T).
    pub time_to_maturity: f64,
    /// Risk-free interest rate, annualized, continuously compounded (r).
    pub risk_free_rate: f64,
}

impl PricingInputs {
    /// Creates new pricing inputs.
    ///
    /// # Arguments
    /// - `spot`: Underlying spot price
    /// - `strike`: Option strike price
    /// - `time_to_maturity`: Time to maturity in years
    /// - `risk_free_rate`: Risk-free interest rate (annualized)
    #[must_use]
    pub fn new(spot: f64, strike: f64, time_to_maturity: f64, risk_free_rate: f64) -> Self {
        Self {
            spot,
            strike,
            time_to_maturity,
            risk_free_rate,
        }
    }

    /// Checks spot, strike, rate and time to maturity.
    ///
    /// Zero time to maturity is accepted here; it is rejected as
    /// [`PricingError::DegenerateInput`] by the operations that divide by `√T`.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!("spot price must be positive, got {}", self.spot),
            });
        }

        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!("strike price must be positive, got {}", self.strike),
            });
        }

        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::InvalidParams {
                message: format!("risk-free rate must be finite, got {}", self.risk_free_rate),
            });
        }

        if !(self.time_to_maturity.is_finite() && self.time_to_maturity >= 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!(
                    "time to maturity must be non-negative, got {}",
                    self.time_to_maturity
                ),
            });
        }

        Ok(())
    }

    /// Discount factor `e^(-rT)`.
    #[must_use]
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }
}

/// First-order sensitivities of a European call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂price/∂S0.
    pub delta: f64,
    /// ∂²price/∂S0².
    pub gamma: f64,
    /// Price change per calendar day.
    pub theta: f64,
    /// ∂price/∂σ, per unit volatility.
    pub vega: f64,
    /// ∂price/∂r, per unit rate.
    pub rho: f64,
}

/// Result of an implied volatility solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IVResult {
    /// Implied volatility (e.g., 0.25 = 25%).
    pub iv: f64,
    /// Target price the solver matched.
    pub price_used: f64,
    /// Number of solver iterations to converge.
    pub iterations: u32,
    /// Model price minus target price at `iv`.
    pub residual: f64,
}

impl IVResult {
    /// Creates a new IV result.
    #[must_use]
    pub fn new(iv: f64, price_used: f64, iterations: u32, residual: f64) -> Self {
        Self {
            iv,
            price_used,
            iterations,
            residual,
        }
    }

    /// Returns the IV as a percentage (e.g., 25.0 for 25%).
    #[must_use]
    pub fn iv_percent(&self) -> f64 {
        self.iv * 100.0
    }
}
