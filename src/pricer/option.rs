//! Dated European call option.
//!
//! [`CallOption`] holds the contract and market inputs. It is an immutable
//! value: a different volatility means a different option, built with
//! [`CallOption::with_volatility`]. Time to maturity is derived from the two
//! dates on every pricing call using an Actual/365 Fixed convention.

use super::black_scholes::{BlackScholes, DAYS_PER_YEAR};
use super::error::PricingError;
use super::solver::{DEFAULT_VOLATILITY_ESTIMATE, SolverConfig, solve_iv};
use super::types::{Greeks, IVResult, PricingInputs};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A European call option priced under Black-Scholes-Merton.
///
/// Deserializing goes through [`CallOption::new`], so a decoded option holds
/// the same invariants as a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CallOptionFields")]
pub struct CallOption {
    /// Underlying spot price (S0)
    spot: f64,
    /// Strike price (K)
    strike: f64,
    /// Pricing date (t)
    valuation_date: NaiveDate,
    /// Expiry date (M)
    maturity_date: NaiveDate,
    /// Annualized continuously compounded risk-free rate (r)
    risk_free_rate: f64,
    /// Annualized volatility (σ)
    volatility: f64,
}

/// Wire form of [`CallOption`] before validation.
#[derive(Deserialize)]
struct CallOptionFields {
    spot: f64,
    strike: f64,
    valuation_date: NaiveDate,
    maturity_date: NaiveDate,
    risk_free_rate: f64,
    volatility: f64,
}

impl TryFrom<CallOptionFields> for CallOption {
    type Error = PricingError;

    fn try_from(fields: CallOptionFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.spot,
            fields.strike,
            fields.valuation_date,
            fields.maturity_date,
            fields.risk_free_rate,
            fields.volatility,
        )
    }
}

impl CallOption {
    /// Creates a call option after checking every input.
    ///
    /// # Errors
    /// - [`PricingError::InvalidDateOrdering`] when `valuation_date > maturity_date`
    /// - [`PricingError::InvalidParams`] for non-positive spot or strike,
    ///   negative volatility, or non-finite values
    pub fn new(
        spot: f64,
        strike: f64,
        valuation_date: NaiveDate,
        maturity_date: NaiveDate,
        risk_free_rate: f64,
        volatility: f64,
    ) -> Result<Self, PricingError> {
        let option = Self {
            spot,
            strike,
            valuation_date,
            maturity_date,
            risk_free_rate,
            volatility,
        };
        option.validate()?;
        Ok(option)
    }

    /// Checks the date ordering first, then the numeric inputs.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.time_to_maturity()?;
        self.unchecked_inputs(0.0).validate()?;

        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!("volatility must be non-negative, got {}", self.volatility),
            });
        }

        Ok(())
    }

    /// Returns a copy of this option with a different volatility.
    pub fn with_volatility(&self, volatility: f64) -> Result<Self, PricingError> {
        Self::new(
            self.spot,
            self.strike,
            self.valuation_date,
            self.maturity_date,
            self.risk_free_rate,
            volatility,
        )
    }

    /// Underlying spot price.
    #[must_use]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike price.
    #[must_use]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Valuation date.
    #[must_use]
    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    /// Maturity date.
    #[must_use]
    pub fn maturity_date(&self) -> NaiveDate {
        self.maturity_date
    }

    /// Risk-free rate.
    #[must_use]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Volatility.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Time to maturity in years: calendar days between the two dates over 365.
    ///
    /// # Errors
    /// [`PricingError::InvalidDateOrdering`] when the valuation date is after
    /// the maturity date.
    pub fn time_to_maturity(&self) -> Result<f64, PricingError> {
        if self.valuation_date > self.maturity_date {
            return Err(PricingError::InvalidDateOrdering {
                valuation_date: self.valuation_date,
                maturity_date: self.maturity_date,
            });
        }

        let days = (self.maturity_date - self.valuation_date).num_days();
        Ok(days as f64 / DAYS_PER_YEAR)
    }

    /// Snapshot of spot, strike, time to maturity and rate for the pure kernels.
    pub fn inputs(&self) -> Result<PricingInputs, PricingError> {
        let time_to_maturity = self.time_to_maturity()?;
        Ok(self.unchecked_inputs(time_to_maturity))
    }

    fn unchecked_inputs(&self, time_to_maturity: f64) -> PricingInputs {
        PricingInputs::new(
            self.spot,
            self.strike,
            time_to_maturity,
            self.risk_free_rate,
        )
    }

    /// Inputs ready for the closed-form kernels: valid dates, `σ > 0`, `T > 0`.
    fn priceable_inputs(&self) -> Result<PricingInputs, PricingError> {
        let inputs = self.inputs()?;
        BlackScholes::ensure_non_degenerate(self.volatility, inputs.time_to_maturity)?;
        Ok(inputs)
    }

    fn finite(&self, value: f64, time_to_maturity: f64) -> Result<f64, PricingError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PricingError::DegenerateInput {
                volatility: self.volatility,
                time_to_maturity,
            })
        }
    }

    /// d1 = [ln(S0/K) + (r + σ²/2)·T] / (σ·√T)
    ///
    /// # Errors
    /// [`PricingError::DegenerateInput`] when σ = 0 or T = 0.
    pub fn d1(&self) -> Result<f64, PricingError> {
        let inputs = self.priceable_inputs()?;
        let d1 = BlackScholes::d1_for(&inputs, self.volatility);
        self.finite(d1, inputs.time_to_maturity)
    }

    /// d2 = d1 - σ·√T, derived from the same d1 [`CallOption::value`] uses.
    pub fn d2(&self) -> Result<f64, PricingError> {
        let inputs = self.priceable_inputs()?;
        let d1 = self.finite(
            BlackScholes::d1_for(&inputs, self.volatility),
            inputs.time_to_maturity,
        )?;
        let d2 = BlackScholes::d2(d1, self.volatility, inputs.time_to_maturity);
        self.finite(d2, inputs.time_to_maturity)
    }

    /// Present value of the call.
    ///
    /// price = S0·Φ(d1) - K·e^(-rT)·Φ(d2)
    pub fn value(&self) -> Result<f64, PricingError> {
        let inputs = self.priceable_inputs()?;
        let price = BlackScholes::call_price(&inputs, self.volatility);
        trace!("value: {:?}", price);
        self.finite(price, inputs.time_to_maturity)
    }

    /// Sensitivity of the price to volatility: S0·φ(d1)·√T.
    pub fn vega(&self) -> Result<f64, PricingError> {
        let inputs = self.priceable_inputs()?;
        let vega = BlackScholes::vega(&inputs, self.volatility);
        trace!("vega: {:?}", vega);
        self.finite(vega, inputs.time_to_maturity)
    }

    /// Delta, gamma, daily theta, vega and rho.
    pub fn greeks(&self) -> Result<Greeks, PricingError> {
        let inputs = self.priceable_inputs()?;
        let greeks = BlackScholes::greeks(&inputs, self.volatility);
        trace!("greeks: {:?}", greeks);

        for value in [
            greeks.delta,
            greeks.gamma,
            greeks.theta,
            greeks.vega,
            greeks.rho,
        ] {
            self.finite(value, inputs.time_to_maturity)?;
        }
        Ok(greeks)
    }

    /// Implied volatility for `target_price`, starting from 20%.
    pub fn implied_volatility(&self, target_price: f64) -> Result<f64, PricingError> {
        self.implied_volatility_with_estimate(target_price, DEFAULT_VOLATILITY_ESTIMATE)
    }

    /// Implied volatility for `target_price`, starting from `volatility_estimate`.
    ///
    /// The option's own volatility plays no part in the solve.
    pub fn implied_volatility_with_estimate(
        &self,
        target_price: f64,
        volatility_estimate: f64,
    ) -> Result<f64, PricingError> {
        let config = SolverConfig::default().with_initial_guess(volatility_estimate);
        self.solve_implied_volatility(target_price, &config)
            .map(|result| result.iv)
    }

    /// Runs the Newton-Raphson solver with a caller supplied configuration.
    pub fn solve_implied_volatility(
        &self,
        target_price: f64,
        config: &SolverConfig,
    ) -> Result<IVResult, PricingError> {
        let inputs = self.inputs()?;
        solve_iv(&inputs, target_price, config)
    }

    /// Serializes the option to JSON.
    pub fn to_json(&self) -> Result<String, PricingError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes an option from JSON, rejecting values `new` would reject.
    ///
    /// Unlike `serde_json::from_str::<CallOption>`, which folds a rejected
    /// value into a serde error, this keeps the specific [`PricingError`].
    pub fn from_json(data: &str) -> Result<Self, PricingError> {
        let fields: CallOptionFields = serde_json::from_str(data)?;
        Self::try_from(fields)
    }
}
