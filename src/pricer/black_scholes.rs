//! Black-Scholes-Merton pricing kernels for European calls.
//!
//! Every function here is pure: volatility is an explicit argument and no
//! state is kept between calls. The kernels assume `vol > 0` and
//! `time_to_maturity > 0`; use [`BlackScholes::ensure_non_degenerate`] before
//! calling them with inputs that have not already been checked.

use super::error::PricingError;
use super::types::{Greeks, PricingInputs};
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// Calendar days per year used for time to maturity and daily theta.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Units in the last place allowed for the rounding error of a computed price.
const PRICE_ROUNDING_ULPS: f64 = 8.0;

/// Black-Scholes-Merton pricing model for European calls.
pub struct BlackScholes;

impl BlackScholes {
    /// Standard normal cumulative distribution function (CDF).
    ///
    /// Calculates P(Z ≤ x) where Z is a standard normal random variable,
    /// through the complementary error function so the lower tail keeps its
    /// relative precision.
    #[must_use]
    pub fn norm_cdf(x: f64) -> f64 {
        0.5 * erfc(-x / SQRT_2)
    }

    /// Standard normal probability density function (PDF).
    #[must_use]
    pub fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Rejects zero (or negative, or non-finite) volatility and time to maturity.
    ///
    /// Both appear in the denominator `σ√T` of d1.
    pub fn ensure_non_degenerate(vol: f64, time: f64) -> Result<(), PricingError> {
        if vol.is_finite() && vol > 0.0 && time.is_finite() && time > 0.0 {
            Ok(())
        } else {
            Err(PricingError::DegenerateInput {
                volatility: vol,
                time_to_maturity: time,
            })
        }
    }

    /// Calculates the d1 parameter of the Black-Scholes formula.
    ///
    /// d1 = [ln(S/K) + (r + σ²/2)T] / (σ√T)
    ///
    /// # Arguments
    /// - `spot`: Current underlying price (S)
    /// - `strike`: Option strike price (K)
    /// - `rate`: Risk-free interest rate (r)
    /// - `time`: Time to maturity in years (T)
    /// - `vol`: Volatility (σ)
    #[must_use]
    pub fn d1(spot: f64, strike: f64, rate: f64, time: f64, vol: f64) -> f64 {
        let sqrt_time = time.sqrt();
        ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * sqrt_time)
    }

    /// Calculates the d2 parameter from an already computed d1.
    ///
    /// d2 = d1 - σ√T
    #[must_use]
    pub fn d2(d1: f64, vol: f64, time: f64) -> f64 {
        d1 - vol * time.sqrt()
    }

    /// d1 for a set of pricing inputs.
    #[must_use]
    pub fn d1_for(inputs: &PricingInputs, vol: f64) -> f64 {
        Self::d1(
            inputs.spot,
            inputs.strike,
            inputs.risk_free_rate,
            inputs.time_to_maturity,
            vol,
        )
    }

    /// Theoretical call price.
    ///
    /// C = S·N(d1) - K·e^(-rT)·N(d2)
    ///
    /// d2 is derived from the same d1 used in the first term.
    #[must_use]
    pub fn call_price(inputs: &PricingInputs, vol: f64) -> f64 {
        let d1 = Self::d1_for(inputs, vol);
        let d2 = Self::d2(d1, vol, inputs.time_to_maturity);
        let discount = inputs.discount_factor();

        let price =
            inputs.spot * Self::norm_cdf(d1) - inputs.strike * discount * Self::norm_cdf(d2);
        // cancellation deep out of the money can leave a tiny negative value
        price.max(0.0)
    }

    /// Bound on the floating-point error of [`BlackScholes::call_price`].
    ///
    /// The price is the difference of `S·N(d1)` and `K·e^(-rT)·N(d2)`, so its
    /// absolute error scales with the sum of the two terms rather than with the
    /// price itself. Deep in the money the price is mostly intrinsic value and
    /// this error can swamp the time value.
    #[must_use]
    pub fn price_rounding_error(inputs: &PricingInputs, vol: f64) -> f64 {
        let d1 = Self::d1_for(inputs, vol);
        let d2 = Self::d2(d1, vol, inputs.time_to_maturity);
        let asset_leg = inputs.spot * Self::norm_cdf(d1);
        let cash_leg = inputs.strike * inputs.discount_factor() * Self::norm_cdf(d2);

        PRICE_ROUNDING_ULPS * (f64::EPSILON * (asset_leg + cash_leg) + f64::MIN_POSITIVE)
    }

    /// Calculates vega (∂price/∂σ) - sensitivity to volatility.
    ///
    /// Vega = S · N'(d1) · √T
    #[must_use]
    pub fn vega(inputs: &PricingInputs, vol: f64) -> f64 {
        let d1 = Self::d1_for(inputs, vol);
        inputs.spot * Self::norm_pdf(d1) * inputs.time_to_maturity.sqrt()
    }

    /// Calculates delta (∂price/∂S) of the call: N(d1).
    #[must_use]
    pub fn delta(inputs: &PricingInputs, vol: f64) -> f64 {
        Self::norm_cdf(Self::d1_for(inputs, vol))
    }

    /// Calculates gamma (∂²price/∂S²).
    ///
    /// Γ = N'(d1) / (S · σ · √T)
    #[must_use]
    pub fn gamma(inputs: &PricingInputs, vol: f64) -> f64 {
        let d1 = Self::d1_for(inputs, vol);
        Self::norm_pdf(d1) / (inputs.spot * vol * inputs.time_to_maturity.sqrt())
    }

    /// Calculates theta, returned as the price change per calendar day.
    #[must_use]
    pub fn theta(inputs: &PricingInputs, vol: f64) -> f64 {
        let d1 = Self::d1_for(inputs, vol);
        let d2 = Self::d2(d1, vol, inputs.time_to_maturity);
        let sqrt_time = inputs.time_to_maturity.sqrt();

        let decay = -inputs.spot * Self::norm_pdf(d1) * vol / (2.0 * sqrt_time);
        let carry = inputs.risk_free_rate
            * inputs.strike
            * inputs.discount_factor()
            * Self::norm_cdf(d2);

        (decay - carry) / DAYS_PER_YEAR
    }

    /// Calculates rho (∂price/∂r) per unit rate: K·T·e^(-rT)·N(d2).
    #[must_use]
    pub fn rho(inputs: &PricingInputs, vol: f64) -> f64 {
        let d1 = Self::d1_for(inputs, vol);
        let d2 = Self::d2(d1, vol, inputs.time_to_maturity);
        inputs.strike * inputs.time_to_maturity * inputs.discount_factor() * Self::norm_cdf(d2)
    }

    /// All first-order Greeks of the call at once.
    #[must_use]
    pub fn greeks(inputs: &PricingInputs, vol: f64) -> Greeks {
        Greeks {
            delta: Self::delta(inputs, vol),
            gamma: Self::gamma(inputs, vol),
            theta: Self::theta(inputs, vol),
            vega: Self::vega(inputs, vol),
            rho: Self::rho(inputs, vol),
        }
    }
}
