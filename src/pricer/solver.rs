//! Newton-Raphson solver for implied volatility calculation.
//!
//! Finds the volatility at which the Black-Scholes call price equals an
//! observed market price. The residual `f(σ) = price(σ) - target` is a closure
//! over fixed [`PricingInputs`], so the only free variable is σ. Analytic vega
//! serves as the derivative.
//!
//! Convergence is judged on the volatility, never on the price difference: a
//! solve stops once the bracket around the root or the last step is narrower
//! than [`SolverConfig::vol_tolerance`]. The root is then checked against the
//! rounding error of the price, since a tiny or mostly intrinsic price can
//! leave many volatilities that reprice to the same floating-point value.

use super::black_scholes::BlackScholes;
use super::error::PricingError;
use super::types::{IVResult, PricingInputs};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Default starting volatility for the solver (20%).
pub const DEFAULT_VOLATILITY_ESTIMATE: f64 = 0.2;

/// Largest Newton step, in volatility units.
const MAX_NEWTON_STEP: f64 = 0.5;

/// Configuration for the Newton-Raphson solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum iterations before giving up.
    pub max_iterations: u32,
    /// Convergence tolerance on the volatility step (absolute, in volatility units).
    pub vol_tolerance: f64,
    /// Largest accepted relative uncertainty of the solved volatility.
    ///
    /// The uncertainty is the price rounding error divided by vega. A root
    /// that is not resolved this well is reported as
    /// [`PricingError::IllConditioned`].
    pub max_relative_error: f64,
    /// Initial volatility guess (default: 0.2 = 20%).
    pub initial_guess: f64,
    /// Minimum IV bound (default: 0.0001 = 0.01%).
    pub min_iv: f64,
    /// Maximum IV bound (default: 5.0 = 500%).
    pub max_iv: f64,
    /// Vega at or below which a bisection step replaces the Newton step.
    pub min_vega: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            vol_tolerance: 1e-10,
            max_relative_error: 1e-6,
            initial_guess: DEFAULT_VOLATILITY_ESTIMATE,
            min_iv: 1e-4,
            max_iv: 5.0,
            min_vega: 1e-10,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance on the volatility step.
    #[must_use]
    pub fn with_vol_tolerance(mut self, vol_tolerance: f64) -> Self {
        self.vol_tolerance = vol_tolerance;
        self
    }

    /// Sets the largest accepted relative uncertainty of the result.
    #[must_use]
    pub fn with_max_relative_error(mut self, max_relative_error: f64) -> Self {
        self.max_relative_error = max_relative_error;
        self
    }

    /// Sets the initial volatility guess.
    #[must_use]
    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    /// Sets the IV bounds.
    #[must_use]
    pub fn with_bounds(mut self, min_iv: f64, max_iv: f64) -> Self {
        self.min_iv = min_iv;
        self.max_iv = max_iv;
        self
    }

    /// Sets the minimum vega below which a Newton step is not taken.
    #[must_use]
    pub fn with_min_vega(mut self, min_vega: f64) -> Self {
        self.min_vega = min_vega;
        self
    }

    /// Checks that the configuration describes a usable solve.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.max_iterations == 0 {
            return Err(PricingError::InvalidParams {
                message: "max_iterations must be at least 1".to_string(),
            });
        }

        if !(self.vol_tolerance.is_finite() && self.vol_tolerance > 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!(
                    "vol_tolerance must be positive, got {}",
                    self.vol_tolerance
                ),
            });
        }

        if !(self.max_relative_error.is_finite() && self.max_relative_error > 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!(
                    "max_relative_error must be positive, got {}",
                    self.max_relative_error
                ),
            });
        }

        if !(self.min_iv.is_finite()
            && self.max_iv.is_finite()
            && self.min_iv > 0.0
            && self.min_iv < self.max_iv)
        {
            return Err(PricingError::InvalidParams {
                message: format!(
                    "volatility bounds must satisfy 0 < min < max, got [{}, {}]",
                    self.min_iv, self.max_iv
                ),
            });
        }

        if !(self.initial_guess.is_finite() && self.initial_guess > 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!(
                    "initial volatility guess must be positive, got {}",
                    self.initial_guess
                ),
            });
        }

        if !(self.min_vega.is_finite() && self.min_vega >= 0.0) {
            return Err(PricingError::InvalidParams {
                message: format!("min_vega must be non-negative, got {}", self.min_vega),
            });
        }

        Ok(())
    }

    /// Deserializes a configuration from JSON and validates it.
    pub fn from_json(data: &str) -> Result<Self, PricingError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String, PricingError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// No-arbitrage interval for a European call price.
///
/// Returns `(max(0, S0 - K·e^(-rT)), S0)`. Any strictly positive volatility
/// prices the call strictly inside this interval.
#[must_use]
pub fn no_arbitrage_bounds(inputs: &PricingInputs) -> (f64, f64) {
    let lower = (inputs.spot - inputs.strike * inputs.discount_factor()).max(0.0);
    (lower, inputs.spot)
}

/// Validates the option inputs and that a positive time to maturity is left.
fn validate_params(inputs: &PricingInputs, config: &SolverConfig) -> Result<(), PricingError> {
    config.validate()?;
    inputs.validate()?;

    if inputs.time_to_maturity <= 0.0 {
        return Err(PricingError::DegenerateInput {
            volatility: config.initial_guess,
            time_to_maturity: inputs.time_to_maturity,
        });
    }

    Ok(())
}

/// Rejects target prices that no volatility can reproduce.
fn validate_target(inputs: &PricingInputs, market_price: f64) -> Result<(), PricingError> {
    if !(market_price.is_finite() && market_price > 0.0) {
        return Err(PricingError::InvalidParams {
            message: format!("market price must be positive, got {market_price}"),
        });
    }

    let (lower, upper) = no_arbitrage_bounds(inputs);
    if market_price <= lower || market_price >= upper {
        return Err(PricingError::PriceOutOfBounds {
            price: market_price,
            lower,
            upper,
        });
    }

    Ok(())
}

/// Returns `Err(VolatilityOutOfBounds)` unless `[min_iv, max_iv]` brackets the root.
///
/// The call price increases with volatility, so the residual must be
/// non-positive at the lower bound and non-negative at the upper one.
fn ensure_bracketed(
    residual: &impl Fn(f64) -> f64,
    config: &SolverConfig,
) -> Result<(), PricingError> {
    let volatility = if residual(config.min_iv) > 0.0 {
        config.min_iv
    } else if residual(config.max_iv) < 0.0 {
        config.max_iv
    } else {
        return Ok(());
    };

    debug!(
        "target not attainable within [{}, {}], nearest bound {}",
        config.min_iv, config.max_iv, volatility
    );
    Err(PricingError::VolatilityOutOfBounds {
        volatility,
        min_bound: config.min_iv,
        max_bound: config.max_iv,
    })
}

/// Accepts a converged volatility only if the price resolves it.
///
/// Any volatility within `price_rounding_error / vega` of the root reprices
/// to the target within rounding, so that ratio is the uncertainty of the
/// result.
fn resolved(
    inputs: &PricingInputs,
    market_price: f64,
    iv: f64,
    iterations: u32,
    config: &SolverConfig,
) -> Result<IVResult, PricingError> {
    let vega = BlackScholes::vega(inputs, iv);
    let uncertainty = BlackScholes::price_rounding_error(inputs, iv) / vega;

    // a zero vega gives an infinite uncertainty
    if uncertainty.is_nan() || uncertainty > config.max_relative_error * iv {
        warn!(
            "implied volatility for target {:.6e} is ill-conditioned: iv {:.8} +/- {:.3e}",
            market_price, iv, uncertainty
        );
        return Err(PricingError::IllConditioned {
            volatility: iv,
            uncertainty,
        });
    }

    let residual = BlackScholes::call_price(inputs, iv) - market_price;
    debug!(
        "implied volatility converged to {:.8} after {} iterations",
        iv, iterations
    );
    Ok(IVResult::new(iv, market_price, iterations, residual))
}

/// Solves for implied volatility using Newton-Raphson method.
///
/// The Newton-Raphson method iteratively refines the IV estimate using:
/// σ_{n+1} = σ_n - (BS(σ_n) - market_price) / vega(σ_n)
///
/// Every evaluated point tightens a bracket `[lo, hi]` around the root,
/// starting from `[config.min_iv, config.max_iv]`. A Newton step is taken
/// only when vega exceeds `config.min_vega`, the damped step (at most 0.5)
/// lands strictly inside the bracket and the steps are still halving;
/// otherwise the bracket is bisected. The solve converges once
/// the step falls below `config.vol_tolerance`.
///
/// # Arguments
/// - `inputs`: Spot, strike, time to maturity and rate
/// - `market_price`: Observed market price to match
/// - `config`: Solver configuration
///
/// # Returns
/// - `Ok(IVResult)`: Converged IV with iteration count and final residual
/// - `Err(PricingError)`: Invalid or degenerate inputs, a target outside the
///   no-arbitrage bounds or the volatility bounds, a root the price does not
///   resolve ([`PricingError::IllConditioned`]) or
///   [`PricingError::SolverNonConvergence`]
///
/// # Example
/// ```
/// use bsm_implied_vol::pricer::{BlackScholes, PricingInputs, SolverConfig, solve_iv};
///
/// let inputs = PricingInputs::new(100.0, 100.0, 1.0, 0.05);
/// let market_price = BlackScholes::call_price(&inputs, 0.2);
///
/// let result = solve_iv(&inputs, market_price, &SolverConfig::default()).unwrap();
/// assert!((result.iv - 0.2).abs() < 1e-6);
/// ```
pub fn solve_iv(
    inputs: &PricingInputs,
    market_price: f64,
    config: &SolverConfig,
) -> Result<IVResult, PricingError> {
    validate_params(inputs, config)?;
    validate_target(inputs, market_price)?;

    let residual = |vol: f64| BlackScholes::call_price(inputs, vol) - market_price;
    ensure_bracketed(&residual, config)?;

    let mut lo = config.min_iv;
    let mut hi = config.max_iv;
    let mut iv = config.initial_guess.clamp(lo, hi);
    let mut step = hi - lo;
    let mut previous_step = step;

    for iteration in 0..config.max_iterations {
        let diff = residual(iv);
        let vega = BlackScholes::vega(inputs, iv);
        trace!(
            "newton iteration {}: iv={:.10} diff={:.3e} vega={:.3e}",
            iteration, iv, diff, vega
        );

        if diff == 0.0 {
            return resolved(inputs, market_price, iv, iteration + 1, config);
        }

        if diff < 0.0 {
            lo = iv;
        } else {
            hi = iv;
        }

        // Newton only while vega is usable and the steps keep halving
        let newton_allowed =
            vega > config.min_vega && (2.0 * diff).abs() <= (previous_step * vega).abs();
        let newton = if newton_allowed {
            let raw = diff / vega;
            let damped = raw.clamp(-MAX_NEWTON_STEP, MAX_NEWTON_STEP);
            let next = iv - damped;
            (next > lo && next < hi).then_some((damped, next))
        } else {
            None
        };

        previous_step = step;
        match newton {
            Some((damped, next)) => {
                step = damped;
                iv = next;
            }
            None => {
                step = 0.5 * (hi - lo);
                iv = lo + step;
            }
        }

        if step.abs() < config.vol_tolerance {
            return resolved(inputs, market_price, iv, iteration + 1, config);
        }
    }

    warn!(
        "implied volatility solve for target {:.6} did not converge after {} iterations, last iv {:.6}",
        market_price, config.max_iterations, iv
    );
    Err(PricingError::SolverNonConvergence {
        iterations: config.max_iterations,
        last_volatility: iv,
    })
}

/// Solves for IV using bisection on `[config.min_iv, config.max_iv]`.
///
/// Slower than Newton-Raphson but converges whenever the target is bracketed
/// by the prices at the two bounds. Stops once the bracket is narrower than
/// `config.vol_tolerance`.
///
/// # Returns
/// - `Ok(IVResult)`: Converged IV
/// - `Err(PricingError::VolatilityOutOfBounds)`: Target not bracketed
/// - `Err(PricingError::IllConditioned)`: Root not resolved by the price
/// - `Err(PricingError::SolverNonConvergence)`: Budget exhausted
pub fn solve_iv_bisection(
    inputs: &PricingInputs,
    market_price: f64,
    config: &SolverConfig,
) -> Result<IVResult, PricingError> {
    validate_params(inputs, config)?;
    validate_target(inputs, market_price)?;

    let residual = |vol: f64| BlackScholes::call_price(inputs, vol) - market_price;
    ensure_bracketed(&residual, config)?;

    let mut low = config.min_iv;
    let mut high = config.max_iv;

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (low + high);
        let diff = residual(mid);
        trace!("bisection iteration {}: iv={:.10} diff={:.3e}", iteration, mid, diff);

        if diff > 0.0 {
            high = mid;
        } else {
            low = mid;
        }

        if diff == 0.0 || (high - low) < config.vol_tolerance {
            return resolved(inputs, market_price, mid, iteration + 1, config);
        }
    }

    let last = 0.5 * (low + high);
    warn!(
        "bisection for target {:.6} did not converge after {} iterations",
        market_price, config.max_iterations
    );
    Err(PricingError::SolverNonConvergence {
        iterations: config.max_iterations,
        last_volatility: last,
    })
}
