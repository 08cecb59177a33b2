//! Gas limit scaling
//!
//! Multiplies an integral gas quantity by a floating point factor and rounds
//! to the nearest integer, half up. The factor is taken apart into its exact
//! binary mantissa and exponent so the product is computed without any
//! floating point rounding, whatever the size of the gas value.

use crate::error::GasError;
use alloy_primitives::{U256, U512};
use num_traits::Float;

/// Right shifts past this round any product of a `U256` and a 53-bit mantissa to zero
const MAX_ROUNDING_SHIFT: usize = 310;

/// Scale `gas` by `multiplier`, rounding half up.
///
/// # Errors
///
/// [`GasError::InvalidMultiplier`] if the multiplier is negative, NaN or
/// infinite; [`GasError::Overflow`] if the result does not fit in a `U256`.
///
/// # Example
///
/// ```
/// use alloy_primitives::U256;
/// use chain_backoff::gas::scale_gas;
///
/// assert_eq!(scale_gas(U256::from(21_000u64), 1.2).unwrap(), U256::from(25_200u64));
/// assert_eq!(scale_gas(U256::from(100u64), 1.5).unwrap(), U256::from(150u64));
/// ```
pub fn scale_gas(gas: U256, multiplier: f64) -> Result<U256, GasError> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(GasError::InvalidMultiplier { multiplier });
    }
    if gas.is_zero() || multiplier == 0.0 {
        return Ok(U256::ZERO);
    }

    // multiplier == mantissa * 2^exponent exactly
    let (mantissa, exponent, _sign) = Float::integer_decode(multiplier);
    let product = U512::from(gas) * U512::from(mantissa);

    let scaled = if exponent >= 0 {
        let (shifted, overflow) = product.overflowing_shl(exponent as usize);
        if overflow {
            return Err(overflow_error(gas, multiplier));
        }
        shifted
    } else {
        let shift = exponent.unsigned_abs() as usize;
        if shift > MAX_ROUNDING_SHIFT {
            return Ok(U256::ZERO);
        }
        let half = U512::from(1u8) << (shift - 1);
        (product + half) >> shift
    };

    if scaled > U512::from(U256::MAX) {
        return Err(overflow_error(gas, multiplier));
    }
    Ok(scaled.to::<U256>())
}

fn overflow_error(gas: U256, multiplier: f64) -> GasError {
    GasError::Overflow {
        gas: gas.to_string(),
        multiplier,
    }
}
