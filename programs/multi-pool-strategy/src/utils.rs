use anchor_lang::prelude::*;

use crate::constants::PERCENT_DIVISOR;
use crate::errors::StrategyErrorCode;

// construct_uint! needs core's two-parameter Result, so no prelude in here
mod wide {
    use uint::construct_uint;

    construct_uint! {
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Compute `amount * numerator / denominator` without intermediate overflow.
///
/// A zero denominator short-circuits to zero instead of failing, so callers
/// can feed it raw pool TVLs and harvested totals.
///
/// # Returns
/// * `Result<u64>` - The scaled amount, or `MathOverflow` if the quotient
///   does not fit back into a u64
pub fn mul_div(amount: u64, numerator: u64, denominator: u64) -> Result<u64> {
    if denominator == 0 {
        return Ok(0);
    }
    let result = (amount as u128) * (numerator as u128) / (denominator as u128);
    u64::try_from(result).map_err(|_| error!(StrategyErrorCode::MathOverflow))
}

/// Apply a basis-point rate to an amount (`amount * bps / 10000`).
pub fn apply_bps(amount: u64, bps: u16) -> Result<u64> {
    mul_div(amount, bps as u64, PERCENT_DIVISOR)
}

/// Boost-attributable fraction of a harvest, in basis points.
///
/// `boost_value * 10000 / total_value`, or zero when nothing was harvested.
/// The fraction is capped at 100% since boost credit is a share of the
/// rewards it was accrued against.
pub fn boost_fraction_bps(boost_value: u64, total_value: u64) -> Result<u64> {
    if total_value == 0 {
        return Ok(0);
    }
    Ok(mul_div(boost_value, PERCENT_DIVISOR, total_value)?.min(PERCENT_DIVISOR))
}

/// Amount owed to the boost beneficiary out of a converted balance.
///
/// # Formula
/// payout = balance × boost_fraction × provision_rate / 10000²
///
/// # Example
/// balance = 1000, boost_fraction = 2000 (20%), provision_rate = 5000 (50%)
/// payout = 1000 × 2000 × 5000 / 100_000_000 = 100
pub fn boost_provision(balance: u64, boost_fraction_bps: u64, provision_rate_bps: u16) -> Result<u64> {
    let numerator = U256::from(balance)
        * U256::from(boost_fraction_bps)
        * U256::from(provision_rate_bps);
    let denominator = U256::from(PERCENT_DIVISOR) * U256::from(PERCENT_DIVISOR);
    let payout = numerator / denominator;
    require!(payout <= U256::from(u64::MAX), StrategyErrorCode::MathOverflow);
    Ok(payout.low_u64())
}

/// Per-token share of a converted amount attributable to boost credit.
///
/// The credit is measured in reward-token units against the reward balance
/// held before conversion, so the attributable share of the converted output
/// is `converted × min(credit, pre_balance) / pre_balance`.
pub fn boost_share_of_converted(converted: u64, boost_credit: u64, pre_balance: u64) -> Result<u64> {
    mul_div(converted, boost_credit.min(pre_balance), pre_balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(mul_div(1_000, 5, 0).unwrap(), 0);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // u64::MAX * 2 overflows u64 but the quotient fits
        assert_eq!(mul_div(u64::MAX, 2, 4).unwrap(), u64::MAX / 2);
    }

    #[test]
    fn test_mul_div_overflowing_quotient() {
        let result = mul_div(u64::MAX, 3, 2);
        assert_eq!(result.unwrap_err(), StrategyErrorCode::MathOverflow.into());
    }

    #[test_case(1_000, 500, 50 ; "five percent")]
    #[test_case(1_000, 0, 0 ; "zero rate")]
    #[test_case(1_000, 10_000, 1_000 ; "full rate")]
    #[test_case(9, 1_000, 0 ; "rounds down")]
    fn test_apply_bps(amount: u64, bps: u16, expected: u64) {
        assert_eq!(apply_bps(amount, bps).unwrap(), expected);
    }

    #[test]
    fn test_boost_fraction_zero_harvest() {
        assert_eq!(boost_fraction_bps(200, 0).unwrap(), 0);
    }

    #[test]
    fn test_boost_fraction_twenty_percent() {
        assert_eq!(boost_fraction_bps(200, 1_000).unwrap(), 2_000);
    }

    #[test]
    fn test_boost_fraction_capped() {
        assert_eq!(boost_fraction_bps(5_000, 1_000).unwrap(), PERCENT_DIVISOR);
    }

    #[test]
    fn test_boost_provision_half_of_twenty_percent() {
        // 1000 converted, 20% boost, 50% provision -> 100
        assert_eq!(boost_provision(1_000, 2_000, 5_000).unwrap(), 100);
    }

    #[test]
    fn test_boost_provision_large_balance() {
        let payout = boost_provision(u64::MAX, 10_000, 10_000).unwrap();
        assert_eq!(payout, u64::MAX);
    }

    #[test]
    fn test_u256_holds_products_beyond_u128() {
        let product = U256::from(u64::MAX) * U256::from(u64::MAX) * U256::from(PERCENT_DIVISOR);
        assert!(product > U256::from(u128::MAX));
        assert_eq!(product / U256::from(PERCENT_DIVISOR) / U256::from(u64::MAX), U256::from(u64::MAX));
    }

    #[test]
    fn test_boost_share_caps_credit() {
        // credit larger than the balance it accrued against counts as 100%
        assert_eq!(boost_share_of_converted(500, 80, 40).unwrap(), 500);
        assert_eq!(boost_share_of_converted(500, 10, 40).unwrap(), 125);
        assert_eq!(boost_share_of_converted(500, 10, 0).unwrap(), 0);
    }
}
