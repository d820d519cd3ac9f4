use anchor_lang::prelude::*;

use crate::engine::host::TokenBank;
use crate::errors::StrategyErrorCode;
use crate::state::{FeeConfig, Strategy};
use crate::utils::apply_bps;

/// How a harvested balance's fee is split. The three shares always sum to
/// `total_fee`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub total_fee: u64,
    pub caller_fee: u64,
    pub treasury_fee: u64,
    pub strategist_fee: u64,
}

/// Split the fee owed on `balance`.
///
/// # Formula
/// total_fee      = balance × total_fee_bps / 10000
/// caller_fee     = total_fee × call_fee_bps / 10000
/// strategist_fee = (total_fee - caller_fee) × strategist_fee_bps / 10000, if a strategist is set
/// treasury_fee   = the remainder
///
/// # Example
/// balance = 1000, total = 500 bps, call = 1000 bps, no strategist
/// total_fee = 50, caller_fee = 5, treasury_fee = 45
pub fn compute_fee_split(balance: u64, fees: &FeeConfig, has_strategist: bool) -> Result<FeeSplit> {
    let total_fee = apply_bps(balance, fees.total_fee_bps)?;
    if total_fee == 0 {
        return Ok(FeeSplit::default());
    }
    let caller_fee = apply_bps(total_fee, fees.call_fee_bps)?;
    let treasury_share = total_fee
        .checked_sub(caller_fee)
        .ok_or(StrategyErrorCode::MathOverflow)?;
    let strategist_fee = if has_strategist {
        apply_bps(treasury_share, fees.strategist_fee_bps)?
    } else {
        0
    };

    Ok(FeeSplit {
        total_fee,
        caller_fee,
        treasury_fee: treasury_share - strategist_fee,
        strategist_fee,
    })
}

/// Charge fees on this harvest's converted value and pay them out.
///
/// Accounting-unit balance that was on hand before the harvest (idle
/// principal when the accounting mint is the managed asset) is not charged.
pub fn charge_fees<H: TokenBank>(
    strategy: &Strategy,
    host: &mut H,
    caller: &Pubkey,
    harvested_value: u64,
) -> Result<FeeSplit> {
    let mint = strategy.accounting_mint;
    let balance = host.balance_of(&mint)?.min(harvested_value);
    let split = compute_fee_split(balance, &strategy.fees, strategy.strategist.is_some())?;
    if split.total_fee == 0 {
        return Ok(split);
    }

    if split.caller_fee > 0 {
        host.transfer(&mint, caller, split.caller_fee)?;
    }
    if split.treasury_fee > 0 {
        host.transfer(&mint, &strategy.treasury, split.treasury_fee)?;
    }
    if let Some(strategist) = strategy.strategist {
        if split.strategist_fee > 0 {
            host.transfer(&mint, &strategist, split.strategist_fee)?;
        }
    }

    msg!(
        "Fees charged on {}: caller={}, treasury={}, strategist={}",
        balance,
        split.caller_fee,
        split.treasury_fee,
        split.strategist_fee
    );
    Ok(split)
}
