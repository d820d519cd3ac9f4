use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::StrategyErrorCode;
use crate::state::{PoolLedger, RewardRoutes};

/// Fee rates, all in basis points.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeConfig {
    pub total_fee_bps: u16,      // Share of harvested value taken as fees
    pub call_fee_bps: u16,       // Share of the total fee paid to the harvest caller
    pub strategist_fee_bps: u16, // Share of the treasury fee paid to the strategist
    pub withdraw_fee_bps: u16,   // Kept by the strategy on vault withdraws
}

impl FeeConfig {
    pub const SIZE: usize = 2 + 2 + 2 + 2;

    pub fn validate(&self) -> Result<()> {
        require!(self.total_fee_bps <= MAX_TOTAL_FEE_BPS, StrategyErrorCode::InvalidFeeRate);
        require!(self.call_fee_bps <= MAX_CALL_FEE_BPS, StrategyErrorCode::InvalidFeeRate);
        require!(self.strategist_fee_bps <= MAX_STRATEGIST_FEE_BPS, StrategyErrorCode::InvalidFeeRate);
        require!(self.withdraw_fee_bps <= MAX_WITHDRAW_FEE_BPS, StrategyErrorCode::InvalidFeeRate);
        Ok(())
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        FeeConfig {
            total_fee_bps: DEFAULT_TOTAL_FEE_BPS,           // 4.5% of harvested value
            call_fee_bps: DEFAULT_CALL_FEE_BPS,             // 10% of fees to the caller
            strategist_fee_bps: DEFAULT_STRATEGIST_FEE_BPS, // 25% of treasury share
            withdraw_fee_bps: DEFAULT_WITHDRAW_FEE_BPS,     // 0.1%
        }
    }
}

/// External programs the strategy calls into.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalPrograms {
    pub reward_pool_program: Pubkey,
    pub stake_program: Pubkey,
    pub swap_program: Pubkey,
    pub unwrap_program: Option<Pubkey>,
    pub boost_beneficiary_program: Option<Pubkey>,
}

impl ExternalPrograms {
    pub const SIZE: usize = 32 + 32 + 32 + 33 + 33;
}

#[account]
#[derive(Debug)]
pub struct Strategy {
    pub vault: Pubkey,                       // 32 bytes - Vault allowed to deposit/withdraw
    pub manager: Pubkey,                     // 32 bytes - Configuration authority
    pub keeper: Pubkey,                      // 32 bytes - Harvest/rebalance authority
    pub treasury: Pubkey,                    // 32 bytes - Treasury fee recipient
    pub strategist: Option<Pubkey>,          // 33 bytes - Strategist fee recipient
    pub boost_beneficiary: Option<Pubkey>,   // 33 bytes - Boost collateral staking account
    pub want_mint: Pubkey,                   // 32 bytes - Managed asset
    pub stake_mint: Pubkey,                  // 32 bytes - Stake token deposited into pools
    pub accounting_mint: Pubkey,             // 32 bytes - Common unit rewards convert into
    pub programs: ExternalPrograms,
    pub fees: FeeConfig,
    pub provision_rate_bps: u16,             // 2 bytes - Boost share paid to the beneficiary
    pub dilution_factor: u64,                // 8 bytes - Max pool share is tvl / factor
    pub default_pool: u32,                   // 4 bytes - Pool that receives new deposits
    pub reinvest_route: Vec<Pubkey>,         // Accounting mint -> want mint
    pub ledger: PoolLedger,
    pub rewards: RewardRoutes,
    pub last_harvest_timestamp: i64,         // 8 bytes
    pub total_harvested: u64,                // 8 bytes - Lifetime value in accounting units
    pub total_fees_charged: u64,             // 8 bytes
    pub total_boost_paid: u64,               // 8 bytes
    pub paused: bool,                        // 1 byte
    pub panicked: bool,                      // 1 byte - Terminal after panic()
    pub bump: u8,                            // 1 byte - PDA bump seed
}

impl Strategy {
    pub const MAX_SIZE: usize = 8
    + 32 // vault
    + 32 // manager
    + 32 // keeper
    + 32 // treasury
    + 33 // strategist
    + 33 // boost_beneficiary
    + 32 // want_mint
    + 32 // stake_mint
    + 32 // accounting_mint
    + ExternalPrograms::SIZE
    + FeeConfig::SIZE
    + 2 // provision_rate_bps
    + 8 // dilution_factor
    + 4 // default_pool
    + 4 + 32 * MAX_ROUTE_LEN // reinvest_route
    + PoolLedger::MAX_SIZE
    + RewardRoutes::MAX_SIZE
    + 8 // last_harvest_timestamp
    + 8 // total_harvested
    + 8 // total_fees_charged
    + 8 // total_boost_paid
    + 1 // paused
    + 1 // panicked
    + 1; // bump

    pub fn validate_provision_rate(rate: u16) -> Result<()> {
        require!(rate as u64 <= PERCENT_DIVISOR, StrategyErrorCode::InvalidProvisionRate);
        Ok(())
    }

    pub fn validate_dilution_factor(factor: u64) -> Result<()> {
        require!(factor > 0, StrategyErrorCode::InvalidDilutionFactor);
        Ok(())
    }

    pub fn require_live(&self) -> Result<()> {
        require!(!self.panicked, StrategyErrorCode::StrategyPanicked);
        require!(!self.paused, StrategyErrorCode::StrategyPaused);
        Ok(())
    }

    /// Run `op` against a working copy and keep its effects only on success.
    pub fn atomically<T>(&mut self, op: impl FnOnce(&mut Strategy) -> Result<T>) -> Result<T> {
        let mut working = self.clone();
        let out = op(&mut working)?;
        *self = working;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fees_are_valid() {
        assert!(FeeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_fee_caps() {
        let too_high = FeeConfig { total_fee_bps: MAX_TOTAL_FEE_BPS + 1, ..Default::default() };
        assert_eq!(too_high.validate().unwrap_err(), StrategyErrorCode::InvalidFeeRate.into());

        let withdraw_too_high = FeeConfig { withdraw_fee_bps: MAX_WITHDRAW_FEE_BPS + 1, ..Default::default() };
        assert!(withdraw_too_high.validate().is_err());
    }

    #[test]
    fn test_provision_and_dilution_bounds() {
        assert!(Strategy::validate_provision_rate(10_000).is_ok());
        assert!(Strategy::validate_provision_rate(10_001).is_err());
        assert_eq!(
            Strategy::validate_dilution_factor(0).unwrap_err(),
            StrategyErrorCode::InvalidDilutionFactor.into()
        );
    }

    #[test]
    fn test_account_fits_in_single_allocation() {
        // 10 KiB is the CPI account-creation limit
        assert!(Strategy::MAX_SIZE <= 10_240);
    }
}
