use anchor_lang::prelude::*;

/// Rewards a pool would pay this strategy if claimed now.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingRewards {
    pub reward_amount: u64,
    /// Portion of `reward_amount` earned through boost collateral.
    pub boost_amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolInfo {
    pub reward_token: Pubkey,
    pub reward_rate: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub total_staked: u64,
}

/// Reward program holding the numbered pools. Deposits and withdrawals pay
/// out pending rewards to the strategy as a side effect.
pub trait RewardPools {
    fn pool_deposit(&mut self, pool_id: u32, amount: u64) -> Result<()>;
    fn pool_withdraw(&mut self, pool_id: u32, amount: u64) -> Result<()>;
    fn pending_rewards(&mut self, pool_id: u32) -> Result<PendingRewards>;
    fn pool_info(&mut self, pool_id: u32) -> Result<PoolInfo>;
    /// Returns the whole stake and forfeits pending rewards.
    fn emergency_withdraw(&mut self, pool_id: u32) -> Result<()>;
    fn pool_length(&mut self) -> Result<u32>;
}

/// Staking contract converting the managed asset into stake tokens.
pub trait StakeVault {
    fn enter(&mut self, asset_amount: u64) -> Result<()>;
    fn leave(&mut self, share_amount: u64) -> Result<()>;
    fn shares_for_asset(&mut self, asset_amount: u64) -> Result<u64>;
    fn asset_for_shares(&mut self, share_amount: u64) -> Result<u64>;
}

pub trait SwapRouter {
    /// Swaps along `route` and returns the amount of the last mint received.
    fn swap_exact_in(&mut self, amount_in: u64, min_out: u64, route: &[Pubkey], deadline: i64) -> Result<u64>;
}

pub trait RewardHandler {
    /// Delegated conversion of `amount` of `token` into the accounting unit.
    fn handle(&mut self, handler: &Pubkey, token: &Pubkey, amount: u64) -> Result<()>;
    fn unwrap_derivative(&mut self, derivative: &Pubkey, base: &Pubkey, amount: u64) -> Result<()>;
}

pub trait BoostBeneficiary {
    fn process_rewards(&mut self) -> Result<()>;
    fn mass_unstake(&mut self) -> Result<()>;
}

/// Token balances held by the strategy and outgoing transfers.
pub trait TokenBank {
    fn balance_of(&mut self, mint: &Pubkey) -> Result<u64>;
    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;
}

/// Everything the engine calls out to.
pub trait StrategyHost: RewardPools + StakeVault + SwapRouter + RewardHandler + BoostBeneficiary + TokenBank {}

impl<T> StrategyHost for T where T: RewardPools + StakeVault + SwapRouter + RewardHandler + BoostBeneficiary + TokenBank {}
