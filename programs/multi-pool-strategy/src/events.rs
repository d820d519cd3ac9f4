use anchor_lang::prelude::*;

#[event]
pub struct StrategyInitialized {
    pub strategy: Pubkey,
    pub vault: Pubkey,
    pub want_mint: Pubkey,
    pub accounting_mint: Pubkey,
    pub default_pool: u32,
    pub timestamp: i64,
}

#[event]
pub struct Deposited {
    pub strategy: Pubkey,
    /// Stake tokens placed in the default pool
    pub shares: u64,
    pub total_pool_balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct Withdrawn {
    pub strategy: Pubkey,
    pub requested: u64,
    /// Managed asset sent to the vault, after the withdraw fee
    pub paid: u64,
    pub total_pool_balance: u64,
    pub timestamp: i64,
}

/// Emitted at the end of every successful harvest cycle
#[event]
pub struct Harvested {
    pub strategy: Pubkey,
    pub caller: Pubkey,
    /// Accounting units realized from rewards
    pub harvested_value: u64,
    pub boost_fraction_bps: u64,
    pub caller_fee: u64,
    pub treasury_fee: u64,
    pub strategist_fee: u64,
    pub boost_payout: u64,
    pub reinvested: u64,
    pub timestamp: i64,
}

#[event]
pub struct Rebalanced {
    pub strategy: Pubkey,
    pub withdrawn: u64,
    pub deposited: u64,
    pub skipped_deposits: u32,
    pub yield_ranked: bool,
    pub timestamp: i64,
}

#[event]
pub struct Panicked {
    pub strategy: Pubkey,
    pub recovered: u64,
    pub timestamp: i64,
}

#[event]
pub struct Retired {
    pub strategy: Pubkey,
    pub returned: u64,
    pub timestamp: i64,
}

#[event]
pub struct PausedChanged {
    pub strategy: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct FeesUpdated {
    pub strategy: Pubkey,
    pub total_fee_bps: u16,
    pub call_fee_bps: u16,
    pub strategist_fee_bps: u16,
    pub withdraw_fee_bps: u16,
}

#[event]
pub struct PoolRouteUpdated {
    pub strategy: Pubkey,
    pub pool_id: u32,
    pub reward_token: Pubkey,
    /// Handling kind, e.g. "passthrough"
    pub handling: String,
}
