use anchor_lang::prelude::*;

#[constant]
pub const STRATEGY_SEED: &[u8] = b"strategy";

// Fee and rate configuration (basis points)
pub const PERCENT_DIVISOR: u64 = 10_000;
pub const MAX_TOTAL_FEE_BPS: u16 = 1_000;       // 10% of harvested value
pub const MAX_CALL_FEE_BPS: u16 = 10_000;       // share of the total fee
pub const MAX_STRATEGIST_FEE_BPS: u16 = 5_000;  // share of the treasury fee
pub const MAX_WITHDRAW_FEE_BPS: u16 = 10;       // 0.1%

pub const DEFAULT_TOTAL_FEE_BPS: u16 = 450;
pub const DEFAULT_CALL_FEE_BPS: u16 = 1_000;
pub const DEFAULT_STRATEGIST_FEE_BPS: u16 = 2_500;
pub const DEFAULT_WITHDRAW_FEE_BPS: u16 = 10;
pub const DEFAULT_PROVISION_RATE_BPS: u16 = 5_000;
pub const DEFAULT_DILUTION_FACTOR: u64 = 5;

/// Shortfall tolerated between a requested withdraw and what could be freed.
pub const WITHDRAW_DUST: u64 = 10;

// Table capacities
pub const MAX_POOLS: usize = 16;
pub const MAX_ROUTE_LEN: usize = 4;
pub const MAX_DERIVATIVES: usize = 4;
