use anchor_lang::prelude::*;

use crate::engine::boost::write_boost_debt;
use crate::engine::host::RewardPools;
use crate::errors::StrategyErrorCode;
use crate::state::PoolLedger;

/// Fail unless the reward program has a pool numbered `pool_id`.
pub fn require_known_pool<H: RewardPools>(host: &mut H, pool_id: u32) -> Result<()> {
    require!(pool_id < host.pool_length()?, StrategyErrorCode::UnknownPool);
    Ok(())
}

/// Deposit stake tokens into `pool_id` and book them in the ledger.
///
/// Boost credit is written against the pre-deposit balance first. A failing
/// external deposit fails the whole operation.
pub fn deposit_to_pool<H: RewardPools>(ledger: &mut PoolLedger, host: &mut H, pool_id: u32, amount: u64) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    write_boost_debt(ledger, host, pool_id)?;
    let new_balance = ledger.credit(pool_id, amount)?;
    host.pool_deposit(pool_id, amount)?;

    msg!("Deposited {} into pool {}, balance={}", amount, pool_id, new_balance);
    Ok(())
}

/// Withdraw stake tokens from `pool_id`. A zero amount only claims rewards.
pub fn withdraw_from_pool<H: RewardPools>(ledger: &mut PoolLedger, host: &mut H, pool_id: u32, amount: u64) -> Result<()> {
    require!(amount <= ledger.balance_of(pool_id), StrategyErrorCode::InsufficientPoolBalance);
    write_boost_debt(ledger, host, pool_id)?;
    let new_balance = ledger.debit(pool_id, amount)?;
    host.pool_withdraw(pool_id, amount)?;

    if amount > 0 {
        msg!("Withdrew {} from pool {}, balance={}", amount, pool_id, new_balance);
    }
    Ok(())
}

/// Pull everything out of `pool_id`, forfeiting pending rewards.
pub fn emergency_exit_pool<H: RewardPools>(ledger: &mut PoolLedger, host: &mut H, pool_id: u32) -> Result<u64> {
    host.emergency_withdraw(pool_id)?;
    let cleared = ledger.clear(pool_id);
    msg!("Emergency withdrew {} from pool {}", cleared, pool_id);
    Ok(cleared)
}
