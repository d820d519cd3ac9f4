use anchor_lang::prelude::*;

use crate::constants::MAX_POOLS;
use crate::errors::StrategyErrorCode;

/// Per-pool bookkeeping owned by the strategy.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolPosition {
    pub pool_id: u32,   // 4 bytes - Id assigned by the reward program
    pub balance: u64,   // 8 bytes - Stake tokens deposited by this strategy
    pub acc_boost: u64, // 8 bytes - Boost credit accrued since the last harvest claim
}

impl PoolPosition {
    pub const SIZE: usize = 4 + 8 + 8;
}

/// Table of pool positions plus the active set.
///
/// `positions` is only ever appended to: a pool keeps its row after being
/// drained. `active` lists the pools with a non-zero balance in the order
/// they became active, and `total_pool_balance` is the sum of their balances.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolLedger {
    pub positions: Vec<PoolPosition>,
    pub active: Vec<u32>,
    pub total_pool_balance: u64,
}

impl PoolLedger {
    pub const MAX_SIZE: usize = 4 + MAX_POOLS * PoolPosition::SIZE // positions
    + 4 + MAX_POOLS * 4 // active
    + 8; // total_pool_balance

    pub fn position(&self, pool_id: u32) -> Option<&PoolPosition> {
        self.positions.iter().find(|p| p.pool_id == pool_id)
    }

    pub fn balance_of(&self, pool_id: u32) -> u64 {
        self.position(pool_id).map(|p| p.balance).unwrap_or(0)
    }

    pub fn acc_boost_of(&self, pool_id: u32) -> u64 {
        self.position(pool_id).map(|p| p.acc_boost).unwrap_or(0)
    }

    pub fn is_active(&self, pool_id: u32) -> bool {
        self.active.contains(&pool_id)
    }

    pub fn active_pools(&self) -> Vec<u32> {
        self.active.clone()
    }

    fn position_mut(&mut self, pool_id: u32) -> Result<&mut PoolPosition> {
        if let Some(index) = self.positions.iter().position(|p| p.pool_id == pool_id) {
            return Ok(&mut self.positions[index]);
        }
        require!(self.positions.len() < MAX_POOLS, StrategyErrorCode::TooManyPools);
        self.positions.push(PoolPosition {
            pool_id,
            ..Default::default()
        });
        let last = self.positions.len() - 1;
        Ok(&mut self.positions[last])
    }

    /// Book a deposit into `pool_id`, activating it on its first non-zero balance.
    pub fn credit(&mut self, pool_id: u32, amount: u64) -> Result<u64> {
        let total = self
            .total_pool_balance
            .checked_add(amount)
            .ok_or(StrategyErrorCode::MathOverflow)?;
        let position = self.position_mut(pool_id)?;
        let new_balance = position
            .balance
            .checked_add(amount)
            .ok_or(StrategyErrorCode::MathOverflow)?;
        position.balance = new_balance;
        self.total_pool_balance = total;

        if new_balance > 0 && !self.active.contains(&pool_id) {
            self.active.push(pool_id);
        }
        Ok(new_balance)
    }

    /// Book a withdrawal from `pool_id`, deactivating it once drained.
    pub fn debit(&mut self, pool_id: u32, amount: u64) -> Result<u64> {
        let current = self.balance_of(pool_id);
        require!(amount <= current, StrategyErrorCode::InsufficientPoolBalance);
        if amount == 0 {
            return Ok(current);
        }

        let new_balance = current - amount;
        self.position_mut(pool_id)?.balance = new_balance;
        // Sum of active balances bounds every single balance, so this cannot underflow
        self.total_pool_balance -= amount;

        if new_balance == 0 {
            self.active.retain(|id| *id != pool_id);
        }
        Ok(new_balance)
    }

    /// Drop a pool's balance and boost credit without an external withdraw.
    /// Returns the balance that was written off.
    pub fn clear(&mut self, pool_id: u32) -> u64 {
        let Some(position) = self.positions.iter_mut().find(|p| p.pool_id == pool_id) else {
            return 0;
        };
        let cleared = position.balance;
        position.balance = 0;
        position.acc_boost = 0;
        self.total_pool_balance = self.total_pool_balance.saturating_sub(cleared);
        self.active.retain(|id| *id != pool_id);
        cleared
    }

    pub fn add_boost(&mut self, pool_id: u32, amount: u64) -> Result<u64> {
        let position = self.position_mut(pool_id)?;
        position.acc_boost = position
            .acc_boost
            .checked_add(amount)
            .ok_or(StrategyErrorCode::MathOverflow)?;
        Ok(position.acc_boost)
    }

    pub fn take_boost(&mut self, pool_id: u32) -> u64 {
        match self.positions.iter_mut().find(|p| p.pool_id == pool_id) {
            Some(position) => std::mem::take(&mut position.acc_boost),
            None => 0,
        }
    }

    /// Active-set membership matches non-zero balances and the running total
    /// matches the sum of active balances.
    pub fn is_consistent(&self) -> bool {
        let sum: u128 = self
            .active
            .iter()
            .map(|id| self.balance_of(*id) as u128)
            .sum();
        let membership_ok = self
            .positions
            .iter()
            .all(|p| (p.balance > 0) == self.active.contains(&p.pool_id));
        let no_duplicates = self
            .active
            .iter()
            .enumerate()
            .all(|(i, id)| !self.active[i + 1..].contains(id));

        membership_ok && no_duplicates && sum == self.total_pool_balance as u128
    }
}
