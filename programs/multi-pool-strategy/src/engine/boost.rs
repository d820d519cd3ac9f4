use anchor_lang::prelude::*;

use crate::engine::host::RewardPools;
use crate::state::PoolLedger;

/// Add the pool's pending boost to its accrued credit.
///
/// Runs before every deposit, withdraw and claim touching the pool, since
/// each of those pays out pending rewards and would otherwise drop the boost
/// share earned against the pre-mutation balance.
pub fn write_boost_debt<H: RewardPools>(ledger: &mut PoolLedger, host: &mut H, pool_id: u32) -> Result<u64> {
    let pending = host.pending_rewards(pool_id)?;
    if pending.boost_amount == 0 {
        return Ok(ledger.acc_boost_of(pool_id));
    }
    let accrued = ledger.add_boost(pool_id, pending.boost_amount)?;
    msg!("Pool {} boost credit +{} -> {}", pool_id, pending.boost_amount, accrued);
    Ok(accrued)
}

/// Read and zero the pool's accrued boost credit. Called once per pool per
/// harvest, right after its rewards are claimed.
pub fn reset_and_read(ledger: &mut PoolLedger, pool_id: u32) -> u64 {
    ledger.take_boost(pool_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockHost;

    #[test]
    fn test_write_accumulates_pending_boost() {
        let mut host = MockHost::new();
        let reward = Pubkey::new_unique();
        host.add_pool(1, reward, 0);
        host.accrue(1, 100, 15);

        let mut ledger = PoolLedger::default();
        assert_eq!(write_boost_debt(&mut ledger, &mut host, 1).unwrap(), 15);

        // Unclaimed boost is still pending, a second write counts it again;
        // callers always claim right after writing.
        host.accrue(1, 0, 5);
        assert_eq!(write_boost_debt(&mut ledger, &mut host, 1).unwrap(), 35);
    }

    #[test]
    fn test_zero_boost_creates_no_row() {
        let mut host = MockHost::new();
        host.add_pool(2, Pubkey::new_unique(), 0);

        let mut ledger = PoolLedger::default();
        write_boost_debt(&mut ledger, &mut host, 2).unwrap();
        assert!(ledger.position(2).is_none());
    }

    #[test]
    fn test_reset_twice_reads_zero() {
        let mut host = MockHost::new();
        host.add_pool(0, Pubkey::new_unique(), 0);
        host.accrue(0, 40, 8);

        let mut ledger = PoolLedger::default();
        write_boost_debt(&mut ledger, &mut host, 0).unwrap();

        assert_eq!(reset_and_read(&mut ledger, 0), 8);
        assert_eq!(reset_and_read(&mut ledger, 0), 0);
    }

    #[test]
    fn test_pending_rewards_failure_propagates() {
        let mut host = MockHost::new();
        let mut ledger = PoolLedger::default();
        // pool 7 does not exist on the reward program
        assert!(write_boost_debt(&mut ledger, &mut host, 7).is_err());
        assert_eq!(ledger, PoolLedger::default());
    }
}
