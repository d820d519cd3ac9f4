use anchor_lang::prelude::*;

use crate::engine::host::{PoolInfo, StrategyHost};
use crate::engine::ledger::{deposit_to_pool, require_known_pool, withdraw_from_pool};
use crate::engine::orchestrator::stake_idle_want;
use crate::errors::StrategyErrorCode;
use crate::state::Strategy;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolAmount {
    pub pool_id: u32,
    pub amount: u64,
}

/// Ordered withdraw and deposit instructions for one rebalance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    pub withdrawals: Vec<PoolAmount>,
    pub deposits: Vec<PoolAmount>,
}

impl AllocationPlan {
    /// Build a plan from the parallel arrays a keeper submits.
    pub fn from_parallel(
        withdraw_pool_ids: &[u32],
        withdraw_amounts: &[u64],
        deposit_pool_ids: &[u32],
        deposit_amounts: &[u64],
    ) -> Result<Self> {
        require!(
            withdraw_pool_ids.len() == withdraw_amounts.len(),
            StrategyErrorCode::PlanLengthMismatch
        );
        require!(
            deposit_pool_ids.len() == deposit_amounts.len(),
            StrategyErrorCode::PlanLengthMismatch
        );

        let zip = |ids: &[u32], amounts: &[u64]| -> Vec<PoolAmount> {
            ids.iter()
                .zip(amounts)
                .map(|(pool_id, amount)| PoolAmount { pool_id: *pool_id, amount: *amount })
                .collect()
        };

        Ok(AllocationPlan {
            withdrawals: zip(withdraw_pool_ids, withdraw_amounts),
            deposits: zip(deposit_pool_ids, deposit_amounts),
        })
    }
}

/// Keeper-supplied estimate of a pool's next-period yield.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct YieldEstimate {
    pub pool_id: u32,
    pub estimated_yield: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YieldCandidate {
    pub pool_id: u32,
    pub estimated_yield: u64,
    /// Most this pass may deposit into the pool.
    pub cap: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlanOutcome {
    pub withdrawn: u64,
    pub deposited: u64,
    pub skipped_deposits: u32,
}

/// Deposit cap for one greedy pass: `tvl / dilution_factor`, unless the pool
/// pays out in the accounting unit itself. Zero TVL gives a zero cap.
pub fn dilution_cap(info: &PoolInfo, accounting_mint: &Pubkey, dilution_factor: u64) -> u64 {
    if info.reward_token == *accounting_mint {
        return u64::MAX;
    }
    info.total_staked.checked_div(dilution_factor).unwrap_or(0)
}

/// Greedy yield-ranked allocation of `available`.
///
/// Repeatedly picks the highest-yield candidate not yet allocated and fills
/// it up to its cap. Ties go to the candidate scanned first, so callers pass
/// candidates in ascending pool id order.
///
/// # Returns
/// * The deposits in selection order, and whatever could not be placed
pub fn plan_greedy(available: u64, candidates: &[YieldCandidate]) -> (Vec<PoolAmount>, u64) {
    let mut allocated = vec![false; candidates.len()];
    let mut remaining = available;
    let mut deposits = Vec::new();

    while remaining > 0 {
        let mut best: Option<usize> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if allocated[index] || candidate.cap == 0 {
                continue;
            }
            match best {
                Some(current) if candidate.estimated_yield <= candidates[current].estimated_yield => {}
                _ => best = Some(index),
            }
        }
        let Some(index) = best else {
            break;
        };

        allocated[index] = true;
        let amount = remaining.min(candidates[index].cap);
        deposits.push(PoolAmount { pool_id: candidates[index].pool_id, amount });
        remaining -= amount;
    }

    (deposits, remaining)
}

/// Turn yield estimates into capped candidates sorted by pool id. Pools whose
/// reward window has not started yet or has already ended are dropped.
pub fn build_candidates<H: StrategyHost>(
    strategy: &Strategy,
    host: &mut H,
    estimates: &[YieldEstimate],
    now: i64,
) -> Result<Vec<YieldCandidate>> {
    let mut sorted = estimates.to_vec();
    sorted.sort_by_key(|e| e.pool_id);
    require!(
        sorted.windows(2).all(|w| w[0].pool_id != w[1].pool_id),
        StrategyErrorCode::DuplicatePool
    );

    let mut candidates = Vec::with_capacity(sorted.len());
    for estimate in sorted {
        require!(
            strategy.rewards.route(estimate.pool_id).is_some(),
            StrategyErrorCode::PoolNotConfigured
        );
        require_known_pool(host, estimate.pool_id)?;
        let info = host.pool_info(estimate.pool_id)?;
        if info.start_time > now {
            msg!("Pool {} rewards start at {}, skipping", estimate.pool_id, info.start_time);
            continue;
        }
        if info.end_time <= now {
            msg!("Pool {} rewards ended at {}, skipping", estimate.pool_id, info.end_time);
            continue;
        }
        candidates.push(YieldCandidate {
            pool_id: estimate.pool_id,
            estimated_yield: estimate.estimated_yield,
            cap: dilution_cap(&info, &strategy.accounting_mint, strategy.dilution_factor),
        });
    }
    Ok(candidates)
}

/// Apply an explicit plan: every withdrawal in full, then deposits while the
/// freed stake-token balance covers them. The first deposit that does not fit
/// ends the plan; it and the rest are skipped.
pub fn apply_plan<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, plan: &AllocationPlan) -> Result<PlanOutcome> {
    let mut outcome = PlanOutcome::default();

    for withdrawal in &plan.withdrawals {
        withdraw_from_pool(&mut strategy.ledger, host, withdrawal.pool_id, withdrawal.amount)?;
        outcome.withdrawn = outcome
            .withdrawn
            .checked_add(withdrawal.amount)
            .ok_or(StrategyErrorCode::MathOverflow)?;
    }

    stake_idle_want(strategy, host)?;
    let mut available = host.balance_of(&strategy.stake_mint)?;

    for (index, deposit) in plan.deposits.iter().enumerate() {
        require!(
            strategy.rewards.route(deposit.pool_id).is_some(),
            StrategyErrorCode::PoolNotConfigured
        );
        if deposit.amount > available {
            outcome.skipped_deposits = (plan.deposits.len() - index) as u32;
            msg!(
                "Deposit of {} into pool {} exceeds available {}, skipping {} instructions",
                deposit.amount,
                deposit.pool_id,
                available,
                outcome.skipped_deposits
            );
            break;
        }
        deposit_to_pool(&mut strategy.ledger, host, deposit.pool_id, deposit.amount)?;
        available -= deposit.amount;
        outcome.deposited += deposit.amount;
    }

    Ok(outcome)
}

/// Full yield-ranked rebalance: drain every active pool, then greedily
/// reallocate the freed balance. Anything left once every candidate is capped
/// goes to the default pool.
pub fn rebalance_by_yield<H: StrategyHost>(
    strategy: &mut Strategy,
    host: &mut H,
    estimates: &[YieldEstimate],
    now: i64,
) -> Result<PlanOutcome> {
    let candidates = build_candidates(strategy, host, estimates, now)?;

    let withdrawals = strategy
        .ledger
        .active_pools()
        .into_iter()
        .map(|pool_id| PoolAmount { pool_id, amount: strategy.ledger.balance_of(pool_id) })
        .collect::<Vec<_>>();
    let mut outcome = PlanOutcome::default();
    for withdrawal in &withdrawals {
        withdraw_from_pool(&mut strategy.ledger, host, withdrawal.pool_id, withdrawal.amount)?;
        outcome.withdrawn += withdrawal.amount;
    }

    stake_idle_want(strategy, host)?;
    let available = host.balance_of(&strategy.stake_mint)?;
    let (mut deposits, leftover) = plan_greedy(available, &candidates);
    if leftover > 0 {
        require!(
            strategy.rewards.route(strategy.default_pool).is_some(),
            StrategyErrorCode::PoolNotConfigured
        );
        match deposits.iter_mut().find(|d| d.pool_id == strategy.default_pool) {
            Some(existing) => existing.amount += leftover,
            None => deposits.push(PoolAmount { pool_id: strategy.default_pool, amount: leftover }),
        }
    }

    for deposit in &deposits {
        deposit_to_pool(&mut strategy.ledger, host, deposit.pool_id, deposit.amount)?;
        outcome.deposited += deposit.amount;
    }
    msg!(
        "Yield rebalance: withdrew {}, deposited {} across {} pools",
        outcome.withdrawn,
        outcome.deposited,
        deposits.len()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{add_swap_pool, setup, MockHost};

    fn candidate(pool_id: u32, estimated_yield: u64, cap: u64) -> YieldCandidate {
        YieldCandidate { pool_id, estimated_yield, cap }
    }

    fn two_pool_setup() -> (MockHost, Strategy) {
        let (mut host, mut strategy) = setup();
        let reward = Pubkey::new_unique();
        add_swap_pool(&mut strategy, &mut host, 1, reward, 1_000);
        (host, strategy)
    }

    #[test]
    fn test_greedy_fills_highest_yield_first() {
        let candidates = [candidate(0, 10, 500), candidate(1, 30, 200), candidate(2, 20, 1_000)];
        let (deposits, leftover) = plan_greedy(900, &candidates);

        assert_eq!(
            deposits,
            vec![PoolAmount { pool_id: 1, amount: 200 }, PoolAmount { pool_id: 2, amount: 700 }]
        );
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_greedy_tie_goes_to_first_scanned() {
        let candidates = [candidate(3, 50, 100), candidate(5, 50, 100)];
        let (deposits, _) = plan_greedy(150, &candidates);

        assert_eq!(deposits[0].pool_id, 3);
        assert_eq!(deposits[1], PoolAmount { pool_id: 5, amount: 50 });
    }

    #[test]
    fn test_greedy_returns_leftover_when_all_capped() {
        let candidates = [candidate(0, 5, 100), candidate(1, 7, 0)];
        let (deposits, leftover) = plan_greedy(400, &candidates);

        assert_eq!(deposits, vec![PoolAmount { pool_id: 0, amount: 100 }]);
        assert_eq!(leftover, 300);
    }

    #[test]
    fn test_dilution_cap() {
        let accounting = Pubkey::new_unique();
        let mut info = PoolInfo {
            reward_token: Pubkey::new_unique(),
            reward_rate: 1,
            start_time: 0,
            end_time: 100,
            total_staked: 1_000,
        };
        assert_eq!(dilution_cap(&info, &accounting, 5), 200);

        info.total_staked = 0;
        assert_eq!(dilution_cap(&info, &accounting, 5), 0);

        info.reward_token = accounting;
        assert_eq!(dilution_cap(&info, &accounting, 5), u64::MAX);
    }

    #[test]
    fn test_plan_length_mismatch() {
        let result = AllocationPlan::from_parallel(&[0, 1], &[10], &[], &[]);
        assert_eq!(result.unwrap_err(), StrategyErrorCode::PlanLengthMismatch.into());
    }

    #[test]
    fn test_explicit_plan_moves_balance() {
        let (mut host, mut strategy) = two_pool_setup();
        let stake = host.stake;
        host.give(stake, 100);
        deposit_to_pool(&mut strategy.ledger, &mut host, 0, 100).unwrap();

        let plan = AllocationPlan::from_parallel(&[0], &[40], &[1], &[40]).unwrap();
        let outcome = apply_plan(&mut strategy, &mut host, &plan).unwrap();

        assert_eq!(strategy.ledger.balance_of(0), 60);
        assert_eq!(strategy.ledger.balance_of(1), 40);
        assert_eq!(strategy.ledger.total_pool_balance, 100);
        assert_eq!(outcome, PlanOutcome { withdrawn: 40, deposited: 40, skipped_deposits: 0 });
        assert!(strategy.ledger.is_consistent());
    }

    #[test]
    fn test_explicit_plan_exact_balance_empties_pool() {
        let (mut host, mut strategy) = two_pool_setup();
        let stake = host.stake;
        host.give(stake, 100);
        deposit_to_pool(&mut strategy.ledger, &mut host, 0, 100).unwrap();

        let plan = AllocationPlan::from_parallel(&[0], &[100], &[1], &[100]).unwrap();
        apply_plan(&mut strategy, &mut host, &plan).unwrap();

        assert!(!strategy.ledger.is_active(0));
        assert_eq!(strategy.ledger.active, vec![1]);
    }

    #[test]
    fn test_explicit_plan_over_withdraw_fails() {
        let (mut host, mut strategy) = two_pool_setup();
        let stake = host.stake;
        host.give(stake, 100);
        deposit_to_pool(&mut strategy.ledger, &mut host, 0, 100).unwrap();

        let plan = AllocationPlan::from_parallel(&[0], &[101], &[1], &[101]).unwrap();
        assert_eq!(
            apply_plan(&mut strategy, &mut host, &plan).unwrap_err(),
            StrategyErrorCode::InsufficientPoolBalance.into()
        );
    }

    #[test]
    fn test_explicit_plan_skips_unaffordable_deposits() {
        let (mut host, mut strategy) = two_pool_setup();
        let stake = host.stake;
        host.give(stake, 100);
        deposit_to_pool(&mut strategy.ledger, &mut host, 0, 100).unwrap();

        let plan = AllocationPlan::from_parallel(&[0], &[50], &[1, 0, 1], &[30, 30, 10]).unwrap();
        let outcome = apply_plan(&mut strategy, &mut host, &plan).unwrap();

        assert_eq!(outcome.deposited, 30);
        assert_eq!(outcome.skipped_deposits, 2);
        assert_eq!(strategy.ledger.balance_of(1), 30);
        assert_eq!(host.own(&host.stake), 20);
        assert!(strategy.ledger.is_consistent());
    }

    #[test]
    fn test_explicit_plan_stakes_idle_want() {
        let (mut host, mut strategy) = two_pool_setup();
        let want = host.want;
        host.give(want, 25);

        let plan = AllocationPlan::from_parallel(&[], &[], &[1], &[25]).unwrap();
        apply_plan(&mut strategy, &mut host, &plan).unwrap();

        assert_eq!(strategy.ledger.balance_of(1), 25);
        assert_eq!(host.own(&want), 0);
    }

    #[test]
    fn test_yield_rebalance_respects_dilution_cap() {
        let (mut host, mut strategy) = two_pool_setup();
        let stake = host.stake;
        host.give(stake, 500);
        deposit_to_pool(&mut strategy.ledger, &mut host, 0, 500).unwrap();

        // pool 1 has 1000 staked by others, cap = 1000 / 5 = 200
        let estimates = [
            YieldEstimate { pool_id: 1, estimated_yield: 90 },
            YieldEstimate { pool_id: 0, estimated_yield: 10 },
        ];
        let outcome = rebalance_by_yield(&mut strategy, &mut host, &estimates, 0).unwrap();

        assert_eq!(strategy.ledger.balance_of(1), 200);
        assert_eq!(strategy.ledger.balance_of(0), 300);
        assert_eq!(outcome.withdrawn, 500);
        assert_eq!(outcome.deposited, 500);
        assert!(strategy.ledger.is_consistent());
    }

    #[test]
    fn test_yield_rebalance_skips_ended_pools() {
        let (mut host, mut strategy) = two_pool_setup();
        host.pools.get_mut(&1).unwrap().end_time = 10;
        let stake = host.stake;
        host.give(stake, 100);

        let estimates = [YieldEstimate { pool_id: 1, estimated_yield: 90 }];
        rebalance_by_yield(&mut strategy, &mut host, &estimates, 50).unwrap();

        // ended pool is dropped, everything lands in the default pool
        assert_eq!(strategy.ledger.balance_of(1), 0);
        assert_eq!(strategy.ledger.balance_of(0), 100);
    }

    #[test]
    fn test_yield_rebalance_skips_pools_not_started() {
        let (mut host, mut strategy) = two_pool_setup();
        host.pools.get_mut(&1).unwrap().start_time = 100;
        let stake = host.stake;
        host.give(stake, 100);

        let estimates = [YieldEstimate { pool_id: 1, estimated_yield: 90 }];
        rebalance_by_yield(&mut strategy, &mut host, &estimates, 50).unwrap();

        assert_eq!(strategy.ledger.balance_of(1), 0);
        assert_eq!(strategy.ledger.balance_of(0), 100);

        // once the window opens the pool is a candidate again
        rebalance_by_yield(&mut strategy, &mut host, &estimates, 100).unwrap();
        assert_eq!(strategy.ledger.balance_of(1), 100);
    }

    #[test]
    fn test_yield_rebalance_rejects_unknown_pool() {
        let (mut host, mut strategy) = two_pool_setup();
        add_swap_pool(&mut strategy, &mut host, 2, Pubkey::new_unique(), 0);
        host.pools.remove(&2);

        let estimates = [YieldEstimate { pool_id: 2, estimated_yield: 1 }];
        assert_eq!(
            rebalance_by_yield(&mut strategy, &mut host, &estimates, 0).unwrap_err(),
            StrategyErrorCode::UnknownPool.into()
        );
    }

    #[test]
    fn test_yield_rebalance_rejects_duplicates() {
        let (mut host, mut strategy) = two_pool_setup();
        let estimates = [
            YieldEstimate { pool_id: 1, estimated_yield: 1 },
            YieldEstimate { pool_id: 1, estimated_yield: 2 },
        ];
        assert_eq!(
            rebalance_by_yield(&mut strategy, &mut host, &estimates, 0).unwrap_err(),
            StrategyErrorCode::DuplicatePool.into()
        );
    }
}
