use anchor_lang::prelude::*;

use crate::engine::host::StrategyHost;
use crate::errors::StrategyErrorCode;
use crate::state::{RewardHandling, Strategy};
use crate::utils::{boost_fraction_bps, boost_share_of_converted};

/// Boost credit read for a pool at claim time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimedPool {
    pub pool_id: u32,
    pub boost_credit: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Accounting units realized from this harvest's rewards.
    pub harvested_value: u64,
    /// Part of `harvested_value` attributable to boost credit.
    pub boost_value: u64,
    pub boost_fraction_bps: u64,
}

// One entry per distinct reward token; pools sharing a token share its balance
struct TokenGroup<'a> {
    reward_token: Pubkey,
    handling: &'a RewardHandling,
    boost_credit: u64,
}

fn group_by_token<'a>(strategy: &'a Strategy, claimed: &[ClaimedPool]) -> Result<Vec<TokenGroup<'a>>> {
    let mut groups: Vec<TokenGroup<'a>> = Vec::new();
    for claim in claimed {
        let route = strategy
            .rewards
            .route(claim.pool_id)
            .ok_or(StrategyErrorCode::PoolNotConfigured)?;

        match groups.iter_mut().find(|g| g.reward_token == route.reward_token) {
            Some(group) => {
                group.boost_credit = group
                    .boost_credit
                    .checked_add(claim.boost_credit)
                    .ok_or(StrategyErrorCode::MathOverflow)?;
            }
            None => groups.push(TokenGroup {
                reward_token: route.reward_token,
                handling: &route.handling,
                boost_credit: claim.boost_credit,
            }),
        }
    }
    Ok(groups)
}

/// Unwrap a staked-derivative reward into its base mint if it is one.
/// Failure is not an error: the token is then converted as-is.
fn try_unwrap<H: StrategyHost>(strategy: &Strategy, host: &mut H, token: &Pubkey, amount: u64) -> Pubkey {
    let attempt = strategy
        .rewards
        .base_of(token)
        .ok_or_else(|| error!(StrategyErrorCode::NotADerivative))
        .and_then(|base| host.unwrap_derivative(token, &base, amount).map(|_| base));

    match attempt {
        Ok(base) => {
            msg!("Unwrapped {} {} into {}", amount, token, base);
            base
        }
        Err(_) => *token,
    }
}

/// Path that swaps `held` along `route`: from its hop onwards when it lies
/// on the route, otherwise straight into the route's second hop.
fn swap_path(route: &[Pubkey], held: &Pubkey) -> Vec<Pubkey> {
    match route.iter().position(|hop| hop == held) {
        Some(at) => route[at..].to_vec(),
        None => std::iter::once(*held).chain(route.iter().skip(1).copied()).collect(),
    }
}

/// Convert every claimed reward balance into the accounting unit.
///
/// `accounting_baseline` is the accounting-unit balance held before the
/// claims, so rewards paid directly in that unit can be told apart from it.
/// Tokens with a zero balance are skipped.
pub fn convert_rewards<H: StrategyHost>(
    strategy: &Strategy,
    host: &mut H,
    claimed: &[ClaimedPool],
    accounting_baseline: u64,
    now: i64,
) -> Result<Conversion> {
    let accounting = strategy.accounting_mint;
    let groups = group_by_token(strategy, claimed)?;
    let mut conversion = Conversion::default();

    // Rewards already in the accounting unit are measured before any swap adds to it
    if let Some(group) = groups.iter().find(|g| matches!(g.handling, RewardHandling::Passthrough)) {
        let claimed_value = host.balance_of(&accounting)?.saturating_sub(accounting_baseline);
        conversion.harvested_value = claimed_value;
        conversion.boost_value = boost_share_of_converted(claimed_value, group.boost_credit, claimed_value)?;
    }

    for group in groups.iter().filter(|g| !matches!(g.handling, RewardHandling::Passthrough)) {
        let pre_balance = host.balance_of(&group.reward_token)?;
        if pre_balance == 0 {
            msg!("No {} rewards to convert, skipping", group.reward_token);
            continue;
        }
        let before = host.balance_of(&accounting)?;
        let held = try_unwrap(strategy, host, &group.reward_token, pre_balance);

        match group.handling {
            RewardHandling::DirectSwap { route } => {
                let path = swap_path(route, &held);
                let amount = host.balance_of(&held)?;
                // an unwrap straight into the accounting unit leaves nothing to swap
                if amount > 0 && path.len() >= 2 {
                    host.swap_exact_in(amount, 0, &path, now)?;
                }
            }
            RewardHandling::Delegated { handler } => {
                let amount = host.balance_of(&held)?;
                if amount > 0 {
                    host.handle(handler, &held, amount)?;
                }
            }
            RewardHandling::Passthrough => {}
        }

        let converted = host.balance_of(&accounting)?.saturating_sub(before);
        let boosted = boost_share_of_converted(converted, group.boost_credit, pre_balance)?;
        msg!(
            "Converted {} {} via {}: value={}, boost={}",
            pre_balance,
            group.reward_token,
            group.handling.kind_name(),
            converted,
            boosted
        );

        conversion.harvested_value = conversion
            .harvested_value
            .checked_add(converted)
            .ok_or(StrategyErrorCode::MathOverflow)?;
        conversion.boost_value = conversion
            .boost_value
            .checked_add(boosted)
            .ok_or(StrategyErrorCode::MathOverflow)?;
    }

    conversion.boost_fraction_bps = boost_fraction_bps(conversion.boost_value, conversion.harvested_value)?;
    Ok(conversion)
}
