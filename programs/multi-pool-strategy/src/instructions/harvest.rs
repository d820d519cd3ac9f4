use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::Harvested;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

#[derive(Accounts)]
pub struct Harvest<'info> {
    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.vault.as_ref()],
        bump = strategy.bump,
        has_one = keeper @ StrategyErrorCode::UnauthorizedKeeper
    )]
    pub strategy: Account<'info, Strategy>,

    /// Receives the caller fee
    pub keeper: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

/// Run one harvest cycle. Returns the caller fee paid to the keeper.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.keeper.key();
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let result = orchestrator::harvest(strategy, &mut host, &caller, now)?;

    emit!(Harvested {
        strategy: strategy.key(),
        caller,
        harvested_value: result.harvested_value,
        boost_fraction_bps: result.boost_fraction_bps,
        caller_fee: result.fees.caller_fee,
        treasury_fee: result.fees.treasury_fee,
        strategist_fee: result.fees.strategist_fee,
        boost_payout: result.boost_payout,
        reinvested: result.reinvested,
        timestamp: now,
    });

    msg!(
        "Harvest complete: value={}, fees={}, boost={}, reinvested={}",
        result.harvested_value,
        result.fees.total_fee,
        result.boost_payout,
        result.reinvested
    );
    Ok(result.fees.caller_fee)
}
