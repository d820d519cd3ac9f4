use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::PausedChanged;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

#[derive(Accounts)]
pub struct SetPaused<'info> {
    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.vault.as_ref()],
        bump = strategy.bump,
        has_one = manager @ StrategyErrorCode::UnauthorizedManager
    )]
    pub strategy: Account<'info, Strategy>,

    pub manager: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

fn emit_paused(strategy: &Account<Strategy>) -> Result<()> {
    emit!(PausedChanged {
        strategy: strategy.key(),
        paused: strategy.paused,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn pause(ctx: Context<SetPaused>) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    orchestrator::pause(strategy)?;
    emit_paused(strategy)
}

/// Resume and redeposit any managed asset left idle while paused.
pub fn unpause<'info>(ctx: Context<'_, '_, 'info, 'info, SetPaused<'info>>) -> Result<()> {
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let redeposited = orchestrator::unpause(strategy, &mut host)?;
    msg!("Unpaused, redeposited {} stake tokens", redeposited);
    emit_paused(strategy)
}
