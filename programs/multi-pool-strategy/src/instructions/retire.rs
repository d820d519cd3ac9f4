use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::Retired;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

#[derive(Accounts)]
pub struct Retire<'info> {
    #[account(
        mut,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
        has_one = vault @ StrategyErrorCode::UnauthorizedVault
    )]
    pub strategy: Account<'info, Strategy>,

    pub vault: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Retire<'info>>) -> Result<()> {
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let returned = orchestrator::retire(strategy, &mut host)?;

    emit!(Retired {
        strategy: strategy.key(),
        returned,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
