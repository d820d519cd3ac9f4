use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::Panicked;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

#[derive(Accounts)]
pub struct Panic<'info> {
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

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Panic<'info>>) -> Result<()> {
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let recovered = orchestrator::panic(strategy, &mut host)?;

    emit!(Panicked {
        strategy: strategy.key(),
        recovered,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
