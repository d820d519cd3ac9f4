use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::orchestrator;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

#[derive(Accounts)]
pub struct BalanceOf<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.vault.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    pub token_program: Program<'info, Token>,
}

/// Total managed value in managed-asset units.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, BalanceOf<'info>>) -> Result<u64> {
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    orchestrator::balance_of(&ctx.accounts.strategy, &mut host)
}
