use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::Deposited;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

/// The vault moves the managed asset into the strategy's token account first,
/// then calls deposit to put it to work.
#[derive(Accounts)]
pub struct Deposit<'info> {
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

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>) -> Result<()> {
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let shares = orchestrator::deposit(strategy, &mut host)?;

    emit!(Deposited {
        strategy: strategy.key(),
        shares,
        total_pool_balance: strategy.ledger.total_pool_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
