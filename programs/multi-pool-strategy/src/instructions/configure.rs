use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::*;
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::{FeesUpdated, PoolRouteUpdated};
use crate::instructions::program_host::ProgramHost;
use crate::state::*;

/// Manager-only configuration of an existing strategy.
#[derive(Accounts)]
pub struct Configure<'info> {
    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.vault.as_ref()],
        bump = strategy.bump,
        has_one = manager @ StrategyErrorCode::UnauthorizedManager
    )]
    pub strategy: Account<'info, Strategy>,

    pub manager: Signer<'info>,
}

/// Manager configuration that has to consult the reward pool program.
#[derive(Accounts)]
pub struct ConfigurePool<'info> {
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

pub fn set_fees(ctx: Context<Configure>, fees: FeeConfig) -> Result<()> {
    fees.validate()?;
    let strategy = &mut ctx.accounts.strategy;
    strategy.fees = fees;

    emit!(FeesUpdated {
        strategy: strategy.key(),
        total_fee_bps: fees.total_fee_bps,
        call_fee_bps: fees.call_fee_bps,
        strategist_fee_bps: fees.strategist_fee_bps,
        withdraw_fee_bps: fees.withdraw_fee_bps,
    });
    Ok(())
}

pub fn set_provision_rate(ctx: Context<Configure>, provision_rate_bps: u16) -> Result<()> {
    Strategy::validate_provision_rate(provision_rate_bps)?;
    ctx.accounts.strategy.provision_rate_bps = provision_rate_bps;
    msg!("Provision rate set to {} bps", provision_rate_bps);
    Ok(())
}

pub fn set_dilution_factor(ctx: Context<Configure>, dilution_factor: u64) -> Result<()> {
    Strategy::validate_dilution_factor(dilution_factor)?;
    ctx.accounts.strategy.dilution_factor = dilution_factor;
    msg!("Dilution factor set to {}", dilution_factor);
    Ok(())
}

pub fn set_default_pool(ctx: Context<Configure>, pool_id: u32) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    require!(strategy.rewards.route(pool_id).is_some(), StrategyErrorCode::PoolNotConfigured);
    strategy.default_pool = pool_id;
    msg!("Default pool set to {}", pool_id);
    Ok(())
}

pub fn set_pool_route<'info>(
    ctx: Context<'_, '_, 'info, 'info, ConfigurePool<'info>>,
    route: PoolRewardRoute,
) -> Result<()> {
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;

    let event = PoolRouteUpdated {
        strategy: strategy.key(),
        pool_id: route.pool_id,
        reward_token: route.reward_token,
        handling: route.handling.kind_name().to_string(),
    };
    orchestrator::set_pool_route(strategy, &mut host, route)?;
    emit!(event);
    Ok(())
}

pub fn set_reinvest_route(ctx: Context<Configure>, route: Vec<Pubkey>) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    validate_reinvest_route(&route, &strategy.accounting_mint, &strategy.want_mint)?;
    strategy.reinvest_route = route;
    Ok(())
}

/// Point boost payouts at `beneficiary`, or switch them off with `None`.
pub fn set_boost_beneficiary(
    ctx: Context<Configure>,
    beneficiary: Option<Pubkey>,
    beneficiary_program: Option<Pubkey>,
) -> Result<()> {
    require!(
        beneficiary.is_none() || beneficiary_program.is_some(),
        StrategyErrorCode::InvalidAuthority
    );
    let strategy = &mut ctx.accounts.strategy;
    strategy.boost_beneficiary = beneficiary;
    strategy.programs.boost_beneficiary_program = beneficiary_program;
    msg!("Boost beneficiary set to {:?}", beneficiary);
    Ok(())
}

pub fn set_derivative(ctx: Context<Configure>, derivative_mint: Pubkey, base_mint: Option<Pubkey>) -> Result<()> {
    ctx.accounts
        .strategy
        .rewards
        .set_derivative(derivative_mint, base_mint)?;
    msg!("Derivative {} unwraps into {:?}", derivative_mint, base_mint);
    Ok(())
}

pub fn set_unwrap_program(ctx: Context<Configure>, unwrap_program: Option<Pubkey>) -> Result<()> {
    ctx.accounts.strategy.programs.unwrap_program = unwrap_program;
    Ok(())
}

pub fn set_keeper(ctx: Context<Configure>, keeper: Pubkey) -> Result<()> {
    require!(keeper != Pubkey::default(), StrategyErrorCode::InvalidAuthority);
    ctx.accounts.strategy.keeper = keeper;
    msg!("Keeper set to {}", keeper);
    Ok(())
}

pub fn set_strategist(ctx: Context<Configure>, strategist: Option<Pubkey>) -> Result<()> {
    ctx.accounts.strategy.strategist = strategist;
    msg!("Strategist set to {:?}", strategist);
    Ok(())
}
