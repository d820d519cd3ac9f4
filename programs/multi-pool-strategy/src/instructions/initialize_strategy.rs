use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::StrategyErrorCode;
use crate::events::StrategyInitialized;
use crate::state::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeStrategyParams {
    pub manager: Pubkey,
    pub keeper: Pubkey,
    pub treasury: Pubkey,
    pub strategist: Option<Pubkey>,
    pub want_mint: Pubkey,
    pub stake_mint: Pubkey,
    pub accounting_mint: Pubkey,
    pub programs: ExternalPrograms,
    /// Reward route of the pool that receives deposits.
    pub default_route: PoolRewardRoute,
    /// Accounting mint -> want mint. Empty when they are the same mint.
    pub reinvest_route: Vec<Pubkey>,
}

impl InitializeStrategyParams {
    /// Validate and build the initial strategy state with default fees and rates.
    pub fn into_strategy(self, vault: Pubkey, bump: u8) -> Result<Strategy> {
        for authority in [vault, self.manager, self.keeper, self.treasury] {
            require!(authority != Pubkey::default(), StrategyErrorCode::InvalidAuthority);
        }
        self.default_route.validate(&self.accounting_mint)?;
        if self.accounting_mint != self.want_mint {
            validate_reinvest_route(&self.reinvest_route, &self.accounting_mint, &self.want_mint)?;
        }

        let mut rewards = RewardRoutes::default();
        let default_pool = self.default_route.pool_id;
        rewards.upsert(self.default_route)?;

        Ok(Strategy {
            vault,
            manager: self.manager,
            keeper: self.keeper,
            treasury: self.treasury,
            strategist: self.strategist,
            boost_beneficiary: None,
            want_mint: self.want_mint,
            stake_mint: self.stake_mint,
            accounting_mint: self.accounting_mint,
            programs: self.programs,
            fees: FeeConfig::default(),
            provision_rate_bps: DEFAULT_PROVISION_RATE_BPS,
            dilution_factor: DEFAULT_DILUTION_FACTOR,
            default_pool,
            reinvest_route: self.reinvest_route,
            ledger: PoolLedger::default(),
            rewards,
            last_harvest_timestamp: 0,
            total_harvested: 0,
            total_fees_charged: 0,
            total_boost_paid: 0,
            paused: false,
            panicked: false,
            bump,
        })
    }
}

#[derive(Accounts)]
pub struct InitializeStrategy<'info> {
    #[account(
        init,
        payer = payer,
        space = Strategy::MAX_SIZE,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Vault authority, only recorded; it signs deposits and withdraws later
    pub vault: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeStrategy>, params: InitializeStrategyParams) -> Result<()> {
    let vault = ctx.accounts.vault.key();
    msg!("Initializing strategy for vault {}", vault);

    let state = params.into_strategy(vault, ctx.bumps.strategy)?;
    let strategy = &mut ctx.accounts.strategy;
    strategy.set_inner(state);

    emit!(StrategyInitialized {
        strategy: strategy.key(),
        vault,
        want_mint: strategy.want_mint,
        accounting_mint: strategy.accounting_mint,
        default_pool: strategy.default_pool,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!(
        "Strategy initialized: want={}, accounting={}, default_pool={}",
        strategy.want_mint,
        strategy.accounting_mint,
        strategy.default_pool
    );
    Ok(())
}
