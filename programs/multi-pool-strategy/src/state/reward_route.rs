use anchor_lang::prelude::*;

use crate::constants::{MAX_DERIVATIVES, MAX_POOLS, MAX_ROUTE_LEN};
use crate::errors::StrategyErrorCode;

/// How a pool's reward token is turned into the accounting unit.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RewardHandling {
    /// Swap through the router along `route` (first mint in, last mint out).
    DirectSwap { route: Vec<Pubkey> },
    /// Hand the balance to an external handler program.
    Delegated { handler: Pubkey },
    /// Reward is already paid in the accounting unit.
    Passthrough,
}

impl RewardHandling {
    pub const MAX_SIZE: usize = 1 + 4 + 32 * MAX_ROUTE_LEN; // largest variant is DirectSwap

    pub fn kind_name(&self) -> &'static str {
        match self {
            RewardHandling::DirectSwap { .. } => "direct swap",
            RewardHandling::Delegated { .. } => "delegated",
            RewardHandling::Passthrough => "passthrough",
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolRewardRoute {
    pub pool_id: u32,            // 4 bytes
    pub reward_token: Pubkey,    // 32 bytes - Mint the pool pays out
    pub handling: RewardHandling,
}

impl PoolRewardRoute {
    pub const MAX_SIZE: usize = 4 + 32 + RewardHandling::MAX_SIZE;

    pub fn validate(&self, accounting_mint: &Pubkey) -> Result<()> {
        match &self.handling {
            RewardHandling::DirectSwap { route } => {
                require!(route.first() == Some(&self.reward_token), StrategyErrorCode::InvalidRoute);
                validate_route(route, accounting_mint)
            }
            RewardHandling::Delegated { handler } => {
                require!(*handler != Pubkey::default(), StrategyErrorCode::InvalidRoute);
                Ok(())
            }
            RewardHandling::Passthrough => {
                require_keys_eq!(self.reward_token, *accounting_mint, StrategyErrorCode::InvalidPassthrough);
                Ok(())
            }
        }
    }
}

/// A swap route must hop at least once and end in `output_mint`.
pub fn validate_route(route: &[Pubkey], output_mint: &Pubkey) -> Result<()> {
    require!(
        route.len() >= 2 && route.len() <= MAX_ROUTE_LEN,
        StrategyErrorCode::InvalidRoute
    );
    require!(route.last() == Some(output_mint), StrategyErrorCode::InvalidRoute);
    Ok(())
}

/// Route from the accounting unit back into the managed asset.
pub fn validate_reinvest_route(route: &[Pubkey], accounting_mint: &Pubkey, want_mint: &Pubkey) -> Result<()> {
    require!(route.first() == Some(accounting_mint), StrategyErrorCode::InvalidRoute);
    validate_route(route, want_mint)
}

/// Staked-derivative reward token and the base mint it unwraps into.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivativeMapping {
    pub derivative_mint: Pubkey,
    pub base_mint: Pubkey,
}

impl DerivativeMapping {
    pub const SIZE: usize = 32 + 32;
}

/// Per-pool reward routes and the derivative table, keyed by pool id / mint.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardRoutes {
    pub routes: Vec<PoolRewardRoute>,
    pub derivatives: Vec<DerivativeMapping>,
}

impl RewardRoutes {
    pub const MAX_SIZE: usize = 4 + MAX_POOLS * PoolRewardRoute::MAX_SIZE
    + 4 + MAX_DERIVATIVES * DerivativeMapping::SIZE;

    pub fn route(&self, pool_id: u32) -> Option<&PoolRewardRoute> {
        self.routes.iter().find(|r| r.pool_id == pool_id)
    }

    pub fn upsert(&mut self, route: PoolRewardRoute) -> Result<()> {
        if let Some(existing) = self.routes.iter_mut().find(|r| r.pool_id == route.pool_id) {
            *existing = route;
            return Ok(());
        }
        require!(self.routes.len() < MAX_POOLS, StrategyErrorCode::TooManyPools);
        self.routes.push(route);
        Ok(())
    }

    pub fn set_derivative(&mut self, derivative_mint: Pubkey, base_mint: Option<Pubkey>) -> Result<()> {
        self.derivatives.retain(|d| d.derivative_mint != derivative_mint);
        if let Some(base_mint) = base_mint {
            require!(self.derivatives.len() < MAX_DERIVATIVES, StrategyErrorCode::TooManyDerivatives);
            self.derivatives.push(DerivativeMapping { derivative_mint, base_mint });
        }
        Ok(())
    }

    pub fn base_of(&self, derivative_mint: &Pubkey) -> Option<Pubkey> {
        self.derivatives
            .iter()
            .find(|d| d.derivative_mint == *derivative_mint)
            .map(|d| d.base_mint)
    }
}
