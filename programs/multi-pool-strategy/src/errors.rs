use anchor_lang::prelude::*;

#[error_code]
pub enum StrategyErrorCode {
    #[msg("Withdraw amount exceeds the tracked pool balance")]
    InsufficientPoolBalance,

    #[msg("External program call failed")]
    ExternalCallFailed,

    #[msg("External program did not return the expected data")]
    MissingReturnData,

    #[msg("No matching token account was supplied")]
    TokenAccountNotFound,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Pool table is full")]
    TooManyPools,

    #[msg("Pool has no reward route configured")]
    PoolNotConfigured,

    #[msg("Swap route is empty, too long or does not end in the expected mint")]
    InvalidRoute,

    #[msg("Passthrough handling requires the reward token to be the accounting mint")]
    InvalidPassthrough,

    #[msg("Derivative table is full")]
    TooManyDerivatives,

    #[msg("Token is not a registered derivative")]
    NotADerivative,

    #[msg("Fee rate exceeds the allowed maximum")]
    InvalidFeeRate,

    #[msg("Provision rate must be at most 10000 bps")]
    InvalidProvisionRate,

    #[msg("Dilution factor must be greater than zero")]
    InvalidDilutionFactor,

    #[msg("Plan pool ids and amounts have different lengths")]
    PlanLengthMismatch,

    #[msg("Duplicate pool in allocation input")]
    DuplicatePool,

    #[msg("Not enough liquidity to cover the withdraw")]
    InsufficientLiquidity,

    #[msg("Strategy is paused")]
    StrategyPaused,

    #[msg("Strategy is not paused")]
    StrategyNotPaused,

    #[msg("Strategy has been panicked and is terminal")]
    StrategyPanicked,

    #[msg("Unauthorized: caller is not the strategy manager")]
    UnauthorizedManager,

    #[msg("Unauthorized: caller is not the strategy keeper")]
    UnauthorizedKeeper,

    #[msg("Unauthorized: caller is not the owning vault")]
    UnauthorizedVault,

    #[msg("Manager, keeper and vault cannot be the default pubkey")]
    InvalidAuthority,

    #[msg("Pool id is not known to the reward pool program")]
    UnknownPool,
}
