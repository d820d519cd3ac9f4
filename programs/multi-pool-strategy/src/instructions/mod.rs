pub mod program_host;

pub mod initialize_strategy;
pub mod configure;

// Vault
pub mod deposit;
pub mod withdraw;
pub mod retire;
pub mod balance_of;

// Keeper
pub mod harvest;
pub mod rebalance;

// Manager
pub mod panic;
pub mod pause;

// Glob re-exports are needed for the Anchor macro to find the account structs.
// Each module keeps its own `handler`.
#[allow(ambiguous_glob_reexports)]
pub use initialize_strategy::*;
#[allow(ambiguous_glob_reexports)]
pub use configure::*;
#[allow(ambiguous_glob_reexports)]
pub use deposit::*;
#[allow(ambiguous_glob_reexports)]
pub use withdraw::*;
#[allow(ambiguous_glob_reexports)]
pub use retire::*;
#[allow(ambiguous_glob_reexports)]
pub use balance_of::*;
#[allow(ambiguous_glob_reexports)]
pub use harvest::*;
#[allow(ambiguous_glob_reexports)]
pub use rebalance::*;
#[allow(ambiguous_glob_reexports)]
pub use panic::*;
#[allow(ambiguous_glob_reexports)]
pub use pause::*;
