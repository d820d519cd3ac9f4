pub mod pool_ledger;
pub mod reward_route;
pub mod strategy;

pub use pool_ledger::*;
pub use reward_route::*;
pub use strategy::*;
