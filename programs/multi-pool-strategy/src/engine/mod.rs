//! Strategy core: ledger, boost accrual, reward conversion, fee split,
//! allocation and the harvest cycle. Everything here talks to the outside
//! world through the traits in [`host`].

pub mod allocation;
pub mod boost;
pub mod converter;
pub mod fees;
pub mod host;
pub mod ledger;
pub mod orchestrator;

#[cfg(test)]
pub mod mock;
