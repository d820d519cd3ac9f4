use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hash;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::constants::STRATEGY_SEED;
use crate::engine::host::*;
use crate::errors::StrategyErrorCode;
use crate::state::{ExternalPrograms, Strategy};

/// Collaborators reached through CPI.
///
/// Every account an external program needs is passed in
/// `remaining_accounts`: the programs themselves, their state accounts, the
/// strategy's token accounts and the token accounts of payout recipients.
/// The strategy PDA signs each call.
pub struct ProgramHost<'a, 'info> {
    strategy: AccountInfo<'info>,
    vault: Pubkey,
    bump: [u8; 1],
    programs: ExternalPrograms,
    token_program: AccountInfo<'info>,
    accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> ProgramHost<'a, 'info> {
    pub fn new(
        strategy: &Account<'info, Strategy>,
        token_program: AccountInfo<'info>,
        accounts: &'a [AccountInfo<'info>],
    ) -> Self {
        ProgramHost {
            strategy: strategy.to_account_info(),
            vault: strategy.vault,
            bump: [strategy.bump],
            programs: strategy.programs,
            token_program,
            accounts,
        }
    }

    fn seeds(&self) -> [&[u8]; 3] {
        [STRATEGY_SEED, self.vault.as_ref(), &self.bump]
    }

    /// Call an Anchor instruction `name` on `program_id` with borsh-encoded `args`.
    fn invoke(&self, program_id: Pubkey, name: &str, args: impl AnchorSerialize) -> Result<()> {
        let mut data = hash(format!("global:{name}").as_bytes()).to_bytes()[..8].to_vec();
        args.serialize(&mut data)
            .map_err(|_| error!(StrategyErrorCode::ExternalCallFailed))?;

        let strategy_key = self.strategy.key();
        let mut metas = vec![AccountMeta::new_readonly(strategy_key, true)];
        metas.extend(
            self.accounts
                .iter()
                .filter(|acc| acc.key != &strategy_key)
                .map(|acc| AccountMeta {
                    pubkey: *acc.key,
                    is_signer: acc.is_signer,
                    is_writable: acc.is_writable,
                }),
        );
        let mut infos = Vec::with_capacity(self.accounts.len() + 1);
        infos.push(self.strategy.clone());
        infos.extend_from_slice(self.accounts);

        let ix = Instruction {
            program_id,
            accounts: metas,
            data,
        };
        let seeds = self.seeds();
        invoke_signed(&ix, &infos, &[&seeds[..]])?;
        Ok(())
    }

    /// Like `invoke`, then decode the callee's return data.
    fn view<T: AnchorDeserialize>(&self, program_id: Pubkey, name: &str, args: impl AnchorSerialize) -> Result<T> {
        self.invoke(program_id, name, args)?;
        let (returned_by, data) = get_return_data().ok_or(StrategyErrorCode::MissingReturnData)?;
        require_keys_eq!(returned_by, program_id, StrategyErrorCode::MissingReturnData);
        T::try_from_slice(&data).map_err(|_| error!(StrategyErrorCode::MissingReturnData))
    }

    /// Token account for (`owner`, `mint`) among the remaining accounts, with its current amount.
    fn token_account(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Option<(&'a AccountInfo<'info>, u64)>> {
        for info in self.accounts {
            if info.owner != &token::ID {
                continue;
            }
            let data = info.try_borrow_data()?;
            let Ok(account) = TokenAccount::try_deserialize(&mut &data[..]) else {
                continue;
            };
            if account.owner == *owner && account.mint == *mint {
                return Ok(Some((info, account.amount)));
            }
        }
        Ok(None)
    }
}

impl RewardPools for ProgramHost<'_, '_> {
    fn pool_deposit(&mut self, pool_id: u32, amount: u64) -> Result<()> {
        self.invoke(self.programs.reward_pool_program, "deposit", (pool_id, amount))
    }

    fn pool_withdraw(&mut self, pool_id: u32, amount: u64) -> Result<()> {
        self.invoke(self.programs.reward_pool_program, "withdraw", (pool_id, amount))
    }

    fn pending_rewards(&mut self, pool_id: u32) -> Result<PendingRewards> {
        self.view(self.programs.reward_pool_program, "pending_rewards", (pool_id, self.strategy.key()))
    }

    fn pool_info(&mut self, pool_id: u32) -> Result<PoolInfo> {
        self.view(self.programs.reward_pool_program, "pool_info", pool_id)
    }

    fn emergency_withdraw(&mut self, pool_id: u32) -> Result<()> {
        self.invoke(self.programs.reward_pool_program, "emergency_withdraw", pool_id)
    }

    fn pool_length(&mut self) -> Result<u32> {
        self.view(self.programs.reward_pool_program, "pool_length", ())
    }
}

impl StakeVault for ProgramHost<'_, '_> {
    fn enter(&mut self, asset_amount: u64) -> Result<()> {
        self.invoke(self.programs.stake_program, "enter", asset_amount)
    }

    fn leave(&mut self, share_amount: u64) -> Result<()> {
        self.invoke(self.programs.stake_program, "leave", share_amount)
    }

    fn shares_for_asset(&mut self, asset_amount: u64) -> Result<u64> {
        self.view(self.programs.stake_program, "shares_for_asset", asset_amount)
    }

    fn asset_for_shares(&mut self, share_amount: u64) -> Result<u64> {
        self.view(self.programs.stake_program, "asset_for_shares", share_amount)
    }
}

impl SwapRouter for ProgramHost<'_, '_> {
    fn swap_exact_in(&mut self, amount_in: u64, min_out: u64, route: &[Pubkey], deadline: i64) -> Result<u64> {
        self.view(
            self.programs.swap_program,
            "swap_exact_in",
            (amount_in, min_out, route.to_vec(), deadline),
        )
    }
}

impl RewardHandler for ProgramHost<'_, '_> {
    fn handle(&mut self, handler: &Pubkey, token: &Pubkey, amount: u64) -> Result<()> {
        self.invoke(*handler, "handle", (*token, amount))
    }

    fn unwrap_derivative(&mut self, derivative: &Pubkey, base: &Pubkey, amount: u64) -> Result<()> {
        let program = self.programs.unwrap_program.ok_or(StrategyErrorCode::NotADerivative)?;
        self.invoke(program, "unwrap", (*derivative, *base, amount))
    }
}

impl BoostBeneficiary for ProgramHost<'_, '_> {
    fn process_rewards(&mut self) -> Result<()> {
        let program = self
            .programs
            .boost_beneficiary_program
            .ok_or(StrategyErrorCode::ExternalCallFailed)?;
        self.invoke(program, "process_rewards", ())
    }

    fn mass_unstake(&mut self) -> Result<()> {
        let program = self
            .programs
            .boost_beneficiary_program
            .ok_or(StrategyErrorCode::ExternalCallFailed)?;
        self.invoke(program, "mass_unstake", ())
    }
}

impl TokenBank for ProgramHost<'_, '_> {
    fn balance_of(&mut self, mint: &Pubkey) -> Result<u64> {
        let owner = self.strategy.key();
        Ok(self.token_account(&owner, mint)?.map_or(0, |(_, amount)| amount))
    }

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let owner = self.strategy.key();
        let (source, _) = self
            .token_account(&owner, mint)?
            .ok_or(StrategyErrorCode::TokenAccountNotFound)?;
        let (destination, _) = self
            .token_account(to, mint)?
            .ok_or(StrategyErrorCode::TokenAccountNotFound)?;

        let seeds = self.seeds();
        let signer_seeds: &[&[&[u8]]] = &[&seeds[..]];
        token::transfer(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                Transfer {
                    from: source.clone(),
                    to: destination.clone(),
                    authority: self.strategy.clone(),
                },
                signer_seeds,
            ),
            amount,
        )
    }
}
