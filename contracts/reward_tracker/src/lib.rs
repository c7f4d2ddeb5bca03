#![no_std]

pub mod events;
pub mod rewards;
pub mod share;

use common::access::{self, Capability};
use common::interfaces::RewardSourceClient;
use common::storage::{extend_instance, extend_persistent};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, String, Symbol, Vec,
    U256,
};

pub use rewards::StakePosition;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const NAME: Symbol = symbol_short!("NAME");
const SYMBOL: Symbol = symbol_short!("SYMBOL");
const DISTRIBUTOR: Symbol = symbol_short!("DISTRIB");
const MODES: Symbol = symbol_short!("MODES");

// Per-token and per-account persistent keys.
const DEPOSIT_TOKEN: Symbol = symbol_short!("DEP_TOK");
const TOTAL_DEPOSIT: Symbol = symbol_short!("TOT_DEP");
const DEPOSIT_BALANCE: Symbol = symbol_short!("DEP_BAL");

/// Share decimals; shares mint 1:1 against deposited amounts.
pub const DECIMALS: u32 = 18;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 101,
    AlreadyInitialized = 102,
    StakingDisabled = 103,
    ClaimingDisabled = 104,
    Unauthorized = 120,
    InsufficientStake = 140,
    InsufficientDeposit = 141,
    InsufficientShares = 142,
    InsufficientAllowance = 143,
    InvalidAmount = 160,
    InvalidToken = 161,
    InvalidExpiration = 162,
    Overflow = 163,
}

impl ContractError {
    pub fn class(&self) -> Option<common::ErrorClass> {
        common::classify(*self as u32)
    }
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Governance-controlled mode flags, checked by every entry point they gate.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrackerModes {
    /// Only principals holding `TransferWhenPrivate` may move shares.
    pub private_transfer_mode: bool,
    /// Self-service `stake` / `unstake` are disabled.
    pub private_staking_mode: bool,
    /// Self-service `claim` is disabled.
    pub private_claiming_mode: bool,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardTrackerContract;

#[contractimpl]
impl RewardTrackerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the tracker.
    ///
    /// * `deposit_tokens` – tokens accepted for staking; may include the share
    ///   token of an upstream tracker.
    /// * `distributor`    – the single reward source settled before every
    ///   mutation.
    pub fn initialize(
        env: Env,
        gov: Address,
        name: String,
        symbol: String,
        deposit_tokens: Vec<Address>,
        distributor: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&NAME, &name);
        env.storage().instance().set(&SYMBOL, &symbol);
        env.storage().instance().set(&DISTRIBUTOR, &distributor);
        env.storage().instance().set(&MODES, &TrackerModes::default());
        rewards::set_cumulative_reward_per_token(&env, &common::fixed_point::zero(&env));
        access::set_gov(&env, &gov);

        for token in deposit_tokens.iter() {
            env.storage()
                .persistent()
                .set(&(DEPOSIT_TOKEN, token.clone()), &true);
        }
        extend_instance(&env);

        events::publish_initialized(&env, gov, deposit_tokens, distributor);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `amount` of `token` from and for `account`.
    ///
    /// Disabled while private staking mode is on.
    pub fn stake(
        env: Env,
        account: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        account.require_auth();
        if Self::load_modes(&env).private_staking_mode {
            return Err(ContractError::StakingDisabled);
        }
        Self::stake_inner(&env, &account, &account, &token, amount)
    }

    /// Stake `amount` of `token` pulled from `funder` on behalf of `account`.
    ///
    /// `caller` may fund its own stake for anyone while staking is public;
    /// otherwise it must hold `StakeForOthers`.
    pub fn stake_for_account(
        env: Env,
        caller: Address,
        funder: Address,
        account: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if Self::load_modes(&env).private_staking_mode || caller != funder {
            Self::require_capability(&env, &caller, Capability::StakeForOthers)?;
        }
        Self::stake_inner(&env, &funder, &account, &token, amount)
    }

    /// Unstake `amount` of `token` back to `account`.
    ///
    /// Disabled while private staking mode is on.
    pub fn unstake(
        env: Env,
        account: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        account.require_auth();
        if Self::load_modes(&env).private_staking_mode {
            return Err(ContractError::StakingDisabled);
        }
        Self::unstake_inner(&env, &account, &token, amount, &account)
    }

    pub fn unstake_for_account(
        env: Env,
        caller: Address,
        account: Address,
        token: Address,
        amount: i128,
        receiver: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_capability(&env, &caller, Capability::StakeForOthers)?;
        Self::unstake_inner(&env, &account, &token, amount, &receiver)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay everything `account` is owed to `receiver`. Returns the amount paid,
    /// which is 0 (not an error) when nothing is owed.
    pub fn claim(env: Env, account: Address, receiver: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        account.require_auth();
        if Self::load_modes(&env).private_claiming_mode {
            return Err(ContractError::ClaimingDisabled);
        }
        Self::claim_inner(&env, &account, &receiver)
    }

    pub fn claim_for_account(
        env: Env,
        caller: Address,
        account: Address,
        receiver: Address,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_capability(&env, &caller, Capability::ClaimForOthers)?;
        Self::claim_inner(&env, &account, &receiver)
    }

    /// Pull pending reward from the distributor into the global accumulator.
    pub fn update_rewards(env: Env) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        rewards::update_global(&env)?;
        Ok(())
    }

    // ── Share token ─────────────────────────────────────────────────────────

    pub fn name(env: Env) -> String {
        env.storage()
            .instance()
            .get(&NAME)
            .unwrap_or(String::from_str(&env, ""))
    }

    pub fn symbol(env: Env) -> String {
        env.storage()
            .instance()
            .get(&SYMBOL)
            .unwrap_or(String::from_str(&env, ""))
    }

    pub fn decimals(_env: Env) -> u32 {
        DECIMALS
    }

    pub fn total_supply(env: Env) -> i128 {
        share::total_supply(&env)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        share::balance(&env, &id)
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        share::allowance(&env, &from, &spender)
    }

    pub fn approve(
        env: Env,
        from: Address,
        spender: Address,
        amount: i128,
        expiration_ledger: u32,
    ) -> Result<(), ContractError> {
        from.require_auth();
        share::approve(&env, &from, &spender, amount, expiration_ledger)?;
        events::publish_approved(&env, from, spender, amount, expiration_ledger);
        Ok(())
    }

    /// Move shares held by `from`. While private transfer mode is on, `from`
    /// itself must hold `TransferWhenPrivate` (a downstream tracker returning
    /// shares, for example).
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), ContractError> {
        from.require_auth();
        if Self::load_modes(&env).private_transfer_mode {
            Self::require_capability(&env, &from, Capability::TransferWhenPrivate)?;
        }
        share::move_balance(&env, &from, &to, amount)?;
        events::publish_transfer(&env, from, to, amount);
        Ok(())
    }

    /// Move shares on behalf of `from`. Principals holding
    /// `TransferWhenPrivate` skip the allowance check.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        spender.require_auth();
        let privileged = access::authorize(&env, &spender, Capability::TransferWhenPrivate);
        if Self::load_modes(&env).private_transfer_mode && !privileged {
            return Err(ContractError::Unauthorized);
        }
        if !privileged {
            share::spend_allowance(&env, &from, &spender, amount)?;
        }
        share::move_balance(&env, &from, &to, amount)?;
        events::publish_transfer(&env, from, to, amount);
        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Reward `account` could claim right now, including the distributor's
    /// not-yet-pulled amount. Does not mutate state.
    pub fn claimable(env: Env, account: Address) -> i128 {
        let position = rewards::load_position(&env, &account);
        if position.staked_amount == 0 {
            return position.claimable_reward;
        }
        let supply = share::total_supply(&env);
        let pending = match Self::load_distributor(&env) {
            Ok(distributor) => RewardSourceClient::new(&env, &distributor).pending_rewards(&supply),
            Err(_) => 0,
        };
        let live = rewards::cumulative_reward_per_token(&env).add(
            &common::fixed_point::reward_per_token_delta(&env, pending, supply),
        );
        position.claimable_reward.saturating_add(common::fixed_point::accrued(
            &env,
            position.staked_amount,
            &live,
            &position.reward_per_token_paid,
        ))
    }

    pub fn position(env: Env, account: Address) -> StakePosition {
        rewards::load_position(&env, &account)
    }

    pub fn staked_amount(env: Env, account: Address) -> i128 {
        rewards::load_position(&env, &account).staked_amount
    }

    pub fn average_staked_amount(env: Env, account: Address) -> i128 {
        rewards::load_position(&env, &account).average_staked_amount
    }

    pub fn cumulative_rewards(env: Env, account: Address) -> i128 {
        rewards::load_position(&env, &account).cumulative_rewards
    }

    /// Settled but unpaid reward, without the live accrual `claimable` adds.
    pub fn claimable_reward(env: Env, account: Address) -> i128 {
        rewards::load_position(&env, &account).claimable_reward
    }

    pub fn cumulative_reward_per_token(env: Env) -> U256 {
        rewards::cumulative_reward_per_token(&env)
    }

    pub fn deposit_balance(env: Env, account: Address, token: Address) -> i128 {
        let key = (DEPOSIT_BALANCE, account, token);
        env.storage().persistent().get(&key).unwrap_or(0)
    }

    pub fn total_deposit_supply(env: Env, token: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(TOTAL_DEPOSIT, token))
            .unwrap_or(0)
    }

    pub fn is_deposit_token(env: Env, token: Address) -> bool {
        env.storage()
            .persistent()
            .get(&(DEPOSIT_TOKEN, token))
            .unwrap_or(false)
    }

    pub fn distributor(env: Env) -> Result<Address, ContractError> {
        Self::load_distributor(&env)
    }

    pub fn reward_token(env: Env) -> Result<Address, ContractError> {
        let distributor = Self::load_distributor(&env)?;
        Ok(RewardSourceClient::new(&env, &distributor).reward_token())
    }

    /// Current emission rate of the distributor at this tracker's supply.
    pub fn tokens_per_interval(env: Env) -> Result<i128, ContractError> {
        let distributor = Self::load_distributor(&env)?;
        let supply = share::total_supply(&env);
        Ok(RewardSourceClient::new(&env, &distributor).tokens_per_interval(&supply))
    }

    pub fn modes(env: Env) -> TrackerModes {
        Self::load_modes(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Governance ──────────────────────────────────────────────────────────

    pub fn gov(env: Env) -> Result<Address, ContractError> {
        access::get_gov(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn set_gov(env: Env, caller: Address, new_gov: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_gov(&env, &caller)?;
        access::set_gov(&env, &new_gov);
        events::publish_gov_set(&env, caller, new_gov);
        Ok(())
    }

    pub fn set_modes(env: Env, caller: Address, modes: TrackerModes) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_gov(&env, &caller)?;
        env.storage().instance().set(&MODES, &modes);
        events::publish_modes_set(&env, modes);
        Ok(())
    }

    pub fn set_deposit_token(
        env: Env,
        caller: Address,
        token: Address,
        accepted: bool,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_gov(&env, &caller)?;
        env.storage()
            .persistent()
            .set(&(DEPOSIT_TOKEN, token.clone()), &accepted);
        events::publish_deposit_token_set(&env, token, accepted);
        Ok(())
    }

    pub fn grant_capability(
        env: Env,
        caller: Address,
        principal: Address,
        capability: Capability,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_gov(&env, &caller)?;
        access::grant(&env, &principal, capability);
        events::publish_capability_set(&env, principal, capability, true);
        Ok(())
    }

    pub fn revoke_capability(
        env: Env,
        caller: Address,
        principal: Address,
        capability: Capability,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_gov(&env, &caller)?;
        access::revoke(&env, &principal, capability);
        events::publish_capability_set(&env, principal, capability, false);
        Ok(())
    }

    pub fn has_capability(env: Env, principal: Address, capability: Capability) -> bool {
        access::has_capability(&env, &principal, capability)
    }

    pub fn handlers(env: Env) -> Vec<Address> {
        access::list_handlers(&env)
    }

    /// Governance rescue of tokens sent to the tracker by mistake.
    pub fn withdraw_token(
        env: Env,
        caller: Address,
        token: Address,
        receiver: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_gov(&env, &caller)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &receiver,
            &amount,
        );
        events::publish_token_withdrawn(&env, token, receiver, amount);
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        extend_instance(env);
        Ok(())
    }

    fn require_gov(env: &Env, caller: &Address) -> Result<(), ContractError> {
        if !access::is_gov(env, caller) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_capability(
        env: &Env,
        caller: &Address,
        capability: Capability,
    ) -> Result<(), ContractError> {
        if !access::authorize(env, caller, capability) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn load_modes(env: &Env) -> TrackerModes {
        env.storage().instance().get(&MODES).unwrap_or_default()
    }

    fn load_distributor(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DISTRIBUTOR)
            .ok_or(ContractError::NotInitialized)
    }

    fn stake_inner(
        env: &Env,
        funder: &Address,
        account: &Address,
        token: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if !Self::is_deposit_token(env.clone(), token.clone()) {
            return Err(ContractError::InvalidToken);
        }

        // 1. Settle before anything moves.
        let mut position = rewards::settle(env, account)?;

        // 2. Pull the deposit from the funder.
        let this = env.current_contract_address();
        token::Client::new(env, token).transfer_from(&this, funder, &this, &amount);

        // 3. Book the stake and mint shares. A new staker's average starts at
        // the stake itself.
        if position.staked_amount == 0 && position.cumulative_rewards == 0 {
            position.average_staked_amount = amount;
        }
        position.staked_amount = position
            .staked_amount
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;
        rewards::save_position(env, account, &position);
        Self::adjust_deposit(env, account, token, amount)?;
        share::mint(env, account, amount)?;

        events::publish_staked(
            env,
            funder.clone(),
            account.clone(),
            token.clone(),
            amount,
            share::total_supply(env),
        );

        Ok(())
    }

    fn unstake_inner(
        env: &Env,
        account: &Address,
        token: &Address,
        amount: i128,
        receiver: &Address,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if !Self::is_deposit_token(env.clone(), token.clone()) {
            return Err(ContractError::InvalidToken);
        }

        // 1. Settle before anything moves.
        let mut position = rewards::settle(env, account)?;

        // 2. Check both limits.
        if position.staked_amount < amount {
            return Err(ContractError::InsufficientStake);
        }
        if Self::deposit_balance(env.clone(), account.clone(), token.clone()) < amount {
            return Err(ContractError::InsufficientDeposit);
        }

        // 3. Unbook and burn.
        position.staked_amount -= amount;
        rewards::save_position(env, account, &position);
        Self::adjust_deposit(env, account, token, -amount)?;
        share::burn(env, account, amount)?;

        // 4. Pay out.
        token::Client::new(env, token).transfer(&env.current_contract_address(), receiver, &amount);

        events::publish_unstaked(
            env,
            account.clone(),
            token.clone(),
            amount,
            receiver.clone(),
            share::total_supply(env),
        );

        Ok(())
    }

    fn claim_inner(env: &Env, account: &Address, receiver: &Address) -> Result<i128, ContractError> {
        let mut position = rewards::settle(env, account)?;

        let amount = position.claimable_reward;
        if amount <= 0 {
            return Ok(0);
        }
        position.claimable_reward = 0;
        rewards::save_position(env, account, &position);

        let distributor = Self::load_distributor(env)?;
        let reward_token = RewardSourceClient::new(env, &distributor).reward_token();
        token::Client::new(env, &reward_token).transfer(
            &env.current_contract_address(),
            receiver,
            &amount,
        );

        events::publish_claimed(env, account.clone(), receiver.clone(), amount);

        Ok(amount)
    }

    /// Apply a signed delta to the account's deposit balance and the token's
    /// total deposit supply.
    fn adjust_deposit(
        env: &Env,
        account: &Address,
        token: &Address,
        delta: i128,
    ) -> Result<(), ContractError> {
        let balance_key = (DEPOSIT_BALANCE, account.clone(), token.clone());
        let balance: i128 = env.storage().persistent().get(&balance_key).unwrap_or(0);
        let next_balance = balance.checked_add(delta).ok_or(ContractError::Overflow)?;
        env.storage().persistent().set(&balance_key, &next_balance);
        extend_persistent(env, &balance_key);

        let total_key = (TOTAL_DEPOSIT, token.clone());
        let total: i128 = env.storage().persistent().get(&total_key).unwrap_or(0);
        let next_total = total.checked_add(delta).ok_or(ContractError::Overflow)?;
        env.storage().persistent().set(&total_key, &next_total);
        extend_persistent(env, &total_key);

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test;

#[cfg(test)]
mod test_access;

#[cfg(test)]
mod test_share;
