//! Escrow vester.
//!
//! Converts an escrow reward token into a linearly unlocking claim on the real
//! token over `vesting_duration`. Deposits can be capped by the account's
//! provable earnings in a linked reward tracker, and can require a
//! proportional lock of the account's pair stake.

#![no_std]

pub mod events;
pub mod position;

use common::access::{self, Capability};
use common::fixed_point::mul_div;
use common::interfaces::TrackerClient;
use common::storage::extend_instance;
use common::ReentrancyGuard;
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, String, Symbol, Vec,
};

pub use position::{StakeHistory, VestingPosition};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");
const MAX_VEST: Symbol = symbol_short!("MAX_VEST");
const SUPPLY: Symbol = symbol_short!("SUPPLY");
const PAIR_SUPPLY: Symbol = symbol_short!("PAIR_SUP");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 401,
    AlreadyInitialized = 402,
    NonTransferable = 403,
    Reentrant = 404,
    Unauthorized = 420,
    NothingVested = 440,
    InvalidAmount = 460,
    InvalidConfig = 461,
    MaxVestableExceeded = 480,
}

impl ContractError {
    pub fn class(&self) -> Option<common::ErrorClass> {
        common::classify(*self as u32)
    }
}

// ── Configuration ────────────────────────────────────────────────────────────

/// Fixed wiring of a vester, set once by `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VesterConfig {
    pub name: String,
    pub symbol: String,
    /// Seconds for a deposit to vest completely.
    pub vesting_duration: u64,
    /// Escrow token deposited and burned as it vests.
    pub escrow_token: Address,
    /// Real token paid out; the vester must hold enough of it.
    pub claimable_token: Address,
    /// Stake locked in proportion to the deposit, if any.
    pub pair_token: Option<Address>,
    /// Tracker whose earnings bound the vestable amount, if any.
    pub reward_tracker: Option<Address>,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct VesterContract;

#[contractimpl]
impl VesterContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    pub fn initialize(env: Env, gov: Address, config: VesterConfig) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if config.vesting_duration == 0 {
            return Err(ContractError::InvalidConfig);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&CONFIG, &config);
        // A linked tracker turns the ceiling on.
        env.storage()
            .instance()
            .set(&MAX_VEST, &config.reward_tracker.is_some());
        env.storage().instance().set(&SUPPLY, &0i128);
        env.storage().instance().set(&PAIR_SUPPLY, &0i128);
        access::set_gov(&env, &gov);
        extend_instance(&env);

        events::publish_initialized(&env, gov, config);

        Ok(())
    }

    // ── Vesting ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of escrow from `account` and restart its vesting clock.
    pub fn deposit(env: Env, account: Address, amount: i128) -> Result<(), ContractError> {
        account.require_auth();
        let _guard = Self::enter(&env)?;
        Self::deposit_inner(&env, &account, amount)
    }

    /// Deposit on behalf of `account`; the escrow is still pulled from it.
    pub fn deposit_for_account(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let _guard = Self::enter(&env)?;
        Self::require_capability(&env, &caller, Capability::StakeForOthers)?;
        Self::deposit_inner(&env, &account, amount)
    }

    /// Pay `account`'s vested real token to itself. Returns the amount paid.
    pub fn claim(env: Env, account: Address) -> Result<i128, ContractError> {
        account.require_auth();
        let _guard = Self::enter(&env)?;
        Self::claim_inner(&env, &account, &account)
    }

    pub fn claim_for_account(
        env: Env,
        caller: Address,
        account: Address,
        receiver: Address,
    ) -> Result<i128, ContractError> {
        caller.require_auth();
        let _guard = Self::enter(&env)?;
        Self::require_capability(&env, &caller, Capability::ClaimForOthers)?;
        Self::claim_inner(&env, &account, &receiver)
    }

    /// Close the position: pay what has vested, return the unvested escrow and
    /// release the whole pair lock.
    pub fn withdraw(env: Env, account: Address) -> Result<(), ContractError> {
        account.require_auth();
        let _guard = Self::enter(&env)?;
        let config = Self::load_config(&env)?;

        Self::claim_inner(&env, &account, &account)?;

        let mut position = position::load_position(&env, &account);
        if position.total_vested() <= 0 {
            return Err(ContractError::NothingVested);
        }

        let this = env.current_contract_address();
        let escrow_returned = position.balance;
        let pair_returned = position.pair_amount;

        if pair_returned > 0 {
            if let Some(pair_token) = config.pair_token.as_ref() {
                Self::adjust_supply(&env, &PAIR_SUPPLY, -pair_returned);
                token::Client::new(&env, pair_token).transfer(&this, &account, &pair_returned);
            }
        }
        if escrow_returned > 0 {
            Self::adjust_supply(&env, &SUPPLY, -escrow_returned);
            token::Client::new(&env, &config.escrow_token).transfer(
                &this,
                &account,
                &escrow_returned,
            );
        }

        position = VestingPosition {
            total_claimed: position.total_claimed,
            ..VestingPosition::default()
        };
        position::save_position(&env, &account, &position);

        events::publish_withdrawn(&env, account, escrow_returned, pair_returned);
        Ok(())
    }

    // ── Ceiling maths ───────────────────────────────────────────────────────

    /// `balance + cumulative_claim_amount` of the current position.
    pub fn get_total_vested(env: Env, account: Address) -> i128 {
        position::load_position(&env, &account).total_vested()
    }

    /// Vested but unpaid real token, including the not-yet-booked portion.
    pub fn claimable(env: Env, account: Address) -> i128 {
        let duration = Self::load_config(&env)
            .map(|c| c.vesting_duration)
            .unwrap_or(0);
        position::load_position(&env, &account).claimable(&env, duration)
    }

    /// Ceiling on total vested escrow:
    ///
    /// ```text
    /// tracker cumulative rewards + transferred cumulative rewards
    ///     + bonus rewards − deductions          (floored at 0)
    /// ```
    ///
    /// The tracker term is 0 when no tracker is linked.
    pub fn get_max_vestable_amount(env: Env, account: Address) -> i128 {
        let history = position::load_history(&env, &account);
        let cumulative = Self::tracker_client(&env)
            .map(|client| client.cumulative_rewards(&account))
            .unwrap_or(0);
        let max = cumulative
            .saturating_add(history.transferred_cum_rewards)
            .saturating_add(history.bonus_rewards);
        max.saturating_sub(history.reward_deductions).max(0)
    }

    /// Average stake of the tracker position and of any transferred history,
    /// each weighted by its share of cumulative rewards.
    pub fn combined_average_staked_amount(env: Env, account: Address) -> i128 {
        let history = position::load_history(&env, &account);
        let (average, cumulative) = Self::tracker_client(&env)
            .map(|client| {
                (
                    client.average_staked_amount(&account),
                    client.cumulative_rewards(&account),
                )
            })
            .unwrap_or((0, 0));
        let total = cumulative.saturating_add(history.transferred_cum_rewards);
        if total <= 0 {
            return 0;
        }
        mul_div(&env, average, cumulative, total).saturating_add(mul_div(
            &env,
            history.transferred_avg_staked,
            history.transferred_cum_rewards,
            total,
        ))
    }

    /// Pair stake required to back `escrow_amount` of vesting escrow.
    pub fn get_pair_amount(env: Env, account: Address, escrow_amount: i128) -> i128 {
        let average = Self::combined_average_staked_amount(env.clone(), account.clone());
        if average <= 0 {
            return 0;
        }
        let max_vestable = Self::get_max_vestable_amount(env.clone(), account);
        if max_vestable <= 0 {
            return 0;
        }
        mul_div(&env, escrow_amount, average, max_vestable)
    }

    // ── Migration ───────────────────────────────────────────────────────────

    /// Move `sender`'s earnings history to `receiver` in one call: the
    /// receiver inherits the combined average stake, the cumulative rewards
    /// and the bonus rewards; the sender keeps a deduction equal to its
    /// tracker rewards so its own ceiling drops to zero.
    pub fn transfer_stake_values(
        env: Env,
        caller: Address,
        sender: Address,
        receiver: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let _guard = Self::enter(&env)?;
        Self::require_capability(&env, &caller, Capability::MigrateAccounts)?;

        let combined = Self::combined_average_staked_amount(env.clone(), sender.clone());
        let tracker_rewards = match Self::load_config(&env)?.reward_tracker {
            Some(tracker) => TrackerClient::new(&env, &tracker).cumulative_rewards(&sender),
            None => 0,
        };

        let mut from = position::load_history(&env, &sender);
        let mut to = position::load_history(&env, &receiver);

        // Averages blend by each side's share of cumulative rewards.
        let moved_rewards = from.transferred_cum_rewards.saturating_add(tracker_rewards);
        let merged_rewards = to.transferred_cum_rewards.saturating_add(moved_rewards);
        to.transferred_avg_staked = if merged_rewards > 0 {
            mul_div(&env, to.transferred_avg_staked, to.transferred_cum_rewards, merged_rewards)
                .saturating_add(mul_div(&env, combined, moved_rewards, merged_rewards))
        } else {
            to.transferred_avg_staked.max(combined)
        };
        to.transferred_cum_rewards = merged_rewards;
        to.bonus_rewards = to.bonus_rewards.saturating_add(from.bonus_rewards);

        from.transferred_avg_staked = 0;
        from.transferred_cum_rewards = 0;
        from.bonus_rewards = 0;
        from.reward_deductions = tracker_rewards;

        position::save_history(&env, &sender, &from);
        position::save_history(&env, &receiver, &to);

        events::publish_stake_values_transferred(&env, sender, receiver, combined, tracker_rewards);
        Ok(())
    }

    pub fn set_transferred_avg_stake(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::update_history(&env, &caller, &account, symbol_short!("AVG_STK"), amount, |h, v| {
            h.transferred_avg_staked = v
        })
    }

    pub fn set_transferred_cum_rewards(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::update_history(&env, &caller, &account, symbol_short!("CUM_RWD"), amount, |h, v| {
            h.transferred_cum_rewards = v
        })
    }

    pub fn set_reward_deductions(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::update_history(&env, &caller, &account, symbol_short!("DEDUCT"), amount, |h, v| {
            h.reward_deductions = v
        })
    }

    pub fn set_bonus_rewards(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::update_history(&env, &caller, &account, symbol_short!("BONUS"), amount, |h, v| {
            h.bonus_rewards = v
        })
    }

    // ── Vester token ────────────────────────────────────────────────────────

    pub fn name(env: Env) -> Result<String, ContractError> {
        Ok(Self::load_config(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, ContractError> {
        Ok(Self::load_config(&env)?.symbol)
    }

    pub fn decimals(_env: Env) -> u32 {
        18
    }

    /// Unvested escrow held for `account`.
    pub fn balance(env: Env, account: Address) -> i128 {
        position::load_position(&env, &account).balance
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage().instance().get(&SUPPLY).unwrap_or(0)
    }

    /// Vester balances cannot move between accounts.
    pub fn transfer(
        _env: Env,
        _from: Address,
        _to: Address,
        _amount: i128,
    ) -> Result<(), ContractError> {
        Err(ContractError::NonTransferable)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn position(env: Env, account: Address) -> VestingPosition {
        position::load_position(&env, &account)
    }

    pub fn stake_history(env: Env, account: Address) -> StakeHistory {
        position::load_history(&env, &account)
    }

    pub fn pair_amount(env: Env, account: Address) -> i128 {
        position::load_position(&env, &account).pair_amount
    }

    pub fn pair_supply(env: Env) -> i128 {
        env.storage().instance().get(&PAIR_SUPPLY).unwrap_or(0)
    }

    pub fn last_vesting_time(env: Env, account: Address) -> u64 {
        position::load_position(&env, &account).last_vesting_time
    }

    pub fn cumulative_claim_amount(env: Env, account: Address) -> i128 {
        position::load_position(&env, &account).cumulative_claim_amount
    }

    pub fn claimed_amount(env: Env, account: Address) -> i128 {
        position::load_position(&env, &account).claimed_amount
    }

    pub fn total_claimed(env: Env, account: Address) -> i128 {
        position::load_position(&env, &account).total_claimed
    }

    pub fn bonus_rewards(env: Env, account: Address) -> i128 {
        position::load_history(&env, &account).bonus_rewards
    }

    pub fn transferred_avg_staked_amount(env: Env, account: Address) -> i128 {
        position::load_history(&env, &account).transferred_avg_staked
    }

    pub fn transferred_cumulative_rewards(env: Env, account: Address) -> i128 {
        position::load_history(&env, &account).transferred_cum_rewards
    }

    pub fn cumulative_reward_deductions(env: Env, account: Address) -> i128 {
        position::load_history(&env, &account).reward_deductions
    }

    pub fn config(env: Env) -> Result<VesterConfig, ContractError> {
        Self::load_config(&env)
    }

    pub fn has_max_vestable_amount(env: Env) -> bool {
        env.storage().instance().get(&MAX_VEST).unwrap_or(false)
    }

    // ── Governance ──────────────────────────────────────────────────────────

    pub fn gov(env: Env) -> Result<Address, ContractError> {
        access::get_gov(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn set_gov(env: Env, caller: Address, new_gov: Address) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        access::set_gov(&env, &new_gov);
        events::publish_gov_set(&env, caller, new_gov);
        Ok(())
    }

    pub fn set_has_max_vestable_amount(
        env: Env,
        caller: Address,
        enabled: bool,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        env.storage().instance().set(&MAX_VEST, &enabled);
        events::publish_max_vestable_set(&env, enabled);
        Ok(())
    }

    pub fn grant_capability(
        env: Env,
        caller: Address,
        principal: Address,
        capability: Capability,
    ) -> Result<(), ContractError> {
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

    /// Governance rescue, typically of surplus real-token funding.
    pub fn withdraw_token(
        env: Env,
        caller: Address,
        token: Address,
        receiver: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
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

    fn enter(env: &Env) -> Result<ReentrancyGuard<'_>, ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        extend_instance(env);
        ReentrancyGuard::enter(env).ok_or(ContractError::Reentrant)
    }

    fn require_gov(env: &Env, caller: &Address) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        caller.require_auth();
        if !access::is_gov(env, caller) {
            return Err(ContractError::Unauthorized);
        }
        extend_instance(env);
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

    fn tracker_client(env: &Env) -> Option<TrackerClient<'_>> {
        Self::load_config(env)
            .ok()
            .and_then(|config| config.reward_tracker)
            .map(|tracker| TrackerClient::new(env, &tracker))
    }

    fn load_config(env: &Env) -> Result<VesterConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn adjust_supply(env: &Env, key: &Symbol, delta: i128) {
        let current: i128 = env.storage().instance().get(key).unwrap_or(0);
        env.storage()
            .instance()
            .set(key, &current.saturating_add(delta));
    }

    fn update_history<F>(
        env: &Env,
        caller: &Address,
        account: &Address,
        field: Symbol,
        amount: i128,
        apply: F,
    ) -> Result<(), ContractError>
    where
        F: FnOnce(&mut StakeHistory, i128),
    {
        caller.require_auth();
        let _guard = Self::enter(env)?;
        Self::require_capability(env, caller, Capability::MigrateAccounts)?;
        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }
        let mut history = position::load_history(env, account);
        apply(&mut history, amount);
        position::save_history(env, account, &history);
        events::publish_history_set(env, account.clone(), field, amount);
        Ok(())
    }

    /// Books everything vested since the last update: burns that much escrow,
    /// moves it into `cumulative_claim_amount` and restarts the clock.
    fn update_vesting(
        env: &Env,
        config: &VesterConfig,
        account: &Address,
    ) -> VestingPosition {
        let mut position = position::load_position(env, account);
        let vested = position.next_claimable(env, config.vesting_duration);
        position.last_vesting_time = env.ledger().timestamp();

        if vested > 0 {
            position.balance -= vested;
            position.cumulative_claim_amount =
                position.cumulative_claim_amount.saturating_add(vested);
            Self::adjust_supply(env, &SUPPLY, -vested);
            token::Client::new(env, &config.escrow_token)
                .burn(&env.current_contract_address(), &vested);
        }
        position
    }

    fn deposit_inner(env: &Env, account: &Address, amount: i128) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let config = Self::load_config(env)?;
        let this = env.current_contract_address();

        let mut position = Self::update_vesting(env, &config, account);

        token::Client::new(env, &config.escrow_token).transfer_from(&this, account, &this, &amount);
        position.balance = position
            .balance
            .checked_add(amount)
            .ok_or(ContractError::InvalidAmount)?;
        Self::adjust_supply(env, &SUPPLY, amount);

        if let Some(pair_token) = config.pair_token.as_ref() {
            let required =
                Self::get_pair_amount(env.clone(), account.clone(), position.balance);
            if required > position.pair_amount {
                let diff = required - position.pair_amount;
                token::Client::new(env, pair_token).transfer_from(&this, account, &this, &diff);
                position.pair_amount = required;
                Self::adjust_supply(env, &PAIR_SUPPLY, diff);
            }
        }

        if Self::has_max_vestable_amount(env.clone()) {
            let max = Self::get_max_vestable_amount(env.clone(), account.clone());
            if position.total_vested() > max {
                return Err(ContractError::MaxVestableExceeded);
            }
        }

        position::save_position(env, account, &position);
        events::publish_deposited(
            env,
            account.clone(),
            amount,
            position.balance,
            position.pair_amount,
        );
        Ok(())
    }

    fn claim_inner(env: &Env, account: &Address, receiver: &Address) -> Result<i128, ContractError> {
        let config = Self::load_config(env)?;
        let mut position = Self::update_vesting(env, &config, account);

        let amount = position
            .cumulative_claim_amount
            .saturating_sub(position.claimed_amount);
        position.claimed_amount = position.cumulative_claim_amount;
        position.total_claimed = position.total_claimed.saturating_add(amount);
        position::save_position(env, account, &position);

        if amount > 0 {
            token::Client::new(env, &config.claimable_token).transfer(
                &env.current_contract_address(),
                receiver,
                &amount,
            );
            events::publish_claimed(env, account.clone(), receiver.clone(), amount);
        }
        Ok(amount)
    }
}
