//! Fixed-rate reward distributor.
//!
//! Meters one reward token into exactly one tracker at `tokens_per_interval`
//! units per second. The tracker pulls on every settlement; payouts are capped
//! at the distributor's token balance.

#![no_std]

pub mod events;

use common::access;
use common::interfaces::TrackerClient;
use common::storage::extend_instance;
use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const TRACKER: Symbol = symbol_short!("TRACKER");
const RATE: Symbol = symbol_short!("RATE");
const LAST_DIST: Symbol = symbol_short!("LAST_DIST");
const CARRIED: Symbol = symbol_short!("CARRIED");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 201,
    AlreadyInitialized = 202,
    Unauthorized = 220,
    InvalidAmount = 260,
}

impl ContractError {
    pub fn class(&self) -> Option<common::ErrorClass> {
        common::classify(*self as u32)
    }
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardDistributorContract;

#[contractimpl]
impl RewardDistributorContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bind the distributor to its reward token and its single tracker.
    /// Emission starts at rate 0.
    pub fn initialize(
        env: Env,
        gov: Address,
        reward_token: Address,
        tracker: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&TRACKER, &tracker);
        env.storage().instance().set(&RATE, &0i128);
        env.storage().instance().set(&CARRIED, &0i128);
        env.storage()
            .instance()
            .set(&LAST_DIST, &env.ledger().timestamp());
        access::set_gov(&env, &gov);
        extend_instance(&env);

        events::publish_initialized(&env, gov, reward_token, tracker);

        Ok(())
    }

    // ── Admin ───────────────────────────────────────────────────────────────

    pub fn set_gov(env: Env, caller: Address, new_gov: Address) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        access::set_gov(&env, &new_gov);
        events::publish_gov_set(&env, caller, new_gov);
        Ok(())
    }

    /// Restart the emission clock without paying anything. Used when funding
    /// a distributor that sat idle.
    pub fn update_last_distribution_time(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        let now = env.ledger().timestamp();
        env.storage().instance().set(&LAST_DIST, &now);
        events::publish_clock_reset(&env, now);
        Ok(())
    }

    /// Change the emission rate.
    ///
    /// Emission owed at the old rate is settled first: it is kept as a carried
    /// amount paid on the tracker's next pull (or dropped if the tracker has no
    /// supply), and the clock restarts at the new rate.
    pub fn set_tokens_per_interval(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let tracker = Self::load_tracker(&env)?;
        let supply = TrackerClient::new(&env, &tracker).total_supply();
        let carried = if supply > 0 {
            Self::pending(&env)
        } else {
            0
        };
        env.storage().instance().set(&CARRIED, &carried);
        env.storage()
            .instance()
            .set(&LAST_DIST, &env.ledger().timestamp());

        let old_rate = Self::rate(&env);
        env.storage().instance().set(&RATE, &amount);
        events::publish_rate_set(&env, old_rate, amount, carried);
        Ok(())
    }

    /// Governance rescue of tokens held by the distributor, including unused
    /// reward funding.
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

    // ── Tracker-facing ──────────────────────────────────────────────────────

    /// Emission owed since the last distribution, before the balance cap.
    pub fn pending_rewards(env: Env, _supply: i128) -> i128 {
        Self::pending(&env)
    }

    /// Pay the pending emission to the tracker and restart the clock.
    ///
    /// Only the bound tracker may pull. With `supply == 0` the interval is
    /// discarded and nothing moves.
    pub fn distribute(env: Env, supply: i128) -> Result<i128, ContractError> {
        let tracker = Self::load_tracker(&env)?;
        tracker.require_auth();

        let pending = Self::pending(&env);
        env.storage()
            .instance()
            .set(&LAST_DIST, &env.ledger().timestamp());
        env.storage().instance().set(&CARRIED, &0i128);

        if supply <= 0 || pending <= 0 {
            return Ok(0);
        }

        let reward_token = Self::load_reward_token(&env)?;
        let client = token::Client::new(&env, &reward_token);
        let this = env.current_contract_address();
        let amount = pending.min(client.balance(&this));
        if amount <= 0 {
            return Ok(0);
        }
        client.transfer(&this, &tracker, &amount);

        events::publish_distributed(&env, tracker, amount);
        Ok(amount)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn tokens_per_interval(env: Env, _supply: i128) -> i128 {
        Self::rate(&env)
    }

    pub fn reward_token(env: Env) -> Result<Address, ContractError> {
        Self::load_reward_token(&env)
    }

    pub fn tracker(env: Env) -> Result<Address, ContractError> {
        Self::load_tracker(&env)
    }

    pub fn last_distribution_time(env: Env) -> u64 {
        env.storage().instance().get(&LAST_DIST).unwrap_or(0)
    }

    /// Old-rate emission settled by the last rate change and not yet pulled.
    pub fn carried_rewards(env: Env) -> i128 {
        env.storage().instance().get(&CARRIED).unwrap_or(0)
    }

    pub fn gov(env: Env) -> Result<Address, ContractError> {
        access::get_gov(&env).ok_or(ContractError::NotInitialized)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

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

    fn rate(env: &Env) -> i128 {
        env.storage().instance().get(&RATE).unwrap_or(0)
    }

    fn pending(env: &Env) -> i128 {
        let last: u64 = env.storage().instance().get(&LAST_DIST).unwrap_or(0);
        let carried: i128 = env.storage().instance().get(&CARRIED).unwrap_or(0);
        let elapsed = env.ledger().timestamp().saturating_sub(last) as i128;
        carried.saturating_add(elapsed.saturating_mul(Self::rate(env)))
    }

    fn load_tracker(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&TRACKER)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_reward_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }
}
