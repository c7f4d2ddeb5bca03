//! Supply-proportional bonus distributor.
//!
//! Emits bonus points at `bonus_multiplier_basis_points` of the tracker's
//! supply per year:
//!
//! ```text
//! pending = elapsed × supply × bps / 10_000 / 31_536_000
//! ```
//!
//! The supply is supplied by the tracker on each call, so the distributor
//! never calls back into a tracker that is mid-settlement.

#![no_std]

pub mod events;

use common::access;
use common::fixed_point::{mul_div, BASIS_POINTS_DIVISOR};
use common::interfaces::TrackerClient;
use common::storage::extend_instance;
use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol};

/// One year, the period over which the multiplier applies.
pub const BONUS_DURATION: i128 = 365 * 24 * 60 * 60;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const TRACKER: Symbol = symbol_short!("TRACKER");
const MULTIPLIER: Symbol = symbol_short!("BONUS_BPS");
const LAST_DIST: Symbol = symbol_short!("LAST_DIST");
const CARRIED: Symbol = symbol_short!("CARRIED");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 301,
    AlreadyInitialized = 302,
    Unauthorized = 320,
    InvalidAmount = 360,
}

impl ContractError {
    pub fn class(&self) -> Option<common::ErrorClass> {
        common::classify(*self as u32)
    }
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct BonusDistributorContract;

#[contractimpl]
impl BonusDistributorContract {
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
        env.storage().instance().set(&MULTIPLIER, &0i128);
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

    pub fn update_last_distribution_time(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        let now = env.ledger().timestamp();
        env.storage().instance().set(&LAST_DIST, &now);
        events::publish_clock_reset(&env, now);
        Ok(())
    }

    /// Change the annual multiplier. Bonus accrued at the old multiplier
    /// against the tracker's current supply is carried into the next pull.
    pub fn set_bonus_multiplier(
        env: Env,
        caller: Address,
        basis_points: i128,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        if basis_points < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let tracker = Self::load_tracker(&env)?;
        let supply = TrackerClient::new(&env, &tracker).total_supply();
        let carried = if supply > 0 {
            Self::pending(&env, supply)
        } else {
            0
        };
        env.storage().instance().set(&CARRIED, &carried);
        env.storage()
            .instance()
            .set(&LAST_DIST, &env.ledger().timestamp());

        let old = Self::multiplier(&env);
        env.storage().instance().set(&MULTIPLIER, &basis_points);
        events::publish_multiplier_set(&env, old, basis_points, carried);
        Ok(())
    }

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

    pub fn pending_rewards(env: Env, supply: i128) -> i128 {
        Self::pending(&env, supply)
    }

    /// Same contract as the fixed-rate distributor: tracker-only, discards the
    /// interval at zero supply, capped at the held balance.
    pub fn distribute(env: Env, supply: i128) -> Result<i128, ContractError> {
        let tracker = Self::load_tracker(&env)?;
        tracker.require_auth();

        let pending = Self::pending(&env, supply);
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

    /// Per-second emission at the given supply.
    pub fn tokens_per_interval(env: Env, supply: i128) -> i128 {
        mul_div(
            &env,
            supply,
            Self::multiplier(&env),
            BASIS_POINTS_DIVISOR * BONUS_DURATION,
        )
    }

    pub fn bonus_multiplier_basis_points(env: Env) -> i128 {
        Self::multiplier(&env)
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

    fn multiplier(env: &Env) -> i128 {
        env.storage().instance().get(&MULTIPLIER).unwrap_or(0)
    }

    fn pending(env: &Env, supply: i128) -> i128 {
        let last: u64 = env.storage().instance().get(&LAST_DIST).unwrap_or(0);
        let carried: i128 = env.storage().instance().get(&CARRIED).unwrap_or(0);
        let elapsed = env.ledger().timestamp().saturating_sub(last) as i128;
        let accrued = mul_div(
            env,
            elapsed.saturating_mul(supply),
            Self::multiplier(env),
            BASIS_POINTS_DIVISOR * BONUS_DURATION,
        );
        carried.saturating_add(accrued)
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
