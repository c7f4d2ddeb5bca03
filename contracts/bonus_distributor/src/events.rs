#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub gov: Address,
    pub reward_token: Address,
    pub tracker: Address,
    pub timestamp: u64,
}

/// Fired on every non-zero pull of bonus points.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributedEvent {
    pub tracker: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when the annual multiplier changes. `carried` is the bonus accrued
/// at the old multiplier and still owed to the tracker.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultiplierSetEvent {
    pub old_basis_points: i128,
    pub new_basis_points: i128,
    pub carried: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClockResetEvent {
    pub last_distribution_time: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovSetEvent {
    pub old_gov: Address,
    pub new_gov: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenWithdrawnEvent {
    pub token: Address,
    pub receiver: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, gov: Address, reward_token: Address, tracker: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            gov,
            reward_token,
            tracker,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_distributed(env: &Env, tracker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("DISTRIB"), tracker.clone()),
        DistributedEvent {
            tracker,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_multiplier_set(
    env: &Env,
    old_basis_points: i128,
    new_basis_points: i128,
    carried: i128,
) {
    env.events().publish(
        (symbol_short!("BONUS_SET"),),
        MultiplierSetEvent {
            old_basis_points,
            new_basis_points,
            carried,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_clock_reset(env: &Env, last_distribution_time: u64) {
    env.events().publish(
        (symbol_short!("CLK_RST"),),
        ClockResetEvent {
            last_distribution_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_gov_set(env: &Env, old_gov: Address, new_gov: Address) {
    env.events().publish(
        (symbol_short!("GOV_SET"), new_gov.clone()),
        GovSetEvent {
            old_gov,
            new_gov,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_token_withdrawn(env: &Env, token: Address, receiver: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), token.clone()),
        TokenWithdrawnEvent {
            token,
            receiver,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}
