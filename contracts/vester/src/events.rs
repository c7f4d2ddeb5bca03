#![allow(deprecated)] // events().publish migration tracked separately

use common::Capability;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::VesterConfig;

// ── Event payloads ──────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub gov: Address,
    pub config: VesterConfig,
    pub timestamp: u64,
}

/// Fired when escrow is deposited. `balance` and `pair_amount` are the
/// position after the deposit.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub account: Address,
    pub amount: i128,
    pub balance: i128,
    pub pair_amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedEvent {
    pub account: Address,
    pub receiver: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub account: Address,
    pub escrow_returned: i128,
    pub pair_returned: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeValuesTransferredEvent {
    pub sender: Address,
    pub receiver: Address,
    pub average_staked_amount: i128,
    pub cumulative_rewards: i128,
    pub timestamp: u64,
}

/// Fired by the individual migration setters; `field` names the value set.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistorySetEvent {
    pub account: Address,
    pub field: Symbol,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MaxVestableSetEvent {
    pub enabled: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapabilitySetEvent {
    pub principal: Address,
    pub capability: Capability,
    pub granted: bool,
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

pub fn publish_initialized(env: &Env, gov: Address, config: VesterConfig) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            gov,
            config,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(
    env: &Env,
    account: Address,
    amount: i128,
    balance: i128,
    pair_amount: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), account.clone()),
        DepositedEvent {
            account,
            amount,
            balance,
            pair_amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_claimed(env: &Env, account: Address, receiver: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLMD"), account.clone()),
        ClaimedEvent {
            account,
            receiver,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, account: Address, escrow_returned: i128, pair_returned: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), account.clone()),
        WithdrawnEvent {
            account,
            escrow_returned,
            pair_returned,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_stake_values_transferred(
    env: &Env,
    sender: Address,
    receiver: Address,
    average_staked_amount: i128,
    cumulative_rewards: i128,
) {
    env.events().publish(
        (symbol_short!("STK_XFER"), sender.clone(), receiver.clone()),
        StakeValuesTransferredEvent {
            sender,
            receiver,
            average_staked_amount,
            cumulative_rewards,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_history_set(env: &Env, account: Address, field: Symbol, amount: i128) {
    env.events().publish(
        (symbol_short!("HIST_SET"), account.clone()),
        HistorySetEvent {
            account,
            field,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_max_vestable_set(env: &Env, enabled: bool) {
    env.events().publish(
        (symbol_short!("MAX_VEST"),),
        MaxVestableSetEvent {
            enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_capability_set(env: &Env, principal: Address, capability: Capability, granted: bool) {
    env.events().publish(
        (symbol_short!("CAP_SET"), principal.clone()),
        CapabilitySetEvent {
            principal,
            capability,
            granted,
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
