#![allow(deprecated)] // events().publish migration tracked separately

use common::Capability;
use soroban_sdk::{symbol_short, Address, Env, Vec};

use crate::TrackerModes;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the tracker is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub gov: Address,
    pub deposit_tokens: Vec<Address>,
    pub distributor: Address,
    pub timestamp: u64,
}

/// Fired when deposit tokens are staked.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub funder: Address,
    pub account: Address,
    pub token: Address,
    pub amount: i128,
    pub total_supply: i128,
    pub timestamp: u64,
}

/// Fired when deposit tokens are unstaked.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub account: Address,
    pub token: Address,
    pub amount: i128,
    pub receiver: Address,
    pub total_supply: i128,
    pub timestamp: u64,
}

/// Fired when reward is paid out.
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
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApprovedEvent {
    pub from: Address,
    pub spender: Address,
    pub amount: i128,
    pub expiration_ledger: u32,
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
pub struct ModesSetEvent {
    pub modes: TrackerModes,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositTokenSetEvent {
    pub token: Address,
    pub accepted: bool,
    pub timestamp: u64,
}

/// Fired when a capability is granted (`granted = true`) or revoked.
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
pub struct TokenWithdrawnEvent {
    pub token: Address,
    pub receiver: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    gov: Address,
    deposit_tokens: Vec<Address>,
    distributor: Address,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            gov,
            deposit_tokens,
            distributor,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    funder: Address,
    account: Address,
    token: Address,
    amount: i128,
    total_supply: i128,
) {
    env.events().publish(
        (symbol_short!("STAKED"), account.clone()),
        StakedEvent {
            funder,
            account,
            token,
            amount,
            total_supply,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    account: Address,
    token: Address,
    amount: i128,
    receiver: Address,
    total_supply: i128,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), account.clone()),
        UnstakedEvent {
            account,
            token,
            amount,
            receiver,
            total_supply,
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

pub fn publish_transfer(env: &Env, from: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("TRANSFER"), from.clone(), to.clone()),
        TransferEvent {
            from,
            to,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_approved(
    env: &Env,
    from: Address,
    spender: Address,
    amount: i128,
    expiration_ledger: u32,
) {
    env.events().publish(
        (symbol_short!("APPROVE"), from.clone(), spender.clone()),
        ApprovedEvent {
            from,
            spender,
            amount,
            expiration_ledger,
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

pub fn publish_modes_set(env: &Env, modes: TrackerModes) {
    env.events().publish(
        (symbol_short!("MODES"),),
        ModesSetEvent {
            modes,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposit_token_set(env: &Env, token: Address, accepted: bool) {
    env.events().publish(
        (symbol_short!("DEP_TOK"), token.clone()),
        DepositTokenSetEvent {
            token,
            accepted,
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
