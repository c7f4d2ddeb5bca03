#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::RouterConfig;

// ── Event payloads ──────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub gov: Address,
    pub config: RouterConfig,
    pub timestamp: u64,
}

/// Stake or unstake of `token` through a pipeline; `kind` is `STAKE` or
/// `UNSTAKE`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeEvent {
    pub kind: Symbol,
    pub account: Address,
    pub token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidityEvent {
    pub kind: Symbol,
    pub account: Address,
    pub token: Address,
    pub token_amount: i128,
    pub liquidity: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompoundedEvent {
    pub account: Address,
    pub escrow: i128,
    pub bonus_points: i128,
    pub fees: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsHandledEvent {
    pub account: Address,
    pub token_amount: i128,
    pub escrow_amount: i128,
    pub bonus_points: i128,
    pub fees: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferSignalledEvent {
    pub sender: Address,
    pub receiver: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferAcceptedEvent {
    pub sender: Address,
    pub receiver: Address,
    pub staked_token: i128,
    pub staked_escrow: i128,
    pub bonus_points: i128,
    pub liquidity: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovSetEvent {
    pub old_gov: Address,
    pub new_gov: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, gov: Address, config: RouterConfig) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            gov,
            config,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_stake(env: &Env, kind: Symbol, account: Address, token: Address, amount: i128) {
    env.events().publish(
        (kind.clone(), account.clone()),
        StakeEvent {
            kind,
            account,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_liquidity(
    env: &Env,
    kind: Symbol,
    account: Address,
    token: Address,
    token_amount: i128,
    liquidity: i128,
) {
    env.events().publish(
        (kind.clone(), account.clone()),
        LiquidityEvent {
            kind,
            account,
            token,
            token_amount,
            liquidity,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_compounded(env: &Env, account: Address, escrow: i128, bonus_points: i128, fees: i128) {
    env.events().publish(
        (symbol_short!("COMPOUND"), account.clone()),
        CompoundedEvent {
            account,
            escrow,
            bonus_points,
            fees,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_handled(
    env: &Env,
    account: Address,
    token_amount: i128,
    escrow_amount: i128,
    bonus_points: i128,
    fees: i128,
) {
    env.events().publish(
        (symbol_short!("HANDLED"), account.clone()),
        RewardsHandledEvent {
            account,
            token_amount,
            escrow_amount,
            bonus_points,
            fees,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_transfer_signalled(env: &Env, sender: Address, receiver: Address) {
    env.events().publish(
        (symbol_short!("SIGNAL"), sender.clone()),
        TransferSignalledEvent {
            sender,
            receiver,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_transfer_accepted(
    env: &Env,
    sender: Address,
    receiver: Address,
    moved: crate::migration::Moved,
) {
    env.events().publish(
        (symbol_short!("ACCEPT"), sender.clone(), receiver.clone()),
        TransferAcceptedEvent {
            sender,
            receiver,
            staked_token: moved.token,
            staked_escrow: moved.escrow,
            bonus_points: moved.bonus_points,
            liquidity: moved.liquidity,
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
