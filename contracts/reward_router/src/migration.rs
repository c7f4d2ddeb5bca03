//! Two-phase account migration.
//!
//! The sender signals a receiver; the receiver accepts. Acceptance moves every
//! staked position, the escrow wallet balance and the vesting history.

use common::interfaces::{TrackerClient, VesterClient};
use soroban_sdk::{symbol_short, token, Address, Env, Symbol};

use crate::pipeline::Pipelines;
use crate::ContractError;

const PENDING: Symbol = symbol_short!("PENDING");

pub fn pending_receiver(env: &Env, sender: &Address) -> Option<Address> {
    env.storage().persistent().get(&(PENDING, sender.clone()))
}

pub fn set_pending_receiver(env: &Env, sender: &Address, receiver: &Address) {
    let key = (PENDING, sender.clone());
    env.storage().persistent().set(&key, receiver);
    common::storage::extend_persistent(env, &key);
}

pub fn clear_pending_receiver(env: &Env, sender: &Address) {
    env.storage().persistent().remove(&(PENDING, sender.clone()));
}

/// A sender cannot migrate while escrow is vesting in any vester.
pub fn require_nothing_vesting(p: &Pipelines, env: &Env, sender: &Address) -> Result<(), ContractError> {
    for vester in p.vesters().iter() {
        if VesterClient::new(env, &vester).balance(sender) > 0 {
            return Err(ContractError::SenderHasVestedTokens);
        }
    }
    Ok(())
}

/// A pending signal may only be pointed elsewhere while the sender has no
/// live accrual in any tracker.
pub fn require_replaceable_signal(
    p: &Pipelines,
    env: &Env,
    sender: &Address,
    receiver: &Address,
) -> Result<(), ContractError> {
    match pending_receiver(env, sender) {
        Some(pending) if pending != *receiver => {}
        _ => return Ok(()),
    }
    for tracker in p.trackers().iter() {
        if TrackerClient::new(env, &tracker).claimable(sender) > 0 {
            return Err(ContractError::SignalPending);
        }
    }
    Ok(())
}

/// A receiver must be a fresh account: no tracker history and no vesting
/// state anywhere.
pub fn validate_receiver(p: &Pipelines, env: &Env, receiver: &Address) -> Result<(), ContractError> {
    for tracker in p.trackers().iter() {
        let client = TrackerClient::new(env, &tracker);
        if client.average_staked_amount(receiver) > 0 || client.cumulative_rewards(receiver) > 0 {
            return Err(ContractError::InvalidReceiver);
        }
    }
    for vester in p.vesters().iter() {
        let client = VesterClient::new(env, &vester);
        if client.transferred_avg_staked_amount(receiver) > 0
            || client.transferred_cumulative_rewards(receiver) > 0
            || client.bonus_rewards(receiver) > 0
            || client.balance(receiver) > 0
        {
            return Err(ContractError::InvalidReceiver);
        }
    }
    Ok(())
}

/// Totals moved by one migration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Moved {
    pub token: i128,
    pub escrow: i128,
    pub bonus_points: i128,
    pub liquidity: i128,
    pub escrow_wallet: i128,
}

/// Moves every position of `sender` to `receiver`. The sender must already
/// have been compounded.
pub fn move_positions(
    p: &Pipelines,
    env: &Env,
    sender: &Address,
    receiver: &Address,
) -> Result<Moved, ContractError> {
    let router = p.router().clone();
    let config = p.config.clone();
    let mut moved = Moved::default();

    let first = config
        .token_pipeline
        .first()
        .ok_or(ContractError::InvalidConfig)?;
    let first = TrackerClient::new(env, &first);

    for (deposit_token, slot) in [
        (config.token.clone(), &mut moved.token),
        (config.escrow_token.clone(), &mut moved.escrow),
    ] {
        let amount = first.deposit_balance(sender, &deposit_token);
        if amount > 0 {
            p.unstake(&config.token_pipeline, sender, &deposit_token, amount, &router)?;
            p.stake_held(&config.token_pipeline, receiver, &deposit_token, amount)?;
            *slot = amount;
        }
    }

    let bonus_tracker = p.bonus_points_tracker()?;
    let bonus_client = TrackerClient::new(env, &bonus_tracker);
    let bonus_points = bonus_client.deposit_balance(sender, &config.bonus_points_token);
    if bonus_points > 0 {
        bonus_client.unstake_for_account(
            &router,
            sender,
            &config.bonus_points_token,
            &bonus_points,
            &router,
        );
        p.stake_bonus_points(receiver, bonus_points)?;
        moved.bonus_points = bonus_points;
    }

    let escrow_wallet = token::Client::new(env, &config.escrow_token);
    let balance = escrow_wallet.balance(sender);
    if balance > 0 {
        escrow_wallet.transfer_from(&router, sender, receiver, &balance);
        moved.escrow_wallet = balance;
    }

    if let Some(inner) = config.liquidity_pipeline.first() {
        let liquidity = TrackerClient::new(env, &inner).deposit_balance(sender, &config.liquidity_token);
        if liquidity > 0 {
            p.unstake(&config.liquidity_pipeline, sender, &config.liquidity_token, liquidity, &router)?;
            p.stake_held(&config.liquidity_pipeline, receiver, &config.liquidity_token, liquidity)?;
            moved.liquidity = liquidity;
        }
    }

    for vester in p.vesters().iter() {
        VesterClient::new(env, &vester).transfer_stake_values(&router, sender, receiver);
    }
    Ok(moved)
}
