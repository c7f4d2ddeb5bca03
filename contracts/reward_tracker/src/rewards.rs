//! Reward settlement.
//!
//! Every mutating entry point settles first: the distributor's pending amount
//! is pulled into the tracker and folded into the global accumulator, then the
//! touched account's position is rolled forward to the new accumulator value.

use common::fixed_point::{self, mul_div};
use common::interfaces::RewardSourceClient;
use common::storage::extend_persistent;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, U256};

use crate::{share, ContractError, RewardTrackerContract};

const CUMULATIVE: Symbol = symbol_short!("CUM_RPT");
const POSITION: Symbol = symbol_short!("POSITION");

/// Per-account reward bookkeeping.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePosition {
    /// Sum of the account's deposit balances across all deposit tokens.
    pub staked_amount: i128,
    /// Stake weighted by the reward earned while it was held.
    pub average_staked_amount: i128,
    /// Lifetime reward credited, claimed or not.
    pub cumulative_rewards: i128,
    /// Settled and unpaid reward.
    pub claimable_reward: i128,
    /// Accumulator value at the account's last settlement.
    pub reward_per_token_paid: U256,
}

impl StakePosition {
    pub fn empty(env: &Env) -> Self {
        Self {
            staked_amount: 0,
            average_staked_amount: 0,
            cumulative_rewards: 0,
            claimable_reward: 0,
            reward_per_token_paid: fixed_point::zero(env),
        }
    }
}

pub fn cumulative_reward_per_token(env: &Env) -> U256 {
    env.storage()
        .instance()
        .get(&CUMULATIVE)
        .unwrap_or(fixed_point::zero(env))
}

pub fn set_cumulative_reward_per_token(env: &Env, value: &U256) {
    env.storage().instance().set(&CUMULATIVE, value);
}

pub fn load_position(env: &Env, account: &Address) -> StakePosition {
    env.storage()
        .persistent()
        .get(&(POSITION, account.clone()))
        .unwrap_or(StakePosition::empty(env))
}

pub fn save_position(env: &Env, account: &Address, position: &StakePosition) {
    let key = (POSITION, account.clone());
    env.storage().persistent().set(&key, position);
    extend_persistent(env, &key);
}

/// Pulls the distributor's pending reward and advances the accumulator.
///
/// With zero supply the distributor still advances its clock, so nothing
/// accrues to the accumulator for that interval.
pub fn update_global(env: &Env) -> Result<U256, ContractError> {
    let distributor = RewardTrackerContract::load_distributor(env)?;
    let supply = share::total_supply(env);
    let reward = RewardSourceClient::new(env, &distributor).distribute(&supply);

    let mut cumulative = cumulative_reward_per_token(env);
    if reward > 0 && supply > 0 {
        cumulative = cumulative.add(&fixed_point::reward_per_token_delta(env, reward, supply));
        set_cumulative_reward_per_token(env, &cumulative);
    }
    Ok(cumulative)
}

/// Settles globally, then rolls `account` forward and persists it.
///
/// Returns the settled position so the caller can apply its own change on top.
pub fn settle(env: &Env, account: &Address) -> Result<StakePosition, ContractError> {
    let cumulative = update_global(env)?;

    let mut position = load_position(env, account);
    let account_reward = fixed_point::accrued(
        env,
        position.staked_amount,
        &cumulative,
        &position.reward_per_token_paid,
    );

    position.claimable_reward = position
        .claimable_reward
        .checked_add(account_reward)
        .ok_or(ContractError::Overflow)?;
    position.reward_per_token_paid = cumulative;

    if position.claimable_reward > 0 && position.staked_amount > 0 && account_reward > 0 {
        let next = position
            .cumulative_rewards
            .checked_add(account_reward)
            .ok_or(ContractError::Overflow)?;
        let carried = mul_div(
            env,
            position.average_staked_amount,
            position.cumulative_rewards,
            next,
        );
        let fresh = mul_div(env, position.staked_amount, account_reward, next);
        position.average_staked_amount = carried.saturating_add(fresh);
        position.cumulative_rewards = next;
    }

    save_position(env, account, &position);
    Ok(position)
}
