//! Cross-contract clients.
//!
//! Contracts in this suite never link each other's crates; they call through
//! these interface traits so each wasm only exports its own entry points.

use soroban_sdk::{contractclient, Address, Env};

/// A distributor that meters one reward token into exactly one tracker.
///
/// The tracker passes its current share supply on every call so a
/// supply-driven distributor never has to call back into it.
#[contractclient(name = "RewardSourceClient")]
pub trait RewardSource {
    fn reward_token(env: Env) -> Address;
    fn tokens_per_interval(env: Env, supply: i128) -> i128;
    fn pending_rewards(env: Env, supply: i128) -> i128;
    fn distribute(env: Env, supply: i128) -> i128;
}

/// Entry points of a reward tracker used by distributors, vesters and the
/// router.
#[contractclient(name = "TrackerClient")]
pub trait Tracker {
    fn total_supply(env: Env) -> i128;
    fn reward_token(env: Env) -> Address;
    fn update_rewards(env: Env);
    fn stake_for_account(
        env: Env,
        caller: Address,
        funder: Address,
        account: Address,
        token: Address,
        amount: i128,
    );
    fn unstake_for_account(
        env: Env,
        caller: Address,
        account: Address,
        token: Address,
        amount: i128,
        receiver: Address,
    );
    fn claim_for_account(env: Env, caller: Address, account: Address, receiver: Address) -> i128;
    fn claimable(env: Env, account: Address) -> i128;
    fn staked_amount(env: Env, account: Address) -> i128;
    fn deposit_balance(env: Env, account: Address, token: Address) -> i128;
    fn average_staked_amount(env: Env, account: Address) -> i128;
    fn cumulative_rewards(env: Env, account: Address) -> i128;
}

/// Entry points of a vester used by the router.
#[contractclient(name = "VesterClient")]
pub trait Vester {
    fn balance(env: Env, account: Address) -> i128;
    fn claim_for_account(env: Env, caller: Address, account: Address, receiver: Address) -> i128;
    fn bonus_rewards(env: Env, account: Address) -> i128;
    fn transfer_stake_values(env: Env, caller: Address, sender: Address, receiver: Address);
    fn transferred_avg_staked_amount(env: Env, account: Address) -> i128;
    fn transferred_cumulative_rewards(env: Env, account: Address) -> i128;
}

/// External liquidity-pool manager: mints and burns the index share against
/// its basket and enforces its own redemption cooldown.
#[allow(clippy::too_many_arguments)]
#[contractclient(name = "LiquidityManagerClient")]
pub trait LiquidityManager {
    fn add_liquidity_for_account(
        env: Env,
        caller: Address,
        funding_account: Address,
        account: Address,
        token: Address,
        amount: i128,
        min_usd: i128,
        min_liquidity: i128,
    ) -> i128;
    fn remove_liquidity_for_account(
        env: Env,
        caller: Address,
        account: Address,
        token_out: Address,
        liquidity_amount: i128,
        min_out: i128,
        receiver: Address,
    ) -> i128;
}

/// Unwraps the fee token into the native asset.
///
/// `from` must have approved the wrapper for `amount` beforehand.
#[contractclient(name = "NativeWrapperClient")]
pub trait NativeWrapper {
    fn unwrap(env: Env, from: Address, to: Address, amount: i128);
}
