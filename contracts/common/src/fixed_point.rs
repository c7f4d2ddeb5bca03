//! Wide fixed-point arithmetic for reward accounting.
//!
//! The reward accumulator is scaled by 10^30 and kept as a host `U256`, so
//! `reward × PRECISION` never overflows for realistic 18-decimal amounts.
//! Every division floors; the dust left behind stays in the tracker and is
//! never paid twice.

use soroban_sdk::{Env, U256};

/// Decimal exponent of the reward-per-token scale.
pub const PRECISION_DECIMALS: u32 = 30;

/// Denominator for basis-point multipliers.
pub const BASIS_POINTS_DIVISOR: i128 = 10_000;

/// 10^30 as a `U256`.
pub fn precision(env: &Env) -> U256 {
    U256::from_u32(env, 10).pow(PRECISION_DECIMALS)
}

pub fn zero(env: &Env) -> U256 {
    U256::from_u32(env, 0)
}

fn to_u256(env: &Env, value: i128) -> U256 {
    U256::from_u128(env, value.max(0) as u128)
}

/// Narrows back to `i128`, saturating at `i128::MAX`.
fn to_i128(value: &U256) -> i128 {
    value
        .to_u128()
        .and_then(|v| i128::try_from(v).ok())
        .unwrap_or(i128::MAX)
}

/// `a × b / denominator` with a 256-bit intermediate, floored.
///
/// Returns 0 when any operand is non-positive.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> i128 {
    if a <= 0 || b <= 0 || denominator <= 0 {
        return 0;
    }
    let product = to_u256(env, a).mul(&to_u256(env, b));
    to_i128(&product.div(&to_u256(env, denominator)))
}

/// Increment of the cumulative reward per token when `reward` is spread over
/// `supply` shares:
///
/// ```text
/// Δ = reward × 10^30 / supply
/// ```
///
/// Zero supply or zero reward leaves the accumulator unchanged.
pub fn reward_per_token_delta(env: &Env, reward: i128, supply: i128) -> U256 {
    if reward <= 0 || supply <= 0 {
        return zero(env);
    }
    to_u256(env, reward)
        .mul(&precision(env))
        .div(&to_u256(env, supply))
}

/// Reward earned by `staked` shares while the accumulator moved from
/// `previous` to `current`:
///
/// ```text
/// earned = staked × (current − previous) / 10^30
/// ```
pub fn accrued(env: &Env, staked: i128, current: &U256, previous: &U256) -> i128 {
    if staked <= 0 || current <= previous {
        return 0;
    }
    let delta = current.sub(previous);
    to_i128(&to_u256(env, staked).mul(&delta).div(&precision(env)))
}
