use common::fixed_point::mul_div;
use common::storage::extend_persistent;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

const POSITION: Symbol = symbol_short!("VEST_POS");
const HISTORY: Symbol = symbol_short!("STK_HIST");

/// One account's vesting position.
///
/// `balance` is the escrow still unvested; vested escrow is burned and moves
/// into `cumulative_claim_amount`, so `balance + cumulative_claim_amount` is
/// the position's total vested amount.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VestingPosition {
    pub balance: i128,
    pub pair_amount: i128,
    pub last_vesting_time: u64,
    pub cumulative_claim_amount: i128,
    pub claimed_amount: i128,
    /// Lifetime payout; survives `withdraw`.
    pub total_claimed: i128,
}

impl VestingPosition {
    pub fn total_vested(&self) -> i128 {
        self.balance.saturating_add(self.cumulative_claim_amount)
    }

    /// Escrow that has vested since `last_vesting_time`, capped at `balance`.
    pub fn next_claimable(&self, env: &Env, vesting_duration: u64) -> i128 {
        if self.balance <= 0 || vesting_duration == 0 {
            return 0;
        }
        let elapsed = env
            .ledger()
            .timestamp()
            .saturating_sub(self.last_vesting_time) as i128;
        let vested = mul_div(env, self.total_vested(), elapsed, vesting_duration as i128);
        vested.min(self.balance)
    }

    /// Vested, not yet paid.
    pub fn claimable(&self, env: &Env, vesting_duration: u64) -> i128 {
        self.cumulative_claim_amount
            .saturating_sub(self.claimed_amount)
            .saturating_add(self.next_claimable(env, vesting_duration))
    }
}

/// Earnings history carried over from migrated accounts, and the adjustments
/// that feed the vesting ceiling.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakeHistory {
    pub bonus_rewards: i128,
    pub transferred_avg_staked: i128,
    pub transferred_cum_rewards: i128,
    pub reward_deductions: i128,
}

pub fn load_position(env: &Env, account: &Address) -> VestingPosition {
    env.storage()
        .persistent()
        .get(&(POSITION, account.clone()))
        .unwrap_or_default()
}

pub fn save_position(env: &Env, account: &Address, position: &VestingPosition) {
    let key = (POSITION, account.clone());
    env.storage().persistent().set(&key, position);
    extend_persistent(env, &key);
}

pub fn load_history(env: &Env, account: &Address) -> StakeHistory {
    env.storage()
        .persistent()
        .get(&(HISTORY, account.clone()))
        .unwrap_or_default()
}

pub fn save_history(env: &Env, account: &Address, history: &StakeHistory) {
    let key = (HISTORY, account.clone());
    env.storage().persistent().set(&key, history);
    extend_persistent(env, &key);
}
