#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for tracker accounting.
//!
//! Invariants tested:
//! - The sum of staked amounts always equals the share supply
//! - The cumulative reward per token never decreases
//! - Rewards paid out never exceed what the distributor emitted

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use reward_distributor::{RewardDistributorContract, RewardDistributorContractClient};
use reward_tracker::{RewardTrackerContract, RewardTrackerContractClient};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{vec, Address, Env, String};

const RATE: i128 = 1_000_000;
const USERS: usize = 3;

// ── Helpers ───────────────────────────────────────────────────────────────────

struct World {
    env: Env,
    tracker: RewardTrackerContractClient<'static>,
    deposit_token: Address,
    reward_token: Address,
    users: Vec<Address>,
}

fn setup() -> World {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();
    env.ledger().set_timestamp(1_700_000_000);

    let deposit_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let tracker_id = env.register(RewardTrackerContract, ());
    let distributor_id = env.register(RewardDistributorContract, ());
    let tracker = RewardTrackerContractClient::new(&env, &tracker_id);
    let distributor = RewardDistributorContractClient::new(&env, &distributor_id);

    let gov = Address::generate(&env);
    tracker.initialize(
        &gov,
        &String::from_str(&env, "Staked"),
        &String::from_str(&env, "sTKN"),
        &vec![&env, deposit_token.clone()],
        &distributor_id,
    );
    distributor.initialize(&gov, &reward_token, &tracker_id);
    StellarAssetClient::new(&env, &reward_token).mint(&distributor_id, &(i64::MAX as i128));
    distributor.set_tokens_per_interval(&gov, &RATE);

    let users = (0..USERS).map(|_| Address::generate(&env)).collect();

    World {
        env,
        tracker,
        deposit_token,
        reward_token,
        users,
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Action {
    Stake {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..1_000_000_000")]
        amount: i128,
    },
    Unstake {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..1_000_000_000")]
        amount: i128,
    },
    Claim {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
    },
    Advance {
        #[proptest(strategy = "1u64..50_000")]
        seconds: u64,
    },
}

fn apply(world: &World, action: &Action) {
    match *action {
        Action::Stake { user, amount } => {
            let account = &world.users[user];
            StellarAssetClient::new(&world.env, &world.deposit_token).mint(account, &amount);
            TokenClient::new(&world.env, &world.deposit_token).approve(
                account,
                &world.tracker.address,
                &amount,
                &10_000,
            );
            world.tracker.stake(account, &world.deposit_token, &amount);
        }
        Action::Unstake { user, amount } => {
            let account = &world.users[user];
            let amount = amount.min(world.tracker.staked_amount(account));
            if amount > 0 {
                world.tracker.unstake(account, &world.deposit_token, &amount);
            }
        }
        Action::Claim { user } => {
            let account = &world.users[user];
            world.tracker.claim(account, account);
        }
        Action::Advance { seconds } => {
            let now = world.env.ledger().timestamp();
            world.env.ledger().set_timestamp(now + seconds);
        }
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Σ staked_amount == total_supply after every action.
    #[test]
    fn prop_staked_sum_equals_supply(actions in prop::collection::vec(any::<Action>(), 1..24)) {
        let world = setup();
        for action in actions.iter() {
            apply(&world, action);
            let staked: i128 = world
                .users
                .iter()
                .map(|u| world.tracker.staked_amount(u))
                .sum();
            prop_assert_eq!(staked, world.tracker.total_supply());
            prop_assert_eq!(
                world.tracker.total_deposit_supply(&world.deposit_token),
                world.tracker.total_supply()
            );
        }
    }

    /// The accumulator only moves forward.
    #[test]
    fn prop_reward_per_token_monotonic(actions in prop::collection::vec(any::<Action>(), 1..24)) {
        let world = setup();
        let mut previous = world.tracker.cumulative_reward_per_token();
        for action in actions.iter() {
            apply(&world, action);
            let current = world.tracker.cumulative_reward_per_token();
            prop_assert!(current >= previous);
            previous = current;
        }
    }

    /// Paid plus still-claimable reward is bounded by the distributor's
    /// emission, and every claim is idempotent at a fixed timestamp.
    #[test]
    fn prop_rewards_bounded_by_emission(actions in prop::collection::vec(any::<Action>(), 1..24)) {
        let world = setup();
        let start = world.env.ledger().timestamp();
        for action in actions.iter() {
            apply(&world, action);
        }

        let mut owed = 0i128;
        for user in world.users.iter() {
            owed += world.tracker.claim(user, user);
            prop_assert_eq!(world.tracker.claim(user, user), 0);
        }
        let paid_total: i128 = world
            .users
            .iter()
            .map(|u| TokenClient::new(&world.env, &world.reward_token).balance(u))
            .sum();

        let emitted = RATE * (world.env.ledger().timestamp() - start) as i128;
        prop_assert!(owed <= paid_total);
        prop_assert!(paid_total <= emitted);
    }
}
